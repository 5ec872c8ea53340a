use crate::api::{ApiClient, ApiConfig};
use crate::auth::AuthContext;
use crate::auth::storage::FileStore;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Settings every action needs: where the backend lives and where sessions
/// are stored.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api: ApiConfig,
    pub data_dir: PathBuf,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api: ApiConfig, data_dir: PathBuf) -> Self {
        Self { api, data_dir }
    }

    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn client(&self) -> Result<ApiClient> {
        ApiClient::new(self.api.clone()).context("failed to build API client")
    }

    /// Auth context over the file store in the data directory, with the
    /// stored default session projected.
    #[must_use]
    pub fn auth_context(&self) -> AuthContext {
        let auth = AuthContext::new(Arc::new(FileStore::open(&self.data_dir)));
        auth.hydrate_from_storage();
        auth
    }
}
