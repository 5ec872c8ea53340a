//! Client configuration for the REST backend. Values come from CLI flags or
//! their `CAREPORT_*` environment variables; nothing here is secret.

use super::errors::ApiError;
use std::time::Duration;
use url::Url;

/// Default backend base URL used when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
/// Default timeout applied to every request and to startup rehydration.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(12);

/// Backend endpoint configuration.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    /// Validates the base URL and normalizes it (trimmed, no trailing slash).
    ///
    /// # Errors
    /// Returns `ApiError::Config` when the URL is empty, unparsable, or not http(s).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(base_url)
            .ok_or_else(|| ApiError::Config("API base URL is not configured.".to_string()))?;

        let parsed = Url::parse(&base_url)
            .map_err(|err| ApiError::Config(format!("Invalid API base URL: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "Unsupported API base URL scheme: {}",
                parsed.scheme()
            )));
        }

        Ok(Self { base_url, timeout })
    }

    /// Joins an endpoint path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        build_url_with_base(&self.base_url, path)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

fn normalize_base_url(value: &str) -> Option<String> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}
