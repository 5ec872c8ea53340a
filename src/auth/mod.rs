//! Multi-role authentication: durable role sessions, the active-user
//! projection, route gates and the login/registration/rehydration flows.
//! Tokens are bearer credentials and are never logged.

pub mod client;
pub mod errors;
pub mod guards;
pub mod login;
pub mod rehydrate;
pub mod role;
pub mod sessions;
pub mod state;
pub mod storage;
pub mod types;
pub mod validation;

pub use errors::{Field, FlowError};
pub use role::{Dashboard, Role, RoleKey};
pub use state::{ActiveUser, AuthContext};
