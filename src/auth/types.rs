//! Request and response types for the auth endpoints. Requests carry
//! passwords or one-time codes, so they are not `Debug` and must never be
//! logged.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub email_otp: String,
    pub phone_otp: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChangeContactRequest {
    pub email: String,
    pub phone: String,
}

/// Successful login or registration.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user: Value,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"[redacted]")
            .field("user", &self.user)
            .finish()
    }
}

/// `/change-email-phone` answers with the updated user, either bare or
/// wrapped in `{ "user": ... }`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ChangeContactResponse {
    Wrapped { user: Value },
    Bare(Value),
}

impl ChangeContactResponse {
    #[must_use]
    pub fn into_user(self) -> Value {
        match self {
            Self::Wrapped { user } | Self::Bare(user) => user,
        }
    }
}

/// Whether a backend profile is flagged as still unverified.
#[must_use]
pub fn is_unverified(user: &Value) -> bool {
    user.get("isVerified").and_then(Value::as_bool) == Some(false)
}
