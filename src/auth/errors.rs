use std::fmt;
use thiserror::Error;

/// Form field a validation error belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Phone,
    Password,
    EmailOtp,
    PhoneOtp,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Password => "password",
            Field::EmailOtp => "emailOtp",
            Field::PhoneOtp => "phoneOtp",
        };
        f.write_str(name)
    }
}

/// Failures returned by the auth and verification flows to the UI layer.
/// Every variant leaves the flow in its pre-action state so the user can retry.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    /// Caught locally, no request was sent.
    #[error("{message}")]
    Validation { field: Field, message: String },
    /// Server or transport failure, already reduced to a displayable message.
    #[error("{0}")]
    Api(String),
    #[error("Please wait {0}s before requesting a new code")]
    CooldownActive(u32),
    #[error("No account is waiting for verification. Please register or log in again.")]
    NoPendingVerification,
    #[error("No session is stored for role {0}")]
    NotSignedIn(String),
}

impl FlowError {
    pub(crate) fn validation(field: Field, message: &str) -> Self {
        Self::Validation {
            field,
            message: message.to_string(),
        }
    }

    /// The offending field for local validation failures.
    #[must_use]
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::Validation { field, .. } => Some(*field),
            _ => None,
        }
    }
}
