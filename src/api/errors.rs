use serde::Deserialize;
use thiserror::Error;

/// Maximum number of error body characters kept for diagnostics.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApiError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Http {
        status: u16,
        message: Option<String>,
        suspension: Option<Suspension>,
    },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
}

/// Extra fields the backend attaches to a 403 for a suspended account.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Suspension {
    pub reason: Option<String>,
    pub suspended_at: Option<String>,
    pub expires_at: Option<String>,
}

impl Suspension {
    /// Renders the multi-line explanation shown to a suspended user.
    #[must_use]
    pub fn render(&self, message: &str) -> String {
        let mut lines = vec![message.trim().to_string()];
        lines.push(format!(
            "Reason: {}",
            self.reason.as_deref().unwrap_or("Not specified")
        ));
        if let Some(at) = &self.suspended_at {
            lines.push(format!("Suspended at: {at}"));
        }
        lines.push(format!(
            "Expires at: {}",
            self.expires_at.as_deref().unwrap_or("Permanent")
        ));
        lines.join("\n")
    }
}

/// Error payload shape returned by every backend endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    message: Option<String>,
    reason: Option<String>,
    suspended_at: Option<String>,
    expires_at: Option<String>,
}

impl ApiError {
    /// Builds an HTTP error from a status code and the raw response body.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        let suspension = match &message {
            Some(m) if status == 403 && m.to_lowercase().contains("suspended") => {
                Some(Suspension {
                    reason: parsed.reason,
                    suspended_at: parsed.suspended_at,
                    expires_at: parsed.expires_at,
                })
            }
            _ => None,
        };

        if message.is_none() {
            tracing::debug!(status, body = %sanitize_body(body), "error response without message");
        }

        Self::Http {
            status,
            message,
            suspension,
        }
    }

    /// HTTP status of the failure, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the server rejected the credential itself (401/403).
    #[must_use]
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Message to show the user: the server's own message when present,
    /// expanded for suspended accounts, otherwise the per-action fallback.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Http {
                message: Some(message),
                suspension: Some(suspension),
                ..
            } => suspension.render(message),
            Self::Http {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Trims and truncates HTTP error bodies before they reach logs.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
