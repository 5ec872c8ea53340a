//! Route gates as plain decision functions. The rendering layer interprets
//! the result; guards are UX-only and real access control lives on the API.

use crate::routes::paths;

/// Which gate wraps a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    /// Requires a token or an active user.
    Protected,
    /// Login, register and landing: only for visitors without credentials.
    PublicOnly,
}

/// Authentication inputs the gates look at, read synchronously.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    /// A bare token is present in durable storage.
    pub has_token: bool,
    /// The active-user projection holds a profile.
    pub has_user: bool,
}

impl AuthSnapshot {
    #[must_use]
    pub fn is_authenticated(self) -> bool {
        self.has_token || self.has_user
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// `from` carries the requested location so login can send the user back.
    Redirect { to: String, from: Option<String> },
}

/// Decides whether `location` may render under `gate`.
#[must_use]
pub fn decide(gate: Gate, snapshot: &AuthSnapshot, location: &str) -> GuardDecision {
    match (gate, snapshot.is_authenticated()) {
        (Gate::Protected, false) => GuardDecision::Redirect {
            to: paths::LANDING.to_string(),
            from: Some(location.to_string()),
        },
        (Gate::PublicOnly, true) => GuardDecision::Redirect {
            to: paths::DASHBOARD.to_string(),
            from: None,
        },
        _ => GuardDecision::Allow,
    }
}
