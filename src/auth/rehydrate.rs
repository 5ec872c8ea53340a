//! Startup rehydration: exchange the stored token for a fresh profile before
//! any role-dependent view renders.
//!
//! A token the backend rejects (401/403) is removed from durable storage along
//! with its role session so it is not retried on every start. Transport
//! failures and timeouts only clear the projection; the stored session is kept
//! for the next attempt.

use super::client::AuthApi;
use super::role::RoleKey;
use super::state::{AuthContext, role_of};
use crate::api::ApiError;
use std::time::Duration;
use tracing::{info, instrument, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RehydrateOutcome {
    /// Nothing stored; the visitor is anonymous.
    NoToken,
    Restored { role: RoleKey },
    /// The backend refused the token and durable state was cleared.
    Rejected { status: u16 },
    /// The backend could not be reached in time; durable state kept.
    Unavailable,
}

/// Validates the stored credential against `GET /user`.
#[instrument(skip_all)]
pub async fn rehydrate<A: AuthApi>(
    api: &A,
    auth: &AuthContext,
    timeout: Duration,
) -> RehydrateOutcome {
    let sessions = auth.sessions();
    let stored = sessions.sessions();

    let (token, known_role) = match sessions.token() {
        Some(token) => {
            let role = stored
                .values()
                .find(|session| session.token == token)
                .map(|session| session.role.clone());
            (token, role)
        }
        None => match sessions
            .restorable_role()
            .and_then(|role| stored.get(&role))
        {
            Some(session) => (session.token.clone(), Some(session.role.clone())),
            None => {
                auth.clear_user();
                return RehydrateOutcome::NoToken;
            }
        },
    };

    let result = match tokio::time::timeout(timeout, api.current_user(&token)).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout(format!(
            "No profile response within {}s",
            timeout.as_secs_f32()
        ))),
    };

    match result {
        Ok(user) => {
            let role = known_role.unwrap_or_else(|| role_of(&user));
            let role = auth.sign_in(role.as_str(), &token, user);
            info!(role = %role, "session restored");
            RehydrateOutcome::Restored { role }
        }
        Err(err) if err.is_auth_rejection() => {
            let status = err.status().unwrap_or_default();
            warn!(status, role = ?known_role.as_ref().map(RoleKey::as_str), "stored token rejected");
            if let Some(role) = &known_role {
                sessions.clear_session(role.as_str());
            }
            sessions.clear_token();
            auth.clear_user();
            RehydrateOutcome::Rejected { status }
        }
        Err(err) => {
            warn!("profile fetch failed, continuing signed out: {err}");
            auth.clear_user();
            RehydrateOutcome::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::login::fake::FakeApi;
    use crate::auth::sessions::Session;
    use crate::auth::storage::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    const TIMEOUT: Duration = Duration::from_secs(12);

    fn context() -> AuthContext {
        AuthContext::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn empty_store_is_no_token() {
        let api = FakeApi::default();
        let auth = context();
        assert_eq!(rehydrate(&api, &auth, TIMEOUT).await, RehydrateOutcome::NoToken);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn success_projects_fresh_profile() {
        let api = FakeApi::default();
        let auth = context();
        auth.sign_in("doctor", "d", json!({ "name": "stale" }));
        auth.clear_user();
        api.push_user(Ok(json!({ "name": "fresh", "role": "DOCTOR" })));

        let outcome = rehydrate(&api, &auth, TIMEOUT).await;
        assert_eq!(
            outcome,
            RehydrateOutcome::Restored {
                role: RoleKey::normalize("DOCTOR")
            }
        );
        assert_eq!(api.calls(), vec!["user d".to_string()]);
        assert_eq!(auth.snapshot().user, Some(json!({ "name": "fresh", "role": "DOCTOR" })));
        assert_eq!(auth.user_for_role("doctor"), auth.snapshot().user);
    }

    #[tokio::test]
    async fn bare_token_without_session_uses_profile_role() {
        let api = FakeApi::default();
        let auth = context();
        auth.set_user_token(Some("bare"));
        auth.clear_user();
        api.push_user(Ok(json!({ "role": "laboratory" })));

        let outcome = rehydrate(&api, &auth, TIMEOUT).await;
        assert_eq!(
            outcome,
            RehydrateOutcome::Restored {
                role: RoleKey::normalize("LABORATORY")
            }
        );
        assert!(auth.sessions().session("laboratory").is_some());
    }

    #[tokio::test]
    async fn rejection_clears_durable_state() {
        let api = FakeApi::default();
        let auth = context();
        auth.sign_in("user", "old", json!({}));
        api.push_user(Err(ApiError::from_response(401, r#"{"message":"jwt expired"}"#)));

        let outcome = rehydrate(&api, &auth, TIMEOUT).await;
        assert_eq!(outcome, RehydrateOutcome::Rejected { status: 401 });
        assert!(auth.snapshot().is_empty());
        assert_eq!(auth.sessions().token(), None);
        assert!(auth.sessions().session("user").is_none());
        assert!(!auth.sessions().has_any_session());
    }

    #[tokio::test]
    async fn network_failure_keeps_durable_state() {
        let api = FakeApi::default();
        let auth = context();
        auth.sign_in("user", "t", json!({}));
        api.push_user(Err(ApiError::Network("connection refused".to_string())));

        let outcome = rehydrate(&api, &auth, TIMEOUT).await;
        assert_eq!(outcome, RehydrateOutcome::Unavailable);
        assert!(auth.snapshot().is_empty());
        assert_eq!(auth.sessions().token().as_deref(), Some("t"));
        assert!(auth.sessions().session("user").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_unavailable_and_keeps_durable_state() {
        let api = FakeApi::default();
        let auth = context();
        auth.sign_in("user", "t", json!({ "name": "kept" }));
        api.stall_profile();

        let outcome = rehydrate(&api, &auth, TIMEOUT).await;
        assert_eq!(outcome, RehydrateOutcome::Unavailable);
        assert_eq!(api.calls(), vec!["user t".to_string()]);
        assert!(auth.snapshot().is_empty());
        assert_eq!(auth.sessions().token().as_deref(), Some("t"));
        assert_eq!(
            auth.sessions().session("user").map(|s| s.token),
            Some("t".to_string())
        );
    }

    #[tokio::test]
    async fn emptied_newer_session_does_not_hide_live_one() {
        let api = FakeApi::default();
        let auth = context();
        let stored = |token: &str, updated_at| Session {
            role: RoleKey::normalize("ignored"),
            token: token.to_string(),
            user: json!({}),
            updated_at,
        };
        auth.sessions().set_session("doctor", stored("d", 10));
        auth.sessions().set_session("user", stored("", 20));
        api.push_user(Ok(json!({ "role": "DOCTOR" })));

        let outcome = rehydrate(&api, &auth, TIMEOUT).await;
        assert_eq!(
            outcome,
            RehydrateOutcome::Restored {
                role: RoleKey::normalize("DOCTOR")
            }
        );
        assert_eq!(api.calls(), vec!["user d".to_string()]);
    }

    #[tokio::test]
    async fn session_without_bare_token_is_used() {
        let api = FakeApi::default();
        let auth = context();
        auth.sign_in("doctor", "d", json!({}));
        auth.sessions().clear_token();
        api.push_user(Ok(json!({ "role": "DOCTOR" })));

        rehydrate(&api, &auth, TIMEOUT).await;
        assert_eq!(api.calls(), vec!["user d".to_string()]);
        assert_eq!(auth.sessions().token().as_deref(), Some("d"));
    }
}
