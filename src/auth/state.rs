//! Auth context shared by every flow. The durable [`SessionStore`] is the
//! single source of truth; the active-user projection is a watch channel
//! derived from it, so observers see every change synchronously and the two
//! views cannot drift apart. Exactly one identity is projected at a time even
//! when several role sessions are stored.

use super::errors::FlowError;
use super::guards::AuthSnapshot;
use super::role::{Role, RoleKey};
use super::sessions::{PendingVerification, Session, SessionStore};
use super::storage::KeyValueStore;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Who is using the client right now.
#[derive(Clone, Default, PartialEq)]
pub struct ActiveUser {
    pub user: Option<Value>,
    pub token: Option<String>,
    /// Role the projected identity belongs to. `None` for a registration
    /// still waiting for verification.
    pub role: Option<RoleKey>,
}

impl ActiveUser {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.token.is_none()
    }

    fn from_session(session: Session) -> Self {
        Self {
            user: Some(session.user),
            token: Some(session.token),
            role: Some(session.role),
        }
    }
}

impl fmt::Debug for ActiveUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveUser")
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("role", &self.role)
            .finish()
    }
}

/// Role recorded in a backend profile blob, upper-cased; `USER` when absent.
#[must_use]
pub fn role_of(user: &Value) -> RoleKey {
    user.get("role")
        .and_then(Value::as_str)
        .filter(|role| !role.trim().is_empty())
        .map_or_else(|| RoleKey::from(Role::User), |role| RoleKey::normalize(role.trim()))
}

/// Injectable process-wide auth state.
#[derive(Clone)]
pub struct AuthContext {
    sessions: SessionStore,
    active: Arc<watch::Sender<ActiveUser>>,
}

impl AuthContext {
    /// Builds a context over `store` with an empty projection. Call
    /// [`AuthContext::hydrate_from_storage`] to project a stored session.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (active, _) = watch::channel(ActiveUser::default());
        Self {
            sessions: SessionStore::new(store),
            active: Arc::new(active),
        }
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Projects the newest live session, preferring the last active role.
    pub fn hydrate_from_storage(&self) -> Option<RoleKey> {
        let role = self.sessions.restorable_role()?;
        let session = self.sessions.session(role.as_str())?;
        debug!(role = %role, "projecting stored session");
        self.active.send_replace(ActiveUser::from_session(session));
        Some(role)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ActiveUser> {
        self.active.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> ActiveUser {
        self.active.borrow().clone()
    }

    /// Replaces the projected profile. When the projection belongs to a stored
    /// role the new profile is written through to that session.
    pub fn set_user(&self, user: Option<Value>) {
        let current = self.snapshot();
        if let (Some(user), Some(role)) = (&user, &current.role)
            && let Some(mut session) = self.sessions.session(role.as_str())
        {
            session.user = user.clone();
            session.updated_at = super::sessions::now_millis();
            self.sessions.set_session(role.as_str(), session);
        }
        self.active.send_modify(|active| active.user = user);
    }

    /// Replaces the projected token and the bare token slot.
    pub fn set_user_token(&self, token: Option<&str>) {
        match token {
            Some(token) => self.sessions.set_token(token),
            None => self.sessions.clear_token(),
        }
        self.active
            .send_modify(|active| active.token = token.map(str::to_string));
    }

    /// Empties the projection. Durable state is left alone.
    pub fn clear_user(&self) {
        self.active.send_replace(ActiveUser::default());
    }

    /// Stores a session for `role`. The projection follows when it already
    /// shows that role.
    pub fn set_user_for_role(&self, role: &str, user: Value, token: &str) -> RoleKey {
        let key = RoleKey::normalize(role);
        let session = Session::new(key.clone(), token, user);
        self.sessions.set_session(key.as_str(), session.clone());

        if self.snapshot().role.as_ref() == Some(&key) {
            self.active.send_replace(ActiveUser::from_session(session));
        }
        key
    }

    #[must_use]
    pub fn user_for_role(&self, role: &str) -> Option<Value> {
        self.sessions.session(role).map(|session| session.user)
    }

    /// Drops the stored session for `role`. If that role is projected the
    /// projection and the bare token go with it.
    pub fn clear_user_for_role(&self, role: &str) {
        let key = RoleKey::normalize(role);
        self.sessions.clear_session(key.as_str());

        let active = self.snapshot();
        if active.role.as_ref() == Some(&key) {
            if active.token.is_some() && active.token == self.sessions.token() {
                self.sessions.clear_token();
            }
            self.clear_user();
        }
    }

    /// Records a successful login or verification and projects it.
    pub fn sign_in(&self, role: &str, token: &str, user: Value) -> RoleKey {
        let key = RoleKey::normalize(role);
        let session = Session::new(key.clone(), token, user);
        self.sessions.set_session(key.as_str(), session.clone());
        self.sessions.set_token(token);
        self.active.send_replace(ActiveUser::from_session(session));
        info!(role = %key, "signed in");
        key
    }

    /// Signs the projected identity out: its stored session, the bare token
    /// and the projection are removed. Other stored roles are kept.
    pub fn sign_out(&self) -> Option<RoleKey> {
        let active = self.snapshot();
        if let Some(role) = &active.role {
            self.sessions.clear_session(role.as_str());
        }
        self.sessions.clear_token();
        self.clear_user();
        info!(role = ?active.role.as_ref().map(RoleKey::as_str), "signed out");
        active.role
    }

    /// Projects another stored role and marks it last active.
    ///
    /// # Errors
    /// Returns `FlowError::NotSignedIn` when no live session is stored for the
    /// role; nothing changes in that case.
    pub fn switch_role(&self, role: &str) -> Result<RoleKey, FlowError> {
        let key = RoleKey::normalize(role);
        let session = self
            .sessions
            .session(key.as_str())
            .filter(Session::is_live)
            .ok_or_else(|| FlowError::NotSignedIn(key.to_string()))?;

        self.sessions.set_session(key.as_str(), session.clone());
        self.sessions.set_token(&session.token);
        self.active.send_replace(ActiveUser::from_session(session));
        info!(role = %key, "switched role");
        Ok(key)
    }

    /// Parks a fresh registration until its OTP codes are verified and shows
    /// the pending profile without a role.
    pub fn begin_verification(&self, pending: PendingVerification) {
        self.sessions.set_pending(&pending);
        self.active.send_replace(ActiveUser {
            user: Some(pending.user),
            token: None,
            role: None,
        });
    }

    /// Promotes the pending registration to a durable session.
    ///
    /// # Errors
    /// Returns `FlowError::NoPendingVerification` when nothing is pending.
    pub fn complete_verification(&self) -> Result<RoleKey, FlowError> {
        let pending = self
            .sessions
            .pending()
            .ok_or(FlowError::NoPendingVerification)?;

        // the projection may hold a newer profile after a contact change
        let user = self.snapshot().user.unwrap_or(pending.user);
        let role = self.sign_in(role_of(&user).as_str(), &pending.token, user);
        self.sessions.clear_pending();
        Ok(role)
    }

    /// Inputs for the route guards.
    #[must_use]
    pub fn guard_snapshot(&self) -> AuthSnapshot {
        let active = self.active.borrow();
        AuthSnapshot {
            has_token: self.sessions.token().is_some(),
            has_user: active.user.is_some(),
        }
    }
}
