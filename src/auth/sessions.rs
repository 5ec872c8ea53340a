//! Durable, role-keyed credential storage.
//!
//! One `Session` per role lives in the `authSessions` slot, the most recently
//! written role in `lastActiveRole`, and the bare current token in `token`.
//! Every read degrades to empty/`None` on malformed data and no operation
//! returns an error: failed writes are logged and dropped.

use super::role::RoleKey;
use super::storage::{
    KeyValueStore, LAST_ACTIVE_ROLE_SLOT, PENDING_VERIFICATION_SLOT, SESSIONS_SLOT, TOKEN_SLOT,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Token and profile stored for one role.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub role: RoleKey,
    pub token: String,
    /// Opaque profile blob, not validated here.
    #[serde(default)]
    pub user: Value,
    /// Milliseconds since the Unix epoch of the last write.
    #[serde(default)]
    pub updated_at: i64,
}

impl Session {
    /// Builds a session stamped with the current time.
    #[must_use]
    pub fn new(role: RoleKey, token: impl Into<String>, user: Value) -> Self {
        Self {
            role,
            token: token.into(),
            user,
            updated_at: now_millis(),
        }
    }

    /// True when the session still carries a credential.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.token.is_empty()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("token", &"[redacted]")
            .field("user", &self.user)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

pub type SessionsMap = BTreeMap<RoleKey, Session>;

/// A registration waiting for OTP verification. The token is only promoted
/// to a durable session once both codes are accepted.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingVerification {
    pub token: String,
    #[serde(default)]
    pub user: Value,
}

impl fmt::Debug for PendingVerification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingVerification")
            .field("token", &"[redacted]")
            .field("user", &self.user)
            .finish()
    }
}

#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Role-keyed view over the durable slots.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn normalize_role(input: &str) -> RoleKey {
        RoleKey::normalize(input)
    }

    /// Reads the stored map. Corrupt or missing data reads as empty; entries
    /// stored under a non-canonical key are re-keyed, keeping the newest.
    #[must_use]
    pub fn sessions(&self) -> SessionsMap {
        let Some(raw) = self.store.get(SESSIONS_SLOT) else {
            return SessionsMap::new();
        };

        let parsed: BTreeMap<String, Session> = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("stored sessions are unreadable, treating as empty: {err}");
                return SessionsMap::new();
            }
        };

        let mut sessions = SessionsMap::new();
        for (key, mut session) in parsed {
            let role = RoleKey::normalize(&key);
            session.role = role.clone();
            match sessions.get(&role) {
                Some(existing) if existing.updated_at >= session.updated_at => {}
                _ => {
                    sessions.insert(role, session);
                }
            }
        }
        sessions
    }

    #[must_use]
    pub fn session(&self, role: &str) -> Option<Session> {
        self.sessions().remove(&RoleKey::normalize(role))
    }

    /// Stores `session` under the normalized role and marks that role as the
    /// last active one. `session.role` is forced to the normalized key.
    pub fn set_session(&self, role: &str, mut session: Session) {
        let key = RoleKey::normalize(role);
        session.role = key.clone();

        let mut sessions = self.sessions();
        sessions.insert(key.clone(), session);
        self.write_sessions(&sessions);
        self.write_slot(LAST_ACTIVE_ROLE_SLOT, key.as_str());
        debug!(role = %key, "session stored");
    }

    /// Removes the role's session; drops the last-active marker if it pointed
    /// at that role. Idempotent.
    pub fn clear_session(&self, role: &str) {
        let key = RoleKey::normalize(role);
        let mut sessions = self.sessions();
        if sessions.remove(&key).is_some() {
            self.write_sessions(&sessions);
            debug!(role = %key, "session cleared");
        }

        if self.last_active_role().as_ref() == Some(&key) {
            self.remove_slot(LAST_ACTIVE_ROLE_SLOT);
        }
    }

    #[must_use]
    pub fn has_any_session(&self) -> bool {
        self.sessions().values().any(Session::is_live)
    }

    #[must_use]
    pub fn last_active_role(&self) -> Option<RoleKey> {
        self.store
            .get(LAST_ACTIVE_ROLE_SLOT)
            .filter(|raw| !raw.is_empty())
            .map(|raw| RoleKey::normalize(&raw))
    }

    /// Role to land on after start: the last active role while it still has a
    /// live token, otherwise the most recently updated session. Ties go to
    /// the role key that sorts first.
    #[must_use]
    pub fn default_redirect_role(&self) -> Option<RoleKey> {
        let sessions = self.sessions();

        if let Some(last) = self.last_active_role()
            && sessions.get(&last).is_some_and(Session::is_live)
        {
            return Some(last);
        }

        newest(sessions.values()).map(|session| session.role.clone())
    }

    /// Like [`Self::default_redirect_role`], but only considers sessions that
    /// still carry a token, so an emptied newer entry never hides a live one.
    #[must_use]
    pub fn restorable_role(&self) -> Option<RoleKey> {
        let sessions = self.sessions();

        if let Some(last) = self.last_active_role()
            && sessions.get(&last).is_some_and(Session::is_live)
        {
            return Some(last);
        }

        newest(sessions.values().filter(|session| session.is_live()))
            .map(|session| session.role.clone())
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_SLOT).filter(|token| !token.is_empty())
    }

    pub fn set_token(&self, token: &str) {
        self.write_slot(TOKEN_SLOT, token);
    }

    pub fn clear_token(&self) {
        self.remove_slot(TOKEN_SLOT);
    }

    #[must_use]
    pub fn pending(&self) -> Option<PendingVerification> {
        let raw = self.store.get(PENDING_VERIFICATION_SLOT)?;
        match serde_json::from_str::<PendingVerification>(&raw) {
            Ok(pending) if !pending.token.is_empty() => Some(pending),
            Ok(_) => None,
            Err(err) => {
                warn!("pending verification is unreadable: {err}");
                None
            }
        }
    }

    pub fn set_pending(&self, pending: &PendingVerification) {
        match serde_json::to_string(pending) {
            Ok(raw) => self.write_slot(PENDING_VERIFICATION_SLOT, &raw),
            Err(err) => warn!("failed to encode pending verification: {err}"),
        }
    }

    pub fn clear_pending(&self) {
        self.remove_slot(PENDING_VERIFICATION_SLOT);
    }

    fn write_sessions(&self, sessions: &SessionsMap) {
        match serde_json::to_string(sessions) {
            Ok(raw) => self.write_slot(SESSIONS_SLOT, &raw),
            Err(err) => warn!("failed to encode sessions: {err}"),
        }
    }

    fn write_slot(&self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value) {
            warn!(slot = key, "failed to persist slot: {err}");
        }
    }

    fn remove_slot(&self, key: &str) {
        if let Err(err) = self.store.remove(key) {
            warn!(slot = key, "failed to remove slot: {err}");
        }
    }
}

/// Most recently updated session; ties go to the first in iteration order.
fn newest<'a>(sessions: impl Iterator<Item = &'a Session>) -> Option<&'a Session> {
    let mut newest: Option<&Session> = None;
    for session in sessions {
        if newest.is_none_or(|current| session.updated_at > current.updated_at) {
            newest = Some(session);
        }
    }
    newest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::storage::MemoryStore;
    use serde_json::json;

    fn store() -> (Arc<MemoryStore>, SessionStore) {
        let backing = Arc::new(MemoryStore::new());
        let sessions = SessionStore::new(backing.clone());
        (backing, sessions)
    }

    fn session(token: &str, updated_at: i64) -> Session {
        Session {
            role: RoleKey::normalize("ignored"),
            token: token.to_string(),
            user: json!({ "name": "Asha" }),
            updated_at,
        }
    }

    #[test]
    fn set_then_get_normalizes_role() {
        let (_, sessions) = store();
        for role in ["doctor", "Doctor", "DOCTOR", "delivery_boy", "lab-tech"] {
            let stored = session("t1", 10);
            sessions.set_session(role, stored.clone());

            let fetched = sessions.session(role).unwrap();
            let expected = Session {
                role: RoleKey::normalize(role),
                ..stored
            };
            assert_eq!(fetched, expected);
            assert_eq!(fetched.role.as_str(), role.to_uppercase());
        }
    }

    #[test]
    fn set_session_records_last_active_role() {
        let (_, sessions) = store();
        sessions.set_session("user", session("a", 1));
        sessions.set_session("doctor", session("b", 2));
        assert_eq!(sessions.last_active_role(), Some(RoleKey::normalize("DOCTOR")));
        assert_eq!(sessions.sessions().len(), 2);
    }

    #[test]
    fn get_session_missing_is_none() {
        let (_, sessions) = store();
        assert!(sessions.session("admin").is_none());
    }

    #[test]
    fn malformed_blobs_read_as_empty() {
        let (backing, sessions) = store();
        for blob in ["", "null", "[]", "{", "42", r#"{"USER": 5}"#, r#"{"USER": {"token": 1}}"#] {
            backing.set(SESSIONS_SLOT, blob).unwrap();
            assert!(sessions.sessions().is_empty(), "blob {blob:?}");
            assert!(!sessions.has_any_session());
            assert!(sessions.default_redirect_role().is_none());
        }
    }

    #[test]
    fn non_canonical_keys_are_rekeyed() {
        let (backing, sessions) = store();
        backing
            .set(
                SESSIONS_SLOT,
                r#"{
                    "doctor": {"role": "doctor", "token": "old", "user": {}, "updatedAt": 1},
                    "DOCTOR": {"role": "DOCTOR", "token": "new", "user": {}, "updatedAt": 5}
                }"#,
            )
            .unwrap();

        let all = sessions.sessions();
        assert_eq!(all.len(), 1);
        let doctor = &all[&RoleKey::normalize("doctor")];
        assert_eq!(doctor.token, "new");
        assert_eq!(doctor.role.as_str(), "DOCTOR");
    }

    #[test]
    fn clear_last_active_role_clears_marker() {
        let (_, sessions) = store();
        sessions.set_session("doctor", session("t", 1));
        sessions.clear_session("Doctor");
        assert!(sessions.session("doctor").is_none());
        assert_eq!(sessions.last_active_role(), None);
    }

    #[test]
    fn clear_other_role_keeps_marker() {
        let (_, sessions) = store();
        sessions.set_session("user", session("a", 1));
        sessions.set_session("doctor", session("b", 2));
        sessions.clear_session("user");
        assert_eq!(sessions.last_active_role(), Some(RoleKey::normalize("doctor")));
        assert!(sessions.session("doctor").is_some());
    }

    #[test]
    fn clear_session_is_idempotent() {
        let (backing, sessions) = store();
        sessions.set_session("user", session("a", 1));
        sessions.set_session("doctor", session("b", 2));

        sessions.clear_session("doctor");
        let once_sessions = backing.get(SESSIONS_SLOT);
        let once_marker = backing.get(LAST_ACTIVE_ROLE_SLOT);

        sessions.clear_session("doctor");
        assert_eq!(backing.get(SESSIONS_SLOT), once_sessions);
        assert_eq!(backing.get(LAST_ACTIVE_ROLE_SLOT), once_marker);
        assert_eq!(once_marker, None);
    }

    #[test]
    fn has_any_session_requires_non_empty_token() {
        let (_, sessions) = store();
        assert!(!sessions.has_any_session());

        sessions.set_session("user", session("", 1));
        assert!(!sessions.has_any_session());

        sessions.set_session("doctor", session("tok", 2));
        assert!(sessions.has_any_session());
    }

    #[test]
    fn default_redirect_prefers_live_last_active() {
        let (_, sessions) = store();
        sessions.set_session("doctor", session("d", 100));
        sessions.set_session("user", session("u", 1));
        assert_eq!(sessions.default_redirect_role(), Some(RoleKey::normalize("USER")));
    }

    #[test]
    fn default_redirect_falls_back_to_newest() {
        let (backing, sessions) = store();
        sessions.set_session("doctor", session("d", 100));
        sessions.set_session("laboratory", session("l", 300));
        sessions.set_session("user", session("", 500));

        // last active (USER) has no live token
        assert_eq!(
            sessions.default_redirect_role(),
            Some(RoleKey::normalize("USER"))
        );

        backing.remove(LAST_ACTIVE_ROLE_SLOT).unwrap();
        assert_eq!(
            sessions.default_redirect_role(),
            Some(RoleKey::normalize("USER"))
        );

        sessions.clear_session("user");
        assert_eq!(
            sessions.default_redirect_role(),
            Some(RoleKey::normalize("LABORATORY"))
        );
    }

    #[test]
    fn default_redirect_ties_go_to_first_key() {
        let (backing, sessions) = store();
        sessions.set_session("user", session("u", 7));
        sessions.set_session("doctor", session("d", 7));
        backing.remove(LAST_ACTIVE_ROLE_SLOT).unwrap();
        assert_eq!(
            sessions.default_redirect_role(),
            Some(RoleKey::normalize("DOCTOR"))
        );
    }

    #[test]
    fn restorable_role_skips_emptied_newer_session() {
        let (_, sessions) = store();
        sessions.set_session("doctor", session("d", 100));
        sessions.set_session("laboratory", session("l", 300));
        sessions.set_session("user", session("", 500));

        assert_eq!(
            sessions.default_redirect_role(),
            Some(RoleKey::normalize("USER"))
        );
        assert_eq!(
            sessions.restorable_role(),
            Some(RoleKey::normalize("LABORATORY"))
        );

        sessions.set_session("laboratory", session("", 600));
        sessions.set_session("doctor", session("d", 100));
        assert_eq!(
            sessions.restorable_role(),
            Some(RoleKey::normalize("DOCTOR"))
        );

        sessions.clear_session("doctor");
        assert_eq!(sessions.restorable_role(), None);
    }

    #[test]
    fn default_redirect_empty_store_is_none() {
        let (_, sessions) = store();
        assert_eq!(sessions.default_redirect_role(), None);
    }

    #[test]
    fn token_slot_is_independent_of_sessions() {
        let (_, sessions) = store();
        assert_eq!(sessions.token(), None);
        sessions.set_token("bare");
        assert_eq!(sessions.token(), Some("bare".to_string()));
        assert!(sessions.sessions().is_empty());
        sessions.clear_token();
        assert_eq!(sessions.token(), None);
    }

    #[test]
    fn pending_roundtrip_and_corruption() {
        let (backing, sessions) = store();
        assert!(sessions.pending().is_none());

        let pending = PendingVerification {
            token: "p1".to_string(),
            user: json!({ "email": "a@b.com" }),
        };
        sessions.set_pending(&pending);
        assert_eq!(sessions.pending(), Some(pending));

        backing.set(PENDING_VERIFICATION_SLOT, "garbage").unwrap();
        assert!(sessions.pending().is_none());

        sessions.clear_pending();
        assert!(sessions.pending().is_none());
    }

    #[test]
    fn debug_redacts_tokens() {
        let rendered = format!("{:?}", session("secret-token", 1));
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("[redacted]"));
    }
}
