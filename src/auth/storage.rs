//! Durable key-value slots backing the session store. This is the client's
//! equivalent of browser local storage: a handful of named string slots that
//! survive restarts. Implementations must tolerate missing or corrupt data by
//! reading it as absent.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Slot holding the JSON map of role -> session.
pub const SESSIONS_SLOT: &str = "authSessions";
/// Slot holding the last active role marker.
pub const LAST_ACTIVE_ROLE_SLOT: &str = "lastActiveRole";
/// Slot holding the bare current token.
pub const TOKEN_SLOT: &str = "token";
/// Slot holding a registration that still awaits OTP verification.
pub const PENDING_VERIFICATION_SLOT: &str = "pendingVerification";

/// Named string slots that outlive the process.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    /// Returns an I/O error if the slot cannot be persisted.
    fn set(&self, key: &str, value: &str) -> io::Result<()>;

    /// # Errors
    /// Returns an I/O error if the slot cannot be persisted.
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| io::Error::other("memory store lock poisoned"))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| io::Error::other("memory store lock poisoned"))?;
        slots.remove(key);
        Ok(())
    }
}

/// All slots in one JSON object file, replaced atomically on every write.
///
/// There is no cross-process locking: two processes sharing the file follow
/// last-write-wins.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Opens (without creating) the store file under `dir`.
    #[must_use]
    pub fn open(dir: &Path) -> Self {
        Self {
            path: dir.join("storage.json"),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_slots(&self) -> Map<String, Value> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Map::new(),
            Err(err) => {
                warn!(path = %self.path.display(), "failed to read storage file: {err}");
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(slots)) => slots,
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "storage file is corrupt, treating as empty");
                Map::new()
            }
        }
    }

    fn write_slots(&self, slots: &Map<String, Value>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let payload = serde_json::to_string_pretty(slots).map_err(io::Error::other)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), slots = slots.len(), "storage file written");
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Map<String, Value>)) -> io::Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| io::Error::other("file store lock poisoned"))?;
        let mut slots = self.read_slots();
        apply(&mut slots);
        self.write_slots(&slots)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_slots().remove(key)? {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.update(|slots| {
            slots.insert(key.to_string(), Value::String(value.to_string()));
        })
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.update(|slots| {
            slots.remove(key);
        })
    }
}
