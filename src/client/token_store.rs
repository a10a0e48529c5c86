use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, warn};

/// Persistent slot for the single session token. Implementations must be
/// safe to call when the storage medium is unavailable: reads yield `None`
/// and writes are no-ops.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);
}

/// File-backed token store. An empty or whitespace-only file counts as no
/// token, so a blank persisted value never triggers a network round trip.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no stored token");
                None
            }
        }
    }

    fn set(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(path = %self.path.display(), error = %e, "token store unavailable");
                return;
            }
        }
        if let Err(e) = fs::write(&self.path, token) {
            warn!(path = %self.path.display(), error = %e, "failed to persist token");
        }
    }

    fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to clear token");
            }
        }
    }
}

/// Non-persistent store for tests and contexts without durable storage.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.slot.lock().expect("token slot poisoned").clone()
    }

    fn set(&self, token: &str) {
        *self.slot.lock().expect("token slot poisoned") = Some(token.to_string());
    }

    fn clear(&self) {
        *self.slot.lock().expect("token slot poisoned") = None;
    }
}
