//! Session persistence: a single fixed storage slot, last write wins.
//!
//! Saves are fire-and-forget; the engine keeps operating in memory when
//! the store fails. Loss of durability is acceptable, loss of session
//! continuity is not.

use crate::error::{Error, Result};
use crate::state::{PersistedState, SessionState};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Storage contract for the session aggregate.
pub trait SessionStore {
    /// Loads the previously saved session, if any.
    fn load(&self) -> Result<Option<PersistedState>>;

    /// Writes the full session state, replacing any previous save.
    fn save(&mut self, state: &SessionState) -> Result<()>;
}

/// JSON file store: one slot on disk.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self) -> Result<Option<PersistedState>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(Error::persistence(err)),
        };
        let saved = serde_json::from_str(&raw).map_err(Error::persistence)?;
        Ok(Some(saved))
    }

    fn save(&mut self, state: &SessionState) -> Result<()> {
        let raw = serde_json::to_string(state).map_err(Error::persistence)?;
        std::fs::write(&self.path, raw).map_err(Error::persistence)?;
        debug!(path = %self.path.display(), "session state persisted");
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions. Round-trips
/// through JSON so it exercises the same serialization path as the file
/// store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    saved: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> Option<&str> {
        self.saved.as_deref()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<PersistedState>> {
        match &self.saved {
            Some(raw) => Ok(Some(serde_json::from_str(raw).map_err(Error::persistence)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, state: &SessionState) -> Result<()> {
        self.saved = Some(serde_json::to_string(state).map_err(Error::persistence)?);
        Ok(())
    }
}
