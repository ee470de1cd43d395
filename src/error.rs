//! Error taxonomy for the engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the engine. Per-command precondition failures
/// (blocked moves, missing markers) are never errors; they degrade to
/// no-ops inside the interpreter.
#[derive(Debug, Error)]
pub enum Error {
    /// Board or command configuration failed to load or parse. Fatal to
    /// startup: no level can be presented without this data.
    #[error("configuration load failed: {reason}")]
    ConfigLoad { reason: String },

    /// Requested level id absent from board or command configuration.
    #[error("unknown level `{0}`")]
    LevelNotFound(String),

    /// The session store could not be read or written. Callers absorb
    /// this and keep operating in memory.
    #[error("persistence unavailable: {reason}")]
    Persistence { reason: String },

    /// A new run was requested while one is still in progress.
    #[error("program run already in progress")]
    RunInProgress,

    /// A run was requested with an empty program buffer.
    #[error("program buffer is empty")]
    EmptyProgram,
}

impl Error {
    pub(crate) fn config(err: impl std::fmt::Display) -> Self {
        Error::ConfigLoad {
            reason: err.to_string(),
        }
    }

    pub(crate) fn persistence(err: impl std::fmt::Display) -> Self {
        Error::Persistence {
            reason: err.to_string(),
        }
    }
}
