//! GridBot Core - the execution engine for a grid-board programming
//! puzzle
//!
//! A learner queues movement and action commands into a program, then
//! runs it step by step to walk a robot across a bounded grid, picking
//! up heroes, triggering terrain effects and unlocking further commands
//! as their score crosses configured thresholds.
//!
//! ## Modules
//!
//! - [`session`] - program execution engine and run/step state machine
//! - [`board`] - grid geometry, terrain markers and placements
//! - [`unlock`] - score-threshold rules gating the command set
//! - [`state`] - the mutable session aggregate and its lifecycle
//! - [`persist`] - single-slot save/restore contract
//! - [`dispatch`] - the action surface presentation layers drive
//! - [`renderer`] - text and JSON renderers for presentation layers

pub mod board;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod level;
pub mod pacer;
pub mod persist;
pub mod program;
pub mod renderer;
mod scenarios; // End-to-end behavioral pinning tests
pub mod session;
pub mod state;
pub mod unlock;

// Core types
pub use board::{BoardVariant, Direction, Grid, GridMetrics, Hero, Planet, Position};
pub use command::{Command, CommandDef};
pub use config::{BoardConfig, CommandConfig, GameConfig};
pub use dispatch::Action;
pub use error::{Error, Result};
pub use level::{LevelCatalog, LevelId};
pub use program::Program;
pub use session::{
    CommandCostLine, RunState, Session, SessionEvent, SessionView, DEFAULT_FINAL_MESSAGE,
};
pub use state::{PersistedState, SessionState, DEFAULT_POPULATION};
pub use unlock::{StageRule, VariantRules};

// Run pacing
pub use pacer::{CancelHandle, FixedDelayPacer, InstantPacer, StepPacer, DEFAULT_STEP_DELAY};

// Persistence
pub use persist::{JsonFileStore, MemoryStore, SessionStore};

// Renderers
pub use renderer::{CompactJsonRenderer, JsonRenderer, Renderer, TextRenderer};
