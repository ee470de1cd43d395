//! Loading the board and command configuration documents.
//!
//! Both documents are fetched once at startup and treated as immutable
//! for the process lifetime. A load or parse failure is fatal: the
//! engine cannot present a level without this data.

use crate::board::BoardVariant;
use crate::error::{Error, Result};
use crate::level::LevelId;
use crate::unlock::VariantRules;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// All board variants, keyed by level id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub variants: BTreeMap<String, BoardVariant>,
}

impl BoardConfig {
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        serde_json::from_reader(reader).map_err(Error::config)
    }

    pub fn from_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(Error::config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(Error::config)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Pure lookup of one level's board.
    pub fn variant(&self, level: &LevelId) -> Result<&BoardVariant> {
        self.variants
            .get(level.as_str())
            .ok_or_else(|| Error::LevelNotFound(level.to_string()))
    }

    pub fn contains(&self, level: &LevelId) -> bool {
        self.variants.contains_key(level.as_str())
    }
}

/// All command catalogs and unlock rules, keyed by level id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CommandConfig {
    #[serde(default)]
    pub variants: BTreeMap<String, VariantRules>,
}

impl CommandConfig {
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        serde_json::from_reader(reader).map_err(Error::config)
    }

    pub fn from_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(Error::config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(Error::config)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn variant(&self, level: &LevelId) -> Result<&VariantRules> {
        self.variants
            .get(level.as_str())
            .ok_or_else(|| Error::LevelNotFound(level.to_string()))
    }

    pub fn contains(&self, level: &LevelId) -> bool {
        self.variants.contains_key(level.as_str())
    }
}

/// Both configuration documents an engine needs for one process lifetime.
#[derive(Clone, Debug, Default)]
pub struct GameConfig {
    pub boards: BoardConfig,
    pub commands: CommandConfig,
}

impl GameConfig {
    pub fn new(boards: BoardConfig, commands: CommandConfig) -> Self {
        Self { boards, commands }
    }

    /// Loads both documents from disk; either failure is fatal.
    pub fn from_paths(
        board_path: impl AsRef<Path>,
        command_path: impl AsRef<Path>,
    ) -> Result<Self> {
        Ok(Self {
            boards: BoardConfig::from_path(board_path)?,
            commands: CommandConfig::from_path(command_path)?,
        })
    }

    /// A level is playable only when both documents know it.
    pub fn is_valid_level(&self, level: &LevelId) -> bool {
        self.boards.contains(level) && self.commands.contains(level)
    }

    /// First configured level, the fallback when nothing is selected.
    pub fn default_level(&self) -> Option<LevelId> {
        self.commands
            .variants
            .keys()
            .next()
            .map(|id| LevelId::new(id.clone()))
    }
}
