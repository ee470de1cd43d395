//! Level identity: a season plus a program token, resolved to one
//! canonical id that indexes both configuration documents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical id of one level variant, `<season>-<program>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(String);

impl LevelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Composes a canonical id from a season and a program token.
    pub fn compose(season: &str, program: &str) -> Self {
        Self(format!("{}-{}", season, program.to_lowercase()))
    }

    /// Migrates a legacy save that stored only the bare program token.
    pub fn from_legacy_program(program: &str) -> Self {
        Self::compose("winter", program)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LevelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Season -> program tokens offered by the level-selection surface.
pub struct LevelCatalog;

impl LevelCatalog {
    pub fn seasons() -> &'static [&'static str] {
        &["winter", "spring"]
    }

    pub fn programs(season: &str) -> &'static [&'static str] {
        match season {
            "winter" => &["J2", "J3", "J4"],
            "spring" => &["J3", "J4", "P3"],
            _ => &[],
        }
    }

    /// Every level id the selection surface can produce.
    pub fn all_levels() -> Vec<LevelId> {
        Self::seasons()
            .iter()
            .flat_map(|season| {
                Self::programs(season)
                    .iter()
                    .map(move |program| LevelId::compose(season, program))
            })
            .collect()
    }
}
