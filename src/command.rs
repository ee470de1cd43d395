//! Executable command kinds and catalog definitions.

use crate::board::Direction;
use serde::{Deserialize, Serialize};

/// Catalog entry for one command, as authored in the command config.
/// Catalog order is authoring order and is stable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommandDef {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub cost: Option<f64>,
}

/// Command kinds the interpreter understands. Catalog ids that map to no
/// kind execute as no-ops, so catalogs can grow ahead of the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Jump,
    Recruit,
    OpenStorage,
    Teleport,
    OpenContainer,
}

impl Command {
    /// Resolves a catalog id to an interpretable command kind.
    pub fn from_id(id: &str) -> Option<Command> {
        match id {
            "up" => Some(Command::MoveUp),
            "down" => Some(Command::MoveDown),
            "left" => Some(Command::MoveLeft),
            "right" => Some(Command::MoveRight),
            "jump" => Some(Command::Jump),
            "recruit" | "collect" => Some(Command::Recruit),
            "storage" => Some(Command::OpenStorage),
            "teleport" => Some(Command::Teleport),
            "container" => Some(Command::OpenContainer),
            _ => None,
        }
    }

    /// The movement direction for directional commands.
    pub fn movement(self) -> Option<Direction> {
        match self {
            Command::MoveUp => Some(Direction::Up),
            Command::MoveDown => Some(Direction::Down),
            Command::MoveLeft => Some(Direction::Left),
            Command::MoveRight => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn is_movement(self) -> bool {
        self.movement().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids_resolve() {
        assert_eq!(Command::from_id("up"), Some(Command::MoveUp));
        assert_eq!(Command::from_id("jump"), Some(Command::Jump));
        assert_eq!(Command::from_id("recruit"), Some(Command::Recruit));
        assert_eq!(Command::from_id("collect"), Some(Command::Recruit));
        assert_eq!(Command::from_id("container"), Some(Command::OpenContainer));
    }

    #[test]
    fn test_unknown_id_is_none() {
        assert_eq!(Command::from_id("warp"), None);
        assert_eq!(Command::from_id(""), None);
    }

    #[test]
    fn test_movement_directions() {
        assert_eq!(Command::MoveLeft.movement(), Some(Direction::Left));
        assert_eq!(Command::Jump.movement(), None);
        assert!(Command::MoveDown.is_movement());
        assert!(!Command::OpenStorage.is_movement());
    }
}
