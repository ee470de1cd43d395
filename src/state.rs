//! The mutable session aggregate and its lifecycle.

use crate::board::{BoardVariant, Direction, Position};
use crate::config::GameConfig;
use crate::level::LevelId;
use crate::program::Program;
use serde::{Deserialize, Serialize};

/// Default population size for a fresh session.
pub const DEFAULT_POPULATION: f64 = 10.0;

/// Level-specific seeds: planets whose linked hero joins the team the
/// moment the level is initialized.
const PLANET_AUTOGRANTS: &[(&str, &str)] = &[("winter-j2", "earth")];

/// The mutable aggregate the execution engine reads and mutates; also
/// the unit of persistence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Queued command ids, insertion order significant.
    pub program: Program,
    /// Currently occupied cell, in raw board coordinates.
    pub position: Position,
    pub robot_direction: Direction,
    /// Heroes collected this session. Grows monotonically within a level
    /// instance; may be pre-seeded at initialization.
    pub acquired_heroes: Vec<String>,
    /// Derived from the unlock rules. Serialized for save compatibility
    /// but never trusted on restore; always recomputed.
    pub usable_commands: Vec<String>,
    pub teleport_used: bool,
    pub container_opened: bool,
    /// Learner-adjustable scalars driving the unlock thresholds.
    pub score: f64,
    pub population: f64,
    pub selected_level: Option<LevelId>,
}

impl SessionState {
    /// Fresh state for a level; falls back to the configs' first level
    /// when none is given.
    pub fn initial(level: Option<LevelId>, config: &GameConfig) -> Self {
        let selected_level = level.or_else(|| config.default_level());
        let board = selected_level
            .as_ref()
            .and_then(|id| config.boards.variant(id).ok());
        let position = board.map(BoardVariant::start).unwrap_or(Position::new(0, 0));
        let acquired_heroes = match (&selected_level, board) {
            (Some(level), Some(board)) => seed_heroes(level, board),
            _ => Vec::new(),
        };

        Self {
            program: Program::new(),
            position,
            robot_direction: Direction::Up,
            acquired_heroes,
            usable_commands: Vec::new(),
            teleport_used: false,
            container_opened: false,
            score: 0.0,
            population: DEFAULT_POPULATION,
            selected_level,
        }
    }

    /// Rebuilds a session from its persisted form: known fields
    /// overwrite a fresh state for the same level, anything missing
    /// falls back, and the level's seed heroes are re-unioned so older
    /// saves gain newly introduced seeds.
    pub fn restore(saved: PersistedState, config: &GameConfig) -> Self {
        let level = saved.selected_level.clone().or_else(|| {
            saved
                .selected_program
                .as_deref()
                .map(LevelId::from_legacy_program)
        });
        let mut state = Self::initial(level, config);
        let seeds = state.acquired_heroes.clone();

        if let Some(program) = saved.program {
            state.program = program;
        }
        if let Some(position) = saved.position {
            state.position = position;
        }
        if let Some(direction) = saved.robot_direction {
            state.robot_direction = direction;
        }
        if let Some(heroes) = saved.acquired_heroes {
            state.acquired_heroes = heroes;
        }
        if let Some(usable) = saved.usable_commands {
            state.usable_commands = usable;
        }
        if let Some(used) = saved.teleport_used {
            state.teleport_used = used;
        }
        if let Some(opened) = saved.container_opened {
            state.container_opened = opened;
        }
        if let Some(score) = saved.score {
            state.score = score;
        }
        if let Some(population) = saved.population {
            state.population = population;
        }

        for seed in seeds {
            if !state.acquired_heroes.contains(&seed) {
                state.acquired_heroes.push(seed);
            }
        }
        state
    }

    pub fn has_hero(&self, hero_id: &str) -> bool {
        self.acquired_heroes.iter().any(|id| id == hero_id)
    }

    /// Adds a hero to the team. Returns false when already acquired.
    pub fn acquire_hero(&mut self, hero_id: &str) -> bool {
        if self.has_hero(hero_id) {
            return false;
        }
        self.acquired_heroes.push(hero_id.to_string());
        true
    }

    /// Rewinds the robot to the level's start cell, facing up. Leaves
    /// the state untouched when the board has no start.
    pub fn rehome(&mut self, board: &BoardVariant) {
        let Some(start) = board.grid.start else {
            return;
        };
        self.position = start;
        self.robot_direction = Direction::Up;
    }
}

/// Heroes granted at level start: the pedestal hero plus any planet
/// auto-grant registered for this level.
pub fn seed_heroes(level: &LevelId, board: &BoardVariant) -> Vec<String> {
    let mut seeds = Vec::new();
    if let Some(hero_id) = &board.pedestal_hero {
        seeds.push(hero_id.clone());
    }
    for (level_id, planet_id) in PLANET_AUTOGRANTS {
        if level.as_str() != *level_id {
            continue;
        }
        let granted = board
            .planets
            .iter()
            .find(|planet| planet.id == *planet_id)
            .and_then(|planet| planet.hero_id.clone());
        if let Some(hero_id) = granted {
            if !seeds.contains(&hero_id) {
                seeds.push(hero_id);
            }
        }
    }
    seeds
}

/// Partial on-disk form of [`SessionState`]. Every field is optional so
/// saves written by older builds keep loading; the legacy
/// `selectedProgram` token migrates to a composite level id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub program: Option<Program>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub robot_direction: Option<Direction>,
    #[serde(default)]
    pub acquired_heroes: Option<Vec<String>>,
    #[serde(default)]
    pub usable_commands: Option<Vec<String>>,
    #[serde(default)]
    pub teleport_used: Option<bool>,
    #[serde(default)]
    pub container_opened: Option<bool>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub population: Option<f64>,
    #[serde(default)]
    pub selected_level: Option<LevelId>,
    #[serde(default)]
    pub selected_program: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Grid, Hero, Planet};
    use crate::config::{BoardConfig, CommandConfig};

    fn test_config() -> GameConfig {
        let mut boards = BoardConfig::default();
        boards.variants.insert(
            "winter-j2".to_string(),
            BoardVariant {
                grid: Grid {
                    path: vec![Position::new(1, 1), Position::new(2, 1)],
                    start: Some(Position::new(1, 1)),
                    ..Default::default()
                },
                heroes: vec![Hero {
                    id: "pilot".to_string(),
                    name: "Pilot".to_string(),
                    position: Position::new(2, 1),
                }],
                planets: vec![Planet {
                    id: "earth".to_string(),
                    name: None,
                    position: Position::new(2, 1),
                    hero_id: Some("pilot".to_string()),
                }],
                pedestal_hero: Some("captain".to_string()),
                final_message: None,
            },
        );
        let mut commands = CommandConfig::default();
        commands
            .variants
            .insert("winter-j2".to_string(), Default::default());
        GameConfig::new(boards, commands)
    }

    #[test]
    fn test_initial_state_seeds_pedestal_and_autogrant_heroes() {
        let config = test_config();
        let state = SessionState::initial(Some(LevelId::new("winter-j2")), &config);

        assert_eq!(state.position, Position::new(1, 1));
        assert_eq!(state.robot_direction, Direction::Up);
        assert_eq!(
            state.acquired_heroes,
            vec!["captain".to_string(), "pilot".to_string()]
        );
        assert_eq!(state.score, 0.0);
        assert_eq!(state.population, DEFAULT_POPULATION);
        assert!(!state.teleport_used);
        assert!(!state.container_opened);
    }

    #[test]
    fn test_initial_state_without_level_uses_default() {
        let config = test_config();
        let state = SessionState::initial(None, &config);
        assert_eq!(state.selected_level, Some(LevelId::new("winter-j2")));
    }

    #[test]
    fn test_restore_merges_known_fields_over_fresh_defaults() {
        let config = test_config();
        let saved = PersistedState {
            score: Some(42.0),
            position: Some(Position::new(2, 1)),
            selected_level: Some(LevelId::new("winter-j2")),
            ..Default::default()
        };

        let state = SessionState::restore(saved, &config);
        assert_eq!(state.score, 42.0);
        assert_eq!(state.position, Position::new(2, 1));
        // Missing fields fall back to fresh values.
        assert_eq!(state.population, DEFAULT_POPULATION);
        assert!(state.program.is_empty());
    }

    #[test]
    fn test_restore_reunions_seed_heroes() {
        let config = test_config();
        // An older save from before the pedestal hero existed.
        let saved = PersistedState {
            acquired_heroes: Some(vec!["stray".to_string()]),
            selected_level: Some(LevelId::new("winter-j2")),
            ..Default::default()
        };

        let state = SessionState::restore(saved, &config);
        assert!(state.has_hero("stray"));
        assert!(state.has_hero("captain"));
        assert!(state.has_hero("pilot"));
    }

    #[test]
    fn test_restore_migrates_legacy_program_token() {
        let config = test_config();
        let saved = PersistedState {
            selected_program: Some("J2".to_string()),
            ..Default::default()
        };

        let state = SessionState::restore(saved, &config);
        assert_eq!(state.selected_level, Some(LevelId::new("winter-j2")));
    }

    #[test]
    fn test_acquire_hero_is_idempotent() {
        let config = test_config();
        let mut state = SessionState::initial(Some(LevelId::new("winter-j2")), &config);

        assert!(!state.acquire_hero("captain"));
        assert!(state.acquire_hero("navigator"));
        assert!(!state.acquire_hero("navigator"));
        let count = state
            .acquired_heroes
            .iter()
            .filter(|id| *id == "navigator")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_rehome_without_start_leaves_state_untouched() {
        let config = test_config();
        let mut state = SessionState::initial(Some(LevelId::new("winter-j2")), &config);
        state.position = Position::new(2, 1);
        state.robot_direction = Direction::Right;

        state.rehome(&BoardVariant::default());
        assert_eq!(state.position, Position::new(2, 1));
        assert_eq!(state.robot_direction, Direction::Right);
    }
}
