//! The execution engine: interprets the program buffer against the
//! board, one command at a time, mutating the session state and
//! emitting side-effect events for collaborators to render.

use crate::board::{BoardVariant, Direction, Position};
use crate::command::{Command, CommandDef};
use crate::config::GameConfig;
use crate::error::{Error, Result};
use crate::level::LevelId;
use crate::pacer::StepPacer;
use crate::persist::SessionStore;
use crate::state::SessionState;
use crate::unlock::VariantRules;
use serde::Serialize;
use tracing::{debug, warn};

/// Finale text when the board variant carries none of its own.
pub const DEFAULT_FINAL_MESSAGE: &str =
    "The container is open - the crew is ready for the final mission.";

/// Run-state of the engine. A run is entered only from `Idle` and only
/// with a non-empty program; it always returns to `Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

/// Side effects collaborators may render. Per-command precondition
/// failures produce no event at all.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    Moved {
        to: Position,
        direction: Direction,
    },
    Jumped {
        to: Position,
        direction: Direction,
    },
    HeroAcquired {
        hero_id: String,
    },
    PlanetActivated {
        planet_id: String,
    },
    /// Advisory only; the storage command mutates nothing.
    StorageOpened,
    TeleportEngaged,
    /// The terminal finale signal.
    ContainerOpened {
        message: String,
    },
}

/// Display line for the costs list: label plus the score price at the
/// current population size.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandCostLine {
    pub id: String,
    pub label: String,
    pub cost: f64,
}

/// Snapshot handed to presentation collaborators after every mutation:
/// the full board, the full session state and the derived command data.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub state: SessionState,
    pub board: Option<BoardVariant>,
    pub catalog: Vec<CommandDef>,
    pub command_costs: Vec<CommandCostLine>,
    pub cursor: usize,
    pub running: bool,
    pub final_message: String,
}

/// A single learner's session: the immutable configs, the mutable
/// state, the run cursor and the store that receives every mutation.
pub struct Session {
    config: GameConfig,
    store: Box<dyn SessionStore>,
    state: SessionState,
    cursor: usize,
    run_state: RunState,
}

impl Session {
    /// Builds a session, restoring state from the store when a save
    /// exists. An unreadable store starts fresh; a selected level
    /// missing from either config fails closed to no-level-selected.
    pub fn new(config: GameConfig, store: Box<dyn SessionStore>) -> Self {
        let state = match store.load() {
            Ok(Some(saved)) => SessionState::restore(saved, &config),
            Ok(None) => SessionState::initial(None, &config),
            Err(err) => {
                warn!(error = %err, "session store unreadable, starting fresh");
                SessionState::initial(None, &config)
            }
        };

        let mut session = Self {
            config,
            store,
            state,
            cursor: 0,
            run_state: RunState::Idle,
        };
        session.validate_selected_level();
        session.refresh_usable_commands();
        session.persist();
        session
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Board of the selected level, if any.
    pub fn board(&self) -> Option<&BoardVariant> {
        self.selected_board()
    }

    /// Command catalog of the selected level, authoring order.
    pub fn command_catalog(&self) -> &[CommandDef] {
        self.selected_rules()
            .map(|rules| rules.commands.as_slice())
            .unwrap_or_default()
    }

    /// Resolves a season + program selection to a playable level id;
    /// unresolvable selections fail closed.
    pub fn resolve_level(&self, season: &str, program: &str) -> Result<LevelId> {
        let level = LevelId::compose(season, program);
        if self.config.is_valid_level(&level) {
            Ok(level)
        } else {
            Err(Error::LevelNotFound(level.to_string()))
        }
    }

    /// Switches to a level, keeping the learner's score and population.
    pub fn select_level(&mut self, level: LevelId) -> Result<()> {
        if !self.config.is_valid_level(&level) {
            return Err(Error::LevelNotFound(level.to_string()));
        }
        let score = self.state.score;
        let population = self.state.population;
        self.state = SessionState::initial(Some(level), &self.config);
        self.state.score = score;
        self.state.population = population;
        self.cursor = 0;
        self.run_state = RunState::Idle;
        self.refresh_usable_commands();
        self.persist();
        Ok(())
    }

    /// Discards all progress for the current level, score included.
    pub fn reset(&mut self) {
        self.state = SessionState::initial(self.state.selected_level.clone(), &self.config);
        self.cursor = 0;
        self.run_state = RunState::Idle;
        self.refresh_usable_commands();
        self.persist();
    }

    /// Updates the learner's score and re-derives usable commands.
    pub fn set_score(&mut self, score: f64) {
        self.state.score = score;
        self.refresh_usable_commands();
        self.persist();
    }

    /// Updates the population size and re-derives usable commands.
    pub fn set_population(&mut self, population: f64) {
        self.state.population = population;
        self.refresh_usable_commands();
        self.persist();
    }

    /// Appends a command to the program. Usability is the caller's
    /// gate; the buffer accepts any id.
    pub fn push_command(&mut self, command_id: impl Into<String>) {
        self.state.program.push(command_id);
        self.rewind();
        self.persist();
    }

    /// Drops the most recently appended command. No-op when empty.
    pub fn remove_last_command(&mut self) {
        if self.state.program.pop_last().is_none() {
            return;
        }
        self.rewind();
        self.persist();
    }

    pub fn clear_program(&mut self) {
        self.state.program.clear();
        self.rewind();
        self.persist();
    }

    /// Executes exactly one command at the cursor, advancing it by one.
    /// A cursor at or past the end wraps to the start of the program
    /// without re-homing the robot.
    pub fn step(&mut self) -> Vec<SessionEvent> {
        if self.state.program.is_empty() {
            return Vec::new();
        }
        if self.cursor >= self.state.program.len() {
            self.cursor = 0;
        }
        let command_id = self.state.program.get(self.cursor).map(str::to_string);
        let events = match command_id {
            Some(id) => self.execute_command(&id),
            None => Vec::new(),
        };
        self.cursor += 1;
        events
    }

    /// Runs the whole program from the start cell, one command fully
    /// resolved before the next begins. Rejected while a run is in
    /// progress or when the buffer is empty. The pacer sets the gap
    /// between commands and may cancel the remainder; effects already
    /// applied are never rolled back.
    pub fn run(&mut self, pacer: &mut dyn StepPacer) -> Result<Vec<SessionEvent>> {
        if self.run_state == RunState::Running {
            return Err(Error::RunInProgress);
        }
        if self.state.program.is_empty() {
            return Err(Error::EmptyProgram);
        }

        self.rewind();
        self.persist();
        self.run_state = RunState::Running;

        let mut events = Vec::new();
        for index in 0..self.state.program.len() {
            self.cursor = index;
            if let Some(id) = self.state.program.get(index).map(str::to_string) {
                events.extend(self.execute_command(&id));
            }
            if !pacer.pause() {
                debug!(cursor = index, "run cancelled by pacer");
                break;
            }
        }

        self.run_state = RunState::Idle;
        self.cursor = 0;
        Ok(events)
    }

    /// Snapshot for rendering collaborators.
    pub fn view(&self) -> SessionView {
        let board = self.selected_board().cloned();
        let rules = self.selected_rules();
        let catalog = rules
            .map(|rules| rules.commands.clone())
            .unwrap_or_default();
        let command_costs = rules
            .map(|rules| {
                rules
                    .commands
                    .iter()
                    .map(|command| CommandCostLine {
                        id: command.id.clone(),
                        label: command.label.clone(),
                        cost: rules.command_cost(&command.id) * self.state.population,
                    })
                    .collect()
            })
            .unwrap_or_default();
        let final_message = board
            .as_ref()
            .and_then(|board| board.final_message.clone())
            .unwrap_or_else(|| DEFAULT_FINAL_MESSAGE.to_string());

        SessionView {
            state: self.state.clone(),
            board,
            catalog,
            command_costs,
            cursor: self.cursor,
            running: self.run_state == RunState::Running,
            final_message,
        }
    }

    fn selected_board(&self) -> Option<&BoardVariant> {
        let level = self.state.selected_level.as_ref()?;
        self.config.boards.variant(level).ok()
    }

    fn selected_rules(&self) -> Option<&VariantRules> {
        let level = self.state.selected_level.as_ref()?;
        self.config.commands.variant(level).ok()
    }

    /// Re-derives the usable command set from the unlock rules. Invoked
    /// after every score, population or level change.
    fn refresh_usable_commands(&mut self) {
        self.state.usable_commands = self
            .selected_rules()
            .map(|rules| rules.usable_commands(self.state.score, self.state.population))
            .unwrap_or_default();
    }

    /// Rewinds the run cursor and re-homes the robot. Every program
    /// mutation goes through here.
    fn rewind(&mut self) {
        self.cursor = 0;
        self.run_state = RunState::Idle;
        if let Some(level) = self.state.selected_level.clone() {
            if let Ok(board) = self.config.boards.variant(&level) {
                self.state.rehome(board);
            }
        }
    }

    fn execute_command(&mut self, command_id: &str) -> Vec<SessionEvent> {
        let Some(level) = self.state.selected_level.clone() else {
            return Vec::new();
        };
        let Ok(board) = self.config.boards.variant(&level) else {
            return Vec::new();
        };
        let events = interpret(command_id, board, &mut self.state);
        if !events.is_empty() {
            self.persist();
        }
        events
    }

    /// A selected level missing from either config fails closed to the
    /// no-level-selected state, keeping the learner's score and
    /// population.
    fn validate_selected_level(&mut self) {
        let Some(level) = self.state.selected_level.clone() else {
            return;
        };
        if self.config.is_valid_level(&level) {
            return;
        }
        warn!(level = %level, "selected level absent from configuration");
        let score = self.state.score;
        let population = self.state.population;
        self.state = SessionState::initial(None, &self.config);
        self.state.score = score;
        self.state.population = population;
        self.state.selected_level = None;
    }

    /// Fire-and-forget write-through; loss of durability is absorbed.
    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.state) {
            warn!(error = %err, "failed to persist session state");
        }
    }
}

/// Applies one command's effect. Unknown ids and unmet preconditions
/// degrade to no-ops; the run never aborts.
fn interpret(
    command_id: &str,
    board: &BoardVariant,
    state: &mut SessionState,
) -> Vec<SessionEvent> {
    let Some(command) = Command::from_id(command_id) else {
        debug!(command = command_id, "ignoring unrecognized command id");
        return Vec::new();
    };

    let mut events = Vec::new();
    match command {
        Command::MoveUp | Command::MoveDown | Command::MoveLeft | Command::MoveRight => {
            if let Some(direction) = command.movement() {
                process_move(direction, board, state, &mut events);
            }
        }
        Command::Jump => process_jump(board, state, &mut events),
        Command::Recruit => process_recruit(board, state, &mut events),
        Command::OpenStorage => {
            if board.grid.storage == Some(state.position) {
                events.push(SessionEvent::StorageOpened);
            }
        }
        Command::Teleport => {
            if board.grid.teleport == Some(state.position) {
                // Sticky: never clears once set.
                state.teleport_used = true;
                events.push(SessionEvent::TeleportEngaged);
            }
        }
        Command::OpenContainer => {
            if board.grid.container == Some(state.position) {
                state.container_opened = true;
                let message = board
                    .final_message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FINAL_MESSAGE.to_string());
                events.push(SessionEvent::ContainerOpened { message });
            }
        }
    }
    events
}

fn process_move(
    direction: Direction,
    board: &BoardVariant,
    state: &mut SessionState,
    events: &mut Vec<SessionEvent>,
) {
    let (dx, dy) = direction.delta();
    let candidate = state.position.offset(dx, dy);

    // The obstacle blocks entry outright, even when its cell is on the
    // path.
    if board.grid.obstacle == Some(candidate) {
        debug!(x = candidate.x, y = candidate.y, "move blocked by obstacle");
        return;
    }
    if board.is_path(candidate) {
        state.robot_direction = direction;
        state.position = candidate;
        events.push(SessionEvent::Moved {
            to: candidate,
            direction,
        });
    }
}

/// Examines all four directions from the pre-jump cell. Every direction
/// with the obstacle adjacent and a legal landing two cells out is
/// applied in enumeration order, so the final landing reflects the last
/// qualifying direction.
fn process_jump(board: &BoardVariant, state: &mut SessionState, events: &mut Vec<SessionEvent>) {
    let origin = state.position;
    for direction in Direction::all() {
        let (dx, dy) = direction.delta();
        let over = origin.offset(dx, dy);
        let landing = origin.offset(dx * 2, dy * 2);
        if board.grid.obstacle == Some(over) && board.is_path(landing) {
            state.robot_direction = direction;
            state.position = landing;
            events.push(SessionEvent::Jumped {
                to: landing,
                direction,
            });
        }
    }
}

fn process_recruit(
    board: &BoardVariant,
    state: &mut SessionState,
    events: &mut Vec<SessionEvent>,
) {
    let Some(hero) = board.hero_at(state.position) else {
        return;
    };
    if !state.acquire_hero(&hero.id) {
        return;
    }
    events.push(SessionEvent::HeroAcquired {
        hero_id: hero.id.clone(),
    });
    for planet in &board.planets {
        if planet.hero_id.as_deref() == Some(hero.id.as_str()) {
            events.push(SessionEvent::PlanetActivated {
                planet_id: planet.id.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Grid, Hero};
    use crate::config::{BoardConfig, CommandConfig};
    use crate::pacer::InstantPacer;
    use crate::persist::MemoryStore;

    fn corridor_board() -> BoardVariant {
        BoardVariant {
            grid: Grid {
                path: vec![
                    Position::new(1, 1),
                    Position::new(2, 1),
                    Position::new(3, 1),
                ],
                start: Some(Position::new(1, 1)),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn session_with_board(board: BoardVariant) -> Session {
        let mut boards = BoardConfig::default();
        boards.variants.insert("winter-j2".to_string(), board);
        let mut commands = CommandConfig::default();
        commands
            .variants
            .insert("winter-j2".to_string(), Default::default());
        Session::new(
            GameConfig::new(boards, commands),
            Box::new(MemoryStore::new()),
        )
    }

    #[test]
    fn test_run_walks_the_corridor() {
        let mut session = session_with_board(corridor_board());
        session.push_command("right");
        session.push_command("right");

        let events = session.run(&mut InstantPacer).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(session.state().position, Position::new(3, 1));
        assert_eq!(session.state().robot_direction, Direction::Right);
        assert_eq!(session.run_state(), RunState::Idle);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn test_run_rejects_empty_program() {
        let mut session = session_with_board(corridor_board());
        assert!(matches!(
            session.run(&mut InstantPacer),
            Err(Error::EmptyProgram)
        ));
    }

    #[test]
    fn test_run_rehomes_before_executing() {
        let mut session = session_with_board(corridor_board());
        session.push_command("right");
        session.run(&mut InstantPacer).unwrap();
        assert_eq!(session.state().position, Position::new(2, 1));

        // A second run starts from the start cell again.
        session.run(&mut InstantPacer).unwrap();
        assert_eq!(session.state().position, Position::new(2, 1));
    }

    #[test]
    fn test_step_wraps_without_rehoming() {
        let mut session = session_with_board(corridor_board());
        session.push_command("right");

        session.step();
        assert_eq!(session.state().position, Position::new(2, 1));
        assert_eq!(session.cursor(), 1);

        // Cursor wraps to the program start; the robot keeps walking
        // from where it stands.
        session.step();
        assert_eq!(session.state().position, Position::new(3, 1));
        assert_eq!(session.cursor(), 1);
    }

    #[test]
    fn test_step_with_empty_program_is_noop() {
        let mut session = session_with_board(corridor_board());
        assert!(session.step().is_empty());
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn test_illegal_move_is_silently_ignored() {
        let mut session = session_with_board(corridor_board());
        session.push_command("up");

        let events = session.step();
        assert!(events.is_empty());
        assert_eq!(session.state().position, Position::new(1, 1));
        assert_eq!(session.state().robot_direction, Direction::Up);
    }

    #[test]
    fn test_obstacle_blocks_entry_even_on_path() {
        let mut board = corridor_board();
        board.grid.obstacle = Some(Position::new(2, 1));
        let mut session = session_with_board(board);
        session.push_command("right");

        assert!(session.step().is_empty());
        assert_eq!(session.state().position, Position::new(1, 1));
    }

    #[test]
    fn test_jump_clears_the_obstacle() {
        let mut board = corridor_board();
        board.grid.obstacle = Some(Position::new(2, 1));
        let mut session = session_with_board(board);
        session.push_command("jump");

        let events = session.step();
        assert_eq!(
            events,
            vec![SessionEvent::Jumped {
                to: Position::new(3, 1),
                direction: Direction::Right,
            }]
        );
        assert_eq!(session.state().position, Position::new(3, 1));
        assert_eq!(session.state().robot_direction, Direction::Right);
    }

    #[test]
    fn test_jump_without_landing_is_noop() {
        let mut board = corridor_board();
        // Obstacle at the corridor's end; no landing cell beyond it.
        board.grid.obstacle = Some(Position::new(2, 1));
        board.grid.path = vec![Position::new(1, 1), Position::new(2, 1)];
        let mut session = session_with_board(board);
        session.push_command("jump");

        assert!(session.step().is_empty());
        assert_eq!(session.state().position, Position::new(1, 1));
    }

    #[test]
    fn test_recruit_acquires_hero_once_and_activates_planet() {
        let mut board = corridor_board();
        board.heroes.push(Hero {
            id: "pilot".to_string(),
            name: "Pilot".to_string(),
            position: Position::new(1, 1),
        });
        board.planets.push(crate::board::Planet {
            id: "earth".to_string(),
            name: None,
            position: Position::new(3, 1),
            hero_id: Some("pilot".to_string()),
        });
        let mut session = session_with_board(board);
        session.push_command("recruit");
        session.push_command("recruit");

        let first = session.step();
        assert_eq!(
            first,
            vec![
                SessionEvent::HeroAcquired {
                    hero_id: "pilot".to_string()
                },
                SessionEvent::PlanetActivated {
                    planet_id: "earth".to_string()
                },
            ]
        );

        // Second acquire at the same cell changes nothing.
        assert!(session.step().is_empty());
        assert_eq!(
            session
                .state()
                .acquired_heroes
                .iter()
                .filter(|id| *id == "pilot")
                .count(),
            1
        );
    }

    #[test]
    fn test_storage_signals_without_mutating() {
        let mut board = corridor_board();
        board.grid.storage = Some(Position::new(1, 1));
        let mut session = session_with_board(board);
        session.push_command("storage");

        let before = session.state().clone();
        let events = session.step();
        assert_eq!(events, vec![SessionEvent::StorageOpened]);
        assert_eq!(session.state().position, before.position);
        assert_eq!(session.state().teleport_used, before.teleport_used);
        assert_eq!(session.state().container_opened, before.container_opened);
    }

    #[test]
    fn test_teleport_flag_is_sticky() {
        let mut board = corridor_board();
        board.grid.teleport = Some(Position::new(1, 1));
        let mut session = session_with_board(board);
        session.push_command("teleport");
        session.push_command("teleport");

        session.step();
        assert!(session.state().teleport_used);
        session.step();
        assert!(session.state().teleport_used);
    }

    #[test]
    fn test_container_opens_with_default_message() {
        let mut board = corridor_board();
        board.grid.container = Some(Position::new(1, 1));
        let mut session = session_with_board(board);
        session.push_command("container");
        session.push_command("container");

        let events = session.step();
        assert_eq!(
            events,
            vec![SessionEvent::ContainerOpened {
                message: DEFAULT_FINAL_MESSAGE.to_string()
            }]
        );
        assert!(session.state().container_opened);

        // Opening again is idempotent; the flag never flips back.
        session.step();
        assert!(session.state().container_opened);
    }

    #[test]
    fn test_container_uses_board_final_message() {
        let mut board = corridor_board();
        board.grid.container = Some(Position::new(1, 1));
        board.final_message = Some("The vault yields.".to_string());
        let mut session = session_with_board(board);
        session.push_command("container");

        let events = session.step();
        assert_eq!(
            events,
            vec![SessionEvent::ContainerOpened {
                message: "The vault yields.".to_string()
            }]
        );
    }

    #[test]
    fn test_unknown_command_is_noop() {
        let mut session = session_with_board(corridor_board());
        session.push_command("warp");

        assert!(session.step().is_empty());
        assert_eq!(session.state().position, Position::new(1, 1));
    }

    #[test]
    fn test_buffer_mutation_rewinds_the_robot() {
        let mut session = session_with_board(corridor_board());
        session.push_command("right");
        session.step();
        assert_eq!(session.state().position, Position::new(2, 1));

        session.push_command("right");
        assert_eq!(session.state().position, Position::new(1, 1));
        assert_eq!(session.state().robot_direction, Direction::Up);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn test_remove_last_on_empty_buffer_changes_nothing() {
        let mut session = session_with_board(corridor_board());
        session.push_command("right");
        session.step();
        session.clear_program();
        let position = session.state().position;

        session.remove_last_command();
        assert_eq!(session.state().position, position);
        assert!(session.state().program.is_empty());
    }

    #[test]
    fn test_cancelled_run_keeps_applied_effects() {
        struct CancelAfterFirst(u32);
        impl StepPacer for CancelAfterFirst {
            fn pause(&mut self) -> bool {
                self.0 += 1;
                self.0 < 1
            }
        }

        let mut session = session_with_board(corridor_board());
        session.push_command("right");
        session.push_command("right");

        let events = session.run(&mut CancelAfterFirst(0)).unwrap();
        // The first command ran and stays applied; the rest never ran.
        assert_eq!(events.len(), 1);
        assert_eq!(session.state().position, Position::new(2, 1));
        assert_eq!(session.run_state(), RunState::Idle);
        assert_eq!(session.cursor(), 0);
    }
}
