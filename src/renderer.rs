//! Rendering contracts for presentation collaborators.
//!
//! The engine emits no pixels; collaborators pull a [`SessionView`] and
//! render it however they like. The text renderer here doubles as the
//! debugging / headless surface.

use crate::board::{BoardVariant, Direction, Position};
use crate::session::SessionView;

/// Trait for rendering a session view to various formats.
pub trait Renderer {
    type Output;
    type Error;

    fn render(&self, view: &SessionView) -> Result<Self::Output, Self::Error>;
}

/// Text-based renderer for headless drivers and debugging.
pub struct TextRenderer {
    /// Include the program listing
    pub show_program: bool,
    /// Include the acquired-heroes lineup
    pub show_team: bool,
    /// Include the command costs list
    pub show_costs: bool,
    /// Include the glyph legend
    pub show_legend: bool,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            show_program: true,
            show_team: true,
            show_costs: true,
            show_legend: true,
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn minimal() -> Self {
        Self {
            show_program: false,
            show_team: false,
            show_costs: false,
            show_legend: false,
        }
    }

    fn robot_glyph(direction: Direction) -> char {
        match direction {
            Direction::Up => '^',
            Direction::Down => 'v',
            Direction::Left => '<',
            Direction::Right => '>',
        }
    }

    /// Renders the board as a normalized 1-based grid of glyphs.
    fn render_board(&self, board: &BoardVariant, view: &SessionView) -> String {
        let metrics = board.metrics();
        let columns = metrics.columns as usize;
        let rows = metrics.rows as usize;
        let mut cells = vec![vec![' '; columns]; rows];

        let mut put = |position: Position, glyph: char| {
            let normalized = metrics.normalize(position);
            let x = normalized.x - 1;
            let y = normalized.y - 1;
            if (0..columns as i32).contains(&x) && (0..rows as i32).contains(&y) {
                cells[y as usize][x as usize] = glyph;
            }
        };

        for cell in board.path_cells() {
            put(cell, '.');
        }
        for planet in &board.planets {
            let active = planet
                .hero_id
                .as_deref()
                .is_some_and(|hero_id| view.state.has_hero(hero_id));
            put(planet.position, if active { 'O' } else { 'o' });
        }
        if let Some(obstacle) = board.grid.obstacle {
            put(obstacle, '#');
        }
        if let Some(teleport) = board.grid.teleport {
            put(teleport, '*');
        }
        if let Some(storage) = board.grid.storage {
            put(storage, 'S');
        }
        if let Some(container) = board.grid.container {
            put(container, 'C');
        }
        for hero in &board.heroes {
            let acquired = view.state.has_hero(&hero.id);
            put(hero.position, if acquired { 'h' } else { 'H' });
        }
        put(view.state.position, Self::robot_glyph(view.state.robot_direction));

        cells
            .into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Renderer for TextRenderer {
    type Output = String;
    type Error = std::convert::Infallible;

    fn render(&self, view: &SessionView) -> Result<String, Self::Error> {
        let mut output = String::new();
        let state = &view.state;

        let level = state
            .selected_level
            .as_ref()
            .map(|level| level.to_string())
            .unwrap_or_else(|| "none".to_string());
        output.push_str(&format!(
            "Level: {} | Score: {} | Population: {}\n",
            level, state.score, state.population
        ));
        output.push_str(&format!(
            "Position: ({}, {}) | Facing: {:?}{}\n",
            state.position.x,
            state.position.y,
            state.robot_direction,
            if view.running { " [RUNNING]" } else { "" }
        ));
        output.push('\n');

        if let Some(board) = &view.board {
            output.push_str("=== BOARD ===\n");
            output.push_str(&self.render_board(board, view));
            output.push_str("\n\n");
        }

        if self.show_program {
            output.push_str("=== PROGRAM ===\n");
            for (index, id) in state.program.iter().enumerate() {
                let label = view
                    .catalog
                    .iter()
                    .find(|command| command.id == id)
                    .map(|command| command.label.as_str())
                    .unwrap_or(id);
                let marker = if view.running && index == view.cursor {
                    ">"
                } else {
                    " "
                };
                output.push_str(&format!("{} {}. {}\n", marker, index + 1, label));
            }
            output.push('\n');
        }

        if self.show_team {
            output.push_str("=== TEAM ===\n");
            for hero_id in &state.acquired_heroes {
                output.push_str(&format!("  {}\n", hero_id));
            }
            output.push('\n');
        }

        if self.show_costs && !view.command_costs.is_empty() {
            output.push_str("=== COSTS ===\n");
            for line in &view.command_costs {
                output.push_str(&format!("  {} - {}\n", line.label, line.cost));
            }
            output.push('\n');
        }

        output.push_str("=== COMMANDS ===\n");
        for command in &view.catalog {
            let usable = state.usable_commands.iter().any(|id| *id == command.id);
            output.push_str(&format!(
                "  {} [{}]\n",
                command.id,
                if usable { "usable" } else { "locked" }
            ));
        }
        output.push('\n');

        if state.container_opened {
            output.push_str("=== FINALE ===\n");
            output.push_str(&view.final_message);
            output.push('\n');
        }

        if self.show_legend {
            output.push_str("=== LEGEND ===\n");
            output.push_str("Terrain: . path  # obstacle  * teleport  S storage  C container\n");
            output.push_str("Pieces: ^v<> robot  H/h hero  o/O planet (O = active)\n");
        }

        Ok(output)
    }
}

/// JSON renderer for structured output.
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    type Output = String;
    type Error = serde_json::Error;

    fn render(&self, view: &SessionView) -> Result<String, Self::Error> {
        serde_json::to_string_pretty(view)
    }
}

/// Compact JSON renderer (no pretty printing).
pub struct CompactJsonRenderer;

impl Renderer for CompactJsonRenderer {
    type Output = String;
    type Error = serde_json::Error;

    fn render(&self, view: &SessionView) -> Result<String, Self::Error> {
        serde_json::to_string(view)
    }
}
