//! Board geometry: positions, orientations, terrain markers and placements.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A cell on the grid. Raw authoring coordinates may be zero-based or
/// negative; [`GridMetrics`] maps them into a 1-based rectangle for
/// display. The engine itself executes in raw coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Robot orientation. `Up` is the home orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit delta in grid coordinates (y grows downward).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Enumeration order used by the jump interpreter.
    pub fn all() -> [Direction; 4] {
        [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
    }
}

/// A collectible hero placed at a fixed cell, acquired by standing on it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Hero {
    pub id: String,
    pub name: String,
    pub position: Position,
}

/// A waypoint that becomes active once its linked hero joins the team.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub position: Position,
    #[serde(default)]
    pub hero_id: Option<String>,
}

/// Raw grid geometry for one level, as authored.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Grid {
    /// Legally occupiable cells. May contain duplicates as authored;
    /// deduplicated on use.
    #[serde(default)]
    pub path: Vec<Position>,
    #[serde(default)]
    pub start: Option<Position>,
    /// Fallback dimensions for variants that reference no positions.
    #[serde(default)]
    pub columns: Option<u32>,
    #[serde(default)]
    pub rows: Option<u32>,
    /// Blocks entry outright; enables the jump-over rule.
    #[serde(default)]
    pub obstacle: Option<Position>,
    /// One-time-use pad; engaging it sets a sticky session flag.
    #[serde(default)]
    pub teleport: Option<Position>,
    /// Must be stood on for the storage command to signal.
    #[serde(default)]
    pub storage: Option<Position>,
    /// Must be stood on to trigger the terminal "opened" event.
    #[serde(default)]
    pub container: Option<Position>,
}

/// One level's static geometry plus collectible placements.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardVariant {
    #[serde(default)]
    pub grid: Grid,
    #[serde(default)]
    pub heroes: Vec<Hero>,
    #[serde(default)]
    pub planets: Vec<Planet>,
    /// Hero that starts on the pedestal, pre-acquired at level start.
    #[serde(default)]
    pub pedestal_hero: Option<String>,
    /// Finale text shown when the container opens. Falls back to the
    /// crate default when absent.
    #[serde(default)]
    pub final_message: Option<String>,
}

/// Minimal bounding rectangle over every position a variant references,
/// with the offsets that map raw coordinates into a 1-based grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridMetrics {
    pub columns: u32,
    pub rows: u32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl GridMetrics {
    /// Shifts a raw position into the normalized 1-based rectangle.
    pub fn normalize(&self, position: Position) -> Position {
        Position::new(position.x + self.offset_x, position.y + self.offset_y)
    }
}

impl BoardVariant {
    /// Recomputes the bounding rectangle from the raw level data. Pure
    /// and deterministic; never persisted, so stale geometry cannot
    /// survive level-data edits between sessions.
    pub fn metrics(&self) -> GridMetrics {
        let mut points: Vec<Position> = Vec::new();
        points.extend(self.grid.path.iter().copied());
        points.extend(self.grid.start);
        points.extend(self.grid.obstacle);
        points.extend(self.grid.teleport);
        points.extend(self.grid.storage);
        points.extend(self.grid.container);
        points.extend(self.planets.iter().map(|planet| planet.position));
        points.extend(self.heroes.iter().map(|hero| hero.position));

        if points.is_empty() {
            return GridMetrics {
                columns: self.grid.columns.unwrap_or(1).max(1),
                rows: self.grid.rows.unwrap_or(1).max(1),
                offset_x: 0,
                offset_y: 0,
            };
        }

        let mut min_x = i32::MAX;
        let mut max_x = i32::MIN;
        let mut min_y = i32::MAX;
        let mut max_y = i32::MIN;
        for point in &points {
            min_x = min_x.min(point.x);
            max_x = max_x.max(point.x);
            min_y = min_y.min(point.y);
            max_y = max_y.max(point.y);
        }

        GridMetrics {
            columns: (max_x - min_x + 1) as u32,
            rows: (max_y - min_y + 1) as u32,
            offset_x: 1 - min_x,
            offset_y: 1 - min_y,
        }
    }

    /// Whether a raw position is a legally occupiable path cell.
    pub fn is_path(&self, position: Position) -> bool {
        self.grid.path.iter().any(|cell| *cell == position)
    }

    /// The initial occupied cell; zero fallback when the variant has no
    /// start. The engine treats it as occupiable regardless of `path`
    /// membership.
    pub fn start(&self) -> Position {
        self.grid.start.unwrap_or(Position::new(0, 0))
    }

    /// Path cells with duplicates removed, first occurrence order.
    pub fn path_cells(&self) -> Vec<Position> {
        let mut seen = HashSet::new();
        self.grid
            .path
            .iter()
            .copied()
            .filter(|cell| seen.insert(*cell))
            .collect()
    }

    pub fn hero_at(&self, position: Position) -> Option<&Hero> {
        self.heroes.iter().find(|hero| hero.position == position)
    }

    pub fn hero(&self, id: &str) -> Option<&Hero> {
        self.heroes.iter().find(|hero| hero.id == id)
    }

    pub fn planet(&self, id: &str) -> Option<&Planet> {
        self.planets.iter().find(|planet| planet.id == id)
    }
}
