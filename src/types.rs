//! # SIMBOT Types Module
//!
//! Core data types of the SIMBOT (Simulation de Robot d'Entrepôt Autonome)
//! warehouse simulation. These types are shared by every layer of the crate,
//! from the pathfinder up to the terminal display.
//!
//! ## Key Components
//!
//! - **CellKind**: the five kinds of grid cells loaded from the map file
//! - **ItemType**: the two item families scattered on the floor
//! - **Mode**: manual / semi-automatic / fully-automatic operation
//! - **Command**: discrete intents injected by the input layer
//!
//! All types are serializable so the presentation layer can consume
//! snapshots of the simulation state.

use serde::{Deserialize, Serialize};

/// NOTE - Enum for all possible cell kinds on the map
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Free,      // NOTE - Traversable floor tile, may hold items
    Obstacle,  // NOTE - Impassable tile
    Start,     // NOTE - Robot spawn tile (exactly one per map)
    Warehouse, // NOTE - Delivery tile
    Recharge,  // NOTE - Recharge station tile
}

/// NOTE - Enum for the two item families
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    A,
    B,
}

/// NOTE - Enum for robot operating modes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Manual,   // NOTE - Keyboard-driven only
    SemiAuto, // NOTE - One planned action, then back to Manual
    FullAuto, // NOTE - Continuous autonomous operation
}

/// NOTE - Enum for the overall game state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Victory,  // NOTE - Every item collected and delivered
    GameOver, // NOTE - Battery exhausted with undelivered items
}

/// The four orthogonal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Grid delta for this direction, `(dx, dy)` with y growing southward.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }
}

/// Integer grid coordinate. Used both for the robot location and for
/// item / station targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Manhattan distance, the admissible heuristic of the pathfinder.
    pub fn manhattan(self, other: Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Direction from `self` to an orthogonally adjacent position,
    /// `None` if the two positions are not exactly one step apart.
    pub fn direction_to(self, other: Position) -> Option<Direction> {
        let dx = other.x as isize - self.x as isize;
        let dy = other.y as isize - self.y as isize;
        match (dx, dy) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }
}

/// High-level action selected by the planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlannedAction {
    Collect(Position),
    Deliver(Position),
    Recharge(Position),
}

impl PlannedAction {
    pub fn target(self) -> Position {
        match self {
            PlannedAction::Collect(p) | PlannedAction::Deliver(p) | PlannedAction::Recharge(p) => p,
        }
    }

    /// Short label for the status display.
    pub fn label(self) -> &'static str {
        match self {
            PlannedAction::Collect(_) => "Collecte",
            PlannedAction::Deliver(_) => "Livraison",
            PlannedAction::Recharge(_) => "Recharge",
        }
    }
}

/// Discrete input intent, delivered at most once per tick by the UI layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    /// Collect the item in slot 1 or 2 of the current cell.
    Collect(u8),
    ToggleFullAuto,
    ToggleSemiAuto,
    Reset,
}

// === Configuration constants of the simulation core ===

/// Battery drained by one successful grid move, in percent.
pub const MOVE_BATTERY_COST: f32 = 2.0;

/// Time the robot must stay still on a station before the timed action
/// (recharge or delivery) starts.
pub const STATION_DWELL_MS: u64 = 3_000;

/// Duration of a full 0% -> 100% recharge. Partial recharges scale linearly.
pub const FULL_RECHARGE_MS: u64 = 60_000;

/// One inventory item is delivered every interval while on a warehouse.
pub const DELIVERY_INTERVAL_MS: u64 = 1_000;

/// Maximum number of items the robot can carry.
pub const ROBOT_CAPACITY: usize = 3;

/// Maximum number of items placed on a single free cell at world creation.
pub const MAX_ITEMS_PER_CELL: usize = 2;

/// Probability that a free cell receives items at world creation.
pub const ITEM_FILL_CHANCE: f64 = 0.4;

/// Extra battery buffer added to the dynamic charge target.
pub const CHARGE_SAFETY_MARGIN: f32 = 15.0;

/// Extra battery buffer required before committing to one more collection.
pub const COLLECT_SAFETY_MARGIN: f32 = 10.0;

/// Below this battery level the planner forces a recharge attempt.
pub const LOW_BATTERY_THRESHOLD: f32 = 20.0;

/// Floor of the dynamic charge target in fully-automatic mode.
pub const MIN_CHARGE_TARGET: f32 = 30.0;

/// Pause between two automatic actions in fully-automatic mode.
pub const INTER_ACTION_PAUSE_MS: u64 = 300;

/// Validity window of the cached dynamic charge target.
pub const TARGET_CACHE_VALIDITY_MS: u64 = 1_000;

/// Simulation tick interval (30 Hz).
pub const TICK_INTERVAL_MS: u64 = 33;

/// Animated position progress per tick, in cell units.
pub const ANIMATION_STEP: f32 = 0.05;

/// Animated and grid positions closer than this are considered settled.
pub const ANIMATION_SETTLE_EPS: f32 = 0.01;
