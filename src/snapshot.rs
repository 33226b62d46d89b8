//! # Output State Module
//!
//! Serializable views of the simulation state for the presentation
//! layer. The core never renders anything itself: once per tick a
//! [`SimulationSnapshot`] is assembled and handed to whatever consumes
//! it (the bundled terminal display, a log file, a future remote
//! viewer).
//!
//! ## Data Structures
//!
//! All snapshot types are plain serde structs carrying everything the
//! UI needs:
//! - The static floor plan and the items still on it
//! - Robot position (grid and animated), battery, inventory
//! - Station countdowns, operating mode, current action label
//! - Mission counters and the terminal game-state flag

use crate::simulation::Simulation;
use crate::types::{CellKind, GameStatus, ItemType, Mode, Position};
use serde::{Deserialize, Serialize};

/// Items lying on one cell. Only non-empty cells are listed.
#[derive(Serialize, Deserialize, Clone)]
pub struct CellItems {
    pub pos: Position,
    pub items: Vec<ItemType>,
}

/// Robot status as shown by the UI.
#[derive(Serialize, Deserialize, Clone)]
pub struct RobotSnapshot {
    pub x: usize,
    pub y: usize,
    /// Animated position in cell units, for smooth rendering.
    pub anim_x: f32,
    pub anim_y: f32,
    /// Battery level, 0 to 100.
    pub battery: f32,
    /// Carried items in delivery (FIFO) order.
    pub inventory: Vec<ItemType>,
}

/// Complete per-tick view of the simulation.
#[derive(Serialize, Deserialize, Clone)]
pub struct SimulationSnapshot {
    pub width: usize,
    pub height: usize,
    /// Row-major cell kinds, `cells[y][x]`.
    pub cells: Vec<Vec<CellKind>>,
    pub items: Vec<CellItems>,
    pub robot: RobotSnapshot,
    pub mode: Mode,
    pub status: GameStatus,
    /// Label of the action being executed, empty when idle.
    pub action_label: String,
    /// Milliseconds until the recharge machine finishes, when active.
    pub recharge_countdown_ms: Option<u64>,
    /// Milliseconds until the next delivery event, when active.
    pub delivery_countdown_ms: Option<u64>,
    pub collected: u32,
    pub delivered: u32,
    pub items_remaining: usize,
    pub tick: u64,
}

/// End-of-session summary printed as JSON when the program exits.
#[derive(Serialize, Deserialize, Clone)]
pub struct MissionReport {
    pub status: GameStatus,
    pub ticks: u64,
    pub collected: u32,
    pub delivered: u32,
    pub final_battery: f32,
    pub seed: u64,
}

/// Assembles the per-tick snapshot from the simulation core.
pub fn create_snapshot(sim: &Simulation, now_ms: u64) -> SimulationSnapshot {
    let grid = &sim.world.grid;
    let mut cells = Vec::with_capacity(grid.height());
    for y in 0..grid.height() {
        let mut row = Vec::with_capacity(grid.width());
        for x in 0..grid.width() {
            // In-bounds by construction.
            row.push(grid.cell_kind(Position::new(x, y)).unwrap_or(CellKind::Obstacle));
        }
        cells.push(row);
    }

    let items = sim
        .world
        .item_positions()
        .into_iter()
        .map(|pos| CellItems {
            pos,
            items: sim.world.cell_items(pos).to_vec(),
        })
        .collect();

    let robot = &sim.world.robot;
    SimulationSnapshot {
        width: grid.width(),
        height: grid.height(),
        cells,
        items,
        robot: RobotSnapshot {
            x: robot.pos.x,
            y: robot.pos.y,
            anim_x: robot.anim_x,
            anim_y: robot.anim_y,
            battery: robot.battery,
            inventory: robot.inventory.iter().copied().collect(),
        },
        mode: sim.mode(),
        status: sim.status(),
        action_label: sim
            .executor
            .current_action()
            .map(|a| a.label().to_string())
            .unwrap_or_default(),
        recharge_countdown_ms: sim.timers.recharge_countdown_ms(now_ms),
        delivery_countdown_ms: sim.timers.delivery_countdown_ms(now_ms),
        collected: sim.world.collected,
        delivered: sim.world.delivered,
        items_remaining: sim.world.items_remaining(),
        tick: sim.tick_count(),
    }
}

/// Assembles the end-of-session report.
pub fn create_report(sim: &Simulation) -> MissionReport {
    MissionReport {
        status: sim.status(),
        ticks: sim.tick_count(),
        collected: sim.world.collected,
        delivered: sim.world.delivered,
        final_battery: sim.world.robot.battery,
        seed: sim.seed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::Simulation;

    #[test]
    fn snapshot_round_trips_through_json() {
        let sim = Simulation::from_default_map(99);
        let snapshot = create_snapshot(&sim, 0);
        let json = serde_json::to_string(&snapshot).expect("serializable snapshot");
        let back: SimulationSnapshot = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back.width, 6);
        assert_eq!(back.height, 4);
        assert_eq!(back.robot.battery, 100.0);
        assert_eq!(back.status, GameStatus::Playing);
    }

    #[test]
    fn report_reflects_the_simulation() {
        let sim = Simulation::from_default_map(7);
        let report = create_report(&sim);
        assert_eq!(report.seed, 7);
        assert_eq!(report.ticks, 0);
        assert_eq!(report.delivered, 0);
    }
}
