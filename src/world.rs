use crate::map::Grid;
use crate::robot::Robot;
use crate::types::{
    CellKind, Direction, GameStatus, ItemType, Position, ITEM_FILL_CHANCE, MAX_ITEMS_PER_CELL,
    MOVE_BATTERY_COST,
};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

/// Mutable simulation state: the robot, the items still on the floor and
/// the mission counters. Owned by a single controller and mutated only
/// inside the tick handler, so there is exactly one writer.
pub struct WorldState {
    pub grid: Grid,
    pub robot: Robot,
    items: HashMap<Position, Vec<ItemType>>,
    pub collected: u32,
    pub delivered: u32,
}

impl WorldState {
    /// Builds a fresh world: robot on the start cell, full battery, and
    /// items scattered over the free cells (each free cell has a fixed
    /// chance of receiving 1 or 2 items of uniform random type).
    pub fn new(grid: Grid, rng: &mut StdRng) -> Self {
        let items = scatter_items(&grid, rng);
        let robot = Robot::new(grid.start());
        Self {
            grid,
            robot,
            items,
            collected: 0,
            delivered: 0,
        }
    }

    /// Restores the initial state over the same grid: robot back on the
    /// start cell with a full battery, counters cleared, and a fresh
    /// random item placement.
    pub fn reset(&mut self, rng: &mut StdRng) {
        self.items = scatter_items(&self.grid, rng);
        self.robot = Robot::new(self.grid.start());
        self.collected = 0;
        self.delivered = 0;
    }

    /// Builds a world with a scripted item placement instead of a random
    /// one. Used for replayable scenarios and tests; placements on
    /// non-free cells are ignored.
    pub fn with_items(grid: Grid, placements: &[(Position, &[ItemType])]) -> Self {
        let mut items: HashMap<Position, Vec<ItemType>> = HashMap::new();
        for (pos, cell_items) in placements {
            if grid.cell_kind(*pos) == Some(CellKind::Free) && !cell_items.is_empty() {
                items.insert(*pos, cell_items.to_vec());
            }
        }
        let robot = Robot::new(grid.start());
        Self {
            grid,
            robot,
            items,
            collected: 0,
            delivered: 0,
        }
    }

    /// Items lying on `pos`, empty slice when there are none.
    pub fn cell_items(&self, pos: Position) -> &[ItemType] {
        self.items.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Positions of every cell that still holds at least one item,
    /// in row-major order so tie-breaks stay deterministic.
    pub fn item_positions(&self) -> Vec<Position> {
        let mut out = Vec::new();
        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                let pos = Position::new(x, y);
                if !self.cell_items(pos).is_empty() {
                    out.push(pos);
                }
            }
        }
        out
    }

    pub fn items_remaining(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    /// Attempts one grid move. Fails silently (no battery cost, no state
    /// change) when the battery is empty, the target cell is out of
    /// bounds or the target cell is an obstacle.
    pub fn move_if_valid(&mut self, direction: Direction) -> bool {
        if self.robot.battery <= 0.0 {
            return false;
        }
        let (dx, dy) = direction.delta();
        let nx = self.robot.pos.x as isize + dx;
        let ny = self.robot.pos.y as isize + dy;
        if nx < 0 || ny < 0 {
            return false;
        }
        let target = Position::new(nx as usize, ny as usize);
        if !self.grid.is_traversable(target) {
            return false;
        }
        self.robot.pos = target;
        self.robot.battery = (self.robot.battery - MOVE_BATTERY_COST).max(0.0);
        true
    }

    /// Moves one item from the current cell's slot `slot` (0-based) into
    /// the inventory. Fails when the inventory is full, the slot is empty
    /// or the index is out of range.
    pub fn collect(&mut self, slot: usize) -> bool {
        if self.robot.inventory_full() {
            debug!(pos = ?self.robot.pos, "collecte refusée: inventaire plein");
            return false;
        }
        let pos = self.robot.pos;
        let Some(cell_items) = self.items.get_mut(&pos) else {
            return false;
        };
        if slot >= cell_items.len() {
            return false;
        }
        let item = cell_items.remove(slot);
        if cell_items.is_empty() {
            self.items.remove(&pos);
        }
        self.robot.inventory.push_back(item);
        self.collected += 1;
        debug!(pos = ?pos, item = ?item, carried = self.robot.inventory.len(), "item collecté");
        true
    }

    /// Delivers the oldest carried item. Called by the delivery station
    /// machine once per delivery interval.
    pub fn deliver_one(&mut self) -> Option<ItemType> {
        let item = self.robot.inventory.pop_front()?;
        self.delivered += 1;
        debug!(item = ?item, delivered = self.delivered, "item livré");
        Some(item)
    }

    /// Terminal-state check. Victory wins over game-over: a mission with
    /// everything delivered is complete whatever the battery level. The
    /// battery running out is only fatal away from a recharge station,
    /// since a robot parked on one can still charge back up.
    pub fn status(&self) -> GameStatus {
        if self.items_remaining() == 0 && self.robot.inventory.is_empty() {
            return GameStatus::Victory;
        }
        if self.robot.battery <= 0.0
            && self.grid.cell_kind(self.robot.pos) != Some(CellKind::Recharge)
        {
            return GameStatus::GameOver;
        }
        GameStatus::Playing
    }
}

/// Independent random placement per free cell: a fixed chance of holding
/// 1 or 2 items of uniform random type.
fn scatter_items(grid: &Grid, rng: &mut StdRng) -> HashMap<Position, Vec<ItemType>> {
    let mut items: HashMap<Position, Vec<ItemType>> = HashMap::new();
    for pos in grid.all_of_kind(CellKind::Free) {
        if rng.gen_bool(ITEM_FILL_CHANCE) {
            let count = rng.gen_range(1..=MAX_ITEMS_PER_CELL);
            let cell_items = (0..count)
                .map(|_| if rng.gen_bool(0.5) { ItemType::A } else { ItemType::B })
                .collect();
            items.insert(pos, cell_items);
        }
    }
    items
}
