//! Cost accounting and task selection.
//!
//! `nearest_of_kind` and the dynamic charge target form the resource
//! accounting layer; `decide_next_action` is the policy that turns the
//! world state into the next high-level action for the automatic modes.

use crate::map::Grid;
use crate::pathfinding::route_cost;
use crate::types::{
    CellKind, Mode, PlannedAction, Position, CHARGE_SAFETY_MARGIN, COLLECT_SAFETY_MARGIN,
    LOW_BATTERY_THRESHOLD, MIN_CHARGE_TARGET, TARGET_CACHE_VALIDITY_MS,
};
use crate::world::WorldState;
use tracing::{debug, warn};

/// Candidate with the shortest route from `from`, by path length rather
/// than straight-line distance. Unreachable candidates are skipped; ties
/// go to the first candidate in iteration order.
pub fn nearest_of_kind(grid: &Grid, from: Position, candidates: &[Position]) -> Option<Position> {
    let mut best: Option<(Position, f32)> = None;
    for &candidate in candidates {
        let cost = route_cost(grid, from, candidate);
        if cost.is_finite() {
            match best {
                Some((_, best_cost)) if best_cost <= cost => {}
                _ => best = Some((candidate, cost)),
            }
        }
    }
    best.map(|(pos, _)| pos)
}

/// Cached dynamic charge target: value plus the simulated time it was
/// computed at. Explicitly invalidated whenever an action completes.
struct ChargeTargetCache {
    value: f32,
    computed_at_ms: u64,
}

/// Task planner with its charge-target cache. Decisions are pure with
/// respect to the world state: unchanged state yields the same decision.
pub struct Planner {
    target_cache: Option<ChargeTargetCache>,
}

impl Planner {
    pub fn new() -> Self {
        Self { target_cache: None }
    }

    /// Drops the cached charge target. Called when a collection,
    /// delivery or recharge completes.
    pub fn invalidate_target(&mut self) {
        self.target_cache = None;
    }

    /// Battery level the robot should charge to. Manual and
    /// semi-automatic modes always aim for a full battery; fully
    /// automatic mode uses the cached look-ahead estimate.
    pub fn charge_target(&mut self, world: &WorldState, mode: Mode, now_ms: u64) -> f32 {
        if mode != Mode::FullAuto {
            return 100.0;
        }
        if let Some(cache) = &self.target_cache {
            if now_ms.saturating_sub(cache.computed_at_ms) < TARGET_CACHE_VALIDITY_MS {
                return cache.value;
            }
        }
        let value = needed_charge_target(world);
        debug!(target = value, "objectif de charge recalculé");
        self.target_cache = Some(ChargeTargetCache {
            value,
            computed_at_ms: now_ms,
        });
        value
    }

    /// Selects the next high-level action, or `None` when the mission is
    /// complete. Evaluated fresh whenever no action is executing; the
    /// priority order short-circuits top to bottom.
    pub fn decide_next_action(
        &mut self,
        world: &WorldState,
        mode: Mode,
        now_ms: u64,
    ) -> Option<PlannedAction> {
        let grid = &world.grid;
        let pos = world.robot.pos;
        let battery = world.robot.battery;
        let inventory = world.robot.inventory.len();
        let here = grid.cell_kind(pos);
        let target = self.charge_target(world, mode, now_ms);

        // 1. Standing on a warehouse with cargo: deliver it.
        if here == Some(CellKind::Warehouse) && inventory > 0 {
            return Some(PlannedAction::Deliver(pos));
        }

        // 2. Standing on a recharge station below target: keep charging.
        if here == Some(CellKind::Recharge) && battery < target {
            return Some(PlannedAction::Recharge(pos));
        }

        let recharge_cells = grid.all_of_kind(CellKind::Recharge);
        let warehouse_cells = grid.all_of_kind(CellKind::Warehouse);

        // 3. Critically low battery: emergency run to the nearest
        // station, even when the trip itself is marginal.
        if battery < LOW_BATTERY_THRESHOLD {
            if let Some(station) = nearest_of_kind(grid, pos, &recharge_cells) {
                let cost = route_cost(grid, pos, station);
                if cost > battery {
                    warn!(battery, cost, "tentative de recharge d'urgence sous le coût du trajet");
                }
                return Some(PlannedAction::Recharge(station));
            }
        }

        // 4. Carrying items.
        if inventory > 0 {
            let warehouse = nearest_of_kind(grid, pos, &warehouse_cells);
            let Some(warehouse) = warehouse else {
                // No reachable warehouse; try to top up and retry later.
                return nearest_of_kind(grid, pos, &recharge_cells).map(PlannedAction::Recharge);
            };
            let deliver_cost = route_cost(grid, pos, warehouse);
            let recharge_after = nearest_of_kind(grid, warehouse, &recharge_cells)
                .map(|r| route_cost(grid, warehouse, r))
                .unwrap_or(f32::INFINITY);

            if battery < deliver_cost + recharge_after {
                // Cannot complete deliver-then-recharge: recharge first if
                // possible, otherwise deliver now as an emergency measure.
                if let Some(station) = nearest_of_kind(grid, pos, &recharge_cells) {
                    return Some(PlannedAction::Recharge(station));
                }
                warn!(battery, "livraison d'urgence sans recharge atteignable");
                return Some(PlannedAction::Deliver(warehouse));
            }

            if world.robot.inventory_full() {
                return Some(PlannedAction::Deliver(warehouse));
            }

            // Room for one more item: collect it if the full detour
            // (item, warehouse, station) still fits with margin.
            if let Some(item) = nearest_of_kind(grid, pos, &world.item_positions()) {
                let to_item = route_cost(grid, pos, item);
                let item_to_warehouse = nearest_of_kind(grid, item, &warehouse_cells)
                    .map(|w| {
                        let leg = route_cost(grid, item, w);
                        let back = nearest_of_kind(grid, w, &recharge_cells)
                            .map(|r| route_cost(grid, w, r))
                            .unwrap_or(f32::INFINITY);
                        leg + back
                    })
                    .unwrap_or(f32::INFINITY);
                let detour = to_item + item_to_warehouse;
                if battery >= detour + COLLECT_SAFETY_MARGIN {
                    return Some(PlannedAction::Collect(item));
                }
            }
            return Some(PlannedAction::Deliver(warehouse));
        }

        // 5. Empty-handed with items left on the floor.
        if let Some(item) = nearest_of_kind(grid, pos, &world.item_positions()) {
            let to_item = route_cost(grid, pos, item);
            let round_trip = to_item
                + nearest_of_kind(grid, item, &warehouse_cells)
                    .map(|w| {
                        let leg = route_cost(grid, item, w);
                        let back = nearest_of_kind(grid, w, &recharge_cells)
                            .map(|r| route_cost(grid, w, r))
                            .unwrap_or(f32::INFINITY);
                        leg + back
                    })
                    .unwrap_or(f32::INFINITY);

            if battery >= round_trip {
                return Some(PlannedAction::Collect(item));
            }
            if here == Some(CellKind::Recharge) {
                // Charged enough by the dynamic target: go anyway.
                if battery >= target {
                    return Some(PlannedAction::Collect(item));
                }
                return Some(PlannedAction::Recharge(pos));
            }
            if let Some(station) = nearest_of_kind(grid, pos, &recharge_cells) {
                return Some(PlannedAction::Recharge(station));
            }
            // No station reachable: attempt the collection rather than
            // stall. Stopping is worse than a risky attempt.
            warn!(battery, round_trip, "collecte tentée sans marge de batterie");
            return Some(PlannedAction::Collect(item));
        }

        // 6. Nothing left to do.
        None
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

/// Look-ahead battery estimate for fully-automatic mode: the cost of up
/// to two future actions plus the return to the nearest recharge
/// station, padded with a safety margin and clamped to [30, 100].
fn needed_charge_target(world: &WorldState) -> f32 {
    let grid = &world.grid;
    let pos = world.robot.pos;
    let items = world.item_positions();
    let warehouse_cells = grid.all_of_kind(CellKind::Warehouse);
    let recharge_cells = grid.all_of_kind(CellKind::Recharge);

    let mut cost = 0.0;
    let mut cursor = pos;

    if world.robot.inventory.is_empty() {
        // collect, then collect again or deliver
        if let Some(first) = nearest_of_kind(grid, cursor, &items) {
            cost += route_cost(grid, cursor, first);
            cursor = first;
            let remaining: Vec<Position> = items.iter().copied().filter(|&p| p != first).collect();
            if let Some(second) = nearest_of_kind(grid, cursor, &remaining) {
                cost += route_cost(grid, cursor, second);
                cursor = second;
            } else if let Some(warehouse) = nearest_of_kind(grid, cursor, &warehouse_cells) {
                cost += route_cost(grid, cursor, warehouse);
                cursor = warehouse;
            }
        }
    } else {
        // deliver, then collect the next item if any
        if let Some(warehouse) = nearest_of_kind(grid, cursor, &warehouse_cells) {
            cost += route_cost(grid, cursor, warehouse);
            cursor = warehouse;
        }
        if let Some(item) = nearest_of_kind(grid, cursor, &items) {
            cost += route_cost(grid, cursor, item);
            cursor = item;
        }
    }

    if let Some(station) = nearest_of_kind(grid, cursor, &recharge_cells) {
        cost += route_cost(grid, cursor, station);
    }

    (cost + CHARGE_SAFETY_MARGIN).clamp(MIN_CHARGE_TARGET, 100.0)
}
