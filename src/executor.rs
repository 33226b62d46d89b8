use crate::station::StationEvents;
use crate::types::{PlannedAction, Position};
use crate::world::WorldState;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Executor phases: Idle (no action), Following (stepping along a
/// precomputed path), AwaitingCompletion (arrived, waiting for the
/// station machine to finish).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecPhase {
    Idle,
    Following,
    AwaitingCompletion,
}

/// Result of one executor tick, reported upward to the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecOutcome {
    Idle,
    InProgress,
    Completed,
    Failed,
}

/// Drives one planned action to completion: consumes the path one grid
/// step per tick, then hands over to the timed station logic for deliver
/// and recharge. Collection is synchronous on arrival.
pub struct ActionExecutor {
    phase: ExecPhase,
    action: Option<PlannedAction>,
    path: VecDeque<Position>,
}

impl ActionExecutor {
    pub fn new() -> Self {
        Self {
            phase: ExecPhase::Idle,
            action: None,
            path: VecDeque::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == ExecPhase::Idle
    }

    pub fn phase(&self) -> ExecPhase {
        self.phase
    }

    pub fn current_action(&self) -> Option<PlannedAction> {
        self.action
    }

    /// Begins executing `action` along `path` (start cell included, as
    /// produced by the pathfinder). Rejects an empty path.
    pub fn start(&mut self, action: PlannedAction, path: Vec<Position>) -> bool {
        if path.is_empty() {
            return false;
        }
        debug!(action = ?action, steps = path.len() - 1, "action démarrée");
        self.action = Some(action);
        self.path = path.into();
        self.phase = ExecPhase::Following;
        true
    }

    /// Drops the current action and path. Used by manual interruption
    /// and by the controller on reset.
    pub fn abort(&mut self) {
        self.phase = ExecPhase::Idle;
        self.action = None;
        self.path.clear();
    }

    /// Advances the action by at most one grid step. The controller only
    /// calls this when the robot's animation has settled, so at most one
    /// cell advance is ever pending.
    pub fn tick(
        &mut self,
        world: &mut WorldState,
        charge_target: f32,
        events: &StationEvents,
    ) -> ExecOutcome {
        match self.phase {
            ExecPhase::Idle => ExecOutcome::Idle,
            ExecPhase::Following => self.tick_following(world),
            ExecPhase::AwaitingCompletion => self.tick_awaiting(world, charge_target, events),
        }
    }

    fn tick_following(&mut self, world: &mut WorldState) -> ExecOutcome {
        // Drop waypoints already reached (the path starts at the cell the
        // robot was on when the route was planned).
        while self.path.front() == Some(&world.robot.pos) {
            self.path.pop_front();
        }

        if let Some(&next) = self.path.front() {
            // Defensive re-validation against a stale plan: the next cell
            // must be orthogonally adjacent and traversable.
            let Some(direction) = world.robot.pos.direction_to(next) else {
                warn!(next = ?next, pos = ?world.robot.pos, "étape de chemin non adjacente, abandon");
                self.abort();
                return ExecOutcome::Failed;
            };
            if !world.grid.is_traversable(next) || !world.move_if_valid(direction) {
                warn!(next = ?next, "étape de chemin invalide, abandon");
                self.abort();
                return ExecOutcome::Failed;
            }
            self.path.pop_front();
            // Arrival is handled on a later tick, once the cell advance
            // has animated out.
            return ExecOutcome::InProgress;
        }

        // Path exhausted: the robot is at the planned target.
        self.arrive(world)
    }

    fn arrive(&mut self, world: &mut WorldState) -> ExecOutcome {
        let Some(action) = self.action else {
            self.abort();
            return ExecOutcome::Failed;
        };
        if world.robot.pos != action.target() {
            warn!(expected = ?action.target(), actual = ?world.robot.pos, "cible manquée, abandon");
            self.abort();
            return ExecOutcome::Failed;
        }
        match action {
            PlannedAction::Collect(_) => {
                // Synchronous: the item is taken the instant the path completes.
                let ok = !world.cell_items(world.robot.pos).is_empty()
                    && !world.robot.inventory_full()
                    && world.collect(0);
                self.abort();
                if ok {
                    ExecOutcome::Completed
                } else {
                    ExecOutcome::Failed
                }
            }
            PlannedAction::Deliver(_) | PlannedAction::Recharge(_) => {
                self.phase = ExecPhase::AwaitingCompletion;
                ExecOutcome::InProgress
            }
        }
    }

    fn tick_awaiting(
        &mut self,
        world: &mut WorldState,
        charge_target: f32,
        events: &StationEvents,
    ) -> ExecOutcome {
        let Some(action) = self.action else {
            self.abort();
            return ExecOutcome::Failed;
        };
        let done = match action {
            PlannedAction::Deliver(_) => {
                events.delivery_finished || world.robot.inventory.is_empty()
            }
            PlannedAction::Recharge(_) => {
                events.recharge_finished || world.robot.battery >= charge_target
            }
            PlannedAction::Collect(_) => true,
        };
        if done {
            self.abort();
            ExecOutcome::Completed
        } else {
            ExecOutcome::InProgress
        }
    }
}

impl Default for ActionExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Grid;
    use crate::pathfinding::find_path;
    use crate::types::{ItemType, Position};

    fn world_with_item_at(pos: Position) -> WorldState {
        WorldState::with_items(Grid::default_map(), &[(pos, &[ItemType::A])])
    }

    fn settle(world: &mut WorldState) {
        while !world.robot.animation_settled() {
            world.robot.step_animation();
        }
    }

    #[test]
    fn follows_path_and_collects_on_arrival() {
        let item_pos = Position::new(2, 3);
        let mut world = world_with_item_at(item_pos);
        let mut executor = ActionExecutor::new();
        let path = find_path(&world.grid, world.robot.pos, item_pos);
        assert!(executor.start(PlannedAction::Collect(item_pos), path));

        let no_events = StationEvents::default();
        let mut outcome = ExecOutcome::InProgress;
        for _ in 0..10 {
            settle(&mut world);
            outcome = executor.tick(&mut world, 100.0, &no_events);
            if outcome != ExecOutcome::InProgress {
                break;
            }
        }
        assert_eq!(outcome, ExecOutcome::Completed);
        assert_eq!(world.robot.pos, item_pos);
        assert_eq!(world.robot.inventory.len(), 1);
        assert!(executor.is_idle());
    }

    #[test]
    fn singleton_path_collects_immediately() {
        let mut world = world_with_item_at(Position::new(2, 3));
        world.robot.pos = Position::new(2, 3);
        let mut executor = ActionExecutor::new();
        let target = world.robot.pos;
        assert!(executor.start(PlannedAction::Collect(target), vec![target]));
        let outcome = executor.tick(&mut world, 100.0, &StationEvents::default());
        assert_eq!(outcome, ExecOutcome::Completed);
        assert_eq!(world.robot.inventory.len(), 1);
    }

    #[test]
    fn stale_path_step_aborts_the_action() {
        let mut world = world_with_item_at(Position::new(5, 3));
        let mut executor = ActionExecutor::new();
        // A fabricated path that jumps two cells: rejected on the first step.
        let bad_path = vec![world.robot.pos, Position::new(3, 3), Position::new(5, 3)];
        assert!(executor.start(PlannedAction::Collect(Position::new(5, 3)), bad_path));
        let outcome = executor.tick(&mut world, 100.0, &StationEvents::default());
        assert_eq!(outcome, ExecOutcome::Failed);
        assert!(executor.is_idle());
    }

    #[test]
    fn path_into_obstacle_aborts() {
        let mut world = world_with_item_at(Position::new(5, 3));
        world.robot.pos = Position::new(3, 1);
        let mut executor = ActionExecutor::new();
        // (3, 2) is an obstacle on the default map.
        let bad_path = vec![Position::new(3, 1), Position::new(3, 2)];
        assert!(executor.start(PlannedAction::Collect(Position::new(3, 2)), bad_path));
        let outcome = executor.tick(&mut world, 100.0, &StationEvents::default());
        assert_eq!(outcome, ExecOutcome::Failed);
    }

    #[test]
    fn deliver_waits_for_station_machine() {
        let warehouse = Position::new(0, 0);
        let mut world = WorldState::with_items(Grid::default_map(), &[]);
        world.robot.pos = warehouse;
        world.robot.inventory.push_back(ItemType::B);
        let mut executor = ActionExecutor::new();
        assert!(executor.start(PlannedAction::Deliver(warehouse), vec![warehouse]));

        // Arrival moves to AwaitingCompletion; no completion until the
        // inventory drains.
        let outcome = executor.tick(&mut world, 100.0, &StationEvents::default());
        assert_eq!(outcome, ExecOutcome::InProgress);
        assert_eq!(executor.phase(), ExecPhase::AwaitingCompletion);

        let outcome = executor.tick(&mut world, 100.0, &StationEvents::default());
        assert_eq!(outcome, ExecOutcome::InProgress);

        world.robot.inventory.clear();
        let outcome = executor.tick(&mut world, 100.0, &StationEvents::default());
        assert_eq!(outcome, ExecOutcome::Completed);
    }

    #[test]
    fn recharge_completes_on_event_or_target() {
        let station = Position::new(3, 0);
        let mut world = WorldState::with_items(Grid::default_map(), &[]);
        world.robot.pos = station;
        world.robot.battery = 40.0;
        let mut executor = ActionExecutor::new();
        assert!(executor.start(PlannedAction::Recharge(station), vec![station]));

        assert_eq!(
            executor.tick(&mut world, 90.0, &StationEvents::default()),
            ExecOutcome::InProgress
        );

        let events = StationEvents {
            recharge_finished: true,
            ..Default::default()
        };
        assert_eq!(executor.tick(&mut world, 90.0, &events), ExecOutcome::Completed);
    }

    #[test]
    fn collect_with_full_inventory_fails_on_arrival() {
        let item_pos = Position::new(2, 3);
        let mut world = world_with_item_at(item_pos);
        for _ in 0..3 {
            world.robot.inventory.push_back(ItemType::A);
        }
        world.robot.pos = item_pos;
        let mut executor = ActionExecutor::new();
        assert!(executor.start(PlannedAction::Collect(item_pos), vec![item_pos]));
        let outcome = executor.tick(&mut world, 100.0, &StationEvents::default());
        assert_eq!(outcome, ExecOutcome::Failed);
        assert_eq!(world.robot.inventory.len(), 3);
    }
}
