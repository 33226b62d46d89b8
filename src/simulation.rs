//! Simulation controller.
//!
//! Single-writer, tick-driven core: one discrete update per frame, no
//! blocking operation anywhere. The controller owns the world, the
//! station machines, the planner and the executor, applies at most one
//! input command per tick, and enforces the mode state machine
//! (Manual / SemiAuto / FullAuto with explicit legal transitions).

use crate::executor::{ActionExecutor, ExecOutcome};
use crate::map::Grid;
use crate::pathfinding::find_path;
use crate::planner::Planner;
use crate::station::StationTimers;
use crate::types::{Command, GameStatus, Mode, INTER_ACTION_PAUSE_MS};
use crate::world::WorldState;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

pub struct Simulation {
    pub world: WorldState,
    pub timers: StationTimers,
    pub planner: Planner,
    pub executor: ActionExecutor,
    mode: Mode,
    status: GameStatus,
    seed: u64,
    tick_count: u64,
    pending: Option<Command>,
    next_plan_at_ms: u64,
}

impl Simulation {
    /// Fresh simulation over `grid`, items placed from `seed`.
    pub fn new(grid: Grid, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let world = WorldState::new(grid, &mut rng);
        info!(seed, items = world.items_remaining(), "monde initialisé");
        Self {
            world,
            timers: StationTimers::new(),
            planner: Planner::new(),
            executor: ActionExecutor::new(),
            mode: Mode::Manual,
            status: GameStatus::Playing,
            seed,
            tick_count: 0,
            pending: None,
            next_plan_at_ms: 0,
        }
    }

    pub fn from_default_map(seed: u64) -> Self {
        Self::new(Grid::default_map(), seed)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Queues one input intent for the next tick. At most one command is
    /// applied per tick; the latest queued one wins.
    pub fn queue_command(&mut self, command: Command) {
        self.pending = Some(command);
    }

    /// One discrete simulation step. `now_ms` is milliseconds of
    /// simulated time since start; the caller supplies it so ticks may
    /// arrive at irregular intervals.
    pub fn tick(&mut self, now_ms: u64) {
        self.tick_count += 1;

        if let Some(command) = self.pending.take() {
            self.apply_command(command, now_ms);
        }

        self.world.robot.step_animation();

        if self.status != GameStatus::Playing {
            return;
        }

        // Station machines run every tick; they detect movement on their
        // own and reset accordingly.
        let charge_target = self.planner.charge_target(&self.world, self.mode, now_ms);
        let events = self.timers.tick(&mut self.world, charge_target, now_ms);
        if events.recharge_finished || events.delivery_finished {
            self.planner.invalidate_target();
        }

        // The executor and planner are gated on the animation having
        // settled, so at most one cell advance is ever pending.
        if self.world.robot.animation_settled() {
            let outcome = self.executor.tick(&mut self.world, charge_target, &events);
            match outcome {
                ExecOutcome::Completed => self.on_action_finished(now_ms, true),
                ExecOutcome::Failed => self.on_action_finished(now_ms, false),
                ExecOutcome::Idle | ExecOutcome::InProgress => {}
            }

            if self.executor.is_idle()
                && self.mode != Mode::Manual
                && now_ms >= self.next_plan_at_ms
            {
                self.plan_next(now_ms);
            }
        }

        self.status = self.world.status();
        if self.status != GameStatus::Playing {
            info!(status = ?self.status, ticks = self.tick_count, "fin de mission");
        }
    }

    fn plan_next(&mut self, now_ms: u64) {
        let Some(action) = self.planner.decide_next_action(&self.world, self.mode, now_ms) else {
            // Mission complete: nothing to schedule.
            if self.mode == Mode::SemiAuto {
                self.mode = Mode::Manual;
            }
            return;
        };
        let path = find_path(&self.world.grid, self.world.robot.pos, action.target());
        if path.is_empty() {
            // NoPath: FullAuto retries on a later tick, SemiAuto disarms.
            warn!(action = ?action, "aucun chemin vers la cible");
            match self.mode {
                Mode::SemiAuto => self.mode = Mode::Manual,
                Mode::FullAuto => self.next_plan_at_ms = now_ms + INTER_ACTION_PAUSE_MS,
                Mode::Manual => {}
            }
            return;
        }
        self.executor.start(action, path);
    }

    fn on_action_finished(&mut self, now_ms: u64, completed: bool) {
        debug!(completed, "action terminée");
        self.planner.invalidate_target();
        match self.mode {
            // One action per arming in semi-automatic mode.
            Mode::SemiAuto => self.mode = Mode::Manual,
            Mode::FullAuto => self.next_plan_at_ms = now_ms + INTER_ACTION_PAUSE_MS,
            Mode::Manual => {}
        }
    }

    fn apply_command(&mut self, command: Command, now_ms: u64) {
        match command {
            Command::Move(direction) => {
                self.interrupt_automation();
                if self.world.move_if_valid(direction) {
                    // Movement always interrupts dwell, recharge and delivery.
                    self.timers.reset();
                }
            }
            Command::Collect(slot) => {
                self.interrupt_automation();
                let index = slot.saturating_sub(1) as usize;
                self.world.collect(index);
            }
            Command::ToggleFullAuto => match self.mode {
                Mode::Manual => {
                    info!("mode automatique activé");
                    self.mode = Mode::FullAuto;
                    self.next_plan_at_ms = now_ms;
                }
                Mode::FullAuto => {
                    info!("mode automatique désactivé");
                    self.interrupt_automation();
                }
                Mode::SemiAuto => {
                    // Illegal transition, rejected rather than silently applied.
                    warn!("bascule auto refusée: mode semi-automatique actif");
                }
            },
            Command::ToggleSemiAuto => match self.mode {
                Mode::Manual => {
                    info!("mode semi-automatique armé");
                    self.mode = Mode::SemiAuto;
                    self.next_plan_at_ms = now_ms;
                }
                Mode::SemiAuto => {
                    info!("mode semi-automatique désarmé");
                    self.interrupt_automation();
                }
                Mode::FullAuto => {
                    warn!("bascule semi-auto refusée: mode automatique actif");
                }
            },
            Command::Reset => self.reset(),
        }
    }

    /// Drops any automatic action in progress and reverts to manual.
    fn interrupt_automation(&mut self) {
        if self.mode != Mode::Manual || !self.executor.is_idle() {
            self.executor.abort();
            self.mode = Mode::Manual;
        }
    }

    /// Rebuilds the initial world with a fresh item placement.
    pub fn reset(&mut self) {
        info!("réinitialisation de la simulation");
        self.seed = self.seed.wrapping_add(1);
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.world.reset(&mut rng);
        self.timers.reset();
        self.planner.invalidate_target();
        self.executor.abort();
        self.mode = Mode::Manual;
        self.status = GameStatus::Playing;
        self.tick_count = 0;
        self.next_plan_at_ms = 0;
        self.pending = None;
    }
}
