use crate::types::{
    CellKind, Position, DELIVERY_INTERVAL_MS, FULL_RECHARGE_MS, STATION_DWELL_MS,
};
use crate::world::WorldState;
use tracing::{debug, info};

/// Recharge machine phases: the robot must dwell on the station before
/// the charge ramp starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RechargePhase {
    Idle,
    Dwelling { since_ms: u64 },
    Charging {
        started_ms: u64,
        battery_at_start: f32,
        target: f32,
    },
}

/// Delivery machine phases: dwell first, then one item leaves the
/// inventory every delivery interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeliveryPhase {
    Idle,
    Dwelling { since_ms: u64 },
    Delivering { next_delivery_ms: u64 },
}

/// What happened during one station tick. The controller uses these to
/// invalidate the planner's charge-target cache and to complete actions.
#[derive(Clone, Copy, Debug, Default)]
pub struct StationEvents {
    pub recharge_finished: bool,
    pub delivery_finished: bool,
    pub items_delivered: u32,
}

/// The two timed station machines. Both key off the robot standing still
/// on their special cell; any movement resets them and re-arms detection
/// from the new position.
pub struct StationTimers {
    recharge: RechargePhase,
    delivery: DeliveryPhase,
    last_pos: Option<Position>,
}

impl StationTimers {
    pub fn new() -> Self {
        Self {
            recharge: RechargePhase::Idle,
            delivery: DeliveryPhase::Idle,
            last_pos: None,
        }
    }

    pub fn reset(&mut self) {
        self.recharge = RechargePhase::Idle;
        self.delivery = DeliveryPhase::Idle;
        self.last_pos = None;
    }

    pub fn recharge_phase(&self) -> RechargePhase {
        self.recharge
    }

    pub fn delivery_phase(&self) -> DeliveryPhase {
        self.delivery
    }

    pub fn is_charging(&self) -> bool {
        matches!(self.recharge, RechargePhase::Charging { .. })
    }

    /// Milliseconds until the recharge machine reaches its target:
    /// remaining dwell while waiting, remaining ramp while charging.
    pub fn recharge_countdown_ms(&self, now_ms: u64) -> Option<u64> {
        match self.recharge {
            RechargePhase::Idle => None,
            RechargePhase::Dwelling { since_ms } => {
                Some((since_ms + STATION_DWELL_MS).saturating_sub(now_ms))
            }
            RechargePhase::Charging {
                started_ms,
                battery_at_start,
                target,
            } => {
                let ramp = ramp_duration_ms(battery_at_start, target);
                Some((started_ms + ramp).saturating_sub(now_ms))
            }
        }
    }

    /// Milliseconds until the next delivery event: remaining dwell while
    /// waiting, time to the next item while delivering.
    pub fn delivery_countdown_ms(&self, now_ms: u64) -> Option<u64> {
        match self.delivery {
            DeliveryPhase::Idle => None,
            DeliveryPhase::Dwelling { since_ms } => {
                Some((since_ms + STATION_DWELL_MS).saturating_sub(now_ms))
            }
            DeliveryPhase::Delivering { next_delivery_ms } => {
                Some(next_delivery_ms.saturating_sub(now_ms))
            }
        }
    }

    /// Drives both machines one tick. `charge_target` is the battery
    /// level the recharge ramp aims for (100 outside fully-automatic
    /// mode). Timestamps are recomputed from stored starts, so irregular
    /// tick intervals are harmless.
    pub fn tick(&mut self, world: &mut WorldState, charge_target: f32, now_ms: u64) -> StationEvents {
        let mut events = StationEvents::default();
        let pos = world.robot.pos;

        // Movement since the previous tick resets everything.
        if self.last_pos != Some(pos) {
            self.recharge = RechargePhase::Idle;
            self.delivery = DeliveryPhase::Idle;
            self.last_pos = Some(pos);
            return events;
        }

        let cell = world.grid.cell_kind(pos);
        self.tick_recharge(world, cell, charge_target, now_ms, &mut events);
        self.tick_delivery(world, cell, now_ms, &mut events);
        events
    }

    fn tick_recharge(
        &mut self,
        world: &mut WorldState,
        cell: Option<CellKind>,
        charge_target: f32,
        now_ms: u64,
        events: &mut StationEvents,
    ) {
        let wants_charge = cell == Some(CellKind::Recharge) && world.robot.battery < charge_target;
        match self.recharge {
            RechargePhase::Idle => {
                if wants_charge {
                    self.recharge = RechargePhase::Dwelling { since_ms: now_ms };
                }
            }
            RechargePhase::Dwelling { since_ms } => {
                if !wants_charge {
                    self.recharge = RechargePhase::Idle;
                } else if now_ms.saturating_sub(since_ms) >= STATION_DWELL_MS {
                    debug!(battery = world.robot.battery, target = charge_target, "début de recharge");
                    self.recharge = RechargePhase::Charging {
                        started_ms: now_ms,
                        battery_at_start: world.robot.battery,
                        target: charge_target,
                    };
                }
            }
            RechargePhase::Charging {
                started_ms,
                battery_at_start,
                target,
            } => {
                if cell != Some(CellKind::Recharge) {
                    self.recharge = RechargePhase::Idle;
                    return;
                }
                let ramp = ramp_duration_ms(battery_at_start, target);
                let elapsed = now_ms.saturating_sub(started_ms);
                let progress = if ramp == 0 {
                    1.0
                } else {
                    (elapsed as f32 / ramp as f32).min(1.0)
                };
                world.robot.battery =
                    (battery_at_start + (target - battery_at_start) * progress).min(100.0);
                if progress >= 1.0 || world.robot.battery >= target {
                    world.robot.battery = target.min(100.0);
                    self.recharge = RechargePhase::Idle;
                    events.recharge_finished = true;
                    info!(battery = world.robot.battery, "recharge terminée");
                }
            }
        }
    }

    fn tick_delivery(
        &mut self,
        world: &mut WorldState,
        cell: Option<CellKind>,
        now_ms: u64,
        events: &mut StationEvents,
    ) {
        let can_deliver = cell == Some(CellKind::Warehouse) && !world.robot.inventory.is_empty();
        match self.delivery {
            DeliveryPhase::Idle => {
                if can_deliver {
                    self.delivery = DeliveryPhase::Dwelling { since_ms: now_ms };
                }
            }
            DeliveryPhase::Dwelling { since_ms } => {
                if !can_deliver {
                    self.delivery = DeliveryPhase::Idle;
                } else if now_ms.saturating_sub(since_ms) >= STATION_DWELL_MS {
                    self.delivery = DeliveryPhase::Delivering {
                        next_delivery_ms: now_ms + DELIVERY_INTERVAL_MS,
                    };
                }
            }
            DeliveryPhase::Delivering { mut next_delivery_ms } => {
                if cell != Some(CellKind::Warehouse) {
                    self.delivery = DeliveryPhase::Idle;
                    return;
                }
                while now_ms >= next_delivery_ms && !world.robot.inventory.is_empty() {
                    world.deliver_one();
                    events.items_delivered += 1;
                    next_delivery_ms += DELIVERY_INTERVAL_MS;
                }
                if world.robot.inventory.is_empty() {
                    self.delivery = DeliveryPhase::Idle;
                    events.delivery_finished = true;
                    info!(delivered = world.delivered, "livraison terminée");
                } else {
                    self.delivery = DeliveryPhase::Delivering { next_delivery_ms };
                }
            }
        }
    }
}

impl Default for StationTimers {
    fn default() -> Self {
        Self::new()
    }
}

/// Ramp duration in milliseconds for charging from `start` to `target`,
/// scaled from the fixed full 0 -> 100 duration.
fn ramp_duration_ms(start: f32, target: f32) -> u64 {
    let span = (target - start).max(0.0);
    ((span / 100.0) * FULL_RECHARGE_MS as f32) as u64
}
