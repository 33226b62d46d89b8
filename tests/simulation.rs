//! End-to-end scenarios driving the simulation controller tick by tick
//! with a synthetic clock.

use simbot::map::Grid;
use simbot::types::{Command, Direction, GameStatus, Mode, Position, TICK_INTERVAL_MS};
use simbot::Simulation;

/// Advances the simulation by `ticks` frames of simulated time.
fn run_ticks(sim: &mut Simulation, now_ms: &mut u64, ticks: u64) {
    for _ in 0..ticks {
        *now_ms += TICK_INTERVAL_MS;
        sim.tick(*now_ms);
    }
}

/// First seed whose random placement leaves at least one item on the map.
fn seeded_sim_with_items(grid_text: Option<&str>) -> Simulation {
    for seed in 0..1000 {
        let sim = match grid_text {
            Some(text) => Simulation::new(Grid::parse(text).expect("valid map"), seed),
            None => Simulation::from_default_map(seed),
        };
        if sim.world.items_remaining() > 0 {
            return sim;
        }
    }
    unreachable!("no seed below 1000 produced any item");
}

#[test]
fn five_manual_moves_cost_ten_percent() {
    let mut sim = Simulation::from_default_map(0);
    let mut now = 0u64;
    let moves = [
        Direction::East,
        Direction::East,
        Direction::East,
        Direction::East,
        Direction::North,
    ];
    for dir in moves {
        sim.queue_command(Command::Move(dir));
        run_ticks(&mut sim, &mut now, 1);
    }
    assert_eq!(sim.world.robot.battery, 90.0);
    assert_eq!(sim.world.robot.pos, Position::new(5, 2));
}

#[test]
fn full_auto_reaches_victory() {
    let mut sim = seeded_sim_with_items(None);
    let mut now = 0u64;
    sim.queue_command(Command::ToggleFullAuto);
    run_ticks(&mut sim, &mut now, 1);
    assert_eq!(sim.mode(), Mode::FullAuto);

    for _ in 0..200_000 {
        run_ticks(&mut sim, &mut now, 1);
        let battery = sim.world.robot.battery;
        assert!((0.0..=100.0).contains(&battery), "battery out of range: {battery}");
        assert!(sim.world.robot.inventory.len() <= 3);
        if sim.status() == GameStatus::Victory {
            break;
        }
        assert_ne!(sim.status(), GameStatus::GameOver, "autonomous run died");
    }

    assert_eq!(sim.status(), GameStatus::Victory);
    assert_eq!(sim.world.items_remaining(), 0);
    assert!(sim.world.robot.inventory.is_empty());
    assert_eq!(sim.world.collected, sim.world.delivered);
    assert!(sim.world.delivered > 0);
}

#[test]
fn semi_auto_runs_exactly_one_action() {
    let mut sim = seeded_sim_with_items(None);
    let mut now = 0u64;
    sim.queue_command(Command::ToggleSemiAuto);
    run_ticks(&mut sim, &mut now, 1);
    assert_eq!(sim.mode(), Mode::SemiAuto);

    // Battery is full and the inventory empty, so the single planned
    // action is a collection.
    for _ in 0..5_000 {
        run_ticks(&mut sim, &mut now, 1);
        if sim.mode() == Mode::Manual {
            break;
        }
    }
    assert_eq!(sim.mode(), Mode::Manual);
    assert_eq!(sim.world.collected, 1);

    // Without re-arming, nothing further happens.
    let collected = sim.world.collected;
    run_ticks(&mut sim, &mut now, 200);
    assert_eq!(sim.world.collected, collected);
}

#[test]
fn manual_input_interrupts_automation() {
    let mut sim = seeded_sim_with_items(None);
    let mut now = 0u64;
    sim.queue_command(Command::ToggleFullAuto);
    run_ticks(&mut sim, &mut now, 1);

    // Let the executor pick up an action, then press a key.
    run_ticks(&mut sim, &mut now, 5);
    sim.queue_command(Command::Move(Direction::East));
    run_ticks(&mut sim, &mut now, 1);

    assert_eq!(sim.mode(), Mode::Manual);
    assert!(sim.executor.is_idle());
}

#[test]
fn semi_auto_blocks_full_auto_toggle() {
    let mut sim = seeded_sim_with_items(None);
    let mut now = 0u64;
    sim.queue_command(Command::ToggleSemiAuto);
    run_ticks(&mut sim, &mut now, 1);
    assert_eq!(sim.mode(), Mode::SemiAuto);

    // Rejected: cannot enter FullAuto while SemiAuto is armed.
    sim.queue_command(Command::ToggleFullAuto);
    run_ticks(&mut sim, &mut now, 1);
    assert_eq!(sim.mode(), Mode::SemiAuto);
}

#[test]
fn unreachable_stations_end_in_game_over() {
    // The only recharge station is walled off behind obstacles.
    let map = "S1A00R\n111000";
    let mut sim = seeded_sim_with_items(Some(map));
    let mut now = 0u64;

    // Pace back and forth until the battery is gone.
    let mut direction = Direction::East;
    for _ in 0..200 {
        sim.queue_command(Command::Move(direction));
        run_ticks(&mut sim, &mut now, 1);
        if sim.world.robot.pos == Position::new(1, 0) {
            direction = Direction::West;
        } else {
            direction = Direction::East;
        }
        assert_ne!(sim.status(), GameStatus::Victory);
        if sim.status() == GameStatus::GameOver {
            break;
        }
    }

    assert_eq!(sim.status(), GameStatus::GameOver);
    assert_eq!(sim.world.robot.battery, 0.0);
    assert!(sim.world.items_remaining() > 0);
}

#[test]
fn reset_restores_a_fresh_world() {
    let mut sim = seeded_sim_with_items(None);
    let mut now = 0u64;
    sim.queue_command(Command::ToggleFullAuto);
    run_ticks(&mut sim, &mut now, 2_000);

    sim.queue_command(Command::Reset);
    run_ticks(&mut sim, &mut now, 1);

    assert_eq!(sim.status(), GameStatus::Playing);
    assert_eq!(sim.mode(), Mode::Manual);
    assert_eq!(sim.world.collected, 0);
    assert_eq!(sim.world.delivered, 0);
    assert_eq!(sim.world.robot.battery, 100.0);
    assert_eq!(sim.world.robot.pos, sim.world.grid.start());
    assert!(sim.executor.is_idle());
}

#[test]
fn victory_holds_even_on_low_battery() {
    // One free cell between the warehouse and the station: collect its
    // items manually, burn battery pacing, then deliver on a nearly
    // empty battery. The mission still counts as won.
    let mut sim = seeded_sim_with_items(Some("SA1R"));
    let mut now = 0u64;

    // Walk to the item cell at (2, 0) and empty it.
    for _ in 0..2 {
        sim.queue_command(Command::Move(Direction::East));
        run_ticks(&mut sim, &mut now, 1);
    }
    assert_eq!(sim.world.robot.pos, Position::new(2, 0));
    for _ in 0..2 {
        sim.queue_command(Command::Collect(1));
        run_ticks(&mut sim, &mut now, 1);
    }
    assert_eq!(sim.world.items_remaining(), 0);
    assert!(!sim.world.robot.inventory.is_empty());

    // Pace between the item cell and the warehouse to burn battery,
    // ending parked on the warehouse at (1, 0).
    sim.queue_command(Command::Move(Direction::West));
    run_ticks(&mut sim, &mut now, 1);
    for _ in 0..20 {
        sim.queue_command(Command::Move(Direction::East));
        run_ticks(&mut sim, &mut now, 1);
        sim.queue_command(Command::Move(Direction::West));
        run_ticks(&mut sim, &mut now, 1);
    }
    assert_eq!(sim.world.robot.pos, Position::new(1, 0));
    assert!(sim.world.robot.battery < 20.0);
    assert!(sim.world.robot.battery > 0.0);

    // Dwell, then one delivery per second until the cargo is gone.
    run_ticks(&mut sim, &mut now, 200);
    assert_eq!(sim.status(), GameStatus::Victory);
    assert!(sim.world.robot.battery < 20.0);
}
