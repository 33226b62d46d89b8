// Binaire principal SIMBOT
// Boucle interactive: tick de simulation à 30 Hz, clavier crossterm,
// affichage terminal, rapport JSON en fin de session.

use simbot::display::Display;
use simbot::snapshot::{create_report, create_snapshot};
use simbot::types::{Command, Direction, TICK_INTERVAL_MS};
use simbot::Simulation;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use rand::RngCore;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // NOTE - Logging to stderr, controlled by RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    println!("🤖 SIMBOT - Simulation de Robot d'Entrepôt Autonome");
    println!("====================================================");
    println!();
    println!("Flèches: déplacer | 1/2: collecter | f: mode auto | x: semi-auto | r: reset | q: quitter");
    println!();

    let seed = rand::thread_rng().next_u64();
    let mut sim = Simulation::from_default_map(seed);

    // NOTE - Enable raw terminal mode for UI
    enable_raw_mode()?;
    let result = run(&mut sim).await;
    // NOTE - Restore normal terminal mode before reporting
    disable_raw_mode()?;

    let report = create_report(&sim);
    println!("{}", serde_json::to_string_pretty(&report)?);
    result
}

async fn run(sim: &mut Simulation) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let mut ticker = tokio::time::interval(Duration::from_millis(TICK_INTERVAL_MS));

    loop {
        ticker.tick().await;

        // Au plus une commande par tick; la dernière saisie gagne.
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Up => sim.queue_command(Command::Move(Direction::North)),
                    KeyCode::Down => sim.queue_command(Command::Move(Direction::South)),
                    KeyCode::Left => sim.queue_command(Command::Move(Direction::West)),
                    KeyCode::Right => sim.queue_command(Command::Move(Direction::East)),
                    KeyCode::Char('1') => sim.queue_command(Command::Collect(1)),
                    KeyCode::Char('2') => sim.queue_command(Command::Collect(2)),
                    KeyCode::Char('f') => sim.queue_command(Command::ToggleFullAuto),
                    KeyCode::Char('x') => sim.queue_command(Command::ToggleSemiAuto),
                    KeyCode::Char('r') => sim.queue_command(Command::Reset),
                    _ => {}
                }
            }
        }

        let now_ms = started.elapsed().as_millis() as u64;
        sim.tick(now_ms);

        let snapshot = create_snapshot(sim, now_ms);
        Display::render(&snapshot)?;
    }
}
