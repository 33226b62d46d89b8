use crate::snapshot::SimulationSnapshot;
use crate::types::{CellKind, GameStatus, ItemType, Mode};
use crossterm::{
    cursor::MoveTo,
    style::{Color, SetForegroundColor},
    terminal::{Clear, ClearType},
    ExecutableCommand,
};
use std::io::{stdout, Result, Write};

pub struct Display;

impl Display {
    /// Renders one snapshot to the terminal. Consumes only the snapshot,
    /// never the simulation core itself.
    pub fn render(snapshot: &SimulationSnapshot) -> Result<()> {
        let mut stdout = stdout();

        stdout.execute(Clear(ClearType::All))?;

        for y in 0..snapshot.height {
            for x in 0..snapshot.width {
                stdout.execute(MoveTo(x as u16 * 3, y as u16))?;

                if x == snapshot.robot.x && y == snapshot.robot.y {
                    stdout.execute(SetForegroundColor(battery_color(snapshot.robot.battery)))?;
                    print!("◉  ");
                    continue;
                }

                let item_count = snapshot
                    .items
                    .iter()
                    .find(|c| c.pos.x == x && c.pos.y == y)
                    .map(|c| c.items.len())
                    .unwrap_or(0);

                match snapshot.cells[y][x] {
                    CellKind::Obstacle => {
                        stdout.execute(SetForegroundColor(Color::DarkGrey))?;
                        print!("██ ");
                    }
                    CellKind::Start => {
                        stdout.execute(SetForegroundColor(Color::Yellow))?;
                        print!("S  ");
                    }
                    CellKind::Warehouse => {
                        stdout.execute(SetForegroundColor(Color::Green))?;
                        print!("A  ");
                    }
                    CellKind::Recharge => {
                        stdout.execute(SetForegroundColor(Color::Blue))?;
                        print!("R  ");
                    }
                    CellKind::Free => {
                        if item_count > 0 {
                            stdout.execute(SetForegroundColor(Color::Magenta))?;
                            print!("{}  ", item_count);
                        } else {
                            stdout.execute(SetForegroundColor(Color::DarkGrey))?;
                            print!("·  ");
                        }
                    }
                }
            }
        }

        let base = snapshot.height as u16 + 1;
        stdout.execute(MoveTo(0, base))?;
        stdout.execute(SetForegroundColor(battery_color(snapshot.robot.battery)))?;
        println!("Batterie: {:3.0}%", snapshot.robot.battery);

        stdout.execute(MoveTo(0, base + 1))?;
        stdout.execute(SetForegroundColor(Color::White))?;
        let mode = match snapshot.mode {
            Mode::Manual => "Manuel",
            Mode::SemiAuto => "Semi-auto",
            Mode::FullAuto => "Automatique",
        };
        let action = if snapshot.action_label.is_empty() {
            "-"
        } else {
            snapshot.action_label.as_str()
        };
        println!(
            "Mode: {} | Action: {} | Inventaire: {}/3 | Collectés: {} | Livrés: {} | Restants: {}",
            mode,
            action,
            snapshot.robot.inventory.len(),
            snapshot.collected,
            snapshot.delivered,
            snapshot.items_remaining,
        );

        stdout.execute(MoveTo(0, base + 2))?;
        if let Some(ms) = snapshot.recharge_countdown_ms {
            stdout.execute(SetForegroundColor(Color::Blue))?;
            println!("Recharge dans {:.1}s", ms as f32 / 1000.0);
        } else if let Some(ms) = snapshot.delivery_countdown_ms {
            stdout.execute(SetForegroundColor(Color::Green))?;
            println!("Livraison dans {:.1}s", ms as f32 / 1000.0);
        } else {
            println!();
        }

        stdout.execute(MoveTo(0, base + 3))?;
        match snapshot.status {
            GameStatus::Playing => {
                stdout.execute(SetForegroundColor(Color::DarkGrey))?;
                println!("Flèches: déplacer | 1/2: collecter | f: auto | x: semi-auto | r: reset | q: quitter");
            }
            GameStatus::Victory => {
                stdout.execute(SetForegroundColor(Color::Green))?;
                println!("🏆 Mission accomplie! Tous les objets ont été livrés.");
            }
            GameStatus::GameOver => {
                stdout.execute(SetForegroundColor(Color::Red))?;
                println!("💀 Batterie épuisée. Mission échouée.");
            }
        }

        if !snapshot.robot.inventory.is_empty() {
            stdout.execute(MoveTo(0, base + 4))?;
            stdout.execute(SetForegroundColor(Color::Magenta))?;
            let carried: Vec<&str> = snapshot
                .robot
                .inventory
                .iter()
                .map(|item| match item {
                    ItemType::A => "A",
                    ItemType::B => "B",
                })
                .collect();
            println!("Cargaison: {}", carried.join(", "));
        }

        stdout.flush()?;
        Ok(())
    }
}

fn battery_color(battery: f32) -> Color {
    if battery > 50.0 {
        Color::Green
    } else if battery > 20.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}
