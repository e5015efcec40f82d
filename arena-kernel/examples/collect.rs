// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Collection demo
//!
//! Builds a small arena, then steers the player toward the nearest remaining
//! score box every frame until all are collected. Run with
//! `RUST_LOG=debug` to see per-frame summaries, and optionally pass a TOML
//! config path:
//!
//! ```text
//! cargo run --example collect -- arena.toml
//! ```

use arena_kernel::ecs::components::{Position, ScoreBox};
use arena_kernel::ecs::World;
use arena_kernel::{KernelConfig, Simulation};
use std::error::Error;

const FRAME_TIME: f64 = 1.0 / 60.0;
const MAX_FRAMES: u64 = 10_000;

fn nearest_box(world: &World, from: Position) -> Option<Position> {
    world
        .iter::<(Position, ScoreBox)>()
        .map(|(_, (position, _))| *position)
        .min_by(|a, b| a.distance_squared(&from).total_cmp(&b.distance_squared(&from)))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => KernelConfig::load_from_file(path)?,
        None => KernelConfig::new().with_arena_half_extent(9.5),
    };

    println!("Arena Kernel - Collection Demo");
    println!("==============================\n");
    println!("{}", config.to_toml_string()?);

    let mut sim = Simulation::new(config)?;
    sim.world_mut()
        .spawn_player(Position::new(0.0, 0.5, 0.0), 6.0)?;

    // Two rings of boxes; the outer ring is worth more and spins faster
    for i in 0..12 {
        let angle = i as f64 * std::f64::consts::TAU / 12.0;
        sim.world_mut().spawn_score_box(
            Position::new(4.0 * angle.cos(), 0.5, 4.0 * angle.sin()),
            1,
            Some(45.0),
        )?;
    }
    for i in 0..8 {
        let angle = (i as f64 + 0.5) * std::f64::consts::TAU / 8.0;
        sim.world_mut().spawn_score_box(
            Position::new(8.0 * angle.cos(), 0.5, 8.0 * angle.sin()),
            5,
            Some(120.0),
        )?;
    }
    println!(
        "Spawned {} score boxes around the player\n",
        sim.world().score_box_count()
    );

    while sim.world().score_box_count() > 0 && sim.frame_count() < MAX_FRAMES {
        let player = sim.world().player_position().ok_or("player vanished")?;
        let (horizontal, vertical) = match nearest_box(sim.world(), player) {
            Some(target) => {
                let dx = target.x() - player.x();
                let dz = target.z() - player.z();
                let length = (dx * dx + dz * dz).sqrt().max(f64::EPSILON);
                (dx / length, dz / length)
            }
            None => (0.0, 0.0),
        };

        let report = sim.step_with(FRAME_TIME, horizontal, vertical)?;
        if report.pickups > 0 {
            println!(
                "frame {:>5}: collected {} (+{}) score {} at ({:.2}, {:.2})",
                report.frame,
                report.pickups,
                report.score_delta,
                report.score,
                player.x(),
                player.z()
            );
        }
    }

    println!("\nFinished after {} frames", sim.frame_count());
    println!("Final score: {}", sim.world().player_score().unwrap_or(0));
    println!("Renderables left: {}", sim.world().renderables().count());
    Ok(())
}
