//! arena: a small scripted scenario for the loco character framework.
//!
//! Four characters share a walled arena:
//!
//! - a runner patrols the floor and climbs onto the platform,
//! - a scout follows the runner,
//! - a gunner attacks a training dummy that is deleted halfway through,
//!   after which the gunner falls through to its queued move,
//! - the dummy itself.
//!
//! Pass a JSON file as the first argument to override [`ArenaConfig`];
//! set `RUST_LOG=debug` to watch task transitions and replans.

mod scene;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use loco_core::{EntityHandle, SimConfig};
use loco_motion::CharacterConfig;
use loco_nav::PathConfig;
use loco_output::{CsvWriter, SimOutputObserver};
use loco_sim::{CharacterSpawn, SimBuilder};
use loco_task::{AttackConfig, FireRange, SimpleWeapon, Task, TaskRegistry};

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
struct ArenaConfig {
    sim:        SimConfig,
    character:  CharacterConfig,
    path:       PathConfig,
    attack:     AttackConfig,
    /// Tick at which the dummy is deleted.
    delete_at:  u64,
    output_dir: String,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            sim:        SimConfig {
                total_ticks: 1_200, // 20 s at 60 Hz
                output_interval_ticks: 30,
                seed: 42,
                ..SimConfig::default()
            },
            character:  CharacterConfig::default(),
            path:       PathConfig::default(),
            attack:     AttackConfig { aim_spread: 0.02, ..AttackConfig::default() },
            delete_at:  600,
            output_dir: "output/arena".into(),
        }
    }
}

fn load_config() -> Result<ArenaConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(ArenaConfig::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {path}"))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = load_config()?;

    println!("=== arena: loco character framework ===");
    println!(
        "Ticks: {}  |  dt: {:.4} s  |  Seed: {}",
        config.sim.total_ticks, config.sim.tick_duration_secs, config.sim.seed
    );

    // 1. World and navigation.
    let world = scene::build_world()?;
    let graph = scene::build_graph();
    println!("Waypoint graph: {} nodes, {} links", graph.node_count(), graph.link_count());

    let mut sim = SimBuilder::new(config.sim.clone(), world, graph).capacity(8).build()?;

    // 2. Cast.
    let spawn = |feet: Vec3| CharacterSpawn {
        config: config.character.clone(),
        path: config.path.clone(),
        attack: config.attack.clone(),
        ..CharacterSpawn::at(feet)
    };

    let runner = sim.spawn_character(spawn(Vec3::new(-8.0, -8.0, 0.0)))?;
    let scout = sim.spawn_character(spawn(Vec3::new(-10.0, -8.0, 0.0)))?;
    let dummy = sim.spawn_character(spawn(Vec3::new(6.0, -6.0, 0.0)))?;
    let gunner = sim.spawn_character(
        spawn(Vec3::new(-6.0, -2.0, 0.0))
            .with_weapon(SimpleWeapon::hitscan(FireRange::new(0.0, 25.0), 0.4)),
    )?;

    // 3. Orders.
    for (i, corner) in [Vec3::new(8.0, -8.0, 0.0), Vec3::new(8.0, 8.0, scene::PLATFORM_HEIGHT), Vec3::new(-8.0, 8.0, 0.0)]
        .into_iter()
        .enumerate()
    {
        sim.do_task(runner, Task::move_to(corner, 1.0), i > 0)?;
    }
    sim.do_task(scout, Task::follow(runner, 3.0), false)?;
    sim.do_task(gunner, Task::attack(dummy), false)?;
    sim.do_task(gunner, Task::move_to(Vec3::new(-8.0, 8.0, 0.0), 1.5), true)?;

    // 4. Output.
    let dir = Path::new(&config.output_dir);
    let writer = CsvWriter::new(dir)?;
    let mut obs = SimOutputObserver::new(writer, &config.sim);

    // 5. Run, deleting the dummy partway.
    let t0 = Instant::now();
    sim.run_ticks(config.delete_at.min(config.sim.total_ticks), &mut obs)?;
    let saved = sim.save_character(gunner)?;
    if sim.entities.is_alive(dummy) {
        sim.delete_entity(dummy)?;
        log::info!("{}: dummy deleted", sim.clock);
    }
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }

    // 6. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("Output written to {}", dir.display());
    println!();
    println!("{:<8} {:<26} {:<8} {:<8} {:<6}", "Entity", "Feet", "Ground", "Task", "Queue");
    println!("{}", "-".repeat(60));
    for (name, handle) in [("runner", runner), ("scout", scout), ("gunner", gunner), ("dummy", dummy)] {
        print_row(&sim, name, handle);
    }

    // 7. Persistence round trip: restore the gunner's pre-deletion state
    //    onto a fresh character.
    let json = saved.to_json()?;
    let clone = sim.spawn_character(spawn(Vec3::ZERO))?;
    let snapshot = loco_sim::CharacterSnapshot::from_json(&json)?;
    sim.load_character(clone, &snapshot, &TaskRegistry::builtin())?;
    println!();
    println!("Restored gunner snapshot ({} bytes of JSON):", json.len());
    print_row(&sim, "clone", clone);

    Ok(())
}

fn print_row<W, N>(sim: &loco_sim::Sim<W, N>, name: &str, handle: EntityHandle)
where
    W: loco_physics::PhysicsWorld,
    N: loco_nav::Navigator,
{
    let Some(character) = sim.character(handle) else {
        println!("{name:<8} (deleted)");
        return;
    };
    let feet = sim.feet(handle).map_or_else(|| "-".to_owned(), |f| format!("{:.2} {:.2} {:.2}", f.x, f.y, f.z));
    println!(
        "{:<8} {:<26} {:<8} {:<8} {:<6}",
        name,
        feet,
        if character.controller.is_on_ground() { "yes" } else { "no" },
        character.tasks.current().kind().tag(),
        character.tasks.queue().len(),
    );
}
