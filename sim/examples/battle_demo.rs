//! Full two-army battle, headless.
//!
//! Run with: cargo run --example battle_demo --release -- [terrain.txt]
//! Set RUST_LOG=skirmish_sim=debug for per-tick summaries.

use skirmish_sim::{Alignment, ConfigError, SimConfig, SimWorld};
use std::time::Instant;

const MAX_TICKS: u64 = 2000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn main() -> Result<(), ConfigError> {
    init_tracing();

    let config = SimConfig {
        terrain_path: std::env::args().nth(1).map(Into::into),
        ..SimConfig::default()
    };

    println!("=== Skirmish - Battle Demo ===\n");
    let mut sim = SimWorld::new_battle(config)?;
    print_status(&sim);

    let start = Instant::now();
    while sim.current_tick() < MAX_TICKS {
        sim.tick();

        if sim.current_tick() % 200 == 0 {
            print_status(&sim);
        }
        if sim.active_count(Alignment::Blue) == 0 || sim.active_count(Alignment::Red) == 0 {
            break;
        }
    }
    let elapsed = start.elapsed();

    println!(
        "\n{} ticks in {:?} ({:.2} ms/tick)",
        sim.current_tick(),
        elapsed,
        elapsed.as_secs_f64() * 1000.0 / sim.current_tick().max(1) as f64
    );

    for alignment in [Alignment::Blue, Alignment::Red] {
        let weakest: Vec<String> = sim
            .ranked(alignment)
            .iter()
            .take(5)
            .filter_map(|&id| {
                sim.agent(id)
                    .map(|a| format!("#{}={} ({:.0}%)", id.0, a.health, a.health_fraction() * 100.0))
            })
            .collect();
        println!("  {} weakest: {}", alignment.as_str(), weakest.join(", "));
    }
    Ok(())
}

fn print_status(sim: &SimWorld) {
    let stats = sim.combat_stats();
    println!(
        "--- Tick {} --- blue={} red={} rockets={} fired={} kills={} hull={}",
        sim.current_tick(),
        sim.active_count(Alignment::Blue),
        sim.active_count(Alignment::Red),
        sim.rockets().len(),
        stats.rockets_fired,
        stats.kills,
        sim.hull().len()
    );
}
