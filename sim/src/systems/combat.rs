//! Combat systems - target acquisition, rocket flight and damage.
//!
//! ## Phases
//!
//! 1. `fire_system` - every active, reloaded agent asks the grid for its
//!    nearest opposing agent and launches a rocket at it. Target lookup is
//!    read-only and runs as a gather pass (on rayon with `parallel`); rocket
//!    spawning and reload resets are applied afterwards in agent order.
//! 2. `rocket_system` - rockets advance, leave the playfield or hit the
//!    first overlapping opposing agent.
//! 3. `rocket_cleanup_system` - spent rockets are dropped.
//!
//! The forcefield check runs between 2 and 3 (see `forcefield`).

use crate::components::*;
use crate::config::SimConfig;
use crate::spatial::SpatialGrid;
use bevy_ecs::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Running combat totals.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CombatStats {
    pub rockets_fired: u64,
    pub hits: u64,
    pub kills: u64,
    /// Active agents whose nearest-opposing search came back empty this tick.
    pub held_fire: u32,
}

/// A pending launch produced by the gather pass.
#[derive(Debug, Clone, Copy)]
struct FireIntent {
    shooter: AgentId,
    target: Option<AgentId>,
}

fn acquire(grid: &SpatialGrid, store: &AgentStore, shooter: AgentId) -> FireIntent {
    FireIntent {
        shooter,
        target: grid.nearest_opposing(store, shooter),
    }
}

/// System that launches rockets from reloaded agents.
///
/// When no opposing agent is within range the agent holds fire and stays
/// reloaded, so it tries again next tick.
///
/// Targets come from the grid built at the start of the tick, before
/// movement. An agent that crossed a cell boundary this tick is still filed
/// under its old cell, so the chosen target can differ from the true nearest
/// by at most one movement step.
pub fn fire_system(
    config: Res<SimConfig>,
    grid: Res<SpatialGrid>,
    mut store: ResMut<AgentStore>,
    mut rockets: ResMut<RocketStore>,
    mut stats: ResMut<CombatStats>,
) {
    let shooters: Vec<AgentId> = store
        .iter()
        .filter(|(_, a)| a.active && a.reloaded)
        .map(|(id, _)| id)
        .collect();

    #[cfg(feature = "parallel")]
    let intents: Vec<FireIntent> = {
        let store_ref: &AgentStore = &store;
        let grid_ref: &SpatialGrid = &grid;
        shooters
            .par_iter()
            .map(|&id| acquire(grid_ref, store_ref, id))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let intents: Vec<FireIntent> = shooters.iter().map(|&id| acquire(&grid, &store, id)).collect();

    stats.held_fire = 0;
    for intent in intents {
        let Some(target) = intent.target else {
            stats.held_fire += 1;
            continue;
        };
        let target_position = store[target].position;
        let shooter = &mut store[intent.shooter];

        let heading = (target_position - shooter.position).normalized();
        rockets.rockets.push(Rocket::new(
            shooter.position,
            heading * config.rocket_speed,
            config.rocket_radius,
            shooter.alignment,
        ));
        shooter.reload(config.reload_ticks);
        stats.rockets_fired += 1;
    }
}

/// System that moves rockets and resolves rocket-agent hits.
///
/// Hit candidates come from the grid, which was built before movement; the
/// query radius includes one full movement step of slack so agents that
/// crossed a cell border since the rebuild are still found. Among the
/// overlapping opposing agents the lowest id is hit.
pub fn rocket_system(
    config: Res<SimConfig>,
    grid: Res<SpatialGrid>,
    mut store: ResMut<AgentStore>,
    mut rockets: ResMut<RocketStore>,
    mut stats: ResMut<CombatStats>,
) {
    let query_radius = config.rocket_radius + config.agent_radius + config.agent_max_speed;

    for rocket in rockets.rockets.iter_mut() {
        if !rocket.active {
            continue;
        }
        rocket.advance();

        let p = rocket.position;
        if p.x < 0.0 || p.y < 0.0 || p.x > config.world_width || p.y > config.world_height {
            rocket.active = false;
            continue;
        }

        let mut victim: Option<AgentId> = None;
        grid.visit_radius(
            &store,
            p,
            query_radius,
            AlignmentFilter::Only(rocket.alignment.opposing()),
            |id, _| {
                let agent = &store[id];
                if rocket.intersects(agent.position, agent.collision_radius)
                    && victim.map_or(true, |v| id < v)
                {
                    victim = Some(id);
                }
            },
        );

        if let Some(id) = victim {
            stats.hits += 1;
            if store[id].hit(config.rocket_hit_value) {
                stats.kills += 1;
            }
            rocket.active = false;
        }
    }
}

/// System that drops inactive rockets.
pub fn rocket_cleanup_system(mut rockets: ResMut<RocketStore>) {
    rockets.rockets.retain(|r| r.active);
}
