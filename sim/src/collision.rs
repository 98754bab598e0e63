//! Agent-agent collision resolution.
//!
//! Runs in two passes:
//!
//! 1. **Gather** - for each active agent, scan the 3x3 cell neighborhood of
//!    the freshly rebuilt grid and sum one unit repulsion vector per
//!    overlapping neighbor. Read-only, so it runs on rayon under the
//!    `parallel` feature.
//! 2. **Apply** - add each summed push to its agent's force accumulator.
//!
//! Every agent is evaluated on its own; A pushing B does not exempt B from
//! pushing A. Nothing is deactivated here. The forces are consumed by the
//! movement step later in the same tick.

use crate::components::{AgentId, AgentStore, Vec2};
use crate::spatial::SpatialGrid;
use bevy_ecs::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Magnitude of the push contributed by a single overlapping neighbor.
pub const PUSH_MAGNITUDE: f32 = 1.0;

/// Summed repulsion on `id` from every overlapping active neighbor.
fn repulsion(grid: &SpatialGrid, store: &AgentStore, id: AgentId) -> Vec2 {
    let agent = &store[id];
    let mut force = Vec2::ZERO;

    for other_id in grid.neighborhood(agent.position) {
        if other_id == id {
            continue;
        }
        let other = &store[other_id];
        if !other.active {
            continue;
        }
        let reach = agent.collision_radius + other.collision_radius;
        if agent.position.sqr_distance(other.position) < reach * reach {
            force += (agent.position - other.position).normalized() * PUSH_MAGNITUDE;
        }
    }

    force
}

/// Accumulate collision pushes for every active agent.
///
/// Expects `grid` to have been rebuilt from `store` this tick. Returns the
/// number of agents that received a non-zero push.
pub fn collision_pass(grid: &SpatialGrid, store: &mut AgentStore) -> usize {
    let candidates: Vec<AgentId> = store
        .iter()
        .filter(|(_, a)| a.active)
        .map(|(id, _)| id)
        .collect();

    // GATHER (read-only)
    #[cfg(feature = "parallel")]
    let pushes: Vec<(AgentId, Vec2)> = {
        let store_ref: &AgentStore = store;
        candidates
            .par_iter()
            .map(|&id| (id, repulsion(grid, store_ref, id)))
            .filter(|(_, f)| *f != Vec2::ZERO)
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let pushes: Vec<(AgentId, Vec2)> = candidates
        .iter()
        .map(|&id| (id, repulsion(grid, store, id)))
        .filter(|(_, f)| *f != Vec2::ZERO)
        .collect();

    // APPLY (sequential)
    for &(id, force) in &pushes {
        store[id].force += force;
    }

    pushes.len()
}

/// System wrapper around `collision_pass`.
pub fn collision_system(grid: Res<SpatialGrid>, mut store: ResMut<AgentStore>) {
    collision_pass(&grid, &mut store);
}
