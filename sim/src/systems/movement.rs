//! Movement system - integrates agent motion and consumes waypoints.

use crate::components::*;
use crate::config::SimConfig;
use bevy_ecs::prelude::*;

/// System that advances every active agent by one integration step.
///
/// Must run after collision so that this tick's pushes are applied in the
/// same tick. Inactive agents do not move, reload or consume waypoints.
pub fn movement_system(config: Res<SimConfig>, mut store: ResMut<AgentStore>) {
    let epsilon = config.waypoint_epsilon;
    for (_, agent) in store.iter_mut() {
        if !agent.active {
            continue;
        }
        agent.advance(epsilon);
    }
}
