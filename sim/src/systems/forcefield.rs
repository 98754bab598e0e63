//! Forcefield - the convex hull around every active agent.
//!
//! Recomputed from scratch each tick after movement. Rockets that touch any
//! hull edge are absorbed.

use crate::components::*;
use crate::hull::gift_wrap;
use bevy_ecs::prelude::*;

/// Hull vertices for the current tick, first vertex leftmost.
#[derive(Resource, Debug, Default, Clone)]
pub struct ForcefieldHull {
    pub vertices: Vec<Vec2>,
}

impl ForcefieldHull {
    /// Hull edges as vertex pairs, closing back to the first vertex.
    ///
    /// A single-point hull yields one zero-length edge.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// Whether a circle touches the segment `a`-`b`.
pub fn circle_segment_intersect(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    let segment = b - a;
    let len_sq = segment.sqr_length();
    let t = if len_sq > 0.0 {
        ((center - a).dot(segment) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = a + segment * t;
    closest.sqr_distance(center) <= radius * radius
}

/// System that rebuilds the hull from active agent positions.
pub fn forcefield_hull_system(store: Res<AgentStore>, mut hull: ResMut<ForcefieldHull>) {
    let points: Vec<Vec2> = store
        .as_slice()
        .iter()
        .filter(|a| a.active)
        .map(|a| a.position)
        .collect();
    hull.vertices = gift_wrap(&points);
}

/// System that absorbs rockets touching the forcefield.
pub fn rocket_forcefield_system(hull: Res<ForcefieldHull>, mut rockets: ResMut<RocketStore>) {
    if hull.vertices.is_empty() {
        return;
    }
    for rocket in rockets.rockets.iter_mut().filter(|r| r.active) {
        if hull
            .edges()
            .any(|(a, b)| circle_segment_intersect(a, b, rocket.position, rocket.collision_radius))
        {
            rocket.active = false;
        }
    }
}
