//! Snapshot types.
//!
//! The `Snapshot` struct is a serializable, read-only view of one tick that
//! the renderer consumes.

use crate::components::*;
use crate::systems::{CombatStats, ForcefieldHull, HealthRanking};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a single agent's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: u32,
    pub alignment: Alignment,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub collision_radius: f32,
    pub health: i32,
    pub health_max: i32,
    pub active: bool,
}

/// Snapshot of a rocket in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocketSnapshot {
    pub alignment: Alignment,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

/// Complete simulation state for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current simulation tick.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub time: f32,
    /// Every agent ever spawned, in id order; inactive ones included.
    pub agents: Vec<AgentSnapshot>,
    pub rockets: Vec<RocketSnapshot>,
    /// Forcefield vertices, first vertex leftmost.
    pub hull: Vec<Vec2>,
    /// Active agent ids by ascending health.
    pub ranked_blue: Vec<u32>,
    pub ranked_red: Vec<u32>,
    pub active_blue: usize,
    pub active_red: usize,
    pub rockets_fired: u64,
    pub kills: u64,
}

impl Snapshot {
    /// Build a snapshot from the simulation resources.
    ///
    /// Missing resources produce empty sections rather than a panic.
    pub fn from_world(world: &World, tick: u64, time: f32) -> Self {
        let mut snapshot = Self {
            tick,
            time,
            ..Default::default()
        };

        if let Some(store) = world.get_resource::<AgentStore>() {
            snapshot.agents = store
                .iter()
                .map(|(id, a)| AgentSnapshot {
                    id: id.0,
                    alignment: a.alignment,
                    x: a.position.x,
                    y: a.position.y,
                    vx: a.velocity.x,
                    vy: a.velocity.y,
                    collision_radius: a.collision_radius,
                    health: a.health,
                    health_max: a.max_health,
                    active: a.active,
                })
                .collect();
            snapshot.active_blue = store.active_count(Alignment::Blue);
            snapshot.active_red = store.active_count(Alignment::Red);
        }

        if let Some(rockets) = world.get_resource::<RocketStore>() {
            snapshot.rockets = rockets
                .rockets
                .iter()
                .filter(|r| r.active)
                .map(|r| RocketSnapshot {
                    alignment: r.alignment,
                    x: r.position.x,
                    y: r.position.y,
                    vx: r.velocity.x,
                    vy: r.velocity.y,
                })
                .collect();
        }

        if let Some(hull) = world.get_resource::<ForcefieldHull>() {
            snapshot.hull = hull.vertices.clone();
        }

        if let Some(ranking) = world.get_resource::<HealthRanking>() {
            snapshot.ranked_blue = ranking.blue.iter().map(|id| id.0).collect();
            snapshot.ranked_red = ranking.red.iter().map(|id| id.0).collect();
        }

        if let Some(stats) = world.get_resource::<CombatStats>() {
            snapshot.rockets_fired = stats.rockets_fired;
            snapshot.kills = stats.kills;
        }

        snapshot
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
