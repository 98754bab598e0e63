//! Simulation configuration.

use crate::components::Vec2;
use crate::error::ConfigError;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tunables for a simulation run.
///
/// All distances are pixels and all durations are ticks unless noted.
/// Missing JSON fields fall back to the defaults below.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed timestep in seconds used by `SimWorld::step`.
    pub fixed_timestep: f32,
    /// Playfield extent; rockets leaving it are dropped.
    pub world_width: f32,
    pub world_height: f32,
    /// Spatial grid cell size.
    pub cell_size: f32,

    // Terrain
    pub tile_size: f32,
    pub terrain_width: usize,
    pub terrain_height: usize,
    /// Layout file; `None` means an all-grass map.
    pub terrain_path: Option<PathBuf>,

    // Agents
    pub agent_radius: f32,
    pub agent_max_speed: f32,
    pub agent_max_health: i32,
    pub reload_ticks: f32,
    /// Per-axis distance at which a waypoint counts as reached.
    pub waypoint_epsilon: f32,

    // Rockets
    pub rocket_speed: f32,
    pub rocket_radius: f32,
    pub rocket_hit_value: i32,

    // Battle layout
    pub agents_per_side: usize,
    pub agents_per_row: usize,
    pub spawn_spacing: f32,
    pub blue_spawn_origin: Vec2,
    pub red_spawn_origin: Vec2,
    /// X coordinate each side marches toward.
    pub blue_destination_x: f32,
    pub red_destination_x: f32,
    /// Added to the spawn row's y to get the destination y.
    pub destination_y_offset: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            world_width: 1280.0,
            world_height: 720.0,
            cell_size: 20.0,

            tile_size: 16.0,
            terrain_width: 80,
            terrain_height: 45,
            terrain_path: None,

            agent_radius: 3.0,
            agent_max_speed: 1.0,
            agent_max_health: 1000,
            reload_ticks: 200.0,
            waypoint_epsilon: 8.0,

            rocket_speed: 3.0,
            rocket_radius: 5.0,
            rocket_hit_value: 60,

            agents_per_side: 2048,
            agents_per_row: 24,
            spawn_spacing: 7.5,
            blue_spawn_origin: Vec2::new(47.0, 39.0),
            red_spawn_origin: Vec2::new(1088.0, 39.0),
            blue_destination_x: 1100.0,
            red_destination_x: 100.0,
            destination_y_offset: 16.0,
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reject values that would stall or divide by zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_timestep > 0.0) {
            return Err(ConfigError::Invalid("fixed_timestep must be positive"));
        }
        if !(self.cell_size > 0.0) {
            return Err(ConfigError::Invalid("cell_size must be positive"));
        }
        if !(self.tile_size > 0.0) {
            return Err(ConfigError::Invalid("tile_size must be positive"));
        }
        if self.terrain_width == 0 || self.terrain_height == 0 {
            return Err(ConfigError::Invalid("terrain dimensions must be non-zero"));
        }
        if !(self.world_width > 0.0 && self.world_height > 0.0) {
            return Err(ConfigError::Invalid("world extent must be positive"));
        }
        if self.agents_per_row == 0 {
            return Err(ConfigError::Invalid("agents_per_row must be non-zero"));
        }
        if self.agent_max_health <= 0 {
            return Err(ConfigError::Invalid("agent_max_health must be positive"));
        }
        Ok(())
    }
}

/// Monotonic count of completed fixed updates.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}
