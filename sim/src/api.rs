//! Public API for the simulation.
//!
//! This module provides the main interface for a renderer (or any other
//! client) to drive the simulation and read its state.
//!
//! ## Fixed Timestep
//!
//! `tick()` runs exactly one fixed update. `step(dt)` accumulates wall time
//! and runs as many whole fixed updates as fit, so behavior does not depend
//! on frame rate.
//!
//! ## Spawning
//!
//! Agents are only added between ticks, never from inside a system, so the
//! agent arena is never resized while a phase holds ids into it. A spawned
//! agent gets its route from the pathfinder once, at spawn time.

use crate::collision::collision_system;
use crate::components::*;
use crate::config::{SimConfig, SimTick};
use crate::error::ConfigError;
use crate::pathfinding::Pathfinder;
use crate::spatial::{spatial_grid_update_system, SpatialGrid};
use crate::systems::*;
use crate::terrain::{TerrainSnapshot, TileTerrain};
use crate::world::Snapshot;
use bevy_ecs::prelude::*;
use tracing::{debug, info};

/// The main simulation world container.
///
/// Holds the ECS world and schedule along with the static terrain and the
/// reusable pathfinder.
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    tick: u64,
    time: f32,
    terrain: TileTerrain,
    pathfinder: Pathfinder,
    /// Accumulated time for fixed timestep.
    time_accumulator: f32,
}

impl SimWorld {
    /// Create an empty simulation with default configuration.
    pub fn new() -> Self {
        let config = SimConfig::default();
        let terrain = TileTerrain::all_grass(config.terrain_width, config.terrain_height, config.tile_size);
        Self::build(config, terrain)
    }

    /// Create an empty simulation.
    ///
    /// The terrain comes from `config.terrain_path` when set; a missing or
    /// malformed layout falls back to all grass. Fails when `config` does not
    /// pass `SimConfig::validate`.
    pub fn with_config(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let terrain = match &config.terrain_path {
            Some(path) => TileTerrain::load_or_default(
                path,
                config.terrain_width,
                config.terrain_height,
                config.tile_size,
            ),
            None => TileTerrain::all_grass(config.terrain_width, config.terrain_height, config.tile_size),
        };
        Ok(Self::build(config, terrain))
    }

    /// Create an empty simulation over an already built terrain.
    pub fn with_terrain(config: SimConfig, terrain: TileTerrain) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, terrain))
    }

    fn build(config: SimConfig, terrain: TileTerrain) -> Self {
        let mut world = World::new();

        world.insert_resource(SpatialGrid::new(config.world_width, config.world_height, config.cell_size));
        world.insert_resource(AgentStore::new());
        world.insert_resource(RocketStore::default());
        world.insert_resource(ForcefieldHull::default());
        world.insert_resource(HealthRanking::default());
        world.insert_resource(CombatStats::default());
        world.insert_resource(SimTick(0));
        world.insert_resource(config);

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                spatial_grid_update_system,
                collision_system,
                movement_system,
                fire_system,
                forcefield_hull_system,
                rocket_system,
                rocket_forcefield_system,
                rocket_cleanup_system,
                health_ranking_system,
            )
                .chain(),
        );

        Self {
            world,
            schedule,
            tick: 0,
            time: 0.0,
            terrain,
            pathfinder: Pathfinder::new(),
            time_accumulator: 0.0,
        }
    }

    /// Create the full two-army battle described by `config`.
    ///
    /// Both sides are laid out in rows of `agents_per_row` and march to the
    /// opposite flank, keeping their row's height.
    pub fn new_battle(config: SimConfig) -> Result<Self, ConfigError> {
        let mut sim = Self::with_config(config.clone())?;

        let sides = [
            (Alignment::Blue, config.blue_spawn_origin, config.blue_destination_x),
            (Alignment::Red, config.red_spawn_origin, config.red_destination_x),
        ];
        for (alignment, origin, destination_x) in sides {
            for i in 0..config.agents_per_side {
                let column = (i % config.agents_per_row) as f32;
                let row = (i / config.agents_per_row) as f32;
                let position = Vec2::new(
                    origin.x + column * config.spawn_spacing,
                    origin.y + row * config.spawn_spacing,
                );
                let destination = Vec2::new(destination_x, position.y + config.destination_y_offset);
                sim.spawn_agent(alignment, position, destination);
            }
        }

        let (map_w, map_h) = sim.terrain.pixel_extent();
        let (grid_cols, grid_rows) = sim.spatial_grid().dimensions();
        info!(
            blue = config.agents_per_side,
            red = config.agents_per_side,
            map_w,
            map_h,
            grid_cols,
            grid_rows,
            "Battle spawned"
        );
        Ok(sim)
    }

    /// Spawn an agent and route it toward `destination`.
    ///
    /// An unreachable destination leaves the agent parked where it spawned.
    pub fn spawn_agent(&mut self, alignment: Alignment, position: Vec2, destination: Vec2) -> AgentId {
        let route = self.pathfinder.get_route(&self.terrain, position, destination);

        let config = self.config();
        let mut agent = Agent::new(
            position,
            alignment,
            config.agent_radius,
            config.agent_max_health,
            config.agent_max_speed,
        );
        agent.set_route(route);

        self.world.resource_mut::<AgentStore>().push(agent)
    }

    /// Spawn an agent that holds its position.
    pub fn spawn_idle_agent(&mut self, alignment: Alignment, position: Vec2) -> AgentId {
        let config = self.config();
        let agent = Agent::new(
            position,
            alignment,
            config.agent_radius,
            config.agent_max_health,
            config.agent_max_speed,
        );
        self.world.resource_mut::<AgentStore>().push(agent)
    }

    /// Run exactly one fixed update.
    pub fn tick(&mut self) {
        let dt = self.config().fixed_timestep;
        self.fixed_update(dt);
    }

    /// Step the simulation forward by `dt` seconds of wall time.
    ///
    /// Returns the number of fixed updates that ran.
    pub fn step(&mut self, dt: f32) -> u32 {
        let fixed_dt = self.config().fixed_timestep;

        self.time_accumulator += dt;

        let mut ran = 0;
        while self.time_accumulator >= fixed_dt {
            self.fixed_update(fixed_dt);
            self.time_accumulator -= fixed_dt;
            ran += 1;
        }
        ran
    }

    fn fixed_update(&mut self, dt: f32) {
        self.world.resource_mut::<SimTick>().increment();

        self.schedule.run(&mut self.world);

        self.tick += 1;
        self.time += dt;

        let store = self.world.resource::<AgentStore>();
        debug!(
            tick = self.tick,
            blue = store.active_count(Alignment::Blue),
            red = store.active_count(Alignment::Red),
            rockets = self.world.resource::<RocketStore>().rockets.len(),
            hull = self.world.resource::<ForcefieldHull>().vertices.len(),
            "Tick complete"
        );
    }

    // ========================================================================
    // READ ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &SimConfig {
        self.world.resource::<SimConfig>()
    }

    /// Forcefield vertices from the last tick.
    pub fn hull(&self) -> &[Vec2] {
        &self.world.resource::<ForcefieldHull>().vertices
    }

    /// Active agents of one side by ascending health, as of the last tick.
    pub fn ranked(&self, alignment: Alignment) -> &[AgentId] {
        self.world.resource::<HealthRanking>().for_alignment(alignment)
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents().get(id)
    }

    pub fn agents(&self) -> &AgentStore {
        self.world.resource::<AgentStore>()
    }

    pub fn rockets(&self) -> &[Rocket] {
        &self.world.resource::<RocketStore>().rockets
    }

    pub fn combat_stats(&self) -> CombatStats {
        *self.world.resource::<CombatStats>()
    }

    pub fn active_count(&self, alignment: Alignment) -> usize {
        self.agents().active_count(alignment)
    }

    pub fn terrain(&self) -> &TileTerrain {
        &self.terrain
    }

    /// Get the spatial grid reference (for debugging/visualization).
    pub fn spatial_grid(&self) -> &SpatialGrid {
        self.world.resource::<SpatialGrid>()
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed simulation time.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_world(&self.world, self.tick, self.time)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    pub fn terrain_snapshot(&self) -> TerrainSnapshot {
        TerrainSnapshot::from_terrain(&self.terrain)
    }

    pub fn terrain_snapshot_json(&self) -> String {
        serde_json::to_string(&self.terrain_snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}
