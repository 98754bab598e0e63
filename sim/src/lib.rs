//! Skirmish - Simulation Core
//!
//! A deterministic, fixed-timestep simulation of two large opposing armies.
//! Uses `bevy_ecs` resources and a chained schedule for the per-tick phase
//! order: grid rebuild, collision, movement, firing, forcefield hull,
//! rockets, health ranking.

pub mod api;
pub mod collision;
pub mod components;
pub mod config;
pub mod error;
pub mod hull;
pub mod pathfinding;
pub mod ranking;
pub mod render_bridge;
pub mod spatial;
pub mod systems;
pub mod terrain;
pub mod world;

pub use api::SimWorld;
pub use components::*;
pub use config::{SimConfig, SimTick};
pub use error::{ConfigError, TerrainError};
pub use pathfinding::Pathfinder;
pub use spatial::SpatialGrid;
pub use systems::*;
pub use terrain::{TerrainSnapshot, TerrainType, Tile, TileId, TileTerrain};
pub use world::Snapshot;
