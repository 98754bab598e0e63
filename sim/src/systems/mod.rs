//! ECS systems for the skirmish simulation.
//!
//! Systems operate on resources only; agents and rockets live in arenas.
//!
//! ## Phase Order
//!
//! One fixed update runs these strictly in sequence (`.chain()`):
//!
//! 1. `spatial_grid_update_system` - rebuilds the grid from current positions
//! 2. `collision_system` - accumulates repulsion from the fresh grid
//! 3. `movement_system` - integrates motion, consuming this tick's forces
//! 4. `fire_system` - nearest-opposing acquisition and rocket launch
//! 5. `forcefield_hull_system` - gift-wraps the active agents
//! 6. `rocket_system` - rocket flight and agent hits
//! 7. `rocket_forcefield_system` - hull edges absorb rockets
//! 8. `rocket_cleanup_system` - drops spent rockets
//! 9. `health_ranking_system` - display order, read-only on agents
//!
//! Grid rebuild must precede collision, and collision must precede
//! movement, or pushes lag a tick behind positions.

pub mod combat;
pub mod forcefield;
pub mod movement;
pub mod ranking;

pub use combat::*;
pub use forcefield::*;
pub use movement::*;
pub use ranking::*;
