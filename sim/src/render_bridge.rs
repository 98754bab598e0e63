//! Renderer Bridge
//!
//! Flattens a `Snapshot` into one contiguous `f32` buffer that a renderer on
//! the other side of an FFI boundary can walk without any parsing.
//!
//! # Stable FFI Contract
//!
//! Field order and stride are versioned. Any change to the layout bumps
//! `LAYOUT_VERSION`.
//!
//! # Buffer Layout (Version 1)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ HEADER (3 elements)                                             │
//! │   [0] layout version                                            │
//! │   [1] agent_count                                               │
//! │   [2] hull_count                                                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ AGENTS (agent_count × AGENT_STRIDE), in id order                │
//! │   [+0] id                                                       │
//! │   [+1] x                                                        │
//! │   [+2] y                                                        │
//! │   [+3] collision_radius                                         │
//! │   [+4] alignment    (0.0=Blue, 1.0=Red)                         │
//! │   [+5] health                                                   │
//! │   [+6] health_max                                               │
//! │   [+7] is_active    (1.0/0.0)                                   │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ HULL (hull_count × HULL_STRIDE)                                 │
//! │   [+0] x                                                        │
//! │   [+1] y                                                        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rankings are not part of the buffer; they are index lists and travel as
//! JSON with the snapshot.
//!
//! # Determinism
//!
//! The same `Snapshot` always produces the same buffer.

use crate::components::Alignment;
use crate::world::Snapshot;

// ============================================================================
// CONSTANTS - STABLE FFI CONTRACT
// ============================================================================

pub const LAYOUT_VERSION: f32 = 1.0;

/// Number of f32 values in the buffer header.
pub const HEADER_SIZE: usize = 3;

/// Number of f32 values per agent.
pub const AGENT_STRIDE: usize = 8;

/// Number of f32 values per hull vertex.
pub const HULL_STRIDE: usize = 2;

pub const ALIGNMENT_BLUE: f32 = 0.0;
pub const ALIGNMENT_RED: f32 = 1.0;

pub const FIELD_ID: usize = 0;
pub const FIELD_X: usize = 1;
pub const FIELD_Y: usize = 2;
pub const FIELD_RADIUS: usize = 3;
pub const FIELD_ALIGNMENT: usize = 4;
pub const FIELD_HEALTH: usize = 5;
pub const FIELD_HEALTH_MAX: usize = 6;
pub const FIELD_IS_ACTIVE: usize = 7;

#[inline]
pub fn alignment_to_id(alignment: Alignment) -> f32 {
    match alignment {
        Alignment::Blue => ALIGNMENT_BLUE,
        Alignment::Red => ALIGNMENT_RED,
    }
}

// ============================================================================
// SERIALIZATION
// ============================================================================

/// Flatten a snapshot into the versioned buffer layout.
pub fn snapshot_to_buffer(snapshot: &Snapshot) -> Vec<f32> {
    let agent_count = snapshot.agents.len();
    let hull_count = snapshot.hull.len();
    let buffer_size = calculate_buffer_size(agent_count, hull_count);

    let mut buffer = Vec::with_capacity(buffer_size);

    buffer.push(LAYOUT_VERSION);
    buffer.push(agent_count as f32);
    buffer.push(hull_count as f32);

    for agent in &snapshot.agents {
        buffer.extend_from_slice(&[
            agent.id as f32,
            agent.x,
            agent.y,
            agent.collision_radius,
            alignment_to_id(agent.alignment),
            agent.health as f32,
            agent.health_max as f32,
            if agent.active { 1.0 } else { 0.0 },
        ]);
    }

    for vertex in &snapshot.hull {
        buffer.push(vertex.x);
        buffer.push(vertex.y);
    }

    debug_assert_eq!(buffer.len(), buffer_size, "Buffer size mismatch");
    buffer
}

/// `HEADER_SIZE + agent_count * AGENT_STRIDE + hull_count * HULL_STRIDE`
#[inline]
pub fn calculate_buffer_size(agent_count: usize, hull_count: usize) -> usize {
    HEADER_SIZE + agent_count * AGENT_STRIDE + hull_count * HULL_STRIDE
}

/// Agent and hull counts from a buffer header, if the buffer has one of the
/// current version.
pub fn parse_header(buffer: &[f32]) -> Option<(usize, usize)> {
    match buffer {
        [version, agents, hull, ..] if *version == LAYOUT_VERSION => Some((*agents as usize, *hull as usize)),
        _ => None,
    }
}

#[inline]
pub const fn agent_offset(agent_index: usize) -> usize {
    HEADER_SIZE + agent_index * AGENT_STRIDE
}

#[inline]
pub const fn hull_offset(agent_count: usize, vertex_index: usize) -> usize {
    HEADER_SIZE + agent_count * AGENT_STRIDE + vertex_index * HULL_STRIDE
}

// ============================================================================
// TESTS
// ============================================================================
