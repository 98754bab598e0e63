//! Core data for the Skirmish simulation.
//!
//! Agents live in an arena (`AgentStore`) and are addressed by stable
//! `AgentId` indices. Nothing outside the store ever holds a reference into
//! it across a tick; the grid, hull and rankings all keep ids.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ops::{Add, AddAssign, Mul, Sub};

// ============================================================================
// VECTOR MATH
// ============================================================================

/// 2D vector in pixel space (x = right, y = down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn sqr_length(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.sqr_length().sqrt()
    }

    /// Unit vector in the same direction, or zero for a (near) zero vector.
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len < 0.0001 {
            Self::ZERO
        } else {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        }
    }

    #[inline]
    pub fn sqr_distance(&self, other: Vec2) -> f32 {
        (*self - other).sqr_length()
    }

    /// Z component of the cross product of `self` and `other`.
    #[inline]
    pub fn cross(&self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn dot(&self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

// ============================================================================
// IDENTITY
// ============================================================================

/// Stable index of an agent inside the `AgentStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Side an agent fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    Blue,
    Red,
}

impl Alignment {
    pub fn opposing(self) -> Self {
        match self {
            Alignment::Blue => Alignment::Red,
            Alignment::Red => Alignment::Blue,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Blue => "Blue",
            Alignment::Red => "Red",
        }
    }
}

/// Alignment predicate for radius queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentFilter {
    Any,
    Only(Alignment),
}

impl AlignmentFilter {
    #[inline]
    pub fn matches(self, alignment: Alignment) -> bool {
        match self {
            AlignmentFilter::Any => true,
            AlignmentFilter::Only(a) => a == alignment,
        }
    }
}

// ============================================================================
// AGENT
// ============================================================================

/// A single combat unit.
///
/// Deactivation is terminal: an inactive agent stays in the store but is
/// skipped by every phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Repulsion accumulated during collision resolution, consumed by `advance`.
    pub force: Vec2,
    pub target: Vec2,
    pub route: VecDeque<Vec2>,
    pub health: i32,
    pub max_health: i32,
    pub collision_radius: f32,
    pub max_speed: f32,
    pub alignment: Alignment,
    pub active: bool,
    /// Ticks until the next rocket is ready.
    pub reload_time: f32,
    pub reloaded: bool,
}

impl Agent {
    pub fn new(
        position: Vec2,
        alignment: Alignment,
        collision_radius: f32,
        max_health: i32,
        max_speed: f32,
    ) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            target: position,
            route: VecDeque::new(),
            health: max_health,
            max_health,
            collision_radius,
            max_speed,
            alignment,
            active: true,
            reload_time: 1.0,
            reloaded: false,
        }
    }

    /// Replace the waypoint queue. The front waypoint becomes the immediate
    /// target; an empty route parks the agent on its current position.
    pub fn set_route(&mut self, route: Vec<Vec2>) {
        let mut route: VecDeque<Vec2> = route.into();
        match route.pop_front() {
            Some(first) => {
                self.target = first;
                self.route = route;
            }
            None => {
                self.target = self.position;
                self.route.clear();
            }
        }
    }

    /// Accumulate a push in `direction`.
    pub fn push(&mut self, direction: Vec2, magnitude: f32) {
        self.force += direction * magnitude;
    }

    /// Apply damage. Returns true if this hit deactivated the agent.
    pub fn hit(&mut self, value: i32) -> bool {
        self.health -= value;
        if self.health <= 0 {
            self.active = false;
            return true;
        }
        false
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Start the reload countdown after firing.
    pub fn reload(&mut self, reload_ticks: f32) {
        self.reloaded = false;
        self.reload_time = reload_ticks;
    }

    /// One movement integration step.
    ///
    /// Consumes the accumulated force, counts down the reload timer and pops
    /// the next waypoint once the current target is within `epsilon` on both
    /// axes.
    pub fn advance(&mut self, epsilon: f32) {
        let direction = if self.target != self.position {
            (self.target - self.position).normalized()
        } else {
            Vec2::ZERO
        };

        self.velocity = direction + self.force;
        self.position += self.velocity * (self.max_speed * 0.5);

        self.reload_time -= 1.0;
        if self.reload_time <= 0.0 {
            self.reloaded = true;
        }

        self.force = Vec2::ZERO;

        if !self.route.is_empty()
            && (self.position.x - self.target.x).abs() < epsilon
            && (self.position.y - self.target.y).abs() < epsilon
        {
            if let Some(next) = self.route.pop_front() {
                self.target = next;
            }
        }
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0 {
            0.0
        } else {
            (self.health as f32 / self.max_health as f32).clamp(0.0, 1.0)
        }
    }
}

/// Arena of all agents ever spawned.
///
/// Only grows between ticks; ids handed out stay valid for the lifetime of
/// the store.
#[derive(Resource, Debug, Default)]
pub struct AgentStore {
    agents: Vec<Agent>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, agent: Agent) -> AgentId {
        let id = AgentId(self.agents.len() as u32);
        self.agents.push(agent);
        id
    }

    #[inline]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn as_slice(&self) -> &[Agent] {
        &self.agents
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &Agent)> {
        self.agents
            .iter()
            .enumerate()
            .map(|(i, a)| (AgentId(i as u32), a))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (AgentId, &mut Agent)> {
        self.agents
            .iter_mut()
            .enumerate()
            .map(|(i, a)| (AgentId(i as u32), a))
    }

    pub fn ids(&self) -> impl Iterator<Item = AgentId> {
        (0..self.agents.len() as u32).map(AgentId)
    }

    pub fn active_count(&self, alignment: Alignment) -> usize {
        self.agents
            .iter()
            .filter(|a| a.active && a.alignment == alignment)
            .count()
    }
}

impl std::ops::Index<AgentId> for AgentStore {
    type Output = Agent;

    fn index(&self, id: AgentId) -> &Agent {
        &self.agents[id.index()]
    }
}

impl std::ops::IndexMut<AgentId> for AgentStore {
    fn index_mut(&mut self, id: AgentId) -> &mut Agent {
        &mut self.agents[id.index()]
    }
}

// ============================================================================
// PROJECTILES
// ============================================================================

/// A rocket in flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rocket {
    pub position: Vec2,
    pub velocity: Vec2,
    pub collision_radius: f32,
    pub alignment: Alignment,
    pub active: bool,
}

impl Rocket {
    pub fn new(position: Vec2, velocity: Vec2, collision_radius: f32, alignment: Alignment) -> Self {
        Self {
            position,
            velocity,
            collision_radius,
            alignment,
            active: true,
        }
    }

    pub fn advance(&mut self) {
        self.position += self.velocity;
    }

    /// Circle-circle overlap test.
    pub fn intersects(&self, center: Vec2, radius: f32) -> bool {
        let reach = self.collision_radius + radius;
        self.position.sqr_distance(center) < reach * reach
    }
}

/// Rockets currently in flight. Unlike agents these are removed once spent.
#[derive(Resource, Debug, Default)]
pub struct RocketStore {
    pub rockets: Vec<Rocket>,
}
