//! Collision geometry for the square room
//!
//! Everything lives on the ground plane: obstacles are axis-aligned boxes,
//! bodies are circles, and the room itself is the square
//! [-half_extent, half_extent]² that every moving entity bounces inside.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned box given by its center and full extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, width: f32, depth: f32) -> Self {
        Self {
            center,
            size: Vec2::new(width, depth),
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.size / 2.0
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.size / 2.0
    }

    /// Closest point of the box to `p` (p itself when inside)
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }
}

/// Result of a circle-vs-terrain query
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest point on the obstacle surface
    pub point: Vec2,
    /// Surface normal pointing from the obstacle toward the circle center
    pub normal: Vec2,
    /// Penetration depth
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a circle against a set of boxes, returning the first strict overlap
///
/// When the circle center sits inside a box the normal is ZERO: there is no
/// meaningful push direction, and callers treat it as "blocked, no slide".
pub fn circle_vs_boxes(center: Vec2, radius: f32, boxes: &[Aabb]) -> CollisionResult {
    for b in boxes {
        let closest = b.closest_point(center);
        let offset = center - closest;
        let dist_sq = offset.length_squared();
        if dist_sq < radius * radius {
            let dist = dist_sq.sqrt();
            return CollisionResult {
                hit: true,
                point: closest,
                normal: offset.normalize_or_zero(),
                penetration: radius - dist,
            };
        }
    }
    CollisionResult::miss()
}

/// Remove the component of `motion` that points into the surface
///
/// Standard projection: m' = m - (m·n)n
#[inline]
pub fn slide_along(motion: Vec2, normal: Vec2) -> Vec2 {
    motion - normal * motion.dot(normal)
}

/// Keep a body inside the square room, reflecting the velocity component
/// of every wall it crossed scaled by `restitution`
pub fn bounce_against_bounds(
    pos: Vec2,
    vel: Vec2,
    half_extent: f32,
    restitution: f32,
) -> (Vec2, Vec2) {
    let mut pos = pos;
    let mut vel = vel;

    if pos.x < -half_extent {
        pos.x = -half_extent;
        vel.x = -vel.x * restitution;
    }
    if pos.x > half_extent {
        pos.x = half_extent;
        vel.x = -vel.x * restitution;
    }
    if pos.y < -half_extent {
        pos.y = -half_extent;
        vel.y = -vel.y * restitution;
    }
    if pos.y > half_extent {
        pos.y = half_extent;
        vel.y = -vel.y * restitution;
    }

    (pos, vel)
}

/// Direction from `from` to `to`, or `fallback` when the points coincide
#[inline]
pub fn direction_or(from: Vec2, to: Vec2, fallback: Vec2) -> Vec2 {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO { fallback } else { dir }
}

/// Linear velocity damping clamped so it never reverses direction
#[inline]
pub fn damp(vel: Vec2, rate: f32, dt: f32) -> Vec2 {
    vel * (1.0 - rate * dt).max(0.0)
}
