//! The player entity: movement with terrain slide, knockback, health

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Aabb, bounce_against_bounds, circle_vs_boxes, damp, slide_along};
use crate::consts::*;
use crate::tuning::PlayerTuning;

/// Sword swing animation, advanced by the stepper
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swing {
    /// 0 = rest, 1 = full extension
    pub progress: f32,
    pub swinging: bool,
    /// +1 while extending, -2 while returning
    pub direction: f32,
}

impl Default for Swing {
    fn default() -> Self {
        Self {
            progress: 0.0,
            swinging: false,
            direction: 1.0,
        }
    }
}

impl Swing {
    pub fn start(&mut self) {
        if !self.swinging {
            self.swinging = true;
            self.direction = 1.0;
        }
    }

    pub fn advance(&mut self, dt: f32) {
        if !self.swinging {
            return;
        }
        self.progress += SWING_SPEED * self.direction * dt;
        if self.progress >= 1.0 {
            self.progress = 1.0;
            self.direction = -2.0;
        }
        if self.progress <= 0.0 {
            *self = Self::default();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Knockback velocity (movement intent is applied separately)
    pub vel: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub attack: f32,
    pub attack_range: f32,
    pub defense: f32,
    pub swing: Swing,
}

impl Player {
    pub fn new(tuning: &PlayerTuning) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            health: tuning.max_health,
            max_health: tuning.max_health,
            speed: tuning.speed,
            attack: tuning.attack,
            attack_range: tuning.attack_range,
            defense: tuning.defense,
            swing: Swing::default(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Subtract health, clamped at zero; returns the damage actually taken
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health - amount.max(0.0)).max(0.0);
        before - self.health
    }

    /// Restore health, clamped at max; returns the amount actually healed
    pub fn heal(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health + amount.max(0.0)).min(self.max_health);
        self.health - before
    }

    /// Walk along `intent` for one frame, sliding along obstacles
    pub fn walk(&mut self, intent: Vec2, dt: f32, obstacles: &[Aabb], half_extent: f32) {
        let dir = intent.normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        let motion = dir * self.speed * dt;

        let contact = circle_vs_boxes(self.pos + motion, PLAYER_TERRAIN_RADIUS, obstacles);
        if !contact.hit {
            self.pos += motion;
        } else if contact.normal != Vec2::ZERO {
            let slide = slide_along(motion, contact.normal);
            let slid = circle_vs_boxes(self.pos + slide, PLAYER_TERRAIN_RADIUS, obstacles);
            if !slid.hit {
                self.pos += slide;
            }
        }

        let (pos, vel) =
            bounce_against_bounds(self.pos, self.vel, half_extent, PLAYER_MOVE_RESTITUTION);
        self.pos = pos;
        self.vel = vel;
    }

    /// Integrate knockback velocity with wall bounce and damping
    pub fn integrate_knockback(&mut self, dt: f32, half_extent: f32) {
        if self.vel == Vec2::ZERO {
            return;
        }
        self.pos += self.vel * dt;
        let (pos, vel) = bounce_against_bounds(self.pos, self.vel, half_extent, WALL_RESTITUTION);
        self.pos = pos;
        self.vel = damp(vel, KNOCKBACK_DAMPING, dt);
    }
}
