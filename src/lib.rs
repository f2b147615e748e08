//! Spellcrawl - combat core for a card-driven dungeon crawler
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (projectiles, enemy AI, collisions, loadout)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Half-extent of the square room (positions live in [-ROOM_SIZE, ROOM_SIZE])
    pub const ROOM_SIZE: f32 = 40.0;

    /// Frame length used by the headless runner
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Weapon base values folded by the loadout
    pub const BASE_DAMAGE: f32 = 10.0;
    pub const BASE_SPEED: f32 = 40.0;
    pub const BASE_RANGE: f32 = 25.0;
    /// Slot cooldown in seconds (not scaled by reload cards)
    pub const BASE_RELOAD: f32 = 3.4;
    /// 1.0 = perfect aim, lower = wider random spread
    pub const BASE_ACCURACY: f32 = 0.4;
    pub const SLOT_COUNT: u32 = 5;

    /// Angle between neighbouring projectiles of a multi-shot (radians)
    pub const MULTISHOT_SPREAD: f32 = 0.2;
    /// Max random spread at accuracy 0 (radians, full width)
    pub const INACCURACY_SPREAD: f32 = 0.3;

    /// Projectile tuning
    pub const PROJECTILE_HIT_RADIUS: f32 = 1.0;
    pub const PROJECTILE_KNOCKBACK: f32 = 8.0;
    pub const HOMING_RANGE: f32 = 15.0;
    pub const HOMING_TURN_RATE: f32 = 5.0;
    pub const CHAIN_DAMAGE_FACTOR: f32 = 0.7;
    pub const EXPLOSION_KNOCKBACK: f32 = 12.0;

    /// Collision radii against terrain
    pub const PLAYER_TERRAIN_RADIUS: f32 = 0.8;
    pub const ENEMY_TERRAIN_RADIUS: f32 = 0.7;

    /// Body radii for enemy/player push-apart
    pub const PLAYER_RADIUS: f32 = 1.1;
    pub const ENEMY_RADIUS: f32 = 0.7;
    /// Minimum spacing between two enemies
    pub const ENEMY_SPACING: f32 = 1.0;

    /// Restitution when bouncing off the room boundary
    pub const WALL_RESTITUTION: f32 = 0.6;
    pub const PLAYER_MOVE_RESTITUTION: f32 = 0.65;

    /// Velocity damping rates (fraction per second, linearized)
    pub const KNOCKBACK_DAMPING: f32 = 6.0;
    pub const CONTACT_DAMPING: f32 = 1.5;
    /// Impulse pushing an enemy away after touching the player
    pub const CONTACT_KNOCKBACK: f32 = 10.0;

    /// Arrival thresholds for patrol steering
    pub const WAYPOINT_ARRIVAL: f32 = 0.2;
    pub const WANDER_ARRIVAL: f32 = 1.0;
    /// Side of the wander box centred on an enemy's spawn point
    pub const WANDER_BOX: f32 = 10.0;
    /// Side of the box patrol waypoints are rolled in
    pub const WAYPOINT_BOX: f32 = 6.0;

    /// Sword swing animation speed (progress per second)
    pub const SWING_SPEED: f32 = 6.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector pointing along `angle` (radians, 0 = +x)
#[inline]
pub fn direction_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of a vector (radians, 0 = +x)
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-5);
        // An odd multiple of PI lands on the cut; either end is fine
        assert!((normalize_angle(3.0 * PI).abs() - PI).abs() < 1e-5);
        assert!((normalize_angle(-1.5 * PI) - 0.5 * PI).abs() < 1e-5);
        assert_eq!(normalize_angle(0.25), 0.25);
    }

    #[test]
    fn test_direction_round_trip() {
        let dir = direction_from_angle(1.0);
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!((angle_of(dir) - 1.0).abs() < 1e-6);
    }
}
