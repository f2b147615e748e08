//! Per-room terrain layout
//!
//! Rooms are laid out from their grid coordinates alone, so revisiting a
//! room always rebuilds the same rocks and pillars. This hash is separate
//! from the world RNG and never advances it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Aabb;
use crate::consts::ROOM_SIZE;

/// Number of rock outcrops hugging the room walls
pub const ROCK_COUNT: u32 = 400;
/// Pillars closer than this to the room centre are dropped
pub const PILLAR_CLEARANCE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    Rock,
    Pillar,
}

/// One solid terrain piece
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: TerrainKind,
    pub bounds: Aabb,
}

/// Grid coordinate of a room
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomCoord {
    pub x: i32,
    pub y: i32,
}

impl RoomCoord {
    pub const START: RoomCoord = RoomCoord { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn seed(self) -> f64 {
        f64::from(self.x) * 1000.0 + f64::from(self.y)
    }
}

/// Fractional part of `sin(seed + n) * 1000`, in [0, 1)
fn hash01(seed: f64, n: f64) -> f32 {
    let v = (seed + n).sin() * 1000.0;
    (v - v.floor()) as f32
}

/// Build the obstacles of a room
pub fn generate_room_terrain(room: RoomCoord) -> Vec<Obstacle> {
    let seed = room.seed();
    let rnd = |n: f64| hash01(seed, n);
    let mut obstacles = Vec::with_capacity(ROCK_COUNT as usize + 2);

    for i in 0..ROCK_COUNT {
        let i = f64::from(i);
        let side = (rnd(i * 20.0) * 4.0).floor() as u32;
        let along = rnd(i * 10.0 - 10.0) * 70.0 - 35.0;
        let depth = rnd(i * 10.0 + 7.0) * 10.0 + 2.0;
        let width = rnd(i * 10.0 + 9.0) * 8.0 + 3.0;

        let bounds = match side {
            0 => Aabb::new(Vec2::new(along, -ROOM_SIZE + depth / 2.0), width, depth),
            1 => Aabb::new(Vec2::new(along, ROOM_SIZE - depth / 2.0), width, depth),
            2 => Aabb::new(Vec2::new(ROOM_SIZE - depth / 2.0, along), depth, width),
            _ => Aabb::new(Vec2::new(-ROOM_SIZE + depth / 2.0, along), depth, width),
        };
        obstacles.push(Obstacle {
            kind: TerrainKind::Rock,
            bounds,
        });
    }

    let pillars = (rnd(100.0) * 2.0).floor() as u32 + 1;
    for i in 0..pillars {
        let i = f64::from(i);
        let center = Vec2::new(
            (rnd(i * 20.0 + 100.0) - 0.5) * 25.0,
            (rnd(i * 20.0 + 105.0) - 0.5) * 25.0,
        );
        let size = rnd(i * 20.0 + 110.0) * 2.0 + 1.5;
        if center.length() > PILLAR_CLEARANCE {
            obstacles.push(Obstacle {
                kind: TerrainKind::Pillar,
                bounds: Aabb::new(center, size, size),
            });
        }
    }

    obstacles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PLAYER_TERRAIN_RADIUS;
    use crate::sim::geometry::circle_vs_boxes;

    #[test]
    fn test_layout_is_deterministic() {
        let a = generate_room_terrain(RoomCoord::new(2, -1));
        let b = generate_room_terrain(RoomCoord::new(2, -1));
        assert_eq!(a, b);
        assert_ne!(a, generate_room_terrain(RoomCoord::new(-1, 2)));
    }

    #[test]
    fn test_rocks_touch_a_wall() {
        for obstacle in generate_room_terrain(RoomCoord::new(3, 4))
            .iter()
            .filter(|o| o.kind == TerrainKind::Rock)
        {
            let min = obstacle.bounds.min();
            let max = obstacle.bounds.max();
            let touches = [min.x, min.y].iter().any(|&v| (v + ROOM_SIZE).abs() < 1e-3)
                || [max.x, max.y].iter().any(|&v| (v - ROOM_SIZE).abs() < 1e-3);
            assert!(touches, "rock {:?} floats off the walls", obstacle.bounds);
        }
    }

    #[test]
    fn test_room_centre_is_clear() {
        for x in -3..=3 {
            for y in -3..=3 {
                let terrain = generate_room_terrain(RoomCoord::new(x, y));
                let rocks = terrain.iter().filter(|o| o.kind == TerrainKind::Rock).count();
                assert_eq!(rocks, ROCK_COUNT as usize);

                let pillars: Vec<Aabb> = terrain
                    .iter()
                    .filter(|o| o.kind == TerrainKind::Pillar)
                    .map(|o| o.bounds)
                    .collect();
                assert!(pillars.len() <= 2);
                assert!(pillars.iter().all(|p| p.center.length() > PILLAR_CLEARANCE));

                let boxes: Vec<Aabb> = terrain.iter().map(|o| o.bounds).collect();
                assert!(!circle_vs_boxes(Vec2::ZERO, PLAYER_TERRAIN_RADIUS, &boxes).hit);
            }
        }
    }

    #[test]
    fn test_hash_range() {
        for n in 0..1000 {
            let v = hash01(1234.0, f64::from(n));
            assert!((0.0..1.0).contains(&v));
        }
    }
}
