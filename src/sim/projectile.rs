//! Projectile flight and hit effects
//!
//! Per projectile, in order: homing retarget, integrate, range check,
//! per-axis wall bounce, then hit resolution (direct hit, chain lightning,
//! explosion, pierce bookkeeping). Damage is never applied here; every hit
//! goes through the caller's `on_hit` callback.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::cards::{ChainLightning, Explosive};
use super::enemy::EnemyId;
use super::loadout::{SlotId, SlotStats};
use crate::consts::*;
use crate::{angle_of, direction_from_angle, normalize_angle};

/// Position of a hittable enemy, sampled before the projectile pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub id: EnemyId,
    pub pos: Vec2,
}

/// Visual style, picked from the strongest effect the projectile carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileStyle {
    Explosive,
    Chain,
    Homing,
    Piercing,
    Bouncing,
    Plain,
}

impl ProjectileStyle {
    /// First match wins: explosive > chain > homing > pierce > bounce
    pub fn for_stats(stats: &SlotStats) -> Self {
        if stats.explosive.is_some() {
            ProjectileStyle::Explosive
        } else if stats.chain_lightning.is_some() {
            ProjectileStyle::Chain
        } else if stats.homing {
            ProjectileStyle::Homing
        } else if stats.pierce > 0 {
            ProjectileStyle::Piercing
        } else if stats.bounce > 0 {
            ProjectileStyle::Bouncing
        } else {
            ProjectileStyle::Plain
        }
    }

    /// Core color as 0xRRGGBB
    pub fn color(&self) -> u32 {
        match self {
            ProjectileStyle::Explosive => 0xff6600,
            ProjectileStyle::Chain => 0x00ffff,
            ProjectileStyle::Homing => 0xff00ff,
            ProjectileStyle::Piercing => 0xffff00,
            ProjectileStyle::Bouncing => 0x00ff00,
            ProjectileStyle::Plain => 0xffffff,
        }
    }

    /// Trail color as 0xRRGGBBAA (half transparent)
    pub fn trail_color(&self) -> u32 {
        (self.color() << 8) | 0x80
    }
}

/// Chain lightning payload plus the enemies it has already touched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainState {
    pub chains: u32,
    pub range: f32,
    pub chained: Vec<EnemyId>,
}

impl From<ChainLightning> for ChainState {
    fn from(chain: ChainLightning) -> Self {
        Self {
            chains: chain.chains,
            range: chain.range,
            chained: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Speed magnitude; homing changes direction only
    pub speed: f32,
    pub traveled: f32,
    pub max_range: f32,
    pub damage: f32,
    pub pierce: u32,
    pub pierced: Vec<EnemyId>,
    pub bounces_left: u32,
    pub homing: bool,
    pub explosive: Option<Explosive>,
    pub chain: Option<ChainState>,
    pub style: ProjectileStyle,
    pub slot: SlotId,
}

/// Rotate unit vector `from` toward unit vector `to` by fraction `t` of the angle between
pub fn slerp_direction(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    let start = angle_of(from);
    let delta = normalize_angle(angle_of(to) - start);
    direction_from_angle(start + delta * t.clamp(0.0, 1.0))
}

/// Owns every live projectile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectileSystem {
    pub projectiles: Vec<Projectile>,
    next_id: u32,
}

impl ProjectileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.projectiles.clear();
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Spawn a projectile; None for a zero direction
    pub fn add(
        &mut self,
        origin: Vec2,
        direction: Vec2,
        slot: SlotId,
        stats: &SlotStats,
    ) -> Option<u32> {
        let dir = direction.normalize_or_zero();
        if dir == Vec2::ZERO {
            log::debug!("Projectile with zero direction dropped (slot {slot})");
            return None;
        }

        self.next_id += 1;
        let id = self.next_id;
        self.projectiles.push(Projectile {
            id,
            pos: origin,
            vel: dir * stats.speed,
            speed: stats.speed,
            traveled: 0.0,
            max_range: stats.range,
            damage: stats.damage,
            pierce: stats.pierce,
            pierced: Vec::new(),
            bounces_left: stats.bounce,
            homing: stats.homing,
            explosive: stats.explosive,
            chain: stats.chain_lightning.map(ChainState::from),
            style: ProjectileStyle::for_stats(stats),
            slot,
        });
        Some(id)
    }

    /// Advance every projectile one frame
    ///
    /// `on_hit(target, damage, knockback)` is invoked synchronously for every
    /// direct, chained and splash hit.
    pub fn update<F>(&mut self, dt: f32, targets: &[Target], half_extent: f32, mut on_hit: F)
    where
        F: FnMut(EnemyId, f32, Vec2),
    {
        self.projectiles
            .retain_mut(|p| step_projectile(p, dt, targets, half_extent, &mut on_hit));
    }
}

/// Advance one projectile; returns false when it should be removed
fn step_projectile<F>(
    p: &mut Projectile,
    dt: f32,
    targets: &[Target],
    half_extent: f32,
    on_hit: &mut F,
) -> bool
where
    F: FnMut(EnemyId, f32, Vec2),
{
    if p.homing {
        retarget(p, dt, targets);
    }

    let movement = p.vel * dt;
    p.pos += movement;
    p.traveled += movement.length();

    if p.traveled > p.max_range {
        return false;
    }

    // The allowance is checked once per frame; each crossed axis then
    // reflects and spends a bounce, never going below zero
    let crossed = [0, 1].map(|axis| p.pos[axis].abs() > half_extent);
    if crossed.contains(&true) {
        if p.bounces_left == 0 {
            return false;
        }
        for axis in (0..2).filter(|&axis| crossed[axis]) {
            p.vel[axis] = -p.vel[axis];
            p.pos[axis] = p.pos[axis].signum() * half_extent;
            p.bounces_left = p.bounces_left.saturating_sub(1);
        }
    }

    for target in targets {
        if p.pierced.contains(&target.id) {
            continue;
        }
        if p.pos.distance(target.pos) >= PROJECTILE_HIT_RADIUS {
            continue;
        }

        let knockback = p.vel.normalize_or_zero() * PROJECTILE_KNOCKBACK;
        on_hit(target.id, p.damage, knockback);

        if let Some(chain) = p.chain.as_mut() {
            if (chain.chained.len() as u32) < chain.chains {
                chain.chained.push(target.id);
                let next = targets
                    .iter()
                    .filter(|t| t.id != target.id && !chain.chained.contains(&t.id))
                    .map(|t| (t, t.pos.distance(target.pos)))
                    .filter(|&(_, d)| d < chain.range)
                    .min_by(|a, b| a.1.total_cmp(&b.1));
                if let Some((next, _)) = next {
                    on_hit(next.id, p.damage * CHAIN_DAMAGE_FACTOR, Vec2::ZERO);
                    chain.chained.push(next.id);
                }
            }
        }

        if let Some(blast) = p.explosive {
            for splashed in targets {
                if splashed.pos.distance(p.pos) < blast.radius {
                    let outward = (splashed.pos - p.pos).normalize_or_zero();
                    on_hit(splashed.id, blast.damage, outward * EXPLOSION_KNOCKBACK);
                }
            }
        }

        p.pierced.push(target.id);
        if p.pierced.len() > p.pierce as usize {
            return false;
        }
    }

    true
}

/// Bend a homing projectile toward the nearest un-pierced target in range
fn retarget(p: &mut Projectile, dt: f32, targets: &[Target]) {
    let nearest = targets
        .iter()
        .filter(|t| !p.pierced.contains(&t.id))
        .map(|t| (t, p.pos.distance(t.pos)))
        .filter(|&(_, d)| d < HOMING_RANGE)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    let Some((target, _)) = nearest else {
        return;
    };
    let desired = (target.pos - p.pos).normalize_or_zero();
    let current = p.vel.normalize_or_zero();
    if desired == Vec2::ZERO || current == Vec2::ZERO {
        return;
    }

    let turned = slerp_direction(current, desired, HOMING_TURN_RATE * dt);
    p.vel = turned * p.speed;
}
