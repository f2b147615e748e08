//! Enemy AI: patrol/chase steering, melee, knockback and separation
//!
//! Each enemy is either patrolling (behaviour depends on its kind) or
//! chasing the player. The switch happens every frame on a single inclusive
//! distance test against `detection_range`, with no hysteresis.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Aabb, bounce_against_bounds, circle_vs_boxes, damp, direction_or};
use super::player::Player;
use super::state::GameEvent;
use crate::consts::*;
use crate::tuning::{ChaseDamage, EnemyStats};

/// Unique enemy id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Wanders around its spawn point
    Grunt,
    /// Walks a fixed loop of waypoints
    Patroller,
    /// Never moves
    Sentry,
}

impl EnemyKind {
    /// Room spawn roll: 60% grunt, 25% patroller, 15% sentry
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let roll: f32 = rng.random();
        if roll < 0.6 {
            EnemyKind::Grunt
        } else if roll < 0.85 {
            EnemyKind::Patroller
        } else {
            EnemyKind::Sentry
        }
    }
}

/// AI state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiState {
    Patrolling,
    Chasing,
}

/// Patrol data, fixed by kind at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Patrol {
    Stationary,
    Wander { target: Vec2 },
    Waypoints { points: Vec<Vec2>, index: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub spawn: Vec2,
    /// Knockback velocity, integrated with damping every frame
    pub vel: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub attack: f32,
    pub defense: f32,
    pub speed: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    pub can_attack: bool,
    pub attack_cooldown: f32,
    pub max_attack_cooldown: f32,
    pub state: AiState,
    pub patrol: Patrol,
}

fn roll_offset<R: Rng + ?Sized>(rng: &mut R, box_size: f32) -> Vec2 {
    Vec2::new(
        (rng.random::<f32>() - 0.5) * box_size,
        (rng.random::<f32>() - 0.5) * box_size,
    )
}

impl Enemy {
    pub fn new<R: Rng + ?Sized>(
        id: EnemyId,
        kind: EnemyKind,
        pos: Vec2,
        stats: &EnemyStats,
        rng: &mut R,
    ) -> Self {
        let patrol = match kind {
            EnemyKind::Sentry => Patrol::Stationary,
            EnemyKind::Patroller => Patrol::Waypoints {
                points: vec![
                    pos + roll_offset(rng, WAYPOINT_BOX),
                    pos + roll_offset(rng, WAYPOINT_BOX),
                ],
                index: 0,
            },
            EnemyKind::Grunt => Patrol::Wander {
                target: pos + roll_offset(rng, WANDER_BOX),
            },
        };

        Self {
            id,
            kind,
            pos,
            spawn: pos,
            vel: Vec2::ZERO,
            health: stats.health,
            max_health: stats.health,
            attack: stats.attack,
            defense: stats.defense,
            speed: stats.speed,
            detection_range: stats.detection_range,
            attack_range: stats.attack_range,
            can_attack: true,
            attack_cooldown: 1.0,
            max_attack_cooldown: stats.attack_cooldown,
            state: AiState::Patrolling,
            patrol,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Step toward `target`, rejected if the destination hits terrain
    fn step_toward(&mut self, target: Vec2, amount: f32, obstacles: &[Aabb]) {
        let dir = (target - self.pos).normalize_or_zero();
        if dir == Vec2::ZERO || amount <= 0.0 {
            return;
        }
        let next = self.pos + dir * amount;
        if !circle_vs_boxes(next, ENEMY_TERRAIN_RADIUS, obstacles).hit {
            self.pos = next;
        }
    }

    fn patrol_step<R: Rng + ?Sized>(&mut self, dt: f32, obstacles: &[Aabb], rng: &mut R) {
        let walk = self.speed * dt;
        let leg = match &mut self.patrol {
            Patrol::Stationary => None,
            Patrol::Waypoints { points, index } => match points.get(*index).copied() {
                Some(target) if self.pos.distance(target) < WAYPOINT_ARRIVAL => {
                    *index = (*index + 1) % points.len();
                    None
                }
                Some(target) => Some((target, walk * 0.5)),
                None => None,
            },
            Patrol::Wander { target } => {
                if self.pos.distance(*target) < WANDER_ARRIVAL {
                    *target = self.spawn + roll_offset(rng, WANDER_BOX);
                    None
                } else {
                    Some((*target, walk * 0.5))
                }
            }
        };

        if let Some((target, amount)) = leg {
            self.step_toward(target, amount, obstacles);
        }
    }

    fn restart_attack_cooldown(&mut self) {
        self.can_attack = false;
        self.attack_cooldown = self.max_attack_cooldown;
    }

    fn tick_attack_cooldown(&mut self, dt: f32) {
        if self.attack_cooldown > 0.0 {
            self.attack_cooldown -= dt;
            if self.attack_cooldown <= 0.0 {
                self.attack_cooldown = 0.0;
                self.can_attack = true;
            }
        }
    }

    /// Damage dealt when striking from attack range while chasing
    pub fn chase_damage(&self, player: &Player, formula: ChaseDamage) -> f32 {
        match formula {
            ChaseDamage::SpeedMinusReach => (self.speed - player.attack_range).max(0.0),
            ChaseDamage::AttackMinusDefense => (self.attack - player.defense).max(0.0),
        }
    }

    /// Damage dealt on body contact
    pub fn contact_damage(&self, player: &Player) -> f32 {
        (self.attack - player.defense).max(1.0)
    }
}

/// Roll a room's enemy batch: 1-3 groups of three enemies sharing a spawn point
pub fn roll_room_batch<R: Rng + ?Sized>(rng: &mut R) -> Vec<(EnemyKind, Vec2)> {
    let groups = rng.random_range(1..=3);
    let mut batch = Vec::with_capacity(groups * 3);
    for _ in 0..groups {
        let pos = roll_offset(rng, 15.0);
        let kind = EnemyKind::roll(rng);
        batch.extend(std::iter::repeat_n((kind, pos), 3));
    }
    batch
}

/// Shared per-frame context for the enemy pass
pub struct EnemyContext<'a> {
    pub obstacles: &'a [Aabb],
    pub half_extent: f32,
    pub chase_damage: ChaseDamage,
}

/// Steering, melee, knockback integration and wall bounce for every enemy
pub fn steer_enemies<R: Rng + ?Sized>(
    enemies: &mut [Enemy],
    player: &mut Player,
    ctx: &EnemyContext,
    dt: f32,
    rng: &mut R,
    events: &mut Vec<GameEvent>,
) {
    for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
        let distance = enemy.pos.distance(player.pos);

        if distance <= enemy.detection_range {
            enemy.state = AiState::Chasing;
            enemy.step_toward(player.pos, enemy.speed * dt, ctx.obstacles);

            if distance <= enemy.attack_range && enemy.can_attack {
                let damage = enemy.chase_damage(player, ctx.chase_damage);
                let dealt = player.take_damage(damage);
                events.push(GameEvent::PlayerHit {
                    source: enemy.id,
                    damage: dealt,
                });
                enemy.restart_attack_cooldown();
            }
        } else {
            enemy.state = AiState::Patrolling;
            enemy.patrol_step(dt, ctx.obstacles, rng);
        }

        enemy.tick_attack_cooldown(dt);

        let next = enemy.pos + enemy.vel * dt;
        if circle_vs_boxes(next, ENEMY_TERRAIN_RADIUS, ctx.obstacles).hit {
            enemy.vel *= -0.5;
        } else {
            enemy.pos = next;
        }
        enemy.vel = damp(enemy.vel, KNOCKBACK_DAMPING, dt);

        let (pos, vel) =
            bounce_against_bounds(enemy.pos, enemy.vel, ctx.half_extent, WALL_RESTITUTION);
        enemy.pos = pos;
        enemy.vel = vel;
    }
}

/// Push overlapping enemies apart, half the overlap each
pub fn separate_enemies(enemies: &mut [Enemy]) {
    for j in 1..enemies.len() {
        let (head, tail) = enemies.split_at_mut(j);
        let e2 = &mut tail[0];
        for e1 in head.iter_mut() {
            let dist = e1.pos.distance(e2.pos);
            if dist < ENEMY_SPACING {
                let push = (ENEMY_SPACING - dist) / 2.0;
                let n = direction_or(e2.pos, e1.pos, Vec2::X);
                e1.pos += n * push;
                e2.pos -= n * push;
            }
        }
    }
}

/// Resolve enemy-player body contact, then drop dead enemies
///
/// Contact pushes both bodies apart by half the overlap, knocks the player
/// back and lets an armed enemy land a contact hit.
pub fn resolve_player_contact(
    enemies: Vec<Enemy>,
    player: &mut Player,
    half_extent: f32,
    dt: f32,
    events: &mut Vec<GameEvent>,
) -> Vec<Enemy> {
    let reach = PLAYER_RADIUS + ENEMY_RADIUS;
    let mut alive = Vec::with_capacity(enemies.len());

    for mut enemy in enemies {
        if !enemy.is_alive() {
            continue;
        }

        let dist = enemy.pos.distance(player.pos);
        if dist < reach {
            let overlap = reach - dist;
            let n = direction_or(player.pos, enemy.pos, Vec2::X);

            enemy.pos += n * overlap * 0.5;
            player.pos -= n * overlap * 0.5;
            player.vel -= n * overlap * CONTACT_KNOCKBACK * 10.0;
            enemy.vel += n * CONTACT_KNOCKBACK;

            if enemy.can_attack {
                let dealt = player.take_damage(enemy.contact_damage(player));
                events.push(GameEvent::PlayerHit {
                    source: enemy.id,
                    damage: dealt,
                });
                enemy.restart_attack_cooldown();
            }

            let (pos, vel) =
                bounce_against_bounds(player.pos, player.vel, half_extent, WALL_RESTITUTION);
            player.pos = pos;
            player.vel = vel;
        }

        enemy.vel = damp(enemy.vel, CONTACT_DAMPING, dt);
        let (pos, vel) = bounce_against_bounds(enemy.pos, enemy.vel, half_extent, WALL_RESTITUTION);
        enemy.pos = pos;
        enemy.vel = vel;

        alive.push(enemy);
    }

    alive
}
