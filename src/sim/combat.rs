//! Hit resolution
//!
//! The single place where damage lands on an enemy. Projectile effects
//! (direct hit, chain, explosion) may call it several times per target in
//! one frame; every call is an independent additive effect.

use glam::Vec2;

use super::enemy::{Enemy, EnemyId};
use super::state::GameEvent;

/// Outcome of one hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Target not found (already removed or never existed)
    Missed,
    Damaged,
    /// This hit took the target from alive to dead
    Killed,
}

/// Apply damage and knockback to an enemy by id
///
/// Health is clamped at zero. Dead enemies stay in the list until the enemy
/// pass collects the survivors, so this never mutates the collection itself.
pub fn apply_hit(
    enemies: &mut [Enemy],
    target: EnemyId,
    damage: f32,
    knockback: Vec2,
    events: &mut Vec<GameEvent>,
) -> HitOutcome {
    let Some(enemy) = enemies.iter_mut().find(|e| e.id == target) else {
        log::debug!("Hit on unknown enemy {:?} ignored", target);
        return HitOutcome::Missed;
    };

    let was_alive = enemy.is_alive();
    enemy.health = (enemy.health - damage.max(0.0)).max(0.0);
    enemy.vel += knockback;
    events.push(GameEvent::EnemyHit { id: target, damage });

    if was_alive && !enemy.is_alive() {
        events.push(GameEvent::EnemyDied {
            id: target,
            kind: enemy.kind,
            pos: enemy.pos,
        });
        HitOutcome::Killed
    } else {
        HitOutcome::Damaged
    }
}
