//! Data-driven game balance
//!
//! Defaults reproduce the shipped balance; a JSON file may override any
//! subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::enemy::EnemyKind;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Base weapon values every slot starts from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    pub damage: f32,
    pub speed: f32,
    pub range: f32,
    pub accuracy: f32,
    /// Slot cooldown in seconds
    pub reload: f32,
    pub slot_count: u32,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            damage: BASE_DAMAGE,
            speed: BASE_SPEED,
            range: BASE_RANGE,
            accuracy: BASE_ACCURACY,
            reload: BASE_RELOAD,
            slot_count: SLOT_COUNT,
        }
    }
}

/// Player starting stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_health: f32,
    pub speed: f32,
    pub attack: f32,
    pub attack_range: f32,
    pub defense: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            speed: 15.0,
            attack: 40.0,
            attack_range: 7.0,
            defense: 0.0,
        }
    }
}

/// Base stats of one enemy kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub health: f32,
    pub attack: f32,
    pub defense: f32,
    pub speed: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    /// Seconds between two attacks
    pub attack_cooldown: f32,
}

/// Stats for every enemy kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyRoster {
    pub grunt: EnemyStats,
    pub patroller: EnemyStats,
    pub sentry: EnemyStats,
}

impl Default for EnemyRoster {
    fn default() -> Self {
        Self {
            grunt: EnemyStats {
                health: 45.0,
                attack: 14.0,
                defense: 1.0,
                speed: 3.5,
                detection_range: 7.0,
                attack_range: 1.4,
                attack_cooldown: 1.0,
            },
            patroller: EnemyStats {
                health: 60.0,
                attack: 12.0,
                defense: 3.0,
                speed: 2.5,
                detection_range: 9.0,
                attack_range: 1.6,
                attack_cooldown: 1.2,
            },
            sentry: EnemyStats {
                health: 80.0,
                attack: 10.0,
                defense: 4.0,
                speed: 0.0,
                detection_range: 12.0,
                attack_range: 1.8,
                attack_cooldown: 1.5,
            },
        }
    }
}

impl EnemyRoster {
    pub fn stats(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Grunt => &self.grunt,
            EnemyKind::Patroller => &self.patroller,
            EnemyKind::Sentry => &self.sentry,
        }
    }
}

/// Damage formula used when a chasing enemy strikes from attack range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChaseDamage {
    /// `max(enemy.speed - player.attack_range, 0)` (shipped behaviour)
    #[default]
    SpeedMinusReach,
    /// `max(enemy.attack - player.defense, 0)`
    AttackMinusDefense,
}

/// Complete balance table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub weapon: WeaponTuning,
    pub player: PlayerTuning,
    pub enemies: EnemyRoster,
    pub chase_damage: ChaseDamage,
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a tuning file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                })
            }
        }

        positive("weapon.damage", self.weapon.damage)?;
        positive("weapon.speed", self.weapon.speed)?;
        positive("weapon.range", self.weapon.range)?;
        positive("weapon.reload", self.weapon.reload)?;
        positive("player.max_health", self.player.max_health)?;

        if !(0.0..=1.0).contains(&self.weapon.accuracy) {
            return Err(TuningError::Invalid {
                field: "weapon.accuracy",
                reason: format!("must be within [0, 1], got {}", self.weapon.accuracy),
            });
        }
        if self.weapon.slot_count == 0 {
            return Err(TuningError::Invalid {
                field: "weapon.slot_count",
                reason: "at least one slot is required".to_string(),
            });
        }
        for (field, stats) in [
            ("enemies.grunt.health", &self.enemies.grunt),
            ("enemies.patroller.health", &self.enemies.patroller),
            ("enemies.sentry.health", &self.enemies.sentry),
        ] {
            positive(field, stats.health)?;
        }
        Ok(())
    }
}
