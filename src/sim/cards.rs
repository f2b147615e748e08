//! Card library
//!
//! Cards are immutable modifier definitions. The library is a fixed table
//! keyed by [`CardKind`]; equipping a card instantiates it with a fresh id.

use serde::{Deserialize, Serialize};

/// Area-of-effect payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosive {
    pub radius: f32,
    /// Fixed damage, independent of the projectile's own damage
    pub damage: f32,
}

/// Secondary-hit payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainLightning {
    pub chains: u32,
    pub range: f32,
}

/// Unique id of an equipped card instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

/// Every card in the library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    // Buffs
    TripleShot,
    Homing,
    Piercing,
    Bouncing,
    FastReload,
    IncreasedDamage,
    IncreasedSpeed,
    Explosive,
    ChainLightning,
    // Debuffs
    ReducedRange,
    ReducedDamage,
    SlowReload,
    SlowerProjectile,
    Inaccurate,
}

/// Sparse stat modifiers carried by a card (None = does not touch the stat)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    pub damage_multiplier: Option<f32>,
    pub speed_multiplier: Option<f32>,
    pub range_multiplier: Option<f32>,
    pub reload_multiplier: Option<f32>,
    pub projectile_count: Option<u32>,
    pub homing: Option<bool>,
    pub pierce: Option<u32>,
    pub bounce: Option<u32>,
    /// 1.0 = perfect, lower = more spread
    pub accuracy: Option<f32>,
    pub explosive: Option<Explosive>,
    pub chain_lightning: Option<ChainLightning>,
}

/// Static library entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardDefinition {
    pub kind: CardKind,
    pub name: &'static str,
    pub description: &'static str,
    pub is_buff: bool,
    pub modifiers: Modifiers,
}

/// An equipped card instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub kind: CardKind,
    pub name: String,
    pub is_buff: bool,
    pub modifiers: Modifiers,
}

impl Card {
    pub fn new(id: CardId, kind: CardKind) -> Self {
        let def = kind.definition();
        Self {
            id,
            kind,
            name: def.name.to_string(),
            is_buff: def.is_buff,
            modifiers: def.modifiers,
        }
    }
}

impl CardKind {
    pub const ALL: [CardKind; 14] = [
        CardKind::TripleShot,
        CardKind::Homing,
        CardKind::Piercing,
        CardKind::Bouncing,
        CardKind::FastReload,
        CardKind::IncreasedDamage,
        CardKind::IncreasedSpeed,
        CardKind::Explosive,
        CardKind::ChainLightning,
        CardKind::ReducedRange,
        CardKind::ReducedDamage,
        CardKind::SlowReload,
        CardKind::SlowerProjectile,
        CardKind::Inaccurate,
    ];

    /// Library lookup key
    pub fn as_str(&self) -> &'static str {
        match self {
            CardKind::TripleShot => "triple_shot",
            CardKind::Homing => "homing",
            CardKind::Piercing => "piercing",
            CardKind::Bouncing => "bouncing",
            CardKind::FastReload => "fast_reload",
            CardKind::IncreasedDamage => "increased_damage",
            CardKind::IncreasedSpeed => "increased_speed",
            CardKind::Explosive => "explosive",
            CardKind::ChainLightning => "chain_lightning",
            CardKind::ReducedRange => "reduced_range",
            CardKind::ReducedDamage => "reduced_damage",
            CardKind::SlowReload => "slow_reload",
            CardKind::SlowerProjectile => "slower_projectile",
            CardKind::Inaccurate => "inaccurate",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        CardKind::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// The library entry for this card
    pub fn definition(&self) -> CardDefinition {
        let none = Modifiers::default();
        let (name, description, is_buff, modifiers) = match self {
            CardKind::TripleShot => (
                "Triple Shot",
                "Fire 3 projectiles at once",
                true,
                Modifiers {
                    projectile_count: Some(3),
                    ..none
                },
            ),
            CardKind::Homing => (
                "Homing",
                "Projectiles seek enemies",
                true,
                Modifiers {
                    homing: Some(true),
                    speed_multiplier: Some(0.8),
                    ..none
                },
            ),
            CardKind::Piercing => (
                "Piercing",
                "Pierce through 3 enemies",
                true,
                Modifiers {
                    pierce: Some(3),
                    damage_multiplier: Some(0.9),
                    ..none
                },
            ),
            CardKind::Bouncing => (
                "Bouncing",
                "Bounces off walls 2 times",
                true,
                Modifiers {
                    bounce: Some(2),
                    ..none
                },
            ),
            CardKind::FastReload => (
                "Fast Reload",
                "50% faster reload",
                true,
                Modifiers {
                    reload_multiplier: Some(0.5),
                    ..none
                },
            ),
            CardKind::IncreasedDamage => (
                "Increased Damage",
                "+50% damage",
                true,
                Modifiers {
                    damage_multiplier: Some(1.5),
                    ..none
                },
            ),
            CardKind::IncreasedSpeed => (
                "Increased Speed",
                "+50% projectile speed",
                true,
                Modifiers {
                    speed_multiplier: Some(1.5),
                    ..none
                },
            ),
            CardKind::Explosive => (
                "Explosive",
                "Explodes on impact",
                true,
                Modifiers {
                    explosive: Some(Explosive {
                        radius: 4.0,
                        damage: 15.0,
                    }),
                    speed_multiplier: Some(0.7),
                    ..none
                },
            ),
            CardKind::ChainLightning => (
                "Chain Lightning",
                "Chains to 3 nearby enemies",
                true,
                Modifiers {
                    chain_lightning: Some(ChainLightning {
                        chains: 3,
                        range: 5.0,
                    }),
                    damage_multiplier: Some(0.8),
                    ..none
                },
            ),
            CardKind::ReducedRange => (
                "Reduced Range",
                "-40% range",
                false,
                Modifiers {
                    range_multiplier: Some(0.6),
                    ..none
                },
            ),
            CardKind::ReducedDamage => (
                "Reduced Damage",
                "-30% damage",
                false,
                Modifiers {
                    damage_multiplier: Some(0.7),
                    ..none
                },
            ),
            CardKind::SlowReload => (
                "Slow Reload",
                "+50% reload time",
                false,
                Modifiers {
                    reload_multiplier: Some(1.5),
                    ..none
                },
            ),
            CardKind::SlowerProjectile => (
                "Slower Projectile",
                "-40% projectile speed",
                false,
                Modifiers {
                    speed_multiplier: Some(0.6),
                    ..none
                },
            ),
            CardKind::Inaccurate => (
                "Inaccurate",
                "30% spread",
                false,
                Modifiers {
                    accuracy: Some(0.7),
                    ..none
                },
            ),
        };

        CardDefinition {
            kind: *self,
            name,
            description,
            is_buff,
            modifiers,
        }
    }
}
