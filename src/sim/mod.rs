//! Combat simulation
//!
//! All gameplay logic lives here, free of rendering, audio and input:
//! - Variable timestep, driven by the caller once per frame
//! - One seeded RNG owned by the world
//! - Commands in, events out

pub mod cards;
pub mod combat;
pub mod enemy;
pub mod geometry;
pub mod loadout;
pub mod player;
pub mod projectile;
pub mod state;
pub mod terrain;
pub mod tick;

pub use cards::{Card, CardId, CardKind, ChainLightning, Explosive, Modifiers};
pub use combat::{HitOutcome, apply_hit};
pub use enemy::{AiState, Enemy, EnemyId, EnemyKind, Patrol};
pub use geometry::{Aabb, CollisionResult, circle_vs_boxes};
pub use loadout::{Loadout, Slot, SlotId, SlotStats, compose_stats};
pub use player::{Player, Swing};
pub use projectile::{Projectile, ProjectileStyle, ProjectileSystem, Target};
pub use state::{FrameSnapshot, GameEvent, GamePhase, WorldState};
pub use terrain::{Obstacle, RoomCoord, TerrainKind, generate_room_terrain};
pub use tick::{StepInput, WorldCommand, step};
