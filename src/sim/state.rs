//! World state and the events it reports
//!
//! Everything one combat session needs lives in a single owned
//! `WorldState`; the stepper borrows it mutably once per frame.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyId, EnemyKind, roll_room_batch};
use super::geometry::Aabb;
use super::loadout::{Loadout, Slot, SlotId};
use super::player::Player;
use super::projectile::{Projectile, ProjectileSystem};
use super::terrain::{Obstacle, RoomCoord, generate_room_terrain};
use crate::tuning::Tuning;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Player died; only commands are processed until a restart
    GameOver,
}

/// Something that happened during a frame, for audio/UI/scoring layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    SpellCast { slot: SlotId, projectiles: u32 },
    EnemyHit { id: EnemyId, damage: f32 },
    EnemyDied { id: EnemyId, kind: EnemyKind, pos: Vec2 },
    PlayerHit { source: EnemyId, damage: f32 },
    PlayerHealed { amount: f32 },
    PlayerDied,
    RoomEntered { room: RoomCoord, enemies: u32 },
}

/// Serializable view of one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub time: f32,
    pub phase: GamePhase,
    pub room: RoomCoord,
    pub kills: u32,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub slots: Vec<Slot>,
    pub active_slot: SlotId,
}

/// Complete combat state
#[derive(Debug, Clone)]
pub struct WorldState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Frames stepped since the last restart
    pub frame: u64,
    /// Seconds simulated since the last restart
    pub time: f32,
    pub player: Player,
    /// Living enemies, in spawn order
    pub enemies: Vec<Enemy>,
    pub projectiles: ProjectileSystem,
    pub loadout: Loadout,
    pub room: RoomCoord,
    pub terrain: Vec<Obstacle>,
    pub kills: u32,
    /// Collision boxes of `terrain`, rebuilt on room change
    pub(crate) obstacles: Vec<Aabb>,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<GameEvent>,
    visited: BTreeSet<RoomCoord>,
    next_id: u32,
}

impl WorldState {
    /// Create a world in the start room with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            phase: GamePhase::Playing,
            frame: 0,
            time: 0.0,
            player: Player::new(&tuning.player),
            enemies: Vec::new(),
            projectiles: ProjectileSystem::new(),
            loadout: Loadout::new(tuning.weapon.clone()),
            room: RoomCoord::START,
            terrain: Vec::new(),
            kills: 0,
            obstacles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            visited: BTreeSet::new(),
            next_id: 1,
            tuning,
        };
        state.enter_room(RoomCoord::START);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn obstacles(&self) -> &[Aabb] {
        &self.obstacles
    }

    pub fn has_visited(&self, room: RoomCoord) -> bool {
        self.visited.contains(&room)
    }

    /// Spawn one enemy with the stats of its kind
    pub fn spawn_enemy(&mut self, kind: EnemyKind, pos: Vec2) -> EnemyId {
        let id = EnemyId(self.next_entity_id());
        let stats = self.tuning.enemies.stats(kind);
        let enemy = Enemy::new(id, kind, pos, stats, &mut self.rng);
        self.enemies.push(enemy);
        id
    }

    /// Roll and spawn a fresh room batch; returns how many enemies were added
    pub fn spawn_room_enemies(&mut self) -> u32 {
        let batch = roll_room_batch(&mut self.rng);
        let count = batch.len() as u32;
        for (kind, pos) in batch {
            self.spawn_enemy(kind, pos);
        }
        count
    }

    /// Move the player into a room
    ///
    /// Terrain is rebuilt from the coordinate; in-flight projectiles and
    /// the previous room's enemies are dropped. Enemies spawn only on the
    /// first visit and never in the start room.
    pub fn enter_room(&mut self, room: RoomCoord) {
        self.room = room;
        self.terrain = generate_room_terrain(room);
        self.obstacles = self.terrain.iter().map(|o| o.bounds).collect();
        self.projectiles.clear();
        self.enemies.clear();
        self.player.pos = Vec2::ZERO;
        self.player.vel = Vec2::ZERO;

        let first_visit = self.visited.insert(room);
        let enemies = if first_visit && room != RoomCoord::START {
            self.spawn_room_enemies()
        } else {
            0
        };

        log::info!(
            "Entered room ({}, {}): {} obstacles, {} enemies{}",
            room.x,
            room.y,
            self.terrain.len(),
            enemies,
            if first_visit { "" } else { " (revisit)" }
        );
        self.events.push(GameEvent::RoomEntered { room, enemies });
    }

    /// Restore health, clamped at max
    pub fn heal_player(&mut self, amount: f32) -> f32 {
        let healed = self.player.heal(amount);
        if healed > 0.0 {
            self.events.push(GameEvent::PlayerHealed { amount: healed });
        } else {
            log::debug!("Heal of {amount} had no effect");
        }
        healed
    }

    /// Start a new run: fresh player, empty slots, back in the start room
    ///
    /// The RNG keeps its stream so consecutive runs differ.
    pub fn restart(&mut self) {
        log::info!(
            "Restarting after {} frames, {} kills",
            self.frame,
            self.kills
        );
        self.phase = GamePhase::Playing;
        self.frame = 0;
        self.time = 0.0;
        self.kills = 0;
        self.player = Player::new(&self.tuning.player);
        self.loadout.reset();
        self.visited.clear();
        self.enter_room(RoomCoord::START);
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.frame,
            time: self.time,
            phase: self.phase,
            room: self.room,
            kills: self.kills,
            player: self.player.clone(),
            enemies: self.enemies.clone(),
            projectiles: self.projectiles.projectiles.clone(),
            slots: self.loadout.slots.clone(),
            active_slot: self.loadout.active_slot,
        }
    }
}
