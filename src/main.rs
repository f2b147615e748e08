//! Spellcrawl headless runner
//!
//! Plays a scripted session against the combat core and prints the final
//! frame as JSON.
//!
//! Usage: `spellcrawl [seed] [frames] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use spellcrawl::Tuning;
    use spellcrawl::consts::FRAME_DT;
    use spellcrawl::sim::{GamePhase, StepInput, WorldState, step};

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let seed = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5eed_u64);
    let frames: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1800);
    let tuning = match args.get(3) {
        Some(path) => match Tuning::load(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Bad tuning file {path}: {e}");
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };

    log::info!("Spellcrawl starting: seed {seed}, {frames} frames");
    let mut state = WorldState::new(seed, tuning);
    let mut pilot = script::Pilot::default();

    for _ in 0..frames {
        let input: StepInput = pilot.next_input(&state);
        step(&mut state, &input, FRAME_DT);
        script::report(&state.drain_events());
        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    log::info!(
        "Session over after {} frames: {} kills, {:.0}/{:.0} health",
        state.frame,
        state.kills,
        state.player.health,
        state.player.max_health
    );
    match serde_json::to_string_pretty(&state.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize snapshot: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The combat core is used as a library on wasm
}

#[cfg(not(target_arch = "wasm32"))]
mod script {
    use glam::Vec2;
    use spellcrawl::angle_of;
    use spellcrawl::sim::{
        CardKind, GameEvent, RoomCoord, SlotId, StepInput, WorldCommand, WorldState,
    };

    /// Health potion strength
    const POTION: f32 = 30.0;
    /// Keep at least this far from the nearest enemy
    const KITE_DISTANCE: f32 = 6.0;

    /// Cards equipped on the first frame
    const KIT: [(SlotId, CardKind); 7] = [
        (1, CardKind::TripleShot),
        (1, CardKind::Piercing),
        (2, CardKind::Homing),
        (2, CardKind::IncreasedDamage),
        (3, CardKind::ChainLightning),
        (4, CardKind::Explosive),
        (5, CardKind::Bouncing),
    ];

    /// Drives the player: kites the nearest enemy and casts whatever slot is ready
    #[derive(Default)]
    pub struct Pilot {
        equipped: bool,
        potions_used: u32,
        next_room: i32,
    }

    impl Pilot {
        pub fn next_input(&mut self, state: &WorldState) -> StepInput {
            let mut input = StepInput::default();

            if !self.equipped {
                self.equipped = true;
                input.commands.extend(
                    KIT.iter()
                        .map(|&(slot, kind)| WorldCommand::AddCard { slot, kind }),
                );
            }

            if state.enemies.is_empty() {
                self.next_room += 1;
                input.commands.push(WorldCommand::EnterRoom {
                    room: RoomCoord::new(self.next_room, 0),
                });
                return input;
            }

            let player = &state.player;
            if player.health < player.max_health * 0.4 && self.potions_used < 3 {
                self.potions_used += 1;
                input.commands.push(WorldCommand::Heal { amount: POTION });
            }

            let nearest = state
                .enemies
                .iter()
                .min_by(|a, b| {
                    a.pos
                        .distance(player.pos)
                        .total_cmp(&b.pos.distance(player.pos))
                });
            let Some(target) = nearest else {
                return input;
            };
            let to_target = target.pos - player.pos;

            if let Some(slot) = state.loadout.slots.iter().find(|s| !s.on_cooldown) {
                if slot.id != state.loadout.active_slot {
                    input.commands.push(WorldCommand::SelectSlot { slot: slot.id });
                }
                input.fire = Some(angle_of(to_target));
            }

            // Back away when crowded, otherwise circle the target
            let away = -to_target.normalize_or_zero();
            input.move_dir = if to_target.length() < KITE_DISTANCE {
                away
            } else {
                Vec2::new(-away.y, away.x)
            };
            input.swing = to_target.length() < player.attack_range;
            input
        }
    }

    pub fn report(events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::SpellCast { slot, projectiles } => {
                    log::debug!("Cast slot {slot}: {projectiles} projectiles");
                }
                GameEvent::EnemyHit { id, damage } => {
                    log::trace!("Enemy {:?} took {damage:.1}", id);
                }
                GameEvent::EnemyDied { id, kind, pos } => {
                    log::info!("{kind:?} {:?} died at ({:.1}, {:.1})", id, pos.x, pos.y);
                }
                GameEvent::PlayerHit { source, damage } => {
                    log::debug!("Player took {damage:.1} from {:?}", source);
                }
                GameEvent::PlayerHealed { amount } => log::info!("Potion healed {amount:.0}"),
                GameEvent::PlayerDied => log::warn!("Player died"),
                GameEvent::RoomEntered { .. } => {}
            }
        }
    }
}
