//! Spell slots and stat composition
//!
//! Each slot holds a set of equipped cards and its own cooldown. The
//! effective weapon stats of a slot are a fold over its cards with fixed
//! combination rules, so card order never matters except for the
//! last-write-wins payloads.

use serde::{Deserialize, Serialize};

use super::cards::{Card, CardId, CardKind, ChainLightning, Explosive};
use crate::tuning::WeaponTuning;

/// Identifier of a firing slot (1-based)
pub type SlotId = u32;

/// One firing slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub name: String,
    pub cards: Vec<Card>,
    /// Seconds remaining, always within [0, max_cooldown]
    pub cooldown: f32,
    pub max_cooldown: f32,
    pub on_cooldown: bool,
}

impl Slot {
    pub fn new(id: SlotId, max_cooldown: f32) -> Self {
        Self {
            id,
            name: format!("Slot {id}"),
            cards: Vec::new(),
            cooldown: 0.0,
            max_cooldown,
            on_cooldown: false,
        }
    }
}

/// Effective weapon stats of a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotStats {
    pub damage: f32,
    pub speed: f32,
    pub range: f32,
    /// Dimensionless reload factor; the slot cooldown does not use it
    pub reload: f32,
    pub projectile_count: u32,
    pub homing: bool,
    pub pierce: u32,
    pub bounce: u32,
    pub accuracy: f32,
    pub explosive: Option<Explosive>,
    pub chain_lightning: Option<ChainLightning>,
    pub cooldown: f32,
    pub max_cooldown: f32,
}

impl SlotStats {
    /// Stats of a slot with no cards
    pub fn base(weapon: &WeaponTuning) -> Self {
        Self {
            damage: weapon.damage,
            speed: weapon.speed,
            range: weapon.range,
            reload: 1.0,
            projectile_count: 1,
            homing: false,
            pierce: 0,
            bounce: 0,
            accuracy: weapon.accuracy,
            explosive: None,
            chain_lightning: None,
            cooldown: 0.0,
            max_cooldown: weapon.reload,
        }
    }
}

/// Fold a card set over the base weapon values
pub fn compose_stats<'a>(
    weapon: &WeaponTuning,
    cards: impl IntoIterator<Item = &'a Card>,
) -> SlotStats {
    let mut damage_mult = 1.0;
    let mut speed_mult = 1.0;
    let mut range_mult = 1.0;
    let mut reload_mult = 1.0;
    let mut stats = SlotStats::base(weapon);

    for card in cards {
        let m = &card.modifiers;
        if let Some(v) = m.damage_multiplier {
            damage_mult *= v;
        }
        if let Some(v) = m.speed_multiplier {
            speed_mult *= v;
        }
        if let Some(v) = m.range_multiplier {
            range_mult *= v;
        }
        if let Some(v) = m.reload_multiplier {
            reload_mult *= v;
        }
        if let Some(v) = m.projectile_count {
            stats.projectile_count = stats.projectile_count.max(v);
        }
        if m.homing == Some(true) {
            stats.homing = true;
        }
        if let Some(v) = m.pierce {
            stats.pierce = stats.pierce.max(v);
        }
        if let Some(v) = m.bounce {
            stats.bounce = stats.bounce.max(v);
        }
        if let Some(v) = m.accuracy {
            stats.accuracy = stats.accuracy.min(v);
        }
        if m.explosive.is_some() {
            stats.explosive = m.explosive;
        }
        if m.chain_lightning.is_some() {
            stats.chain_lightning = m.chain_lightning;
        }
    }

    stats.damage = weapon.damage * damage_mult;
    stats.speed = weapon.speed * speed_mult;
    stats.range = weapon.range * range_mult;
    stats.reload = reload_mult;
    stats
}

/// All firing slots plus the active selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loadout {
    pub slots: Vec<Slot>,
    pub active_slot: SlotId,
    weapon: WeaponTuning,
    next_card_id: u32,
}

impl Loadout {
    pub fn new(weapon: WeaponTuning) -> Self {
        let slots = (1..=weapon.slot_count)
            .map(|id| Slot::new(id, weapon.reload))
            .collect();
        Self {
            slots,
            active_slot: 1,
            weapon,
            next_card_id: 1,
        }
    }

    /// Empty every slot and select slot 1
    pub fn reset(&mut self) {
        *self = Self {
            next_card_id: self.next_card_id,
            ..Self::new(self.weapon.clone())
        };
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == id)
    }

    fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.id == id)
    }

    pub fn set_active_slot(&mut self, id: SlotId) {
        if self.slot(id).is_some() {
            self.active_slot = id;
        } else {
            log::warn!("Ignoring selection of unknown slot {id}");
        }
    }

    /// Equip a fresh instance of a library card; None if the slot is unknown
    pub fn add_card(&mut self, slot: SlotId, kind: CardKind) -> Option<CardId> {
        let id = CardId(self.next_card_id);
        let slot = self.slot_mut(slot)?;
        slot.cards.push(Card::new(id, kind));
        self.next_card_id += 1;
        Some(id)
    }

    pub fn remove_card(&mut self, slot: SlotId, card: CardId) -> Option<Card> {
        let slot = self.slot_mut(slot)?;
        let idx = slot.cards.iter().position(|c| c.id == card)?;
        Some(slot.cards.remove(idx))
    }

    /// Effective stats of a slot (base stats for an unknown slot)
    pub fn slot_stats(&self, id: SlotId) -> SlotStats {
        match self.slot(id) {
            Some(slot) => SlotStats {
                cooldown: slot.cooldown,
                max_cooldown: slot.max_cooldown,
                ..compose_stats(&self.weapon, &slot.cards)
            },
            None => SlotStats::base(&self.weapon),
        }
    }

    pub fn can_fire(&self, id: SlotId) -> bool {
        self.slot(id).is_some_and(|s| !s.on_cooldown)
    }

    pub fn start_cooldown(&mut self, id: SlotId) {
        if let Some(slot) = self.slot_mut(id) {
            slot.cooldown = slot.max_cooldown;
            slot.on_cooldown = true;
        }
    }

    pub fn update_cooldowns(&mut self, dt: f32) {
        for slot in self.slots.iter_mut().filter(|s| s.on_cooldown) {
            let remaining = slot.cooldown - dt;
            slot.cooldown = remaining.max(0.0);
            slot.on_cooldown = remaining > 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use proptest::prelude::*;

    fn loadout_with(kinds: &[CardKind]) -> Loadout {
        let mut loadout = Loadout::new(WeaponTuning::default());
        for &kind in kinds {
            loadout.add_card(1, kind).unwrap();
        }
        loadout
    }

    #[test]
    fn test_empty_slot_is_base() {
        let stats = loadout_with(&[]).slot_stats(1);
        assert_eq!(stats.damage, BASE_DAMAGE);
        assert_eq!(stats.speed, BASE_SPEED);
        assert_eq!(stats.range, BASE_RANGE);
        assert_eq!(stats.reload, 1.0);
        assert_eq!(stats.projectile_count, 1);
        assert_eq!(stats.accuracy, BASE_ACCURACY);
        assert_eq!(stats.max_cooldown, BASE_RELOAD);
    }

    #[test]
    fn test_unknown_slot_returns_base_stats() {
        let loadout = loadout_with(&[CardKind::IncreasedDamage]);
        let stats = loadout.slot_stats(99);
        assert_eq!(stats, SlotStats::base(&WeaponTuning::default()));
    }

    #[test]
    fn test_single_damage_card() {
        let stats = loadout_with(&[CardKind::IncreasedDamage]).slot_stats(1);
        assert!((stats.damage - BASE_DAMAGE * 1.5).abs() < 1e-5);

        let stats = loadout_with(&[CardKind::ReducedDamage]).slot_stats(1);
        assert!((stats.damage - BASE_DAMAGE * 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_every_damage_only_card_scales_damage() {
        let mut checked = 0;
        for kind in CardKind::ALL {
            let modifiers = kind.definition().modifiers;
            let Some(mult) = modifiers.damage_multiplier else {
                continue;
            };
            let damage_only = crate::sim::cards::Modifiers {
                damage_multiplier: Some(mult),
                ..Default::default()
            };
            if modifiers != damage_only {
                continue;
            }

            let stats = loadout_with(&[kind]).slot_stats(1);
            assert!(
                (stats.damage - BASE_DAMAGE * mult).abs() < 1e-5,
                "{} gave {}",
                kind.as_str(),
                stats.damage
            );
            checked += 1;
        }
        assert_eq!(checked, 2);
    }

    #[test]
    fn test_pierce_uses_max_not_sum() {
        let mut loadout = loadout_with(&[CardKind::Piercing]);
        loadout.slots[0].cards[0].modifiers.pierce = Some(2);
        loadout.add_card(1, CardKind::Piercing);
        assert_eq!(loadout.slot_stats(1).pierce, 3);
    }

    #[test]
    fn test_reload_factors_multiply() {
        let stats = loadout_with(&[CardKind::FastReload, CardKind::SlowReload]).slot_stats(1);
        assert!((stats.reload - 0.75).abs() < 1e-6);
        // cooldown duration is untouched
        assert_eq!(stats.max_cooldown, BASE_RELOAD);
    }

    #[test]
    fn test_accuracy_takes_minimum() {
        let stats = loadout_with(&[CardKind::Inaccurate]).slot_stats(1);
        // 0.7 does not beat the 0.4 base
        assert_eq!(stats.accuracy, BASE_ACCURACY);

        let mut loadout = loadout_with(&[CardKind::Inaccurate]);
        loadout.slots[0].cards[0].modifiers.accuracy = Some(0.1);
        assert_eq!(loadout.slot_stats(1).accuracy, 0.1);
    }

    #[test]
    fn test_last_explosive_wins() {
        let mut loadout = loadout_with(&[CardKind::Explosive, CardKind::Explosive]);
        loadout.slots[0].cards[1].modifiers.explosive = Some(Explosive {
            radius: 9.0,
            damage: 1.0,
        });
        let stats = loadout.slot_stats(1);
        assert_eq!(
            stats.explosive,
            Some(Explosive {
                radius: 9.0,
                damage: 1.0
            })
        );
        // speed multipliers still stack
        assert!((stats.speed - BASE_SPEED * 0.49).abs() < 1e-4);
    }

    #[test]
    fn test_triple_shot_with_piercing() {
        let stats = loadout_with(&[CardKind::TripleShot, CardKind::Piercing]).slot_stats(1);
        assert_eq!(stats.projectile_count, 3);
        assert_eq!(stats.pierce, 3);
        assert!((stats.damage - BASE_DAMAGE * 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_add_and_remove_cards() {
        let mut loadout = Loadout::new(WeaponTuning::default());
        let a = loadout.add_card(2, CardKind::Homing).unwrap();
        let b = loadout.add_card(2, CardKind::Homing).unwrap();
        assert_ne!(a, b);
        assert!(loadout.add_card(42, CardKind::Homing).is_none());

        let removed = loadout.remove_card(2, a).unwrap();
        assert_eq!(removed.id, a);
        assert_eq!(loadout.slot(2).unwrap().cards.len(), 1);
        assert!(loadout.remove_card(2, a).is_none());
        assert!(loadout.slot_stats(2).homing);
    }

    #[test]
    fn test_cooldown_cycle() {
        let mut loadout = Loadout::new(WeaponTuning::default());
        loadout.start_cooldown(1);
        assert!(!loadout.can_fire(1));
        assert_eq!(loadout.slot(1).unwrap().cooldown, BASE_RELOAD);

        loadout.update_cooldowns(3.0);
        let slot = loadout.slot(1).unwrap();
        assert!(slot.on_cooldown);
        assert!((slot.cooldown - 0.4).abs() < 1e-5);

        loadout.update_cooldowns(1.0);
        let slot = loadout.slot(1).unwrap();
        assert!(!slot.on_cooldown);
        assert_eq!(slot.cooldown, 0.0);
        assert!(loadout.can_fire(1));

        // Other slots untouched, unknown slot ignored
        loadout.start_cooldown(77);
        assert!(loadout.can_fire(2));
    }

    #[test]
    fn test_reset_and_active_slot() {
        let mut loadout = loadout_with(&[CardKind::Bouncing]);
        loadout.set_active_slot(3);
        assert_eq!(loadout.active_slot, 3);
        loadout.set_active_slot(9);
        assert_eq!(loadout.active_slot, 3);

        loadout.start_cooldown(1);
        loadout.reset();
        assert_eq!(loadout.active_slot, 1);
        assert!(loadout.slots.iter().all(|s| s.cards.is_empty() && !s.on_cooldown));
        assert_eq!(loadout.slots.len(), 5);
    }

    fn card_kind() -> impl Strategy<Value = CardKind> {
        (0..CardKind::ALL.len()).prop_map(|i| CardKind::ALL[i])
    }

    proptest! {
        #[test]
        fn prop_stats_ignore_card_order(kinds in prop::collection::vec(card_kind(), 0..8)) {
            let forward = loadout_with(&kinds).slot_stats(1);
            let mut reversed_kinds = kinds.clone();
            reversed_kinds.reverse();
            let reversed = loadout_with(&reversed_kinds).slot_stats(1);

            prop_assert!((forward.damage - reversed.damage).abs() < 1e-3);
            prop_assert!((forward.speed - reversed.speed).abs() < 1e-3);
            prop_assert!((forward.range - reversed.range).abs() < 1e-3);
            prop_assert!((forward.reload - reversed.reload).abs() < 1e-5);
            prop_assert_eq!(forward.projectile_count, reversed.projectile_count);
            prop_assert_eq!(forward.pierce, reversed.pierce);
            prop_assert_eq!(forward.bounce, reversed.bounce);
            prop_assert_eq!(forward.homing, reversed.homing);
            prop_assert_eq!(forward.accuracy, reversed.accuracy);
        }

        #[test]
        fn prop_cooldown_stays_in_range(steps in prop::collection::vec(0.0f32..2.0, 1..20)) {
            let mut loadout = Loadout::new(WeaponTuning::default());
            loadout.start_cooldown(1);
            for dt in steps {
                loadout.update_cooldowns(dt);
                let slot = loadout.slot(1).unwrap();
                prop_assert!(slot.cooldown >= 0.0 && slot.cooldown <= slot.max_cooldown);
                prop_assert_eq!(slot.on_cooldown, slot.cooldown > 0.0);
            }
        }
    }
}
