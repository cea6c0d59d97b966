//! Resistance and saving-throw checks.
//!
//! Both checks are pure: they read the two actors, roll dice and report. They
//! never touch actor state and never narrate; the routine that asked decides
//! what a success means.

use crate::affect::{AffectFlags, SaveKind};
use crate::config::RulesConfig;
use crate::env::Dice;
use crate::state::{Actor, Alignment, Feats};
use crate::stats::ability_bonus;

/// Result of [`resist`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResistCheck {
    pub roll: i32,
    pub challenge: i32,
    pub resistance: i32,
}

impl ResistCheck {
    /// Resistance strictly above the challenge negates the effect.
    pub fn resisted(&self) -> bool {
        self.resistance > self.challenge
    }
}

/// Result of [`save`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveCheck {
    pub roll: i32,
    pub total: i32,
    pub challenge: i32,
    pub success: bool,
}

/// The defender's spell resistance against any caster.
pub fn spell_resistance(defender: &Actor, modifier: i32) -> i32 {
    let level = i32::from(defender.level);
    let mut resist = defender.current().spell_res;
    if !defender.is_npc() {
        resist += 2 * i32::from(defender.spell_resistance_ranks);
    }
    if defender.feats.contains(Feats::DIAMOND_SOUL) {
        resist += 10 + level;
    }
    if defender.has_any(AffectFlags::SPELL_RESISTANT) {
        resist += 12 + level;
    }
    (resist + modifier).clamp(0, RulesConfig::SPELL_RES_CAP)
}

fn penetration(attacker: &Actor) -> i32 {
    if attacker.is_npc() {
        return 0;
    }
    [
        (Feats::SPELL_PENETRATION, 2),
        (Feats::GREATER_SPELL_PENETRATION, 3),
        (Feats::EPIC_SPELL_PENETRATION, 4),
    ]
    .into_iter()
    .filter(|(feat, _)| attacker.feats.contains(*feat))
    .map(|(_, bonus)| bonus)
    .sum()
}

/// Rolls the attacker's caster level against the defender's spell resistance.
///
/// No automatic success or failure on natural rolls.
pub fn resist(attacker: &Actor, defender: &Actor, modifier: i32, dice: &Dice<'_>) -> ResistCheck {
    let roll = dice.d20();
    let challenge = roll + attacker.caster_level() + penetration(attacker);
    let resistance = spell_resistance(defender, modifier);
    ResistCheck {
        roll,
        challenge,
        resistance,
    }
}

/// Everything the defender adds to a d20 saving throw of `kind`.
pub fn save_bonus(defender: &Actor, kind: SaveKind, modifier: i32) -> i32 {
    let abilities = &defender.current().abilities;
    let player = !defender.is_npc();
    let feat = |f: Feats| player && defender.feats.contains(f);

    let mut bonus = match kind {
        SaveKind::Fortitude => {
            ability_bonus(abilities.con)
                + if feat(Feats::GREAT_FORTITUDE) { 2 } else { 0 }
                + if feat(Feats::EPIC_FORTITUDE) { 3 } else { 0 }
        }
        SaveKind::Reflex => {
            ability_bonus(abilities.dex)
                + if feat(Feats::LIGHTNING_REFLEXES) { 2 } else { 0 }
                + if feat(Feats::EPIC_REFLEXES) { 3 } else { 0 }
        }
        SaveKind::Will => {
            ability_bonus(abilities.wis)
                + if feat(Feats::IRON_WILL) { 2 } else { 0 }
                + if feat(Feats::EPIC_WILL) { 3 } else { 0 }
        }
        SaveKind::Poison | SaveKind::Death => 0,
    };
    if feat(Feats::LUCK_OF_HEROES) {
        bonus += 1;
    }
    if defender.is_npc() {
        bonus += i32::from(defender.level) / 3 + 1;
    }
    bonus + defender.current().save(kind) + modifier
}

fn save_challenge(attacker: &Actor) -> i32 {
    let abilities = &attacker.current().abilities;
    let stat = ability_bonus(abilities.wis)
        .max(ability_bonus(abilities.cha))
        .max(ability_bonus(abilities.int));
    10 + attacker.caster_level() / 2 + stat
}

/// Rolls the defender's saving throw against the attacker's spell DC.
pub fn save(
    attacker: &Actor,
    defender: &Actor,
    kind: SaveKind,
    modifier: i32,
    dice: &Dice<'_>,
) -> SaveCheck {
    let roll = dice.d20();
    let challenge = save_challenge(attacker);

    let mut total = roll + save_bonus(defender, kind, modifier);
    match attacker.alignment_class() {
        Alignment::Good if defender.has_any(AffectFlags::PROTECT_GOOD) => total += 2,
        Alignment::Evil if defender.has_any(AffectFlags::PROTECT_EVIL) => total += 2,
        _ => {}
    }
    if defender.has_any(AffectFlags::SICKENED) {
        total -= 2;
    }
    let total = total.clamp(0, RulesConfig::SAVE_CAP);

    let success = if defender.is_dead() || roll == 1 {
        false
    } else {
        roll == 20 || total > challenge
    };
    SaveCheck {
        roll,
        total,
        challenge,
        success,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affect::AffectRecord;
    use crate::env::{PcgRng, RngOracle};
    use crate::state::{ActorId, ActorKind, CastClass, CasterLevels, Position, SpellId};
    use crate::stats::Attributes;

    /// Returns `value - 1` so `roll_die` yields exactly `value`.
    struct Fixed(u32);

    impl RngOracle for Fixed {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0 - 1
        }
    }

    fn caster(level: u8) -> Actor {
        Actor::new(ActorId(1), "caster", ActorKind::Player, Attributes::default())
            .with_level(level)
            .with_caster(
                CastClass::Wizard,
                CasterLevels {
                    arcane: level,
                    divine: 0,
                },
            )
    }

    fn target() -> Actor {
        Actor::new(ActorId(2), "target", ActorKind::Player, Attributes::default())
    }

    #[test]
    fn resistance_must_exceed_challenge() {
        let attacker = caster(5);
        let mut defender = target();
        defender.update_base(|b| b.spell_res = 16);
        let dice = Dice::new(&Fixed(10), 0, 0, 1);
        let check = resist(&attacker, &defender, 0, &dice);
        assert_eq!(check.challenge, 15);
        assert!(check.resisted());

        defender.update_base(|b| b.spell_res = 15);
        let check = resist(&attacker, &defender, 0, &dice);
        assert!(!check.resisted());
    }

    #[test]
    fn penetration_feats_stack_for_players() {
        let attacker = caster(1).with_feats(Feats::SPELL_PENETRATION | Feats::GREATER_SPELL_PENETRATION);
        let dice = Dice::new(&Fixed(1), 0, 0, 1);
        assert_eq!(resist(&attacker, &target(), 0, &dice).challenge, 1 + 1 + 5);
    }

    #[test]
    fn spell_resistance_clamps() {
        let mut defender = target();
        defender.update_base(|b| b.spell_res = 90);
        assert_eq!(spell_resistance(&defender, 50), RulesConfig::SPELL_RES_CAP);
        assert_eq!(spell_resistance(&defender, -200), 0);
    }

    #[test]
    fn natural_one_always_fails() {
        let attacker = caster(1);
        let mut defender = target();
        defender.update_base(|b| b.saves[SaveKind::Will.index()] = 40);
        let check = save(&attacker, &defender, SaveKind::Will, 0, &Dice::new(&Fixed(1), 0, 0, 2));
        assert!(!check.success);
    }

    #[test]
    fn natural_twenty_always_succeeds() {
        let attacker = caster(40);
        let defender = target();
        let check = save(&attacker, &defender, SaveKind::Will, -100, &Dice::new(&Fixed(20), 0, 0, 2));
        assert!(check.success);
    }

    #[test]
    fn dead_defenders_never_save() {
        let attacker = caster(1);
        let mut defender = target();
        defender.position = Position::Dead;
        let check = save(&attacker, &defender, SaveKind::Fortitude, 0, &Dice::new(&Fixed(20), 0, 0, 2));
        assert!(!check.success);
    }

    #[test]
    fn protection_applies_only_against_matching_alignment() {
        let evil = caster(4).with_alignment(-900);
        let good = caster(4).with_alignment(900);
        let mut defender = target();
        defender.add_affect(AffectRecord::status(SpellId(7), AffectFlags::PROTECT_EVIL, 10));
        let dice = || Dice::new(&Fixed(10), 0, 0, 2);
        let vs_evil = save(&evil, &defender, SaveKind::Will, 0, &dice());
        let vs_good = save(&good, &defender, SaveKind::Will, 0, &dice());
        assert_eq!(vs_evil.total, vs_good.total + 2);
    }

    #[test]
    fn save_total_stays_in_range() {
        let attacker = caster(1);
        let dice = Dice::new(&PcgRng, 3, 3, 3);
        for _ in 0..100 {
            let check = save(&attacker, &target(), SaveKind::Reflex, 500, &dice);
            assert_eq!(check.total, RulesConfig::SAVE_CAP);
        }
    }
}
