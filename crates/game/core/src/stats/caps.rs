//! Attribute caps applied at the end of every recomputation.

use super::attributes::Attributes;
use crate::config::RulesConfig;
use crate::state::ActorKind;

/// Clamps `current` into absolute and level-scaled bounds.
///
/// Abilities never leave `[1, STAT_CAP]`. Players are additionally held to
/// what their base and level allow; non-players skip the level-scaled caps.
pub fn apply_caps(current: &mut Attributes, base: &Attributes, kind: ActorKind, level: u8) {
    for score in current.abilities.each_mut() {
        *score = (*score).clamp(1, RulesConfig::STAT_CAP);
    }

    if kind == ActorKind::Npc {
        return;
    }

    let level = i32::from(level);
    let ability_headroom = RulesConfig::BASE_STAT_CAP + level / 4;
    let base_scores = [
        base.abilities.str,
        base.abilities.dex,
        base.abilities.con,
        base.abilities.int,
        base.abilities.wis,
        base.abilities.cha,
    ];
    for (score, base_score) in current.abilities.each_mut().into_iter().zip(base_scores) {
        *score = (*score).min(base_score + ability_headroom).max(1);
    }

    let hitdam_headroom = RulesConfig::HITDAM_CAP + level / 3;
    current.hitroll = current.hitroll.min(base.hitroll + hitdam_headroom);
    current.damroll = current.damroll.min(base.damroll + hitdam_headroom);
}
