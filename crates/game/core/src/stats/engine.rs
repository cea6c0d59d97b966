//! Attribute recomputation engine.
//!
//! `recompute` strips an actor back to its canonical base and reapplies every
//! source through the resolver. It reads nothing but the actor's own state,
//! so calling it twice in a row yields identical results.

use super::attributes::Attributes;
use super::caps::apply_caps;
use super::resolver::{collect_sources, net_modifier};
use crate::affect::{AffectStore, ApplyType};
use crate::config::RulesConfig;
use crate::state::{ActorId, ActorKind, Equipment, RecomputeError};

/// Derives the current attribute set.
///
/// 1. copy base
/// 2. compute the net modifier per slot across affects and worn items
/// 3. apply it
/// 4. OR in every status flag from affects and items
/// 5. constitution hit-point fixup, then caps
pub fn recompute(
    actor: ActorId,
    kind: ActorKind,
    level: u8,
    base: &Attributes,
    affects: &AffectStore,
    equipment: &Equipment,
) -> Result<Attributes, RecomputeError> {
    validate_base(actor, base)?;

    let mut current = base.clone();
    let sources = collect_sources(affects, equipment);

    for slot in ApplyType::all().filter(|slot| slot.is_numeric()) {
        let net = net_modifier(slot, &sources, None);
        current.apply(slot, net);
    }

    for record in affects.records() {
        current.flags |= record.flags;
    }
    for (_, item) in equipment.worn() {
        current.flags |= item.flags;
    }

    // Clamp abilities before the constitution fixup reads them.
    apply_caps(&mut current, base, kind, level);
    let con_shift = (current.abilities.con - base.abilities.con) / 2;
    current.max_hit += con_shift * i32::from(level);

    Ok(current)
}

fn validate_base(actor: ActorId, base: &Attributes) -> Result<(), RecomputeError> {
    for (field, value) in base.abilities.each() {
        if !(1..=RulesConfig::STAT_CAP).contains(&value) {
            return Err(RecomputeError::CorruptBase {
                actor,
                field,
                value,
            });
        }
    }
    if base.max_hit <= 0 {
        return Err(RecomputeError::CorruptBase {
            actor,
            field: "max_hit",
            value: base.max_hit,
        });
    }
    Ok(())
}
