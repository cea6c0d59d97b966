//! Bonus-category resolver.
//!
//! Given every source touching one attribute slot, returns the net modifier
//! to apply:
//!
//! - stacking categories sum every contribution
//! - non-stacking categories apply only the single highest modifier seen,
//!   so a lone penalty still applies but never undercuts a bonus beside it
//!
//! The resolver is a pure function over its inputs; it never reads an actor.

use strum::EnumCount;

use crate::affect::{AffectId, AffectStore, ApplyType, BonusCategory};
use crate::state::{Equipment, SpellId, WearSlot};

/// Where a bonus comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceRef {
    Affect { id: AffectId, spell: SpellId },
    Item { slot: WearSlot },
}

/// A source to leave out of a scan.
///
/// Used when an incoming affect compares itself against everything else
/// before deciding whether it changes anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Exclude {
    Affect(AffectId),
    Spell(SpellId),
    Slot(WearSlot),
}

impl Exclude {
    fn matches(self, origin: SourceRef) -> bool {
        match (self, origin) {
            (Exclude::Affect(want), SourceRef::Affect { id, .. }) => want == id,
            (Exclude::Spell(want), SourceRef::Affect { spell, .. }) => want == spell,
            (Exclude::Slot(want), SourceRef::Item { slot }) => want == slot,
            _ => false,
        }
    }
}

/// One modifier contribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BonusSource {
    pub origin: SourceRef,
    pub location: ApplyType,
    pub modifier: i32,
    pub bonus: BonusCategory,
}

/// Collects every modifier contribution from affects and worn items.
pub fn collect_sources(affects: &AffectStore, equipment: &Equipment) -> Vec<BonusSource> {
    let from_affects = affects.iter().map(|entry| BonusSource {
        origin: SourceRef::Affect {
            id: entry.id,
            spell: entry.record.spell,
        },
        location: entry.record.location,
        modifier: entry.record.modifier,
        bonus: entry.record.bonus,
    });

    let from_items = equipment.worn().flat_map(|(slot, item)| {
        item.affects.iter().map(move |affect| BonusSource {
            origin: SourceRef::Item { slot },
            location: affect.location,
            modifier: affect.modifier,
            bonus: affect.bonus,
        })
    });

    from_affects.chain(from_items).collect()
}

/// Net modifier for `location` across `sources`, optionally skipping one source.
pub fn net_modifier<'a>(
    location: ApplyType,
    sources: impl IntoIterator<Item = &'a BonusSource>,
    exclude: Option<Exclude>,
) -> i32 {
    let mut stacked = 0;
    let mut best: [Option<i32>; BonusCategory::COUNT] = [None; BonusCategory::COUNT];

    for source in sources {
        if source.location != location {
            continue;
        }
        if exclude.is_some_and(|e| e.matches(source.origin)) {
            continue;
        }

        if source.bonus.stacks() {
            stacked += source.modifier;
        } else {
            let slot = &mut best[source.bonus as usize];
            *slot = Some(slot.map_or(source.modifier, |b| b.max(source.modifier)));
        }
    }

    stacked + best.iter().flatten().sum::<i32>()
}

/// Highest modifier in one non-stacking category, ignoring `exclude`.
///
/// `None` when nothing else contributes, and always for stacking categories
/// and slots with no numeric meaning.
pub fn best_in_category<'a>(
    location: ApplyType,
    bonus: BonusCategory,
    sources: impl IntoIterator<Item = &'a BonusSource>,
    exclude: Option<Exclude>,
) -> Option<i32> {
    if bonus.stacks() || !location.is_numeric() {
        return None;
    }
    sources
        .into_iter()
        .filter(|s| s.location == location && s.bonus == bonus)
        .filter(|s| !exclude.is_some_and(|e| e.matches(s.origin)))
        .map(|s| s.modifier)
        .max()
}
