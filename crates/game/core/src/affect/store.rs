//! Per-actor ordered collection of affect records.
//!
//! Records are kept in insertion order, newest last. Removal during a pass is
//! deferred to the end of the pass so iteration never observes a half-edited
//! list.

use super::record::{AffectId, AffectRecord, JoinPolicy};
use crate::state::SpellId;

/// A stored record with its stable handle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffectEntry {
    pub id: AffectId,
    pub record: AffectRecord,
}

/// Owned affect list of one actor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffectStore {
    entries: Vec<AffectEntry>,
    next_id: u32,
}

impl AffectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record as the most recent and returns its handle.
    pub fn add(&mut self, record: AffectRecord) -> AffectId {
        let id = AffectId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(AffectEntry { id, record });
        id
    }

    /// Adds `record`, merging it with the most recent record of the same
    /// spell and slot if one exists.
    ///
    /// The merged record replaces the old one and becomes the most recent.
    pub fn join(&mut self, mut record: AffectRecord, policy: JoinPolicy) -> AffectId {
        let existing = self
            .entries
            .iter()
            .rposition(|e| e.record.spell == record.spell && e.record.location == record.location);

        if let Some(index) = existing {
            let old = self.entries.remove(index);
            policy.merge(&mut record, &old.record);
        }
        self.add(record)
    }

    /// Removes one record by handle.
    pub fn remove(&mut self, id: AffectId) -> Option<AffectRecord> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index).record)
    }

    /// Removes every record from `spell`. Returns how many were removed.
    pub fn remove_spell(&mut self, spell: SpellId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.record.spell != spell);
        before - self.entries.len()
    }

    pub fn affected_by(&self, spell: SpellId) -> bool {
        self.entries.iter().any(|e| e.record.spell == spell)
    }

    pub fn get(&self, id: AffectId) -> Option<&AffectRecord> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.record)
    }

    /// Iterates oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &AffectEntry> {
        self.entries.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = &AffectRecord> {
        self.entries.iter().map(|e| &e.record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advances every timed record by one pulse.
    ///
    /// Positive durations count down; a record whose duration reaches zero on
    /// this call is removed at the end of the pass. Permanent records are
    /// untouched. Returns the spells that wore off, announcing a run of
    /// adjacent records from the same spell only once.
    pub fn decrement(&mut self) -> Vec<SpellId> {
        let mut expired = vec![false; self.entries.len()];
        for (slot, entry) in expired.iter_mut().zip(self.entries.iter_mut()) {
            let duration = &mut entry.record.duration;
            if *duration > 0 {
                *duration -= 1;
                *slot = *duration == 0;
            } else if *duration == 0 {
                *slot = true;
            }
        }

        let mut worn_off: Vec<SpellId> = Vec::new();
        for (index, entry) in self.entries.iter().enumerate() {
            if !expired[index] || entry.record.spell == SpellId::NONE {
                continue;
            }
            let continues_run = self.entries.get(index + 1).is_some_and(|next| {
                expired[index + 1] && next.record.spell == entry.record.spell
            });
            if !continues_run {
                worn_off.push(entry.record.spell);
            }
        }

        let mut flags = expired.into_iter();
        self.entries.retain(|_| !flags.next().unwrap_or(false));
        worn_off
    }
}
