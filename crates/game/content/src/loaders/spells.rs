//! Spell catalog loader.
//!
//! A catalog is a RON file holding every [`SpellDescriptor`] the server knows.
//! Loading checks that each declared routine has the data it needs, so a
//! malformed entry fails at startup instead of silently doing nothing when
//! cast.

use std::path::Path;

use mud_core::magic::{RoutineFlags, SpellDescriptor, SpellRegistry};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Catalog embedded at build time.
const BUILTIN: &str = include_str!("../../data/spells.ron");

/// Spell catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellCatalog {
    pub spells: Vec<SpellDescriptor>,
}

/// Loader for spell catalogs from RON files.
pub struct SpellLoader;

impl SpellLoader {
    /// Load a spell catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<SpellRegistry> {
        let content = read_file(path)?;
        Self::load_str(&content)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    /// Parse a spell catalog from RON text.
    pub fn load_str(content: &str) -> LoadResult<SpellRegistry> {
        let catalog: SpellCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse spell catalog RON: {}", e))?;

        let mut registry = SpellRegistry::new();
        for spell in catalog.spells {
            validate(&spell)?;
            let id = spell.id;
            if let Some(previous) = registry.insert(spell) {
                anyhow::bail!("Duplicate spell id {} ({})", id, previous.name);
            }
        }

        tracing::debug!(spells = registry.len(), "loaded spell catalog");
        Ok(registry)
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> LoadResult<SpellRegistry> {
        Self::load_str(BUILTIN)
    }
}

fn validate(spell: &SpellDescriptor) -> LoadResult<()> {
    let missing = |what: &str| {
        anyhow::anyhow!(
            "Spell {} ({}) declares {} but has no data for it",
            spell.id,
            spell.name,
            what
        )
    };

    if spell.routines.contains(RoutineFlags::DAMAGE) && spell.damage.is_none() {
        return Err(missing("DAMAGE"));
    }
    let needs_affects = RoutineFlags::AFFECTS | RoutineFlags::MASSES;
    if spell.routines.intersects(needs_affects) && spell.affects.is_empty() {
        return Err(missing("AFFECTS"));
    }
    if spell.routines.contains(RoutineFlags::UNAFFECTS) && spell.unaffects.is_empty() {
        return Err(missing("UNAFFECTS"));
    }
    if spell.routines.contains(RoutineFlags::POINTS) && spell.points.is_none() {
        return Err(missing("POINTS"));
    }
    if spell.min_level.is_empty() {
        tracing::warn!(spell = %spell.id, name = %spell.name, "spell has no casting class");
    }
    Ok(())
}
