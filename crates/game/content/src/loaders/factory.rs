//! Content factory for building oracles from data files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mud_core::{Item, RulesConfig, SpellRegistry};

use crate::loaders::{ConfigLoader, ItemLoader, LoadResult, SpellLoader};

/// Content factory that loads all rules content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── spells.ron
/// └── items.ron
/// ```
///
/// A missing `spells.ron` falls back to the builtin catalog; a missing
/// `config.toml` falls back to [`RulesConfig::default`].
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load rules configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<RulesConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(RulesConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the spell registry from `spells.ron`.
    pub fn load_spells(&self) -> LoadResult<SpellRegistry> {
        let path = self.data_dir.join("spells.ron");
        if !path.exists() {
            tracing::info!(path = %path.display(), "no spell catalog, using builtin");
            return SpellLoader::builtin();
        }
        SpellLoader::load(&path)
    }

    /// Load item catalog from `items.ron`.
    pub fn load_items(&self) -> LoadResult<Vec<Arc<Item>>> {
        let path = self.data_dir.join("items.ron");
        ItemLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
