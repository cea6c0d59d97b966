//! Content loaders for reading rules data from files.
//!
//! Each loader parses one file format into the core types the runtime hands
//! to [`mud_core::RulesEnv`].

pub mod config;
pub mod factory;
pub mod item;
pub mod spells;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use item::{ItemCatalog, ItemLoader};
pub use spells::{SpellCatalog, SpellLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
