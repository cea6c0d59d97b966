//! Item catalog loader.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use mud_core::Item;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Item catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub items: Vec<Item>,
}

/// Loader for item catalog from RON files.
pub struct ItemLoader;

impl ItemLoader {
    /// Load item catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<Arc<Item>>> {
        let content = read_file(path)?;
        Self::load_str(&content)
    }

    /// Parses a catalog. Item ids must be unique.
    pub fn load_str(content: &str) -> LoadResult<Vec<Arc<Item>>> {
        let catalog: ItemCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse item catalog RON: {}", e))?;

        let mut seen = HashSet::new();
        for item in &catalog.items {
            if !seen.insert(item.id) {
                anyhow::bail!("Duplicate item id {} ({})", item.id, item.name);
            }
        }

        Ok(catalog.items.into_iter().map(Arc::new).collect())
    }
}
