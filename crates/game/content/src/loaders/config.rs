//! Rules configuration loader.

use std::path::Path;

use mud_core::RulesConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for rules configuration from TOML files.
///
/// Missing keys fall back to the [`RulesConfig`] defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<RulesConfig> {
        let content = read_file(path)?;
        Self::load_str(&content)
    }

    pub fn load_str(content: &str) -> LoadResult<RulesConfig> {
        let config: RulesConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.affect_pulse == 0 {
            anyhow::bail!("affect_pulse must be at least 1");
        }
        if config.deaf_fumble_chance == 0 {
            anyhow::bail!("deaf_fumble_chance must be at least 1");
        }

        Ok(config)
    }
}
