//! Data-driven content for the rules core.
//!
//! This crate provides loaders for RON/TOML data files:
//! - Spell catalogs (RON), built into a [`mud_core::SpellRegistry`]
//! - Item catalogs (RON)
//! - Rules configuration (TOML)
//!
//! Content is consumed by the runtime as read-only oracles and never appears
//! in actor state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, ItemCatalog, ItemLoader, LoadResult, SpellCatalog, SpellLoader,
};
