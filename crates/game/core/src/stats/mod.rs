//! Attribute model, bonus resolution and recomputation.
//!
//! Current = caps(base + resolved(affects, equipment)) with flags ORed in.
mod attributes;
mod caps;
mod engine;
mod resolver;

pub use attributes::{Abilities, Attributes, Size, ability_bonus};
pub use caps::apply_caps;
pub use engine::recompute;
pub use resolver::{BonusSource, Exclude, SourceRef, best_in_category, collect_sources, net_modifier};
