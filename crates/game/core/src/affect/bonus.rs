//! Bonus categories and their stacking policy.

use strum::{Display, EnumCount, EnumIter};

/// Category tag on a modifier.
///
/// Two bonuses of the same non-stacking category on the same slot do not add:
/// only the best applies. Stacking categories sum every contribution.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display, EnumIter, EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BonusCategory {
    /// Untyped bonus. Always stacks.
    #[default]
    Undefined,
    Enhancement,
    Racial,
    Inherent,
    Circumstance,
    Morale,
    Resistance,
    Insight,
    Size,
    NaturalArmor,
    Deflection,
    Luck,
    Universal,
    Dodge,
    Alchemical,
    Shield,
    Sacred,
    Armor,
    Food,
    Drink,
    Competence,
}

impl BonusCategory {
    /// Returns true if contributions in this category add together.
    pub const fn stacks(self) -> bool {
        matches!(
            self,
            BonusCategory::Dodge
                | BonusCategory::Circumstance
                | BonusCategory::Undefined
                | BonusCategory::Universal
        )
    }
}
