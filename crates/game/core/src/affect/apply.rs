//! Attribute slots that affects and item entries modify.

use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

/// Saving throw categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SaveKind {
    Fortitude,
    Reflex,
    Will,
    Poison,
    Death,
}

impl SaveKind {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Damage types an actor may resist by percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageType {
    Fire,
    Cold,
    Air,
    Earth,
    Acid,
    Holy,
    Electric,
    Unholy,
    Slice,
    Puncture,
    Force,
    Sound,
    Poison,
    Disease,
    Negative,
    Illusion,
    Mental,
    Light,
    Energy,
    Water,
}

impl DamageType {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// The attribute slot an affect record modifies.
///
/// Slots that denote a cosmetic or non-scalar effect (`Feat`, `Special`,
/// `DamageReduction`, ...) take part in no numeric pass; they are queried
/// directly from the affect store instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ApplyType {
    #[default]
    None,
    Str,
    Dex,
    Int,
    Wis,
    Con,
    Cha,
    Class,
    Level,
    Age,
    Weight,
    Height,
    Psp,
    Hit,
    Move,
    Gold,
    Exp,
    ArmorClass,
    Hitroll,
    Damroll,
    Save(SaveKind),
    SpellResistance,
    Size,
    /// Armor class expressed in whole points; applies `modifier * 10`.
    ArmorClassNew,
    Resistance(DamageType),
    DamageReduction,
    Feat,
    Special,
}

impl ApplyType {
    const SCALAR: [ApplyType; 20] = [
        ApplyType::None,
        ApplyType::Str,
        ApplyType::Dex,
        ApplyType::Int,
        ApplyType::Wis,
        ApplyType::Con,
        ApplyType::Cha,
        ApplyType::Class,
        ApplyType::Level,
        ApplyType::Age,
        ApplyType::Weight,
        ApplyType::Height,
        ApplyType::Psp,
        ApplyType::Hit,
        ApplyType::Move,
        ApplyType::Gold,
        ApplyType::Exp,
        ApplyType::ArmorClass,
        ApplyType::Hitroll,
        ApplyType::Damroll,
    ];

    const TRAILING: [ApplyType; 6] = [
        ApplyType::SpellResistance,
        ApplyType::Size,
        ApplyType::ArmorClassNew,
        ApplyType::DamageReduction,
        ApplyType::Feat,
        ApplyType::Special,
    ];

    /// Every slot in a fixed order. Recomputation walks this exact sequence.
    pub fn all() -> impl Iterator<Item = ApplyType> {
        Self::SCALAR
            .into_iter()
            .chain(SaveKind::iter().map(ApplyType::Save))
            .chain(Self::TRAILING)
            .chain(DamageType::iter().map(ApplyType::Resistance))
    }

    /// Returns true if the numeric pass touches this slot.
    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            ApplyType::None
                | ApplyType::Class
                | ApplyType::Level
                | ApplyType::Age
                | ApplyType::Gold
                | ApplyType::Exp
                | ApplyType::DamageReduction
                | ApplyType::Feat
                | ApplyType::Special
        )
    }

    /// Number of distinct slots returned by [`ApplyType::all`].
    pub const COUNT: usize = 20 + SaveKind::COUNT + 6 + DamageType::COUNT;
}
