//! Attribute sets.
//!
//! An actor owns two [`Attributes`]: the canonical base, which effects never
//! touch, and the current set, which is regenerated from base by every
//! recomputation pass and never persisted.

use strum::{Display, EnumCount, EnumIter};

use crate::affect::{AffectFlags, ApplyType, DamageType, SaveKind};

/// Physical size category.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display, EnumIter, EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Size {
    Fine,
    Diminutive,
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
    Huge,
    Gargantuan,
    Colossal,
}

impl Size {
    /// Size for a numeric category, clamped into the valid range.
    pub fn from_steps(steps: i32) -> Self {
        use strum::IntoEnumIterator;
        let index = steps.clamp(Size::Fine as i32, Size::Colossal as i32) as usize;
        Size::iter().nth(index).unwrap_or_default()
    }
}

/// The six ability scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Abilities {
    pub str: i32,
    pub dex: i32,
    pub con: i32,
    pub int: i32,
    pub wis: i32,
    pub cha: i32,
}

impl Abilities {
    pub fn new(str: i32, dex: i32, con: i32, int: i32, wis: i32, cha: i32) -> Self {
        Self {
            str,
            dex,
            con,
            int,
            wis,
            cha,
        }
    }

    /// Mutable access to every score, in declaration order.
    pub(crate) fn each_mut(&mut self) -> [&mut i32; 6] {
        [
            &mut self.str,
            &mut self.dex,
            &mut self.con,
            &mut self.int,
            &mut self.wis,
            &mut self.cha,
        ]
    }

    pub(crate) fn each(&self) -> [(&'static str, i32); 6] {
        [
            ("str", self.str),
            ("dex", self.dex),
            ("con", self.con),
            ("int", self.int),
            ("wis", self.wis),
            ("cha", self.cha),
        ]
    }
}

impl Default for Abilities {
    /// Average human: all 10.
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

/// Modifier granted by an ability score: `(score - 10) / 2`, rounded down.
pub fn ability_bonus(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Every attribute the rules core derives.
///
/// Armor class is kept in tenths of a point, so [`ApplyType::ArmorClassNew`]
/// applies ten per modifier point.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attributes {
    pub abilities: Abilities,
    pub max_hit: i32,
    pub max_psp: i32,
    pub max_move: i32,
    pub armor_class: i32,
    pub hitroll: i32,
    pub damroll: i32,
    pub spell_res: i32,
    pub size: Size,
    pub saves: [i32; SaveKind::COUNT],
    pub resistances: [i32; DamageType::COUNT],
    pub weight: i32,
    pub height: i32,
    pub flags: AffectFlags,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            abilities: Abilities::default(),
            max_hit: 20,
            max_psp: 0,
            max_move: 100,
            armor_class: 100,
            hitroll: 0,
            damroll: 0,
            spell_res: 0,
            size: Size::default(),
            saves: [0; SaveKind::COUNT],
            resistances: [0; DamageType::COUNT],
            weight: 150,
            height: 170,
            flags: AffectFlags::empty(),
        }
    }
}

impl Attributes {
    pub fn save(&self, kind: SaveKind) -> i32 {
        self.saves[kind.index()]
    }

    pub fn resistance(&self, kind: DamageType) -> i32 {
        self.resistances[kind.index()]
    }

    /// Adds `amount` to the attribute named by `slot`.
    ///
    /// Returns false for slots the numeric pass ignores.
    pub fn apply(&mut self, slot: ApplyType, amount: i32) -> bool {
        if amount == 0 {
            return slot.is_numeric();
        }
        match slot {
            ApplyType::Str => self.abilities.str += amount,
            ApplyType::Dex => self.abilities.dex += amount,
            ApplyType::Int => self.abilities.int += amount,
            ApplyType::Wis => self.abilities.wis += amount,
            ApplyType::Con => self.abilities.con += amount,
            ApplyType::Cha => self.abilities.cha += amount,
            ApplyType::Weight => self.weight += amount,
            ApplyType::Height => self.height += amount,
            ApplyType::Psp => self.max_psp += amount,
            ApplyType::Hit => self.max_hit += amount,
            ApplyType::Move => self.max_move += amount,
            ApplyType::ArmorClass => self.armor_class += amount,
            ApplyType::ArmorClassNew => self.armor_class += amount * 10,
            ApplyType::Hitroll => self.hitroll += amount,
            ApplyType::Damroll => self.damroll += amount,
            ApplyType::Save(kind) => self.saves[kind.index()] += amount,
            ApplyType::SpellResistance => self.spell_res += amount,
            ApplyType::Size => self.size = Size::from_steps(self.size as i32 + amount),
            ApplyType::Resistance(kind) => self.resistances[kind.index()] += amount,
            ApplyType::None
            | ApplyType::Class
            | ApplyType::Level
            | ApplyType::Age
            | ApplyType::Gold
            | ApplyType::Exp
            | ApplyType::DamageReduction
            | ApplyType::Feat
            | ApplyType::Special => return false,
        }
        true
    }
}
