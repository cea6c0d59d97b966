//! Spell descriptors and the read-only registry that serves them.

use std::collections::{BTreeMap, HashMap};

use bitflags::bitflags;
use strum::{Display, EnumIter};

use crate::affect::{AffectFlags, ApplyType, BonusCategory, DamageType, Duration, SaveKind};
use crate::state::{CastClass, Position, SpellId};

bitflags! {
    /// What a spell may legally be aimed at.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct TargetFlags: u16 {
        const IGNORE = 1 << 0;
        const CHAR_ROOM = 1 << 1;
        const CHAR_WORLD = 1 << 2;
        const FIGHT_SELF = 1 << 3;
        const FIGHT_VICT = 1 << 4;
        const SELF_ONLY = 1 << 5;
        const NOT_SELF = 1 << 6;
        const OBJ_INV = 1 << 7;
        const OBJ_ROOM = 1 << 8;
        const OBJ_WORLD = 1 << 9;
        const OBJ_EQUIP = 1 << 10;
    }
}

impl TargetFlags {
    /// Flags that admit an actor target.
    pub const ANY_CHAR: Self = Self::CHAR_ROOM
        .union(Self::CHAR_WORLD)
        .union(Self::FIGHT_SELF)
        .union(Self::FIGHT_VICT)
        .union(Self::SELF_ONLY)
        .union(Self::NOT_SELF);

    /// Flags that admit an item target.
    pub const ANY_OBJ: Self = Self::OBJ_INV
        .union(Self::OBJ_ROOM)
        .union(Self::OBJ_WORLD)
        .union(Self::OBJ_EQUIP);
}

bitflags! {
    /// Effect routines a spell runs on completion.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct RoutineFlags: u16 {
        const DAMAGE = 1 << 0;
        const AFFECTS = 1 << 1;
        const UNAFFECTS = 1 << 2;
        const POINTS = 1 << 3;
        const ALTER_OBJS = 1 << 4;
        const GROUPS = 1 << 5;
        const MASSES = 1 << 6;
        const AREAS = 1 << 7;
        const SUMMONS = 1 << 8;
        const CREATIONS = 1 << 9;
        const ROOM = 1 << 10;
        const MANUAL = 1 << 11;
    }
}

/// Category tag passed to narration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellSchool {
    Abjuration,
    Conjuration,
    Divination,
    Enchantment,
    Evocation,
    Illusion,
    Necromancy,
    Transmutation,
    #[default]
    Universal,
}

/// Damage dealt by the damage routine.
///
/// Rolls `dice + level / levels_per_die` dice (capped at `max_dice` when
/// non-zero) of `sides`, then adds `bonus`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageSpec {
    pub dice: u32,
    pub sides: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub levels_per_die: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_dice: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonus: i32,
    pub damage_type: DamageType,
    /// Successful save halves the damage.
    #[cfg_attr(feature = "serde", serde(default))]
    pub half_on_save: bool,
    /// Subject to spell resistance.
    #[cfg_attr(feature = "serde", serde(default = "yes"))]
    pub resistable: bool,
}

impl DamageSpec {
    pub fn dice_for(&self, level: i32) -> u32 {
        let extra = match self.levels_per_die {
            0 => 0,
            per => level.max(0) as u32 / per,
        };
        let count = self.dice + extra;
        if self.max_dice > 0 {
            count.min(self.max_dice)
        } else {
            count
        }
    }
}

/// One affect the affects routine places on its target.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffectTemplate {
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: ApplyType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifier: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonus: BonusCategory,
    /// Base duration in affect pulses. Negative is permanent.
    pub duration: Duration,
    /// Additional pulses per caster level.
    #[cfg_attr(feature = "serde", serde(default))]
    pub per_level: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: AffectFlags,
    /// Recasting extends and accumulates instead of refreshing.
    #[cfg_attr(feature = "serde", serde(default))]
    pub accumulate: bool,
}

impl AffectTemplate {
    pub fn duration_for(&self, level: i32) -> Duration {
        if self.duration < 0 {
            return self.duration;
        }
        self.duration + self.per_level * level.max(0)
    }
}

/// Healing dealt by the points routine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointsSpec {
    #[cfg_attr(feature = "serde", serde(default))]
    pub dice: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sides: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonus: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub per_level: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub psp: i32,
}

/// Static description of one spell.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellDescriptor {
    pub id: SpellId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub school: SpellSchool,
    #[cfg_attr(feature = "serde", serde(default = "fighting"))]
    pub min_position: Position,
    #[cfg_attr(feature = "serde", serde(default))]
    pub targets: TargetFlags,
    #[cfg_attr(feature = "serde", serde(default))]
    pub violent: bool,
    /// Declared cast time in ticks.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cast_time: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub routines: RoutineFlags,
    /// Lowest class level that knows the spell. Absent classes cannot cast it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_level: BTreeMap<CastClass, u8>,
    /// Spell circle, checked by globes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub spell_level: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub epic: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub save: Option<SaveKind>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: Option<DamageSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub affects: Vec<AffectTemplate>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub unaffects: Vec<SpellId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub points: Option<PointsSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub wear_off: Option<String>,
}

#[cfg(feature = "serde")]
fn fighting() -> Position {
    Position::Fighting
}

#[cfg(feature = "serde")]
fn yes() -> bool {
    true
}

impl SpellDescriptor {
    pub fn new(id: SpellId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            school: SpellSchool::default(),
            min_position: Position::Fighting,
            targets: TargetFlags::IGNORE,
            violent: false,
            cast_time: 0,
            routines: RoutineFlags::empty(),
            min_level: BTreeMap::new(),
            spell_level: 0,
            epic: false,
            save: None,
            damage: None,
            affects: Vec::new(),
            unaffects: Vec::new(),
            points: None,
            wear_off: None,
        }
    }

    #[must_use]
    pub fn with_targets(mut self, targets: TargetFlags) -> Self {
        self.targets = targets;
        self
    }

    #[must_use]
    pub fn with_routines(mut self, routines: RoutineFlags) -> Self {
        self.routines = routines;
        self
    }

    #[must_use]
    pub fn with_cast_time(mut self, ticks: u32) -> Self {
        self.cast_time = ticks;
        self
    }

    #[must_use]
    pub fn with_min_level(mut self, class: CastClass, level: u8) -> Self {
        self.min_level.insert(class, level);
        self
    }

    #[must_use]
    pub fn violent(mut self) -> Self {
        self.violent = true;
        self
    }

    #[must_use]
    pub fn with_damage(mut self, damage: DamageSpec) -> Self {
        self.routines |= RoutineFlags::DAMAGE;
        self.damage = Some(damage);
        self
    }

    #[must_use]
    pub fn with_affect(mut self, template: AffectTemplate) -> Self {
        self.routines |= RoutineFlags::AFFECTS;
        self.affects.push(template);
        self
    }

    /// True if globes, mantles and turning care about this spell.
    pub fn is_hostile(&self) -> bool {
        self.violent || self.routines.contains(RoutineFlags::DAMAGE)
    }

    pub fn min_level_for(&self, class: CastClass) -> Option<u8> {
        self.min_level.get(&class).copied()
    }
}

/// Read-only spell lookup.
pub trait SpellOracle: Send + Sync {
    fn spell(&self, id: SpellId) -> Option<&SpellDescriptor>;
}

/// Spell table keyed by id. Built once at startup, then only read.
#[derive(Clone, Debug, Default)]
pub struct SpellRegistry {
    spells: HashMap<SpellId, SpellDescriptor>,
}

impl SpellRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a descriptor, returning any previous one with the same id.
    pub fn insert(&mut self, spell: SpellDescriptor) -> Option<SpellDescriptor> {
        self.spells.insert(spell.id, spell)
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpellDescriptor> {
        self.spells.values()
    }

    pub fn by_name(&self, name: &str) -> Option<&SpellDescriptor> {
        self.spells
            .values()
            .find(|spell| spell.name.eq_ignore_ascii_case(name))
    }
}

impl FromIterator<SpellDescriptor> for SpellRegistry {
    fn from_iter<T: IntoIterator<Item = SpellDescriptor>>(iter: T) -> Self {
        let mut registry = Self::new();
        for spell in iter {
            registry.insert(spell);
        }
        registry
    }
}

impl SpellOracle for SpellRegistry {
    fn spell(&self, id: SpellId) -> Option<&SpellDescriptor> {
        self.spells.get(&id)
    }
}
