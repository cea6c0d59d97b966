//! Boolean status flags imposed by affects and worn items.

use bitflags::bitflags;

bitflags! {
    /// Status flags carried by an affect record or an item.
    ///
    /// Flags never add: recomputation ORs together every active source.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct AffectFlags: u64 {
        const BLIND = 1 << 0;
        const INVISIBLE = 1 << 1;
        const SANCTUARY = 1 << 2;
        const CURSE = 1 << 3;
        const POISON = 1 << 4;
        const PROTECT_EVIL = 1 << 5;
        const PROTECT_GOOD = 1 << 6;
        const SLEEP = 1 << 7;
        const FLYING = 1 << 8;
        const CHARM = 1 << 9;
        const HASTE = 1 << 10;
        const DEAF = 1 << 11;
        const FEAR = 1 << 12;
        const STUN = 1 << 13;
        const PARALYZED = 1 << 14;
        const GRAPPLED = 1 << 15;
        const ENTANGLED = 1 << 16;
        const NAUSEATED = 1 << 17;
        const SLOW = 1 << 18;
        const MINOR_GLOBE = 1 << 19;
        const GLOBE_OF_INVULN = 1 << 20;
        const SPELL_MANTLE = 1 << 21;
        const SPELL_TURNING = 1 << 22;
        const TIME_STOPPED = 1 << 23;
        const SPELL_RESISTANT = 1 << 24;
        const DAZED = 1 << 25;
        const SILENCED = 1 << 26;
        const SICKENED = 1 << 27;
        const TAUNTED = 1 << 28;
        const INTIMIDATED = 1 << 29;
        const ANTI_MAGIC = 1 << 30;
        const UNBLINDABLE = 1 << 31;
    }
}

impl AffectFlags {
    /// Flags that halt a cast in progress.
    pub const CASTING_INTERRUPTS: Self = Self::DAZED
        .union(Self::STUN)
        .union(Self::PARALYZED)
        .union(Self::NAUSEATED);

    /// Flags that make concentration harder while held.
    pub const HELD: Self = Self::GRAPPLED.union(Self::ENTANGLED);
}
