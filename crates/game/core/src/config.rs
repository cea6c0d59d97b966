/// Rules configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RulesConfig {
    /// Base seed mixed into every roll. Fixed per world for replayable outcomes.
    pub game_seed: u64,
    /// Ticks between affect duration decrements and recompute sweeps.
    pub affect_pulse: u64,
    /// Minimum cast time for non-player casters.
    pub npc_cast_delay: u32,
    /// Percent chance that the quick chant trait shaves an extra tick.
    pub quick_chant_percent: u32,
    /// Percent chance that the wizard chant trait shaves an extra tick.
    pub wiz_chant_percent: u32,
    /// One in N chance that a deafened caster fumbles on each tick.
    pub deaf_fumble_chance: u32,
    /// Cooldown applied after an epic spell is cast, in ticks.
    pub epic_cooldown_ticks: u64,
    /// Daily uses allowed for each epic spell.
    pub epic_daily_uses: u32,
}

impl RulesConfig {
    // ===== compile-time constants used as type parameters =====
    /// Affect entries an item may carry.
    pub const MAX_ITEM_AFFECTS: usize = 6;
    /// Equipment slots on an actor.
    pub const NUM_WEAR_SLOTS: usize = 23;

    // ===== absolute caps =====
    pub const STAT_CAP: i32 = 50;
    pub const BASE_STAT_CAP: i32 = 8;
    pub const HITDAM_CAP: i32 = 10;
    pub const SPELL_RES_CAP: i32 = 99;
    pub const SAVE_CAP: i32 = 50;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_AFFECT_PULSE: u64 = 6;
    pub const DEFAULT_NPC_CAST_DELAY: u32 = 2;
    pub const DEFAULT_QUICK_CHANT_PERCENT: u32 = 50;
    pub const DEFAULT_WIZ_CHANT_PERCENT: u32 = 66;
    pub const DEFAULT_DEAF_FUMBLE_CHANCE: u32 = 5;
    /// Nine mud days.
    pub const DEFAULT_EPIC_COOLDOWN_TICKS: u64 = 9 * 86_400;
    pub const DEFAULT_EPIC_DAILY_USES: u32 = 1;

    pub fn new() -> Self {
        Self {
            game_seed: 0,
            affect_pulse: Self::DEFAULT_AFFECT_PULSE,
            npc_cast_delay: Self::DEFAULT_NPC_CAST_DELAY,
            quick_chant_percent: Self::DEFAULT_QUICK_CHANT_PERCENT,
            wiz_chant_percent: Self::DEFAULT_WIZ_CHANT_PERCENT,
            deaf_fumble_chance: Self::DEFAULT_DEAF_FUMBLE_CHANCE,
            epic_cooldown_ticks: Self::DEFAULT_EPIC_COOLDOWN_TICKS,
            epic_daily_uses: Self::DEFAULT_EPIC_DAILY_USES,
        }
    }

    pub fn with_seed(game_seed: u64) -> Self {
        Self {
            game_seed,
            ..Self::new()
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::new()
    }
}
