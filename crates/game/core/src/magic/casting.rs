//! Casting session state machine.
//!
//! ```text
//! Idle --begin--> Casting(n) --advance--> Casting(n-1) ... --> Completing --> Idle
//!                     |                                            ^
//!                     +---- abort / interruption ------------------+
//! ```
//!
//! A session is owned by its actor. Aborting or failing a check drops it;
//! resources already spent on the cast are not refunded.
//!
//! Within one `advance` the order is fixed: re-validate, deafness fumble,
//! concentration (only while fighting), the primary decrement, then any
//! chant decrement. A cast at one tick remaining therefore always faces its
//! concentration check before it can complete. A caster outside time skips
//! the fumble and concentration rolls and completes at once.
//!
//! `begin` runs the same fumble and concentration rolls before the session
//! exists, so an immediate cast is checked too.

use strum::Display;
use tracing::{debug, error};

use super::dispatch::{DispatchReport, Invocation, call_magic};
use super::error::CastError;
use super::spell::{SpellDescriptor, TargetFlags};
use crate::affect::AffectFlags;
use crate::env::{Dice, ItemLocation, Narration, RulesEnv};
use crate::state::{
    Actor, ActorId, ActorTable, CastClass, CastTarget, CastingSession, Feats, Metamagic, Position,
    SpellId, Tick,
};

/// A request to start casting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastRequest {
    pub caster: ActorId,
    pub spell: SpellId,
    pub target: CastTarget,
    pub metamagic: Metamagic,
}

impl CastRequest {
    pub fn new(caster: ActorId, spell: SpellId) -> Self {
        Self {
            caster,
            spell,
            target: CastTarget::None,
            metamagic: Metamagic::empty(),
        }
    }

    #[must_use]
    pub fn at(mut self, target: CastTarget) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_metamagic(mut self, metamagic: Metamagic) -> Self {
        self.metamagic = metamagic;
        self
    }
}

/// Why a session ended without completing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interruption {
    /// The caster fell, slept or sat down.
    Position,
    /// The target died or left the room, or the item moved out of reach.
    TargetGone,
    /// Nausea, daze, stun or paralysis.
    Disabled,
    /// A deafened caster garbled the words.
    DeafFumble,
    LostConcentration,
}

impl Interruption {
    pub fn message(self) -> &'static str {
        match self {
            Interruption::Position => "You are unable to continue casting your spell.",
            Interruption::TargetGone => "The target of your spell is no longer here.",
            Interruption::Disabled => "You are unable to continue casting your spell.",
            Interruption::DeafFumble => "You can't hear yourself and fumble the incantation.",
            Interruption::LostConcentration => "You lost your concentration!",
        }
    }
}

/// Result of a casting step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CastOutcome {
    /// No session to advance.
    Idle,
    /// A session was created.
    Started { ticks: u32 },
    Continuing { ticks_remaining: u32 },
    /// The spell resolved; routines ran.
    Completed(DispatchReport),
    Interrupted(Interruption),
    /// Completion was reached but the dispatcher could not run.
    Failed(CastError),
}

// ============================================================================
// Validation shared by begin, advance and completion
// ============================================================================

/// Position used for checks: a standing actor in combat counts as fighting.
fn effective_position(actor: &Actor) -> Position {
    if actor.fighting.is_some() && actor.position == Position::Standing {
        Position::Fighting
    } else {
        actor.position
    }
}

/// Fills in an implicit target the way the spell's target flags allow.
fn resolve_target(spell: &SpellDescriptor, caster: &Actor, target: CastTarget) -> CastTarget {
    if target != CastTarget::None {
        return target;
    }
    let flags = spell.targets;
    if let Some(opponent) = caster
        .fighting
        .filter(|_| flags.contains(TargetFlags::FIGHT_VICT))
    {
        return CastTarget::Actor(opponent);
    }
    if flags.intersects(TargetFlags::FIGHT_SELF | TargetFlags::SELF_ONLY)
        || (flags.contains(TargetFlags::CHAR_ROOM) && !spell.violent)
    {
        return CastTarget::Actor(caster.id);
    }
    CastTarget::None
}

/// True if `target` exists and lies within reach of the caster.
fn target_in_reach(
    env: &RulesEnv<'_>,
    actors: &ActorTable,
    spell: &SpellDescriptor,
    caster: &Actor,
    target: CastTarget,
) -> bool {
    let flags = spell.targets;
    match target {
        CastTarget::None => flags.is_empty() || flags.contains(TargetFlags::IGNORE),
        CastTarget::Actor(id) if id == caster.id => flags.intersects(TargetFlags::ANY_CHAR),
        CastTarget::Actor(id) => {
            if !flags.intersects(TargetFlags::ANY_CHAR) {
                return false;
            }
            actors.get(id).is_some_and(|victim| {
                !victim.is_dead()
                    && (victim.room == caster.room || flags.contains(TargetFlags::CHAR_WORLD))
            })
        }
        CastTarget::Item(item) => {
            if flags.contains(TargetFlags::OBJ_WORLD) {
                return true;
            }
            match env.world().and_then(|world| world.item_location(item)) {
                Some(ItemLocation::Carried(holder)) => {
                    holder == caster.id && flags.contains(TargetFlags::OBJ_INV)
                }
                Some(ItemLocation::Worn(holder)) => {
                    holder == caster.id && flags.contains(TargetFlags::OBJ_EQUIP)
                }
                Some(ItemLocation::Room(room)) => {
                    room == caster.room && flags.contains(TargetFlags::OBJ_ROOM)
                }
                Some(ItemLocation::Contained(_)) | None => false,
            }
        }
    }
}

/// Per-tick validation of an active session.
fn check_session(
    env: &RulesEnv<'_>,
    actors: &ActorTable,
    spell: &SpellDescriptor,
    caster: &Actor,
    session: &CastingSession,
) -> Result<(), Interruption> {
    if effective_position(caster) <= Position::Sitting {
        return Err(Interruption::Position);
    }
    if caster.has_any(AffectFlags::CASTING_INTERRUPTS) {
        return Err(Interruption::Disabled);
    }
    if !target_in_reach(env, actors, spell, caster, session.target) {
        return Err(Interruption::TargetGone);
    }
    Ok(())
}

fn validate_begin(
    env: &RulesEnv<'_>,
    actors: &ActorTable,
    spell: &SpellDescriptor,
    caster: &Actor,
    request: &CastRequest,
    now: Tick,
) -> Result<CastTarget, CastError> {
    if !caster.is_npc() {
        let known = spell
            .min_level_for(caster.casting_class)
            .is_some_and(|min| caster.caster_levels.for_class(caster.casting_class) >= min);
        if !known {
            return Err(CastError::SpellNotKnown { spell: spell.id });
        }
    }

    let soundproof = env
        .world()
        .is_some_and(|world| world.is_soundproof(caster.room));
    if (caster.has_any(AffectFlags::SILENCED) || soundproof)
        && !request.metamagic.contains(Metamagic::SILENT)
    {
        return Err(CastError::Silenced);
    }

    if spell.epic {
        if let Some(ledger) = env.ledger() {
            if ledger.uses_remaining(caster.id, spell.id, now) == 0 {
                return Err(CastError::NoUsesRemaining { spell: spell.id });
            }
        }
    }

    let position = effective_position(caster);
    if position < spell.min_position {
        return Err(CastError::PositionTooLow { position });
    }

    let target = resolve_target(spell, caster, request.target);
    if !target_in_reach(env, actors, spell, caster, target) {
        return Err(CastError::InvalidTarget);
    }
    let target_actor = target.actor();

    if caster.has_any(AffectFlags::CHARM)
        && caster.master.is_some()
        && caster.master == target_actor
        && spell.is_hostile()
    {
        return Err(CastError::CharmBound);
    }
    if spell.targets.contains(TargetFlags::SELF_ONLY) && target_actor != Some(caster.id) {
        return Err(CastError::SelfOnly);
    }
    if spell.targets.contains(TargetFlags::NOT_SELF) && target_actor == Some(caster.id) {
        return Err(CastError::NotSelf);
    }
    if spell.routines.contains(super::spell::RoutineFlags::GROUPS) && caster.group.is_none() {
        return Err(CastError::RequiresGroup);
    }
    if caster.has_any(AffectFlags::NAUSEATED) {
        return Err(CastError::Nauseated);
    }
    if caster.is_casting() {
        return Err(CastError::AlreadyCasting);
    }
    Ok(target)
}

/// Ticks the cast will take, or zero for an immediate resolution.
fn cast_time(env: &RulesEnv<'_>, spell: &SpellDescriptor, caster: &Actor, metamagic: Metamagic) -> u32 {
    if caster.is_npc() {
        return (spell.cast_time + 1).max(env.config().npc_cast_delay);
    }
    if metamagic.contains(Metamagic::QUICKEN) {
        return 0;
    }
    let mut ticks = spell.cast_time;
    if metamagic.contains(Metamagic::MAXIMIZE)
        && caster.casting_class.is_spontaneous()
        && !metamagic.contains(Metamagic::ARCANE_ADEPT)
        && !caster.feats.contains(Feats::ARCANE_APOTHEOSIS)
    {
        ticks = ticks * 3 / 2;
    }
    ticks
}

fn reject(env: &RulesEnv<'_>, actor: ActorId, error: CastError) -> CastError {
    debug!(actor = %actor, code = crate::error::GameError::error_code(&error), "cast rejected");
    env.narrate(Narration::Rejected {
        actor,
        message: error.message(),
    });
    error
}

// ============================================================================
// Transitions
// ============================================================================

/// Starts a cast, or resolves it at once when its cast time is zero.
///
/// # Errors
///
/// Returns the first failed validation; nothing changes on rejection.
pub fn begin_cast(
    env: RulesEnv<'_>,
    actors: &mut ActorTable,
    request: CastRequest,
    now: Tick,
) -> Result<CastOutcome, CastError> {
    let stream = actors.next_roll_stream();
    let spells = env.spells()?;
    let caster = actors
        .get(request.caster)
        .ok_or(CastError::UnknownActor(request.caster))?;
    let Some(spell) = spells.spell(request.spell) else {
        return Err(reject(&env, request.caster, CastError::UnknownSpell(request.spell)));
    };
    let target = validate_begin(&env, actors, spell, caster, &request, now)
        .map_err(|error| reject(&env, request.caster, error))?;

    let metamagic = if caster.is_npc() {
        Metamagic::empty()
    } else {
        request.metamagic
    };
    let ticks = cast_time(&env, spell, caster, metamagic);
    let level = caster.caster_level();
    let class = caster.casting_class;

    let dice = env.dice(now, request.caster, stream)?;
    if let Err(reason) = holds_together(&env, caster, spell, class, &dice) {
        debug!(actor = %request.caster, spell = %spell.id, %reason, "cast lost before it began");
        env.narrate(Narration::CastInterrupted {
            caster: request.caster,
            spell: spell.id,
            reason,
        });
        return Ok(CastOutcome::Interrupted(reason));
    }

    if ticks == 0 {
        env.narrate(Narration::CastComplete {
            caster: request.caster,
            spell: spell.id,
            school: spell.school,
            target,
        });
        let invocation = Invocation {
            caster: request.caster,
            spell: spell.id,
            target,
            metamagic,
            level,
        };
        return call_magic(env, actors, invocation, &dice, now).map(CastOutcome::Completed);
    }

    let Some(caster) = actors.get_mut(request.caster) else {
        return Err(CastError::UnknownActor(request.caster));
    };
    caster.start_casting(CastingSession {
        spell: spell.id,
        target,
        ticks_remaining: ticks,
        total_ticks: ticks,
        metamagic,
        class,
    });
    debug!(actor = %request.caster, spell = %spell.id, ticks, "casting started");
    env.narrate(Narration::CastBegin {
        caster: request.caster,
        spell: spell.id,
        school: spell.school,
        target,
    });
    Ok(CastOutcome::Started { ticks })
}

/// Cancels the active cast. No penalty beyond the lost time.
///
/// # Errors
///
/// `NotCasting` if the actor has no session.
pub fn abort_cast(
    env: RulesEnv<'_>,
    actors: &mut ActorTable,
    caster: ActorId,
) -> Result<SpellId, CastError> {
    let actor = actors
        .get_mut(caster)
        .ok_or(CastError::UnknownActor(caster))?;
    let Some(session) = actor.clear_casting() else {
        return Err(reject(&env, caster, CastError::NotCasting));
    };
    debug!(actor = %caster, spell = %session.spell, "casting aborted");
    env.narrate(Narration::CastAborted {
        caster,
        spell: session.spell,
    });
    Ok(session.spell)
}

/// Difficulty of keeping a spell together in combat.
fn concentration_dc(caster: &Actor, spell: &SpellDescriptor, class: CastClass) -> i32 {
    let mut dc = if caster.is_npc() {
        i32::from(caster.level).clamp(1, 17)
    } else {
        i32::from(spell.min_level_for(class).unwrap_or(1))
    };
    if caster.feats.contains(Feats::COMBAT_CASTING) {
        dc -= 4;
    }
    if !caster.tanking {
        dc -= 10;
    }
    if caster.has_any(AffectFlags::TAUNTED) {
        dc += 6;
    }
    if caster.has_any(AffectFlags::INTIMIDATED) {
        dc += 6;
    }
    if caster.has_any(AffectFlags::HELD) {
        dc += caster.grapple_cmb;
    }
    dc
}

/// d20 plus the caster's concentration term, against [`concentration_dc`].
fn keeps_concentration(
    caster: &Actor,
    spell: &SpellDescriptor,
    class: CastClass,
    dice: &Dice<'_>,
) -> bool {
    let term = if caster.is_npc() {
        i32::from(caster.level)
    } else {
        caster.caster_level()
            + caster.concentration
            + crate::stats::ability_bonus(caster.current().abilities.con)
    };
    dice.d20() + term >= concentration_dc(caster, spell, class)
}

/// Deafness fumble, then concentration while fighting.
fn holds_together(
    env: &RulesEnv<'_>,
    caster: &Actor,
    spell: &SpellDescriptor,
    class: CastClass,
    dice: &Dice<'_>,
) -> Result<(), Interruption> {
    if caster.has_any(AffectFlags::DEAF) && dice.one_in(env.config().deaf_fumble_chance) {
        return Err(Interruption::DeafFumble);
    }
    if caster.fighting.is_some() && !keeps_concentration(caster, spell, class, dice) {
        return Err(Interruption::LostConcentration);
    }
    Ok(())
}

fn interrupt(env: &RulesEnv<'_>, actors: &mut ActorTable, caster: ActorId, reason: Interruption) -> CastOutcome {
    if let Some(session) = actors.get_mut(caster).and_then(Actor::clear_casting) {
        debug!(actor = %caster, spell = %session.spell, %reason, "casting interrupted");
        env.narrate(Narration::CastInterrupted {
            caster,
            spell: session.spell,
            reason,
        });
    }
    CastOutcome::Interrupted(reason)
}

/// Advances `caster`'s session by one tick.
pub fn advance(env: RulesEnv<'_>, actors: &mut ActorTable, caster_id: ActorId, now: Tick) -> CastOutcome {
    if !actors.get(caster_id).is_some_and(Actor::is_casting) {
        return CastOutcome::Idle;
    }
    let stream = actors.next_roll_stream();
    let Some(caster) = actors.get(caster_id) else {
        return CastOutcome::Idle;
    };
    let Some(session) = caster.casting().cloned() else {
        return CastOutcome::Idle;
    };
    let spell = match env.spells() {
        Ok(spells) => spells.spell(session.spell),
        Err(error) => {
            error!(actor = %caster_id, %error, "cannot advance cast");
            return CastOutcome::Failed(error.into());
        }
    };
    let Some(spell) = spell else {
        // Registry changed under a live session.
        return interrupt(&env, actors, caster_id, Interruption::TargetGone);
    };

    if let Err(reason) = check_session(&env, actors, spell, caster, &session) {
        return interrupt(&env, actors, caster_id, reason);
    }

    // A caster outside time finishes harmless spells at once.
    let time_stopped = caster.has_any(AffectFlags::TIME_STOPPED) && !spell.is_hostile();

    let dice = match env.dice(now, caster_id, stream) {
        Ok(dice) => dice,
        Err(error) => return CastOutcome::Failed(error.into()),
    };
    if !time_stopped {
        if let Err(reason) = holds_together(&env, caster, spell, session.class, &dice) {
            return interrupt(&env, actors, caster_id, reason);
        }
    }

    env.narrate(Narration::CastProgress {
        caster: caster_id,
        spell: spell.id,
        ticks_remaining: session.ticks_remaining,
    });

    let mut remaining = session.ticks_remaining.saturating_sub(1);
    if time_stopped {
        remaining = 0;
    } else if remaining > 0 && !caster.is_npc() {
        let config = env.config();
        if caster.feats.contains(Feats::QUICK_CHANT) && dice.chance(config.quick_chant_percent) {
            remaining -= 1;
        }
        if remaining > 0
            && caster.feats.contains(Feats::WIZ_CHANT)
            && dice.chance(config.wiz_chant_percent)
        {
            remaining -= 1;
        }
    }

    if let Some(live) = actors.get_mut(caster_id).and_then(Actor::casting_mut) {
        live.ticks_remaining = remaining;
    }
    if remaining > 0 {
        return CastOutcome::Continuing {
            ticks_remaining: remaining,
        };
    }
    complete(env, actors, caster_id, &dice, now)
}

/// Completing: re-validate, narrate, dispatch. The session is gone afterwards
/// whatever happens.
fn complete(
    env: RulesEnv<'_>,
    actors: &mut ActorTable,
    caster_id: ActorId,
    dice: &Dice<'_>,
    now: Tick,
) -> CastOutcome {
    let Some(caster) = actors.get(caster_id) else {
        return CastOutcome::Idle;
    };
    let Some(session) = caster.casting().cloned() else {
        return CastOutcome::Idle;
    };
    let Some(spell) = env.spells().ok().and_then(|spells| spells.spell(session.spell)) else {
        return interrupt(&env, actors, caster_id, Interruption::TargetGone);
    };
    if let Err(reason) = check_session(&env, actors, spell, caster, &session) {
        return interrupt(&env, actors, caster_id, reason);
    }
    let level = caster.caster_level();

    if let Some(caster) = actors.get_mut(caster_id) {
        caster.clear_casting();
    }
    debug!(actor = %caster_id, spell = %spell.id, "casting complete");
    env.narrate(Narration::CastComplete {
        caster: caster_id,
        spell: spell.id,
        school: spell.school,
        target: session.target,
    });

    let invocation = Invocation {
        caster: caster_id,
        spell: spell.id,
        target: session.target,
        metamagic: session.metamagic,
        level,
    };
    match call_magic(env, actors, invocation, dice, now) {
        Ok(report) => CastOutcome::Completed(report),
        Err(error) => {
            error!(actor = %caster_id, spell = %spell.id, %error, "dispatch failed");
            CastOutcome::Failed(error)
        }
    }
}
