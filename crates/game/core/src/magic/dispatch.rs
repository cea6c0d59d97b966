//! `call_magic`: run a resolved spell's routines against its targets.

use tracing::debug;

use super::error::CastError;
use super::routine::{RoutineContext, RoutineKind, RoutineOutcome, routine_for};
use crate::affect::AffectFlags;
use crate::env::{Dice, Narration, RulesEnv};
use crate::state::{ActorId, ActorTable, CastTarget, Metamagic, SpellId, Tick};

/// A spell ready to take effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub caster: ActorId,
    pub spell: SpellId,
    pub target: CastTarget,
    pub metamagic: Metamagic,
    /// Effective caster level.
    pub level: i32,
}

/// Why a spell never reached its routines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blocked {
    AntiMagic,
    MinorGlobe,
    GlobeOfInvulnerability,
    SpellMantle,
}

impl Blocked {
    pub fn message(self) -> &'static str {
        match self {
            Blocked::AntiMagic => "Your magic fizzles out and dies.",
            Blocked::MinorGlobe => "The shimmering globe around your target absorbs the spell.",
            Blocked::GlobeOfInvulnerability => "The globe of invulnerability absorbs the spell.",
            Blocked::SpellMantle => "The spell mantle absorbs the spell.",
        }
    }
}

/// What [`call_magic`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchReport {
    pub spell: SpellId,
    pub blocked: Option<Blocked>,
    /// Spell turning reversed caster and victim.
    pub turned: bool,
    pub outcomes: Vec<(RoutineKind, RoutineOutcome)>,
}

impl DispatchReport {
    fn new(spell: SpellId) -> Self {
        Self {
            spell,
            blocked: None,
            turned: false,
            outcomes: Vec::new(),
        }
    }

    pub fn outcome(&self, kind: RoutineKind) -> Option<RoutineOutcome> {
        self.outcomes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, outcome)| *outcome)
    }

    pub fn killed(&self) -> bool {
        self.outcomes
            .iter()
            .any(|(_, outcome)| *outcome == RoutineOutcome::Killed)
    }
}

/// Runs every routine the spell declares, in dispatch order.
///
/// Protective effects on the caster or victim may stop the spell first. Only
/// a killed target stops the routine sequence once it has begun. Every check
/// draws from `dice`, continuing the stream the casting step opened.
pub fn call_magic(
    env: RulesEnv<'_>,
    actors: &mut ActorTable,
    invocation: Invocation,
    dice: &Dice<'_>,
    now: Tick,
) -> Result<DispatchReport, CastError> {
    let spell = env
        .spells()?
        .spell(invocation.spell)
        .ok_or(CastError::UnknownSpell(invocation.spell))?;
    let caster = actors
        .get(invocation.caster)
        .ok_or(CastError::UnknownActor(invocation.caster))?;
    let mut report = DispatchReport::new(spell.id);

    if caster.has_any(AffectFlags::ANTI_MAGIC) {
        return Ok(blocked(env, report, &invocation, None, Blocked::AntiMagic));
    }

    let mut caster_id = invocation.caster;
    let mut victim_id = invocation.target.actor();

    if let Some(victim) = victim_id.filter(|v| *v != caster_id && spell.is_hostile()) {
        let Some(target) = actors.get(victim) else {
            return Err(CastError::InvalidTarget);
        };
        if target.has_any(AffectFlags::MINOR_GLOBE) && spell.spell_level <= 4 {
            return Ok(blocked(env, report, &invocation, Some(victim), Blocked::MinorGlobe));
        }
        if target.has_any(AffectFlags::GLOBE_OF_INVULN) && spell.spell_level <= 8 {
            return Ok(blocked(
                env,
                report,
                &invocation,
                Some(victim),
                Blocked::GlobeOfInvulnerability,
            ));
        }
        let (mantled, turning) = (
            target.has_any(AffectFlags::SPELL_MANTLE),
            target.has_any(AffectFlags::SPELL_TURNING),
        );
        if mantled {
            if let Some(target) = actors.get_mut(victim) {
                target.strip_flagged(AffectFlags::SPELL_MANTLE);
            }
            return Ok(blocked(env, report, &invocation, Some(victim), Blocked::SpellMantle));
        }
        if turning {
            if let Some(target) = actors.get_mut(victim) {
                target.strip_flagged(AffectFlags::SPELL_TURNING);
            }
            env.narrate(Narration::Turned {
                caster: caster_id,
                target: victim,
                spell: spell.id,
            });
            report.turned = true;
            victim_id = Some(caster_id);
            caster_id = victim;
        }
    }

    if spell.epic {
        if let Some(ledger) = env.ledger() {
            ledger.record_use(invocation.caster, spell.id, now);
        }
    }

    let mut ctx = RoutineContext {
        env,
        actors,
        dice,
        spell,
        caster: caster_id,
        victim: victim_id,
        item: invocation.target.item(),
        level: invocation.level,
        metamagic: invocation.metamagic,
        now,
    };
    for kind in RoutineKind::declared(spell.routines) {
        let outcome = routine_for(kind).apply(&mut ctx);
        debug!(spell = %spell.id, routine = %kind, %outcome, "routine resolved");
        report.outcomes.push((kind, outcome));
        if outcome == RoutineOutcome::Killed {
            break;
        }
    }
    Ok(report)
}

fn blocked(
    env: RulesEnv<'_>,
    mut report: DispatchReport,
    invocation: &Invocation,
    target: Option<ActorId>,
    why: Blocked,
) -> DispatchReport {
    env.narrate(Narration::Absorbed {
        caster: invocation.caster,
        target,
        spell: invocation.spell,
        message: why.message(),
    });
    report.blocked = Some(why);
    report
}
