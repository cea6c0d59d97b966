//! Effect routines a completed spell runs.
//!
//! A descriptor declares a set of [`RoutineFlags`]; the dispatcher walks
//! [`RoutineKind::ORDER`] and hands each declared kind to its
//! [`EffectRoutine`]. Resisted, saved and no-effect outcomes are ordinary
//! results. Only [`RoutineOutcome::Killed`] stops the sequence.

use strum::Display;
use tracing::{debug, warn};

use super::checks::{resist, save};
use super::spell::{RoutineFlags, SpellDescriptor};
use crate::affect::{AffectFlags, AffectRecord, JoinPolicy};
use crate::env::{Dice, Narration, RulesEnv, WorldRequest};
use crate::state::{
    Actor, ActorId, ActorTable, CastTarget, ItemId, Metamagic, Position, RoomId, Tick,
};
use crate::stats::{Exclude, best_in_category, collect_sources};

/// Routine tags in dispatch order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoutineKind {
    Damage,
    Affects,
    Unaffects,
    Points,
    AlterObjs,
    Groups,
    Masses,
    Areas,
    Summons,
    Creations,
    Room,
    Manual,
}

impl RoutineKind {
    pub const ORDER: [RoutineKind; 12] = [
        RoutineKind::Damage,
        RoutineKind::Affects,
        RoutineKind::Unaffects,
        RoutineKind::Points,
        RoutineKind::AlterObjs,
        RoutineKind::Groups,
        RoutineKind::Masses,
        RoutineKind::Areas,
        RoutineKind::Summons,
        RoutineKind::Creations,
        RoutineKind::Room,
        RoutineKind::Manual,
    ];

    pub const fn flag(self) -> RoutineFlags {
        match self {
            RoutineKind::Damage => RoutineFlags::DAMAGE,
            RoutineKind::Affects => RoutineFlags::AFFECTS,
            RoutineKind::Unaffects => RoutineFlags::UNAFFECTS,
            RoutineKind::Points => RoutineFlags::POINTS,
            RoutineKind::AlterObjs => RoutineFlags::ALTER_OBJS,
            RoutineKind::Groups => RoutineFlags::GROUPS,
            RoutineKind::Masses => RoutineFlags::MASSES,
            RoutineKind::Areas => RoutineFlags::AREAS,
            RoutineKind::Summons => RoutineFlags::SUMMONS,
            RoutineKind::Creations => RoutineFlags::CREATIONS,
            RoutineKind::Room => RoutineFlags::ROOM,
            RoutineKind::Manual => RoutineFlags::MANUAL,
        }
    }

    /// Declared routines of `flags`, in dispatch order.
    pub fn declared(flags: RoutineFlags) -> impl Iterator<Item = RoutineKind> {
        Self::ORDER
            .into_iter()
            .filter(move |kind| flags.contains(kind.flag()))
    }
}

/// What one routine did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoutineOutcome {
    Applied,
    NoEffect,
    Resisted,
    Saved,
    /// The target died; later routines are skipped.
    Killed,
}

/// Everything a routine may read or change while it runs.
pub struct RoutineContext<'r> {
    pub env: RulesEnv<'r>,
    pub actors: &'r mut ActorTable,
    pub dice: &'r Dice<'r>,
    pub spell: &'r SpellDescriptor,
    pub caster: ActorId,
    pub victim: Option<ActorId>,
    pub item: Option<ItemId>,
    /// Effective caster level.
    pub level: i32,
    pub metamagic: Metamagic,
    pub now: Tick,
}

impl RoutineContext<'_> {
    /// The actor a self-or-other routine lands on.
    pub fn target(&self) -> ActorId {
        self.victim.unwrap_or(self.caster)
    }

    pub fn cast_target(&self) -> CastTarget {
        match (self.victim, self.item) {
            (Some(actor), _) => CastTarget::Actor(actor),
            (None, Some(item)) => CastTarget::Item(item),
            (None, None) => CastTarget::None,
        }
    }

    fn applied(&self, target: ActorId, routine: RoutineKind, amount: i32) {
        self.env.narrate(Narration::EffectApplied {
            caster: self.caster,
            target,
            spell: self.spell.id,
            school: self.spell.school,
            routine,
            amount,
        });
    }
}

/// One capability of a spell.
pub trait EffectRoutine: Send + Sync {
    fn kind(&self) -> RoutineKind;

    fn apply(&self, ctx: &mut RoutineContext<'_>) -> RoutineOutcome;
}

pub struct DamageRoutine;
pub struct AffectsRoutine;
pub struct UnaffectsRoutine;
pub struct PointsRoutine;
pub struct GroupsRoutine;
pub struct MassesRoutine;
pub struct AreasRoutine;
/// Delegates to the world collaborator.
pub struct WorldRoutine(pub RoutineKind);
pub struct ManualRoutine;

static DAMAGE: DamageRoutine = DamageRoutine;
static AFFECTS: AffectsRoutine = AffectsRoutine;
static UNAFFECTS: UnaffectsRoutine = UnaffectsRoutine;
static POINTS: PointsRoutine = PointsRoutine;
static GROUPS: GroupsRoutine = GroupsRoutine;
static MASSES: MassesRoutine = MassesRoutine;
static AREAS: AreasRoutine = AreasRoutine;
static ALTER_OBJS: WorldRoutine = WorldRoutine(RoutineKind::AlterObjs);
static SUMMONS: WorldRoutine = WorldRoutine(RoutineKind::Summons);
static CREATIONS: WorldRoutine = WorldRoutine(RoutineKind::Creations);
static ROOM: WorldRoutine = WorldRoutine(RoutineKind::Room);
static MANUAL: ManualRoutine = ManualRoutine;

/// The routine implementing `kind`.
pub fn routine_for(kind: RoutineKind) -> &'static dyn EffectRoutine {
    match kind {
        RoutineKind::Damage => &DAMAGE,
        RoutineKind::Affects => &AFFECTS,
        RoutineKind::Unaffects => &UNAFFECTS,
        RoutineKind::Points => &POINTS,
        RoutineKind::AlterObjs => &ALTER_OBJS,
        RoutineKind::Groups => &GROUPS,
        RoutineKind::Masses => &MASSES,
        RoutineKind::Areas => &AREAS,
        RoutineKind::Summons => &SUMMONS,
        RoutineKind::Creations => &CREATIONS,
        RoutineKind::Room => &ROOM,
        RoutineKind::Manual => &MANUAL,
    }
}

// ============================================================================
// Single-target helpers shared by the fan-out routines
// ============================================================================

fn position_after_damage(hit: i32) -> Option<Position> {
    match hit {
        h if h > 0 => None,
        h if h <= -11 => Some(Position::Dead),
        h if h <= -6 => Some(Position::MortallyWounded),
        h if h <= -3 => Some(Position::Incapacitated),
        _ => Some(Position::Stunned),
    }
}

fn damage_one(ctx: &mut RoutineContext<'_>, victim_id: ActorId) -> RoutineOutcome {
    let Some(spec) = ctx.spell.damage.as_ref() else {
        warn!(spell = %ctx.spell.id, "damage routine declared without damage dice");
        return RoutineOutcome::NoEffect;
    };
    let (Some(caster), Some(victim)) = (ctx.actors.get(ctx.caster), ctx.actors.get(victim_id))
    else {
        return RoutineOutcome::NoEffect;
    };
    if victim.is_dead() {
        return RoutineOutcome::NoEffect;
    }

    if spec.resistable && resist(caster, victim, 0, ctx.dice).resisted() {
        ctx.env.narrate(Narration::Resisted {
            caster: ctx.caster,
            target: victim_id,
            spell: ctx.spell.id,
        });
        return RoutineOutcome::Resisted;
    }

    let count = spec.dice_for(ctx.level);
    let mut amount = if ctx.metamagic.contains(Metamagic::MAXIMIZE) {
        (count * spec.sides) as i32
    } else {
        ctx.dice.roll(count, spec.sides)
    } + spec.bonus;
    if ctx.metamagic.contains(Metamagic::EMPOWER) {
        amount = amount * 3 / 2;
    }

    let mut outcome = RoutineOutcome::Applied;
    if let Some(kind) = ctx.spell.save {
        if spec.half_on_save && save(caster, victim, kind, 0, ctx.dice).success {
            amount /= 2;
            outcome = RoutineOutcome::Saved;
            ctx.env.narrate(Narration::Saved {
                caster: ctx.caster,
                target: victim_id,
                spell: ctx.spell.id,
                kind,
            });
        }
    }

    let resistance = victim.current().resistance(spec.damage_type).clamp(-100, 100);
    amount = (amount - amount * resistance / 100).max(0);

    let caster_id = ctx.caster;
    let violent = ctx.spell.violent;
    let Some(victim) = ctx.actors.get_mut(victim_id) else {
        return RoutineOutcome::NoEffect;
    };
    victim.hit -= amount;
    if let Some(position) = position_after_damage(victim.hit) {
        victim.position = position;
    }
    if violent && victim_id != caster_id && victim.fighting.is_none() && !victim.is_dead() {
        victim.fighting = Some(caster_id);
    }
    let killed = victim.is_dead();
    ctx.applied(victim_id, RoutineKind::Damage, amount);

    if killed {
        debug!(target: "magic", spell = %ctx.spell.id, victim = %victim_id, "victim killed");
        RoutineOutcome::Killed
    } else {
        outcome
    }
}

/// True if some template would set a flag the target lacks or beat the best
/// modifier already in its category.
///
/// Records the spell itself placed earlier are left out of the comparison.
fn changes_anything(spell: &SpellDescriptor, target: &Actor) -> bool {
    let sources = collect_sources(target.affects(), target.equipment());
    let flags = target.current().flags;
    spell.affects.iter().any(|template| {
        if template.flags.is_empty() && template.modifier == 0 {
            // Marker record.
            return true;
        }
        if !flags.contains(template.flags) {
            return true;
        }
        if template.modifier == 0 {
            return false;
        }
        let exclude = Some(Exclude::Spell(spell.id));
        best_in_category(template.location, template.bonus, &sources, exclude)
            .is_none_or(|best| template.modifier > best)
    })
}

fn affect_one(ctx: &mut RoutineContext<'_>, target_id: ActorId) -> RoutineOutcome {
    let spell = ctx.spell;
    if spell.affects.is_empty() {
        return RoutineOutcome::NoEffect;
    }
    let (Some(caster), Some(target)) = (ctx.actors.get(ctx.caster), ctx.actors.get(target_id))
    else {
        return RoutineOutcome::NoEffect;
    };
    if target.is_dead() {
        return RoutineOutcome::NoEffect;
    }

    if spell.violent && target_id != ctx.caster {
        if resist(caster, target, 0, ctx.dice).resisted() {
            ctx.env.narrate(Narration::Resisted {
                caster: ctx.caster,
                target: target_id,
                spell: spell.id,
            });
            return RoutineOutcome::Resisted;
        }
        if let Some(kind) = spell.save {
            if save(caster, target, kind, 0, ctx.dice).success {
                ctx.env.narrate(Narration::Saved {
                    caster: ctx.caster,
                    target: target_id,
                    spell: spell.id,
                    kind,
                });
                return RoutineOutcome::Saved;
            }
        }
    }

    let accumulates = spell.affects.iter().any(|t| t.accumulate);
    if target.affected_by(spell.id) && !accumulates {
        return RoutineOutcome::NoEffect;
    }
    let imposed = spell
        .affects
        .iter()
        .fold(AffectFlags::empty(), |acc, t| acc | t.flags);
    if imposed.contains(AffectFlags::BLIND) && target.has_any(AffectFlags::UNBLINDABLE) {
        return RoutineOutcome::NoEffect;
    }
    if !changes_anything(spell, target) {
        return RoutineOutcome::NoEffect;
    }

    let extend = ctx.metamagic.contains(Metamagic::EXTEND);
    let level = ctx.level;
    let Some(target) = ctx.actors.get_mut(target_id) else {
        return RoutineOutcome::NoEffect;
    };
    for template in &spell.affects {
        let mut duration = template.duration_for(level);
        if extend && duration > 0 {
            duration *= 2;
        }
        let record = AffectRecord::new(spell.id, template.location, template.modifier, duration)
            .with_bonus(template.bonus)
            .with_flags(template.flags);
        let policy = if template.accumulate {
            JoinPolicy::ACCUMULATE
        } else {
            JoinPolicy::REFRESH
        };
        target.join_affect(record, policy);
    }
    ctx.applied(target_id, RoutineKind::Affects, 0);
    RoutineOutcome::Applied
}

fn points_one(ctx: &mut RoutineContext<'_>, target_id: ActorId) -> RoutineOutcome {
    let Some(spec) = ctx.spell.points.as_ref() else {
        return RoutineOutcome::NoEffect;
    };
    let heal = if ctx.metamagic.contains(Metamagic::MAXIMIZE) {
        (spec.dice * spec.sides) as i32
    } else {
        ctx.dice.roll(spec.dice, spec.sides)
    } + spec.bonus
        + spec.per_level * ctx.level.max(0);

    let Some(target) = ctx.actors.get_mut(target_id) else {
        return RoutineOutcome::NoEffect;
    };
    if target.is_dead() {
        return RoutineOutcome::NoEffect;
    }
    let before = (target.hit, target.psp);
    let max_hit = target.current().max_hit;
    let max_psp = target.current().max_psp;
    if heal > 0 && target.hit < max_hit {
        target.hit = (target.hit + heal).min(max_hit);
    }
    if spec.psp > 0 && target.psp < max_psp {
        target.psp = (target.psp + spec.psp).min(max_psp);
    }
    if target.hit > 0 && target.position < Position::Sleeping {
        target.position = Position::Resting;
    }
    let gained = target.hit - before.0;
    if (target.hit, target.psp) == before {
        return RoutineOutcome::NoEffect;
    }
    ctx.applied(target_id, RoutineKind::Points, gained);
    RoutineOutcome::Applied
}

fn merge(outcomes: impl IntoIterator<Item = RoutineOutcome>) -> RoutineOutcome {
    let mut merged = RoutineOutcome::NoEffect;
    for outcome in outcomes {
        match outcome {
            RoutineOutcome::NoEffect => {}
            RoutineOutcome::Applied | RoutineOutcome::Killed => return RoutineOutcome::Applied,
            other => merged = other,
        }
    }
    merged
}

fn room_of<'c>(ctx: &'c RoutineContext<'_>) -> Option<(RoomId, &'c Actor)> {
    ctx.actors.get(ctx.caster).map(|caster| (caster.room, caster))
}

// ============================================================================
// Routine implementations
// ============================================================================

impl EffectRoutine for DamageRoutine {
    fn kind(&self) -> RoutineKind {
        RoutineKind::Damage
    }

    fn apply(&self, ctx: &mut RoutineContext<'_>) -> RoutineOutcome {
        match ctx.victim {
            Some(victim) => damage_one(ctx, victim),
            None => RoutineOutcome::NoEffect,
        }
    }
}

impl EffectRoutine for AffectsRoutine {
    fn kind(&self) -> RoutineKind {
        RoutineKind::Affects
    }

    fn apply(&self, ctx: &mut RoutineContext<'_>) -> RoutineOutcome {
        let target = ctx.target();
        affect_one(ctx, target)
    }
}

impl EffectRoutine for UnaffectsRoutine {
    fn kind(&self) -> RoutineKind {
        RoutineKind::Unaffects
    }

    fn apply(&self, ctx: &mut RoutineContext<'_>) -> RoutineOutcome {
        let target_id = ctx.target();
        let Some(target) = ctx.actors.get_mut(target_id) else {
            return RoutineOutcome::NoEffect;
        };
        let removed: usize = ctx
            .spell
            .unaffects
            .iter()
            .map(|spell| target.strip_spell(*spell))
            .sum();
        if removed == 0 {
            return RoutineOutcome::NoEffect;
        }
        ctx.applied(target_id, RoutineKind::Unaffects, removed as i32);
        RoutineOutcome::Applied
    }
}

impl EffectRoutine for PointsRoutine {
    fn kind(&self) -> RoutineKind {
        RoutineKind::Points
    }

    fn apply(&self, ctx: &mut RoutineContext<'_>) -> RoutineOutcome {
        let target = ctx.target();
        points_one(ctx, target)
    }
}

impl EffectRoutine for GroupsRoutine {
    fn kind(&self) -> RoutineKind {
        RoutineKind::Groups
    }

    /// Applies the spell's affects and healing to every group member present.
    fn apply(&self, ctx: &mut RoutineContext<'_>) -> RoutineOutcome {
        let Some((room, caster)) = room_of(ctx) else {
            return RoutineOutcome::NoEffect;
        };
        let Some(group) = caster.group else {
            return RoutineOutcome::NoEffect;
        };
        let members: Vec<ActorId> = ctx
            .actors
            .in_room(room)
            .into_iter()
            .filter(|id| ctx.actors.get(*id).is_some_and(|a| a.group == Some(group)))
            .collect();

        let mut outcomes = Vec::with_capacity(members.len() * 2);
        for member in members {
            outcomes.push(affect_one(ctx, member));
            outcomes.push(points_one(ctx, member));
        }
        merge(outcomes)
    }
}

impl EffectRoutine for MassesRoutine {
    fn kind(&self) -> RoutineKind {
        RoutineKind::Masses
    }

    /// Applies the spell's affects to everyone else in the room.
    fn apply(&self, ctx: &mut RoutineContext<'_>) -> RoutineOutcome {
        let Some((room, _)) = room_of(ctx) else {
            return RoutineOutcome::NoEffect;
        };
        let others: Vec<ActorId> = ctx
            .actors
            .in_room(room)
            .into_iter()
            .filter(|id| *id != ctx.caster)
            .collect();
        let outcomes: Vec<_> = others.into_iter().map(|id| affect_one(ctx, id)).collect();
        merge(outcomes)
    }
}

impl EffectRoutine for AreasRoutine {
    fn kind(&self) -> RoutineKind {
        RoutineKind::Areas
    }

    /// Damages everyone in the room who is neither the caster, a group
    /// member, nor one of the caster's followers.
    fn apply(&self, ctx: &mut RoutineContext<'_>) -> RoutineOutcome {
        let Some((room, caster)) = room_of(ctx) else {
            return RoutineOutcome::NoEffect;
        };
        let (caster_id, group) = (caster.id, caster.group);
        let hostiles: Vec<ActorId> = ctx
            .actors
            .iter()
            .filter(|a| a.room == room && a.id != caster_id)
            .filter(|a| group.is_none() || a.group != group)
            .filter(|a| a.master != Some(caster_id))
            .map(|a| a.id)
            .collect();

        let mut outcomes = Vec::with_capacity(hostiles.len());
        for id in hostiles {
            if ctx.spell.damage.is_some() {
                outcomes.push(damage_one(ctx, id));
            }
            outcomes.push(affect_one(ctx, id));
        }
        merge(outcomes)
    }
}

impl EffectRoutine for WorldRoutine {
    fn kind(&self) -> RoutineKind {
        self.0
    }

    fn apply(&self, ctx: &mut RoutineContext<'_>) -> RoutineOutcome {
        let Some(world) = ctx.env.world() else {
            debug!(target: "magic", routine = %self.0, spell = %ctx.spell.id, "no world attached");
            return RoutineOutcome::NoEffect;
        };
        let Some((room, _)) = room_of(ctx) else {
            return RoutineOutcome::NoEffect;
        };
        let request = WorldRequest {
            caster: ctx.caster,
            room,
            spell: ctx.spell.id,
            level: ctx.level,
            target: ctx.cast_target(),
        };
        world.apply_routine(self.0, &request)
    }
}

impl EffectRoutine for ManualRoutine {
    fn kind(&self) -> RoutineKind {
        RoutineKind::Manual
    }

    fn apply(&self, ctx: &mut RoutineContext<'_>) -> RoutineOutcome {
        match ctx.env.manual().and_then(|manual| manual.get(ctx.spell.id)) {
            Some(effect) => effect(ctx),
            None => {
                warn!(spell = %ctx.spell.id, "manual spell has no registered effect");
                RoutineOutcome::NoEffect
            }
        }
    }
}
