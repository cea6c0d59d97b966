//! Casting session lifecycle driven through the public API.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mud_core::{
    AffectFlags, AffectRecord, ApplyType, BonusCategory, CastClass, CastError, CastOutcome,
    CastRequest, CastTarget, CasterLevels, CastingState, DamageType, Feats, Interruption,
    ManualEffects, MemoryLedger, Metamagic, Narration, PcgRng, Position, RecordingNarrator,
    RngOracle, RoutineFlags, RoutineKind, RoutineOutcome, RulesConfig, RulesEnv, SaveKind,
    SpellDescriptor, SpellId, SpellRegistry, TargetFlags, Tick, abort_cast, advance, begin_cast,
};
use mud_core::magic::{AffectTemplate, Blocked, DamageSpec};
use mud_core::{
    Actor, ActorId, ActorKind, ActorTable, Attributes, GroupId, Item, ItemId, RoomId, WearSlot,
};

const SHIELD: SpellId = SpellId(10);
const BOLT: SpellId = SpellId(11);
const WISH: SpellId = SpellId(12);
const GUARD: SpellId = SpellId(13);

const CASTER: ActorId = ActorId(1);
const VICTIM: ActorId = ActorId(2);

/// Yields the same die face for every roll.
struct Fixed(u32);

impl RngOracle for Fixed {
    fn next_u32(&self, _seed: u64) -> u32 {
        self.0 - 1
    }
}

fn registry() -> SpellRegistry {
    let shield = SpellDescriptor::new(SHIELD, "shield")
        .with_targets(TargetFlags::CHAR_ROOM)
        .with_routines(RoutineFlags::MANUAL)
        .with_cast_time(3)
        .with_min_level(CastClass::Sorcerer, 1);
    let bolt = SpellDescriptor::new(BOLT, "bolt")
        .with_targets(TargetFlags::CHAR_ROOM | TargetFlags::FIGHT_VICT | TargetFlags::NOT_SELF)
        .violent()
        .with_min_level(CastClass::Sorcerer, 1)
        .with_cast_time(2)
        .with_damage(DamageSpec {
            dice: 10,
            sides: 10,
            levels_per_die: 0,
            max_dice: 0,
            bonus: 0,
            damage_type: DamageType::Force,
            half_on_save: false,
            resistable: true,
        })
        .with_routines(RoutineFlags::DAMAGE | RoutineFlags::MANUAL);
    let mut wish = SpellDescriptor::new(WISH, "wish")
        .with_targets(TargetFlags::IGNORE)
        .with_routines(RoutineFlags::MANUAL)
        .with_min_level(CastClass::Sorcerer, 1);
    wish.epic = true;
    let mut guard = SpellDescriptor::new(GUARD, "guard")
        .with_targets(TargetFlags::SELF_ONLY)
        .with_routines(RoutineFlags::MANUAL)
        .with_min_level(CastClass::Sorcerer, 1);
    guard.min_position = Position::Standing;
    [shield, bolt, wish, guard].into_iter().collect()
}

fn sorcerer() -> Actor {
    Actor::new(CASTER, "Aldric", ActorKind::Player, Attributes::default())
        .with_level(10)
        .with_caster(
            CastClass::Sorcerer,
            CasterLevels {
                arcane: 10,
                divine: 0,
            },
        )
        .in_room(RoomId(3001))
}

fn bystander() -> Actor {
    Actor::new(VICTIM, "Brom", ActorKind::Player, Attributes::default()).in_room(RoomId(3001))
}

fn world() -> ActorTable {
    let mut actors = ActorTable::new();
    actors.insert(sorcerer());
    actors.insert(bystander());
    actors
}

fn counting_manual(spells: &[SpellId]) -> (ManualEffects, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut manual = ManualEffects::new();
    for spell in spells {
        let calls = Arc::clone(&calls);
        manual.register(*spell, move |_ctx| {
            calls.fetch_add(1, Ordering::SeqCst);
            RoutineOutcome::Applied
        });
    }
    (manual, calls)
}

fn state(actors: &ActorTable, id: ActorId) -> CastingState {
    CastingState::of(actors.get(id).and_then(Actor::casting))
}

#[test]
fn three_tick_cast_dispatches_once_on_third_advance() {
    let config = RulesConfig::with_seed(7);
    let spells = registry();
    let (manual, calls) = counting_manual(&[SHIELD]);
    let narrator = RecordingNarrator::new();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng)
        .with_manual(&manual)
        .with_narrator(&narrator);
    let mut actors = world();

    let started = begin_cast(env, &mut actors, CastRequest::new(CASTER, SHIELD), Tick(1))
        .expect("begin should succeed");
    assert_eq!(started, CastOutcome::Started { ticks: 3 });
    assert_eq!(state(&actors, CASTER), CastingState::Casting(3));

    let first = advance(env, &mut actors, CASTER, Tick(2));
    assert_eq!(first, CastOutcome::Continuing { ticks_remaining: 2 });
    assert_eq!(state(&actors, CASTER), CastingState::Casting(2));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let second = advance(env, &mut actors, CASTER, Tick(3));
    assert_eq!(second, CastOutcome::Continuing { ticks_remaining: 1 });
    assert_eq!(state(&actors, CASTER), CastingState::Casting(1));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let third = advance(env, &mut actors, CASTER, Tick(4));
    let CastOutcome::Completed(report) = third else {
        panic!("third advance should complete, got {third:?}");
    };
    assert_eq!(report.outcome(RoutineKind::Manual), Some(RoutineOutcome::Applied));
    assert_eq!(state(&actors, CASTER), CastingState::Idle);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert_eq!(advance(env, &mut actors, CASTER, Tick(5)), CastOutcome::Idle);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let events = narrator.take();
    assert!(matches!(events.first(), Some(Narration::CastBegin { .. })));
    let progress = events
        .iter()
        .filter(|e| matches!(e, Narration::CastProgress { .. }))
        .count();
    assert_eq!(progress, 3);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, Narration::CastComplete { .. }))
            .count(),
        1
    );
}

#[test]
fn second_begin_is_rejected_and_session_untouched() {
    let config = RulesConfig::new();
    let spells = registry();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng);
    let mut actors = world();

    begin_cast(env, &mut actors, CastRequest::new(CASTER, SHIELD), Tick(1)).expect("first begin");
    advance(env, &mut actors, CASTER, Tick(2));
    assert_eq!(state(&actors, CASTER), CastingState::Casting(2));

    let again = begin_cast(env, &mut actors, CastRequest::new(CASTER, SHIELD), Tick(2));
    assert_eq!(again, Err(CastError::AlreadyCasting));
    assert_eq!(state(&actors, CASTER), CastingState::Casting(2));
}

#[test]
fn quickened_cast_resolves_without_a_session() {
    let config = RulesConfig::new();
    let spells = registry();
    let (manual, calls) = counting_manual(&[SHIELD]);
    let env = RulesEnv::with_all(&config, &spells, &PcgRng).with_manual(&manual);
    let mut actors = world();

    let request = CastRequest::new(CASTER, SHIELD).with_metamagic(Metamagic::QUICKEN);
    let outcome = begin_cast(env, &mut actors, request, Tick(1)).expect("quickened begin");
    assert!(matches!(outcome, CastOutcome::Completed(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(state(&actors, CASTER), CastingState::Idle);
}

#[test]
fn abort_clears_the_session() {
    let config = RulesConfig::new();
    let spells = registry();
    let narrator = RecordingNarrator::new();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng).with_narrator(&narrator);
    let mut actors = world();

    begin_cast(env, &mut actors, CastRequest::new(CASTER, SHIELD), Tick(1)).expect("begin");
    assert_eq!(abort_cast(env, &mut actors, CASTER), Ok(SHIELD));
    assert_eq!(state(&actors, CASTER), CastingState::Idle);
    assert_eq!(abort_cast(env, &mut actors, CASTER), Err(CastError::NotCasting));
    assert_eq!(
        narrator.count(|e| matches!(e, Narration::CastAborted { spell, .. } if *spell == SHIELD)),
        1
    );
}

#[test]
fn sitting_down_interrupts_the_cast() {
    let config = RulesConfig::new();
    let spells = registry();
    let narrator = RecordingNarrator::new();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng).with_narrator(&narrator);
    let mut actors = world();

    begin_cast(env, &mut actors, CastRequest::new(CASTER, SHIELD), Tick(1)).expect("begin");
    actors.get_mut(CASTER).expect("caster").position = Position::Sitting;

    let outcome = advance(env, &mut actors, CASTER, Tick(2));
    assert_eq!(outcome, CastOutcome::Interrupted(Interruption::Position));
    assert_eq!(state(&actors, CASTER), CastingState::Idle);
    assert_eq!(
        narrator.count(|e| matches!(
            e,
            Narration::CastInterrupted {
                reason: Interruption::Position,
                ..
            }
        )),
        1
    );
}

#[test]
fn target_leaving_the_room_interrupts() {
    let config = RulesConfig::new();
    let spells = registry();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng);
    let mut actors = world();

    let request = CastRequest::new(CASTER, BOLT).at(CastTarget::Actor(VICTIM));
    begin_cast(env, &mut actors, request, Tick(1)).expect("begin");
    actors.get_mut(VICTIM).expect("victim").room = RoomId(3002);

    let outcome = advance(env, &mut actors, CASTER, Tick(2));
    assert_eq!(outcome, CastOutcome::Interrupted(Interruption::TargetGone));
}

#[test]
fn failed_concentration_in_combat_loses_the_spell() {
    let config = RulesConfig::new();
    let spells = registry();
    let env = RulesEnv::with_all(&config, &spells, &Fixed(1));
    let mut actors = world();
    let orc = Actor::new(ActorId(3), "orc shaman", ActorKind::Npc, Attributes::default())
        .in_room(RoomId(3001));
    actors.insert(orc);

    let started = begin_cast(env, &mut actors, CastRequest::new(ActorId(3), SHIELD), Tick(1))
        .expect("npc begin");
    assert_eq!(started, CastOutcome::Started { ticks: 4 });

    let orc = actors.get_mut(ActorId(3)).expect("orc");
    orc.fighting = Some(VICTIM);
    orc.tanking = true;
    orc.add_affect(AffectRecord::status(SpellId(90), AffectFlags::TAUNTED, 5));

    let outcome = advance(env, &mut actors, ActorId(3), Tick(2));
    assert_eq!(outcome, CastOutcome::Interrupted(Interruption::LostConcentration));
    assert_eq!(state(&actors, ActorId(3)), CastingState::Idle);
}

#[test]
fn begin_rejections_leave_no_session() {
    let config = RulesConfig::new();
    let spells = registry();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng);

    let mut actors = world();
    actors
        .get_mut(CASTER)
        .expect("caster")
        .add_affect(AffectRecord::status(SpellId(91), AffectFlags::SILENCED, 3));
    let silenced = begin_cast(env, &mut actors, CastRequest::new(CASTER, SHIELD), Tick(1));
    assert_eq!(silenced, Err(CastError::Silenced));

    let mut actors = world();
    actors.get_mut(CASTER).expect("caster").position = Position::Sleeping;
    let asleep = begin_cast(env, &mut actors, CastRequest::new(CASTER, SHIELD), Tick(1));
    assert_eq!(
        asleep,
        Err(CastError::PositionTooLow {
            position: Position::Sleeping
        })
    );

    let mut actors = world();
    let other = CastRequest::new(CASTER, GUARD).at(CastTarget::Actor(VICTIM));
    assert_eq!(
        begin_cast(env, &mut actors, other, Tick(1)),
        Err(CastError::SelfOnly)
    );
    let at_self = CastRequest::new(CASTER, BOLT).at(CastTarget::Actor(CASTER));
    assert_eq!(
        begin_cast(env, &mut actors, at_self, Tick(1)),
        Err(CastError::NotSelf)
    );

    actors
        .get_mut(CASTER)
        .expect("caster")
        .add_affect(AffectRecord::status(SpellId(92), AffectFlags::NAUSEATED, 3));
    let sick = begin_cast(env, &mut actors, CastRequest::new(CASTER, SHIELD), Tick(1));
    assert_eq!(sick, Err(CastError::Nauseated));
    assert_eq!(state(&actors, CASTER), CastingState::Idle);
}

#[test]
fn charmed_caster_will_not_harm_master() {
    let config = RulesConfig::new();
    let spells = registry();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng);
    let mut actors = world();
    let caster = actors.get_mut(CASTER).expect("caster");
    caster.master = Some(VICTIM);
    caster.add_affect(AffectRecord::status(SpellId(93), AffectFlags::CHARM, 10));

    let request = CastRequest::new(CASTER, BOLT).at(CastTarget::Actor(VICTIM));
    assert_eq!(
        begin_cast(env, &mut actors, request, Tick(1)),
        Err(CastError::CharmBound)
    );
}

#[test]
fn unknown_level_means_unknown_spell() {
    let config = RulesConfig::new();
    let spells = registry();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng);
    let mut actors = world();
    actors.get_mut(CASTER).expect("caster").casting_class = CastClass::Cleric;

    let result = begin_cast(env, &mut actors, CastRequest::new(CASTER, SHIELD), Tick(1));
    assert_eq!(result, Err(CastError::SpellNotKnown { spell: SHIELD }));
}

#[test]
fn epic_spells_respect_the_ledger() {
    let config = RulesConfig::new();
    let spells = registry();
    let (manual, calls) = counting_manual(&[WISH]);
    let ledger = MemoryLedger::new(1, 1_000);
    let env = RulesEnv::with_all(&config, &spells, &PcgRng)
        .with_manual(&manual)
        .with_ledger(&ledger);
    let mut actors = world();

    let first = begin_cast(env, &mut actors, CastRequest::new(CASTER, WISH), Tick(10));
    assert!(matches!(first, Ok(CastOutcome::Completed(_))));
    let second = begin_cast(env, &mut actors, CastRequest::new(CASTER, WISH), Tick(20));
    assert_eq!(second, Err(CastError::NoUsesRemaining { spell: WISH }));
    let later = begin_cast(env, &mut actors, CastRequest::new(CASTER, WISH), Tick(1_010));
    assert!(matches!(later, Ok(CastOutcome::Completed(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn a_kill_stops_later_routines() {
    let config = RulesConfig::new();
    let spells = registry();
    let (manual, calls) = counting_manual(&[BOLT]);
    let env = RulesEnv::with_all(&config, &spells, &PcgRng).with_manual(&manual);
    let mut actors = world();

    let request = CastRequest::new(CASTER, BOLT)
        .at(CastTarget::Actor(VICTIM))
        .with_metamagic(Metamagic::QUICKEN | Metamagic::MAXIMIZE);
    let outcome = begin_cast(env, &mut actors, request, Tick(1)).expect("bolt");
    let CastOutcome::Completed(report) = outcome else {
        panic!("quickened bolt should resolve at once");
    };
    assert!(report.killed());
    assert_eq!(report.outcome(RoutineKind::Manual), None);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(actors.get(VICTIM).expect("victim").is_dead());
}

#[test]
fn spell_turning_reflects_once() {
    let config = RulesConfig::new();
    let spells = registry();
    let (manual, _) = counting_manual(&[BOLT]);
    let env = RulesEnv::with_all(&config, &spells, &PcgRng).with_manual(&manual);
    let mut actors = world();
    actors
        .get_mut(VICTIM)
        .expect("victim")
        .add_affect(AffectRecord::status(SpellId(94), AffectFlags::SPELL_TURNING, 10));
    actors.get_mut(CASTER).expect("caster").update_base(|b| b.max_hit = 500);
    actors.get_mut(CASTER).expect("caster").hit = 500;

    let request = CastRequest::new(CASTER, BOLT)
        .at(CastTarget::Actor(VICTIM))
        .with_metamagic(Metamagic::QUICKEN);
    let outcome = begin_cast(env, &mut actors, request, Tick(1)).expect("bolt");
    let CastOutcome::Completed(report) = outcome else {
        panic!("quickened bolt should resolve at once");
    };
    assert!(report.turned);
    let victim = actors.get(VICTIM).expect("victim");
    assert_eq!(victim.hit, victim.current().max_hit);
    assert!(!victim.has_any(AffectFlags::SPELL_TURNING));
    assert!(actors.get(CASTER).expect("caster").hit < 500);
}

#[test]
fn minor_globe_absorbs_low_circle_spells() {
    let config = RulesConfig::new();
    let spells = registry();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng);
    let mut actors = world();
    actors
        .get_mut(VICTIM)
        .expect("victim")
        .add_affect(AffectRecord::status(SpellId(95), AffectFlags::MINOR_GLOBE, 10));

    let request = CastRequest::new(CASTER, BOLT)
        .at(CastTarget::Actor(VICTIM))
        .with_metamagic(Metamagic::QUICKEN);
    let Ok(CastOutcome::Completed(report)) = begin_cast(env, &mut actors, request, Tick(1)) else {
        panic!("quickened bolt should resolve at once");
    };
    assert_eq!(report.blocked, Some(Blocked::MinorGlobe));
    assert!(report.outcomes.is_empty());
    let victim = actors.get(VICTIM).expect("victim");
    assert_eq!(victim.hit, victim.current().max_hit);
}

// ============================================================================
// Per-tick checks
// ============================================================================

#[test]
fn chant_feats_finish_the_cast_early() {
    let config = RulesConfig::new();
    let spells = registry();
    let (manual, calls) = counting_manual(&[SHIELD]);
    let env = RulesEnv::with_all(&config, &spells, &Fixed(1)).with_manual(&manual);

    let mut actors = world();
    actors.get_mut(CASTER).expect("caster").feats = Feats::QUICK_CHANT;
    begin_cast(env, &mut actors, CastRequest::new(CASTER, SHIELD), Tick(1)).expect("begin");
    assert_eq!(
        advance(env, &mut actors, CASTER, Tick(2)),
        CastOutcome::Continuing { ticks_remaining: 1 }
    );
    assert!(matches!(
        advance(env, &mut actors, CASTER, Tick(3)),
        CastOutcome::Completed(_)
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let mut actors = world();
    actors.get_mut(CASTER).expect("caster").feats = Feats::QUICK_CHANT | Feats::WIZ_CHANT;
    begin_cast(env, &mut actors, CastRequest::new(CASTER, SHIELD), Tick(1)).expect("begin");
    assert!(matches!(
        advance(env, &mut actors, CASTER, Tick(2)),
        CastOutcome::Completed(_)
    ));
    assert_eq!(state(&actors, CASTER), CastingState::Idle);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn nausea_mid_cast_interrupts() {
    let config = RulesConfig::new();
    let spells = registry();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng);
    let mut actors = world();

    begin_cast(env, &mut actors, CastRequest::new(CASTER, SHIELD), Tick(1)).expect("begin");
    actors
        .get_mut(CASTER)
        .expect("caster")
        .add_affect(AffectRecord::status(SpellId(96), AffectFlags::NAUSEATED, 3));

    let outcome = advance(env, &mut actors, CASTER, Tick(2));
    assert_eq!(outcome, CastOutcome::Interrupted(Interruption::Disabled));
    assert_eq!(state(&actors, CASTER), CastingState::Idle);
}

#[test]
fn deafened_caster_fumbles_on_a_bad_roll() {
    let config = RulesConfig::new();
    let spells = registry();
    let deafen = |actors: &mut ActorTable| {
        actors
            .get_mut(CASTER)
            .expect("caster")
            .add_affect(AffectRecord::status(SpellId(97), AffectFlags::DEAF, 5));
    };

    let env = RulesEnv::with_all(&config, &spells, &Fixed(1));
    let mut actors = world();
    begin_cast(env, &mut actors, CastRequest::new(CASTER, SHIELD), Tick(1)).expect("begin");
    deafen(&mut actors);
    let outcome = advance(env, &mut actors, CASTER, Tick(2));
    assert_eq!(outcome, CastOutcome::Interrupted(Interruption::DeafFumble));
    assert_eq!(state(&actors, CASTER), CastingState::Idle);

    let env = RulesEnv::with_all(&config, &spells, &Fixed(2));
    let mut actors = world();
    begin_cast(env, &mut actors, CastRequest::new(CASTER, SHIELD), Tick(1)).expect("begin");
    deafen(&mut actors);
    let outcome = advance(env, &mut actors, CASTER, Tick(2));
    assert_eq!(outcome, CastOutcome::Continuing { ticks_remaining: 2 });
}

#[test]
fn begin_checks_an_immediate_cast_too() {
    let config = RulesConfig::new();
    let spells = registry();
    let (manual, calls) = counting_manual(&[SHIELD]);
    let narrator = RecordingNarrator::new();
    let env = RulesEnv::with_all(&config, &spells, &Fixed(1))
        .with_manual(&manual)
        .with_narrator(&narrator);
    let quick = CastRequest::new(CASTER, SHIELD).with_metamagic(Metamagic::QUICKEN);

    let mut actors = world();
    actors
        .get_mut(CASTER)
        .expect("caster")
        .add_affect(AffectRecord::status(SpellId(97), AffectFlags::DEAF, 5));
    let deaf = begin_cast(env, &mut actors, quick, Tick(1));
    assert_eq!(deaf, Ok(CastOutcome::Interrupted(Interruption::DeafFumble)));

    let mut actors = world();
    let caster = actors.get_mut(CASTER).expect("caster");
    caster.fighting = Some(VICTIM);
    caster.tanking = true;
    caster.add_affect(AffectRecord::status(
        SpellId(98),
        AffectFlags::TAUNTED | AffectFlags::INTIMIDATED,
        5,
    ));
    let pressed = begin_cast(env, &mut actors, quick, Tick(1));
    assert_eq!(pressed, Ok(CastOutcome::Interrupted(Interruption::LostConcentration)));

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(state(&actors, CASTER), CastingState::Idle);
    assert_eq!(
        narrator.count(|e| matches!(e, Narration::CastInterrupted { .. })),
        2
    );
}

#[test]
fn time_stopped_caster_skips_the_rolls() {
    let config = RulesConfig::new();
    let spells = registry();
    let (manual, calls) = counting_manual(&[SHIELD]);
    let env = RulesEnv::with_all(&config, &spells, &Fixed(1)).with_manual(&manual);
    let mut actors = world();

    begin_cast(env, &mut actors, CastRequest::new(CASTER, SHIELD), Tick(1)).expect("begin");
    let caster = actors.get_mut(CASTER).expect("caster");
    caster.fighting = Some(VICTIM);
    caster.tanking = true;
    caster.add_affect(AffectRecord::status(
        SpellId(99),
        AffectFlags::TIME_STOPPED | AffectFlags::DEAF | AffectFlags::TAUNTED,
        5,
    ));

    let outcome = advance(env, &mut actors, CASTER, Tick(2));
    assert!(matches!(outcome, CastOutcome::Completed(_)), "got {outcome:?}");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Records every seed it is asked for.
struct SeedLog {
    seeds: Mutex<Vec<u64>>,
}

impl RngOracle for SeedLog {
    fn next_u32(&self, seed: u64) -> u32 {
        self.seeds.lock().expect("seed log").push(seed);
        9
    }
}

#[test]
fn every_roll_draws_a_fresh_seed() {
    let config = RulesConfig::with_seed(11);
    let spells = registry();
    let (manual, _) = counting_manual(&[BOLT, SHIELD]);
    let log = SeedLog {
        seeds: Mutex::new(Vec::new()),
    };
    let env = RulesEnv::with_all(&config, &spells, &log).with_manual(&manual);
    let mut actors = world();
    actors.get_mut(CASTER).expect("caster").fighting = Some(VICTIM);

    let bolt = CastRequest::new(CASTER, BOLT).at(CastTarget::Actor(VICTIM));
    begin_cast(env, &mut actors, bolt, Tick(1)).expect("begin");
    advance(env, &mut actors, CASTER, Tick(2));
    let completed = advance(env, &mut actors, CASTER, Tick(3));
    assert!(matches!(completed, CastOutcome::Completed(_)), "got {completed:?}");

    let quick = CastRequest::new(CASTER, SHIELD).with_metamagic(Metamagic::QUICKEN);
    begin_cast(env, &mut actors, quick, Tick(3)).expect("quick shield");
    begin_cast(env, &mut actors, quick, Tick(3)).expect("second quick shield");

    let seeds = log.seeds.lock().expect("seed log").clone();
    // Concentration on begin and both advances, resist, ten damage dice,
    // then concentration for each quick shield.
    assert_eq!(seeds.len(), 3 + 1 + 10 + 2);
    let unique: HashSet<_> = seeds.iter().collect();
    assert_eq!(unique.len(), seeds.len());
}

// ============================================================================
// Routines
// ============================================================================

const BULL: SpellId = SpellId(20);
const HOLD: SpellId = SpellId(21);
const DARK: SpellId = SpellId(22);
const SCORCH: SpellId = SpellId(23);
const RALLY: SpellId = SpellId(24);
const VEIL: SpellId = SpellId(25);
const BLAST: SpellId = SpellId(26);

fn template(location: ApplyType, modifier: i32, bonus: BonusCategory, flags: AffectFlags) -> AffectTemplate {
    AffectTemplate {
        location,
        modifier,
        bonus,
        duration: 5,
        per_level: 0,
        flags,
        accumulate: false,
    }
}

fn routine_registry() -> SpellRegistry {
    let none = AffectFlags::empty();
    let bull = SpellDescriptor::new(BULL, "bull's strength")
        .with_targets(TargetFlags::CHAR_ROOM)
        .with_min_level(CastClass::Sorcerer, 1)
        .with_affect(template(ApplyType::Str, 4, BonusCategory::Enhancement, none));
    let mut hold = SpellDescriptor::new(HOLD, "hold person")
        .with_targets(TargetFlags::CHAR_ROOM | TargetFlags::NOT_SELF)
        .violent()
        .with_min_level(CastClass::Sorcerer, 1)
        .with_affect(template(ApplyType::None, 0, BonusCategory::Undefined, AffectFlags::SLOW));
    hold.save = Some(SaveKind::Will);
    let dark = SpellDescriptor::new(DARK, "blindness")
        .with_targets(TargetFlags::CHAR_ROOM | TargetFlags::NOT_SELF)
        .violent()
        .with_min_level(CastClass::Sorcerer, 1)
        .with_affect(template(ApplyType::None, 0, BonusCategory::Undefined, AffectFlags::BLIND));
    let mut scorch = SpellDescriptor::new(SCORCH, "scorch")
        .with_targets(TargetFlags::CHAR_ROOM | TargetFlags::NOT_SELF)
        .violent()
        .with_min_level(CastClass::Sorcerer, 1)
        .with_damage(DamageSpec {
            dice: 10,
            sides: 10,
            levels_per_die: 0,
            max_dice: 0,
            bonus: 0,
            damage_type: DamageType::Fire,
            half_on_save: true,
            resistable: false,
        });
    scorch.save = Some(SaveKind::Reflex);
    let rally = SpellDescriptor::new(RALLY, "rally")
        .with_min_level(CastClass::Sorcerer, 1)
        .with_affect(template(ApplyType::None, 0, BonusCategory::Undefined, AffectFlags::HASTE))
        .with_routines(RoutineFlags::GROUPS);
    let veil = SpellDescriptor::new(VEIL, "mass invisibility")
        .with_min_level(CastClass::Sorcerer, 1)
        .with_affect(template(ApplyType::None, 0, BonusCategory::Undefined, AffectFlags::INVISIBLE))
        .with_routines(RoutineFlags::MASSES);
    let blast = SpellDescriptor::new(BLAST, "fireball")
        .violent()
        .with_min_level(CastClass::Sorcerer, 1)
        .with_damage(DamageSpec {
            dice: 2,
            sides: 6,
            levels_per_die: 0,
            max_dice: 0,
            bonus: 0,
            damage_type: DamageType::Fire,
            half_on_save: false,
            resistable: false,
        })
        .with_routines(RoutineFlags::AREAS);
    [bull, hold, dark, scorch, rally, veil, blast].into_iter().collect()
}

fn cast_now(
    env: RulesEnv<'_>,
    actors: &mut ActorTable,
    spell: SpellId,
    target: CastTarget,
    metamagic: Metamagic,
) -> mud_core::DispatchReport {
    let request = CastRequest::new(CASTER, spell)
        .at(target)
        .with_metamagic(metamagic | Metamagic::QUICKEN);
    match begin_cast(env, actors, request, Tick(1)) {
        Ok(CastOutcome::Completed(report)) => report,
        other => panic!("quickened {spell} should resolve at once, got {other:?}"),
    }
}

fn bull_duration(actor: &Actor) -> Option<i32> {
    actor
        .affects()
        .records()
        .find(|record| record.spell == BULL)
        .map(|record| record.duration)
}

#[test]
fn successful_save_negates_an_affect() {
    let config = RulesConfig::new();
    let spells = routine_registry();
    let victim = CastTarget::Actor(VICTIM);

    let env = RulesEnv::with_all(&config, &spells, &Fixed(20));
    let mut actors = world();
    let report = cast_now(env, &mut actors, HOLD, victim, Metamagic::empty());
    assert_eq!(report.outcome(RoutineKind::Affects), Some(RoutineOutcome::Saved));
    assert!(!actors.get(VICTIM).expect("victim").has_any(AffectFlags::SLOW));

    let env = RulesEnv::with_all(&config, &spells, &Fixed(1));
    let mut actors = world();
    let report = cast_now(env, &mut actors, HOLD, victim, Metamagic::empty());
    assert_eq!(report.outcome(RoutineKind::Affects), Some(RoutineOutcome::Applied));
    assert!(actors.get(VICTIM).expect("victim").has_any(AffectFlags::SLOW));
}

#[test]
fn extend_doubles_duration_and_recasting_does_nothing() {
    let config = RulesConfig::new();
    let spells = routine_registry();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng);
    let me = CastTarget::Actor(CASTER);

    let mut actors = world();
    cast_now(env, &mut actors, BULL, me, Metamagic::empty());
    assert_eq!(bull_duration(actors.get(CASTER).expect("caster")), Some(5));
    let again = cast_now(env, &mut actors, BULL, me, Metamagic::empty());
    assert_eq!(again.outcome(RoutineKind::Affects), Some(RoutineOutcome::NoEffect));

    let mut actors = world();
    cast_now(env, &mut actors, BULL, me, Metamagic::EXTEND);
    let caster = actors.get(CASTER).expect("caster");
    assert_eq!(bull_duration(caster), Some(10));
    assert_eq!(caster.current().abilities.str, 14);
}

#[test]
fn weaker_bonus_than_worn_gear_has_no_effect() {
    let config = RulesConfig::new();
    let spells = routine_registry();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng);
    let me = CastTarget::Actor(CASTER);

    let mut actors = world();
    let belt = Item::new(ItemId(7), "belt of giant strength").with_affect(
        ApplyType::Str,
        6,
        BonusCategory::Enhancement,
    );
    actors
        .get_mut(CASTER)
        .expect("caster")
        .equip(Arc::new(belt), WearSlot::Waist)
        .expect("equip");

    let report = cast_now(env, &mut actors, BULL, me, Metamagic::empty());
    assert_eq!(report.outcome(RoutineKind::Affects), Some(RoutineOutcome::NoEffect));
    let caster = actors.get(CASTER).expect("caster");
    assert_eq!(bull_duration(caster), None);
    assert_eq!(caster.current().abilities.str, 16);
}

#[test]
fn unblindable_targets_ignore_blindness() {
    let config = RulesConfig::new();
    let spells = routine_registry();
    let env = RulesEnv::with_all(&config, &spells, &Fixed(1));
    let victim = CastTarget::Actor(VICTIM);

    let mut actors = world();
    actors
        .get_mut(VICTIM)
        .expect("victim")
        .add_affect(AffectRecord::status(SpellId(60), AffectFlags::UNBLINDABLE, 10));
    let report = cast_now(env, &mut actors, DARK, victim, Metamagic::empty());
    assert_eq!(report.outcome(RoutineKind::Affects), Some(RoutineOutcome::NoEffect));
    assert!(!actors.get(VICTIM).expect("victim").has_any(AffectFlags::BLIND));

    let mut actors = world();
    let report = cast_now(env, &mut actors, DARK, victim, Metamagic::empty());
    assert_eq!(report.outcome(RoutineKind::Affects), Some(RoutineOutcome::Applied));
    assert!(actors.get(VICTIM).expect("victim").has_any(AffectFlags::BLIND));
}

fn sturdy_victim(actors: &mut ActorTable, fire_resistance: i32) {
    let victim = actors.get_mut(VICTIM).expect("victim");
    victim.update_base(|b| {
        b.max_hit = 500;
        b.resistances[DamageType::Fire.index()] = fire_resistance;
    });
    victim.hit = 500;
}

#[test]
fn saves_halve_damage_and_resistance_reduces_it() {
    let config = RulesConfig::new();
    let spells = routine_registry();
    let victim = CastTarget::Actor(VICTIM);
    let hit_after = |rng: &dyn RngOracle, resistance: i32| {
        let env = RulesEnv::with_all(&config, &spells, rng);
        let mut actors = world();
        sturdy_victim(&mut actors, resistance);
        let report = cast_now(env, &mut actors, SCORCH, victim, Metamagic::MAXIMIZE);
        (report.outcome(RoutineKind::Damage), actors.get(VICTIM).expect("victim").hit)
    };

    assert_eq!(hit_after(&Fixed(1), 0), (Some(RoutineOutcome::Applied), 400));
    assert_eq!(hit_after(&Fixed(20), 0), (Some(RoutineOutcome::Saved), 450));
    assert_eq!(hit_after(&Fixed(1), 50), (Some(RoutineOutcome::Applied), 450));
    assert_eq!(hit_after(&Fixed(20), 50), (Some(RoutineOutcome::Saved), 475));
}

const ALLY: ActorId = ActorId(3);
const FAR_ALLY: ActorId = ActorId(4);
const PET: ActorId = ActorId(5);

fn party() -> ActorTable {
    let mut actors = world();
    let party = Some(GroupId(1));
    actors.get_mut(CASTER).expect("caster").group = party;

    let mut ally = Actor::new(ALLY, "Mira", ActorKind::Player, Attributes::default())
        .in_room(RoomId(3001));
    ally.group = party;
    let mut far = Actor::new(FAR_ALLY, "Tobin", ActorKind::Player, Attributes::default())
        .in_room(RoomId(3002));
    far.group = party;
    let mut pet = Actor::new(PET, "wolf", ActorKind::Npc, Attributes::default())
        .in_room(RoomId(3001));
    pet.master = Some(CASTER);
    actors.insert(ally);
    actors.insert(far);
    actors.insert(pet);
    actors
}

fn has_flag(actors: &ActorTable, id: ActorId, flag: AffectFlags) -> bool {
    actors.get(id).expect("actor").has_any(flag)
}

#[test]
fn group_spells_reach_members_in_the_room() {
    let config = RulesConfig::new();
    let spells = routine_registry();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng);
    let mut actors = party();

    let report = cast_now(env, &mut actors, RALLY, CastTarget::None, Metamagic::empty());
    assert_eq!(report.outcome(RoutineKind::Groups), Some(RoutineOutcome::Applied));
    assert!(has_flag(&actors, CASTER, AffectFlags::HASTE));
    assert!(has_flag(&actors, ALLY, AffectFlags::HASTE));
    assert!(!has_flag(&actors, FAR_ALLY, AffectFlags::HASTE));
    assert!(!has_flag(&actors, VICTIM, AffectFlags::HASTE));
    assert!(!has_flag(&actors, PET, AffectFlags::HASTE));
}

#[test]
fn mass_spells_reach_everyone_else_in_the_room() {
    let config = RulesConfig::new();
    let spells = routine_registry();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng);
    let mut actors = party();

    let report = cast_now(env, &mut actors, VEIL, CastTarget::None, Metamagic::empty());
    assert_eq!(report.outcome(RoutineKind::Masses), Some(RoutineOutcome::Applied));
    assert!(!has_flag(&actors, CASTER, AffectFlags::INVISIBLE));
    assert!(has_flag(&actors, ALLY, AffectFlags::INVISIBLE));
    assert!(has_flag(&actors, VICTIM, AffectFlags::INVISIBLE));
    assert!(has_flag(&actors, PET, AffectFlags::INVISIBLE));
    assert!(!has_flag(&actors, FAR_ALLY, AffectFlags::INVISIBLE));
}

#[test]
fn area_spells_spare_the_party_and_followers() {
    let config = RulesConfig::new();
    let spells = routine_registry();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng);
    let mut actors = party();
    let full = |actors: &ActorTable, id: ActorId| {
        let actor = actors.get(id).expect("actor");
        actor.hit == actor.current().max_hit
    };

    let report = cast_now(env, &mut actors, BLAST, CastTarget::None, Metamagic::MAXIMIZE);
    assert_eq!(report.outcome(RoutineKind::Areas), Some(RoutineOutcome::Applied));
    let bystander = actors.get(VICTIM).expect("bystander");
    assert_eq!(bystander.hit, bystander.current().max_hit - 12);
    assert!(full(&actors, CASTER));
    assert!(full(&actors, ALLY));
    assert!(full(&actors, PET));
    assert!(full(&actors, FAR_ALLY));
}
