//! Scheduler pulses: casting every tick, affect decay every pulse.

use mud_core::{
    Actor, ActorId, ActorKind, ActorTable, AffectRecord, ApplyType, Attributes, CastClass,
    CastOutcome, CastRequest, CasterLevels, Narration, PcgRng, RecordingNarrator, RoutineFlags,
    RulesConfig, RulesEnv, Scheduler, SpellDescriptor, SpellId, SpellRegistry, TargetFlags, Tick,
    begin_cast,
};

fn env_parts() -> (RulesConfig, SpellRegistry) {
    let mut config = RulesConfig::with_seed(11);
    config.affect_pulse = 3;
    let light = SpellDescriptor::new(SpellId(4), "light")
        .with_targets(TargetFlags::IGNORE)
        .with_routines(RoutineFlags::ROOM)
        .with_cast_time(2)
        .with_min_level(CastClass::Wizard, 1);
    (config, [light].into_iter().collect())
}

fn mage() -> Actor {
    Actor::new(ActorId(1), "mage", ActorKind::Player, Attributes::default()).with_caster(
        CastClass::Wizard,
        CasterLevels {
            arcane: 3,
            divine: 0,
        },
    )
}

#[test]
fn affects_decay_only_on_pulses() {
    let (config, spells) = env_parts();
    let narrator = RecordingNarrator::new();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng).with_narrator(&narrator);
    let mut actors = ActorTable::new();
    let mut actor = mage();
    actor.add_affect(AffectRecord::new(SpellId(20), ApplyType::Hitroll, 1, 2));
    actors.insert(actor);

    for now in 1..=5 {
        let report = Scheduler::tick(env, &mut actors, Tick(now));
        assert_eq!(report.pulse, now % 3 == 0);
        assert!(report.actors.is_empty(), "tick {now} should be quiet");
    }
    let report = Scheduler::tick(env, &mut actors, Tick(6));
    let tick = report.for_actor(ActorId(1)).expect("wear-off reported");
    assert_eq!(tick.worn_off, vec![SpellId(20)]);
    assert!(!actors.get(ActorId(1)).expect("actor").affected_by(SpellId(20)));
    assert_eq!(
        narrator.count(|e| matches!(e, Narration::WoreOff { spell, .. } if *spell == SpellId(20))),
        1
    );
}

#[test]
fn tick_advances_casting_sessions() {
    let (config, spells) = env_parts();
    let env = RulesEnv::with_all(&config, &spells, &PcgRng);
    let mut actors = ActorTable::new();
    actors.insert(mage());

    begin_cast(env, &mut actors, CastRequest::new(ActorId(1), SpellId(4)), Tick(1))
        .expect("begin");
    let first = Scheduler::tick_actor(env, &mut actors, ActorId(1), Tick(2));
    assert_eq!(first.cast, CastOutcome::Continuing { ticks_remaining: 1 });

    let report = Scheduler::tick(env, &mut actors, Tick(3));
    let tick = report.for_actor(ActorId(1)).expect("cast reported");
    assert!(matches!(tick.cast, CastOutcome::Completed(_)));
    assert!(!actors.get(ActorId(1)).expect("actor").is_casting());
}
