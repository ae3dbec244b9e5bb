use std::time::Duration;

use wave_defence_core::{
    AbilityConfig, Catalogue, CloakConfig, EnemyId, EnemyKind, NursingConfig, PounceConfig, Vec2,
};
use wave_defence_system_abilities::{AbilityContext, AbilityModule, AbilitySignal};

fn context() -> AbilityContext {
    AbilityContext {
        enemy: EnemyId::new(3),
        position: Vec2::new(2.0, 5.0),
        waypoint_index: 1,
    }
}

fn module_for(kind: EnemyKind, seed: u64) -> AbilityModule {
    let stats = Catalogue::default().enemy(kind);
    AbilityModule::from_config(stats.ability.as_ref(), seed)
}

#[test]
fn catalogue_kinds_map_to_matching_modules() {
    assert!(matches!(module_for(EnemyKind::Scavenger, 0), AbilityModule::None));
    assert!(matches!(module_for(EnemyKind::Hunter, 0), AbilityModule::Pounce(_)));
    assert!(matches!(module_for(EnemyKind::Stalker, 0), AbilityModule::Cloak(_)));
    assert!(matches!(module_for(EnemyKind::Nursing, 0), AbilityModule::Nursing(_)));
    assert!(matches!(
        module_for(EnemyKind::BroodCommander, 0),
        AbilityModule::Alpha(_)
    ));
}

#[test]
fn stalkers_spawn_cloaked_and_fast() {
    let module = module_for(EnemyKind::Stalker, 7);

    assert!(module.is_invulnerable());
    assert_eq!(module.speed_multiplier(), 1.5);
}

#[test]
fn disposal_cancels_every_timer() {
    for kind in EnemyKind::ALL {
        let mut module = module_for(kind, 13);
        let mut signals = Vec::new();

        module.dispose();
        module.dispose();
        module.tick(Duration::from_secs(120), context(), &mut signals);

        assert_eq!(module.pending_timers(), 0, "{kind:?} kept timers alive");
        assert!(signals.is_empty(), "{kind:?} fired after disposal");
        assert!(!module.is_invulnerable());
    }
}

#[test]
fn same_seed_produces_same_signals() {
    let run = |seed| {
        let mut module = module_for(EnemyKind::BroodCommander, seed);
        let mut signals = Vec::new();
        for _ in 0..600 {
            module.tick(Duration::from_millis(100), context(), &mut signals);
        }
        signals
    };

    let first = run(42);
    assert!(!first.is_empty(), "a minute should produce minions");
    assert_eq!(first, run(42));
}

#[test]
fn nursing_signal_reflects_configured_offspring() {
    let config = AbilityConfig::Nursing(NursingConfig {
        min_spawn_count: 3,
        max_spawn_count: 3,
        offspring: EnemyKind::Hunter,
        radius: 0.8,
    });
    let mut module = AbilityModule::from_config(Some(&config), 0);
    let mut signals = Vec::new();

    module.on_health_changed(0, context(), &mut signals);
    module.on_health_changed(0, context(), &mut signals);

    assert!(matches!(
        signals.as_slice(),
        [AbilitySignal::SpawnOffspring {
            kind: EnemyKind::Hunter,
            count: 3,
            waypoint_index: 1,
            ..
        }]
    ));
}

#[test]
fn cloak_suppression_follows_the_phase() {
    let config = AbilityConfig::Cloak(CloakConfig {
        min_cloak_time: 2.0,
        max_cloak_time: 2.0,
        ..CloakConfig::default()
    });
    let mut module = AbilityModule::from_config(Some(&config), 0);
    let mut signals = Vec::new();

    module.tick(Duration::from_secs(2), context(), &mut signals);

    assert!(!module.is_invulnerable());
    assert_eq!(module.speed_multiplier(), 0.0);
    assert_eq!(signals, vec![AbilitySignal::CloakChanged { cloaked: false }]);
}

#[test]
fn pounce_ignores_damage() {
    let config = AbilityConfig::Pounce(PounceConfig::default());
    let mut module = AbilityModule::from_config(Some(&config), 0);
    let mut signals = Vec::new();

    module.on_health_changed(0, context(), &mut signals);

    assert_eq!(module.pending_timers(), 1);
    assert!(signals.is_empty());
}
