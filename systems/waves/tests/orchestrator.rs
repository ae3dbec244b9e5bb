use std::time::Duration;

use wave_defence_core::{
    AbilityConfig, AlphaConfig, Catalogue, CatalogueOverrides, Command, EnemyId, EnemyKind,
    EnemyStats, Event, OffspringFormation, Vec2,
};
use wave_defence_system_waves::{Config, Wave, WaveOrchestrator, WavePhase};
use wave_defence_world::{self as world, query, World};

const SPAWN_POINT: Vec2 = Vec2::new(-5.0, 5.0);

fn orchestrator(waves: Vec<Wave>) -> WaveOrchestrator {
    WaveOrchestrator::new(Config::new(waves, SPAWN_POINT))
}

fn advance(orchestrator: &mut WaveOrchestrator, millis: u64) -> Vec<Command> {
    let mut out = Vec::new();
    orchestrator.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(millis),
        }],
        &mut out,
    );
    out
}

fn kill(orchestrator: &mut WaveOrchestrator, enemy: u32, gold: u32) -> Vec<Command> {
    let mut out = Vec::new();
    orchestrator.handle(
        &[Event::EnemyKilled {
            enemy: EnemyId::new(enemy),
            gold,
        }],
        &mut out,
    );
    out
}

fn spawn_scavenger() -> Command {
    Command::SpawnEnemy {
        kind: EnemyKind::Scavenger,
        position: SPAWN_POINT,
        waypoint_index: 0,
    }
}

#[test]
fn single_enemy_wave_spawns_once_then_waits_for_the_kill() {
    let mut orchestrator = orchestrator(vec![
        Wave::new(0, false, 1.0, vec![EnemyKind::Scavenger]),
        Wave::new(1, false, 1.0, vec![EnemyKind::Scavenger, EnemyKind::Scavenger]),
    ]);
    let mut out = Vec::new();

    orchestrator.start(&mut out);
    assert_eq!(out, vec![spawn_scavenger()], "first release is immediate");
    assert_eq!(orchestrator.phase(), WavePhase::WaitingForClear(0));

    for _ in 0..20 {
        assert!(advance(&mut orchestrator, 100).is_empty(), "no further spawns");
    }
    assert_eq!(orchestrator.pending_timers(), 0);

    assert_eq!(kill(&mut orchestrator, 0, 10), vec![Command::AwardGold { amount: 10 }]);
    assert_eq!(orchestrator.kill_count(), 1);

    assert!(advance(&mut orchestrator, 99).is_empty());
    assert_eq!(orchestrator.phase(), WavePhase::WaitingForClear(0));
    assert!(advance(&mut orchestrator, 1).is_empty());
    assert_eq!(orchestrator.phase(), WavePhase::InterWaveDelay(0));

    assert!(advance(&mut orchestrator, 4_999).is_empty());
    assert_eq!(orchestrator.phase(), WavePhase::InterWaveDelay(0));
    assert_eq!(advance(&mut orchestrator, 1), vec![spawn_scavenger()]);
    assert_eq!(orchestrator.phase(), WavePhase::Spawning(1));
    assert_eq!(orchestrator.kill_count(), 0, "counters reset between waves");

    assert_eq!(advance(&mut orchestrator, 1_000), vec![spawn_scavenger()]);
    assert_eq!(orchestrator.phase(), WavePhase::WaitingForClear(1));
}

#[test]
fn offspring_raise_the_completion_threshold() {
    let mut orchestrator = orchestrator(vec![Wave::new(0, true, 1.0, vec![EnemyKind::Nursing])]);
    let mut out = Vec::new();
    orchestrator.start(&mut out);
    out.clear();

    orchestrator.handle(
        &[
            Event::OffspringRequested {
                parent: EnemyId::new(0),
                kind: EnemyKind::Scavenger,
                count: 3,
                position: Vec2::new(2.0, 5.0),
                waypoint_index: 1,
                formation: OffspringFormation::Stacked,
            },
            Event::EnemyKilled {
                enemy: EnemyId::new(0),
                gold: 40,
            },
        ],
        &mut out,
    );

    let spawned = out
        .iter()
        .filter(|command| {
            matches!(
                command,
                Command::SpawnEnemy {
                    kind: EnemyKind::Scavenger,
                    waypoint_index: 1,
                    ..
                }
            )
        })
        .count();
    assert_eq!(spawned, 3);
    assert_eq!(orchestrator.completion_threshold(), 4);

    let _ = advance(&mut orchestrator, 200);
    assert_eq!(orchestrator.phase(), WavePhase::WaitingForClear(0));

    for enemy in 1..=3 {
        let _ = kill(&mut orchestrator, enemy, 10);
    }
    let _ = advance(&mut orchestrator, 100);
    assert_eq!(orchestrator.phase(), WavePhase::Victory);
    assert_eq!(orchestrator.pending_timers(), 0);
}

#[test]
fn every_kill_restarts_the_completion_check() {
    let mut orchestrator = orchestrator(vec![Wave::new(
        0,
        false,
        10.0,
        vec![EnemyKind::Scavenger, EnemyKind::Scavenger],
    )]);
    let mut out = Vec::new();
    orchestrator.start(&mut out);
    assert_eq!(advance(&mut orchestrator, 100), vec![spawn_scavenger()]);

    let _ = kill(&mut orchestrator, 0, 10);
    let _ = advance(&mut orchestrator, 50);
    let _ = kill(&mut orchestrator, 1, 10);
    let _ = advance(&mut orchestrator, 99);
    assert_eq!(orchestrator.phase(), WavePhase::WaitingForClear(0));

    let _ = advance(&mut orchestrator, 1);
    assert_eq!(orchestrator.phase(), WavePhase::Victory);
}

#[test]
fn base_destruction_is_terminal_and_cancels_timers() {
    let mut orchestrator = orchestrator(vec![Wave::new(
        0,
        false,
        1.0,
        vec![EnemyKind::Scavenger; 5],
    )]);
    let mut out = Vec::new();
    orchestrator.start(&mut out);
    out.clear();

    orchestrator.handle(&[Event::BaseDestroyed], &mut out);
    assert_eq!(orchestrator.phase(), WavePhase::Defeat);
    assert_eq!(orchestrator.pending_timers(), 0);

    assert!(advance(&mut orchestrator, 10_000).is_empty());
    orchestrator.handle(
        &[Event::EnemyReachedBase {
            enemy: EnemyId::new(0),
            damage: 5,
        }],
        &mut out,
    );
    assert!(out.is_empty());
}

#[test]
fn dispose_cancels_the_inter_wave_delay() {
    let mut orchestrator = orchestrator(vec![
        Wave::new(0, false, 1.0, vec![EnemyKind::Scavenger]),
        Wave::new(1, false, 1.0, vec![EnemyKind::Scavenger]),
    ]);
    let mut out = Vec::new();
    orchestrator.start(&mut out);
    let _ = kill(&mut orchestrator, 0, 10);
    let _ = advance(&mut orchestrator, 100);
    assert_eq!(orchestrator.phase(), WavePhase::InterWaveDelay(0));
    assert_eq!(orchestrator.pending_timers(), 1);

    orchestrator.dispose();
    orchestrator.dispose();

    assert_eq!(orchestrator.pending_timers(), 0);
    assert_eq!(orchestrator.phase(), WavePhase::Idle);
    assert!(advance(&mut orchestrator, 10_000).is_empty());
}

struct Session {
    world: World,
    orchestrator: WaveOrchestrator,
    events: Vec<Event>,
}

impl Session {
    fn new(waves: Vec<Wave>) -> Self {
        Self::with_catalogue(waves, Catalogue::default())
    }

    fn with_catalogue(waves: Vec<Wave>, catalogue: Catalogue) -> Self {
        let world = World::new(
            world::Config::new(vec![Vec2::new(0.0, 5.0), Vec2::new(8.0, 5.0)], SPAWN_POINT)
                .with_seed(11)
                .with_catalogue(catalogue),
        );
        Self {
            world,
            orchestrator: orchestrator(waves),
            events: Vec::new(),
        }
    }

    /// Applies `commands` and routes the resulting events back through the
    /// orchestrator until nothing new is produced.
    fn settle(&mut self, mut commands: Vec<Command>) {
        while !commands.is_empty() {
            let mut events = Vec::new();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.orchestrator.handle(&events, &mut commands);
            self.events.extend(events);
        }
    }

    fn start(&mut self) {
        let mut commands = Vec::new();
        self.orchestrator.start(&mut commands);
        self.settle(commands);
    }

    fn tick(&mut self, millis: u64) {
        self.settle(vec![Command::Tick {
            dt: Duration::from_millis(millis),
        }]);
    }

    fn offspring_requests(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, Event::OffspringRequested { .. }))
            .count()
    }

    fn strike_everything_alive(&mut self) {
        let targets: Vec<Vec2> = query::enemy_view(&self.world)
            .iter()
            .filter(|enemy| enemy.is_alive())
            .map(|enemy| enemy.position)
            .collect();
        self.settle(
            targets
                .into_iter()
                .map(|position| Command::StrikeAt { position })
                .collect(),
        );
    }
}

#[test]
fn nursing_offspring_must_die_before_the_session_is_won() {
    let mut session = Session::new(vec![Wave::new(0, true, 1.0, vec![EnemyKind::Nursing])]);
    session.start();

    let mut rounds = 0;
    while session.orchestrator.additional_spawned() == 0 {
        session.strike_everything_alive();
        rounds += 1;
        assert!(rounds < 100, "nursing never died");
    }

    let offspring = session.orchestrator.additional_spawned();
    assert!((2..=4).contains(&offspring), "offspring count {offspring}");
    assert_eq!(session.orchestrator.completion_threshold(), 1 + offspring);

    session.tick(100);
    assert_eq!(session.orchestrator.phase(), WavePhase::WaitingForClear(0));

    while query::enemy_view(&session.world)
        .iter()
        .any(|enemy| enemy.is_alive())
    {
        session.strike_everything_alive();
        rounds += 1;
        assert!(rounds < 200, "offspring never died");
    }
    session.tick(100);

    assert_eq!(session.orchestrator.phase(), WavePhase::Victory);
    assert_eq!(session.orchestrator.kill_count(), 1 + offspring);
    assert_eq!(query::gold(&session.world), 500 + 40 + 10 * offspring as u32);
    assert_eq!(
        session.offspring_requests(),
        1,
        "nursing spawns exactly once"
    );
}

/// Brood commander that spawns two sturdy minions every 1.5 s and dies to one strike.
fn brood_session() -> Session {
    let alpha = AlphaConfig {
        min_alpha_time: 1.0,
        max_alpha_time: 1.0,
        pause_time: 0.5,
        min_spawn_count: 2,
        max_spawn_count: 2,
        offspring: EnemyKind::Scavenger,
    };
    let overrides = CatalogueOverrides {
        enemies: [
            (
                "brood_commander".to_owned(),
                EnemyStats {
                    health: 5,
                    gold: 80,
                    ability: Some(AbilityConfig::Alpha(alpha)),
                    ..EnemyStats::default()
                },
            ),
            (
                "scavenger".to_owned(),
                EnemyStats {
                    health: 1_000,
                    ..EnemyStats::default()
                },
            ),
        ]
        .into_iter()
        .collect(),
        ..CatalogueOverrides::default()
    };
    let catalogue = Catalogue::default()
        .with_overrides(overrides)
        .expect("overrides apply");
    Session::with_catalogue(
        vec![Wave::new(0, true, 1.0, vec![EnemyKind::BroodCommander])],
        catalogue,
    )
}

#[test]
fn brood_commander_minions_hold_the_wave_open_until_it_dies() {
    let mut session = brood_session();
    session.start();
    let commander = query::enemy_view(&session.world)
        .iter()
        .find(|enemy| enemy.kind == EnemyKind::BroodCommander)
        .map(|enemy| enemy.position)
        .expect("commander spawned");
    assert_eq!(commander, query::spawn_point(&session.world));

    session.tick(1_600);
    assert_eq!(session.orchestrator.additional_spawned(), 2);
    assert_eq!(session.offspring_requests(), 1);
    assert_eq!(query::enemy_count(&session.world), 3);
    let stacked = query::enemy_view(&session.world)
        .iter()
        .filter(|enemy| enemy.kind == EnemyKind::Scavenger)
        .all(|enemy| enemy.position == commander && enemy.waypoint_index == 0);
    assert!(stacked, "minions appear on the commander");

    session.settle(vec![Command::StrikeAt {
        position: commander,
    }]);
    session.tick(100);
    assert_eq!(session.orchestrator.kill_count(), 1);
    assert_eq!(session.orchestrator.completion_threshold(), 3);
    assert_eq!(session.orchestrator.phase(), WavePhase::WaitingForClear(0));
    assert_eq!(query::gold(&session.world), 500 + 80);

    for _ in 0..50 {
        session.tick(200);
    }
    assert_eq!(session.orchestrator.additional_spawned(), 2);
    assert_eq!(session.offspring_requests(), 1, "a slain commander spawns nothing");
    assert_eq!(query::enemy_count(&session.world), 2);
    assert_eq!(query::pending_ability_timers(&session.world), 0);
    assert_eq!(session.orchestrator.phase(), WavePhase::WaitingForClear(0));
}
