use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use wave_defence_core::{Command, EnemyKind, Event, Vec2};
use wave_defence_system_movement::Movement;
use wave_defence_world::{self as world, query, Config, World};

#[test]
fn deterministic_replay_produces_identical_outcomes() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(
        first
            .events
            .iter()
            .any(|event| matches!(event, EventRecord::ReachedBase { .. })),
        "scripted run should bring at least one enemy home"
    );
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new(
        Config::new(
            vec![
                Vec2::new(0.0, 5.0),
                Vec2::new(2.0, 5.0),
                Vec2::new(2.0, 2.0),
                Vec2::new(7.0, 2.0),
            ],
            Vec2::new(-5.0, 5.0),
        )
        .with_seed(99),
    );
    let mut movement = Movement::default();
    let mut log = Vec::new();

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        record_events(&events, &mut log);

        let mut moves = Vec::new();
        movement.handle(&events, &query::enemy_view(&world), &mut moves);
        for command in moves {
            let mut generated = Vec::new();
            world::apply(&mut world, command, &mut generated);
            record_events(&generated, &mut log);
        }
    }

    let enemies = query::enemy_view(&world)
        .into_vec()
        .into_iter()
        .map(|snapshot| EnemyState {
            id: snapshot.id.get(),
            x_micros: (snapshot.position.x * 1_000_000.0) as i64,
            y_micros: (snapshot.position.y * 1_000_000.0) as i64,
            waypoint_index: snapshot.waypoint_index,
        })
        .collect();

    ReplayOutcome {
        enemies,
        events: log,
    }
}

fn record_events(events: &[Event], log: &mut Vec<EventRecord>) {
    log.extend(events.iter().filter_map(EventRecord::from_event));
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = Vec::new();
    for kind in [EnemyKind::Scavenger, EnemyKind::Hunter, EnemyKind::Stalker] {
        commands.push(Command::SpawnEnemy {
            kind,
            position: Vec2::new(-5.0, 5.0),
            waypoint_index: 0,
        });
        for _ in 0..15 {
            commands.push(Command::Tick {
                dt: Duration::from_millis(100),
            });
        }
    }
    for _ in 0..150 {
        commands.push(Command::Tick {
            dt: Duration::from_millis(100),
        });
    }
    commands
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    enemies: Vec<EnemyState>,
    events: Vec<EventRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct EnemyState {
    id: u32,
    x_micros: i64,
    y_micros: i64,
    waypoint_index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    Spawned { enemy: u32 },
    Waypoint { enemy: u32, index: usize },
    ReachedBase { enemy: u32, damage: u32 },
    Cloak { enemy: u32, cloaked: bool },
}

impl EventRecord {
    fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::EnemySpawned { enemy, .. } => Some(Self::Spawned { enemy: enemy.get() }),
            Event::WaypointReached {
                enemy,
                waypoint_index,
            } => Some(Self::Waypoint {
                enemy: enemy.get(),
                index: *waypoint_index,
            }),
            Event::EnemyReachedBase { enemy, damage } => Some(Self::ReachedBase {
                enemy: enemy.get(),
                damage: *damage,
            }),
            Event::CloakChanged { enemy, cloaked } => Some(Self::Cloak {
                enemy: enemy.get(),
                cloaked: *cloaked,
            }),
            _ => None,
        }
    }
}
