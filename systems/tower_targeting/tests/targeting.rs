use std::time::Duration;

use wave_defence_core::{
    Command, EnemyId, EnemyKind, Event, GridCell, TargetingStrategy, TowerId, TowerKind, Vec2,
};
use wave_defence_system_tower_combat::TowerCombat;
use wave_defence_system_tower_targeting::TowerTargeting;
use wave_defence_world::{self as world, query, Config, World};

struct Harness {
    world: World,
    targeting: TowerTargeting,
    combat: TowerCombat,
}

impl Harness {
    fn new() -> Self {
        let world = World::new(Config::new(
            vec![Vec2::new(0.0, 9.0), Vec2::new(10.0, 9.0)],
            Vec2::new(-5.0, 9.0),
        ));
        Self {
            world,
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
        }
    }

    fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        events
    }

    fn place(&mut self, cell: GridCell) -> TowerId {
        let _ = self.apply(Command::SetBuildMode { enabled: true });
        self.apply(Command::PlaceTower {
            kind: TowerKind::MachineGun,
            cell,
        })
        .iter()
        .find_map(|event| match event {
            Event::TowerPlaced { tower, .. } => Some(*tower),
            _ => None,
        })
        .expect("tower placed")
    }

    fn spawn(&mut self, position: Vec2) -> EnemyId {
        match self
            .apply(Command::SpawnEnemy {
                kind: EnemyKind::Scavenger,
                position,
                waypoint_index: 0,
            })
            .first()
        {
            Some(Event::EnemySpawned { enemy, .. }) => *enemy,
            other => panic!("unexpected spawn events {other:?}"),
        }
    }

    fn resolve_fire(&mut self) -> Vec<Event> {
        let towers = query::tower_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        let mut targets = Vec::new();
        self.targeting.handle(&towers, &enemies, &mut targets);

        let mut commands = Vec::new();
        self.combat.handle(&towers, &targets, &mut commands);

        let mut events = Vec::new();
        for command in commands {
            events.extend(self.apply(command));
        }
        events
    }

    fn frame(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = self.apply(Command::Tick { dt });
        events.extend(self.resolve_fire());
        events
    }
}

fn fired_at(events: &[Event]) -> Vec<EnemyId> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TowerFired { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .collect()
}

#[test]
fn closest_target_dies_then_tower_switches_without_stale_reference() {
    let mut harness = Harness::new();
    let tower = harness.place(GridCell::new(0, 0));
    let far = harness.spawn(Vec2::new(3.0, 0.0));
    let near = harness.spawn(Vec2::new(0.0, 2.0));

    let mut shots = Vec::new();
    let mut removed = Vec::new();
    for _ in 0..20 {
        let events = harness.frame(Duration::from_millis(200));
        shots.extend(fired_at(&events));
        removed.extend(events.iter().filter_map(|event| match event {
            Event::EnemyRemoved { enemy } => Some(*enemy),
            _ => None,
        }));
    }

    assert_eq!(&shots[..6], &[near; 6], "the closer enemy dies first");
    assert_eq!(&shots[6..12], &[far; 6], "the survivor is acquired next");
    assert_eq!(shots.len(), 12, "nothing left to shoot");
    assert_eq!(removed, vec![near, far]);
    assert_eq!(
        query::tower_view(&harness.world)
            .get(tower)
            .expect("tower exists")
            .current_target,
        None,
        "the dead target reference is cleared"
    );
}

#[test]
fn switching_strategy_changes_the_pick() {
    let mut harness = Harness::new();
    let tower = harness.place(GridCell::new(0, 0));
    let _near = harness.spawn(Vec2::new(0.0, 1.0));
    let far = harness.spawn(Vec2::new(0.0, 3.0));
    let _ = harness.apply(Command::StrikeAt {
        position: Vec2::new(0.0, 3.0),
    });

    let _ = harness.apply(Command::SetTargetingStrategy {
        tower,
        strategy: TargetingStrategy::Weakest,
    });
    let events = harness.resolve_fire();

    assert_eq!(fired_at(&events), vec![far]);
}

#[test]
fn cloaked_targets_absorb_shots_and_still_cost_the_cooldown() {
    let mut harness = Harness::new();
    let tower = harness.place(GridCell::new(0, 0));
    let stalker = match harness
        .apply(Command::SpawnEnemy {
            kind: EnemyKind::Stalker,
            position: Vec2::new(1.0, 0.0),
            waypoint_index: 0,
        })
        .first()
    {
        Some(Event::EnemySpawned { enemy, .. }) => *enemy,
        other => panic!("unexpected spawn events {other:?}"),
    };

    let events = harness.resolve_fire();

    assert!(events.contains(&Event::TowerFired {
        tower,
        enemy: stalker,
        damage: 0,
    }));
    assert!(!query::tower_view(&harness.world)
        .get(tower)
        .expect("tower exists")
        .ready_in
        .is_zero());
}
