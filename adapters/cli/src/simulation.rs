//! Headless frame driver wiring the world to every system.

use std::time::Duration;

use tracing::{debug, warn};
use wave_defence_core::{Command, Event, TowerTarget};
use wave_defence_system_builder::{Builder, BuilderInput};
use wave_defence_system_movement::Movement;
use wave_defence_system_tower_combat::TowerCombat;
use wave_defence_system_tower_targeting::TowerTargeting;
use wave_defence_system_waves::{self as waves, WaveOrchestrator, WavePhase};
use wave_defence_world::{self as world, query, World};

use crate::level::{Level, TowerPlacement};

/// Totals collected while a level runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) frames: u64,
    pub(crate) spawned: usize,
    pub(crate) killed: usize,
    pub(crate) shots: usize,
    pub(crate) towers: usize,
}

/// Owns the world and systems and advances them frame by frame.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    waves: WaveOrchestrator,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    builder: Builder,
    events: Vec<Event>,
    tower_targets: Vec<TowerTarget>,
    summary: Summary,
}

impl Simulation {
    /// Builds the world and wave list described by `level`.
    pub(crate) fn new(level: &Level) -> Self {
        let config = world::Config::new(level.waypoints.clone(), level.spawn_point)
            .with_base_health(level.base_health)
            .with_starting_gold(level.starting_gold)
            .with_seed(level.seed)
            .with_catalogue(level.catalogue.clone());
        let world = World::new(config);
        let waves = WaveOrchestrator::new(waves::Config::new(
            level.waves.clone(),
            query::spawn_point(&world),
        ));

        Self {
            world,
            waves,
            movement: Movement::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            builder: Builder::new(),
            events: Vec::new(),
            tower_targets: Vec::new(),
            summary: Summary::default(),
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn phase(&self) -> WavePhase {
        self.waves.phase()
    }

    pub(crate) fn summary(&self) -> Summary {
        self.summary
    }

    pub(crate) fn wave_count(&self) -> usize {
        self.waves.wave_count()
    }

    /// One line per placed tower, in placement order.
    pub(crate) fn roster(&self) -> Vec<String> {
        query::tower_view(&self.world)
            .iter()
            .map(|tower| {
                format!(
                    "{} (level {}) at {},{}",
                    tower.kind.display_name(),
                    tower.level,
                    tower.cell.column(),
                    tower.cell.row()
                )
            })
            .collect()
    }

    /// Places the level's towers and releases the first wave.
    pub(crate) fn start(&mut self, towers: &[TowerPlacement]) {
        for placement in towers {
            self.place_tower(placement);
        }
        let mut commands = Vec::new();
        self.waves.start(&mut commands);
        self.dispatch(commands);
    }

    /// Runs frames of length `dt` until the session ends or `max_frames` elapse.
    ///
    /// Returns the phase the orchestrator stopped in.
    pub(crate) fn run(&mut self, dt: Duration, max_frames: u64) -> WavePhase {
        while !self.phase().is_terminal() && self.summary.frames < max_frames {
            self.step(dt);
        }
        let phase = self.phase();
        if !phase.is_terminal() {
            warn!(max_frames, ?phase, "frame limit reached");
        }
        phase
    }

    /// Advances the simulation by one frame.
    pub(crate) fn step(&mut self, dt: Duration) {
        self.summary.frames += 1;
        self.events.clear();
        self.dispatch(vec![Command::Tick { dt }]);
        let frame_events = std::mem::take(&mut self.events);

        let mut commands = Vec::new();
        let enemies = query::enemy_view(&self.world);
        self.movement.handle(&frame_events, &enemies, &mut commands);
        self.dispatch(commands);

        let towers = query::tower_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.targeting
            .handle(&towers, &enemies, &mut self.tower_targets);
        let mut commands = Vec::new();
        self.combat
            .handle(&towers, &self.tower_targets, &mut commands);
        self.dispatch(commands);
    }

    /// Drives the builder the way a player would: pick the type, enter build
    /// mode, click the cell, then select the tower to set its strategy.
    fn place_tower(&mut self, placement: &TowerPlacement) {
        self.builder_round(BuilderInput {
            select_tower_type: Some(placement.kind),
            toggle_build_mode: !self.builder.build_mode(),
            click: Some(placement.cell),
            ..BuilderInput::default()
        });
        let placed = self
            .events
            .iter()
            .any(|event| matches!(event, Event::TowerPlaced { .. }));
        if !placed {
            warn!(kind = ?placement.kind, cell = ?placement.cell, "tower could not be placed");
            return;
        }
        self.summary.towers += 1;

        self.builder_round(BuilderInput {
            click: Some(placement.cell),
            ..BuilderInput::default()
        });
        self.builder_round(BuilderInput {
            strategy: Some(placement.strategy),
            ..BuilderInput::default()
        });
    }

    fn builder_round(&mut self, input: BuilderInput) {
        let events = std::mem::take(&mut self.events);
        let mut commands = Vec::new();
        let world = &self.world;
        self.builder.handle(
            &events,
            input,
            |cell| query::tower_at(world, cell),
            &mut commands,
        );
        self.dispatch(commands);
    }

    /// Applies `commands` and routes every resulting event through the
    /// orchestrator until it stops answering with commands.
    fn dispatch(&mut self, mut commands: Vec<Command>) {
        let mut fresh = Vec::new();
        while !commands.is_empty() {
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut fresh);
            }
            self.waves.handle(&fresh, &mut commands);
            self.record(&fresh);
            self.events.append(&mut fresh);
        }
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemySpawned { enemy, kind, .. } => {
                    self.summary.spawned += 1;
                    debug!(enemy = enemy.get(), ?kind, "enemy spawned");
                }
                Event::EnemyKilled { .. } => self.summary.killed += 1,
                Event::TowerFired { .. } => self.summary.shots += 1,
                _ => {}
            }
        }
    }
}
