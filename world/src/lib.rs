#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Wave Defence.
//!
//! The world owns every enemy, tower, and economy value. It changes only
//! through [`apply`] and is observed through the [`query`] module. Dead
//! enemies stay in the live set with zero health until the start of the next
//! tick, so systems iterating a frame's snapshot never see an entity vanish
//! mid-frame.

mod enemies;
mod navigation;
mod towers;

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    time::Duration,
};

use tracing::{debug, info};
use wave_defence_core::{
    Catalogue, CombatStats, Command, EnemyId, EnemyKind, Event, GridCell, PlacementError,
    Position, TargetingStrategy, TowerActionError, TowerId, TowerKind,
};
use wave_defence_system_abilities::AbilitySignal;

use enemies::Enemy;
use navigation::{Path, WaypointTracker};
use towers::TowerRegistry;

/// Distance under which an enemy counts as standing on its waypoint.
const ARRIVAL_EPSILON: f32 = 1e-3;

/// Attacker profile used when the player clicks an enemy.
const PLAYER_STRIKE: CombatStats = CombatStats::new(100, 10, 0);

const DEFAULT_BASE_HEALTH: u32 = 100;
const DEFAULT_STARTING_GOLD: u32 = 500;

/// Configuration parameters required to construct the world.
#[derive(Clone, Debug)]
pub struct Config {
    waypoints: Vec<Position>,
    spawn_point: Position,
    base_health: u32,
    starting_gold: u32,
    seed: u64,
    catalogue: Catalogue,
}

impl Config {
    /// Creates a configuration for the provided path and spawn point.
    ///
    /// The base starts with 100 health, the player with 500 gold, and the
    /// catalogue with the built-in stat blocks.
    #[must_use]
    pub fn new(waypoints: Vec<Position>, spawn_point: Position) -> Self {
        Self {
            waypoints,
            spawn_point,
            base_health: DEFAULT_BASE_HEALTH,
            starting_gold: DEFAULT_STARTING_GOLD,
            seed: 0,
            catalogue: Catalogue::default(),
        }
    }

    /// Overrides the starting health of the base.
    #[must_use]
    pub fn with_base_health(mut self, base_health: u32) -> Self {
        self.base_health = base_health;
        self
    }

    /// Overrides the player's starting gold.
    #[must_use]
    pub fn with_starting_gold(mut self, starting_gold: u32) -> Self {
        self.starting_gold = starting_gold;
        self
    }

    /// Overrides the seed that drives ability randomness.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Overrides the stat catalogue.
    #[must_use]
    pub fn with_catalogue(mut self, catalogue: Catalogue) -> Self {
        self.catalogue = catalogue;
        self
    }
}

/// Represents the authoritative Wave Defence world state.
#[derive(Debug)]
pub struct World {
    path: Path,
    path_cells: BTreeSet<GridCell>,
    spawn_point: Position,
    catalogue: Catalogue,
    seed: u64,
    enemies: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: EnemyId,
    pending_removals: VecDeque<EnemyId>,
    towers: TowerRegistry,
    base: CombatStats,
    base_destroyed: bool,
    gold: u32,
    build_mode: bool,
    selected_tower_kind: TowerKind,
    selected_tower: Option<TowerId>,
    tick_index: u64,
    signals: Vec<AbilitySignal>,
}

impl World {
    /// Creates a new world ready for simulation.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let path = Path::new(config.waypoints);
        let path_cells = path.cells().into_iter().collect();
        Self {
            path,
            path_cells,
            spawn_point: config.spawn_point,
            catalogue: config.catalogue,
            seed: config.seed,
            enemies: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
            pending_removals: VecDeque::new(),
            towers: TowerRegistry::new(),
            base: CombatStats::new(config.base_health, 0, 0),
            base_destroyed: false,
            gold: config.starting_gold,
            build_mode: false,
            selected_tower_kind: TowerKind::MachineGun,
            selected_tower: None,
            tick_index: 0,
            signals: Vec::new(),
        }
    }

    fn is_occupied(&self, cell: GridCell) -> bool {
        self.path_cells.contains(&cell) || self.towers.at(cell).is_some()
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        id
    }

    fn spawn_enemy(
        &mut self,
        kind: EnemyKind,
        position: Position,
        waypoint_index: usize,
        out_events: &mut Vec<Event>,
    ) {
        let id = self.allocate_enemy_id();
        let stats = self.catalogue.enemy(kind);
        let tracker = WaypointTracker::starting_at(self.path.clone(), waypoint_index);
        let mut enemy = Enemy::new(id, kind, &stats, tracker, position, self.seed);

        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            position,
            waypoint_index: enemy.tracker.index(),
        });

        if enemy.tracker.current_waypoint().is_none() {
            enemy.tracker.finish();
            out_events.push(Event::EnemyReachedBase {
                enemy: id,
                damage: enemy.base_damage(),
            });
        }

        let _ = self.enemies.insert(id, enemy);
    }

    fn drain_removals(&mut self, out_events: &mut Vec<Event>) {
        while let Some(id) = self.pending_removals.pop_front() {
            let Some(mut enemy) = self.enemies.remove(&id) else {
                continue;
            };
            enemy.ability.dispose();
            out_events.push(Event::EnemyRemoved { enemy: id });
        }
    }

    fn tick_abilities(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for enemy in self.enemies.values_mut() {
            if !enemy.is_alive() {
                continue;
            }
            let context = enemy.ability_context();
            enemy.ability.tick(dt, context, &mut self.signals);
            forward_signals(enemy.id, &mut self.signals, out_events);
        }
    }

    fn move_enemy(&mut self, id: EnemyId, position: Position, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.enemies.get_mut(&id) else {
            return;
        };
        if !enemy.is_alive() || enemy.tracker.is_finished() {
            return;
        }

        enemy.position = position;
        let Some(waypoint) = enemy.tracker.current_waypoint() else {
            return;
        };
        if position.distance(waypoint) > ARRIVAL_EPSILON {
            return;
        }

        if enemy.tracker.advance() {
            out_events.push(Event::WaypointReached {
                enemy: id,
                waypoint_index: enemy.tracker.index(),
            });
        } else {
            out_events.push(Event::EnemyReachedBase {
                enemy: id,
                damage: enemy.base_damage(),
            });
        }
    }

    /// Applies `attacker` to an enemy and reports the damage dealt.
    ///
    /// Returns `None` when the enemy is missing or already dead, and
    /// `Some(0)` when its ability absorbed the hit.
    fn strike_enemy(
        &mut self,
        id: EnemyId,
        attacker: &CombatStats,
        out_events: &mut Vec<Event>,
    ) -> Option<u32> {
        let enemy = self.enemies.get_mut(&id)?;
        if !enemy.is_alive() {
            return None;
        }

        let invulnerable = enemy.ability.is_invulnerable();
        let Some(damage) = enemy.stats.hit(attacker, invulnerable) else {
            return Some(0);
        };

        let health = enemy.stats.health();
        out_events.push(Event::EnemyHealthChanged { enemy: id, health });

        let context = enemy.ability_context();
        enemy
            .ability
            .on_health_changed(health, context, &mut self.signals);
        forward_signals(id, &mut self.signals, out_events);

        if enemy.stats.is_dead() && enemy.mark_killed() {
            out_events.push(Event::EnemyKilled {
                enemy: id,
                gold: enemy.gold(),
            });
            self.pending_removals.push_back(id);
        }

        Some(damage)
    }

    fn fire_tower(&mut self, tower: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        let Some(state) = self.towers.get(tower) else {
            return;
        };
        if !state.is_ready() {
            debug!(tower = tower.get(), "tower fired while cooling down, ignored");
            return;
        }
        let Some(enemy) = self.enemies.get(&target) else {
            return;
        };
        let origin = state.cell.to_position();
        if !enemy.is_alive() || !state.in_range(origin.distance_squared(enemy.position)) {
            return;
        }

        let attack = state.attack;
        let Some(damage) = self.strike_enemy(target, &attack, out_events) else {
            return;
        };
        if let Some(state) = self.towers.get_mut(tower) {
            state.reset_cooldown();
            state.current_target = Some(target);
        }
        out_events.push(Event::TowerFired {
            tower,
            enemy: target,
            damage,
        });
    }

    fn strike_at(&mut self, position: Position, out_events: &mut Vec<Event>) {
        let struck: Vec<EnemyId> = self
            .enemies
            .values()
            .filter(|enemy| enemy.is_alive() && enemy.covers(position))
            .map(|enemy| enemy.id)
            .collect();
        for id in struck {
            let _ = self.strike_enemy(id, &PLAYER_STRIKE, out_events);
        }
    }

    fn damage_base(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        if self.base_destroyed {
            return;
        }
        let health = self.base.add_health(-i64::from(amount));
        out_events.push(Event::BaseHealthChanged { health });
        if self.base.is_dead() {
            self.base_destroyed = true;
            info!("base destroyed");
            out_events.push(Event::BaseDestroyed);
        }
    }

    fn set_gold(&mut self, gold: u32, out_events: &mut Vec<Event>) {
        self.gold = gold;
        out_events.push(Event::GoldChanged { gold });
    }

    fn set_build_mode(&mut self, enabled: bool, out_events: &mut Vec<Event>) {
        self.build_mode = enabled;
        out_events.push(Event::BuildModeChanged { enabled });
    }

    fn place_tower(&mut self, kind: TowerKind, cell: GridCell, out_events: &mut Vec<Event>) {
        let stats = self.catalogue.tower(kind);
        let rejection = if !self.build_mode {
            Some(PlacementError::BuildModeDisabled)
        } else if self.is_occupied(cell) {
            Some(PlacementError::Occupied)
        } else if self.gold < stats.cost {
            Some(PlacementError::InsufficientGold)
        } else {
            None
        };

        if let Some(reason) = rejection {
            debug!(?kind, ?cell, ?reason, "tower placement rejected");
            out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
            return;
        }

        let tower = self.towers.insert(kind, cell, &stats);
        out_events.push(Event::TowerPlaced { tower, kind, cell });
        self.set_gold(self.gold - stats.cost, out_events);
        self.set_build_mode(false, out_events);
    }

    fn reject_tower_action(
        &self,
        tower: TowerId,
        reason: TowerActionError,
        out_events: &mut Vec<Event>,
    ) {
        debug!(tower = tower.get(), ?reason, "tower action rejected");
        out_events.push(Event::TowerActionRejected { tower, reason });
    }

    fn upgrade_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let Some(state) = self.towers.get(tower) else {
            self.reject_tower_action(tower, TowerActionError::MissingTower, out_events);
            return;
        };
        let cost = state.upgrade_cost();
        if self.gold < cost {
            self.reject_tower_action(tower, TowerActionError::InsufficientGold, out_events);
            return;
        }

        let Some(state) = self.towers.get_mut(tower) else {
            return;
        };
        state.level = state.level.saturating_add(1);
        let level = state.level;
        out_events.push(Event::TowerUpgraded { tower, level });
        self.set_gold(self.gold - cost, out_events);
    }

    fn sell_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let Some(state) = self.towers.remove(tower) else {
            self.reject_tower_action(tower, TowerActionError::MissingTower, out_events);
            return;
        };
        let refund = state.sell_value();
        if self.selected_tower == Some(tower) {
            self.selected_tower = None;
            out_events.push(Event::TowerDeselected);
        }
        out_events.push(Event::TowerSold { tower, refund });
        self.set_gold(self.gold.saturating_add(refund), out_events);
    }
}

fn forward_signals(enemy: EnemyId, signals: &mut Vec<AbilitySignal>, out_events: &mut Vec<Event>) {
    for signal in signals.drain(..) {
        match signal {
            AbilitySignal::SpawnOffspring {
                kind,
                count,
                position,
                waypoint_index,
                formation,
            } => out_events.push(Event::OffspringRequested {
                parent: enemy,
                kind,
                count,
                position,
                waypoint_index,
                formation,
            }),
            AbilitySignal::CloakChanged { cloaked } => {
                out_events.push(Event::CloakChanged { enemy, cloaked });
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.drain_removals(out_events);
            world.towers.advance_cooldowns(dt);
            world.tick_abilities(dt, out_events);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnEnemy {
            kind,
            position,
            waypoint_index,
        } => world.spawn_enemy(kind, position, waypoint_index, out_events),
        Command::MoveEnemy { enemy, position } => world.move_enemy(enemy, position, out_events),
        Command::StrikeAt { position } => world.strike_at(position, out_events),
        Command::DamageBase { amount } => world.damage_base(amount, out_events),
        Command::AwardGold { amount } => {
            let gold = world.gold.saturating_add(amount);
            world.set_gold(gold, out_events);
        }
        Command::SetBuildMode { enabled } => world.set_build_mode(enabled, out_events),
        Command::SelectTowerType { kind } => {
            world.selected_tower_kind = kind;
            out_events.push(Event::TowerTypeSelected { kind });
        }
        Command::PlaceTower { kind, cell } => world.place_tower(kind, cell, out_events),
        Command::SelectTower { tower } => {
            if world.towers.get(tower).is_some() {
                world.selected_tower = Some(tower);
                out_events.push(Event::TowerClicked { tower });
            } else {
                world.reject_tower_action(tower, TowerActionError::MissingTower, out_events);
            }
        }
        Command::DeselectTower => {
            world.selected_tower = None;
            out_events.push(Event::TowerDeselected);
        }
        Command::UpgradeTower { tower } => world.upgrade_tower(tower, out_events),
        Command::SellTower { tower } => world.sell_tower(tower, out_events),
        Command::SetTargetingStrategy { tower, strategy } => {
            if let Some(state) = world.towers.get_mut(tower) {
                state.strategy = strategy;
                out_events.push(Event::TargetingStrategyChanged { tower, strategy });
            } else {
                world.reject_tower_action(tower, TowerActionError::MissingTower, out_events);
            }
        }
        Command::AssignTarget { tower, target } => {
            if let Some(state) = world.towers.get_mut(tower) {
                state.current_target = target;
            }
        }
        Command::FireAt { tower, enemy } => world.fire_tower(tower, enemy, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use wave_defence_core::{
        EnemyId, EnemyView, GridCell, Position, TargetingStrategy, TowerId, TowerKind, TowerView,
    };

    use super::World;

    /// Captures a read-only view of every enemy in the live set, dead ones included.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.values().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures a read-only view of every placed tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Waypoints every enemy walks, in visiting order.
    #[must_use]
    pub fn waypoints(world: &World) -> &[Position] {
        world.path.waypoints()
    }

    /// Position new wave enemies appear at.
    #[must_use]
    pub fn spawn_point(world: &World) -> Position {
        world.spawn_point
    }

    /// Number of enemies in the live set, including those awaiting removal.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Enemies slain this frame that leave the live set on the next tick.
    #[must_use]
    pub fn pending_removals(world: &World) -> Vec<EnemyId> {
        world.pending_removals.iter().copied().collect()
    }

    /// Number of ability timers still scheduled across all enemies.
    #[must_use]
    pub fn pending_ability_timers(world: &World) -> usize {
        world
            .enemies
            .values()
            .map(|enemy| enemy.ability.pending_timers())
            .sum()
    }

    /// Current health of the player's base.
    #[must_use]
    pub fn base_health(world: &World) -> u32 {
        world.base.health()
    }

    /// Gold held by the player.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.gold
    }

    /// Reports whether build mode is active.
    #[must_use]
    pub fn build_mode(world: &World) -> bool {
        world.build_mode
    }

    /// Tower type used by the next placement.
    #[must_use]
    pub fn selected_tower_kind(world: &World) -> TowerKind {
        world.selected_tower_kind
    }

    /// Tower currently selected for upgrade or sale.
    #[must_use]
    pub fn selected_tower(world: &World) -> Option<TowerId> {
        world.selected_tower
    }

    /// Reports whether a tower may not be placed on `cell`.
    #[must_use]
    pub fn is_occupied(world: &World, cell: GridCell) -> bool {
        world.is_occupied(cell)
    }

    /// Tower standing on `cell`, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: GridCell) -> Option<TowerId> {
        world.towers.at(cell)
    }

    /// Gold refunded if `tower` were sold now.
    #[must_use]
    pub fn sell_value(world: &World, tower: TowerId) -> Option<u32> {
        world.towers.get(tower).map(|state| state.sell_value())
    }

    /// Gold required to upgrade `tower` by one level.
    #[must_use]
    pub fn upgrade_cost(world: &World, tower: TowerId) -> Option<u32> {
        world.towers.get(tower).map(|state| state.upgrade_cost())
    }

    /// Targeting rule used by `tower`.
    #[must_use]
    pub fn targeting_strategy(world: &World, tower: TowerId) -> Option<TargetingStrategy> {
        world.towers.get(tower).map(|state| state.strategy)
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
