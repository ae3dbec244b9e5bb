//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use wave_defence_core::{
    CombatStats, EnemyId, GridCell, TargetingStrategy, TowerId, TowerKind, TowerSnapshot,
    TowerStats,
};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Cell occupied by the tower.
    pub(crate) cell: GridCell,
    /// Attacker profile applied to enemies.
    pub(crate) attack: CombatStats,
    range: f32,
    cooldown: Duration,
    cooldown_remaining: Duration,
    pub(crate) current_target: Option<EnemyId>,
    pub(crate) strategy: TargetingStrategy,
    pub(crate) level: u32,
    cost: u32,
}

impl TowerState {
    fn new(id: TowerId, kind: TowerKind, cell: GridCell, stats: &TowerStats) -> Self {
        Self {
            id,
            kind,
            cell,
            attack: stats.attack_profile(),
            range: stats.range.max(0.0),
            cooldown: stats.cooldown(),
            cooldown_remaining: Duration::ZERO,
            current_target: None,
            strategy: TargetingStrategy::default(),
            level: 1,
            cost: stats.cost,
        }
    }

    /// Reports whether the cooldown has elapsed.
    pub(crate) fn is_ready(&self) -> bool {
        self.cooldown_remaining.is_zero()
    }

    /// Reports whether `distance_squared` falls inside the attack range.
    pub(crate) fn in_range(&self, distance_squared: f32) -> bool {
        distance_squared <= self.range * self.range
    }

    /// Restarts the cooldown after a shot.
    pub(crate) fn reset_cooldown(&mut self) {
        self.cooldown_remaining = self.cooldown;
    }

    /// Gold returned when the tower is sold.
    pub(crate) fn sell_value(&self) -> u32 {
        let extra_levels = self.level.saturating_sub(1);
        self.cost / 2 + self.cost.saturating_mul(extra_levels) / 4
    }

    /// Gold required to raise the tower by one level.
    pub(crate) fn upgrade_cost(&self) -> u32 {
        self.cost.saturating_mul(self.level) / 2
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.cell.to_position(),
            attack_range: self.range,
            ready_in: self.cooldown_remaining,
            current_target: self.current_target,
            strategy: self.strategy,
            level: self.level,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    cells: BTreeMap<GridCell, TowerId>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            cells: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a new tower on `cell`, returning its identifier.
    pub(crate) fn insert(&mut self, kind: TowerKind, cell: GridCell, stats: &TowerStats) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(id, TowerState::new(id, kind, cell, stats));
        let _ = self.cells.insert(cell, id);
        id
    }

    /// Removes a tower and frees its cell.
    pub(crate) fn remove(&mut self, tower: TowerId) -> Option<TowerState> {
        let state = self.entries.remove(&tower)?;
        let _ = self.cells.remove(&state.cell);
        Some(state)
    }

    pub(crate) fn get(&self, tower: TowerId) -> Option<&TowerState> {
        self.entries.get(&tower)
    }

    pub(crate) fn get_mut(&mut self, tower: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&tower)
    }

    /// Tower standing on `cell`, if any.
    pub(crate) fn at(&self, cell: GridCell) -> Option<TowerId> {
        self.cells.get(&cell).copied()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    /// Counts every cooldown down by `dt`, saturating at zero.
    pub(crate) fn advance_cooldowns(&mut self, dt: Duration) {
        for tower in self.entries.values_mut() {
            tower.cooldown_remaining = tower.cooldown_remaining.saturating_sub(dt);
        }
    }
}
