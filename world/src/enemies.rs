//! Enemy agents living inside the world.

use wave_defence_core::{
    CombatStats, EnemyId, EnemyKind, EnemySnapshot, EnemyStats, Position,
};
use wave_defence_system_abilities::{AbilityContext, AbilityModule};

use crate::navigation::WaypointTracker;

const SEED_SPREAD: u64 = 0x9e37_79b9_7f4a_7c15;

/// Combat stats, path progress, and ability of a single enemy.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) stats: CombatStats,
    pub(crate) tracker: WaypointTracker,
    pub(crate) ability: AbilityModule,
    pub(crate) position: Position,
    base_speed: f32,
    gold: u32,
    click_radius: f32,
    killed: bool,
}

impl Enemy {
    /// Builds an enemy from its catalogue entry.
    pub(crate) fn new(
        id: EnemyId,
        kind: EnemyKind,
        config: &EnemyStats,
        tracker: WaypointTracker,
        position: Position,
        world_seed: u64,
    ) -> Self {
        let seed = world_seed ^ u64::from(id.get()).wrapping_add(1).wrapping_mul(SEED_SPREAD);
        Self {
            id,
            kind,
            stats: config.combat(),
            tracker,
            ability: AbilityModule::from_config(config.ability.as_ref(), seed),
            position,
            base_speed: config.speed.max(0.0),
            gold: config.gold,
            click_radius: config.click_radius,
            killed: false,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        !self.stats.is_dead()
    }

    /// Speed after the ability's modifier.
    pub(crate) fn effective_speed(&self) -> f32 {
        self.base_speed * self.ability.speed_multiplier()
    }

    /// Damage dealt to the base on arrival.
    pub(crate) fn base_damage(&self) -> u32 {
        self.stats.base_attack()
    }

    /// Gold reward for the kill.
    pub(crate) fn gold(&self) -> u32 {
        self.gold
    }

    /// Reports whether a click at `point` lands inside the enemy's click box.
    pub(crate) fn covers(&self, point: Position) -> bool {
        let delta = (point - self.position).abs();
        delta.x < self.click_radius && delta.y < self.click_radius
    }

    /// Marks the enemy killed, returning `true` only the first time.
    pub(crate) fn mark_killed(&mut self) -> bool {
        !std::mem::replace(&mut self.killed, true)
    }

    pub(crate) fn ability_context(&self) -> AbilityContext {
        AbilityContext {
            enemy: self.id,
            position: self.position,
            waypoint_index: self.tracker.index(),
        }
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            health: self.stats.health(),
            speed: self.effective_speed(),
            waypoint: self.tracker.current_waypoint(),
            waypoint_index: self.tracker.index(),
            cloaked: self.ability.is_invulnerable(),
        }
    }
}
