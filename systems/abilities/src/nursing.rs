//! Offspring released once when a nursing enemy dies.

use rand_chacha::ChaCha8Rng;
use tracing::info;
use wave_defence_core::{NursingConfig, OffspringFormation};

use crate::{uniform_count, AbilityContext, AbilitySignal};

/// Passive ability that requests a ring of offspring on death.
#[derive(Clone, Debug)]
pub struct Nursing {
    config: NursingConfig,
    rng: ChaCha8Rng,
    has_spawned: bool,
}

impl Nursing {
    pub(crate) fn new(config: NursingConfig, rng: ChaCha8Rng) -> Self {
        Self {
            config,
            rng,
            has_spawned: false,
        }
    }

    /// Reports whether the offspring were already requested.
    #[must_use]
    pub fn has_spawned(&self) -> bool {
        self.has_spawned
    }

    pub(crate) fn on_health_changed(
        &mut self,
        health: u32,
        context: AbilityContext,
        out: &mut Vec<AbilitySignal>,
    ) {
        if health > 0 || self.has_spawned {
            return;
        }
        self.has_spawned = true;

        let count = uniform_count(
            &mut self.rng,
            self.config.min_spawn_count,
            self.config.max_spawn_count,
        );
        info!(
            enemy = context.enemy.get(),
            count,
            waypoint = context.waypoint_index,
            "nursing enemy released offspring"
        );
        out.push(AbilitySignal::SpawnOffspring {
            kind: self.config.offspring,
            count,
            position: context.position,
            waypoint_index: context.waypoint_index,
            formation: OffspringFormation::Ring {
                radius: self.config.radius,
            },
        });
    }
}
