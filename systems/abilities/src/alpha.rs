//! Brood commander minion cycle.

use std::time::Duration;

use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use wave_defence_core::{seconds, AlphaConfig, OffspringFormation, TimerHandle, TimerWheel};

use crate::{phase_length, uniform_count, uniform_seconds, AbilityContext, AbilitySignal};

/// Phase of the minion cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlphaPhase {
    /// Walking while the next spawn is pending.
    Cooldown,
    /// Standing still right before spawning.
    Paused,
    /// The owner died or was disposed; the cycle never resumes.
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AlphaTimer {
    CooldownEnd,
    PauseEnd,
}

/// Repeats `Cooldown → Paused → spawn minions → Cooldown` while alive.
#[derive(Clone, Debug)]
pub struct Alpha {
    config: AlphaConfig,
    rng: ChaCha8Rng,
    phase: AlphaPhase,
    timers: TimerWheel<AlphaTimer>,
    phase_timer: Option<TimerHandle>,
}

impl Alpha {
    pub(crate) fn new(config: AlphaConfig, rng: ChaCha8Rng) -> Self {
        let mut alpha = Self {
            config,
            rng,
            phase: AlphaPhase::Cooldown,
            timers: TimerWheel::new(),
            phase_timer: None,
        };
        alpha.start_cooldown();
        alpha
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> AlphaPhase {
        self.phase
    }

    pub(crate) fn speed_multiplier(&self) -> f32 {
        match self.phase {
            AlphaPhase::Paused => 0.0,
            AlphaPhase::Cooldown | AlphaPhase::Stopped => 1.0,
        }
    }

    pub(crate) fn tick(&mut self, dt: Duration, context: AbilityContext, out: &mut Vec<AbilitySignal>) {
        let deadline = self.timers.now().saturating_add(dt);
        while let Some(timer) = self.timers.pop_due(deadline) {
            match timer {
                AlphaTimer::CooldownEnd => self.pause(context),
                AlphaTimer::PauseEnd => {
                    self.spawn_minions(context, out);
                    self.start_cooldown();
                }
            }
        }
    }

    pub(crate) fn on_health_changed(&mut self, health: u32, context: AbilityContext) {
        if health == 0 && self.phase != AlphaPhase::Stopped {
            debug!(enemy = context.enemy.get(), "brood commander slain, minion cycle stopped");
            self.stop();
        }
    }

    fn pause(&mut self, context: AbilityContext) {
        self.phase = AlphaPhase::Paused;
        debug!(enemy = context.enemy.get(), "brood commander pausing to spawn");
        self.phase_timer = Some(
            self.timers.schedule(
                phase_length(seconds(self.config.pause_time)),
                AlphaTimer::PauseEnd,
            ),
        );
    }

    fn spawn_minions(&mut self, context: AbilityContext, out: &mut Vec<AbilitySignal>) {
        let count = uniform_count(
            &mut self.rng,
            self.config.min_spawn_count,
            self.config.max_spawn_count,
        );
        info!(
            enemy = context.enemy.get(),
            count,
            waypoint = context.waypoint_index,
            "brood commander spawned minions"
        );
        out.push(AbilitySignal::SpawnOffspring {
            kind: self.config.offspring,
            count,
            position: context.position,
            waypoint_index: context.waypoint_index,
            formation: OffspringFormation::Stacked,
        });
    }

    fn start_cooldown(&mut self) {
        self.phase = AlphaPhase::Cooldown;
        let delay = uniform_seconds(
            &mut self.rng,
            self.config.min_alpha_time,
            self.config.max_alpha_time,
        );
        self.phase_timer = Some(
            self.timers
                .schedule(phase_length(delay), AlphaTimer::CooldownEnd),
        );
    }

    fn stop(&mut self) {
        if let Some(handle) = self.phase_timer.take() {
            let _ = self.timers.cancel(handle);
        }
        self.phase = AlphaPhase::Stopped;
    }

    pub(crate) fn dispose(&mut self) {
        self.stop();
    }

    pub(crate) fn pending_timers(&self) -> usize {
        self.timers.pending()
    }
}
