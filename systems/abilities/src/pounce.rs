//! Hunter speed bursts.

use std::time::Duration;

use rand_chacha::ChaCha8Rng;
use tracing::debug;
use wave_defence_core::{seconds, PounceConfig, TimerHandle, TimerWheel};

use crate::{phase_length, uniform_f32, uniform_seconds, AbilityContext};

/// Phase of the pounce cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PouncePhase {
    /// Walking while the next pounce is pending.
    Cooldown,
    /// Crouching before the burst.
    Preparing,
    /// Bursting forward at the contained speed multiplier.
    Pouncing(f32),
    /// Disposed; no further transitions.
    Disposed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PhaseEnd;

/// Repeats `Cooldown → Preparing → Pouncing → Cooldown` until disposed.
///
/// Damage does not interrupt the cycle.
#[derive(Clone, Debug)]
pub struct Pounce {
    config: PounceConfig,
    rng: ChaCha8Rng,
    phase: PouncePhase,
    timers: TimerWheel<PhaseEnd>,
    phase_timer: Option<TimerHandle>,
}

impl Pounce {
    pub(crate) fn new(config: PounceConfig, rng: ChaCha8Rng) -> Self {
        let mut pounce = Self {
            config,
            rng,
            phase: PouncePhase::Cooldown,
            timers: TimerWheel::new(),
            phase_timer: None,
        };
        let delay = pounce.cooldown_duration();
        pounce.schedule(delay);
        pounce
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> PouncePhase {
        self.phase
    }

    pub(crate) fn speed_multiplier(&self) -> f32 {
        match self.phase {
            PouncePhase::Preparing => 0.0,
            PouncePhase::Pouncing(multiplier) => multiplier,
            PouncePhase::Cooldown | PouncePhase::Disposed => 1.0,
        }
    }

    pub(crate) fn tick(&mut self, dt: Duration, context: AbilityContext) {
        let deadline = self.timers.now().saturating_add(dt);
        while self.timers.pop_due(deadline).is_some() {
            self.next_phase(context);
        }
    }

    fn next_phase(&mut self, context: AbilityContext) {
        let (phase, duration) = match self.phase {
            PouncePhase::Cooldown => (
                PouncePhase::Preparing,
                seconds(self.config.preparation_duration),
            ),
            PouncePhase::Preparing => {
                let multiplier = uniform_f32(
                    &mut self.rng,
                    self.config.min_speed_multiplier,
                    self.config.max_speed_multiplier,
                );
                (PouncePhase::Pouncing(multiplier), seconds(self.config.duration))
            }
            PouncePhase::Pouncing(_) => (PouncePhase::Cooldown, self.cooldown_duration()),
            PouncePhase::Disposed => return,
        };

        self.phase = phase;
        debug!(enemy = context.enemy.get(), ?phase, "pounce phase changed");
        self.schedule(duration);
    }

    fn cooldown_duration(&mut self) -> Duration {
        uniform_seconds(
            &mut self.rng,
            self.config.min_cooldown,
            self.config.max_cooldown,
        )
    }

    fn schedule(&mut self, duration: Duration) {
        self.phase_timer = Some(self.timers.schedule(phase_length(duration), PhaseEnd));
    }

    pub(crate) fn dispose(&mut self) {
        if let Some(handle) = self.phase_timer.take() {
            let _ = self.timers.cancel(handle);
        }
        self.phase = PouncePhase::Disposed;
    }

    pub(crate) fn pending_timers(&self) -> usize {
        self.timers.pending()
    }
}
