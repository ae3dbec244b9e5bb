//! Stalker stealth cycle.

use std::time::Duration;

use rand_chacha::ChaCha8Rng;
use tracing::debug;
use wave_defence_core::{seconds, CloakConfig, TimerHandle, TimerWheel};

use crate::{phase_length, uniform_seconds, AbilityContext, AbilitySignal};

const CLOAKED_SPEED: f32 = 1.5;

/// Phase of the stealth cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloakPhase {
    /// Invulnerable and faster than usual.
    Cloaked,
    /// Standing still after leaving stealth.
    PostUncloakPause,
    /// Visible and walking normally.
    Idle,
    /// Standing still before entering stealth.
    PreCloakPause,
    /// Disposed; no further transitions.
    Disposed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PhaseEnd;

/// Cycles `Cloaked → PostUncloakPause → Idle → PreCloakPause → Cloaked`.
///
/// The cycle starts cloaked so freshly spawned stalkers appear mid-stealth.
#[derive(Clone, Debug)]
pub struct Cloak {
    config: CloakConfig,
    rng: ChaCha8Rng,
    phase: CloakPhase,
    timers: TimerWheel<PhaseEnd>,
    phase_timer: Option<TimerHandle>,
}

impl Cloak {
    pub(crate) fn new(config: CloakConfig, rng: ChaCha8Rng) -> Self {
        let mut cloak = Self {
            config,
            rng,
            phase: CloakPhase::Cloaked,
            timers: TimerWheel::new(),
            phase_timer: None,
        };
        let duration = cloak.cloak_duration();
        cloak.schedule(duration);
        cloak
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> CloakPhase {
        self.phase
    }

    /// Reports whether damage is currently suppressed.
    #[must_use]
    pub fn is_cloaked(&self) -> bool {
        self.phase == CloakPhase::Cloaked
    }

    pub(crate) fn speed_multiplier(&self) -> f32 {
        match self.phase {
            CloakPhase::Cloaked => CLOAKED_SPEED,
            CloakPhase::PostUncloakPause | CloakPhase::PreCloakPause => 0.0,
            CloakPhase::Idle | CloakPhase::Disposed => 1.0,
        }
    }

    pub(crate) fn tick(&mut self, dt: Duration, context: AbilityContext, out: &mut Vec<AbilitySignal>) {
        let deadline = self.timers.now().saturating_add(dt);
        while self.timers.pop_due(deadline).is_some() {
            self.next_phase(context, out);
        }
    }

    fn next_phase(&mut self, context: AbilityContext, out: &mut Vec<AbilitySignal>) {
        let (phase, duration) = match self.phase {
            CloakPhase::Cloaked => (CloakPhase::PostUncloakPause, self.pause_duration()),
            CloakPhase::PostUncloakPause => (CloakPhase::Idle, self.idle_duration()),
            CloakPhase::Idle => (CloakPhase::PreCloakPause, self.pause_duration()),
            CloakPhase::PreCloakPause => (CloakPhase::Cloaked, self.cloak_duration()),
            CloakPhase::Disposed => return,
        };

        let was_cloaked = self.is_cloaked();
        self.phase = phase;
        if was_cloaked != self.is_cloaked() {
            out.push(AbilitySignal::CloakChanged {
                cloaked: self.is_cloaked(),
            });
        }
        debug!(enemy = context.enemy.get(), ?phase, "cloak phase changed");
        self.schedule(duration);
    }

    fn schedule(&mut self, duration: Duration) {
        self.phase_timer = Some(self.timers.schedule(phase_length(duration), PhaseEnd));
    }

    fn cloak_duration(&mut self) -> Duration {
        uniform_seconds(
            &mut self.rng,
            self.config.min_cloak_time,
            self.config.max_cloak_time,
        )
    }

    fn idle_duration(&mut self) -> Duration {
        uniform_seconds(
            &mut self.rng,
            self.config.min_idle_time,
            self.config.max_idle_time,
        )
    }

    fn pause_duration(&self) -> Duration {
        seconds(self.config.pause_time)
    }

    pub(crate) fn dispose(&mut self) {
        if let Some(handle) = self.phase_timer.take() {
            let _ = self.timers.cancel(handle);
        }
        self.phase = CloakPhase::Disposed;
    }

    pub(crate) fn pending_timers(&self) -> usize {
        self.timers.pending()
    }
}
