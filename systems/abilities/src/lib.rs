#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-enemy special abilities expressed as timed state machines.
//!
//! Every enemy owns at most one [`AbilityModule`]. The world drives the module
//! with frame deltas and health notifications, reads its speed multiplier and
//! invulnerability flag, and turns the [`AbilitySignal`]s it emits into events.
//! Each module keeps its timers in a private [`TimerWheel`] so disposing the
//! module cancels everything it scheduled.
//!
//! [`TimerWheel`]: wave_defence_core::TimerWheel

mod alpha;
mod cloak;
mod nursing;
mod pounce;

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wave_defence_core::{AbilityConfig, EnemyId, EnemyKind, OffspringFormation, Position};

pub use alpha::{Alpha, AlphaPhase};
pub use cloak::{Cloak, CloakPhase};
pub use nursing::Nursing;
pub use pounce::{Pounce, PouncePhase};

/// State of the owning enemy handed to abilities each time they run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AbilityContext {
    /// Enemy that owns the ability.
    pub enemy: EnemyId,
    /// Current position of the enemy.
    pub position: Position,
    /// Index of the waypoint the enemy is chasing.
    pub waypoint_index: usize,
}

/// Requests raised by abilities for the world to act upon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AbilitySignal {
    /// Additional enemies should join the live set.
    SpawnOffspring {
        /// Type of the offspring.
        kind: EnemyKind,
        /// Number of offspring.
        count: u32,
        /// Position the offspring gather around.
        position: Position,
        /// Waypoint the offspring chase first.
        waypoint_index: usize,
        /// Arrangement around `position`.
        formation: OffspringFormation,
    },
    /// The enemy entered or left stealth.
    CloakChanged {
        /// Whether the enemy is now cloaked.
        cloaked: bool,
    },
}

/// Special ability attached to an enemy.
#[derive(Clone, Debug, Default)]
pub enum AbilityModule {
    /// The enemy has no ability.
    #[default]
    None,
    /// Periodic invulnerable stealth.
    Cloak(Cloak),
    /// Offspring released on death.
    Nursing(Nursing),
    /// Periodic minion spawning while alive.
    Alpha(Alpha),
    /// Periodic speed bursts.
    Pounce(Pounce),
}

impl AbilityModule {
    /// Builds the module described by `config`, seeding its randomness with `seed`.
    #[must_use]
    pub fn from_config(config: Option<&AbilityConfig>, seed: u64) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(seed);
        match config {
            None => Self::None,
            Some(AbilityConfig::Cloak(config)) => Self::Cloak(Cloak::new(config.clone(), rng)),
            Some(AbilityConfig::Nursing(config)) => {
                Self::Nursing(Nursing::new(config.clone(), rng))
            }
            Some(AbilityConfig::Alpha(config)) => Self::Alpha(Alpha::new(config.clone(), rng)),
            Some(AbilityConfig::Pounce(config)) => {
                Self::Pounce(Pounce::new(config.clone(), rng))
            }
        }
    }

    /// Advances the module's timers by `dt`.
    pub fn tick(&mut self, dt: Duration, context: AbilityContext, out: &mut Vec<AbilitySignal>) {
        match self {
            Self::None | Self::Nursing(_) => {}
            Self::Cloak(cloak) => cloak.tick(dt, context, out),
            Self::Alpha(alpha) => alpha.tick(dt, context, out),
            Self::Pounce(pounce) => pounce.tick(dt, context),
        }
    }

    /// Notifies the module that the owner's health changed to `health`.
    pub fn on_health_changed(
        &mut self,
        health: u32,
        context: AbilityContext,
        out: &mut Vec<AbilitySignal>,
    ) {
        match self {
            Self::None | Self::Cloak(_) | Self::Pounce(_) => {}
            Self::Nursing(nursing) => nursing.on_health_changed(health, context, out),
            Self::Alpha(alpha) => alpha.on_health_changed(health, context),
        }
    }

    /// Factor applied to the owner's base speed.
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        match self {
            Self::None | Self::Nursing(_) => 1.0,
            Self::Cloak(cloak) => cloak.speed_multiplier(),
            Self::Alpha(alpha) => alpha.speed_multiplier(),
            Self::Pounce(pounce) => pounce.speed_multiplier(),
        }
    }

    /// Reports whether the owner currently ignores damage.
    #[must_use]
    pub fn is_invulnerable(&self) -> bool {
        match self {
            Self::Cloak(cloak) => cloak.is_cloaked(),
            _ => false,
        }
    }

    /// Cancels every timer the module scheduled.
    pub fn dispose(&mut self) {
        match self {
            Self::None | Self::Nursing(_) => {}
            Self::Cloak(cloak) => cloak.dispose(),
            Self::Alpha(alpha) => alpha.dispose(),
            Self::Pounce(pounce) => pounce.dispose(),
        }
    }

    /// Number of timers still scheduled by the module.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        match self {
            Self::None | Self::Nursing(_) => 0,
            Self::Cloak(cloak) => cloak.pending_timers(),
            Self::Alpha(alpha) => alpha.pending_timers(),
            Self::Pounce(pounce) => pounce.pending_timers(),
        }
    }
}

/// Shortest phase a cycle may schedule; zero-length phases would spin within one tick.
const MIN_PHASE: Duration = Duration::from_millis(1);

fn phase_length(duration: Duration) -> Duration {
    duration.max(MIN_PHASE)
}

fn uniform_seconds(rng: &mut ChaCha8Rng, min: f32, max: f32) -> Duration {
    wave_defence_core::seconds(uniform_f32(rng, min, max))
}

fn uniform_f32(rng: &mut ChaCha8Rng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

fn uniform_count(rng: &mut ChaCha8Rng, min: u32, max: u32) -> u32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}
