#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave orchestration system that releases enemies and judges wave completion.
//!
//! The orchestrator owns the wave list and a [`TimerWheel`] driven by the
//! frame's `TimeAdvanced` events. It reacts to kill, offspring, and base
//! events and answers with spawn, gold, and base damage commands.
//!
//! Ability offspring raise the completion threshold, so a wave counts as
//! cleared once `kills >= total_enemies + additional_spawned`. Each kill
//! restarts a short completion check so offspring requested by the dying
//! enemy are counted before the wave is judged.

mod wave;

use std::time::Duration;

use tracing::info;
use wave_defence_core::{Command, Event, Position, TimerHandle, TimerWheel};

pub use wave::Wave;

/// Delay between a kill and the completion check it triggers.
pub const COMPLETION_DEBOUNCE: Duration = Duration::from_millis(100);

/// Pause between a cleared wave and the next one.
pub const INTER_WAVE_DELAY: Duration = Duration::from_secs(5);

/// Lifecycle of the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// Not started yet, or torn down.
    Idle,
    /// Releasing the enemies of the wave at the given position in the list.
    Spawning(usize),
    /// Every enemy of the wave is out; waiting for the kill count to catch up.
    WaitingForClear(usize),
    /// Wave cleared; the next wave starts when the delay elapses.
    InterWaveDelay(usize),
    /// The final wave was cleared.
    Victory,
    /// The base was destroyed.
    Defeat,
}

impl WavePhase {
    /// Reports whether the session has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerKey {
    SpawnTick,
    CompletionCheck,
    NextWave,
}

/// Configuration parameters required to construct the orchestrator.
#[derive(Clone, Debug)]
pub struct Config {
    waves: Vec<Wave>,
    spawn_point: Position,
}

impl Config {
    /// Creates a configuration releasing `waves` at `spawn_point`.
    #[must_use]
    pub fn new(waves: Vec<Wave>, spawn_point: Position) -> Self {
        Self { waves, spawn_point }
    }
}

/// Releases waves of enemies and advances through them as they are cleared.
#[derive(Debug)]
pub struct WaveOrchestrator {
    waves: Vec<Wave>,
    spawn_point: Position,
    phase: WavePhase,
    kill_count: usize,
    additional_spawned: usize,
    timers: TimerWheel<TimerKey>,
    spawn_timer: Option<TimerHandle>,
    completion_timer: Option<TimerHandle>,
    next_wave_timer: Option<TimerHandle>,
}

impl WaveOrchestrator {
    /// Creates an idle orchestrator. Nothing spawns until [`Self::start`].
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            waves: config.waves,
            spawn_point: config.spawn_point,
            phase: WavePhase::Idle,
            kill_count: 0,
            additional_spawned: 0,
            timers: TimerWheel::new(),
            spawn_timer: None,
            completion_timer: None,
            next_wave_timer: None,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Wave currently being played, if any.
    #[must_use]
    pub fn current_wave(&self) -> Option<&Wave> {
        match self.phase {
            WavePhase::Spawning(index)
            | WavePhase::WaitingForClear(index)
            | WavePhase::InterWaveDelay(index) => self.waves.get(index),
            WavePhase::Idle | WavePhase::Victory | WavePhase::Defeat => None,
        }
    }

    /// Number of waves in the session.
    #[must_use]
    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    /// Kills counted towards the current wave.
    #[must_use]
    pub fn kill_count(&self) -> usize {
        self.kill_count
    }

    /// Offspring added to the current wave by enemy abilities.
    #[must_use]
    pub fn additional_spawned(&self) -> usize {
        self.additional_spawned
    }

    /// Kills required before the current wave counts as cleared.
    #[must_use]
    pub fn completion_threshold(&self) -> usize {
        let nominal = self.current_wave().map_or(0, Wave::total_enemies);
        nominal + self.additional_spawned
    }

    /// Number of timers still scheduled.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Starts the first wave, releasing its first enemy immediately.
    pub fn start(&mut self, out: &mut Vec<Command>) {
        if self.phase != WavePhase::Idle {
            return;
        }
        self.begin_wave(0, out);
    }

    /// Consumes world events and emits spawn, gold, and base damage commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.advance(*dt, out),
                Event::EnemyKilled { gold, .. } => self.on_enemy_killed(*gold, out),
                Event::OffspringRequested {
                    kind,
                    count,
                    position,
                    waypoint_index,
                    formation,
                    ..
                } => {
                    if !self.accepts_enemies() {
                        continue;
                    }
                    self.additional_spawned += *count as usize;
                    for index in 0..*count {
                        out.push(Command::SpawnEnemy {
                            kind: *kind,
                            position: formation.offset(*position, index, *count),
                            waypoint_index: *waypoint_index,
                        });
                    }
                }
                Event::EnemyReachedBase { damage, .. } => {
                    if !self.phase.is_terminal() {
                        out.push(Command::DamageBase { amount: *damage });
                    }
                }
                Event::BaseDestroyed => self.enter_defeat(),
                _ => {}
            }
        }
    }

    /// Cancels every outstanding timer and returns to [`WavePhase::Idle`].
    pub fn dispose(&mut self) {
        self.cancel_timers();
        self.phase = WavePhase::Idle;
    }

    fn accepts_enemies(&self) -> bool {
        matches!(
            self.phase,
            WavePhase::Spawning(_) | WavePhase::WaitingForClear(_)
        )
    }

    fn advance(&mut self, dt: Duration, out: &mut Vec<Command>) {
        let deadline = self.timers.now().saturating_add(dt);
        while let Some(key) = self.timers.pop_due(deadline) {
            match key {
                TimerKey::SpawnTick => self.spawn_next(out),
                TimerKey::CompletionCheck => self.check_completion(),
                TimerKey::NextWave => {
                    if self.next_wave_timer.take().is_none() {
                        continue;
                    }
                    if let WavePhase::InterWaveDelay(index) = self.phase {
                        self.begin_wave(index + 1, out);
                    }
                }
            }
        }
    }

    fn begin_wave(&mut self, index: usize, out: &mut Vec<Command>) {
        self.kill_count = 0;
        self.additional_spawned = 0;
        let Some(wave) = self.waves.get_mut(index) else {
            self.enter_victory();
            return;
        };
        wave.reset();
        info!(
            wave = wave.index(),
            boss = wave.is_boss(),
            enemies = wave.total_enemies(),
            rate = wave.spawn_rate(),
            "wave started"
        );

        let interval = wave.spawn_interval();
        self.phase = WavePhase::Spawning(index);
        self.spawn_next(out);
        if self.phase == WavePhase::Spawning(index) {
            self.spawn_timer = Some(self.timers.schedule_repeating(
                interval,
                interval,
                TimerKey::SpawnTick,
            ));
        }
    }

    fn spawn_next(&mut self, out: &mut Vec<Command>) {
        let WavePhase::Spawning(index) = self.phase else {
            return;
        };
        let Some(wave) = self.waves.get_mut(index) else {
            return;
        };

        if let Some(kind) = wave.next_enemy() {
            out.push(Command::SpawnEnemy {
                kind,
                position: self.spawn_point,
                waypoint_index: 0,
            });
        }
        if wave.remaining() > 0 {
            return;
        }

        if let Some(handle) = self.spawn_timer.take() {
            let _ = self.timers.cancel(handle);
        }
        self.phase = WavePhase::WaitingForClear(index);
        self.schedule_completion_check();
    }

    fn on_enemy_killed(&mut self, gold: u32, out: &mut Vec<Command>) {
        if self.phase.is_terminal() || self.phase == WavePhase::Idle {
            return;
        }
        self.kill_count += 1;
        out.push(Command::AwardGold { amount: gold });
        self.schedule_completion_check();
    }

    fn schedule_completion_check(&mut self) {
        if let Some(handle) = self.completion_timer.take() {
            let _ = self.timers.cancel(handle);
        }
        self.completion_timer = Some(
            self.timers
                .schedule(COMPLETION_DEBOUNCE, TimerKey::CompletionCheck),
        );
    }

    fn check_completion(&mut self) {
        self.completion_timer = None;
        let WavePhase::WaitingForClear(index) = self.phase else {
            return;
        };
        let threshold = self.completion_threshold();
        if self.kill_count < threshold {
            return;
        }

        info!(
            wave = index,
            kills = self.kill_count,
            threshold,
            "wave cleared"
        );
        if index + 1 >= self.waves.len() {
            self.enter_victory();
            return;
        }
        self.phase = WavePhase::InterWaveDelay(index);
        self.next_wave_timer = Some(self.timers.schedule(INTER_WAVE_DELAY, TimerKey::NextWave));
    }

    fn enter_victory(&mut self) {
        info!(waves = self.waves.len(), "victory");
        self.cancel_timers();
        self.phase = WavePhase::Victory;
    }

    fn enter_defeat(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        info!(phase = ?self.phase, "defeat");
        self.cancel_timers();
        self.phase = WavePhase::Defeat;
    }

    fn cancel_timers(&mut self) {
        self.timers.cancel_all();
        self.spawn_timer = None;
        self.completion_timer = None;
        self.next_wave_timer = None;
    }
}
