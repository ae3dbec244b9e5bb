//! Ordered enemy sequences released by the orchestrator.

use std::time::Duration;

use wave_defence_core::{seconds, EnemyKind};

/// One wave: a finite, ordered list of enemies plus the rate they appear at.
#[derive(Clone, Debug, PartialEq)]
pub struct Wave {
    index: u32,
    is_boss: bool,
    spawn_rate: f32,
    enemy_sequence: Vec<EnemyKind>,
    cursor: usize,
}

impl Wave {
    /// Creates a wave releasing `enemy_sequence` at `spawn_rate` enemies per second.
    #[must_use]
    pub fn new(index: u32, is_boss: bool, spawn_rate: f32, enemy_sequence: Vec<EnemyKind>) -> Self {
        Self {
            index,
            is_boss,
            spawn_rate,
            enemy_sequence,
            cursor: 0,
        }
    }

    /// Index the wave was declared with.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Reports whether the wave is a boss wave.
    #[must_use]
    pub fn is_boss(&self) -> bool {
        self.is_boss
    }

    /// Enemies released per second.
    #[must_use]
    pub fn spawn_rate(&self) -> f32 {
        self.spawn_rate
    }

    /// Delay between two consecutive releases.
    ///
    /// Non-positive rates never release a second enemy.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        if self.spawn_rate > 0.0 {
            seconds(self.spawn_rate.recip())
        } else {
            Duration::MAX
        }
    }

    /// Number of enemies the wave releases, offspring excluded.
    #[must_use]
    pub fn total_enemies(&self) -> usize {
        self.enemy_sequence.len()
    }

    /// Enemies not yet released.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.enemy_sequence.len() - self.cursor
    }

    /// Releases the next enemy in sequence, or `None` once exhausted.
    pub fn next_enemy(&mut self) -> Option<EnemyKind> {
        let kind = self.enemy_sequence.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(kind)
    }

    /// Rewinds the sequence so the wave can be played again.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}
