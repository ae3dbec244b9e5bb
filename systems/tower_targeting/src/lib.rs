#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.
//!
//! A tower keeps tracking its remembered target while it cools down, as long
//! as that enemy is alive and in range. Once the cooldown elapses the tower
//! picks afresh using its [`TargetingStrategy`], so a better candidate that
//! walked in meanwhile wins. Stale or dead references are dropped silently.

use wave_defence_core::{
    EnemyId, EnemySnapshot, EnemyView, Position, TargetingStrategy, TowerSnapshot, TowerTarget,
    TowerView,
};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    candidates: Vec<Candidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes one target entry per tower.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<TowerTarget>) {
        out.clear();

        for tower in towers.iter() {
            let ready = tower.ready_in.is_zero();
            let enemy = if ready {
                self.acquire(tower, enemies)
            } else {
                tower
                    .current_target
                    .filter(|id| enemies.get(*id).is_some_and(|enemy| is_valid(tower, enemy)))
            };
            out.push(TowerTarget {
                tower: tower.id,
                enemy,
                ready,
            });
        }
    }

    fn acquire(&mut self, tower: &TowerSnapshot, enemies: &EnemyView) -> Option<EnemyId> {
        self.candidates.clear();
        self.candidates.extend(
            enemies
                .iter()
                .filter(|enemy| is_valid(tower, enemy))
                .map(|enemy| Candidate {
                    id: enemy.id,
                    distance_squared: distance_squared(tower.position, enemy.position),
                    health: enemy.health,
                }),
        );

        let mut best: Option<&Candidate> = None;
        for candidate in &self.candidates {
            match best {
                Some(existing) if !candidate.beats(existing, tower.strategy) => {}
                _ => best = Some(candidate),
            }
        }
        best.map(|candidate| candidate.id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    id: EnemyId,
    distance_squared: f32,
    health: u32,
}

impl Candidate {
    /// Strict comparison so the first candidate found keeps ties.
    fn beats(&self, other: &Self, strategy: TargetingStrategy) -> bool {
        match strategy {
            TargetingStrategy::Closest => self.distance_squared < other.distance_squared,
            TargetingStrategy::First => false,
            TargetingStrategy::Strongest => self.health > other.health,
            TargetingStrategy::Weakest => self.health < other.health,
        }
    }
}

fn is_valid(tower: &TowerSnapshot, enemy: &EnemySnapshot) -> bool {
    enemy.is_alive()
        && distance_squared(tower.position, enemy.position)
            <= tower.attack_range * tower.attack_range
}

fn distance_squared(from: Position, to: Position) -> f32 {
    from.distance_squared(to)
}
