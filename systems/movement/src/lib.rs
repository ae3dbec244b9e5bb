#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Chase driver that walks every enemy toward its current waypoint.
//!
//! The system never advances waypoints itself. It proposes positions clamped to
//! the waypoint being chased and lets the world decide when an enemy arrived.

use std::time::Duration;

use wave_defence_core::{Command, EnemySnapshot, EnemyView, Event, Position};

/// Pure system that emits `Command::MoveEnemy` for every walking enemy.
#[derive(Debug, Default)]
pub struct Movement {
    scratch: Vec<Command>,
}

impl Movement {
    /// Creates a new movement system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves enemies by the time that elapsed in `events`.
    ///
    /// Dead enemies, enemies that finished the path, and enemies whose ability
    /// holds them in place are skipped.
    pub fn handle(&mut self, events: &[Event], enemies: &EnemyView, out: &mut Vec<Command>) {
        let elapsed = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        if elapsed.is_zero() {
            return;
        }

        self.scratch.clear();
        let seconds = elapsed.as_secs_f32();
        for enemy in enemies.iter() {
            if let Some(position) = step_toward_waypoint(enemy, seconds) {
                self.scratch.push(Command::MoveEnemy {
                    enemy: enemy.id,
                    position,
                });
            }
        }

        out.append(&mut self.scratch);
    }
}

fn step_toward_waypoint(enemy: &EnemySnapshot, seconds: f32) -> Option<Position> {
    if !enemy.is_alive() || enemy.speed <= 0.0 {
        return None;
    }
    let waypoint = enemy.waypoint?;

    let offset = waypoint - enemy.position;
    let distance = offset.length();
    let step = enemy.speed * seconds;
    if distance <= step {
        return Some(waypoint);
    }
    Some(enemy.position + offset / distance * step)
}

#[cfg(test)]
mod tests {
    use wave_defence_core::{EnemyId, EnemyKind, Vec2};

    use super::*;

    fn snapshot(position: Vec2, waypoint: Option<Vec2>, speed: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(0),
            kind: EnemyKind::Scavenger,
            position,
            health: 10,
            speed,
            waypoint,
            waypoint_index: 0,
            cloaked: false,
        }
    }

    #[test]
    fn steps_are_clamped_to_the_waypoint() {
        let enemy = snapshot(Vec2::new(0.0, 0.0), Some(Vec2::new(1.0, 0.0)), 2.0);
        assert_eq!(step_toward_waypoint(&enemy, 1.0), Some(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn partial_steps_follow_the_heading() {
        let enemy = snapshot(Vec2::new(0.0, 0.0), Some(Vec2::new(0.0, 10.0)), 2.0);
        let next = step_toward_waypoint(&enemy, 0.5).expect("enemy walks");
        assert!((next - Vec2::new(0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn paused_dead_and_finished_enemies_stay_put() {
        let paused = snapshot(Vec2::ZERO, Some(Vec2::X), 0.0);
        assert_eq!(step_toward_waypoint(&paused, 1.0), None);

        let finished = snapshot(Vec2::ZERO, None, 2.0);
        assert_eq!(step_toward_waypoint(&finished, 1.0), None);

        let mut dead = snapshot(Vec2::ZERO, Some(Vec2::X), 2.0);
        dead.health = 0;
        assert_eq!(step_toward_waypoint(&dead, 1.0), None);
    }
}
