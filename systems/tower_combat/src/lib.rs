#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits firing commands from targeting data.

use wave_defence_core::{Command, TowerTarget, TowerView};

/// Tower combat system that queues target bookkeeping and firing commands.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::AssignTarget` when a tower's target changed and
    /// `Command::FireAt` for towers that are ready and have a target.
    pub fn handle(&mut self, towers: &TowerView, tower_targets: &[TowerTarget], out: &mut Vec<Command>) {
        if tower_targets.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            let Some(snapshot) = towers.get(target.tower) else {
                continue;
            };

            if snapshot.current_target != target.enemy {
                self.scratch.push(Command::AssignTarget {
                    tower: target.tower,
                    target: target.enemy,
                });
            }

            if let (true, Some(enemy)) = (target.ready, target.enemy) {
                self.scratch.push(Command::FireAt {
                    tower: target.tower,
                    enemy,
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
