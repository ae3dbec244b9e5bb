#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system translating player input into build, selection, and tower commands.

use wave_defence_core::{Command, Event, GridCell, TargetingStrategy, TowerId, TowerKind};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Player pressed the build mode toggle on this frame.
    pub toggle_build_mode: bool,
    /// Tower type picked from the shop on this frame.
    pub select_tower_type: Option<TowerKind>,
    /// Grid cell under a pointer click on this frame.
    pub click: Option<GridCell>,
    /// Player asked to upgrade the selected tower.
    pub upgrade_selected: bool,
    /// Player asked to sell the selected tower.
    pub sell_selected: bool,
    /// Targeting strategy requested for the selected tower.
    pub strategy: Option<TargetingStrategy>,
}

/// Builder system that tracks build mode and selection from world events.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    build_mode: bool,
    tower_kind: TowerKind,
    selected: Option<TowerId>,
}

impl Builder {
    /// Creates a new builder system instance outside build mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether the last observed build mode was active.
    #[must_use]
    pub fn build_mode(&self) -> bool {
        self.build_mode
    }

    /// Tower currently selected, as last reported by the world.
    #[must_use]
    pub fn selected(&self) -> Option<TowerId> {
        self.selected
    }

    /// Consumes world events and adapter-derived input to emit builder commands.
    ///
    /// The `tower_at` closure should mirror the semantics of the world's
    /// `query::tower_at` helper so the system can identify a clicked tower.
    /// A click places a tower while build mode is active, selects the tower
    /// under the pointer otherwise, and deselects when it lands on empty
    /// ground.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        input: BuilderInput,
        mut tower_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(GridCell) -> Option<TowerId>,
    {
        for event in events {
            self.observe(event);
        }

        if let Some(kind) = input.select_tower_type {
            self.tower_kind = kind;
            out.push(Command::SelectTowerType { kind });
        }

        if input.toggle_build_mode {
            self.build_mode = !self.build_mode;
            out.push(Command::SetBuildMode {
                enabled: self.build_mode,
            });
        }

        if let Some(cell) = input.click {
            if self.build_mode {
                out.push(Command::PlaceTower {
                    kind: self.tower_kind,
                    cell,
                });
            } else if let Some(tower) = tower_at(cell) {
                out.push(Command::SelectTower { tower });
            } else if self.selected.is_some() {
                out.push(Command::DeselectTower);
            }
        }

        let Some(tower) = self.selected else {
            return;
        };
        if let Some(strategy) = input.strategy {
            out.push(Command::SetTargetingStrategy { tower, strategy });
        }
        if input.upgrade_selected {
            out.push(Command::UpgradeTower { tower });
        }
        if input.sell_selected {
            out.push(Command::SellTower { tower });
        }
    }

    fn observe(&mut self, event: &Event) {
        match event {
            Event::BuildModeChanged { enabled } => self.build_mode = *enabled,
            Event::TowerTypeSelected { kind } => self.tower_kind = *kind,
            Event::TowerClicked { tower } => self.selected = Some(*tower),
            Event::TowerDeselected => self.selected = None,
            Event::TowerSold { tower, .. } if self.selected == Some(*tower) => {
                self.selected = None;
            }
            _ => {}
        }
    }
}
