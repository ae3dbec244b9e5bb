//! Shared enemy path and per-enemy progress tracking.

use std::sync::Arc;

use wave_defence_core::{GridCell, Position};

/// Ordered waypoints every enemy walks, shared between all trackers.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Path {
    waypoints: Arc<[Position]>,
}

impl Path {
    /// Wraps the provided waypoints.
    pub(crate) fn new(waypoints: Vec<Position>) -> Self {
        Self {
            waypoints: waypoints.into(),
        }
    }

    /// Waypoints in visiting order.
    pub(crate) fn waypoints(&self) -> &[Position] {
        &self.waypoints
    }

    /// Number of waypoints on the path.
    pub(crate) fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Grid cells covered by the polyline joining consecutive waypoints.
    ///
    /// Cells are produced in walking order. Corners shared by two segments
    /// appear once.
    pub(crate) fn cells(&self) -> Vec<GridCell> {
        let mut cells: Vec<GridCell> = Vec::new();
        let mut corners = self.waypoints.iter().map(|waypoint| GridCell::containing(*waypoint));
        let Some(mut current) = corners.next() else {
            return cells;
        };
        cells.push(current);

        for corner in corners {
            let step_column = (corner.column() - current.column()).signum();
            let step_row = (corner.row() - current.row()).signum();
            while current != corner {
                let column = if current.column() == corner.column() {
                    current.column()
                } else {
                    current.column() + step_column
                };
                let row = if current.row() == corner.row() {
                    current.row()
                } else {
                    current.row() + step_row
                };
                current = GridCell::new(column, row);
                cells.push(current);
            }
        }

        cells
    }
}

/// Progress of one enemy along the shared [`Path`].
#[derive(Clone, Debug)]
pub(crate) struct WaypointTracker {
    path: Path,
    index: usize,
    finished: bool,
}

impl WaypointTracker {
    /// Creates a tracker chasing the waypoint at `index`.
    ///
    /// Indices past the end are clamped to the path length.
    pub(crate) fn starting_at(path: Path, index: usize) -> Self {
        let index = index.min(path.len());
        Self {
            path,
            index,
            finished: false,
        }
    }

    /// Index of the waypoint being chased.
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Waypoint being chased, or `None` once the path is exhausted.
    pub(crate) fn current_waypoint(&self) -> Option<Position> {
        self.path.waypoints().get(self.index).copied()
    }

    /// Reports whether the tracker ever ran past the final waypoint.
    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    /// Moves on to the next waypoint.
    ///
    /// Returns whether the new index still names a waypoint. Once that stops
    /// being true the tracker is finished for good.
    pub(crate) fn advance(&mut self) -> bool {
        if self.index < self.path.len() {
            self.index += 1;
        }
        let within = self.index < self.path.len();
        if !within {
            self.finished = true;
        }
        within
    }

    /// Marks the tracker finished without advancing.
    pub(crate) fn finish(&mut self) {
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use wave_defence_core::{GridCell, Vec2};

    use super::{Path, WaypointTracker};

    fn three_point_path() -> Path {
        Path::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
        ])
    }

    #[test]
    fn advance_past_last_waypoint_finishes_once() {
        let mut tracker = WaypointTracker::starting_at(three_point_path(), 0);

        assert!(tracker.advance());
        assert!(tracker.advance());
        assert_eq!(tracker.index(), 2);
        assert!(!tracker.is_finished());

        assert!(!tracker.advance());
        assert_eq!(tracker.index(), 3);
        assert!(tracker.is_finished());
        assert_eq!(tracker.current_waypoint(), None);

        assert!(!tracker.advance());
        assert_eq!(tracker.index(), 3, "index must not run past the path length");
        assert!(tracker.is_finished(), "finished must stay set");
    }

    #[test]
    fn offspring_start_mid_path() {
        let tracker = WaypointTracker::starting_at(three_point_path(), 1);
        assert_eq!(tracker.current_waypoint(), Some(Vec2::new(2.0, 0.0)));

        let clamped = WaypointTracker::starting_at(three_point_path(), 9);
        assert_eq!(clamped.index(), 3);
        assert_eq!(clamped.current_waypoint(), None);
    }

    #[test]
    fn path_cells_follow_the_polyline() {
        let cells = three_point_path().cells();
        assert_eq!(
            cells,
            vec![
                GridCell::new(0, 0),
                GridCell::new(1, 0),
                GridCell::new(2, 0),
                GridCell::new(2, 1),
                GridCell::new(2, 2),
            ]
        );
    }

    #[test]
    fn empty_path_has_no_cells() {
        assert!(Path::new(Vec::new()).cells().is_empty());
    }
}
