use crate::geometry::AngleMode;
use crate::point::SnapGrid;

/// Nets whose rects come within this many units of each other are
/// considered to overlap; absorbs endpoint snapping error.
pub const DEFAULT_OVERLAP_TOLERANCE: i64 = 2;
/// Endpoints closer than this (manhattan) are electrically joined.
pub const DEFAULT_CONNECT_TOLERANCE: i64 = 1;
/// Degrees of slack when comparing net directions.
pub const DEFAULT_ANGLE_TOLERANCE: f64 = 1.0;

/// Knobs for the merge, split and grouping passes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    pub grid: SnapGrid,
    pub angle_mode: AngleMode,
    pub overlap_tolerance: i64,
    pub connect_tolerance: i64,
    pub angle_tolerance: f64,
    /// Also split nets where an orthogonal net passes straight through
    /// them, not only where it ends on them.
    pub split_at_crossings: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid: SnapGrid::default(),
            angle_mode: AngleMode::default(),
            overlap_tolerance: DEFAULT_OVERLAP_TOLERANCE,
            connect_tolerance: DEFAULT_CONNECT_TOLERANCE,
            angle_tolerance: DEFAULT_ANGLE_TOLERANCE,
            split_at_crossings: false,
        }
    }
}

impl EngineConfig {
    pub fn with_grid(mut self, grid: SnapGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_angle_mode(mut self, angle_mode: AngleMode) -> Self {
        self.angle_mode = angle_mode;
        self
    }

    pub fn with_split_at_crossings(mut self, split_at_crossings: bool) -> Self {
        self.split_at_crossings = split_at_crossings;
        self
    }
}
