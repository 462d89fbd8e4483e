//! Road geometry: lane centers and the two boundary lines.

use crate::geometry::{Point, Segment};

// Large enough to read as infinite to any segment test.
const HORIZON: f64 = 1_000_000.0;

/// A straight vertical road with evenly-divided lanes.
#[derive(Clone, Debug)]
pub struct Road {
    pub x: f64,
    pub width: f64,
    pub lane_count: usize,
    left: f64,
    borders: [Segment; 2],
}

impl Road {
    pub fn new(x: f64, width: f64, lane_count: usize) -> Self {
        assert!(lane_count > 0, "road needs at least one lane");

        let left = x - width / 2.0;
        let right = x + width / 2.0;

        let borders = [
            [Point::new(left, -HORIZON), Point::new(left, HORIZON)],
            [Point::new(right, -HORIZON), Point::new(right, HORIZON)],
        ];

        Self {
            x,
            width,
            lane_count,
            left,
            borders,
        }
    }

    /// Center x of the given lane, clamped to the valid lane range.
    pub fn lane_center(&self, lane: usize) -> f64 {
        let lane_width = self.width / self.lane_count as f64;
        self.left + lane_width / 2.0 + lane.min(self.lane_count - 1) as f64 * lane_width
    }

    /// Left and right boundary segments.
    pub fn borders(&self) -> &[Segment; 2] {
        &self.borders
    }
}
