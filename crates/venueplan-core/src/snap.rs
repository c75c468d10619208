//! Grid snapping for committed drags.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Default horizontal grid step.
pub const GRID_STEP_X: f64 = 20.0;
/// Default vertical grid step.
pub const GRID_STEP_Y: f64 = 15.0;
/// Default distance within which a drag end snaps to a grid intersection.
pub const SNAP_THRESHOLD: f64 = 10.0;

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    fn both(point: Point) -> Self {
        Self {
            point,
            snapped_x: true,
            snapped_y: true,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Alignment guide shown while a drag hovers near a grid intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapGuide {
    /// Vertical line at this x.
    Vertical(f64),
    /// Horizontal line at this y.
    Horizontal(f64),
}

/// Grid geometry and snapping switch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    pub step_x: f64,
    pub step_y: f64,
    pub threshold: f64,
    pub enabled: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            step_x: GRID_STEP_X,
            step_y: GRID_STEP_Y,
            threshold: SNAP_THRESHOLD,
            enabled: true,
        }
    }
}

fn round_to(value: f64, step: f64) -> f64 {
    if step > 0.0 {
        (value / step).round() * step
    } else {
        value
    }
}

impl GridConfig {
    /// Snap a point to the nearest grid intersection, regardless of distance.
    pub fn snap_point(&self, point: Point) -> SnapResult {
        if !self.enabled || self.step_x <= 0.0 || self.step_y <= 0.0 {
            return SnapResult::none(point);
        }
        SnapResult::both(Point::new(round_to(point.x, self.step_x), round_to(point.y, self.step_y)))
    }

    /// Closest grid intersection among the 3×3 neighbourhood of `point`
    /// that lies within the threshold, else `point` unchanged.
    pub fn nearest_snap_candidate(&self, point: Point) -> SnapResult {
        if !self.enabled || self.step_x <= 0.0 || self.step_y <= 0.0 {
            return SnapResult::none(point);
        }

        let base_x = (point.x / self.step_x).round();
        let base_y = (point.y / self.step_y).round();
        let mut best: Option<Point> = None;
        let mut best_dist_sq = self.threshold * self.threshold;

        for dx in -1..=1 {
            for dy in -1..=1 {
                let candidate = Point::new(
                    (base_x + dx as f64) * self.step_x,
                    (base_y + dy as f64) * self.step_y,
                );
                let dist_sq = (candidate - point).hypot2();
                if dist_sq <= best_dist_sq {
                    best_dist_sq = dist_sq;
                    best = Some(candidate);
                }
            }
        }

        match best {
            Some(candidate) => SnapResult::both(candidate),
            None => SnapResult::none(point),
        }
    }

    /// Guides to show during a live drag. Never moves anything.
    pub fn guides(&self, point: Point) -> Vec<SnapGuide> {
        let result = self.nearest_snap_candidate(point);
        if result.is_snapped() {
            vec![
                SnapGuide::Vertical(result.point.x),
                SnapGuide::Horizontal(result.point.y),
            ]
        } else {
            Vec::new()
        }
    }
}
