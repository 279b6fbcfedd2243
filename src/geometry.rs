// =============================================================================
// GEOMETRY.RS — Rectangles and scalar helpers shared by the camera and renderer
//
// - `Rect`: axis-aligned rectangle (viewport, bounds, deadzone, world view)
// - `clamp` / `linear`: scalar helpers used by scroll clamping and follow lerp
// - `distance`: Euclidean distance (light culling)
// =============================================================================

use glam::Vec2;
use serde::{Deserialize, Serialize};

// ── Scalars ───────────────────────────────────────────────────────────────────

/// Clamp `value` into `[min, max]`.
///
/// Unlike `f32::clamp` this never panics: when `min > max` the result is `max`,
/// which is what scroll clamping expects when the bounds are smaller than the
/// view.
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Linear interpolation from `p0` to `p1` by `t`.
#[inline]
pub fn linear(p0: f32, p1: f32, t: f32) -> f32 {
    (p1 - p0) * t + p0
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x1 - x2;
    let dy = y1 - y2;
    (dx * dx + dy * dy).sqrt()
}

// ── Rect ──────────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle with a top-left origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn set_to(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        *self = Self { x, y, width, height };
        self
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x(), self.center_y())
    }

    /// Move the rectangle so its center lands on `(x, y)`.
    pub fn center_on(&mut self, x: f32, y: f32) -> &mut Self {
        self.x = x - self.width / 2.0;
        self.y = y - self.height / 2.0;
        self
    }

    /// Inclusive of the left/top edge, exclusive of the right/bottom edge.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        if self.width <= 0.0 || self.height <= 0.0 {
            return false;
        }
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Strict overlap test; touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right() <= other.x
            || self.x >= other.right()
            || self.bottom() <= other.y
            || self.y >= other.bottom())
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_with_inverted_range_returns_max() {
        assert_eq!(clamp(5.0, 10.0, 2.0), 2.0);
    }

    #[test]
    fn linear_endpoints() {
        assert_eq!(linear(2.0, 6.0, 0.0), 2.0);
        assert_eq!(linear(2.0, 6.0, 1.0), 6.0);
        assert_eq!(linear(2.0, 6.0, 0.5), 4.0);
    }

    #[test]
    fn center_on_moves_top_left() {
        let mut r = Rect::new(0.0, 0.0, 100.0, 50.0);
        r.center_on(200.0, 200.0);
        assert_eq!((r.x, r.y), (150.0, 175.0));
        assert_eq!(r.center(), Vec2::new(200.0, 200.0));
    }

    #[test]
    fn contains_excludes_far_edges() {
        let r = Rect::new(10.0, 10.0, 10.0, 10.0);
        assert!(r.contains(10.0, 10.0));
        assert!(!r.contains(20.0, 15.0));
        assert!(!Rect::new(0.0, 0.0, 0.0, 5.0).contains(0.0, 0.0));
    }
}
