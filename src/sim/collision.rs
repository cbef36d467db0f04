//! Axis-aligned boxes, overlap tests and spawn spacing
//!
//! Everything in the world is a box. Collision is a plain AABB test against
//! hitboxes inset from the drawn sprites, so grazing contacts don't count.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap; touching edges do not collide
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Shrink by per-side insets
    pub fn inset(&self, left: f32, top: f32, right: f32, bottom: f32) -> Rect {
        Rect {
            x: self.x + left,
            y: self.y + top,
            w: (self.w - left - right).max(0.0),
            h: (self.h - top - bottom).max(0.0),
        }
    }

    pub fn offset_y(&self, dy: f32) -> Rect {
        Rect { y: self.y + dy, ..*self }
    }

    /// Edge-to-edge horizontal distance (0 when the spans overlap)
    pub fn gap_x(&self, other: &Rect) -> f32 {
        (self.x.max(other.x) - self.right().min(other.right())).max(0.0)
    }

    /// Edge-to-edge vertical distance (0 when the spans overlap)
    pub fn gap_y(&self, other: &Rect) -> f32 {
        (self.y.max(other.y) - self.bottom().min(other.bottom())).max(0.0)
    }
}

/// Pig hitbox, tighter than the sprite
pub fn pig_hitbox(sprite: &Rect) -> Rect {
    sprite.inset(6.0, 6.0, 6.0, 2.0)
}

/// Obstacle hitbox, trimmed so grazing a corner is forgiven
pub fn obstacle_hitbox(sprite: &Rect) -> Rect {
    sprite.inset(2.0, 2.0, 2.0, 0.0)
}

/// True when two boxes are closer than the minimum gap on BOTH axes.
///
/// A candidate spawn that violates the gap against any live entity is
/// dropped so no cluster becomes unreachable.
pub fn spawn_gap_violated(a: &Rect, b: &Rect, min_gap_x: f32, min_gap_y: f32) -> bool {
    a.gap_x(b) < min_gap_x && a.gap_y(b) < min_gap_y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_and_touching() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        // Touching edge is not an overlap
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_gaps() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(30.0, 50.0, 10.0, 10.0);
        assert_eq!(a.gap_x(&b), 20.0);
        assert_eq!(a.gap_y(&b), 40.0);
        assert_eq!(b.gap_x(&a), 20.0);
        assert_eq!(a.gap_x(&Rect::new(5.0, 0.0, 1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_spawn_gap_needs_both_axes() {
        let ground = Rect::new(100.0, 240.0, 30.0, 40.0);
        // Horizontally close but far above: allowed
        let high = Rect::new(110.0, 100.0, 28.0, 28.0);
        assert!(!spawn_gap_violated(&ground, &high, 96.0, 36.0));
        // Close on both axes: rejected
        let low = Rect::new(150.0, 200.0, 28.0, 28.0);
        assert!(spawn_gap_violated(&ground, &low, 96.0, 36.0));
        // Far horizontally: allowed
        let far = Rect::new(400.0, 240.0, 30.0, 40.0);
        assert!(!spawn_gap_violated(&ground, &far, 96.0, 36.0));
    }

    #[test]
    fn test_hitboxes_shrink() {
        let sprite = Rect::new(162.0, 241.0, 54.0, 40.0);
        let hb = pig_hitbox(&sprite);
        assert_eq!(hb, Rect::new(168.0, 247.0, 42.0, 32.0));
        let ob = obstacle_hitbox(&Rect::new(0.0, 0.0, 20.0, 40.0));
        assert_eq!(ob, Rect::new(2.0, 2.0, 16.0, 38.0));
    }
}
