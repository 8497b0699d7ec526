//! # Game Mathematics
//!
//! Axis-aligned rectangles and small vector helpers for the pixel-space games.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in pixel space.
///
/// Overlap is strict: rectangles that only share an edge do not intersect.
///
/// # Examples
///
/// ```
/// use arcade_hub::Rect;
///
/// let a = Rect::new(0.0, 0.0, 40.0, 40.0);
/// let b = Rect::new(40.0, 0.0, 40.0, 40.0);
/// assert!(!a.intersects(&b));
/// assert!(a.inflate(2.0, 2.0).intersects(&b));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Creates a rectangle of the given size centred on a point.
    pub fn from_center(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
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

    /// Returns true if the two rectangles share any interior area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Grows (or shrinks, for negative deltas) the rectangle about its centre.
    pub fn inflate(&self, dw: f32, dh: f32) -> Rect {
        Rect::new(
            self.x - dw / 2.0,
            self.y - dh / 2.0,
            self.w + dw,
            self.h + dh,
        )
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

/// A 2D vector of pixel coordinates or velocities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Returns the unit vector in the same direction, or `None` for a zero vector.
    pub fn normalized(self) -> Option<Vec2> {
        let len = self.length();
        if len <= f32::EPSILON {
            None
        } else {
            Some(Vec2::new(self.x / len, self.y / len))
        }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    pub fn scale(self, factor: f32) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rect::new(9.0, 9.0, 5.0, 5.0)));
    }

    #[test]
    fn test_rect_inflate_keeps_center() {
        let rect = Rect::new(10.0, 10.0, 40.0, 40.0);
        let grown = rect.inflate(20.0, 20.0);
        assert_eq!(grown.center(), rect.center());
        assert_eq!(grown.w, 60.0);

        let shrunk = rect.inflate(-2.0, -2.0);
        assert_eq!(shrunk.x, 11.0);
        assert_eq!(shrunk.w, 38.0);
    }

    #[test]
    fn test_vec_normalized() {
        let v = Vec2::new(3.0, 4.0).normalized().unwrap();
        assert!((v.length() - 1.0).abs() < 1e-6);
        assert!(Vec2::default().normalized().is_none());
    }

    #[test]
    fn test_from_center() {
        let rect = Rect::from_center(Vec2::new(50.0, 50.0), 10.0, 20.0);
        assert_eq!(rect.x, 45.0);
        assert_eq!(rect.y, 40.0);
        assert!(rect.contains_point(Vec2::new(50.0, 50.0)));
    }
}
