//! 2D point in image coordinates.

use serde::{Deserialize, Serialize};

/// A polygon vertex in image pixel coordinates.
///
/// Selection is not stored on the point; it is queried from the owning
/// [`AnnotationSet`](super::AnnotationSet).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Box proximity test: both axis distances within `threshold`.
    pub fn is_near(&self, x: f32, y: f32, threshold: f32) -> bool {
        (self.x - x).abs() <= threshold && (self.y - y).abs() <= threshold
    }

    /// Arithmetic midpoint between two points.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Translate by a delta.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_near_is_a_box_test() {
        let p = Point::new(10.0, 10.0);
        assert!(p.is_near(12.0, 12.0, 10.0));
        // Corner of the box is further than 10 in Euclidean terms but still near
        assert!(p.is_near(20.0, 20.0, 10.0));
        assert!(!p.is_near(20.5, 10.0, 10.0));
        assert!(!p.is_near(10.0, -0.5, 10.0));
    }

    #[test]
    fn test_midpoint() {
        let m = Point::new(0.0, 0.0).midpoint(&Point::new(10.0, 4.0));
        assert_eq!(m, Point::new(5.0, 2.0));
    }
}
