//! Rectangles.

use cgmath::{Point2, Vector2, Zero};

/// A rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Rectangle origin.
    pub origin: Point2<f64>,

    /// Rectangle size.
    pub size: Vector2<f64>,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(origin: Point2<f64>, size: Vector2<f64>) -> Rect {
        Rect { origin, size }
    }

    /// Shorthand for `Rect::new` with scalar components.
    pub fn xywh(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect {
            origin: Point2::new(x, y),
            size: Vector2::new(w, h),
        }
    }

    /// Returns a zero-sized rectangle at the origin.
    pub fn zero() -> Rect {
        Rect {
            origin: Point2::new(0., 0.),
            size: Vector2::zero(),
        }
    }

    /// Returns the smallest rectangle containing all given points, or None if there are none.
    pub fn bounding(points: &[Point2<f64>]) -> Option<Rect> {
        let first = points.first()?;
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.x, first.y);
        for point in &points[1..] {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        Some(Rect::xywh(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Returns the four corners, clockwise from the origin.
    pub fn corners(&self) -> [Point2<f64>; 4] {
        let o = self.origin;
        [
            o,
            Point2::new(o.x + self.size.x, o.y),
            o + self.size,
            Point2::new(o.x, o.y + self.size.y),
        ]
    }

    /// Returns true if the point is inside the rectangle.
    ///
    /// The minimum edges are inclusive and the maximum edges exclusive, so that two adjacent
    /// rectangles never both contain a point.
    pub fn contains(&self, point: Point2<f64>) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x + self.size.x
            && point.y < self.origin.y + self.size.y
    }
}
