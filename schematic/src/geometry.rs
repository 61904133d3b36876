//! Rectangle and angle helpers shared by the connectivity engines.
use crate::point::Point;
use geo::{Coord, Rect};

/// Axis-aligned bounds in scene units.
pub type SceneRect = Rect<i64>;

/// How drawn segments are constrained, which determines how the angle
/// of a net is snapped before parallel/orthogonal comparisons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AngleMode {
    /// Horizontal and vertical only
    Manhattan,
    /// Multiples of 45 degrees
    Diagonal,
}

impl AngleMode {
    fn step(self) -> f64 {
        match self {
            AngleMode::Manhattan => 90.0,
            AngleMode::Diagonal => 45.0,
        }
    }
}

impl Default for AngleMode {
    fn default() -> Self {
        AngleMode::Manhattan
    }
}

/// Returns the rectilinear or manhattan distance between
/// two points.
pub fn manhattan_distance(a: Point, b: Point) -> i64 {
    (a.x() - b.x()).abs() + (a.y() - b.y()).abs()
}

fn coord(p: Point) -> Coord<i64> {
    Coord { x: p.x(), y: p.y() }
}

pub fn segment_rect(a: Point, b: Point) -> SceneRect {
    Rect::new(coord(a), coord(b))
}

/// A square of half-width `d` centered on `p`
pub fn point_rect(p: Point, d: i64) -> SceneRect {
    expand(&segment_rect(p, p), d)
}

/// Grow the rect by `d` on every side.  A negative `d` shrinks it; an
/// axis that would invert collapses onto its center line instead.
pub fn expand(rect: &SceneRect, d: i64) -> SceneRect {
    let (min, max) = (rect.min(), rect.max());
    let axis = |lo: i64, hi: i64| {
        if lo - d > hi + d {
            let mid = lo + (hi - lo) / 2;
            (mid, mid)
        } else {
            (lo - d, hi + d)
        }
    };
    let (x0, x1) = axis(min.x, max.x);
    let (y0, y1) = axis(min.y, max.y);
    Rect::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 })
}

/// Closed-interval overlap test; touching edges count as intersecting.
pub fn rects_intersect(a: &SceneRect, b: &SceneRect) -> bool {
    a.min().x <= b.max().x && b.min().x <= a.max().x && a.min().y <= b.max().y && b.min().y <= a.max().y
}

/// Direction of the vector `a -> b` in degrees, normalized to `[0, 360)`.
pub fn direction_angle(a: Point, b: Point) -> f64 {
    let dy = (b.y() - a.y()) as f64;
    let dx = (b.x() - a.x()) as f64;
    dy.atan2(dx).to_degrees().rem_euclid(360.0)
}

pub fn snap_angle(angle: f64, mode: AngleMode) -> f64 {
    let step = mode.step();
    ((angle / step).round() * step).rem_euclid(360.0)
}

fn difference_mod_180(a: f64, b: f64) -> f64 {
    (a - b).rem_euclid(180.0)
}

pub fn is_parallel(a: f64, b: f64, tolerance: f64) -> bool {
    let d = difference_mod_180(a, b);
    d <= tolerance || 180.0 - d <= tolerance
}

pub fn is_orthogonal(a: f64, b: f64, tolerance: f64) -> bool {
    (difference_mod_180(a, b) - 90.0).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn angles() {
        let o = Point::new(0, 0);
        assert!(close(0.0, direction_angle(o, Point::new(10, 0))));
        assert!(close(90.0, direction_angle(o, Point::new(0, 10))));
        assert!(close(180.0, direction_angle(o, Point::new(-10, 0))));
        assert!(close(270.0, direction_angle(o, Point::new(0, -10))));

        assert_eq!(0.0, snap_angle(359.5, AngleMode::Manhattan));
        assert_eq!(90.0, snap_angle(60.0, AngleMode::Manhattan));
        assert_eq!(45.0, snap_angle(60.0, AngleMode::Diagonal));

        assert!(is_parallel(0.0, 180.0, 1.0));
        assert!(is_parallel(90.0, 270.0, 1.0));
        assert!(is_parallel(0.5, 179.8, 1.0));
        assert!(!is_parallel(0.0, 90.0, 1.0));
        assert!(is_orthogonal(0.0, 90.0, 1.0));
        assert!(is_orthogonal(180.0, 270.0, 1.0));
        assert!(!is_orthogonal(45.0, 90.0, 1.0));
    }

    #[test]
    fn rects() {
        let a = segment_rect(Point::new(10, 0), Point::new(0, 0));
        assert_eq!(Coord { x: 0, y: 0 }, a.min());
        assert_eq!(Coord { x: 10, y: 0 }, a.max());

        let grown = expand(&a, 2);
        assert_eq!(Coord { x: -2, y: -2 }, grown.min());
        assert_eq!(Coord { x: 12, y: 2 }, grown.max());

        let shrunk = expand(&a, -2);
        assert_eq!(Coord { x: 2, y: 0 }, shrunk.min());
        assert_eq!(Coord { x: 8, y: 0 }, shrunk.max());

        let b = segment_rect(Point::new(10, 0), Point::new(20, 0));
        assert!(rects_intersect(&a, &b));
        let c = segment_rect(Point::new(13, 0), Point::new(20, 0));
        assert!(!rects_intersect(&a, &c));
        assert!(rects_intersect(&expand(&a, 2), &expand(&c, 2)));

        assert_eq!(3, manhattan_distance(Point::new(1, 1), Point::new(2, 3)));
    }
}
