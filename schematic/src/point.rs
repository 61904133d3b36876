use geo::Point as GeoPoint;
use ordered_float::NotNan;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

/// A location in scene units.  Schematic editing happens on an integer
/// grid, so unlike layout geometry there is no floating point here.
#[derive(Clone, Copy)]
pub struct Point(GeoPoint<i64>);

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Point(GeoPoint::new(x, y))
    }

    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Point::new(self.x() + dx, self.y() + dy)
    }

    pub fn relative_to(self, origin: Point) -> Self {
        Point::new(self.x() - origin.x(), self.y() - origin.y())
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Point) -> bool {
        self.x() == other.x() && self.y() == other.y()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x().hash(state);
        self.y().hash(state);
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Point) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Point) -> Ordering {
        (self.x(), self.y()).cmp(&(other.x(), other.y()))
    }
}

impl Deref for Point {
    type Target = GeoPoint<i64>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x(), self.y())
    }
}

impl From<(i64, i64)> for Point {
    fn from((x, y): (i64, i64)) -> Self {
        Point::new(x, y)
    }
}

impl From<[i64; 2]> for Point {
    fn from(xy: [i64; 2]) -> Self {
        Point::new(xy[0], xy[1])
    }
}

impl From<Point> for [i64; 2] {
    fn from(p: Point) -> Self {
        [p.x(), p.y()]
    }
}

/// Rotation measured in degrees, counter-clockwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rotation(NotNan<f64>);

impl Rotation {
    /// NaN collapses to no rotation.
    pub fn new(degrees: f64) -> Self {
        Rotation(NotNan::new(degrees).unwrap_or_default())
    }

    pub fn degrees(self) -> f64 {
        *self.0
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::new(0.0)
    }
}

impl Deref for Rotation {
    type Target = NotNan<f64>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Maps item-local coordinates into the scene: rotate about the local
/// origin, then translate to `position`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Transform {
    pub position: Point,
    pub rotation: Rotation,
}

impl Transform {
    pub fn new(position: Point, rotation: Rotation) -> Self {
        Self { position, rotation }
    }

    pub fn identity() -> Self {
        Self::new(Point::new(0, 0), Rotation::default())
    }

    pub fn translate(position: Point) -> Self {
        Self::new(position, Rotation::default())
    }

    pub fn apply(&self, p: Point) -> Point {
        let (x, y) = (p.x() as f64, p.y() as f64);
        let (sin, cos) = self.rotation.degrees().to_radians().sin_cos();
        let rx = (x * cos - y * sin).round() as i64;
        let ry = (x * sin + y * cos).round() as i64;
        Point::new(rx, ry).offset(self.position.x(), self.position.y())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::identity()
    }
}

/// The editor's `(major, minor)` snap tuple.  Geometry is snapped to the
/// minor grid; the major grid only matters to the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapGrid {
    pub major: i64,
    pub minor: i64,
}

impl SnapGrid {
    pub fn new(major: i64, minor: i64) -> Self {
        Self { major, minor }
    }

    pub fn snap_value(&self, v: i64) -> i64 {
        if self.minor <= 0 {
            return v;
        }
        let q = (v as f64 / self.minor as f64).round() as i64;
        q * self.minor
    }

    pub fn snap(&self, p: Point) -> Point {
        Point::new(self.snap_value(p.x()), self.snap_value(p.y()))
    }
}

impl Default for SnapGrid {
    fn default() -> Self {
        SnapGrid::new(10, 5)
    }
}
