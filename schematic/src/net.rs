use crate::error::ErrorKind;
use crate::geometry::{self, AngleMode, SceneRect};
use crate::point::{Point, Transform};
use failure::Fallible;
use std::convert::TryFrom;
use std::fmt;

/// How firmly a net holds on to its name.  Ordered so that the
/// stronger claim compares greater.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Ord, PartialOrd)]
pub enum NameStrength {
    /// Nothing assigned yet, or an auto-generated `netN` name
    None = 0,
    /// Picked up from a connected net or pin
    Inherited = 1,
    /// Entered by the user; never silently overwritten
    Set = 2,
}

impl Default for NameStrength {
    fn default() -> Self {
        NameStrength::None
    }
}

impl TryFrom<u8> for NameStrength {
    type Error = failure::Error;

    fn try_from(value: u8) -> Fallible<Self> {
        match value {
            0 => Ok(NameStrength::None),
            1 => Ok(NameStrength::Inherited),
            2 => Ok(NameStrength::Set),
            _ => Err(ErrorKind::InvalidNameStrength(value).into()),
        }
    }
}

impl From<NameStrength> for u8 {
    fn from(strength: NameStrength) -> u8 {
        strength as u8
    }
}

/// Identifies a net within a `Scene`.  Ids are handed out in increasing
/// order and never reused, so sorting by id is sorting by creation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Ord, PartialOrd)]
pub struct NetId(pub(crate) u64);

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A drawn wire segment.
///
/// The shape is fixed at construction: anything that changes the geometry
/// (merge, split) builds a new `Net` and swaps it into the scene.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Net {
    start: Point,
    end: Point,
    transform: Transform,
    pub name: String,
    pub name_strength: NameStrength,
    /// Set when two connected nets carry different user-entered names
    pub name_conflict: bool,
    /// Drawn emphasised by the editor; tracks `name_conflict` after grouping
    pub highlighted: bool,
}

impl Net {
    /// A net whose endpoints are already in scene coordinates
    pub fn new(start: Point, end: Point) -> Self {
        Net::with_transform(start, end, Transform::identity())
    }

    pub fn with_transform(start: Point, end: Point, transform: Transform) -> Self {
        Net {
            start,
            end,
            transform,
            name: String::new(),
            name_strength: NameStrength::None,
            name_conflict: false,
            highlighted: false,
        }
    }

    pub fn named<S: Into<String>>(mut self, name: S, strength: NameStrength) -> Self {
        self.rename(name, strength);
        self
    }

    pub fn rename<S: Into<String>>(&mut self, name: S, strength: NameStrength) {
        self.name = name.into();
        self.name_strength = strength;
    }

    /// Drop any name that was not entered by the user
    pub fn clear_derived_name(&mut self) {
        if self.name_strength != NameStrength::Set {
            self.name.clear();
            self.name_strength = NameStrength::None;
        }
    }

    pub fn flag_conflict(&mut self) {
        self.name_conflict = true;
        self.highlighted = true;
    }

    /// Pick up the name of a connected net.  A user-set name is kept and
    /// a copied name is never stronger than `Inherited`.
    /// Returns false when both are `Set` and disagree, which is a conflict
    /// for the caller to report.
    pub fn inherit(&mut self, from: &Net) -> bool {
        if self.name_strength == NameStrength::Set {
            return from.name_strength != NameStrength::Set || self.name == from.name;
        }
        if !from.name.is_empty() {
            self.name = from.name.clone();
            self.name_strength = from.name_strength.min(NameStrength::Inherited);
        }
        true
    }

    /// Start point in scene coordinates
    pub fn start(&self) -> Point {
        self.transform.apply(self.start)
    }

    /// End point in scene coordinates
    pub fn end(&self) -> Point {
        self.transform.apply(self.end)
    }

    pub fn endpoints(&self) -> [Point; 2] {
        [self.start(), self.end()]
    }

    pub fn is_null(&self) -> bool {
        self.start() == self.end()
    }

    pub fn length(&self) -> f64 {
        let (a, b) = (self.start(), self.end());
        let dx = (b.x() - a.x()) as f64;
        let dy = (b.y() - a.y()) as f64;
        dx.hypot(dy)
    }

    pub fn rect(&self) -> SceneRect {
        geometry::segment_rect(self.start(), self.end())
    }

    pub fn angle(&self, mode: AngleMode) -> f64 {
        geometry::snap_angle(geometry::direction_angle(self.start(), self.end()), mode)
    }

    pub fn is_parallel_to(&self, other: &Net, mode: AngleMode, tolerance: f64) -> bool {
        geometry::is_parallel(self.angle(mode), other.angle(mode), tolerance)
    }

    pub fn is_orthogonal_to(&self, other: &Net, mode: AngleMode, tolerance: f64) -> bool {
        geometry::is_orthogonal(self.angle(mode), other.angle(mode), tolerance)
    }

    pub fn has_endpoint_near(&self, p: Point, tolerance: i64) -> bool {
        self.endpoints()
            .iter()
            .any(|e| geometry::manhattan_distance(*e, p) <= tolerance)
    }

    /// Distance from `p` to the infinite line through this net, and the
    /// position of its projection measured from `start()`.
    fn project(&self, p: Point) -> Option<(f64, f64)> {
        let (a, b) = (self.start(), self.end());
        let len = self.length();
        if len == 0.0 {
            return None;
        }
        let (ux, uy) = ((b.x() - a.x()) as f64 / len, (b.y() - a.y()) as f64 / len);
        let (px, py) = ((p.x() - a.x()) as f64, (p.y() - a.y()) as f64);
        let along = px * ux + py * uy;
        let across = (px * uy - py * ux).abs();
        Some((across, along))
    }

    /// True if `p` lies within `tolerance` of the infinite line through
    /// this net.
    pub fn is_collinear_with(&self, p: Point, tolerance: i64) -> bool {
        match self.project(p) {
            Some((across, _)) => across <= tolerance as f64,
            None => false,
        }
    }

    /// Scalar position of `p` along the direction of this net
    pub fn position_along(&self, p: Point) -> f64 {
        self.project(p).map(|(_, along)| along).unwrap_or(0.0)
    }

    /// True if `p` sits on the segment but more than `tolerance` away from
    /// both of its ends.
    pub fn interior_contains(&self, p: Point, tolerance: i64) -> bool {
        match self.project(p) {
            Some((across, along)) => {
                let t = tolerance as f64;
                across <= t && along > t && along < self.length() - t
            }
            None => false,
        }
    }

    /// Where the two nets cross, if they do so strictly inside both.
    pub fn interior_crossing(&self, other: &Net, tolerance: i64) -> Option<Point> {
        let (p, r) = (self.start(), self.end());
        let (q, s) = (other.start(), other.end());
        let (rx, ry) = ((r.x() - p.x()) as f64, (r.y() - p.y()) as f64);
        let (sx, sy) = ((s.x() - q.x()) as f64, (s.y() - q.y()) as f64);
        let denom = rx * sy - ry * sx;
        if denom == 0.0 {
            return None;
        }
        let (qpx, qpy) = ((q.x() - p.x()) as f64, (q.y() - p.y()) as f64);
        let t = (qpx * sy - qpy * sx) / denom;
        let hit = Point::new(
            (p.x() as f64 + t * rx).round() as i64,
            (p.y() as f64 + t * ry).round() as i64,
        );
        if self.interior_contains(hit, tolerance) && other.interior_contains(hit, tolerance) {
            Some(hit)
        } else {
            None
        }
    }

    /// A net covering `start..end` that carries this net's name, if that
    /// name is worth keeping.
    pub fn piece(&self, start: Point, end: Point) -> Net {
        let mut piece = Net::new(start, end);
        if self.name_strength > NameStrength::None {
            piece.rename(self.name.clone(), self.name_strength);
        }
        piece.name_conflict = self.name_conflict;
        piece.highlighted = self.highlighted;
        piece
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Rotation;

    #[test]
    fn scene_endpoints_follow_transform() {
        let net = Net::with_transform(
            Point::new(0, 0),
            Point::new(10, 0),
            Transform::new(Point::new(50, 50), Rotation::new(90.0)),
        );
        assert_eq!(Point::new(50, 50), net.start());
        assert_eq!(Point::new(50, 60), net.end());
        assert_eq!(90.0, net.angle(AngleMode::Manhattan));
    }

    #[test]
    fn inherit_respects_strength() {
        let set_a = Net::new(Point::new(0, 0), Point::new(10, 0)).named("clk", NameStrength::Set);
        let set_b = Net::new(Point::new(10, 0), Point::new(20, 0)).named("rst", NameStrength::Set);

        let mut plain = Net::new(Point::new(0, 0), Point::new(0, 10));
        assert!(plain.inherit(&set_a));
        assert_eq!("clk", plain.name);
        assert_eq!(NameStrength::Inherited, plain.name_strength);

        let mut user = set_b.clone();
        assert!(!user.inherit(&set_a));
        assert_eq!("rst", user.name);
        assert!(user.inherit(&plain));
        assert_eq!("rst", user.name);
        assert_eq!(NameStrength::Set, user.name_strength);

        let mut auto = Net::new(Point::new(0, 0), Point::new(0, 10)).named("net3", NameStrength::None);
        assert!(auto.inherit(&plain));
        assert_eq!("clk", auto.name);
    }

    #[test]
    fn interior_and_crossing() {
        let h = Net::new(Point::new(0, 0), Point::new(20, 0));
        assert!(h.interior_contains(Point::new(10, 0), 2));
        assert!(!h.interior_contains(Point::new(1, 0), 2));
        assert!(!h.interior_contains(Point::new(20, 0), 2));
        assert!(!h.interior_contains(Point::new(10, 5), 2));

        let v = Net::new(Point::new(10, -5), Point::new(10, 5));
        assert_eq!(Some(Point::new(10, 0)), h.interior_crossing(&v, 2));
        let t = Net::new(Point::new(10, 0), Point::new(10, 5));
        assert_eq!(None, h.interior_crossing(&t, 2));

        assert!(h.has_endpoint_near(Point::new(21, 0), 1));
        assert!(!h.has_endpoint_near(Point::new(22, 0), 1));
    }

    #[test]
    fn name_strength_from_record() {
        assert_eq!(NameStrength::Set, NameStrength::try_from(2).unwrap());
        assert!(NameStrength::try_from(3).is_err());
        assert_eq!(1u8, u8::from(NameStrength::Inherited));
    }
}
