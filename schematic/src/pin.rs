use crate::geometry::{self, SceneRect};
use crate::point::Point;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum PinDirection {
    Input,
    Output,
    Inout,
}

impl Default for PinDirection {
    fn default() -> Self {
        PinDirection::Inout
    }
}

/// The electrical role of a pin
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum PinType {
    Signal,
    Ground,
    Power,
    Clock,
    Digital,
    Analog,
}

impl Default for PinType {
    fn default() -> Self {
        PinType::Signal
    }
}

/// A connection point: either a pin drawn on a symbol (in the symbol's
/// local coordinates) or a schematic pin placed directly in the scene.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Pin {
    pub name: String,
    pub point: Point,
    pub direction: PinDirection,
    pub pin_type: PinType,
}

impl Pin {
    pub fn new<S: Into<String>>(name: S, point: Point) -> Self {
        Self {
            name: name.into(),
            point,
            direction: PinDirection::default(),
            pin_type: PinType::default(),
        }
    }

    pub fn with_direction(mut self, direction: PinDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_type(mut self, pin_type: PinType) -> Self {
        self.pin_type = pin_type;
        self
    }

    /// Global pins (`gnd!`, `vdd!`) name every net they touch, across the
    /// whole design.
    pub fn is_global(&self) -> bool {
        self.name.ends_with('!')
    }
}

/// Where a pin in the flattened scene view came from
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Ord, PartialOrd)]
pub enum PinOrigin {
    /// A hierarchical pin placed on the schematic itself
    Schematic,
    /// A pin of the symbol instance at this index in the scene
    Symbol { instance: usize },
}

/// A pin mapped into scene coordinates
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct PlacedPin {
    pub pin: Pin,
    pub origin: PinOrigin,
}

impl PlacedPin {
    pub fn point(&self) -> Point {
        self.pin.point
    }

    pub fn name(&self) -> &str {
        &self.pin.name
    }

    pub fn is_global(&self) -> bool {
        self.pin.is_global()
    }

    pub fn rect(&self, tolerance: i64) -> SceneRect {
        geometry::point_rect(self.pin.point, tolerance)
    }
}
