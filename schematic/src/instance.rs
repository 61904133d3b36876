use crate::pin::Pin;
use crate::point::{Point, Rotation, Transform};
use indexmap::IndexMap;

/// Name of the attribute that fixes the order of pins in a netlist line
pub const PIN_ORDER_ATTRIBUTE: &str = "pinOrder";

/// An instance of a symbol placed on a schematic
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SymbolInstance {
    /// instance name eg: I0, R1
    pub name: String,
    /// library cell the symbol was taken from
    pub cell: String,
    /// Where the symbol origin lands in the scene and how it is rotated
    pub transform: Transform,
    /// pins in symbol-local coordinates, in symbol order
    pub pins: Vec<Pin>,
    /// attributes in the order the symbol declares them
    pub attributes: IndexMap<String, String>,
}

impl SymbolInstance {
    pub fn new<S: Into<String>, C: Into<String>>(name: S, cell: C) -> Self {
        Self {
            name: name.into(),
            cell: cell.into(),
            transform: Transform::identity(),
            pins: Vec::new(),
            attributes: IndexMap::new(),
        }
    }

    pub fn at(mut self, position: Point, rotation: Rotation) -> Self {
        self.transform = Transform::new(position, rotation);
        self
    }

    pub fn with_pin(mut self, pin: Pin) -> Self {
        self.pins.push(pin);
        self
    }

    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn pin_idx_by_name(&self, name: &str) -> Option<usize> {
        self.pins.iter().position(|pin| pin.name == name)
    }

    /// The pins with their points mapped into the scene
    pub fn scene_pins(&self) -> Vec<Pin> {
        self.pins
            .iter()
            .map(|pin| Pin {
                point: self.transform.apply(pin.point),
                ..pin.clone()
            })
            .collect()
    }

    /// The `pinOrder` attribute split into pin names, if present
    pub fn pin_order(&self) -> Option<Vec<String>> {
        let order = self.attributes.get(PIN_ORDER_ATTRIBUTE)?;
        Some(
            order
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_follow_instance_placement() {
        let inst = SymbolInstance::new("I0", "nmos")
            .at(Point::new(100, 100), Rotation::new(90.0))
            .with_pin(Pin::new("D", Point::new(0, -20)))
            .with_pin(Pin::new("S", Point::new(0, 20)));

        let pins = inst.scene_pins();
        assert_eq!(Point::new(120, 100), pins[0].point);
        assert_eq!(Point::new(80, 100), pins[1].point);
        assert_eq!(Some(1), inst.pin_idx_by_name("S"));
    }

    #[test]
    fn pin_order_attribute() {
        let inst = SymbolInstance::new("I0", "nmos").with_attribute(PIN_ORDER_ATTRIBUTE, " D, G ,S,, B");
        assert_eq!(
            Some(vec!["D".to_owned(), "G".to_owned(), "S".to_owned(), "B".to_owned()]),
            inst.pin_order()
        );
        assert_eq!(None, SymbolInstance::new("I1", "res").pin_order());
    }
}
