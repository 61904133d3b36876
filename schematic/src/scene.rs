//! The in-memory schematic: nets, schematic pins and symbol instances,
//! plus the lookups the engines run against it.
use crate::geometry::{self, SceneRect};
use crate::instance::SymbolInstance;
use crate::net::{Net, NetId};
use crate::pin::{Pin, PinOrigin, PlacedPin};
use log::debug;
use std::collections::BTreeMap;

/// The queries the merge, split and grouping engines need from a scene.
///
/// Everything returns ids in ascending order so that the engines behave
/// the same way on every run.  `Scene` answers these with a linear scan;
/// a spatial index only has to implement `nets_intersecting` to slot in.
pub trait ConnectivityIndex {
    fn net(&self, id: NetId) -> Option<&Net>;

    fn all_nets(&self) -> Vec<NetId>;

    fn all_pins(&self) -> Vec<PlacedPin>;

    /// Nets whose bounding rect intersects `rect`
    fn nets_intersecting(&self, rect: &SceneRect) -> Vec<NetId>;

    /// Nets other than `id` whose rect comes within `tolerance` of it
    fn overlapping_nets(&self, id: NetId, tolerance: i64) -> Vec<NetId> {
        let rect = match self.net(id) {
            Some(net) => geometry::expand(&net.rect(), tolerance),
            None => return vec![],
        };
        self.nets_intersecting(&rect)
            .into_iter()
            .filter(|other| *other != id)
            .collect()
    }

    /// Nets found in the pin's tolerance box
    fn nets_at_pin(&self, pin: &PlacedPin, tolerance: i64) -> Vec<NetId> {
        self.nets_intersecting(&pin.rect(tolerance))
    }
}

/// A geometry change to the scene, as nets taken out and nets put in.
///
/// Every engine operation returns one of these; the editor turns it into
/// a single undo step.  Removed nets are kept in full so that `undo` can
/// put them back under their old ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneEdit {
    pub removed: Vec<(NetId, Net)>,
    pub added: Vec<(NetId, Net)>,
}

impl SceneEdit {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    pub fn added_ids(&self) -> Vec<NetId> {
        self.added.iter().map(|(id, _)| *id).collect()
    }

    pub fn removed_ids(&self) -> Vec<NetId> {
        self.removed.iter().map(|(id, _)| *id).collect()
    }

    /// Append a later edit.  A net that this edit added and `next`
    /// removes again never existed as far as the combined edit goes.
    pub fn then(&mut self, next: SceneEdit) {
        for (id, net) in next.removed {
            match self.added.iter().position(|(added, _)| *added == id) {
                Some(idx) => {
                    self.added.remove(idx);
                }
                None => self.removed.push((id, net)),
            }
        }
        self.added.extend(next.added);
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    nets: BTreeMap<NetId, Net>,
    next_id: u64,
    /// Hierarchical pins placed on the schematic
    pub pins: Vec<Pin>,
    pub instances: Vec<SymbolInstance>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the net as-is, without merging or splitting.  Null nets are
    /// dropped.
    pub fn add_net(&mut self, net: Net) -> Option<NetId> {
        if net.is_null() {
            debug!("discarding null net at {:?}", net.start());
            return None;
        }
        let id = NetId(self.next_id);
        self.next_id += 1;
        self.nets.insert(id, net);
        Some(id)
    }

    pub fn add_pin(&mut self, pin: Pin) {
        self.pins.push(pin);
    }

    pub fn add_instance(&mut self, instance: SymbolInstance) {
        self.instances.push(instance);
    }

    pub fn net_mut(&mut self, id: NetId) -> Option<&mut Net> {
        self.nets.get_mut(&id)
    }

    pub fn contains(&self, id: NetId) -> bool {
        self.nets.contains_key(&id)
    }

    pub fn nets(&self) -> impl Iterator<Item = (NetId, &Net)> {
        self.nets.iter().map(|(id, net)| (*id, net))
    }

    pub fn nets_mut(&mut self) -> impl Iterator<Item = (NetId, &mut Net)> {
        self.nets.iter_mut().map(|(id, net)| (*id, net))
    }

    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// Swap the `old` nets out for `new` ones.  This is the only way the
    /// engines change geometry.  Null nets in `new` are silently dropped.
    pub fn replace(&mut self, old: &[NetId], new: Vec<Net>) -> SceneEdit {
        let mut edit = SceneEdit::default();
        for id in old {
            if let Some(net) = self.nets.remove(id) {
                edit.removed.push((*id, net));
            }
        }
        for net in new {
            if let Some(id) = self.add_net(net.clone()) {
                edit.added.push((id, net));
            }
        }
        edit
    }

    pub fn undo(&mut self, edit: &SceneEdit) {
        for (id, _) in &edit.added {
            self.nets.remove(id);
        }
        for (id, net) in &edit.removed {
            self.nets.insert(*id, net.clone());
        }
    }

    pub fn redo(&mut self, edit: &SceneEdit) {
        for (id, _) in &edit.removed {
            self.nets.remove(id);
        }
        for (id, net) in &edit.added {
            self.nets.insert(*id, net.clone());
        }
    }
}

impl ConnectivityIndex for Scene {
    fn net(&self, id: NetId) -> Option<&Net> {
        self.nets.get(&id)
    }

    fn all_nets(&self) -> Vec<NetId> {
        self.nets.keys().cloned().collect()
    }

    fn all_pins(&self) -> Vec<PlacedPin> {
        let mut pins: Vec<PlacedPin> = self
            .pins
            .iter()
            .map(|pin| PlacedPin {
                pin: pin.clone(),
                origin: PinOrigin::Schematic,
            })
            .collect();
        for (instance, inst) in self.instances.iter().enumerate() {
            pins.extend(inst.scene_pins().into_iter().map(|pin| PlacedPin {
                pin,
                origin: PinOrigin::Symbol { instance },
            }));
        }
        pins
    }

    fn nets_intersecting(&self, rect: &SceneRect) -> Vec<NetId> {
        self.nets
            .iter()
            .filter(|(_, net)| geometry::rects_intersect(&net.rect(), rect))
            .map(|(id, _)| *id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point;

    fn line(x0: i64, y0: i64, x1: i64, y1: i64) -> Net {
        Net::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn overlap_query_uses_tolerance() {
        let mut scene = Scene::new();
        let a = scene.add_net(line(0, 0, 10, 0)).unwrap();
        let b = scene.add_net(line(12, 0, 20, 0)).unwrap();
        let _c = scene.add_net(line(30, 0, 40, 0)).unwrap();
        assert_eq!(None, scene.add_net(line(5, 5, 5, 5)));

        assert_eq!(vec![b], scene.overlapping_nets(a, 2));
        assert!(scene.overlapping_nets(a, 1).is_empty());
    }

    #[test]
    fn replace_then_undo_redo() {
        let mut scene = Scene::new();
        let a = scene.add_net(line(0, 0, 20, 0)).unwrap();
        let edit = scene.replace(&[a], vec![line(0, 0, 10, 0), line(10, 0, 20, 0), line(20, 0, 20, 0)]);
        assert_eq!(vec![a], edit.removed_ids());
        assert_eq!(2, edit.added.len());
        assert_eq!(2, scene.net_count());

        scene.undo(&edit);
        assert_eq!(vec![a], scene.all_nets());
        scene.redo(&edit);
        assert_eq!(edit.added_ids(), scene.all_nets());
    }

    #[test]
    fn composed_edit_drops_transient_nets() {
        let mut scene = Scene::new();
        let a = scene.add_net(line(0, 0, 10, 0)).unwrap();
        let b = scene.add_net(line(10, 0, 20, 0)).unwrap();
        let mut edit = scene.replace(&[a], vec![line(0, 0, 15, 0)]);
        let transient = edit.added_ids()[0];
        edit.then(scene.replace(&[transient, b], vec![line(0, 0, 20, 0)]));

        assert_eq!(vec![a, b], edit.removed_ids());
        assert_eq!(1, edit.added.len());

        scene.undo(&edit);
        assert_eq!(vec![a, b], scene.all_nets());
    }
}
