//! Resolving each symbol pin to the name of the net attached to it, in
//! the shape a netlist writer wants.
use crate::config::EngineConfig;
use crate::diagnostic::Diagnostic;
use crate::geometry::manhattan_distance;
use crate::grouping::NetCounter;
use crate::instance::SymbolInstance;
use crate::pin::{PinOrigin, PlacedPin};
use crate::scene::{ConnectivityIndex, Scene};
use indexmap::IndexMap;

/// Pin name to net name for one instance, in netlist order
pub type PinNetMap = IndexMap<String, String>;

/// Instance name to its pin map, in scene order
pub type PinNetMaps = IndexMap<String, PinNetMap>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PinMapping {
    pub maps: PinNetMaps,
    pub diagnostics: Vec<Diagnostic>,
}

/// The named net a pin sits on.  When several nets reach into the pin's
/// box the one with an endpoint closest to the pin wins, then the
/// smaller name, then the older net.
fn attached_net(scene: &Scene, config: &EngineConfig, pin: &PlacedPin) -> Option<String> {
    scene
        .nets_at_pin(pin, config.overlap_tolerance)
        .into_iter()
        .filter_map(|id| scene.net(id).map(|net| (id, net)))
        .filter(|(_, net)| !net.name.is_empty())
        .min_by_key(|(id, net)| {
            let nearest = net
                .endpoints()
                .iter()
                .map(|end| manhattan_distance(*end, pin.point()))
                .min()
                .unwrap_or(i64::MAX);
            (nearest, net.name.clone(), *id)
        })
        .map(|(_, net)| net.name.clone())
}

fn apply_pin_order(
    instance: &SymbolInstance,
    map: PinNetMap,
    order: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) -> PinNetMap {
    let mut ordered = PinNetMap::new();
    for pin in order {
        match map.get(pin) {
            Some(net) => {
                ordered.insert(pin.clone(), net.clone());
            }
            None => diagnostics.push(Diagnostic::unknown_pin_in_order(&instance.name, pin)),
        }
    }
    for (pin, net) in map {
        if !ordered.contains_key(&pin) {
            ordered.insert(pin, net);
        }
    }
    ordered
}

/// Build the pin to net map of one instance.  Pins with no net get a
/// fresh `dnetN` from `counter`.
pub fn instance_pin_net_map(
    scene: &Scene,
    config: &EngineConfig,
    index: usize,
    counter: &mut NetCounter,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<PinNetMap> {
    let instance = scene.instances.get(index)?;
    let mut map = PinNetMap::new();

    for pin in instance.scene_pins() {
        let placed = PlacedPin {
            pin,
            origin: PinOrigin::Symbol { instance: index },
        };
        let net_name = match attached_net(scene, config, &placed) {
            Some(name) => name,
            None => {
                let name = counter.next_name();
                diagnostics.push(Diagnostic::unconnected_pin(&instance.name, placed.name(), &name));
                name
            }
        };
        map.insert(placed.pin.name, net_name);
    }

    Some(match instance.pin_order() {
        Some(order) => apply_pin_order(instance, map, &order, diagnostics),
        None => map,
    })
}

/// Pin to net maps for every symbol instance.  Net names are read from
/// the scene as they stand, so run a grouping pass first.
pub fn generate_pin_net_map(scene: &Scene, config: &EngineConfig, counter: &mut NetCounter) -> PinMapping {
    let mut mapping = PinMapping::default();
    for index in 0..scene.instances.len() {
        if let Some(map) = instance_pin_net_map(scene, config, index, counter, &mut mapping.diagnostics) {
            mapping.maps.insert(scene.instances[index].name.clone(), map);
        }
    }
    mapping
}
