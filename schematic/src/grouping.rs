//! Assigning names to electrically connected groups of nets.
//!
//! Names are fixed in priority order: global pins first, then schematic
//! pins, then names the user typed, and finally `netN` for whatever is
//! left.  A later phase never renames a net an earlier phase claimed.
use crate::config::EngineConfig;
use crate::diagnostic::Diagnostic;
use crate::geometry;
use crate::net::{NameStrength, Net, NetId};
use crate::pin::{PinOrigin, PlacedPin};
use crate::point::Point;
use crate::scene::{ConnectivityIndex, Scene};
use log::debug;
use petgraph::graphmap::UnGraphMap;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// Net name to the nets carrying it
pub type SchematicNets = BTreeMap<String, BTreeSet<NetId>>;

/// Hands out `<prefix>N` names.  Lives in the session, so numbering
/// restarts with each loaded document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetCounter {
    prefix: &'static str,
    next: usize,
}

impl NetCounter {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, next: 0 }
    }

    pub fn next_name(&mut self) -> String {
        let name = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        name
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}

/// Outcome of a grouping pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grouping {
    pub nets: SchematicNets,
    pub diagnostics: Vec<Diagnostic>,
}

impl Grouping {
    pub fn name_of(&self, id: NetId) -> Option<&str> {
        self.nets
            .iter()
            .find(|(_, members)| members.contains(&id))
            .map(|(name, _)| name.as_str())
    }
}

/// Nets as nodes, with an edge wherever two of them share an endpoint.
pub fn connectivity_graph(scene: &Scene, config: &EngineConfig) -> UnGraphMap<NetId, ()> {
    let tol = config.connect_tolerance;
    let mut graph = UnGraphMap::new();
    for id in scene.all_nets() {
        graph.add_node(id);
        let net = match scene.net(id) {
            Some(net) => net,
            None => continue,
        };
        for end in net.endpoints().iter() {
            for other in scene.nets_intersecting(&geometry::point_rect(*end, tol)) {
                if other == id {
                    continue;
                }
                if let Some(other_net) = scene.net(other) {
                    if other_net.has_endpoint_near(*end, tol) {
                        graph.add_edge(id, other, ());
                    }
                }
            }
        }
    }
    graph
}

/// A stand-in net that carries `name`, for walks that start from a pin
/// or a fresh auto name instead of from a drawn net.
fn name_carrier(name: &str, strength: NameStrength) -> Net {
    let origin = Point::new(0, 0);
    Net::new(origin, origin).named(name, strength)
}

/// The state of one grouping pass.  `group_all_nets` drives the phases in
/// order; they are exposed so an editor can run them piecemeal.
pub struct NetGrouper<'a> {
    scene: &'a mut Scene,
    config: &'a EngineConfig,
    graph: UnGraphMap<NetId, ()>,
    remaining: BTreeSet<NetId>,
    groups: SchematicNets,
    diagnostics: Vec<Diagnostic>,
    /// Name pairs already reported, smaller name first
    reported: BTreeSet<(String, String)>,
}

impl<'a> NetGrouper<'a> {
    /// Start a pass.  Flags from the previous pass and every name the user
    /// did not type are cleared, so the result depends only on geometry,
    /// pins and user names.
    pub fn new(scene: &'a mut Scene, config: &'a EngineConfig) -> Self {
        for (_, net) in scene.nets_mut() {
            net.name_conflict = false;
            net.highlighted = false;
            net.clear_derived_name();
        }
        let graph = connectivity_graph(scene, config);
        let remaining = scene.all_nets().into_iter().collect();
        Self {
            scene,
            config,
            graph,
            remaining,
            groups: SchematicNets::new(),
            diagnostics: vec![],
            reported: BTreeSet::new(),
        }
    }

    pub fn remaining(&self) -> &BTreeSet<NetId> {
        &self.remaining
    }

    /// Put `id` in the group of `source`, taking its name as far as the
    /// strengths allow.  False if `id` holds a different user-set name.
    fn claim(&mut self, id: NetId, source: &Net) -> bool {
        let joined = match self.scene.net_mut(id) {
            Some(net) => net.inherit(source),
            None => return false,
        };
        if joined {
            self.remaining.remove(&id);
            self.groups.entry(source.name.clone()).or_default().insert(id);
        }
        joined
    }

    /// Flag `nets` and report the clash between `first` and `second`,
    /// once per pair of names.
    fn conflict(&mut self, first: &str, second: &str, nets: Vec<NetId>) {
        for id in &nets {
            if let Some(net) = self.scene.net_mut(*id) {
                net.flag_conflict();
            }
        }
        let key = if first <= second {
            (first.to_owned(), second.to_owned())
        } else {
            (second.to_owned(), first.to_owned())
        };
        if self.reported.insert(key) {
            self.diagnostics.push(Diagnostic::name_conflict(first, second, nets));
        } else {
            debug!("conflict between {} and {} already reported", first, second);
        }
    }

    fn user_name(&self, id: NetId) -> String {
        self.scene.net(id).map(|net| net.name.clone()).unwrap_or_default()
    }

    /// Name the nets touching `pins` after the pin.  Returns the nets that
    /// were claimed, grouped by name, ready to be traversed.
    pub fn seed_from_pins(&mut self, pins: &[PlacedPin]) -> BTreeMap<String, Vec<NetId>> {
        let mut seeds: BTreeMap<String, Vec<NetId>> = BTreeMap::new();
        let mut claimed_by: HashMap<NetId, String> = HashMap::new();

        for pin in pins {
            let name = pin.name().to_owned();
            // A pin name is binding: it clashes with user-set names
            let source = name_carrier(&name, NameStrength::Set);
            for id in self.scene.nets_at_pin(pin, self.config.overlap_tolerance) {
                if !self.remaining.contains(&id) {
                    match claimed_by.get(&id) {
                        Some(other) if *other != name => {
                            let other = other.clone();
                            self.conflict(&other, &name, vec![id]);
                        }
                        _ => debug!("net {} already named, ignoring pin {}", id, name),
                    }
                    continue;
                }

                if !self.claim(id, &source) {
                    let user_name = self.user_name(id);
                    self.conflict(&name, &user_name, vec![id]);
                    continue;
                }
                claimed_by.insert(id, name.clone());
                seeds.entry(name.clone()).or_default().push(id);
            }
        }

        seeds
    }

    /// Spread the name of `source` outward from `seeds` through every
    /// connected net that has not been claimed yet.  `origin` is the
    /// user-named net the walk started from, if any.  A net with a
    /// different user-set name is a conflict: it and `origin` are flagged
    /// and the walk does not cross it.
    pub fn traverse_nets(&mut self, source: &Net, origin: Option<NetId>, seeds: &[NetId]) {
        let mut queue: VecDeque<NetId> = seeds.iter().cloned().collect();

        while let Some(member) = queue.pop_front() {
            let mut neighbours: Vec<NetId> = self.graph.neighbors(member).collect();
            neighbours.sort();

            for candidate in neighbours {
                if !self.remaining.contains(&candidate) {
                    continue;
                }
                if self.claim(candidate, source) {
                    queue.push_back(candidate);
                    continue;
                }
                let user_name = self.user_name(candidate);
                let nets: Vec<NetId> = origin.into_iter().chain(Some(candidate)).collect();
                self.conflict(&source.name, &user_name, nets);
            }
        }
    }

    fn seed_and_traverse(&mut self, pins: &[PlacedPin]) {
        for (name, seeds) in self.seed_from_pins(pins) {
            self.traverse_nets(&name_carrier(&name, NameStrength::Set), None, &seeds);
        }
    }

    /// Group everything reachable from a net with a user-set name
    pub fn group_named_nets(&mut self) {
        let named: Vec<NetId> = self.remaining.iter().cloned().collect();
        for id in named {
            if !self.remaining.contains(&id) {
                continue;
            }
            let source = match self.scene.net(id) {
                Some(net) if net.name_strength == NameStrength::Set => net.clone(),
                _ => continue,
            };
            self.claim(id, &source);
            self.traverse_nets(&source, Some(id), &[id]);
        }
    }

    /// Give each remaining connected group a fresh `netN` name
    pub fn group_unnamed_nets(&mut self, counter: &mut NetCounter) {
        while let Some(first) = self.remaining.iter().next().cloned() {
            let name = loop {
                let candidate = counter.next_name();
                if !self.groups.contains_key(&candidate) {
                    break candidate;
                }
            };
            let source = name_carrier(&name, NameStrength::None);
            if !self.claim(first, &source) {
                // Only user-named nets refuse a name, and those are grouped
                self.remaining.remove(&first);
                continue;
            }
            self.traverse_nets(&source, None, &[first]);
        }
    }

    pub fn finish(self) -> Grouping {
        Grouping {
            nets: self.groups,
            diagnostics: self.diagnostics,
        }
    }
}

/// Name every net in the scene and return the resulting groups.
pub fn group_all_nets(scene: &mut Scene, config: &EngineConfig, counter: &mut NetCounter) -> Grouping {
    let pins = scene.all_pins();
    let (global, local): (Vec<PlacedPin>, Vec<PlacedPin>) = pins.into_iter().partition(|pin| pin.is_global());
    let schematic: Vec<PlacedPin> = local
        .into_iter()
        .filter(|pin| pin.origin == PinOrigin::Schematic)
        .collect();

    let mut grouper = NetGrouper::new(scene, config);
    grouper.seed_and_traverse(&global);
    grouper.seed_and_traverse(&schematic);
    grouper.group_named_nets();
    grouper.group_unnamed_nets(counter);
    grouper.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::SymbolInstance;
    use crate::pin::Pin;
    use crate::point::Rotation;
    use maplit::{btreemap, btreeset};

    fn line(x0: i64, y0: i64, x1: i64, y1: i64) -> Net {
        Net::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    fn group(scene: &mut Scene) -> Grouping {
        let _ = env_logger::builder().is_test(true).try_init();
        group_all_nets(scene, &EngineConfig::default(), &mut NetCounter::new("net"))
    }

    fn assert_partition(scene: &Scene, grouping: &Grouping) {
        let mut seen: Vec<NetId> = grouping.nets.values().flat_map(|set| set.iter().cloned()).collect();
        seen.sort();
        assert_eq!(scene.all_nets(), seen);
    }

    #[test]
    fn global_pin_names_its_component() {
        let mut scene = Scene::new();
        let a = scene.add_net(line(0, 0, 10, 0)).unwrap();
        let b = scene.add_net(line(10, 0, 10, 10)).unwrap();
        let c = scene.add_net(line(50, 0, 60, 0)).unwrap();
        scene.add_instance(
            SymbolInstance::new("I0", "vdd")
                .at(Point::new(0, 0), Rotation::new(0.0))
                .with_pin(Pin::new("vdd!", Point::new(0, 0))),
        );

        let grouping = group(&mut scene);
        assert_eq!(
            btreemap! {
                "vdd!".to_owned() => btreeset! {a, b},
                "net0".to_owned() => btreeset! {c},
            },
            grouping.nets
        );
        for id in &[a, b] {
            let net = scene.net(*id).unwrap();
            assert_eq!("vdd!", net.name);
            assert_eq!(NameStrength::Inherited, net.name_strength);
        }
        assert!(grouping.diagnostics.is_empty());
    }

    #[test]
    fn user_name_propagates() {
        let mut scene = Scene::new();
        let a = scene.add_net(line(0, 0, 10, 0)).unwrap();
        let b = scene.add_net(line(10, 0, 10, 10).named("out", NameStrength::Set)).unwrap();
        let c = scene.add_net(line(10, 10, 20, 10)).unwrap();

        let grouping = group(&mut scene);
        assert_eq!(btreemap! {"out".to_owned() => btreeset! {a, b, c}}, grouping.nets);
        assert_eq!(NameStrength::Set, scene.net(b).unwrap().name_strength);
        for id in &[a, c] {
            let net = scene.net(*id).unwrap();
            assert_eq!("out", net.name);
            assert_eq!(NameStrength::Inherited, net.name_strength);
        }
    }

    #[test]
    fn touching_user_names_conflict() {
        let mut scene = Scene::new();
        let a = scene.add_net(line(0, 0, 10, 0).named("clk", NameStrength::Set)).unwrap();
        let b = scene.add_net(line(10, 0, 10, 10).named("rst", NameStrength::Set)).unwrap();

        let grouping = group(&mut scene);
        for (id, name) in &[(a, "clk"), (b, "rst")] {
            let net = scene.net(*id).unwrap();
            assert!(net.name_conflict);
            assert_eq!(*name, net.name);
            assert_eq!(NameStrength::Set, net.name_strength);
        }
        assert_eq!(
            btreemap! {
                "clk".to_owned() => btreeset! {a},
                "rst".to_owned() => btreeset! {b},
            },
            grouping.nets
        );
        assert_eq!(1, grouping.diagnostics.len());
        assert!(grouping.diagnostics[0].is_error());
    }

    #[test]
    fn conflict_through_an_unnamed_net_flags_the_named_ends() {
        let mut scene = Scene::new();
        let a = scene.add_net(line(0, 0, 10, 0).named("clk", NameStrength::Set)).unwrap();
        let b = scene.add_net(line(10, 0, 10, 10)).unwrap();
        let c = scene.add_net(line(10, 10, 20, 10).named("rst", NameStrength::Set)).unwrap();

        let grouping = group(&mut scene);
        assert!(scene.net(a).unwrap().name_conflict);
        assert!(!scene.net(b).unwrap().name_conflict);
        assert!(scene.net(c).unwrap().name_conflict);
        assert_eq!("clk", scene.net(b).unwrap().name);
        assert_eq!(
            vec![Diagnostic::NameConflict {
                first: "clk".to_owned(),
                second: "rst".to_owned(),
                nets: vec![a, c],
            }],
            grouping.diagnostics
        );
        assert_eq!(
            btreemap! {
                "clk".to_owned() => btreeset! {a, b},
                "rst".to_owned() => btreeset! {c},
            },
            grouping.nets
        );
    }

    #[test]
    fn conflict_at_a_junction_is_reported_once() {
        let mut scene = Scene::new();
        let a = scene.add_net(line(0, 0, 10, 0).named("clk", NameStrength::Set)).unwrap();
        let b = scene.add_net(line(10, 0, 10, 10)).unwrap();
        let c = scene.add_net(line(10, 0, 20, 0).named("rst", NameStrength::Set)).unwrap();

        let grouping = group(&mut scene);
        assert_eq!(1, grouping.diagnostics.len());
        assert!(scene.net(a).unwrap().name_conflict);
        assert!(!scene.net(b).unwrap().name_conflict);
        assert!(scene.net(c).unwrap().name_conflict);
        assert_partition(&scene, &grouping);
    }

    #[test]
    fn disjoint_nets_are_numbered_in_order() {
        let mut scene = Scene::new();
        let a = scene.add_net(line(0, 0, 10, 0)).unwrap();
        let b = scene.add_net(line(0, 20, 10, 20)).unwrap();
        let c = scene.add_net(line(0, 40, 10, 40)).unwrap();

        let grouping = group(&mut scene);
        assert_eq!(
            btreemap! {
                "net0".to_owned() => btreeset! {a},
                "net1".to_owned() => btreeset! {b},
                "net2".to_owned() => btreeset! {c},
            },
            grouping.nets
        );
        assert_eq!(NameStrength::None, scene.net(a).unwrap().name_strength);
    }

    #[test]
    fn auto_names_skip_user_names() {
        let mut scene = Scene::new();
        let a = scene.add_net(line(0, 0, 10, 0).named("net0", NameStrength::Set)).unwrap();
        let b = scene.add_net(line(0, 20, 10, 20)).unwrap();

        let grouping = group(&mut scene);
        assert_eq!(Some("net0"), grouping.name_of(a));
        assert_eq!(Some("net1"), grouping.name_of(b));
    }

    #[test]
    fn schematic_pin_yields_to_user_name_with_conflict() {
        let mut scene = Scene::new();
        let a = scene.add_net(line(0, 0, 10, 0).named("data", NameStrength::Set)).unwrap();
        let b = scene.add_net(line(10, 0, 20, 0)).unwrap();
        let c = scene.add_net(line(100, 0, 110, 0)).unwrap();
        scene.add_pin(Pin::new("in", Point::new(0, 0)));
        scene.add_pin(Pin::new("out", Point::new(110, 0)));

        let grouping = group(&mut scene);
        assert!(scene.net(a).unwrap().name_conflict);
        assert_eq!("data", scene.net(a).unwrap().name);
        assert_eq!(Some("data"), grouping.name_of(a));
        assert_eq!(Some("data"), grouping.name_of(b));
        assert_eq!(Some("out"), grouping.name_of(c));
        assert_eq!(1, grouping.diagnostics.len());
        assert_partition(&scene, &grouping);
    }

    #[test]
    fn global_pins_win_over_schematic_pins() {
        let mut scene = Scene::new();
        let a = scene.add_net(line(0, 0, 10, 0)).unwrap();
        let b = scene.add_net(line(10, 0, 20, 0)).unwrap();
        scene.add_pin(Pin::new("supply", Point::new(20, 0)));
        scene.add_instance(
            SymbolInstance::new("I0", "gnd").with_pin(Pin::new("gnd!", Point::new(0, 0))),
        );

        let grouping = group(&mut scene);
        assert_eq!(btreemap! {"gnd!".to_owned() => btreeset! {a, b}}, grouping.nets);
        assert!(grouping.diagnostics.is_empty());
    }

    #[test]
    fn net_between_two_global_pins_is_a_conflict() {
        let mut scene = Scene::new();
        let a = scene.add_net(line(0, 0, 10, 0)).unwrap();
        scene.add_pin(Pin::new("vdd!", Point::new(0, 0)));
        scene.add_pin(Pin::new("gnd!", Point::new(10, 0)));

        let grouping = group(&mut scene);
        assert!(scene.net(a).unwrap().name_conflict);
        assert_eq!(Some("vdd!"), grouping.name_of(a));
        assert_eq!(1, grouping.diagnostics.len());
    }

    #[test]
    fn regrouping_starts_clean() {
        let mut scene = Scene::new();
        let a = scene.add_net(line(0, 0, 10, 0).named("clk", NameStrength::Set)).unwrap();
        let b = scene.add_net(line(10, 0, 10, 10).named("rst", NameStrength::Set)).unwrap();
        let c = scene.add_net(line(10, 10, 20, 10)).unwrap();
        let config = EngineConfig::default();
        let mut counter = NetCounter::new("net");

        group_all_nets(&mut scene, &config, &mut counter);
        assert!(scene.net(a).unwrap().name_conflict);
        assert_eq!("rst", scene.net(c).unwrap().name);

        scene.net_mut(b).unwrap().rename("", NameStrength::None);
        let grouping = group_all_nets(&mut scene, &config, &mut counter);
        assert!(!scene.net(a).unwrap().name_conflict);
        assert_eq!(btreemap! {"clk".to_owned() => btreeset! {a, b, c}}, grouping.nets);
        assert_eq!("clk", scene.net(c).unwrap().name);
        assert!(grouping.diagnostics.is_empty());
    }

    #[test]
    fn every_net_lands_in_exactly_one_group() {
        let mut scene = Scene::new();
        for i in 0..5 {
            scene.add_net(line(0, i * 20, 10, i * 20)).unwrap();
            scene.add_net(line(10, i * 20, 10, i * 20 + 10)).unwrap();
        }
        scene.add_net(line(0, 0, 0, 20).named("tie", NameStrength::Set)).unwrap();
        scene.add_pin(Pin::new("vss!", Point::new(10, 90)));

        let grouping = group(&mut scene);
        assert_partition(&scene, &grouping);
        assert_eq!(4, grouping.nets.len());
        assert_eq!(5, grouping.nets["tie"].len());
        assert_eq!(2, grouping.nets["vss!"].len());
    }
}
