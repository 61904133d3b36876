use crate::config::EngineConfig;
use crate::grouping::{self, Grouping, NetCounter};
use crate::merge::{self, Merged};
use crate::net::{Net, NetId};
use crate::pinmap::{self, PinMapping};
use crate::record::SchematicDocument;
use crate::scene::{Scene, SceneEdit};
use crate::split::{self, Tidied};
use failure::Fallible;
use log::debug;

/// One open schematic: the scene, the engine settings and the name
/// counters.  Counters start over whenever a document is loaded.
#[derive(Clone, Debug)]
pub struct Session {
    pub config: EngineConfig,
    pub scene: Scene,
    net_counter: NetCounter,
    dnet_counter: NetCounter,
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_scene(Scene::new(), config)
    }

    pub fn with_scene(scene: Scene, config: EngineConfig) -> Self {
        Self {
            config,
            scene,
            net_counter: NetCounter::new("net"),
            dnet_counter: NetCounter::new("dnet"),
        }
    }

    pub fn from_document(doc: SchematicDocument, config: EngineConfig) -> Fallible<Self> {
        let scene = doc.into_scene()?;
        debug!(
            "loaded {} nets, {} pins and {} instances",
            scene.net_count(),
            scene.pins.len(),
            scene.instances.len()
        );
        let mut session = Self::with_scene(scene, config);
        session.reset_counters();
        Ok(session)
    }

    pub fn to_document(&self) -> SchematicDocument {
        SchematicDocument::from_scene(&self.scene, Some(self.config.grid))
    }

    pub fn reset_counters(&mut self) {
        self.net_counter.reset();
        self.dnet_counter.reset();
    }

    /// Draw a net and clean up around it.  The returned edit covers both
    /// the addition and whatever the clean up changed.
    pub fn add_net(&mut self, net: Net) -> Fallible<Tidied> {
        let id = match self.scene.add_net(net.clone()) {
            Some(id) => id,
            None => return Ok(Tidied::default()),
        };
        let mut tidied = Tidied {
            edit: SceneEdit {
                removed: vec![],
                added: vec![(id, net)],
            },
            diagnostics: vec![],
        };
        let step = split::tidy(&mut self.scene, &self.config, id)?;
        tidied.edit.then(step.edit);
        tidied.diagnostics.extend(step.diagnostics);
        Ok(tidied)
    }

    pub fn merge(&mut self, id: NetId) -> Fallible<Merged> {
        merge::merge_nets(&mut self.scene, &self.config, id)
    }

    pub fn split(&mut self, id: NetId) -> SceneEdit {
        split::split_nets(&mut self.scene, &self.config, id)
    }

    pub fn tidy_all(&mut self) -> Fallible<Tidied> {
        split::tidy_all(&mut self.scene, &self.config)
    }

    pub fn group_all_nets(&mut self) -> Grouping {
        grouping::group_all_nets(&mut self.scene, &self.config, &mut self.net_counter)
    }

    pub fn pin_net_maps(&mut self) -> PinMapping {
        pinmap::generate_pin_net_map(&self.scene, &self.config, &mut self.dnet_counter)
    }

    pub fn undo(&mut self, edit: &SceneEdit) {
        self.scene.undo(edit);
    }

    pub fn redo(&mut self, edit: &SceneEdit) {
        self.scene.redo(edit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::SymbolInstance;
    use crate::net::NameStrength;
    use crate::pin::Pin;
    use crate::point::Point;
    use crate::scene::ConnectivityIndex;
    use maplit::{btreemap, btreeset};

    fn line(x0: i64, y0: i64, x1: i64, y1: i64) -> Net {
        Net::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    fn session() -> Session {
        let _ = env_logger::builder().is_test(true).try_init();
        Session::new(EngineConfig::default())
    }

    fn shapes(session: &Session) -> Vec<(Point, Point)> {
        let mut shapes: Vec<_> = session.scene.nets().map(|(_, net)| (net.start(), net.end())).collect();
        shapes.sort();
        shapes
    }

    #[test]
    fn collinear_nets_merge_on_add() {
        let mut session = session();
        session.add_net(line(0, 0, 10, 0)).unwrap();
        session.add_net(line(10, 0, 20, 0)).unwrap();
        assert_eq!(vec![(Point::new(0, 0), Point::new(20, 0))], shapes(&session));
    }

    #[test]
    fn crossing_net_splits_when_enabled() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut session = Session::new(EngineConfig::default().with_split_at_crossings(true));
        session.add_net(line(0, 0, 20, 0)).unwrap();
        session.add_net(line(10, -5, 10, 5)).unwrap();
        let shapes = shapes(&session);
        assert!(shapes.contains(&(Point::new(0, 0), Point::new(10, 0))));
        assert!(shapes.contains(&(Point::new(10, 0), Point::new(20, 0))));
        assert_eq!(4, shapes.len());
    }

    #[test]
    fn global_pin_name_is_used_verbatim() {
        let mut session = session();
        session.scene.add_instance(
            SymbolInstance::new("I0", "vdd").with_pin(Pin::new("vdd!", Point::new(0, 0))),
        );
        session.add_net(line(0, 0, 10, 0)).unwrap();
        session.add_net(line(10, 0, 10, 10)).unwrap();

        let grouping = session.group_all_nets();
        assert_eq!(1, grouping.nets.len());
        for (_, net) in session.scene.nets() {
            assert_eq!("vdd!", net.name);
            assert_eq!(NameStrength::Inherited, net.name_strength);
        }
    }

    #[test]
    fn touching_user_names_are_flagged() {
        let mut session = session();
        session.add_net(line(0, 0, 10, 0).named("clk", NameStrength::Set)).unwrap();
        session.add_net(line(10, 0, 10, 10).named("rst", NameStrength::Set)).unwrap();

        let grouping = session.group_all_nets();
        assert_eq!(1, grouping.diagnostics.len());
        let mut names: Vec<&str> = session
            .scene
            .nets()
            .map(|(_, net)| {
                assert!(net.name_conflict);
                net.name.as_str()
            })
            .collect();
        names.sort();
        assert_eq!(vec!["clk", "rst"], names);
    }

    #[test]
    fn disjoint_nets_follow_creation_order() {
        let mut session = session();
        let mut ids = vec![];
        for y in &[0, 20, 40] {
            let tidied = session.add_net(line(0, *y, 10, *y)).unwrap();
            ids.extend(tidied.edit.added_ids());
        }
        let grouping = session.group_all_nets();
        assert_eq!(
            btreemap! {
                "net0".to_owned() => btreeset! {ids[0]},
                "net1".to_owned() => btreeset! {ids[1]},
                "net2".to_owned() => btreeset! {ids[2]},
            },
            grouping.nets
        );
    }

    #[test]
    fn add_net_is_one_undo_step() {
        let mut session = session();
        session.add_net(line(0, 0, 10, 0)).unwrap();
        let before = session.scene.all_nets();

        let tidied = session.add_net(line(10, 0, 20, 0)).unwrap();
        assert_eq!(1, session.scene.net_count());
        session.undo(&tidied.edit);
        assert_eq!(before, session.scene.all_nets());
        session.redo(&tidied.edit);
        assert_eq!(vec![(Point::new(0, 0), Point::new(20, 0))], shapes(&session));

        assert!(session.add_net(line(5, 5, 5, 5)).unwrap().edit.is_empty());
    }

    #[test]
    fn loading_a_document_restarts_numbering() {
        let mut session = session();
        session.add_net(line(0, 0, 10, 0)).unwrap();
        session.scene.add_instance(SymbolInstance::new("R0", "res").with_pin(Pin::new("P", Point::new(50, 50))));
        session.group_all_nets();
        let grouping = session.group_all_nets();
        assert!(grouping.nets.contains_key("net1"));
        assert_eq!("dnet0", session.pin_net_maps().maps["R0"]["P"]);

        let doc = session.to_document();
        let mut reloaded = Session::from_document(doc, EngineConfig::default()).unwrap();
        let grouping = reloaded.group_all_nets();
        assert!(grouping.nets.contains_key("net0"));
        let mapping = reloaded.pin_net_maps();
        assert_eq!("dnet0", mapping.maps["R0"]["P"]);
        assert_eq!(1, mapping.diagnostics.len());
    }
}
