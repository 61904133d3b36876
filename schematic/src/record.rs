//! The schematic file format: a JSON array of items, one per drawn
//! object, plus a couple of header items.
use crate::error::ErrorKind;
use crate::instance::SymbolInstance;
use crate::net::{NameStrength, Net};
use crate::pin::{Pin, PinDirection, PinType};
use crate::point::{Point, Rotation, SnapGrid};
use crate::scene::Scene;
use failure::Fallible;
use indexmap::IndexMap;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::convert::TryFrom;
use std::path::Path;

pub const NET_RECORD_TYPE: &str = "scn";
const NET_RECORD_LEGACY_TYPE: &str = "schematicNet";
pub const PIN_RECORD_TYPE: &str = "scp";
pub const SYMBOL_RECORD_TYPE: &str = "sys";

/// A net as persisted.  Points are relative to the origin of the scene
/// the net was saved from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub st: [i64; 2],
    pub end: [i64; 2],
    #[serde(default)]
    pub nam: String,
    #[serde(default)]
    pub ns: u8,
}

impl NetRecord {
    pub fn from_net(net: &Net, origin: Point) -> Self {
        Self {
            kind: NET_RECORD_TYPE.to_owned(),
            st: net.start().relative_to(origin).into(),
            end: net.end().relative_to(origin).into(),
            nam: net.name.clone(),
            ns: net.name_strength.into(),
        }
    }

    pub fn to_net(&self, origin: Point) -> Fallible<Net> {
        if self.kind != NET_RECORD_TYPE && self.kind != NET_RECORD_LEGACY_TYPE {
            return Err(ErrorKind::UnexpectedRecordType(self.kind.clone()).into());
        }
        let strength = NameStrength::try_from(self.ns)?;
        let start = Point::from(self.st).offset(origin.x(), origin.y());
        let end = Point::from(self.end).offset(origin.x(), origin.y());
        Ok(Net::new(start, end).named(self.nam.clone(), strength))
    }
}

/// A schematic pin, or a pin inside a symbol record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRecord {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub nam: String,
    pub st: [i64; 2],
    #[serde(default)]
    pub dir: PinDirection,
    #[serde(rename = "pinType", default)]
    pub pin_type: PinType,
}

impl PinRecord {
    fn from_pin(pin: &Pin, kind: Option<&str>) -> Self {
        Self {
            kind: kind.map(str::to_owned),
            nam: pin.name.clone(),
            st: pin.point.into(),
            dir: pin.direction,
            pin_type: pin.pin_type,
        }
    }

    fn to_pin(&self) -> Pin {
        Pin::new(self.nam.clone(), Point::from(self.st))
            .with_direction(self.dir)
            .with_type(self.pin_type)
    }
}

/// A placed symbol.  The editor writes the symbol's pins inline so that
/// the netlister does not need the symbol library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymbolRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub nam: String,
    #[serde(default)]
    pub lib: String,
    pub cell: String,
    #[serde(default)]
    pub view: String,
    pub st: [i64; 2],
    #[serde(default)]
    pub ang: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pins: Option<Vec<PinRecord>>,
    #[serde(default)]
    pub attr: IndexMap<String, String>,
}

impl SymbolRecord {
    fn from_instance(instance: &SymbolInstance) -> Self {
        Self {
            kind: SYMBOL_RECORD_TYPE.to_owned(),
            nam: instance.name.clone(),
            lib: String::new(),
            cell: instance.cell.clone(),
            view: "symbol".to_owned(),
            st: instance.transform.position.into(),
            ang: instance.transform.rotation.degrees(),
            pins: Some(instance.pins.iter().map(|pin| PinRecord::from_pin(pin, None)).collect()),
            attr: instance.attributes.clone(),
        }
    }

    /// `None` if the record has no pins, meaning the editor could not
    /// resolve the symbol it refers to.
    fn to_instance(&self, origin: Point) -> Option<SymbolInstance> {
        let pins = self.pins.as_ref()?;
        let mut instance = SymbolInstance::new(self.nam.clone(), self.cell.clone()).at(
            Point::from(self.st).offset(origin.x(), origin.y()),
            Rotation::new(self.ang),
        );
        instance.pins = pins.iter().map(PinRecord::to_pin).collect();
        instance.attributes = self.attr.clone();
        Some(instance)
    }
}

/// The contents of a schematic file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchematicDocument {
    pub view_type: Option<String>,
    pub snap_grid: Option<SnapGrid>,
    pub nets: Vec<NetRecord>,
    pub pins: Vec<PinRecord>,
    pub symbols: Vec<SymbolRecord>,
}

fn parse_snap_grid(value: &Value) -> Fallible<SnapGrid> {
    let bad = || ErrorKind::BadSnapGrid(value.to_string());
    let pair = value.as_array().ok_or_else(bad)?;
    match pair.as_slice() {
        [major, minor] => {
            let major = major.as_i64().ok_or_else(bad)?;
            let minor = minor.as_i64().ok_or_else(bad)?;
            Ok(SnapGrid::new(major, minor))
        }
        _ => Err(bad().into()),
    }
}

impl SchematicDocument {
    pub fn from_value(value: Value) -> Fallible<Self> {
        let items = match value {
            Value::Array(items) => items,
            _ => return Err(ErrorKind::NotADocument.into()),
        };

        let mut doc = SchematicDocument::default();
        for item in items {
            if let Some(view_type) = item.get("viewType").and_then(Value::as_str) {
                doc.view_type = Some(view_type.to_owned());
                continue;
            }
            if let Some(grid) = item.get("snapGrid") {
                doc.snap_grid = Some(parse_snap_grid(grid)?);
                continue;
            }

            let kind = match item.get("type").and_then(Value::as_str) {
                Some(kind) => kind.to_owned(),
                None => return Err(ErrorKind::UntypedItem(item.to_string()).into()),
            };
            match kind.as_str() {
                NET_RECORD_TYPE | NET_RECORD_LEGACY_TYPE => doc.nets.push(serde_json::from_value(item)?),
                PIN_RECORD_TYPE => doc.pins.push(serde_json::from_value(item)?),
                SYMBOL_RECORD_TYPE => doc.symbols.push(serde_json::from_value(item)?),
                _ => debug!("skipping {} item", kind),
            }
        }
        Ok(doc)
    }

    pub fn from_json_str(text: &str) -> Fallible<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Fallible<Self> {
        let path = path.as_ref();
        debug!("loading {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_value(&self) -> Fallible<Value> {
        let mut items = vec![];
        if let Some(view_type) = &self.view_type {
            items.push(json!({ "viewType": view_type }));
        }
        if let Some(grid) = self.snap_grid {
            items.push(json!({ "snapGrid": [grid.major, grid.minor] }));
        }
        for net in &self.nets {
            items.push(serde_json::to_value(net)?);
        }
        for pin in &self.pins {
            items.push(serde_json::to_value(pin)?);
        }
        for symbol in &self.symbols {
            items.push(serde_json::to_value(symbol)?);
        }
        Ok(Value::Array(items))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Fallible<()> {
        let text = serde_json::to_string_pretty(&self.to_value()?)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Build a scene from the document.  Symbols that the editor could not
    /// resolve are logged and left out.
    pub fn into_scene(self) -> Fallible<Scene> {
        let origin = Point::new(0, 0);
        let mut scene = Scene::new();

        for record in &self.nets {
            scene.add_net(record.to_net(origin)?);
        }
        for record in &self.pins {
            scene.add_pin(record.to_pin());
        }
        for record in &self.symbols {
            match record.to_instance(origin) {
                Some(instance) => scene.add_instance(instance),
                None => error!(
                    "{}: symbol {}/{}/{} not found, instance not added",
                    record.nam, record.lib, record.cell, record.view
                ),
            }
        }
        Ok(scene)
    }

    pub fn from_scene(scene: &Scene, snap_grid: Option<SnapGrid>) -> Self {
        let origin = Point::new(0, 0);
        SchematicDocument {
            view_type: Some("schematic".to_owned()),
            snap_grid,
            nets: scene.nets().map(|(_, net)| NetRecord::from_net(net, origin)).collect(),
            pins: scene
                .pins
                .iter()
                .map(|pin| PinRecord::from_pin(pin, Some(PIN_RECORD_TYPE)))
                .collect(),
            symbols: scene.instances.iter().map(SymbolRecord::from_instance).collect(),
        }
    }
}
