//! Collapsing chains of collinear, overlapping nets into a single net.
use crate::config::EngineConfig;
use crate::diagnostic::Diagnostic;
use crate::error::ErrorKind;
use crate::net::{Net, NetId};
use crate::point::Point;
use crate::scene::{ConnectivityIndex, Scene, SceneEdit};
use failure::Fallible;
use itertools::Itertools;
use log::debug;
use ordered_float::OrderedFloat;

/// Result of merging a net with its neighbours
#[derive(Debug, Default)]
pub struct Merged {
    /// The surviving net; `None` if the merged shape collapsed to a point
    /// once snapped to the grid.
    pub net: Option<NetId>,
    pub edit: SceneEdit,
    pub diagnostics: Vec<Diagnostic>,
}

/// True if some other, non-parallel net ends at `p`.  Collinear nets that
/// meet at such a junction are kept apart so that the junction stays an
/// endpoint for every net touching it.
fn is_junction(scene: &Scene, config: &EngineConfig, net: &Net, skip: &[NetId], p: Point) -> bool {
    let rect = crate::geometry::point_rect(p, config.connect_tolerance);
    scene.nets_intersecting(&rect).into_iter().any(|id| {
        if skip.contains(&id) {
            return false;
        }
        match scene.net(id) {
            Some(other) => {
                !other.is_parallel_to(net, config.angle_mode, config.angle_tolerance)
                    && other.has_endpoint_near(p, config.connect_tolerance)
            }
            None => false,
        }
    })
}

/// Whether `other` should be absorbed into `net`: same line, and either
/// genuinely overlapping or meeting end to end away from a junction.
fn can_absorb(scene: &Scene, config: &EngineConfig, id: NetId, net: &Net, other_id: NetId, other: &Net) -> bool {
    if !net.is_parallel_to(other, config.angle_mode, config.angle_tolerance) {
        return false;
    }
    let tol = config.overlap_tolerance;
    if !other.endpoints().iter().all(|p| net.is_collinear_with(*p, tol)) {
        return false;
    }

    let (a, b) = (net.position_along(other.start()), net.position_along(other.end()));
    let (lo, hi) = (a.min(b), a.max(b));
    let overlap = hi.min(net.length()) - lo.max(0.0);
    if overlap > tol as f64 {
        return true;
    }

    // End to end: find the shared point and make sure nothing branches off it
    let shared = net
        .endpoints()
        .iter()
        .cloned()
        .find(|p| other.has_endpoint_near(*p, tol));
    match shared {
        Some(p) => !is_junction(scene, config, net, &[id, other_id], p),
        None => false,
    }
}

/// Build the net covering all of `members`, keeping the direction of
/// `base` and the strongest name among them.
fn combine(scene: &Scene, config: &EngineConfig, base: &Net, members: &[NetId], diagnostics: &mut Vec<Diagnostic>) -> Net {
    let nets: Vec<&Net> = members.iter().filter_map(|id| scene.net(*id)).collect();

    let ends = nets.iter().flat_map(|net| net.endpoints().to_vec());
    let (start, end) = match ends.minmax_by_key(|p| OrderedFloat(base.position_along(*p))) {
        itertools::MinMaxResult::MinMax(lo, hi) => (lo, hi),
        itertools::MinMaxResult::OneElement(p) => (p, p),
        itertools::MinMaxResult::NoElements => (base.start(), base.end()),
    };
    let mut merged = Net::new(config.grid.snap(start), config.grid.snap(end));

    // max_by_key keeps the last maximum; iterate reversed to prefer the
    // first member on ties.
    if let Some(strongest) = nets.iter().rev().max_by_key(|net| net.name_strength) {
        merged.rename(strongest.name.clone(), strongest.name_strength);
    }

    let set_names: Vec<&str> = nets
        .iter()
        .filter(|net| net.name_strength == crate::net::NameStrength::Set)
        .map(|net| net.name.as_str())
        .unique()
        .collect();
    if set_names.len() > 1 {
        merged.flag_conflict();
        diagnostics.push(Diagnostic::name_conflict(set_names[0], set_names[1], members.to_vec()));
    }
    if nets.iter().any(|net| net.name_conflict) {
        merged.flag_conflict();
    }

    merged
}

/// Merge `id` with every collinear net overlapping it, repeating until
/// the result has no more partners.
pub fn merge_nets(scene: &mut Scene, config: &EngineConfig, id: NetId) -> Fallible<Merged> {
    let mut result = Merged {
        net: Some(id),
        ..Merged::default()
    };
    let mut current = id;

    loop {
        let net = scene
            .net(current)
            .cloned()
            .ok_or_else(|| ErrorKind::UnknownNet(current.to_string()))?;

        let partners: Vec<NetId> = scene
            .overlapping_nets(current, config.overlap_tolerance)
            .into_iter()
            .filter(|other_id| match scene.net(*other_id) {
                Some(other) => can_absorb(scene, config, current, &net, *other_id, other),
                None => false,
            })
            .collect();

        if partners.is_empty() {
            return Ok(result);
        }

        let mut members = vec![current];
        members.extend(partners);
        debug!("merging nets {}", members.iter().join(", "));

        let merged = combine(scene, config, &net, &members, &mut result.diagnostics);
        let step = scene.replace(&members, vec![merged]);
        let survivor = step.added.first().map(|(id, _)| *id);
        result.edit.then(step);

        match survivor {
            Some(next) => {
                result.net = Some(next);
                current = next;
            }
            None => {
                result.net = None;
                return Ok(result);
            }
        }
    }
}
