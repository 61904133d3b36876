//! Dividing nets at the points where orthogonal nets join them, and the
//! combined merge-then-split clean up that runs after every edit.
use crate::config::EngineConfig;
use crate::diagnostic::Diagnostic;
use crate::merge::merge_nets;
use crate::net::{Net, NetId};
use crate::point::Point;
use crate::scene::{ConnectivityIndex, Scene, SceneEdit};
use failure::Fallible;
use log::debug;

fn split_at(scene: &mut Scene, id: NetId, net: &Net, at: Point) -> SceneEdit {
    debug!("splitting net {} at {:?}", id, at);
    scene.replace(&[id], vec![net.piece(net.start(), at), net.piece(at, net.end())])
}

/// Split `id` and its orthogonal neighbours wherever one of them ends in
/// the interior of the other.  With `split_at_crossings` a clean crossing
/// splits both nets too.  Pieces of `id` are checked again against the
/// remaining neighbours.
pub fn split_nets(scene: &mut Scene, config: &EngineConfig, id: NetId) -> SceneEdit {
    let tol = config.overlap_tolerance;
    let mut edit = SceneEdit::default();
    let mut work = vec![id];

    while let Some(current) = work.pop() {
        let net = match scene.net(current) {
            Some(net) => net.clone(),
            None => continue,
        };

        let orthogonal: Vec<NetId> = scene
            .overlapping_nets(current, tol)
            .into_iter()
            .filter(|other| match scene.net(*other) {
                Some(other) => net.is_orthogonal_to(other, config.angle_mode, config.angle_tolerance),
                None => false,
            })
            .collect();

        for other_id in orthogonal {
            let other = match scene.net(other_id) {
                Some(other) => other.clone(),
                None => continue,
            };

            // Our end lands inside the other net
            if let Some(at) = net.endpoints().iter().cloned().find(|e| other.interior_contains(*e, tol)) {
                edit.then(split_at(scene, other_id, &other, at));
                continue;
            }

            // The other net ends inside us, or passes straight through
            let mut crossing = false;
            let at = other
                .endpoints()
                .iter()
                .cloned()
                .find(|e| net.interior_contains(*e, tol))
                .or_else(|| {
                    if !config.split_at_crossings {
                        return None;
                    }
                    crossing = true;
                    net.interior_crossing(&other, tol).map(|p| config.grid.snap(p))
                });

            if let Some(at) = at {
                if crossing {
                    edit.then(split_at(scene, other_id, &other, at));
                }
                let step = split_at(scene, current, &net, at);
                work.extend(step.added_ids());
                edit.then(step);
                break;
            }
        }
    }

    edit
}

/// Result of cleaning up after an edit
#[derive(Debug, Default)]
pub struct Tidied {
    pub edit: SceneEdit,
    pub diagnostics: Vec<Diagnostic>,
}

impl Tidied {
    fn absorb(&mut self, other: Tidied) {
        self.edit.then(other.edit);
        self.diagnostics.extend(other.diagnostics);
    }
}

/// Merge `id` with its collinear neighbours, then split around the result.
pub fn tidy(scene: &mut Scene, config: &EngineConfig, id: NetId) -> Fallible<Tidied> {
    let merged = merge_nets(scene, config, id)?;
    let mut tidied = Tidied {
        edit: merged.edit,
        diagnostics: merged.diagnostics,
    };
    if let Some(survivor) = merged.net {
        tidied.edit.then(split_nets(scene, config, survivor));
    }
    Ok(tidied)
}

/// Tidy every net until a full pass changes nothing.
pub fn tidy_all(scene: &mut Scene, config: &EngineConfig) -> Fallible<Tidied> {
    let mut total = Tidied::default();
    loop {
        let mut changed = false;
        for id in scene.all_nets() {
            if !scene.contains(id) {
                continue;
            }
            let step = tidy(scene, config, id)?;
            changed |= !step.edit.is_empty();
            total.absorb(step);
        }
        if !changed {
            return Ok(total);
        }
    }
}
