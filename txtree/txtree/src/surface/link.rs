//! Link pass: resolve the neighbours of every hemisphere node.

use super::{Neighbors, NodeId, RootKind, Tree};
use crate::bound::{Quadrant, Side};

/// Link state of one side of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Unresolved,
    Resolved(Option<NodeId>),
}

struct Links {
    slots: Vec<[Slot; 4]>,
}

impl Links {
    fn resolve(&mut self, id: NodeId, side: Side, neighbor: Option<NodeId>) {
        let slot = &mut self.slots[id.index()][side.index()];
        debug_assert_eq!(*slot, Slot::Unresolved, "{id} {side} linked twice");
        *slot = Slot::Resolved(neighbor);
    }

    fn resolve_all(&mut self, id: NodeId, neighbors: [Option<NodeId>; 4]) {
        for side in Side::ALL {
            self.resolve(id, side, neighbors[side.index()]);
        }
    }

    fn finish(self) -> Vec<Neighbors> {
        self.slots
            .into_iter()
            .map(|sides| {
                let [west, east, north, south] = sides.map(|slot| {
                    debug_assert_ne!(slot, Slot::Unresolved, "side left unresolved");
                    match slot {
                        Slot::Resolved(neighbor) => neighbor,
                        Slot::Unresolved => None,
                    }
                });
                Neighbors {
                    west,
                    east,
                    north,
                    south,
                }
            })
            .collect()
    }
}

/// Compute the neighbour table for a built tree.
///
/// The hemisphere roots are each other's east and west neighbours and have
/// nothing beyond the poles or the outer meridians. Below them, a child's
/// neighbour across an edge shared with a sibling is that sibling; across an
/// edge of its parent it is whatever tile of the same level covers the probe
/// point beyond that edge. Global lineage nodes have no neighbours.
pub(super) fn link(tree: &Tree) -> Vec<Neighbors> {
    let mut links = Links {
        slots: vec![[Slot::Unresolved; 4]; tree.len()],
    };

    for id in tree.ids() {
        if !tree.node(id).root.is_hemisphere() {
            links.resolve_all(id, [None; 4]);
        }
    }

    let west = tree.root(RootKind::WestHemisphere);
    let east = tree.root(RootKind::EastHemisphere);
    links.resolve_all(west, [None, Some(east), None, None]);
    links.resolve_all(east, [Some(west), None, None, None]);

    let mut stack = vec![west, east];
    while let Some(id) = stack.pop() {
        let parent = tree.node(id);
        for quadrant in Quadrant::ALL {
            let Some(child) = parent.children[quadrant.index()] else {
                continue;
            };
            let node = tree.node(child);
            for side in Side::ALL {
                let neighbor = match quadrant.sibling(side) {
                    Some(sibling) => parent.children[sibling.index()],
                    None => tree.find_exact(node.bound.probe(side), node.level),
                };
                links.resolve(child, side, neighbor);
            }
            stack.push(child);
        }
    }

    links.finish()
}
