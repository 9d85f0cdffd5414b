//! Point queries over the unlinked tree.

use super::{NodeId, RootKind, Tree};
use crate::coords::{GeoPoint, SEAM_LON};

impl Tree {
    /// Find the deepest node covering `point`, stopping at `max_level`.
    pub(crate) fn find(&self, point: GeoPoint, max_level: Option<u32>) -> Option<NodeId> {
        if !point.is_in_domain() {
            return None;
        }

        if max_level.is_some_and(|level| level < RootKind::Global3.level()) {
            return Some(self.root(RootKind::Global3));
        }

        let kind = if point.lon >= SEAM_LON {
            RootKind::EastHemisphere
        } else {
            RootKind::WestHemisphere
        };
        let mut current = self.root(kind);
        debug_assert!(self.node(current).bound.contains(point));

        loop {
            let node = self.node(current);
            if max_level.is_some_and(|max_level| node.level >= max_level) {
                return Some(current);
            }
            let owner = node
                .children
                .iter()
                .flatten()
                .copied()
                .find(|&child| self.node(child).bound.contains(point));
            match owner {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }

    /// Find the node covering `point` at exactly `level`.
    pub(crate) fn find_exact(&self, point: GeoPoint, level: u32) -> Option<NodeId> {
        self.find(point, Some(level))
            .filter(|&id| self.node(id).level == level)
    }
}
