//! Build pass: materialize the node arena from the TOC.

use txtree_decode::{DecodeError, ROOT_COUNT, TocNode};

use super::{NodeId, RootKind, SurfaceNode};
use crate::error::{Error, Result};

/// The unlinked quad-tree: nodes, bounds and parent/child relations, with no
/// neighbour data.
#[derive(Debug, Clone)]
pub(crate) struct Tree {
    nodes: Vec<SurfaceNode>,
    roots: [NodeId; ROOT_COUNT],
}

impl Tree {
    /// Walk the TOC from each root and create one node per reachable record.
    ///
    /// Each root gets its own lineage, so a record shared by several roots
    /// appears once per root, with that root's levels and bounds. The TOC must
    /// already be known to form a forest.
    pub(crate) fn build(roots: &[u32; ROOT_COUNT], toc: &[TocNode]) -> Result<Self> {
        let mut tree = Tree {
            nodes: Vec::with_capacity(toc.len()),
            roots: [NodeId(0); ROOT_COUNT],
        };
        let mut stack = Vec::new();

        for kind in RootKind::ALL {
            let root = tree.push(SurfaceNode {
                toc_index: roots[kind.index()],
                level: kind.level(),
                bound: kind.bound(),
                root: kind,
                parent: None,
                children: [None; 4],
            })?;
            tree.roots[kind.index()] = root;
            stack.push(root);

            while let Some(id) = stack.pop() {
                let node = tree.nodes[id.index()];
                let record = toc
                    .get(node.toc_index as usize)
                    .ok_or_else(|| DecodeError::IndexOutOfBounds {
                        context: "tree node",
                        index: node.toc_index,
                        len: u32::try_from(toc.len()).unwrap_or(u32::MAX),
                    })?;
                let quarters = node.bound.subdivide();

                for (slot, child) in record.children.iter().enumerate() {
                    let Some(toc_index) = *child else {
                        continue;
                    };
                    let child = tree.push(SurfaceNode {
                        toc_index,
                        level: node.level + 1,
                        bound: quarters[slot],
                        root: kind,
                        parent: Some(id),
                        children: [None; 4],
                    })?;
                    tree.nodes[id.index()].children[slot] = Some(child);
                    stack.push(child);
                }
            }
        }

        tracing::debug!("Built {} surface nodes from {} records", tree.len(), toc.len());
        Ok(tree)
    }

    fn push(&mut self, node: SurfaceNode) -> Result<NodeId> {
        let id = u32::try_from(self.nodes.len()).map_err(|_| {
            Error::Format(DecodeError::InvalidFormat {
                context: "tree",
                detail: "more surface nodes than fit in a node id".to_owned(),
            })
        })?;
        self.nodes.push(node);
        Ok(NodeId(id))
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn nodes(&self) -> &[SurfaceNode] {
        &self.nodes
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        // Ids were checked to fit in a u32 when pushed.
        (0..self.nodes.len() as u32).map(NodeId)
    }

    pub(crate) fn node(&self, id: NodeId) -> &SurfaceNode {
        &self.nodes[id.index()]
    }

    pub(crate) fn root(&self, kind: RootKind) -> NodeId {
        self.roots[kind.index()]
    }
}
