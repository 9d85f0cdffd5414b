//! Synthetic surfaces shared by the tests.
//!
//! Every node's payload is its label: `W` or `E` for a hemisphere root,
//! followed by one quadrant digit (0 = NW, 1 = NE, 2 = SW, 3 = SE) per level
//! of descent. The global roots are `G1`, `G2` and `G3`.

use std::sync::Arc;

use txtree_decode::testing::ArchiveBuilder;

use crate::archive::Archive;
use crate::source::MemorySource;
use crate::surface::{NodeId, Surface, Tile};

/// Push a complete quad-tree of the given depth; returns the root index.
pub(crate) fn push_quad_tree(builder: &mut ArchiveBuilder, depth: u32, label: &str) -> u32 {
    let index = builder.push(label.as_bytes());
    if depth > 0 {
        let mut children = [None; 4];
        for (slot, child) in children.iter_mut().enumerate() {
            *child = Some(push_quad_tree(builder, depth - 1, &format!("{label}{slot}")));
        }
        builder.set_children(index, children);
    }
    index
}

/// Three leaf global roots and two complete hemisphere trees.
pub(crate) fn full_archive(depth: u32) -> Vec<u8> {
    let mut builder = ArchiveBuilder::new();
    let globals = [1, 2, 3].map(|level| builder.push(format!("G{level}")));
    let west = push_quad_tree(&mut builder, depth, "W");
    let east = push_quad_tree(&mut builder, depth, "E");
    builder.set_roots([globals[0], globals[1], globals[2], west, east]);
    builder.build()
}

pub(crate) fn surface(bytes: Vec<u8>) -> Surface<MemorySource> {
    let archive = Archive::from_source(MemorySource::new(bytes)).unwrap();
    Surface::build(Arc::new(archive)).unwrap()
}

pub(crate) fn label(tile: &Tile<'_, MemorySource>) -> String {
    String::from_utf8(tile.fetch_payload().unwrap()).unwrap()
}

/// Id of the hemisphere tile with the given label.
pub(crate) fn find_label(surface: &Surface<MemorySource>, wanted: &str) -> NodeId {
    surface
        .iter()
        .filter(|tile| tile.root_kind().is_hemisphere())
        .find(|tile| label(tile) == wanted)
        .map(|tile| tile.id())
        .unwrap()
}
