//! The navigable quad-tree over an archive's tiles.
//!
//! A [`Surface`] is built in two passes. The build pass materializes every
//! node reachable from the five roots into a flat arena, with bounds derived
//! by subdividing the root bounds. The link pass then resolves each
//! hemisphere node's west, east, north and south neighbours: siblings are
//! linked directly, everything else by querying the surface at a point just
//! beyond the edge. Once built, a surface is immutable and can be queried
//! from any number of threads.

mod build;
mod link;
mod query;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use txtree_decode::TocNode;

use crate::archive::Archive;
use crate::bound::{GeoBound, Quadrant, Side};
use crate::coords::GeoPoint;
use crate::error::Result;
use crate::source::{ByteSource, FileSource};

use build::Tree;

/// Level of the two hemisphere roots.
pub const HEMISPHERE_LEVEL: u32 = 4;

/// Index of a node in a surface's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The five root lineages, in header order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RootKind {
    Global1,
    Global2,
    Global3,
    WestHemisphere,
    EastHemisphere,
}

impl RootKind {
    pub const ALL: [RootKind; 5] = [
        RootKind::Global1,
        RootKind::Global2,
        RootKind::Global3,
        RootKind::WestHemisphere,
        RootKind::EastHemisphere,
    ];

    /// Position of the root in the header's root array.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Resolution level of the root node.
    #[must_use]
    pub fn level(self) -> u32 {
        match self {
            RootKind::Global1 => 1,
            RootKind::Global2 => 2,
            RootKind::Global3 => 3,
            RootKind::WestHemisphere | RootKind::EastHemisphere => HEMISPHERE_LEVEL,
        }
    }

    /// Bound of the root node.
    #[must_use]
    pub fn bound(self) -> GeoBound {
        match self {
            RootKind::Global1 | RootKind::Global2 | RootKind::Global3 => GeoBound::global(),
            RootKind::WestHemisphere => GeoBound::west_hemisphere(),
            RootKind::EastHemisphere => GeoBound::east_hemisphere(),
        }
    }

    /// Pixel edge length of tiles in this lineage.
    ///
    /// The global textures double per level; each hemisphere is half of a
    /// 512-pixel globe.
    #[must_use]
    pub fn tile_size(self) -> u32 {
        match self {
            RootKind::Global1 => 64,
            RootKind::Global2 => 128,
            RootKind::Global3 | RootKind::WestHemisphere | RootKind::EastHemisphere => 256,
        }
    }

    #[must_use]
    pub fn is_hemisphere(self) -> bool {
        matches!(self, RootKind::WestHemisphere | RootKind::EastHemisphere)
    }
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RootKind::Global1 => "global level 1",
            RootKind::Global2 => "global level 2",
            RootKind::Global3 => "global level 3",
            RootKind::WestHemisphere => "west hemisphere",
            RootKind::EastHemisphere => "east hemisphere",
        })
    }
}

/// One node of the quad-tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceNode {
    toc_index: u32,
    level: u32,
    bound: GeoBound,
    root: RootKind,
    parent: Option<NodeId>,
    children: [Option<NodeId>; 4],
}

impl SurfaceNode {
    /// Index of the TOC record this node wraps.
    #[must_use]
    pub fn toc_index(&self) -> u32 {
        self.toc_index
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn bound(&self) -> GeoBound {
        self.bound
    }

    /// The lineage this node descends from.
    #[must_use]
    pub fn root(&self) -> RootKind {
        self.root
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in NW, NE, SW, SE order.
    #[must_use]
    pub fn children(&self) -> [Option<NodeId>; 4] {
        self.children
    }
}

/// Resolved neighbours of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Neighbors {
    pub west: Option<NodeId>,
    pub east: Option<NodeId>,
    pub north: Option<NodeId>,
    pub south: Option<NodeId>,
}

impl Neighbors {
    #[must_use]
    pub fn get(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::West => self.west,
            Side::East => self.east,
            Side::North => self.north,
            Side::South => self.south,
        }
    }

    /// Number of sides with a neighbour.
    #[must_use]
    pub fn count(&self) -> usize {
        Side::ALL
            .iter()
            .filter(|&&side| self.get(side).is_some())
            .count()
    }
}

/// Summary of a built surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SurfaceStats {
    /// Number of nodes in the arena, counting shared TOC records once per
    /// lineage.
    pub nodes: usize,
    /// Deepest level present.
    pub max_level: u32,
    /// Node count by level.
    pub per_level: BTreeMap<u32, usize>,
    /// Number of resolved neighbour links, counting each direction.
    pub linked_sides: usize,
}

/// A linked quad-tree over the tiles of an archive.
#[derive(Debug)]
pub struct Surface<S: ByteSource = FileSource> {
    archive: Arc<Archive<S>>,
    tree: Tree,
    neighbors: Vec<Neighbors>,
}

impl Surface<FileSource> {
    /// Open the archive at `path` and build its surface.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(Arc::new(Archive::open(path)?))
    }
}

impl<S: ByteSource> Surface<S> {
    /// Build and link the quad-tree of an opened archive.
    pub fn build(archive: Arc<Archive<S>>) -> Result<Self> {
        let tree = Tree::build(&archive.header().roots, archive.nodes())?;
        let neighbors = link::link(&tree);

        let surface = Self {
            archive,
            tree,
            neighbors,
        };
        let stats = surface.stats();
        tracing::debug!(
            "Built surface: {} nodes, max level {}, {} linked sides",
            stats.nodes,
            stats.max_level,
            stats.linked_sides
        );
        Ok(surface)
    }

    /// The archive tile payloads are read from.
    #[must_use]
    pub fn archive(&self) -> &Arc<Archive<S>> {
        &self.archive
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Always false: every surface has its five roots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.len() == 0
    }

    /// The root tile of a lineage.
    #[must_use]
    pub fn root(&self, kind: RootKind) -> Tile<'_, S> {
        self.tile_unchecked(self.tree.root(kind))
    }

    /// The tile with the given id, if it belongs to this surface.
    #[must_use]
    pub fn tile(&self, id: NodeId) -> Option<Tile<'_, S>> {
        (id.index() < self.tree.len()).then(|| self.tile_unchecked(id))
    }

    /// All tiles in arena order.
    pub fn iter(&self) -> impl Iterator<Item = Tile<'_, S>> + '_ {
        self.tree.ids().map(|id| self.tile_unchecked(id))
    }

    /// Resolved neighbours of a node.
    #[must_use]
    pub fn neighbors(&self, id: NodeId) -> Option<&Neighbors> {
        self.neighbors.get(id.index())
    }

    /// Find the tile covering `point`.
    ///
    /// Descends from the hemisphere root on the point's side of the seam
    /// until `max_level` is reached or the covering child is missing, in
    /// which case the deepest available tile is returned. A `max_level`
    /// below the level of the level-3 global root returns that root,
    /// whichever hemisphere the point is in. Points outside the domain
    /// yield `None`.
    #[must_use]
    pub fn find_tile(&self, point: GeoPoint, max_level: Option<u32>) -> Option<Tile<'_, S>> {
        self.tree
            .find(point, max_level)
            .map(|id| self.tile_unchecked(id))
    }

    /// Find the tile covering `point` at exactly `level`.
    #[must_use]
    pub fn find_exact_tile(&self, point: GeoPoint, level: u32) -> Option<Tile<'_, S>> {
        self.tree
            .find_exact(point, level)
            .map(|id| self.tile_unchecked(id))
    }

    /// Node counts and link totals.
    #[must_use]
    pub fn stats(&self) -> SurfaceStats {
        let mut stats = SurfaceStats {
            nodes: self.tree.len(),
            ..SurfaceStats::default()
        };
        for node in self.tree.nodes() {
            *stats.per_level.entry(node.level).or_default() += 1;
            stats.max_level = stats.max_level.max(node.level);
        }
        stats.linked_sides = self.neighbors.iter().map(Neighbors::count).sum();
        stats
    }

    fn tile_unchecked(&self, id: NodeId) -> Tile<'_, S> {
        Tile { surface: self, id }
    }
}

/// A borrowed view of one node of a [`Surface`].
pub struct Tile<'a, S: ByteSource = FileSource> {
    surface: &'a Surface<S>,
    id: NodeId,
}

impl<S: ByteSource> Clone for Tile<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ByteSource> Copy for Tile<'_, S> {}

impl<S: ByteSource> PartialEq for Tile<'_, S> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.surface, other.surface)
    }
}

impl<S: ByteSource> Eq for Tile<'_, S> {}

impl<S: ByteSource> fmt::Debug for Tile<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tile")
            .field("id", &self.id)
            .field("level", &self.level())
            .field("bound", &self.bound())
            .field("toc_index", &self.toc_index())
            .finish()
    }
}

impl<'a, S: ByteSource> Tile<'a, S> {
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The underlying arena node.
    #[must_use]
    pub fn node(&self) -> &'a SurfaceNode {
        self.surface.tree.node(self.id)
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.node().level
    }

    #[must_use]
    pub fn bound(&self) -> GeoBound {
        self.node().bound
    }

    /// Pixel edge length of the tile's texture.
    #[must_use]
    pub fn tile_size(&self) -> u32 {
        self.node().root.tile_size()
    }

    #[must_use]
    pub fn root_kind(&self) -> RootKind {
        self.node().root
    }

    #[must_use]
    pub fn toc_index(&self) -> u32 {
        self.node().toc_index
    }

    /// The TOC record the tile wraps.
    #[must_use]
    pub fn toc_node(&self) -> &'a TocNode {
        &self.surface.archive.nodes()[self.toc_index() as usize]
    }

    #[must_use]
    pub fn parent(&self) -> Option<Tile<'a, S>> {
        self.node().parent.map(|id| self.with_id(id))
    }

    /// Children in NW, NE, SW, SE order.
    #[must_use]
    pub fn children(&self) -> [Option<Tile<'a, S>>; 4] {
        self.node().children.map(|child| child.map(|id| self.with_id(id)))
    }

    #[must_use]
    pub fn child(&self, quadrant: Quadrant) -> Option<Tile<'a, S>> {
        self.node().children[quadrant.index()].map(|id| self.with_id(id))
    }

    /// The adjacent tile at the same level across `side`, if there is one.
    ///
    /// Tiles of the global lineages have no neighbours.
    #[must_use]
    pub fn neighbor(&self, side: Side) -> Option<Tile<'a, S>> {
        self.surface.neighbors[self.id.index()]
            .get(side)
            .map(|id| self.with_id(id))
    }

    /// Neighbours in west, east, north, south order.
    #[must_use]
    pub fn neighbors(&self) -> [Option<Tile<'a, S>>; 4] {
        Side::ALL.map(|side| self.neighbor(side))
    }

    /// Read and decompress the tile's payload.
    pub fn fetch_payload(&self) -> Result<Vec<u8>> {
        self.surface.archive.fetch_decompressed(self.toc_index())
    }

    /// Read the tile's compressed payload.
    pub fn fetch_raw(&self) -> Result<Vec<u8>> {
        self.surface.archive.fetch_raw(self.toc_index())
    }

    fn with_id(&self, id: NodeId) -> Tile<'a, S> {
        Tile {
            surface: self.surface,
            id,
        }
    }
}
