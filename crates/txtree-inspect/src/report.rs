//! Text and JSON renderings of archive and tile information.

use std::fmt;

use serde::Serialize;
use txtree::{
    ArchiveHeader, ByteSource, Coordinate, GeoBound, RootKind, Side, SurfaceStats, Tile,
};

/// Decimal places used when printing coordinates.
pub const DEFAULT_PRECISION: usize = 5;

/// Header fields and surface statistics.
#[derive(Serialize)]
pub struct InfoReport<'a> {
    header: &'a ArchiveHeader,
    stats: &'a SurfaceStats,
}

impl<'a> InfoReport<'a> {
    pub fn new(header: &'a ArchiveHeader, stats: &'a SurfaceStats) -> Self {
        Self { header, stats }
    }
}

impl fmt::Display for InfoReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header;
        let [g1, g2, g3, west, east] = header.roots;
        writeln!(f, "format    {}", header.magic_tag())?;
        writeln!(f, "header    {} bytes", header.header_size)?;
        writeln!(f, "flags     {:#010x}", header.flags)?;
        writeln!(
            f,
            "data      {} bytes at offset {}",
            header.data_length, header.data_offset
        )?;
        writeln!(f, "records   {}", header.node_count)?;
        writeln!(f, "roots     global {g1}, {g2}, {g3}; west {west}; east {east}")?;

        let stats = self.stats;
        writeln!(
            f,
            "surface   {} nodes, max level {}, {} linked sides",
            stats.nodes, stats.max_level, stats.linked_sides
        )?;
        for (level, count) in &stats.per_level {
            writeln!(f, "level {level:<3} {count}")?;
        }
        Ok(())
    }
}

/// Human-readable description of one tile and its neighbours.
///
/// The formatter's precision sets the decimal places of the centre
/// coordinate, defaulting to [`DEFAULT_PRECISION`].
pub struct TileReport<'a, S: ByteSource>(pub Tile<'a, S>);

impl<S: ByteSource> fmt::Display for TileReport<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tile = self.0;
        let precision = f.precision().unwrap_or(DEFAULT_PRECISION);
        let record = tile.toc_node();
        let center = Coordinate::from(tile.bound().center());

        writeln!(f, "tile      {} ({})", tile.toc_index(), tile.root_kind())?;
        writeln!(f, "level     {}", tile.level())?;
        writeln!(f, "bound     {}", tile.bound())?;
        writeln!(f, "center    {center:.precision$}")?;
        writeln!(f, "texture   {0}x{0} px", tile.tile_size())?;
        writeln!(
            f,
            "payload   {} bytes compressed, {} bytes decompressed",
            record.compressed_length, record.decompressed_size
        )?;
        for side in Side::ALL {
            match tile.neighbor(side) {
                Some(neighbor) => writeln!(
                    f,
                    "{:<9} {} {}",
                    side.name(),
                    neighbor.toc_index(),
                    neighbor.bound()
                )?,
                None => writeln!(f, "{:<9} -", side.name())?,
            }
        }
        Ok(())
    }
}

/// Machine-readable description of one tile.
#[derive(Serialize)]
pub struct TileSummary {
    toc_index: u32,
    root: RootKind,
    level: u32,
    bound: GeoBound,
    center: Coordinate,
    tile_size: u32,
    compressed_length: u64,
    decompressed_size: u32,
    neighbors: NeighborSummary,
}

/// TOC indices of a tile's neighbours.
#[derive(Serialize)]
struct NeighborSummary {
    west: Option<u32>,
    east: Option<u32>,
    north: Option<u32>,
    south: Option<u32>,
}

impl TileSummary {
    pub fn new<S: ByteSource>(tile: &Tile<'_, S>) -> Self {
        let record = tile.toc_node();
        let [west, east, north, south] =
            tile.neighbors().map(|neighbor| neighbor.map(|n| n.toc_index()));
        Self {
            toc_index: tile.toc_index(),
            root: tile.root_kind(),
            level: tile.level(),
            bound: tile.bound(),
            center: Coordinate::from(tile.bound().center()),
            tile_size: tile.tile_size(),
            compressed_length: record.compressed_length,
            decompressed_size: record.decompressed_size,
            neighbors: NeighborSummary {
                west,
                east,
                north,
                south,
            },
        }
    }
}
