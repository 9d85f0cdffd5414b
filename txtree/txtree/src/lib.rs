//! Navigable quad-tree over the tiles of a `TX10` tree archive.
//!
//! This crate opens tree archives, builds the quad-tree of tiles that covers
//! the globe, links every tile to its geometric neighbours and answers
//! "which tile covers this point" queries. Tile payloads are read and
//! decompressed on demand.
//!
//! # Design principles
//!
//! - **Read-only**: Archives are never written or mutated
//! - **Thread-safe**: A built [`Surface`] is immutable and `Send + Sync`;
//!   payload reads use positioned I/O and run concurrently
//! - **Arena-based**: Tiles live in one flat arena and refer to each other
//!   by [`NodeId`]
//!
//! # Example
//!
//! ```no_run
//! use txtree::{Coordinate, GeoPoint, Side, Surface};
//!
//! let surface = Surface::open("world.tx")?;
//! let point = GeoPoint::from(Coordinate::new(2.35, 48.85));
//! if let Some(tile) = surface.find_tile(point, Some(8)) {
//!     let payload = tile.fetch_payload()?;
//!     let east = tile.neighbor(Side::East);
//!     println!("{} bytes at level {}, east: {east:?}", payload.len(), tile.level());
//! }
//! # Ok::<(), txtree::Error>(())
//! ```

pub mod bound;
pub mod coords;
pub mod source;
pub mod surface;

mod archive;
mod error;
#[cfg(test)]
mod fixtures;

pub use archive::Archive;
pub use bound::{GeoBound, Quadrant, Side};
pub use coords::{Coordinate, GeoPoint, degrees_to_meters, meters_to_degrees};
pub use error::{Error, ErrorKind, Result};
pub use source::{ByteSource, FileSource, MemorySource};
pub use surface::{
    HEMISPHERE_LEVEL, Neighbors, NodeId, RootKind, Surface, SurfaceNode, SurfaceStats, Tile,
};

// Re-export decode types for convenience.
pub use txtree_decode::{ArchiveHeader, DecodeError, TocNode};
