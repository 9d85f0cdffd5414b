//! Decode the header and table of contents of `TX10` tree archives.
//!
//! A tree archive stores a globally tiled texture pyramid: a fixed 48-byte
//! header, a table of contents (TOC) of 32-byte node records, and a region of
//! zlib-compressed tile payloads. This crate turns those bytes into typed
//! values. It never touches the file system; the caller reads byte ranges and
//! hands them over.
//!
//! # Design principles
//!
//! - **Synchronous**: No async, no threading primitives
//! - **Bit-exact**: Every field is read at its declared offset, little-endian,
//!   with no padding or alignment
//! - **Strict**: Unknown versions and inconsistent sizes are rejected, never
//!   guessed at
//!
//! # Key functions
//!
//! - [`parse_header`]: Decode the fixed header
//! - [`parse_toc`]: Decode the node records and derive compressed lengths
//! - [`validate_forest`]: Check that the roots span a forest
//! - [`inflate`]: Decompress a tile payload to its declared size

mod error;
mod le;

pub mod forest;
pub mod header;
pub mod inflate;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod toc;

pub use error::{DecodeError, DecodeResult};
pub use forest::validate_forest;
pub use header::parse_header;
pub use inflate::inflate;
pub use le::{read_array, read_i32, read_i64};
pub use toc::{compressed_lengths, parse_toc};

/// Magic tag: identity `TX`, major version 1, minor version 0.
pub const MAGIC: [u8; 4] = [b'T', b'X', 1, 0];

/// Length of the fixed header in bytes.
pub const HEADER_LEN: u32 = 48;

/// Length of one TOC record in bytes (i64 + i32 + 4 × i32 + i32).
pub const TOC_RECORD_LEN: u32 = 32;

/// Number of root indices stored in the header.
pub const ROOT_COUNT: usize = 5;

/// On-disk child index marking an empty quadrant.
pub const NO_CHILD: i32 = -1;

/// Archive header, parsed once and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ArchiveHeader {
    /// Identity and version bytes.
    pub magic: [u8; 4],
    /// Byte offset where the TOC begins.
    pub header_size: u32,
    /// Reserved bit flags; not interpreted.
    pub flags: i32,
    /// Absolute file offset of the compressed-payload region.
    pub data_offset: u64,
    /// Total length of the compressed-payload region.
    pub data_length: u64,
    /// Number of TOC records.
    pub node_count: u32,
    /// Node indices of the global level 1, 2 and 3 roots, followed by the
    /// west and east hemisphere roots.
    pub roots: [u32; ROOT_COUNT],
}

impl ArchiveHeader {
    /// Major and minor version from the magic tag.
    #[must_use]
    pub fn version(&self) -> (u8, u8) {
        (self.magic[2], self.magic[3])
    }

    /// Magic tag rendered the way the format names it (e.g. `TX10`).
    #[must_use]
    pub fn magic_tag(&self) -> String {
        let (major, minor) = self.version();
        format!(
            "{}{}{major}{minor}",
            char::from(self.magic[0]),
            char::from(self.magic[1])
        )
    }

    /// Length of the TOC in bytes.
    #[must_use]
    pub fn toc_len(&self) -> u64 {
        u64::from(self.node_count) * u64::from(TOC_RECORD_LEN)
    }

    /// Offset one past the last TOC byte.
    #[must_use]
    pub fn toc_end(&self) -> u64 {
        u64::from(self.header_size) + self.toc_len()
    }

    /// Offset one past the last byte of the payload region.
    #[must_use]
    pub fn data_end(&self) -> u64 {
        self.data_offset.saturating_add(self.data_length)
    }

    /// Check the declared layout against the actual file length.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOC or the payload region extends past the
    /// end of the file.
    pub fn check_file_len(&self, file_len: u64) -> DecodeResult<()> {
        if self.toc_end() > file_len {
            return Err(DecodeError::InvalidFormat {
                context: "header",
                detail: format!(
                    "table of contents ends at {} but the file is {file_len} bytes",
                    self.toc_end()
                ),
            });
        }
        if self.data_end() > file_len {
            return Err(DecodeError::InvalidFormat {
                context: "header",
                detail: format!(
                    "data region ends at {} but the file is {file_len} bytes",
                    self.data_end()
                ),
            });
        }
        Ok(())
    }
}

/// One decoded TOC record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TocNode {
    /// Payload offset relative to the start of the data region.
    pub position: u64,
    /// Compressed payload length, derived from neighbouring positions.
    pub compressed_length: u64,
    /// Payload size after decompression.
    pub decompressed_size: u32,
    /// Child node indices in NW, NE, SW, SE order.
    pub children: [Option<u32>; 4],
    /// Unused; may contain garbage.
    pub reserved: i32,
}

impl TocNode {
    /// Indices of the children that are present.
    pub fn child_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.children.iter().flatten().copied()
    }

    /// Whether the record has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}
