//! Synthetic archive writer for tests.
//!
//! Tree archives are read-only in this workspace; this module exists so tests
//! can produce well-formed (and deliberately malformed) archives without
//! checking binary fixtures in.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::missing_panics_doc
)]

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;

use crate::{ArchiveHeader, HEADER_LEN, MAGIC, NO_CHILD, ROOT_COUNT, TOC_RECORD_LEN};

/// Encode a header exactly as it appears on disk (48 bytes).
#[must_use]
pub fn encode_header(header: &ArchiveHeader) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN as usize);
    out.extend_from_slice(&header.magic);
    out.extend_from_slice(&(header.header_size as i32).to_le_bytes());
    out.extend_from_slice(&header.flags.to_le_bytes());
    out.extend_from_slice(&(header.data_offset as i32).to_le_bytes());
    out.extend_from_slice(&(header.data_length as i64).to_le_bytes());
    out.extend_from_slice(&(header.node_count as i32).to_le_bytes());
    for root in header.roots {
        out.extend_from_slice(&(root as i32).to_le_bytes());
    }
    out
}

/// A TOC record with on-disk field types, so tests can write values the
/// decoder must reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord {
    pub position: i64,
    pub size: i32,
    pub children: [i32; 4],
    pub reserved: i32,
}

impl RawRecord {
    /// A record with no children.
    #[must_use]
    pub fn leaf(position: i64, size: i32) -> Self {
        Self {
            position,
            size,
            children: [NO_CHILD; 4],
            reserved: 0,
        }
    }
}

/// Encode one TOC record (32 bytes).
#[must_use]
pub fn encode_record(record: &RawRecord) -> Vec<u8> {
    let mut out = Vec::with_capacity(TOC_RECORD_LEN as usize);
    out.extend_from_slice(&record.position.to_le_bytes());
    out.extend_from_slice(&record.size.to_le_bytes());
    for child in record.children {
        out.extend_from_slice(&child.to_le_bytes());
    }
    out.extend_from_slice(&record.reserved.to_le_bytes());
    out
}

/// Compress a payload with zlib.
#[must_use]
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .expect("writing to a Vec cannot fail");
    encoder.finish().expect("writing to a Vec cannot fail")
}

#[derive(Debug, Clone)]
struct NodeSpec {
    payload: Vec<u8>,
    children: [Option<u32>; 4],
}

/// Builds a complete archive in memory.
///
/// Nodes are laid out in insertion order: header, zero padding up to
/// `header_size`, TOC, then the compressed payloads back to back starting at
/// position 0.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    magic: [u8; 4],
    header_size: u32,
    flags: i32,
    roots: [u32; ROOT_COUNT],
    nodes: Vec<NodeSpec>,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    /// Create a builder with a 48-byte header and all roots at node 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: MAGIC,
            header_size: HEADER_LEN,
            flags: 0,
            roots: [0; ROOT_COUNT],
            nodes: Vec::new(),
        }
    }

    /// Override the magic tag.
    #[must_use]
    pub fn magic(mut self, magic: [u8; 4]) -> Self {
        self.magic = magic;
        self
    }

    /// Place the TOC at `header_size` instead of directly after the header.
    #[must_use]
    pub fn header_size(mut self, header_size: u32) -> Self {
        assert!(header_size >= HEADER_LEN);
        self.header_size = header_size;
        self
    }

    /// Set the reserved flags word.
    #[must_use]
    pub fn flags(mut self, flags: i32) -> Self {
        self.flags = flags;
        self
    }

    /// Append a node with an uncompressed payload; returns its index.
    pub fn push(&mut self, payload: impl Into<Vec<u8>>) -> u32 {
        self.nodes.push(NodeSpec {
            payload: payload.into(),
            children: [None; 4],
        });
        (self.nodes.len() - 1) as u32
    }

    /// Set the NW, NE, SW, SE children of a node.
    pub fn set_children(&mut self, index: u32, children: [Option<u32>; 4]) {
        self.nodes[index as usize].children = children;
    }

    /// Set the five root indices in header order.
    pub fn set_roots(&mut self, roots: [u32; ROOT_COUNT]) {
        self.roots = roots;
    }

    /// Number of nodes pushed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The header [`build`](Self::build) will write.
    #[must_use]
    pub fn header(&self) -> ArchiveHeader {
        let data_length: usize = self.compressed().iter().map(Vec::len).sum();
        let node_count = self.nodes.len() as u32;
        ArchiveHeader {
            magic: self.magic,
            header_size: self.header_size,
            flags: self.flags,
            data_offset: u64::from(self.header_size) + u64::from(node_count * TOC_RECORD_LEN),
            data_length: data_length as u64,
            node_count,
            roots: self.roots,
        }
    }

    /// Encode the archive.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let header = self.header();
        let compressed = self.compressed();

        let mut out = encode_header(&header);
        out.resize(self.header_size as usize, 0);

        let mut position = 0i64;
        for (node, blob) in self.nodes.iter().zip(&compressed) {
            let record = RawRecord {
                position,
                size: node.payload.len() as i32,
                children: node.children.map(|child| child.map_or(NO_CHILD, |c| c as i32)),
                reserved: 0,
            };
            out.extend_from_slice(&encode_record(&record));
            position += blob.len() as i64;
        }

        debug_assert_eq!(out.len() as u64, header.data_offset);
        for blob in compressed {
            out.extend_from_slice(&blob);
        }
        out
    }

    fn compressed(&self) -> Vec<Vec<u8>> {
        self.nodes.iter().map(|node| deflate(&node.payload)).collect()
    }
}
