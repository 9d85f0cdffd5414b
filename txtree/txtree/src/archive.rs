//! Read-only handle on a tree archive.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use txtree_decode::{
    ArchiveHeader, DecodeError, HEADER_LEN, TocNode, inflate, parse_header, parse_toc,
    validate_forest,
};

use crate::error::{Error, Result};
use crate::source::{ByteSource, FileSource};

/// An opened tree archive.
///
/// Opening reads and validates the header and the whole table of contents;
/// tile payloads are read on demand. The archive can be shared between
/// threads, and fetches for different tiles run concurrently.
///
/// The archive is generic over its byte source. The default reads from a
/// file; [`MemorySource`](crate::MemorySource) serves archives held in
/// memory.
#[derive(Debug)]
pub struct Archive<S: ByteSource = FileSource> {
    source: RwLock<Option<S>>,
    path: Option<PathBuf>,
    header: ArchiveHeader,
    nodes: Vec<TocNode>,
}

impl Archive<FileSource> {
    /// Open the archive at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Opening tree archive {}", path.display());

        let source = FileSource::open(path).map_err(Error::io("archive file"))?;
        let mut archive = Self::from_source(source)?;
        archive.path = Some(path.to_path_buf());
        Ok(archive)
    }
}

impl<S: ByteSource> Archive<S> {
    /// Open an archive over any byte source.
    pub fn from_source(source: S) -> Result<Self> {
        let file_len = source.len().map_err(Error::io("archive length"))?;
        if file_len < u64::from(HEADER_LEN) {
            return Err(Error::Format(DecodeError::BufferTooSmall {
                expected: HEADER_LEN as usize,
                actual: usize::try_from(file_len).unwrap_or(usize::MAX),
            }));
        }

        let header_bytes = source
            .read_at(0, HEADER_LEN as usize)
            .map_err(Error::io("archive header"))?;
        let header = parse_header(&header_bytes)?;
        header.check_file_len(file_len)?;

        let toc_len = usize::try_from(header.toc_len()).map_err(|_| {
            Error::Format(DecodeError::InvalidFormat {
                context: "node count",
                detail: format!("{} records do not fit in memory", header.node_count),
            })
        })?;
        let toc_bytes = source
            .read_at(u64::from(header.header_size), toc_len)
            .map_err(Error::io("table of contents"))?;
        let nodes = parse_toc(&toc_bytes, &header)?;
        validate_forest(&header.roots, &nodes)?;

        tracing::debug!(
            "Opened {} archive: {} nodes, data region {}+{}",
            header.magic_tag(),
            header.node_count,
            header.data_offset,
            header.data_length
        );

        Ok(Self {
            source: RwLock::new(Some(source)),
            path: None,
            header,
            nodes,
        })
    }

    /// The parsed header.
    #[must_use]
    pub fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    /// All TOC records, indexed by node index.
    #[must_use]
    pub fn nodes(&self) -> &[TocNode] {
        &self.nodes
    }

    /// One TOC record.
    pub fn node(&self, index: u32) -> Result<&TocNode> {
        self.nodes
            .get(index as usize)
            .ok_or(Error::InvalidNode {
                index,
                len: self.header.node_count,
            })
    }

    /// Number of TOC records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the archive has no records. Never true for an opened archive,
    /// since every root must index a record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Path the archive was opened from, if it came from a file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the compressed payload of node `index`.
    pub fn fetch_raw(&self, index: u32) -> Result<Vec<u8>> {
        let node = self.node(index)?;
        // Both terms come from non-negative i32 and i64 fields.
        let offset = self.header.data_offset + node.position;
        let len = usize::try_from(node.compressed_length).map_err(|_| {
            Error::Decode {
                index,
                source: DecodeError::InvalidFormat {
                    context: "compressed length",
                    detail: format!("{} bytes do not fit in memory", node.compressed_length),
                },
            }
        })?;

        let guard = self.source.read().unwrap_or_else(PoisonError::into_inner);
        let source = guard.as_ref().ok_or(Error::Closed)?;

        tracing::trace!("Reading tile {index}: {len} bytes at {offset}");
        source.read_at(offset, len).map_err(Error::io("tile payload"))
    }

    /// Read and decompress the payload of node `index`.
    ///
    /// The result is exactly the record's declared decompressed size.
    pub fn fetch_decompressed(&self, index: u32) -> Result<Vec<u8>> {
        let raw = self.fetch_raw(index)?;
        let expected = self.node(index)?.decompressed_size;
        inflate(&raw, expected).map_err(|source| Error::Decode { index, source })
    }

    /// Release the byte source. Later fetches fail with [`Error::Closed`].
    ///
    /// Closing an already closed archive does nothing.
    pub fn close(&self) {
        let mut guard = self.source.write().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            tracing::debug!("Closed tree archive");
        }
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.source
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::Arc;

    use txtree_decode::testing::{ArchiveBuilder, RawRecord, encode_header, encode_record};

    use super::*;
    use crate::error::ErrorKind;
    use crate::source::MemorySource;

    fn open(bytes: Vec<u8>) -> Result<Archive<MemorySource>> {
        Archive::from_source(MemorySource::new(bytes))
    }

    fn single_node() -> Vec<u8> {
        let mut builder = ArchiveBuilder::new();
        builder.push(vec![42u8; 300]);
        builder.build()
    }

    /// A source whose reads always fail.
    #[derive(Debug)]
    struct FailingSource(u64);

    impl ByteSource for FailingSource {
        fn len(&self) -> io::Result<u64> {
            Ok(self.0)
        }

        fn read_at(&self, _offset: u64, _len: usize) -> io::Result<Vec<u8>> {
            Err(io::Error::other("device unplugged"))
        }
    }

    #[test]
    fn test_single_node_archive() {
        let archive = open(single_node()).unwrap();
        let header = archive.header();
        assert_eq!(header.magic_tag(), "TX10");
        assert_eq!(header.header_size, 48);
        assert_eq!(header.node_count, 1);
        assert_eq!(header.roots, [0; 5]);

        let node = archive.node(0).unwrap();
        assert_eq!(node.position, 0);
        assert_eq!(node.compressed_length, header.data_length);

        let raw = archive.fetch_raw(0).unwrap();
        assert_eq!(raw.len() as u64, header.data_length);
        assert_eq!(archive.fetch_decompressed(0).unwrap(), vec![42u8; 300]);
    }

    #[test]
    fn test_toc_at_declared_header_size() {
        let mut builder = ArchiveBuilder::new().header_size(100);
        let root = builder.push(b"root".to_vec());
        let child = builder.push(b"child".to_vec());
        builder.set_children(root, [None, None, Some(child), None]);

        let archive = open(builder.build()).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.node(0).unwrap().children, [None, None, Some(1), None]);
        assert_eq!(archive.fetch_decompressed(1).unwrap(), b"child");
        assert_eq!(archive.fetch_decompressed(0).unwrap(), b"root");
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut builder = ArchiveBuilder::new().magic(*b"PK\x03\x04");
        builder.push(b"x".to_vec());
        let error = open(builder.build()).unwrap_err();
        assert!(matches!(
            error,
            Error::Format(DecodeError::InvalidMagic { .. })
        ));
        assert_eq!(error.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut builder = ArchiveBuilder::new().magic([b'T', b'X', 2, 0]);
        builder.push(b"x".to_vec());
        assert!(matches!(
            open(builder.build()),
            Err(Error::Format(DecodeError::UnsupportedVersion {
                major: 2,
                minor: 0
            }))
        ));
    }

    #[test]
    fn test_rejects_short_file() {
        assert!(matches!(
            open(vec![b'T', b'X', 1, 0, 0, 0]),
            Err(Error::Format(DecodeError::BufferTooSmall {
                expected: 48,
                actual: 6
            }))
        ));
    }

    #[test]
    fn test_rejects_truncated_data_region() {
        let mut bytes = single_node();
        bytes.pop();
        assert!(matches!(
            open(bytes),
            Err(Error::Format(DecodeError::InvalidFormat {
                context: "header",
                ..
            }))
        ));
    }

    #[test]
    fn test_rejects_cycle() {
        let mut builder = ArchiveBuilder::new();
        let a = builder.push(b"a".to_vec());
        let b = builder.push(b"b".to_vec());
        builder.set_children(a, [Some(b), None, None, None]);
        builder.set_children(b, [None, Some(a), None, None]);
        assert!(matches!(
            open(builder.build()),
            Err(Error::Format(DecodeError::NotAForest { .. }))
        ));
    }

    #[test]
    fn test_rejects_child_out_of_range() {
        let mut builder = ArchiveBuilder::new();
        builder.push(b"a".to_vec());
        let header = builder.header();
        let mut bytes = encode_header(&header);
        let record = RawRecord {
            children: [5, -1, -1, -1],
            ..RawRecord::leaf(0, 1)
        };
        bytes.extend_from_slice(&encode_record(&record));
        bytes.resize(bytes.len() + header.data_length as usize, 0);
        assert!(matches!(
            open(bytes),
            Err(Error::Format(DecodeError::IndexOutOfBounds { index: 5, .. }))
        ));
    }

    #[test]
    fn test_size_mismatch_is_decode_error() {
        let mut builder = ArchiveBuilder::new();
        builder.push(vec![1u8; 64]);
        let mut bytes = builder.build();
        // Declared decompressed size lives at bytes 8-11 of the first record.
        let size_offset = 48 + 8;
        bytes[size_offset..size_offset + 4].copy_from_slice(&65i32.to_le_bytes());

        let archive = open(bytes).unwrap();
        let error = archive.fetch_decompressed(0).unwrap_err();
        assert!(matches!(
            error,
            Error::Decode {
                index: 0,
                source: DecodeError::SizeMismatch {
                    expected: 65,
                    actual: 64
                }
            }
        ));
        assert_eq!(error.kind(), ErrorKind::Decode);
        // The raw bytes are still readable.
        assert!(archive.fetch_raw(0).is_ok());
    }

    #[test]
    fn test_invalid_node_index() {
        let archive = open(single_node()).unwrap();
        assert!(matches!(
            archive.fetch_raw(1),
            Err(Error::InvalidNode { index: 1, len: 1 })
        ));
        assert_eq!(archive.node(7).unwrap_err().kind(), ErrorKind::Usage);
    }

    #[test]
    fn test_close() {
        let archive = open(single_node()).unwrap();
        assert!(!archive.is_closed());
        archive.close();
        assert!(archive.is_closed());
        assert!(matches!(archive.fetch_raw(0), Err(Error::Closed)));
        assert!(matches!(archive.fetch_decompressed(0), Err(Error::Closed)));

        // Idempotent, and the node table stays available.
        archive.close();
        assert_eq!(archive.node(0).unwrap().decompressed_size, 300);
    }

    /// A source that reports its full length but cannot read past `readable`.
    #[derive(Debug)]
    struct TruncatedSource {
        inner: MemorySource,
        readable: u64,
    }

    impl ByteSource for TruncatedSource {
        fn len(&self) -> io::Result<u64> {
            self.inner.len()
        }

        fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
            if offset + len as u64 > self.readable {
                return Err(io::ErrorKind::UnexpectedEof.into());
            }
            self.inner.read_at(offset, len)
        }
    }

    #[test]
    fn test_payload_read_failure_is_io_error() {
        let mut builder = ArchiveBuilder::new();
        let root = builder.push(b"root".to_vec());
        let child = builder.push(b"child".to_vec());
        builder.set_children(root, [Some(child), None, None, None]);
        let bytes = builder.build();
        let readable = builder.header().data_offset;

        let archive = Archive::from_source(TruncatedSource {
            inner: MemorySource::new(bytes),
            readable,
        })
        .unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.node(0).unwrap().children[0], Some(1));

        for index in [0, 1] {
            let error = archive.fetch_raw(index).unwrap_err();
            assert!(matches!(
                error,
                Error::Io {
                    context: "tile payload",
                    ..
                }
            ));
            assert_eq!(error.kind(), ErrorKind::Io);
            assert!(matches!(
                archive.fetch_decompressed(index),
                Err(Error::Io { .. })
            ));
        }
        assert_eq!(archive.nodes().len(), 2);
        assert!(!archive.is_closed());
    }

    #[test]
    fn test_read_failure_is_io_error() {
        let error = Archive::from_source(FailingSource(1024)).unwrap_err();
        assert!(matches!(
            error,
            Error::Io {
                context: "archive header",
                ..
            }
        ));
        assert_eq!(error.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_open_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&single_node()).unwrap();
        file.flush().unwrap();

        let archive = Archive::open(file.path()).unwrap();
        assert_eq!(archive.path(), Some(file.path()));
        assert_eq!(archive.fetch_decompressed(0).unwrap().len(), 300);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let error = Archive::open(dir.path().join("missing.tx")).unwrap_err();
        assert!(matches!(
            error,
            Error::Io {
                context: "archive file",
                ..
            }
        ));
    }

    #[test]
    fn test_concurrent_fetches() {
        let mut builder = ArchiveBuilder::new();
        let root = builder.push(b"root".to_vec());
        let mut children = [None; 4];
        for (slot, child) in children.iter_mut().enumerate() {
            *child = Some(builder.push(vec![u8::try_from(slot).unwrap(); 1000]));
        }
        builder.set_children(root, children);
        let archive = Arc::new(open(builder.build()).unwrap());

        std::thread::scope(|scope| {
            for index in 1..=4u32 {
                let archive = Arc::clone(&archive);
                scope.spawn(move || {
                    for _ in 0..10 {
                        let payload = archive.fetch_decompressed(index).unwrap();
                        assert_eq!(payload.len(), 1000);
                        assert!(payload.iter().all(|&b| u32::from(b) == index - 1));
                    }
                });
            }
        });
    }
}
