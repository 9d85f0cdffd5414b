//! Random-access byte sources backing an archive.
//!
//! This module provides a `ByteSource` trait and implementations for reading
//! byte ranges at explicit absolute offsets.
//!
//! # Implementations
//!
//! - [`FileSource`]: A file on disk, read with positioned reads
//! - [`MemorySource`]: An in-memory buffer

use std::fs::File;
use std::io;
use std::path::Path;

/// A random-access source of archive bytes.
///
/// Reads never depend on or move a shared cursor, so a source can serve
/// concurrent reads for different ranges.
pub trait ByteSource: Send + Sync {
    /// Total length of the source in bytes.
    fn len(&self) -> io::Result<u64>;

    /// Read exactly `len` bytes starting at absolute `offset`.
    ///
    /// A range that extends past the end of the source fails with
    /// [`io::ErrorKind::UnexpectedEof`].
    fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>>;
}

/// A file read with positioned reads.
///
/// On Unix and Windows reads go through the platform's positioned-read call
/// and run concurrently. Elsewhere they fall back to seek-then-read under a
/// mutex.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    #[cfg(not(any(unix, windows)))]
    cursor: std::sync::Mutex<()>,
}

impl FileSource {
    /// Open a file for reading.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        File::open(path).map(Self::from_file)
    }

    /// Wrap an already opened file.
    #[must_use]
    pub fn from_file(file: File) -> Self {
        Self {
            file,
            #[cfg(not(any(unix, windows)))]
            cursor: std::sync::Mutex::new(()),
        }
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        check_range(offset, len)?;
        let mut buffer = vec![0u8; len];

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file.read_exact_at(&mut buffer, offset)?;
        }

        #[cfg(windows)]
        {
            use std::os::windows::fs::FileExt;
            let mut filled = 0;
            while filled < len {
                let read = self
                    .file
                    .seek_read(&mut buffer[filled..], offset + filled as u64)?;
                if read == 0 {
                    return Err(io::ErrorKind::UnexpectedEof.into());
                }
                filled += read;
            }
        }

        #[cfg(not(any(unix, windows)))]
        {
            use std::io::{Read, Seek, SeekFrom};
            let _guard = self
                .cursor
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let mut file = &self.file;
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(&mut buffer)?;
        }

        Ok(buffer)
    }
}

/// An archive held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Vec<u8>,
}

impl MemorySource {
    /// Create a source over the given bytes.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// The underlying bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for MemorySource {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl ByteSource for MemorySource {
    fn len(&self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let end = check_range(offset, len)?;
        let range = usize::try_from(offset)
            .ok()
            .zip(usize::try_from(end).ok())
            .filter(|&(_, end)| end <= self.data.len())
            .ok_or(io::Error::from(io::ErrorKind::UnexpectedEof))?;
        Ok(self.data[range.0..range.1].to_vec())
    }
}

/// Reject ranges whose end does not fit in a `u64`.
fn check_range(offset: u64, len: usize) -> io::Result<u64> {
    offset.checked_add(len as u64).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("range of {len} bytes at {offset} overflows"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new((0u8..10).collect());
        assert_eq!(source.len().unwrap(), 10);
        assert_eq!(source.read_at(2, 3).unwrap(), vec![2, 3, 4]);
        assert_eq!(source.read_at(10, 0).unwrap(), Vec::<u8>::new());
        assert_eq!(source.read_at(0, 10).unwrap().len(), 10);
    }

    #[test]
    fn test_memory_source_short_read() {
        let source = MemorySource::new(vec![0; 4]);
        let error = source.read_at(2, 3).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);
        let error = source.read_at(u64::MAX, 1).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"0123456789").unwrap();
        file.flush().unwrap();

        let source = FileSource::open(file.path()).unwrap();
        assert_eq!(source.len().unwrap(), 10);
        assert_eq!(source.read_at(7, 3).unwrap(), b"789");
        assert_eq!(source.read_at(0, 2).unwrap(), b"01");

        let error = source.read_at(8, 5).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_file_source_concurrent_reads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..=255).collect();
        file.write_all(&data).unwrap();
        file.flush().unwrap();

        let source = FileSource::open(file.path()).unwrap();
        std::thread::scope(|scope| {
            for start in (0u8..=240).step_by(16) {
                let source = &source;
                scope.spawn(move || {
                    let bytes = source.read_at(u64::from(start), 16).unwrap();
                    assert_eq!(bytes[0], start);
                    assert_eq!(bytes[15], start + 15);
                });
            }
        });
    }
}
