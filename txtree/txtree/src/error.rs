//! Error types for the txtree crate.

use std::{fmt, io};

use txtree_decode::DecodeError;

/// Result type for txtree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in txtree operations.
#[derive(Debug)]
pub enum Error {
    /// The archive structure is invalid; it cannot be opened.
    Format(DecodeError),
    /// An underlying read failed.
    Io {
        /// What was being read.
        context: &'static str,
        /// The underlying error.
        source: io::Error,
    },
    /// The archive was closed before the read.
    Closed,
    /// A single tile payload failed to decompress or had the wrong size.
    Decode {
        /// Node table index of the tile.
        index: u32,
        /// The underlying error.
        source: DecodeError,
    },
    /// A node table index passed by the caller is out of range.
    InvalidNode {
        /// The index that was requested.
        index: u32,
        /// Number of nodes in the table.
        len: u32,
    },
}

/// Broad class of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed archive structure.
    Format,
    /// Read failure, including reads on a closed archive.
    Io,
    /// Corrupt tile payload.
    Decode,
    /// Invalid argument from the caller.
    Usage,
}

impl Error {
    /// The class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Format(_) => ErrorKind::Format,
            Error::Io { .. } | Error::Closed => ErrorKind::Io,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::InvalidNode { .. } => ErrorKind::Usage,
        }
    }

    pub(crate) fn io(context: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Error::Io { context, source }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Format(e) => write!(f, "invalid tree archive: {e}"),
            Error::Io { context, source } => write!(f, "failed to read {context}: {source}"),
            Error::Closed => write!(f, "tree archive is closed"),
            Error::Decode { index, source } => {
                write!(f, "failed to decode tile {index}: {source}")
            }
            Error::InvalidNode { index, len } => {
                write!(f, "node {index} out of bounds for {len} nodes")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Format(e) | Error::Decode { source: e, .. } => Some(e),
            Error::Io { source, .. } => Some(source),
            Error::Closed | Error::InvalidNode { .. } => None,
        }
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Error::Format(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            Error::from(DecodeError::InvalidMagic { found: *b"PK\x03\x04" }).kind(),
            ErrorKind::Format
        );
        assert_eq!(Error::Closed.kind(), ErrorKind::Io);
        assert_eq!(
            Error::io("payload")(io::ErrorKind::UnexpectedEof.into()).kind(),
            ErrorKind::Io
        );
        assert_eq!(
            Error::Decode {
                index: 3,
                source: DecodeError::SizeMismatch {
                    expected: 4,
                    actual: 2
                }
            }
            .kind(),
            ErrorKind::Decode
        );
        assert_eq!(Error::InvalidNode { index: 9, len: 2 }.kind(), ErrorKind::Usage);
    }

    #[test]
    fn test_display_and_source() {
        let error = Error::Decode {
            index: 3,
            source: DecodeError::SizeMismatch {
                expected: 4,
                actual: 2,
            },
        };
        assert_eq!(
            error.to_string(),
            "failed to decode tile 3: payload inflated to 2 bytes, expected 4"
        );
        assert!(std::error::Error::source(&error).is_some());
        assert!(std::error::Error::source(&Error::Closed).is_none());
    }
}
