//! Error types for decoding operations.

use std::fmt;

/// Errors that can occur while decoding archive structures or payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Input buffer is too small for the expected data.
    BufferTooSmall { expected: usize, actual: usize },
    /// A fixed-width read ran past the end of the buffer.
    UnexpectedEof { context: &'static str },
    /// The identity bytes of the magic tag are wrong.
    InvalidMagic { found: [u8; 4] },
    /// The identity matches but the version is not one we can read.
    UnsupportedVersion { major: u8, minor: u8 },
    /// Invalid data format or structure.
    InvalidFormat {
        context: &'static str,
        detail: String,
    },
    /// A node index points outside the node table.
    IndexOutOfBounds {
        context: &'static str,
        index: u32,
        len: u32,
    },
    /// A node is reachable twice from the same root, so the TOC does not
    /// describe a forest.
    NotAForest { root: u32, index: u32 },
    /// The zlib stream is malformed.
    Inflate { detail: String },
    /// The payload inflated to a different size than the record declares.
    /// An oversized payload is reported as `expected + 1`.
    SizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall { expected, actual } => {
                write!(
                    f,
                    "buffer too small: expected {expected} bytes, got {actual}"
                )
            }
            Self::UnexpectedEof { context } => {
                write!(f, "unexpected end of buffer in {context}")
            }
            Self::InvalidMagic { found } => {
                write!(f, "not a tree archive: magic bytes {found:02x?}")
            }
            Self::UnsupportedVersion { major, minor } => {
                write!(f, "unsupported tree archive version {major}.{minor}")
            }
            Self::InvalidFormat { context, detail } => {
                write!(f, "invalid format in {context}: {detail}")
            }
            Self::IndexOutOfBounds {
                context,
                index,
                len,
            } => {
                write!(f, "{context} {index} out of bounds for length {len}")
            }
            Self::NotAForest { root, index } => {
                write!(
                    f,
                    "node {index} is reachable more than once from root {root}"
                )
            }
            Self::Inflate { detail } => write!(f, "inflate failed: {detail}"),
            Self::SizeMismatch { expected, actual } => {
                write!(
                    f,
                    "payload inflated to {actual} bytes, expected {expected}"
                )
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
