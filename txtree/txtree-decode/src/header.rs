//! Fixed header decoding.

use crate::error::{DecodeError, DecodeResult};
use crate::le::{read_array, read_i32, read_i64};
use crate::{ArchiveHeader, HEADER_LEN, MAGIC, ROOT_COUNT};

/// Decode the 48-byte archive header.
///
/// # Format
///
/// - Bytes 0-3: Magic (`'T'`, `'X'`, major, minor)
/// - Bytes 4-7: Header size, i.e. where the TOC begins
/// - Bytes 8-11: Flags (ignored)
/// - Bytes 12-15: Data region offset
/// - Bytes 16-23: Data region length (i64)
/// - Bytes 24-27: Node count
/// - Bytes 28-47: Five root node indices
///
/// All integers are little-endian and signed on disk. Negative sizes,
/// offsets and indices are rejected.
///
/// # Errors
///
/// Returns an error if the buffer is shorter than 48 bytes, the magic or
/// version is wrong, a field is negative, the declared header size is
/// smaller than the fixed header, or a root index is not below the node
/// count.
pub fn parse_header(data: &[u8]) -> DecodeResult<ArchiveHeader> {
    if data.len() < HEADER_LEN as usize {
        return Err(DecodeError::BufferTooSmall {
            expected: HEADER_LEN as usize,
            actual: data.len(),
        });
    }

    let mut offset = 0;
    let magic = read_array::<4>(data, &mut offset, "magic")?;
    check_magic(magic)?;

    let header_size = non_negative(read_i32(data, &mut offset, "header size")?, "header size")?;
    let flags = read_i32(data, &mut offset, "flags")?;
    let data_offset = non_negative(read_i32(data, &mut offset, "data offset")?, "data offset")?;
    let data_length = read_i64(data, &mut offset, "data length")?;
    let data_length = u64::try_from(data_length).map_err(|_| DecodeError::InvalidFormat {
        context: "data length",
        detail: format!("negative value {data_length}"),
    })?;
    let node_count = non_negative(read_i32(data, &mut offset, "node count")?, "node count")?;

    let mut roots = [0u32; ROOT_COUNT];
    for root in &mut roots {
        *root = non_negative(read_i32(data, &mut offset, "root index")?, "root index")?;
        if *root >= node_count {
            return Err(DecodeError::IndexOutOfBounds {
                context: "root index",
                index: *root,
                len: node_count,
            });
        }
    }
    debug_assert_eq!(offset, HEADER_LEN as usize);

    if header_size < HEADER_LEN {
        return Err(DecodeError::InvalidFormat {
            context: "header size",
            detail: format!("{header_size} is smaller than the {HEADER_LEN}-byte fixed header"),
        });
    }

    Ok(ArchiveHeader {
        magic,
        header_size,
        flags,
        data_offset: u64::from(data_offset),
        data_length,
        node_count,
        roots,
    })
}

fn check_magic(magic: [u8; 4]) -> DecodeResult<()> {
    if magic[..2] != MAGIC[..2] {
        return Err(DecodeError::InvalidMagic { found: magic });
    }
    if magic[2..] != MAGIC[2..] {
        return Err(DecodeError::UnsupportedVersion {
            major: magic[2],
            minor: magic[3],
        });
    }
    Ok(())
}

fn non_negative(value: i32, context: &'static str) -> DecodeResult<u32> {
    u32::try_from(value).map_err(|_| DecodeError::InvalidFormat {
        context,
        detail: format!("negative value {value}"),
    })
}
