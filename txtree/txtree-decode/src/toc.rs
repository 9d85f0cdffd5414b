//! Table of contents decoding.

use crate::error::{DecodeError, DecodeResult};
use crate::le::{read_i32, read_i64};
use crate::{ArchiveHeader, NO_CHILD, TOC_RECORD_LEN, TocNode};

/// Decode the TOC records that follow the header.
///
/// `data` must start at the header's declared `header_size`, which is not
/// necessarily 48.
///
/// # Format
///
/// Each record is 32 bytes, read back to back:
/// - Bytes 0-7: Payload position within the data region (i64)
/// - Bytes 8-11: Decompressed size
/// - Bytes 12-27: Child indices in NW, NE, SW, SE order, `-1` when absent
/// - Bytes 28-31: Reserved
///
/// Compressed lengths are derived afterwards with [`compressed_lengths`].
///
/// # Errors
///
/// Returns an error if the buffer is shorter than the TOC, a field is
/// negative, a child index is not below the node count, or positions are
/// not strictly increasing.
pub fn parse_toc(data: &[u8], header: &ArchiveHeader) -> DecodeResult<Vec<TocNode>> {
    let count = header.node_count as usize;
    let expected = count * TOC_RECORD_LEN as usize;
    if data.len() < expected {
        return Err(DecodeError::BufferTooSmall {
            expected,
            actual: data.len(),
        });
    }

    let mut offset = 0;
    let mut nodes = Vec::with_capacity(count);
    for _ in 0..count {
        nodes.push(read_record(data, &mut offset, header.node_count)?);
    }
    debug_assert_eq!(offset, expected);

    let positions: Vec<u64> = nodes.iter().map(|node| node.position).collect();
    let lengths = compressed_lengths(&positions, header.data_length)?;
    for (node, length) in nodes.iter_mut().zip(lengths) {
        node.compressed_length = length;
    }

    Ok(nodes)
}

fn read_record(data: &[u8], offset: &mut usize, node_count: u32) -> DecodeResult<TocNode> {
    let position = read_i64(data, offset, "node position")?;
    let position = u64::try_from(position).map_err(|_| DecodeError::InvalidFormat {
        context: "node position",
        detail: format!("negative value {position}"),
    })?;

    let size = read_i32(data, offset, "node size")?;
    let decompressed_size = u32::try_from(size).map_err(|_| DecodeError::InvalidFormat {
        context: "node size",
        detail: format!("negative value {size}"),
    })?;

    let mut children = [None; 4];
    for child in &mut children {
        let raw = read_i32(data, offset, "child index")?;
        if raw == NO_CHILD {
            continue;
        }
        let index = u32::try_from(raw).map_err(|_| DecodeError::InvalidFormat {
            context: "child index",
            detail: format!("invalid value {raw}"),
        })?;
        if index >= node_count {
            return Err(DecodeError::IndexOutOfBounds {
                context: "child index",
                index,
                len: node_count,
            });
        }
        *child = Some(index);
    }

    let reserved = read_i32(data, offset, "reserved")?;

    Ok(TocNode {
        position,
        compressed_length: 0,
        decompressed_size,
        children,
        reserved,
    })
}

/// Derive each record's compressed length from the record positions.
///
/// Every record but the last spans up to the next record's position. The
/// last record has no successor, so its length falls back to
/// `data_length - (position[last] - position[0])`: whatever the earlier
/// records leave of the data region. This is a policy, not something the
/// format states; archives whose first position is not zero will have a
/// last record that reads past the declared region.
///
/// # Errors
///
/// Returns an error if positions are not strictly increasing or the earlier
/// records already claim the whole data region.
pub fn compressed_lengths(positions: &[u64], data_length: u64) -> DecodeResult<Vec<u64>> {
    let (Some(&first), Some(&last)) = (positions.first(), positions.last()) else {
        return Ok(Vec::new());
    };

    let mut lengths = Vec::with_capacity(positions.len());
    for (index, pair) in positions.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(DecodeError::InvalidFormat {
                context: "node position",
                detail: format!(
                    "record {} at {} does not follow record {index} at {}",
                    index + 1,
                    pair[1],
                    pair[0]
                ),
            });
        }
        lengths.push(pair[1] - pair[0]);
    }

    let claimed = last - first;
    if claimed >= data_length {
        return Err(DecodeError::InvalidFormat {
            context: "data length",
            detail: format!(
                "records claim {claimed} of {data_length} bytes, leaving nothing for the last record"
            ),
        });
    }
    lengths.push(data_length - claimed);

    Ok(lengths)
}
