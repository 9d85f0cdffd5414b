//! Little-endian fixed-width reads.
//!
//! Each function reads at `*offset` and advances it by exactly the width
//! read. Nothing is aligned or skipped.

use crate::error::{DecodeError, DecodeResult};

/// Read `N` raw bytes.
///
/// # Errors
///
/// Returns an error if fewer than `N` bytes remain after `offset`.
pub fn read_array<const N: usize>(
    data: &[u8],
    offset: &mut usize,
    context: &'static str,
) -> DecodeResult<[u8; N]> {
    let end = offset
        .checked_add(N)
        .filter(|&end| end <= data.len())
        .ok_or(DecodeError::UnexpectedEof { context })?;

    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&data[*offset..end]);
    *offset = end;
    Ok(bytes)
}

/// Read a little-endian `i32`.
///
/// # Errors
///
/// Returns an error if fewer than 4 bytes remain.
pub fn read_i32(data: &[u8], offset: &mut usize, context: &'static str) -> DecodeResult<i32> {
    read_array(data, offset, context).map(i32::from_le_bytes)
}

/// Read a little-endian `i64`.
///
/// # Errors
///
/// Returns an error if fewer than 8 bytes remain.
pub fn read_i64(data: &[u8], offset: &mut usize, context: &'static str) -> DecodeResult<i64> {
    read_array(data, offset, context).map(i64::from_le_bytes)
}
