//! Tile payload decompression.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::{DecodeError, DecodeResult};

/// Inflate a zlib-compressed payload and check it against its declared size.
///
/// At most `expected_size + 1` bytes are produced, so a corrupt stream
/// cannot grow without bound; the extra byte is enough to tell an oversized
/// payload apart from an exact one.
///
/// # Errors
///
/// Returns an error if the stream is malformed or inflates to any size other
/// than `expected_size`. Output is never truncated or padded to fit.
pub fn inflate(data: &[u8], expected_size: u32) -> DecodeResult<Vec<u8>> {
    let expected = expected_size as usize;
    let mut output = Vec::with_capacity(expected);

    ZlibDecoder::new(data)
        .take(u64::from(expected_size) + 1)
        .read_to_end(&mut output)
        .map_err(|e| DecodeError::Inflate {
            detail: e.to_string(),
        })?;

    if output.len() != expected {
        return Err(DecodeError::SizeMismatch {
            expected,
            actual: output.len(),
        });
    }

    Ok(output)
}
