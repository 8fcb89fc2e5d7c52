//! PackBits run-length decompression (compression 32773).

use alloc::vec::Vec;

use crate::error::RasterError;

/// Unpack `src` until `expected` bytes are produced.
///
/// Input that ends before `expected` bytes is [`RasterError::CorruptData`];
/// trailing input after that point is ignored.
pub(crate) fn unpack(src: &[u8], expected: usize) -> Result<Vec<u8>, RasterError> {
    let truncated = || {
        RasterError::CorruptData(alloc::format!(
            "PackBits data ends before {expected} bytes"
        ))
    };
    let mut out = Vec::with_capacity(expected);
    let mut i = 0;
    while out.len() < expected {
        let header = *src.get(i).ok_or_else(truncated)? as i8;
        i += 1;
        match header {
            0..=127 => {
                let n = header as usize + 1;
                let literal = src.get(i..i + n).ok_or_else(truncated)?;
                out.extend_from_slice(literal);
                i += n;
            }
            -127..=-1 => {
                let n = (1 - i16::from(header)) as usize;
                let byte = *src.get(i).ok_or_else(truncated)?;
                out.resize(out.len() + n, byte);
                i += 1;
            }
            // -128 is a no-op.
            _ => {}
        }
    }
    out.truncate(expected);
    Ok(out)
}
