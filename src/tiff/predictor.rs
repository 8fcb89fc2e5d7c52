//! Undo horizontal differencing (Predictor = 2).

use crate::error::RasterError;
use crate::photometric::ByteOrder;

/// Reverse the predictor in place over whole rows of `row_bytes` bytes.
///
/// Each sample was stored as the difference from the same channel of the
/// previous pixel, modulo the sample width.
pub(crate) fn undo_horizontal(
    data: &mut [u8],
    row_bytes: usize,
    samples: usize,
    bits: u16,
    order: ByteOrder,
) -> Result<(), RasterError> {
    if row_bytes == 0 {
        return Ok(());
    }
    match bits {
        8 => {
            for row in data.chunks_exact_mut(row_bytes) {
                for i in samples..row.len() {
                    row[i] = row[i].wrapping_add(row[i - samples]);
                }
            }
        }
        16 => {
            let stride = samples * 2;
            for row in data.chunks_exact_mut(row_bytes) {
                let mut i = stride;
                while i + 1 < row.len() {
                    let prev = order.u16([row[i - stride], row[i - stride + 1]]);
                    let cur = order.u16([row[i], row[i + 1]]);
                    let sum = cur.wrapping_add(prev);
                    let bytes = match order {
                        ByteOrder::LittleEndian => sum.to_le_bytes(),
                        ByteOrder::BigEndian => sum.to_be_bytes(),
                    };
                    row[i..i + 2].copy_from_slice(&bytes);
                    i += 2;
                }
            }
        }
        _ => {
            return Err(RasterError::UnsupportedVariant(alloc::format!(
                "horizontal predictor with {bits} bits per sample"
            )));
        }
    }
    Ok(())
}
