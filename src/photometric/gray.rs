//! BlackIsZero and WhiteIsZero grayscale.
//!
//! Black-is-zero maps raw 0 to black and the maximum raw value for the bit
//! depth to white, linearly; the luminance is replicated across R, G, B with
//! alpha = 1. White-is-zero is the same mapping on the inverted sample
//! (`max - raw`).

use super::ByteOrder;
use super::bits::expand_bits_to_byte;
use crate::pixel::Pixel;

/// Decode one row of grayscale samples.
///
/// `scratch` must hold at least `dst.len()` bytes for sub-byte depths.
pub(super) fn decode_row<P: Pixel>(
    src: &[u8],
    dst: &mut [P],
    bits: u8,
    byte_order: ByteOrder,
    invert: bool,
    scratch: &mut [u8],
) {
    match bits {
        16 => {
            if !invert && byte_order == ByteOrder::LittleEndian {
                P::from_l16_bytes(src, dst);
            } else {
                // Foreign order or inverted: the batch path cannot reinterpret these bytes.
                for (d, c) in dst.iter_mut().zip(src.chunks_exact(2)) {
                    let v = byte_order.u16([c[0], c[1]]);
                    *d = P::from_l16(if invert { !v } else { v });
                }
            }
        }
        8 => l8_row(src, dst, invert),
        _ => {
            let expanded = &mut scratch[..dst.len()];
            expand_bits_to_byte(usize::from(bits), false, src, expanded);
            l8_row(expanded, dst, invert);
        }
    }
}

fn l8_row<P: Pixel>(src: &[u8], dst: &mut [P], invert: bool) {
    if invert {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = P::from_l8(!s);
        }
    } else {
        P::from_l8_bytes(src, dst);
    }
}
