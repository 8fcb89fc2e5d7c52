//! Sub-byte sample expansion.
//!
//! Derived from the zune-bmp bit expander by Caleb Etemesi (MIT/Apache-2.0/Zlib).

/// Expand packed 1-, 2- or 4-bit samples (MSB first) to one byte each.
///
/// When `plte_present` is true, output values are raw palette indices (scale=1).
/// When false, values are scaled to 0–255. Expansion stops at whichever of
/// `input` or `out` runs out first; trailing bits of the last input byte that
/// do not fit in `out` are ignored.
pub(crate) fn expand_bits_to_byte(depth: usize, plte_present: bool, input: &[u8], out: &mut [u8]) {
    let scale: u8 = if plte_present {
        1
    } else {
        match depth {
            1 => 0xFF,
            2 => 0x55,
            4 => 0x11,
            _ => return,
        }
    };
    if !matches!(depth, 1 | 2 | 4) {
        return;
    }

    let per_byte = 8 / depth;
    let mask = (1u8 << depth) - 1;
    for (out_vals, &in_val) in out.chunks_mut(per_byte).zip(input) {
        for (pos, out_val) in out_vals.iter_mut().enumerate() {
            let shift = 8 - depth * (pos + 1);
            *out_val = scale.wrapping_mul((in_val >> shift) & mask);
        }
    }
}
