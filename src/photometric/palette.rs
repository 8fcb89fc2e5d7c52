//! Palette-indexed color.

use alloc::vec::Vec;

use rgb::Rgba;

use super::bits::expand_bits_to_byte;
use crate::error::RasterError;
use crate::pixel::{Pixel, u8_to_u16};

/// 16-bit-per-channel color map for palette images.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorMap {
    entries: Vec<Rgba<u16>>,
}

impl ColorMap {
    /// Build from planar TIFF `ColorMap` values: all reds, then all greens,
    /// then all blues. Every entry is opaque.
    pub fn from_planar(values: &[u16]) -> Result<Self, RasterError> {
        if values.is_empty() || values.len() % 3 != 0 {
            return Err(RasterError::UnsupportedVariant(alloc::format!(
                "color map length {} is not a non-zero multiple of 3",
                values.len()
            )));
        }
        let n = values.len() / 3;
        let (reds, rest) = values.split_at(n);
        let (greens, blues) = rest.split_at(n);
        let entries = reds
            .iter()
            .zip(greens)
            .zip(blues)
            .map(|((&r, &g), &b)| Rgba::new(r, g, b, u16::MAX))
            .collect();
        Ok(Self { entries })
    }

    /// Build from 8-bit RGB triples.
    pub fn from_rgb8(colors: &[[u8; 3]]) -> Self {
        let entries = colors
            .iter()
            .map(|&[r, g, b]| Rgba::new(u8_to_u16(r), u8_to_u16(g), u8_to_u16(b), u16::MAX))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Rgba<u16>> {
        self.entries.get(index).copied()
    }

    /// Convert every entry to `P` once, so rows only do table lookups.
    pub(super) fn to_lut<P: Pixel>(&self) -> Vec<P> {
        self.entries.iter().map(|&c| P::from_rgba16(c)).collect()
    }
}

/// Decode one row of palette indices through a prepared lookup table.
///
/// The decoder only accepts maps with at least `2^bits` entries, so every
/// index fits; a short table still degrades to `P::default()` instead of
/// panicking.
pub(super) fn decode_row<P: Pixel>(
    src: &[u8],
    dst: &mut [P],
    bits: u8,
    lut: &[P],
    scratch: &mut [u8],
) {
    let indices: &[u8] = if bits == 8 {
        src
    } else {
        let expanded = &mut scratch[..dst.len()];
        expand_bits_to_byte(usize::from(bits), true, src, expanded);
        expanded
    };
    for (d, &i) in dst.iter_mut().zip(indices) {
        *d = lut.get(usize::from(i)).copied().unwrap_or_default();
    }
}
