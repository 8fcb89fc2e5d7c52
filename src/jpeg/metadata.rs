//! JPEG encoder side information.

use super::quality::{ZIGZAG_TO_NATURAL, estimate_chrominance_quality, estimate_luminance_quality};

/// Quality assumed when a file carries no luminance table.
pub const DEFAULT_QUALITY: u8 = 75;

/// 8×8 quantization table in natural (row-major) order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QuantTable([u16; 64]);

impl QuantTable {
    pub const fn new(values: [u16; 64]) -> Self {
        Self(values)
    }

    /// Build from coefficients in zigzag scan order, as stored in a DQT segment.
    pub fn from_zigzag(zigzag: &[u16; 64]) -> Self {
        let mut values = [0u16; 64];
        for (&natural, &v) in ZIGZAG_TO_NATURAL.iter().zip(zigzag) {
            values[natural] = v;
        }
        Self(values)
    }

    pub fn values(&self) -> &[u16; 64] {
        &self.0
    }

    /// Coefficient at `row`, `col` (both 0..8).
    pub fn get(&self, row: usize, col: usize) -> Option<u16> {
        if row >= 8 || col >= 8 {
            return None;
        }
        Some(self.0[row * 8 + col])
    }

    /// This table scaled to `quality` the way IJG libjpeg does with baseline
    /// clamping (entries 1..=255).
    pub fn scaled(&self, quality: u8) -> Self {
        let q = u32::from(quality.clamp(1, 100));
        let scale = if q < 50 { 5000 / q } else { 200 - 2 * q };
        let mut values = [0u16; 64];
        for (out, &v) in values.iter_mut().zip(&self.0) {
            *out = ((u32::from(v) * scale + 50) / 100).clamp(1, 255) as u16;
        }
        Self(values)
    }
}

/// Color encoding of a JPEG frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum JpegColorType {
    /// Single-component grayscale.
    Luminance,
    /// YCbCr, chroma halved both ways.
    YCbCrRatio420,
    /// YCbCr, chroma halved horizontally.
    YCbCrRatio422,
    /// YCbCr, full-resolution chroma.
    YCbCrRatio444,
    /// YCbCr, chroma quartered horizontally.
    YCbCrRatio411,
    /// Untransformed RGB.
    Rgb,
    /// Untransformed CMYK (typically Adobe inverted).
    Cmyk,
    /// YCbCr plus K.
    Ycck,
}

/// Quantization tables, quality estimates and color type of a JPEG.
///
/// A `None` table means the encoder used the Annex K reference table for
/// that channel (scaled to the matching quality); a present table is kept so
/// a re-encode can reproduce it exactly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JpegMetadata {
    pub color_type: Option<JpegColorType>,
    pub luminance_quantization_table: Option<QuantTable>,
    pub chrominance_quantization_table: Option<QuantTable>,
    pub luminance_quality: Option<u8>,
    pub chrominance_quality: Option<u8>,
}

impl JpegMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill quality fields from the frame's tables, keeping only
    /// non-standard tables.
    pub(crate) fn from_tables(luminance: Option<QuantTable>, chrominance: Option<QuantTable>) -> Self {
        let mut meta = Self::new();
        if let Some(table) = luminance {
            let est = estimate_luminance_quality(&table);
            meta.luminance_quality = Some(est.quality);
            meta.luminance_quantization_table = (!est.is_standard()).then_some(table);
        }
        if let Some(table) = chrominance {
            let est = estimate_chrominance_quality(&table);
            meta.chrominance_quality = Some(est.quality);
            meta.chrominance_quantization_table = (!est.is_standard()).then_some(table);
        }
        meta
    }

    pub fn uses_standard_luminance_table(&self) -> bool {
        self.luminance_quantization_table.is_none()
    }

    pub fn uses_standard_chrominance_table(&self) -> bool {
        self.chrominance_quantization_table.is_none()
    }

    /// Single overall quality, kept for callers that predate per-channel
    /// quality. Approximate: the mean of luminance quality (default
    /// [`DEFAULT_QUALITY`]) and chrominance quality (default: luminance),
    /// rounded half up.
    pub fn quality(&self) -> u8 {
        let luma = self.luminance_quality.unwrap_or(DEFAULT_QUALITY);
        let chroma = self.chrominance_quality.unwrap_or(luma);
        ((u16::from(luma) + u16::from(chroma) + 1) / 2) as u8
    }

    /// Set both channel qualities, clamped to 0..=100.
    pub fn set_quality(&mut self, quality: u8) {
        let q = quality.min(100);
        self.luminance_quality = Some(q);
        self.chrominance_quality = Some(q);
    }
}
