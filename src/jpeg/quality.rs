//! Quality estimation from quantization tables.
//!
//! Encoders following the IJG convention scale the Annex K reference tables
//! by `5000 / q` (q < 50) or `200 - 2q` (q >= 50) percent. Inverting that
//! scale from the mean per-coefficient ratio recovers the quality setting;
//! the spread of the ratios tells whether the table was a scaled reference
//! table at all.

use super::metadata::QuantTable;

/// Ratio variance at or below which a table counts as a scaled reference table.
pub const STANDARD_TABLE_VARIANCE_THRESHOLD: f64 = 10.0;

/// Zigzag scan position to natural (row-major) index.
pub(crate) const ZIGZAG_TO_NATURAL: [usize; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27,
    20, 13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58,
    59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

/// Annex K.1 luminance table, natural order.
pub const STANDARD_LUMINANCE: QuantTable = QuantTable::new([
    16, 11, 10, 16, 24, 40, 51, 61, //
    12, 12, 14, 19, 26, 58, 60, 55, //
    14, 13, 16, 24, 40, 57, 69, 56, //
    14, 17, 22, 29, 51, 87, 80, 62, //
    18, 22, 37, 56, 68, 109, 103, 77, //
    24, 35, 55, 64, 81, 104, 113, 92, //
    49, 64, 78, 87, 103, 121, 120, 101, //
    72, 92, 95, 98, 112, 100, 103, 99,
]);

/// Annex K.1 chrominance table, natural order.
pub const STANDARD_CHROMINANCE: QuantTable = QuantTable::new([
    17, 18, 24, 47, 99, 99, 99, 99, //
    18, 21, 26, 66, 99, 99, 99, 99, //
    24, 26, 56, 99, 99, 99, 99, 99, //
    47, 66, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99,
]);

/// Result of comparing a table against a reference table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualityEstimate {
    /// Estimated quality, 1–100.
    pub quality: u8,
    /// Variance of the per-coefficient percentage ratios.
    pub variance: f64,
}

impl QualityEstimate {
    /// Whether the table looks like the reference table scaled to `quality`.
    pub fn is_standard(&self) -> bool {
        self.variance <= STANDARD_TABLE_VARIANCE_THRESHOLD
    }
}

/// Largest entry a baseline (8-bit) table can hold.
const BASELINE_MAX: u16 = 255;

/// Estimate the IJG quality that produced `table` from `reference`.
///
/// At low qualities baseline encoders clamp large coefficients to 255, which
/// breaks the proportionality to the reference table. Saturated entries are
/// left out of the mean and variance unless every entry is saturated.
pub fn estimate_quality(table: &QuantTable, reference: &QuantTable) -> QualityEstimate {
    let saturated = table.values().iter().filter(|&&t| t == BASELINE_MAX).count();
    let skip_saturated = saturated < 64;
    let ratios = table
        .values()
        .iter()
        .zip(reference.values())
        .filter(|&(&t, _)| !(skip_saturated && t == BASELINE_MAX))
        .map(|(&t, &r)| 100.0 * f64::from(t) / f64::from(r));
    let used = if skip_saturated { 64 - saturated } else { 64 };
    let n = used as f64;

    let mut sum = 0.0;
    for p in ratios.clone() {
        sum += p;
    }
    let mean = sum / n;

    let mut variance = 0.0;
    for p in ratios {
        variance += (p - mean) * (p - mean);
    }
    variance /= n;

    let q = if mean <= 100.0 {
        (200.0 - mean) / 2.0
    } else {
        5000.0 / mean
    };
    let quality = (q + 0.5).clamp(1.0, 100.0) as u8;
    QualityEstimate { quality, variance }
}

/// Estimate against the standard luminance table.
pub fn estimate_luminance_quality(table: &QuantTable) -> QualityEstimate {
    estimate_quality(table, &STANDARD_LUMINANCE)
}

/// Estimate against the standard chrominance table.
pub fn estimate_chrominance_quality(table: &QuantTable) -> QualityEstimate {
    estimate_quality(table, &STANDARD_CHROMINANCE)
}
