//! YCbCr (8-bit, no chroma subsampling).
//!
//! Samples are first expanded by the reference black/white pairs
//! (`Y' = (Y - black) * 255 / (white - black)`, chroma with a 127 coding
//! range around zero) and then converted with the luma coefficients:
//! `R = Y' + Cr' (2 - 2 Kr)`, `B = Y' + Cb' (2 - 2 Kb)`,
//! `G = (Y' - Kb B - Kr R) / Kg`.

use crate::error::RasterError;
use crate::pixel::Pixel;

/// Conversion parameters from the `YCbCrCoefficients` and
/// `ReferenceBlackWhite` tags.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YCbCrParams {
    luma_red: f32,
    luma_green: f32,
    luma_blue: f32,
    /// `[y_black, y_white, cb_black, cb_white, cr_black, cr_white]`.
    reference: [f32; 6],
}

impl Default for YCbCrParams {
    /// ITU-R BT.601 coefficients with the full-range reference.
    fn default() -> Self {
        Self {
            luma_red: 0.299,
            luma_green: 0.587,
            luma_blue: 0.114,
            reference: [0.0, 255.0, 128.0, 255.0, 128.0, 255.0],
        }
    }
}

impl YCbCrParams {
    /// Validate coefficients `[Kr, Kg, Kb]` and a reference black/white table.
    pub fn new(coefficients: [f32; 3], reference: [f32; 6]) -> Result<Self, RasterError> {
        let [luma_red, luma_green, luma_blue] = coefficients;
        if !(luma_green > 0.0) || !luma_red.is_finite() || !luma_blue.is_finite() {
            return Err(RasterError::InvalidHeader(alloc::format!(
                "invalid YCbCr coefficients {coefficients:?}"
            )));
        }
        for pair in reference.chunks_exact(2) {
            let span = pair[1] - pair[0];
            if span == 0.0 || !span.is_finite() {
                return Err(RasterError::InvalidHeader(alloc::format!(
                    "degenerate reference black/white {reference:?}"
                )));
            }
        }
        Ok(Self {
            luma_red,
            luma_green,
            luma_blue,
            reference,
        })
    }

    /// Convert one sample triple to normalized RGB.
    #[inline]
    fn to_rgb(&self, y: u8, cb: u8, cr: u8) -> [f32; 3] {
        let [yb, yw, cbb, cbw, crb, crw] = self.reference;
        let y = (f32::from(y) - yb) * 255.0 / (yw - yb);
        let cb = (f32::from(cb) - cbb) * 127.0 / (cbw - cbb);
        let cr = (f32::from(cr) - crb) * 127.0 / (crw - crb);

        let r = cr * (2.0 - 2.0 * self.luma_red) + y;
        let b = cb * (2.0 - 2.0 * self.luma_blue) + y;
        let g = (y - self.luma_blue * b - self.luma_red * r) / self.luma_green;
        [r / 255.0, g / 255.0, b / 255.0]
    }
}

pub(super) fn decode_row<P: Pixel>(src: &[u8], dst: &mut [P], params: &YCbCrParams) {
    for (d, c) in dst.iter_mut().zip(src.chunks_exact(3)) {
        let [r, g, b] = params.to_rgb(c[0], c[1], c[2]);
        *d = P::from_normalized([r, g, b, 1.0]);
    }
}
