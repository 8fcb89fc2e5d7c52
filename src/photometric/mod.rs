//! Photometric interpretation decoders.
//!
//! A [`PhotometricDecoder`] is chosen once per frame from header data and
//! bound to the sample layout (bit depth, byte order, palette, YCbCr
//! parameters). It holds no per-call state and can be shared across threads.
//!
//! | Model | Bits | Samples |
//! |---|---|---|
//! | BlackIsZero / WhiteIsZero | 1, 2, 4, 8, 16 | 1 |
//! | RGB | 8, 16 | 3, or 4 with alpha |
//! | Palette | 1, 2, 4, 8 | 1 |
//! | YCbCr | 8 | 3 (no subsampling) |
//! | CMYK | 8, 16 | 4 |

pub(crate) mod bits;
mod cmyk;
mod gray;
mod palette;
mod truecolor;
mod ycbcr;

pub use palette::ColorMap;
pub use ycbcr::YCbCrParams;

use alloc::vec;

use enough::Stop;

use crate::buffer::{PixelBuffer, Region};
use crate::error::RasterError;
use crate::pixel::Pixel;

/// Byte order of multi-byte samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    #[inline]
    pub(crate) fn u16(self, b: [u8; 2]) -> u16 {
        match self {
            Self::LittleEndian => u16::from_le_bytes(b),
            Self::BigEndian => u16::from_be_bytes(b),
        }
    }

    #[inline]
    pub(crate) fn u32(self, b: [u8; 4]) -> u32 {
        match self {
            Self::LittleEndian => u32::from_le_bytes(b),
            Self::BigEndian => u32::from_be_bytes(b),
        }
    }
}

/// How a fourth RGB sample is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum AlphaMode {
    /// Three samples, opaque.
    #[default]
    None,
    /// Premultiplied alpha; color is divided back out on decode.
    Associated,
    /// Straight alpha.
    Unassociated,
}

#[derive(Clone, Debug, PartialEq)]
enum Model {
    BlackIsZero { bits: u8, byte_order: ByteOrder },
    WhiteIsZero { bits: u8, byte_order: ByteOrder },
    Rgb { bits: u8, byte_order: ByteOrder, alpha: AlphaMode },
    Palette { bits: u8, color_map: ColorMap },
    YCbCr { params: YCbCrParams },
    Cmyk { bits: u8, byte_order: ByteOrder },
}

/// Immutable per-frame strategy turning raw sample bytes into pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct PhotometricDecoder {
    model: Model,
}

fn unsupported_depth(model: &str, bits: u8) -> RasterError {
    RasterError::UnsupportedVariant(alloc::format!("{model} with {bits} bits per sample"))
}

impl PhotometricDecoder {
    /// Grayscale where 0 is black.
    pub fn black_is_zero(bits: u8, byte_order: ByteOrder) -> Result<Self, RasterError> {
        if !matches!(bits, 1 | 2 | 4 | 8 | 16) {
            return Err(unsupported_depth("BlackIsZero", bits));
        }
        Ok(Self {
            model: Model::BlackIsZero { bits, byte_order },
        })
    }

    /// Grayscale where 0 is white.
    pub fn white_is_zero(bits: u8, byte_order: ByteOrder) -> Result<Self, RasterError> {
        if !matches!(bits, 1 | 2 | 4 | 8 | 16) {
            return Err(unsupported_depth("WhiteIsZero", bits));
        }
        Ok(Self {
            model: Model::WhiteIsZero { bits, byte_order },
        })
    }

    /// Chunky RGB, optionally with a fourth alpha sample.
    pub fn rgb(bits: u8, byte_order: ByteOrder, alpha: AlphaMode) -> Result<Self, RasterError> {
        if !matches!(bits, 8 | 16) {
            return Err(unsupported_depth("RGB", bits));
        }
        Ok(Self {
            model: Model::Rgb {
                bits,
                byte_order,
                alpha,
            },
        })
    }

    /// Palette indices into `color_map`, which must cover every `bits`-bit index.
    pub fn palette(bits: u8, color_map: ColorMap) -> Result<Self, RasterError> {
        if !matches!(bits, 1 | 2 | 4 | 8) {
            return Err(unsupported_depth("palette", bits));
        }
        let needed = 1usize << bits;
        if color_map.len() < needed {
            return Err(RasterError::UnsupportedVariant(alloc::format!(
                "color map has {} entries, {bits}-bit indices need {needed}",
                color_map.len()
            )));
        }
        Ok(Self {
            model: Model::Palette { bits, color_map },
        })
    }

    /// 8-bit YCbCr without chroma subsampling.
    pub fn ycbcr(params: YCbCrParams) -> Self {
        Self {
            model: Model::YCbCr { params },
        }
    }

    /// CMYK ink set.
    pub fn cmyk(bits: u8, byte_order: ByteOrder) -> Result<Self, RasterError> {
        if !matches!(bits, 8 | 16) {
            return Err(unsupported_depth("CMYK", bits));
        }
        Ok(Self {
            model: Model::Cmyk { bits, byte_order },
        })
    }

    /// Short model name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self.model {
            Model::BlackIsZero { .. } => "BlackIsZero",
            Model::WhiteIsZero { .. } => "WhiteIsZero",
            Model::Rgb { .. } => "RGB",
            Model::Palette { .. } => "Palette",
            Model::YCbCr { .. } => "YCbCr",
            Model::Cmyk { .. } => "CMYK",
        }
    }

    /// Bits per sample.
    pub fn bits_per_sample(&self) -> u8 {
        match self.model {
            Model::BlackIsZero { bits, .. }
            | Model::WhiteIsZero { bits, .. }
            | Model::Rgb { bits, .. }
            | Model::Palette { bits, .. }
            | Model::Cmyk { bits, .. } => bits,
            Model::YCbCr { .. } => 8,
        }
    }

    /// Samples per pixel.
    pub fn samples_per_pixel(&self) -> u8 {
        match self.model {
            Model::BlackIsZero { .. } | Model::WhiteIsZero { .. } | Model::Palette { .. } => 1,
            Model::Rgb { alpha, .. } => {
                if alpha == AlphaMode::None {
                    3
                } else {
                    4
                }
            }
            Model::YCbCr { .. } => 3,
            Model::Cmyk { .. } => 4,
        }
    }

    /// Bytes in one packed row of `width` pixels; rows start on a byte boundary.
    pub fn row_bytes(&self, width: u32) -> Result<usize, RasterError> {
        let bits = usize::from(self.bits_per_sample()) * usize::from(self.samples_per_pixel());
        (width as usize)
            .checked_mul(bits)
            .map(|b| b.div_ceil(8))
            .ok_or(RasterError::DimensionsTooLarge { width, height: 1 })
    }

    /// Bytes consumed when decoding `region`.
    pub fn required_bytes(&self, region: Region) -> Result<usize, RasterError> {
        self.row_bytes(region.width)?
            .checked_mul(region.height as usize)
            .ok_or(RasterError::DimensionsTooLarge {
                width: region.width,
                height: region.height,
            })
    }

    /// Decode `data` into `region` of `pixels`, rows top to bottom.
    ///
    /// Consumes exactly [`required_bytes`](Self::required_bytes) bytes from
    /// the front of `data`. A shorter window is [`RasterError::CorruptData`]
    /// and nothing is written; a region outside the buffer is rejected the
    /// same way. `stop` is checked every 16 rows.
    pub fn decode<P: Pixel>(
        &self,
        data: &[u8],
        pixels: &mut PixelBuffer<P>,
        region: Region,
        stop: &dyn Stop,
    ) -> Result<(), RasterError> {
        pixels.check_region(region)?;
        if region.width == 0 || region.height == 0 {
            return Ok(());
        }
        let row_bytes = self.row_bytes(region.width)?;
        let needed = self.required_bytes(region)?;
        let window = data.get(..needed).ok_or_else(|| {
            RasterError::CorruptData(alloc::format!(
                "{} {}x{} region needs {needed} bytes, got {}",
                self.name(),
                region.width,
                region.height,
                data.len()
            ))
        })?;

        let sub_byte = self.bits_per_sample() < 8;
        let mut scratch = vec![0u8; if sub_byte { region.width as usize } else { 0 }];
        let lut = match &self.model {
            Model::Palette { color_map, .. } => color_map.to_lut::<P>(),
            _ => alloc::vec::Vec::new(),
        };

        for (i, src) in window.chunks_exact(row_bytes).enumerate() {
            if i % 16 == 0 {
                stop.check()?;
            }
            let y = region.top + i as u32;
            let dst = pixels.row_window_mut(y, region.left, region.width)?;
            match &self.model {
                Model::BlackIsZero { bits, byte_order } => {
                    gray::decode_row(src, dst, *bits, *byte_order, false, &mut scratch)
                }
                Model::WhiteIsZero { bits, byte_order } => {
                    gray::decode_row(src, dst, *bits, *byte_order, true, &mut scratch)
                }
                Model::Rgb {
                    bits,
                    byte_order,
                    alpha,
                } => truecolor::decode_row(src, dst, *bits, *byte_order, *alpha),
                Model::Palette { bits, .. } => {
                    palette::decode_row(src, dst, *bits, &lut, &mut scratch)
                }
                Model::YCbCr { params } => ycbcr::decode_row(src, dst, params),
                Model::Cmyk { bits, byte_order } => {
                    cmyk::decode_row(src, dst, *bits, *byte_order)
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enough::{StopReason, Unstoppable};
    use rgb::{Gray, Rgba};

    struct Cancelled;

    impl Stop for Cancelled {
        fn check(&self) -> Result<(), StopReason> {
            Err(StopReason::Cancelled)
        }
    }

    #[test]
    fn big_endian_16bit_gray_scenario() {
        let dec = PhotometricDecoder::black_is_zero(16, ByteOrder::BigEndian).unwrap();
        let mut buf = PixelBuffer::<Gray<u16>>::new(2, 2).unwrap();
        let data = [0x00, 0x00, 0xFF, 0xFF, 0x7F, 0xFF, 0x00, 0x01];
        dec.decode(&data, &mut buf, Region::full(2, 2), &Unstoppable)
            .unwrap();
        assert_eq!(buf.pixel(0, 0).unwrap().value(), 0);
        assert_eq!(buf.pixel(1, 0).unwrap().value(), 65535);
        assert_eq!(buf.pixel(0, 1).unwrap().value(), 0x7FFF);
        assert_eq!(buf.pixel(1, 1).unwrap().value(), 1);
    }

    #[test]
    fn short_window_is_corrupt_and_writes_nothing() {
        let dec = PhotometricDecoder::black_is_zero(16, ByteOrder::LittleEndian).unwrap();
        let mut buf = PixelBuffer::<Rgba<u8>>::new(2, 2).unwrap();
        let err = dec
            .decode(&[0xFF; 7], &mut buf, Region::full(2, 2), &Unstoppable)
            .unwrap_err();
        assert!(matches!(err, RasterError::CorruptData(_)));
        assert!(buf.pixels().iter().all(|p| *p == Rgba::default()));
    }

    #[test]
    fn region_outside_buffer_rejected() {
        let dec = PhotometricDecoder::black_is_zero(8, ByteOrder::LittleEndian).unwrap();
        let mut buf = PixelBuffer::<Rgba<u8>>::new(2, 2).unwrap();
        let err = dec
            .decode(&[0; 6], &mut buf, Region::new(1, 0, 2, 3), &Unstoppable)
            .unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn partial_region_leaves_rest_untouched() {
        let dec = PhotometricDecoder::black_is_zero(8, ByteOrder::LittleEndian).unwrap();
        let mut buf = PixelBuffer::<Gray<u8>>::new(3, 3).unwrap();
        dec.decode(&[10, 20, 30, 40], &mut buf, Region::new(1, 1, 2, 2), &Unstoppable)
            .unwrap();
        let values: alloc::vec::Vec<u8> = buf.pixels().iter().map(|g| g.value()).collect();
        assert_eq!(values, [0, 0, 0, 0, 10, 20, 0, 30, 40]);
    }

    #[test]
    fn sub_byte_rows_are_byte_aligned() {
        let dec = PhotometricDecoder::black_is_zero(1, ByteOrder::LittleEndian).unwrap();
        assert_eq!(dec.row_bytes(9).unwrap(), 2);
        let mut buf = PixelBuffer::<Gray<u8>>::new(3, 2).unwrap();
        dec.decode(&[0b1010_0000, 0b0100_0000], &mut buf, Region::full(3, 2), &Unstoppable)
            .unwrap();
        let values: alloc::vec::Vec<u8> = buf.pixels().iter().map(|g| g.value()).collect();
        assert_eq!(values, [255, 0, 255, 0, 255, 0]);
    }

    #[test]
    fn unsupported_depths() {
        assert!(PhotometricDecoder::black_is_zero(12, ByteOrder::BigEndian)
            .unwrap_err()
            .is_unsupported());
        assert!(PhotometricDecoder::rgb(4, ByteOrder::BigEndian, AlphaMode::None).is_err());
        assert!(PhotometricDecoder::palette(16, ColorMap::from_rgb8(&[[0; 3]; 2])).is_err());
        assert!(PhotometricDecoder::palette(2, ColorMap::from_rgb8(&[[0; 3]; 3])).is_err());
    }

    #[test]
    fn cancellation_stops_decode() {
        let dec = PhotometricDecoder::black_is_zero(8, ByteOrder::LittleEndian).unwrap();
        let mut buf = PixelBuffer::<Gray<u8>>::new(1, 1).unwrap();
        let err = dec
            .decode(&[1], &mut buf, Region::full(1, 1), &Cancelled)
            .unwrap_err();
        assert!(matches!(err, RasterError::Cancelled(_)));
    }

    #[test]
    fn decoder_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PhotometricDecoder>();
    }
}
