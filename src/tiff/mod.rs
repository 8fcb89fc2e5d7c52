//! Baseline TIFF: strip-organized, chunky, uncompressed or PackBits.
//!
//! Every IFD in the chain is one frame. A frame's tags select a single
//! [`PhotometricDecoder`], which then converts each strip into the frame's
//! pixel buffer.

mod ifd;
mod packbits;
mod predictor;
mod tags;

pub use tags::{Compression, Photometric, Predictor};

use alloc::borrow::Cow;
use alloc::vec::Vec;

use enough::Stop;
use log::{debug, trace};

use self::ifd::Ifd;
use crate::buffer::{PixelBuffer, Region};
use crate::decode::{DecoderOptions, Image, ImageFrame};
use crate::error::RasterError;
use crate::info::{ImageFormat, ImageInfo};
use crate::limits::Allocation;
use crate::metadata::{FormatMetadata, Resolution, ResolutionUnit, TiffMetadata};
use crate::photometric::{AlphaMode, ByteOrder, ColorMap, PhotometricDecoder, YCbCrParams};
use crate::pixel::{Pixel, PixelLayout};

/// A two-byte PackBits run yields at most 128 bytes.
const PACKBITS_MAX_EXPANSION: usize = 64;

fn unsupported(what: impl core::fmt::Display) -> RasterError {
    RasterError::UnsupportedVariant(alloc::format!("{what}"))
}

fn dimensions(ifd: &Ifd) -> Result<(u32, u32), RasterError> {
    let width = ifd.required_u32(tags::IMAGE_WIDTH, "ImageWidth")?;
    let height = ifd.required_u32(tags::IMAGE_LENGTH, "ImageLength")?;
    if width == 0 || height == 0 {
        return Err(RasterError::InvalidHeader(alloc::format!(
            "image is {width}x{height}"
        )));
    }
    Ok((width, height))
}

fn resolution(ifd: &Ifd) -> Result<Option<Resolution>, RasterError> {
    let ratio = |tag| match ifd.rationals(tag) {
        Some(&[(n, d), ..]) if d != 0 => Some(f64::from(n) / f64::from(d)),
        _ => None,
    };
    let (Some(x), Some(y)) = (ratio(tags::X_RESOLUTION), ratio(tags::Y_RESOLUTION)) else {
        return Ok(None);
    };
    let unit = match ifd.u16_or(tags::RESOLUTION_UNIT, 2)? {
        1 => ResolutionUnit::None,
        3 => ResolutionUnit::Centimeter,
        _ => ResolutionUnit::Inch,
    };
    Ok(Some(Resolution { x, y, unit }))
}

fn metadata(ifd: &Ifd, byte_order: ByteOrder) -> Result<TiffMetadata, RasterError> {
    let photometric = ifd
        .u32(tags::PHOTOMETRIC)
        .ok_or_else(|| RasterError::InvalidHeader("missing PhotometricInterpretation".into()))?;
    let photometric = u16::try_from(photometric)
        .map(Photometric::from_code)
        .map_err(|_| RasterError::InvalidHeader(alloc::format!("photometric {photometric}")))?;
    let bits_per_sample = ifd.u16_or(tags::BITS_PER_SAMPLE, 1)?;
    // Unspecified extra samples (0) are treated as straight alpha.
    let extra_samples = match ifd.u32(tags::EXTRA_SAMPLES) {
        None => AlphaMode::None,
        Some(1) => AlphaMode::Associated,
        Some(_) => AlphaMode::Unassociated,
    };
    Ok(TiffMetadata {
        byte_order,
        photometric,
        bits_per_sample,
        samples_per_pixel: ifd.u16_or(tags::SAMPLES_PER_PIXEL, 1)?,
        compression: Compression::from_code(ifd.u16_or(tags::COMPRESSION, 1)?),
        predictor: Predictor::from_code(ifd.u16_or(tags::PREDICTOR, 1)?),
        extra_samples,
        resolution: resolution(ifd)?,
    })
}

fn pixel_hint(meta: &TiffMetadata) -> PixelLayout {
    let wide = meta.bits_per_sample > 8;
    match meta.photometric {
        Photometric::WhiteIsZero | Photometric::BlackIsZero if wide => PixelLayout::Gray16,
        Photometric::WhiteIsZero | Photometric::BlackIsZero => PixelLayout::Gray8,
        Photometric::Rgb => match (wide, meta.samples_per_pixel >= 4) {
            (false, false) => PixelLayout::Rgb8,
            (false, true) => PixelLayout::Rgba8,
            (true, false) => PixelLayout::Rgb16,
            (true, true) => PixelLayout::Rgba16,
        },
        Photometric::Cmyk if wide => PixelLayout::Rgb16,
        _ => PixelLayout::Rgb8,
    }
}

fn rational_f32(values: &[(u32, u32)]) -> Result<Vec<f32>, RasterError> {
    values
        .iter()
        .map(|&(n, d)| {
            if d == 0 {
                Err(RasterError::InvalidHeader("rational with zero denominator".into()))
            } else {
                Ok(n as f32 / d as f32)
            }
        })
        .collect()
}

fn ycbcr_params(ifd: &Ifd) -> Result<YCbCrParams, RasterError> {
    let defaults = YCbCrParams::default();
    let coefficients = ifd.rationals(tags::YCBCR_COEFFICIENTS).map(rational_f32).transpose()?;
    let reference = ifd.rationals(tags::REFERENCE_BLACK_WHITE).map(rational_f32).transpose()?;
    if coefficients.is_none() && reference.is_none() {
        return Ok(defaults);
    }
    let coefficients: [f32; 3] = match coefficients {
        None => [0.299, 0.587, 0.114],
        Some(v) => v.try_into().map_err(|_| {
            RasterError::InvalidHeader("YCbCrCoefficients needs 3 values".into())
        })?,
    };
    let reference: [f32; 6] = match reference {
        None => [0.0, 255.0, 128.0, 255.0, 128.0, 255.0],
        Some(v) => v.try_into().map_err(|_| {
            RasterError::InvalidHeader("ReferenceBlackWhite needs 6 values".into())
        })?,
    };
    YCbCrParams::new(coefficients, reference)
}

/// Choose the photometric decoder for a frame, rejecting layouts outside
/// the baseline chunky-strip subset.
fn build_decoder(ifd: &Ifd, meta: &TiffMetadata) -> Result<PhotometricDecoder, RasterError> {
    if ifd.contains(tags::TILE_WIDTH) || ifd.contains(tags::TILE_OFFSETS) {
        return Err(unsupported("tiled layout"));
    }
    let spp = meta.samples_per_pixel;
    if spp > 1 && ifd.u16_or(tags::PLANAR_CONFIG, 1)? == 2 {
        return Err(unsupported("planar configuration 2"));
    }
    if ifd.u16_or(tags::FILL_ORDER, 1)? == 2 {
        return Err(unsupported("LSB-first fill order"));
    }
    if let Some(&format) = ifd
        .unsigned(tags::SAMPLE_FORMAT)
        .and_then(|v| v.iter().find(|&&f| f != 1))
    {
        return Err(unsupported(alloc::format!("sample format {format}")));
    }
    if let Some(all) = ifd.unsigned(tags::BITS_PER_SAMPLE) {
        if all.iter().any(|&b| b != u32::from(meta.bits_per_sample)) {
            return Err(unsupported(alloc::format!("mixed bits per sample {all:?}")));
        }
    }
    let bits = u8::try_from(meta.bits_per_sample)
        .map_err(|_| unsupported(alloc::format!("{} bits per sample", meta.bits_per_sample)))?;
    let order = meta.byte_order;

    match meta.photometric {
        Photometric::BlackIsZero | Photometric::WhiteIsZero if spp != 1 => {
            Err(unsupported(alloc::format!("grayscale with {spp} samples per pixel")))
        }
        Photometric::BlackIsZero => PhotometricDecoder::black_is_zero(bits, order),
        Photometric::WhiteIsZero => PhotometricDecoder::white_is_zero(bits, order),
        Photometric::Rgb => {
            let alpha = match (spp, meta.extra_samples) {
                (3, _) => AlphaMode::None,
                (4, AlphaMode::None) => AlphaMode::Unassociated,
                (4, mode) => mode,
                _ => return Err(unsupported(alloc::format!("RGB with {spp} samples per pixel"))),
            };
            PhotometricDecoder::rgb(bits, order, alpha)
        }
        Photometric::Palette => {
            if spp != 1 {
                return Err(unsupported(alloc::format!("palette with {spp} samples per pixel")));
            }
            let values = ifd
                .unsigned(tags::COLOR_MAP)
                .ok_or_else(|| RasterError::InvalidHeader("palette image without ColorMap".into()))?;
            let values: Vec<u16> = values.iter().map(|&v| v as u16).collect();
            PhotometricDecoder::palette(bits, ColorMap::from_planar(&values)?)
        }
        Photometric::YCbCr => {
            match ifd.unsigned(tags::YCBCR_SUBSAMPLING).unwrap_or(&[2, 2]) {
                [1, 1] => {}
                [h, v, ..] => return Err(unsupported(alloc::format!("YCbCr subsampling {h}x{v}"))),
                other => {
                    return Err(RasterError::InvalidHeader(alloc::format!(
                        "YCbCrSubSampling {other:?}"
                    )));
                }
            }
            if spp != 3 || bits != 8 {
                return Err(unsupported(alloc::format!(
                    "YCbCr with {spp} samples of {bits} bits"
                )));
            }
            Ok(PhotometricDecoder::ycbcr(ycbcr_params(ifd)?))
        }
        Photometric::Cmyk => {
            if ifd.u16_or(tags::INK_SET, 1)? != 1 {
                return Err(unsupported("non-CMYK ink set"));
            }
            if spp != 4 {
                return Err(unsupported(alloc::format!("CMYK with {spp} samples per pixel")));
            }
            PhotometricDecoder::cmyk(bits, order)
        }
        other => Err(unsupported(alloc::format!(
            "photometric interpretation {}",
            other.code()
        ))),
    }
}

#[derive(Debug)]
struct Strips<'i> {
    rows_per_strip: u32,
    count: usize,
    offsets: &'i [u32],
    byte_counts: Option<&'i [u32]>,
}

fn strips<'i>(ifd: &'i Ifd, height: u32, compression: Compression) -> Result<Strips<'i>, RasterError> {
    let rows_per_strip = ifd.u32_or(tags::ROWS_PER_STRIP, u32::MAX).min(height);
    if rows_per_strip == 0 {
        return Err(RasterError::InvalidHeader("RowsPerStrip is 0".into()));
    }
    let count = height.div_ceil(rows_per_strip) as usize;
    let offsets = ifd
        .unsigned(tags::STRIP_OFFSETS)
        .ok_or_else(|| RasterError::InvalidHeader("missing StripOffsets".into()))?;
    if offsets.len() < count {
        return Err(RasterError::CorruptData(alloc::format!(
            "{} strip offsets for {count} strips",
            offsets.len()
        )));
    }
    let byte_counts = ifd.unsigned(tags::STRIP_BYTE_COUNTS);
    match byte_counts {
        Some(c) if c.len() < count => {
            return Err(RasterError::CorruptData(alloc::format!(
                "{} strip byte counts for {count} strips",
                c.len()
            )));
        }
        None if compression != Compression::None => {
            return Err(RasterError::InvalidHeader("missing StripByteCounts".into()));
        }
        _ => {}
    }
    Ok(Strips {
        rows_per_strip,
        count,
        offsets,
        byte_counts,
    })
}

fn decode_frame<P: Pixel>(
    data: &[u8],
    ifd: &Ifd,
    byte_order: ByteOrder,
    options: &DecoderOptions,
    used: &mut Allocation,
    stop: &dyn Stop,
) -> Result<ImageFrame<P>, RasterError> {
    let (width, height) = dimensions(ifd)?;
    let meta = metadata(ifd, byte_order)?;
    let decoder = build_decoder(ifd, &meta)?;
    match meta.compression {
        Compression::None | Compression::PackBits => {}
        other => return Err(unsupported(alloc::format!("{other:?} compression"))),
    }
    match meta.predictor {
        Predictor::None | Predictor::Horizontal => {}
        Predictor::FloatingPoint => return Err(unsupported("floating-point predictor")),
        Predictor::Other(code) => {
            return Err(RasterError::InvalidHeader(alloc::format!("predictor {code}")));
        }
    }
    options
        .limits
        .reserve(used, width, height, P::LAYOUT.bytes_per_pixel())?;

    let strips = strips(ifd, height, meta.compression)?;
    let row_bytes = decoder.row_bytes(width)?;
    trace!(
        "{} {width}x{height}, {} strips of {} rows, {row_bytes} bytes per row",
        decoder.name(),
        strips.count,
        strips.rows_per_strip
    );

    // Every strip must cover its rows before the frame buffer is allocated.
    let mut located = Vec::with_capacity(strips.count);
    for i in 0..strips.count {
        let top = i as u32 * strips.rows_per_strip;
        let region = Region::new(0, top, width, strips.rows_per_strip.min(height - top));
        let needed = decoder.required_bytes(region)?;
        let offset = strips.offsets[i] as usize;
        let len = strips.byte_counts.map_or(needed, |c| c[i] as usize);
        let raw = offset
            .checked_add(len)
            .and_then(|end| data.get(offset..end))
            .ok_or_else(|| {
                RasterError::CorruptData(alloc::format!(
                    "strip {i} ({len} bytes at {offset}) exceeds input of {} bytes",
                    data.len()
                ))
            })?;
        let capacity = match meta.compression {
            Compression::PackBits => raw.len().saturating_mul(PACKBITS_MAX_EXPANSION),
            _ => raw.len(),
        };
        if capacity < needed {
            return Err(RasterError::CorruptData(alloc::format!(
                "strip {i} has {len} bytes, rows need {needed}"
            )));
        }
        located.push((region, needed, raw));
    }

    let mut buffer = PixelBuffer::<P>::new(width, height)?;
    for (i, (region, needed, raw)) in located.into_iter().enumerate() {
        trace!("strip {i}: rows {}.., {} bytes", region.top, raw.len());
        let mut strip = match meta.compression {
            Compression::PackBits => Cow::Owned(packbits::unpack(raw, needed)?),
            _ => Cow::Borrowed(raw),
        };
        if meta.predictor == Predictor::Horizontal {
            predictor::undo_horizontal(
                strip.to_mut(),
                row_bytes,
                usize::from(decoder.samples_per_pixel()),
                meta.bits_per_sample,
                byte_order,
            )?;
        }
        decoder.decode(&strip, &mut buffer, region, stop)?;
    }

    Ok(ImageFrame {
        buffer,
        metadata: FormatMetadata::Tiff(meta),
    })
}

/// Header-only parse of every directory in the chain.
pub(crate) fn identify(data: &[u8]) -> Result<ImageInfo, RasterError> {
    let (byte_order, first) = ifd::parse_header(data)?;
    let chain = ifd::read_chain(data, byte_order, first, None)?;
    let root = chain
        .first()
        .ok_or_else(|| RasterError::InvalidHeader("no image directory".into()))?;
    let (width, height) = dimensions(root)?;
    let meta = metadata(root, byte_order)?;
    debug!(
        "TIFF {width}x{height}, {} frames, {:?} {}x{}-bit, {:?}",
        chain.len(),
        meta.photometric,
        meta.samples_per_pixel,
        meta.bits_per_sample,
        meta.compression
    );
    Ok(ImageInfo {
        width,
        height,
        format: ImageFormat::Tiff,
        pixel_hint: pixel_hint(&meta),
        frame_count: u32::try_from(chain.len()).unwrap_or(u32::MAX),
        metadata: FormatMetadata::Tiff(meta),
    })
}

/// Decode up to `options.max_frames` frames.
pub(crate) fn decode<P: Pixel>(
    data: &[u8],
    options: &DecoderOptions,
    stop: &dyn Stop,
) -> Result<Image<P>, RasterError> {
    let (byte_order, first) = ifd::parse_header(data)?;
    let max = options.max_frames.map(|n| n as usize);
    let chain = ifd::read_chain(data, byte_order, first, max)?;
    debug!("TIFF {:?}, decoding {} frames", byte_order, chain.len());

    let mut frames = Vec::with_capacity(chain.len());
    let mut used = Allocation::default();
    for ifd in &chain {
        stop.check()?;
        frames.push(decode_frame::<P>(data, ifd, byte_order, options, &mut used, stop)?);
    }
    Image::from_frames(frames).ok_or_else(|| RasterError::InvalidHeader("no image directory".into()))
}
