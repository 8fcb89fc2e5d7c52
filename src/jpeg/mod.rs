//! JPEG marker-level parsing.
//!
//! Reads SOI through the first SOS: frame header, quantization tables and
//! the Adobe APP14 transform flag. Entropy-coded data is never touched, so
//! pixel decoding reports [`RasterError::UnsupportedVariant`] once the
//! header has been validated.

mod metadata;
pub mod quality;

pub use metadata::{DEFAULT_QUALITY, JpegColorType, JpegMetadata, QuantTable};

use enough::Stop;
use log::{debug, trace};

use crate::cursor::Cursor;
use crate::decode::{DecoderOptions, Image};
use crate::error::RasterError;
use crate::info::{ImageFormat, ImageInfo};
use crate::metadata::FormatMetadata;
use crate::photometric::ByteOrder;
use crate::pixel::{Pixel, PixelLayout};

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const DQT: u8 = 0xDB;
const APP14: u8 = 0xEE;

#[derive(Clone, Copy, Debug)]
struct Component {
    id: u8,
    horizontal: u8,
    vertical: u8,
    table: u8,
}

struct FrameHeader {
    precision: u8,
    width: u32,
    height: u32,
    progressive: bool,
    components: alloc::vec::Vec<Component>,
}

struct JpegHeader {
    frame: FrameHeader,
    metadata: JpegMetadata,
}

fn is_sof(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF)
}

fn parse_sof(marker: u8, payload: &[u8]) -> Result<FrameHeader, RasterError> {
    let mut c = Cursor::new(payload, ByteOrder::BigEndian);
    let precision = c.read_u8()?;
    let height = u32::from(c.read_u16()?);
    let width = u32::from(c.read_u16()?);
    let count = c.read_u8()?;
    if !matches!(precision, 8 | 12 | 16) {
        return Err(RasterError::InvalidHeader(alloc::format!(
            "sample precision {precision}"
        )));
    }
    if width == 0 {
        return Err(RasterError::InvalidHeader("zero width".into()));
    }
    if height == 0 {
        return Err(RasterError::UnsupportedVariant(
            "height defined by DNL marker".into(),
        ));
    }
    if !matches!(count, 1 | 3 | 4) {
        return Err(RasterError::UnsupportedVariant(alloc::format!(
            "{count} color components"
        )));
    }
    let mut components = alloc::vec::Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let id = c.read_u8()?;
        let sampling = c.read_u8()?;
        let table = c.read_u8()?;
        if table > 3 {
            return Err(RasterError::InvalidHeader(alloc::format!(
                "component {id} uses quantization table {table}"
            )));
        }
        components.push(Component {
            id,
            horizontal: sampling >> 4,
            vertical: sampling & 0x0F,
            table,
        });
    }
    Ok(FrameHeader {
        precision,
        width,
        height,
        progressive: matches!(marker, 0xC2 | 0xC6 | 0xCA | 0xCE),
        components,
    })
}

fn parse_dqt(payload: &[u8], tables: &mut [Option<QuantTable>; 4]) -> Result<(), RasterError> {
    let mut c = Cursor::new(payload, ByteOrder::BigEndian);
    while !c.eof() {
        let pq_tq = c.read_u8()?;
        let (precision, id) = (pq_tq >> 4, usize::from(pq_tq & 0x0F));
        if id > 3 {
            return Err(RasterError::InvalidHeader(alloc::format!(
                "quantization table id {id}"
            )));
        }
        let mut zigzag = [0u16; 64];
        for v in &mut zigzag {
            *v = match precision {
                0 => u16::from(c.read_u8()?),
                1 => c.read_u16()?,
                _ => {
                    return Err(RasterError::InvalidHeader(alloc::format!(
                        "quantization table precision {precision}"
                    )));
                }
            };
        }
        if zigzag.contains(&0) {
            return Err(RasterError::CorruptData(alloc::format!(
                "quantization table {id} has a zero entry"
            )));
        }
        trace!("DQT table {id}, {}-bit", if precision == 0 { 8 } else { 16 });
        tables[id] = Some(QuantTable::from_zigzag(&zigzag));
    }
    Ok(())
}

/// Transform flag of an Adobe APP14 segment, if `payload` is one.
fn adobe_transform(payload: &[u8]) -> Option<u8> {
    match payload {
        [b'A', b'd', b'o', b'b', b'e', _, _, _, _, _, _, transform, ..] => Some(*transform),
        _ => None,
    }
}

fn color_type(frame: &FrameHeader, adobe: Option<u8>) -> Option<JpegColorType> {
    match frame.components.as_slice() {
        [_] => Some(JpegColorType::Luminance),
        [y, cb, cr] => {
            let rgb_ids = [y.id, cb.id, cr.id] == [b'R', b'G', b'B'];
            if adobe == Some(0) || rgb_ids {
                return Some(JpegColorType::Rgb);
            }
            if (cb.horizontal, cb.vertical, cr.horizontal, cr.vertical) != (1, 1, 1, 1) {
                return None;
            }
            match (y.horizontal, y.vertical) {
                (1, 1) => Some(JpegColorType::YCbCrRatio444),
                (2, 1) => Some(JpegColorType::YCbCrRatio422),
                (2, 2) => Some(JpegColorType::YCbCrRatio420),
                (4, 1) => Some(JpegColorType::YCbCrRatio411),
                _ => None,
            }
        }
        [_, _, _, _] => {
            if adobe == Some(2) {
                Some(JpegColorType::Ycck)
            } else {
                Some(JpegColorType::Cmyk)
            }
        }
        _ => None,
    }
}

fn parse_header(data: &[u8]) -> Result<JpegHeader, RasterError> {
    let mut c = Cursor::new(data, ByteOrder::BigEndian);
    if c.read_u8()? != 0xFF || c.read_u8()? != SOI {
        return Err(RasterError::UnrecognizedFormat);
    }

    let mut tables: [Option<QuantTable>; 4] = [None; 4];
    let mut frame = None;
    let mut adobe = None;

    loop {
        if c.read_u8()? != 0xFF {
            return Err(RasterError::CorruptData(alloc::format!(
                "expected marker at offset {}",
                c.position() - 1
            )));
        }
        // Fill bytes.
        while c.peek_u8() == Some(0xFF) {
            c.skip(1)?;
        }
        let marker = c.read_u8()?;
        match marker {
            0x01 | 0xD0..=0xD7 => continue,
            SOI => return Err(RasterError::CorruptData("nested SOI marker".into())),
            EOI => break,
            _ => {}
        }
        let len = usize::from(c.read_u16()?);
        if len < 2 {
            return Err(RasterError::CorruptData(alloc::format!(
                "segment {marker:#04X} length {len}"
            )));
        }
        let payload = c.read_bytes(len - 2)?;
        trace!("marker {marker:#04X}, {} bytes", payload.len());

        match marker {
            DQT => parse_dqt(payload, &mut tables)?,
            APP14 => {
                if let Some(t) = adobe_transform(payload) {
                    adobe = Some(t);
                }
            }
            m if is_sof(m) => {
                if frame.is_some() {
                    return Err(RasterError::CorruptData("multiple frame headers".into()));
                }
                frame = Some(parse_sof(m, payload)?);
            }
            SOS => break,
            _ => {}
        }
    }

    let frame = frame.ok_or_else(|| RasterError::InvalidHeader("no frame header".into()))?;
    let table_for = |index: usize| {
        frame
            .components
            .get(index)
            .and_then(|comp| tables[usize::from(comp.table)])
    };
    let (luminance, chrominance) = match frame.components.len() {
        1 => (table_for(0), None),
        _ => (table_for(0), table_for(1)),
    };

    let mut metadata = JpegMetadata::from_tables(luminance, chrominance);
    metadata.color_type = color_type(&frame, adobe);
    Ok(JpegHeader { frame, metadata })
}

fn pixel_hint(frame: &FrameHeader) -> PixelLayout {
    match (frame.components.len(), frame.precision > 8) {
        (1, false) => PixelLayout::Gray8,
        (1, true) => PixelLayout::Gray16,
        (_, false) => PixelLayout::Rgb8,
        (_, true) => PixelLayout::Rgb16,
    }
}

/// Header-only parse.
pub(crate) fn identify(data: &[u8]) -> Result<ImageInfo, RasterError> {
    let header = parse_header(data)?;
    let frame = &header.frame;
    debug!(
        "JPEG {}x{}, {} components, {}-bit{}",
        frame.width,
        frame.height,
        frame.components.len(),
        frame.precision,
        if frame.progressive { ", progressive" } else { "" }
    );
    Ok(ImageInfo {
        width: frame.width,
        height: frame.height,
        format: ImageFormat::Jpeg,
        pixel_hint: pixel_hint(frame),
        frame_count: 1,
        metadata: FormatMetadata::Jpeg(header.metadata),
    })
}

/// Validate the header and limits, then report that entropy-coded scans
/// cannot be decoded.
pub(crate) fn decode<P: Pixel>(
    data: &[u8],
    options: &DecoderOptions,
    stop: &dyn Stop,
) -> Result<Image<P>, RasterError> {
    let header = parse_header(data)?;
    options
        .limits
        .check_frame(header.frame.width, header.frame.height, P::LAYOUT.bytes_per_pixel())?;
    stop.check()?;
    Err(RasterError::UnsupportedVariant(
        "JPEG entropy-coded scan decoding".into(),
    ))
}
