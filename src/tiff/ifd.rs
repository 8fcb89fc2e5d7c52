//! File header and image file directory (IFD) chain.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use log::trace;

use super::tags;
use crate::cursor::Cursor;
use crate::error::RasterError;
use crate::photometric::ByteOrder;

const BYTE: u16 = 1;
const SHORT: u16 = 3;
const LONG: u16 = 4;
const RATIONAL: u16 = 5;

/// Decoded value of a known tag.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Value {
    Unsigned(Vec<u32>),
    Rational(Vec<(u32, u32)>),
}

/// One directory: the tags of a single frame.
#[derive(Clone, Debug, Default)]
pub(crate) struct Ifd {
    fields: BTreeMap<u16, Value>,
}

impl Ifd {
    pub(crate) fn contains(&self, tag: u16) -> bool {
        self.fields.contains_key(&tag)
    }

    pub(crate) fn unsigned(&self, tag: u16) -> Option<&[u32]> {
        match self.fields.get(&tag) {
            Some(Value::Unsigned(v)) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn rationals(&self, tag: u16) -> Option<&[(u32, u32)]> {
        match self.fields.get(&tag) {
            Some(Value::Rational(v)) => Some(v),
            _ => None,
        }
    }

    /// First value of an integer tag.
    pub(crate) fn u32(&self, tag: u16) -> Option<u32> {
        self.unsigned(tag).and_then(|v| v.first().copied())
    }

    pub(crate) fn u32_or(&self, tag: u16, default: u32) -> u32 {
        self.u32(tag).unwrap_or(default)
    }

    /// First value of a tag that is only meaningful as a 16-bit code.
    pub(crate) fn u16_or(&self, tag: u16, default: u16) -> Result<u16, RasterError> {
        match self.u32(tag) {
            None => Ok(default),
            Some(v) => u16::try_from(v).map_err(|_| {
                RasterError::InvalidHeader(alloc::format!("tag {tag} value {v} out of range"))
            }),
        }
    }

    pub(crate) fn required_u32(&self, tag: u16, name: &str) -> Result<u32, RasterError> {
        self.u32(tag)
            .ok_or_else(|| RasterError::InvalidHeader(alloc::format!("missing {name}")))
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, tag: u16, value: Value) {
        self.fields.insert(tag, value);
    }
}

/// Byte order and first IFD offset from the 8-byte file header.
pub(crate) fn parse_header(data: &[u8]) -> Result<(ByteOrder, u32), RasterError> {
    let order = match data {
        [b'I', b'I', ..] => ByteOrder::LittleEndian,
        [b'M', b'M', ..] => ByteOrder::BigEndian,
        _ => return Err(RasterError::UnrecognizedFormat),
    };
    let mut c = Cursor::new(data, order);
    c.skip(2)?;
    match c.read_u16()? {
        42 => {}
        43 => return Err(RasterError::UnsupportedVariant("BigTIFF".into())),
        _ => return Err(RasterError::UnrecognizedFormat),
    }
    let first = c.read_u32()?;
    if first == 0 {
        return Err(RasterError::InvalidHeader("no image directory".into()));
    }
    Ok((order, first))
}

fn type_size(field_type: u16) -> Option<usize> {
    match field_type {
        BYTE => Some(1),
        SHORT => Some(2),
        LONG => Some(4),
        RATIONAL => Some(8),
        _ => None,
    }
}

fn read_value(
    data: &[u8],
    order: ByteOrder,
    field_type: u16,
    count: usize,
    inline: [u8; 4],
) -> Result<Option<Value>, RasterError> {
    let Some(size) = type_size(field_type) else {
        return Ok(None);
    };
    let len = count
        .checked_mul(size)
        .ok_or_else(|| RasterError::CorruptData(alloc::format!("tag value count {count}")))?;
    let bytes = if len <= 4 {
        &inline[..len]
    } else {
        let offset = order.u32(inline) as usize;
        let mut c = Cursor::new(data, order);
        c.set_position(offset)?;
        c.read_bytes(len)?
    };

    let mut c = Cursor::new(bytes, order);
    let value = match field_type {
        BYTE => Value::Unsigned(bytes.iter().map(|&b| u32::from(b)).collect()),
        SHORT => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(u32::from(c.read_u16()?));
            }
            Value::Unsigned(v)
        }
        LONG => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(c.read_u32()?);
            }
            Value::Unsigned(v)
        }
        _ => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push((c.read_u32()?, c.read_u32()?));
            }
            Value::Rational(v)
        }
    };
    Ok(Some(value))
}

/// Parse the directory at `offset`; returns it with the next offset (0 = last).
pub(crate) fn read_ifd(data: &[u8], order: ByteOrder, offset: u32) -> Result<(Ifd, u32), RasterError> {
    let mut c = Cursor::new(data, order);
    c.set_position(offset as usize)?;
    let count = c.read_u16()?;
    let mut ifd = Ifd::default();
    for _ in 0..count {
        let tag = c.read_u16()?;
        let field_type = c.read_u16()?;
        let n = c.read_u32()? as usize;
        let mut inline = [0u8; 4];
        inline.copy_from_slice(c.read_bytes(4)?);
        if tags::KNOWN.binary_search(&tag).is_err() {
            continue;
        }
        if let Some(value) = read_value(data, order, field_type, n, inline)? {
            ifd.fields.insert(tag, value);
        }
    }
    let next = c.read_u32()?;
    trace!("IFD at {offset}: {count} entries, next {next}");
    Ok((ifd, next))
}

/// Walk the IFD chain from `first`, reading at most `max` directories.
///
/// A directory offset seen twice ends the chain.
pub(crate) fn read_chain(
    data: &[u8],
    order: ByteOrder,
    first: u32,
    max: Option<usize>,
) -> Result<Vec<Ifd>, RasterError> {
    let mut visited = BTreeSet::new();
    let mut ifds = Vec::new();
    let mut offset = first;
    while offset != 0 && max.is_none_or(|m| ifds.len() < m) {
        if !visited.insert(offset) {
            trace!("IFD chain loops back to {offset}, stopping");
            break;
        }
        let (ifd, next) = read_ifd(data, order, offset)?;
        ifds.push(ifd);
        offset = next;
    }
    Ok(ifds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(out: &mut Vec<u8>, tag: u16, field_type: u16, count: u32, value: [u8; 4]) {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&field_type.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&value);
    }

    /// Header plus one IFD at offset 8 pointing at `next`.
    fn file(next: u32) -> Vec<u8> {
        let mut d = b"II*\0".to_vec();
        d.extend_from_slice(&8u32.to_le_bytes());
        d.extend_from_slice(&3u16.to_le_bytes());
        entry(&mut d, tags::IMAGE_WIDTH, SHORT, 1, [7, 0, 0, 0]);
        // Out-of-line RATIONAL at offset 50.
        entry(&mut d, tags::X_RESOLUTION, RATIONAL, 1, [50, 0, 0, 0]);
        // Unknown tag with a bogus offset is skipped unread.
        entry(&mut d, 700, LONG, 1000, [0xFF; 4]);
        d.extend_from_slice(&next.to_le_bytes());
        d.extend_from_slice(&72u32.to_le_bytes());
        d.extend_from_slice(&1u32.to_le_bytes());
        d
    }

    #[test]
    fn header_byte_orders() {
        assert_eq!(parse_header(b"II*\0\x08\0\0\0").unwrap(), (ByteOrder::LittleEndian, 8));
        assert_eq!(parse_header(b"MM\0*\0\0\0\x08").unwrap(), (ByteOrder::BigEndian, 8));
        assert!(parse_header(b"II+\0\x08\0\0\0").unwrap_err().is_unsupported());
        assert!(matches!(parse_header(b"XX*\0"), Err(RasterError::UnrecognizedFormat)));
        assert!(matches!(parse_header(b"II*\0\x08"), Err(RasterError::UnexpectedEof)));
    }

    #[test]
    fn reads_inline_and_offset_values() {
        let data = file(0);
        assert_eq!(data.len(), 58);
        let (ifd, next) = read_ifd(&data, ByteOrder::LittleEndian, 8).unwrap();
        assert_eq!(next, 0);
        assert_eq!(ifd.u32(tags::IMAGE_WIDTH), Some(7));
        assert_eq!(ifd.rationals(tags::X_RESOLUTION), Some(&[(72, 1)][..]));
        assert!(!ifd.contains(700));
    }

    #[test]
    fn self_referencing_chain_terminates() {
        let data = file(8);
        let chain = read_chain(&data, ByteOrder::LittleEndian, 8, None).unwrap();
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn offset_past_end_is_eof() {
        let data = file(0);
        assert!(read_chain(&data, ByteOrder::LittleEndian, 500, None).is_err());
        let mut short = data.clone();
        short.truncate(54);
        assert!(read_ifd(&short, ByteOrder::LittleEndian, 8).unwrap_err().is_corrupt());
    }
}
