//! Bounds-checked reader over an in-memory byte source.

use crate::error::RasterError;
use crate::photometric::ByteOrder;

pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self {
            data,
            pos: 0,
            order,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub(crate) fn set_position(&mut self, pos: usize) -> Result<(), RasterError> {
        if pos > self.data.len() {
            return Err(RasterError::UnexpectedEof);
        }
        self.pos = pos;
        Ok(())
    }

    pub(crate) fn skip(&mut self, n: usize) -> Result<(), RasterError> {
        let new_pos = self.pos.checked_add(n).ok_or(RasterError::UnexpectedEof)?;
        self.set_position(new_pos)
    }

    pub(crate) fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], RasterError> {
        let end = self.pos.checked_add(n).ok_or(RasterError::UnexpectedEof)?;
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or(RasterError::UnexpectedEof)?;
        self.pos = end;
        Ok(bytes)
    }

    fn read_fixed_bytes<const N: usize>(&mut self) -> Result<[u8; N], RasterError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.read_bytes(N)?);
        Ok(buf)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, RasterError> {
        let [b] = self.read_fixed_bytes::<1>()?;
        Ok(b)
    }

    pub(crate) fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16, RasterError> {
        Ok(self.order.u16(self.read_fixed_bytes()?))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, RasterError> {
        Ok(self.order.u32(self.read_fixed_bytes()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_in_configured_order() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC];
        let mut le = Cursor::new(&data, ByteOrder::LittleEndian);
        assert_eq!(le.read_u16().unwrap(), 0x3412);
        assert_eq!(le.read_u32().unwrap(), 0xBC9A_7856);
        assert!(le.eof());

        let mut be = Cursor::new(&data, ByteOrder::BigEndian);
        assert_eq!(be.read_u16().unwrap(), 0x1234);
        assert_eq!(be.read_u32().unwrap(), 0x5678_9ABC);
    }

    #[test]
    fn overrun_is_eof_and_does_not_move() {
        let data = [1u8, 2, 3];
        let mut c = Cursor::new(&data, ByteOrder::BigEndian);
        c.skip(2).unwrap();
        assert!(matches!(c.read_u16(), Err(RasterError::UnexpectedEof)));
        assert_eq!(c.position(), 2);
        assert!(c.set_position(4).is_err());
        assert!(c.skip(usize::MAX).is_err());
        assert_eq!(c.peek_u8(), Some(3));
    }
}
