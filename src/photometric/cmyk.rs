//! Separated (CMYK ink set): `R = (1-C)(1-K)`, `G = (1-M)(1-K)`, `B = (1-Y)(1-K)`.

use rgb::Rgba;

use super::ByteOrder;
use crate::pixel::Pixel;

pub(super) fn decode_row<P: Pixel>(src: &[u8], dst: &mut [P], bits: u8, byte_order: ByteOrder) {
    if bits == 8 {
        for (d, s) in dst.iter_mut().zip(src.chunks_exact(4)) {
            let ink = |c: u8, k: u8| ((u32::from(!c) * u32::from(!k) + 127) / 255) as u8;
            *d = P::from_rgba8(Rgba::new(ink(s[0], s[3]), ink(s[1], s[3]), ink(s[2], s[3]), 255));
        }
    } else {
        for (d, s) in dst.iter_mut().zip(src.chunks_exact(8)) {
            let c = byte_order.u16([s[0], s[1]]);
            let m = byte_order.u16([s[2], s[3]]);
            let y = byte_order.u16([s[4], s[5]]);
            let k = byte_order.u16([s[6], s[7]]);
            let ink = |c: u16| ((u32::from(!c) * u32::from(!k) + 32767) / 65535) as u16;
            *d = P::from_rgba16(Rgba::new(ink(c), ink(m), ink(y), u16::MAX));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primaries_and_key() {
        let src = [
            0, 0, 0, 0, // white
            255, 0, 0, 0, // cyan
            0, 0, 0, 255, // black
            0, 0, 0, 128, // half key
        ];
        let mut dst = [Rgba::<u8>::default(); 4];
        decode_row(&src, &mut dst, 8, ByteOrder::LittleEndian);
        assert_eq!(dst[0], Rgba::new(255, 255, 255, 255));
        assert_eq!(dst[1], Rgba::new(0, 255, 255, 255));
        assert_eq!(dst[2], Rgba::new(0, 0, 0, 255));
        assert_eq!(dst[3], Rgba::new(127, 127, 127, 255));
    }

    #[test]
    fn sixteen_bit_big_endian() {
        let src = [0xFF, 0xFF, 0, 0, 0, 0, 0, 0];
        let mut dst = [Rgba::<u16>::default(); 1];
        decode_row(&src, &mut dst, 16, ByteOrder::BigEndian);
        assert_eq!(dst[0], Rgba::new(0, 65535, 65535, 65535));
    }
}
