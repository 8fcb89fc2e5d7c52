//! Chunky RGB with an optional fourth (alpha) sample.

use rgb::Rgba;

use super::{AlphaMode, ByteOrder};
use crate::pixel::Pixel;

pub(super) fn decode_row<P: Pixel>(
    src: &[u8],
    dst: &mut [P],
    bits: u8,
    byte_order: ByteOrder,
    alpha: AlphaMode,
) {
    match (bits, alpha) {
        (8, AlphaMode::None) => P::from_rgb24_bytes(src, dst),
        (8, AlphaMode::Unassociated) => P::from_rgba32_bytes(src, dst),
        (8, AlphaMode::Associated) => {
            for (d, c) in dst.iter_mut().zip(src.chunks_exact(4)) {
                *d = P::from_rgba8(unpremultiply8(c[0], c[1], c[2], c[3]));
            }
        }
        (_, AlphaMode::None) => {
            if byte_order == ByteOrder::LittleEndian {
                P::from_rgb48_bytes(src, dst);
            } else {
                for (d, c) in dst.iter_mut().zip(src.chunks_exact(6)) {
                    *d = P::from_rgba16(Rgba {
                        r: byte_order.u16([c[0], c[1]]),
                        g: byte_order.u16([c[2], c[3]]),
                        b: byte_order.u16([c[4], c[5]]),
                        a: u16::MAX,
                    });
                }
            }
        }
        (_, alpha) => {
            for (d, c) in dst.iter_mut().zip(src.chunks_exact(8)) {
                let r = byte_order.u16([c[0], c[1]]);
                let g = byte_order.u16([c[2], c[3]]);
                let b = byte_order.u16([c[4], c[5]]);
                let a = byte_order.u16([c[6], c[7]]);
                *d = P::from_rgba16(if alpha == AlphaMode::Associated {
                    unpremultiply16(r, g, b, a)
                } else {
                    Rgba { r, g, b, a }
                });
            }
        }
    }
}

fn unpremultiply8(r: u8, g: u8, b: u8, a: u8) -> Rgba<u8> {
    if a == 0 {
        return Rgba::new(0, 0, 0, 0);
    }
    let a32 = u32::from(a);
    let un = |c: u8| ((u32::from(c) * 255 + a32 / 2) / a32).min(255) as u8;
    Rgba::new(un(r), un(g), un(b), a)
}

fn unpremultiply16(r: u16, g: u16, b: u16, a: u16) -> Rgba<u16> {
    if a == 0 {
        return Rgba::new(0, 0, 0, 0);
    }
    let a64 = u64::from(a);
    let un = |c: u16| ((u64::from(c) * 65535 + a64 / 2) / a64).min(65535) as u16;
    Rgba::new(un(r), un(g), un(b), a)
}
