//! Pixel representations and the conversion contract every decoder writes through.
//!
//! Decoders are written once against [`Pixel`] and monomorphized per concrete
//! representation. All representations convert through the normalized
//! [`Vec4`] form; integer sample paths are overridden where an exact integer
//! mapping exists so that 8- and 16-bit targets never pick up float error.

use rgb::alt::BGRA;
use rgb::{ComponentMap, Gray, Rgb, Rgba};

/// Normalized RGBA vector, every channel in `[0, 1]`.
pub type Vec4 = [f32; 4];

/// Pixel memory layout.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    /// Single channel, 8-bit grayscale.
    Gray8,
    /// Single channel, 16-bit grayscale (native endian).
    Gray16,
    /// 3 channels, 8-bit RGB.
    Rgb8,
    /// 3 channels, 16-bit RGB (native endian).
    Rgb16,
    /// 4 channels, 8-bit RGBA.
    Rgba8,
    /// 4 channels, 16-bit RGBA (native endian).
    Rgba16,
    /// 4 channels, 8-bit BGRA.
    Bgra8,
    /// 4 channels, 32-bit float RGBA.
    RgbaF32,
}

impl PixelLayout {
    /// Bytes per pixel for this layout.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Gray16 => 2,
            Self::Rgb8 => 3,
            Self::Rgb16 => 6,
            Self::Rgba8 | Self::Bgra8 => 4,
            Self::Rgba16 => 8,
            Self::RgbaF32 => 16,
        }
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray8 | Self::Gray16 => 1,
            Self::Rgb8 | Self::Rgb16 => 3,
            Self::Rgba8 | Self::Rgba16 | Self::Bgra8 | Self::RgbaF32 => 4,
        }
    }

    /// Whether this layout carries an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.channels() == 4
    }
}

// BT.709 luma weights.
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

#[inline]
fn unorm8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

#[inline]
fn unorm16(v: f32) -> u16 {
    (v.clamp(0.0, 1.0) * 65535.0 + 0.5) as u16
}

#[inline]
fn luma(v: Vec4) -> f32 {
    LUMA_R * v[0] + LUMA_G * v[1] + LUMA_B * v[2]
}

/// Scale a 16-bit sample to 8 bits, rounding to nearest.
#[inline]
pub(crate) fn u16_to_u8(v: u16) -> u8 {
    ((u32::from(v) * 255 + 32767) / 65535) as u8
}

/// Expand an 8-bit sample to 16 bits (`0xAB` becomes `0xABAB`).
#[inline]
pub(crate) fn u8_to_u16(v: u8) -> u16 {
    u16::from(v) * 257
}

/// Conversion contract implemented by every concrete pixel representation.
///
/// The scalar paths (`from_l8`, `from_l16`, `from_rgba8`, `from_rgba16`)
/// and the batch paths (`from_*_bytes`) must agree bit for bit: the default
/// batch implementations loop the scalar path, and overrides must preserve
/// that equivalence.
///
/// Batch paths convert `min(dst.len(), src.len() / sample_size)` pixels and
/// never read past `src`. 16-bit batch samples are little-endian.
pub trait Pixel: Copy + Default + PartialEq + core::fmt::Debug + Send + Sync + 'static {
    /// Memory layout of this representation.
    const LAYOUT: PixelLayout;

    /// Build a pixel from a normalized vector, applying this representation's precision.
    fn from_normalized(v: Vec4) -> Self;

    /// Convert to the normalized vector form.
    fn to_normalized(self) -> Vec4;

    /// Single 8-bit luminance sample. R = G = B, opaque.
    #[inline]
    fn from_l8(v: u8) -> Self {
        let l = f32::from(v) / 255.0;
        Self::from_normalized([l, l, l, 1.0])
    }

    /// Single 16-bit luminance sample (host order). R = G = B, opaque.
    #[inline]
    fn from_l16(v: u16) -> Self {
        let l = f32::from(v) / 65535.0;
        Self::from_normalized([l, l, l, 1.0])
    }

    /// Single 8-bit RGBA color.
    #[inline]
    fn from_rgba8(px: Rgba<u8>) -> Self {
        Self::from_normalized([
            f32::from(px.r) / 255.0,
            f32::from(px.g) / 255.0,
            f32::from(px.b) / 255.0,
            f32::from(px.a) / 255.0,
        ])
    }

    /// Single 16-bit RGBA color (host order).
    #[inline]
    fn from_rgba16(px: Rgba<u16>) -> Self {
        Self::from_normalized([
            f32::from(px.r) / 65535.0,
            f32::from(px.g) / 65535.0,
            f32::from(px.b) / 65535.0,
            f32::from(px.a) / 65535.0,
        ])
    }

    /// Batch: 8-bit luminance samples into a row.
    fn from_l8_bytes(src: &[u8], dst: &mut [Self]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = Self::from_l8(s);
        }
    }

    /// Batch: little-endian 16-bit luminance samples into a row.
    fn from_l16_bytes(src: &[u8], dst: &mut [Self]) {
        for (d, c) in dst.iter_mut().zip(src.chunks_exact(2)) {
            *d = Self::from_l16(u16::from_le_bytes([c[0], c[1]]));
        }
    }

    /// Batch: packed 8-bit RGB triples into a row.
    fn from_rgb24_bytes(src: &[u8], dst: &mut [Self]) {
        for (d, c) in dst.iter_mut().zip(src.chunks_exact(3)) {
            *d = Self::from_rgba8(Rgba {
                r: c[0],
                g: c[1],
                b: c[2],
                a: 255,
            });
        }
    }

    /// Batch: packed 8-bit RGBA quads into a row.
    fn from_rgba32_bytes(src: &[u8], dst: &mut [Self]) {
        for (d, c) in dst.iter_mut().zip(src.chunks_exact(4)) {
            *d = Self::from_rgba8(Rgba {
                r: c[0],
                g: c[1],
                b: c[2],
                a: c[3],
            });
        }
    }

    /// Batch: little-endian 16-bit RGB triples into a row.
    fn from_rgb48_bytes(src: &[u8], dst: &mut [Self]) {
        for (d, c) in dst.iter_mut().zip(src.chunks_exact(6)) {
            *d = Self::from_rgba16(Rgba {
                r: u16::from_le_bytes([c[0], c[1]]),
                g: u16::from_le_bytes([c[2], c[3]]),
                b: u16::from_le_bytes([c[4], c[5]]),
                a: u16::MAX,
            });
        }
    }
}

impl Pixel for Rgba<u8> {
    const LAYOUT: PixelLayout = PixelLayout::Rgba8;

    #[inline]
    fn from_normalized(v: Vec4) -> Self {
        Rgba {
            r: unorm8(v[0]),
            g: unorm8(v[1]),
            b: unorm8(v[2]),
            a: unorm8(v[3]),
        }
    }

    #[inline]
    fn to_normalized(self) -> Vec4 {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }

    #[inline]
    fn from_l8(v: u8) -> Self {
        Rgba {
            r: v,
            g: v,
            b: v,
            a: 255,
        }
    }

    #[inline]
    fn from_l16(v: u16) -> Self {
        Self::from_l8(u16_to_u8(v))
    }

    #[inline]
    fn from_rgba8(px: Rgba<u8>) -> Self {
        px
    }

    #[inline]
    fn from_rgba16(px: Rgba<u16>) -> Self {
        px.map(u16_to_u8)
    }

    fn from_rgba32_bytes(src: &[u8], dst: &mut [Self]) {
        use rgb::AsPixels as _;
        let src: &[Rgba<u8>] = src.as_pixels();
        let n = dst.len().min(src.len());
        dst[..n].copy_from_slice(&src[..n]);
    }
}

impl Pixel for BGRA<u8> {
    const LAYOUT: PixelLayout = PixelLayout::Bgra8;

    #[inline]
    fn from_normalized(v: Vec4) -> Self {
        BGRA {
            b: unorm8(v[2]),
            g: unorm8(v[1]),
            r: unorm8(v[0]),
            a: unorm8(v[3]),
        }
    }

    #[inline]
    fn to_normalized(self) -> Vec4 {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }

    #[inline]
    fn from_l8(v: u8) -> Self {
        BGRA {
            b: v,
            g: v,
            r: v,
            a: 255,
        }
    }

    #[inline]
    fn from_l16(v: u16) -> Self {
        Self::from_l8(u16_to_u8(v))
    }

    #[inline]
    fn from_rgba8(px: Rgba<u8>) -> Self {
        BGRA {
            b: px.b,
            g: px.g,
            r: px.r,
            a: px.a,
        }
    }

    #[inline]
    fn from_rgba16(px: Rgba<u16>) -> Self {
        Self::from_rgba8(px.map(u16_to_u8))
    }
}

impl Pixel for Rgba<u16> {
    const LAYOUT: PixelLayout = PixelLayout::Rgba16;

    #[inline]
    fn from_normalized(v: Vec4) -> Self {
        Rgba {
            r: unorm16(v[0]),
            g: unorm16(v[1]),
            b: unorm16(v[2]),
            a: unorm16(v[3]),
        }
    }

    #[inline]
    fn to_normalized(self) -> Vec4 {
        [
            f32::from(self.r) / 65535.0,
            f32::from(self.g) / 65535.0,
            f32::from(self.b) / 65535.0,
            f32::from(self.a) / 65535.0,
        ]
    }

    #[inline]
    fn from_l8(v: u8) -> Self {
        Self::from_l16(u8_to_u16(v))
    }

    #[inline]
    fn from_l16(v: u16) -> Self {
        Rgba {
            r: v,
            g: v,
            b: v,
            a: u16::MAX,
        }
    }

    #[inline]
    fn from_rgba8(px: Rgba<u8>) -> Self {
        px.map(u8_to_u16)
    }

    #[inline]
    fn from_rgba16(px: Rgba<u16>) -> Self {
        px
    }
}

impl Pixel for Rgb<u8> {
    const LAYOUT: PixelLayout = PixelLayout::Rgb8;

    #[inline]
    fn from_normalized(v: Vec4) -> Self {
        Rgb {
            r: unorm8(v[0]),
            g: unorm8(v[1]),
            b: unorm8(v[2]),
        }
    }

    #[inline]
    fn to_normalized(self) -> Vec4 {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            1.0,
        ]
    }

    #[inline]
    fn from_l8(v: u8) -> Self {
        Rgb { r: v, g: v, b: v }
    }

    #[inline]
    fn from_l16(v: u16) -> Self {
        Self::from_l8(u16_to_u8(v))
    }

    #[inline]
    fn from_rgba8(px: Rgba<u8>) -> Self {
        px.rgb()
    }

    #[inline]
    fn from_rgba16(px: Rgba<u16>) -> Self {
        px.rgb().map(u16_to_u8)
    }

    fn from_rgb24_bytes(src: &[u8], dst: &mut [Self]) {
        use rgb::AsPixels as _;
        let src: &[Rgb<u8>] = src.as_pixels();
        let n = dst.len().min(src.len());
        dst[..n].copy_from_slice(&src[..n]);
    }
}

impl Pixel for Rgb<u16> {
    const LAYOUT: PixelLayout = PixelLayout::Rgb16;

    #[inline]
    fn from_normalized(v: Vec4) -> Self {
        Rgb {
            r: unorm16(v[0]),
            g: unorm16(v[1]),
            b: unorm16(v[2]),
        }
    }

    #[inline]
    fn to_normalized(self) -> Vec4 {
        [
            f32::from(self.r) / 65535.0,
            f32::from(self.g) / 65535.0,
            f32::from(self.b) / 65535.0,
            1.0,
        ]
    }

    #[inline]
    fn from_l8(v: u8) -> Self {
        Self::from_l16(u8_to_u16(v))
    }

    #[inline]
    fn from_l16(v: u16) -> Self {
        Rgb { r: v, g: v, b: v }
    }

    #[inline]
    fn from_rgba8(px: Rgba<u8>) -> Self {
        px.rgb().map(u8_to_u16)
    }

    #[inline]
    fn from_rgba16(px: Rgba<u16>) -> Self {
        px.rgb()
    }
}

impl Pixel for Gray<u8> {
    const LAYOUT: PixelLayout = PixelLayout::Gray8;

    #[inline]
    fn from_normalized(v: Vec4) -> Self {
        Gray::new(unorm8(luma(v)))
    }

    #[inline]
    fn to_normalized(self) -> Vec4 {
        let l = f32::from(self.value()) / 255.0;
        [l, l, l, 1.0]
    }

    #[inline]
    fn from_l8(v: u8) -> Self {
        Gray::new(v)
    }

    #[inline]
    fn from_l16(v: u16) -> Self {
        Gray::new(u16_to_u8(v))
    }

    fn from_l8_bytes(src: &[u8], dst: &mut [Self]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = Gray::new(s);
        }
    }
}

impl Pixel for Gray<u16> {
    const LAYOUT: PixelLayout = PixelLayout::Gray16;

    #[inline]
    fn from_normalized(v: Vec4) -> Self {
        Gray::new(unorm16(luma(v)))
    }

    #[inline]
    fn to_normalized(self) -> Vec4 {
        let l = f32::from(self.value()) / 65535.0;
        [l, l, l, 1.0]
    }

    #[inline]
    fn from_l8(v: u8) -> Self {
        Gray::new(u8_to_u16(v))
    }

    #[inline]
    fn from_l16(v: u16) -> Self {
        Gray::new(v)
    }
}

impl Pixel for Rgba<f32> {
    const LAYOUT: PixelLayout = PixelLayout::RgbaF32;

    #[inline]
    fn from_normalized(v: Vec4) -> Self {
        Rgba {
            r: v[0].clamp(0.0, 1.0),
            g: v[1].clamp(0.0, 1.0),
            b: v[2].clamp(0.0, 1.0),
            a: v[3].clamp(0.0, 1.0),
        }
    }

    #[inline]
    fn to_normalized(self) -> Vec4 {
        [self.r, self.g, self.b, self.a]
    }
}
