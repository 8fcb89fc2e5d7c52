//! Baseline and extension tag numbers plus the enumerated tag values.

pub(crate) const IMAGE_WIDTH: u16 = 256;
pub(crate) const IMAGE_LENGTH: u16 = 257;
pub(crate) const BITS_PER_SAMPLE: u16 = 258;
pub(crate) const COMPRESSION: u16 = 259;
pub(crate) const PHOTOMETRIC: u16 = 262;
pub(crate) const FILL_ORDER: u16 = 266;
pub(crate) const STRIP_OFFSETS: u16 = 273;
pub(crate) const SAMPLES_PER_PIXEL: u16 = 277;
pub(crate) const ROWS_PER_STRIP: u16 = 278;
pub(crate) const STRIP_BYTE_COUNTS: u16 = 279;
pub(crate) const X_RESOLUTION: u16 = 282;
pub(crate) const Y_RESOLUTION: u16 = 283;
pub(crate) const PLANAR_CONFIG: u16 = 284;
pub(crate) const RESOLUTION_UNIT: u16 = 296;
pub(crate) const PREDICTOR: u16 = 317;
pub(crate) const COLOR_MAP: u16 = 320;
pub(crate) const TILE_WIDTH: u16 = 322;
pub(crate) const TILE_OFFSETS: u16 = 324;
pub(crate) const INK_SET: u16 = 332;
pub(crate) const EXTRA_SAMPLES: u16 = 338;
pub(crate) const SAMPLE_FORMAT: u16 = 339;
pub(crate) const YCBCR_COEFFICIENTS: u16 = 529;
pub(crate) const YCBCR_SUBSAMPLING: u16 = 530;
pub(crate) const REFERENCE_BLACK_WHITE: u16 = 532;

/// Tags whose values are loaded; everything else is skipped unread.
pub(crate) const KNOWN: &[u16] = &[
    IMAGE_WIDTH,
    IMAGE_LENGTH,
    BITS_PER_SAMPLE,
    COMPRESSION,
    PHOTOMETRIC,
    FILL_ORDER,
    STRIP_OFFSETS,
    SAMPLES_PER_PIXEL,
    ROWS_PER_STRIP,
    STRIP_BYTE_COUNTS,
    X_RESOLUTION,
    Y_RESOLUTION,
    PLANAR_CONFIG,
    RESOLUTION_UNIT,
    PREDICTOR,
    COLOR_MAP,
    TILE_WIDTH,
    TILE_OFFSETS,
    INK_SET,
    EXTRA_SAMPLES,
    SAMPLE_FORMAT,
    YCBCR_COEFFICIENTS,
    YCBCR_SUBSAMPLING,
    REFERENCE_BLACK_WHITE,
];

/// `PhotometricInterpretation` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Photometric {
    WhiteIsZero,
    BlackIsZero,
    Rgb,
    Palette,
    TransparencyMask,
    Cmyk,
    YCbCr,
    CieLab,
    Other(u16),
}

impl Photometric {
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => Self::WhiteIsZero,
            1 => Self::BlackIsZero,
            2 => Self::Rgb,
            3 => Self::Palette,
            4 => Self::TransparencyMask,
            5 => Self::Cmyk,
            6 => Self::YCbCr,
            8 => Self::CieLab,
            c => Self::Other(c),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            Self::WhiteIsZero => 0,
            Self::BlackIsZero => 1,
            Self::Rgb => 2,
            Self::Palette => 3,
            Self::TransparencyMask => 4,
            Self::Cmyk => 5,
            Self::YCbCr => 6,
            Self::CieLab => 8,
            Self::Other(c) => c,
        }
    }
}

/// `Compression` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compression {
    None,
    Ccitt,
    Lzw,
    Jpeg,
    Deflate,
    PackBits,
    Other(u16),
}

impl Compression {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::None,
            2..=4 => Self::Ccitt,
            5 => Self::Lzw,
            6 | 7 => Self::Jpeg,
            8 | 32946 => Self::Deflate,
            32773 => Self::PackBits,
            c => Self::Other(c),
        }
    }
}

/// `Predictor` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Predictor {
    None,
    /// Horizontal differencing.
    Horizontal,
    FloatingPoint,
    Other(u16),
}

impl Predictor {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::None,
            2 => Self::Horizontal,
            3 => Self::FloatingPoint,
            c => Self::Other(c),
        }
    }
}
