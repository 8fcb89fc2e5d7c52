//! Per-format side information attached to identified and decoded images.

use crate::jpeg::JpegMetadata;
use crate::photometric::{AlphaMode, ByteOrder};
use crate::tiff::{Compression, Photometric, Predictor};

/// Format-specific metadata. `Clone` produces a fully independent copy.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum FormatMetadata {
    Tiff(TiffMetadata),
    Jpeg(JpegMetadata),
}

impl FormatMetadata {
    pub fn as_tiff(&self) -> Option<&TiffMetadata> {
        match self {
            Self::Tiff(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_jpeg(&self) -> Option<&JpegMetadata> {
        match self {
            Self::Jpeg(m) => Some(m),
            _ => None,
        }
    }
}

/// Unit of [`Resolution`] values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolutionUnit {
    /// Aspect ratio only.
    None,
    Inch,
    Centimeter,
}

/// Pixel density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
    pub unit: ResolutionUnit,
}

/// Layout tags of one TIFF directory.
#[derive(Clone, Debug, PartialEq)]
pub struct TiffMetadata {
    pub byte_order: ByteOrder,
    pub photometric: Photometric,
    pub bits_per_sample: u16,
    pub samples_per_pixel: u16,
    pub compression: Compression,
    pub predictor: Predictor,
    /// Interpretation of the sample after the color samples, if any.
    pub extra_samples: AlphaMode,
    pub resolution: Option<Resolution>,
}
