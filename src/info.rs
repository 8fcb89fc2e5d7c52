use crate::error::RasterError;
use crate::metadata::FormatMetadata;
use crate::pixel::PixelLayout;

/// Container formats recognized by [`ImageFormat::detect`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ImageFormat {
    Tiff,
    Jpeg,
}

impl ImageFormat {
    /// Sniff the format from leading magic bytes.
    ///
    /// `II*\0` / `MM\0*` is TIFF, `FF D8 FF` is JPEG.
    pub fn detect(data: &[u8]) -> Result<Self, RasterError> {
        match data {
            [b'I', b'I', 42, 0, ..] | [b'M', b'M', 0, 42, ..] => Ok(Self::Tiff),
            // BigTIFF shares the byte-order mark; route it to the TIFF parser
            // so it is reported as an unsupported variant.
            [b'I', b'I', 43, 0, ..] | [b'M', b'M', 0, 43, ..] => Ok(Self::Tiff),
            [0xFF, 0xD8, 0xFF, ..] => Ok(Self::Jpeg),
            _ => Err(RasterError::UnrecognizedFormat),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Tiff => "TIFF",
            Self::Jpeg => "JPEG",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Tiff => "image/tiff",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Header-level description of an image, produced without decoding pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageInfo {
    /// Width of the root frame.
    pub width: u32,
    /// Height of the root frame.
    pub height: u32,
    pub format: ImageFormat,
    /// Closest pixel layout to the stored samples; decode into this to
    /// avoid losing precision.
    pub pixel_hint: PixelLayout,
    pub frame_count: u32,
    /// Metadata of the root frame.
    pub metadata: FormatMetadata,
}
