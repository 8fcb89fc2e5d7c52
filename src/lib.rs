//! # zenraster
//!
//! Raster decoding into caller-typed pixel buffers.
//!
//! Container parsers read headers and hand sample bytes to a
//! [`PhotometricDecoder`], which converts them into any [`Pixel`]
//! representation (8/16-bit RGB(A), BGRA, gray, f32 RGBA). Encoder side
//! information is kept as [`FormatMetadata`], including JPEG quantization
//! tables and the quality estimated from them.
//!
//! ## Supported Formats
//!
//! ### TIFF
//! - Strip-organized, chunky, uncompressed or PackBits, horizontal predictor
//! - BlackIsZero / WhiteIsZero (1, 2, 4, 8, 16 bit), RGB and RGBA (8, 16 bit),
//!   palette (1, 2, 4, 8 bit), YCbCr without subsampling, CMYK (8, 16 bit)
//! - Multi-page files decode to one frame per directory
//!
//! ### JPEG
//! - Marker-level identify: dimensions, color type, quantization tables and
//!   per-channel quality estimates
//!
//! ## Non-Goals
//!
//! - Entropy decoding (JPEG Huffman, TIFF LZW/Deflate/CCITT)
//! - Tiled and planar TIFF
//! - Encoding
//! - Color management
//!
//! ## Usage
//!
//! ```no_run
//! use zenraster::{DecodeRequest, Unstoppable};
//! use rgb::Gray;
//!
//! let data: &[u8] = &[]; // your TIFF/JPEG bytes
//!
//! // Probe without decoding
//! let info = zenraster::identify(data)?;
//! println!("{}x{} {:?}", info.width, info.height, info.format);
//!
//! // Default RGBA8 decode
//! let image = zenraster::decode(data, Unstoppable)?;
//! let rgba = image.into_imgvec();
//!
//! // Any other representation
//! let gray = DecodeRequest::new(data).decode::<Gray<u16>>(Unstoppable)?;
//! # Ok::<(), zenraster::RasterError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod buffer;
mod cursor;
mod decode;
mod error;
mod info;
mod limits;
mod metadata;
mod pixel;

pub mod jpeg;
pub mod photometric;
pub mod resize;
pub mod tiff;

// Re-exports
pub use buffer::{PixelBuffer, Region};
pub use decode::{DecodeRequest, DecoderOptions, Image, ImageFrame};
pub use enough::{Stop, StopReason, Unstoppable};
pub use error::RasterError;
pub use info::{ImageFormat, ImageInfo};
pub use jpeg::{JpegColorType, JpegMetadata, QuantTable};
pub use limits::Limits;
pub use metadata::{FormatMetadata, Resolution, ResolutionUnit, TiffMetadata};
pub use photometric::PhotometricDecoder;
pub use pixel::{Pixel, PixelLayout, Vec4};
pub use resize::ResizeFilter;

use rgb::Rgba;

/// Read headers only.
pub fn identify(data: &[u8]) -> Result<ImageInfo, RasterError> {
    DecodeRequest::new(data).identify()
}

/// Decode into 8-bit RGBA with default options.
pub fn decode(data: &[u8], stop: impl Stop) -> Result<Image<Rgba<u8>>, RasterError> {
    DecodeRequest::new(data).decode(stop)
}

/// Decode into `P` with default options.
pub fn decode_as<P: Pixel>(data: &[u8], stop: impl Stop) -> Result<Image<P>, RasterError> {
    DecodeRequest::new(data).decode(stop)
}
