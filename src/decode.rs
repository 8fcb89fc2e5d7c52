use alloc::vec::Vec;

use enough::Stop;
use log::debug;

use crate::buffer::PixelBuffer;
use crate::error::RasterError;
use crate::info::{ImageFormat, ImageInfo};
use crate::limits::{Allocation, Limits};
use crate::metadata::FormatMetadata;
use crate::pixel::Pixel;
use crate::resize::{self, ResizeFilter};
use crate::{jpeg, tiff};

/// Caller configuration for a decode.
///
/// Defaults: native size, bilinear filter, no limits, every frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecoderOptions {
    /// Resize every decoded frame to `(width, height)`.
    pub target_size: Option<(u32, u32)>,
    pub resize_filter: ResizeFilter,
    pub limits: Limits,
    /// Decode at most this many frames; `None` decodes all of them.
    pub max_frames: Option<u32>,
}

impl DecoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_size(mut self, width: u32, height: u32) -> Self {
        self.target_size = Some((width, height));
        self
    }

    pub fn with_resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.resize_filter = filter;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_max_frames(mut self, max_frames: u32) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    fn validate(&self) -> Result<(), RasterError> {
        if let Some((w, h)) = self.target_size {
            if w == 0 || h == 0 {
                return Err(RasterError::InvalidArgument(alloc::format!(
                    "target size {w}x{h} has a zero dimension"
                )));
            }
        }
        if self.max_frames == Some(0) {
            return Err(RasterError::InvalidArgument("max_frames is 0".into()));
        }
        Ok(())
    }
}

/// One decoded frame with its own metadata.
#[derive(Clone, Debug)]
pub struct ImageFrame<P> {
    pub buffer: PixelBuffer<P>,
    pub metadata: FormatMetadata,
}

impl<P: Pixel> ImageFrame<P> {
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }
}

/// Decoded image: one or more frames plus the root frame's metadata.
#[derive(Clone, Debug)]
pub struct Image<P> {
    frames: Vec<ImageFrame<P>>,
    metadata: FormatMetadata,
}

impl<P: Pixel> Image<P> {
    /// Returns `None` when `frames` is empty.
    pub(crate) fn from_frames(frames: Vec<ImageFrame<P>>) -> Option<Self> {
        let metadata = frames.first()?.metadata.clone();
        Some(Self { frames, metadata })
    }

    /// The first frame.
    pub fn root_frame(&self) -> &ImageFrame<P> {
        &self.frames[0]
    }

    pub fn frames(&self) -> &[ImageFrame<P>] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<ImageFrame<P>> {
        self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn width(&self) -> u32 {
        self.root_frame().width()
    }

    pub fn height(&self) -> u32 {
        self.root_frame().height()
    }

    /// Pixels of the root frame.
    pub fn buffer(&self) -> &PixelBuffer<P> {
        &self.root_frame().buffer
    }

    pub fn metadata(&self) -> &FormatMetadata {
        &self.metadata
    }

    /// Root frame as an [`imgref::ImgVec`], dropping other frames.
    pub fn into_imgvec(self) -> imgref::ImgVec<P> {
        let mut frames = self.frames;
        frames.swap_remove(0).buffer.into_imgvec()
    }
}

/// Builder for identify and decode calls over one input.
///
/// ```no_run
/// use zenraster::{DecodeRequest, DecoderOptions, Unstoppable};
/// use rgb::Rgba;
///
/// let data: &[u8] = &[]; // TIFF or JPEG bytes
/// let options = DecoderOptions::new().with_target_size(64, 64);
/// let image = DecodeRequest::new(data)
///     .with_options(&options)
///     .decode::<Rgba<u16>>(Unstoppable)?;
/// println!("{}x{}", image.width(), image.height());
/// # Ok::<(), zenraster::RasterError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    options: DecoderOptions,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            options: DecoderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: &DecoderOptions) -> Self {
        self.options = options.clone();
        self
    }

    pub fn with_limits(mut self, limits: &Limits) -> Self {
        self.options.limits = limits.clone();
        self
    }

    fn check_input(&self) -> Result<ImageFormat, RasterError> {
        if self.data.is_empty() {
            return Err(RasterError::InvalidArgument("empty input".into()));
        }
        self.options.validate()?;
        ImageFormat::detect(self.data)
    }

    /// Read headers only; no pixel data is touched.
    pub fn identify(&self) -> Result<ImageInfo, RasterError> {
        let format = self.check_input()?;
        match format {
            ImageFormat::Tiff => tiff::identify(self.data),
            ImageFormat::Jpeg => jpeg::identify(self.data),
        }
    }

    /// Decode every frame (up to `max_frames`) into `P`, then resize if a
    /// target size is set.
    pub fn decode<P: Pixel>(&self, stop: impl Stop) -> Result<Image<P>, RasterError> {
        let format = self.check_input()?;
        debug!(
            "decoding {} ({} bytes) into {:?}",
            format.name(),
            self.data.len(),
            P::LAYOUT
        );
        stop.check()?;
        let image = match format {
            ImageFormat::Tiff => tiff::decode::<P>(self.data, &self.options, &stop)?,
            ImageFormat::Jpeg => jpeg::decode::<P>(self.data, &self.options, &stop)?,
        };
        match self.options.target_size {
            Some((width, height)) => resize_image(image, width, height, &self.options, &stop),
            None => Ok(image),
        }
    }
}

fn resize_image<P: Pixel>(
    image: Image<P>,
    width: u32,
    height: u32,
    options: &DecoderOptions,
    stop: &dyn Stop,
) -> Result<Image<P>, RasterError> {
    let filter = options.resize_filter;
    debug!(
        "resizing {}x{} to {width}x{height} ({filter:?})",
        image.width(),
        image.height()
    );
    let Image { frames, metadata } = image;
    let mut used = Allocation::default();
    for _ in &frames {
        options
            .limits
            .reserve(&mut used, width, height, P::LAYOUT.bytes_per_pixel())?;
    }
    let mut resized = Vec::with_capacity(frames.len());
    for frame in frames {
        stop.check()?;
        resized.push(ImageFrame {
            buffer: resize::resize(&frame.buffer, width, height, filter, stop)?,
            metadata: frame.metadata,
        });
    }
    Ok(Image {
        frames: resized,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use enough::Unstoppable;
    use rgb::Rgba;

    #[test]
    fn empty_input_is_an_argument_error() {
        let err = DecodeRequest::new(&[]).decode::<Rgba<u8>>(Unstoppable).unwrap_err();
        assert!(matches!(err, RasterError::InvalidArgument(_)));
        assert!(matches!(
            DecodeRequest::new(&[]).identify(),
            Err(RasterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn options_validated_before_parsing() {
        // Garbage input, but the argument error wins.
        let data = [0u8; 4];
        let zero_target = DecoderOptions::new().with_target_size(0, 10);
        let err = DecodeRequest::new(&data)
            .with_options(&zero_target)
            .decode::<Rgba<u8>>(Unstoppable)
            .unwrap_err();
        assert!(matches!(err, RasterError::InvalidArgument(_)));

        let no_frames = DecoderOptions::new().with_max_frames(0);
        let err = DecodeRequest::new(&data)
            .with_options(&no_frames)
            .decode::<Rgba<u8>>(Unstoppable)
            .unwrap_err();
        assert!(matches!(err, RasterError::InvalidArgument(_)));
    }

    #[test]
    fn unknown_magic_is_unrecognized() {
        let err = DecodeRequest::new(b"GIF89a")
            .decode::<Rgba<u8>>(Unstoppable)
            .unwrap_err();
        assert!(matches!(err, RasterError::UnrecognizedFormat));
    }

    #[test]
    fn empty_frame_list_is_not_an_image() {
        assert!(Image::<Rgba<u8>>::from_frames(Vec::new()).is_none());
    }
}
