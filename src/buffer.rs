//! Owned 2D pixel storage with checked windowed row access.

use alloc::vec;

use imgref::{ImgRef, ImgVec};

use crate::error::RasterError;
use crate::pixel::Pixel;

/// Rectangle in buffer coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Whole-image region of `width` x `height`.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Number of pixels covered.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Contiguous row-major buffer of `width * height` pixels.
///
/// Every accessor is bounds-checked; out-of-range requests come back as
/// `None` or [`RasterError::CorruptData`], never as a panic.
#[derive(Clone, Debug)]
pub struct PixelBuffer<P> {
    img: ImgVec<P>,
}

impl<P: Pixel> PixelBuffer<P> {
    /// Allocate a buffer filled with `P::default()`.
    pub fn new(width: u32, height: u32) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidArgument(alloc::format!(
                "pixel buffer dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(RasterError::DimensionsTooLarge { width, height })?;
        Ok(Self {
            img: ImgVec::new(vec![P::default(); len], width as usize, height as usize),
        })
    }

    /// Wrap an existing `ImgVec`. Padded (stride != width) images are compacted.
    pub fn from_imgvec(img: ImgVec<P>) -> Self {
        if img.stride() == img.width() {
            return Self { img };
        }
        let (buf, w, h) = img.as_ref().to_contiguous_buf();
        Self {
            img: ImgVec::new(buf.into_owned(), w, h),
        }
    }

    pub fn width(&self) -> u32 {
        self.img.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.img.height() as u32
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[P] {
        self.img.buf()
    }

    /// One full row.
    pub fn row(&self, y: u32) -> Option<&[P]> {
        if y >= self.height() {
            return None;
        }
        let w = self.img.width();
        let start = y as usize * w;
        self.img.buf().get(start..start + w)
    }

    /// Pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<P> {
        if x >= self.width() {
            return None;
        }
        self.row(y).map(|row| row[x as usize])
    }

    /// Mutable window `[left, left + width)` of row `y`.
    pub fn row_window_mut(
        &mut self,
        y: u32,
        left: u32,
        width: u32,
    ) -> Result<&mut [P], RasterError> {
        let right = left.checked_add(width);
        if y >= self.height() || right.is_none_or(|r| r > self.width()) {
            return Err(RasterError::CorruptData(alloc::format!(
                "row window (y={y}, left={left}, width={width}) outside {}x{} buffer",
                self.width(),
                self.height()
            )));
        }
        let start = y as usize * self.img.width() + left as usize;
        Ok(&mut self.img.buf_mut()[start..start + width as usize])
    }

    /// Validate that `region` lies inside the buffer.
    pub fn check_region(&self, region: Region) -> Result<(), RasterError> {
        let right = region.left.checked_add(region.width);
        let bottom = region.top.checked_add(region.height);
        match (right, bottom) {
            (Some(r), Some(b)) if r <= self.width() && b <= self.height() => Ok(()),
            _ => Err(RasterError::CorruptData(alloc::format!(
                "region {region:?} outside {}x{} buffer",
                self.width(),
                self.height()
            ))),
        }
    }

    /// Borrow as an [`imgref::ImgRef`].
    pub fn as_imgref(&self) -> ImgRef<'_, P> {
        self.img.as_ref()
    }

    /// Take the underlying [`imgref::ImgVec`].
    pub fn into_imgvec(self) -> ImgVec<P> {
        self.img
    }
}
