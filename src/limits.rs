use crate::error::RasterError;

/// Resource limits for decode operations.
///
/// All fields default to `None` (no limit). Width and height apply to each
/// frame. Pixel count and memory cap the running total of every buffer one
/// decode call allocates: all frames, then any resized copies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum memory bytes for output buffer allocation.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Check dimensions against limits. Returns Ok(()) or LimitExceeded error.
    pub(crate) fn check(&self, width: u32, height: u32) -> Result<(), RasterError> {
        if let Some(max_w) = self.max_width {
            if u64::from(width) > max_w {
                return Err(RasterError::LimitExceeded(alloc::format!(
                    "width {width} exceeds limit {max_w}"
                )));
            }
        }
        if let Some(max_h) = self.max_height {
            if u64::from(height) > max_h {
                return Err(RasterError::LimitExceeded(alloc::format!(
                    "height {height} exceeds limit {max_h}"
                )));
            }
        }
        if let Some(max_px) = self.max_pixels {
            let pixels = u64::from(width) * u64::from(height);
            if pixels > max_px {
                return Err(RasterError::LimitExceeded(alloc::format!(
                    "pixel count {pixels} exceeds limit {max_px}"
                )));
            }
        }
        Ok(())
    }

    /// Check that an allocation size is within memory limits.
    pub(crate) fn check_memory(&self, bytes: usize) -> Result<(), RasterError> {
        if let Some(max_mem) = self.max_memory_bytes {
            if bytes as u64 > max_mem {
                return Err(RasterError::LimitExceeded(alloc::format!(
                    "allocation {bytes} bytes exceeds memory limit {max_mem}"
                )));
            }
        }
        Ok(())
    }

    /// Check both dimensions and the buffer size for `bytes_per_pixel`.
    pub(crate) fn check_frame(
        &self,
        width: u32,
        height: u32,
        bytes_per_pixel: usize,
    ) -> Result<(), RasterError> {
        self.check(width, height)?;
        let bytes = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(bytes_per_pixel))
            .ok_or(RasterError::DimensionsTooLarge { width, height })?;
        self.check_memory(bytes)
    }
}

/// Pixels and bytes reserved so far by one decode call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Allocation {
    pixels: u64,
    bytes: u64,
}

impl Limits {
    /// Check one more `width` x `height` buffer against the limits and the
    /// running total in `used`, then add it to `used`.
    pub(crate) fn reserve(
        &self,
        used: &mut Allocation,
        width: u32,
        height: u32,
        bytes_per_pixel: usize,
    ) -> Result<(), RasterError> {
        self.check_frame(width, height, bytes_per_pixel)?;
        let frame_pixels = u64::from(width) * u64::from(height);
        let pixels = used.pixels.saturating_add(frame_pixels);
        let bytes = used
            .bytes
            .saturating_add(frame_pixels.saturating_mul(bytes_per_pixel as u64));
        if let Some(max_px) = self.max_pixels {
            if pixels > max_px {
                return Err(RasterError::LimitExceeded(alloc::format!(
                    "total pixel count {pixels} exceeds limit {max_px}"
                )));
            }
        }
        if let Some(max_mem) = self.max_memory_bytes {
            if bytes > max_mem {
                return Err(RasterError::LimitExceeded(alloc::format!(
                    "total allocation {bytes} bytes exceeds memory limit {max_mem}"
                )));
            }
        }
        *used = Allocation { pixels, bytes };
        Ok(())
    }
}
