//! Post-decode resampling.
//!
//! Filters operate on [`Pixel::to_normalized`] vectors, so the same code
//! serves every representation and precision is only lost once, when the
//! result is converted back.

use enough::Stop;

use crate::buffer::PixelBuffer;
use crate::error::RasterError;
use crate::pixel::{Pixel, Vec4};

/// Resampling filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ResizeFilter {
    /// Nearest source pixel; keeps hard edges.
    Nearest,
    /// Weighted average of the four surrounding pixels.
    #[default]
    Bilinear,
}

/// Resample `src` to `width` × `height`. `stop` is checked every 16 output rows.
pub fn resize<P: Pixel>(
    src: &PixelBuffer<P>,
    width: u32,
    height: u32,
    filter: ResizeFilter,
    stop: &dyn Stop,
) -> Result<PixelBuffer<P>, RasterError> {
    if width == 0 || height == 0 {
        return Err(RasterError::InvalidArgument(alloc::format!(
            "resize target {width}x{height}"
        )));
    }
    if (width, height) == (src.width(), src.height()) {
        return Ok(src.clone());
    }
    let mut dst = PixelBuffer::<P>::new(width, height)?;
    match filter {
        ResizeFilter::Nearest => nearest(src, &mut dst, stop)?,
        ResizeFilter::Bilinear => bilinear(src, &mut dst, stop)?,
    }
    Ok(dst)
}

/// Source coordinate of the center of destination sample `d`.
#[inline]
fn nearest_index(d: u32, ratio: f32, src_len: u32) -> u32 {
    let s = (d as f32 + 0.5) * ratio;
    (s as u32).min(src_len - 1)
}

fn nearest<P: Pixel>(
    src: &PixelBuffer<P>,
    dst: &mut PixelBuffer<P>,
    stop: &dyn Stop,
) -> Result<(), RasterError> {
    let (dw, dh) = (dst.width(), dst.height());
    let x_ratio = src.width() as f32 / dw as f32;
    let y_ratio = src.height() as f32 / dh as f32;

    for y in 0..dh {
        if y % 16 == 0 {
            stop.check()?;
        }
        let sy = nearest_index(y, y_ratio, src.height());
        let src_row = src
            .row(sy)
            .ok_or_else(|| RasterError::CorruptData(alloc::format!("source row {sy}")))?;
        let out = dst.row_window_mut(y, 0, dw)?;
        for (x, px) in out.iter_mut().enumerate() {
            let sx = nearest_index(x as u32, x_ratio, src.width()) as usize;
            *px = src_row.get(sx).copied().unwrap_or_default();
        }
    }
    Ok(())
}

#[inline]
fn lerp(a: Vec4, b: Vec4, t: f32) -> Vec4 {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Corner-aligned sample positions: `(index0, index1, fraction)`.
#[inline]
fn bilinear_taps(d: u32, ratio: f32, src_len: u32) -> (usize, usize, f32) {
    let s = d as f32 * ratio;
    let i0 = (s as u32).min(src_len - 1);
    let i1 = (i0 + 1).min(src_len - 1);
    (i0 as usize, i1 as usize, s - i0 as f32)
}

fn bilinear<P: Pixel>(
    src: &PixelBuffer<P>,
    dst: &mut PixelBuffer<P>,
    stop: &dyn Stop,
) -> Result<(), RasterError> {
    let (sw, sh) = (src.width(), src.height());
    let (dw, dh) = (dst.width(), dst.height());
    let x_ratio = if dw > 1 { (sw - 1) as f32 / (dw - 1) as f32 } else { 0.0 };
    let y_ratio = if dh > 1 { (sh - 1) as f32 / (dh - 1) as f32 } else { 0.0 };
    let pixels = src.pixels();
    let at = |x: usize, y: usize| {
        pixels
            .get(y * sw as usize + x)
            .copied()
            .unwrap_or_default()
            .to_normalized()
    };

    for y in 0..dh {
        if y % 16 == 0 {
            stop.check()?;
        }
        let (y0, y1, fy) = bilinear_taps(y, y_ratio, sh);
        let out = dst.row_window_mut(y, 0, dw)?;
        for (x, px) in out.iter_mut().enumerate() {
            let (x0, x1, fx) = bilinear_taps(x as u32, x_ratio, sw);
            let top = lerp(at(x0, y0), at(x1, y0), fx);
            let bottom = lerp(at(x0, y1), at(x1, y1), fx);
            *px = P::from_normalized(lerp(top, bottom, fy));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Region;
    use enough::Unstoppable;
    use rgb::{Gray, Rgba};

    fn gray_ramp(width: u32, height: u32) -> PixelBuffer<Gray<u8>> {
        let mut buf = PixelBuffer::new(width, height).unwrap();
        for y in 0..height {
            let row = buf.row_window_mut(y, 0, width).unwrap();
            for (x, px) in row.iter_mut().enumerate() {
                *px = Gray::new((x as u32 * 10 + y) as u8);
            }
        }
        buf
    }

    #[test]
    fn target_size_is_honored() {
        let src = gray_ramp(5, 3);
        for filter in [ResizeFilter::Nearest, ResizeFilter::Bilinear] {
            let out = resize(&src, 11, 2, filter, &Unstoppable).unwrap();
            assert_eq!((out.width(), out.height()), (11, 2));
        }
    }

    #[test]
    fn solid_color_stays_solid() {
        let mut src = PixelBuffer::<Rgba<u8>>::new(7, 5).unwrap();
        for y in 0..5 {
            src.row_window_mut(y, 0, 7)
                .unwrap()
                .fill(Rgba::new(12, 200, 99, 255));
        }
        for filter in [ResizeFilter::Nearest, ResizeFilter::Bilinear] {
            let out = resize(&src, 3, 9, filter, &Unstoppable).unwrap();
            assert!(out.pixels().iter().all(|p| *p == Rgba::new(12, 200, 99, 255)));
        }
    }

    #[test]
    fn nearest_integer_upscale_duplicates() {
        let src = gray_ramp(2, 1);
        let out = resize(&src, 4, 2, ResizeFilter::Nearest, &Unstoppable).unwrap();
        let values: alloc::vec::Vec<u8> = out.pixels().iter().map(|g| g.value()).collect();
        assert_eq!(values, [0, 0, 10, 10, 0, 0, 10, 10]);
    }

    #[test]
    fn bilinear_keeps_corners_and_interpolates() {
        let mut src = PixelBuffer::<Gray<u8>>::new(2, 1).unwrap();
        src.row_window_mut(0, 0, 2)
            .unwrap()
            .copy_from_slice(&[Gray::new(0), Gray::new(200)]);
        let out = resize(&src, 3, 1, ResizeFilter::Bilinear, &Unstoppable).unwrap();
        let values: alloc::vec::Vec<u8> = out.pixels().iter().map(|g| g.value()).collect();
        assert_eq!(values, [0, 100, 200]);
    }

    #[test]
    fn same_size_is_a_copy() {
        let src = gray_ramp(4, 4);
        let out = resize(&src, 4, 4, ResizeFilter::Bilinear, &Unstoppable).unwrap();
        assert_eq!(out.pixels(), src.pixels());
        assert!(src.check_region(Region::full(4, 4)).is_ok());
    }

    #[test]
    fn zero_target_rejected() {
        let src = gray_ramp(2, 2);
        assert!(matches!(
            resize(&src, 0, 2, ResizeFilter::Nearest, &Unstoppable),
            Err(RasterError::InvalidArgument(_))
        ));
    }
}
