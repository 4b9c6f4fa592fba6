use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgba};
use tracing::debug;

use crate::error::{FrameError, Result};
use crate::frame::types::Frame;

/// Bilinear resampling through `image`'s triangle filter
///
/// Sample centres sit at half-pixel offsets. When downscaling the filter
/// widens with the ratio, so every covered source pixel contributes.
/// Results are clipped to [0, 1].
pub fn resize_bilinear(frame: &Frame, new_height: usize, new_width: usize) -> Result<Frame> {
    if frame.dims() == (new_height, new_width) {
        return Ok(frame.clone());
    }

    match frame.channels() {
        1 => resample::<Luma<f32>>(frame, new_height, new_width),
        2 => resample::<LumaA<f32>>(frame, new_height, new_width),
        3 => resample::<Rgb<f32>>(frame, new_height, new_width),
        4 => resample::<Rgba<f32>>(frame, new_height, new_width),
        _ => resample_planes(frame, new_height, new_width),
    }
}

/// Resize through an `ImageBuffer` whose pixel type matches the channel count
fn resample<P>(frame: &Frame, new_height: usize, new_width: usize) -> Result<Frame>
where
    P: Pixel<Subpixel = f32> + 'static,
{
    let (height, width) = frame.dims();
    let buffer: ImageBuffer<P, Vec<f32>> =
        ImageBuffer::from_raw(width as u32, height as u32, frame.as_slice().to_vec()).ok_or_else(
            || FrameError::InvalidDimensions {
                details: format!("{}x{}x{} buffer", height, width, frame.channels()),
            },
        )?;

    let resized = imageops::resize(&buffer, new_width as u32, new_height as u32, FilterType::Triangle);
    Frame::new(new_height, new_width, frame.channels(), resized.into_raw())
}

/// Resize each channel as its own grey plane
fn resample_planes(frame: &Frame, new_height: usize, new_width: usize) -> Result<Frame> {
    let (height, width) = frame.dims();
    let planes = (0..frame.channels())
        .map(|c| {
            let plane = Frame::from_fn(height, width, 1, |y, x, _| frame.get(y, x, c));
            resample::<Luma<f32>>(&plane, new_height, new_width)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Frame::from_fn(new_height, new_width, planes.len(), |y, x, c| {
        planes[c].get(y, x, 0)
    }))
}

/// Uniform scale factor that fits `(height, width)` inside the target box
pub fn fit_scale(height: usize, width: usize, target_height: usize, target_width: usize) -> f64 {
    (target_height as f64 / height as f64).min(target_width as f64 / width as f64)
}

/// Scale a frame proportionally so it fits inside the target box
///
/// Aspect ratio is preserved and nothing is cropped, so one side may come
/// out shorter than the target.
pub fn resize_to_fit(frame: &Frame, target_height: usize, target_width: usize) -> Result<Frame> {
    let (h, w) = frame.dims();
    let scale = fit_scale(h, w, target_height, target_width);

    // Nudge before flooring so an exact ratio such as 3 * (2/3) lands on 2
    let new_h = ((h as f64 * scale + 1e-9).floor() as usize).max(1);
    let new_w = ((w as f64 * scale + 1e-9).floor() as usize).max(1);

    debug!("Resizing {}x{} -> {}x{} (scale {:.4})", h, w, new_h, new_w, scale);
    resize_bilinear(frame, new_h, new_w)
}
