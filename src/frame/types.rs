use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, Rgb, RgbImage};

use crate::error::{FrameError, Result};

/// A single image sample
///
/// Samples are stored row-major as `height × width × channels` floats with a
/// nominal range of [0, 1], the layout the host hands to nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<f32>,
}

impl Frame {
    /// Create a frame from raw samples, checking the buffer length
    pub fn new(height: usize, width: usize, channels: usize, data: Vec<f32>) -> Result<Self> {
        if height == 0 || width == 0 || channels == 0 {
            return Err(FrameError::InvalidDimensions {
                details: format!("{}x{}x{}", height, width, channels),
            }.into());
        }

        if data.len() != height * width * channels {
            return Err(FrameError::InvalidDimensions {
                details: format!(
                    "{} samples for {}x{}x{}",
                    data.len(), height, width, channels
                ),
            }.into());
        }

        Ok(Self { height, width, channels, data })
    }

    /// Create a frame filled with zeros
    pub fn zeros(height: usize, width: usize, channels: usize) -> Self {
        Self {
            height,
            width,
            channels,
            data: vec![0.0; height * width * channels],
        }
    }

    /// Create a frame whose samples are produced by `f(y, x, c)`
    pub fn from_fn<F>(height: usize, width: usize, channels: usize, f: F) -> Self
    where
        F: Fn(usize, usize, usize) -> f32,
    {
        let mut data = Vec::with_capacity(height * width * channels);
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    data.push(f(y, x, c));
                }
            }
        }
        Self { height, width, channels, data }
    }

    /// Create a frame with every pixel set to `color`
    pub fn filled(height: usize, width: usize, color: &[f32]) -> Self {
        Self::from_fn(height, width, color.len(), |_, _, c| color[c])
    }

    /// Build a frame from an 8-bit RGB raster
    pub fn from_rgb8(image: &RgbImage) -> Self {
        let data = image.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
        Self {
            height: image.height() as usize,
            width: image.width() as usize,
            channels: 3,
            data,
        }
    }

    /// Load an image file from disk as a 3-channel frame
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| FrameError::DecodeFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_rgb8(&image.to_rgb8()))
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(height, width)`
    pub fn dims(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Sample at row `y`, column `x`, channel `c`
    pub fn get(&self, y: usize, x: usize, c: usize) -> f32 {
        self.data[self.index(y, x) + c]
    }

    /// All channels of the pixel at row `y`, column `x`
    pub fn pixel(&self, y: usize, x: usize) -> &[f32] {
        let start = self.index(y, x);
        &self.data[start..start + self.channels]
    }

    pub fn pixel_mut(&mut self, y: usize, x: usize) -> &mut [f32] {
        let start = self.index(y, x);
        &mut self.data[start..start + self.channels]
    }

    fn index(&self, y: usize, x: usize) -> usize {
        (y * self.width + x) * self.channels
    }

    /// Overwrite the columns in `columns` with the same columns of `other`
    ///
    /// Both frames must share dimensions; the range is clipped to the width.
    pub fn copy_columns_from(&mut self, other: &Frame, columns: Range<usize>) {
        debug_assert_eq!(self.dims(), other.dims());
        debug_assert_eq!(self.channels, other.channels);

        let start = columns.start.min(self.width);
        let end = columns.end.min(self.width);
        if start >= end {
            return;
        }

        let row_len = self.width * self.channels;
        let (lo, hi) = (start * self.channels, end * self.channels);
        for y in 0..self.height {
            let row = y * row_len;
            self.data[row + lo..row + hi].copy_from_slice(&other.data[row + lo..row + hi]);
        }
    }

    /// Place `self` at the top-left of a zero canvas of the given size
    ///
    /// Content outside the canvas is discarded.
    pub fn pad_to(&self, height: usize, width: usize) -> Frame {
        if self.dims() == (height, width) {
            return self.clone();
        }

        let mut canvas = Frame::zeros(height, width, self.channels);
        for y in 0..self.height.min(height) {
            for x in 0..self.width.min(width) {
                canvas.pixel_mut(y, x).copy_from_slice(self.pixel(y, x));
            }
        }
        canvas
    }

    /// Clamp every sample into [0, 1]
    pub fn clamp_unit(&mut self) {
        for v in &mut self.data {
            *v = v.clamp(0.0, 1.0);
        }
    }

    /// Red, green and blue samples of a pixel, whatever the channel layout
    fn rgb_at(&self, y: usize, x: usize) -> [f32; 3] {
        let px = self.pixel(y, x);
        match self.channels {
            1 | 2 => [px[0], px[0], px[0]],
            _ => [px[0], px[1], px[2]],
        }
    }

    /// Convert to an 8-bit RGB raster for still export
    ///
    /// Samples are scaled by 255, clipped, then truncated. Grey frames are
    /// replicated across channels and alpha is dropped.
    pub fn to_rgb8(&self) -> RgbImage {
        ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            let [r, g, b] = self.rgb_at(y as usize, x as usize);
            Rgb([to_u8(r), to_u8(g), to_u8(b)])
        })
    }

    /// Row-major BGR24 bytes in the external encoder's channel order
    pub fn to_bgr24(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.height * self.width * 3);
        for y in 0..self.height {
            for x in 0..self.width {
                let [r, g, b] = self.rgb_at(y, x);
                out.extend_from_slice(&[to_u8(b), to_u8(g), to_u8(r)]);
            }
        }
        out
    }

    /// Save the frame as a JPEG with the given quality (1-100)
    pub fn save_jpeg<P: AsRef<Path>>(&self, path: P, quality: u8) -> Result<()> {
        let path = path.as_ref();
        let encode_err = |reason: String| FrameError::EncodeFailed {
            path: path.display().to_string(),
            reason,
        };

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let rgb = self.to_rgb8();
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality);
        encoder
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), image::ColorType::Rgb8)
            .map_err(|e| encode_err(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.to_rgb8().save(path).map_err(|e| FrameError::EncodeFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

fn to_u8(v: f32) -> u8 {
    (v * 255.0).clamp(0.0, 255.0) as u8
}

/// An ordered batch of frames sharing one channel count
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBatch {
    frames: Vec<Frame>,
}

impl ImageBatch {
    /// Create a batch, checking that all frames share a channel count
    pub fn new(frames: Vec<Frame>) -> Result<Self> {
        if let Some(first) = frames.first() {
            let expected = first.channels();
            if let Some(bad) = frames.iter().find(|f| f.channels() != expected) {
                return Err(FrameError::ChannelMismatch {
                    expected,
                    found: bad.channels(),
                }.into());
            }
        }
        Ok(Self { frames })
    }

    /// A batch holding exactly one frame
    pub fn single(frame: Frame) -> Self {
        Self { frames: vec![frame] }
    }

    /// Collapse a redundant leading batch dimension of size 1
    pub fn squeeze_leading(nested: &[ImageBatch]) -> Result<&ImageBatch> {
        match nested {
            [inner] => Ok(inner),
            _ => Err(FrameError::NotSqueezable { len: nested.len() }.into()),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn first(&self) -> Option<&Frame> {
        self.frames.first()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    /// Sub-batch over `range`, keeping batch dimensionality
    pub fn slice(&self, range: Range<usize>) -> Option<ImageBatch> {
        self.frames.get(range).map(|frames| Self { frames: frames.to_vec() })
    }

    /// Channel count shared by every frame, if the batch is non-empty
    pub fn channels(&self) -> Option<usize> {
        self.first().map(Frame::channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_rejects_wrong_length() {
        assert!(Frame::new(2, 2, 3, vec![0.0; 11]).is_err());
        assert!(Frame::new(2, 2, 3, vec![0.0; 12]).is_ok());
    }

    #[test]
    fn test_to_rgb8_clips_and_truncates() {
        let frame = Frame::new(1, 2, 3, vec![1.5, -0.2, 0.5, 1.0, 0.0, 0.999]).unwrap();
        let rgb = frame.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 0, 127]);
        assert_eq!(rgb.get_pixel(1, 0).0, [255, 0, 254]);
    }

    #[test]
    fn test_to_bgr24_swaps_channel_order() {
        let frame = Frame::filled(1, 2, &[1.0, 0.5, 0.0]);
        assert_eq!(frame.to_bgr24(), vec![0, 127, 255, 0, 127, 255]);
    }

    #[test]
    fn test_grey_frame_replicates_channels() {
        let frame = Frame::filled(1, 1, &[1.0]);
        assert_eq!(frame.to_bgr24(), vec![255, 255, 255]);
    }

    #[test]
    fn test_copy_columns_from() {
        let mut a = Frame::filled(2, 4, &[0.0]);
        let b = Frame::filled(2, 4, &[1.0]);
        a.copy_columns_from(&b, 0..2);
        assert_eq!(a.get(0, 0, 0), 1.0);
        assert_eq!(a.get(1, 1, 0), 1.0);
        assert_eq!(a.get(0, 2, 0), 0.0);
        assert_eq!(a.get(1, 3, 0), 0.0);

        // Out-of-range columns are clipped rather than panicking
        a.copy_columns_from(&b, 3..10);
        assert_eq!(a.get(0, 3, 0), 1.0);
    }

    #[test]
    fn test_pad_to_places_top_left() {
        let frame = Frame::filled(1, 2, &[1.0]);
        let padded = frame.pad_to(2, 3);
        assert_eq!(padded.dims(), (2, 3));
        assert_eq!(padded.get(0, 1, 0), 1.0);
        assert_eq!(padded.get(0, 2, 0), 0.0);
        assert_eq!(padded.get(1, 0, 0), 0.0);
    }

    #[test]
    fn test_batch_channel_invariant() {
        let result = ImageBatch::new(vec![Frame::zeros(1, 1, 3), Frame::zeros(1, 1, 1)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_slice_keeps_batch_dimension() {
        let batch = ImageBatch::new(vec![
            Frame::filled(1, 1, &[0.1]),
            Frame::filled(1, 1, &[0.2]),
            Frame::filled(1, 1, &[0.3]),
        ]).unwrap();

        let slice = batch.slice(1..2).unwrap();
        assert_eq!(slice.len(), 1);
        assert_eq!(slice.first().unwrap().get(0, 0, 0), 0.2);
        assert!(batch.slice(3..4).is_none());
    }

    #[test]
    fn test_squeeze_leading() {
        let inner = ImageBatch::single(Frame::zeros(1, 1, 3));
        let nested = vec![inner.clone()];
        assert_eq!(ImageBatch::squeeze_leading(&nested).unwrap(), &inner);
        assert!(ImageBatch::squeeze_leading(&[inner.clone(), inner]).is_err());
        assert!(ImageBatch::squeeze_leading(&[]).is_err());
    }

    #[test]
    fn test_jpeg_and_png_export() {
        let dir = tempdir().unwrap();
        let frame = Frame::filled(8, 8, &[0.2, 0.4, 0.6]);

        let jpg = dir.path().join("still.jpg");
        frame.save_jpeg(&jpg, 95).unwrap();
        let png = dir.path().join("still.png");
        frame.save_png(&png).unwrap();

        let reloaded = Frame::open(&png).unwrap();
        assert_eq!(reloaded.dims(), (8, 8));
        assert!((reloaded.get(3, 3, 2) - 0.6).abs() < 1.0 / 255.0 + 1e-6);
        assert!(image::open(&jpg).is_ok());
    }
}
