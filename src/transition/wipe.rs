use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::TransitionConfig;
use crate::error::{Result, TransitionError};
use crate::frame::{resize_to_fit, Frame, ImageBatch};

/// Hard vertical wipe between two still images
///
/// Produces `frames` composites. In frame `i` the boundary sits at column
/// `floor(i / (frames - 1) * width)`: everything left of it shows the second
/// image, everything from it onward still shows the first. Frame 0 is the
/// first image and the last frame is the second.
pub struct WipeTransition {
    min_frames: u32,
    max_frames: u32,
}

impl WipeTransition {
    pub fn new(config: &TransitionConfig) -> Self {
        Self {
            min_frames: config.min_frames,
            max_frames: config.max_frames,
        }
    }

    /// Synthesize the wipe sequence
    ///
    /// `fps` is carried for logging only; the timing of the sequence is the
    /// consumer's business.
    pub fn synthesize(
        &self,
        image1: &ImageBatch,
        image2: &ImageBatch,
        frames: u32,
        fps: f64,
    ) -> Result<ImageBatch> {
        if !(self.min_frames..=self.max_frames).contains(&frames) {
            return Err(TransitionError::FrameCount {
                frames,
                min: self.min_frames,
                max: self.max_frames,
            }.into());
        }

        let first = image1.first().ok_or_else(|| TransitionError::EmptyInput {
            which: "image1".to_string(),
        })?;
        let second = image2.first().ok_or_else(|| TransitionError::EmptyInput {
            which: "image2".to_string(),
        })?;

        debug!("Input image1 shape: {:?}", shape(first));
        debug!("Input image2 shape: {:?}", shape(second));

        let (start, end) = reconcile(first, second)?;
        let (_, width) = start.dims();

        let mut sequence: Vec<Frame> = (0..frames)
            .into_par_iter()
            .map(|i| {
                let mut frame = start.clone();
                frame.copy_columns_from(&end, 0..split_column(i, frames, width));
                frame
            })
            .collect();

        for frame in &mut sequence {
            frame.clamp_unit();
        }

        info!(
            "Synthesized {} wipe frames at {}x{} ({} fps)",
            sequence.len(), width, start.height(), fps
        );

        ImageBatch::new(sequence)
    }
}

/// Column where the boundary sits in frame `index` of `frames`
pub fn split_column(index: u32, frames: u32, width: usize) -> usize {
    let progress = index as f64 / (frames - 1) as f64;
    ((progress * width as f64).floor() as usize).min(width)
}

/// Bring both frames to the smallest shared height and width
///
/// Each input that differs from the target is scaled to fit inside it; an
/// input whose aspect ratio leaves it short on one side is anchored top-left
/// on a black canvas so both frames index the same columns. Channel counts
/// are aligned by dropping to the smaller count.
fn reconcile(first: &Frame, second: &Frame) -> Result<(Frame, Frame)> {
    let target_h = first.height().min(second.height());
    let target_w = first.width().min(second.width());

    let fit = |frame: &Frame| -> Result<Frame> {
        if frame.dims() == (target_h, target_w) {
            Ok(frame.clone())
        } else {
            Ok(resize_to_fit(frame, target_h, target_w)?.pad_to(target_h, target_w))
        }
    };

    let (a, b) = (fit(first)?, fit(second)?);
    let channels = a.channels().min(b.channels());
    Ok((take_channels(a, channels), take_channels(b, channels)))
}

fn take_channels(frame: Frame, channels: usize) -> Frame {
    if frame.channels() == channels {
        return frame;
    }
    let (h, w) = frame.dims();
    Frame::from_fn(h, w, channels, |y, x, c| frame.get(y, x, c))
}

fn shape(frame: &Frame) -> (usize, usize, usize) {
    (frame.height(), frame.width(), frame.channels())
}
