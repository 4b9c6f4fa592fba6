use std::path::{Path, PathBuf};

use crate::error::{Result, VideoError};
use crate::frame::ImageBatch;

/// Final re-encode of the intermediate video into the delivered container
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeJob {
    /// Intermediate video written from the frame batch
    pub input_video: PathBuf,

    /// Waveform to mux in, when one was extracted
    pub audio: Option<PathBuf>,

    /// Output duration in seconds
    pub duration: f64,

    /// Destination container
    pub output: PathBuf,
}

/// The external video encoder as seen by the assembler
///
/// Both operations block until the encoder is done. Implementations must
/// leave a complete file at the output path or return an error.
pub trait MediaEncoder: Send + Sync {
    /// Human-readable encoder name for logs
    fn name(&self) -> &str;

    /// Encode every frame of `frames`, in order, at `fps` into `output`
    fn encode_frames(&self, frames: &ImageBatch, fps: f64, output: &Path) -> Result<()>;

    /// Re-encode according to `job`
    fn transcode(&self, job: &TranscodeJob) -> Result<()>;
}

/// Shared frame size of a batch, failing on the first frame that differs
pub fn uniform_size(frames: &ImageBatch) -> Result<(usize, usize)> {
    let first = frames.first().ok_or_else(|| VideoError::EncodingFailed {
        reason: "no frames to encode".to_string(),
    })?;
    let (height, width) = first.dims();

    for (index, frame) in frames.iter().enumerate() {
        let (found_height, found_width) = frame.dims();
        if (found_height, found_width) != (height, width) {
            return Err(VideoError::FrameSizeMismatch {
                index,
                width,
                height,
                found_width,
                found_height,
            }.into());
        }
    }

    Ok((height, width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;

    #[test]
    fn test_uniform_size() {
        let batch = ImageBatch::new(vec![Frame::zeros(4, 6, 3), Frame::zeros(4, 6, 3)]).unwrap();
        assert_eq!(uniform_size(&batch).unwrap(), (4, 6));
    }

    #[test]
    fn test_uniform_size_reports_mismatch() {
        let batch = ImageBatch::new(vec![Frame::zeros(4, 6, 3), Frame::zeros(4, 8, 3)]).unwrap();
        let err = uniform_size(&batch).unwrap_err();
        assert!(err.to_string().contains("Frame 1 is 8x4"));
    }

    #[test]
    fn test_uniform_size_rejects_empty() {
        let batch = ImageBatch::new(vec![]).unwrap();
        assert!(uniform_size(&batch).is_err());
    }
}
