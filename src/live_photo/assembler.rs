use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info, warn};

use crate::audio::{extract_to_wav, AudioAsset};
use crate::config::{Config, LivePhotoConfig, PathsConfig};
use crate::error::{AssemblyError, Result};
use crate::frame::ImageBatch;
use crate::live_photo::workspace::{allocate_output_dir, ScopedTempDir};
use crate::video::{FfmpegEncoder, MediaEncoder, TranscodeJob};

const KEY_PHOTO: &str = "key_photo.jpg";
const TEMP_VIDEO: &str = "temp_video.mp4";
const AUDIO: &str = "audio.wav";
const FINAL_VIDEO: &str = "video.mov";

/// Everything the live photo node hands to the assembler
#[derive(Debug, Clone)]
pub struct LivePhotoRequest {
    /// Frames of the clip, in playback order
    pub images: ImageBatch,

    /// Frame used as the still; out-of-range values fall back to the last frame
    pub key_frame_index: usize,

    /// Length of the delivered video in seconds
    pub duration: f64,

    /// Frame rate of `images`
    pub fps: f64,

    /// Optional soundtrack
    pub audio: Option<AudioAsset>,
}

/// A finished still + video pair
#[derive(Debug, Clone)]
pub struct LivePhotoOutput {
    /// The key frame as a one-frame batch
    pub photo: ImageBatch,

    /// `<output_dir>/IMG.JPG`
    pub photo_path: PathBuf,

    /// `<output_dir>/IMG.MOV`
    pub video_path: PathBuf,

    /// Timestamped directory holding both files
    pub output_dir: PathBuf,

    /// Whether a soundtrack made it into the video
    pub had_audio: bool,
}

/// Assembles Live Photo pairs from frame batches
///
/// The pipeline is linear:
/// 1. Scratch directory - a uniquely named working directory
/// 2. Key frame - exported as a JPEG still
/// 3. Intermediate video - every frame encoded at the requested rate
/// 4. Audio - optional, failures here only drop the soundtrack
/// 5. Final video - trimmed, scaled and re-encoded by the external encoder
/// 6. Delivery - both files copied into a fresh timestamped directory
///
/// Any failure removes the scratch directory and aborts the whole run.
pub struct LivePhotoAssembler {
    config: LivePhotoConfig,
    paths: PathsConfig,
    encoder: Box<dyn MediaEncoder>,
}

impl LivePhotoAssembler {
    /// Create an assembler that encodes with the configured ffmpeg binary
    pub fn new(config: &Config) -> Self {
        let encoder = FfmpegEncoder::new(
            config.ffmpeg.clone(),
            config.live_photo.intermediate_codec.clone(),
        );
        Self::with_encoder(config, Box::new(encoder))
    }

    /// Create an assembler with a custom encoder
    pub fn with_encoder(config: &Config, encoder: Box<dyn MediaEncoder>) -> Self {
        Self {
            config: config.live_photo.clone(),
            paths: config.paths.clone(),
            encoder,
        }
    }

    /// Build the live photo pair described by `request`
    pub fn create(&self, request: LivePhotoRequest) -> Result<LivePhotoOutput> {
        self.validate(&request)?;

        info!(
            "Creating live photo from {} frames ({:.1}s @ {} fps, encoder: {})",
            request.images.len(), request.duration, request.fps, self.encoder.name()
        );

        // Step 1: scratch directory, removed on every early return below
        let scratch = ScopedTempDir::create(&self.paths.temp_root, &self.config.temp_prefix)?;

        let output = self.run(&scratch, &request).map_err(|e| {
            warn!("Live photo assembly failed, discarding {:?}: {}", scratch.path(), e);
            e
        })?;

        if self.config.keep_temp_on_success {
            let kept = scratch.persist();
            debug!("Keeping scratch directory {:?}", kept);
        }

        info!("Live photo saved to {:?}", output.output_dir);
        Ok(output)
    }

    fn validate(&self, request: &LivePhotoRequest) -> Result<()> {
        if request.images.is_empty() {
            return Err(AssemblyError::EmptyBatch.into());
        }

        if !request.fps.is_finite() || request.fps <= 0.0 {
            return Err(AssemblyError::InvalidParameters {
                details: format!("fps must be positive, got {}", request.fps),
            }.into());
        }

        if !request.duration.is_finite() || request.duration <= 0.0 {
            return Err(AssemblyError::InvalidParameters {
                details: format!("duration must be positive, got {}", request.duration),
            }.into());
        }

        Ok(())
    }

    fn run(&self, scratch: &ScopedTempDir, request: &LivePhotoRequest) -> Result<LivePhotoOutput> {
        let images = &request.images;

        // Step 2: key frame still
        let key_index = clamp_key_frame(request.key_frame_index, images.len());
        if key_index != request.key_frame_index {
            debug!("Key frame index {} out of range, using {}", request.key_frame_index, key_index);
        }

        let photo = images
            .slice(key_index..key_index + 1)
            .ok_or(AssemblyError::EmptyBatch)?;
        let key_photo = scratch.join(KEY_PHOTO);
        if let Some(frame) = photo.first() {
            frame.save_jpeg(&key_photo, self.config.jpeg_quality)?;
        }
        debug!("Saved key frame {} to {:?}", key_index, key_photo);

        // Step 3: intermediate video of every frame
        let temp_video = scratch.join(TEMP_VIDEO);
        self.encoder.encode_frames(images, request.fps, &temp_video)?;

        // Step 4: optional soundtrack
        let audio = request
            .audio
            .as_ref()
            .and_then(|asset| self.extract_audio(asset, &scratch.join(AUDIO)));

        // Step 5: final container
        let final_video = scratch.join(FINAL_VIDEO);
        let job = TranscodeJob {
            input_video: temp_video,
            audio,
            duration: request.duration,
            output: final_video.clone(),
        };
        self.encoder.transcode(&job)?;

        // Step 6: delivery
        let output_dir = allocate_output_dir(
            &self.paths.output_root,
            &self.config.output_prefix,
            Local::now(),
        )?;
        let photo_path = output_dir.join(&self.config.photo_name);
        let video_path = output_dir.join(&self.config.video_name);

        std::fs::copy(&key_photo, &photo_path)?;
        std::fs::copy(&final_video, &video_path)?;

        for path in [&photo_path, &video_path] {
            if !path.exists() {
                return Err(AssemblyError::MissingOutput {
                    path: path.display().to_string(),
                }.into());
            }
        }

        Ok(LivePhotoOutput {
            photo,
            photo_path,
            video_path,
            output_dir,
            had_audio: job.audio.is_some(),
        })
    }

    /// Write the soundtrack next to the intermediate video
    ///
    /// Returns `None` on any failure; the video is then produced silently.
    fn extract_audio(&self, asset: &AudioAsset, dest: &Path) -> Option<PathBuf> {
        match extract_to_wav(asset, dest, self.config.default_sample_rate) {
            Ok(()) => {
                debug!("Extracted audio via {} to {:?}", asset.capability(), dest);
                Some(dest.to_path_buf())
            }
            Err(e) => {
                warn!("Failed to process audio, continuing without audio: {}", e);
                None
            }
        }
    }
}

/// Index of the key frame, falling back to the last frame when out of range
pub fn clamp_key_frame(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}
