use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for the Live Photo nodes
///
/// Passed explicitly into every component; nothing reads configuration from
/// global state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Live photo assembly settings
    pub live_photo: LivePhotoConfig,

    /// External encoder settings
    pub ffmpeg: FfmpegConfig,

    /// Wipe transition settings
    pub transition: TransitionConfig,

    /// Host-managed directory roots
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.live_photo.validate()?;
        self.ffmpeg.validate()?;
        self.transition.validate()?;
        Ok(())
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Live photo assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LivePhotoConfig {
    /// Frame rate offered by the node when none is given
    pub default_fps: f64,

    /// Duration offered by the node when none is given (seconds)
    pub default_duration: f64,

    /// Shortest allowed clip duration (seconds)
    pub min_duration: f64,

    /// Longest allowed clip duration (seconds)
    pub max_duration: f64,

    /// JPEG quality of the exported key frame (1-100)
    pub jpeg_quality: u8,

    /// Codec used for the intermediate video written from raw frames
    pub intermediate_codec: String,

    /// Canonical basename of the still half of the pair
    pub photo_name: String,

    /// Canonical basename of the video half of the pair
    pub video_name: String,

    /// Prefix of per-invocation scratch directories
    pub temp_prefix: String,

    /// Prefix of timestamped result directories
    pub output_prefix: String,

    /// Leave the scratch directory behind after a successful run
    pub keep_temp_on_success: bool,

    /// Sample rate assumed for raw audio arrays without one
    pub default_sample_rate: u32,

    /// File extensions the previewer treats as playable video
    pub supported_video_formats: Vec<String>,
}

impl Default for LivePhotoConfig {
    fn default() -> Self {
        Self {
            default_fps: 30.0,
            default_duration: 3.0,
            min_duration: 1.0,
            max_duration: 5.0,
            jpeg_quality: 95,
            intermediate_codec: "mpeg4".to_string(),
            photo_name: "IMG.JPG".to_string(),
            video_name: "IMG.MOV".to_string(),
            temp_prefix: "live_photo_".to_string(),
            output_prefix: "livephoto_".to_string(),
            keep_temp_on_success: false,
            default_sample_rate: 44100,
            supported_video_formats: ["mp4", "mov", "avi", "mkv"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl LivePhotoConfig {
    fn validate(&self) -> Result<()> {
        if self.min_duration <= 0.0 || self.max_duration <= self.min_duration {
            return Err(invalid(
                "live_photo.duration_range",
                format!("{}-{}", self.min_duration, self.max_duration),
            ).into());
        }

        if !(self.min_duration..=self.max_duration).contains(&self.default_duration) {
            return Err(invalid("live_photo.default_duration", self.default_duration).into());
        }

        if self.default_fps <= 0.0 {
            return Err(invalid("live_photo.default_fps", self.default_fps).into());
        }

        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(invalid("live_photo.jpeg_quality", self.jpeg_quality).into());
        }

        if self.photo_name.is_empty() || self.video_name.is_empty() {
            return Err(invalid(
                "live_photo.basenames",
                format!("{}/{}", self.photo_name, self.video_name),
            ).into());
        }

        if self.default_sample_rate == 0 {
            return Err(invalid("live_photo.default_sample_rate", self.default_sample_rate).into());
        }

        Ok(())
    }
}

/// External encoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegConfig {
    /// Encoder binary, looked up on PATH when relative
    pub binary: PathBuf,

    /// Video codec of the final container
    pub video_codec: String,

    /// Audio codec used when a waveform is muxed in
    pub audio_codec: String,

    /// Argument of the scale filter (width:height, -1 keeps aspect)
    pub scale: String,

    /// Pass `-strict experimental` to the final encode
    pub strict_experimental: bool,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            video_codec: "h264".to_string(),
            audio_codec: "aac".to_string(),
            scale: "720:-1".to_string(),
            strict_experimental: true,
        }
    }
}

impl FfmpegConfig {
    fn validate(&self) -> Result<()> {
        if self.binary.as_os_str().is_empty() {
            return Err(invalid("ffmpeg.binary", "").into());
        }

        if !self.scale.contains(':') {
            return Err(invalid("ffmpeg.scale", &self.scale).into());
        }

        Ok(())
    }
}

/// Wipe transition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub default_frames: u32,
    pub min_frames: u32,
    pub max_frames: u32,
    pub default_fps: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            default_frames: 30,
            min_frames: 2,
            max_frames: 120,
            default_fps: 8.0,
        }
    }
}

impl TransitionConfig {
    fn validate(&self) -> Result<()> {
        // A single frame has no progress denominator
        if self.min_frames < 2 || self.max_frames < self.min_frames {
            return Err(invalid(
                "transition.frame_range",
                format!("{}-{}", self.min_frames, self.max_frames),
            ).into());
        }

        if !(self.min_frames..=self.max_frames).contains(&self.default_frames) {
            return Err(invalid("transition.default_frames", self.default_frames).into());
        }

        Ok(())
    }
}

/// Host-managed directory roots
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root under which timestamped result directories are created
    pub output_root: PathBuf,

    /// Root under which scratch directories are created
    pub temp_root: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("output"),
            temp_root: std::env::temp_dir(),
        }
    }
}
