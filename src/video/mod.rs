//! # Video Encoding
//!
//! The seam to the external encoder. [`MediaEncoder`] is what the live photo
//! assembler talks to; [`FfmpegEncoder`] implements it by shelling out to the
//! `ffmpeg` binary.

pub mod encoder;
pub mod ffmpeg;

pub use encoder::{uniform_size, MediaEncoder, TranscodeJob};
pub use ffmpeg::FfmpegEncoder;
