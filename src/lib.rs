//! # livephoto-nodes
//!
//! Graph nodes for building Live Photo style still + video pairs from image
//! batches, previewing them, and synthesizing before/after wipe transitions.
//!
//! This library provides the three nodes, the registry a host uses to
//! discover them, and the building blocks they are made of.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use livephoto_nodes::{
//!     config::Config,
//!     frame::{Frame, ImageBatch},
//!     nodes::{NodeInputs, NodeRegistry, NodeValue},
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let registry = NodeRegistry::new(&config);
//!
//! let frames = (0..30).map(|_| Frame::filled(480, 640, &[0.2, 0.4, 0.6])).collect();
//! let inputs = NodeInputs::new()
//!     .with("images", NodeValue::Image(ImageBatch::new(frames)?))
//!     .with("key_frame_index", NodeValue::Int(15))
//!     .with("duration", NodeValue::Float(3.0))
//!     .with("fps", NodeValue::Float(30.0));
//!
//! let creator = registry.create("LivePhotoCreator")?;
//! let output = creator.invoke(&inputs)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`nodes`] - Node schemas, values and the registry
//! - [`live_photo`] - Still + video pair assembly
//! - [`transition`] - Wipe transition synthesis
//! - [`preview`] - Video path resolution and UI payloads
//! - [`frame`] - Image batches and resizing
//! - [`audio`] - Audio capabilities and WAV extraction
//! - [`video`] - External encoder seam
//! - [`config`] - Configuration management
//!
//! ## External Tools
//!
//! Video encoding needs the `ffmpeg` binary; [`check_dependencies`] reports
//! whether it can be run.

pub mod audio;
pub mod config;
pub mod error;
pub mod frame;
pub mod live_photo;
pub mod nodes;
pub mod preview;
pub mod transition;
pub mod video;

use tracing::warn;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{LivePhotoError, Result},
    frame::{Frame, ImageBatch},
    live_photo::{LivePhotoAssembler, LivePhotoOutput, LivePhotoRequest},
    nodes::{Node, NodeInputs, NodeOutput, NodeRegistry, NodeValue},
    preview::{PairPreviewer, PreviewInput, PreviewPayload},
    transition::WipeTransition,
};

/// Version reported when the nodes are loaded
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Missing external tools, as human-readable names
///
/// An empty list means every dependency is available.
pub fn check_dependencies(config: &Config) -> Vec<String> {
    let mut missing = Vec::new();

    let encoder = video::FfmpegEncoder::new(
        config.ffmpeg.clone(),
        config.live_photo.intermediate_codec.clone(),
    );
    if !encoder.is_available() {
        warn!("{} could not be run", config.ffmpeg.binary.display());
        missing.push(format!("ffmpeg ({})", config.ffmpeg.binary.display()));
    }

    missing
}
