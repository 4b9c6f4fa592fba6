//! # Audio Capabilities
//!
//! The optional audio input of the live photo node. An asset is one of a
//! fixed set of capabilities (an existing file, an exporter, raw samples),
//! and [`extract_to_wav`] turns any of them into a waveform file the
//! encoder can mux.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use livephoto_nodes::audio::{extract_to_wav, AudioAsset, AudioSamples};
//!
//! # fn main() -> livephoto_nodes::Result<()> {
//! let tone = AudioSamples::new(vec![0.0; 44100], 1);
//! extract_to_wav(&AudioAsset::ArrayConvertible(tone), Path::new("audio.wav"), 44100)?;
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod types;

pub use export::{extract_to_wav, write_wav};
pub use types::{AudioAsset, AudioCapability, AudioExport, AudioSamples};
