//! # Live Photo Assembly
//!
//! Turns a frame batch into a still + video pair under fixed basenames in a
//! fresh timestamped directory, so a viewer can find the video from the
//! still's directory alone.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use livephoto_nodes::{
//!     config::Config,
//!     frame::{Frame, ImageBatch},
//!     live_photo::{LivePhotoAssembler, LivePhotoRequest},
//! };
//!
//! # fn main() -> livephoto_nodes::Result<()> {
//! let config = Config::default();
//! let frames = (0..30).map(|_| Frame::filled(480, 640, &[0.1, 0.2, 0.3])).collect();
//!
//! let assembler = LivePhotoAssembler::new(&config);
//! let output = assembler.create(LivePhotoRequest {
//!     images: ImageBatch::new(frames)?,
//!     key_frame_index: 0,
//!     duration: 3.0,
//!     fps: 30.0,
//!     audio: None,
//! })?;
//!
//! println!("Saved to {:?}", output.output_dir);
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod workspace;

pub use assembler::{clamp_key_frame, LivePhotoAssembler, LivePhotoOutput, LivePhotoRequest};
pub use workspace::{allocate_output_dir, ScopedTempDir};
