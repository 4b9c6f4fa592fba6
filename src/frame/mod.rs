//! # Frame Model
//!
//! In-memory image batches as the host hands them to nodes, plus the
//! conversions needed to get them onto disk: 8-bit stills for export and
//! BGR24 rasters for the external encoder.

pub mod resize;
pub mod types;

pub use resize::{fit_scale, resize_bilinear, resize_to_fit};
pub use types::{Frame, ImageBatch};
