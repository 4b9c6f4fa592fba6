//! # Transition Synthesis
//!
//! Generates the compare-style wipe between two images: both are brought to
//! a shared resolution, then a vertical boundary sweeps across the frame.

pub mod wipe;

pub use wipe::{split_column, WipeTransition};
