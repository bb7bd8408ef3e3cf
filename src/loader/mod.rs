//! Loading of raw sensor recordings.
//!
//! This module turns class recording files into labelled input groups for the
//! pipeline. It is the only part of the crate that touches the filesystem for
//! input.

pub mod files;
pub mod types;

// Re-export commonly used types
pub use files::{load_classes, load_group, LoaderError};
pub use types::{InputGroup, RowError, Sample, CHANNELS_PER_ROW};
