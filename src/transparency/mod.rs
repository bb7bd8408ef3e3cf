//! Transparency module.
//!
//! Tracks what each dataset build read, dropped and guarded against, and
//! persists it so `gesture-raster stats` can report on the last run.

pub mod log;

// Re-export commonly used types
pub use log::{
    create_shared_log_with_persistence, PersistedStats, ProcessingLog,
    ProcessingStats, SharedProcessingLog,
};
