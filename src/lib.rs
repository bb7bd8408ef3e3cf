//! gesture-raster - IMU gesture recordings to stroke images.
//!
//! This library turns fixed-length accelerometer + gyroscope recordings into
//! 40×40 single-channel images that an image classifier can be trained on.
//! The trajectory of the device is traced on the plane orthogonal to gravity
//! and drawn with intensity increasing over time.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        gesture-raster                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌──────────┐   ┌─────────────┐   ┌────────┐  │
//! │  │  Loader  │──▶│ Framing  │──▶│ Orientation │──▶│ Stroke │  │
//! │  │  (CSV)   │   │ (119 row)│   │ (integrate) │   │(project│  │
//! │  └──────────┘   └──────────┘   └─────────────┘   └────────┘  │
//! │                                                      │       │
//! │  ┌──────────┐   ┌──────────┐   ┌─────────────┐       ▼       │
//! │  │  Export  │◀──│  Split   │◀──│   Dataset   │◀── Raster     │
//! │  │(JSON/L)  │   │ (seeded) │   │  (ordered)  │   (40×40)     │
//! │  └──────────┘   └──────────┘   └─────────────┘               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use gesture_raster::{InputGroup, PipelineDriver};
//!
//! let rows = vec!["0,0,1,0,0,0".to_string(); 119];
//! let groups = vec![InputGroup::new("still.csv", 0, rows)];
//!
//! let dataset = PipelineDriver::default().build_dataset(&groups).unwrap();
//! assert_eq!(dataset.len(), 1);
//! assert_eq!(dataset.entries[0].image.get(0, 0), Some(1.0));
//! ```

pub mod config;
pub mod core;
pub mod dataset;
pub mod loader;
pub mod transparency;

// Re-export key types at crate root for convenience
pub use config::{ClassSource, Config};
pub use crate::core::{
    Dataset, LabeledImage, Measurement, PipelineDriver, PipelineError, PipelineOptions,
    RasterImage, IMAGE_HEIGHT, IMAGE_WIDTH, SAMPLES_PER_MEASUREMENT,
};
pub use dataset::{DatasetSnapshot, ExportFormat, SnapshotBuilder, TrainTestSplit};
pub use loader::{InputGroup, Sample};
pub use transparency::{ProcessingLog, ProcessingStats, SharedProcessingLog};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
