//! Core image pipeline.
//!
//! This module contains:
//! - Framing of sensor rows into 119-sample measurements
//! - Orientation integration over the gyroscope channel
//! - Stroke-plane projection
//! - Rasterization into 40×40 images
//! - The driver that assembles a dataset from labelled input groups

pub mod framing;
pub mod orientation;
pub mod pipeline;
pub mod raster;
pub mod stroke;

// Re-export commonly used types
pub use framing::{
    frame_group, frame_rows, frame_samples, Framed, FramingError, Measurement,
    SAMPLES_PER_MEASUREMENT,
};
pub use orientation::{integrate, integrate_measurement, OrientationSeries};
pub use pipeline::{
    Dataset, LabeledImage, PipelineDriver, PipelineError, PipelineOptions,
};
pub use raster::{rasterize, Pixel, Ramp, RasterImage, Rasterized, IMAGE_HEIGHT, IMAGE_WIDTH};
pub use stroke::{project, StrokeSeries, MIN_ACCEL_MAGNITUDE};
