//! Dataset utilities around the core pipeline.
//!
//! - Seeded train/test partitioning
//! - One-hot label encoding
//! - Snapshot export to JSON / JSON Lines

pub mod encoding;
pub mod export;
pub mod split;

// Re-export commonly used types
pub use encoding::{one_hot, to_categorical, EncodingError, DEFAULT_NUM_CLASSES};
pub use export::{
    write_snapshot, write_snapshot_to, DatasetSnapshot, ExportEntry, ExportError, ExportFormat,
    SnapshotBuilder, SnapshotMeta, EXPORT_FORMAT_VERSION, PRODUCER_NAME,
};
pub use split::{
    split_dataset, test_count, train_test_split, SplitError, TrainTestSplit, DEFAULT_SEED,
    DEFAULT_TEST_RATIO,
};
