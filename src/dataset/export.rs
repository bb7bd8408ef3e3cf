//! Dataset snapshot export.
//!
//! A snapshot carries the split images together with enough metadata to
//! reload them as tensors: image shape, class names, split seed and ratio.
//! Pixels are written row-major, one channel.

use crate::core::pipeline::LabeledImage;
use crate::core::raster::{IMAGE_HEIGHT, IMAGE_WIDTH};
use crate::dataset::encoding::{one_hot, EncodingError};
use crate::dataset::split::TrainTestSplit;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// The current export format version.
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// The name of this producer.
pub const PRODUCER_NAME: &str = "gesture-raster";

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),
    #[error("could not write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One pretty-printed JSON document
    Json,
    /// Metadata line followed by one line per entry
    Jsonl,
}

impl ExportFormat {
    /// Parse `json` or `jsonl` (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" => Some(Self::Jsonl),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Jsonl => "jsonl",
        }
    }
}

/// Producer metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    /// Unique identifier of the run that wrote the snapshot
    pub run_id: String,
}

/// Tensor shape of every image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageShape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl Default for ImageShape {
    fn default() -> Self {
        Self {
            height: IMAGE_HEIGHT,
            width: IMAGE_WIDTH,
            channels: 1,
        }
    }
}

/// Snapshot metadata; the first line of a JSON Lines export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub format_version: String,
    pub producer: Producer,
    /// When the snapshot was written (RFC3339)
    pub created_at_utc: String,
    pub image: ImageShape,
    /// Class names, indexed by label
    pub classes: Vec<String>,
    pub seed: u64,
    pub test_ratio: f64,
    pub train_count: usize,
    pub test_count: usize,
}

/// One image with its label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub label: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_hot: Option<Vec<f32>>,
    pub pixels: Vec<f32>,
}

/// A full dataset export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSnapshot {
    #[serde(flatten)]
    pub meta: SnapshotMeta,
    pub train: Vec<ExportEntry>,
    pub test: Vec<ExportEntry>,
}

/// Which partition a JSON Lines record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Train,
    Test,
}

/// One JSON Lines record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonlRecord {
    pub split: Partition,
    #[serde(flatten)]
    pub entry: ExportEntry,
}

/// Builder for dataset snapshots.
pub struct SnapshotBuilder {
    run_id: Uuid,
    classes: Vec<String>,
    one_hot_classes: Option<usize>,
    seed: u64,
    test_ratio: f64,
}

impl SnapshotBuilder {
    /// Create a builder with a fresh run ID.
    pub fn new(classes: Vec<String>, seed: u64, test_ratio: f64) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            classes,
            one_hot_classes: None,
            seed,
            test_ratio,
        }
    }

    /// Attach one-hot labels with `num_classes` columns.
    pub fn with_one_hot(mut self, num_classes: usize) -> Self {
        self.one_hot_classes = Some(num_classes);
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Build a snapshot from a split dataset.
    pub fn build(
        &self,
        split: &TrainTestSplit<LabeledImage>,
    ) -> Result<DatasetSnapshot, ExportError> {
        let train = self.entries(&split.train)?;
        let test = self.entries(&split.test)?;

        Ok(DatasetSnapshot {
            meta: SnapshotMeta {
                format_version: EXPORT_FORMAT_VERSION.to_string(),
                producer: Producer {
                    name: PRODUCER_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    run_id: self.run_id.to_string(),
                },
                created_at_utc: Utc::now().to_rfc3339(),
                image: ImageShape::default(),
                classes: self.classes.clone(),
                seed: self.seed,
                test_ratio: self.test_ratio,
                train_count: train.len(),
                test_count: test.len(),
            },
            train,
            test,
        })
    }

    fn entries(&self, images: &[LabeledImage]) -> Result<Vec<ExportEntry>, ExportError> {
        images
            .iter()
            .map(|e| {
                let one_hot = match self.one_hot_classes {
                    Some(n) => Some(one_hot(e.label, n)?),
                    None => None,
                };
                Ok(ExportEntry {
                    label: e.label,
                    one_hot,
                    pixels: e.image.pixels().to_vec(),
                })
            })
            .collect()
    }
}

/// Serialize a snapshot into `writer`.
pub fn write_snapshot_to<W: Write>(
    snapshot: &DatasetSnapshot,
    format: ExportFormat,
    mut writer: W,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Json => serde_json::to_writer_pretty(&mut writer, snapshot)?,
        ExportFormat::Jsonl => {
            serde_json::to_writer(&mut writer, &snapshot.meta)?;
            let records = snapshot
                .train
                .iter()
                .map(|e| (Partition::Train, e))
                .chain(snapshot.test.iter().map(|e| (Partition::Test, e)));
            for (split, entry) in records {
                writeln!(writer)?;
                let record = JsonlRecord {
                    split,
                    entry: entry.clone(),
                };
                serde_json::to_writer(&mut writer, &record)?;
            }
        }
    }
    writeln!(writer)?;
    Ok(())
}

/// Write a snapshot into `dir` as `dataset_<timestamp>.<ext>` and return its path.
pub fn write_snapshot(
    snapshot: &DatasetSnapshot,
    dir: &Path,
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(format!(
        "dataset_{}.{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    ));
    let io_err = |source| ExportError::Io {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(io_err)?;
    let file = std::fs::File::create(&path).map_err(io_err)?;
    let mut writer = std::io::BufWriter::new(file);
    write_snapshot_to(snapshot, format, &mut writer)?;
    writer.flush().map_err(io_err)?;

    Ok(path)
}
