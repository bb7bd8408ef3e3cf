//! Configuration for gesture-raster.

use crate::core::pipeline::PipelineOptions;
use crate::dataset::{DEFAULT_NUM_CLASSES, DEFAULT_SEED, DEFAULT_TEST_RATIO};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Class recordings; the label of a class is its position in this list
    pub classes: Vec<ClassSource>,

    /// Path for dataset exports
    pub export_path: PathBuf,

    /// Path for run statistics
    pub data_path: PathBuf,

    /// Worker threads for rendering; the default 0 uses all cores
    pub workers: usize,

    /// Fraction of images held out for testing
    pub test_ratio: f64,

    /// Seed for the train/test shuffle
    pub seed: u64,

    /// Width of one-hot label vectors
    pub num_classes: usize,

    /// Whether exports carry one-hot labels
    pub one_hot: bool,

    /// Skip recordings with malformed rows instead of aborting
    pub skip_malformed_groups: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gesture-raster");

        Self {
            classes: Vec::new(),
            export_path: data_dir.join("exports"),
            data_path: data_dir,
            workers: 0,
            test_ratio: DEFAULT_TEST_RATIO,
            seed: DEFAULT_SEED,
            num_classes: DEFAULT_NUM_CLASSES,
            one_hot: true,
            skip_malformed_groups: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gesture-raster")
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path)
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        std::fs::create_dir_all(&self.data_path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Path of the persisted run statistics.
    pub fn stats_path(&self) -> PathBuf {
        self.data_path.join("processing_stats.json")
    }

    /// Class names, indexed by label.
    pub fn class_names(&self) -> Vec<String> {
        self.classes.iter().map(|c| c.name.clone()).collect()
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            workers: self.workers,
            skip_malformed_groups: self.skip_malformed_groups,
        }
    }
}

/// A named class recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSource {
    pub name: String,
    pub path: PathBuf,
}

impl ClassSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Parse `NAME=PATH`, or a bare `PATH` named after its file stem.
    pub fn from_arg(arg: &str) -> Result<Self, ConfigError> {
        let arg = arg.trim();
        let (name, path) = match arg.split_once('=') {
            Some((name, path)) => (name.trim().to_string(), PathBuf::from(path.trim())),
            None => {
                let path = PathBuf::from(arg);
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                (stem, path)
            }
        };

        if name.is_empty() || path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidClass(arg.to_string()));
        }
        Ok(Self { name, path })
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
    #[error("invalid class source {0:?}, expected NAME=PATH")]
    InvalidClass(String),
}
