//! Processing log.
//!
//! Counts what a dataset build consumed, dropped and guarded against, so a
//! run can be audited without re-reading its inputs. Counters are atomics and
//! the log is shared across pipeline workers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for one run.
#[derive(Debug)]
pub struct ProcessingLog {
    /// Input groups framed successfully
    groups_framed: AtomicU64,
    /// Input groups rejected for malformed rows
    malformed_groups: AtomicU64,
    /// Samples parsed
    samples_read: AtomicU64,
    /// Measurements produced by framing
    measurements_framed: AtomicU64,
    /// Trailing samples that did not fill a measurement
    samples_dropped: AtomicU64,
    /// Measurements whose mean acceleration hit the magnitude floor
    degenerate_motion: AtomicU64,
    /// Stroke axes with zero range
    collapsed_axes: AtomicU64,
    /// Images emitted into the dataset
    images_emitted: AtomicU64,
    /// Run start time
    run_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl ProcessingLog {
    pub fn new() -> Self {
        Self {
            groups_framed: AtomicU64::new(0),
            malformed_groups: AtomicU64::new(0),
            samples_read: AtomicU64::new(0),
            measurements_framed: AtomicU64::new(0),
            samples_dropped: AtomicU64::new(0),
            degenerate_motion: AtomicU64::new(0),
            collapsed_axes: AtomicU64::new(0),
            images_emitted: AtomicU64::new(0),
            run_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a log that saves to `path`. Counters start at zero for every run.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut log = Self::new();
        log.persist_path = Some(path);
        log
    }

    pub fn record_group_framed(&self) {
        self.groups_framed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed_group(&self) {
        self.malformed_groups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_samples_read(&self, count: u64) {
        self.samples_read.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_measurements_framed(&self, count: u64) {
        self.measurements_framed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_samples_dropped(&self, count: u64) {
        self.samples_dropped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_degenerate_motion(&self) {
        self.degenerate_motion.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_collapsed_axes(&self, count: u64) {
        self.collapsed_axes.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_image_emitted(&self) {
        self.images_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> ProcessingStats {
        ProcessingStats {
            groups_framed: self.groups_framed.load(Ordering::Relaxed),
            malformed_groups: self.malformed_groups.load(Ordering::Relaxed),
            samples_read: self.samples_read.load(Ordering::Relaxed),
            measurements_framed: self.measurements_framed.load(Ordering::Relaxed),
            samples_dropped: self.samples_dropped.load(Ordering::Relaxed),
            degenerate_motion: self.degenerate_motion.load(Ordering::Relaxed),
            collapsed_axes: self.collapsed_axes.load(Ordering::Relaxed),
            images_emitted: self.images_emitted.load(Ordering::Relaxed),
            run_start: self.run_start,
            run_duration_ms: (Utc::now() - self.run_start).num_milliseconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        self.stats().summary()
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let persisted = PersistedStats {
                stats: self.stats(),
                last_updated: Utc::now(),
            };
            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }
}

impl Default for ProcessingLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of processing statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub groups_framed: u64,
    pub malformed_groups: u64,
    pub samples_read: u64,
    pub measurements_framed: u64,
    pub samples_dropped: u64,
    pub degenerate_motion: u64,
    pub collapsed_axes: u64,
    pub images_emitted: u64,
    pub run_start: DateTime<Utc>,
    pub run_duration_ms: u64,
}

impl ProcessingStats {
    pub fn summary(&self) -> String {
        format!(
            "Run Statistics:\n\
             - Groups framed: {}\n\
             - Malformed groups: {}\n\
             - Samples read: {}\n\
             - Measurements framed: {}\n\
             - Trailing samples dropped: {}\n\
             - Near-zero acceleration (floored): {}\n\
             - Zero-range stroke axes (collapsed): {}\n\
             - Images emitted: {}\n\
             - Run duration: {} ms",
            self.groups_framed,
            self.malformed_groups,
            self.samples_read,
            self.measurements_framed,
            self.samples_dropped,
            self.degenerate_motion,
            self.collapsed_axes,
            self.images_emitted,
            self.run_duration_ms
        )
    }
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedStats {
    #[serde(flatten)]
    pub stats: ProcessingStats,
    pub last_updated: DateTime<Utc>,
}

impl PersistedStats {
    /// Read stats written by [`ProcessingLog::save`].
    pub fn load(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(std::io::Error::other)
    }
}

/// Thread-safe shared processing log.
pub type SharedProcessingLog = Arc<ProcessingLog>;

/// Create a new shared processing log with persistence.
pub fn create_shared_log_with_persistence(path: PathBuf) -> SharedProcessingLog {
    Arc::new(ProcessingLog::with_persistence(path))
}
