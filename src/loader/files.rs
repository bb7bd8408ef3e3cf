//! Reading class recordings from disk.
//!
//! Every class is one CSV file written by the recorder: a header line
//! (`aX,aY,aZ,gX,gY,gZ`) followed by data rows, with a blank line after each
//! captured gesture. Labels are assigned from the position of the class in the
//! caller's list, never from directory order.

use crate::config::ClassSource;
use crate::loader::types::InputGroup;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading class recordings.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("no classes configured")]
    NoClasses,
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Load one recording file, dropping its header line.
pub fn load_group(path: &Path, label: u32) -> Result<InputGroup, LoaderError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let rows = rows_without_header(&content);
    tracing::debug!(path = %path.display(), label, rows = rows.len(), "loaded class recording");

    Ok(InputGroup::new(path.display().to_string(), label, rows))
}

/// Load every configured class; the label is the index in `classes`.
pub fn load_classes(classes: &[ClassSource]) -> Result<Vec<InputGroup>, LoaderError> {
    if classes.is_empty() {
        return Err(LoaderError::NoClasses);
    }

    classes
        .iter()
        .enumerate()
        .map(|(label, class)| load_group(&class.path, label as u32))
        .collect()
}

/// Split file content into rows, skipping the first (header) line.
///
/// Blank lines are kept so row indices in error reports line up with the file;
/// the framer treats them as separators.
fn rows_without_header(content: &str) -> Vec<String> {
    content
        .lines()
        .skip(1)
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}
