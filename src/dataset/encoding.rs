//! One-hot label encoding.

use thiserror::Error;

/// Number of gesture classes the classifier is trained on.
pub const DEFAULT_NUM_CLASSES: usize = 5;

/// Encoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("at least one class is required")]
    NoClasses,
    #[error("label {label} is out of range for {num_classes} classes")]
    LabelOutOfRange { label: u32, num_classes: usize },
}

/// Encode one label as a `num_classes`-long vector with a single 1.0.
pub fn one_hot(label: u32, num_classes: usize) -> Result<Vec<f32>, EncodingError> {
    if num_classes == 0 {
        return Err(EncodingError::NoClasses);
    }
    let index = label as usize;
    if index >= num_classes {
        return Err(EncodingError::LabelOutOfRange { label, num_classes });
    }

    let mut encoded = vec![0.0; num_classes];
    encoded[index] = 1.0;
    Ok(encoded)
}

/// Encode every label; fails on the first label outside `0..num_classes`.
pub fn to_categorical(labels: &[u32], num_classes: usize) -> Result<Vec<Vec<f32>>, EncodingError> {
    labels.iter().map(|&l| one_hot(l, num_classes)).collect()
}
