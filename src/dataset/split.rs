//! Seeded train/test partitioning.
//!
//! The permutation comes from a generator seeded per call, so a split depends
//! only on its inputs and the seed.

use crate::core::pipeline::{Dataset, LabeledImage};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

/// Fraction of entries held out for testing.
pub const DEFAULT_TEST_RATIO: f64 = 0.2;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 0;

/// Split errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    #[error("test ratio must be strictly between 0 and 1, got {0}")]
    InvalidRatio(f64),
    #[error("cannot split {len} entries with test ratio {ratio}: one side would be empty")]
    TooFewEntries { len: usize, ratio: f64 },
}

/// Disjoint train and test partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
}

/// Number of test entries for `len` items: `ceil(ratio * len)`.
pub fn test_count(len: usize, test_ratio: f64) -> usize {
    (test_ratio * len as f64).ceil() as usize
}

/// Shuffle `items` with `seed` and hold out `ceil(test_ratio * len)` of them for testing.
pub fn train_test_split<T>(
    items: Vec<T>,
    test_ratio: f64,
    seed: u64,
) -> Result<TrainTestSplit<T>, SplitError> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(SplitError::InvalidRatio(test_ratio));
    }

    let len = items.len();
    let n_test = test_count(len, test_ratio);
    if n_test == 0 || n_test >= len {
        return Err(SplitError::TooFewEntries {
            len,
            ratio: test_ratio,
        });
    }

    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut take = |indices: &[usize]| -> Vec<T> {
        indices.iter().filter_map(|&i| slots[i].take()).collect()
    };

    let test = take(&order[..n_test]);
    let train = take(&order[n_test..]);

    Ok(TrainTestSplit { train, test })
}

/// Split a dataset's entries.
pub fn split_dataset(
    dataset: Dataset,
    test_ratio: f64,
    seed: u64,
) -> Result<TrainTestSplit<LabeledImage>, SplitError> {
    train_test_split(dataset.entries, test_ratio, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sizes() {
        let split = train_test_split((0..10).collect(), 0.2, DEFAULT_SEED).unwrap();
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);

        // ceil(0.2 * 7) = 2
        let split = train_test_split((0..7).collect(), 0.2, DEFAULT_SEED).unwrap();
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 5);
    }

    #[test]
    fn test_partitions_are_disjoint_and_complete() {
        let split = train_test_split((0..50).collect::<Vec<u32>>(), 0.2, 7).unwrap();
        let train: HashSet<u32> = split.train.iter().copied().collect();
        let test: HashSet<u32> = split.test.iter().copied().collect();

        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), 50);
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = train_test_split((0..40).collect::<Vec<u32>>(), 0.25, 42).unwrap();
        let b = train_test_split((0..40).collect::<Vec<u32>>(), 0.25, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_different_split() {
        let a = train_test_split((0..100).collect::<Vec<u32>>(), 0.2, 1).unwrap();
        let b = train_test_split((0..100).collect::<Vec<u32>>(), 0.2, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_ratio() {
        assert_eq!(
            train_test_split(vec![1, 2, 3], 0.0, 0),
            Err(SplitError::InvalidRatio(0.0))
        );
        assert!(matches!(
            train_test_split(vec![1, 2, 3], 1.0, 0),
            Err(SplitError::InvalidRatio(_))
        ));
        assert!(matches!(
            train_test_split(vec![1, 2, 3], f64::NAN, 0),
            Err(SplitError::InvalidRatio(_))
        ));
    }

    #[test]
    fn test_too_few_entries() {
        assert!(matches!(
            train_test_split(vec![1], 0.2, 0),
            Err(SplitError::TooFewEntries { len: 1, .. })
        ));
        assert!(matches!(
            train_test_split(Vec::<u8>::new(), 0.2, 0),
            Err(SplitError::TooFewEntries { len: 0, .. })
        ));
    }
}
