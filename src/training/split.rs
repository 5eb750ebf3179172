//! Seeded train/test partitioning

use crate::error::{ClaimBoostError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Row indices of one train/test partition
#[derive(Debug, Clone, PartialEq)]
pub struct SplitIndices {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Partition `0..n_samples` into train and test indices.
///
/// The test side gets `ceil(test_size * n_samples)` rows. Both sides must be
/// non-empty. Identical arguments always give the identical partition.
pub fn train_test_split_indices(n_samples: usize, test_size: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ClaimBoostError::ValidationError(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let n_test = (test_size * n_samples as f64).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(ClaimBoostError::ValidationError(format!(
            "With n_samples={}, test_size={} the resulting train set ({}) or test set ({}) would be empty",
            n_samples, test_size, n_train, n_test
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train_indices = indices.split_off(n_test);
    Ok(SplitIndices {
        train_indices,
        test_indices: indices,
    })
}

/// Arrays of one partition, each freshly allocated
#[derive(Debug, Clone)]
pub struct ArraySplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

/// Split row-aligned `x` and `y` with [`train_test_split_indices`]
pub fn split_arrays(x: &Array2<f64>, y: &Array1<f64>, test_size: f64, seed: u64) -> Result<ArraySplit> {
    if x.nrows() != y.len() {
        return Err(ClaimBoostError::ShapeError {
            expected: format!("{} labels", x.nrows()),
            actual: format!("{} labels", y.len()),
        });
    }

    let split = train_test_split_indices(x.nrows(), test_size, seed)?;
    Ok(ArraySplit {
        x_train: x.select(Axis(0), &split.train_indices),
        x_test: x.select(Axis(0), &split.test_indices),
        y_train: y.select(Axis(0), &split.train_indices),
        y_test: y.select(Axis(0), &split.test_indices),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let split = train_test_split_indices(4, 0.25, 42).unwrap();
        assert_eq!(split.train_indices.len(), 3);
        assert_eq!(split.test_indices.len(), 1);

        // ceil(0.2 * 11) = 3
        let split = train_test_split_indices(11, 0.2, 42).unwrap();
        assert_eq!(split.test_indices.len(), 3);
        assert_eq!(split.train_indices.len(), 8);
    }

    #[test]
    fn test_split_is_partition() {
        let split = train_test_split_indices(100, 0.3, 7).unwrap();
        let mut all: Vec<usize> = split
            .train_indices
            .iter()
            .chain(split.test_indices.iter())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_deterministic() {
        let a = train_test_split_indices(50, 0.2, 123).unwrap();
        let b = train_test_split_indices(50, 0.2, 123).unwrap();
        let c = train_test_split_indices(50, 0.2, 124).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_split_rejects_bad_sizes() {
        assert!(train_test_split_indices(10, 0.0, 0).is_err());
        assert!(train_test_split_indices(10, 1.0, 0).is_err());
        assert!(train_test_split_indices(1, 0.5, 0).is_err());
        assert!(train_test_split_indices(0, 0.5, 0).is_err());
    }

    #[test]
    fn test_split_arrays_keeps_rows_aligned() {
        let x = Array2::from_shape_fn((10, 2), |(i, j)| (i * 10 + j) as f64);
        let y = Array1::from_shape_fn(10, |i| i as f64);

        let split = split_arrays(&x, &y, 0.3, 5).unwrap();
        assert_eq!(split.x_train.nrows(), 7);
        assert_eq!(split.x_test.nrows(), 3);
        for (row, label) in split.x_train.rows().into_iter().zip(split.y_train.iter()) {
            assert_eq!(row[0], label * 10.0);
        }
        for (row, label) in split.x_test.rows().into_iter().zip(split.y_test.iter()) {
            assert_eq!(row[0], label * 10.0);
        }
    }

    #[test]
    fn test_split_arrays_shape_mismatch() {
        let x = Array2::<f64>::zeros((5, 2));
        let y = Array1::<f64>::zeros(4);
        assert!(split_arrays(&x, &y, 0.2, 0).is_err());
    }
}
