//! Classifier abstraction used by the search engine and the trainer

use crate::error::Result;
use ndarray::{Array1, Array2};
use std::path::Path;

/// A binary classifier: labels and predictions are 0.0 or 1.0
pub trait BinaryClassifier: Send + Sync {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict a label for every row of `x`
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Persist the fitted model in its native format
    fn save_model(&self, path: &Path) -> Result<()>;
}

/// Fraction of positions where `y_pred` matches `y_true`
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| (*t - *p).abs() < 0.5)
        .count();
    correct as f64 / y_true.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_accuracy() {
        let y_true = array![1.0, 0.0, 1.0, 1.0];
        let y_pred = array![1.0, 0.0, 0.0, 1.0];
        assert!((accuracy(&y_true, &y_pred) - 0.75).abs() < 1e-12);
        let empty = Array1::<f64>::zeros(0);
        assert_eq!(accuracy(&empty, &empty), 0.0);
    }
}
