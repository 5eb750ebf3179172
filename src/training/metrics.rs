//! Binary classification metrics

use crate::error::{ClaimBoostError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Test-set metrics for the positive class (label 1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl ClassificationMetrics {
    /// Compute metrics and, when `output_path` is given, write them as JSON.
    ///
    /// Precision, recall and F1 are 0.0 when their denominator is zero.
    pub fn calculate(
        y_true: &Array1<f64>,
        y_pred: &Array1<f64>,
        output_path: Option<&Path>,
    ) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(ClaimBoostError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(ClaimBoostError::ValidationError(
                "cannot compute metrics on empty labels".to_string(),
            ));
        }

        let counts = ConfusionCounts::from_labels(y_true, y_pred);
        let metrics = Self {
            accuracy: (counts.tp + counts.tn) as f64 / y_true.len() as f64,
            precision: ratio(counts.tp, counts.tp + counts.fp),
            recall: ratio(counts.tp, counts.tp + counts.fn_),
            f1: ratio(2 * counts.tp, 2 * counts.tp + counts.fp + counts.fn_),
        };

        debug!(
            accuracy = metrics.accuracy,
            precision = metrics.precision,
            recall = metrics.recall,
            f1 = metrics.f1,
            "Computed metrics"
        );

        if let Some(path) = output_path {
            metrics.save(path)?;
        }
        Ok(metrics)
    }

    /// Write `{"accuracy", "precision", "recall", "f1"}` to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        crate::utils::write_json(path, self)?;
        debug!(path = %path.display(), "Metrics saved");
        Ok(())
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ConfusionCounts {
    tp: usize,
    fp: usize,
    tn: usize,
    fn_: usize,
}

impl ConfusionCounts {
    fn from_labels(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let mut counts = Self::default();
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (*t > 0.5, *p > 0.5) {
                (true, true) => counts.tp += 1,
                (false, true) => counts.fp += 1,
                (false, false) => counts.tn += 1,
                (true, false) => counts.fn_ += 1,
            }
        }
        counts
    }
}
