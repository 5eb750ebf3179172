//! Model training module
//!
//! Provides:
//! - A LightGBM-style gradient-boosted tree classifier
//! - Seeded train/test splitting
//! - Hyperparameter search over any [`BinaryClassifier`]
//! - Classification metrics
//! - [`ModelTrainer`], which ties search, refit, evaluation and persistence together

mod gbdt;
mod metrics;
mod models;
pub mod search;
pub mod split;
mod trainer;

pub use gbdt::{GbdtClassifier, GbdtConfig};
pub use metrics::ClassificationMetrics;
pub use models::{accuracy, BinaryClassifier};
pub use search::{optimize_classifier, SearchResult, SearchSettings, RANDOM_STATE_KEY};
pub use split::{split_arrays, train_test_split_indices, ArraySplit, SplitIndices};
pub use trainer::ModelTrainer;
