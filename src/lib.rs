//! claimboost - claim classifier training pipeline
//!
//! This crate trains a binary "has a property-damage claim" classifier on the
//! `pg15training` motor insurance dataset:
//! - Dataset download and R `.rda` decoding
//! - Label derivation and one-hot encoding
//! - TPE hyperparameter search over gradient-boosted trees
//! - Refit, evaluation and JSON persistence
//!
//! # Modules
//!
//! ## Data
//! - [`data`] - Dataset download and the RData reader
//! - [`preprocessing`] - Feature transformation and the train/test split
//!
//! ## Core ML Modules
//! - [`training`] - Gradient-boosted trees, search loop, metrics
//! - [`optimizer`] - Search spaces and samplers (random, TPE)
//!
//! ## Services
//! - [`pipeline`] - End-to-end run
//! - [`cli`] - Command-line interface
//!
//! ## Utilities
//! - [`config`] - YAML configuration
//! - [`logging`] - Tracing subscriber setup
//! - [`utils`] - CSV IO and filesystem helpers

// Core error handling
pub mod error;

// Configuration
pub mod config;

// Data
pub mod data;
pub mod preprocessing;

// Core ML modules
pub mod training;
pub mod optimizer;

// Services
pub mod pipeline;
pub mod cli;

// Utilities
pub mod logging;
pub mod utils;

pub use error::{ClaimBoostError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{ClaimBoostError, Result};

    // Configuration
    pub use crate::config::{load_config, Config};

    // Data
    pub use crate::data::{DataDownloader, RObject};
    pub use crate::utils::{DataLoader, DataSaver};

    // Preprocessing
    pub use crate::preprocessing::{train_test_split, transform_dataset, DataSplit, OneHotEncoder};

    // Training
    pub use crate::training::{
        BinaryClassifier, ClassificationMetrics, GbdtClassifier, GbdtConfig, ModelTrainer,
    };

    // Optimization
    pub use crate::optimizer::{HyperOptimizer, OptimizationConfig, SearchSpace, Study, TrialParams};

    // Pipeline
    pub use crate::pipeline::{run, run_with_dataset, PipelineSummary};
}
