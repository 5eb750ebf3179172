//! Pipeline configuration loaded from a YAML document

use crate::error::{ClaimBoostError, Result};
use crate::optimizer::SearchSpace;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inclusive integer range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

/// Continuous range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FloatRange {
    pub min: f64,
    pub max: f64,
}

/// Where the raw dataset comes from and where it is stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    pub url: String,
    pub dataset_file_path: String,
    pub dataset_name: String,
}

/// Dataset split settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    /// Fraction of the training set held out to score each trial
    pub test_size: f64,
}

/// Hyperparameter search budget and ranges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    pub n_trials: usize,
    pub n_estimators: IntRange,
    pub learning_rate: FloatRange,
    pub max_depth: IntRange,
    pub num_leaves: IntRange,
    pub min_child_samples: IntRange,
    pub subsample: FloatRange,
    pub colsample_bytree: FloatRange,
}

/// Output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub output_path: String,
    pub output_params_path: String,
    pub metrics_path: String,
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub random_state: u64,
    pub data: DataConfig,
    pub dataset: DatasetConfig,
    pub optuna: SearchConfig,
    pub model: ModelConfig,
}

impl SearchConfig {
    /// Build the search space, in the fixed parameter order
    pub fn search_space(&self) -> SearchSpace {
        SearchSpace::new()
            .int("n_estimators", self.n_estimators.min, self.n_estimators.max)
            .log_float("learning_rate", self.learning_rate.min, self.learning_rate.max)
            .int("max_depth", self.max_depth.min, self.max_depth.max)
            .int("num_leaves", self.num_leaves.min, self.num_leaves.max)
            .int(
                "min_child_samples",
                self.min_child_samples.min,
                self.min_child_samples.max,
            )
            .float("subsample", self.subsample.min, self.subsample.max)
            .float(
                "colsample_bytree",
                self.colsample_bytree.min,
                self.colsample_bytree.max,
            )
    }
}

impl Config {
    /// Check semantic constraints that the YAML schema cannot express
    pub fn validate(&self) -> Result<()> {
        let require = |name: &str, value: &str| -> Result<()> {
            if value.trim().is_empty() {
                return Err(ClaimBoostError::ConfigError(format!("{} must not be empty", name)));
            }
            Ok(())
        };
        require("data.url", &self.data.url)?;
        require("data.dataset_file_path", &self.data.dataset_file_path)?;
        require("data.dataset_name", &self.data.dataset_name)?;

        let test_size = self.dataset.test_size;
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(ClaimBoostError::ConfigError(format!(
                "dataset.test_size must be in (0, 1), got {}",
                test_size
            )));
        }

        if self.optuna.n_trials == 0 {
            return Err(ClaimBoostError::ConfigError(
                "optuna.n_trials must be at least 1".to_string(),
            ));
        }

        self.optuna
            .search_space()
            .validate()
            .map_err(|e| ClaimBoostError::ConfigError(format!("optuna: {}", e)))
    }
}

/// Read a YAML file into a generic document
pub fn read_yaml(path: impl AsRef<Path>) -> Result<serde_yaml::Value> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ClaimBoostError::ConfigError(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents)
        .map_err(|e| ClaimBoostError::ConfigError(format!("Invalid YAML: {}", e)))
}

/// Load and validate the pipeline configuration
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let document = read_yaml(path)?;
    let config: Config = serde_yaml::from_value(document)
        .map_err(|e| ClaimBoostError::ConfigError(format!("Invalid config: {}", e)))?;
    config.validate()?;
    Ok(config)
}
