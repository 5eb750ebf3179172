//! End-to-end training pipeline
//!
//! download -> load -> transform -> split -> search -> refit -> save ->
//! evaluate -> metrics. Every stage runs synchronously; the first error
//! stops the run and earlier outputs are left in place.

use crate::config::Config;
use crate::data::DataDownloader;
use crate::error::Result;
use crate::optimizer::TrialParams;
use crate::preprocessing::{train_test_split, transform_dataset, DEFAULT_TEST_SIZE};
use crate::training::{ClassificationMetrics, ModelTrainer};
use crate::utils::{DataLoader, Timer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What a successful run produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub n_rows: usize,
    pub n_features: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub n_trials: usize,
    pub best_validation_score: f64,
    pub best_params: TrialParams,
    pub metrics: ClassificationMetrics,
    pub params_path: PathBuf,
    pub model_path: PathBuf,
    /// `None` when no metrics path was configured
    pub metrics_path: Option<PathBuf>,
    pub duration_secs: f64,
}

/// Download the dataset, then train from it
pub fn run(config: &Config) -> Result<PipelineSummary> {
    config.validate()?;
    let timer = Timer::start();
    DataDownloader::new().download_data(
        &config.data.url,
        &config.data.dataset_file_path,
        &config.data.dataset_name,
    )?;
    debug!(elapsed_secs = timer.elapsed_secs(), "Download stage finished");
    run_with_dataset(config)
}

/// Train from the CSV already present at `data.dataset_file_path`
pub fn run_with_dataset(config: &Config) -> Result<PipelineSummary> {
    config.validate()?;
    let timer = Timer::start();

    let raw = DataLoader::new().load_csv(&config.data.dataset_file_path)?;
    info!(rows = raw.height(), columns = raw.width(), "Dataset loaded");

    let table = transform_dataset(&raw)?;
    let split = train_test_split(&table, DEFAULT_TEST_SIZE, config.random_state)?;
    let n_train = split.x_train.nrows();
    let n_test = split.x_test.nrows();
    let n_features = split.feature_names.len();
    info!(n_train, n_test, n_features, "Data prepared");

    let mut trainer = ModelTrainer::new(split.x_train, split.y_train, config.random_state)?;
    let best_params = trainer
        .run_optimization(config.dataset.test_size, &config.optuna)?
        .1
        .clone();
    let best_validation_score = trainer.best_score().unwrap_or(0.0);

    trainer.save(&config.model.output_params_path, &config.model.output_path)?;

    let metrics_path = optional_output_path(&config.model.metrics_path);
    if metrics_path.is_none() {
        debug!("No metrics path configured, metrics will not be saved");
    }
    let predictions = trainer.evaluate(&split.x_test)?;
    let metrics = ClassificationMetrics::calculate(&split.y_test, &predictions, metrics_path)?;
    info!(
        accuracy = metrics.accuracy,
        precision = metrics.precision,
        recall = metrics.recall,
        f1 = metrics.f1,
        "Test metrics"
    );

    let duration_secs = timer.elapsed_secs();
    info!(duration_secs, "Pipeline finished");

    Ok(PipelineSummary {
        n_rows: raw.height(),
        n_features,
        n_train,
        n_test,
        n_trials: config.optuna.n_trials,
        best_validation_score,
        best_params,
        metrics,
        params_path: PathBuf::from(&config.model.output_params_path),
        model_path: PathBuf::from(&config.model.output_path),
        metrics_path: metrics_path.map(Path::to_path_buf),
        duration_secs,
    })
}

/// Blank paths mean "do not write"
fn optional_output_path(path: &str) -> Option<&Path> {
    if path.trim().is_empty() {
        None
    } else {
        Some(Path::new(path))
    }
}
