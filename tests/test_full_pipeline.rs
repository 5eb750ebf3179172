//! Integration test: Full pipeline (CSV → transform → search → refit → save → metrics)

mod common;

use claimboost::error::ClaimBoostError;
use claimboost::optimizer::{ParameterValue, TrialParams};
use claimboost::pipeline::run_with_dataset;
use claimboost::training::{ClassificationMetrics, GbdtClassifier};

#[test]
fn test_pipeline_writes_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    common::write_claims_csv(dir.path(), 200, 1);
    let config = common::load_test_config(dir.path(), 3);

    let summary = run_with_dataset(&config).unwrap();

    assert_eq!(summary.n_rows, 200);
    assert_eq!(summary.n_test, 40);
    assert_eq!(summary.n_train, 160);
    assert_eq!(summary.n_trials, 3);
    assert!(summary.n_features > 0);

    let params_path = dir.path().join("models").join("params.json");
    let model_path = dir.path().join("models").join("model.json");
    let metrics_path = dir.path().join("reports").join("metrics.json");
    assert!(params_path.exists());
    assert!(model_path.exists());
    assert!(metrics_path.exists());
    assert_eq!(summary.metrics_path.as_deref(), Some(metrics_path.as_path()));

    let params: TrialParams =
        serde_json::from_str(&std::fs::read_to_string(&params_path).unwrap()).unwrap();
    let keys: Vec<&str> = params.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "colsample_bytree",
            "learning_rate",
            "max_depth",
            "min_child_samples",
            "n_estimators",
            "num_leaves",
            "random_state",
            "subsample"
        ]
    );
    assert_eq!(params["random_state"], ParameterValue::Int(42));
    assert_eq!(params, summary.best_params);

    let metrics: ClassificationMetrics =
        serde_json::from_str(&std::fs::read_to_string(&metrics_path).unwrap()).unwrap();
    assert_eq!(metrics, summary.metrics);
    for value in [metrics.accuracy, metrics.precision, metrics.recall, metrics.f1] {
        assert!((0.0..=1.0).contains(&value));
    }

    let model = GbdtClassifier::load_model(&model_path).unwrap();
    assert!(model.is_fitted());
}

#[test]
fn test_pipeline_is_reproducible() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    for dir in [&first, &second] {
        common::write_claims_csv(dir.path(), 120, 5);
    }

    let a = run_with_dataset(&common::load_test_config(first.path(), 2)).unwrap();
    let b = run_with_dataset(&common::load_test_config(second.path(), 2)).unwrap();

    assert_eq!(a.best_params, b.best_params);
    assert_eq!(a.metrics, b.metrics);
    assert_eq!(a.best_validation_score, b.best_validation_score);
}

#[test]
fn test_missing_dataset_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::load_test_config(dir.path(), 1);

    let err = run_with_dataset(&config).unwrap_err();
    assert!(matches!(err, ClaimBoostError::DataError(_)));
    assert!(err.to_string().contains("Dataset file does not exist"));
    assert!(!dir.path().join("models").exists());
}

#[test]
fn test_empty_params_path_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    common::write_claims_csv(dir.path(), 80, 2);
    let mut config = common::load_test_config(dir.path(), 1);
    config.model.output_params_path = String::new();

    let err = run_with_dataset(&config).unwrap_err();
    assert!(matches!(err, ClaimBoostError::PersistenceError(_)));
    assert!(!dir.path().join("models").exists());
    assert!(!dir.path().join("reports").exists());
}

#[test]
fn test_empty_metrics_path_skips_metrics_file() {
    let dir = tempfile::tempdir().unwrap();
    common::write_claims_csv(dir.path(), 80, 4);
    let mut config = common::load_test_config(dir.path(), 1);
    config.model.metrics_path = "  ".to_string();

    let summary = run_with_dataset(&config).unwrap();

    assert!(summary.metrics_path.is_none());
    assert!(dir.path().join("models").join("params.json").exists());
    assert!(dir.path().join("models").join("model.json").exists());
    assert!(!dir.path().join("reports").exists());
    for value in [summary.metrics.accuracy, summary.metrics.f1] {
        assert!((0.0..=1.0).contains(&value));
    }
}

#[test]
fn test_invalid_config_rejected_before_loading() {
    let dir = tempfile::tempdir().unwrap();
    common::write_claims_csv(dir.path(), 40, 3);
    let mut config = common::load_test_config(dir.path(), 1);
    config.optuna.n_trials = 0;

    assert!(matches!(
        run_with_dataset(&config),
        Err(ClaimBoostError::ConfigError(_))
    ));
}
