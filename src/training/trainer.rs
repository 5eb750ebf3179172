//! Search, refit, evaluation and persistence for the claim classifier

use super::gbdt::GbdtClassifier;
use super::models::BinaryClassifier;
use super::search::{optimize_classifier, SearchSettings};
use crate::config::SearchConfig;
use crate::error::{ClaimBoostError, Result};
use crate::optimizer::{Study, TrialParams};
use crate::utils::{require_output_path, write_json};
use ndarray::{Array1, Array2};
use std::path::Path;
use tracing::{debug, info};

/// Owns the training set and the model selected by the search
pub struct ModelTrainer {
    x_train: Array2<f64>,
    y_train: Array1<f64>,
    random_state: u64,
    model: Option<GbdtClassifier>,
    best_params: Option<TrialParams>,
    study: Option<Study>,
}

impl ModelTrainer {
    pub fn new(x_train: Array2<f64>, y_train: Array1<f64>, random_state: u64) -> Result<Self> {
        if x_train.nrows() != y_train.len() {
            return Err(ClaimBoostError::ShapeError {
                expected: format!("{} labels", x_train.nrows()),
                actual: format!("{} labels", y_train.len()),
            });
        }
        Ok(Self {
            x_train,
            y_train,
            random_state,
            model: None,
            best_params: None,
            study: None,
        })
    }

    /// Search the configured ranges, then refit the best assignment on the
    /// full training set. Returns the refit model and its parameters.
    pub fn run_optimization(
        &mut self,
        validation_fraction: f64,
        search: &SearchConfig,
    ) -> Result<(&GbdtClassifier, &TrialParams)> {
        let settings = SearchSettings::new(search.n_trials, validation_fraction, self.random_state);
        let seed = self.random_state;
        info!(
            n_trials = settings.n_trials,
            validation_fraction,
            rows = self.x_train.nrows(),
            features = self.x_train.ncols(),
            "Starting hyperparameter search"
        );

        let result = optimize_classifier(
            &self.x_train,
            &self.y_train,
            search.search_space(),
            &settings,
            |params| GbdtClassifier::from_params(params, seed),
        )?;
        info!(best_score = result.best_score, "Best validation accuracy");
        debug!(params = ?result.best_params, "Best parameters");

        self.study = Some(result.study);
        let model: &GbdtClassifier = self.model.insert(result.model);
        let params: &TrialParams = self.best_params.insert(result.best_params);
        Ok((model, params))
    }

    /// Predict labels for `x_test` with the refit model
    pub fn evaluate(&self, x_test: &Array2<f64>) -> Result<Array1<f64>> {
        let model = self.model.as_ref().ok_or(ClaimBoostError::ModelNotFitted)?;
        let predictions = model.predict(x_test)?;
        debug!(rows = predictions.len(), "Generated test predictions");
        Ok(predictions)
    }

    /// Write the best parameters as a flat JSON object and the model in its
    /// native format. Parent directories are created as needed.
    pub fn save(&self, params_path: &str, model_path: &str) -> Result<()> {
        let params_path = require_output_path(params_path, "output_params_path")?;
        let model_path = require_output_path(model_path, "output_path")?;

        let (Some(model), Some(params)) = (self.model.as_ref(), self.best_params.as_ref()) else {
            return Err(ClaimBoostError::ModelNotFitted);
        };

        write_outputs(model, params, params_path, model_path)
    }

    pub fn model(&self) -> Option<&GbdtClassifier> {
        self.model.as_ref()
    }

    pub fn best_params(&self) -> Option<&TrialParams> {
        self.best_params.as_ref()
    }

    /// Trials of the last search
    pub fn study(&self) -> Option<&Study> {
        self.study.as_ref()
    }

    /// Validation accuracy of the best trial
    pub fn best_score(&self) -> Option<f64> {
        self.study.as_ref().and_then(Study::best_value)
    }
}

/// Params first, then the model through its classifier interface
fn write_outputs(
    model: &dyn BinaryClassifier,
    params: &TrialParams,
    params_path: &Path,
    model_path: &Path,
) -> Result<()> {
    write_json(params_path, params)?;
    info!(path = %params_path.display(), "Best parameters saved");

    model.save_model(model_path)?;
    info!(path = %model_path.display(), "Model saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FloatRange, IntRange};
    use crate::optimizer::ParameterValue;

    /// Writes a fixed marker instead of a real model
    struct MarkerModel;

    impl BinaryClassifier for MarkerModel {
        fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<f64>) -> Result<()> {
            Ok(())
        }

        fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
            Ok(Array1::zeros(x.nrows()))
        }

        fn save_model(&self, path: &Path) -> Result<()> {
            std::fs::write(path, "marker")?;
            Ok(())
        }
    }

    fn search_config(n_trials: usize) -> SearchConfig {
        SearchConfig {
            n_trials,
            n_estimators: IntRange { min: 5, max: 15 },
            learning_rate: FloatRange { min: 0.05, max: 0.3 },
            max_depth: IntRange { min: 2, max: 4 },
            num_leaves: IntRange { min: 4, max: 8 },
            min_child_samples: IntRange { min: 2, max: 5 },
            subsample: FloatRange { min: 0.8, max: 1.0 },
            colsample_bytree: FloatRange { min: 0.8, max: 1.0 },
        }
    }

    fn data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((60, 3), |(i, j)| ((i * 7 + j * 3) % 60) as f64);
        let y = x.column(0).mapv(|v| if v >= 30.0 { 1.0 } else { 0.0 });
        (x, y)
    }

    #[test]
    fn test_optimize_and_evaluate() {
        let (x, y) = data();
        let mut trainer = ModelTrainer::new(x.clone(), y.clone(), 42).unwrap();

        let (model, params) = trainer.run_optimization(0.25, &search_config(3)).unwrap();
        assert!(model.is_fitted());
        assert_eq!(params.len(), 8);
        assert!(params.contains_key("random_state"));

        let predictions = trainer.evaluate(&x).unwrap();
        assert_eq!(predictions.len(), 60);
        assert!(predictions.iter().all(|&p| p == 0.0 || p == 1.0));
        assert_eq!(trainer.study().unwrap().trials.len(), 3);
    }

    #[test]
    fn test_evaluate_before_optimization() {
        let (x, y) = data();
        let trainer = ModelTrainer::new(x.clone(), y, 42).unwrap();
        assert!(matches!(trainer.evaluate(&x), Err(ClaimBoostError::ModelNotFitted)));
    }

    #[test]
    fn test_save_outputs() {
        let (x, y) = data();
        let mut trainer = ModelTrainer::new(x.clone(), y, 42).unwrap();
        trainer.run_optimization(0.25, &search_config(2)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let params_path = dir.path().join("out").join("params.json");
        let model_path = dir.path().join("out").join("model.json");
        trainer
            .save(params_path.to_str().unwrap(), model_path.to_str().unwrap())
            .unwrap();

        let params: TrialParams =
            serde_json::from_str(&std::fs::read_to_string(&params_path).unwrap()).unwrap();
        assert_eq!(&params, trainer.best_params().unwrap());

        let loaded = GbdtClassifier::load_model(&model_path).unwrap();
        assert_eq!(loaded.predict(&x).unwrap(), trainer.evaluate(&x).unwrap());
    }

    #[test]
    fn test_outputs_written_through_classifier() {
        let dir = tempfile::tempdir().unwrap();
        let params_path = dir.path().join("nested").join("params.json");
        let model_path = dir.path().join("model.bin");
        let mut params = TrialParams::new();
        params.insert("n_estimators".to_string(), ParameterValue::Int(7));

        write_outputs(&MarkerModel, &params, &params_path, &model_path).unwrap();

        assert_eq!(std::fs::read_to_string(&model_path).unwrap(), "marker");
        let saved: TrialParams =
            serde_json::from_str(&std::fs::read_to_string(&params_path).unwrap()).unwrap();
        assert_eq!(saved, params);
    }

    #[test]
    fn test_save_with_empty_path() {
        let (x, y) = data();
        let mut trainer = ModelTrainer::new(x, y, 42).unwrap();
        trainer.run_optimization(0.25, &search_config(1)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let result = trainer.save("", model_path.to_str().unwrap());

        assert!(matches!(result, Err(ClaimBoostError::PersistenceError(_))));
        assert!(!model_path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_save_before_optimization() {
        let (x, y) = data();
        let trainer = ModelTrainer::new(x, y, 42).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("p.json");
        let m = dir.path().join("m.json");
        assert!(matches!(
            trainer.save(p.to_str().unwrap(), m.to_str().unwrap()),
            Err(ClaimBoostError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_mismatched_rows() {
        let x = Array2::<f64>::zeros((5, 2));
        let y = Array1::<f64>::zeros(3);
        assert!(ModelTrainer::new(x, y, 0).is_err());
    }
}
