//! Hyperparameter search for a binary classifier
//!
//! Each trial fits a fresh classifier on a seeded sub-split of the training
//! set and scores it by validation accuracy. The best assignment is then
//! refit on the full training set.

use super::models::{accuracy, BinaryClassifier};
use super::split::split_arrays;
use crate::error::{ClaimBoostError, Result};
use crate::optimizer::{
    HyperOptimizer, OptimizationConfig, ParameterValue, SamplerType, SearchSpace, Study,
    TrialParams,
};
use ndarray::{Array1, Array2};
use tracing::{debug, info};

/// Key under which the run seed is added to the best parameters
pub const RANDOM_STATE_KEY: &str = "random_state";

/// Budget and seeds of one search
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub n_trials: usize,
    /// Fraction of the training set held out to score each trial
    pub validation_fraction: f64,
    pub random_state: u64,
    pub sampler: SamplerType,
}

impl SearchSettings {
    pub fn new(n_trials: usize, validation_fraction: f64, random_state: u64) -> Self {
        Self {
            n_trials,
            validation_fraction,
            random_state,
            sampler: SamplerType::TPE,
        }
    }

    pub fn with_sampler(mut self, sampler: SamplerType) -> Self {
        self.sampler = sampler;
        self
    }
}

/// Outcome of [`optimize_classifier`]
#[derive(Debug)]
pub struct SearchResult<C> {
    /// Search-space keys of the best trial plus `random_state`
    pub best_params: TrialParams,
    /// Validation accuracy of the best trial
    pub best_score: f64,
    /// Classifier refit on the full training set
    pub model: C,
    pub study: Study,
}

/// Copy of `params` with the run seed added
pub fn with_random_state(params: &TrialParams, random_state: u64) -> TrialParams {
    let mut params = params.clone();
    params.insert(
        RANDOM_STATE_KEY.to_string(),
        ParameterValue::Int(random_state as i64),
    );
    params
}

/// Run `settings.n_trials` trials, then refit the best assignment on `(x, y)`.
///
/// `build` turns an assignment (always including `random_state`) into an
/// unfitted classifier. Any error from building, fitting or predicting aborts
/// the search.
pub fn optimize_classifier<C, B>(
    x: &Array2<f64>,
    y: &Array1<f64>,
    search_space: SearchSpace,
    settings: &SearchSettings,
    mut build: B,
) -> Result<SearchResult<C>>
where
    C: BinaryClassifier,
    B: FnMut(&TrialParams) -> Result<C>,
{
    let seed = settings.random_state;
    let split = split_arrays(x, y, settings.validation_fraction, seed)?;
    debug!(
        train_rows = split.x_train.nrows(),
        validation_rows = split.x_test.nrows(),
        "Validation split for hyperparameter search"
    );

    let config = OptimizationConfig::new()
        .with_n_trials(settings.n_trials)
        .with_sampler(settings.sampler.clone())
        .with_random_state(seed);
    let mut optimizer = HyperOptimizer::new(config, search_space)?;

    optimizer.optimize(|params| {
        let mut model = build(&with_random_state(params, seed))?;
        model.fit(&split.x_train, &split.y_train)?;
        let predictions = model.predict(&split.x_test)?;
        Ok(accuracy(&split.y_test, &predictions))
    })?;

    let study = optimizer.into_study();
    let best = study.best_trial().ok_or_else(|| {
        ClaimBoostError::OptimizationError("search finished without trials".to_string())
    })?;
    let best_params = with_random_state(&best.params, seed);
    let best_score = best.value;
    info!(
        trial = best.trial_id,
        score = best_score,
        n_trials = study.trials.len(),
        "Hyperparameter search finished"
    );

    let mut model = build(&best_params)?;
    model.fit(x, y)?;
    debug!(rows = x.nrows(), "Best model refit on the full training set");

    Ok(SearchResult {
        best_params,
        best_score,
        model,
        study,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::GbdtClassifier;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Predicts the majority label seen in `fit` and counts fits
    struct MajorityClassifier {
        fits: Arc<AtomicUsize>,
        label: f64,
    }

    impl BinaryClassifier for MajorityClassifier {
        fn fit(&mut self, _x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
            self.fits.fetch_add(1, Ordering::SeqCst);
            let positives = y.iter().filter(|&&v| v > 0.5).count();
            self.label = if positives * 2 > y.len() { 1.0 } else { 0.0 };
            Ok(())
        }

        fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
            Ok(Array1::from_elem(x.nrows(), self.label))
        }

        fn save_model(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    fn data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((40, 2), |(i, j)| (i + j) as f64);
        let y = Array1::from_shape_fn(40, |i| if i >= 20 { 1.0 } else { 0.0 });
        (x, y)
    }

    fn space() -> SearchSpace {
        SearchSpace::new()
            .int("n_estimators", 5, 20)
            .log_float("learning_rate", 0.05, 0.3)
    }

    #[test]
    fn test_single_trial_fits_twice() {
        let (x, y) = data();
        let fits = Arc::new(AtomicUsize::new(0));
        let settings = SearchSettings::new(1, 0.25, 42);

        let result = optimize_classifier(&x, &y, space(), &settings, |_| {
            Ok(MajorityClassifier { fits: Arc::clone(&fits), label: 0.0 })
        })
        .unwrap();

        assert_eq!(result.study.trials.len(), 1);
        assert_eq!(result.study.best_trial_idx, Some(0));
        assert_eq!(fits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_best_params_keys() {
        let (x, y) = data();
        let settings = SearchSettings::new(3, 0.25, 42);
        let fits = Arc::new(AtomicUsize::new(0));

        let result = optimize_classifier(&x, &y, space(), &settings, |_| {
            Ok(MajorityClassifier { fits: Arc::clone(&fits), label: 0.0 })
        })
        .unwrap();

        let keys: Vec<&str> = result.best_params.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["learning_rate", "n_estimators", "random_state"]);
        assert_eq!(result.best_params["random_state"], ParameterValue::Int(42));
        assert_eq!(fits.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_builder_sees_random_state() {
        let (x, y) = data();
        let settings = SearchSettings::new(2, 0.25, 9);
        let fits = Arc::new(AtomicUsize::new(0));

        optimize_classifier(&x, &y, space(), &settings, |params| {
            assert_eq!(params.get(RANDOM_STATE_KEY), Some(&ParameterValue::Int(9)));
            Ok(MajorityClassifier { fits: Arc::clone(&fits), label: 0.0 })
        })
        .unwrap();
    }

    #[test]
    fn test_build_error_aborts() {
        let (x, y) = data();
        let settings = SearchSettings::new(5, 0.25, 1);
        let mut calls = 0;

        let result = optimize_classifier::<MajorityClassifier, _>(&x, &y, space(), &settings, |_| {
            calls += 1;
            Err(ClaimBoostError::TrainingError("cannot build".to_string()))
        });

        assert!(matches!(result, Err(ClaimBoostError::TrainingError(_))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_gbdt_search_is_reproducible() {
        let (x, y) = data();
        let settings = SearchSettings::new(4, 0.25, 3);
        let run = || {
            let result = optimize_classifier(&x, &y, space(), &settings, |p| {
                GbdtClassifier::from_params(p, 3)
            })
            .unwrap();
            let scores: Vec<f64> = result.study.trials.iter().map(|t| t.value).collect();
            (result.best_params, scores)
        };
        assert_eq!(run(), run());
    }
}
