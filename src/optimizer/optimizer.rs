//! HyperOptimizer - fixed-budget sequential hyperparameter search

use super::{
    config::OptimizationConfig,
    samplers::{create_sampler, Sampler},
    search_space::{SearchSpace, TrialParams},
};
use crate::error::{ClaimBoostError, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Result of a single trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Trial number
    pub trial_id: usize,
    /// Parameters used
    pub params: TrialParams,
    /// Objective value
    pub value: f64,
    /// Trial duration in seconds
    pub duration_secs: f64,
}

/// Study containing all trials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Study {
    /// All trial results, in evaluation order
    pub trials: Vec<TrialResult>,
    /// Best trial index
    pub best_trial_idx: Option<usize>,
    /// Total duration
    pub total_duration_secs: f64,
}

impl Study {
    /// Create a new study
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the best trial
    pub fn best_trial(&self) -> Option<&TrialResult> {
        self.best_trial_idx.map(|idx| &self.trials[idx])
    }

    /// Get the best value
    pub fn best_value(&self) -> Option<f64> {
        self.best_trial().map(|t| t.value)
    }

    /// Get the best parameters
    pub fn best_params(&self) -> Option<&TrialParams> {
        self.best_trial().map(|t| &t.params)
    }

    /// Add a trial result. Only a strictly higher value replaces the best trial.
    pub fn add_trial(&mut self, result: TrialResult) {
        let idx = self.trials.len();

        let is_better = match self.best_value() {
            None => true,
            Some(best) => result.value > best,
        };
        if is_better {
            self.best_trial_idx = Some(idx);
        }

        self.trials.push(result);
    }
}

/// Sequential model-based hyperparameter optimizer (maximizes the objective)
pub struct HyperOptimizer {
    config: OptimizationConfig,
    search_space: SearchSpace,
    sampler: Box<dyn Sampler>,
    study: Study,
}

impl HyperOptimizer {
    /// Create a new optimizer with the sampler named in the config
    pub fn new(config: OptimizationConfig, search_space: SearchSpace) -> Result<Self> {
        let sampler =
            create_sampler(&config.sampler, config.random_state, config.n_startup_trials);
        Self::with_sampler(config, search_space, sampler)
    }

    /// Create an optimizer around any sampler
    pub fn with_sampler(
        config: OptimizationConfig,
        search_space: SearchSpace,
        sampler: Box<dyn Sampler>,
    ) -> Result<Self> {
        if config.n_trials == 0 {
            return Err(ClaimBoostError::OptimizationError(
                "n_trials must be at least 1".to_string(),
            ));
        }
        search_space.validate()?;

        Ok(Self {
            config,
            search_space,
            sampler,
            study: Study::new(),
        })
    }

    /// Run exactly `n_trials` trials. The first objective error aborts the search.
    pub fn optimize<F>(&mut self, mut objective: F) -> Result<&Study>
    where
        F: FnMut(&TrialParams) -> Result<f64>,
    {
        let start = Instant::now();
        let mut history: Vec<(TrialParams, f64)> = Vec::with_capacity(self.config.n_trials);

        for trial_id in 0..self.config.n_trials {
            let trial_start = Instant::now();

            let params = self.sampler.sample(&self.search_space, &history);
            self.search_space.check(&params)?;

            let value = objective(&params)?;
            if value.is_nan() {
                return Err(ClaimBoostError::OptimizationError(format!(
                    "trial {} returned NaN",
                    trial_id
                )));
            }
            self.sampler.tell(&params, value);
            history.push((params.clone(), value));

            self.study.add_trial(TrialResult {
                trial_id,
                params,
                value,
                duration_secs: trial_start.elapsed().as_secs_f64(),
            });

            debug!(
                trial = trial_id,
                value,
                best = self.study.best_value().unwrap_or(value),
                "Trial finished"
            );
        }

        self.study.total_duration_secs = start.elapsed().as_secs_f64();

        Ok(&self.study)
    }

    /// Get the study results
    pub fn study(&self) -> &Study {
        &self.study
    }

    /// Consume the optimizer, keeping its study
    pub fn into_study(self) -> Study {
        self.study
    }
}
