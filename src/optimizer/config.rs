//! Optimization configuration

use super::SamplerType;
use serde::{Deserialize, Serialize};

/// Configuration for hyperparameter optimization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationConfig {
    /// Number of trials to run; every trial is always evaluated
    pub n_trials: usize,

    /// Sampler type
    pub sampler: SamplerType,

    /// Number of random trials before TPE starts modelling the history
    pub n_startup_trials: usize,

    /// Seed for the sampler
    pub random_state: u64,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            n_trials: 100,
            sampler: SamplerType::TPE,
            n_startup_trials: 10,
            random_state: 42,
        }
    }
}

impl OptimizationConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set number of trials
    pub fn with_n_trials(mut self, n: usize) -> Self {
        self.n_trials = n;
        self
    }

    /// Builder method to set sampler
    pub fn with_sampler(mut self, sampler: SamplerType) -> Self {
        self.sampler = sampler;
        self
    }

    /// Builder method to set the number of startup trials
    pub fn with_n_startup_trials(mut self, n: usize) -> Self {
        self.n_startup_trials = n;
        self
    }

    /// Builder method to set the seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }
}
