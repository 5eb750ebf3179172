//! Hyperparameter optimization module
//!
//! Provides sequential model-based hyperparameter search:
//! - Search spaces with integer and (log-)continuous ranges
//! - Tree-structured Parzen Estimator (TPE) sampling
//! - Random search
//! - A fixed-budget optimization loop that records every trial in a [`Study`]

mod config;
mod optimizer;
mod samplers;
mod search_space;

pub use config::OptimizationConfig;
pub use optimizer::{HyperOptimizer, Study, TrialResult};
pub use samplers::{create_sampler, RandomSampler, Sampler, SamplerType, TPESampler};
pub use search_space::{Parameter, ParameterType, ParameterValue, SearchSpace, TrialParams};
