//! Sampling strategies for hyperparameter optimization

use super::search_space::{Parameter, SearchSpace, TrialParams};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Type of sampler to use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SamplerType {
    /// Uniform random sampling
    Random,
    /// Tree-structured Parzen Estimator
    TPE,
}

/// Trait for hyperparameter samplers.
///
/// Scores are always maximized.
pub trait Sampler: Send {
    /// Propose the next assignment given every completed trial
    fn sample(&mut self, search_space: &SearchSpace, history: &[(TrialParams, f64)]) -> TrialParams;

    /// Record the outcome of the assignment returned by the last `sample` call
    fn tell(&mut self, _params: &TrialParams, _value: f64) {}
}

/// Random sampler
#[derive(Debug)]
pub struct RandomSampler {
    rng: Xoshiro256PlusPlus,
}

impl RandomSampler {
    /// Create a new random sampler
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }
}

impl Sampler for RandomSampler {
    fn sample(&mut self, search_space: &SearchSpace, _history: &[(TrialParams, f64)]) -> TrialParams {
        search_space.sample(&mut self.rng)
    }
}

/// Tree-structured Parzen Estimator sampler.
///
/// Each parameter is modelled independently: completed trials are split into
/// the best `gamma(n)` and the rest, each group becomes a mixture of truncated
/// Gaussians, and the candidate with the highest `l(x) / g(x)` ratio wins.
#[derive(Debug)]
pub struct TPESampler {
    rng: Xoshiro256PlusPlus,
    n_startup_trials: usize,
    n_ei_candidates: usize,
    max_good: usize,
}

impl TPESampler {
    /// Create a new TPE sampler
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            n_startup_trials: 10,
            n_ei_candidates: 24,
            max_good: 25,
        }
    }

    /// Set number of random startup trials
    pub fn with_n_startup(mut self, n: usize) -> Self {
        self.n_startup_trials = n;
        self
    }

    /// Size of the "good" group: 10% of the history, at least one, at most `max_good`
    fn n_good(&self, n: usize) -> usize {
        ((n as f64 * 0.1).ceil() as usize).clamp(1, self.max_good)
    }

    fn sample_parameter(
        &mut self,
        param: &Parameter,
        good: &[f64],
        bad: &[f64],
    ) -> f64 {
        let (low, high) = param.internal_bounds();
        if high <= low {
            return low;
        }

        let below = ParzenEstimator::new(good, low, high);
        let above = ParzenEstimator::new(bad, low, high);

        let mut best_x = low;
        let mut best_score = f64::NEG_INFINITY;
        for _ in 0..self.n_ei_candidates {
            let x = below.sample(&mut self.rng);
            let score = below.log_pdf(x) - above.log_pdf(x);
            if score > best_score {
                best_score = score;
                best_x = x;
            }
        }
        best_x
    }
}

impl Sampler for TPESampler {
    fn sample(&mut self, search_space: &SearchSpace, history: &[(TrialParams, f64)]) -> TrialParams {
        if history.len() < self.n_startup_trials || history.is_empty() {
            return search_space.sample(&mut self.rng);
        }

        // Best first; stable sort keeps earlier trials ahead on ties
        let mut order: Vec<usize> = (0..history.len()).collect();
        order.sort_by(|&a, &b| {
            history[b]
                .1
                .partial_cmp(&history[a].1)
                .unwrap_or(Ordering::Equal)
        });
        let n_good = self.n_good(history.len());
        let (good_idx, bad_idx) = order.split_at(n_good);

        let mut params = TrialParams::new();
        for param in search_space.parameters() {
            let observe = |indices: &[usize]| -> Vec<f64> {
                indices
                    .iter()
                    .filter_map(|&i| history[i].0.get(&param.name))
                    .filter_map(|v| param.to_internal(v))
                    .collect()
            };
            let good = observe(good_idx);
            let bad = observe(bad_idx);

            let x = self.sample_parameter(param, &good, &bad);
            params.insert(param.name.clone(), param.from_internal(x));
        }
        params
    }
}

/// One-dimensional mixture of truncated Gaussians with a uniform-ish prior component
#[derive(Debug, Clone)]
struct ParzenEstimator {
    mus: Vec<f64>,
    sigmas: Vec<f64>,
    low: f64,
    high: f64,
}

impl ParzenEstimator {
    fn new(observations: &[f64], low: f64, high: f64) -> Self {
        let span = high - low;
        let prior_mu = 0.5 * (low + high);

        let mut points: Vec<(f64, bool)> = observations
            .iter()
            .map(|&x| (x.clamp(low, high), false))
            .collect();
        points.push((prior_mu, true));
        points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let min_sigma = span / (100.0f64).min(1.0 + points.len() as f64);
        let mut mus = Vec::with_capacity(points.len());
        let mut sigmas = Vec::with_capacity(points.len());

        for (i, &(mu, is_prior)) in points.iter().enumerate() {
            let sigma = if is_prior {
                span
            } else {
                let prev = if i == 0 { low } else { points[i - 1].0 };
                let next = if i + 1 == points.len() { high } else { points[i + 1].0 };
                (mu - prev).max(next - mu).clamp(min_sigma, span)
            };
            mus.push(mu);
            sigmas.push(sigma);
        }

        Self { mus, sigmas, low, high }
    }

    fn sample(&self, rng: &mut impl Rng) -> f64 {
        let k = rng.gen_range(0..self.mus.len());
        let (mu, sigma) = (self.mus[k], self.sigmas[k]);

        for _ in 0..100 {
            let x = mu + sigma * standard_normal(rng);
            if x >= self.low && x <= self.high {
                return x;
            }
        }
        mu.clamp(self.low, self.high)
    }

    fn log_pdf(&self, x: f64) -> f64 {
        let weight = 1.0 / self.mus.len() as f64;
        let density: f64 = self
            .mus
            .iter()
            .zip(&self.sigmas)
            .map(|(&mu, &sigma)| {
                let mass = normal_cdf((self.high - mu) / sigma) - normal_cdf((self.low - mu) / sigma);
                weight * normal_pdf((x - mu) / sigma) / (sigma * mass.max(1e-12))
            })
            .sum();
        density.max(1e-300).ln()
    }
}

/// Standard normal draw (Box-Muller)
fn standard_normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Standard normal CDF approximation
fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Standard normal PDF
fn normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// Error function approximation (Abramowitz and Stegun)
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

/// Create a sampler from type. `n_startup_trials` only affects TPE.
pub fn create_sampler(
    sampler_type: &SamplerType,
    seed: u64,
    n_startup_trials: usize,
) -> Box<dyn Sampler> {
    match sampler_type {
        SamplerType::Random => Box::new(RandomSampler::new(seed)),
        SamplerType::TPE => Box::new(TPESampler::new(seed).with_n_startup(n_startup_trials)),
    }
}
