//! Search space definition for hyperparameters

use crate::error::{ClaimBoostError, Result};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Type of parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterType {
    /// Continuous float parameter
    Float {
        low: f64,
        high: f64,
        log_scale: bool,
    },
    /// Integer parameter, both bounds inclusive
    Int { low: i64, high: i64 },
}

/// A single hyperparameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: ParameterType,
}

impl Parameter {
    /// Create a float parameter
    pub fn float(name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            param_type: ParameterType::Float {
                low,
                high,
                log_scale: false,
            },
        }
    }

    /// Create a log-scale float parameter
    pub fn log_float(name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            param_type: ParameterType::Float {
                low,
                high,
                log_scale: true,
            },
        }
    }

    /// Create an integer parameter
    pub fn int(name: impl Into<String>, low: i64, high: i64) -> Self {
        Self {
            name: name.into(),
            param_type: ParameterType::Int { low, high },
        }
    }

    /// Check the range invariants
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| ClaimBoostError::InvalidParameter {
            name: self.name.clone(),
            value: format!("{:?}", self.param_type),
            reason: reason.to_string(),
        };

        match self.param_type {
            ParameterType::Float { low, high, log_scale } => {
                if !low.is_finite() || !high.is_finite() {
                    return Err(invalid("bounds must be finite"));
                }
                if low > high {
                    return Err(invalid("min must not exceed max"));
                }
                if log_scale && low <= 0.0 {
                    return Err(invalid("log-scaled range requires min > 0"));
                }
            }
            ParameterType::Int { low, high } => {
                if low > high {
                    return Err(invalid("min must not exceed max"));
                }
            }
        }
        Ok(())
    }

    /// Sample a value uniformly (log-uniformly for log-scaled floats)
    pub fn sample(&self, rng: &mut impl Rng) -> ParameterValue {
        match self.param_type {
            ParameterType::Float { low, high, log_scale } => {
                let val = if log_scale {
                    let log_low = low.ln();
                    let log_high = high.ln();
                    (rng.gen::<f64>() * (log_high - log_low) + log_low).exp()
                } else {
                    rng.gen::<f64>() * (high - low) + low
                };
                ParameterValue::Float(val.clamp(low, high))
            }
            ParameterType::Int { low, high } => ParameterValue::Int(rng.gen_range(low..=high)),
        }
    }

    /// Whether a value has the right kind and lies within the bounds
    pub fn contains(&self, value: &ParameterValue) -> bool {
        match (&self.param_type, value) {
            (ParameterType::Float { low, high, .. }, ParameterValue::Float(v)) => {
                v.is_finite() && *v >= *low && *v <= *high
            }
            (ParameterType::Int { low, high }, ParameterValue::Int(v)) => *v >= *low && *v <= *high,
            _ => false,
        }
    }

    /// Whether the sampler should work on the logarithm of the value
    pub fn is_log_scale(&self) -> bool {
        matches!(self.param_type, ParameterType::Float { log_scale: true, .. })
    }

    /// Bounds of the continuous space the samplers model this parameter in.
    ///
    /// Log-scaled floats live in log space; integers are widened by half a
    /// step on each side so every integer gets an equal share.
    pub fn internal_bounds(&self) -> (f64, f64) {
        match self.param_type {
            ParameterType::Float { low, high, log_scale: true } => (low.ln(), high.ln()),
            ParameterType::Float { low, high, .. } => (low, high),
            ParameterType::Int { low, high } => (low as f64 - 0.5, high as f64 + 0.5),
        }
    }

    /// Map a value into the internal space
    pub fn to_internal(&self, value: &ParameterValue) -> Option<f64> {
        let v = value.as_float()?;
        Some(if self.is_log_scale() { v.ln() } else { v })
    }

    /// Map an internal-space point back to a valid value
    pub fn from_internal(&self, x: f64) -> ParameterValue {
        match self.param_type {
            ParameterType::Float { low, high, log_scale } => {
                let v = if log_scale { x.exp() } else { x };
                ParameterValue::Float(v.clamp(low, high))
            }
            ParameterType::Int { low, high } => {
                ParameterValue::Int((x.round() as i64).clamp(low, high))
            }
        }
    }
}

/// Sampled parameter value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Int(i64),
    Float(f64),
}

impl ParameterValue {
    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(v) => Some(*v),
            ParameterValue::Int(v) => Some(*v as f64),
        }
    }

    /// Get as int; floats are only accepted when integral
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(v) => Some(*v),
            ParameterValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            ParameterValue::Float(_) => None,
        }
    }
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterValue::Int(v) => write!(f, "{}", v),
            ParameterValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Search space for hyperparameter optimization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    parameters: Vec<Parameter>,
}

impl SearchSpace {
    /// Create a new empty search space
    pub fn new() -> Self {
        Self {
            parameters: Vec::new(),
        }
    }

    /// Add a parameter to the search space
    pub fn add(mut self, param: Parameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// Add a float parameter
    pub fn float(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.add(Parameter::float(name, low, high))
    }

    /// Add a log-scale float parameter
    pub fn log_float(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.add(Parameter::log_float(name, low, high))
    }

    /// Add an integer parameter
    pub fn int(self, name: impl Into<String>, low: i64, high: i64) -> Self {
        self.add(Parameter::int(name, low, high))
    }

    /// Get all parameters, in insertion order
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Parameter names, in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }

    /// Validate every range and reject duplicate names
    pub fn validate(&self) -> Result<()> {
        for (i, param) in self.parameters.iter().enumerate() {
            param.validate()?;
            if self.parameters[..i].iter().any(|p| p.name == param.name) {
                return Err(ClaimBoostError::InvalidParameter {
                    name: param.name.clone(),
                    value: String::new(),
                    reason: "duplicate parameter name".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Sample a random configuration
    pub fn sample(&self, rng: &mut impl Rng) -> TrialParams {
        self.parameters
            .iter()
            .map(|p| (p.name.clone(), p.sample(rng)))
            .collect()
    }

    /// Check that `params` assigns an in-range value to exactly these parameters
    pub fn check(&self, params: &TrialParams) -> Result<()> {
        for param in &self.parameters {
            match params.get(&param.name) {
                Some(value) if param.contains(value) => {}
                Some(value) => {
                    return Err(ClaimBoostError::OptimizationError(format!(
                        "sampled value {} for '{}' is outside {:?}",
                        value, param.name, param.param_type
                    )))
                }
                None => {
                    return Err(ClaimBoostError::OptimizationError(format!(
                        "sampler did not assign '{}'",
                        param.name
                    )))
                }
            }
        }
        if params.len() != self.parameters.len() {
            return Err(ClaimBoostError::OptimizationError(
                "sampler assigned parameters outside the search space".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

/// Sampled configuration, ordered by parameter name
pub type TrialParams = BTreeMap<String, ParameterValue>;

#[cfg(test)]
mod tests {
    use super::*;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn space() -> SearchSpace {
        SearchSpace::new()
            .int("n_estimators", 5, 20)
            .log_float("learning_rate", 0.05, 0.2)
            .float("subsample", 0.7, 1.0)
    }

    #[test]
    fn test_search_space_builder() {
        let space = space();
        assert_eq!(space.len(), 3);
        assert!(space.validate().is_ok());
    }

    #[test]
    fn test_samples_within_bounds() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let space = space();
        for _ in 0..500 {
            let params = space.sample(&mut rng);
            assert!(space.check(&params).is_ok());
            assert!(matches!(params["n_estimators"], ParameterValue::Int(_)));
        }
    }

    #[test]
    fn test_int_range_hits_both_ends() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let param = Parameter::int("depth", 2, 4);
        let values: Vec<i64> = (0..200)
            .filter_map(|_| param.sample(&mut rng).as_int())
            .collect();
        assert!(values.contains(&2));
        assert!(values.contains(&4));
    }

    #[test]
    fn test_log_scale_sampling_is_log_uniform() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let param = Parameter::log_float("lr", 0.0001, 1.0);

        let samples: Vec<f64> = (0..4000)
            .filter_map(|_| param.sample(&mut rng).as_float())
            .collect();

        assert!(samples.iter().all(|&v| (0.0001..=1.0).contains(&v)));
        // Each decade should get about a quarter of the mass
        let below = samples.iter().filter(|&&v| v < 0.001).count() as f64 / samples.len() as f64;
        assert!((below - 0.25).abs() < 0.05, "fraction below 1e-3: {}", below);
    }

    #[test]
    fn test_degenerate_range() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let param = Parameter::float("x", 0.5, 0.5);
        assert!(param.validate().is_ok());
        assert_eq!(param.sample(&mut rng), ParameterValue::Float(0.5));
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(Parameter::int("a", 3, 2).validate().is_err());
        assert!(Parameter::float("b", 1.0, 0.0).validate().is_err());
        assert!(Parameter::log_float("c", 0.0, 1.0).validate().is_err());
        let dup = SearchSpace::new().int("a", 0, 1).int("a", 0, 1);
        assert!(dup.validate().is_err());
    }

    #[test]
    fn test_check_rejects_wrong_kind_and_extra_keys() {
        let space = SearchSpace::new().int("k", 0, 3);
        let mut params = TrialParams::new();
        params.insert("k".to_string(), ParameterValue::Float(1.5));
        assert!(space.check(&params).is_err());

        params.insert("k".to_string(), ParameterValue::Int(1));
        params.insert("extra".to_string(), ParameterValue::Int(0));
        assert!(space.check(&params).is_err());
    }

    #[test]
    fn test_internal_round_trip() {
        let param = Parameter::int("leaves", 8, 16);
        assert_eq!(param.internal_bounds(), (7.5, 16.5));
        assert_eq!(param.from_internal(16.4), ParameterValue::Int(16));
        assert_eq!(param.from_internal(7.6), ParameterValue::Int(8));

        let lr = Parameter::log_float("lr", 0.01, 1.0);
        let x = lr.to_internal(&ParameterValue::Float(0.1)).unwrap();
        match lr.from_internal(x) {
            ParameterValue::Float(v) => assert!((v - 0.1).abs() < 1e-12),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_values_serialize_as_plain_numbers() {
        let mut params = TrialParams::new();
        params.insert("n".to_string(), ParameterValue::Int(10));
        params.insert("lr".to_string(), ParameterValue::Float(0.5));
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"lr":0.5,"n":10}"#);
    }
}
