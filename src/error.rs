//! Error types for the claimboost pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, ClaimBoostError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum ClaimBoostError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Download error: {0}")]
    DownloadError(String),

    #[error("RData error: {0}")]
    RDataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Optimization error: {0}")]
    OptimizationError(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for ClaimBoostError {
    fn from(err: polars::error::PolarsError) -> Self {
        ClaimBoostError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ClaimBoostError {
    fn from(err: serde_json::Error) -> Self {
        ClaimBoostError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ClaimBoostError {
    fn from(err: serde_yaml::Error) -> Self {
        ClaimBoostError::ConfigError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ClaimBoostError {
    fn from(err: ndarray::ShapeError) -> Self {
        ClaimBoostError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClaimBoostError {
    fn from(err: reqwest::Error) -> Self {
        ClaimBoostError::DownloadError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClaimBoostError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ClaimBoostError = io_err.into();
        assert!(matches!(err, ClaimBoostError::IoError(_)));
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = ClaimBoostError::InvalidParameter {
            name: "learning_rate".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid parameter: learning_rate = 0, must be positive"
        );
    }
}
