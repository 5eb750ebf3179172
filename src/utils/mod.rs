//! Utility functions and types

pub mod data_loader;

pub use data_loader::{DataLoader, DataSaver};

use crate::error::{ClaimBoostError, Result};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

/// Simple wall-clock timer for stage logging
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed seconds since start
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Reject empty output paths before anything touches the filesystem
pub fn require_output_path<'a>(path: &'a str, what: &str) -> Result<&'a Path> {
    if path.trim().is_empty() {
        return Err(ClaimBoostError::PersistenceError(format!(
            "Parameter {} is empty",
            what
        )));
    }
    Ok(Path::new(path))
}

/// Create the parent directory of `path` if it does not exist
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Serialize `value` as JSON to `path`, creating parent directories
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}
