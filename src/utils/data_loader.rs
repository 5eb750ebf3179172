//! Data loading utilities

use crate::error::{ClaimBoostError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// CSV loader for the training dataset
pub struct DataLoader {
    /// Rows scanned to infer the schema; `None` scans the whole file
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(10_000),
        }
    }

    /// Set the number of rows used for schema inference
    pub fn with_infer_schema_length(mut self, n: Option<usize>) -> Self {
        self.infer_schema_length = n;
        self
    }

    /// Load a headered CSV file
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ClaimBoostError::DataError(format!(
                "Dataset file does not exist: {}",
                path.display()
            )));
        }

        let file = File::open(path)
            .map_err(|e| ClaimBoostError::DataError(e.to_string()))?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| ClaimBoostError::DataError(e.to_string()))?;

        debug!(
            path = %path.display(),
            rows = df.height(),
            cols = df.width(),
            "Loaded dataset"
        );
        Ok(df)
    }
}

/// Save DataFrames to disk
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV with a header row and no index column
    pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        crate::utils::ensure_parent_dir(path)?;

        let mut file = File::create(path)
            .map_err(|e| ClaimBoostError::DataError(e.to_string()))?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| ClaimBoostError::DataError(e.to_string()))
    }
}
