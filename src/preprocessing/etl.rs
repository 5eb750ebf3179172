//! Claim dataset feature transformation
//!
//! Turns the raw `pg15training` table into a binary claim label plus a
//! purely numeric feature table, then into ndarray train/test partitions.

use super::encoder::OneHotEncoder;
use crate::error::{ClaimBoostError, Result};
use crate::training::split_arrays;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use tracing::debug;

/// Name of the derived label column
pub const TARGET_COLUMN: &str = "target";

/// Number of third-party property-damage claims; the label source
pub const CLAIM_COUNT_COLUMN: &str = "Numtppd";

pub const CATEGORICAL_COLUMNS: [&str; 8] = [
    "CalYear",
    "Gender",
    "Type",
    "Category",
    "Occupation",
    "SubGroup2",
    "Group2",
    "Group1",
];

/// Claim counts and indicators that leak the label
pub const NUMERICAL_COLUMNS: [&str; 4] = ["Numtppd", "Numtpbi", "Indtppd", "Indtpbi"];

/// Fraction of rows held out as the final test set
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Feature/label partitions produced by [`train_test_split`]
#[derive(Debug, Clone)]
pub struct DataSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
    /// Column names of the feature matrices, in column order
    pub feature_names: Vec<String>,
}

/// Derive `target`, drop the leaking columns and one-hot encode the
/// categoricals.
///
/// `target` is 1 when `Numtppd` is non-zero or missing, 0 otherwise.
pub fn transform_dataset(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();
    result.with_column(claim_label(df)?)?;

    for col_name in NUMERICAL_COLUMNS {
        if result.column(col_name).is_err() {
            return Err(ClaimBoostError::FeatureNotFound(col_name.to_string()));
        }
        result = result.drop(col_name)?;
    }

    let mut encoder = OneHotEncoder::new();
    let result = encoder.fit_transform(&result, &CATEGORICAL_COLUMNS)?;

    debug!(
        rows = result.height(),
        columns = result.width(),
        indicators = encoder.feature_names().len(),
        "Dataset transformed"
    );
    Ok(result)
}

fn claim_label(df: &DataFrame) -> Result<Series> {
    let counts = df
        .column(CLAIM_COUNT_COLUMN)
        .map_err(|_| ClaimBoostError::FeatureNotFound(CLAIM_COUNT_COLUMN.to_string()))?
        .cast(&DataType::Float64)?;
    let labels: Vec<i32> = counts
        .f64()
        .map_err(|e| ClaimBoostError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| match v {
            Some(count) if count == 0.0 => 0,
            _ => 1,
        })
        .collect();
    Ok(Series::new(TARGET_COLUMN.into(), labels))
}

/// Separate `target` from the features and convert both to arrays.
///
/// Missing values become 0.0. Returns `(x, y, feature_names)`.
pub fn to_arrays(df: &DataFrame) -> Result<(Array2<f64>, Array1<f64>, Vec<String>)> {
    let target = df
        .column(TARGET_COLUMN)
        .map_err(|_| ClaimBoostError::FeatureNotFound(TARGET_COLUMN.to_string()))?;
    let y: Array1<f64> = float_values(target)?.into_iter().collect();

    let feature_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != TARGET_COLUMN)
        .map(|s| s.to_string())
        .collect();

    let x = columns_to_array2(df, &feature_names)?;
    Ok((x, y, feature_names))
}

/// Seeded train/test split of a transformed table
pub fn train_test_split(df: &DataFrame, test_size: f64, seed: u64) -> Result<DataSplit> {
    let (x, y, feature_names) = to_arrays(df)?;
    let split = split_arrays(&x, &y, test_size, seed)?;
    debug!(
        train_rows = split.x_train.nrows(),
        test_rows = split.x_test.nrows(),
        features = feature_names.len(),
        "Train/test split"
    );
    Ok(DataSplit {
        x_train: split.x_train,
        x_test: split.x_test,
        y_train: split.y_train,
        y_test: split.y_test,
        feature_names,
    })
}

fn float_values(column: &Column) -> Result<Vec<f64>> {
    if column.dtype() == &DataType::String {
        return Err(ClaimBoostError::DataError(format!(
            "Column '{}' is not numeric",
            column.name()
        )));
    }
    let values = column
        .cast(&DataType::Float64)
        .map_err(|e| ClaimBoostError::DataError(e.to_string()))?;
    let values = values
        .f64()
        .map_err(|e| ClaimBoostError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();
    Ok(values)
}

/// Row-major matrix of the named columns
fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let column = df
                .column(col_name)
                .map_err(|_| ClaimBoostError::FeatureNotFound(col_name.clone()))?;
            float_values(column)
        })
        .collect::<Result<_>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(Vec::as_slice).collect();
    Ok(Array2::from_shape_fn((df.height(), col_names.len()), |(r, c)| {
        col_refs[c][r]
    }))
}
