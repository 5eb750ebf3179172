//! One-hot encoding of categorical columns

use crate::error::{ClaimBoostError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoder.
///
/// Each encoded column `c` is replaced by Int32 indicator columns named
/// `c_<value>`, one per distinct non-null value in sorted order (numeric
/// order for numeric columns). Indicators are
/// placed after all non-encoded columns, grouped in the order the columns were
/// given to [`fit`](Self::fit).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// Column name -> sorted categories
    categories: Vec<(String, Vec<String>)>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the categories of `columns`
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.categories.clear();
        for col_name in columns {
            let values = string_values(df, col_name)?;
            let distinct: BTreeSet<String> = values
                .str()
                .map_err(|e| ClaimBoostError::DataError(e.to_string()))?
                .into_iter()
                .flatten()
                .map(str::to_string)
                .collect();
            let mut categories: Vec<String> = distinct.into_iter().collect();
            if is_numeric(df.column(col_name)?.dtype()) {
                categories.sort_by(|a, b| {
                    let (a, b) = (a.parse::<f64>(), b.parse::<f64>());
                    match (a, b) {
                        (Ok(a), Ok(b)) => a.total_cmp(&b),
                        _ => std::cmp::Ordering::Equal,
                    }
                });
            }
            self.categories.push((col_name.to_string(), categories));
        }
        self.is_fitted = true;
        Ok(self)
    }

    /// Replace the fitted columns by their indicator columns
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(ClaimBoostError::ModelNotFitted);
        }

        let mut indicators: Vec<Series> = Vec::new();
        for (col_name, categories) in &self.categories {
            let values = string_values(df, col_name)?;
            let ca = values
                .str()
                .map_err(|e| ClaimBoostError::DataError(e.to_string()))?;

            for category in categories {
                let new_col_name = format!("{}_{}", col_name, category);
                let flags: Vec<i32> = ca
                    .into_iter()
                    .map(|v| if v == Some(category.as_str()) { 1 } else { 0 })
                    .collect();
                indicators.push(Series::new(new_col_name.into(), flags));
            }
        }

        let mut result = df.clone();
        for (col_name, _) in &self.categories {
            result = result.drop(col_name)?;
        }
        for series in indicators {
            result.with_column(series)?;
        }
        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Indicator column names produced by [`transform`](Self::transform)
    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .flat_map(|(col, cats)| cats.iter().map(move |c| format!("{}_{}", col, c)))
            .collect()
    }
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Column `name` rendered as strings
fn string_values(df: &DataFrame, name: &str) -> Result<Column> {
    let column = df
        .column(name)
        .map_err(|_| ClaimBoostError::FeatureNotFound(name.to_string()))?;
    Ok(column.cast(&DataType::String)?)
}
