//! Data preprocessing module
//!
//! Provides:
//! - One-hot encoding of categorical columns
//! - Claim label derivation and leak-column removal
//! - Table to ndarray conversion and the train/test split

mod encoder;
pub mod etl;

pub use encoder::OneHotEncoder;
pub use etl::{
    to_arrays, train_test_split, transform_dataset, DataSplit, CATEGORICAL_COLUMNS,
    CLAIM_COUNT_COLUMN, DEFAULT_TEST_SIZE, NUMERICAL_COLUMNS, TARGET_COLUMN,
};
