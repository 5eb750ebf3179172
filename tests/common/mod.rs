//! Shared fixtures for integration tests

#![allow(dead_code)]

use claimboost::config::{load_config, Config};
use claimboost::utils::DataSaver;
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::path::Path;

/// A small table with the columns of `pg15training`.
///
/// Claims are more likely for young drivers and the "Large" category, so a
/// tree model has something to learn.
pub fn claims_frame(n: usize, seed: u64) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let genders = ["Male", "Female"];
    let types = ["A", "B", "C", "D", "E", "F"];
    let categories = ["Small", "Medium", "Large"];
    let occupations = ["Employed", "Housewife", "Retired", "Self-employed", "Unemployed"];
    let groups2 = ["L", "M", "N", "O", "P"];

    let mut numtppd = Vec::with_capacity(n);
    let mut numtpbi = Vec::with_capacity(n);
    let mut indtppd = Vec::with_capacity(n);
    let mut indtpbi = Vec::with_capacity(n);
    let mut age = Vec::with_capacity(n);
    let mut bonus = Vec::with_capacity(n);
    let mut poldur = Vec::with_capacity(n);
    let mut value = Vec::with_capacity(n);
    let mut cal_year = Vec::with_capacity(n);
    let mut gender = Vec::with_capacity(n);
    let mut vtype = Vec::with_capacity(n);
    let mut category = Vec::with_capacity(n);
    let mut occupation = Vec::with_capacity(n);
    let mut subgroup2 = Vec::with_capacity(n);
    let mut group2 = Vec::with_capacity(n);
    let mut group1 = Vec::with_capacity(n);

    for _ in 0..n {
        let a: i32 = rng.gen_range(18..80);
        let cat = categories[rng.gen_range(0..categories.len())];
        let g2 = groups2[rng.gen_range(0..groups2.len())];
        let risky = a < 30 || cat == "Large";
        let claims: i32 = if risky && rng.gen_bool(0.8) {
            rng.gen_range(1..4)
        } else if rng.gen_bool(0.1) {
            1
        } else {
            0
        };

        numtppd.push(claims);
        numtpbi.push(if claims > 0 && rng.gen_bool(0.3) { 1 } else { 0 });
        indtppd.push(claims as f64 * rng.gen_range(100.0..2000.0));
        indtpbi.push(0.0);
        age.push(a);
        bonus.push(rng.gen_range(-50..150));
        poldur.push(rng.gen_range(0..15));
        value.push(rng.gen_range(1000..50000));
        cal_year.push(if rng.gen_bool(0.5) { 2009 } else { 2010 });
        gender.push(genders[rng.gen_range(0..genders.len())]);
        vtype.push(types[rng.gen_range(0..types.len())]);
        category.push(cat);
        occupation.push(occupations[rng.gen_range(0..occupations.len())]);
        subgroup2.push(format!("{}{}", g2, rng.gen_range(1..4)));
        group2.push(g2);
        group1.push(rng.gen_range(1..21));
    }

    df! {
        "CalYear" => cal_year,
        "Gender" => gender,
        "Type" => vtype,
        "Category" => category,
        "Occupation" => occupation,
        "Age" => age,
        "Group1" => group1,
        "Bonus" => bonus,
        "Poldur" => poldur,
        "Value" => value,
        "SubGroup2" => subgroup2,
        "Group2" => group2,
        "Numtppd" => numtppd,
        "Numtpbi" => numtpbi,
        "Indtppd" => indtppd,
        "Indtpbi" => indtpbi,
    }
    .unwrap()
}

/// Write `claims_frame(n, seed)` as CSV under `dir`
pub fn write_claims_csv(dir: &Path, n: usize, seed: u64) -> std::path::PathBuf {
    let path = dir.join("raw").join("pg15training.csv");
    let mut df = claims_frame(n, seed);
    DataSaver::save_csv(&mut df, &path).unwrap();
    path
}

/// Configuration whose every path lives under `dir`
pub fn config_yaml(dir: &Path, n_trials: usize) -> String {
    format!(
        r#"
random_state: 42
data:
  url: https://example.org/pg15training.rda
  dataset_file_path: '{dir}/raw/pg15training.csv'
  dataset_name: pg15training
dataset:
  test_size: 0.25
optuna:
  n_trials: {n_trials}
  n_estimators: {{min: 10, max: 30}}
  learning_rate: {{min: 0.05, max: 0.3}}
  max_depth: {{min: 2, max: 6}}
  num_leaves: {{min: 4, max: 16}}
  min_child_samples: {{min: 2, max: 10}}
  subsample: {{min: 0.7, max: 1.0}}
  colsample_bytree: {{min: 0.7, max: 1.0}}
model:
  output_path: '{dir}/models/model.json'
  output_params_path: '{dir}/models/params.json'
  metrics_path: '{dir}/reports/metrics.json'
"#,
        dir = dir.display(),
        n_trials = n_trials
    )
}

/// Write and load the configuration produced by [`config_yaml`]
pub fn load_test_config(dir: &Path, n_trials: usize) -> Config {
    let path = dir.join("config.yaml");
    std::fs::write(&path, config_yaml(dir, n_trials)).unwrap();
    load_config(&path).unwrap()
}
