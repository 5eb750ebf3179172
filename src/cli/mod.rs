//! claimboost CLI Module
//!
//! Command-line interface for running the training pipeline.

use clap::Parser;
use colored::*;
use std::path::{Path, PathBuf};

use crate::config::load_config;
use crate::logging::DEFAULT_LOG_FILE;
use crate::pipeline::{self, PipelineSummary};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(&format!("{:<18}", key)), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "claimboost")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train a claim classifier with TPE-tuned gradient-boosted trees")]
#[command(long_about = None)]
pub struct Cli {
    /// Path to the YAML configuration file
    pub config_path: PathBuf,

    /// Reuse the CSV at data.dataset_file_path instead of downloading
    #[arg(long)]
    pub skip_download: bool,

    /// Log file, appended to on every run
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
}

// ─── Commands ──────────────────────────────────────────────────────────────────

/// Load the configuration, run the pipeline and print a summary
pub fn cmd_run(config_path: &Path, skip_download: bool) -> anyhow::Result<PipelineSummary> {
    let config = load_config(config_path)?;
    step_ok(&format!("Configuration loaded from {}", accent(&config_path.display().to_string())));

    let summary = if skip_download {
        pipeline::run_with_dataset(&config)?
    } else {
        pipeline::run(&config)?
    };

    print_summary(&summary);
    Ok(summary)
}

fn print_summary(summary: &PipelineSummary) {
    section("Training complete");

    line_box_top();
    line_box_center(&format!("{}", "claimboost".white().bold()));
    line_box_sep();
    line_box(&kv("Rows", &summary.n_rows.to_string()));
    line_box(&kv("Features", &summary.n_features.to_string()));
    line_box(&kv("Train / test", &format!("{} / {}", summary.n_train, summary.n_test)));
    line_box(&kv("Trials", &summary.n_trials.to_string()));
    line_box(&kv("Best val. accuracy", &format!("{:.4}", summary.best_validation_score)));
    line_box_sep();
    line_box(&kv("Accuracy", &format!("{:.4}", summary.metrics.accuracy)));
    line_box(&kv("Precision", &format!("{:.4}", summary.metrics.precision)));
    line_box(&kv("Recall", &format!("{:.4}", summary.metrics.recall)));
    line_box(&kv("F1", &format!("{:.4}", summary.metrics.f1)));
    line_box(&kv("Time", &format!("{:.2}s", summary.duration_secs)));
    line_box_bottom();

    println!();
    step_ok(&format!("Parameters {}", dim(&summary.params_path.display().to_string())));
    step_ok(&format!("Model      {}", dim(&summary.model_path.display().to_string())));
    match &summary.metrics_path {
        Some(path) => step_ok(&format!("Metrics    {}", dim(&path.display().to_string()))),
        None => step_ok(&format!("Metrics    {}", dim("not saved"))),
    }
    println!();
}
