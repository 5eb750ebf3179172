//! Dataset download: fetch an `.rda` archive over HTTP and store one of its
//! data frames as CSV

use super::rdata;
use crate::error::{ClaimBoostError, Result};
use crate::utils::{ensure_parent_dir, DataSaver};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Maximum accepted download size (512 MB)
const MAX_SIZE: usize = 512 * 1024 * 1024;

/// Downloads the raw dataset and converts it to CSV
#[derive(Debug, Clone)]
pub struct DataDownloader {
    timeout: Duration,
    user_agent: String,
}

impl Default for DataDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataDownloader {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            user_agent: format!("claimboost/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Download `url`, extract the object `dataset_name` and write it to
    /// `output_path` as CSV. Runs on every call; nothing is cached.
    pub fn download_data(
        &self,
        url: &str,
        output_path: impl AsRef<Path>,
        dataset_name: &str,
    ) -> Result<()> {
        let output_path = output_path.as_ref();
        ensure_parent_dir(output_path)?;

        info!(url = %url, "Downloading dataset");
        let bytes = self.fetch(url)?;
        info!(size_bytes = bytes.len(), "Dataset downloaded");

        convert_rdata_to_csv(&bytes, output_path, dataset_name)
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()?;

        let response = client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClaimBoostError::DownloadError(format!(
                "HTTP error {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        if let Some(len) = response.content_length() {
            if len as usize > MAX_SIZE {
                return Err(ClaimBoostError::DownloadError(format!(
                    "File too large: {} MB (limit: {} MB)",
                    len / 1024 / 1024,
                    MAX_SIZE / 1024 / 1024
                )));
            }
        }

        let bytes = response.bytes()?;
        if bytes.len() > MAX_SIZE {
            return Err(ClaimBoostError::DownloadError(format!(
                "File too large: {} MB (limit: {} MB)",
                bytes.len() / 1024 / 1024,
                MAX_SIZE / 1024 / 1024
            )));
        }
        Ok(bytes.to_vec())
    }
}

/// Decode RData `bytes` and write the object `dataset_name` as CSV
pub fn convert_rdata_to_csv(
    bytes: &[u8],
    output_path: impl AsRef<Path>,
    dataset_name: &str,
) -> Result<()> {
    let output_path = output_path.as_ref();
    let mut df = rdata::read_data_frame(bytes, dataset_name)?;
    debug!(
        dataset = dataset_name,
        rows = df.height(),
        cols = df.width(),
        "Decoded RData object"
    );

    DataSaver::save_csv(&mut df, output_path)?;
    info!(
        path = %output_path.display(),
        rows = df.height(),
        cols = df.width(),
        "Dataset saved as CSV"
    );
    Ok(())
}
