//! Artifact storage configuration.
//!
//! Default values are sourced from `crate::constants`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_EXPIRY_SECS, DEFAULT_SWEEP_INTERVAL_SECS, DEFAULT_TEMP_DIR};

fn default_temp_dir() -> PathBuf {
    PathBuf::from(DEFAULT_TEMP_DIR)
}

fn default_expiry_secs() -> u64 {
    DEFAULT_EXPIRY_SECS
}

fn default_sweep_interval_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECS
}

/// Where artifacts live and how long they are kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding uploads and outputs (created at startup)
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
    /// Age in seconds after which an artifact is swept
    #[serde(default = "default_expiry_secs")]
    pub expiry_secs: u64,
    /// Seconds between two background sweeps
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            expiry_secs: default_expiry_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl StorageConfig {
    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.temp_dir.as_os_str().is_empty() {
            return Err("storage.temp_dir cannot be empty".to_string());
        }
        if self.expiry_secs == 0 {
            return Err("storage.expiry_secs must be greater than 0".to_string());
        }
        if self.sweep_interval_secs == 0 {
            return Err("storage.sweep_interval_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}
