// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod logging;
mod protection;
mod storage;

pub use logging::{LogFormat, LoggingConfig};
pub use protection::ProtectionConfig;
pub use storage::StorageConfig;

/// Top-level configuration. Every section is optional in YAML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub protection: ProtectionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        // First, check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                )
            })?;
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        // An empty document means "all defaults"
        if substituted.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    /// Load `path` when it exists, otherwise fall back to defaults.
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.storage.validate()?;
        self.protection.validate()?;

        if tracing_subscriber::EnvFilter::try_new(&self.logging.level).is_err() {
            return Err(format!(
                "logging.level '{}' is not a valid filter directive",
                self.logging.level
            ));
        }

        Ok(())
    }
}
