//! Protection pipeline configuration: encoder quality, watermark font and
//! the default specs applied when a request does not override them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::DEFAULT_JPEG_QUALITY;
use crate::metadata::MetadataSpec;
use crate::noise::NoiseSpec;
use crate::watermark::WatermarkSpec;

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionConfig {
    /// JPEG quality (1-100) for lossy outputs
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// TrueType/OpenType font replacing the embedded face
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
    #[serde(default)]
    pub watermark: WatermarkSpec,
    #[serde(default)]
    pub metadata: MetadataSpec,
    #[serde(default)]
    pub noise: NoiseSpec,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
            font_path: None,
            watermark: WatermarkSpec::default(),
            metadata: MetadataSpec::default(),
            noise: NoiseSpec::default(),
        }
    }
}

impl ProtectionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!(
                "protection.jpeg_quality must be 1-100, got {}",
                self.jpeg_quality
            ));
        }
        if let Some(path) = &self.font_path {
            if !path.is_file() {
                return Err(format!(
                    "protection.font_path '{}' does not exist",
                    path.display()
                ));
            }
        }
        self.watermark.validate()?;
        self.noise.validate()?;
        Ok(())
    }
}
