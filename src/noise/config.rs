//! Noise protection settings.

use crate::constants::{
    DEFAULT_NOISE_INTENSITY, NOISE_AMPLITUDE_MIN, NOISE_AMPLITUDE_SPAN, NOISE_INTENSITY_MAX,
    NOISE_INTENSITY_MIN,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn default_enabled() -> bool {
    true
}

fn default_intensity() -> u8 {
    DEFAULT_NOISE_INTENSITY
}

/// Perturbation pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseMethod {
    /// Independent Box-Muller draws per sample
    #[default]
    Gaussian,
    /// Independent uniform draws per sample
    Uniform,
    /// Deterministic multi-octave sine pattern, identical across channels
    Structured,
}

impl NoiseMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gaussian => "gaussian",
            Self::Uniform => "uniform",
            Self::Structured => "structured",
        }
    }
}

impl fmt::Display for NoiseMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoiseMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gaussian" => Ok(Self::Gaussian),
            "uniform" => Ok(Self::Uniform),
            "structured" => Ok(Self::Structured),
            other => Err(format!("unknown noise method '{}'", other)),
        }
    }
}

/// Linear intensity to amplitude map: `intensity / 10 * 0.019 + 0.001`.
///
/// Intensity is clamped into 1..=10 first, so the result is always within
/// [0.001, 0.02].
pub fn amplitude_for(intensity: u8) -> f64 {
    let intensity = intensity.clamp(NOISE_INTENSITY_MIN, NOISE_INTENSITY_MAX);
    f64::from(intensity) / 10.0 * NOISE_AMPLITUDE_SPAN + NOISE_AMPLITUDE_MIN
}

/// Adversarial noise settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoiseSpec {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// 1 (faintest) to 10 (strongest)
    #[serde(default = "default_intensity")]
    pub intensity: u8,

    #[serde(default)]
    pub method: NoiseMethod,
}

impl Default for NoiseSpec {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            intensity: default_intensity(),
            method: NoiseMethod::default(),
        }
    }
}

impl NoiseSpec {
    pub fn new(intensity: u8, method: NoiseMethod) -> Self {
        Self {
            enabled: true,
            intensity,
            method,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Amplitude to synthesize with, or `None` when noise is disabled.
    pub fn amplitude(&self) -> Option<f64> {
        self.enabled.then(|| amplitude_for(self.intensity))
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(NOISE_INTENSITY_MIN..=NOISE_INTENSITY_MAX).contains(&self.intensity) {
            return Err(format!(
                "noise intensity must be {}-{}, got {}",
                NOISE_INTENSITY_MIN, NOISE_INTENSITY_MAX, self.intensity
            ));
        }
        Ok(())
    }
}
