//! Adversarial noise protection.
//!
//! Intensity 1-10 maps linearly onto an amplitude in [0.001, 0.02] of the
//! sample range. Three patterns are available: independent gaussian or
//! uniform draws per sample, and a deterministic structured texture shared by
//! all channels of a pixel.

pub mod config;
pub mod error;
pub mod synthesizer;

pub use config::{amplitude_for, NoiseMethod, NoiseSpec};
pub use error::NoiseError;
pub use synthesizer::{synthesize, NoiseBuffer, NoiseSynthesizer, RandomNoise};
