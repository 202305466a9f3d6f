//! Perturbation buffer synthesis and application.
//!
//! A [`NoiseBuffer`] has exactly the sample layout of the image it targets.
//! Each sample stores a signed offset in [-128, 127] biased by +128, so 128
//! means "leave this sample alone".

use super::config::NoiseMethod;
use super::error::NoiseError;
use crate::constants::{NOISE_BIAS, STRUCTURED_BASE_FREQUENCY, STRUCTURED_OCTAVES};
use crate::raster::buffer::expected_sample_count;
use crate::raster::RasterImage;
use rand::Rng;
use rayon::prelude::*;
use std::f64::consts::TAU;

/// Biased perturbation samples for one image shape.
#[derive(Clone, PartialEq, Eq)]
pub struct NoiseBuffer {
    width: u32,
    height: u32,
    channels: u8,
    samples: Vec<u8>,
}

impl std::fmt::Debug for NoiseBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseBuffer")
            .field("dimensions", &(self.width, self.height))
            .field("channels", &self.channels)
            .finish()
    }
}

impl NoiseBuffer {
    /// Wrap precomputed biased samples.
    pub fn from_samples(
        width: u32,
        height: u32,
        channels: u8,
        samples: Vec<u8>,
    ) -> Result<Self, NoiseError> {
        let expected = checked_len(width, height, channels)?;
        if expected != samples.len() {
            return Err(NoiseError::InvalidDimensions {
                width,
                height,
                channels,
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Signed offset of sample `idx`.
    pub fn offset(&self, idx: usize) -> Option<i16> {
        self.samples.get(idx).map(|s| i16::from(*s) - NOISE_BIAS)
    }

    /// Add the perturbation to `image` in place, clamping to [0, 255].
    ///
    /// The alpha channel of 4-channel images is left untouched.
    pub fn apply_to(&self, image: &mut RasterImage) -> Result<(), NoiseError> {
        let image_shape = (image.width(), image.height(), image.channels());
        let noise_shape = (self.width, self.height, self.channels);
        if image_shape != noise_shape {
            return Err(NoiseError::ShapeMismatch {
                noise: noise_shape,
                image: image_shape,
            });
        }

        let channels = self.channels as usize;
        let color_channels = if channels == 4 { 3 } else { channels };

        image
            .samples_mut()
            .par_chunks_mut(channels)
            .zip(self.samples.par_chunks(channels))
            .for_each(|(pixel, noise)| {
                for c in 0..color_channels {
                    let value = i16::from(pixel[c]) + i16::from(noise[c]) - NOISE_BIAS;
                    pixel[c] = value.clamp(0, 255) as u8;
                }
            });

        Ok(())
    }
}

fn checked_len(width: u32, height: u32, channels: u8) -> Result<usize, NoiseError> {
    let invalid = NoiseError::InvalidDimensions {
        width,
        height,
        channels,
    };
    if width == 0 || height == 0 || !(1..=4).contains(&channels) {
        return Err(invalid);
    }
    expected_sample_count(width, height, channels).ok_or(invalid)
}

/// Round a signed offset, clamp it to [-128, 127] and add the bias.
fn bias(value: f64) -> u8 {
    let clamped = value.round().clamp(-128.0, 127.0) as i16;
    (clamped + NOISE_BIAS) as u8
}

/// One standard normal draw via Box-Muller.
fn box_muller<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // u1 in (0, 1] keeps ln() finite
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

/// Structured pattern value at pixel (x, y), in roughly [-2.1, 2.1].
pub fn structured_value(x: u32, y: u32) -> f64 {
    (1..=STRUCTURED_OCTAVES)
        .map(|octave| {
            let freq = f64::from(octave) * STRUCTURED_BASE_FREQUENCY;
            let amp = 1.0 / f64::from(octave);
            (f64::from(x) * freq).sin() * (f64::from(y) * freq).cos() * amp
        })
        .sum()
}

/// Generate a perturbation buffer of `width * height * channels` samples.
///
/// `amplitude` is a fraction of the full 0-255 sample range. Gaussian and
/// uniform samples are drawn independently per channel; structured samples
/// are computed once per pixel and repeated across its channels. Rows are
/// generated in parallel with one thread-local RNG per worker.
pub fn synthesize(
    width: u32,
    height: u32,
    channels: u8,
    amplitude: f64,
    method: NoiseMethod,
) -> Result<NoiseBuffer, NoiseError> {
    let len = checked_len(width, height, channels)?;
    if !(amplitude.is_finite() && amplitude >= 0.0) {
        return Err(NoiseError::InvalidAmplitude(amplitude.to_string()));
    }

    let scale = amplitude * 255.0;
    let row_len = width as usize * channels as usize;
    let channels = channels as usize;
    let mut samples = vec![NOISE_BIAS as u8; len];

    match method {
        NoiseMethod::Gaussian => {
            samples.par_chunks_mut(row_len).for_each_init(rand::thread_rng, |rng, row| {
                for sample in row.iter_mut() {
                    *sample = bias(box_muller(rng) * scale);
                }
            });
        }
        NoiseMethod::Uniform => {
            samples.par_chunks_mut(row_len).for_each_init(rand::thread_rng, |rng, row| {
                for sample in row.iter_mut() {
                    *sample = bias(rng.gen_range(-scale..=scale));
                }
            });
        }
        NoiseMethod::Structured => {
            samples
                .par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, pixel) in row.chunks_exact_mut(channels).enumerate() {
                        let value = bias(structured_value(x as u32, y as u32) * scale);
                        pixel.fill(value);
                    }
                });
        }
    }

    Ok(NoiseBuffer {
        width,
        height,
        channels: channels as u8,
        samples,
    })
}

/// Source of noise buffers used by the protection pipeline.
pub trait NoiseSynthesizer: Send + Sync {
    fn synthesize(
        &self,
        width: u32,
        height: u32,
        channels: u8,
        amplitude: f64,
        method: NoiseMethod,
    ) -> Result<NoiseBuffer, NoiseError>;
}

/// Default synthesizer backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNoise;

impl NoiseSynthesizer for RandomNoise {
    fn synthesize(
        &self,
        width: u32,
        height: u32,
        channels: u8,
        amplitude: f64,
        method: NoiseMethod,
    ) -> Result<NoiseBuffer, NoiseError> {
        synthesize(width, height, channels, amplitude, method)
    }
}
