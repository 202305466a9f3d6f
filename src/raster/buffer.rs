//! In-memory raster representation
//!
//! A [`RasterImage`] is the unit every pipeline stage consumes and produces:
//! 8-bit interleaved samples plus the format class the source was decoded
//! from. The format class is fixed at construction and decides which encoder
//! writes the image back out.

use super::error::ImageError;
use image::{DynamicImage, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

/// Container class of an image: lossy (JPEG-class) or lossless (PNG-class).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatClass {
    Lossy,
    Lossless,
}

impl FormatClass {
    /// Map a decoder format to its class.
    ///
    /// Only JPEG is treated as lossy; every other decodable format is
    /// re-encoded losslessly so transparency and exact samples survive.
    pub fn from_image_format(format: image::ImageFormat) -> Self {
        match format {
            image::ImageFormat::Jpeg => FormatClass::Lossy,
            _ => FormatClass::Lossless,
        }
    }

    /// Parse a caller-supplied hint such as `"jpeg"`, `"image/png"` or `"photo.jpg"`.
    pub fn from_hint(hint: &str) -> Option<Self> {
        let hint = hint.trim().to_ascii_lowercase();
        let token = hint
            .rsplit(|c: char| c == '/' || c == '.')
            .next()
            .unwrap_or(hint.as_str());

        match token {
            "jpeg" | "jpg" | "jpe" | "jfif" => Some(FormatClass::Lossy),
            "png" | "apng" | "gif" | "webp" => Some(FormatClass::Lossless),
            _ => None,
        }
    }

    /// Content-Type of the encoder output for this class
    pub fn content_type(&self) -> &'static str {
        match self {
            FormatClass::Lossy => "image/jpeg",
            FormatClass::Lossless => "image/png",
        }
    }

    /// File extension of the encoder output for this class
    pub fn extension(&self) -> &'static str {
        match self {
            FormatClass::Lossy => "jpg",
            FormatClass::Lossless => "png",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatClass::Lossy => "lossy",
            FormatClass::Lossless => "lossless",
        }
    }
}

impl std::fmt::Display for FormatClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded 8-bit raster with 3 (RGB) or 4 (RGBA) interleaved channels.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    channels: u8,
    format: FormatClass,
    samples: Vec<u8>,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("dimensions", &(self.width, self.height))
            .field("channels", &self.channels)
            .field("format", &self.format)
            .finish()
    }
}

/// Number of samples a raster of the given shape must hold, if it fits in memory.
pub fn expected_sample_count(width: u32, height: u32, channels: u8) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(channels as usize)
}

impl RasterImage {
    /// Build a raster, checking `width * height * channels == samples.len()`.
    pub fn new(
        width: u32,
        height: u32,
        channels: u8,
        format: FormatClass,
        samples: Vec<u8>,
    ) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidDimensions { width, height });
        }
        if channels != 3 && channels != 4 {
            return Err(ImageError::InvalidChannelCount { channels });
        }
        let expected = expected_sample_count(width, height, channels)
            .ok_or(ImageError::InvalidDimensions { width, height })?;
        if expected != samples.len() {
            return Err(ImageError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            format,
            samples,
        })
    }

    /// Convert a decoded image, keeping alpha only when the source has it.
    pub fn from_dynamic(image: DynamicImage, format: FormatClass) -> Result<Self, ImageError> {
        let (width, height) = (image.width(), image.height());
        if image.color().has_alpha() {
            Self::new(width, height, 4, format, image.into_rgba8().into_raw())
        } else {
            Self::new(width, height, 3, format, image.into_rgb8().into_raw())
        }
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

    pub fn format(&self) -> FormatClass {
        self.format
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    /// Copy the raster into an RGBA image for compositing.
    pub fn to_rgba(&self) -> RgbaImage {
        match self.channels {
            4 => RgbaImage::from_raw(self.width, self.height, self.samples.clone())
                .unwrap_or_else(|| RgbaImage::new(self.width, self.height)),
            _ => {
                let rgb = RgbImage::from_raw(self.width, self.height, self.samples.clone())
                    .unwrap_or_else(|| RgbImage::new(self.width, self.height));
                DynamicImage::ImageRgb8(rgb).into_rgba8()
            }
        }
    }

    /// Build a raster with this raster's shape and format from an RGBA image.
    ///
    /// Alpha is dropped again for 3-channel rasters.
    pub fn with_rgba(&self, rgba: RgbaImage) -> Result<Self, ImageError> {
        if rgba.width() != self.width || rgba.height() != self.height {
            return Err(ImageError::InvalidDimensions {
                width: rgba.width(),
                height: rgba.height(),
            });
        }

        let samples = match self.channels {
            4 => rgba.into_raw(),
            _ => DynamicImage::ImageRgba8(rgba).into_rgb8().into_raw(),
        };

        Self::new(self.width, self.height, self.channels, self.format, samples)
    }
}
