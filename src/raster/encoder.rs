//! Image encoder abstraction
//!
//! Every write goes through an [`ImageEncoder`] chosen from the raster's
//! format class, so a lossy source is always written lossy and a lossless
//! source always lossless.

use super::buffer::{FormatClass, RasterImage};
use super::error::ImageError;
use crate::constants::DEFAULT_JPEG_QUALITY;

/// Quality settings for image encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderQuality {
    /// Quality value (1-100, where 100 is best quality)
    pub quality: u8,
}

impl Default for EncoderQuality {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl EncoderQuality {
    /// Create quality settings with specified quality level
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

/// Result of encoding an image
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// The encoded image data
    pub data: Vec<u8>,
    /// The output format class
    pub format: FormatClass,
    /// Content-Type of the data
    pub content_type: &'static str,
}

impl EncodedImage {
    pub fn new(data: Vec<u8>, format: FormatClass) -> Self {
        Self {
            data,
            format,
            content_type: format.content_type(),
        }
    }
}

/// Trait for image encoders
///
/// The trait is object-safe so the factory can hand out boxed encoders.
pub trait ImageEncoder: Send + Sync {
    /// The format class this encoder produces
    fn format(&self) -> FormatClass;

    /// Encode a raster to the target format
    fn encode(
        &self,
        image: &RasterImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError>;

    /// Check if this encoder keeps the alpha channel
    fn supports_transparency(&self) -> bool;
}

/// JPEG encoder using the image crate
pub struct JpegEncoder;

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> FormatClass {
        FormatClass::Lossy
    }

    fn encode(
        &self,
        image: &RasterImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
        use image::ImageEncoder as _;
        use std::io::Cursor;

        // JPEG has no alpha channel
        let rgb_data = match image.channels() {
            4 => rgba_to_rgb(image.samples()),
            _ => image.samples().to_vec(),
        };

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageJpegEncoder::new_with_quality(&mut output, quality.quality);

        encoder
            .write_image(
                &rgb_data,
                image.width(),
                image.height(),
                image::ColorType::Rgb8,
            )
            .map_err(|e| ImageError::encode_failed("jpeg", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), FormatClass::Lossy))
    }

    fn supports_transparency(&self) -> bool {
        false
    }
}

/// PNG encoder using the image crate
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn format(&self) -> FormatClass {
        FormatClass::Lossless
    }

    fn encode(
        &self,
        image: &RasterImage,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        use image::codecs::png::PngEncoder as ImagePngEncoder;
        use image::ImageEncoder as _;
        use std::io::Cursor;

        let color = match image.channels() {
            4 => image::ColorType::Rgba8,
            _ => image::ColorType::Rgb8,
        };

        let mut output = Cursor::new(Vec::new());
        let encoder = ImagePngEncoder::new(&mut output);

        encoder
            .write_image(image.samples(), image.width(), image.height(), color)
            .map_err(|e| ImageError::encode_failed("png", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), FormatClass::Lossless))
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// Factory for creating encoders
pub struct EncoderFactory;

impl EncoderFactory {
    /// Create an encoder for the given format class
    pub fn create(format: FormatClass) -> Box<dyn ImageEncoder> {
        match format {
            FormatClass::Lossy => Box::new(JpegEncoder),
            FormatClass::Lossless => Box::new(PngEncoder),
        }
    }
}

/// Encode a raster with the encoder selected by its own format class.
pub fn encode(image: &RasterImage, quality: EncoderQuality) -> Result<EncodedImage, ImageError> {
    EncoderFactory::create(image.format()).encode(image, quality)
}

/// Convert RGBA data to RGB by dropping the alpha channel
fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}
