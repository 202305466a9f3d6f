//! Raster codec error types
//!
//! Decode failures are the only errors that abort a protection run; encode
//! failures surface as fatal too because no output can be produced without
//! an encoder.

use std::fmt;

/// Errors that can occur while decoding, validating or encoding rasters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    // === Decoding Errors ===
    /// Image format is not supported
    UnsupportedFormat { format: String },
    /// Failed to decode image data
    DecodeFailed { message: String },

    // === Buffer Errors ===
    /// Sample buffer length does not match width * height * channels
    SampleCountMismatch { expected: usize, actual: usize },
    /// Only 3 (RGB) and 4 (RGBA) channel rasters are supported
    InvalidChannelCount { channels: u8 },
    /// Width or height is zero
    InvalidDimensions { width: u32, height: u32 },

    // === Encoding Errors ===
    /// Encoding to output format failed
    EncodeFailed { format: String, message: String },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::UnsupportedFormat { format } => {
                write!(f, "Unsupported image format: {}", format)
            }
            ImageError::DecodeFailed { message } => {
                write!(f, "Failed to decode image: {}", message)
            }
            ImageError::SampleCountMismatch { expected, actual } => {
                write!(
                    f,
                    "Sample buffer holds {} samples, expected {}",
                    actual, expected
                )
            }
            ImageError::InvalidChannelCount { channels } => {
                write!(f, "Invalid channel count {}: must be 3 or 4", channels)
            }
            ImageError::InvalidDimensions { width, height } => {
                write!(f, "Invalid dimensions {}x{}", width, height)
            }
            ImageError::EncodeFailed { format, message } => {
                write!(f, "Failed to encode to {}: {}", format, message)
            }
        }
    }
}

impl std::error::Error for ImageError {}

impl ImageError {
    /// Helper constructors for common error patterns
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        ImageError::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn decode_failed(message: impl Into<String>) -> Self {
        ImageError::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        ImageError::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }
}
