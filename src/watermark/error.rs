//! Watermark error types.
//!
//! Every variant is recoverable: the pipeline logs it and keeps the
//! unwatermarked image.

use std::fmt;

/// Errors that can occur while rendering or compositing a text watermark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatermarkError {
    /// No usable font face could be loaded
    FontUnavailable(String),

    /// Failed to render text watermark
    RenderError(String),

    /// Invalid watermark settings
    ConfigError(String),

    /// Failed to composite watermark onto image
    CompositeError(String),
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontUnavailable(msg) => write!(f, "Watermark font unavailable: {}", msg),
            Self::RenderError(msg) => write!(f, "Failed to render text watermark: {}", msg),
            Self::ConfigError(msg) => write!(f, "Watermark configuration error: {}", msg),
            Self::CompositeError(msg) => write!(f, "Failed to composite watermark: {}", msg),
        }
    }
}

impl std::error::Error for WatermarkError {}
