use thiserror::Error;

/// Noise synthesis errors. Always recoverable: the pipeline keeps the
/// unperturbed pixels.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NoiseError {
    #[error("Invalid noise dimensions {width}x{height}x{channels}")]
    InvalidDimensions { width: u32, height: u32, channels: u8 },

    #[error("Noise buffer shape {noise:?} does not match image shape {image:?}")]
    ShapeMismatch {
        noise: (u32, u32, u8),
        image: (u32, u32, u8),
    },

    #[error("Invalid noise amplitude {0}")]
    InvalidAmplitude(String),
}
