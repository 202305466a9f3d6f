// Constants module - centralized default values for configuration
//
// This module defines all default values used throughout the codebase.
// Pipeline constants that define observable behavior (anchor margin, noise
// amplitude range, canonical metadata values) live here too so that tests
// and the implementation agree on a single source.

// =============================================================================
// Artifact storage defaults
// =============================================================================

/// Default directory for uploaded and processed artifacts
pub const DEFAULT_TEMP_DIR: &str = "/tmp/pixelguard";

/// Default artifact age (seconds) after which the sweeper deletes it
pub const DEFAULT_EXPIRY_SECS: u64 = 3600;

/// Default interval (seconds) between two sweeps
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 900;

/// Longest original filename fragment kept inside an artifact name
pub const MAX_ARTIFACT_NAME_LEN: usize = 96;

// =============================================================================
// Encoding defaults
// =============================================================================

/// Quality used when re-encoding lossy (JPEG-class) images
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

// =============================================================================
// Watermark defaults
// =============================================================================

/// Distance in pixels between the watermark anchor and the image edge
pub const WATERMARK_MARGIN: i32 = 30;

/// Default watermark font size in pixels
pub const DEFAULT_FONT_SIZE: u32 = 36;

/// Default watermark opacity (percent)
pub const DEFAULT_OPACITY: u8 = 50;

/// Character width as a fraction of the font size, used when text cannot be measured
pub const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Blur radius in pixels of the dark shadow drawn behind watermark text
pub const SHADOW_RADIUS: u32 = 3;

/// Alpha (0-255) of the shadow at full watermark opacity
pub const SHADOW_ALPHA: u8 = 180;

/// Largest pixel area rasterized for one glyph or one text layer
pub const MAX_RENDER_PIXELS: u64 = 4096 * 4096;

// =============================================================================
// Noise defaults
// =============================================================================

/// Smallest noise amplitude (intensity 0 on the linear map)
pub const NOISE_AMPLITUDE_MIN: f64 = 0.001;

/// Amplitude range added on top of the minimum at intensity 10
pub const NOISE_AMPLITUDE_SPAN: f64 = 0.019;

/// Lowest accepted noise intensity
pub const NOISE_INTENSITY_MIN: u8 = 1;

/// Highest accepted noise intensity
pub const NOISE_INTENSITY_MAX: u8 = 10;

/// Default noise intensity
pub const DEFAULT_NOISE_INTENSITY: u8 = 5;

/// Bias added to signed noise samples so they fit in a u8
pub const NOISE_BIAS: i16 = 128;

/// Number of octaves summed by the structured noise pattern
pub const STRUCTURED_OCTAVES: u32 = 4;

/// Base spatial frequency of the structured noise pattern
pub const STRUCTURED_BASE_FREQUENCY: f64 = 0.01;

// =============================================================================
// Metadata defaults
// =============================================================================

/// Canonical Copyright value
pub const COPYRIGHT_NOTICE: &str = "DO NOT USE FOR AI TRAINING";

/// Canonical ImageDescription value
pub const DESCRIPTION_NOTICE: &str =
    "This image is not authorized for use in AI training datasets";

/// Canonical Artist value
pub const ARTIST_NOTICE: &str = "Protected Content";

/// Canonical UserComment value
pub const USER_COMMENT_NOTICE: &str = "AI training use of this image is prohibited";
