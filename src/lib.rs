// Pixelguard image protection library

pub mod artifact;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod noise;
pub mod protection;
pub mod raster;
pub mod watermark;
