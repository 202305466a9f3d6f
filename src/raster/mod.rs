//! Raster decoding, representation and encoding
//!
//! Sources are decoded into a [`RasterImage`] tagged with its [`FormatClass`];
//! every write selects its encoder from that tag so the class survives the
//! whole pipeline.

pub mod buffer;
pub mod codec;
pub mod encoder;
pub mod error;

pub use buffer::{FormatClass, RasterImage};
pub use codec::{decode, detect_format};
pub use encoder::{encode, EncodedImage, EncoderFactory, EncoderQuality, ImageEncoder};
pub use error::ImageError;
