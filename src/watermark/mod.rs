//! Visible text watermarks.
//!
//! A [`WatermarkSpec`] is resolved to one of nine anchor points, rendered
//! with a bold sans-serif face and alpha-blended onto a copy of the source
//! raster. Empty text turns the stage into a no-op.

pub mod compositor;
pub mod config;
pub mod error;
pub mod position;
pub mod text_renderer;

pub use compositor::{blend_layer, composite, TextCompositor, WatermarkLayer};
pub use config::{Anchor, Column, Row, WatermarkSpec};
pub use error::WatermarkError;
pub use position::{anchor_point, estimate_text_width, ImageDimensions, PlacementPosition};
pub use text_renderer::{
    render_text, RenderedText, TextMetrics, TextRenderOptions, TextWindow, Typeface,
};
