//! Anchor placement for text watermarks.
//!
//! The nine anchors resolve to fixed (x, y) points measured from the image
//! edges with a 30 px margin:
//!
//! | column | x                          |   | row    | y (baseline)     |
//! |--------|----------------------------|---|--------|------------------|
//! | left   | 30                         |   | top    | 30 + font_size   |
//! | center | width / 2                  |   | middle | height / 2       |
//! | right  | width - text_width - 30    |   | bottom | height - 30      |
//!
//! For the center column the renderer centers the text on `x`; the other
//! columns draw text starting at `x`. `y` is always the text baseline.

use super::config::{Anchor, Column, Row};
use crate::constants::{APPROX_CHAR_WIDTH_RATIO, WATERMARK_MARGIN};

/// Dimensions of the target image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// A point on the target image. May be negative when the text is wider
/// than the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width of `text` when no font is available to measure it.
pub fn estimate_text_width(text: &str, font_size: u32) -> u32 {
    let chars = text.chars().count() as f32;
    (font_size as f32 * chars * APPROX_CHAR_WIDTH_RATIO).round() as u32
}

/// Resolve an anchor to its (x, y) point.
pub fn anchor_point(
    anchor: Anchor,
    image: &ImageDimensions,
    text_width: u32,
    font_size: u32,
) -> PlacementPosition {
    let w = image.width as i32;
    let h = image.height as i32;
    let tw = text_width.min(i32::MAX as u32) as i32;
    let fs = font_size.min(i32::MAX as u32) as i32;
    let m = WATERMARK_MARGIN;

    let x = match anchor.column() {
        Column::Left => m,
        Column::Center => w / 2,
        Column::Right => w - tw - m,
    };

    let y = match anchor.row() {
        Row::Top => m + fs,
        Row::Middle => h / 2,
        Row::Bottom => h - m,
    };

    PlacementPosition::new(x, y)
}
