//! Watermark request types: anchors and the per-run watermark settings.
//!
//! A [`WatermarkSpec`] describes one visible text label: what it says, which
//! of the nine anchors it sits on, how opaque it is and how large it is drawn.
//!
//! ```yaml
//! watermark:
//!   text: "© Example Studio"
//!   anchor: bottom-right
//!   opacity: 70
//!   font_size: 24
//! ```

use crate::constants::{DEFAULT_FONT_SIZE, DEFAULT_OPACITY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

fn default_opacity() -> u8 {
    DEFAULT_OPACITY
}

/// Horizontal column of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Left,
    Center,
    Right,
}

/// Vertical row of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    Top,
    Middle,
    Bottom,
}

/// One of the nine named watermark positions on a 3x3 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::MiddleLeft,
        Anchor::MiddleCenter,
        Anchor::MiddleRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::MiddleLeft => "middle-left",
            Self::MiddleCenter => "middle-center",
            Self::MiddleRight => "middle-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }

    pub fn column(&self) -> Column {
        match self {
            Self::TopLeft | Self::MiddleLeft | Self::BottomLeft => Column::Left,
            Self::TopCenter | Self::MiddleCenter | Self::BottomCenter => Column::Center,
            Self::TopRight | Self::MiddleRight | Self::BottomRight => Column::Right,
        }
    }

    pub fn row(&self) -> Row {
        match self {
            Self::TopLeft | Self::TopCenter | Self::TopRight => Row::Top,
            Self::MiddleLeft | Self::MiddleCenter | Self::MiddleRight => Row::Middle,
            Self::BottomLeft | Self::BottomCenter | Self::BottomRight => Row::Bottom,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Anchor::ALL
            .into_iter()
            .find(|anchor| anchor.as_str() == normalized)
            .ok_or_else(|| format!("unknown anchor '{}'", s))
    }
}

/// Visible text watermark settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkSpec {
    /// Label to draw. Empty disables the visible watermark.
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub anchor: Anchor,

    /// Opacity in percent (0 = invisible, 100 = opaque)
    #[serde(default = "default_opacity")]
    pub opacity: u8,

    /// Font size in pixels
    #[serde(default = "default_font_size")]
    pub font_size: u32,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            text: String::new(),
            anchor: Anchor::default(),
            opacity: default_opacity(),
            font_size: default_font_size(),
        }
    }
}

impl WatermarkSpec {
    pub fn new(text: impl Into<String>, anchor: Anchor, opacity: u8, font_size: u32) -> Self {
        Self {
            text: text.into(),
            anchor,
            opacity,
            font_size,
        }
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Opacity as an alpha fraction in [0, 1].
    pub fn alpha(&self) -> f32 {
        f32::from(self.opacity.min(100)) / 100.0
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.opacity > 100 {
            return Err(format!(
                "watermark opacity must be 0-100, got {}",
                self.opacity
            ));
        }
        if self.font_size == 0 {
            return Err("watermark font_size must be positive".to_string());
        }
        Ok(())
    }
}
