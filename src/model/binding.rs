use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::error::BookmockError;

/// Physical book construction. Selects the geometry template and which inputs matter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingType {
    /// Glued paperback: cover + printed spine.
    #[default]
    PerfectBound,
    /// Case-bound board cover with a solid-color back.
    Hardcover,
    /// Stapled booklet: cover only.
    Saddlestitch,
    /// Coil-bound: spine width is user supplied.
    SpiralBound,
}

impl BindingType {
    /// Every variant, in display order.
    pub const ALL: [BindingType; 4] = [
        Self::PerfectBound,
        Self::Hardcover,
        Self::Saddlestitch,
        Self::SpiralBound,
    ];

    /// Stable kebab-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PerfectBound => "perfect-bound",
            Self::Hardcover => "hardcover",
            Self::Saddlestitch => "saddlestitch",
            Self::SpiralBound => "spiral-bound",
        }
    }

    /// Whether the spine bitmap slot feeds the geometry.
    pub fn uses_spine_image(self) -> bool {
        !matches!(self, Self::Saddlestitch)
    }

    /// Whether a spine image is mandatory (spiral-bound falls back to a flat coil color).
    pub fn requires_spine_image(self) -> bool {
        matches!(self, Self::PerfectBound | Self::Hardcover)
    }

    /// Only hardcover books paint the back panel with [`crate::BackColor`].
    pub fn uses_back_color(self) -> bool {
        matches!(self, Self::Hardcover)
    }

    /// Only spiral-bound books take an explicit spine width.
    pub fn uses_spine_width(self) -> bool {
        matches!(self, Self::SpiralBound)
    }

    /// Number of user image slots (cover, and spine where relevant).
    pub fn image_slot_count(self) -> usize {
        if self.uses_spine_image() { 2 } else { 1 }
    }
}

impl fmt::Display for BindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BindingType {
    type Err = BookmockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == norm)
            .ok_or_else(|| BookmockError::validation(format!("unknown binding type \"{s}\"")))
    }
}

/// Which output dimension the user pins; the other is derived from the book's aspect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalingMode {
    /// Target size is the output width.
    #[default]
    #[serde(rename = "width")]
    FixedWidth,
    /// Target size is the output height.
    #[serde(rename = "height")]
    FixedHeight,
}

impl ScalingMode {
    /// Stable name (`width` / `height`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FixedWidth => "width",
            Self::FixedHeight => "height",
        }
    }
}

impl fmt::Display for ScalingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScalingMode {
    type Err = BookmockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "width" | "fixed-width" => Ok(Self::FixedWidth),
            "height" | "fixed-height" => Ok(Self::FixedHeight),
            _ => Err(BookmockError::validation(format!(
                "unknown scaling mode \"{s}\""
            ))),
        }
    }
}
