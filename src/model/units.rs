use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{BookmockError, BookmockResult};

/// Print resolution used to convert inches to pixels.
pub const PX_PER_INCH: f64 = 300.0;

/// Unit of a user-entered length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Output pixels.
    #[default]
    #[serde(rename = "px")]
    Pixels,
    /// Physical inches at [`PX_PER_INCH`].
    #[serde(rename = "in")]
    Inches,
}

impl Unit {
    /// Convert a value in this unit to pixels.
    pub fn to_px(self, value: f64) -> f64 {
        match self {
            Self::Pixels => value,
            Self::Inches => value * PX_PER_INCH,
        }
    }

    /// Convert pixels to this unit.
    pub fn from_px(self, px: f64) -> f64 {
        match self {
            Self::Pixels => px,
            Self::Inches => px / PX_PER_INCH,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pixels => "px",
            Self::Inches => "in",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = BookmockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "px" | "pixel" | "pixels" => Ok(Self::Pixels),
            "in" | "inch" | "inches" => Ok(Self::Inches),
            _ => Err(BookmockError::validation(format!("unknown unit \"{s}\""))),
        }
    }
}

/// Bounds applied to sizes typed into the unit-aware size field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitLimits {
    pub min_px: f64,
    pub max_px: f64,
}

impl Default for UnitLimits {
    fn default() -> Self {
        Self {
            min_px: 600.0,
            max_px: 3000.0,
        }
    }
}

impl UnitLimits {
    pub fn clamp_px(&self, px: f64) -> f64 {
        px.clamp(self.min_px, self.max_px)
    }

    pub fn validate(&self) -> BookmockResult<()> {
        if !(self.min_px.is_finite() && self.max_px.is_finite())
            || self.min_px <= 0.0
            || self.min_px > self.max_px
        {
            return Err(BookmockError::validation(
                "unit limits must satisfy 0 < min_px <= max_px",
            ));
        }
        Ok(())
    }
}

/// A length as the user typed it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeInput {
    pub value: f64,
    pub unit: Unit,
}

impl SizeInput {
    pub fn px(value: f64) -> Self {
        Self {
            value,
            unit: Unit::Pixels,
        }
    }

    pub fn inches(value: f64) -> Self {
        Self {
            value,
            unit: Unit::Inches,
        }
    }

    /// Pixels before any field clamping.
    pub fn to_px(self) -> f64 {
        self.unit.to_px(self.value)
    }

    /// Pixels as delivered to the sizing policy from the unit-aware field.
    pub fn to_clamped_px(self, limits: &UnitLimits) -> BookmockResult<f64> {
        let px = self.to_px();
        if !px.is_finite() || px <= 0.0 {
            return Err(BookmockError::validation(format!(
                "size must be a positive number (got {} {})",
                self.value, self.unit
            )));
        }
        Ok(limits.clamp_px(px))
    }
}

/// Explicit spine thickness for spiral-bound books.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpineWidth {
    pub value: f64,
    pub unit: Unit,
}

impl SpineWidth {
    /// Default coil spine: a quarter inch.
    pub const DEFAULT: SpineWidth = SpineWidth {
        value: 0.25,
        unit: Unit::Inches,
    };

    pub fn to_px(self) -> f64 {
        self.unit.to_px(self.value)
    }
}
