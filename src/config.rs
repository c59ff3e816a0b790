use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{BookmockError, BookmockResult},
    model::units::UnitLimits,
    sizing::policy::SizingCalibration,
};

/// Environment variable overriding [`RenderConfig::shadow_samples`].
pub const SHADOW_SAMPLES_ENV: &str = "BOOKMOCK_SHADOW_SAMPLES";

/// Renderer settings that are not part of the per-binding lighting recipe.
///
/// The post passes always run; only clear color and shadow sampling are tunable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Straight RGBA8 the frame is cleared to before any pass.
    pub clear_rgba: [u8; 4],
    /// Accumulated shadow samples; `None` keeps the recipe's count.
    pub shadow_samples: Option<u32>,
    /// Edge length of the square ground shadow map, in texels.
    pub shadow_map_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_rgba: [0, 0, 0, 0],
            shadow_samples: None,
            shadow_map_size: 256,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> BookmockResult<()> {
        if self.shadow_map_size < 8 || self.shadow_map_size > u32::from(u16::MAX) {
            return Err(BookmockError::validation(format!(
                "shadow_map_size must be in 8..=65535 (got {})",
                self.shadow_map_size
            )));
        }
        if self.shadow_samples == Some(0) {
            return Err(BookmockError::validation("shadow_samples must be > 0"));
        }
        Ok(())
    }
}

/// Top-level configuration. Every field has a default, so `{}` is a valid file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockupConfig {
    pub sizing: SizingCalibration,
    pub units: UnitLimits,
    pub render: RenderConfig,
}

impl MockupConfig {
    /// Parse JSON, then validate.
    pub fn from_json_str(s: &str) -> BookmockResult<Self> {
        let cfg: MockupConfig = serde_json::from_str(s)
            .map_err(|e| BookmockError::serde(format!("config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a JSON config file.
    pub fn from_path(path: &Path) -> BookmockResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Apply `BOOKMOCK_SHADOW_SAMPLES` if set. Malformed values are rejected.
    pub fn apply_env(&mut self) -> BookmockResult<()> {
        match std::env::var(SHADOW_SAMPLES_ENV) {
            Ok(raw) => self.apply_shadow_samples_override(&raw),
            Err(_) => Ok(()),
        }
    }

    pub(crate) fn apply_shadow_samples_override(&mut self, raw: &str) -> BookmockResult<()> {
        let n: u32 = raw.trim().parse().map_err(|_| {
            BookmockError::configuration(format!("{SHADOW_SAMPLES_ENV} must be an integer (got '{raw}')"))
        })?;
        if n == 0 {
            return Err(BookmockError::configuration(format!(
                "{SHADOW_SAMPLES_ENV} must be > 0"
            )));
        }
        self.render.shadow_samples = Some(n);
        Ok(())
    }

    pub fn validate(&self) -> BookmockResult<()> {
        self.sizing.validate()?;
        self.units.validate()?;
        self.render.validate()
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
