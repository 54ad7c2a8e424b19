//! Text-fit configuration parsed from environment variables.

use crate::consts::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_PX, DEFAULT_MAX_FONT_PX, DEFAULT_MIN_FONT_PX};

pub const ENV_MIN_PX: &str = "OVERLAY_FONT_MIN_PX";
pub const ENV_MAX_PX: &str = "OVERLAY_FONT_MAX_PX";
pub const ENV_DEFAULT_PX: &str = "OVERLAY_FONT_DEFAULT_PX";
pub const ENV_FONT_FAMILY: &str = "OVERLAY_FONT_FAMILY";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
    #[error("font size range is empty: min {min}px > max {max}px")]
    InvertedRange { min: u32, max: u32 },
    #[error("{var} must be at least 1")]
    ZeroMinimum { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitConfig {
    pub min_px: u32,
    pub max_px: u32,
    pub default_px: u32,
    pub font_family: String,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            min_px: DEFAULT_MIN_FONT_PX,
            max_px: DEFAULT_MAX_FONT_PX,
            default_px: DEFAULT_FONT_PX,
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
        }
    }
}

impl FitConfig {
    /// Build typed fit config from environment variables.
    ///
    /// All optional:
    /// - `OVERLAY_FONT_MIN_PX`: default 1
    /// - `OVERLAY_FONT_MAX_PX`: default 50
    /// - `OVERLAY_FONT_DEFAULT_PX`: default 16, clamped into `[min, max]`
    /// - `OVERLAY_FONT_FAMILY`: default `sans-serif`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for unparsable numbers, a zero minimum, or
    /// `min > max`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let min_px = env_parse_u32(ENV_MIN_PX, DEFAULT_MIN_FONT_PX)?;
        let max_px = env_parse_u32(ENV_MAX_PX, DEFAULT_MAX_FONT_PX)?;
        let default_px = env_parse_u32(ENV_DEFAULT_PX, DEFAULT_FONT_PX)?;
        let font_family = match std::env::var(ENV_FONT_FAMILY) {
            Ok(v) if !v.trim().is_empty() => v.trim().to_owned(),
            _ => DEFAULT_FONT_FAMILY.to_owned(),
        };
        Self { min_px, max_px, default_px, font_family }.validated()
    }

    /// Check the range and clamp `default_px` into it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero minimum or `min > max`.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.min_px == 0 {
            return Err(ConfigError::ZeroMinimum { var: ENV_MIN_PX });
        }
        if self.min_px > self.max_px {
            return Err(ConfigError::InvertedRange { min: self.min_px, max: self.max_px });
        }
        self.default_px = self.default_px.clamp(self.min_px, self.max_px);
        Ok(self)
    }
}

fn env_parse_u32(var: &'static str, default: u32) -> Result<u32, ConfigError> {
    let Ok(raw) = std::env::var(var) else {
        return Ok(default);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidNumber { var, value: raw.clone() })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
