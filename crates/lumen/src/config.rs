//! # Engine Configuration
//!
//! Read once at startup. Every field has a default, so an empty document
//! is a valid config:
//!
//! ```toml
//! target_fps = 60
//! time_scale = 1.0
//! max_frame_delta_ms = 100
//! draw_pool_capacity = 256
//! enable_timing_logs = false
//!
//! [viewport]
//! width = 1280.0
//! height = 720.0
//!
//! [background]
//! r = 0.0
//! g = 0.0
//! b = 0.0
//! a = 1.0
//! ```

use std::path::Path;
use std::time::Duration;

use lumen_core::Size;
use lumen_ui::Color;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Viewport dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewportConfig {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl From<ViewportConfig> for Size {
    fn from(viewport: ViewportConfig) -> Self {
        Size::new(viewport.width, viewport.height)
    }
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Frame rate the budget is measured against.
    pub target_fps: u32,
    /// Initial multiplier for scaled time.
    pub time_scale: f64,
    /// Clamp on a single frame's scaled delta, in milliseconds.
    pub max_frame_delta_ms: u64,
    /// Initial viewport.
    pub viewport: ViewportConfig,
    /// Clear color handed to the display sink.
    pub background: Color,
    /// Draw entries built up front.
    pub draw_pool_capacity: usize,
    /// Warn about frames that blow the budget.
    pub enable_timing_logs: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            time_scale: 1.0,
            max_frame_delta_ms: 100,
            viewport: ViewportConfig::default(),
            background: Color::BLACK,
            draw_pool_capacity: 256,
            enable_timing_logs: false,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`EngineError::Toml`] for malformed input, [`EngineError::Config`]
    /// for out-of-range values.
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`EngineError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] naming the first offending field.
    pub fn validate(&self) -> EngineResult<()> {
        if self.target_fps == 0 {
            return Err(EngineError::config("target_fps", "must be positive"));
        }
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(EngineError::config(
                "time_scale",
                format!("must be finite and non-negative, got {}", self.time_scale),
            ));
        }
        if self.max_frame_delta_ms == 0 {
            return Err(EngineError::config("max_frame_delta_ms", "must be positive"));
        }
        let viewport = self.viewport;
        if !(viewport.width.is_finite() && viewport.height.is_finite())
            || Size::from(viewport).is_empty()
        {
            return Err(EngineError::config(
                "viewport",
                format!("must be non-zero, got {}x{}", viewport.width, viewport.height),
            ));
        }
        Ok(())
    }

    /// Time available to one frame at `target_fps`.
    #[must_use]
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps.max(1)
    }

    /// Per-frame delta clamp.
    #[must_use]
    pub fn max_frame_delta(&self) -> Duration {
        Duration::from_millis(self.max_frame_delta_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = EngineConfig::from_toml_str(
            r"
            target_fps = 120
            enable_timing_logs = true

            [viewport]
            width = 320.0
            height = 200.0

            [background]
            r = 0.1
            g = 0.2
            b = 0.3
            a = 1.0
            ",
        )
        .unwrap();

        assert_eq!(config.target_fps, 120);
        assert!(config.enable_timing_logs);
        assert_eq!(Size::from(config.viewport), Size::new(320.0, 200.0));
        assert_eq!(config.background, Color::rgba(0.1, 0.2, 0.3, 1.0));
        assert_eq!(config.draw_pool_capacity, 256);
        assert_eq!(config.frame_budget(), Duration::from_secs(1) / 120);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = EngineConfig::from_toml_str("target_fps = 0").unwrap_err();
        assert!(matches!(err, EngineError::Config { field: "target_fps", .. }));

        let err = EngineConfig::from_toml_str("time_scale = -1.0").unwrap_err();
        assert!(matches!(err, EngineError::Config { field: "time_scale", .. }));

        let err = EngineConfig::from_toml_str("[viewport]\nwidth = 0.0\nheight = 10.0").unwrap_err();
        assert!(matches!(err, EngineError::Config { field: "viewport", .. }));
    }

    #[test]
    fn test_rejects_malformed_and_unknown() {
        assert!(matches!(
            EngineConfig::from_toml_str("target_fps = \"fast\""),
            Err(EngineError::Toml(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("vsync = true"),
            Err(EngineError::Toml(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }
}
