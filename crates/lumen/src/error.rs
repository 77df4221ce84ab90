//! # Engine Error Types

use std::path::PathBuf;

use lumen_ui::TreeError;
use thiserror::Error;

/// Errors raised while setting up or resetting an [`Engine`](crate::Engine).
///
/// Per-frame failures (task producers, image generation) never surface here;
/// they are isolated and logged where they happen.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration text is not valid TOML for [`EngineConfig`](crate::EngineConfig).
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration parsed but a value is out of range.
    #[error("invalid config value `{field}`: {reason}")]
    Config {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A node tree operation was rejected.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl EngineError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Config {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for engine setup.
pub type EngineResult<T> = Result<T, EngineError>;
