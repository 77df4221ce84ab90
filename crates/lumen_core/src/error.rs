//! # Task Error Types
//!
//! Failures a scheduled task can complete its handle with.

use thiserror::Error;

/// Why a scheduled task produced no value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The producer (or coroutine step) reported a failure.
    #[error("task failed: {message}")]
    Failed {
        /// Description of the failure.
        message: String,
    },

    /// The task was cancelled before its producer ran.
    #[error("task cancelled before it ran")]
    Cancelled,
}

impl TaskError {
    /// Builds a [`TaskError::Failed`] from anything printable.
    #[must_use]
    pub fn failed(message: impl std::fmt::Display) -> Self {
        Self::Failed {
            message: message.to_string(),
        }
    }
}

/// Result type for task producers and coroutine steps.
pub type TaskResult<T> = Result<T, TaskError>;
