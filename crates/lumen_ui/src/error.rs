//! # Node Tree Error Types
//!
//! Structural contract violations are returned synchronously as
//! [`TreeError`]. Image generation failures ([`GenerateError`]) never reach
//! the caller of a frame: they are logged and the node keeps its old image.

use thiserror::Error;

use crate::node::NodeId;

/// Structural errors raised by [`NodeTree`](crate::NodeTree) operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// No node with this id exists in the tree.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// The node's parent and visibility are frozen.
    #[error("node {0} is structure-locked")]
    StructureLocked(NodeId),

    /// The requested parent is the node itself or one of its descendants.
    #[error("cannot attach node {node} under {parent}: it would become its own ancestor")]
    Cycle {
        /// Node being re-parented.
        node: NodeId,
        /// Rejected parent.
        parent: NodeId,
    },
}

/// Result type for node tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Failure inside a node's image generation hook.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerateError {
    /// The image backend refused the request.
    #[error("image backend error: {message}")]
    Backend {
        /// Backend description of the failure.
        message: String,
    },

    /// The requested image dimensions are unusable.
    #[error("invalid image size {width}x{height}")]
    InvalidSize {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },

    /// Content-specific failure.
    #[error("generation failed: {message}")]
    Failed {
        /// Description of the failure.
        message: String,
    },
}

impl GenerateError {
    /// Builds a [`GenerateError::Failed`] from anything printable.
    #[must_use]
    pub fn failed(message: impl std::fmt::Display) -> Self {
        Self::Failed {
            message: message.to_string(),
        }
    }
}
