//! Error types.

use crate::geometry::NodeId;
use thiserror::Error;

/// Errors reported by an [`EditorHost`](crate::host::EditorHost).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("Node not found: {0}")]
    NotFound(NodeId),
    #[error("Property update rejected: {0}")]
    Rejected(String),
}

/// Reasons an interaction could not be started.
///
/// Only gesture starts are fallible. Moves and releases degrade to doing
/// nothing for that frame instead of returning errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractionError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("Node has no live element: {0}")]
    Detached(NodeId),
    #[error("No positioning container for node: {0}")]
    NoContainer(NodeId),
}

/// Result type for starting interactions.
pub type InteractionResult<T> = Result<T, InteractionError>;
