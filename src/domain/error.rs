//! Domain-level errors (no host dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Domain errors represent violations of the tree model's contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("malformed node description at {path}: {reason}")]
    MalformedDescription { path: String, reason: String },

    #[error("node not found: {0}")]
    NotFound(NodeId),
}

/// Result type for model operations.
pub type DomainResult<T> = Result<T, DomainError>;
