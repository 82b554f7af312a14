//! Infrastructure-level errors (host document failures)

use thiserror::Error;

use crate::infrastructure::document::ElementId;

/// Errors reported by a [`Document`](crate::infrastructure::Document).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InfraError {
    #[error("unknown element: {0}")]
    UnknownElement(ElementId),

    #[error("cannot insert {child} under {parent}: would create a cycle")]
    HierarchyRequest { parent: ElementId, child: ElementId },
}

/// Result type for host document operations.
pub type InfraResult<T> = Result<T, InfraError>;
