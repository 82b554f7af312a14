//! Application-level errors (wraps domain and host errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::{ElementId, InfraError};

/// Errors surfaced to callers of the tree API.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("host document: {0}")]
    Infra(#[from] InfraError),

    #[error("element {element} has an interaction listener but no bound handler")]
    InvalidCallback { element: ElementId },

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
