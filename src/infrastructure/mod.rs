//! Infrastructure layer: host document boundary and implementations
//!
//! The document trait abstracts the rendering environment so the tree can be
//! driven against a real host or the in-memory document in tests.

pub mod document;
pub mod error;
pub mod memory;

pub use document::{Document, ElementId, EventKind, HostEvent, Interaction, Key};
pub use error::{InfraError, InfraResult};
pub use memory::MemoryDocument;
