//! glyphtree: an expandable tree widget over an abstract host document
//!
//! Architecture:
//! - `domain/`: arena-backed tree model with an identity index
//! - `application/`: renderer, event binder and the `Tree` API
//! - `infrastructure/`: host document trait and the in-memory document
//! - `config`: layered options with process-wide defaults
//! - `outline`: text outlines of the model and of rendered elements

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod outline;
pub mod util;

pub use application::{ApplicationError, ApplicationResult, Dispatch, NodeView, Tree};
pub use config::{GlyphSet, RawOptions, TreeOptions};
pub use domain::{Node, NodeDescription, NodeId, NodeKey, Structure};
pub use infrastructure::{Document, ElementId, HostEvent, Key, MemoryDocument};
pub use outline::{ElementOutline, Outline};
