//! Application layer: rendering, event binding and the public tree API
//!
//! This layer drives the domain model and writes through the host document
//! trait.

pub mod binder;
pub mod error;
pub mod render;
pub mod tree;

pub use binder::{action_for, Action, EventBinder, Trigger, BOUND_EVENTS, DISPATCH_TABLE};
pub use error::{ApplicationError, ApplicationResult};
pub use render::{ClassNames, NodeView, Renderer, View};
pub use tree::{Dispatch, Tree};
