//! Domain layer: the tree model
//!
//! This layer is independent of the host document (no elements, no events).

pub mod collection;
pub mod description;
pub mod error;
pub mod model;
pub mod node;

pub use collection::NodeCollection;
pub use description::{NodeDescription, Structure};
pub use error::{DomainError, DomainResult};
pub use model::{PreOrder, Removal, TreeModel};
pub use node::{Attributes, FloatId, Node, NodeId, NodeKey, NodeType};
