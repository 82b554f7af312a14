//! Tree nodes and their identities

use std::collections::BTreeMap;
use std::fmt;

use generational_arena::Index;
use serde::{Deserialize, Serialize};

use crate::domain::collection::NodeCollection;

/// Opaque attributes carried by a node, passed through to rendering.
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// Caller-supplied node identifier: a string or a number.
///
/// Integral numbers that fit `i64` are always `Number`, so `2` and `2.0`
/// name the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged, from = "RawNodeId")]
pub enum NodeId {
    Number(i64),
    Float(FloatId),
    Text(String),
}

/// Non-integral (or out of `i64` range) numeric id, compared by bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FloatId(u64);

impl FloatId {
    pub fn new(value: f64) -> Self {
        // -0.0 and 0.0 are one id
        let value = if value == 0.0 { 0.0 } else { value };
        Self(value.to_bits())
    }

    pub fn value(self) -> f64 {
        f64::from_bits(self.0)
    }
}

impl Serialize for FloatId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNodeId {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<RawNodeId> for NodeId {
    fn from(raw: RawNodeId) -> Self {
        match raw {
            RawNodeId::Integer(n) => NodeId::Number(n),
            RawNodeId::Float(value) => NodeId::from(value),
            RawNodeId::Text(s) => NodeId::Text(s),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Number(n) => write!(f, "{n}"),
            NodeId::Float(v) => write!(f, "{}", v.value()),
            NodeId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for NodeId {
    fn from(value: f64) -> Self {
        // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
        if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            NodeId::Number(value as i64)
        } else {
            NodeId::Float(FloatId::new(value))
        }
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId::Text(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        NodeId::Text(value)
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        NodeId::Number(value)
    }
}

impl From<i32> for NodeId {
    fn from(value: i32) -> Self {
        NodeId::Number(i64::from(value))
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        NodeId::Number(i64::from(value))
    }
}

impl From<&NodeId> for NodeId {
    fn from(value: &NodeId) -> Self {
        value.clone()
    }
}

/// Internal handle of a node in the model arena.
///
/// Every node has one, including nodes loaded without an [`NodeId`].
/// Keys are never reused for a different node while the model lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(pub(crate) Index);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{slot}.{generation}")
    }
}

/// Leaf/branch classification, always derived from the child count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Leaf,
    Branch,
}

/// A single tree entry.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) key: NodeKey,
    pub(crate) id: Option<NodeId>,
    pub(crate) name: String,
    pub(crate) attributes: Attributes,
    pub(crate) children: NodeCollection,
    /// Non-owning back reference, None for top-level nodes
    pub(crate) parent: Option<NodeKey>,
    /// None until the node is first expanded or collapsed
    pub(crate) expanded: Option<bool>,
}

impl Node {
    pub(crate) fn new(
        key: NodeKey,
        id: Option<NodeId>,
        name: String,
        attributes: Attributes,
        parent: Option<NodeKey>,
    ) -> Self {
        Self {
            key,
            id,
            name,
            attributes,
            children: NodeCollection::new(),
            parent,
            expanded: None,
        }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn id(&self) -> Option<&NodeId> {
        self.id.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn children(&self) -> &NodeCollection {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn node_type(&self) -> NodeType {
        if self.is_leaf() {
            NodeType::Leaf
        } else {
            NodeType::Branch
        }
    }

    /// Explicit expansion flag, if the node was ever expanded or collapsed.
    pub fn expanded_flag(&self) -> Option<bool> {
        self.expanded
    }

    /// Effective expansion state, falling back to `default` when never set.
    pub fn is_expanded(&self, default: bool) -> bool {
        self.expanded.unwrap_or(default)
    }
}
