//! Node descriptions: the input format for `load` and `add`

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Attributes, NodeId};

/// Description of one node and, for `load`, its nested children.
///
/// ```json
/// { "id": 1, "name": "root", "attributes": {"foo": "bar"}, "children": [] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    /// Required for `load`/`add`; optional for `update`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDescription>,
}

impl NodeDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Description addressing an existing node, for `update`.
    pub fn for_id(id: impl Into<NodeId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: NodeDescription) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeDescription>) -> Self {
        self.children.extend(children);
        self
    }

    /// Number of nodes described, this one included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(NodeDescription::count).sum::<usize>()
    }

    pub fn from_json(json: &str) -> DomainResult<Self> {
        serde_json::from_str(json).map_err(|e| DomainError::MalformedDescription {
            path: "$".to_string(),
            reason: e.to_string(),
        })
    }

    /// Check this node only; nested children are not inspected.
    pub(crate) fn validate_single(&self, path: &str) -> DomainResult<()> {
        match self.name.as_deref() {
            Some(_) => Ok(()),
            None => Err(DomainError::MalformedDescription {
                path: path.to_string(),
                reason: "missing required field `name`".to_string(),
            }),
        }
    }

    pub(crate) fn validate(&self, path: &str) -> DomainResult<()> {
        self.validate_single(path)?;
        for (i, child) in self.children.iter().enumerate() {
            child.validate(&format!("{path}.children[{i}]"))?;
        }
        Ok(())
    }
}

/// Input to `load`: one description, several, or nothing at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Structure {
    Many(Vec<NodeDescription>),
    One(NodeDescription),
}

impl Default for Structure {
    fn default() -> Self {
        Structure::Many(Vec::new())
    }
}

impl Structure {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Top-level descriptions in order.
    pub fn descriptions(&self) -> &[NodeDescription] {
        match self {
            Structure::Many(many) => many,
            Structure::One(one) => std::slice::from_ref(one),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions().is_empty()
    }

    /// Total number of described nodes, nested ones included.
    pub fn count(&self) -> usize {
        self.descriptions().iter().map(NodeDescription::count).sum()
    }

    /// Parse an object, an array of objects, or `null`.
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let parsed: Option<Structure> =
            serde_json::from_str(json).map_err(|e| DomainError::MalformedDescription {
                path: "$".to_string(),
                reason: e.to_string(),
            })?;
        Ok(parsed.unwrap_or_default())
    }

    pub(crate) fn validate(&self) -> DomainResult<()> {
        for (i, description) in self.descriptions().iter().enumerate() {
            description.validate(&format!("[{i}]"))?;
        }
        Ok(())
    }
}

impl From<NodeDescription> for Structure {
    fn from(value: NodeDescription) -> Self {
        Structure::One(value)
    }
}

impl From<Vec<NodeDescription>> for Structure {
    fn from(value: Vec<NodeDescription>) -> Self {
        Structure::Many(value)
    }
}

impl From<Option<Structure>> for Structure {
    fn from(value: Option<Structure>) -> Self {
        value.unwrap_or_default()
    }
}
