//! Arena-backed tree model with an identity index

use std::collections::HashMap;

use generational_arena::Arena;
use tracing::{instrument, trace};

use crate::domain::collection::NodeCollection;
use crate::domain::description::{NodeDescription, Structure};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Attributes, Node, NodeId, NodeKey};

/// What a removal took out of the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// Parent the subtree was detached from, None for a top-level node
    pub parent: Option<NodeKey>,
    /// Position the subtree root occupied among its siblings
    pub position: usize,
    /// Every removed node, subtree root first, in pre-order
    pub keys: Vec<NodeKey>,
}

/// The logical tree: owning parent→children links, parent back-references by
/// key, and a flat id→node index over every node in the tree.
///
/// Uses a generational arena so stale keys of removed nodes never resolve.
#[derive(Debug, Default)]
pub struct TreeModel {
    arena: Arena<Node>,
    roots: NodeCollection,
    index: HashMap<NodeId, NodeKey>,
}

impl TreeModel {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: NodeCollection::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Top-level nodes in order.
    pub fn roots(&self) -> &NodeCollection {
        &self.roots
    }

    pub fn get(&self, key: NodeKey) -> Option<&Node> {
        self.arena.get(key.0)
    }

    pub(crate) fn get_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.arena.get_mut(key.0)
    }

    pub fn find(&self, id: &NodeId) -> Option<NodeKey> {
        self.index.get(id).copied()
    }

    pub fn require(&self, id: &NodeId) -> DomainResult<NodeKey> {
        self.find(id).ok_or_else(|| DomainError::NotFound(id.clone()))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn clear(&mut self) {
        self.arena.clear();
        self.roots.clear();
        self.index.clear();
    }

    /// Replace the whole model with `structure`.
    ///
    /// The structure is validated up front; on error the model is untouched.
    /// Returns the keys of the new top-level nodes.
    #[instrument(level = "trace", skip(self, structure))]
    pub fn build(&mut self, structure: &Structure) -> DomainResult<Vec<NodeKey>> {
        structure.validate()?;
        self.clear();

        let mut stack: Vec<(&NodeDescription, Option<NodeKey>)> = structure
            .descriptions()
            .iter()
            .rev()
            .map(|description| (description, None))
            .collect();

        // Pre-order pops append every node after its earlier siblings
        while let Some((description, parent)) = stack.pop() {
            let key = self.insert_node(description, parent);
            for child in description.children.iter().rev() {
                stack.push((child, Some(key)));
            }
        }

        Ok(self.roots.iter().collect())
    }

    /// Append one childless node built from `description` under `parent`,
    /// or at top level when `parent` is None.
    #[instrument(level = "trace", skip(self, description))]
    pub fn insert(
        &mut self,
        description: &NodeDescription,
        parent: Option<NodeKey>,
    ) -> DomainResult<NodeKey> {
        description.validate_single("$")?;
        let parent = match parent {
            Some(key) if self.arena.contains(key.0) => Some(key),
            Some(key) => {
                trace!("insert: parent {key} no longer exists, appending at top level");
                None
            }
            None => None,
        };
        Ok(self.insert_node(description, parent))
    }

    fn insert_node(&mut self, description: &NodeDescription, parent: Option<NodeKey>) -> NodeKey {
        let id = description.id.clone();
        let name = description.name.clone().unwrap_or_default();
        let attributes = description.attributes.clone();
        let index = self
            .arena
            .insert_with(|idx| Node::new(NodeKey(idx), id, name, attributes, parent));
        let key = NodeKey(index);

        match parent.and_then(|p| self.arena.get_mut(p.0)) {
            Some(parent_node) => parent_node.children.push(key),
            None => self.roots.push(key),
        }

        if let Some(id) = description.id.clone() {
            if let Some(previous) = self.index.insert(id.clone(), key) {
                trace!("insert_node: id {id} now points at {key} (was {previous})");
            }
        }

        key
    }

    /// Detach `key` and its subtree from the model and the identity index.
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, key: NodeKey) -> Option<Removal> {
        let parent = self.get(key)?.parent;
        let keys = self.depth_first_list(key);

        let position = match parent.and_then(|p| self.arena.get_mut(p.0)) {
            Some(parent_node) => parent_node.children.remove(key),
            None => self.roots.remove(key),
        }?;

        for removed in &keys {
            if let Some(node) = self.arena.remove(removed.0) {
                if let Some(id) = node.id {
                    // Leave entries a later duplicate id took over
                    if self.index.get(&id) == Some(removed) {
                        self.index.remove(&id);
                    }
                }
            }
        }

        Some(Removal {
            parent,
            position,
            keys,
        })
    }

    /// Overwrite name (when given) and attributes; returns the previous
    /// attributes. Children and id are never touched.
    #[instrument(level = "trace", skip(self, attributes))]
    pub fn update(
        &mut self,
        key: NodeKey,
        name: Option<&str>,
        attributes: Attributes,
    ) -> Option<Attributes> {
        let node = self.get_mut(key)?;
        if let Some(name) = name {
            node.name = name.to_string();
        }
        Some(std::mem::replace(&mut node.attributes, attributes))
    }

    /// Set the expansion flag; returns true when the effective state changed.
    pub fn set_expanded(&mut self, key: NodeKey, expanded: bool, default: bool) -> bool {
        match self.get_mut(key) {
            Some(node) => {
                let before = node.is_expanded(default);
                node.expanded = Some(expanded);
                before != expanded
            }
            None => false,
        }
    }

    /// Pre-order iterator over the whole forest.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder::new(self, self.roots.as_slice())
    }

    /// Pre-order iterator over the subtree rooted at `key`.
    pub fn iter_from(&self, key: NodeKey) -> PreOrder<'_> {
        PreOrder::new(self, std::slice::from_ref(&key))
    }

    /// Keys of the subtree rooted at `key`, in pre-order.
    pub fn depth_first_list(&self, key: NodeKey) -> Vec<NodeKey> {
        self.iter_from(key).map(Node::key).collect()
    }

    /// Call `visitor` once per node, pre-order.
    pub fn walk(&self, mut visitor: impl FnMut(&Node)) {
        for node in self.iter() {
            visitor(node);
        }
    }

    /// Keys of all non-leaf nodes, pre-order.
    pub fn branches(&self) -> Vec<NodeKey> {
        self.iter()
            .filter(|node| !node.is_leaf())
            .map(Node::key)
            .collect()
    }

    /// Number of levels in the deepest top-level tree, 0 when empty.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(NodeKey, usize)> = self.roots.iter().map(|root| (root, 1)).collect();
        while let Some((key, level)) = stack.pop() {
            if let Some(node) = self.get(key) {
                deepest = deepest.max(level);
                stack.extend(node.children.iter().map(|child| (child, level + 1)));
            }
        }
        deepest
    }

    /// Keys of all leaf nodes, pre-order.
    pub fn leaves(&self) -> Vec<NodeKey> {
        self.iter()
            .filter(|node| node.is_leaf())
            .map(Node::key)
            .collect()
    }
}

/// Pre-order depth-first traversal: a node before its children, children in
/// sibling order.
pub struct PreOrder<'a> {
    model: &'a TreeModel,
    stack: Vec<NodeKey>,
}

impl<'a> PreOrder<'a> {
    fn new(model: &'a TreeModel, start: &[NodeKey]) -> Self {
        Self {
            model,
            stack: start.iter().rev().copied().collect(),
        }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(key) = self.stack.pop() {
            if let Some(node) = self.model.get(key) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.as_slice().iter().rev());
                return Some(node);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Structure {
        Structure::from(vec![
            NodeDescription::new("root").with_id("root").with_child(
                NodeDescription::new("subfolder")
                    .with_id("sub")
                    .with_child(NodeDescription::new("README").with_id("readme"))
                    .with_child(NodeDescription::new("file.txt")),
            ),
            NodeDescription::new("other").with_id(2),
        ])
    }

    const DEEP_CHAIN: usize = 10_000;

    fn names(model: &TreeModel) -> Vec<String> {
        model.iter().map(|n| n.name().to_string()).collect()
    }

    #[test]
    fn given_structure_when_building_then_pre_order_matches_nesting() {
        let mut model = TreeModel::new();

        let roots = model.build(&sample()).unwrap();

        assert_eq!(roots.len(), 2);
        assert_eq!(model.len(), 5);
        assert_eq!(
            names(&model),
            vec!["root", "subfolder", "README", "file.txt", "other"]
        );
        assert_eq!(model.depth(), 3);
        assert_eq!(model.leaves().len(), 3);
    }

    #[test]
    fn given_built_model_when_checking_parents_then_back_references_are_consistent() {
        let mut model = TreeModel::new();
        model.build(&sample()).unwrap();

        for node in model.iter() {
            match node.parent() {
                Some(parent) => assert!(model.get(parent).unwrap().children().contains(node.key())),
                None => assert!(model.roots().contains(node.key())),
            }
        }
    }

    #[test]
    fn given_malformed_structure_when_building_then_model_is_untouched() {
        let mut model = TreeModel::new();
        model.build(&sample()).unwrap();

        let bad = Structure::from(NodeDescription::default());
        assert!(model.build(&bad).is_err());

        assert_eq!(model.len(), 5);
    }

    #[test]
    fn given_subtree_when_removing_then_evicts_subtree_from_index() {
        let mut model = TreeModel::new();
        model.build(&sample()).unwrap();
        let sub = model.find(&"sub".into()).unwrap();
        let root = model.find(&"root".into()).unwrap();

        let removal = model.remove(sub).unwrap();

        assert_eq!(removal.parent, Some(root));
        assert_eq!(removal.position, 0);
        assert_eq!(removal.keys.len(), 3);
        assert_eq!(removal.keys[0], sub);
        assert!(model.find(&"readme".into()).is_none());
        assert!(model.get(sub).is_none());
        assert!(model.get(root).unwrap().is_leaf());
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn given_duplicate_id_when_inserting_then_last_writer_wins() {
        let mut model = TreeModel::new();
        let first = model.insert(&NodeDescription::new("a").with_id(1), None).unwrap();
        let second = model.insert(&NodeDescription::new("b").with_id(1), None).unwrap();

        assert_eq!(model.find(&1.into()), Some(second));

        // Removing the shadowed node keeps the newer entry
        model.remove(first);
        assert_eq!(model.find(&1.into()), Some(second));
    }

    #[test]
    fn given_description_with_children_when_inserting_then_adds_single_node() {
        let mut model = TreeModel::new();
        let description = NodeDescription::new("n").with_child(NodeDescription::new("ignored"));

        let key = model.insert(&description, None).unwrap();

        assert_eq!(model.len(), 1);
        assert!(model.get(key).unwrap().is_leaf());
    }

    #[test]
    fn given_node_when_updating_then_children_and_id_are_kept() {
        let mut model = TreeModel::new();
        model.build(&sample()).unwrap();
        let root = model.find(&"root".into()).unwrap();
        let children_before = model.get(root).unwrap().children().clone();

        let previous = model.update(root, Some("renamed"), Attributes::new()).unwrap();

        let node = model.get(root).unwrap();
        assert!(previous.is_empty());
        assert_eq!(node.name(), "renamed");
        assert_eq!(node.id(), Some(&NodeId::from("root")));
        assert_eq!(node.children(), &children_before);
    }

    #[test]
    fn given_walk_when_visiting_then_calls_once_per_node() {
        let mut model = TreeModel::new();
        model.build(&sample()).unwrap();
        let mut visited = Vec::new();

        model.walk(|node| visited.push(node.key()));

        assert_eq!(visited, model.iter().map(Node::key).collect::<Vec<_>>());
        assert_eq!(model.branches().len(), 2);
    }

    #[test]
    fn given_very_deep_chain_when_measuring_and_removing_then_no_recursion_limit() {
        let mut model = TreeModel::new();
        let root = model.insert(&NodeDescription::new("0"), None).unwrap();
        let mut parent = root;
        for level in 1..DEEP_CHAIN {
            parent = model
                .insert(&NodeDescription::new(level.to_string()), Some(parent))
                .unwrap();
        }

        assert_eq!(model.depth(), DEEP_CHAIN);
        assert_eq!(model.iter().count(), DEEP_CHAIN);

        let removal = model.remove(root).unwrap();
        assert_eq!(removal.keys.len(), DEEP_CHAIN);
        assert!(model.is_empty());
    }
}
