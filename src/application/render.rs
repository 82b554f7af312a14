//! Rendering of the model into the host document
//!
//! Two separate paths:
//! - full rebuild (`render_all`), used by `load` and `render`: discards the
//!   rendered forest and builds it again from the model;
//! - patches (`insert_node`, `remove_node`, `relabel_node`, `apply_state`),
//!   used by `add`, `remove`, `update` and toggles: touch only the elements
//!   implied by one model change.
//!
//! Rendered shape, with `p` the class prefix:
//!
//! ```text
//! mount
//! └── ul.p-tree                  forest wrapper
//!     └── li.p-node[.p-leaf][.p-expanded]   interactive
//!         ├── span.p-icon        glyph
//!         ├── span.p-label       name, interactive, focusable
//!         └── ul.p-tree          only while the node has children
//! ```

use std::collections::HashMap;

use tracing::{trace, warn};

use crate::application::binder::EventBinder;
use crate::application::ApplicationResult;
use crate::config::{GlyphSet, TreeOptions};
use crate::domain::{Attributes, Node, NodeKey, Removal, TreeModel};
use crate::infrastructure::{Document, ElementId, InfraError};

/// Generated class names for one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNames {
    pub tree: String,
    pub node: String,
    pub leaf: String,
    pub expanded: String,
    pub label: String,
    pub icon: String,
}

impl ClassNames {
    pub fn new(prefix: &str) -> Self {
        Self {
            tree: format!("{prefix}tree"),
            node: format!("{prefix}node"),
            leaf: format!("{prefix}leaf"),
            expanded: format!("{prefix}expanded"),
            label: format!("{prefix}label"),
            icon: format!("{prefix}icon"),
        }
    }
}

/// Elements rendered for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeView {
    pub element: ElementId,
    pub icon: ElementId,
    pub label: ElementId,
    /// Wrapper of the child elements, present iff the node has children
    pub children: Option<ElementId>,
}

/// Rendered side of the tree: node key → elements.
#[derive(Debug, Default)]
pub struct View {
    forest: Option<ElementId>,
    nodes: HashMap<NodeKey, NodeView>,
}

impl View {
    pub fn forest(&self) -> Option<ElementId> {
        self.forest
    }

    pub fn get(&self, key: NodeKey) -> Option<NodeView> {
        self.nodes.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn data_attribute(key: &str) -> String {
    format!("data-{key}")
}

fn attribute_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Maps nodes to elements and keeps them in sync.
#[derive(Debug, Clone)]
pub struct Renderer {
    classes: ClassNames,
    glyphs: GlyphSet,
    start_expanded: bool,
}

impl Renderer {
    pub fn new(options: &TreeOptions) -> Self {
        Self {
            classes: ClassNames::new(&options.class_prefix),
            glyphs: options.glyphs.clone(),
            start_expanded: options.start_expanded,
        }
    }

    pub fn classes(&self) -> &ClassNames {
        &self.classes
    }

    /// Discard the rendered forest and rebuild it from `model`.
    pub fn render_all<D: Document>(
        &self,
        document: &mut D,
        mount: ElementId,
        model: &TreeModel,
        view: &mut View,
        binder: &mut EventBinder,
    ) -> ApplicationResult<ElementId> {
        if !document.contains(mount) {
            return Err(InfraError::UnknownElement(mount).into());
        }
        if let Some(forest) = view.forest.take() {
            if document.contains(forest) {
                document.remove_element(forest)?;
            }
        }
        view.nodes.clear();
        binder.clear();

        // Built detached, attached once complete
        let forest = self.create_wrapper(document)?;
        for root in model.roots() {
            if let Some(node) = model.get(root) {
                let element = self.build_subtree(document, model, node, view, binder)?;
                document.append_child(forest, element)?;
            }
        }
        document.append_child(mount, forest)?;
        view.forest = Some(forest);

        trace!("render_all: {} nodes rendered", view.nodes.len());
        Ok(forest)
    }

    /// Render `node` and everything below it, detached; returns the node element.
    fn build_subtree<D: Document>(
        &self,
        document: &mut D,
        model: &TreeModel,
        node: &Node,
        view: &mut View,
        binder: &mut EventBinder,
    ) -> ApplicationResult<ElementId> {
        let top = self.render_node(document, model, node, view, binder)?;

        // (child, wrapper it goes into); reversed pushes keep sibling order
        let mut stack: Vec<(NodeKey, ElementId)> = Vec::new();
        if let Some(wrapper) = top.children {
            stack.extend(node.children().iter().rev().map(|child| (child, wrapper)));
        }
        while let Some((key, container)) = stack.pop() {
            let Some(child) = model.get(key) else {
                continue;
            };
            let child_view = self.render_node(document, model, child, view, binder)?;
            document.append_child(container, child_view.element)?;
            if let Some(wrapper) = child_view.children {
                stack.extend(child.children().iter().rev().map(|k| (k, wrapper)));
            }
        }

        Ok(top.element)
    }

    /// Elements of one node plus an empty children wrapper for a branch.
    fn render_node<D: Document>(
        &self,
        document: &mut D,
        model: &TreeModel,
        node: &Node,
        view: &mut View,
        binder: &mut EventBinder,
    ) -> ApplicationResult<NodeView> {
        let mut node_view = self.create_node_element(document, node, binder)?;
        if !node.is_leaf() {
            let wrapper = self.create_wrapper(document)?;
            document.append_child(node_view.element, wrapper)?;
            node_view.children = Some(wrapper);
        }
        view.nodes.insert(node.key(), node_view);
        self.apply_state(document, model, node.key(), view)?;
        Ok(node_view)
    }

    fn create_node_element<D: Document>(
        &self,
        document: &mut D,
        node: &Node,
        binder: &mut EventBinder,
    ) -> ApplicationResult<NodeView> {
        let element = document.create_element("li");
        document.add_class(element, &self.classes.node)?;
        for (key, value) in node.attributes() {
            document.set_attribute(element, &data_attribute(key), &attribute_value(value))?;
        }

        let icon = document.create_element("span");
        document.add_class(icon, &self.classes.icon)?;
        document.append_child(element, icon)?;

        let label = document.create_element("span");
        document.add_class(label, &self.classes.label)?;
        document.set_attribute(label, "tabindex", "0")?;
        document.set_text(label, node.name())?;
        document.append_child(element, label)?;

        // The whole node is interactive; nested nodes catch their own events first
        binder.bind(document, element, node.key())?;
        binder.bind(document, label, node.key())?;

        Ok(NodeView {
            element,
            icon,
            label,
            children: None,
        })
    }

    fn create_wrapper<D: Document>(&self, document: &mut D) -> ApplicationResult<ElementId> {
        let wrapper = document.create_element("ul");
        document.add_class(wrapper, &self.classes.tree)?;
        Ok(wrapper)
    }

    fn ensure_forest<D: Document>(
        &self,
        document: &mut D,
        mount: ElementId,
        view: &mut View,
    ) -> ApplicationResult<ElementId> {
        if let Some(forest) = view.forest {
            return Ok(forest);
        }
        let forest = self.create_wrapper(document)?;
        document.append_child(mount, forest)?;
        view.forest = Some(forest);
        Ok(forest)
    }

    fn ensure_children_wrapper<D: Document>(
        &self,
        document: &mut D,
        parent: NodeKey,
        view: &mut View,
    ) -> ApplicationResult<Option<ElementId>> {
        let Some(parent_view) = view.nodes.get_mut(&parent) else {
            return Ok(None);
        };
        if let Some(wrapper) = parent_view.children {
            return Ok(Some(wrapper));
        }
        let wrapper = self.create_wrapper(document)?;
        document.append_child(parent_view.element, wrapper)?;
        parent_view.children = Some(wrapper);
        Ok(Some(wrapper))
    }

    /// Render a freshly inserted node at the end of its parent's child list.
    ///
    /// A parent that was a leaf gains a children wrapper and branch state.
    pub fn insert_node<D: Document>(
        &self,
        document: &mut D,
        mount: ElementId,
        model: &TreeModel,
        key: NodeKey,
        view: &mut View,
        binder: &mut EventBinder,
    ) -> ApplicationResult<()> {
        let Some(node) = model.get(key) else {
            return Ok(());
        };

        let container = match node.parent() {
            None => Some(self.ensure_forest(document, mount, view)?),
            Some(parent) => self.ensure_children_wrapper(document, parent, view)?,
        };
        let Some(container) = container else {
            warn!("insert_node: parent of {key} is not rendered, skipping");
            return Ok(());
        };

        let element = self.build_subtree(document, model, node, view, binder)?;
        document.append_child(container, element)?;

        if let Some(parent) = node.parent() {
            self.apply_state(document, model, parent, view)?;
        }
        Ok(())
    }

    /// Drop the elements of a removed subtree.
    ///
    /// A parent left without children loses its wrapper and becomes a leaf.
    pub fn remove_node<D: Document>(
        &self,
        document: &mut D,
        model: &TreeModel,
        removal: &Removal,
        view: &mut View,
        binder: &mut EventBinder,
    ) -> ApplicationResult<()> {
        let Some(&top) = removal.keys.first() else {
            return Ok(());
        };
        let top_view = view.nodes.get(&top).copied();

        for key in &removal.keys {
            if let Some(node_view) = view.nodes.remove(key) {
                binder.unbind(node_view.element);
                binder.unbind(node_view.label);
            }
        }
        if let Some(node_view) = top_view {
            document.remove_element(node_view.element)?;
        }

        if let Some(parent) = removal.parent {
            if model.get(parent).is_some_and(Node::is_leaf) {
                if let Some(wrapper) = view.nodes.get_mut(&parent).and_then(|v| v.children.take()) {
                    document.remove_element(wrapper)?;
                }
            }
            self.apply_state(document, model, parent, view)?;
        }
        Ok(())
    }

    /// Refresh the label text and `data-*` attributes of one node.
    pub fn relabel_node<D: Document>(
        &self,
        document: &mut D,
        model: &TreeModel,
        key: NodeKey,
        previous: &Attributes,
        view: &View,
    ) -> ApplicationResult<()> {
        let (Some(node), Some(node_view)) = (model.get(key), view.get(key)) else {
            return Ok(());
        };

        document.set_text(node_view.label, node.name())?;
        for stale in previous.keys().filter(|k| !node.attributes().contains_key(*k)) {
            document.remove_attribute(node_view.element, &data_attribute(stale))?;
        }
        for (name, value) in node.attributes() {
            document.set_attribute(node_view.element, &data_attribute(name), &attribute_value(value))?;
        }
        Ok(())
    }

    /// Sync leaf/expanded classes and the glyph of one node.
    pub fn apply_state<D: Document>(
        &self,
        document: &mut D,
        model: &TreeModel,
        key: NodeKey,
        view: &View,
    ) -> ApplicationResult<()> {
        let (Some(node), Some(node_view)) = (model.get(key), view.get(key)) else {
            return Ok(());
        };

        let leaf = node.is_leaf();
        let expanded = !leaf && node.is_expanded(self.start_expanded);
        document.set_class(node_view.element, &self.classes.leaf, leaf)?;
        document.set_class(node_view.element, &self.classes.expanded, expanded)?;
        document.set_text(node_view.icon, self.glyph(leaf, expanded))?;
        Ok(())
    }

    fn glyph(&self, leaf: bool, expanded: bool) -> &str {
        match (leaf, expanded) {
            (true, _) => &self.glyphs.leaf,
            (false, true) => &self.glyphs.expanded,
            (false, false) => &self.glyphs.collapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodeDescription, Structure};
    use crate::infrastructure::MemoryDocument;

    struct Fixture {
        doc: MemoryDocument,
        mount: ElementId,
        model: TreeModel,
        view: View,
        binder: EventBinder,
        renderer: Renderer,
    }

    fn fixture() -> Fixture {
        let mut doc = MemoryDocument::new();
        let mount = doc.create_mount("div");
        Fixture {
            doc,
            mount,
            model: TreeModel::new(),
            view: View::default(),
            binder: EventBinder::new(),
            renderer: Renderer::new(&TreeOptions::default()),
        }
    }

    fn sample() -> Structure {
        Structure::from(
            NodeDescription::new("root")
                .with_id("root")
                .with_attribute("foo", "bar")
                .with_child(
                    NodeDescription::new("subfolder")
                        .with_child(NodeDescription::new("README"))
                        .with_child(NodeDescription::new("file.txt")),
                ),
        )
    }

    #[test]
    fn given_model_when_rendering_all_then_mirrors_shape() {
        // Arrange
        let mut f = fixture();
        f.model.build(&sample()).unwrap();

        // Act
        let forest = f
            .renderer
            .render_all(&mut f.doc, f.mount, &f.model, &mut f.view, &mut f.binder)
            .unwrap();

        // Assert
        assert_eq!(f.doc.children(f.mount), vec![forest]);
        assert_eq!(f.doc.count_class("glyphtree-node"), 4);
        assert_eq!(f.doc.count_class("glyphtree-tree"), 3);
        assert_eq!(f.doc.count_class("glyphtree-leaf"), 2);
        assert_eq!(f.doc.count_class("glyphtree-expanded"), 0);
        assert_eq!(f.doc.count_class("glyphtree-label"), 4);
        assert_eq!(f.binder.len(), 8);

        let root = f.model.find(&"root".into()).unwrap();
        let root_view = f.view.get(root).unwrap();
        assert_eq!(f.doc.attribute(root_view.element, "data-foo"), Some("bar"));
        assert_eq!(f.doc.text(root_view.label), Some("root"));
        assert_eq!(f.doc.text(root_view.icon), Some("▸"));
    }

    #[test]
    fn given_rendered_tree_when_rendering_again_then_replaces_forest() {
        let mut f = fixture();
        f.model.build(&sample()).unwrap();
        let first = f
            .renderer
            .render_all(&mut f.doc, f.mount, &f.model, &mut f.view, &mut f.binder)
            .unwrap();
        let elements = f.doc.len();

        let second = f
            .renderer
            .render_all(&mut f.doc, f.mount, &f.model, &mut f.view, &mut f.binder)
            .unwrap();

        assert_ne!(first, second);
        assert!(!f.doc.contains(first));
        assert_eq!(f.doc.len(), elements);
        assert_eq!(f.binder.len(), 8);
    }

    #[test]
    fn given_unknown_mount_when_rendering_then_errors_without_touching_document() {
        let mut f = fixture();
        f.doc.remove_element(f.mount).unwrap();
        let elements = f.doc.len();

        let result = f
            .renderer
            .render_all(&mut f.doc, f.mount, &f.model, &mut f.view, &mut f.binder);

        assert!(result.is_err());
        assert_eq!(f.doc.len(), elements);
    }

    #[test]
    fn given_leaf_parent_when_inserting_child_then_parent_becomes_branch() {
        // Arrange
        let mut f = fixture();
        let parent = f.model.insert(&NodeDescription::new("p"), None).unwrap();
        f.renderer
            .render_all(&mut f.doc, f.mount, &f.model, &mut f.view, &mut f.binder)
            .unwrap();
        let parent_element = f.view.get(parent).unwrap().element;
        assert!(f.doc.has_class(parent_element, "glyphtree-leaf"));

        // Act
        let child = f.model.insert(&NodeDescription::new("c"), Some(parent)).unwrap();
        f.renderer
            .insert_node(&mut f.doc, f.mount, &f.model, child, &mut f.view, &mut f.binder)
            .unwrap();

        // Assert
        let parent_view = f.view.get(parent).unwrap();
        assert!(!f.doc.has_class(parent_element, "glyphtree-leaf"));
        let wrapper = parent_view.children.unwrap();
        assert_eq!(f.doc.children(wrapper), vec![f.view.get(child).unwrap().element]);
        assert_eq!(f.doc.text(parent_view.icon), Some("▸"));
    }

    #[test]
    fn given_last_child_when_removing_then_parent_drops_wrapper_and_becomes_leaf() {
        let mut f = fixture();
        let parent = f.model.insert(&NodeDescription::new("p"), None).unwrap();
        let child = f.model.insert(&NodeDescription::new("c"), Some(parent)).unwrap();
        f.renderer
            .render_all(&mut f.doc, f.mount, &f.model, &mut f.view, &mut f.binder)
            .unwrap();
        let wrapper = f.view.get(parent).unwrap().children.unwrap();

        let removal = f.model.remove(child).unwrap();
        f.renderer
            .remove_node(&mut f.doc, &f.model, &removal, &mut f.view, &mut f.binder)
            .unwrap();

        let parent_view = f.view.get(parent).unwrap();
        assert!(!f.doc.contains(wrapper));
        assert_eq!(parent_view.children, None);
        assert!(f.doc.has_class(parent_view.element, "glyphtree-leaf"));
        assert_eq!(f.binder.len(), 2);
        assert_eq!(f.doc.count_class("glyphtree-tree"), 1);
    }

    #[test]
    fn given_changed_attributes_when_relabeling_then_drops_stale_data_attributes() {
        let mut f = fixture();
        let key = f
            .model
            .insert(&NodeDescription::new("old").with_attribute("a", 1).with_attribute("b", true), None)
            .unwrap();
        f.renderer
            .render_all(&mut f.doc, f.mount, &f.model, &mut f.view, &mut f.binder)
            .unwrap();
        let element = f.view.get(key).unwrap().element;
        assert_eq!(f.doc.attribute(element, "data-a"), Some("1"));

        let mut attributes = Attributes::new();
        attributes.insert("b".into(), "x".into());
        let previous = f.model.update(key, Some("new"), attributes).unwrap();
        f.renderer
            .relabel_node(&mut f.doc, &f.model, key, &previous, &f.view)
            .unwrap();

        assert_eq!(f.doc.text(f.view.get(key).unwrap().label), Some("new"));
        assert_eq!(f.doc.attribute(element, "data-a"), None);
        assert_eq!(f.doc.attribute(element, "data-b"), Some("x"));
    }

    #[test]
    fn given_very_deep_chain_when_rendering_all_then_nests_every_level() {
        // Arrange
        const LEVELS: usize = 5_000;
        let mut f = fixture();
        let mut parent = f.model.insert(&NodeDescription::new("0"), None).unwrap();
        let top = parent;
        for level in 1..LEVELS {
            parent = f
                .model
                .insert(&NodeDescription::new(level.to_string()), Some(parent))
                .unwrap();
        }

        // Act
        f.renderer
            .render_all(&mut f.doc, f.mount, &f.model, &mut f.view, &mut f.binder)
            .unwrap();

        // Assert
        assert_eq!(f.view.len(), LEVELS);
        assert_eq!(f.doc.count_class("glyphtree-node"), LEVELS);
        assert_eq!(f.doc.count_class("glyphtree-leaf"), 1);
        let deepest = f.view.get(parent).unwrap().element;
        let mut ancestor = f.doc.parent(deepest);
        let mut node_ancestors = 0;
        while let Some(element) = ancestor {
            if f.doc.has_class(element, "glyphtree-node") {
                node_ancestors += 1;
            }
            ancestor = f.doc.parent(element);
        }
        assert_eq!(node_ancestors, LEVELS - 1);
        assert!(f.view.get(top).unwrap().children.is_some());
    }
}
