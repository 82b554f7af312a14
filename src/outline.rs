//! Text outlines for debugging and snapshot-style assertions
//!
//! Both the model and a rendered element subtree can be turned into a
//! `termtree::Tree<String>` and printed.

use termtree::Tree;
use tracing::instrument;

use crate::domain::{Node, NodeKey, TreeModel};
use crate::infrastructure::{Document, ElementId, MemoryDocument};

pub trait Outline {
    fn outline(&self) -> Tree<String>;
}

fn node_label(node: &Node) -> String {
    match node.id() {
        Some(id) => format!("{} [{}]", node.name(), id),
        None => node.name().to_string(),
    }
}

impl Outline for TreeModel {
    /// One line per node under a `.` root, ids in brackets.
    #[instrument(level = "trace", skip(self))]
    fn outline(&self) -> Tree<String> {
        fn build_tree(model: &TreeModel, key: NodeKey, parent_tree: &mut Tree<String>) {
            if let Some(node) = model.get(key) {
                let mut tree = Tree::new(node_label(node));
                for child in node.children() {
                    build_tree(model, child, &mut tree);
                }
                parent_tree.push(tree);
            }
        }

        let mut tree = Tree::new(".".to_string());
        for root in self.roots() {
            build_tree(self, root, &mut tree);
        }
        tree
    }
}

/// Outline of the elements below `root` in a [`MemoryDocument`].
pub struct ElementOutline<'a> {
    document: &'a MemoryDocument,
    root: ElementId,
}

impl<'a> ElementOutline<'a> {
    pub fn new(document: &'a MemoryDocument, root: ElementId) -> Self {
        Self { document, root }
    }

    fn label(&self, element: ElementId) -> String {
        let mut label = self.document.tag(element).unwrap_or("?").to_string();
        for class in self.document.classes(element) {
            label.push('.');
            label.push_str(class);
        }
        if let Some(text) = self.document.text(element).filter(|t| !t.is_empty()) {
            label.push_str(&format!(" {text:?}"));
        }
        label
    }

    fn build_tree(&self, element: ElementId) -> Tree<String> {
        let leaves: Vec<_> = self
            .document
            .children(element)
            .into_iter()
            .map(|child| self.build_tree(child))
            .collect();
        Tree::new(self.label(element)).with_leaves(leaves)
    }
}

impl Outline for ElementOutline<'_> {
    /// `tag.class.class "text"` per element.
    fn outline(&self) -> Tree<String> {
        self.build_tree(self.root)
    }
}
