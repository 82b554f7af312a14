//! Tree driven through a borrowed host document, plus rendered outlines.

use glyphtree::application::{Dispatch, Tree};
use glyphtree::domain::NodeDescription;
use glyphtree::infrastructure::{Document, HostEvent, MemoryDocument};
use glyphtree::outline::{ElementOutline, Outline};

#[test]
fn given_borrowed_document_when_tree_dropped_then_rendering_stays() {
    // Arrange
    let mut doc = MemoryDocument::new();
    let mount = doc.create_mount("div");

    // Act
    {
        let mut tree = Tree::new(&mut doc, mount).unwrap();
        tree.load(NodeDescription::new("kept").with_id("kept")).unwrap();
    }

    // Assert
    assert_eq!(doc.count_class("glyphtree-node"), 1);
    assert_eq!(doc.children(mount).len(), 1);
}

#[test]
fn given_two_trees_in_one_document_when_interacting_then_each_keeps_its_nodes() {
    let mut doc = MemoryDocument::new();
    let left = doc.create_mount("div");
    let right = doc.create_mount("div");

    let mut first = Tree::new(&mut doc, left).unwrap();
    let key = first
        .add(NodeDescription::new("p").with_id("p"))
        .unwrap();
    first.add_to(NodeDescription::new("c"), "p").unwrap();
    let label = first.view(key).unwrap().label;
    let outcome = first.dispatch(&HostEvent::click(label)).unwrap();
    assert_eq!(outcome, Dispatch::Toggled { node: key, expanded: true });
    drop(first);

    let mut second = Tree::new(&mut doc, right).unwrap();
    second.add(NodeDescription::new("q")).unwrap();
    drop(second);

    assert_eq!(doc.query_class(left, "glyphtree-node").len(), 2);
    assert_eq!(doc.query_class(right, "glyphtree-node").len(), 1);
    assert_eq!(doc.count_class("glyphtree-expanded"), 1);
}

#[test]
fn given_rendered_tree_when_outlining_then_shows_element_shape() {
    let mut doc = MemoryDocument::new();
    let mount = doc.create_mount("div");
    let mut tree = Tree::new(&mut doc, mount).unwrap();
    tree.load(
        NodeDescription::new("root")
            .with_id("r")
            .with_child(NodeDescription::new("leaf")),
    )
    .unwrap();

    let model = tree.model().outline().to_string();
    let elements = ElementOutline::new(tree.document(), mount).outline().to_string();

    assert_eq!(model.lines().collect::<Vec<_>>(), vec![".", "└── root [r]", "    └── leaf"]);
    assert_eq!(
        elements.lines().collect::<Vec<_>>(),
        vec![
            "div",
            "└── ul.glyphtree-tree",
            "    └── li.glyphtree-node",
            "        ├── span.glyphtree-icon \"▸\"",
            "        ├── span.glyphtree-label \"root\"",
            "        └── ul.glyphtree-tree",
            "            └── li.glyphtree-node.glyphtree-leaf",
            "                ├── span.glyphtree-icon \"•\"",
            "                └── span.glyphtree-label \"leaf\"",
        ]
    );
}
