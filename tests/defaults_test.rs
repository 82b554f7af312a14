//! Process-wide default options.
//!
//! Kept in its own test binary as a single test: the defaults are global and
//! other tests must not observe intermediate states.

use glyphtree::application::Tree;
use glyphtree::config::{self, RawOptions, TreeOptions};
use glyphtree::domain::NodeDescription;
use glyphtree::infrastructure::MemoryDocument;

fn new_tree(overrides: RawOptions) -> Tree<MemoryDocument> {
    let mut doc = MemoryDocument::new();
    let mount = doc.create_mount("div");
    Tree::with_options(doc, mount, overrides).unwrap()
}

#[test]
fn given_changed_defaults_when_constructing_then_only_new_trees_follow() {
    // Arrange
    config::reset_defaults();
    let mut before = new_tree(RawOptions::new());

    // Act
    config::update_defaults(|o| {
        o.class_prefix = "global-".into();
        o.start_expanded = true;
    });
    let mut after = new_tree(RawOptions::new());
    let mut overridden = new_tree(RawOptions::new().class_prefix("own-"));

    // Assert: existing instance keeps its copy
    assert_eq!(before.options().class_prefix, "glyphtree-");
    before.load(NodeDescription::new("a")).unwrap();
    assert_eq!(before.document().count_class("glyphtree-node"), 1);
    assert_eq!(before.document().count_class("global-node"), 0);

    // New instance picks up the changed defaults
    assert_eq!(after.options().class_prefix, "global-");
    assert!(after.options().start_expanded);
    after
        .load(NodeDescription::new("a").with_child(NodeDescription::new("b")))
        .unwrap();
    assert_eq!(after.document().count_class("global-expanded"), 1);

    // Per-instance override beats the defaults field by field
    assert_eq!(overridden.options().class_prefix, "own-");
    assert!(overridden.options().start_expanded);
    overridden.load(NodeDescription::new("a")).unwrap();
    assert_eq!(overridden.document().count_class("own-node"), 1);

    // Reset restores the compiled defaults
    config::reset_defaults();
    assert_eq!(config::defaults(), TreeOptions::default());
    config::set_defaults(TreeOptions {
        class_prefix: "set-".into(),
        ..TreeOptions::default()
    });
    assert_eq!(new_tree(RawOptions::new()).options().class_prefix, "set-");
    config::reset_defaults();
}
