//! Public tree API
//!
//! A `Tree` owns its model, its rendered view and the binding table, and
//! keeps all three in sync with the host document on every operation.

use tracing::{debug, instrument, warn};

use crate::application::binder::{action_for, Action, EventBinder};
use crate::application::render::{NodeView, Renderer, View};
use crate::application::ApplicationResult;
use crate::config::{RawOptions, TreeOptions};
use crate::domain::{DomainError, Node, NodeDescription, NodeId, NodeKey, PreOrder, Structure, TreeModel};
use crate::infrastructure::{Document, ElementId, HostEvent};

/// Outcome of a dispatched host event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Not aimed at a tree node, or not an interaction the tree reacts to
    Ignored,
    /// Interaction on a leaf: nothing changes
    LeafNoop(NodeKey),
    Toggled { node: NodeKey, expanded: bool },
}

/// Expandable tree widget rendered into a mount element of a host document.
#[derive(Debug)]
pub struct Tree<D: Document> {
    document: D,
    mount: ElementId,
    options: TreeOptions,
    model: TreeModel,
    renderer: Renderer,
    view: View,
    binder: EventBinder,
}

impl<D: Document> Tree<D> {
    /// Construct with the process-wide defaults in effect right now.
    pub fn new(document: D, mount: ElementId) -> ApplicationResult<Self> {
        Self::with_options(document, mount, RawOptions::default())
    }

    /// Construct with `overrides` on top of the process-wide defaults.
    ///
    /// The resolved options are copied; later changes to the defaults do not
    /// reach this instance. The empty forest wrapper is rendered right away.
    pub fn with_options(
        document: D,
        mount: ElementId,
        overrides: RawOptions,
    ) -> ApplicationResult<Self> {
        let options = TreeOptions::resolve(&overrides);
        debug!("Tree::with_options: mount={mount}, options={options:?}");
        let renderer = Renderer::new(&options);
        let classes = renderer.classes();
        let binder = EventBinder::with_owned_classes([&classes.node, &classes.label]);
        let mut tree = Self {
            document,
            mount,
            renderer,
            options,
            model: TreeModel::new(),
            view: View::default(),
            binder,
        };
        tree.render()?;
        Ok(tree)
    }

    /// Replace the whole tree with `structure` and rebuild the rendering.
    ///
    /// Malformed descriptions fail before anything changes.
    #[instrument(level = "debug", skip(self, structure))]
    pub fn load(&mut self, structure: impl Into<Structure>) -> ApplicationResult<Vec<NodeKey>> {
        let structure = structure.into();
        let roots = self.model.build(&structure)?;
        self.render()?;
        debug!("load: {} top-level, {} total", roots.len(), self.model.len());
        Ok(roots)
    }

    /// Append one node at top level.
    pub fn add(&mut self, description: NodeDescription) -> ApplicationResult<NodeKey> {
        self.insert(description, None)
    }

    /// Append one node under the node with `parent_id`.
    ///
    /// Falls back to top level when `parent_id` is unknown.
    pub fn add_to(
        &mut self,
        description: NodeDescription,
        parent_id: impl Into<NodeId>,
    ) -> ApplicationResult<NodeKey> {
        self.insert(description, Some(parent_id.into()))
    }

    fn insert(
        &mut self,
        description: NodeDescription,
        parent_id: Option<NodeId>,
    ) -> ApplicationResult<NodeKey> {
        let parent = match &parent_id {
            Some(id) => {
                let found = self.model.find(id);
                if found.is_none() {
                    warn!("add: parent id {id} not found, appending at top level");
                }
                found
            }
            None => None,
        };

        let key = self.model.insert(&description, parent)?;
        self.renderer.insert_node(
            &mut self.document,
            self.mount,
            &self.model,
            key,
            &mut self.view,
            &mut self.binder,
        )?;
        debug!("add: {key} ({:?}) under {parent:?}", description.name);
        Ok(key)
    }

    /// Remove the node with `id` and its subtree. Returns false for an
    /// unknown id.
    pub fn remove(&mut self, id: impl Into<NodeId>) -> ApplicationResult<bool> {
        let id = id.into();
        let key = match self.model.require(&id) {
            Ok(key) => key,
            Err(DomainError::NotFound(_)) => {
                debug!("remove: {id} not found, ignoring");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let Some(removal) = self.model.remove(key) else {
            return Ok(false);
        };
        self.renderer.remove_node(
            &mut self.document,
            &self.model,
            &removal,
            &mut self.view,
            &mut self.binder,
        )?;
        debug!("remove: {id}, {} nodes dropped", removal.keys.len());
        Ok(true)
    }

    /// Overwrite name and attributes of the node named by `description.id`.
    ///
    /// Children and id stay as they are. Returns false when the description
    /// has no id or the id is unknown.
    pub fn update(&mut self, description: &NodeDescription) -> ApplicationResult<bool> {
        let Some(id) = &description.id else {
            debug!("update: description without id, ignoring");
            return Ok(false);
        };
        let key = match self.model.require(id) {
            Ok(key) => key,
            Err(DomainError::NotFound(_)) => {
                debug!("update: {id} not found, ignoring");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let Some(previous) = self.model.update(
            key,
            description.name.as_deref(),
            description.attributes.clone(),
        ) else {
            return Ok(false);
        };
        self.renderer
            .relabel_node(&mut self.document, &self.model, key, &previous, &self.view)?;
        debug!("update: {id}");
        Ok(true)
    }

    pub fn find(&self, id: impl Into<NodeId>) -> Option<&Node> {
        let id = id.into();
        self.model.find(&id).and_then(|key| self.model.get(key))
    }

    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.model.get(key)
    }

    /// Every node, pre-order across all top-level trees.
    pub fn nodes(&self) -> Vec<&Node> {
        self.model.iter().collect()
    }

    pub fn iter(&self) -> PreOrder<'_> {
        self.model.iter()
    }

    /// Call `visitor` once per node, pre-order.
    pub fn walk(&self, visitor: impl FnMut(&Node)) {
        self.model.walk(visitor)
    }

    pub fn len(&self) -> usize {
        self.model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }

    /// Expand every branch. Returns the number of nodes whose state changed.
    pub fn expand_all(&mut self) -> ApplicationResult<usize> {
        self.set_all_expanded(true)
    }

    /// Collapse every branch. Returns the number of nodes whose state changed.
    pub fn collapse_all(&mut self) -> ApplicationResult<usize> {
        self.set_all_expanded(false)
    }

    fn set_all_expanded(&mut self, expanded: bool) -> ApplicationResult<usize> {
        let mut changed = 0;
        for key in self.model.branches() {
            if self
                .model
                .set_expanded(key, expanded, self.options.start_expanded)
            {
                self.renderer
                    .apply_state(&mut self.document, &self.model, key, &self.view)?;
                changed += 1;
            }
        }
        debug!("set_all_expanded({expanded}): {changed} changed");
        Ok(changed)
    }

    /// Rebuild the whole rendering from the current model.
    pub fn render(&mut self) -> ApplicationResult<()> {
        self.renderer.render_all(
            &mut self.document,
            self.mount,
            &self.model,
            &mut self.view,
            &mut self.binder,
        )?;
        Ok(())
    }

    /// Handle a host event.
    ///
    /// The event bubbles from its target to the nearest element listening
    /// for its kind. If that element belongs to a tree node, the dispatch table
    /// decides what happens to the bound node.
    pub fn dispatch(&mut self, event: &HostEvent) -> ApplicationResult<Dispatch> {
        if !self.is_inside_mount(event.target) {
            return Ok(Dispatch::Ignored);
        }
        let Some((element, key)) = self.binder.resolve(&self.document, event)? else {
            return Ok(Dispatch::Ignored);
        };
        let outcome = match action_for(&event.interaction) {
            Some(Action::ToggleExpansion) => self.toggle(key)?,
            None => Dispatch::Ignored,
        };
        debug!("dispatch: {:?} on {element} -> {outcome:?}", event.interaction);
        Ok(outcome)
    }

    fn is_inside_mount(&self, element: ElementId) -> bool {
        let mut current = Some(element);
        while let Some(candidate) = current {
            if candidate == self.mount {
                return true;
            }
            current = self.document.parent(candidate);
        }
        false
    }

    fn toggle(&mut self, key: NodeKey) -> ApplicationResult<Dispatch> {
        let Some(node) = self.model.get(key) else {
            return Ok(Dispatch::Ignored);
        };
        if node.is_leaf() {
            return Ok(Dispatch::LeafNoop(key));
        }
        let expanded = !node.is_expanded(self.options.start_expanded);
        self.model
            .set_expanded(key, expanded, self.options.start_expanded);
        self.renderer
            .apply_state(&mut self.document, &self.model, key, &self.view)?;
        Ok(Dispatch::Toggled {
            node: key,
            expanded,
        })
    }

    /// Elements rendered for `key`.
    pub fn view(&self, key: NodeKey) -> Option<NodeView> {
        self.view.get(key)
    }

    /// Top-level wrapper element.
    pub fn forest(&self) -> Option<ElementId> {
        self.view.forest()
    }

    pub fn mount(&self) -> ElementId {
        self.mount
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    pub fn model(&self) -> &TreeModel {
        &self.model
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Direct access to the host document; the tree does not track changes
    /// made through it.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }
}
