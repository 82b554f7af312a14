//! Interaction binding
//!
//! Labels get listeners when they are created. Incoming host events are
//! resolved to the bound node and mapped to an action through a fixed
//! dispatch table.

use std::collections::HashMap;

use tracing::trace;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::NodeKey;
use crate::infrastructure::{Document, ElementId, EventKind, HostEvent, InfraResult, Interaction, Key};

/// State transition an interaction requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToggleExpansion,
}

/// Interaction pattern in the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    PointerActivate,
    Key(Key),
}

impl Trigger {
    fn matches(&self, interaction: &Interaction) -> bool {
        match (self, interaction) {
            (Trigger::PointerActivate, Interaction::PointerActivate) => true,
            (Trigger::Key(expected), Interaction::KeyPress(key)) => *expected == key.normalized(),
            _ => false,
        }
    }
}

/// Pointer activation, Enter and Space all toggle expansion.
pub const DISPATCH_TABLE: &[(Trigger, Action)] = &[
    (Trigger::PointerActivate, Action::ToggleExpansion),
    (Trigger::Key(Key::Enter), Action::ToggleExpansion),
    (Trigger::Key(Key::Space), Action::ToggleExpansion),
];

/// Event kinds every interactive label listens for.
pub const BOUND_EVENTS: [EventKind; 2] = [EventKind::PointerActivate, EventKind::KeyPress];

/// Look up the action for an interaction, if any.
pub fn action_for(interaction: &Interaction) -> Option<Action> {
    DISPATCH_TABLE
        .iter()
        .find(|(trigger, _)| trigger.matches(interaction))
        .map(|&(_, action)| action)
}

/// Table of interactive elements and the nodes they belong to.
#[derive(Debug, Default)]
pub struct EventBinder {
    bindings: HashMap<ElementId, NodeKey>,
    /// Classes marking elements this binder is responsible for
    owned_classes: Vec<String>,
}

impl EventBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binder that reports unbound listeners on elements carrying one of
    /// `classes` as [`ApplicationError::InvalidCallback`].
    pub fn with_owned_classes<S: Into<String>>(classes: impl IntoIterator<Item = S>) -> Self {
        Self {
            bindings: HashMap::new(),
            owned_classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Register listeners on `element` and bind it to `node`.
    pub fn bind<D: Document>(
        &mut self,
        document: &mut D,
        element: ElementId,
        node: NodeKey,
    ) -> InfraResult<()> {
        for kind in BOUND_EVENTS {
            document.listen(element, kind)?;
        }
        self.bindings.insert(element, node);
        Ok(())
    }

    /// Forget the binding of an element that left the document.
    pub fn unbind(&mut self, element: ElementId) -> Option<NodeKey> {
        self.bindings.remove(&element)
    }

    /// Drop every binding; owned classes are kept.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn bound(&self, element: ElementId) -> Option<NodeKey> {
        self.bindings.get(&element).copied()
    }

    /// Find the element handling `event` and the node bound to it.
    ///
    /// Walks from the target up through its ancestors to the first bound
    /// element listening for the event's kind. Listeners on foreign elements
    /// are passed over. Returns `Ok(None)` when no bound element is reached.
    pub fn resolve<D: Document>(
        &self,
        document: &D,
        event: &HostEvent,
    ) -> ApplicationResult<Option<(ElementId, NodeKey)>> {
        let kind = event.interaction.kind();
        let mut current = Some(event.target);
        while let Some(element) = current {
            if document.has_listener(element, kind) {
                if let Some(node) = self.bound(element) {
                    trace!("resolve: {kind:?} handled by {element}");
                    return Ok(Some((element, node)));
                }
                if self.owns(document, element) {
                    return Err(ApplicationError::InvalidCallback { element });
                }
                trace!("resolve: skipping foreign listener on {element}");
            }
            current = document.parent(element);
        }
        Ok(None)
    }

    fn owns<D: Document>(&self, document: &D, element: ElementId) -> bool {
        self.owned_classes
            .iter()
            .any(|class| document.has_class(element, class))
    }
}
