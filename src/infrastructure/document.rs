//! Host document boundary
//!
//! The tree never owns a rendering environment. It drives one through the
//! [`Document`] trait: element creation and removal, class-list and attribute
//! manipulation, and listener registration. Event delivery goes the other way:
//! the host hands a [`HostEvent`] to `Tree::dispatch`.

use std::fmt;

use crate::infrastructure::error::InfraResult;

/// Handle of an element in the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    slot: usize,
    generation: u64,
}

impl ElementId {
    pub fn from_raw_parts(slot: usize, generation: u64) -> Self {
        Self { slot, generation }
    }

    pub fn into_raw_parts(self) -> (usize, u64) {
        (self.slot, self.generation)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}.{}>", self.slot, self.generation)
    }
}

/// Listener categories an element can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    PointerActivate,
    KeyPress,
}

/// Simplified key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Space,
    Escape,
    Tab,
    Char(char),
}

impl Key {
    /// Fold character forms of named keys onto the named variant.
    pub fn normalized(self) -> Self {
        match self {
            Key::Char(' ') => Key::Space,
            Key::Char('\n') | Key::Char('\r') => Key::Enter,
            Key::Char('\t') => Key::Tab,
            other => other,
        }
    }
}

/// A raw interaction as the host reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    PointerActivate,
    KeyPress(Key),
}

impl Interaction {
    pub fn kind(&self) -> EventKind {
        match self {
            Interaction::PointerActivate => EventKind::PointerActivate,
            Interaction::KeyPress(_) => EventKind::KeyPress,
        }
    }
}

/// Interaction targeted at an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostEvent {
    pub target: ElementId,
    pub interaction: Interaction,
}

impl HostEvent {
    pub fn click(target: ElementId) -> Self {
        Self {
            target,
            interaction: Interaction::PointerActivate,
        }
    }

    pub fn key(target: ElementId, key: Key) -> Self {
        Self {
            target,
            interaction: Interaction::KeyPress(key),
        }
    }
}

/// Host document abstraction.
pub trait Document {
    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> ElementId;

    /// Append `child` as the last child of `parent`, detaching it first if
    /// it already has a parent.
    fn append_child(&mut self, parent: ElementId, child: ElementId) -> InfraResult<()>;

    /// Detach `element` and discard it with its subtree and their listeners.
    fn remove_element(&mut self, element: ElementId) -> InfraResult<()>;

    fn contains(&self, element: ElementId) -> bool;

    fn parent(&self, element: ElementId) -> Option<ElementId>;

    /// Children in document order; empty for unknown elements.
    fn children(&self, element: ElementId) -> Vec<ElementId>;

    fn set_text(&mut self, element: ElementId, text: &str) -> InfraResult<()>;

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) -> InfraResult<()>;

    fn remove_attribute(&mut self, element: ElementId, name: &str) -> InfraResult<()>;

    fn add_class(&mut self, element: ElementId, class: &str) -> InfraResult<()>;

    fn remove_class(&mut self, element: ElementId, class: &str) -> InfraResult<()>;

    fn has_class(&self, element: ElementId, class: &str) -> bool;

    /// Register interest in `kind` events on `element`.
    fn listen(&mut self, element: ElementId, kind: EventKind) -> InfraResult<()>;

    fn has_listener(&self, element: ElementId, kind: EventKind) -> bool;

    /// Add or remove `class` depending on `enabled`.
    fn set_class(&mut self, element: ElementId, class: &str, enabled: bool) -> InfraResult<()> {
        if enabled {
            self.add_class(element, class)
        } else {
            self.remove_class(element, class)
        }
    }

    /// Descendants of `root` (excluding `root`) carrying `class`, in document order.
    fn query_class(&self, root: ElementId, class: &str) -> Vec<ElementId> {
        let mut found = Vec::new();
        let mut stack: Vec<ElementId> = self.children(root).into_iter().rev().collect();
        while let Some(element) = stack.pop() {
            if self.has_class(element, class) {
                found.push(element);
            }
            stack.extend(self.children(element).into_iter().rev());
        }
        found
    }
}

impl<D: Document + ?Sized> Document for &mut D {
    fn create_element(&mut self, tag: &str) -> ElementId {
        (**self).create_element(tag)
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) -> InfraResult<()> {
        (**self).append_child(parent, child)
    }

    fn remove_element(&mut self, element: ElementId) -> InfraResult<()> {
        (**self).remove_element(element)
    }

    fn contains(&self, element: ElementId) -> bool {
        (**self).contains(element)
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        (**self).parent(element)
    }

    fn children(&self, element: ElementId) -> Vec<ElementId> {
        (**self).children(element)
    }

    fn set_text(&mut self, element: ElementId, text: &str) -> InfraResult<()> {
        (**self).set_text(element, text)
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) -> InfraResult<()> {
        (**self).set_attribute(element, name, value)
    }

    fn remove_attribute(&mut self, element: ElementId, name: &str) -> InfraResult<()> {
        (**self).remove_attribute(element, name)
    }

    fn add_class(&mut self, element: ElementId, class: &str) -> InfraResult<()> {
        (**self).add_class(element, class)
    }

    fn remove_class(&mut self, element: ElementId, class: &str) -> InfraResult<()> {
        (**self).remove_class(element, class)
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        (**self).has_class(element, class)
    }

    fn listen(&mut self, element: ElementId, kind: EventKind) -> InfraResult<()> {
        (**self).listen(element, kind)
    }

    fn has_listener(&self, element: ElementId, kind: EventKind) -> bool {
        (**self).has_listener(element, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_character_keys_when_normalizing_then_maps_to_named_keys() {
        assert_eq!(Key::Char(' ').normalized(), Key::Space);
        assert_eq!(Key::Char('\r').normalized(), Key::Enter);
        assert_eq!(Key::Char('x').normalized(), Key::Char('x'));
    }

    #[test]
    fn given_interactions_when_classifying_then_reports_listener_kind() {
        assert_eq!(Interaction::PointerActivate.kind(), EventKind::PointerActivate);
        assert_eq!(Interaction::KeyPress(Key::Enter).kind(), EventKind::KeyPress);
    }
}
