//! In-memory host document
//!
//! A minimal element tree for headless hosts and tests. Element handles stay
//! unique for the document's lifetime, so handles of removed elements never
//! resolve to a newer element.

use std::collections::{BTreeMap, BTreeSet};

use generational_arena::{Arena, Index};

use crate::infrastructure::document::{Document, ElementId, EventKind};
use crate::infrastructure::error::{InfraError, InfraResult};

#[derive(Debug)]
struct ElementData {
    tag: String,
    parent: Option<Index>,
    children: Vec<Index>,
    /// Insertion-ordered, no duplicates
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    listeners: BTreeSet<EventKind>,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            parent: None,
            children: Vec::new(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: None,
            listeners: BTreeSet::new(),
        }
    }
}

fn to_id(index: Index) -> ElementId {
    let (slot, generation) = index.into_raw_parts();
    ElementId::from_raw_parts(slot, generation)
}

fn to_index(element: ElementId) -> Index {
    let (slot, generation) = element.into_raw_parts();
    Index::from_raw_parts(slot, generation)
}

/// Arena-backed element tree rooted at a `body` element.
#[derive(Debug)]
pub struct MemoryDocument {
    arena: Arena<ElementData>,
    body: Index,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let body = arena.insert(ElementData::new("body"));
        Self { arena, body }
    }

    pub fn body(&self) -> ElementId {
        to_id(self.body)
    }

    /// Create an element and append it to `body`, ready to mount a tree on.
    pub fn create_mount(&mut self, tag: &str) -> ElementId {
        let element = self.arena.insert(ElementData::new(tag));
        self.link(self.body, element);
        to_id(element)
    }

    /// Number of live elements, `body` included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn tag(&self, element: ElementId) -> Option<&str> {
        self.data(element).map(|d| d.tag.as_str())
    }

    pub fn text(&self, element: ElementId) -> Option<&str> {
        self.data(element).and_then(|d| d.text.as_deref())
    }

    pub fn attribute(&self, element: ElementId, name: &str) -> Option<&str> {
        self.data(element)
            .and_then(|d| d.attributes.get(name))
            .map(String::as_str)
    }

    pub fn attributes(&self, element: ElementId) -> Option<&BTreeMap<String, String>> {
        self.data(element).map(|d| &d.attributes)
    }

    pub fn classes(&self, element: ElementId) -> &[String] {
        self.data(element).map(|d| d.classes.as_slice()).unwrap_or(&[])
    }

    /// Elements under `body` carrying `class`, like a document-wide class query.
    pub fn count_class(&self, class: &str) -> usize {
        self.query_class(self.body(), class).len()
    }

    /// Children of `element` that carry `class`.
    pub fn children_with_class(&self, element: ElementId, class: &str) -> Vec<ElementId> {
        self.children(element)
            .into_iter()
            .filter(|&child| self.has_class(child, class))
            .collect()
    }

    /// Number of elements anywhere in the document listening for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.arena
            .iter()
            .filter(|(_, data)| data.listeners.contains(&kind))
            .count()
    }

    fn data(&self, element: ElementId) -> Option<&ElementData> {
        self.arena.get(to_index(element))
    }

    fn data_mut(&mut self, element: ElementId) -> InfraResult<&mut ElementData> {
        self.arena
            .get_mut(to_index(element))
            .ok_or(InfraError::UnknownElement(element))
    }

    fn link(&mut self, parent: Index, child: Index) {
        if let Some(data) = self.arena.get_mut(child) {
            data.parent = Some(parent);
        }
        if let Some(data) = self.arena.get_mut(parent) {
            data.children.push(child);
        }
    }

    fn unlink(&mut self, child: Index) {
        let parent = self.arena.get_mut(child).and_then(|d| d.parent.take());
        if let Some(parent) = parent.and_then(|p| self.arena.get_mut(p)) {
            parent.children.retain(|&c| c != child);
        }
    }

    fn is_ancestor_or_self(&self, candidate: Index, mut of: Index) -> bool {
        loop {
            if candidate == of {
                return true;
            }
            match self.arena.get(of).and_then(|d| d.parent) {
                Some(parent) => of = parent,
                None => return false,
            }
        }
    }
}

impl Document for MemoryDocument {
    fn create_element(&mut self, tag: &str) -> ElementId {
        to_id(self.arena.insert(ElementData::new(tag)))
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) -> InfraResult<()> {
        let (p, c) = (to_index(parent), to_index(child));
        if !self.arena.contains(p) {
            return Err(InfraError::UnknownElement(parent));
        }
        if !self.arena.contains(c) {
            return Err(InfraError::UnknownElement(child));
        }
        if self.is_ancestor_or_self(c, p) {
            return Err(InfraError::HierarchyRequest { parent, child });
        }
        self.unlink(c);
        self.link(p, c);
        Ok(())
    }

    fn remove_element(&mut self, element: ElementId) -> InfraResult<()> {
        let root = to_index(element);
        if !self.arena.contains(root) {
            return Err(InfraError::UnknownElement(element));
        }
        self.unlink(root);

        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            if let Some(data) = self.arena.remove(index) {
                stack.extend(data.children);
            }
        }
        Ok(())
    }

    fn contains(&self, element: ElementId) -> bool {
        self.arena.contains(to_index(element))
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.data(element).and_then(|d| d.parent).map(to_id)
    }

    fn children(&self, element: ElementId) -> Vec<ElementId> {
        self.data(element)
            .map(|d| d.children.iter().copied().map(to_id).collect())
            .unwrap_or_default()
    }

    fn set_text(&mut self, element: ElementId, text: &str) -> InfraResult<()> {
        self.data_mut(element)?.text = Some(text.to_string());
        Ok(())
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) -> InfraResult<()> {
        self.data_mut(element)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_attribute(&mut self, element: ElementId, name: &str) -> InfraResult<()> {
        self.data_mut(element)?.attributes.remove(name);
        Ok(())
    }

    fn add_class(&mut self, element: ElementId, class: &str) -> InfraResult<()> {
        let data = self.data_mut(element)?;
        if !data.classes.iter().any(|c| c == class) {
            data.classes.push(class.to_string());
        }
        Ok(())
    }

    fn remove_class(&mut self, element: ElementId, class: &str) -> InfraResult<()> {
        self.data_mut(element)?.classes.retain(|c| c != class);
        Ok(())
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.data(element)
            .map(|d| d.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    fn listen(&mut self, element: ElementId, kind: EventKind) -> InfraResult<()> {
        self.data_mut(element)?.listeners.insert(kind);
        Ok(())
    }

    fn has_listener(&self, element: ElementId, kind: EventKind) -> bool {
        self.data(element)
            .map(|d| d.listeners.contains(&kind))
            .unwrap_or(false)
    }
}
