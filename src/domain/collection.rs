//! Ordered sibling collections

use std::slice;

use crate::domain::node::NodeKey;

/// Ordered sequence of sibling nodes.
///
/// Order is meaningful: it is the load/add order and the order siblings are
/// visited in a pre-order walk. Identity lookup across the whole tree goes
/// through the model's index, not through individual collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeCollection {
    keys: Vec<NodeKey>,
}

impl NodeCollection {
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<NodeKey> {
        self.keys.get(position).copied()
    }

    pub fn first(&self) -> Option<NodeKey> {
        self.keys.first().copied()
    }

    pub fn last(&self) -> Option<NodeKey> {
        self.keys.last().copied()
    }

    pub fn iter(&self) -> std::iter::Copied<slice::Iter<'_, NodeKey>> {
        self.keys.iter().copied()
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn position(&self, key: NodeKey) -> Option<usize> {
        self.keys.iter().position(|&k| k == key)
    }

    pub fn push(&mut self, key: NodeKey) {
        self.keys.push(key);
    }

    /// Remove `key`, returning the position it occupied.
    pub fn remove(&mut self, key: NodeKey) -> Option<usize> {
        let position = self.position(key)?;
        self.keys.remove(position);
        Some(position)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub(crate) fn as_slice(&self) -> &[NodeKey] {
        &self.keys
    }
}

impl<'a> IntoIterator for &'a NodeCollection {
    type Item = NodeKey;
    type IntoIter = std::iter::Copied<slice::Iter<'a, NodeKey>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use generational_arena::Arena;

    fn keys(n: usize) -> Vec<NodeKey> {
        let mut arena: Arena<()> = Arena::new();
        (0..n).map(|_| NodeKey(arena.insert(()))).collect()
    }

    #[test]
    fn given_member_when_removing_then_reports_position_and_keeps_order() {
        let k = keys(3);
        let mut collection = NodeCollection::new();
        for key in &k {
            collection.push(*key);
        }

        assert_eq!(collection.remove(k[1]), Some(1));
        assert_eq!(collection.iter().collect::<Vec<_>>(), vec![k[0], k[2]]);
        assert_eq!(collection.remove(k[1]), None);
    }
}
