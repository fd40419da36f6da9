//! Arena storage for heap nodes
//!
//! Nodes live in a [`SlotMap`] and refer to each other through [`NodeKey`]s
//! instead of pointers. Parent, child and sibling links are plain keys, so the
//! cyclic sibling rings and parent back-references create no ownership
//! cycles: the arena is the only owner, and dropping it frees every node
//! exactly once.
//!
//! Keys are generational. A key whose node has been removed no longer
//! resolves, even after its slot is reused, which is what lets the heap
//! reject stale handles instead of touching a different element.

use slotmap::{new_key_type, SlotMap};
use std::ops::{Index, IndexMut};

new_key_type! {
    /// Generational key of a node in a [`NodeArena`]
    pub struct NodeKey;
}

/// Slotmap-backed owner of all nodes of one heap
///
/// [`get`](Self::get) and [`get_mut`](Self::get_mut) are for keys that come
/// from outside (handles) and may be stale. Indexing is for keys read from
/// the node graph itself, which must always resolve; a dangling link is a
/// structural bug and panics.
#[derive(Debug, Clone)]
pub struct NodeArena<N> {
    nodes: SlotMap<NodeKey, N>,
}

impl<N> Default for NodeArena<N> {
    fn default() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }
}

impl<N> NodeArena<N> {
    /// Creates an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node built from its own key, so it can link to itself
    pub fn insert_with_key(&mut self, build: impl FnOnce(NodeKey) -> N) -> NodeKey {
        self.nodes.insert_with_key(build)
    }

    /// Removes a node, returning it if the key was live
    pub fn remove(&mut self, key: NodeKey) -> Option<N> {
        self.nodes.remove(key)
    }

    /// Gets a node by a possibly stale key
    pub fn get(&self, key: NodeKey) -> Option<&N> {
        self.nodes.get(key)
    }

    /// Gets a node mutably by a possibly stale key
    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut N> {
        self.nodes.get_mut(key)
    }

    /// Returns true if the key refers to a live node
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no node is stored
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drops every node
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

impl<N> Index<NodeKey> for NodeArena<N> {
    type Output = N;

    #[inline]
    fn index(&self, key: NodeKey) -> &N {
        match self.nodes.get(key) {
            Some(node) => node,
            None => dangling(key),
        }
    }
}

impl<N> IndexMut<NodeKey> for NodeArena<N> {
    #[inline]
    fn index_mut(&mut self, key: NodeKey) -> &mut N {
        match self.nodes.get_mut(key) {
            Some(node) => node,
            None => dangling(key),
        }
    }
}

#[cold]
#[inline(never)]
fn dangling(key: NodeKey) -> ! {
    panic!("invariant violation: node link {key:?} refers to a freed slot")
}
