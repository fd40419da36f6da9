//! Fibonacci Heap implementation
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) amortized insert and decrease
//! - O(log n) amortized extract_min
//!
//! The structure is a forest of heap-ordered trees. The roots are the children
//! of a synthetic meta-root, so the root list is an ordinary child list and
//! attaching/detaching a root uses the same code as any other node.
//!
//! Children of a node form a circular doubly linked ring; a node without
//! siblings links to itself. Every node records its rank (number of children)
//! and a mark that is set when it loses a child while not being a root.
//!
//! All nodes live in a [`NodeArena`] and link to each other by generational
//! [`NodeKey`]s. A [`FibonacciHandle`] wraps such a key, so using a handle
//! after its element was removed yields [`HeapError::InvalidHandle`] instead
//! of touching freed memory.
//!
//! # Operations
//!
//! - `insert` adds a singleton tree to the root list. Nothing is merged.
//! - `extract_min` promotes the minimum's children to roots, frees the
//!   minimum, then consolidates: roots are bucketed by rank and equal ranks
//!   are linked until all ranks are distinct.
//! - `decrease` lowers a priority. If heap order breaks, the node is cut to
//!   the root list and the cut cascades through marked ancestors.

use crate::audit::{self, InvariantViolation};
use crate::policy::{
    CutMode, GoldenRatioBound, HeapObserver, NoopObserver, Operation, RankBound, Relink, SqrtBound,
};
use crate::rank::{self, Rank};
use crate::storage::{NodeArena, NodeKey};
use crate::traits::{DecreaseKeyHeap, Handle, Heap, HeapError};
use smallvec::{smallvec, SmallVec};
use tracing::{debug, trace};

/// Handle to an element in a Fibonacci heap
///
/// Handles stay valid until their element is extracted or removed. Using a
/// handle after that is detected and reported as
/// [`HeapError::InvalidHandle`]. A handle is only meaningful for the heap that
/// returned it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FibonacciHandle {
    key: NodeKey,
}

impl Handle for FibonacciHandle {}

/// Owner of a child list: either the meta-root or a real node
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Parent {
    Meta,
    Node(NodeKey),
}

/// Entry point into a sibling ring plus its length
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ChildList {
    pub(crate) first: Option<NodeKey>,
    pub(crate) rank: Rank,
}

pub(crate) struct Node<T, P> {
    pub(crate) priority: P,
    pub(crate) payload: T,
    /// `None` only while the node is being moved between lists
    pub(crate) parent: Option<Parent>,
    pub(crate) children: ChildList,
    pub(crate) prev: NodeKey,
    pub(crate) next: NodeKey,
    pub(crate) marked: bool,
}

impl<T, P> Node<T, P> {
    fn new(key: NodeKey, priority: P, payload: T) -> Self {
        Node {
            priority,
            payload,
            parent: None,
            children: ChildList::default(),
            prev: key,
            next: key,
            marked: false,
        }
    }
}

/// Fibonacci Heap
///
/// `T` is the opaque payload, `P` the priority. `B` bounds ranks during
/// consolidation and `O` observes operations; see [`crate::policy`].
///
/// # Example
///
/// ```rust
/// use fibheap::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.insert(5, "item");
/// heap.insert(3, "other");
/// heap.decrease(&handle, 1).unwrap();
/// assert_eq!(heap.peek(), Some((&1, &"item")));
/// assert_eq!(heap.extract_min(), Ok(("item", 1)));
/// ```
pub struct FibonacciHeap<T, P: Ord, B = GoldenRatioBound, O = NoopObserver> {
    pub(crate) nodes: NodeArena<Node<T, P>>,
    pub(crate) meta: ChildList,
    /// Root with the smallest priority
    pub(crate) min: Option<NodeKey>,
    bound: B,
    observer: O,
    pub(crate) cut_mode: CutMode,
}

impl<T, P: Ord> FibonacciHeap<T, P> {
    /// Creates an empty heap with cascading cuts and the default strategies
    pub fn new() -> Self {
        Self::with_strategy(GoldenRatioBound, NoopObserver)
    }
}

impl<T, P: Ord> Default for FibonacciHeap<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P: Ord> FibonacciHeap<T, P, SqrtBound> {
    /// Creates an empty heap whose `decrease` cuts without marking
    ///
    /// For comparing amortized costs only. Without cascading cuts, trees can
    /// degenerate and extraction is no longer O(log n) amortized.
    pub fn naive() -> Self {
        debug!("creating naive-mode Fibonacci heap");
        Self::with_strategy(SqrtBound::default(), NoopObserver).with_cut_mode(CutMode::Naive)
    }
}

impl<T, P: Ord, B: RankBound, O: HeapObserver> FibonacciHeap<T, P, B, O> {
    /// Creates an empty heap with the given rank bound and observer
    pub fn with_strategy(bound: B, observer: O) -> Self {
        Self {
            nodes: NodeArena::new(),
            meta: ChildList::default(),
            min: None,
            bound,
            observer,
            cut_mode: CutMode::Cascading,
        }
    }

    /// Sets how `decrease` repairs heap order
    pub fn with_cut_mode(mut self, cut_mode: CutMode) -> Self {
        self.cut_mode = cut_mode;
        self
    }

    /// Current cut mode
    pub fn cut_mode(&self) -> CutMode {
        self.cut_mode
    }

    /// The rank bound strategy
    pub fn bound(&self) -> &B {
        &self.bound
    }

    /// The observer
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// The observer, mutably (e.g. to reset counters between phases)
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Returns true if the heap holds no element. O(1).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of elements. O(1).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of trees in the root list
    pub fn root_count(&self) -> usize {
        self.meta.rank
    }

    /// Returns the minimum priority and its payload without removing it. O(1).
    pub fn peek(&self) -> Option<(&P, &T)> {
        self.min.map(|key| {
            let node = &self.nodes[key];
            (&node.priority, &node.payload)
        })
    }

    /// Removes every element, invalidating all handles
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.meta = ChildList::default();
        self.min = None;
    }

    /// Inserts a new element as a singleton tree and returns its handle
    ///
    /// # Time Complexity
    /// O(1). No consolidation happens here.
    pub fn insert(&mut self, priority: P, payload: T) -> FibonacciHandle {
        self.observer.operation(Operation::Insert);
        let key = self
            .nodes
            .insert_with_key(|key| Node::new(key, priority, payload));
        self.add_child(Parent::Meta, key);
        self.offer_min(key);
        self.audit_if_enabled();
        FibonacciHandle { key }
    }

    /// Removes the element with the smallest priority
    ///
    /// Returns `(payload, priority)`.
    ///
    /// # Errors
    /// [`HeapError::Empty`] if the heap is empty.
    ///
    /// # Time Complexity
    /// O(log n) amortized.
    pub fn extract_min(&mut self) -> Result<(T, P), HeapError> {
        let min = self.min.ok_or(HeapError::Empty)?;
        self.observer.operation(Operation::ExtractMin);
        let extracted = self.pop_root(min);
        self.audit_if_enabled();
        Ok(extracted)
    }

    /// Lowers the priority of the element behind `handle`
    ///
    /// Setting an equal priority is accepted and changes nothing.
    ///
    /// # Errors
    /// - [`HeapError::InvalidHandle`] if the element is gone.
    /// - [`HeapError::PriorityIncreased`] if `new_priority` is larger than the
    ///   current priority. The element is left unchanged.
    ///
    /// # Time Complexity
    /// O(1) amortized.
    pub fn decrease(&mut self, handle: &FibonacciHandle, new_priority: P) -> Result<(), HeapError> {
        let key = handle.key;
        let node = self.nodes.get(key).ok_or(HeapError::InvalidHandle)?;
        if new_priority > node.priority {
            return Err(HeapError::PriorityIncreased);
        }
        self.observer.operation(Operation::Decrease);

        let node = &mut self.nodes[key];
        node.priority = new_priority;
        let owner = node.parent;
        match owner {
            Some(Parent::Node(parent)) => {
                if self.nodes[key].priority < self.nodes[parent].priority {
                    self.cut(key, parent);
                }
            }
            Some(Parent::Meta) => self.offer_min(key),
            None => audit::violation(InvariantViolation::Detached),
        }
        self.audit_if_enabled();
        Ok(())
    }

    /// Removes an arbitrary element and returns `(payload, priority)`
    ///
    /// The element is cut to the root list (cascading like a decrease to
    /// minus infinity would) and then extracted.
    ///
    /// # Errors
    /// [`HeapError::InvalidHandle`] if the element is already gone.
    ///
    /// # Time Complexity
    /// O(log n) amortized.
    pub fn remove(&mut self, handle: &FibonacciHandle) -> Result<(T, P), HeapError> {
        let key = handle.key;
        let parent = self.nodes.get(key).ok_or(HeapError::InvalidHandle)?.parent;
        self.observer.operation(Operation::Remove);
        if let Some(Parent::Node(parent)) = parent {
            self.cut(key, parent);
        }
        let removed = self.pop_root(key);
        self.audit_if_enabled();
        Ok(removed)
    }

    /// Returns true if `handle` still refers to an element of this heap
    pub fn contains(&self, handle: &FibonacciHandle) -> bool {
        self.nodes.contains(handle.key)
    }

    /// Current priority of an element
    pub fn priority(&self, handle: &FibonacciHandle) -> Result<&P, HeapError> {
        self.node(handle).map(|node| &node.priority)
    }

    /// Payload of an element
    pub fn payload(&self, handle: &FibonacciHandle) -> Result<&T, HeapError> {
        self.node(handle).map(|node| &node.payload)
    }

    /// Payload of an element, mutably. The priority cannot be changed this way.
    pub fn payload_mut(&mut self, handle: &FibonacciHandle) -> Result<&mut T, HeapError> {
        self.nodes
            .get_mut(handle.key)
            .map(|node| &mut node.payload)
            .ok_or(HeapError::InvalidHandle)
    }

    /// Number of children of an element
    pub fn rank(&self, handle: &FibonacciHandle) -> Result<Rank, HeapError> {
        self.node(handle).map(|node| node.children.rank)
    }

    /// Whether an element has lost a child since it last became a child
    pub fn is_marked(&self, handle: &FibonacciHandle) -> Result<bool, HeapError> {
        self.node(handle).map(|node| node.marked)
    }

    /// Whether an element is a root (a child of the meta-root)
    pub fn is_root(&self, handle: &FibonacciHandle) -> Result<bool, HeapError> {
        self.node(handle)
            .map(|node| node.parent == Some(Parent::Meta))
    }

    /// Parent of an element, `None` for roots
    pub fn parent(&self, handle: &FibonacciHandle) -> Result<Option<FibonacciHandle>, HeapError> {
        self.node(handle).map(|node| match node.parent {
            Some(Parent::Node(key)) => Some(FibonacciHandle { key }),
            _ => None,
        })
    }

    /// Children of an element in sibling-ring order
    pub fn children(&self, handle: &FibonacciHandle) -> Result<Vec<FibonacciHandle>, HeapError> {
        let node = self.node(handle)?;
        Ok(self.handles(&node.children))
    }

    /// Roots of all trees in root-list order
    pub fn roots(&self) -> Vec<FibonacciHandle> {
        self.handles(&self.meta)
    }

    fn node(&self, handle: &FibonacciHandle) -> Result<&Node<T, P>, HeapError> {
        self.nodes.get(handle.key).ok_or(HeapError::InvalidHandle)
    }

    fn handles(&self, list: &ChildList) -> Vec<FibonacciHandle> {
        self.siblings(list)
            .map(|key| FibonacciHandle { key })
            .collect()
    }

    fn list(&self, parent: Parent) -> &ChildList {
        match parent {
            Parent::Meta => &self.meta,
            Parent::Node(key) => &self.nodes[key].children,
        }
    }

    fn list_mut(&mut self, parent: Parent) -> &mut ChildList {
        match parent {
            Parent::Meta => &mut self.meta,
            Parent::Node(key) => &mut self.nodes[key].children,
        }
    }

    /// Links `a` and `b` as neighbours, `a` before `b`
    fn join(&mut self, a: NodeKey, b: NodeKey) {
        self.nodes[a].next = b;
        self.nodes[b].prev = a;
    }

    /// Appends a detached node to the child ring of `parent`
    fn add_child(&mut self, parent: Parent, key: NodeKey) {
        self.observer.relink(Relink::Attach);
        let node = &self.nodes[key];
        if node.parent.is_some() {
            audit::violation(InvariantViolation::AlreadyAttached);
        }
        if node.prev != key || node.next != key {
            audit::violation(InvariantViolation::SiblingLinks);
        }
        if let Parent::Node(parent_key) = parent {
            let parent_node = &self.nodes[parent_key];
            if parent_node.children.rank != node.children.rank {
                audit::violation(InvariantViolation::LinkRankMismatch {
                    parent: parent_node.children.rank,
                    child: node.children.rank,
                });
            }
            if parent_node.priority > node.priority {
                audit::violation(InvariantViolation::HeapOrder);
            }
        }

        let first = self.list(parent).first;
        match first {
            None => self.list_mut(parent).first = Some(key),
            Some(first) => {
                let last = self.nodes[first].prev;
                self.join(last, key);
                self.join(key, first);
            }
        }
        self.nodes[key].parent = Some(parent);
        let list = self.list_mut(parent);
        list.rank = rank::checked_increment(list.rank);
    }

    /// Unlinks a node from its parent's ring, leaving it a detached singleton
    fn detach(&mut self, key: NodeKey) -> Parent {
        self.observer.relink(Relink::Detach);
        let node = &self.nodes[key];
        let Some(parent) = node.parent else {
            audit::violation(InvariantViolation::Detached)
        };
        let (prev, next) = (node.prev, node.next);

        let list = self.list_mut(parent);
        list.rank = rank::checked_decrement(list.rank);
        if list.rank == 0 {
            list.first = None;
        } else if list.first == Some(key) {
            list.first = Some(next);
        }

        self.join(prev, next);
        self.join(key, key);
        self.nodes[key].parent = None;
        parent
    }

    /// Makes `key` the cached minimum if it beats the current one
    fn offer_min(&mut self, key: NodeKey) {
        let better = match self.min {
            None => true,
            Some(min) => self.nodes[key].priority < self.nodes[min].priority,
        };
        if better {
            self.min = Some(key);
        }
    }

    /// Moves a node (with its subtree) to the root list and clears its mark
    fn move_to_root(&mut self, key: NodeKey) {
        self.detach(key);
        self.nodes[key].marked = false;
        self.add_child(Parent::Meta, key);
        self.offer_min(key);
    }

    /// Cuts `key` from `parent`, then lets the cut mode handle the parent
    fn cut(&mut self, key: NodeKey, parent: NodeKey) {
        self.move_to_root(key);
        match self.cut_mode {
            CutMode::Cascading => self.cascading_cut(parent),
            CutMode::Naive => trace!("naive cut without marking"),
        }
    }

    /// Walks up from a node that just lost a child
    ///
    /// Marked non-roots are cut to the root list; the first unmarked
    /// non-root is marked and the walk stops. Roots stop the walk unmarked.
    fn cascading_cut(&mut self, start: NodeKey) {
        let mut current = start;
        let mut depth = 0usize;
        loop {
            let Some(Parent::Node(parent)) = self.nodes[current].parent else {
                break;
            };
            if !self.nodes[current].marked {
                self.nodes[current].marked = true;
                break;
            }
            self.move_to_root(current);
            depth += 1;
            current = parent;
        }
        trace!(depth, "cascading cut");
    }

    /// Frees a root, promotes its children and consolidates
    fn pop_root(&mut self, key: NodeKey) -> (T, P) {
        if self.nodes[key].parent != Some(Parent::Meta) {
            audit::violation(InvariantViolation::NotARoot);
        }

        loop {
            let Some(child) = self.nodes[key].children.first else {
                break;
            };
            self.detach(child);
            self.nodes[child].marked = false;
            self.add_child(Parent::Meta, child);
        }
        self.detach(key);
        let Some(node) = self.nodes.remove(key) else {
            audit::violation(InvariantViolation::DanglingKey)
        };
        self.min = None;
        self.consolidate();
        trace!(len = self.len(), roots = self.meta.rank, "extracted root");
        (node.payload, node.priority)
    }

    /// Links roots of equal rank until every root rank is distinct
    ///
    /// Roots are pulled off the root list one by one and dropped into a
    /// bucket per rank. On collision the two trees are linked and the result
    /// moves one bucket up. Survivors become the new root list and the cached
    /// minimum is recomputed from them.
    fn consolidate(&mut self) {
        let bound = self.bound.max_rank(self.len());
        let roots_before = self.meta.rank;
        let mut buckets: SmallVec<[Option<NodeKey>; 64]> = smallvec![None; bound];

        while let Some(first) = self.meta.first {
            self.detach(first);
            let mut tree = first;
            loop {
                let rank = self.nodes[tree].children.rank;
                if rank >= bound {
                    audit::violation(InvariantViolation::RankBoundExceeded { rank, bound });
                }
                match buckets[rank].take() {
                    Some(other) => tree = self.pair_trees(other, tree),
                    None => {
                        buckets[rank] = Some(tree);
                        break;
                    }
                }
            }
        }

        self.min = None;
        for tree in buckets.into_iter().flatten() {
            self.add_child(Parent::Meta, tree);
            self.offer_min(tree);
        }
        trace!(
            roots_before,
            roots_after = self.meta.rank,
            buckets = bound,
            "consolidated root list"
        );
    }

    /// Links two detached trees of equal rank and returns the new root
    ///
    /// The tree with the larger priority becomes a child; on a tie `first`
    /// stays on top.
    fn pair_trees(&mut self, first: NodeKey, second: NodeKey) -> NodeKey {
        let (parent, child) = if self.nodes[first].priority > self.nodes[second].priority {
            (second, first)
        } else {
            (first, second)
        };
        self.add_child(Parent::Node(parent), child);
        parent
    }

    #[inline]
    fn audit_if_enabled(&self) {
        #[cfg(feature = "audit-on-mutate")]
        if let Err(violation) = self.check_invariants() {
            audit::violation(violation);
        }
    }
}

impl<T, P: Ord, B, O> FibonacciHeap<T, P, B, O> {
    /// Iterates a sibling ring once, starting at `list.first`
    pub(crate) fn siblings(&self, list: &ChildList) -> Siblings<'_, T, P> {
        Siblings {
            nodes: &self.nodes,
            first: list.first,
            next: list.first,
        }
    }
}

/// Iterator over the keys of one sibling ring
pub(crate) struct Siblings<'a, T, P> {
    nodes: &'a NodeArena<Node<T, P>>,
    first: Option<NodeKey>,
    next: Option<NodeKey>,
}

impl<T, P> Iterator for Siblings<'_, T, P> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<NodeKey> {
        let current = self.next?;
        let following = self.nodes[current].next;
        self.next = if Some(following) == self.first {
            None
        } else {
            Some(following)
        };
        Some(current)
    }
}

impl<T, P: Ord, B: RankBound + Default, O: HeapObserver + Default> Heap<T, P>
    for FibonacciHeap<T, P, B, O>
{
    fn new() -> Self {
        Self::with_strategy(B::default(), O::default())
    }

    fn is_empty(&self) -> bool {
        FibonacciHeap::is_empty(self)
    }

    fn len(&self) -> usize {
        FibonacciHeap::len(self)
    }

    fn push(&mut self, priority: P, item: T) {
        self.insert(priority, item);
    }

    fn peek(&self) -> Option<(&P, &T)> {
        FibonacciHeap::peek(self)
    }

    fn pop(&mut self) -> Option<(P, T)> {
        self.extract_min()
            .ok()
            .map(|(payload, priority)| (priority, payload))
    }
}

impl<T, P: Ord, B: RankBound + Default, O: HeapObserver + Default> DecreaseKeyHeap<T, P>
    for FibonacciHeap<T, P, B, O>
{
    type Handle = FibonacciHandle;

    fn push_with_handle(&mut self, priority: P, item: T) -> FibonacciHandle {
        self.insert(priority, item)
    }

    fn decrease_key(&mut self, handle: &FibonacciHandle, new_priority: P) -> Result<(), HeapError> {
        self.decrease(handle, new_priority)
    }
}
