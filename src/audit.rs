//! Structural invariants and auditing
//!
//! [`InvariantViolation`] names every way the node graph can be broken. The
//! heap checks the cheap ones while it relinks nodes and panics through
//! [`violation`] when one fails; those panics always indicate a bug in the
//! heap, never a caller error.
//!
//! [`FibonacciHeap::check_invariants`] walks the whole forest from the
//! meta-root and verifies everything at once. Tests call it after every
//! mutation; with the `audit-on-mutate` feature the heap calls it itself.

use crate::fibonacci::{ChildList, FibonacciHeap, Parent};
use crate::policy::CutMode;
use crate::rank::Rank;
use crate::storage::NodeKey;
use std::fmt::{self, Write};

/// A broken structural invariant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A node expected to have a parent has none
    Detached,
    /// A node about to be attached still has a parent
    AlreadyAttached,
    /// Extraction was attempted on a node that is not a root
    NotARoot,
    /// A link points to a freed slot
    DanglingKey,
    /// `next.prev` or `prev.next` does not lead back, or a ring never closes
    SiblingLinks,
    /// A child does not point back to the node whose ring it is in
    ParentLink,
    /// A recorded rank differs from the number of children in the ring
    RankMismatch {
        /// Recorded rank
        recorded: Rank,
        /// Children actually found
        actual: usize,
    },
    /// Two trees of different rank were linked
    LinkRankMismatch {
        /// Rank of the tree that would become the parent
        parent: Rank,
        /// Rank of the tree that would become the child
        child: Rank,
    },
    /// A child has a smaller priority than its parent
    HeapOrder,
    /// A root carries a mark
    MarkedRoot,
    /// The `position`-th smallest child rank (0-based) is below `position - 1`
    ChildRankTooSmall {
        /// Position in ascending rank order
        position: usize,
        /// Rank found at that position
        rank: Rank,
    },
    /// A rank reached the bucket count during consolidation
    RankBoundExceeded {
        /// Offending rank
        rank: Rank,
        /// Bucket count in use
        bound: usize,
    },
    /// The cached minimum is missing, not a root, or not minimal
    StaleMinimum,
    /// Nodes reachable from the meta-root differ from nodes stored
    SizeMismatch {
        /// Nodes stored in the arena
        stored: usize,
        /// Nodes reachable from the meta-root
        reachable: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::Detached => write!(f, "node has no parent"),
            InvariantViolation::AlreadyAttached => write!(f, "node already has a parent"),
            InvariantViolation::NotARoot => write!(f, "extracted node is not a root"),
            InvariantViolation::DanglingKey => write!(f, "link refers to a freed node"),
            InvariantViolation::SiblingLinks => write!(f, "inconsistent sibling pointers"),
            InvariantViolation::ParentLink => write!(f, "inconsistent parent pointer"),
            InvariantViolation::RankMismatch { recorded, actual } => write!(
                f,
                "rank {recorded} does not match real number of children {actual}"
            ),
            InvariantViolation::LinkRankMismatch { parent, child } => {
                write!(f, "linking trees of different rank ({parent} and {child})")
            }
            InvariantViolation::HeapOrder => {
                write!(f, "parent has bigger priority than its child")
            }
            InvariantViolation::MarkedRoot => write!(f, "root is marked"),
            InvariantViolation::ChildRankTooSmall { position, rank } => {
                write!(f, "child at position {position} has too small rank {rank}")
            }
            InvariantViolation::RankBoundExceeded { rank, bound } => {
                write!(f, "consolidate: rank {rank} is not below the rank bound {bound}")
            }
            InvariantViolation::StaleMinimum => write!(f, "cached minimum is wrong"),
            InvariantViolation::SizeMismatch { stored, reachable } => write!(
                f,
                "size of the heap {stored} does not match real number of its nodes {reachable}"
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Aborts on a broken invariant
#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn violation(violation: InvariantViolation) -> ! {
    panic!("invariant violation: {violation}")
}

/// Shape summary returned by a successful audit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Number of nodes
    pub len: usize,
    /// Number of trees
    pub roots: usize,
    /// Largest rank of any node
    pub max_rank: Rank,
    /// Number of marked nodes
    pub marked: usize,
    /// Length of the longest root-to-leaf path, in nodes
    pub height: usize,
}

impl<T, P: Ord, B, O> FibonacciHeap<T, P, B, O> {
    /// Verifies every structural invariant by walking the whole forest
    ///
    /// Checks parent and sibling links, ranks, heap order, that roots are
    /// unmarked, the cached minimum and that every stored node is reachable.
    /// With cascading cuts it also checks that the i-th smallest child rank of
    /// every node is at least `i - 1`, which is what bounds tree sizes from
    /// below by Fibonacci numbers.
    ///
    /// # Time Complexity
    /// O(n log n)
    pub fn check_invariants(&self) -> Result<HeapStats, InvariantViolation> {
        let mut stats = HeapStats::default();
        let roots = self.checked_ring(Parent::Meta, &self.meta)?;
        stats.roots = roots.len();

        let mut min_priority: Option<&P> = None;
        let mut stack: Vec<(NodeKey, usize)> = Vec::with_capacity(roots.len());
        for &root in &roots {
            let node = &self.nodes[root];
            if node.marked {
                return Err(InvariantViolation::MarkedRoot);
            }
            if min_priority.map_or(true, |min| node.priority < *min) {
                min_priority = Some(&node.priority);
            }
            stack.push((root, 1));
        }

        match (self.min, min_priority) {
            (None, None) => {}
            (Some(min), Some(lowest)) => {
                let node = self.nodes.get(min).ok_or(InvariantViolation::StaleMinimum)?;
                if node.parent != Some(Parent::Meta) || node.priority != *lowest {
                    return Err(InvariantViolation::StaleMinimum);
                }
            }
            _ => return Err(InvariantViolation::StaleMinimum),
        }

        while let Some((key, depth)) = stack.pop() {
            let node = &self.nodes[key];
            stats.len += 1;
            stats.height = stats.height.max(depth);
            stats.max_rank = stats.max_rank.max(node.children.rank);
            if node.marked {
                stats.marked += 1;
            }

            let children = self.checked_ring(Parent::Node(key), &node.children)?;
            let mut ranks = Vec::with_capacity(children.len());
            for &child in &children {
                let child_node = &self.nodes[child];
                if child_node.priority < node.priority {
                    return Err(InvariantViolation::HeapOrder);
                }
                ranks.push(child_node.children.rank);
                stack.push((child, depth + 1));
            }

            if self.cut_mode == CutMode::Cascading {
                ranks.sort_unstable();
                for (position, &rank) in ranks.iter().enumerate() {
                    if rank + 1 < position {
                        return Err(InvariantViolation::ChildRankTooSmall { position, rank });
                    }
                }
            }
        }

        if stats.len != self.nodes.len() {
            return Err(InvariantViolation::SizeMismatch {
                stored: self.nodes.len(),
                reachable: stats.len,
            });
        }
        Ok(stats)
    }

    /// Collects one sibling ring, checking links in both directions
    fn checked_ring(
        &self,
        parent: Parent,
        list: &ChildList,
    ) -> Result<Vec<NodeKey>, InvariantViolation> {
        let Some(first) = list.first else {
            return if list.rank == 0 {
                Ok(Vec::new())
            } else {
                Err(InvariantViolation::RankMismatch {
                    recorded: list.rank,
                    actual: 0,
                })
            };
        };

        let mut ring = Vec::with_capacity(list.rank);
        let mut current = first;
        loop {
            let node = self
                .nodes
                .get(current)
                .ok_or(InvariantViolation::DanglingKey)?;
            if node.parent != Some(parent) {
                return Err(InvariantViolation::ParentLink);
            }
            let next = self
                .nodes
                .get(node.next)
                .ok_or(InvariantViolation::DanglingKey)?;
            let prev = self
                .nodes
                .get(node.prev)
                .ok_or(InvariantViolation::DanglingKey)?;
            if next.prev != current || prev.next != current {
                return Err(InvariantViolation::SiblingLinks);
            }
            ring.push(current);
            // A ring that does not return to `first` would loop forever.
            if ring.len() > self.nodes.len() {
                return Err(InvariantViolation::SiblingLinks);
            }
            current = node.next;
            if current == first {
                break;
            }
        }

        if ring.len() != list.rank {
            return Err(InvariantViolation::RankMismatch {
                recorded: list.rank,
                actual: ring.len(),
            });
        }
        Ok(ring)
    }

    /// Renders the forest as an indented list, one node per line
    ///
    /// ```rust
    /// use fibheap::fibonacci::FibonacciHeap;
    ///
    /// let mut heap = FibonacciHeap::new();
    /// heap.insert(1, 'a');
    /// heap.insert(2, 'b');
    /// heap.insert(0, 'z');
    /// heap.extract_min().unwrap();
    /// assert_eq!(heap.render(), "Heap of size 2\n- 1 (payload: 'a')\n  - 2 (payload: 'b')\n");
    /// ```
    pub fn render(&self) -> String
    where
        T: fmt::Debug,
        P: fmt::Debug,
    {
        let mut out = String::new();
        let _ = writeln!(out, "Heap of size {}", self.nodes.len());
        let mut stack: Vec<(NodeKey, usize)> = self
            .siblings(&self.meta)
            .map(|key| (key, 0))
            .collect();
        stack.reverse();
        while let Some((key, indent)) = stack.pop() {
            let node = &self.nodes[key];
            let _ = writeln!(
                out,
                "{:width$}- {:?} (payload: {:?}){}",
                "",
                node.priority,
                node.payload,
                if node.marked { " *" } else { "" },
                width = indent * 2
            );
            let start = stack.len();
            stack.extend(self.siblings(&node.children).map(|child| (child, indent + 1)));
            stack[start..].reverse();
        }
        out
    }
}
