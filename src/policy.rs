//! Pluggable strategies for [`FibonacciHeap`](crate::fibonacci::FibonacciHeap)
//!
//! The heap is parameterised by two strategy types and one runtime switch:
//!
//! - [`RankBound`] decides how many rank buckets consolidation allocates.
//!   A tree whose rank reaches the bound is a structural bug and panics.
//! - [`HeapObserver`] is told about every public operation and every
//!   structural relink. [`StepCounter`] uses this to measure the amortized
//!   cost of an operation sequence.
//! - [`CutMode`] selects whether `decrease` marks parents and cascades.
//!
//! The defaults ([`GoldenRatioBound`], [`NoopObserver`],
//! [`CutMode::Cascading`]) give the textbook Fibonacci heap. The naive mode
//! only exists to compare amortized costs against it.

use crate::rank;

/// Upper bound on the rank of any tree during consolidation
pub trait RankBound {
    /// Number of rank buckets for a heap currently holding `size` nodes.
    ///
    /// Every rank present in the heap must be strictly below the returned
    /// value. Takes `&mut self` so a bound may remember past sizes.
    fn max_rank(&mut self, size: usize) -> usize;
}

/// Bound for heaps with cascading cuts: largest `r` with `F(r + 2) <= n`, plus one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoldenRatioBound;

impl RankBound for GoldenRatioBound {
    fn max_rank(&mut self, size: usize) -> usize {
        rank::golden_ratio_bound(size)
    }
}

/// `⌊log₂ n⌋ + 1`
///
/// Only valid while no key is ever decreased (all trees are binomial).
/// Once decreases happen, consolidation can panic with a rank-bound violation
/// even though the heap is structurally sound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Log2Bound;

impl RankBound for Log2Bound {
    fn max_rank(&mut self, size: usize) -> usize {
        rank::log2_bound(size)
    }
}

/// `⌊√(2 · max_size)⌋ + 2`, where `max_size` is the largest size seen so far
///
/// Pair with [`CutMode::Naive`], where trees can degenerate into stars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqrtBound {
    max_size: usize,
}

impl SqrtBound {
    /// Largest heap size observed so far
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl RankBound for SqrtBound {
    fn max_rank(&mut self, size: usize) -> usize {
        self.max_size = self.max_size.max(size);
        rank::sqrt_bound(self.max_size)
    }
}

/// How `decrease` repairs a heap-order violation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CutMode {
    /// Cut the node, then cut marked ancestors and mark the first unmarked one
    #[default]
    Cascading,
    /// Cut only the node itself and never mark anything
    Naive,
}

/// Public heap operation, as reported to a [`HeapObserver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `insert`
    Insert,
    /// `extract_min`
    ExtractMin,
    /// `decrease`
    Decrease,
    /// `remove`
    Remove,
}

/// Elementary structural change, as reported to a [`HeapObserver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relink {
    /// A node was attached as the child of a node or of the meta-root
    Attach,
    /// A node was detached from its parent
    Detach,
}

/// Callback for instrumenting a heap without changing its behavior
///
/// Both methods default to doing nothing.
pub trait HeapObserver {
    /// Called once per successful public operation, before it runs
    fn operation(&mut self, _op: Operation) {}

    /// Called once per attach or detach of a node
    fn relink(&mut self, _relink: Relink) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopObserver;

impl HeapObserver for NoopObserver {}

/// Counts operations and relinks to measure amortized structural work
///
/// # Example
///
/// ```rust
/// use fibheap::fibonacci::FibonacciHeap;
/// use fibheap::policy::{GoldenRatioBound, StepCounter};
///
/// let mut heap = FibonacciHeap::with_strategy(GoldenRatioBound, StepCounter::default());
/// heap.insert(2, "b");
/// heap.insert(1, "a");
/// heap.extract_min().unwrap();
///
/// let counter = heap.observer();
/// assert_eq!(counter.operations(), 3);
/// assert!(counter.steps_per_operation() > 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepCounter {
    operations: u64,
    steps: u64,
}

impl StepCounter {
    /// Number of public operations seen
    pub fn operations(&self) -> u64 {
        self.operations
    }

    /// Number of attaches plus detaches seen
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Average structural steps per operation (0 when nothing ran)
    pub fn steps_per_operation(&self) -> f64 {
        self.steps as f64 / self.operations.max(1) as f64
    }

    /// Resets both counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl HeapObserver for StepCounter {
    fn operation(&mut self, _op: Operation) {
        self.operations += 1;
    }

    fn relink(&mut self, _relink: Relink) {
        self.steps += 1;
    }
}
