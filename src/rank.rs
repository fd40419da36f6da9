//! Rank type and rank bounds for Fibonacci heap trees.
//!
//! The rank of a node is its number of children. The meta-root's rank is the
//! number of trees in the heap, which is unbounded between consolidations, so
//! ranks are stored as `usize` rather than a narrower integer.
//!
//! # Rank bounds
//!
//! Consolidation allocates one bucket per possible rank. Two bounds are
//! provided:
//!
//! - [`golden_ratio_bound`]: a tree of rank `r` built with cascading cuts has
//!   at least `F(r + 2)` nodes, so `r` is at most `log_φ(n)`. This is the
//!   bound that holds for every reachable state.
//! - [`log2_bound`]: `⌊log₂ n⌋ + 1`. Tight for binomial trees, i.e. heaps that
//!   never decrease a key. Decreases can legally break it: a three-node heap
//!   may hold a rank-2 root once a grandchild has been cut away.
//!
//! [`sqrt_bound`] is the loose bound used when cuts do not mark their parents.

/// Type alias for node rank/degree.
pub type Rank = usize;

/// Safely increment a rank value, panicking on overflow.
///
/// # Panics
///
/// Panics if `rank == Rank::MAX`, which would need more nodes than fit in
/// memory.
///
/// # Example
///
/// ```rust
/// use fibheap::rank::checked_increment;
///
/// assert_eq!(checked_increment(5), 6);
/// ```
#[inline]
pub fn checked_increment(rank: Rank) -> Rank {
    rank.checked_add(1)
        .expect("rank overflow: a node cannot have more children than there are nodes")
}

/// Decrement a rank value, panicking if it is already zero.
///
/// A node only loses children it actually has, so an underflow means the
/// recorded rank no longer matches the sibling ring.
///
/// # Panics
///
/// Panics if `rank == 0`.
#[inline]
pub fn checked_decrement(rank: Rank) -> Rank {
    rank.checked_sub(1)
        .expect("rank underflow: detached a child from a node that records no children")
}

/// Returns the `n`-th Fibonacci number with `F(0) = 0` and `F(1) = 1`,
/// or `None` if it does not fit in a `u128`.
///
/// ```rust
/// use fibheap::rank::fibonacci;
///
/// assert_eq!(fibonacci(0), Some(0));
/// assert_eq!(fibonacci(10), Some(55));
/// ```
pub fn fibonacci(n: usize) -> Option<u128> {
    if n == 0 {
        return Some(0);
    }
    // a = F(k - 1), b = F(k)
    let (mut a, mut b) = (0u128, 1u128);
    for _ in 1..n {
        let next = a.checked_add(b)?;
        a = b;
        b = next;
    }
    Some(b)
}

/// Minimum number of nodes in a tree of the given rank, `F(rank + 2)`.
pub fn min_tree_size(rank: Rank) -> Option<u128> {
    fibonacci(rank.checked_add(2)?)
}

/// Number of consolidation buckets needed for a heap of `size` nodes when
/// cuts cascade through marked parents.
///
/// Returns one more than the largest `r` with `F(r + 2) <= size`, and at
/// least 1. Every rank that can occur is strictly below the returned value.
///
/// ```rust
/// use fibheap::rank::golden_ratio_bound;
///
/// assert_eq!(golden_ratio_bound(1), 1);
/// assert_eq!(golden_ratio_bound(3), 3);
/// assert_eq!(golden_ratio_bound(8), 5);
/// ```
pub fn golden_ratio_bound(size: usize) -> usize {
    if size == 0 {
        return 1;
    }
    let size = size as u128;
    // a = F(r + 2), b = F(r + 3)
    let (mut rank, mut a, mut b) = (0usize, 1u128, 2u128);
    while b <= size {
        rank += 1;
        let next = a + b;
        a = b;
        b = next;
    }
    rank + 1
}

/// `⌊log₂ size⌋ + 1`, and 1 for an empty heap.
///
/// ```rust
/// use fibheap::rank::log2_bound;
///
/// assert_eq!(log2_bound(0), 1);
/// assert_eq!(log2_bound(1), 1);
/// assert_eq!(log2_bound(4), 3);
/// ```
pub fn log2_bound(size: usize) -> usize {
    if size == 0 {
        1
    } else {
        size.ilog2() as usize + 1
    }
}

/// `⌊√(2 · max_size)⌋ + 2`.
///
/// Without marking, a tree of rank `r` can shrink to a star of `r + 1`
/// nodes, but growing it to rank `r` first takes on the order of `r² / 2`
/// nodes alive at once. `max_size` is therefore the largest size the heap
/// has ever had, not the current one.
pub fn sqrt_bound(max_size: usize) -> usize {
    let target = max_size.saturating_mul(2);
    let fits = |r: usize| r.checked_mul(r).is_some_and(|square| square <= target);
    let mut root = (target as f64).sqrt() as usize;
    // Correct float rounding in either direction.
    while !fits(root) {
        root -= 1;
    }
    while fits(root + 1) {
        root += 1;
    }
    root + 2
}
