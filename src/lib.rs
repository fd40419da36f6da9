//! Fibonacci heap with decrease-key and lazy consolidation
//!
//! This crate provides a Fibonacci heap whose nodes live in a generational
//! arena, so handles to removed elements are detected instead of dangling.
//!
//! # Features
//!
//! - **O(1) amortized** insert and decrease
//! - **O(log n) amortized** extract_min and remove
//! - Cascading cuts with marking, consolidation by rank buckets
//! - Pluggable rank bound and instrumentation hooks ([`policy`])
//! - Full structural audit of the node graph ([`audit`])
//!
//! # Example
//!
//! ```rust
//! use fibheap::fibonacci::FibonacciHeap;
//! use fibheap::HeapError;
//!
//! let mut heap = FibonacciHeap::new();
//! let handle1 = heap.insert(5, "item1");
//! heap.insert(3, "item2");
//! heap.decrease(&handle1, 1).unwrap();
//! assert_eq!(heap.peek(), Some((&1, &"item1")));
//!
//! assert_eq!(heap.extract_min(), Ok(("item1", 1)));
//! assert_eq!(heap.decrease(&handle1, 0), Err(HeapError::InvalidHandle));
//! ```
//!
//! # Errors
//!
//! Caller mistakes (extracting from an empty heap, raising a priority through
//! `decrease`, using a stale handle) are returned as [`HeapError`] and leave
//! the heap untouched. A broken internal invariant is a bug in this crate and
//! panics with an [`audit::InvariantViolation`] message.

pub mod audit;
pub mod fibonacci;
pub mod policy;
pub mod rank;
pub mod storage;
pub mod traits;

// Re-export the main traits and types for convenience
pub use fibonacci::{FibonacciHandle, FibonacciHeap};
pub use traits::{DecreaseKeyHeap, Handle, Heap, HeapError};
