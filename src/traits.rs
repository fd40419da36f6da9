//! Common traits for heap data structures
//!
//! This module provides a two-tier trait hierarchy:
//!
//! - [`Heap`]: Base trait with a `BinaryHeap`-like surface (`push`/`peek`/`pop`)
//! - [`DecreaseKeyHeap`]: Extended trait adding handle-based `decrease_key`
//!
//! It also defines [`HeapError`], the error returned when a caller violates an
//! operation's precondition. Structural bugs inside the heap are not reported
//! through this type; they panic with an
//! [`InvariantViolation`](crate::audit::InvariantViolation) message.

use std::fmt;

/// Error type for heap operations
///
/// Every variant is a precondition violation by the caller. The heap is left
/// exactly as it was before the failing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// Extraction or removal was attempted on an empty heap
    Empty,
    /// The new priority is greater than the current priority
    PriorityIncreased,
    /// The handle is no longer valid (element was removed)
    InvalidHandle,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::Empty => write!(f, "cannot extract the minimum of an empty heap"),
            HeapError::PriorityIncreased => {
                write!(f, "new priority is larger than the current priority")
            }
            HeapError::InvalidHandle => {
                write!(f, "handle is no longer valid (element was removed)")
            }
        }
    }
}

impl std::error::Error for HeapError {}

/// A handle to an element in the heap, used for decrease_key operations
///
/// This is an opaque type that identifies a specific element in the heap.
pub trait Handle: Clone + PartialEq + Eq {}

/// Base trait for heap/priority queue data structures
///
/// Unlike `BinaryHeap` which stores values directly (using `Ord`), these heaps
/// store (priority, item) pairs to separate the ordering key from the data.
///
/// # Example
///
/// ```rust
/// use fibheap::Heap;
/// use fibheap::fibonacci::FibonacciHeap;
///
/// let mut heap: FibonacciHeap<&str, i32> = Heap::new();
/// heap.push(3, "three");
/// heap.push(1, "one");
/// heap.push(2, "two");
///
/// assert_eq!(heap.peek(), Some((&1, &"one")));
/// assert_eq!(heap.pop(), Some((1, "one")));
/// ```
pub trait Heap<T, P: Ord> {
    /// Creates a new empty heap
    fn new() -> Self;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool;

    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Inserts an element with the given priority
    fn push(&mut self, priority: P, item: T);

    /// Returns the minimum priority and associated item without removing it
    fn peek(&self) -> Option<(&P, &T)>;

    /// Removes and returns the minimum priority and associated item
    ///
    /// Returns `None` on an empty heap. Use the heap's own `extract_min` to
    /// get a [`HeapError::Empty`] instead.
    fn pop(&mut self) -> Option<(P, T)>;
}

/// Extended heap trait with `decrease_key` support
///
/// # Example
///
/// ```rust
/// use fibheap::{DecreaseKeyHeap, Heap};
/// use fibheap::fibonacci::FibonacciHeap;
///
/// let mut heap: FibonacciHeap<&str, i32> = Heap::new();
/// let handle = heap.push_with_handle(10, "item");
/// heap.decrease_key(&handle, 5).unwrap();
/// assert_eq!(heap.peek(), Some((&5, &"item")));
/// ```
pub trait DecreaseKeyHeap<T, P: Ord>: Heap<T, P> {
    /// The handle type for this heap, used to reference elements for decrease_key
    type Handle: Handle;

    /// Inserts an element with the given priority, returning a handle
    fn push_with_handle(&mut self, priority: P, item: T) -> Self::Handle;

    /// Decreases the priority of an element identified by the handle
    ///
    /// # Errors
    /// - [`HeapError::PriorityIncreased`] if `new_priority` is greater than
    ///   the current priority. Equal priorities are accepted.
    /// - [`HeapError::InvalidHandle`] if the element was already removed.
    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError>;
}
