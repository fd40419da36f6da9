//! Heap builders shared by the integration tests
//!
//! These drive the heap only through its public operations. Removal and
//! consolidation are expressed as a decrease to minus infinity followed by
//! `extract_min`, so building a shape also exercises `decrease`.

#![allow(dead_code)]

pub mod experiment;

use fibheap::audit::HeapStats;
use fibheap::fibonacci::{FibonacciHandle, FibonacciHeap};
use fibheap::policy::{HeapObserver, RankBound};

/// Payloads are indices into the caller's bookkeeping
pub type TestHeap<B, O> = FibonacciHeap<usize, i32, B, O>;

pub const MINUS_INFINITY: i32 = i32::MIN;

/// Installs a test-writer subscriber once; filter with `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Runs the full structural audit, panicking with the violation
pub fn audit<B: RankBound, O: HeapObserver>(heap: &TestHeap<B, O>) -> HeapStats {
    match heap.check_invariants() {
        Ok(stats) => stats,
        Err(violation) => panic!("audit failed: {violation}\n{}", heap.render()),
    }
}

/// Removes `node` by decreasing it below everything and extracting it
pub fn remove<B: RankBound, O: HeapObserver>(heap: &mut TestHeap<B, O>, node: &FibonacciHandle) {
    heap.decrease(node, MINUS_INFINITY).unwrap();
    let (_, priority) = heap.extract_min().unwrap();
    assert_eq!(priority, MINUS_INFINITY);
}

/// Forces a consolidation without changing the heap's contents
pub fn consolidate<B: RankBound, O: HeapObserver>(heap: &mut TestHeap<B, O>) {
    let node = heap.insert(0, usize::MAX);
    remove(heap, &node);
}

/// Proper descendants of `node` in preorder
pub fn descendants<B: RankBound, O: HeapObserver>(
    heap: &TestHeap<B, O>,
    node: &FibonacciHandle,
) -> Vec<FibonacciHandle> {
    let mut out = Vec::new();
    let mut stack: Vec<_> = heap.children(node).unwrap().into_iter().rev().collect();
    while let Some(current) = stack.pop() {
        out.push(current);
        stack.extend(heap.children(&current).unwrap().into_iter().rev());
    }
    out
}

/// Removes `node` together with its whole subtree
pub fn remove_subtree<B: RankBound, O: HeapObserver>(
    heap: &mut TestHeap<B, O>,
    node: &FibonacciHandle,
) {
    let mut doomed = descendants(heap, node);
    doomed.push(*node);
    for victim in &doomed {
        remove(heap, victim);
    }
}

/// Builds a tree of the given rank with as few nodes as cascading cuts allow
///
/// Returns the root and its child of largest rank (none for rank 0). The
/// tree has exactly `F(rank + 2)` nodes.
pub fn build_sparse_tree<B: RankBound, O: HeapObserver>(
    heap: &mut TestHeap<B, O>,
    rank: usize,
    priority: i32,
) -> (FibonacciHandle, Option<FibonacciHandle>) {
    if rank == 0 {
        return (heap.insert(priority, 0), None);
    }
    let (a, _) = build_sparse_tree(heap, rank - 1, priority);
    let (b, b_child) = build_sparse_tree(heap, rank - 1, priority + 1);
    consolidate(heap);
    if let Some(child) = b_child {
        remove_subtree(heap, &child);
    }
    (a, Some(b))
}

/// Builds a single path of `length + 2` nodes and returns its lowest node
///
/// Every node on the path except the root and the lowest node is marked.
pub fn build_path<B: RankBound, O: HeapObserver>(
    heap: &mut TestHeap<B, O>,
    length: i32,
) -> FibonacciHandle {
    let mut doomed = Vec::new();
    heap.insert(length + 1, 0);
    let end = heap.insert(length + 2, 0);
    consolidate(heap);
    doomed.push(heap.insert(length + 2, 0));
    let spare = heap.insert(length + 3, 0);
    consolidate(heap);
    remove(heap, &spare);

    for i in (1..=length).rev() {
        heap.insert(i, 0);
        doomed.push(heap.insert(i + 1, 0));
        consolidate(heap);
        let a = heap.insert(i + 1, 0);
        let b = heap.insert(i + 2, 0);
        consolidate(heap);
        remove(heap, &b);
        remove(heap, &a);
    }

    for node in &doomed {
        remove(heap, node);
    }
    end
}

/// Number of nodes on the single root-to-leaf path, if the heap is one path
pub fn path_len<B: RankBound, O: HeapObserver>(heap: &TestHeap<B, O>) -> Option<usize> {
    let roots = heap.roots();
    let [root] = roots.as_slice() else {
        return None;
    };
    let mut node = *root;
    let mut len = 1;
    loop {
        match heap.children(&node).unwrap().as_slice() {
            [] => return Some(len),
            [child] => {
                node = *child;
                len += 1;
            }
            _ => return None,
        }
    }
}

/// Ancestors of `node`, parent first, root last
pub fn ancestors<B: RankBound, O: HeapObserver>(
    heap: &TestHeap<B, O>,
    node: &FibonacciHandle,
) -> Vec<FibonacciHandle> {
    let mut out = Vec::new();
    let mut current = *node;
    while let Some(parent) = heap.parent(&current).unwrap() {
        out.push(parent);
        current = parent;
    }
    out
}
