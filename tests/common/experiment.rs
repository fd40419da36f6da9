//! Workloads that compare cascading cuts against naive cuts
//!
//! Every heap here counts operations and relinks through a [`StepCounter`],
//! so a workload's amortized cost is `observer().steps_per_operation()`.
//! Shared by the experiment tests and the `fibonacci_experiment` bench.

use fibheap::fibonacci::{FibonacciHandle, FibonacciHeap};
use fibheap::policy::{CutMode, GoldenRatioBound, RankBound, SqrtBound, StepCounter};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

pub type CountedHeap<B> = FibonacciHeap<usize, i64, B, StepCounter>;

/// Heap with cascading cuts
pub fn cascading_heap() -> CountedHeap<GoldenRatioBound> {
    FibonacciHeap::with_strategy(GoldenRatioBound, StepCounter::default())
}

/// Heap whose cuts never mark
pub fn naive_heap() -> CountedHeap<SqrtBound> {
    FibonacciHeap::with_strategy(SqrtBound::default(), StepCounter::default())
        .with_cut_mode(CutMode::Naive)
}

/// Removes `node` with two counted operations: decrease, then extract
pub fn remove<B: RankBound>(heap: &mut CountedHeap<B>, node: &FibonacciHandle) {
    heap.decrease(node, i64::MIN)
        .expect("removed node must still be in the heap");
    heap.extract_min().expect("heap cannot be empty after a decrease");
}

/// Forces a consolidation
pub fn consolidate<B: RankBound>(heap: &mut CountedHeap<B>) {
    let node = heap.insert(0, usize::MAX);
    remove(heap, &node);
}

/// Builds a star of `n` nodes whose root has priority `root`
///
/// Slots `root..root + n` of `nodes` receive the handles. Without marking
/// the result is a root with `n - 1` leaf children; with cascading cuts the
/// removals split it up.
fn star<B: RankBound>(
    heap: &mut CountedHeap<B>,
    nodes: &mut [Option<FibonacciHandle>],
    n: usize,
    root: usize,
    consolidate_after: bool,
) {
    if n == 1 {
        nodes[root] = Some(heap.insert(root as i64, root));
        if consolidate_after {
            consolidate(heap);
        }
        return;
    }
    star(heap, nodes, n - 1, root, false);
    star(heap, nodes, n - 1, root + n - 1, true);
    for slot in &mut nodes[root + n..root + 2 * n - 2] {
        if let Some(node) = slot.take() {
            remove(heap, &node);
        }
    }
}

/// Builds stars of sizes `stars, stars - 1, ..., 1` side by side
pub fn build_stars<B: RankBound>(heap: &mut CountedHeap<B>, stars: usize) {
    let first = 3;
    let mut nodes = vec![None; first + stars * (stars + 1) / 2];
    let mut root = first;
    for size in (1..=stars).rev() {
        star(heap, &mut nodes, size, root, false);
        root += size;
    }
}

/// Repeatedly inserts two elements and extracts two, `2^stars` times
///
/// Every extraction consolidates the whole root list, so a heap full of
/// large stars pays for them over and over.
pub fn churn<B: RankBound>(heap: &mut CountedHeap<B>, stars: usize) {
    for _ in 0..1usize << stars {
        heap.insert(1, 0);
        heap.insert(1, 0);
        heap.extract_min().expect("just inserted");
        heap.extract_min().expect("just inserted");
    }
}

/// Star construction followed by churn
pub fn star_sequence<B: RankBound>(heap: &mut CountedHeap<B>, stars: usize) {
    build_stars(heap, stars);
    churn(heap, stars);
}

/// Relative frequency of each operation in [`random_mix`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weights {
    pub insert: usize,
    pub decrease: usize,
    pub extract: usize,
}

impl Weights {
    pub const UNIFORM: Weights = Weights {
        insert: 10,
        decrease: 10,
        extract: 10,
    };

    pub const fn biased(decrease: usize) -> Weights {
        Weights {
            insert: 10,
            decrease,
            extract: 20,
        }
    }

    fn total(&self) -> usize {
        self.insert + self.decrease + self.extract
    }
}

#[derive(Debug, Clone, Copy)]
enum MixOp {
    Insert,
    Decrease,
    Extract,
}

/// Inserts `2n` random elements, then runs about `n` operations drawn in
/// proportion to `weights` in random order
///
/// Payloads are kept equal to the element's index in the live-handle list,
/// so extraction can swap-remove its handle. Needs `n >= 5`.
pub fn random_mix<B: RankBound>(
    heap: &mut CountedHeap<B>,
    n: usize,
    weights: Weights,
    rng: &mut StdRng,
) {
    let total = weights.total();
    let mut ops = Vec::with_capacity(n);
    ops.extend(std::iter::repeat(MixOp::Insert).take(n * weights.insert / total));
    ops.extend(std::iter::repeat(MixOp::Decrease).take(n * weights.decrease / total));
    ops.extend(std::iter::repeat(MixOp::Extract).take(n * weights.extract / total));
    ops.shuffle(rng);

    let mut live: Vec<FibonacciHandle> = Vec::with_capacity(3 * n);
    let priority_range = 5 * n as i64;
    for _ in 0..2 * n {
        let priority = rng.gen_range(0..priority_range);
        live.push(heap.insert(priority, live.len()));
    }

    for op in ops {
        match op {
            MixOp::Insert => {
                let priority = rng.gen_range(0..priority_range);
                live.push(heap.insert(priority, live.len()));
            }
            MixOp::Decrease => {
                let node = live[rng.gen_range(0..live.len())];
                let current = *heap.priority(&node).expect("live handle");
                let lowered = current - rng.gen_range(0..n as i64 / 5) - 1;
                heap.decrease(&node, lowered).expect("live handle");
            }
            MixOp::Extract => {
                let (index, _) = heap.extract_min().expect("more inserts than extracts");
                let last = live.len() - 1;
                if index != last {
                    live.swap(index, last);
                    *heap.payload_mut(&live[index]).expect("live handle") = index;
                }
                live.pop();
            }
        }
    }
}

/// `count` sizes spaced geometrically from `start` to `end`
pub fn log_range(start: usize, end: usize, count: usize) -> Vec<usize> {
    let ratio = (end as f64 / start as f64).ln() / (count.max(2) - 1) as f64;
    (0..count)
        .map(|i| (start as f64 * (ratio * i as f64).exp()) as usize)
        .collect()
}
