//! Min-cost frontier over node-table indices.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::node::{FrontierKey, NodeIndex};

/// A frontier entry wrapping a node index with its ordering key.
///
/// `BinaryHeap` is a max-heap, so we use `Reverse<FrontierKey>` to get
/// min-heap behavior (lowest cost first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct FrontierEntry {
    key: Reverse<FrontierKey>,
    node: NodeIndex,
}

/// Best-first frontier keyed by accumulated cost.
///
/// Maintains:
/// - A `BinaryHeap` for O(log n) pop of the cheapest entry
/// - A monotonic creation counter for deterministic tie-breaking
/// - A high-water mark of the frontier size
#[derive(Debug, Clone, Default)]
pub struct CostFrontier {
    heap: BinaryHeap<FrontierEntry>,
    next_order: u64,
    high_water: usize,
}

impl CostFrontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `node` at `cost`.
    pub fn push(&mut self, node: NodeIndex, cost: f64) {
        let creation_order = self.next_order;
        self.next_order += 1;
        self.heap.push(FrontierEntry {
            key: Reverse(FrontierKey {
                cost,
                creation_order,
            }),
            node,
        });
        self.high_water = self.high_water.max(self.heap.len());
    }

    /// Cost of the cheapest entry, without removing it.
    #[must_use]
    pub fn peek_cost(&self) -> Option<f64> {
        self.heap.peek().map(|e| e.key.0.cost)
    }

    /// Remove the cheapest entry.
    #[must_use]
    pub fn pop(&mut self) -> Option<(NodeIndex, f64)> {
        self.heap.pop().map(|e| (e.node, e.key.0.cost))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// High-water mark of frontier size since the last clear.
    #[must_use]
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Abandon every entry, keeping the allocation.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_order = 0;
        self.high_water = 0;
    }
}
