//! Min-priority queue of partial trees.
//!
//! Entries are ordered by `(weight, sequence)`. The sequence number is
//! assigned at insert time and only ever grows, so equal weights come out in
//! insertion order. Together with inserting leaves in ascending symbol order
//! this makes tree construction fully reproducible.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::tree::Tree;

/// A tree waiting to be merged.
#[derive(Debug)]
struct QueuedTree {
    /// Aggregate weight of `tree`, cached for ordering
    weight: u64,
    /// Insertion sequence number (tie-break)
    sequence: u64,
    tree: Tree,
}

impl PartialEq for QueuedTree {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.sequence == other.sequence
    }
}

impl Eq for QueuedTree {}

impl PartialOrd for QueuedTree {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedTree {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (lighter, then older = higher priority)
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Priority queue keyed by subtree weight.
#[derive(Debug, Default)]
pub struct TreeQueue {
    heap: BinaryHeap<QueuedTree>,
    next_sequence: u64,
}

impl TreeQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty queue with room for `capacity` trees.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            next_sequence: 0,
        }
    }

    /// Insert a tree, stamping it with the next sequence number.
    pub fn push(&mut self, tree: Tree) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(QueuedTree {
            weight: tree.weight(),
            sequence,
            tree,
        });
    }

    /// Remove and return the lightest tree (oldest among equal weights).
    pub fn pop_min(&mut self) -> Option<Tree> {
        self.heap.pop().map(|entry| entry.tree)
    }

    /// Number of trees in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True when the queue holds no trees.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;

    fn leaf(symbol: u32, weight: u64) -> Tree {
        Tree::from_node(Node::leaf(symbol, weight))
    }

    fn leaf_symbol(tree: &Tree) -> u32 {
        match tree.root() {
            Node::Leaf { symbol, .. } => *symbol,
            Node::Internal { .. } => panic!("expected a leaf"),
        }
    }

    #[test]
    fn test_pop_in_weight_order() {
        let mut queue = TreeQueue::new();
        queue.push(leaf(1, 30));
        queue.push(leaf(2, 10));
        queue.push(leaf(3, 20));

        let weights: Vec<u64> = std::iter::from_fn(|| queue.pop_min())
            .map(|t| t.weight())
            .collect();
        assert_eq!(weights, vec![10, 20, 30]);
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        let mut queue = TreeQueue::new();
        queue.push(leaf(9, 5));
        queue.push(leaf(2, 5));
        queue.push(leaf(7, 5));

        assert_eq!(leaf_symbol(&queue.pop_min().unwrap()), 9);
        assert_eq!(leaf_symbol(&queue.pop_min().unwrap()), 2);
        assert_eq!(leaf_symbol(&queue.pop_min().unwrap()), 7);
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = TreeQueue::with_capacity(4);
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert!(queue.pop_min().is_none());

        queue.push(leaf(0, 1));
        assert_eq!(queue.len(), 1);
        assert!(queue.pop_min().is_some());
        assert!(queue.is_empty());
    }
}
