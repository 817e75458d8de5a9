//! Merge tree construction.
//!
//! The tree is built greedily: every step merges the two lightest partial
//! trees, which yields a minimum weighted path length and therefore an optimal
//! prefix code.
//!
//! # Tie-break
//!
//! Leaves enter the queue in ascending symbol order and every tree gets an
//! increasing sequence number when it is queued. Equal weights are popped in
//! sequence order, and the first tree popped becomes the left (`0`) child.
//! Identical frequency tables therefore always produce identical trees.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::error::{Error, Result, TreeError};
use crate::queue::TreeQueue;

/// An atomic unit of the input alphabet (Unicode scalar value or byte).
pub type Symbol = u32;

/// Occurrence count of a symbol or subtree.
pub type Weight = u64;

/// Symbol → weight, ordered by symbol.
pub type FrequencyTable = BTreeMap<Symbol, Weight>;

/// Count symbol occurrences.
pub fn tally<I>(symbols: I) -> FrequencyTable
where
    I: IntoIterator<Item = Symbol>,
{
    let mut freqs = FrequencyTable::new();
    for symbol in symbols {
        *freqs.entry(symbol).or_insert(0) += 1;
    }
    freqs
}

/// Node of the merge tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: Symbol,
        weight: Weight,
    },
    Internal {
        left: Box<Node>,
        right: Box<Node>,
        weight: Weight,
    },
}

impl Node {
    pub fn leaf(symbol: Symbol, weight: Weight) -> Self {
        Node::Leaf { symbol, weight }
    }

    /// Combine two subtrees under a new internal node.
    ///
    /// # Errors
    /// `TreeError::WeightOverflow` if the summed weight does not fit.
    pub fn merge(left: Node, right: Node) -> Result<Self> {
        let weight = left
            .weight()
            .checked_add(right.weight())
            .ok_or(TreeError::WeightOverflow)?;
        Ok(Node::Internal {
            left: Box::new(left),
            right: Box::new(right),
            weight,
        })
    }

    pub fn weight(&self) -> Weight {
        match self {
            Node::Leaf { weight, .. } => *weight,
            Node::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

/// A (partial or final) merge tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    root: Node,
}

impl Tree {
    pub fn from_node(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Aggregate weight (root weight).
    pub fn weight(&self) -> Weight {
        self.root.weight()
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.nodes().filter(|(node, _)| node.is_leaf()).count()
    }

    /// Number of internal nodes in the tree.
    pub fn internal_count(&self) -> usize {
        self.nodes().filter(|(node, _)| !node.is_leaf()).count()
    }

    /// Sum of leaf weights. Equals `weight()` for any tree built by merges.
    pub fn leaf_weight_sum(&self) -> Weight {
        self.nodes()
            .filter_map(|(node, _)| match node {
                Node::Leaf { weight, .. } => Some(*weight),
                Node::Internal { .. } => None,
            })
            .sum()
    }

    /// Sum over leaves of `weight * depth`: the payload size in bits.
    ///
    /// A lone root leaf counts as depth 1, matching the one-bit code it gets.
    ///
    /// # Errors
    /// `TreeError::WeightOverflow` if the bit count does not fit in a u64.
    pub fn weighted_path_length(&self) -> Result<u64> {
        if let Node::Leaf { weight, .. } = &self.root {
            return Ok(*weight);
        }
        self.nodes()
            .filter_map(|(node, depth)| match node {
                Node::Leaf { weight, .. } => Some((*weight, depth as u64)),
                Node::Internal { .. } => None,
            })
            .try_fold(0u64, |total, (weight, depth)| {
                weight
                    .checked_mul(depth)
                    .and_then(|bits| total.checked_add(bits))
                    .ok_or_else(|| Error::from(TreeError::WeightOverflow))
            })
    }

    /// Iterate over all nodes with their depth, without recursion.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes {
            stack: vec![(&self.root, 0)],
        }
    }
}

/// Pre-order iterator over a tree's nodes, yielding `(node, depth)`.
pub struct Nodes<'a> {
    stack: Vec<(&'a Node, usize)>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = (&'a Node, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        if let Node::Internal { left, right, .. } = node {
            self.stack.push((right, depth + 1));
            self.stack.push((left, depth + 1));
        }
        Some((node, depth))
    }
}

/// Build the merge tree for a frequency table.
///
/// # Errors
/// - `TreeError::EmptyInput` if `freqs` is empty
/// - `TreeError::InvalidWeight` if any symbol has weight 0
/// - `TreeError::WeightOverflow` if the total weight exceeds u64
pub fn build_tree(freqs: &FrequencyTable) -> Result<Tree> {
    if freqs.is_empty() {
        return Err(TreeError::EmptyInput.into());
    }

    let mut queue = TreeQueue::with_capacity(freqs.len());
    for (&symbol, &weight) in freqs {
        if weight == 0 {
            return Err(TreeError::InvalidWeight { symbol }.into());
        }
        queue.push(Tree::from_node(Node::leaf(symbol, weight)));
    }

    while queue.len() > 1 {
        let (Some(first), Some(second)) = (queue.pop_min(), queue.pop_min()) else {
            break;
        };
        trace!(left = first.weight(), right = second.weight(), "merge");
        queue.push(Tree::from_node(Node::merge(first.root, second.root)?));
    }

    let tree = queue.pop_min().ok_or(TreeError::EmptyInput)?;
    debug!(
        symbols = freqs.len(),
        total_weight = tree.weight(),
        "built merge tree"
    );
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freqs(pairs: &[(char, u64)]) -> FrequencyTable {
        pairs.iter().map(|&(c, w)| (c as Symbol, w)).collect()
    }

    #[test]
    fn test_empty_input() {
        let result = build_tree(&FrequencyTable::new());
        assert!(matches!(
            result,
            Err(crate::error::Error::Tree(TreeError::EmptyInput))
        ));
    }

    #[test]
    fn test_zero_weight_rejected() {
        let result = build_tree(&freqs(&[('a', 3), ('b', 0)]));
        assert!(matches!(
            result,
            Err(crate::error::Error::Tree(TreeError::InvalidWeight { symbol })) if symbol == 'b' as u32
        ));
    }

    #[test]
    fn test_weight_overflow() {
        let result = build_tree(&freqs(&[('a', u64::MAX), ('b', 1)]));
        assert!(matches!(
            result,
            Err(crate::error::Error::Tree(TreeError::WeightOverflow))
        ));
    }

    #[test]
    fn test_weighted_path_length_overflow() {
        // Total weight fits, but weight * depth does not
        let tree = build_tree(&freqs(&[('a', 1 << 62), ('b', 1 << 62), ('c', 1 << 62)])).unwrap();
        assert_eq!(tree.weight(), 3 << 62);
        assert!(matches!(
            tree.weighted_path_length(),
            Err(crate::error::Error::Tree(TreeError::WeightOverflow))
        ));
    }

    #[test]
    fn test_single_symbol_is_leaf() {
        let tree = build_tree(&freqs(&[('x', 5)])).unwrap();
        assert_eq!(tree.root(), &Node::leaf('x' as u32, 5));
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.internal_count(), 0);
        assert_eq!(tree.weighted_path_length().unwrap(), 5);
    }

    #[test]
    fn test_node_counts_and_weight_conservation() {
        let table = freqs(&[('a', 1), ('b', 1), ('c', 2), ('d', 3), ('e', 5), ('f', 8), ('g', 13)]);
        let tree = build_tree(&table).unwrap();

        let total: u64 = table.values().sum();
        assert_eq!(tree.weight(), total);
        assert_eq!(tree.leaf_weight_sum(), total);
        assert_eq!(tree.leaf_count(), 7);
        assert_eq!(tree.internal_count(), 6);
    }

    #[test]
    fn test_textbook_optimal_length() {
        let table = freqs(&[('a', 5), ('b', 9), ('c', 12), ('d', 13), ('e', 16), ('f', 45)]);
        let tree = build_tree(&table).unwrap();
        assert_eq!(tree.weighted_path_length().unwrap(), 224);
    }

    #[test]
    fn test_two_symbols_lighter_on_left() {
        let tree = build_tree(&freqs(&[('a', 7), ('b', 2)])).unwrap();
        match tree.root() {
            Node::Internal { left, right, weight } => {
                assert_eq!(*weight, 9);
                assert_eq!(**left, Node::leaf('b' as u32, 2));
                assert_eq!(**right, Node::leaf('a' as u32, 7));
            }
            Node::Leaf { .. } => panic!("expected internal root"),
        }
    }

    #[test]
    fn test_deterministic_with_ties() {
        let table = freqs(&[('a', 1), ('b', 1), ('c', 1), ('d', 1), ('e', 2)]);
        let first = build_tree(&table).unwrap();
        for _ in 0..10 {
            assert_eq!(build_tree(&table).unwrap(), first);
        }
    }

    #[test]
    fn test_tally() {
        let counts = tally("abracadabra".chars().map(|c| c as u32));
        assert_eq!(counts.get(&('a' as u32)), Some(&5));
        assert_eq!(counts.get(&('b' as u32)), Some(&2));
        assert_eq!(counts.get(&('r' as u32)), Some(&2));
        assert_eq!(counts.get(&('c' as u32)), Some(&1));
        assert_eq!(counts.get(&('d' as u32)), Some(&1));
        assert_eq!(counts.len(), 5);
    }

    #[test]
    fn test_deep_skewed_tree() {
        // Fibonacci weights give a maximally skewed tree
        let mut table = FrequencyTable::new();
        let (mut a, mut b) = (1u64, 1u64);
        for symbol in 0..60 {
            table.insert(symbol, a);
            let next = a + b;
            a = b;
            b = next;
        }
        let tree = build_tree(&table).unwrap();
        assert_eq!(tree.leaf_count(), 60);
        let max_depth = tree.nodes().map(|(_, d)| d).max().unwrap();
        assert_eq!(max_depth, 59);
    }
}
