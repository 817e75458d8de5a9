//! Prefix code tables.
//!
//! A [`CodeTable`] maps every symbol of the input alphabet to a [`Code`]. On
//! the encode side it is derived from a merge tree, which makes it prefix-free
//! by construction. On the decode side it is rebuilt from header entries and
//! checked before any payload bit is read; the check builds the
//! [`DecodeTrie`] used by the unpacker.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::error::{Error, HeaderError, Result, TreeError};
use crate::tree::{FrequencyTable, Node, Symbol, Tree};

/// A non-empty bit string, first bit first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Code {
    bits: Vec<bool>,
}

impl Code {
    /// Build a code from bits. Returns `None` for an empty bit string.
    pub fn from_bits(bits: Vec<bool>) -> Option<Self> {
        if bits.is_empty() {
            None
        } else {
            Some(Self { bits })
        }
    }

    /// Parse a string of `0`/`1` characters.
    pub fn parse(text: &str) -> Option<Self> {
        let bits = text
            .chars()
            .map(|c| match c {
                '0' => Some(false),
                '1' => Some(true),
                _ => None,
            })
            .collect::<Option<Vec<bool>>>()?;
        Self::from_bits(bits)
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Codes built by `from_bits` or `parse` are never empty.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// True if `self` is a (non-strict) prefix of `other`.
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(&self.bits)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Immutable symbol → code mapping, iterated in ascending symbol order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<Symbol, Code>,
}

impl CodeTable {
    /// Derive codes from a merge tree: `0` for left, `1` for right.
    ///
    /// The walk uses an explicit stack, so skewed trees cannot exhaust the
    /// call stack. A tree that is a single leaf gets the one-bit code `0`.
    pub fn from_tree(tree: &Tree) -> Self {
        let mut codes = BTreeMap::new();

        if let Node::Leaf { symbol, .. } = tree.root() {
            codes.insert(*symbol, Code { bits: vec![false] });
            return Self { codes };
        }

        let mut stack: Vec<(&Node, Vec<bool>)> = vec![(tree.root(), Vec::new())];
        while let Some((node, path)) = stack.pop() {
            match node {
                Node::Leaf { symbol, .. } => {
                    codes.insert(*symbol, Code { bits: path });
                }
                Node::Internal { left, right, .. } => {
                    let mut right_path = path.clone();
                    right_path.push(true);
                    stack.push((right, right_path));

                    let mut left_path = path;
                    left_path.push(false);
                    stack.push((left, left_path));
                }
            }
        }

        debug!(symbols = codes.len(), "derived code table");
        Self { codes }
    }

    /// Rebuild a table from parsed `(symbol, code)` entries.
    ///
    /// Entries may come in any order.
    ///
    /// # Errors
    /// - `HeaderError::EmptyTable` if there are no entries
    /// - `HeaderError::DuplicateSymbol` if a symbol repeats
    /// - `HeaderError::DuplicateCode` if two symbols share a code
    /// - `HeaderError::PrefixConflict` if one code is a prefix of another
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Symbol, Code)>,
    {
        let mut codes = BTreeMap::new();
        for (symbol, code) in entries {
            if codes.insert(symbol, code).is_some() {
                return Err(HeaderError::DuplicateSymbol { symbol }.into());
            }
        }
        if codes.is_empty() {
            return Err(HeaderError::EmptyTable.into());
        }

        let table = Self { codes };
        table.trie()?;
        Ok(table)
    }

    /// Code for `symbol`, if the table covers it.
    pub fn get(&self, symbol: Symbol) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    /// Iterate entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &Code)> {
        self.codes.iter().map(|(&symbol, code)| (symbol, code))
    }

    /// Number of symbols in the table.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Longest code length in bits.
    pub fn max_code_len(&self) -> usize {
        self.codes.values().map(Code::len).max().unwrap_or(0)
    }

    /// Total payload bits when coding `freqs` with this table.
    ///
    /// Symbols absent from the table contribute nothing.
    ///
    /// # Errors
    /// `TreeError::WeightOverflow` if the bit count does not fit in a u64.
    pub fn weighted_length(&self, freqs: &FrequencyTable) -> Result<u64> {
        freqs
            .iter()
            .filter_map(|(symbol, &weight)| self.get(*symbol).map(|c| (weight, c.len() as u64)))
            .try_fold(0u64, |total, (weight, len)| {
                weight
                    .checked_mul(len)
                    .and_then(|bits| total.checked_add(bits))
                    .ok_or_else(|| Error::from(TreeError::WeightOverflow))
            })
    }

    /// Build the decode trie, validating that the table is prefix-free.
    ///
    /// # Errors
    /// `HeaderError::DuplicateCode` or `HeaderError::PrefixConflict`.
    pub fn trie(&self) -> Result<DecodeTrie> {
        let mut trie = DecodeTrie::new();
        for (symbol, code) in self.iter() {
            trie.insert(symbol, code, self)?;
        }
        Ok(trie)
    }
}

/// Binary trie node in the arena. Index 0 is the root.
#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: [Option<usize>; 2],
    symbol: Option<Symbol>,
}

/// Binary trie over the codes of a table.
///
/// Every code ends at a node carrying its symbol; such nodes have no
/// children. Walking the trie one bit at a time therefore resolves a symbol
/// the moment its last bit is read.
#[derive(Debug, Clone)]
pub struct DecodeTrie {
    nodes: Vec<TrieNode>,
}

/// Outcome of feeding one bit to the trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// More bits needed; continue from this node
    Partial(usize),
    /// A complete code was read
    Symbol(Symbol),
    /// No code continues with this bit
    Dead,
}

impl DecodeTrie {
    fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
        }
    }

    /// Index of the root node.
    pub(crate) fn root(&self) -> usize {
        0
    }

    /// Follow `bit` from node `at`. An index this trie never handed out is dead.
    pub(crate) fn step(&self, at: usize, bit: bool) -> Step {
        let Some(node) = self.nodes.get(at) else {
            return Step::Dead;
        };
        match node.children[bit as usize] {
            None => Step::Dead,
            Some(next) => match self.nodes[next].symbol {
                Some(symbol) => Step::Symbol(symbol),
                None => Step::Partial(next),
            },
        }
    }

    fn insert(&mut self, symbol: Symbol, code: &Code, table: &CodeTable) -> Result<()> {
        let mut at = 0;
        for &bit in code.bits() {
            if let Some(owner) = self.nodes[at].symbol {
                return Err(conflict(table, owner, symbol));
            }
            at = match self.nodes[at].children[bit as usize] {
                Some(next) => next,
                None => {
                    self.nodes.push(TrieNode::default());
                    let next = self.nodes.len() - 1;
                    self.nodes[at].children[bit as usize] = Some(next);
                    next
                }
            };
        }

        let node = &self.nodes[at];
        if let Some(owner) = node.symbol {
            return Err(conflict(table, owner, symbol));
        }
        if node.children.iter().any(Option::is_some) {
            // `code` is a prefix of some earlier code; find it for the report
            let longer = table
                .iter()
                .find(|(other, c)| *other != symbol && code.is_prefix_of(c))
                .map(|(_, c)| c.to_string())
                .unwrap_or_default();
            return Err(HeaderError::PrefixConflict {
                prefix: code.to_string(),
                code: longer,
            }
            .into());
        }
        self.nodes[at].symbol = Some(symbol);
        Ok(())
    }
}

/// Error for `symbol` running into an existing code owned by `owner`.
fn conflict(table: &CodeTable, owner: Symbol, symbol: Symbol) -> Error {
    let owner_code = table.get(owner).map(Code::to_string).unwrap_or_default();
    let code = table.get(symbol).map(Code::to_string).unwrap_or_default();
    if owner_code == code {
        HeaderError::DuplicateCode {
            code,
            first: owner,
            second: symbol,
        }
        .into()
    } else {
        HeaderError::PrefixConflict {
            prefix: owner_code,
            code,
        }
        .into()
    }
}
