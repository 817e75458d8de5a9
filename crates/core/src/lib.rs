//! huffpack-core: static Huffman coding with an explicit frame format
//!
//! This library turns a symbol stream into a compact, self-describing frame
//! and back:
//! - Builds an optimal merge tree from symbol frequencies
//! - Derives a prefix-free code table from the tree
//! - Packs the symbol stream into bytes, MSB-first
//! - Frames the table and payload so decoding is unambiguous
//!
//! # Architecture
//!
//! The system is designed around clear module boundaries:
//! - `queue`: Min-priority queue of partial trees
//! - `tree`: Merge tree model and construction
//! - `codes`: Code tables, header validation, decode trie
//! - `bitio`: Bit packing and unpacking
//! - `framing`: Frame serialization and parsing
//! - `stats`: Observable coding statistics
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and recoverable
//! - **Deterministic**: Identical input always produces byte-identical frames
//! - **Exact**: The decoder stops at an explicit bit count, never at padding
//!
//! # Example
//!
//! ```
//! use huffpack_core::framing::{compress_text, decompress_text};
//!
//! let frame = compress_text("abracadabra").unwrap();
//! assert_eq!(decompress_text(&frame).unwrap(), "abracadabra");
//! ```

pub mod bitio;
pub mod codes;
pub mod error;
pub mod framing;
pub mod queue;
pub mod stats;
pub mod tree;

// Re-export commonly used types
pub use codes::{Code, CodeTable};
pub use error::{Error, Result};
pub use framing::{compress_bytes, compress_text, decompress_bytes, decompress_text};
pub use tree::{build_tree, FrequencyTable, Symbol, Tree};
