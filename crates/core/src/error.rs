//! Error types for huffpack.
//!
//! All operations return structured errors rather than panicking. Nothing is
//! recovered silently: a frame either decodes completely or the caller gets
//! one of these.

use thiserror::Error;

use crate::tree::Symbol;

/// Top-level error type for all operations in the system.
///
/// Each variant corresponds to a specific failure domain:
/// - Tree: building the merge tree from a frequency table
/// - Codec: packing symbols or unpacking a payload
/// - Header: parsing or validating a serialized code table
/// - Framing: frame layout (lengths, trailer)
/// - Bit I/O: reading/writing bits from/to byte buffers
/// - I/O: file system operations (app layer only)
#[derive(Debug, Error)]
pub enum Error {
    /// Tree construction failed (e.g., empty frequency table)
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    /// Encode or decode of the symbol stream failed
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Serialized code table is not a valid prefix-free table
    #[error("malformed header: {0}")]
    MalformedHeader(#[from] HeaderError),

    /// Frame error (e.g., missing trailer, length mismatch)
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// Bit I/O operation failed (e.g., reading past end of buffer)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Merge tree construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// No symbols at all (cannot build a tree)
    #[error("empty frequency table: nothing to encode")]
    EmptyInput,

    /// A symbol was given a zero weight
    #[error("symbol {symbol} has non-positive weight")]
    InvalidWeight { symbol: Symbol },

    /// Sum of weights does not fit in a u64
    #[error("total weight overflows u64")]
    WeightOverflow,
}

/// Symbol stream errors raised while packing or unpacking.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Symbol in the input has no entry in the code table
    #[error("symbol {symbol} at position {position} is not in the code table")]
    UnknownSymbol { symbol: Symbol, position: usize },

    /// Payload ended before the declared bit count was reached, or the
    /// declared bit count ended in the middle of a code. `available` is the
    /// payload size in bits, or the position of the last complete symbol.
    #[error("truncated stream: {declared} bits declared, {available} usable")]
    TruncatedStream { declared: u64, available: u64 },

    /// Payload bits do not correspond to any code in the table
    #[error("no code matches the bits ending at bit position {position}")]
    UnknownCode { position: u64 },

    /// Decoded symbol cannot be represented in the requested output
    #[error("symbol {symbol} is not a valid {kind}")]
    InvalidSymbol { symbol: Symbol, kind: &'static str },
}

/// Code table header errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    /// The header terminator line was never found
    #[error("missing header terminator")]
    MissingTerminator,

    /// A header line is not `<symbol>\t<code>`
    #[error("line {line}: expected `<symbol>\\t<code>`")]
    BadLine { line: usize },

    /// Symbol field is not a decimal u32
    #[error("line {line}: invalid symbol {text:?}")]
    BadSymbol { line: usize, text: String },

    /// Code field is empty or contains something other than 0/1
    #[error("line {line}: invalid code {text:?}")]
    BadCode { line: usize, text: String },

    /// Same symbol listed twice
    #[error("symbol {symbol} appears more than once")]
    DuplicateSymbol { symbol: Symbol },

    /// Two symbols share a code
    #[error("code {code} is assigned to both {first} and {second}")]
    DuplicateCode {
        code: String,
        first: Symbol,
        second: Symbol,
    },

    /// One code is a prefix of another
    #[error("code {prefix} is a prefix of code {code}")]
    PrefixConflict { prefix: String, code: String },

    /// Header lists no symbols
    #[error("code table is empty")]
    EmptyTable,
}

/// Frame layout errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    /// Frame is too short to contain the trailer
    #[error("frame too short: need at least {required} bytes after the header, got {actual}")]
    FrameTooShort { required: usize, actual: usize },

    /// Payload holds more bytes than the declared bit count needs
    #[error("payload length mismatch: {expected} bytes expected, got {actual}")]
    PayloadLengthMismatch { expected: usize, actual: usize },

    /// Trailer byte disagrees with the total bit count
    #[error("trailer says {last_byte_bits} valid bits in the last byte, total bit count {total_bits} disagrees")]
    TrailerMismatch { last_byte_bits: u8, total_bits: u64 },
}

/// Bit-level I/O errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitIoError {
    /// Attempted to read past the end of the valid bits
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// Buffer holds fewer bits than the caller declared valid
    #[error("insufficient bits: requested {requested}, available {available}")]
    InsufficientBits { requested: u64, available: u64 },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
