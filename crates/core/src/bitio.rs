//! Bit-level packing and unpacking of code streams.
//!
//! This module provides BitWriter and BitReader plus the two operations built
//! on them: [`pack`] (symbols → bits) and [`unpack`] (bits → symbols). Both
//! work MSB-first.
//!
//! # Padding Rules
//! - BitWriter: left-justifies the final partial byte, padding low bits with zeros
//! - BitReader: never reads past the declared total bit count, so padding is
//!   never interpreted as part of a code
//!
//! # Example
//! ```
//! use huffpack_core::bitio::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! for bit in [true, false, true, true, true] {
//!     writer.write_bit(bit);
//! }
//! let packed = writer.finish();
//! assert_eq!(packed.bytes, vec![0b10111000]);
//! assert_eq!(packed.total_bits, 5);
//! assert_eq!(packed.last_byte_bits(), 5);
//!
//! let mut reader = BitReader::new(&packed.bytes, packed.total_bits).unwrap();
//! assert!(reader.read_bit().unwrap());
//! assert!(!reader.read_bit().unwrap());
//! ```

use tracing::debug;

use crate::codes::{CodeTable, DecodeTrie, Step};
use crate::error::{BitIoError, CodecError, Result};
use crate::tree::Symbol;

/// Packed payload plus the exact number of valid bits in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBits {
    /// Payload bytes; the last one may be partial
    pub bytes: Vec<u8>,
    /// Number of valid bits across all of `bytes`
    pub total_bits: u64,
}

impl PackedBits {
    /// Valid bits in the final byte, or 0 if the payload ends on a byte boundary.
    pub fn last_byte_bits(&self) -> u8 {
        (self.total_bits % 8) as u8
    }
}

/// Writes bits MSB-first into a byte buffer.
///
/// # Invariants
/// - `accumulator` holds `held` bits in its low positions
/// - `held` is always < 8 between calls
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    /// Completed bytes
    bytes: Vec<u8>,
    /// Bits of the current partial byte
    accumulator: u8,
    /// Number of bits in `accumulator` (0-7)
    held: u8,
}

impl BitWriter {
    /// Create a new BitWriter with empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one bit.
    pub fn write_bit(&mut self, bit: bool) {
        self.accumulator = (self.accumulator << 1) | bit as u8;
        self.held += 1;
        if self.held == 8 {
            self.bytes.push(self.accumulator);
            self.accumulator = 0;
            self.held = 0;
        }
    }

    /// Append every bit of `bits` in order.
    pub fn write_bits(&mut self, bits: &[bool]) {
        for &bit in bits {
            self.write_bit(bit);
        }
    }

    /// Total number of bits written so far.
    pub fn bit_len(&self) -> u64 {
        self.bytes.len() as u64 * 8 + self.held as u64
    }

    /// Finish writing and return the payload.
    ///
    /// Remaining bits (1-7) are shifted to the top of a final byte.
    pub fn finish(mut self) -> PackedBits {
        let total_bits = self.bit_len();
        if self.held > 0 {
            self.bytes.push(self.accumulator << (8 - self.held));
        }
        PackedBits {
            bytes: self.bytes,
            total_bits,
        }
    }
}

/// Reads bits MSB-first from a byte buffer, up to a declared bit budget.
///
/// # Invariants
/// - `position <= total_bits <= data.len() * 8`
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Source data
    data: &'a [u8],
    /// Number of valid bits in `data`
    total_bits: u64,
    /// Current bit position (0 = MSB of first byte)
    position: u64,
}

impl<'a> BitReader<'a> {
    /// Create a reader over the first `total_bits` bits of `data`.
    ///
    /// # Errors
    /// `BitIoError::InsufficientBits` if `data` is shorter than `total_bits`.
    pub fn new(data: &'a [u8], total_bits: u64) -> Result<Self> {
        let available = data.len() as u64 * 8;
        if total_bits > available {
            return Err(BitIoError::InsufficientBits {
                requested: total_bits,
                available,
            }
            .into());
        }
        Ok(Self {
            data,
            total_bits,
            position: 0,
        })
    }

    /// Read a single bit.
    ///
    /// # Errors
    /// `BitIoError::UnexpectedEof` once the bit budget is spent.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.position >= self.total_bits {
            return Err(BitIoError::UnexpectedEof.into());
        }
        let byte = self.data[(self.position / 8) as usize];
        let bit = (byte >> (7 - self.position % 8)) & 1 == 1;
        self.position += 1;
        Ok(bit)
    }

    /// Number of valid bits not yet read.
    pub fn bits_remaining(&self) -> u64 {
        self.total_bits - self.position
    }

    /// Current bit position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Check if the bit budget is spent.
    pub fn is_empty(&self) -> bool {
        self.position >= self.total_bits
    }
}

/// Pack `symbols` through `table`.
///
/// # Errors
/// `CodecError::UnknownSymbol` for the first symbol the table does not cover.
/// Nothing is returned in that case.
pub fn pack(symbols: &[Symbol], table: &CodeTable) -> Result<PackedBits> {
    let mut writer = BitWriter::new();
    for (position, &symbol) in symbols.iter().enumerate() {
        let code = table
            .get(symbol)
            .ok_or(CodecError::UnknownSymbol { symbol, position })?;
        writer.write_bits(code.bits());
    }

    let packed = writer.finish();
    debug!(
        symbols = symbols.len(),
        bits = packed.total_bits,
        bytes = packed.bytes.len(),
        "packed payload"
    );
    Ok(packed)
}

/// Decode exactly `total_bits` bits of `payload` through `trie`.
///
/// # Errors
/// - `CodecError::TruncatedStream` if `payload` holds fewer than `total_bits`
///   bits, or the budget runs out in the middle of a code
/// - `CodecError::UnknownCode` if the bits leave the trie
pub fn unpack(payload: &[u8], total_bits: u64, trie: &DecodeTrie) -> Result<Vec<Symbol>> {
    let mut reader = BitReader::new(payload, total_bits).map_err(|_| CodecError::TruncatedStream {
        declared: total_bits,
        available: payload.len() as u64 * 8,
    })?;

    let mut symbols = Vec::new();
    let mut at = trie.root();
    let mut boundary = 0;
    while !reader.is_empty() {
        let bit = reader.read_bit()?;
        match trie.step(at, bit) {
            Step::Symbol(symbol) => {
                symbols.push(symbol);
                at = trie.root();
                boundary = reader.position();
            }
            Step::Partial(next) => at = next,
            Step::Dead => {
                return Err(CodecError::UnknownCode {
                    position: reader.position() - 1,
                }
                .into())
            }
        }
    }

    if at != trie.root() {
        // Budget ended inside a code; only bits up to the last symbol are usable
        return Err(CodecError::TruncatedStream {
            declared: total_bits,
            available: boundary,
        }
        .into());
    }

    debug!(symbols = symbols.len(), bits = total_bits, "unpacked payload");
    Ok(symbols)
}
