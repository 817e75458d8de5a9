//! Frame serialization and parsing.
//!
//! A frame packages a code table with the payload packed through it, plus the
//! metadata needed to know exactly where the payload ends.
//!
//! # Frame Format
//!
//! ```text
//! +-----------------------------+
//! | "<symbol>\t<code>\n" ...    |  one line per symbol, ascending symbol,
//! |                             |  symbol in decimal, code as 0/1 chars
//! +-----------------------------+
//! | "***HEADER*END***\n"        |  header terminator
//! +-----------------------------+
//! | payload (variable)          |  packed bits, last byte left-justified
//! +-----------------------------+
//! | last_byte_bits (1)          |  valid bits in final payload byte (0 = aligned)
//! +-----------------------------+
//! | total_bits (8)              |  u64 little-endian, valid payload bits
//! +-----------------------------+
//! ```
//!
//! The decoder stops strictly at `total_bits`. `last_byte_bits` is redundant
//! with it and is checked for consistency.

use tracing::debug;

use crate::bitio::{pack, unpack, PackedBits};
use crate::codes::{Code, CodeTable, DecodeTrie};
use crate::error::{CodecError, Error, FramingError, HeaderError, Result};
use crate::tree::{build_tree, tally, FrequencyTable, Symbol};

/// Sentinel line closing the header, newline included.
pub const HEADER_TERMINATOR: &[u8] = b"***HEADER*END***\n";

/// Size of the trailer (last_byte_bits + total_bits) in bytes.
pub const TRAILER_SIZE: usize = 9;

/// A parsed frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Validated code table from the header
    pub table: CodeTable,

    /// Packed payload and its valid bit count
    pub payload: PackedBits,

    /// Size of the header including the terminator line
    pub header_len: usize,

    trie: DecodeTrie,
}

impl Frame {
    /// Decode the payload back into symbols.
    pub fn decode(&self) -> Result<Vec<Symbol>> {
        unpack(&self.payload.bytes, self.payload.total_bits, &self.trie)
    }
}

/// Serialize the header section (entries + terminator).
pub fn serialize_header(table: &CodeTable) -> Vec<u8> {
    let mut header = Vec::new();
    for (symbol, code) in table.iter() {
        header.extend_from_slice(format!("{}\t{}\n", symbol, code).as_bytes());
    }
    header.extend_from_slice(HEADER_TERMINATOR);
    header
}

/// Serialize a complete frame.
pub fn serialize_frame(table: &CodeTable, packed: &PackedBits) -> Vec<u8> {
    let header = serialize_header(table);

    let mut frame = Vec::with_capacity(header.len() + packed.bytes.len() + TRAILER_SIZE);
    frame.extend_from_slice(&header);
    frame.extend_from_slice(&packed.bytes);
    frame.push(packed.last_byte_bits());
    frame.extend_from_slice(&packed.total_bits.to_le_bytes());

    debug!(
        header_bytes = header.len(),
        payload_bytes = packed.bytes.len(),
        frame_bytes = frame.len(),
        "serialized frame"
    );
    frame
}

/// Parse the header section.
///
/// Returns the validated table and the number of bytes the header occupies.
///
/// # Errors
/// `Error::MalformedHeader` for any format or table violation.
pub fn parse_header(bytes: &[u8]) -> Result<(CodeTable, usize)> {
    let mut entries = Vec::new();
    let mut offset = 0;
    let mut line_no = 0;

    loop {
        let rest = &bytes[offset..];
        let Some(newline) = rest.iter().position(|&b| b == b'\n') else {
            return Err(HeaderError::MissingTerminator.into());
        };
        let line = &rest[..=newline];
        offset += line.len();
        line_no += 1;

        if line == HEADER_TERMINATOR {
            break;
        }
        entries.push(parse_entry(&line[..newline], line_no)?);
    }

    let table = CodeTable::from_entries(entries)?;
    Ok((table, offset))
}

/// Parse one `<symbol>\t<code>` line (without its newline).
fn parse_entry(line: &[u8], line_no: usize) -> Result<(Symbol, Code)> {
    let text = std::str::from_utf8(line).map_err(|_| HeaderError::BadLine { line: line_no })?;
    let (symbol_text, code_text) = text
        .split_once('\t')
        .ok_or(HeaderError::BadLine { line: line_no })?;

    if symbol_text.is_empty() || !symbol_text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad_symbol(line_no, symbol_text));
    }
    let symbol: Symbol = symbol_text
        .parse()
        .map_err(|_| bad_symbol(line_no, symbol_text))?;
    let code = Code::parse(code_text).ok_or_else(|| HeaderError::BadCode {
        line: line_no,
        text: code_text.to_string(),
    })?;

    Ok((symbol, code))
}

fn bad_symbol(line: usize, text: &str) -> Error {
    HeaderError::BadSymbol {
        line,
        text: text.to_string(),
    }
    .into()
}

/// Parse a frame from bytes.
///
/// The header is fully validated before the payload is looked at.
///
/// # Errors
/// - `Error::MalformedHeader` if the header is malformed or not prefix-free
/// - `FramingError::FrameTooShort` if the trailer is missing
/// - `CodecError::TruncatedStream` if the payload is shorter than declared
/// - `FramingError::PayloadLengthMismatch` if the payload is longer than declared
/// - `FramingError::TrailerMismatch` if the trailer byte is inconsistent
pub fn parse_frame(bytes: &[u8]) -> Result<Frame> {
    let (table, header_len) = parse_header(bytes)?;
    let trie = table.trie()?;

    let body = &bytes[header_len..];
    if body.len() < TRAILER_SIZE {
        return Err(FramingError::FrameTooShort {
            required: TRAILER_SIZE,
            actual: body.len(),
        }
        .into());
    }

    let (payload, trailer) = body.split_at(body.len() - TRAILER_SIZE);
    let last_byte_bits = trailer[0];
    let mut total = [0u8; 8];
    total.copy_from_slice(&trailer[1..]);
    let total_bits = u64::from_le_bytes(total);

    let available = payload.len() as u64 * 8;
    if total_bits > available {
        return Err(CodecError::TruncatedStream {
            declared: total_bits,
            available,
        }
        .into());
    }
    let expected_len = total_bits.div_ceil(8) as usize;
    if payload.len() != expected_len {
        return Err(FramingError::PayloadLengthMismatch {
            expected: expected_len,
            actual: payload.len(),
        }
        .into());
    }

    let trailing = (total_bits % 8) as u8;
    let consistent =
        last_byte_bits == trailing || (last_byte_bits == 8 && trailing == 0 && total_bits > 0);
    if !consistent {
        return Err(FramingError::TrailerMismatch {
            last_byte_bits,
            total_bits,
        }
        .into());
    }

    Ok(Frame {
        table,
        payload: PackedBits {
            bytes: payload.to_vec(),
            total_bits,
        },
        header_len,
        trie,
    })
}

/// A freshly encoded frame with the table and payload it was built from.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    pub table: CodeTable,
    pub payload: PackedBits,
    pub header_len: usize,
    pub bytes: Vec<u8>,
}

/// Build the code for `freqs` and encode `symbols`, keeping the intermediates.
///
/// Every symbol must appear in `freqs`.
pub fn encode_frame(symbols: &[Symbol], freqs: &FrequencyTable) -> Result<EncodedFrame> {
    let tree = build_tree(freqs)?;
    let table = CodeTable::from_tree(&tree);
    let payload = pack(symbols, &table)?;
    let header_len = serialize_header(&table).len();
    let bytes = serialize_frame(&table, &payload);
    Ok(EncodedFrame {
        table,
        payload,
        header_len,
        bytes,
    })
}

/// Build the code for `freqs` and encode `symbols` into a frame.
///
/// Every symbol must appear in `freqs`.
pub fn encode_symbols(symbols: &[Symbol], freqs: &FrequencyTable) -> Result<Vec<u8>> {
    Ok(encode_frame(symbols, freqs)?.bytes)
}

/// Tally `symbols`, then encode them into a frame.
///
/// # Errors
/// `TreeError::EmptyInput` if `symbols` is empty.
pub fn compress_symbols(symbols: &[Symbol]) -> Result<Vec<u8>> {
    let freqs = tally(symbols.iter().copied());
    encode_symbols(symbols, &freqs)
}

/// Parse and decode a frame back into symbols.
pub fn decompress_symbols(frame: &[u8]) -> Result<Vec<Symbol>> {
    parse_frame(frame)?.decode()
}

/// Compress text, one symbol per Unicode scalar value.
pub fn compress_text(text: &str) -> Result<Vec<u8>> {
    let symbols: Vec<Symbol> = text.chars().map(Symbol::from).collect();
    compress_symbols(&symbols)
}

/// Decompress a frame produced by [`compress_text`].
///
/// # Errors
/// `CodecError::InvalidSymbol` if a decoded symbol is not a Unicode scalar value.
pub fn decompress_text(frame: &[u8]) -> Result<String> {
    symbols_to_text(&decompress_symbols(frame)?)
}

/// Compress raw bytes, one symbol per byte.
pub fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let symbols: Vec<Symbol> = data.iter().map(|&b| Symbol::from(b)).collect();
    compress_symbols(&symbols)
}

/// Decompress a frame produced by [`compress_bytes`].
///
/// # Errors
/// `CodecError::InvalidSymbol` if a decoded symbol does not fit in a byte.
pub fn decompress_bytes(frame: &[u8]) -> Result<Vec<u8>> {
    symbols_to_bytes(&decompress_symbols(frame)?)
}

/// Turn decoded symbols into text, one char per symbol.
pub fn symbols_to_text(symbols: &[Symbol]) -> Result<String> {
    symbols
        .iter()
        .map(|&symbol| {
            char::from_u32(symbol).ok_or_else(|| {
                Error::from(CodecError::InvalidSymbol {
                    symbol,
                    kind: "Unicode scalar value",
                })
            })
        })
        .collect()
}

/// Turn decoded symbols into bytes, one byte per symbol.
pub fn symbols_to_bytes(symbols: &[Symbol]) -> Result<Vec<u8>> {
    symbols
        .iter()
        .map(|&symbol| {
            u8::try_from(symbol).map_err(|_| {
                Error::from(CodecError::InvalidSymbol {
                    symbol,
                    kind: "byte",
                })
            })
        })
        .collect()
}
