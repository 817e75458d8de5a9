//! Input handling for the command-line tool.
//!
//! Reads input files, splits them into symbols according to the configured
//! [`SymbolMode`], and turns decoded symbols back into bytes. When no input
//! file is given, sample text is generated with interesting compression
//! characteristics.
//!
//! # Sample design
//!
//! Generated text has:
//! - Some highly skewed sections (runs of one character)
//! - Some text-like sections (words over a limited alphabet)
//! - Some structured sections (repeating phrases)
//! - Some flat sections (uniform printable ASCII)
//!
//! This makes the code lengths and ratio visible in the statistics.

use huffpack_core::error::{Error, Result};
use huffpack_core::framing::{symbols_to_bytes, symbols_to_text};
use huffpack_core::Symbol;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::SymbolMode;

/// Split raw input into symbols.
///
/// # Errors
/// `Error::Config` if text mode is selected and the input is not UTF-8.
pub fn to_symbols(data: &[u8], mode: SymbolMode) -> Result<Vec<Symbol>> {
    match mode {
        SymbolMode::Bytes => Ok(data.iter().map(|&b| Symbol::from(b)).collect()),
        SymbolMode::Text => {
            let text = std::str::from_utf8(data).map_err(|e| {
                Error::Config(format!(
                    "input is not valid UTF-8 ({}); use --bytes for binary input",
                    e
                ))
            })?;
            Ok(text.chars().map(Symbol::from).collect())
        }
    }
}

/// Turn decoded symbols back into output bytes.
///
/// # Errors
/// `CodecError::InvalidSymbol` if a symbol cannot be represented in `mode`.
pub fn from_symbols(symbols: &[Symbol], mode: SymbolMode) -> Result<Vec<u8>> {
    match mode {
        SymbolMode::Bytes => symbols_to_bytes(symbols),
        SymbolMode::Text => Ok(symbols_to_text(symbols)?.into_bytes()),
    }
}

/// Generate sample ASCII text with mixed compressibility.
///
/// # Arguments
/// - `seed`: random seed for determinism
/// - `size_bytes`: exact size of generated data
pub fn generate_sample_text(seed: u64, size_bytes: usize) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = String::with_capacity(size_bytes);

    // Generate data in sections with different compressibility
    let mut remaining = size_bytes;

    while remaining > 0 {
        let section_size = remaining.min(2048);

        // Choose section type randomly
        let section_type: u8 = rng.gen_range(0..10);

        match section_type {
            // 20% highly skewed (runs of one character)
            0..=1 => {
                let c = rng.gen_range(b'a'..=b'z') as char;
                data.extend(std::iter::repeat(c).take(section_size));
            }

            // 40% text-like (words over a limited alphabet)
            2..=5 => {
                let alphabet = b"etaoinshrdlucmfwyp";
                let mut written = 0;
                while written < section_size {
                    let word_len = rng.gen_range(1..=8).min(section_size - written);
                    for _ in 0..word_len {
                        data.push(alphabet[rng.gen_range(0..alphabet.len())] as char);
                    }
                    written += word_len;
                    if written < section_size {
                        data.push(if rng.gen_bool(0.1) { '\n' } else { ' ' });
                        written += 1;
                    }
                }
            }

            // 20% structured (repeating phrases)
            6..=7 => {
                let phrase = generate_phrase(&mut rng);
                data.extend(phrase.chars().cycle().take(section_size));
            }

            // 20% flat (uniform printable ASCII)
            _ => {
                for _ in 0..section_size {
                    data.push(rng.gen_range(b' '..=b'~') as char);
                }
            }
        }

        remaining -= section_size;
    }

    data
}

/// Generate a short phrase to repeat.
fn generate_phrase(rng: &mut ChaCha8Rng) -> String {
    let phrase_len = rng.gen_range(4..=32);
    (0..phrase_len)
        .map(|_| rng.gen_range(b'A'..=b'Z') as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use huffpack_core::error::CodecError;

    #[test]
    fn test_generate_sample_text() {
        let data = generate_sample_text(42, 1000);
        assert_eq!(data.len(), 1000);
        assert!(data.is_ascii());
    }

    #[test]
    fn test_determinism() {
        let data1 = generate_sample_text(12345, 5000);
        let data2 = generate_sample_text(12345, 5000);

        assert_eq!(data1, data2);
    }

    #[test]
    fn test_different_seeds() {
        let data1 = generate_sample_text(1, 1000);
        let data2 = generate_sample_text(2, 1000);

        assert_ne!(data1, data2);
    }

    #[test]
    fn test_various_sizes() {
        for size in [0, 1, 100, 1000, 10000, 100000] {
            let data = generate_sample_text(999, size);
            assert_eq!(data.len(), size);
        }
    }

    #[test]
    fn test_text_symbols() {
        let symbols = to_symbols("aé☕".as_bytes(), SymbolMode::Text).unwrap();
        assert_eq!(symbols, vec![0x61, 0xE9, 0x2615]);
        assert_eq!(from_symbols(&symbols, SymbolMode::Text).unwrap(), "aé☕".as_bytes());
    }

    #[test]
    fn test_byte_symbols() {
        let data = [0u8, 255, 0xC3, 0x28];
        let symbols = to_symbols(&data, SymbolMode::Bytes).unwrap();
        assert_eq!(symbols, vec![0, 255, 0xC3, 0x28]);
        assert_eq!(from_symbols(&symbols, SymbolMode::Bytes).unwrap(), data);
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let result = to_symbols(&[0xC3, 0x28], SymbolMode::Text);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unrepresentable_symbols() {
        assert!(matches!(
            from_symbols(&[300], SymbolMode::Bytes),
            Err(Error::Codec(CodecError::InvalidSymbol { symbol: 300, .. }))
        ));
        assert!(matches!(
            from_symbols(&[0xD800], SymbolMode::Text),
            Err(Error::Codec(CodecError::InvalidSymbol { symbol: 0xD800, .. }))
        ));
    }
}
