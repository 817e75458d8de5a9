//! Coding statistics.
//!
//! Summarizes one encode (or decode) run: alphabet size, code lengths, how
//! close the code gets to the entropy bound, and where the frame bytes go.
//!
//! Collected in a plain struct filled in once per run; not thread-safe.

use std::time::{Duration, Instant};

use crate::codes::CodeTable;
use crate::tree::FrequencyTable;

/// Statistics for a single coding run.
#[derive(Debug, Clone)]
pub struct CodingStats {
    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    // === Input ===
    /// Raw input size in bytes
    pub input_bytes: u64,

    /// Number of symbols in the input stream
    pub symbols: u64,

    /// Number of distinct symbols (code table size)
    pub distinct_symbols: usize,

    // === Code ===
    /// Longest code in bits
    pub max_code_len: usize,

    /// Shannon entropy of the symbol distribution, bits per symbol
    pub entropy_bits: f64,

    // === Frame ===
    /// Header size including the terminator line
    pub header_bytes: u64,

    /// Packed payload size
    pub payload_bytes: u64,

    /// Valid bits in the payload
    pub payload_bits: u64,

    /// Complete frame size (header + payload + trailer)
    pub frame_bytes: u64,
}

impl CodingStats {
    /// Create empty stats with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            input_bytes: 0,
            symbols: 0,
            distinct_symbols: 0,
            max_code_len: 0,
            entropy_bits: 0.0,
            header_bytes: 0,
            payload_bytes: 0,
            payload_bits: 0,
            frame_bytes: 0,
        }
    }

    /// Record the frequency table and the code derived from it.
    pub fn record_code(&mut self, freqs: &FrequencyTable, table: &CodeTable) {
        self.symbols = freqs.values().sum();
        self.distinct_symbols = table.len();
        self.max_code_len = table.max_code_len();
        self.entropy_bits = entropy(freqs);
    }

    /// Record frame section sizes.
    pub fn record_frame(&mut self, header_bytes: usize, payload_bits: u64, frame_bytes: usize) {
        self.header_bytes = header_bytes as u64;
        self.payload_bits = payload_bits;
        self.payload_bytes = payload_bits.div_ceil(8);
        self.frame_bytes = frame_bytes as u64;
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Average code length in bits per symbol.
    ///
    /// Returns 0.0 if no symbols were coded.
    pub fn average_code_len(&self) -> f64 {
        if self.symbols == 0 {
            0.0
        } else {
            self.payload_bits as f64 / self.symbols as f64
        }
    }

    /// Compute compression ratio (frame / raw input).
    ///
    /// Returns 0.0 if there was no input.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            0.0
        } else {
            self.frame_bytes as f64 / self.input_bytes as f64
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Coding Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!();

        println!("=== Input ===");
        println!("Bytes: {}", self.input_bytes);
        println!("Symbols: {}", self.symbols);
        println!("Distinct symbols: {}", self.distinct_symbols);
        println!();

        println!("=== Code ===");
        println!("Longest code: {} bits", self.max_code_len);
        println!("Average code: {:.3} bits/symbol", self.average_code_len());
        println!("Entropy: {:.3} bits/symbol", self.entropy_bits);
        println!();

        println!("=== Frame ===");
        println!("Header: {} bytes", self.header_bytes);
        println!("Payload: {} bytes ({} bits)", self.payload_bytes, self.payload_bits);
        println!("Frame: {} bytes", self.frame_bytes);
        println!("Ratio: {:.1}%", self.compression_ratio() * 100.0);
        println!();
    }

    /// Export stats as a simple `key=value` text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             input_bytes={}\n\
             symbols={}\n\
             distinct_symbols={}\n\
             max_code_len={}\n\
             average_code_len={:.4}\n\
             entropy_bits={:.4}\n\
             header_bytes={}\n\
             payload_bytes={}\n\
             payload_bits={}\n\
             frame_bytes={}\n\
             compression_ratio={:.4}\n",
            self.duration().as_millis(),
            self.input_bytes,
            self.symbols,
            self.distinct_symbols,
            self.max_code_len,
            self.average_code_len(),
            self.entropy_bits,
            self.header_bytes,
            self.payload_bytes,
            self.payload_bits,
            self.frame_bytes,
            self.compression_ratio(),
        )
    }
}

impl Default for CodingStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Shannon entropy in bits per symbol.
pub fn entropy(freqs: &FrequencyTable) -> f64 {
    let total: u64 = freqs.values().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    freqs
        .values()
        .filter(|&&w| w > 0)
        .map(|&w| {
            let p = w as f64 / total;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{build_tree, Symbol};

    fn freqs(pairs: &[(char, u64)]) -> FrequencyTable {
        pairs.iter().map(|&(c, w)| (c as Symbol, w)).collect()
    }

    #[test]
    fn test_stats_creation() {
        let stats = CodingStats::new();
        assert!(stats.end_time.is_none());
        assert_eq!(stats.average_code_len(), 0.0);
        assert_eq!(stats.compression_ratio(), 0.0);
    }

    #[test]
    fn test_entropy() {
        assert_eq!(entropy(&FrequencyTable::new()), 0.0);
        assert_eq!(entropy(&freqs(&[('a', 10)])), 0.0);
        assert!((entropy(&freqs(&[('a', 1), ('b', 1)])) - 1.0).abs() < 1e-12);
        assert!((entropy(&freqs(&[('a', 1), ('b', 1), ('c', 1), ('d', 1)])) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_record_code_and_frame() {
        let table_freqs = freqs(&[('a', 5), ('b', 9), ('c', 12), ('d', 13), ('e', 16), ('f', 45)]);
        let tree = build_tree(&table_freqs).unwrap();
        let table = CodeTable::from_tree(&tree);

        let mut stats = CodingStats::new();
        stats.input_bytes = 100;
        stats.record_code(&table_freqs, &table);
        stats.record_frame(60, table.weighted_length(&table_freqs).unwrap(), 97);
        stats.complete();

        assert_eq!(stats.symbols, 100);
        assert_eq!(stats.distinct_symbols, 6);
        assert_eq!(stats.max_code_len, 4);
        assert_eq!(stats.payload_bits, 224);
        assert_eq!(stats.payload_bytes, 28);
        assert!((stats.average_code_len() - 2.24).abs() < 1e-12);
        // Optimal code is within one bit of the entropy
        assert!(stats.entropy_bits <= stats.average_code_len());
        assert!(stats.average_code_len() < stats.entropy_bits + 1.0);
        assert!((stats.compression_ratio() - 0.97).abs() < 1e-12);
        assert!(stats.end_time.is_some());
    }

    #[test]
    fn test_export_text() {
        let mut stats = CodingStats::new();
        stats.symbols = 8;
        stats.payload_bits = 16;
        let text = stats.export_text();
        assert!(text.contains("symbols=8\n"));
        assert!(text.contains("payload_bits=16\n"));
        assert!(text.contains("average_code_len=2.0000\n"));
    }
}
