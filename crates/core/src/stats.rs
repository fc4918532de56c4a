//! Statistics for a pack or unpack run.
//!
//! Records what went in, what came out, and how well the code table fits
//! the text:
//! - Sizes (input bytes and symbols, table bytes, payload bits, container bytes)
//! - Compression ratio and bits per symbol
//! - Average code length against the entropy of the symbol distribution
//! - Timing
//!
//! Stats are filled in by the caller after each stage; nothing here is
//! shared between threads.

use std::time::{Duration, Instant};

use crate::container::{Container, HEADER_SIZE};
use crate::table::EncodingTable;

/// Sizes and timing for one encode or decode.
#[derive(Debug, Clone)]
pub struct Stats {
    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    // === Text ===
    /// UTF-8 bytes of text
    pub input_bytes: u64,

    /// Symbols (chars) of text
    pub input_symbols: u64,

    /// Symbols actually encoded; differs from `input_symbols` when the text
    /// was case folded first
    pub encoded_symbols: u64,

    /// Distinct symbols in the table
    pub distinct_symbols: u64,

    // === Container ===
    /// Serialized table bytes
    pub table_bytes: u64,

    /// Payload bits before padding
    pub payload_bits: u64,

    /// Total container bytes
    pub container_bytes: u64,

    // === Code quality ===
    /// Code length averaged over symbol occurrences
    pub average_code_len: f64,

    /// Shannon entropy of the symbol distribution, bits per symbol
    pub entropy: f64,
}

impl Stats {
    /// Create empty stats with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            input_bytes: 0,
            input_symbols: 0,
            encoded_symbols: 0,
            distinct_symbols: 0,
            table_bytes: 0,
            payload_bits: 0,
            container_bytes: 0,
            average_code_len: 0.0,
            entropy: 0.0,
        }
    }

    /// Record the text as given, before any preprocessing.
    pub fn set_input(&mut self, text: &str) {
        self.input_bytes = text.len() as u64;
        self.input_symbols = text.chars().count() as u64;
    }

    /// Fill in everything known once a container exists.
    ///
    /// `container_bytes` is the length of its serialized form.
    pub fn record(&mut self, container: &Container, container_bytes: usize) {
        let table = &container.table;
        self.encoded_symbols = table.total_quantity();
        self.distinct_symbols = table.len() as u64;
        self.payload_bits = u64::from(container.bit_len);
        self.container_bytes = container_bytes as u64;
        self.table_bytes =
            container_bytes.saturating_sub(HEADER_SIZE + container.payload.len()) as u64;
        self.average_code_len = table.average_code_len();
        self.entropy = entropy(table);
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

    /// Compute compression ratio (container / input).
    ///
    /// Returns 0.0 if there was no input.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            0.0
        } else {
            self.container_bytes as f64 / self.input_bytes as f64
        }
    }

    /// Payload bits per input symbol, excluding header and table.
    ///
    /// Counted against the text as given, so case folding overhead shows up
    /// here.
    pub fn bits_per_symbol(&self) -> f64 {
        if self.input_symbols == 0 {
            0.0
        } else {
            self.payload_bits as f64 / self.input_symbols as f64
        }
    }

    /// Compute throughput in input bytes/second.
    pub fn throughput_bps(&self) -> f64 {
        let duration_secs = self.duration().as_secs_f64();
        if duration_secs == 0.0 {
            0.0
        } else {
            self.input_bytes as f64 / duration_secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!();

        println!("=== Text ===");
        println!("Bytes: {}", self.input_bytes);
        println!("Symbols: {}", self.input_symbols);
        if self.encoded_symbols != self.input_symbols {
            println!("Encoded symbols: {}", self.encoded_symbols);
        }
        println!("Distinct symbols: {}", self.distinct_symbols);
        println!();

        println!("=== Container ===");
        println!("Table: {} bytes", self.table_bytes);
        println!(
            "Payload: {} bits ({} bytes)",
            self.payload_bits,
            self.payload_bits.div_ceil(8)
        );
        println!("Total: {} bytes", self.container_bytes);
        println!("Ratio: {:.1}%", self.compression_ratio() * 100.0);
        println!();

        println!("=== Code ===");
        println!("Bits per symbol: {:.3}", self.bits_per_symbol());
        println!("Average code length: {:.3}", self.average_code_len);
        println!("Entropy: {:.3}", self.entropy);
        println!();

        println!("=== Performance ===");
        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
        println!();
    }

    /// Export stats as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             input_bytes={}\n\
             input_symbols={}\n\
             encoded_symbols={}\n\
             distinct_symbols={}\n\
             table_bytes={}\n\
             payload_bits={}\n\
             container_bytes={}\n\
             compression_ratio={:.4}\n\
             average_code_len={:.4}\n\
             entropy={:.4}\n",
            self.duration().as_millis(),
            self.input_bytes,
            self.input_symbols,
            self.encoded_symbols,
            self.distinct_symbols,
            self.table_bytes,
            self.payload_bits,
            self.container_bytes,
            self.compression_ratio(),
            self.average_code_len,
            self.entropy,
        )
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

/// Shannon entropy, in bits per symbol, of the table's quantities.
///
/// This is the lower bound on the average code length of any prefix code
/// for the same distribution.
pub fn entropy(table: &EncodingTable) -> f64 {
    let total = table.total_quantity();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;

    table
        .iter()
        .filter(|e| e.quantity > 0)
        .map(|e| {
            let p = e.quantity as f64 / total;
            -p * p.log2()
        })
        .sum()
}
