//! The encoding table: symbol to prefix code, and back.
//!
//! A table holds one [`CodeEntry`] per distinct symbol. Encoding looks the
//! symbol up directly; decoding reads bits one at a time and looks up the
//! `(value, length)` pair read so far until it hits a code. Because the
//! codes are prefix-free, the first hit is the only possible one.
//!
//! # Serialized Format
//!
//! ```text
//! +---------------------+
//! | entry count (4)     |  u32 big-endian
//! +---------------------+
//! | per entry:          |
//! |   symbol (4)        |  u32 Unicode scalar value
//! |   quantity (8)      |  u64 occurrences in the source text
//! |   code length (1)   |  1..=64
//! |   code value (n)    |  ceil(length / 8) bytes, big-endian
//! +---------------------+
//! | crc32 (4)           |  checksum of every byte above
//! +---------------------+
//! ```
//!
//! Entries are written in table order, which is the order the builder
//! assigned codes in, so serialization is deterministic.

use std::collections::HashMap;

use crate::bits::{BitReader, BitString};
use crate::error::{CorruptStreamError, Error, Result};

/// Longest code a table can hold.
pub const MAX_CODE_LEN: u8 = 64;

/// Fixed bytes per entry before the code value.
const ENTRY_FIXED_SIZE: usize = 4 + 8 + 1;

/// A symbol and the prefix code assigned to it.
///
/// `bits` holds the code in its lowest `len` bits; the first bit of the code
/// is the most significant of those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeEntry {
    pub symbol: char,
    /// Occurrences of the symbol in the text the table was built from
    pub quantity: u64,
    pub bits: u64,
    pub len: u8,
}

impl CodeEntry {
    /// An entry with no code assigned yet.
    pub fn new(symbol: char, quantity: u64) -> Self {
        Self {
            symbol,
            quantity,
            bits: 0,
            len: 0,
        }
    }

    /// The code as a bit string.
    pub fn code(&self) -> BitString {
        let mut code = BitString::with_capacity(usize::from(self.len));
        code.push_bits(self.bits, self.len);
        code
    }

    /// True if this code is a prefix of (or equal to) `other`'s code.
    pub fn is_prefix_of(&self, other: &CodeEntry) -> bool {
        if self.len == 0 || self.len > other.len {
            return false;
        }
        let shift = u32::from(other.len - self.len);
        other.bits.checked_shr(shift).unwrap_or(0) == self.bits
    }
}

/// Produces an encoding table for a text.
///
/// The container codec is generic over this so that other table builders
/// can be plugged in next to [`crate::shannon_fano::ShannonFano`].
pub trait TableGenerator {
    fn generate(&self, text: &str) -> Result<EncodingTable>;
}

/// Symbol to code mapping used for both directions.
///
/// Immutable once built. Decoding indexes codes by `(value, length)` so a
/// lookup per bit read is enough to find the unique matching entry.
#[derive(Debug, Clone, Default)]
pub struct EncodingTable {
    /// Entries in builder order
    entries: Vec<CodeEntry>,
    /// Symbol -> index into `entries`
    by_symbol: HashMap<char, usize>,
    /// (code value, code length) -> index into `entries`
    by_code: HashMap<(u64, u8), usize>,
    /// Length of the longest code
    max_len: u8,
}

impl EncodingTable {
    /// Build a table from entries with codes already assigned.
    ///
    /// # Errors
    /// `CorruptStream` if a symbol or code appears twice, a code length is
    /// outside `1..=64`, or a code value has bits set above its length.
    pub fn from_entries(entries: Vec<CodeEntry>) -> Result<Self> {
        let mut by_symbol = HashMap::with_capacity(entries.len());
        let mut by_code = HashMap::with_capacity(entries.len());
        let mut max_len = 0;

        for (index, entry) in entries.iter().enumerate() {
            if entry.len == 0 || entry.len > MAX_CODE_LEN {
                return Err(CorruptStreamError::InvalidCodeLength {
                    symbol: entry.symbol,
                    length: entry.len,
                }
                .into());
            }
            if entry.len < MAX_CODE_LEN && entry.bits >> entry.len != 0 {
                return Err(CorruptStreamError::CodeOverflow {
                    symbol: entry.symbol,
                }
                .into());
            }
            if by_symbol.insert(entry.symbol, index).is_some() {
                return Err(CorruptStreamError::DuplicateSymbol(entry.symbol).into());
            }
            if by_code.insert((entry.bits, entry.len), index).is_some() {
                return Err(CorruptStreamError::DuplicateCode {
                    bits: entry.bits,
                    length: entry.len,
                }
                .into());
            }
            max_len = max_len.max(entry.len);
        }

        Ok(Self {
            entries,
            by_symbol,
            by_code,
            max_len,
        })
    }

    /// Code entry for `symbol`.
    ///
    /// # Errors
    /// `UnknownSymbol` if the table was not built from a text containing it.
    pub fn bits_for(&self, symbol: char) -> Result<&CodeEntry> {
        self.get(symbol).ok_or(Error::UnknownSymbol(symbol))
    }

    /// Code entry for `symbol`, if present.
    pub fn get(&self, symbol: char) -> Option<&CodeEntry> {
        self.by_symbol.get(&symbol).map(|&i| &self.entries[i])
    }

    /// Decode one symbol starting at the reader's position.
    ///
    /// Returns the symbol and the number of bits it consumed.
    ///
    /// # Errors
    /// `CorruptStream` if the reader runs out of bits, or the bits read grow
    /// longer than any code, before a code matches.
    pub fn decode_one(&self, reader: &mut BitReader<'_>) -> Result<(char, usize)> {
        let start = reader.position();
        let mut value = 0u64;
        let mut len = 0u8;

        while len < self.max_len {
            let Some(bit) = reader.read_bit() else {
                break;
            };
            value = (value << 1) | u64::from(bit);
            len += 1;

            if let Some(&index) = self.by_code.get(&(value, len)) {
                return Ok((self.entries[index].symbol, usize::from(len)));
            }
        }

        Err(CorruptStreamError::UnmatchedCode { position: start }.into())
    }

    /// Encode `text` into a bit string.
    pub fn encode(&self, text: &str) -> Result<BitString> {
        let mut bits = BitString::with_capacity(text.len());
        for symbol in text.chars() {
            let entry = self.bits_for(symbol)?;
            bits.push_bits(entry.bits, entry.len);
        }
        Ok(bits)
    }

    /// Decode every bit of `bits` back into text.
    ///
    /// # Errors
    /// `CorruptStream` if the bits end in the middle of a code or contain a
    /// sequence no code matches.
    pub fn decode(&self, bits: &BitString) -> Result<String> {
        let mut reader = bits.reader();
        let mut text = String::new();

        while !reader.is_empty() {
            let (symbol, _) = self.decode_one(&mut reader)?;
            text.push(symbol);
        }

        Ok(text)
    }

    /// Entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = &CodeEntry> {
        self.entries.iter()
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length of the longest code, 0 for an empty table.
    pub fn max_code_len(&self) -> u8 {
        self.max_len
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    /// Code length averaged over symbol occurrences.
    ///
    /// Returns 0.0 for an empty table.
    pub fn average_code_len(&self) -> f64 {
        let total = self.total_quantity();
        if total == 0 {
            return 0.0;
        }
        let weighted: u128 = self
            .entries
            .iter()
            .map(|e| u128::from(e.quantity) * u128::from(e.len))
            .sum();
        weighted as f64 / total as f64
    }

    /// Serialize the table for embedding in a container.
    pub fn serialize(&self) -> Vec<u8> {
        let size = 4
            + self
                .entries
                .iter()
                .map(|e| ENTRY_FIXED_SIZE + code_bytes(e.len))
                .sum::<usize>()
            + 4;
        let mut out = Vec::with_capacity(size);

        out.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());
        for entry in &self.entries {
            out.extend_from_slice(&u32::from(entry.symbol).to_be_bytes());
            out.extend_from_slice(&entry.quantity.to_be_bytes());
            out.push(entry.len);
            let value = entry.bits.to_be_bytes();
            out.extend_from_slice(&value[value.len() - code_bytes(entry.len)..]);
        }

        let crc = crc32fast::hash(&out);
        out.extend_from_slice(&crc.to_be_bytes());
        out
    }

    /// Parse a table written by [`EncodingTable::serialize`].
    ///
    /// # Errors
    /// `CorruptStream` for truncated input, a checksum mismatch, invalid
    /// symbols or code lengths, duplicates, or bytes left over.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        const MIN_SIZE: usize = 4 + 4;

        if bytes.len() < MIN_SIZE {
            return Err(CorruptStreamError::TableTruncated {
                needed: MIN_SIZE,
                available: bytes.len(),
            }
            .into());
        }

        let (body, crc_bytes) = bytes.split_at(bytes.len() - 4);
        let expected = u32::from_be_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
        let actual = crc32fast::hash(body);
        if expected != actual {
            return Err(CorruptStreamError::TableChecksum { expected, actual }.into());
        }

        let mut reader = ByteReader::new(body);
        let count = reader.read_u32()? as usize;

        // The count is untrusted until the entries are actually there
        let mut entries = Vec::with_capacity(count.min(body.len() / ENTRY_FIXED_SIZE));
        for _ in 0..count {
            let raw_symbol = reader.read_u32()?;
            let symbol =
                char::from_u32(raw_symbol).ok_or(CorruptStreamError::InvalidSymbol(raw_symbol))?;
            let quantity = reader.read_u64()?;
            let len = reader.read_u8()?;
            if len == 0 || len > MAX_CODE_LEN {
                return Err(CorruptStreamError::InvalidCodeLength {
                    symbol,
                    length: len,
                }
                .into());
            }

            let bits = reader
                .take(code_bytes(len))?
                .iter()
                .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));

            entries.push(CodeEntry {
                symbol,
                quantity,
                bits,
                len,
            });
        }

        if reader.remaining() > 0 {
            return Err(CorruptStreamError::TrailingTableBytes(reader.remaining()).into());
        }

        Self::from_entries(entries)
    }
}

impl PartialEq for EncodingTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for EncodingTable {}

/// Bytes needed to store a code of `len` bits.
fn code_bytes(len: u8) -> usize {
    usize::from(len).div_ceil(8)
}

/// Bounds-checked big-endian reads over the table body.
struct ByteReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.position + n;
        if end > self.bytes.len() {
            return Err(CorruptStreamError::TableTruncated {
                needed: end,
                available: self.bytes.len(),
            }
            .into());
        }
        let slice = &self.bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_be_bytes(buf))
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }
}
