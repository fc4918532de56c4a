//! Bit sequences and their byte-aligned packing.
//!
//! A [`BitString`] is an exact-length sequence of bits stored MSB-first, the
//! order in which prefix codes are written and read. Packing a bit string
//! into bytes splits it into 8-bit [`BitChunk`]s and right-pads the last one
//! with zeros.
//!
//! # Padding Rules
//! - [`bits_to_bytes`]: pads the final partial chunk with trailing zeros
//! - [`bytes_to_bits`]: has no way to tell padding from data; the caller must
//!   track the real bit count and [`BitString::truncate`] to it
//!
//! # Example
//! ```
//! use sfpack_core::bits::{bits_to_bytes, bytes_to_bits, BitString};
//!
//! let mut bits = BitString::new();
//! bits.push_bits(0b101, 3); // 1, 0, 1
//! bits.push_bits(0b11, 2); // 1, 1
//! // 10111 -> padded to 10111000
//!
//! let bytes = bits_to_bytes(&bits);
//! assert_eq!(bytes, vec![0b1011_1000]);
//!
//! let mut unpacked = bytes_to_bits(&bytes);
//! unpacked.truncate(5);
//! assert_eq!(unpacked, bits);
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of bits in one chunk of packed output.
pub const CHUNK_SIZE: usize = 8;

/// An exact-length bit sequence, packed MSB-first.
///
/// # Invariants
/// - `bytes.len() == ceil(len / 8)`
/// - every bit at or after `len` in the last byte is zero
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BitString {
    /// Packed bits, MSB of byte 0 first
    bytes: Vec<u8>,
    /// Number of valid bits
    len: usize,
}

impl BitString {
    /// Create an empty bit string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bit string with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(CHUNK_SIZE)),
            len: 0,
        }
    }

    /// Append the lowest `count` bits of `value`, most significant first.
    ///
    /// For example, `push_bits(0b101, 3)` appends 1, 0, 1. Counts above 64
    /// are clamped to 64.
    pub fn push_bits(&mut self, value: u64, count: u8) {
        let mut remaining = usize::from(count.min(64));

        while remaining > 0 {
            let bit_offset = self.len % CHUNK_SIZE;
            if bit_offset == 0 {
                self.bytes.push(0);
            }

            // How many bits fit in the current byte?
            let room = CHUNK_SIZE - bit_offset;
            let take = remaining.min(room);

            // Top `take` of the remaining bits of value
            let shift = remaining - take;
            let bits = ((value >> shift) & ((1u64 << take) - 1)) as u8;

            if let Some(last) = self.bytes.last_mut() {
                *last |= bits << (room - take);
            }

            self.len += take;
            remaining -= take;
        }
    }

    /// Append a single bit.
    pub fn push_bit(&mut self, bit: bool) {
        self.push_bits(u64::from(bit), 1);
    }

    /// Return the bit at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        let byte = self.bytes[index / CHUNK_SIZE];
        Some(byte & (0x80 >> (index % CHUNK_SIZE)) != 0)
    }

    /// Shorten to `len` bits, zeroing the bits that fall off the last byte.
    ///
    /// Has no effect if `len` is not shorter than the current length.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        self.len = len;
        self.bytes.truncate(len.div_ceil(CHUNK_SIZE));

        let tail = len % CHUNK_SIZE;
        if tail != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= 0xFFu8 << (CHUNK_SIZE - tail);
            }
        }
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the string holds no bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Packed bytes; the last one is zero-padded.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Iterate over the bits in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// Split into 8-bit chunks, the last one right-padded with zeros.
    pub fn chunks(&self) -> impl Iterator<Item = BitChunk> + '_ {
        self.bytes.iter().copied().map(BitChunk)
    }

    /// Start a reader at the first bit.
    pub fn reader(&self) -> BitReader<'_> {
        BitReader::new(self)
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// A character other than `0` or `1` in a textual bit string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid bit character {found:?} at position {position}")]
pub struct ParseBitStringError {
    pub found: char,
    pub position: usize,
}

impl FromStr for BitString {
    type Err = ParseBitStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = BitString::with_capacity(s.len());
        for (position, found) in s.chars().enumerate() {
            match found {
                '0' => bits.push_bit(false),
                '1' => bits.push_bit(true),
                _ => return Err(ParseBitStringError { found, position }),
            }
        }
        Ok(bits)
    }
}

/// One 8-bit group of a packed bit string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitChunk(pub u8);

impl BitChunk {
    /// The chunk as a byte, first bit in the MSB.
    pub fn byte(self) -> u8 {
        self.0
    }
}

impl fmt::Display for BitChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08b}", self.0)
    }
}

/// Pack a bit string into bytes, zero-padding the final chunk.
pub fn bits_to_bytes(bits: &BitString) -> Vec<u8> {
    bits.chunks().map(BitChunk::byte).collect()
}

/// Unpack bytes into a bit string of exactly `bytes.len() * 8` bits.
///
/// Padding bits come back as data; truncate to the real length afterwards.
pub fn bytes_to_bits(bytes: &[u8]) -> BitString {
    BitString {
        bytes: bytes.to_vec(),
        len: bytes.len() * CHUNK_SIZE,
    }
}

/// Reads bits one at a time from a [`BitString`].
///
/// # Invariants
/// - `position` never exceeds `bits.len()`
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bits: &'a BitString,
    /// Index of the next bit to read
    position: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the first bit.
    pub fn new(bits: &'a BitString) -> Self {
        Self { bits, position: 0 }
    }

    /// Read the next bit, or `None` once every bit has been read.
    pub fn read_bit(&mut self) -> Option<bool> {
        let bit = self.bits.get(self.position)?;
        self.position += 1;
        Some(bit)
    }

    /// Number of bits not yet read.
    pub fn bits_remaining(&self) -> usize {
        self.bits.len() - self.position
    }

    /// Index of the next bit to read.
    pub fn position(&self) -> usize {
        self.position
    }

    /// True once every bit has been read.
    pub fn is_empty(&self) -> bool {
        self.position >= self.bits.len()
    }
}
