//! Container serialization and parsing.
//!
//! A container packages a text's encoding table with its packed payload so
//! it can be decoded without any outside information:
//! - Header: table length in bytes and payload length in bits
//! - Table: the serialized [`EncodingTable`]
//! - Payload: the encoded bits, zero-padded to a whole byte
//!
//! # Container Format
//!
//! ```text
//! +------------------+
//! | table_len (4)    |  u32 big-endian, bytes of serialized table
//! +------------------+
//! | bit_len (4)      |  u32 big-endian, bits of payload before padding
//! +------------------+
//! | table            |  table_len bytes
//! | (variable)       |
//! +------------------+
//! | payload          |  ceil(bit_len / 8) bytes, last byte zero-padded
//! | (variable)       |
//! +------------------+
//! ```
//!
//! The bit length is what lets decode tell padding from data: once packed,
//! trailing zero padding looks exactly like encoded zero bits.

use crate::bits::{bits_to_bytes, bytes_to_bits, BitString, CHUNK_SIZE};
use crate::error::{CorruptStreamError, Error, HeaderError, Result};
use crate::shannon_fano::ShannonFano;
use crate::table::{EncodingTable, TableGenerator};

/// Size of the container header in bytes
pub const HEADER_SIZE: usize = 8;

/// A parsed container: the table and the payload it decodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Table the payload was encoded with
    pub table: EncodingTable,

    /// Number of meaningful payload bits
    pub bit_len: u32,

    /// Packed payload, `ceil(bit_len / 8)` bytes
    pub payload: Vec<u8>,
}

impl Container {
    /// Package a table with the bits it encoded.
    ///
    /// # Errors
    /// `PayloadTooLarge` if the bit count does not fit in 32 bits.
    pub fn new(table: EncodingTable, bits: &BitString) -> Result<Self> {
        let bit_len =
            u32::try_from(bits.len()).map_err(|_| Error::PayloadTooLarge { bits: bits.len() })?;

        Ok(Self {
            table,
            bit_len,
            payload: bits_to_bytes(bits),
        })
    }

    /// Serialize into the container format.
    ///
    /// # Errors
    /// `TableTooLarge` if the serialized table does not fit in 32 bits.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let table_bytes = self.table.serialize();
        let table_len = u32::try_from(table_bytes.len()).map_err(|_| Error::TableTooLarge {
            bytes: table_bytes.len(),
        })?;

        let mut out = Vec::with_capacity(HEADER_SIZE + table_bytes.len() + self.payload.len());
        out.extend_from_slice(&table_len.to_be_bytes());
        out.extend_from_slice(&self.bit_len.to_be_bytes());
        out.extend_from_slice(&table_bytes);
        out.extend_from_slice(&self.payload);

        Ok(out)
    }

    /// Parse a container from bytes.
    ///
    /// # Errors
    /// - `MalformedHeader` if the header is incomplete or the declared table
    ///   runs past the end of the input
    /// - `CorruptStream` if the table does not deserialize, the payload size
    ///   disagrees with the bit length, or the padding bits are not zero
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(HeaderError::TooShort {
                required: HEADER_SIZE,
                actual: bytes.len(),
            }
            .into());
        }

        let table_len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let bit_len = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);

        let body = &bytes[HEADER_SIZE..];
        if table_len > body.len() {
            return Err(HeaderError::TableLengthExceeds {
                declared: table_len,
                available: body.len(),
            }
            .into());
        }

        let (table_bytes, payload) = body.split_at(table_len);
        let table = EncodingTable::deserialize(table_bytes)?;

        let expected = (bit_len as usize).div_ceil(CHUNK_SIZE);
        if payload.len() != expected {
            return Err(CorruptStreamError::PayloadLengthMismatch {
                expected,
                actual: payload.len(),
            }
            .into());
        }

        let tail = bit_len as usize % CHUNK_SIZE;
        if tail != 0 {
            let padding_mask = 0xFFu8 >> tail;
            if payload.last().is_some_and(|&b| b & padding_mask != 0) {
                return Err(CorruptStreamError::NonZeroPadding.into());
            }
        }

        Ok(Self {
            table,
            bit_len,
            payload: payload.to_vec(),
        })
    }

    /// The payload bits with padding removed.
    pub fn bits(&self) -> BitString {
        let mut bits = bytes_to_bits(&self.payload);
        bits.truncate(self.bit_len as usize);
        bits
    }

    /// Decode the payload back into text.
    ///
    /// # Errors
    /// `CorruptStream` if the payload contains a bit sequence the table
    /// cannot match, or ends partway through a code.
    pub fn decode_text(&self) -> Result<String> {
        self.table.decode(&self.bits())
    }
}

/// Encodes text into containers and decodes them back.
///
/// Generic over the table generator; [`Codec::default`] uses Shannon-Fano.
/// Each call builds and owns its own table, so one codec can serve any
/// number of independent calls.
#[derive(Debug, Clone, Default)]
pub struct Codec<G = ShannonFano> {
    generator: G,
}

impl<G: TableGenerator> Codec<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Build a table for `text` and encode it, without serializing.
    pub fn encode_container(&self, text: &str) -> Result<Container> {
        let table = self.generator.generate(text)?;
        let bits = table.encode(text)?;

        log::debug!(
            "encoded {} bytes of text with {} symbols into {} bits",
            text.len(),
            table.len(),
            bits.len()
        );

        Container::new(table, &bits)
    }

    /// Encode `text` into container bytes.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let bytes = self.encode_container(text)?.to_bytes()?;
        log::debug!("container is {} bytes", bytes.len());
        Ok(bytes)
    }

    /// Decode container bytes back into text.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        let container = Container::parse(bytes)?;

        log::debug!(
            "decoding {} bits with {} symbols from a {} byte container",
            container.bit_len,
            container.table.len(),
            bytes.len()
        );

        container.decode_text()
    }
}

/// Encode `text` with a Shannon-Fano table.
///
/// # Example
/// ```
/// let packed = sfpack_core::encode("abracadabra").unwrap();
/// assert_eq!(sfpack_core::decode(&packed).unwrap(), "abracadabra");
/// ```
pub fn encode(text: &str) -> Result<Vec<u8>> {
    Codec::<ShannonFano>::default().encode(text)
}

/// Decode a container produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<String> {
    Codec::<ShannonFano>::default().decode(bytes)
}
