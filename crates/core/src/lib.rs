//! sfpack-core: Shannon-Fano prefix-code compression for text
//!
//! This library turns a text into a self-describing container and back:
//! - Counts symbol (char) frequencies and builds a Shannon-Fano code table
//! - Encodes the text into a bit-dense payload with that table
//! - Stores the table and payload together so decoding needs nothing else
//!
//! # Architecture
//!
//! The modules build on each other leaves first:
//! - `bits`: Bit strings and their byte-aligned packing
//! - `shannon_fano`: Recursive frequency-balanced code assignment
//! - `table`: Symbol/code lookup in both directions, table serialization
//! - `container`: The container format and the encode/decode entry points
//! - `case_fold`: Optional uppercase folding to shrink the alphabet
//! - `stats`: Observable sizes and code quality
//!
//! # Design Principles
//!
//! - **No panics**: Corrupt or truncated input is a structured error
//! - **Self-contained**: Every container carries its own table
//! - **Deterministic**: The same text always produces the same bytes
//!
//! # Example
//!
//! ```
//! let text = "she sells sea shells by the sea shore";
//! let packed = sfpack_core::encode(text).unwrap();
//! assert_eq!(sfpack_core::decode(&packed).unwrap(), text);
//! ```

pub mod bits;
pub mod case_fold;
pub mod container;
pub mod error;
pub mod shannon_fano;
pub mod stats;
pub mod table;

// Re-export commonly used types
pub use container::{decode, encode, Codec, Container};
pub use error::{Error, Result};
pub use shannon_fano::ShannonFano;
pub use table::{CodeEntry, EncodingTable, TableGenerator};
