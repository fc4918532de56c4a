//! Error types for the sfpack codec.
//!
//! Every failure is returned as a structured error. Nothing in the codec
//! panics or exits the process on bad input, so a corrupt container only
//! fails the call that read it.

use thiserror::Error;

/// Top-level error type for all codec operations.
///
/// The variants group failures by where they are detected:
/// - Encode: a symbol without a code, or a result too large for the format
/// - Build: a code table that cannot be represented
/// - Decode: a container whose header or body does not hold together
#[derive(Debug, Error)]
pub enum Error {
    /// Encode was asked for a symbol the table was not built from
    #[error("unknown symbol {0:?}: not present in the encoding table")]
    UnknownSymbol(char),

    /// The container body is inconsistent or cannot be decoded
    #[error("corrupt stream: {0}")]
    CorruptStream(#[from] CorruptStreamError),

    /// The container header declares more data than is present
    #[error("malformed header: {0}")]
    MalformedHeader(#[from] HeaderError),

    /// The builder produced a code longer than a 64-bit code value can hold
    #[error("code for symbol {symbol:?} is {length} bits long, maximum is 64")]
    CodeTooLong { symbol: char, length: usize },

    /// The encoded payload does not fit the 32-bit bit length field
    #[error("payload of {bits} bits exceeds the container limit of {} bits", u32::MAX)]
    PayloadTooLarge { bits: usize },

    /// The serialized table does not fit the 32-bit table length field
    #[error("table of {bytes} bytes exceeds the container limit of {} bytes", u32::MAX)]
    TableTooLarge { bytes: usize },
}

impl Error {
    /// True for any [`Error::CorruptStream`].
    pub fn is_corrupt_stream(&self) -> bool {
        matches!(self, Error::CorruptStream(_))
    }

    /// True for any [`Error::MalformedHeader`].
    pub fn is_malformed_header(&self) -> bool {
        matches!(self, Error::MalformedHeader(_))
    }
}

/// Failures while decoding the table or the payload of a container.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CorruptStreamError {
    /// No code in the table matches the bits starting at `position`
    #[error("no code matches the bits at position {position}")]
    UnmatchedCode { position: usize },

    /// Payload byte count disagrees with the declared bit length
    #[error("payload length mismatch: bit length needs {expected} bytes, got {actual}")]
    PayloadLengthMismatch { expected: usize, actual: usize },

    /// Bits after the declared bit length are not zero
    #[error("non-zero padding bits after the end of the payload")]
    NonZeroPadding,

    /// Table bytes end in the middle of a field
    #[error("table truncated: need {needed} bytes, {available} available")]
    TableTruncated { needed: usize, available: usize },

    /// Table checksum does not match its contents
    #[error("table checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    TableChecksum { expected: u32, actual: u32 },

    /// Stored code point is not a Unicode scalar value
    #[error("invalid symbol code point {0:#x}")]
    InvalidSymbol(u32),

    /// Stored code length is zero or wider than 64 bits
    #[error("invalid code length {length} for symbol {symbol:?}")]
    InvalidCodeLength { symbol: char, length: u8 },

    /// Stored code value has bits set above its code length
    #[error("code value for symbol {symbol:?} overflows its length")]
    CodeOverflow { symbol: char },

    /// The same symbol appears twice in the table
    #[error("duplicate symbol {0:?} in table")]
    DuplicateSymbol(char),

    /// Two symbols share the same code
    #[error("duplicate code {bits:#b} of length {length} in table")]
    DuplicateCode { bits: u64, length: u8 },

    /// Bytes left over after the table checksum
    #[error("{0} trailing bytes after table")]
    TrailingTableBytes(usize),
}

/// Container header errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    /// Container is too short to hold the fixed header
    #[error("container too short: need at least {required} bytes, got {actual}")]
    TooShort { required: usize, actual: usize },

    /// Declared table length runs past the end of the container
    #[error("table length {declared} exceeds the {available} bytes after the header")]
    TableLengthExceeds { declared: usize, available: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let err: Error = CorruptStreamError::NonZeroPadding.into();
        assert!(err.is_corrupt_stream());
        assert!(!err.is_malformed_header());

        let err: Error = HeaderError::TooShort {
            required: 8,
            actual: 3,
        }
        .into();
        assert!(err.is_malformed_header());
        assert!(!err.is_corrupt_stream());

        assert!(!Error::UnknownSymbol('x').is_corrupt_stream());
    }

    /// Where each variant is raised. No arm is a wildcard, so a variant
    /// that no codec stage produces does not compile here.
    fn stage(err: &Error) -> &'static str {
        match err {
            Error::UnknownSymbol(_) | Error::PayloadTooLarge { .. } | Error::TableTooLarge { .. } => {
                "encode"
            }
            Error::CodeTooLong { .. } => "build",
            Error::CorruptStream(_) | Error::MalformedHeader(_) => "decode",
        }
    }

    #[test]
    fn test_every_variant_has_a_stage() {
        assert_eq!(stage(&Error::UnknownSymbol('x')), "encode");
        assert_eq!(stage(&Error::PayloadTooLarge { bits: usize::MAX }), "encode");
        assert_eq!(stage(&Error::TableTooLarge { bytes: usize::MAX }), "encode");
        assert_eq!(
            stage(&Error::CodeTooLong {
                symbol: 'z',
                length: 65
            }),
            "build"
        );
        assert_eq!(stage(&CorruptStreamError::NonZeroPadding.into()), "decode");
        let err: Error = HeaderError::TableLengthExceeds {
            declared: 10,
            available: 2,
        }
        .into();
        assert_eq!(stage(&err), "decode");
    }

    #[test]
    fn test_display() {
        let err: Error = CorruptStreamError::TableChecksum {
            expected: 0xdeadbeef,
            actual: 1,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "corrupt stream: table checksum mismatch: expected 0xdeadbeef, got 0x00000001"
        );
    }
}
