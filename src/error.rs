//! Error taxonomy untuk codec
//!
//! Semua error dikembalikan langsung ke caller pada call yang memicunya.
//! Tidak ada retry, tidak ada partial write.

use crate::core::TypeTag;

/// Errors dari schema builder, layout, accessor, dan export format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    #[error("invalid type code: {0} (expected 0..=11)")]
    InvalidType(i32),

    #[error("repeat count must be at least 1")]
    InvalidRepeat,

    #[error("field index {index} out of range ({count} fields)")]
    IndexOutOfRange { index: u64, count: u64 },

    #[error("buffer too small: need {needed} bytes, capacity is {capacity}")]
    BufferTooSmall { needed: u64, capacity: u64 },

    #[error("type mismatch: field is {expected}, value is {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("schema is frozen, layout was already computed")]
    SchemaFrozen,

    #[error("nest field requires a nested schema (use push_nested)")]
    MissingNestedSchema,

    #[error("packed size overflows u64 or the address space")]
    SizeOverflow,

    #[error("invalid header: {0}")]
    InvalidHeader(&'static str),

    #[error("truncated input: need {needed} bytes, got {available}")]
    Truncated { needed: u64, available: u64 },
}

impl CodecError {
    pub(crate) fn mismatch(expected: TypeTag, expected_len: u64, found: TypeTag, found_len: u64) -> Self {
        Self::TypeMismatch {
            expected: format!("{expected}[{expected_len} bytes]"),
            found: format!("{found}[{found_len} bytes]"),
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
