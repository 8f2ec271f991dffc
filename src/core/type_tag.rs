//! Type Registry: tag -> byte width
//!
//! Tabel width bersifat konstan, aman dibaca dari thread mana pun
//! tanpa sinkronisasi.

use std::fmt;

use crate::error::{CodecError, Result};

/// Tipe field dalam schema. Nilai numerik = type code di boundary.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Int8 = 0,
    UInt8 = 1,
    Int16 = 2,
    UInt16 = 3,
    Int32 = 4,
    UInt32 = 5,
    Int64 = 6,
    UInt64 = 7,
    Float32 = 8,
    Float64 = 9,
    /// Fixed-length character block, dibaca/ditulis sebagai bytes opaque
    Char = 10,
    /// Composite field, layout dari nested schema
    Nest = 11,
}

/// Width per type code, index = code. Nest tidak punya width intrinsik.
const WIDTHS: [u64; 11] = [1, 1, 2, 2, 4, 4, 8, 8, 4, 8, 1];

impl TypeTag {
    pub const ALL: [TypeTag; 12] = [
        Self::Int8,
        Self::UInt8,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::Float32,
        Self::Float64,
        Self::Char,
        Self::Nest,
    ];

    /// Validasi type code dari luar (misal hasil import atau FFI)
    #[inline(always)]
    pub fn from_code(code: i32) -> Result<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(CodecError::InvalidType(code))
    }

    #[inline(always)]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Byte width satu elemen. `None` untuk `Nest`, pakai
    /// `Schema::total_size` dari nested schema.
    #[inline(always)]
    pub const fn width(self) -> Option<u64> {
        match self {
            Self::Nest => None,
            other => Some(WIDTHS[other as usize]),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Char => "char",
            Self::Nest => "nest",
        };
        f.write_str(name)
    }
}
