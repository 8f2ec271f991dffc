//! Byte order per schema
//!
//! Default: native. Kalau schema di-set ke byte order lain, setiap elemen
//! multi-byte di-swap saat write/read.

/// Byte order untuk data dan export header
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Little = 0,
    Big = 1,
}

impl Endian {
    #[inline(always)]
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            Self::Little
        } else {
            Self::Big
        }
    }

    #[inline(always)]
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Little),
            1 => Some(Self::Big),
            _ => None,
        }
    }

    #[inline(always)]
    pub const fn is_native(self) -> bool {
        self as u8 == Self::native() as u8
    }
}

impl Default for Endian {
    fn default() -> Self {
        Self::native()
    }
}
