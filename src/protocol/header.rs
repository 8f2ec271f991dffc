//! Export format: schema + data dalam satu blob
//!
//! Standalone layout:
//! ┌─────────────────────────────────────────────────────┐
//! │ FileHeader (32 bytes, fixed)                        │
//! ├─────────────────────────────────────────────────────┤
//! │ Schema body (12 bytes per field, + nested entries)  │
//! ├─────────────────────────────────────────────────────┤
//! │ Packed data (total_size bytes)                      │
//! └─────────────────────────────────────────────────────┘
//!
//! Embedded layout (untuk disimpan di dalam field `Char`):
//! `[body_len: u64][schema body][packed data]`
//!
//! Semua integer multi-byte memakai byte order schema. Byte `endian` di
//! header (offset 16) dibaca lebih dulu untuk decode sisanya.

use tracing::debug;

use super::value::Primitive;
use crate::core::{Endian, Schema, TypeTag};
use crate::error::{CodecError, Result};

pub const HEADER_SIZE: usize = 32;
pub const MAGIC: u32 = 0x4650_414B; // "FPAK"
pub const VERSION: u32 = 1;

/// code (i32) + repeat (u64)
const ENTRY_SIZE: u64 = 12;
/// Prefix jumlah field untuk entry `Nest`
const NEST_COUNT_SIZE: u64 = 8;
const MAX_NEST_DEPTH: usize = 32;

const ENDIAN_OFFSET: usize = 16;

/// Header standalone blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: u32,
    pub version: u32,
    /// Panjang schema body dalam bytes
    pub body_size: u64,
    pub endian: Endian,
}

impl FileHeader {
    pub fn new(schema: &Schema) -> Result<Self> {
        Ok(Self {
            magic: MAGIC,
            version: VERSION,
            body_size: body_size(schema)?,
            endian: schema.endian(),
        })
    }

    /// Encode ke 32 bytes, reserved bytes di-nol-kan
    pub fn encode(&self, out: &mut [u8]) -> Result<()> {
        if out.len() < HEADER_SIZE {
            return Err(CodecError::BufferTooSmall {
                needed: HEADER_SIZE as u64,
                capacity: out.len() as u64,
            });
        }
        let out = &mut out[..HEADER_SIZE];
        out.fill(0);
        self.magic.put(self.endian, &mut out[0..4]);
        self.version.put(self.endian, &mut out[4..8]);
        self.body_size.put(self.endian, &mut out[8..16]);
        out[ENDIAN_OFFSET] = self.endian as u8;
        Ok(())
    }

    /// Decode dan validasi magic/version
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(CodecError::Truncated {
                needed: HEADER_SIZE as u64,
                available: bytes.len() as u64,
            });
        }
        let endian = Endian::from_u8(bytes[ENDIAN_OFFSET])
            .ok_or(CodecError::InvalidHeader("unknown byte order"))?;
        let header = Self {
            magic: u32::get(endian, &bytes[0..4]),
            version: u32::get(endian, &bytes[4..8]),
            body_size: u64::get(endian, &bytes[8..16]),
            endian,
        };
        if header.magic != MAGIC {
            return Err(CodecError::InvalidHeader("bad magic"));
        }
        if header.version != VERSION {
            return Err(CodecError::InvalidHeader("unsupported version"));
        }
        Ok(header)
    }
}

/// Panjang schema body dalam bytes
pub fn body_size(schema: &Schema) -> Result<u64> {
    schema.fields().iter().try_fold(0u64, |total, field| {
        let entry = match field.nested() {
            Some(nested) => checked_sum(&[ENTRY_SIZE, NEST_COUNT_SIZE, body_size(nested)?])?,
            None => ENTRY_SIZE,
        };
        checked_sum(&[total, entry])
    })
}

fn checked_sum(parts: &[u64]) -> Result<u64> {
    parts
        .iter()
        .try_fold(0u64, |total, &part| total.checked_add(part))
        .ok_or(CodecError::SizeOverflow)
}

/// Tulis header ke `out`, return panjang body yang harus mengikutinya
pub fn export_header(schema: &Schema, out: &mut [u8]) -> Result<u64> {
    let header = FileHeader::new(schema)?;
    header.encode(out)?;
    Ok(header.body_size)
}

/// Baca header. Return schema kosong dengan byte order dari header
/// beserta panjang body.
pub fn import_header(bytes: &[u8]) -> Result<(Schema, u64)> {
    let header = FileHeader::decode(bytes)?;
    Ok((Schema::with_endian(header.endian), header.body_size))
}

/// Tulis schema body ke `out`, return jumlah bytes
pub fn export_body(schema: &Schema, out: &mut [u8]) -> Result<usize> {
    let needed = body_size(schema)?;
    if (out.len() as u64) < needed {
        return Err(CodecError::BufferTooSmall {
            needed,
            capacity: out.len() as u64,
        });
    }
    let mut sink = Sink {
        out,
        pos: 0,
        endian: schema.endian(),
    };
    sink.entries(schema);
    Ok(sink.pos)
}

/// Isi `schema` dengan field dari `body`. Seluruh body harus terpakai.
pub fn import_body(schema: &mut Schema, body: &[u8]) -> Result<()> {
    let mut cursor = Cursor {
        bytes: body,
        pos: 0,
        endian: schema.endian(),
    };
    while cursor.pos < body.len() {
        cursor.entry(schema, 0)?;
    }
    debug!(fields = schema.field_count(), "schema body imported");
    Ok(())
}

/// Panjang standalone blob: header + body + data
pub fn standalone_size(schema: &Schema) -> Result<u64> {
    checked_sum(&[HEADER_SIZE as u64, body_size(schema)?, schema.total_size()])
}

/// Tulis standalone blob ke `out`, return jumlah bytes
pub fn export_standalone(schema: &Schema, data: &[u8], out: &mut [u8]) -> Result<usize> {
    let needed = standalone_size(schema)?;
    let data = packed_data(schema, data)?;
    if (out.len() as u64) < needed {
        return Err(CodecError::BufferTooSmall {
            needed,
            capacity: out.len() as u64,
        });
    }
    let body_len = export_header(schema, out)? as usize;
    let written = export_body(schema, &mut out[HEADER_SIZE..HEADER_SIZE + body_len])?;
    let data_start = HEADER_SIZE + written;
    out[data_start..data_start + data.len()].copy_from_slice(data);
    Ok(data_start + data.len())
}

/// Baca standalone blob. Return schema (frozen) + slice data di dalam `bytes`.
pub fn import_standalone(bytes: &[u8]) -> Result<(Schema, &[u8])> {
    let (mut schema, body_len) = import_header(bytes)?;
    let body = slice(bytes, HEADER_SIZE as u64, body_len)?;
    import_body(&mut schema, body)?;
    let data = slice(bytes, HEADER_SIZE as u64 + body_len, schema.total_size())?;
    Ok((schema, data))
}

/// Panjang embedded blob: prefix + body + data
pub fn embedded_size(schema: &Schema) -> Result<u64> {
    checked_sum(&[NEST_COUNT_SIZE, body_size(schema)?, schema.total_size()])
}

/// Tulis embedded blob ke `out`, return jumlah bytes
pub fn export_embedded(schema: &Schema, data: &[u8], out: &mut [u8]) -> Result<usize> {
    let needed = embedded_size(schema)?;
    let data = packed_data(schema, data)?;
    if (out.len() as u64) < needed {
        return Err(CodecError::BufferTooSmall {
            needed,
            capacity: out.len() as u64,
        });
    }
    let body_len = body_size(schema)?;
    body_len.put(schema.endian(), &mut out[..8]);
    let written = export_body(schema, &mut out[8..8 + body_len as usize])?;
    let data_start = 8 + written;
    out[data_start..data_start + data.len()].copy_from_slice(data);
    Ok(data_start + data.len())
}

/// Baca embedded blob dengan byte order parent
pub fn import_embedded(endian: Endian, bytes: &[u8]) -> Result<(Schema, &[u8])> {
    let prefix = slice(bytes, 0, NEST_COUNT_SIZE)?;
    let body_len = u64::get(endian, prefix);
    let body = slice(bytes, NEST_COUNT_SIZE, body_len)?;
    let mut schema = Schema::with_endian(endian);
    import_body(&mut schema, body)?;
    let data = slice(bytes, NEST_COUNT_SIZE + body_len, schema.total_size())?;
    Ok((schema, data))
}

fn packed_data<'d>(schema: &Schema, data: &'d [u8]) -> Result<&'d [u8]> {
    let size = schema.total_size();
    if (data.len() as u64) < size {
        return Err(CodecError::BufferTooSmall {
            needed: size,
            capacity: data.len() as u64,
        });
    }
    Ok(&data[..size as usize])
}

fn slice(bytes: &[u8], start: u64, len: u64) -> Result<&[u8]> {
    let available = bytes.len() as u64;
    let end = start.checked_add(len).filter(|&end| end <= available);
    match end {
        Some(end) => Ok(&bytes[start as usize..end as usize]),
        None => Err(CodecError::Truncated {
            needed: start.saturating_add(len),
            available,
        }),
    }
}

struct Sink<'a> {
    out: &'a mut [u8],
    pos: usize,
    endian: Endian,
}

impl Sink<'_> {
    fn put<T: Primitive>(&mut self, value: T) {
        value.put(self.endian, &mut self.out[self.pos..self.pos + T::WIDTH]);
        self.pos += T::WIDTH;
    }

    fn entries(&mut self, schema: &Schema) {
        for field in schema.fields() {
            self.put(field.tag().code());
            self.put(field.repeat());
            if let Some(nested) = field.nested() {
                self.put(nested.field_count());
                self.entries(nested);
            }
        }
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl Cursor<'_> {
    fn take<T: Primitive>(&mut self) -> Result<T> {
        let end = self.pos + T::WIDTH;
        if end > self.bytes.len() {
            return Err(CodecError::Truncated {
                needed: end as u64,
                available: self.bytes.len() as u64,
            });
        }
        let value = T::get(self.endian, &self.bytes[self.pos..end]);
        self.pos = end;
        Ok(value)
    }

    fn entry(&mut self, schema: &mut Schema, depth: usize) -> Result<()> {
        let tag = TypeTag::from_code(self.take::<i32>()?)?;
        let repeat = self.take::<u64>()?;
        if tag != TypeTag::Nest {
            return schema.push(tag, repeat);
        }
        if depth >= MAX_NEST_DEPTH {
            return Err(CodecError::InvalidHeader("nesting too deep"));
        }
        let count = self.take::<u64>()?;
        let mut nested = Schema::with_endian(self.endian);
        for _ in 0..count {
            self.entry(&mut nested, depth + 1)?;
        }
        schema.push_nested(nested, repeat)
    }
}
