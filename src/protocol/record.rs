//! Owned record buffer
//!
//! Buffer di-alokasi sekali sesuai `total_size` schema, lalu semua
//! write/read langsung ke buffer itu.

use super::accessor::{self, Reader, Writer};
use super::value::{Primitive, Value};
use crate::core::Schema;
use crate::error::{CodecError, Result};

/// Satu record: schema + buffer milik sendiri
#[derive(Debug, Clone)]
pub struct Record<'a> {
    schema: &'a Schema,
    buffer: Box<[u8]>,
}

impl<'a> Record<'a> {
    /// Record baru, semua bytes nol
    pub fn new(schema: &'a Schema) -> Result<Self> {
        let size = usize::try_from(schema.total_size()).map_err(|_| CodecError::SizeOverflow)?;
        Ok(Self {
            schema,
            buffer: vec![0u8; size].into_boxed_slice(),
        })
    }

    /// Salin record dari bytes hasil `as_bytes`
    pub fn from_bytes(schema: &'a Schema, data: &[u8]) -> Result<Self> {
        let size = schema.total_size();
        if (data.len() as u64) < size {
            return Err(CodecError::Truncated {
                needed: size,
                available: data.len() as u64,
            });
        }
        Ok(Self {
            schema,
            buffer: data[..size as usize].into(),
        })
    }

    #[inline(always)]
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    #[inline(always)]
    pub fn write(&mut self, index: u64, value: &Value) -> Result<()> {
        accessor::write(self.schema, &mut self.buffer, index, value)
    }

    #[inline(always)]
    pub fn read(&self, index: u64) -> Result<Value> {
        accessor::read(self.schema, &self.buffer, index)
    }

    #[inline(always)]
    pub fn write_scalar<T: Primitive>(&mut self, index: u64, value: T) -> Result<()> {
        accessor::write_scalar(self.schema, &mut self.buffer, index, value)
    }

    #[inline(always)]
    pub fn read_scalar<T: Primitive>(&self, index: u64) -> Result<T> {
        accessor::read_scalar(self.schema, &self.buffer, index)
    }

    #[inline(always)]
    pub fn reader(&self) -> Reader<'_> {
        Reader::new(self.schema, &self.buffer)
    }

    #[inline(always)]
    pub fn writer(&mut self) -> Writer<'_> {
        Writer::new(self.schema, &mut self.buffer)
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Lepas record, ambil buffer-nya
    pub fn into_bytes(self) -> Box<[u8]> {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TypeTag;

    #[test]
    fn test_record_roundtrip_through_bytes() {
        let mut schema = Schema::new();
        schema.push(TypeTag::Float32, 1).unwrap();
        schema.push(TypeTag::Int32, 1).unwrap();

        let mut record = Record::new(&schema).unwrap();
        assert_eq!(record.as_bytes().len(), 8);
        record.write_scalar(0, 1.25f32).unwrap();
        record.write(1, &Value::from(123i32)).unwrap();

        let bytes = record.into_bytes();
        let copy = Record::from_bytes(&schema, &bytes).unwrap();
        assert_eq!(copy.read_scalar::<f32>(0), Ok(1.25));
        assert_eq!(copy.read(1), Ok(Value::from(123i32)));
    }

    #[test]
    fn test_from_short_bytes() {
        let mut schema = Schema::new();
        schema.push(TypeTag::UInt64, 1).unwrap();
        assert_eq!(
            Record::from_bytes(&schema, &[0u8; 4]).unwrap_err(),
            CodecError::Truncated { needed: 8, available: 4 }
        );
    }

    #[test]
    #[cfg(target_pointer_width = "32")]
    fn test_size_beyond_address_space() {
        let mut schema = Schema::new();
        schema.push(TypeTag::UInt8, u64::from(u32::MAX) + 1).unwrap();
        assert_eq!(Record::new(&schema).unwrap_err(), CodecError::SizeOverflow);
    }
}
