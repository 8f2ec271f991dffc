//! Buffer Accessor: indexed typed read/write
//!
//! Urutan validasi untuk setiap akses:
//! 1. index < field_count, kalau tidak `IndexOutOfRange`
//! 2. offset + width <= capacity buffer, kalau tidak `BufferTooSmall`
//! 3. tag dan byte width value cocok dengan field, dan field repeat 1 hanya
//!    menerima scalar, kalau tidak `TypeMismatch`
//!
//! Baru setelah itu bytes disalin. Tidak ada partial write/read.

use std::ops::Range;

use super::value::{Primitive, Value};
use crate::core::{Endian, FieldDescriptor, Schema, TypeTag};
use crate::error::{CodecError, Result};

/// Byte range field ke-`index` di buffer dengan kapasitas `capacity`
#[inline(always)]
fn locate(schema: &Schema, capacity: usize, index: u64) -> Result<(Range<usize>, &FieldDescriptor)> {
    let (offset, width) = schema.span(index)?;
    let end = offset + width;
    if end > capacity as u64 {
        return Err(CodecError::BufferTooSmall {
            needed: end,
            capacity: capacity as u64,
        });
    }
    // end <= capacity, jadi muat di usize
    let range = offset as usize..end as usize;
    let field = &schema.fields()[index as usize];
    Ok((range, field))
}

#[inline(always)]
fn check_type(field: &FieldDescriptor, width: usize, tag: TypeTag, len: u64) -> Result<()> {
    if field.tag() != tag || width as u64 != len {
        return Err(CodecError::mismatch(field.tag(), width as u64, tag, len));
    }
    Ok(())
}

/// Field dengan repeat 1 hanya menerima scalar, bukan `Array` satu elemen
#[inline(always)]
fn check_value(field: &FieldDescriptor, width: usize, value: &Value) -> Result<()> {
    if field.repeat() == 1 && matches!(value, Value::Array(_)) {
        return Err(CodecError::TypeMismatch {
            expected: format!("{} scalar", field.tag()),
            found: format!("{} array[1]", value.tag()),
        });
    }
    check_type(field, width, value.tag(), value.byte_len())
}

/// Tulis `value` ke field ke-`index`
pub fn write(schema: &Schema, buffer: &mut [u8], index: u64, value: &Value) -> Result<()> {
    let (range, field) = locate(schema, buffer.len(), index)?;
    check_value(field, range.len(), value)?;
    value.encode_into(schema.endian(), &mut buffer[range]);
    Ok(())
}

/// Baca field ke-`index` sebagai `Value`
pub fn read(schema: &Schema, buffer: &[u8], index: u64) -> Result<Value> {
    let (range, field) = locate(schema, buffer.len(), index)?;
    Ok(Value::decode(field, schema.endian(), &buffer[range]))
}

/// Tulis scalar tanpa alokasi. Field harus bertipe `T` dengan repeat 1.
#[inline(always)]
pub fn write_scalar<T: Primitive>(schema: &Schema, buffer: &mut [u8], index: u64, value: T) -> Result<()> {
    let (range, field) = locate(schema, buffer.len(), index)?;
    check_type(field, range.len(), T::TAG, T::WIDTH as u64)?;
    value.put(schema.endian(), &mut buffer[range]);
    Ok(())
}

/// Baca scalar tanpa alokasi
#[inline(always)]
pub fn read_scalar<T: Primitive>(schema: &Schema, buffer: &[u8], index: u64) -> Result<T> {
    let (range, field) = locate(schema, buffer.len(), index)?;
    check_type(field, range.len(), T::TAG, T::WIDTH as u64)?;
    Ok(T::get(schema.endian(), &buffer[range]))
}

/// Raw bytes field ke-`index` (zero-copy)
#[inline(always)]
pub fn field_bytes<'b>(schema: &Schema, buffer: &'b [u8], index: u64) -> Result<&'b [u8]> {
    let (range, _) = locate(schema, buffer.len(), index)?;
    Ok(&buffer[range])
}

#[inline(always)]
pub fn field_bytes_mut<'b>(schema: &Schema, buffer: &'b mut [u8], index: u64) -> Result<&'b mut [u8]> {
    let (range, _) = locate(schema, buffer.len(), index)?;
    Ok(&mut buffer[range])
}

/// Range elemen ke-`element` dari field `Nest` ke-`index`, relatif ke buffer
fn locate_element(schema: &Schema, capacity: usize, index: u64, element: u64) -> Result<(Range<usize>, &Schema)> {
    let (range, field) = locate(schema, capacity, index)?;
    let nested = field.nested().ok_or_else(|| {
        CodecError::mismatch(field.tag(), range.len() as u64, TypeTag::Nest, range.len() as u64)
    })?;
    if element >= field.repeat() {
        return Err(CodecError::IndexOutOfRange {
            index: element,
            count: field.repeat(),
        });
    }
    let width = nested.total_size() as usize;
    let start = range.start + element as usize * width;
    Ok((start..start + width, nested))
}

/// Elemen nested: schema untuk membacanya + byte range-nya
pub fn nested_element<'s, 'b>(
    schema: &'s Schema,
    buffer: &'b [u8],
    index: u64,
    element: u64,
) -> Result<(&'s Schema, &'b [u8])> {
    let (range, nested) = locate_element(schema, buffer.len(), index, element)?;
    Ok((nested, &buffer[range]))
}

pub fn nested_element_mut<'s, 'b>(
    schema: &'s Schema,
    buffer: &'b mut [u8],
    index: u64,
    element: u64,
) -> Result<(&'s Schema, &'b mut [u8])> {
    let (range, nested) = locate_element(schema, buffer.len(), index, element)?;
    Ok((nested, &mut buffer[range]))
}

/// Pecah buffer jadi satu `FieldMut` per field, urut sesuai schema.
///
/// Range antar field tidak overlap, jadi tiap handle bisa ditulis dari
/// thread berbeda tanpa sinkronisasi.
pub fn split_fields<'a>(schema: &'a Schema, buffer: &'a mut [u8]) -> Result<Vec<FieldMut<'a>>> {
    let needed = schema.total_size();
    if needed > buffer.len() as u64 {
        return Err(CodecError::BufferTooSmall {
            needed,
            capacity: buffer.len() as u64,
        });
    }
    let endian = schema.endian();
    let mut rest = &mut buffer[..needed as usize];
    let mut handles = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        let remaining = std::mem::take(&mut rest);
        let (bytes, tail) = remaining.split_at_mut(field.width() as usize);
        rest = tail;
        handles.push(FieldMut {
            field,
            endian,
            bytes,
        });
    }
    Ok(handles)
}

/// Akses tulis ke byte range satu field
#[derive(Debug)]
pub struct FieldMut<'a> {
    field: &'a FieldDescriptor,
    endian: Endian,
    bytes: &'a mut [u8],
}

impl FieldMut<'_> {
    #[inline(always)]
    pub fn descriptor(&self) -> &FieldDescriptor {
        self.field
    }

    #[inline(always)]
    pub fn write(&mut self, value: &Value) -> Result<()> {
        check_value(self.field, self.bytes.len(), value)?;
        value.encode_into(self.endian, self.bytes);
        Ok(())
    }

    #[inline(always)]
    pub fn write_scalar<T: Primitive>(&mut self, value: T) -> Result<()> {
        check_type(self.field, self.bytes.len(), T::TAG, T::WIDTH as u64)?;
        value.put(self.endian, self.bytes);
        Ok(())
    }

    #[inline(always)]
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut *self.bytes
    }
}

/// Read-only view: schema + buffer
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    schema: &'a Schema,
    buffer: &'a [u8],
}

impl<'a> Reader<'a> {
    #[inline(always)]
    pub fn new(schema: &'a Schema, buffer: &'a [u8]) -> Self {
        Self { schema, buffer }
    }

    #[inline(always)]
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    #[inline(always)]
    pub fn read(&self, index: u64) -> Result<Value> {
        read(self.schema, self.buffer, index)
    }

    #[inline(always)]
    pub fn read_scalar<T: Primitive>(&self, index: u64) -> Result<T> {
        read_scalar(self.schema, self.buffer, index)
    }

    #[inline(always)]
    pub fn field_bytes(&self, index: u64) -> Result<&'a [u8]> {
        field_bytes(self.schema, self.buffer, index)
    }

    /// Reader untuk satu elemen field `Nest`
    pub fn nested(&self, index: u64, element: u64) -> Result<Reader<'a>> {
        let (schema, buffer) = nested_element(self.schema, self.buffer, index, element)?;
        Ok(Reader { schema, buffer })
    }

    /// Iterasi semua field secara berurutan
    pub fn values(&self) -> impl Iterator<Item = Result<Value>> + 'a {
        let reader = *self;
        (0..self.schema.field_count()).map(move |i| reader.read(i))
    }
}

/// Read/write view: schema + mutable buffer
#[derive(Debug)]
pub struct Writer<'a> {
    schema: &'a Schema,
    buffer: &'a mut [u8],
}

impl<'a> Writer<'a> {
    #[inline(always)]
    pub fn new(schema: &'a Schema, buffer: &'a mut [u8]) -> Self {
        Self { schema, buffer }
    }

    #[inline(always)]
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    #[inline(always)]
    pub fn write(&mut self, index: u64, value: &Value) -> Result<()> {
        write(self.schema, self.buffer, index, value)
    }

    #[inline(always)]
    pub fn write_scalar<T: Primitive>(&mut self, index: u64, value: T) -> Result<()> {
        write_scalar(self.schema, self.buffer, index, value)
    }

    #[inline(always)]
    pub fn field_bytes_mut(&mut self, index: u64) -> Result<&mut [u8]> {
        field_bytes_mut(self.schema, self.buffer, index)
    }

    /// Writer untuk satu elemen field `Nest`
    pub fn nested(&mut self, index: u64, element: u64) -> Result<Writer<'_>> {
        let (schema, buffer) = nested_element_mut(self.schema, self.buffer, index, element)?;
        Ok(Writer { schema, buffer })
    }

    /// Handle per field untuk tulis paralel
    pub fn split_fields(&mut self) -> Result<Vec<FieldMut<'_>>> {
        split_fields(self.schema, self.buffer)
    }

    #[inline(always)]
    pub fn as_reader(&self) -> Reader<'_> {
        Reader::new(self.schema, self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Endian;

    fn schema_of(fields: &[(TypeTag, u64)]) -> Schema {
        let mut schema = Schema::new();
        for &(tag, repeat) in fields {
            schema.push(tag, repeat).unwrap();
        }
        schema
    }

    #[test]
    fn test_write_read_all_primitives() {
        let schema = schema_of(&[
            (TypeTag::Int8, 1),
            (TypeTag::UInt8, 1),
            (TypeTag::Int16, 1),
            (TypeTag::UInt16, 1),
            (TypeTag::Int32, 1),
            (TypeTag::UInt32, 1),
            (TypeTag::Int64, 1),
            (TypeTag::UInt64, 1),
            (TypeTag::Float32, 1),
            (TypeTag::Float64, 1),
        ]);
        let values = [
            Value::from(-120i8),
            Value::from(250u8),
            Value::from(-30000i16),
            Value::from(65000u16),
            Value::from(i32::MIN),
            Value::from(u32::MAX),
            Value::from(-9_000_000_000_000_000_000i64),
            Value::from(u64::MAX - 7),
            Value::from(3.14f32),
            Value::from(-2.718281828f64),
        ];
        let mut buf = vec![0u8; schema.total_size() as usize];
        for (i, v) in values.iter().enumerate() {
            write(&schema, &mut buf, i as u64, v).unwrap();
        }
        for (i, v) in values.iter().enumerate() {
            assert_eq!(&read(&schema, &buf, i as u64).unwrap(), v);
        }
    }

    #[test]
    fn test_layout_is_native_and_dense() {
        let schema = schema_of(&[(TypeTag::UInt8, 1), (TypeTag::UInt32, 1)]);
        let mut buf = [0u8; 5];
        write_scalar(&schema, &mut buf, 0, 0xAAu8).unwrap();
        write_scalar(&schema, &mut buf, 1, 0x1122_3344u32).unwrap();
        assert_eq!(buf[0], 0xAA);
        assert_eq!(&buf[1..], &0x1122_3344u32.to_ne_bytes());
    }

    #[test]
    fn test_index_out_of_range_regardless_of_buffer() {
        let schema = schema_of(&[(TypeTag::Int32, 1)]);
        let mut big = vec![0u8; 1024];
        let err = CodecError::IndexOutOfRange { index: 1, count: 1 };
        assert_eq!(write(&schema, &mut big, 1, &Value::from(1i32)), Err(err.clone()));
        assert_eq!(read(&schema, &big, 1), Err(err.clone()));
        assert_eq!(read(&schema, &[], 1), Err(err));
    }

    #[test]
    fn test_buffer_too_small_only_past_capacity() {
        let schema = schema_of(&[(TypeTag::Int32, 1), (TypeTag::Int64, 1)]);
        let mut buf = [0u8; 8];
        write_scalar(&schema, &mut buf, 0, 7i32).unwrap();
        assert_eq!(read_scalar::<i32>(&schema, &buf, 0), Ok(7));

        let err = CodecError::BufferTooSmall { needed: 12, capacity: 8 };
        assert_eq!(write_scalar(&schema, &mut buf, 1, 9i64), Err(err.clone()));
        assert_eq!(read(&schema, &buf, 1), Err(err));
        // tidak ada partial write
        assert_eq!(&buf[4..], &[0u8; 4]);
    }

    #[test]
    fn test_type_mismatch() {
        let schema = schema_of(&[(TypeTag::Float64, 1), (TypeTag::Int32, 2)]);
        let mut buf = vec![0u8; 16];

        let err = write(&schema, &mut buf, 0, &Value::from(1.5f32)).unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { .. }));
        assert!(matches!(
            write(&schema, &mut buf, 0, &Value::from(1i64)),
            Err(CodecError::TypeMismatch { .. })
        ));
        // scalar ke field array
        assert!(matches!(
            write(&schema, &mut buf, 1, &Value::from(1i32)),
            Err(CodecError::TypeMismatch { .. })
        ));
        assert!(matches!(
            read_scalar::<i32>(&schema, &buf, 1),
            Err(CodecError::TypeMismatch { .. })
        ));
        assert_eq!(buf, vec![0u8; 16]);
    }

    #[test]
    fn test_single_element_array_rejected_on_scalar_field() {
        let schema = schema_of(&[(TypeTag::Int32, 1)]);
        let mut buf = [0u8; 4];
        assert!(matches!(
            write(&schema, &mut buf, 0, &Value::array(vec![7i32])),
            Err(CodecError::TypeMismatch { .. })
        ));
        assert_eq!(buf, [0u8; 4]);

        write(&schema, &mut buf, 0, &Value::from(7i32)).unwrap();
        assert_eq!(read(&schema, &buf, 0), Ok(Value::from(7i32)));
    }

    #[test]
    fn test_split_fields() {
        let schema = schema_of(&[(TypeTag::UInt8, 1), (TypeTag::Int16, 2), (TypeTag::Char, 3)]);
        let mut buf = vec![0u8; 8];

        {
            let mut fields = split_fields(&schema, &mut buf).unwrap();
            assert_eq!(fields.len(), 3);
            assert_eq!(fields[1].descriptor().repeat(), 2);
            assert!(matches!(
                fields[0].write_scalar(1i8),
                Err(CodecError::TypeMismatch { .. })
            ));
            assert!(matches!(
                fields[0].write(&Value::array(vec![1u8])),
                Err(CodecError::TypeMismatch { .. })
            ));
            fields[0].write_scalar(9u8).unwrap();
            fields[1].write(&Value::array(vec![-1i16, 2])).unwrap();
            fields[2].bytes_mut().copy_from_slice(b"abc");
        }

        let reader = Reader::new(&schema, &buf);
        assert_eq!(reader.read_scalar::<u8>(0), Ok(9));
        assert_eq!(reader.read(1).unwrap().as_array::<i16>(), Some(&[-1, 2][..]));
        assert_eq!(reader.field_bytes(2), Ok(&b"abc"[..]));
        // byte terakhir di luar schema tidak disentuh
        assert_eq!(buf[7], 0);
    }

    #[test]
    fn test_split_fields_needs_whole_record() {
        let schema = schema_of(&[(TypeTag::UInt32, 1), (TypeTag::UInt32, 1)]);
        let mut buf = [0u8; 6];
        assert_eq!(
            split_fields(&schema, &mut buf).unwrap_err(),
            CodecError::BufferTooSmall { needed: 8, capacity: 6 }
        );
    }

    #[test]
    fn test_arrays() {
        let schema = schema_of(&[(TypeTag::Int32, 3), (TypeTag::Float64, 2)]);
        let mut buf = vec![0u8; schema.total_size() as usize];

        write(&schema, &mut buf, 0, &Value::array(vec![1i32, -2, 3])).unwrap();
        write(&schema, &mut buf, 1, &Value::array(vec![0.5f64, 1e300])).unwrap();

        let ints = read(&schema, &buf, 0).unwrap();
        assert_eq!(ints.as_array::<i32>(), Some(&[1, -2, 3][..]));
        let floats = read(&schema, &buf, 1).unwrap();
        assert_eq!(floats.as_array::<f64>(), Some(&[0.5, 1e300][..]));

        assert!(matches!(
            write(&schema, &mut buf, 0, &Value::array(vec![1i32, 2])),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_char_block() {
        let schema = schema_of(&[(TypeTag::Char, 8)]);
        assert_eq!(schema.total_size(), 8);
        assert_eq!(schema.offset_of(0), Ok(0));

        let mut buf = [0u8; 8];
        write(&schema, &mut buf, 0, &Value::chars(*b"fieldpak")).unwrap();
        assert_eq!(read(&schema, &buf, 0), Ok(Value::chars(*b"fieldpak")));
        assert!(matches!(
            write(&schema, &mut buf, 0, &Value::chars(*b"short")),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_field_bytes() {
        let schema = schema_of(&[(TypeTag::UInt8, 13), (TypeTag::Int32, 1)]);
        let mut buf = vec![0u8; 17];
        field_bytes_mut(&schema, &mut buf, 0)
            .unwrap()
            .copy_from_slice(b"Hello World\0\0");
        write_scalar(&schema, &mut buf, 1, 2024i32).unwrap();

        assert_eq!(&field_bytes(&schema, &buf, 0).unwrap()[..11], b"Hello World");
        assert_eq!(read_scalar::<i32>(&schema, &buf, 1), Ok(2024));
        assert!(field_bytes(&schema, &buf, 2).is_err());
    }

    #[test]
    fn test_big_endian_schema() {
        let mut schema = Schema::with_endian(Endian::Big);
        schema.push(TypeTag::UInt16, 1).unwrap();
        schema.push(TypeTag::Int16, 2).unwrap();
        let mut buf = [0u8; 6];

        write_scalar(&schema, &mut buf, 0, 0x0102u16).unwrap();
        write(&schema, &mut buf, 1, &Value::array(vec![0x0304i16, -1])).unwrap();
        assert_eq!(buf, [1, 2, 3, 4, 0xFF, 0xFF]);

        assert_eq!(read_scalar::<u16>(&schema, &buf, 0), Ok(0x0102));
        assert_eq!(
            read(&schema, &buf, 1).unwrap().as_array::<i16>(),
            Some(&[0x0304, -1][..])
        );
    }

    #[test]
    fn test_nested_elements() {
        let mut point = Schema::new();
        point.push(TypeTag::Float32, 1).unwrap();
        point.push(TypeTag::Float32, 1).unwrap();

        let mut shape = Schema::new();
        shape.push(TypeTag::UInt8, 1).unwrap();
        shape.push_nested(point, 3).unwrap();

        let mut buf = vec![0u8; shape.total_size() as usize];
        let mut writer = Writer::new(&shape, &mut buf);
        writer.write_scalar(0, 3u8).unwrap();
        for i in 0..3u64 {
            let mut p = writer.nested(1, i).unwrap();
            p.write_scalar(0, i as f32).unwrap();
            p.write_scalar(1, -(i as f32)).unwrap();
        }
        assert!(matches!(
            writer.nested(1, 3),
            Err(CodecError::IndexOutOfRange { index: 3, count: 3 })
        ));
        assert!(matches!(
            writer.nested(0, 0),
            Err(CodecError::TypeMismatch { .. })
        ));

        let reader = Reader::new(&shape, &buf);
        let p2 = reader.nested(1, 2).unwrap();
        assert_eq!(p2.read_scalar::<f32>(0), Ok(2.0));
        assert_eq!(p2.read_scalar::<f32>(1), Ok(-2.0));

        let whole = reader.read(1).unwrap();
        assert_eq!(whole.tag(), TypeTag::Nest);
        assert_eq!(whole.byte_len(), 24);
    }

    #[test]
    fn test_reader_values() {
        let schema = schema_of(&[(TypeTag::Int8, 1), (TypeTag::Char, 2)]);
        let mut buf = [0u8; 3];
        let mut writer = Writer::new(&schema, &mut buf);
        writer.write_scalar(0, -1i8).unwrap();
        writer.write(1, &Value::chars(*b"ok")).unwrap();

        let values: Vec<_> = writer.as_reader().values().collect::<Result<_>>().unwrap();
        assert_eq!(values, vec![Value::from(-1i8), Value::chars(*b"ok")]);
    }

    #[test]
    fn test_access_freezes_schema() {
        let mut schema = schema_of(&[(TypeTag::Int8, 1)]);
        let _ = read(&schema, &[0u8], 0);
        assert_eq!(schema.push(TypeTag::Int8, 1), Err(CodecError::SchemaFrozen));
    }
}
