//! Value model: tagged union + typed primitives
//!
//! `Value` membawa runtime type tag bersama datanya, dicek terhadap tag
//! field saat write. `Primitive` dipakai untuk akses scalar tanpa alokasi.

use std::fmt::Debug;

use crate::core::{Endian, FieldDescriptor, TypeTag};

mod sealed {
    pub trait Sealed {}
}

/// Primitive numeric type yang punya `TypeTag` sendiri
pub trait Primitive: sealed::Sealed + Copy + PartialEq + Debug + Send + Sync + 'static {
    const TAG: TypeTag;
    const WIDTH: usize;

    /// Tulis ke `dst[..WIDTH]` dengan byte order `endian`
    fn put(self, endian: Endian, dst: &mut [u8]);

    /// Baca dari `src[..WIDTH]` dengan byte order `endian`
    fn get(endian: Endian, src: &[u8]) -> Self;

    fn into_value(self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;

    fn into_array(items: Vec<Self>) -> Array;

    fn from_array(array: &Array) -> Option<&[Self]>;
}

macro_rules! values {
    ($($tag:ident($ty:ty)),* $(,)?) => {
        /// Nilai satu field
        #[derive(Debug, Clone, PartialEq)]
        pub enum Value {
            $($tag($ty),)*
            /// Primitive field dengan repeat > 1
            Array(Array),
            /// Isi field `Char`, opaque bytes
            Chars(Vec<u8>),
            /// Isi field `Nest`, opaque bytes semua elemen
            Nested(Vec<u8>),
        }

        /// Fixed-length array untuk primitive field
        #[derive(Debug, Clone, PartialEq)]
        pub enum Array {
            $($tag(Vec<$ty>),)*
        }

        impl Array {
            pub fn tag(&self) -> TypeTag {
                match self {
                    $(Self::$tag(_) => TypeTag::$tag,)*
                }
            }

            pub fn len(&self) -> usize {
                match self {
                    $(Self::$tag(items) => items.len(),)*
                }
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            fn byte_len(&self) -> u64 {
                match self {
                    $(Self::$tag(items) => (items.len() * <$ty as Primitive>::WIDTH) as u64,)*
                }
            }

            fn encode_into(&self, endian: Endian, dst: &mut [u8]) {
                match self {
                    $(Self::$tag(items) => put_all(items, endian, dst),)*
                }
            }
        }

        impl Value {
            /// Decode seluruh byte range field. `src.len()` = width field.
            pub(crate) fn decode(field: &FieldDescriptor, endian: Endian, src: &[u8]) -> Self {
                match field.tag() {
                    $(
                        TypeTag::$tag if field.repeat() == 1 => {
                            Value::$tag(<$ty as Primitive>::get(endian, src))
                        }
                        TypeTag::$tag => Value::Array(Array::$tag(get_all(endian, src))),
                    )*
                    TypeTag::Char => Value::Chars(src.to_vec()),
                    TypeTag::Nest => Value::Nested(src.to_vec()),
                }
            }
        }

        $(
            impl sealed::Sealed for $ty {}

            impl Primitive for $ty {
                const TAG: TypeTag = TypeTag::$tag;
                const WIDTH: usize = std::mem::size_of::<$ty>();

                #[inline(always)]
                fn put(self, endian: Endian, dst: &mut [u8]) {
                    let bytes = match endian {
                        Endian::Little => self.to_le_bytes(),
                        Endian::Big => self.to_be_bytes(),
                    };
                    dst[..Self::WIDTH].copy_from_slice(&bytes);
                }

                #[inline(always)]
                fn get(endian: Endian, src: &[u8]) -> Self {
                    let mut bytes = [0u8; std::mem::size_of::<$ty>()];
                    bytes.copy_from_slice(&src[..Self::WIDTH]);
                    match endian {
                        Endian::Little => <$ty>::from_le_bytes(bytes),
                        Endian::Big => <$ty>::from_be_bytes(bytes),
                    }
                }

                #[inline(always)]
                fn into_value(self) -> Value {
                    Value::$tag(self)
                }

                #[inline(always)]
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$tag(v) => Some(*v),
                        _ => None,
                    }
                }

                fn into_array(items: Vec<Self>) -> Array {
                    Array::$tag(items)
                }

                fn from_array(array: &Array) -> Option<&[Self]> {
                    match array {
                        Array::$tag(items) => Some(items.as_slice()),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$tag(v)
                }
            }
        )*
    };
}

values!(
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
);

fn put_all<T: Primitive>(items: &[T], endian: Endian, dst: &mut [u8]) {
    for (item, chunk) in items.iter().zip(dst.chunks_exact_mut(T::WIDTH)) {
        item.put(endian, chunk);
    }
}

fn get_all<T: Primitive>(endian: Endian, src: &[u8]) -> Vec<T> {
    src.chunks_exact(T::WIDTH)
        .map(|chunk| T::get(endian, chunk))
        .collect()
}

impl Value {
    /// Array value dari slice/vec primitive
    pub fn array<T: Primitive>(items: impl Into<Vec<T>>) -> Self {
        Value::Array(T::into_array(items.into()))
    }

    /// Char block. Panjang harus sama dengan width field saat write.
    pub fn chars(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Chars(bytes.into())
    }

    /// Runtime type tag value ini
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Int8(_) => TypeTag::Int8,
            Value::UInt8(_) => TypeTag::UInt8,
            Value::Int16(_) => TypeTag::Int16,
            Value::UInt16(_) => TypeTag::UInt16,
            Value::Int32(_) => TypeTag::Int32,
            Value::UInt32(_) => TypeTag::UInt32,
            Value::Int64(_) => TypeTag::Int64,
            Value::UInt64(_) => TypeTag::UInt64,
            Value::Float32(_) => TypeTag::Float32,
            Value::Float64(_) => TypeTag::Float64,
            Value::Array(array) => array.tag(),
            Value::Chars(_) => TypeTag::Char,
            Value::Nested(_) => TypeTag::Nest,
        }
    }

    /// Panjang encoded dalam bytes
    pub fn byte_len(&self) -> u64 {
        match self {
            Value::Array(array) => array.byte_len(),
            Value::Chars(bytes) | Value::Nested(bytes) => bytes.len() as u64,
            // Scalar: width dari tag
            scalar => scalar.tag().width().unwrap_or(0),
        }
    }

    pub fn as_scalar<T: Primitive>(&self) -> Option<T> {
        T::from_value(self)
    }

    pub fn as_array<T: Primitive>(&self) -> Option<&[T]> {
        match self {
            Value::Array(array) => T::from_array(array),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Chars(bytes) | Value::Nested(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }

    /// Encode ke `dst`. Caller menjamin `dst.len() == byte_len()`.
    pub(crate) fn encode_into(&self, endian: Endian, dst: &mut [u8]) {
        match self {
            Value::Int8(v) => v.put(endian, dst),
            Value::UInt8(v) => v.put(endian, dst),
            Value::Int16(v) => v.put(endian, dst),
            Value::UInt16(v) => v.put(endian, dst),
            Value::Int32(v) => v.put(endian, dst),
            Value::UInt32(v) => v.put(endian, dst),
            Value::Int64(v) => v.put(endian, dst),
            Value::UInt64(v) => v.put(endian, dst),
            Value::Float32(v) => v.put(endian, dst),
            Value::Float64(v) => v.put(endian, dst),
            Value::Array(array) => array.encode_into(endian, dst),
            Value::Chars(bytes) | Value::Nested(bytes) => dst.copy_from_slice(bytes),
        }
    }
}
