//! fieldpack - Schema-Driven Fixed-Layout Binary Codec
//!
//! Arsitektur:
//! - Schema: daftar field (type tag + repeat) dalam urutan push
//! - Layout: offset prefix-sum, dihitung sekali lalu frozen
//! - Accessor: read/write per index dengan bounds + type check
//! - Byte order: native secara default, little/big bisa dipilih per schema
//!
//! ```
//! use fieldpack::{Schema, TypeTag, Value};
//!
//! let mut schema = Schema::new();
//! schema.push(TypeTag::Float32, 1)?;
//! schema.push(TypeTag::Int32, 1)?;
//!
//! let mut buf = vec![0u8; schema.total_size() as usize];
//! fieldpack::write(&schema, &mut buf, 1, &Value::from(123i32))?;
//! assert_eq!(fieldpack::read_scalar::<i32>(&schema, &buf, 1)?, 123);
//! # Ok::<(), fieldpack::CodecError>(())
//! ```

pub mod core;
pub mod error;
pub mod protocol;

pub use crate::core::{Endian, FieldDescriptor, Layout, MappedBuffer, Schema, TypeTag};
pub use crate::error::{CodecError, Result};
pub use crate::protocol::{
    read, read_scalar, split_fields, write, write_scalar, Array, FieldMut, Primitive, Reader,
    Record, Value, Writer,
};
