//! Protocol Layer: typed access ke packed buffer
//!
//! Prinsip desain:
//! - Flat Binary: field dibaca/ditulis langsung di offset-nya
//! - Checked: index, kapasitas, dan tipe divalidasi sebelum copy
//! - No allocation pada hot path scalar (`write_scalar` / `read_scalar`)

pub mod accessor;
pub mod header;
mod record;
mod value;

pub use accessor::{
    read, read_scalar, split_fields, write, write_scalar, FieldMut, Reader, Writer,
};
pub use header::{
    export_embedded, export_standalone, import_embedded, import_standalone, FileHeader,
    HEADER_SIZE,
};
pub use record::Record;
pub use value::{Array, Primitive, Value};
