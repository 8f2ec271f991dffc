//! Core module: type registry, schema builder, layout
//!
//! Prinsip desain:
//! - Dense pack: tidak ada padding antar field
//! - Lazy layout: dihitung sekali saat query pertama, lalu frozen
//! - Caller-owned buffer: codec tidak pernah alokasi buffer data

mod endian;
mod layout;
mod mmap_storage;
mod schema;
mod type_tag;

pub use endian::Endian;
pub use layout::Layout;
pub use mmap_storage::MappedBuffer;
pub use schema::{FieldDescriptor, Schema};
pub use type_tag::TypeTag;
