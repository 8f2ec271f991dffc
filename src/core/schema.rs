//! Schema Builder: ordered list of field descriptors
//!
//! Lifecycle dua fase:
//! - Building: push/pop/set_endian diperbolehkan
//! - Frozen: query size/offset/accessor pertama membuat snapshot layout,
//!   mutasi setelah itu ditolak dengan `SchemaFrozen`
//!
//! Snapshot disimpan di `OnceLock`, jadi schema yang sudah frozen aman
//! dibaca bersamaan dari banyak thread tanpa lock.

use std::sync::{Arc, OnceLock};

use tracing::{debug, trace};

use super::endian::Endian;
use super::layout::Layout;
use super::type_tag::TypeTag;
use crate::error::{CodecError, Result};

/// Satu slot dalam schema
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    tag: TypeTag,
    repeat: u64,
    nested: Option<Arc<Schema>>,
}

impl FieldDescriptor {
    #[inline(always)]
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Jumlah elemen (array length untuk primitive, element count untuk nest)
    #[inline(always)]
    pub fn repeat(&self) -> u64 {
        self.repeat
    }

    /// Nested schema, hanya ada untuk field `Nest`
    #[inline(always)]
    pub fn nested(&self) -> Option<&Schema> {
        self.nested.as_deref()
    }

    /// Width satu elemen dalam bytes
    #[inline(always)]
    pub fn element_width(&self) -> u64 {
        match &self.nested {
            Some(nested) => nested.total_size(),
            None => self.tag.width().unwrap_or(0),
        }
    }

    /// Width total field (element width * repeat)
    #[inline(always)]
    pub fn width(&self) -> u64 {
        // Overflow sudah ditolak saat push
        self.element_width() * self.repeat
    }
}

/// Typed field schema untuk packed buffer
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
    /// Running sum dari width semua field, dijaga agar tidak overflow
    data_size: u64,
    endian: Endian,
    layout: OnceLock<Layout>,
}

impl Schema {
    /// Membuat schema kosong dengan byte order native
    pub fn new() -> Self {
        Self::default()
    }

    /// Membuat schema kosong dengan byte order tertentu
    pub fn with_endian(endian: Endian) -> Self {
        Self {
            endian,
            ..Self::default()
        }
    }

    /// Tambah field primitive atau char
    ///
    /// `Nest` harus lewat `push_nested` karena butuh nested schema.
    pub fn push(&mut self, tag: TypeTag, repeat: u64) -> Result<()> {
        self.check_push(repeat)?;
        let element = tag.width().ok_or(CodecError::MissingNestedSchema)?;
        self.append(
            FieldDescriptor {
                tag,
                repeat,
                nested: None,
            },
            element,
        )
    }

    /// Tambah field dari raw type code (boundary untuk data dari luar)
    pub fn push_code(&mut self, code: i32, repeat: u64) -> Result<()> {
        let tag = TypeTag::from_code(code)?;
        self.push(tag, repeat)
    }

    /// Tambah field `Nest` berisi `repeat` elemen dengan layout `nested`
    ///
    /// Nested schema mengikuti byte order schema ini dan langsung di-freeze.
    pub fn push_nested(&mut self, nested: Schema, repeat: u64) -> Result<()> {
        self.check_push(repeat)?;
        let nested = nested.reordered(self.endian);
        let element = nested.total_size();
        self.append(
            FieldDescriptor {
                tag: TypeTag::Nest,
                repeat,
                nested: Some(Arc::new(nested)),
            },
            element,
        )
    }

    /// Hapus field terakhir
    pub fn pop(&mut self) -> Result<Option<FieldDescriptor>> {
        if self.is_frozen() {
            return Err(CodecError::SchemaFrozen);
        }
        let popped = self.fields.pop();
        if let Some(field) = &popped {
            self.data_size -= field.width();
        }
        Ok(popped)
    }

    /// Set byte order untuk data dan export
    pub fn set_endian(&mut self, endian: Endian) -> Result<()> {
        if self.is_frozen() {
            return Err(CodecError::SchemaFrozen);
        }
        self.endian = endian;
        for field in &mut self.fields {
            let reordered = match &field.nested {
                Some(nested) if nested.endian != endian => Arc::new(nested.reordered(endian)),
                _ => continue,
            };
            field.nested = Some(reordered);
        }
        Ok(())
    }

    #[inline(always)]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    #[inline(always)]
    pub fn field_count(&self) -> u64 {
        self.fields.len() as u64
    }

    #[inline(always)]
    pub fn field(&self, index: u64) -> Option<&FieldDescriptor> {
        self.fields.get(usize::try_from(index).ok()?)
    }

    #[inline(always)]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[inline(always)]
    pub fn is_frozen(&self) -> bool {
        self.layout.get().is_some()
    }

    /// Snapshot layout. Panggilan pertama membekukan schema.
    #[inline]
    pub fn layout(&self) -> &Layout {
        self.layout.get_or_init(|| {
            let layout = Layout::from_widths(self.fields.iter().map(FieldDescriptor::width));
            debug!(
                fields = layout.field_count(),
                total_size = layout.total_size(),
                "schema frozen"
            );
            layout
        })
    }

    /// Total packed size dalam bytes (0 untuk schema kosong)
    #[inline(always)]
    pub fn total_size(&self) -> u64 {
        self.layout().total_size()
    }

    /// Byte offset field ke-`index`
    #[inline(always)]
    pub fn offset_of(&self, index: u64) -> Result<u64> {
        self.span(index).map(|(offset, _)| offset)
    }

    /// Byte width field ke-`index`
    #[inline(always)]
    pub fn width_of(&self, index: u64) -> Result<u64> {
        self.span(index).map(|(_, width)| width)
    }

    #[inline(always)]
    pub(crate) fn span(&self, index: u64) -> Result<(u64, u64)> {
        self.layout()
            .span(index)
            .ok_or(CodecError::IndexOutOfRange {
                index,
                count: self.field_count(),
            })
    }

    /// Lepas schema. Setelah ini handle tidak bisa dipakai lagi.
    pub fn destroy(self) {
        trace!(fields = self.fields.len(), "schema destroyed");
    }

    fn check_push(&self, repeat: u64) -> Result<()> {
        if repeat == 0 {
            return Err(CodecError::InvalidRepeat);
        }
        if self.is_frozen() {
            return Err(CodecError::SchemaFrozen);
        }
        Ok(())
    }

    fn append(&mut self, field: FieldDescriptor, element: u64) -> Result<()> {
        let width = element
            .checked_mul(field.repeat)
            .ok_or(CodecError::SizeOverflow)?;
        self.data_size = self
            .data_size
            .checked_add(width)
            .ok_or(CodecError::SizeOverflow)?;
        trace!(
            index = self.fields.len(),
            tag = %field.tag,
            repeat = field.repeat,
            width,
            "field pushed"
        );
        self.fields.push(field);
        Ok(())
    }

    /// Salinan frozen dengan byte order lain, termasuk semua nested schema.
    /// Layout tidak bergantung pada byte order.
    fn reordered(&self, endian: Endian) -> Schema {
        let fields = self
            .fields
            .iter()
            .map(|field| FieldDescriptor {
                tag: field.tag,
                repeat: field.repeat,
                nested: field
                    .nested
                    .as_ref()
                    .map(|nested| Arc::new(nested.reordered(endian))),
            })
            .collect();
        let schema = Schema {
            fields,
            data_size: self.data_size,
            endian,
            layout: OnceLock::new(),
        };
        schema.layout();
        schema
    }
}
