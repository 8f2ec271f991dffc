//! Memory-Mapped Buffer untuk packed record di file
//!
//! Buffer tetap milik caller. Codec hanya melihat `&[u8]` / `&mut [u8]`
//! dari mapping ini, tidak pernah alokasi atau free sendiri.

use memmap2::{Mmap, MmapMut, MmapOptions};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use super::schema::Schema;

enum Mapping {
    Writable(MmapMut),
    ReadOnly(Mmap),
    /// File kosong tidak bisa di-mmap
    Empty,
}

/// File-backed byte buffer
pub struct MappedBuffer {
    mapping: Mapping,
}

impl MappedBuffer {
    /// Membuat atau membuka file dengan panjang tepat `len` bytes, read/write
    pub fn create<P: AsRef<Path>>(path: P, len: u64) -> io::Result<Self> {
        let map_len = usize::try_from(len).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "length exceeds address space")
        })?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        file.set_len(len)?;

        if map_len == 0 {
            return Ok(Self {
                mapping: Mapping::Empty,
            });
        }

        // SAFETY: File dibuka read/write dan panjangnya sudah di-set
        let mmap = unsafe { MmapOptions::new().len(map_len).map_mut(&file)? };

        Ok(Self {
            mapping: Mapping::Writable(mmap),
        })
    }

    /// Buffer untuk satu record dengan layout `schema`
    pub fn for_schema<P: AsRef<Path>>(path: P, schema: &Schema) -> io::Result<Self> {
        Self::create(path, schema.total_size())
    }

    /// Map file yang sudah ada, read-only
    pub fn open_read<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Self {
                mapping: Mapping::Empty,
            });
        }

        // SAFETY: Mapping read-only, file tidak di-truncate selama mapping hidup
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(Self {
            mapping: Mapping::ReadOnly(mmap),
        })
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        match &self.mapping {
            Mapping::Writable(m) => &m[..],
            Mapping::ReadOnly(m) => &m[..],
            Mapping::Empty => &[],
        }
    }

    /// `None` kalau mapping read-only
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> Option<&mut [u8]> {
        match &mut self.mapping {
            Mapping::Writable(m) => Some(&mut m[..]),
            Mapping::ReadOnly(_) => None,
            Mapping::Empty => Some(&mut [][..]),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flush perubahan ke disk
    pub fn flush(&self) -> io::Result<()> {
        match &self.mapping {
            Mapping::Writable(m) => m.flush(),
            _ => Ok(()),
        }
    }
}
