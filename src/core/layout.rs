//! Layout Calculator: prefix-sum offset table
//!
//! Layout:
//! ┌──────────┬──────────┬─────┬──────────────┐
//! │ field 0  │ field 1  │ ... │ field n-1    │
//! └──────────┴──────────┴─────┴──────────────┘
//! offset[0] = 0, offset[i] = offset[i-1] + width[i-1]
//!
//! Dense pack, tanpa padding dan tanpa alignment.

/// Snapshot layout dari schema yang sudah frozen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// n + 1 entries, entry terakhir = total size
    offsets: Box<[u64]>,
}

impl Layout {
    /// Bangun layout dari width tiap field (width = element width * repeat).
    ///
    /// Caller menjamin jumlah width tidak overflow.
    pub(crate) fn from_widths<I>(widths: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let widths = widths.into_iter();
        let mut offsets = Vec::with_capacity(widths.size_hint().0 + 1);
        let mut offset = 0u64;
        offsets.push(offset);
        for width in widths {
            offset += width;
            offsets.push(offset);
        }
        Self {
            offsets: offsets.into_boxed_slice(),
        }
    }

    #[inline(always)]
    pub fn field_count(&self) -> u64 {
        (self.offsets.len() - 1) as u64
    }

    /// Total packed size dalam bytes
    #[inline(always)]
    pub fn total_size(&self) -> u64 {
        self.offsets[self.offsets.len() - 1]
    }

    /// Byte offset field ke-`index`, `None` kalau out of range
    #[inline(always)]
    pub fn offset(&self, index: u64) -> Option<u64> {
        self.span(index).map(|(offset, _)| offset)
    }

    /// Byte width field ke-`index`
    #[inline(always)]
    pub fn width(&self, index: u64) -> Option<u64> {
        self.span(index).map(|(_, width)| width)
    }

    /// (offset, width) field ke-`index`
    #[inline(always)]
    pub fn span(&self, index: u64) -> Option<(u64, u64)> {
        let i = usize::try_from(index).ok()?;
        let start = *self.offsets.get(i)?;
        let end = *self.offsets.get(i + 1)?;
        Some((start, end - start))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.offsets.windows(2).map(|w| (w[0], w[1] - w[0]))
    }
}
