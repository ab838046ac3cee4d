//! Fixed-size chunks and the growable [`ChunkedColumn`].
//!
//! A column is a list of chunks, each a boxed slice of exactly
//! `chunk_size` elements. Rows address the column as one flat array:
//! `row / chunk_size` selects the chunk, `row % chunk_size` the offset.

use std::io::{self, Read, Write};
use std::ops::{Index, IndexMut};

use strata_core::codec::{read_u32_le, write_u32_le};
use strata_core::{Element, Row};

/// A growable array of one element type, stored as fixed-size chunks.
///
/// Chunks are default-initialised on creation and never move once
/// appended. Only [`ChunkedColumn::set_chunk_count`] (when shrinking) and
/// [`ChunkedColumn::clear`] release storage.
#[derive(Clone, Debug)]
pub struct ChunkedColumn<T: Element> {
    chunks: Vec<Box<[T]>>,
    chunk_size: u32,
}

impl<T: Element> ChunkedColumn<T> {
    /// Create an empty column with the given chunk size (in elements).
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn new(chunk_size: u32) -> Self {
        assert!(chunk_size > 0, "chunk size must be non-zero");
        Self {
            chunks: Vec::new(),
            chunk_size,
        }
    }

    fn new_chunk(&self) -> Box<[T]> {
        std::iter::repeat_with(T::default)
            .take(self.chunk_size as usize)
            .collect()
    }

    #[inline]
    fn locate(&self, row: Row) -> (usize, usize) {
        let size = self.chunk_size as usize;
        (row.index() / size, row.index() % size)
    }

    /// Elements per chunk.
    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Number of chunks currently allocated.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of addressable rows (`chunk_count * chunk_size`).
    pub fn capacity(&self) -> usize {
        self.chunks.len() * self.chunk_size as usize
    }

    /// Shared reference to the element at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` is beyond [`capacity`](Self::capacity).
    #[inline]
    pub fn get(&self, row: Row) -> &T {
        let (chunk, offset) = self.locate(row);
        &self.chunks[chunk][offset]
    }

    /// Mutable reference to the element at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` is beyond [`capacity`](Self::capacity).
    #[inline]
    pub fn get_mut(&mut self, row: Row) -> &mut T {
        let (chunk, offset) = self.locate(row);
        &mut self.chunks[chunk][offset]
    }

    /// Overwrite the element at `row`.
    #[inline]
    pub fn set(&mut self, row: Row, value: T) {
        *self.get_mut(row) = value;
    }

    /// Append one default-initialised chunk.
    pub fn append_chunk(&mut self) {
        let chunk = self.new_chunk();
        self.chunks.push(chunk);
    }

    /// Grow (by appending) or shrink (by dropping trailing chunks) to
    /// exactly `count` chunks.
    pub fn set_chunk_count(&mut self, count: usize) {
        if count < self.chunks.len() {
            self.chunks.truncate(count);
            return;
        }
        while self.chunks.len() < count {
            self.append_chunk();
        }
    }

    /// Re-initialise the element at `row` to `T::default()`.
    pub fn reset(&mut self, row: Row) {
        *self.get_mut(row) = T::default();
    }

    /// Copy the element at `src` over the element at `dst`.
    pub fn copy(&mut self, dst: Row, src: Row) {
        if dst == src {
            return;
        }
        let value = self.get(src).clone();
        *self.get_mut(dst) = value;
    }

    /// Drop every chunk.
    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    /// Iterate the first `extent` elements in row order.
    pub fn values(&self, extent: u32) -> impl Iterator<Item = &T> + '_ {
        (0..extent).map(move |r| self.get(Row(r)))
    }

    /// Write a `u32` element count followed by the first `extent` elements.
    ///
    /// The layout is independent of the chunk size, so a column saved with
    /// one chunk size loads into a column with any other.
    pub fn save(&self, w: &mut dyn Write, extent: u32) -> io::Result<()> {
        debug_assert!(extent as usize <= self.capacity());
        write_u32_le(w, extent)?;
        for value in self.values(extent) {
            value.encode(w)?;
        }
        Ok(())
    }

    /// Replace the contents with a payload written by [`save`](Self::save).
    ///
    /// Returns the number of elements read. On error the column is left
    /// unchanged.
    pub fn load(&mut self, r: &mut dyn Read) -> io::Result<u32> {
        let count = read_u32_le(r)?;
        let mut loaded = Self::new(self.chunk_size);
        // Grow as elements arrive so a corrupt count cannot force a large
        // allocation ahead of a truncated payload.
        for row in 0..count {
            let value = T::decode(r)?;
            if row as usize >= loaded.capacity() {
                loaded.append_chunk();
            }
            loaded.set(Row(row), value);
        }
        *self = loaded;
        Ok(count)
    }
}

impl<T: Element> Index<Row> for ChunkedColumn<T> {
    type Output = T;

    fn index(&self, row: Row) -> &T {
        self.get(row)
    }
}

impl<T: Element> IndexMut<Row> for ChunkedColumn<T> {
    fn index_mut(&mut self, row: Row) -> &mut T {
        self.get_mut(row)
    }
}
