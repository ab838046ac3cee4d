//! LIFO stack of reclaimed rows.
//!
//! [`FreeList`] reuses the chunked column machinery for its own storage:
//! it owns a `ChunkedColumn<u32>` and a length, growing by one chunk when
//! a push runs past capacity. Entries are the first row of each freed
//! primitive group.

use std::io::{self, Read, Write};

use strata_core::Row;

use crate::chunked::ChunkedColumn;

/// Stack of hole rows awaiting reuse.
#[derive(Clone, Debug)]
pub struct FreeList {
    entries: ChunkedColumn<u32>,
    len: u32,
}

impl FreeList {
    /// Create an empty free list backed by chunks of `chunk_size` entries.
    pub fn new(chunk_size: u32) -> Self {
        Self {
            entries: ChunkedColumn::new(chunk_size),
            len: 0,
        }
    }

    /// Push a reclaimed row.
    pub fn push(&mut self, row: Row) {
        if self.len as usize >= self.entries.capacity() {
            self.entries.append_chunk();
        }
        self.entries.set(Row(self.len), row.0);
        self.len += 1;
    }

    /// Pop the most recently pushed row.
    ///
    /// # Panics
    ///
    /// Panics if the free list is empty.
    pub fn pop(&mut self) -> Row {
        assert!(self.len > 0, "pop on an empty free list");
        self.len -= 1;
        Row(self.entries[Row(self.len)])
    }

    /// The row the next [`pop`](Self::pop) would return.
    pub fn head(&self) -> Option<Row> {
        self.len
            .checked_sub(1)
            .map(|top| Row(self.entries[Row(top)]))
    }

    /// Whether no rows are waiting.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of rows waiting.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Release trailing chunks not needed for the current length.
    pub fn compact(&mut self) {
        let keep = self.len.div_ceil(self.entries.chunk_size()) as usize;
        self.entries.set_chunk_count(keep);
    }

    /// Empty the stack and release all storage.
    pub fn clear(&mut self) {
        self.len = 0;
        self.entries.clear();
    }

    /// Number of chunks backing the stack.
    pub fn chunk_count(&self) -> usize {
        self.entries.chunk_count()
    }

    /// Iterate waiting rows from top (next to pop) to bottom.
    pub fn iter(&self) -> impl Iterator<Item = Row> + '_ {
        (0..self.len).rev().map(move |i| Row(self.entries[Row(i)]))
    }

    /// Write the stack as a `u32` length followed by its entries, bottom first.
    pub fn save(&self, w: &mut dyn Write) -> io::Result<()> {
        self.entries.save(w, self.len)
    }

    /// Replace the stack with a payload written by [`save`](Self::save).
    pub fn load(&mut self, r: &mut dyn Read) -> io::Result<()> {
        self.len = self.entries.load(r)?;
        Ok(())
    }
}
