//! Object-safe view of a column whose element type is known only by tag.
//!
//! Containers hold heterogeneous columns as `Box<dyn AnyColumn>` and drive
//! whole-row operations (grow, reset, copy, persist) through this trait.
//! Typed access goes through [`downcast_ref`] / [`downcast_mut`].

use std::any::Any;
use std::fmt;
use std::io::{self, Read, Write};

use strata_core::{Element, Row};

use crate::chunked::ChunkedColumn;

/// Row-level capabilities every column offers regardless of element type.
pub trait AnyColumn: Any {
    /// Type tag of the stored elements.
    fn type_tag(&self) -> &'static str;

    /// Elements per chunk.
    fn chunk_size(&self) -> u32;

    /// Number of chunks currently allocated.
    fn chunk_count(&self) -> usize;

    /// Append one default-initialised chunk.
    fn append_chunk(&mut self);

    /// Grow or shrink to exactly `count` chunks.
    fn set_chunk_count(&mut self, count: usize);

    /// Re-initialise the element at `row`.
    fn reset(&mut self, row: Row);

    /// Copy the element at `src` over `dst`.
    fn copy(&mut self, dst: Row, src: Row);

    /// Drop every chunk.
    fn clear(&mut self);

    /// Persist the first `extent` elements.
    fn save(&self, w: &mut dyn Write, extent: u32) -> io::Result<()>;

    /// Replace contents from a persisted payload, returning the element count.
    fn load(&mut self, r: &mut dyn Read) -> io::Result<u32>;

    /// Write a human-readable rendering of the element at `row`.
    fn write_element(&self, row: Row, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Upcast for typed downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Element> AnyColumn for ChunkedColumn<T> {
    fn type_tag(&self) -> &'static str {
        T::TYPE_TAG
    }

    fn chunk_size(&self) -> u32 {
        ChunkedColumn::chunk_size(self)
    }

    fn chunk_count(&self) -> usize {
        ChunkedColumn::chunk_count(self)
    }

    fn append_chunk(&mut self) {
        ChunkedColumn::append_chunk(self);
    }

    fn set_chunk_count(&mut self, count: usize) {
        ChunkedColumn::set_chunk_count(self, count);
    }

    fn reset(&mut self, row: Row) {
        ChunkedColumn::reset(self, row);
    }

    fn copy(&mut self, dst: Row, src: Row) {
        ChunkedColumn::copy(self, dst, src);
    }

    fn clear(&mut self) {
        ChunkedColumn::clear(self);
    }

    fn save(&self, w: &mut dyn Write, extent: u32) -> io::Result<()> {
        ChunkedColumn::save(self, w, extent)
    }

    fn load(&mut self, r: &mut dyn Read) -> io::Result<u32> {
        ChunkedColumn::load(self, r)
    }

    fn write_element(&self, row: Row, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{:?}", self.get(row))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Typed view of an erased column, or `None` if `T` is not its element type.
pub fn downcast_ref<T: Element>(column: &dyn AnyColumn) -> Option<&ChunkedColumn<T>> {
    column.as_any().downcast_ref::<ChunkedColumn<T>>()
}

/// Mutable typed view of an erased column.
pub fn downcast_mut<T: Element>(column: &mut dyn AnyColumn) -> Option<&mut ChunkedColumn<T>> {
    column.as_any_mut().downcast_mut::<ChunkedColumn<T>>()
}
