//! Whole-container binary snapshots.
//!
//! # Format
//!
//! All integers are little-endian `u32`.
//!
//! ```text
//! header     attribute count, live rows, high-water mark, marker count
//! lengths    per attribute: name length + 1, type tag length + 1
//! strings    per attribute: name bytes, NUL, type tag bytes, NUL
//! columns    per attribute: element count (= high-water mark), elements
//! liveness   element count (= high-water mark), reference counts
//! free list  length, entries bottom first
//! ```
//!
//! Attributes appear in slot order, so the marker prefix survives a round
//! trip.

use std::io::{self, Read, Write};

use indexmap::IndexSet;
use strata_column::{ChunkedColumn, FreeList};
use strata_core::codec::{read_nul_terminated, read_u32_le, write_nul_terminated, write_u32_le};
use strata_core::{Element, PersistError, Row};

use crate::container::{AttributeContainer, ColumnSlot, MAX_NAME_LEN};

impl AttributeContainer {
    /// Write a snapshot of the container to `w`.
    pub fn save(&self, w: &mut dyn Write) -> Result<(), PersistError> {
        write_u32_le(w, self.columns.len() as u32)?;
        write_u32_le(w, self.live_rows)?;
        write_u32_le(w, self.high_water)?;
        write_u32_le(w, self.marker_count)?;

        for slot in &self.columns {
            write_u32_le(w, slot.name.len() as u32 + 1)?;
            write_u32_le(w, slot.column.type_tag().len() as u32 + 1)?;
        }
        for slot in &self.columns {
            write_nul_terminated(w, &slot.name)?;
            write_nul_terminated(w, slot.column.type_tag())?;
        }
        for slot in &self.columns {
            slot.column.save(w, self.high_water)?;
        }
        self.refs.save(w, self.high_water)?;
        self.holes.save(w)?;

        log::debug!(
            "saved container: {} attributes, {} live of {} rows",
            self.columns.len(),
            self.live_rows,
            self.high_water
        );
        Ok(())
    }

    /// Replace the container's contents with a snapshot read from `r`.
    ///
    /// Columns are rebuilt through the container's [`TypeRegistry`], so
    /// custom element types must be registered first (see
    /// [`registry_mut`](Self::registry_mut)). Every column gets a fresh
    /// [`ColumnId`](strata_core::ColumnId); handles taken before the load
    /// no longer resolve. The installed browser is kept.
    ///
    /// On error the container is left exactly as it was.
    ///
    /// [`TypeRegistry`]: strata_column::TypeRegistry
    pub fn load(&mut self, r: &mut dyn Read) -> Result<(), PersistError> {
        let attribute_count = read_u32_le(r).map_err(from_io)?;
        let live_rows = read_u32_le(r).map_err(from_io)?;
        let high_water = read_u32_le(r).map_err(from_io)?;
        let marker_count = read_u32_le(r).map_err(from_io)?;
        if marker_count > attribute_count {
            return Err(malformed(format!(
                "{marker_count} markers among {attribute_count} attributes"
            )));
        }
        if live_rows > high_water {
            return Err(malformed(format!(
                "{live_rows} live rows above high-water mark {high_water}"
            )));
        }

        let mut lengths = Vec::new();
        for _ in 0..attribute_count {
            let name_len = checked_len(read_u32_le(r).map_err(from_io)?)?;
            let tag_len = checked_len(read_u32_le(r).map_err(from_io)?)?;
            lengths.push((name_len, tag_len));
        }

        let mut names = IndexSet::new();
        let mut tags = Vec::with_capacity(lengths.len());
        for &(name_len, tag_len) in &lengths {
            let name = read_nul_terminated(r, name_len).map_err(from_io)?;
            let tag = read_nul_terminated(r, tag_len).map_err(from_io)?;
            if name.is_empty() {
                return Err(malformed("empty attribute name".into()));
            }
            if !names.insert(name) {
                return Err(malformed("duplicate attribute name".into()));
            }
            tags.push(tag);
        }
        if let Some(tag) = tags[..marker_count as usize]
            .iter()
            .find(|t| t.as_str() != <bool as Element>::TYPE_TAG)
        {
            return Err(malformed(format!("marker column stored with type '{tag}'")));
        }

        let chunk_size = self.config().chunk_size;
        let mut columns = Vec::with_capacity(names.len());
        for (name, tag) in names.into_iter().zip(tags) {
            let mut column = self
                .registry
                .create(&tag, chunk_size)
                .ok_or_else(|| PersistError::UnknownTypeTag { tag: tag.clone() })?;
            let count = column.load(r).map_err(from_io)?;
            if count != high_water {
                return Err(malformed(format!(
                    "column '{name}' holds {count} rows, expected {high_water}"
                )));
            }
            columns.push((name, column));
        }

        let mut refs = ChunkedColumn::<u32>::new(chunk_size);
        let count = refs.load(r).map_err(from_io)?;
        if count != high_water {
            return Err(malformed(format!(
                "liveness holds {count} rows, expected {high_water}"
            )));
        }
        let used = refs.values(high_water).filter(|&&n| n != 0).count();
        if used != live_rows as usize {
            return Err(malformed(format!(
                "{used} rows are referenced but the header counts {live_rows}"
            )));
        }

        let mut holes = FreeList::new(chunk_size);
        holes.load(r).map_err(from_io)?;
        check_free_list(&holes, &refs, high_water - live_rows, high_water)?;

        // Everything decoded; commit.
        self.columns.clear();
        for (name, column) in columns {
            let id = self.allocate_column_id();
            self.columns.push(ColumnSlot { id, name, column });
        }
        self.refs = refs;
        self.holes = holes;
        self.live_rows = live_rows;
        self.high_water = high_water;
        self.marker_count = marker_count;
        self.prim_size = None;

        log::debug!(
            "loaded container: {attribute_count} attributes, {live_rows} live of {high_water} rows"
        );
        Ok(())
    }
}

/// Every hole must belong to exactly one free-list group, and all groups
/// have the same size.
fn check_free_list(
    holes: &FreeList,
    refs: &ChunkedColumn<u32>,
    hole_rows: u32,
    high_water: u32,
) -> Result<(), PersistError> {
    let entries = holes.len();
    if entries == 0 {
        return match hole_rows {
            0 => Ok(()),
            n => Err(malformed(format!("{n} holes but the free list is empty"))),
        };
    }
    if hole_rows < entries || hole_rows % entries != 0 {
        return Err(malformed(format!(
            "{entries} free list entries cannot cover {hole_rows} holes"
        )));
    }
    let group = hole_rows / entries;
    let mut covered = IndexSet::with_capacity(hole_rows as usize);
    for start in holes.iter() {
        for row in (start.0..start.0.saturating_add(group)).map(Row) {
            if row.0 >= high_water || refs[row] != 0 {
                return Err(malformed(format!("free list entry {start} is not a hole")));
            }
            if !covered.insert(row) {
                return Err(malformed(format!("row {row} is freed twice")));
            }
        }
    }
    Ok(())
}

/// Validate a stored string length, terminator included.
fn checked_len(stored: u32) -> Result<usize, PersistError> {
    if stored == 0 {
        return Err(malformed("string length of zero".into()));
    }
    if stored as usize > MAX_NAME_LEN {
        return Err(PersistError::NameTooLong {
            len: stored - 1,
            max: MAX_NAME_LEN as u32,
        });
    }
    Ok(stored as usize)
}

fn malformed(detail: String) -> PersistError {
    PersistError::Malformed { detail }
}

/// Corrupt payloads surface as `InvalidData` from the element codecs.
fn from_io(e: io::Error) -> PersistError {
    if e.kind() == io::ErrorKind::InvalidData {
        malformed(e.to_string())
    } else {
        PersistError::Io(e)
    }
}
