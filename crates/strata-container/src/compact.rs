//! Two-pointer defragmentation.
//!
//! A low cursor walks forward from row 0 over primitive groups; a high
//! cursor sits on the last live group. Whenever the low group is a hole,
//! the high group is moved into it and the high cursor retreats to the
//! previous live group. The scan stops when the cursors meet, at which
//! point every live row lies below the live count.

use strata_core::{Row, RowRemap};

use crate::container::AttributeContainer;

impl AttributeContainer {
    /// Move live rows down into holes so the extent equals the live count.
    ///
    /// Returns the old-to-new mapping for every row that was live; holes
    /// map to `None`. Rows held outside the container must be rewritten
    /// with it, see [`RowRemap::apply`]. Afterwards every column is shrunk
    /// to the chunks the new extent needs and the free list is empty.
    ///
    /// # Panics
    ///
    /// Panics if `PRIMSIZE` is zero, differs from the container's group
    /// size, or does not divide the high-water mark.
    pub fn compact<const PRIMSIZE: u32>(&mut self) -> RowRemap {
        assert!(PRIMSIZE > 0, "primitive group size must be non-zero");
        if let Some(locked) = self.prim_size {
            assert_eq!(
                locked, PRIMSIZE,
                "container uses primitive groups of {locked} rows, got {PRIMSIZE}"
            );
        }
        let old_extent = self.high_water;
        assert!(
            old_extent % PRIMSIZE == 0,
            "extent {old_extent} is not a whole number of {PRIMSIZE}-row groups"
        );

        let mut remap = RowRemap::unmapped(old_extent);
        for r in (0..old_extent).map(Row) {
            if self.is_used(r) {
                remap.set(r, r);
            }
        }

        let mut moved = 0u32;
        if let Some(mut high) = self.prev_live_group(old_extent, PRIMSIZE) {
            let mut low = 0u32;
            while low < high {
                if !self.is_used(Row(low)) {
                    for i in (0..PRIMSIZE).rev() {
                        let (src, dst) = (Row(high + i), Row(low + i));
                        self.move_row(dst, src);
                        remap.set(src, dst);
                    }
                    moved += 1;
                    match self.prev_live_group(high, PRIMSIZE) {
                        Some(next) => high = next,
                        None => break,
                    }
                }
                low += PRIMSIZE;
            }
        }

        self.high_water = self.live_rows;
        let keep = self.config().chunks_for(self.high_water);
        let retained = (keep * self.config().chunk_size as usize).min(old_extent as usize) as u32;
        for r in (self.high_water..retained).map(Row) {
            self.refs.set(r, 0);
            for slot in &mut self.columns {
                slot.column.reset(r);
            }
        }
        self.refs.set_chunk_count(keep);
        for slot in &mut self.columns {
            slot.column.set_chunk_count(keep);
        }
        self.holes.clear();

        log::debug!(
            "compacted {old_extent} rows to {}: {moved} groups of {PRIMSIZE} moved, {keep} chunks kept",
            self.high_water
        );
        remap
    }

    /// Start of the last live group strictly below `before`.
    fn prev_live_group(&self, before: u32, prim_size: u32) -> Option<u32> {
        let mut group = before - before % prim_size;
        while group >= prim_size {
            group -= prim_size;
            if self.is_used(Row(group)) {
                return Some(group);
            }
        }
        None
    }

    /// Move one row's values and reference count, leaving `src` a hole.
    fn move_row(&mut self, dst: Row, src: Row) {
        for slot in &mut self.columns {
            slot.column.copy(dst, src);
        }
        self.refs.copy(dst, src);
        self.refs.set(src, 0);
    }
}
