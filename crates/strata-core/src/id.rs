//! Strongly-typed identifiers and the [`RowRemap`] produced by compaction.

use std::fmt;

/// Index of a row in a container's shared address space.
///
/// Every column of a container has a slot for every row below the
/// container's high-water mark. A row is live while its reference count is
/// non-zero; otherwise it is a hole waiting on the free list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Row(pub u32);

impl Row {
    /// The row as a `usize` index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The row `n` positions after this one.
    #[inline]
    pub fn offset(self, n: u32) -> Self {
        Self(self.0 + n)
    }

    /// First row of the `prim_size`-aligned group containing this row.
    #[inline]
    pub fn group_start(self, prim_size: u32) -> Self {
        Self((self.0 / prim_size) * prim_size)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Row {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Stable identity of a column within its container.
///
/// Column slots move when attributes are removed or when a marker column
/// is pulled into the marker prefix, so slot positions are never handed
/// out. A `ColumnId` stays valid until its column is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(pub u32);

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ColumnId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Old-to-new row mapping returned by container compaction.
///
/// Indexed by the pre-compaction row. Rows that were holes map to `None`;
/// every previously live row maps to the row now holding its data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowRemap {
    map: Vec<Option<Row>>,
}

impl RowRemap {
    /// A mapping over `extent` rows with every entry unmapped.
    pub fn unmapped(extent: u32) -> Self {
        Self {
            map: vec![None; extent as usize],
        }
    }

    /// Record that `old` now lives at `new`.
    pub fn set(&mut self, old: Row, new: Row) {
        self.map[old.index()] = Some(new);
    }

    /// Where `old` moved to, or `None` for a hole or an out-of-range row.
    pub fn get(&self, old: Row) -> Option<Row> {
        self.map.get(old.index()).copied().flatten()
    }

    /// Number of pre-compaction rows covered by the mapping.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the mapping covers no rows.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate `(old, new)` pairs for every mapped row, in old-row order.
    pub fn iter(&self) -> impl Iterator<Item = (Row, Row)> + '_ {
        self.map
            .iter()
            .enumerate()
            .filter_map(|(old, new)| new.map(|n| (Row(old as u32), n)))
    }

    /// Rewrite externally held rows in place.
    ///
    /// Returns the number of rows that had no mapping; those are left
    /// untouched.
    pub fn apply(&self, rows: &mut [Row]) -> usize {
        let mut unmapped = 0;
        for row in rows.iter_mut() {
            match self.get(*row) {
                Some(new) => *row = new,
                None => unmapped += 1,
            }
        }
        unmapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_start_aligns_down() {
        assert_eq!(Row(7).group_start(3), Row(6));
        assert_eq!(Row(6).group_start(3), Row(6));
        assert_eq!(Row(5).group_start(1), Row(5));
    }

    #[test]
    fn remap_reports_holes_as_none() {
        let mut remap = RowRemap::unmapped(4);
        remap.set(Row(3), Row(1));
        assert_eq!(remap.get(Row(3)), Some(Row(1)));
        assert_eq!(remap.get(Row(1)), None);
        assert_eq!(remap.get(Row(99)), None);
        assert_eq!(remap.iter().collect::<Vec<_>>(), vec![(Row(3), Row(1))]);
    }

    #[test]
    fn remap_apply_counts_unmapped() {
        let mut remap = RowRemap::unmapped(3);
        remap.set(Row(0), Row(0));
        remap.set(Row(2), Row(1));
        let mut held = [Row(2), Row(1), Row(0)];
        assert_eq!(remap.apply(&mut held), 1);
        assert_eq!(held, [Row(1), Row(1), Row(0)]);
    }
}
