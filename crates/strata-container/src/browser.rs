//! Pluggable row traversal.
//!
//! A [`Browser`] decides which rows a traversal visits and in what order.
//! The container always has one active: the built-in [`StandardBrowser`]
//! scans rows in index order skipping holes, and a custom browser (for
//! example an [`IndexListBrowser`] over a filtered subset) can be swapped
//! in and out.
//!
//! Browsers never own container state. Every call receives a read-only
//! [`RowSpace`] describing the current liveness column and extent, so a
//! browser installed before rows are freed still skips the new holes.

use std::fmt;

use indexmap::IndexSet;
use strata_column::ChunkedColumn;
use strata_core::Row;

/// Read-only view of a container's row space.
#[derive(Clone, Copy)]
pub struct RowSpace<'a> {
    refs: &'a ChunkedColumn<u32>,
    high_water: u32,
}

impl<'a> RowSpace<'a> {
    pub(crate) fn new(refs: &'a ChunkedColumn<u32>, high_water: u32) -> Self {
        Self { refs, high_water }
    }

    /// Whether `row` is below the high-water mark and has a non-zero
    /// reference count.
    #[inline]
    pub fn is_used(&self, row: Row) -> bool {
        row.0 < self.high_water && self.refs[row] != 0
    }

    /// One past the highest row ever allocated.
    #[inline]
    pub fn high_water(&self) -> Row {
        Row(self.high_water)
    }

    /// First used row at or after `row`, or the high-water mark.
    pub fn next_used_from(&self, mut row: Row) -> Row {
        while row.0 < self.high_water && !self.is_used(row) {
            row = row.offset(1);
        }
        row.min(self.high_water())
    }

    /// Last used row strictly before `row`.
    pub fn prev_used_before(&self, row: Row) -> Option<Row> {
        let mut r = row.0.min(self.high_water);
        while r > 0 {
            r -= 1;
            if self.is_used(Row(r)) {
                return Some(Row(r));
            }
        }
        None
    }
}

impl fmt::Debug for RowSpace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowSpace")
            .field("high_water", &self.high_water)
            .finish_non_exhaustive()
    }
}

/// Traversal strategy over a container's rows.
///
/// [`end`](Browser::end) is a one-past-last sentinel, never a row to
/// visit. A traversal runs `begin`, then `next` until the cursor equals
/// `end`.
pub trait Browser {
    /// First row of the traversal, or `end` if there is none.
    fn begin(&self, space: RowSpace<'_>) -> Row;

    /// Sentinel marking the end of the traversal.
    fn end(&self, space: RowSpace<'_>) -> Row;

    /// Advance `row` to the next row of the traversal.
    fn next(&self, space: RowSpace<'_>, row: &mut Row);

    /// Advance `row` by a whole primitive group of `prim_size` rows.
    fn next_primitive(&self, space: RowSpace<'_>, row: &mut Row, prim_size: u32);

    /// Called when the browser becomes the container's current browser.
    fn enable(&mut self) {}

    /// Called when the browser is replaced or removed.
    fn disable(&mut self) {}
}

/// Linear scan in row order, skipping holes.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardBrowser;

impl Browser for StandardBrowser {
    fn begin(&self, space: RowSpace<'_>) -> Row {
        space.next_used_from(Row(0))
    }

    fn end(&self, space: RowSpace<'_>) -> Row {
        space.high_water()
    }

    fn next(&self, space: RowSpace<'_>, row: &mut Row) {
        *row = space.next_used_from(row.offset(1));
    }

    fn next_primitive(&self, space: RowSpace<'_>, row: &mut Row, prim_size: u32) {
        assert!(prim_size > 0, "primitive group size must be non-zero");
        let mut r = row.offset(prim_size);
        while r < space.high_water() && !space.is_used(r) {
            r = r.offset(prim_size);
        }
        *row = r.min(space.high_water());
    }
}

/// Traverses a caller-supplied ordered list of rows.
///
/// Rows that are holes or beyond the extent when the traversal reaches
/// them are skipped, so the list may go stale without breaking iteration.
#[derive(Clone, Debug, Default)]
pub struct IndexListBrowser {
    rows: IndexSet<Row>,
    enabled: bool,
}

impl IndexListBrowser {
    /// Browser over `rows`, in iteration order. Duplicates are dropped.
    pub fn new(rows: impl IntoIterator<Item = Row>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
            enabled: false,
        }
    }

    /// Append `row` to the traversal. Returns `false` if already listed.
    pub fn push(&mut self, row: Row) -> bool {
        self.rows.insert(row)
    }

    /// Number of listed rows, including stale ones.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows are listed.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the browser is currently installed in a container.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn first_used_from(&self, space: RowSpace<'_>, pos: usize) -> Row {
        self.rows
            .iter()
            .skip(pos)
            .copied()
            .find(|&r| space.is_used(r))
            .unwrap_or(space.high_water())
    }
}

impl Browser for IndexListBrowser {
    fn begin(&self, space: RowSpace<'_>) -> Row {
        self.first_used_from(space, 0)
    }

    fn end(&self, space: RowSpace<'_>) -> Row {
        space.high_water()
    }

    fn next(&self, space: RowSpace<'_>, row: &mut Row) {
        self.next_primitive(space, row, 1);
    }

    fn next_primitive(&self, space: RowSpace<'_>, row: &mut Row, prim_size: u32) {
        *row = match self.rows.get_index_of(&*row) {
            Some(pos) => self.first_used_from(space, pos + prim_size as usize),
            None => space.high_water(),
        };
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }
}

/// The container's active browser.
pub(crate) enum BrowserSlot {
    Standard(StandardBrowser),
    Custom(Box<dyn Browser>),
}

impl BrowserSlot {
    pub(crate) fn get(&self) -> &dyn Browser {
        match self {
            Self::Standard(b) => b,
            Self::Custom(b) => b.as_ref(),
        }
    }

    pub(crate) fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Install `next`, disabling and dropping any previous custom browser.
    pub(crate) fn replace(&mut self, next: BrowserSlot) {
        if let Self::Custom(old) = self {
            old.disable();
        }
        *self = next;
        if let Self::Custom(new) = self {
            new.enable();
        }
    }
}

impl Default for BrowserSlot {
    fn default() -> Self {
        Self::Standard(StandardBrowser)
    }
}

impl fmt::Debug for BrowserSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard(_) => f.write_str("Standard"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Liveness column with the given refs, chunk size 4.
    fn refs(values: &[u32]) -> ChunkedColumn<u32> {
        let mut col = ChunkedColumn::new(4);
        col.set_chunk_count(values.len().div_ceil(4));
        for (i, &v) in values.iter().enumerate() {
            col.set(Row(i as u32), v);
        }
        col
    }

    fn collect(browser: &dyn Browser, space: RowSpace<'_>) -> Vec<u32> {
        let mut out = Vec::new();
        let mut r = browser.begin(space);
        while r != browser.end(space) {
            out.push(r.0);
            browser.next(space, &mut r);
        }
        out
    }

    #[test]
    fn standard_skips_holes() {
        let col = refs(&[0, 1, 0, 0, 2, 1, 0]);
        let space = RowSpace::new(&col, 7);
        assert_eq!(collect(&StandardBrowser, space), vec![1, 4, 5]);
    }

    #[test]
    fn standard_on_empty_space_is_immediately_done() {
        let col = refs(&[]);
        let space = RowSpace::new(&col, 0);
        assert_eq!(StandardBrowser.begin(space), StandardBrowser.end(space));
    }

    #[test]
    fn standard_next_primitive_steps_by_group() {
        let col = refs(&[1, 1, 0, 0, 1, 1, 1, 1]);
        let space = RowSpace::new(&col, 8);
        let mut r = StandardBrowser.begin(space);
        StandardBrowser.next_primitive(space, &mut r, 2);
        assert_eq!(r, Row(4));
        StandardBrowser.next_primitive(space, &mut r, 2);
        assert_eq!(r, Row(6));
        StandardBrowser.next_primitive(space, &mut r, 2);
        assert_eq!(r, Row(8));
    }

    #[test]
    #[should_panic(expected = "primitive group size must be non-zero")]
    fn standard_next_primitive_rejects_zero_step() {
        let col = refs(&[0, 1]);
        let space = RowSpace::new(&col, 2);
        let mut r = Row(0);
        StandardBrowser.next_primitive(space, &mut r, 0);
    }

    #[test]
    fn reverse_helpers() {
        let col = refs(&[1, 0, 1, 0]);
        let space = RowSpace::new(&col, 4);
        assert_eq!(space.prev_used_before(Row(4)), Some(Row(2)));
        assert_eq!(space.prev_used_before(Row(2)), Some(Row(0)));
        assert_eq!(space.prev_used_before(Row(0)), None);
    }

    #[test]
    fn index_list_follows_list_order_and_skips_stale_rows() {
        let col = refs(&[1, 1, 0, 1, 1]);
        let space = RowSpace::new(&col, 5);
        let browser = IndexListBrowser::new([Row(4), Row(2), Row(0), Row(9), Row(3)]);
        assert_eq!(collect(&browser, space), vec![4, 0, 3]);
    }

    #[test]
    fn index_list_next_primitive_skips_list_positions() {
        let col = refs(&[1, 1, 1, 1]);
        let space = RowSpace::new(&col, 4);
        let browser = IndexListBrowser::new([Row(3), Row(2), Row(1), Row(0)]);
        let mut r = browser.begin(space);
        browser.next_primitive(space, &mut r, 2);
        assert_eq!(r, Row(1));
        browser.next_primitive(space, &mut r, 2);
        assert_eq!(r, browser.end(space));
    }

    struct Toggled(Rc<Cell<i32>>);

    impl Browser for Toggled {
        fn begin(&self, space: RowSpace<'_>) -> Row {
            space.high_water()
        }
        fn end(&self, space: RowSpace<'_>) -> Row {
            space.high_water()
        }
        fn next(&self, space: RowSpace<'_>, row: &mut Row) {
            *row = space.high_water();
        }
        fn next_primitive(&self, space: RowSpace<'_>, row: &mut Row, _prim_size: u32) {
            *row = space.high_water();
        }
        fn enable(&mut self) {
            self.0.set(self.0.get() + 1);
        }
        fn disable(&mut self) {
            self.0.set(self.0.get() - 1);
        }
    }

    #[test]
    fn slot_replace_runs_lifecycle_hooks() {
        let active = Rc::new(Cell::new(0));
        let mut slot = BrowserSlot::default();
        assert!(!slot.is_custom());

        slot.replace(BrowserSlot::Custom(Box::new(Toggled(active.clone()))));
        assert_eq!(active.get(), 1);
        assert!(slot.is_custom());

        slot.replace(BrowserSlot::Custom(Box::new(Toggled(active.clone()))));
        assert_eq!(active.get(), 1);

        slot.replace(BrowserSlot::default());
        assert_eq!(active.get(), 0);
        assert_eq!(Rc::strong_count(&active), 1);
    }
}
