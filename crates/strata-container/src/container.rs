//! The attribute container: named columns over a shared row space.

use std::fmt;

use strata_column::erased::{downcast_mut, downcast_ref};
use strata_column::{AnyColumn, ChunkedColumn, FreeList, TypeRegistry};
use strata_core::{ColumnId, ContainerError, Element, Row};

use crate::browser::{Browser, BrowserSlot, RowSpace, StandardBrowser};
use crate::config::ContainerConfig;
use crate::handle::ColumnHandle;

/// Exclusive bound on the byte length of attribute names and type tags.
///
/// Matches the fixed buffer used when loading a persisted container.
pub const MAX_NAME_LEN: usize = 256;

/// One named column.
pub(crate) struct ColumnSlot {
    pub(crate) id: ColumnId,
    pub(crate) name: String,
    pub(crate) column: Box<dyn AnyColumn>,
}

/// A set of named, typed columns sharing one row index space.
///
/// Rows are allocated in fixed-size primitive groups and recycled through
/// a LIFO free list. Each row carries a reference count; zero marks a
/// hole. Boolean marker columns are kept in a prefix of the column list
/// so [`init_markers_of_row`](Self::init_markers_of_row) touches only
/// them.
///
/// # Invariants
///
/// - For every row below the high-water mark, a zero reference count
///   means the row belongs to a freed group on the free list.
/// - Every column and the reference counts have the same chunk count,
///   enough to cover the high-water mark.
/// - Marker columns occupy slots `[0, marker_count)`.
/// - Column names are pairwise distinct.
/// - `size() <= high_water_mark()`.
pub struct AttributeContainer {
    config: ContainerConfig,
    pub(crate) columns: Vec<ColumnSlot>,
    pub(crate) refs: ChunkedColumn<u32>,
    pub(crate) holes: FreeList,
    pub(crate) live_rows: u32,
    pub(crate) high_water: u32,
    pub(crate) marker_count: u32,
    next_column_id: u32,
    pub(crate) prim_size: Option<u32>,
    pub(crate) registry: TypeRegistry,
    browser: BrowserSlot,
}

impl AttributeContainer {
    /// Create an empty container.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. Use [`try_new`](Self::try_new)
    /// to handle that case.
    pub fn new(config: ContainerConfig) -> Self {
        match Self::try_new(config) {
            Ok(container) => container,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create an empty container, validating the configuration.
    pub fn try_new(config: ContainerConfig) -> Result<Self, ContainerError> {
        config.validate()?;
        let chunk_size = config.chunk_size;
        Ok(Self {
            config,
            columns: Vec::new(),
            refs: ChunkedColumn::new(chunk_size),
            holes: FreeList::new(chunk_size),
            live_rows: 0,
            high_water: 0,
            marker_count: 0,
            next_column_id: 0,
            prim_size: None,
            registry: TypeRegistry::with_builtin(),
            browser: BrowserSlot::default(),
        })
    }

    // ── Attribute management ────────────────────────────────────

    /// Add a column of `T` named `name`.
    ///
    /// The column is sized to the current extent with default values.
    /// `T` is registered with the container's [`TypeRegistry`] so a
    /// saved container can be reloaded.
    ///
    /// # Errors
    ///
    /// [`ContainerError::DuplicateName`] if `name` is taken, and
    /// [`ContainerError::NameTooLong`] if `name` or `T::TYPE_TAG` is
    /// [`MAX_NAME_LEN`] bytes or longer.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty, or if a different type is registered
    /// under `T::TYPE_TAG`.
    pub fn add_attribute<T: Element>(
        &mut self,
        name: &str,
    ) -> Result<ColumnHandle<T>, ContainerError> {
        assert!(!name.is_empty(), "attribute name must not be empty");
        check_len(name)?;
        check_len(T::TYPE_TAG)?;
        if self.slot_by_name(name).is_some() {
            log::warn!("add_attribute: attribute '{name}' already exists");
            return Err(ContainerError::DuplicateName { name: name.into() });
        }
        self.registry.register::<T>();

        let mut column = ChunkedColumn::<T>::new(self.config.chunk_size);
        column.set_chunk_count(self.refs.chunk_count());
        let id = self.allocate_column_id();
        self.columns.push(ColumnSlot {
            id,
            name: name.into(),
            column: Box::new(column),
        });
        Ok(ColumnHandle::new(id))
    }

    /// Add a boolean marker column named `name`.
    ///
    /// Same errors and panics as [`add_attribute`](Self::add_attribute).
    pub fn add_marker_attribute(
        &mut self,
        name: &str,
    ) -> Result<ColumnHandle<bool>, ContainerError> {
        let handle = self.add_attribute::<bool>(name)?;
        let last = self.columns.len() - 1;
        self.columns.swap(self.marker_count as usize, last);
        self.marker_count += 1;
        Ok(handle)
    }

    /// Typed handle to the column named `name`.
    ///
    /// # Errors
    ///
    /// [`ContainerError::NotFound`] if there is no such column, and
    /// [`ContainerError::TypeMismatch`] if it does not store `T`.
    pub fn get_attribute<T: Element>(&self, name: &str) -> Result<ColumnHandle<T>, ContainerError> {
        let slot = self.find(name)?;
        if downcast_ref::<T>(slot.column.as_ref()).is_none() {
            log::warn!(
                "get_attribute: attribute '{name}' has type {}, requested {}",
                slot.column.type_tag(),
                T::TYPE_TAG
            );
            return Err(ContainerError::TypeMismatch {
                name: name.into(),
                expected: T::TYPE_TAG,
                found: slot.column.type_tag().into(),
            });
        }
        Ok(ColumnHandle::new(slot.id))
    }

    /// Identity of the column named `name`, whatever its type.
    pub fn get_attribute_untyped(&self, name: &str) -> Result<ColumnId, ContainerError> {
        self.find(name).map(|slot| slot.id)
    }

    /// Untyped read access to the column named `name`.
    pub fn column_by_name(&self, name: &str) -> Option<&dyn AnyColumn> {
        self.slot_by_name(name).map(|i| self.columns[i].column.as_ref())
    }

    /// Untyped read access to the column with identity `id`.
    pub fn column_by_id(&self, id: ColumnId) -> Option<&dyn AnyColumn> {
        self.slot_by_id(id).map(|i| self.columns[i].column.as_ref())
    }

    /// Remove the column named `name`. Returns `false` if there is none.
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        match self.slot_by_name(name) {
            Some(index) => {
                self.remove_slot(index);
                true
            }
            None => {
                log::warn!("remove_attribute: attribute '{name}' not found");
                false
            }
        }
    }

    /// Remove the column with identity `id`. Returns `false` if there is
    /// none.
    pub fn remove_attribute_by_id(&mut self, id: ColumnId) -> bool {
        match self.slot_by_id(id) {
            Some(index) => {
                self.remove_slot(index);
                true
            }
            None => {
                log::warn!("remove_attribute: column {id} not found");
                false
            }
        }
    }

    fn remove_slot(&mut self, mut index: usize) {
        let markers = self.marker_count as usize;
        if index < markers {
            // Keep the marker prefix contiguous: move the target to the
            // end of the prefix and shrink it.
            self.columns.swap(index, markers - 1);
            self.marker_count -= 1;
            index = markers - 1;
        }
        self.columns.swap_remove(index);
    }

    // ── Typed access ────────────────────────────────────────────

    /// The column behind `handle`, or `None` if it has been removed.
    pub fn column<T: Element>(&self, handle: ColumnHandle<T>) -> Option<&ChunkedColumn<T>> {
        let index = self.slot_by_id(handle.id())?;
        downcast_ref(self.columns[index].column.as_ref())
    }

    /// Mutable access to the column behind `handle`.
    pub fn column_mut<T: Element>(
        &mut self,
        handle: ColumnHandle<T>,
    ) -> Option<&mut ChunkedColumn<T>> {
        let index = self.slot_by_id(handle.id())?;
        downcast_mut(self.columns[index].column.as_mut())
    }

    /// Value at `row`, or `None` if the column is gone or `row` is at or
    /// beyond the high-water mark.
    pub fn value<T: Element>(&self, handle: ColumnHandle<T>, row: Row) -> Option<&T> {
        if row.0 >= self.high_water {
            return None;
        }
        self.column(handle).map(|col| col.get(row))
    }

    /// Overwrite the value at `row`. Returns `false` if the column is gone
    /// or `row` is at or beyond the high-water mark.
    pub fn set_value<T: Element>(&mut self, handle: ColumnHandle<T>, row: Row, value: T) -> bool {
        if row.0 >= self.high_water {
            return false;
        }
        match self.column_mut(handle) {
            Some(col) => {
                col.set(row, value);
                true
            }
            None => false,
        }
    }

    // ── Row lifetime ────────────────────────────────────────────

    /// Allocate a group of `PRIMSIZE` rows and return its first row.
    ///
    /// A freed group is reused when one is waiting; otherwise the group
    /// is taken from the high-water mark and every column grows to cover
    /// it. The rows are marked live with a reference count of 1.
    ///
    /// # Panics
    ///
    /// Panics if `PRIMSIZE` is zero or differs from the group size this
    /// container already uses.
    pub fn allocate_rows<const PRIMSIZE: u32>(&mut self) -> Row {
        self.lock_prim_size(PRIMSIZE);
        let start = if self.holes.is_empty() {
            let start = Row(self.high_water);
            self.high_water += PRIMSIZE;
            self.grow_to(self.high_water);
            start
        } else {
            self.holes.pop()
        };
        for i in 0..PRIMSIZE {
            self.refs.set(start.offset(i), 1);
        }
        self.live_rows += PRIMSIZE;
        start
    }

    /// Free the `PRIMSIZE` group containing `row`.
    ///
    /// # Panics
    ///
    /// Panics if the group is not live, or on a group size mismatch as in
    /// [`allocate_rows`](Self::allocate_rows).
    pub fn deallocate_rows<const PRIMSIZE: u32>(&mut self, row: Row) {
        self.lock_prim_size(PRIMSIZE);
        let start = row.group_start(PRIMSIZE);
        assert!(self.is_used(start), "deallocating row {start} which is not live");
        self.holes.push(start);
        for i in 0..PRIMSIZE {
            self.refs.set(start.offset(i), 0);
        }
        self.live_rows -= PRIMSIZE;
    }

    /// Add a reference to a live row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is not live.
    pub fn ref_row(&mut self, row: Row) {
        assert!(self.is_used(row), "ref of row {row} which is not live");
        self.refs[row] += 1;
    }

    /// Drop a reference to a live row. Returns `true` if that released
    /// the row to the free list.
    ///
    /// Reference counting works on single rows, so this fixes the
    /// container's group size at 1.
    ///
    /// # Panics
    ///
    /// Panics if `row` is not live, or if the container uses groups of
    /// more than one row.
    pub fn unref_row(&mut self, row: Row) -> bool {
        self.lock_prim_size(1);
        assert!(self.is_used(row), "unref of row {row} which is not live");
        self.refs[row] -= 1;
        if self.refs[row] == 0 {
            self.holes.push(row);
            self.live_rows -= 1;
            return true;
        }
        false
    }

    /// Reference count of `row`; 0 for holes and rows beyond the extent.
    pub fn nb_refs(&self, row: Row) -> u32 {
        if row.0 < self.high_water {
            self.refs[row]
        } else {
            0
        }
    }

    /// Whether `row` is live.
    pub fn is_used(&self, row: Row) -> bool {
        self.space().is_used(row)
    }

    /// Reset every column's value at `row` to its default.
    ///
    /// # Panics
    ///
    /// Panics if `row` is not live.
    pub fn init_row(&mut self, row: Row) {
        assert!(self.is_used(row), "init of row {row} which is not live");
        for slot in &mut self.columns {
            slot.column.reset(row);
        }
    }

    /// Reset only the marker columns at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` is not live.
    pub fn init_markers_of_row(&mut self, row: Row) {
        assert!(self.is_used(row), "init of row {row} which is not live");
        let markers = self.marker_count as usize;
        for slot in &mut self.columns[..markers] {
            slot.column.reset(row);
        }
    }

    /// Copy every column's value and the reference count from `src` to
    /// `dst`.
    ///
    /// The caller is responsible for keeping the free list consistent
    /// with the copied reference count.
    ///
    /// # Panics
    ///
    /// Panics if either row is at or beyond the high-water mark.
    pub fn copy_row(&mut self, dst: Row, src: Row) {
        assert!(
            dst.0 < self.high_water && src.0 < self.high_water,
            "copy_row({dst}, {src}) outside extent {}",
            self.high_water
        );
        for slot in &mut self.columns {
            slot.column.copy(dst, src);
        }
        self.refs.copy(dst, src);
    }

    /// Ratio of live rows to the high-water mark; 1.0 means no holes.
    ///
    /// An empty container reports 1.0.
    pub fn fragmentation(&self) -> f32 {
        if self.high_water == 0 {
            return 1.0;
        }
        self.live_rows as f32 / self.high_water as f32
    }

    /// Forget every row. With `remove_attributes`, also drop every column.
    ///
    /// Columns that are kept lose their storage and start again from
    /// default values. Outstanding rows and the recorded group size are
    /// invalidated.
    pub fn clear(&mut self, remove_attributes: bool) {
        self.live_rows = 0;
        self.high_water = 0;
        self.prim_size = None;
        self.refs.clear();
        self.holes.clear();
        if remove_attributes {
            self.columns.clear();
            self.marker_count = 0;
        } else {
            for slot in &mut self.columns {
                slot.column.clear();
            }
        }
    }

    // ── Traversal ───────────────────────────────────────────────

    /// First row of the current browser's traversal.
    pub fn begin(&self) -> Row {
        self.browser.get().begin(self.space())
    }

    /// End sentinel of the current browser's traversal.
    pub fn end(&self) -> Row {
        self.browser.get().end(self.space())
    }

    /// Advance `row` with the current browser.
    pub fn next(&self, row: &mut Row) {
        self.browser.get().next(self.space(), row);
    }

    /// Advance `row` by a whole primitive group with the current browser.
    ///
    /// # Panics
    ///
    /// Panics if `prim_size` is zero.
    pub fn next_primitive(&self, row: &mut Row, prim_size: u32) {
        assert!(prim_size > 0, "primitive group size must be non-zero");
        self.browser.get().next_primitive(self.space(), row, prim_size);
    }

    /// Iterate rows in the current browser's order.
    pub fn rows(&self) -> Rows<'_> {
        Rows {
            container: self,
            current: self.begin(),
            end: self.end(),
        }
    }

    /// Last live row, scanning backward from the high-water mark.
    ///
    /// Reverse scans ignore the current browser.
    pub fn rbegin(&self) -> Option<Row> {
        self.space().prev_used_before(Row(self.high_water))
    }

    /// Live row preceding `row`.
    pub fn rnext(&self, row: Row) -> Option<Row> {
        self.space().prev_used_before(row)
    }

    /// First live row, ignoring the current browser.
    pub fn real_begin(&self) -> Row {
        self.space().next_used_from(Row(0))
    }

    /// End sentinel of a raw scan: the high-water mark.
    pub fn real_end(&self) -> Row {
        Row(self.high_water)
    }

    /// Advance `row` to the next live row, ignoring the current browser.
    pub fn real_next(&self, row: &mut Row) {
        *row = self.space().next_used_from(row.offset(1));
    }

    /// Advance `row` by whole primitive groups to the next live group,
    /// ignoring the current browser.
    ///
    /// # Panics
    ///
    /// Panics if `prim_size` is zero.
    pub fn real_next_primitive(&self, row: &mut Row, prim_size: u32) {
        assert!(prim_size > 0, "primitive group size must be non-zero");
        StandardBrowser.next_primitive(self.space(), row, prim_size);
    }

    /// Install a custom browser.
    ///
    /// A previously installed custom browser is disabled and dropped;
    /// `browser` is enabled.
    pub fn set_current_browser(&mut self, browser: impl Browser + 'static) {
        self.browser.replace(BrowserSlot::Custom(Box::new(browser)));
    }

    /// Go back to the standard hole-skipping scan.
    pub fn set_standard_browser(&mut self) {
        self.browser.replace(BrowserSlot::default());
    }

    /// Whether a custom browser is installed.
    pub fn has_custom_browser(&self) -> bool {
        self.browser.is_custom()
    }

    // ── Introspection ───────────────────────────────────────────

    /// Number of live rows.
    pub fn size(&self) -> u32 {
        self.live_rows
    }

    /// Number of rows the columns can hold without growing.
    pub fn capacity(&self) -> usize {
        self.refs.capacity()
    }

    /// One past the highest row handed out since the last clear or
    /// compaction.
    pub fn high_water_mark(&self) -> u32 {
        self.high_water
    }

    /// Number of columns, markers included.
    pub fn attribute_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of marker columns.
    pub fn marker_count(&self) -> u32 {
        self.marker_count
    }

    /// Column names in slot order, markers first.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|slot| slot.name.as_str())
    }

    /// Column type tags in slot order.
    pub fn type_tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|slot| slot.column.type_tag())
    }

    /// Rows waiting on the free list, next to be reused first.
    pub fn free_rows(&self) -> impl Iterator<Item = Row> + '_ {
        self.holes.iter()
    }

    /// Primitive group size fixed by the first allocation, if any.
    pub fn primitive_size(&self) -> Option<u32> {
        self.prim_size
    }

    /// The registry used to rebuild columns on load.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Mutable registry, for registering custom element types before a
    /// load.
    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    /// The container's configuration.
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    // ── Internals ───────────────────────────────────────────────

    pub(crate) fn space(&self) -> RowSpace<'_> {
        RowSpace::new(&self.refs, self.high_water)
    }

    pub(crate) fn lock_prim_size(&mut self, prim_size: u32) {
        assert!(prim_size > 0, "primitive group size must be non-zero");
        match self.prim_size {
            None => self.prim_size = Some(prim_size),
            Some(locked) => assert_eq!(
                locked, prim_size,
                "container uses primitive groups of {locked} rows, got {prim_size}"
            ),
        }
    }

    /// Append chunks to the reference counts and every column until they
    /// cover `extent` rows.
    fn grow_to(&mut self, extent: u32) {
        while self.refs.capacity() < extent as usize {
            self.refs.append_chunk();
            for slot in &mut self.columns {
                slot.column.append_chunk();
            }
        }
    }

    pub(crate) fn allocate_column_id(&mut self) -> ColumnId {
        let id = ColumnId(self.next_column_id);
        self.next_column_id += 1;
        id
    }

    fn slot_by_name(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|slot| slot.name == name)
    }

    fn slot_by_id(&self, id: ColumnId) -> Option<usize> {
        self.columns.iter().position(|slot| slot.id == id)
    }

    fn find(&self, name: &str) -> Result<&ColumnSlot, ContainerError> {
        match self.slot_by_name(name) {
            Some(index) => Ok(&self.columns[index]),
            None => {
                log::warn!("get_attribute: attribute '{name}' not found");
                Err(ContainerError::NotFound { name: name.into() })
            }
        }
    }
}

fn check_len(name: &str) -> Result<(), ContainerError> {
    if name.len() >= MAX_NAME_LEN {
        log::warn!(
            "name of {} bytes reaches the {MAX_NAME_LEN} byte bound",
            name.len()
        );
        return Err(ContainerError::NameTooLong {
            name: name.into(),
            len: name.len(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

impl Default for AttributeContainer {
    fn default() -> Self {
        Self::new(ContainerConfig::default())
    }
}

impl fmt::Debug for AttributeContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeContainer")
            .field("chunk_size", &self.config.chunk_size)
            .field("attributes", &self.columns.iter().map(|s| &s.name).collect::<Vec<_>>())
            .field("marker_count", &self.marker_count)
            .field("live_rows", &self.live_rows)
            .field("high_water", &self.high_water)
            .field("free_rows", &self.holes.len())
            .field("browser", &self.browser)
            .finish()
    }
}

/// Iterator over a container's rows in its current browser's order.
///
/// Created by [`AttributeContainer::rows`].
#[derive(Debug)]
pub struct Rows<'a> {
    container: &'a AttributeContainer,
    current: Row,
    end: Row,
}

impl Iterator for Rows<'_> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        if self.current >= self.end {
            return None;
        }
        let row = self.current;
        self.container.next(&mut self.current);
        Some(row)
    }
}
