//! Typed column handles.
//!
//! A [`ColumnHandle<T>`] is a [`ColumnId`] that remembers the element type
//! it was created for. It does not borrow the container, so callers can
//! hold handles across row allocation, which only ever appends chunks.

use std::fmt;
use std::marker::PhantomData;

use strata_core::ColumnId;

/// Typed reference to a column of a container.
///
/// Resolve through [`AttributeContainer::column`](crate::AttributeContainer::column)
/// and friends. A handle outlives its column only as a dangling id: once
/// the attribute is removed or the container is cleared or reloaded,
/// lookups through it return `None`.
#[must_use]
pub struct ColumnHandle<T> {
    id: ColumnId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ColumnHandle<T> {
    pub(crate) fn new(id: ColumnId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Untyped identity of the column.
    pub fn id(&self) -> ColumnId {
        self.id
    }
}

impl<T> Clone for ColumnHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ColumnHandle<T> {}

impl<T> PartialEq for ColumnHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for ColumnHandle<T> {}

impl<T> fmt::Debug for ColumnHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ColumnHandle<{}>({})", std::any::type_name::<T>(), self.id)
    }
}
