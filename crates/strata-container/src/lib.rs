//! Attribute container for the Strata attribute store.
//!
//! An [`AttributeContainer`] owns a set of named, typed columns that share
//! one row index space, plus the bookkeeping that hands rows out and takes
//! them back.
//!
//! # Architecture
//!
//! ```text
//! AttributeContainer
//! ├── ColumnSlot × N      (name, ColumnId, Box<dyn AnyColumn>; markers first)
//! ├── ChunkedColumn<u32>  (per-row reference counts, 0 = hole)
//! ├── FreeList            (holes awaiting reuse, LIFO)
//! ├── TypeRegistry        (type tag → factory, used by load)
//! └── BrowserSlot         (Standard | Custom(Box<dyn Browser>))
//! ```
//!
//! # Row lifetime
//!
//! Rows are handed out in primitive groups of `PRIMSIZE` rows. A group
//! comes from the free list when one is waiting and from the high-water
//! mark otherwise; every column grows by whole chunks as the mark
//! advances. [`AttributeContainer::compact`] moves live rows down into
//! holes and returns the [`RowRemap`](strata_core::RowRemap) callers must
//! apply to any rows they hold.
//!
//! Misusing row lifetimes (freeing a hole, unreferencing a dead row,
//! mixing primitive group sizes) panics.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod browser;
mod compact;
pub mod config;
pub mod container;
pub mod handle;
mod hash;
mod persist;

pub use browser::{Browser, IndexListBrowser, RowSpace, StandardBrowser};
pub use config::ContainerConfig;
pub use container::{AttributeContainer, Rows, MAX_NAME_LEN};
pub use handle::ColumnHandle;
