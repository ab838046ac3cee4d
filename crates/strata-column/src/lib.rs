//! Chunked column storage for the Strata attribute store.
//!
//! # Architecture
//!
//! ```text
//! ChunkedColumn<T>   (Vec<Box<[T]>>, fixed chunk size, append-only growth)
//! ├── AnyColumn      (object-safe view used by containers and the registry)
//! ├── TypeRegistry   (type tag → column factory, drives reconstruction on load)
//! └── FreeList       (LIFO stack of reclaimed rows, itself a ChunkedColumn<u32>)
//! ```
//!
//! Growth only ever appends a chunk. Existing chunks are never reallocated,
//! so a `(chunk, offset)` pair computed for a row stays valid until the
//! column is shrunk or cleared.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod chunked;
pub mod erased;
pub mod free_list;
pub mod registry;

pub use chunked::ChunkedColumn;
pub use erased::AnyColumn;
pub use free_list::FreeList;
pub use registry::{ColumnFactory, TypeRegistry};
