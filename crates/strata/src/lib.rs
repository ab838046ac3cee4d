//! Strata: chunked attribute storage for mesh-like data structures.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Strata sub-crates. For most users, adding `strata` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use strata::prelude::*;
//!
//! let mut cells = AttributeContainer::default();
//! let pos = cells.add_attribute::<[f32; 3]>("pos").unwrap();
//! let visited = cells.add_marker_attribute("visited").unwrap();
//!
//! let a = cells.allocate_rows::<1>();
//! let b = cells.allocate_rows::<1>();
//! cells.set_value(pos, b, [1.0, 2.0, 3.0]);
//! cells.set_value(visited, b, true);
//!
//! // Free `a`; the next allocation reuses it.
//! cells.deallocate_rows::<1>(a);
//! assert_eq!(cells.fragmentation(), 0.5);
//!
//! // Compaction moves `b` down and reports where it went.
//! let remap = cells.compact::<1>();
//! let b = remap.get(b).unwrap();
//! assert_eq!(cells.value(pos, b), Some(&[1.0, 2.0, 3.0]));
//!
//! // Snapshots round-trip through any `io::Write` / `io::Read`.
//! let mut bytes = Vec::new();
//! cells.save(&mut bytes).unwrap();
//! let mut copy = AttributeContainer::default();
//! copy.load(&mut bytes.as_slice()).unwrap();
//! assert_eq!(copy.content_hash().unwrap(), cells.content_hash().unwrap());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strata-core` | Row and column ids, `Element`, codec, errors |
//! | [`column`] | `strata-column` | Chunked columns, type erasure, registry, free list |
//! | [`container`] | `strata-container` | Attribute container, browsers, persistence |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, element codecs and errors (`strata-core`).
pub use strata_core as types;

/// Chunked column storage (`strata-column`).
///
/// [`column::ChunkedColumn`] is the typed storage behind every attribute;
/// [`column::TypeRegistry`] rebuilds columns from stored type tags.
pub use strata_column as column;

/// The attribute container (`strata-container`).
///
/// [`container::AttributeContainer`] plus the [`container::Browser`]
/// traversal strategies.
pub use strata_container as container;

/// Common imports for typical Strata usage.
pub mod prelude {
    pub use strata_column::{ChunkedColumn, TypeRegistry};
    pub use strata_container::{
        AttributeContainer, Browser, ColumnHandle, ContainerConfig, IndexListBrowser,
    };
    pub use strata_core::{ColumnId, ContainerError, Element, PersistError, Row, RowRemap};
}
