//! Core types and traits for the Strata attribute store.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other Strata crate: row and column
//! identifiers, the [`Element`] trait that makes a type storable in a
//! column, the little-endian codec used for persistence, and the error
//! types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod element;
pub mod error;
pub mod id;

pub use element::Element;
pub use error::{ContainerError, PersistError};
pub use id::{ColumnId, Row, RowRemap};
