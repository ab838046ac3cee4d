//! Error types for the Strata attribute store.
//!
//! Two families: [`ContainerError`] for recoverable attribute lookup and
//! registration failures, and [`PersistError`] for save/load. Misuse of
//! row lifetimes (freeing a hole, popping an empty free list) is not an
//! error value: it panics, since the caller's bookkeeping is already
//! corrupt at that point.

use std::error::Error;
use std::fmt;
use std::io;

/// Errors from attribute management on a container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerError {
    /// An attribute with this name already exists.
    DuplicateName {
        /// The conflicting name.
        name: String,
    },
    /// No attribute with this name (or identity) exists.
    NotFound {
        /// The name that was looked up.
        name: String,
    },
    /// A typed lookup found a column of a different element type.
    TypeMismatch {
        /// The attribute name.
        name: String,
        /// Type tag requested by the caller.
        expected: &'static str,
        /// Type tag stored with the column.
        found: String,
    },
    /// The attribute name does not fit the persisted name bound.
    NameTooLong {
        /// The rejected name.
        name: String,
        /// Its length in bytes.
        len: usize,
        /// Exclusive upper bound on the length.
        max: usize,
    },
    /// Container configuration was rejected.
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName { name } => write!(f, "attribute '{name}' already exists"),
            Self::NotFound { name } => write!(f, "attribute '{name}' not found"),
            Self::TypeMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "attribute '{name}' has type {found}, requested {expected}"
            ),
            Self::NameTooLong { name, len, max } => write!(
                f,
                "attribute name '{name}' is {len} bytes, must be shorter than {max}"
            ),
            Self::InvalidConfig { reason } => write!(f, "invalid container config: {reason}"),
        }
    }
}

impl Error for ContainerError {}

/// Errors from saving or loading a container.
#[derive(Debug)]
pub enum PersistError {
    /// The underlying stream failed or ended early.
    Io(io::Error),
    /// A column's stored type tag is not in the type registry.
    UnknownTypeTag {
        /// The unrecognised tag.
        tag: String,
    },
    /// A stored name or type tag reaches the load buffer bound.
    NameTooLong {
        /// Declared string length, terminator excluded.
        len: u32,
        /// Exclusive upper bound on the string length.
        max: u32,
    },
    /// The stream decoded but describes an inconsistent container.
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnknownTypeTag { tag } => write!(f, "unknown column type tag '{tag}'"),
            Self::NameTooLong { len, max } => {
                write!(f, "stored string length {len} reaches bound {max}")
            }
            Self::Malformed { detail } => write!(f, "malformed container stream: {detail}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PersistError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
