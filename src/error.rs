//! Error type for table construction and copies.
//!
//! Lookups never fail: a miss is reported through the type's
//! [`Ordinal::INVALID`](crate::Ordinal::INVALID) sentinel.

use thiserror::Error;

/// Error type for table construction, verification and narrowing copies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Two inputs that must have the same length do not.
    #[error("{what}: expected length {expected}, got {actual}")]
    InvalidArgument {
        /// Which input was wrong.
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// A value does not fit the destination integer type.
    #[error("{what}: one or more values are too large to fit in {target}")]
    Overflow {
        /// What was being converted.
        what: &'static str,
        /// Name of the destination type.
        target: &'static str,
    },

    /// An internal consistency check failed.
    #[error("consistency check failed: {0}")]
    Logic(String),
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;
