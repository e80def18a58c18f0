//! # fixed-hashtable
//!
//! An immutable hash table from integer keys to integer values, built once
//! from a batch of keys. Intended for global-to-local index translation in
//! distributed linear-algebra containers.
//!
//! ## Layout
//!
//! Pairs live in one contiguous array grouped by bucket, with a bucket offset
//! array ("row pointers") delimiting each bucket, as in compressed sparse row
//! storage. Building costs O(1) allocations.
//!
//! ## Example
//!
//! ```rust
//! use fixed_hashtable::{Compact, FixedHashTable};
//!
//! // Global indices owned by this process; local indices are 0, 1, 2, ...
//! let gids = [500i64, 501, 502, 503, 17, 9000];
//! let table: FixedHashTable<i64, i32> = FixedHashTable::from_keys(&gids).unwrap();
//!
//! assert_eq!(table.get(502), 2);
//! assert_eq!(table.get(9000), 5);
//! assert_eq!(table.get(1), -1); // not owned
//! assert_eq!(table.get_key(4), 17);
//! assert!(!table.has_duplicate_keys());
//!
//! // Move to a space with 32-bit offsets.
//! let compact: FixedHashTable<i64, i32, Compact> = table.copy_to().unwrap();
//! assert_eq!(compact.get(17), 4);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod copy;
pub mod error;
mod fill;
pub mod hash;
mod offsets;
pub mod ordinal;
pub mod space;
mod table;

pub use copy::copy_offsets;
pub use error::{Result, TableError};
pub use ordinal::Ordinal;
pub use space::{Compact, Host, MemorySpace, Shared};
pub use table::{ContiguousRange, FixedHashTable, Verbosity};

/// Build-time configuration for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Inputs at least this long are hashed, bounded, scanned for duplicates
    /// and copied on rayon's thread pool.
    pub parallel_threshold: usize,
    /// Run [`FixedHashTable::check`] after construction and after copies.
    pub verify: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parallel_threshold: 16 * 1024,
            verify: cfg!(debug_assertions),
        }
    }
}


#[cfg(test)]
mod proptests;
