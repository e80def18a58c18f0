use std::fmt::{self, Write};

use super::FixedHashTable;
use crate::ordinal::Ordinal;
use crate::space::MemorySpace;

/// How much [`FixedHashTable::describe`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Nothing.
    None,
    /// The one-line description.
    #[default]
    Low,
    /// Adds bounds and the contiguous range.
    Medium,
    /// Adds the bucket offsets.
    High,
    /// Adds every stored pair.
    Extreme,
}

impl<K: Ordinal, V: Ordinal, M: MemorySpace> fmt::Display for FixedHashTable<K, V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FixedHashTable<{}, {}, {}> {{ pairs: {}, buckets: {}, contiguous: {} }}",
            K::NAME,
            V::NAME,
            M::NAME,
            self.num_pairs(),
            self.num_buckets(),
            self.has_contiguous_values()
        )
    }
}

impl<K: Ordinal, V: Ordinal, M: MemorySpace> fmt::Debug for FixedHashTable<K, V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedHashTable")
            .field("space", &M::NAME)
            .field("num_pairs", &self.num_pairs())
            .field("num_buckets", &self.num_buckets())
            .field("min_key", &self.min_key)
            .field("max_key", &self.max_key)
            .field("min_val", &self.min_val)
            .field("max_val", &self.max_val)
            .field("contiguous", &self.contiguous)
            .field("has_keys", &self.has_keys())
            .finish()
    }
}

impl<K: Ordinal, V: Ordinal, M: MemorySpace> FixedHashTable<K, V, M> {
    /// Writes a human-readable dump of the table to `out`.
    pub fn describe<W: Write>(&self, out: &mut W, verbosity: Verbosity) -> fmt::Result {
        if verbosity == Verbosity::None {
            return Ok(());
        }
        writeln!(out, "{}", self)?;
        if verbosity < Verbosity::Medium {
            return Ok(());
        }

        if self.is_empty() {
            writeln!(out, "  keys: (empty)")?;
        } else {
            writeln!(out, "  keys: [{}, {}]", self.min_key, self.max_key)?;
            writeln!(out, "  values: [{}, {}]", self.min_val, self.max_val)?;
        }
        match &self.contiguous {
            Some(range) => writeln!(out, "  contiguous: [{}, {}]", range.first, range.last)?,
            None => writeln!(out, "  contiguous: none")?,
        }
        writeln!(out, "  has keys: {}", self.has_keys())?;
        if verbosity < Verbosity::High {
            return Ok(());
        }

        write!(out, "  ptr: [")?;
        for (i, p) in self.ptr.iter().enumerate() {
            if i > 0 {
                write!(out, ", ")?;
            }
            write!(out, "{}", p)?;
        }
        writeln!(out, "]")?;
        if verbosity < Verbosity::Extreme {
            return Ok(());
        }

        for b in 0..self.num_buckets() {
            let start = self.ptr[b].to_usize();
            let end = self.ptr[b + 1].to_usize();
            if start == end {
                continue;
            }
            write!(out, "  bucket {}:", b)?;
            for &(k, v) in &self.val[start..end] {
                write!(out, " ({}, {})", k, v)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}
