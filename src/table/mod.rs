//! The fixed hash table: construction and lookups.
//!
//! Storage follows a compressed-bucket ("compressed sparse row") layout. The
//! hash function picks a bucket, `ptr[b]..ptr[b + 1]` delimits that bucket's
//! run in `val`, and each run holds its (key, value) pairs side by side. There
//! are O(1) allocations regardless of the number of keys or buckets.
//!
//! Tables built from keys alone assign contiguous values. If the keys start
//! with a run `k, k + 1, k + 2, ...`, all but the last key of that run are
//! answered arithmetically and never stored.

mod describe;

pub use describe::Verbosity;

use std::sync::atomic::{AtomicU8, Ordering};

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::error::{Result, TableError};
use crate::fill::{fill_pairs, Values};
use crate::hash::{hash_func, recommended_size};
use crate::offsets::{count_buckets, hash_keys, narrow_offsets};
use crate::ordinal::Ordinal;
use crate::space::{Host, MemorySpace};
use crate::Config;

/// Leading run of consecutive keys served without a table probe.
///
/// Key `k` with `first <= k <= last` maps to `min_val + (k - first)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContiguousRange<K> {
    first: K,
    last: K,
}

impl<K: Ordinal> ContiguousRange<K> {
    /// First key of the run.
    #[inline]
    pub fn first(&self) -> K {
        self.first
    }

    /// Last key of the run (inclusive).
    #[inline]
    pub fn last(&self) -> K {
        self.last
    }

    /// Number of keys in the run.
    #[inline]
    pub fn len(&self) -> usize {
        self.span() + 1
    }

    /// Always false; a run holds at least its first key.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub(crate) fn span(&self) -> usize {
        (self.last.to_i128() - self.first.to_i128()) as usize
    }

    /// Whether `key` is in the run.
    #[inline]
    pub fn contains(&self, key: K) -> bool {
        self.first <= key && key <= self.last
    }
}

const DUPLICATES_UNKNOWN: u8 = 0;
const DUPLICATES_NO: u8 = 1;
const DUPLICATES_YES: u8 = 2;

/// Cached result of the duplicate-key scan. Written once.
struct DuplicateCache(AtomicU8);

impl DuplicateCache {
    fn new() -> Self {
        Self(AtomicU8::new(DUPLICATES_UNKNOWN))
    }

    #[inline]
    fn get(&self) -> Option<bool> {
        match self.0.load(Ordering::Acquire) {
            DUPLICATES_NO => Some(false),
            DUPLICATES_YES => Some(true),
            _ => None,
        }
    }

    /// Racing publishers computed the same answer; the first one wins.
    fn publish(&self, found: bool) {
        let state = if found { DUPLICATES_YES } else { DUPLICATES_NO };
        let _ = self.0.compare_exchange(
            DUPLICATES_UNKNOWN,
            state,
            Ordering::Release,
            Ordering::Relaxed,
        );
    }
}

impl Clone for DuplicateCache {
    fn clone(&self) -> Self {
        Self(AtomicU8::new(self.0.load(Ordering::Acquire)))
    }
}

/// Immutable lookup table from integer keys to integer values.
///
/// All pairs are supplied at construction; nothing can be inserted, changed
/// or removed afterwards. Keys and values may be different integer types. `M`
/// picks the memory space, which fixes the offset type and array container.
///
/// # Example
///
/// ```rust
/// use fixed_hashtable::FixedHashTable;
///
/// let table: FixedHashTable<i64, i32> = FixedHashTable::from_keys(&[100, 101, 102, 7, 42]).unwrap();
/// assert_eq!(table.get(101), 1);
/// assert_eq!(table.get(42), 4);
/// assert_eq!(table.get(5), -1);
/// assert_eq!(table.get_key(3), 7);
/// ```
pub struct FixedHashTable<K: Ordinal, V: Ordinal, M: MemorySpace = Host> {
    /// Retained input keys; only present when requested at construction.
    pub(crate) keys: Option<M::Array<K>>,
    /// Bucket offsets, `num_buckets + 1` long (empty for a default table).
    pub(crate) ptr: M::Array<M::Offset>,
    /// Pairs, grouped by bucket.
    pub(crate) val: M::Array<(K, V)>,
    pub(crate) min_key: K,
    pub(crate) max_key: K,
    pub(crate) min_val: V,
    pub(crate) max_val: V,
    pub(crate) contiguous: Option<ContiguousRange<K>>,
    pub(crate) config: Config,
    duplicates: DuplicateCache,
}

fn bounds<T: Ordinal>(xs: &[T], parallel_threshold: usize) -> Option<(T, T)> {
    let merge = |(lo0, hi0): (T, T), (lo1, hi1): (T, T)| (lo0.min(lo1), hi0.max(hi1));
    if xs.len() >= parallel_threshold {
        xs.par_iter().map(|&x| (x, x)).reduce_with(merge)
    } else {
        xs.iter().map(|&x| (x, x)).reduce(merge)
    }
}

/// Length of the leading run of consecutive keys (at least 1 if non-empty).
fn leading_run<K: Ordinal>(keys: &[K]) -> usize {
    let Some(&first) = keys.first() else {
        return 0;
    };
    let mut next = first.to_i128() + 1;
    let mut len = 1;
    for &k in &keys[1..] {
        if k.to_i128() != next {
            break;
        }
        next += 1;
        len += 1;
    }
    len
}

impl<K: Ordinal, V: Ordinal, M: MemorySpace> FixedHashTable<K, V, M> {
    /// Creates an empty table. Every lookup misses.
    pub fn new() -> Self {
        Self {
            keys: None,
            ptr: M::empty(),
            val: M::empty(),
            min_key: K::MAX,
            max_key: K::MIN,
            min_val: V::MAX,
            max_val: V::MIN,
            contiguous: None,
            config: Config::default(),
            duplicates: DuplicateCache::new(),
        }
    }

    /// Maps `keys[i]` to `i` and keeps a copy of the keys, so
    /// [`get_key`](Self::get_key) is available.
    pub fn from_keys(keys: &[K]) -> Result<Self> {
        Self::from_keys_with_config(keys, V::ZERO, true, &Config::default())
    }

    /// Maps `keys[i]` to `starting_value + i`.
    ///
    /// With `keep_keys`, the table keeps a copy of `keys` so values can be
    /// turned back into keys.
    pub fn from_keys_starting_at(keys: &[K], starting_value: V, keep_keys: bool) -> Result<Self> {
        Self::from_keys_with_config(keys, starting_value, keep_keys, &Config::default())
    }

    /// [`from_keys_starting_at`](Self::from_keys_starting_at) with explicit
    /// configuration.
    #[instrument(level = "debug", skip_all, fields(num_keys = keys.len(), space = M::NAME))]
    pub fn from_keys_with_config(
        keys: &[K],
        starting_value: V,
        keep_keys: bool,
        config: &Config,
    ) -> Result<Self> {
        let mut table = Self::new();
        table.config = *config;
        if keep_keys {
            table.keys = Some(M::from_vec(keys.to_vec()));
        }
        if keys.is_empty() {
            table.ptr = M::from_vec(vec![M::Offset::ZERO]);
            return Ok(table);
        }

        let num_keys = keys.len();
        let max_val = V::try_from_i128(starting_value.to_i128() + num_keys as i128 - 1).ok_or(
            TableError::Overflow {
                what: "contiguous values",
                target: V::NAME,
            },
        )?;

        // The last key of the leading run is stored, so the run is never
        // empty and the stored keys never are either.
        let run = leading_run(keys);
        let start_index = run - 1;
        let stored = &keys[start_index..];
        let first_stored_val =
            V::wrapping_from_i128(starting_value.to_i128() + start_index as i128);

        let num_buckets = recommended_size(stored.len());
        let hashes = hash_keys(stored, num_buckets, config.parallel_threshold);
        let ptr = count_buckets(&hashes, num_buckets);
        let offsets = narrow_offsets::<M::Offset>(&ptr)?;
        let val = fill_pairs(&ptr, &hashes, stored, Values::Contiguous(first_stored_val))?;

        if let Some((lo, hi)) = bounds(keys, config.parallel_threshold) {
            table.min_key = lo;
            table.max_key = hi;
        }
        table.min_val = starting_value;
        table.max_val = max_val;
        table.contiguous = Some(ContiguousRange {
            first: keys[0],
            last: keys[start_index],
        });
        table.ptr = M::from_vec(offsets);
        table.val = M::from_vec(val);

        debug!(
            num_buckets,
            contiguous_run = run,
            stored_pairs = table.val.len(),
            "built contiguous-value table"
        );
        if config.verify {
            table.check()?;
        }
        Ok(table)
    }

    /// Maps `keys[i]` to `vals[i]`.
    ///
    /// Fails with [`TableError::InvalidArgument`] if the lengths differ. Such
    /// a table never keeps its keys.
    pub fn from_pairs(keys: &[K], vals: &[V]) -> Result<Self> {
        Self::from_pairs_with_config(keys, vals, &Config::default())
    }

    /// [`from_pairs`](Self::from_pairs) with explicit configuration.
    #[instrument(level = "debug", skip_all, fields(num_keys = keys.len(), space = M::NAME))]
    pub fn from_pairs_with_config(keys: &[K], vals: &[V], config: &Config) -> Result<Self> {
        if keys.len() != vals.len() {
            return Err(TableError::InvalidArgument {
                what: "values",
                expected: keys.len(),
                actual: vals.len(),
            });
        }

        let mut table = Self::new();
        table.config = *config;

        let num_buckets = recommended_size(keys.len());
        let hashes = hash_keys(keys, num_buckets, config.parallel_threshold);
        let ptr = count_buckets(&hashes, num_buckets);
        let offsets = narrow_offsets::<M::Offset>(&ptr)?;
        let val = fill_pairs(&ptr, &hashes, keys, Values::Explicit(vals))?;

        if let Some((lo, hi)) = bounds(keys, config.parallel_threshold) {
            table.min_key = lo;
            table.max_key = hi;
        }
        if let Some((lo, hi)) = bounds(vals, config.parallel_threshold) {
            table.min_val = lo;
            table.max_val = hi;
        }
        table.ptr = M::from_vec(offsets);
        table.val = M::from_vec(val);

        debug!(num_buckets, stored_pairs = table.val.len(), "built table");
        if config.verify {
            table.check()?;
        }
        Ok(table)
    }

    /// Value for `key`, or `V::INVALID` if the key is absent.
    ///
    /// If the key was inserted more than once, the first occurrence wins.
    #[inline]
    pub fn get(&self, key: K) -> V {
        if let Some(range) = &self.contiguous {
            if range.contains(key) {
                return V::wrapping_from_i128(
                    key.to_i128() - range.first.to_i128() + self.min_val.to_i128(),
                );
            }
        }

        let size = self.num_buckets();
        if size == 0 {
            return V::INVALID;
        }
        let b = hash_func(key, size);
        let start = self.ptr[b].to_usize();
        let end = self.ptr[b + 1].to_usize();
        self.val[start..end]
            .iter()
            .find(|&&(k, _)| k == key)
            .map_or(V::INVALID, |&(_, v)| v)
    }

    /// Key for `val`, or `K::INVALID` if `val` is out of range.
    ///
    /// Reverse lookup indexes the retained keys by `val - min_val`, which is
    /// only meaningful for tables built with contiguous values and
    /// `keep_keys`. On any other table the result is `K::INVALID` or an
    /// arbitrary key; calling it there is a caller error.
    #[inline]
    pub fn get_key(&self, val: V) -> K {
        if val < self.min_val || val > self.max_val {
            return K::INVALID;
        }
        let Some(keys) = &self.keys else {
            return K::INVALID;
        };
        let index = (val.to_i128() - self.min_val.to_i128()) as usize;
        keys.get(index).copied().unwrap_or(K::INVALID)
    }

    /// Whether [`get_key`](Self::get_key) can be used.
    #[inline]
    pub fn has_keys(&self) -> bool {
        self.keys.is_some()
    }

    /// Number of pairs the table represents, duplicates included.
    #[inline]
    pub fn num_pairs(&self) -> usize {
        self.val.len() + self.contiguous.map_or(0, |r| r.span())
    }

    /// Whether the table represents no pairs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_pairs() == 0
    }

    /// Number of hash buckets.
    #[inline]
    pub fn num_buckets(&self) -> usize {
        self.ptr.len().saturating_sub(1)
    }

    /// Smallest key. Unspecified for an empty table.
    #[inline]
    pub fn min_key(&self) -> K {
        self.min_key
    }

    /// Largest key. Unspecified for an empty table.
    #[inline]
    pub fn max_key(&self) -> K {
        self.max_key
    }

    /// Smallest value. Unspecified for an empty table.
    #[inline]
    pub fn min_val(&self) -> V {
        self.min_val
    }

    /// Largest value. Unspecified for an empty table.
    #[inline]
    pub fn max_val(&self) -> V {
        self.max_val
    }

    /// Whether values were assigned contiguously from the keys' positions.
    #[inline]
    pub fn has_contiguous_values(&self) -> bool {
        self.contiguous.is_some()
    }

    /// The leading run of keys answered without a probe, if any.
    #[inline]
    pub fn contiguous_range(&self) -> Option<ContiguousRange<K>> {
        self.contiguous
    }

    /// Retained keys, if the table kept them.
    pub fn keys(&self) -> Option<&[K]> {
        self.keys.as_deref()
    }

    /// Bucket offsets.
    pub fn offsets(&self) -> &[M::Offset] {
        &self.ptr
    }

    /// Stored pairs, grouped by bucket.
    pub fn pairs(&self) -> &[(K, V)] {
        &self.val
    }

    /// Whether any key occurs more than once.
    ///
    /// The first call scans the table; the answer is cached for later calls.
    pub fn has_duplicate_keys(&self) -> bool {
        if let Some(found) = self.duplicates.get() {
            return found;
        }
        let found = self.check_for_duplicate_keys();
        self.duplicates.publish(found);
        debug!(found, "checked for duplicate keys");
        found
    }

    fn check_for_duplicate_keys(&self) -> bool {
        let bucket_has_duplicate = |b: usize| {
            let start = self.ptr[b].to_usize();
            let end = self.ptr[b + 1].to_usize();
            let bucket = &self.val[start..end];
            bucket
                .iter()
                .enumerate()
                .any(|(i, &(k, _))| bucket[..i].iter().any(|&(prev, _)| prev == k))
        };

        let size = self.num_buckets();
        let in_buckets = if self.val.len() >= self.config.parallel_threshold {
            (0..size).into_par_iter().any(bucket_has_duplicate)
        } else {
            (0..size).any(bucket_has_duplicate)
        };

        // Only the run's last key is stored; any other stored key inside the
        // run repeats a key answered arithmetically.
        in_buckets
            || self.contiguous.is_some_and(|range| {
                self.val.iter().filter(|&&(k, _)| range.contains(k)).count() > 1
            })
    }

    /// Verifies the table's structural invariants.
    ///
    /// Fails with [`TableError::Logic`] describing the first violation.
    pub fn check(&self) -> Result<()> {
        let fail = |msg: String| Err(TableError::Logic(msg));

        if self.ptr.is_empty() {
            if !self.val.is_empty() {
                return fail(format!("no buckets but {} stored pairs", self.val.len()));
            }
        } else {
            if self.ptr[0] != M::Offset::ZERO {
                return fail(format!("ptr[0] = {} != 0", self.ptr[0]));
            }
            if let Some(i) = self.ptr.windows(2).position(|w| w[0] > w[1]) {
                return fail(format!(
                    "ptr is not monotone: ptr[{}] = {} > ptr[{}] = {}",
                    i,
                    self.ptr[i],
                    i + 1,
                    self.ptr[i + 1]
                ));
            }
            let last = self.ptr[self.ptr.len() - 1].to_usize();
            if last != self.val.len() {
                return fail(format!(
                    "ptr[{}] = {} != number of stored pairs {}",
                    self.num_buckets(),
                    last,
                    self.val.len()
                ));
            }
            let size = self.num_buckets();
            for b in 0..size {
                let start = self.ptr[b].to_usize();
                let end = self.ptr[b + 1].to_usize();
                if let Some(&(k, _)) = self.val[start..end]
                    .iter()
                    .find(|&&(k, _)| hash_func(k, size) != b)
                {
                    return fail(format!("key {} stored in bucket {} but hashes elsewhere", k, b));
                }
            }
        }

        if let Some(keys) = &self.keys {
            if self.has_contiguous_values() && keys.len() != self.num_pairs() {
                return fail(format!(
                    "{} retained keys but {} pairs",
                    keys.len(),
                    self.num_pairs()
                ));
            }
        }
        if let Some(range) = &self.contiguous {
            if range.first > range.last {
                return fail(format!(
                    "contiguous range [{}, {}] is inverted",
                    range.first, range.last
                ));
            }
        }
        if !self.is_empty() && (self.min_key > self.max_key || self.min_val > self.max_val) {
            return fail(format!(
                "bounds are inverted: keys [{}, {}], values [{}, {}]",
                self.min_key, self.max_key, self.min_val, self.max_val
            ));
        }
        Ok(())
    }

    /// Copies every field but the storage arrays, which the caller supplies.
    pub(crate) fn with_storage<M2: MemorySpace>(
        &self,
        keys: Option<M2::Array<K>>,
        ptr: M2::Array<M2::Offset>,
        val: M2::Array<(K, V)>,
    ) -> FixedHashTable<K, V, M2> {
        FixedHashTable {
            keys,
            ptr,
            val,
            min_key: self.min_key,
            max_key: self.max_key,
            min_val: self.min_val,
            max_val: self.max_val,
            contiguous: self.contiguous,
            config: self.config,
            duplicates: self.duplicates.clone(),
        }
    }
}

impl<K: Ordinal, V: Ordinal, M: MemorySpace> Default for FixedHashTable<K, V, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ordinal, V: Ordinal, M: MemorySpace> Clone for FixedHashTable<K, V, M> {
    fn clone(&self) -> Self {
        self.with_storage::<M>(self.keys.clone(), self.ptr.clone(), self.val.clone())
    }
}
