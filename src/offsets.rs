//! Bucket offsets ("row pointers") for the compressed bucket layout.
//!
//! Two-pass counting: every key bumps `ptr[bucket + 1]`, then an in-place
//! prefix sum turns counts into bucket starts. Bucket `b` then occupies
//! `val[ptr[b]..ptr[b + 1]]`.

use rayon::prelude::*;

use crate::error::{Result, TableError};
use crate::hash::hash_func;
use crate::ordinal::Ordinal;

/// Bucket index of every key, in input order.
pub(crate) fn hash_keys<K: Ordinal>(
    keys: &[K],
    num_buckets: usize,
    parallel_threshold: usize,
) -> Vec<usize> {
    if num_buckets == 0 {
        return Vec::new();
    }
    if keys.len() >= parallel_threshold {
        keys.par_iter().map(|&k| hash_func(k, num_buckets)).collect()
    } else {
        keys.iter().map(|&k| hash_func(k, num_buckets)).collect()
    }
}

/// Counts keys per bucket and prefix-sums the counts.
///
/// Returns `num_buckets + 1` offsets with `ptr[0] == 0` and
/// `ptr[num_buckets] == hashes.len()`.
pub(crate) fn count_buckets(hashes: &[usize], num_buckets: usize) -> Vec<usize> {
    let mut ptr = vec![0usize; num_buckets + 1];
    for &h in hashes {
        debug_assert!(h < num_buckets);
        ptr[h + 1] += 1;
    }
    for b in 0..num_buckets {
        ptr[b + 1] += ptr[b];
    }
    debug_assert_eq!(ptr[num_buckets], hashes.len());
    ptr
}

/// Converts working offsets to a space's offset type.
///
/// Offsets are bounded by the pair count, so checking the last one is enough.
pub(crate) fn narrow_offsets<O: Ordinal>(ptr: &[usize]) -> Result<Vec<O>> {
    if let Some(&total) = ptr.last() {
        if O::try_from_usize(total).is_none() {
            return Err(TableError::Overflow {
                what: "bucket offsets",
                target: O::NAME,
            });
        }
    }
    Ok(ptr.iter().map(|&p| O::wrapping_from_i128(p as i128)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_buckets() {
        let hashes = [2usize, 0, 2, 4, 2];
        let ptr = count_buckets(&hashes, 5);
        assert_eq!(ptr, vec![0, 1, 1, 4, 4, 5]);
    }

    #[test]
    fn test_count_buckets_empty() {
        assert_eq!(count_buckets(&[], 0), vec![0]);
        assert_eq!(count_buckets(&[], 3), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_offsets_sum_to_len() {
        let keys: Vec<i64> = (0..1000).map(|i| i * 7919 - 300).collect();
        let hashes = hash_keys(&keys, 1543, usize::MAX);
        let ptr = count_buckets(&hashes, 1543);
        assert_eq!(ptr[0], 0);
        assert_eq!(*ptr.last().unwrap(), keys.len());
        assert!(ptr.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_parallel_hashing_matches_serial() {
        let keys: Vec<u32> = (0..5000).map(|i| i * 31).collect();
        let serial = hash_keys(&keys, 6151, usize::MAX);
        let parallel = hash_keys(&keys, 6151, 0);
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_narrow_offsets() {
        let ptr = [0usize, 3, 3, 10];
        assert_eq!(narrow_offsets::<u8>(&ptr).unwrap(), vec![0u8, 3, 3, 10]);
        let big = [0usize, 300];
        assert!(matches!(
            narrow_offsets::<u8>(&big),
            Err(TableError::Overflow { target: "u8", .. })
        ));
    }
}
