//! Scatters (key, value) pairs into their buckets.

use crate::error::{Result, TableError};
use crate::ordinal::Ordinal;

/// Where the value of the `i`-th stored key comes from.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Values<'a, V> {
    /// `first + i`. The caller has already checked that the last value fits.
    Contiguous(V),
    /// `vals[i]`.
    Explicit(&'a [V]),
}

impl<V: Ordinal> Values<'_, V> {
    #[inline]
    fn value(&self, i: usize) -> V {
        match *self {
            Values::Contiguous(first) => V::wrapping_from_i128(first.to_i128() + i as i128),
            Values::Explicit(vals) => vals[i],
        }
    }
}

/// Builds pair storage from bucket starts.
///
/// A working copy of `ptr` serves as per-bucket write cursors, so pairs keep
/// their input order within a bucket and `ptr` is left untouched.
pub(crate) fn fill_pairs<K: Ordinal, V: Ordinal>(
    ptr: &[usize],
    hashes: &[usize],
    keys: &[K],
    values: Values<'_, V>,
) -> Result<Vec<(K, V)>> {
    if let Values::Explicit(vals) = values {
        if vals.len() != keys.len() {
            return Err(TableError::InvalidArgument {
                what: "values",
                expected: keys.len(),
                actual: vals.len(),
            });
        }
    }
    debug_assert_eq!(hashes.len(), keys.len());

    let mut val = vec![(K::ZERO, V::ZERO); keys.len()];
    if keys.is_empty() {
        return Ok(val);
    }

    let mut cursor = ptr[..ptr.len() - 1].to_vec();
    for (i, (&key, &h)) in keys.iter().zip(hashes).enumerate() {
        let pos = cursor[h];
        val[pos] = (key, values.value(i));
        cursor[h] = pos + 1;
    }
    debug_assert!(cursor.iter().zip(&ptr[1..]).all(|(c, end)| c == end));
    Ok(val)
}
