//! Moving tables between memory spaces.
//!
//! Spaces may use different offset types, so the offset array cannot be
//! copied verbatim. When the destination type can hold every value of the
//! source type the copy is a plain conversion; otherwise each element is
//! range-checked and a single out-of-range offset fails the whole copy.
//! Pairs and retained keys have the same types on both sides and are copied
//! in bulk.

use rayon::prelude::*;
use tracing::{instrument, warn};

use crate::error::{Result, TableError};
use crate::ordinal::{output_can_fit_input, Ordinal};
use crate::space::MemorySpace;
use crate::table::FixedHashTable;

/// Copies `src` into `dst`, converting each offset to `Out`.
///
/// Fails with [`TableError::InvalidArgument`] if the lengths differ and with
/// [`TableError::Overflow`] if any element of `src` does not fit in `Out`. On
/// overflow `dst` holds truncated values and must not be used.
pub fn copy_offsets<Out: Ordinal, In: Ordinal>(
    dst: &mut [Out],
    src: &[In],
    parallel_threshold: usize,
) -> Result<()> {
    if dst.len() != src.len() {
        return Err(TableError::InvalidArgument {
            what: "offset copy destination",
            expected: src.len(),
            actual: dst.len(),
        });
    }

    let convert = |(d, &s): (&mut Out, &In)| {
        *d = Out::wrapping_from_i128(s.to_i128());
    };
    if output_can_fit_input::<Out, In>() {
        if src.len() >= parallel_threshold {
            dst.par_iter_mut().zip(src.par_iter()).for_each(convert);
        } else {
            dst.iter_mut().zip(src).for_each(convert);
        }
        return Ok(());
    }

    let (lo, hi) = (Out::MIN.to_i128(), Out::MAX.to_i128());
    let checked = |(d, &s): (&mut Out, &In)| {
        let v = s.to_i128();
        *d = Out::wrapping_from_i128(v);
        lo <= v && v <= hi
    };
    let no_overflow = if src.len() >= parallel_threshold {
        dst.par_iter_mut()
            .zip(src.par_iter())
            .map(checked)
            .reduce(|| true, |a, b| a && b)
    } else {
        dst.iter_mut().zip(src).map(checked).fold(true, |a, b| a && b)
    };

    if no_overflow {
        Ok(())
    } else {
        Err(TableError::Overflow {
            what: "bucket offsets",
            target: Out::NAME,
        })
    }
}

impl<K: Ordinal, V: Ordinal, M: MemorySpace> FixedHashTable<K, V, M> {
    /// Copies the table into memory space `M2`.
    ///
    /// The copy owns its storage and shares nothing mutable with `self`.
    /// Fails with [`TableError::Overflow`] if an offset does not fit
    /// `M2::Offset`.
    #[instrument(level = "debug", skip_all, fields(from = M::NAME, to = M2::NAME, num_pairs = self.num_pairs()))]
    pub fn copy_to<M2: MemorySpace>(&self) -> Result<FixedHashTable<K, V, M2>> {
        let mut ptr = vec![M2::Offset::ZERO; self.ptr.len()];
        let copied = copy_offsets::<M2::Offset, M::Offset>(
            &mut ptr,
            &self.ptr,
            self.config.parallel_threshold,
        );
        if let Err(e) = copied {
            warn!(error = %e, "offsets do not fit the destination space");
            return Err(e);
        }
        let val = M2::from_vec(self.val.to_vec());
        let keys = self.keys.as_ref().map(|k| M2::from_vec(k.to_vec()));

        let copy = self.with_storage::<M2>(keys, M2::from_vec(ptr), val);
        if self.config.verify {
            copy.check()?;
        }
        Ok(copy)
    }
}
