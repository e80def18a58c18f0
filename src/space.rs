//! Memory spaces a table can live in.
//!
//! A space fixes two things: the integer type used for bucket offsets and the
//! immutable container holding the table's arrays. Moving a table between
//! spaces goes through [`FixedHashTable::copy_to`], never an implicit
//! conversion.
//!
//! [`FixedHashTable::copy_to`]: crate::FixedHashTable::copy_to

use std::ops::Deref;
use std::sync::Arc;

use crate::ordinal::Ordinal;

/// Element types storable in a space's arrays.
pub trait Element: Copy + Send + Sync + 'static {}

impl<T: Copy + Send + Sync + 'static> Element for T {}

/// An execution/memory context for table storage.
pub trait MemorySpace: Send + Sync + 'static {
    /// Integer type of bucket offsets in this space.
    type Offset: Ordinal;

    /// Immutable array container.
    type Array<T: Element>: Deref<Target = [T]> + Clone + Send + Sync;

    /// Space name, for descriptions.
    const NAME: &'static str;

    /// Takes ownership of a freshly built array.
    fn from_vec<T: Element>(v: Vec<T>) -> Self::Array<T>;

    /// An empty array.
    #[inline]
    fn empty<T: Element>() -> Self::Array<T> {
        Self::from_vec(Vec::new())
    }
}

/// Default space: `usize` offsets, uniquely owned arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct Host;

impl MemorySpace for Host {
    type Offset = usize;
    type Array<T: Element> = Box<[T]>;

    const NAME: &'static str = "Host";

    #[inline]
    fn from_vec<T: Element>(v: Vec<T>) -> Self::Array<T> {
        v.into_boxed_slice()
    }
}

/// `u64` offsets, reference-counted arrays. Cloning a table in this space
/// shares its (immutable) storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shared;

impl MemorySpace for Shared {
    type Offset = u64;
    type Array<T: Element> = Arc<[T]>;

    const NAME: &'static str = "Shared";

    #[inline]
    fn from_vec<T: Element>(v: Vec<T>) -> Self::Array<T> {
        Arc::from(v)
    }
}

/// `u32` offsets, uniquely owned arrays. Halves the offset array on 64-bit
/// targets; limited to `u32::MAX` stored pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compact;

impl MemorySpace for Compact {
    type Offset = u32;
    type Array<T: Element> = Box<[T]>;

    const NAME: &'static str = "Compact";

    #[inline]
    fn from_vec<T: Element>(v: Vec<T>) -> Self::Array<T> {
        v.into_boxed_slice()
    }
}
