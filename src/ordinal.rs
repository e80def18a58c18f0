//! Fixed-width integer types usable as keys, values and bucket offsets.
//!
//! Every ordinal is widened losslessly to `i128` for arithmetic that mixes
//! types (key differences, offsets into value ranges), and narrowed back with
//! either a checked or a wrapping conversion.

use std::fmt::{Debug, Display};
use std::hash::Hash;

mod private {
    pub trait Sealed {}
    impl Sealed for i8 {}
    impl Sealed for i16 {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for isize {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
    impl Sealed for usize {}
}

/// Trait for the built-in integer types a [`FixedHashTable`] can hold.
///
/// Sealed: only the primitive integers up to 64 bits are valid.
///
/// [`FixedHashTable`]: crate::FixedHashTable
pub trait Ordinal:
    private::Sealed
    + Copy
    + Ord
    + Eq
    + Hash
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + 'static
{
    /// Smallest representable value.
    const MIN: Self;
    /// Largest representable value.
    const MAX: Self;
    /// Zero.
    const ZERO: Self;
    /// Reserved "not found" value: `-1` for signed types, `MAX` for unsigned.
    const INVALID: Self;
    /// Whether the type is signed.
    const SIGNED: bool;
    /// Width in bytes.
    const BYTES: usize;
    /// Type name, for descriptions and error messages.
    const NAME: &'static str;

    /// Lossless widening.
    fn to_i128(self) -> i128;

    /// Checked narrowing; `None` if `v` is out of range.
    fn try_from_i128(v: i128) -> Option<Self>;

    /// Truncating narrowing (two's complement wrap).
    fn wrapping_from_i128(v: i128) -> Self;

    /// Little-endian bytes, zero-padded to eight.
    fn le_bytes(self) -> [u8; 8];

    /// Checked conversion from a length or index.
    #[inline]
    fn try_from_usize(n: usize) -> Option<Self> {
        Self::try_from_i128(n as i128)
    }

    /// Interprets a non-negative ordinal as an index.
    ///
    /// Only meaningful for offsets and in-range value differences.
    #[inline]
    fn to_usize(self) -> usize {
        self.to_i128() as usize
    }
}

macro_rules! impl_ordinal {
    ($($t:ty => $signed:expr),* $(,)?) => {
        $(
            impl Ordinal for $t {
                const MIN: Self = <$t>::MIN;
                const MAX: Self = <$t>::MAX;
                const ZERO: Self = 0;
                const INVALID: Self = (-1i128) as $t;
                const SIGNED: bool = $signed;
                const BYTES: usize = std::mem::size_of::<$t>();
                const NAME: &'static str = stringify!($t);

                #[inline]
                fn to_i128(self) -> i128 {
                    self as i128
                }

                #[inline]
                fn try_from_i128(v: i128) -> Option<Self> {
                    <$t>::try_from(v).ok()
                }

                #[inline]
                fn wrapping_from_i128(v: i128) -> Self {
                    v as $t
                }

                #[inline]
                fn le_bytes(self) -> [u8; 8] {
                    let mut out = [0u8; 8];
                    out[..std::mem::size_of::<$t>()].copy_from_slice(&self.to_le_bytes());
                    out
                }
            }
        )*
    };
}

impl_ordinal! {
    i8 => true,
    i16 => true,
    i32 => true,
    i64 => true,
    isize => true,
    u8 => false,
    u16 => false,
    u32 => false,
    u64 => false,
    usize => false,
}

/// Whether `Out` can represent every value of `In`.
///
/// Decided from the two types' bounds, so the answer is a constant per
/// instantiation. When it is `true`, converting `In` to `Out` never needs a
/// range check.
#[inline]
pub fn output_can_fit_input<Out: Ordinal, In: Ordinal>() -> bool {
    Out::MIN.to_i128() <= In::MIN.to_i128() && Out::MAX.to_i128() >= In::MAX.to_i128()
}

/// Converts between ordinals, returning `None` on overflow.
#[inline]
pub fn checked_cast<Out: Ordinal, In: Ordinal>(v: In) -> Option<Out> {
    Out::try_from_i128(v.to_i128())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_sentinel() {
        assert_eq!(<i32 as Ordinal>::INVALID, -1);
        assert_eq!(<i64 as Ordinal>::INVALID, -1);
        assert_eq!(<u32 as Ordinal>::INVALID, u32::MAX);
        assert_eq!(<usize as Ordinal>::INVALID, usize::MAX);
    }

    #[test]
    fn test_output_can_fit_input() {
        assert!(output_can_fit_input::<u64, u32>());
        assert!(output_can_fit_input::<i64, u32>());
        assert!(output_can_fit_input::<i64, i32>());
        assert!(output_can_fit_input::<u32, u32>());
        assert!(!output_can_fit_input::<u32, u64>());
        assert!(!output_can_fit_input::<u32, i32>());
        assert!(!output_can_fit_input::<i32, u32>());
        assert!(!output_can_fit_input::<u64, i64>());
        assert!(!output_can_fit_input::<i64, u64>());
    }

    #[test]
    fn test_checked_cast() {
        assert_eq!(checked_cast::<u32, u64>(7), Some(7u32));
        assert_eq!(checked_cast::<u32, u64>(1 << 40), None);
        assert_eq!(checked_cast::<u8, i32>(-1), None);
        assert_eq!(checked_cast::<i64, u8>(255), Some(255i64));
    }

    #[test]
    fn test_le_bytes_padding() {
        assert_eq!(0x0102u16.le_bytes(), [2, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!((-1i32).le_bytes(), [0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0]);
    }
}
