//! Bucket hashing for integer keys.
//!
//! Keys are hashed with 32-bit MurmurHash3 over their little-endian bytes and
//! reduced modulo the bucket count. Bucket counts come from a fixed ladder of
//! primes, so `recommended_size(n) >= n` for every `n` up to the largest prime.

use crate::ordinal::Ordinal;

const SEED: u32 = 42;

/// Bucket counts, smallest first.
const PRIMES: [usize; 30] = [
    3, 7, 13, 23, 53, 97, 193, 389, 769, 1543, 3079, 6151, 12289, 24593, 49157, 98317, 196613,
    393241, 786433, 1572869, 3145739, 6291469, 12582917, 25165843, 50331653, 100663319,
    201326611, 402653189, 805306457, 1610612741,
];

#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// MurmurHash3 (x86, 32-bit) of `data`.
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    const C1: u32 = 0xcc9e_2d51;
    const C2: u32 = 0x1b87_3593;

    let mut h1 = seed;
    let mut chunks = data.chunks_exact(4);
    for block in &mut chunks {
        let mut k1 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        k1 = k1.wrapping_mul(C1);
        k1 = k1.rotate_left(15);
        k1 = k1.wrapping_mul(C2);

        h1 ^= k1;
        h1 = h1.rotate_left(13);
        h1 = h1.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut k1 = 0u32;
        for (i, &b) in tail.iter().enumerate() {
            k1 |= (b as u32) << (8 * i);
        }
        k1 = k1.wrapping_mul(C1);
        k1 = k1.rotate_left(15);
        k1 = k1.wrapping_mul(C2);
        h1 ^= k1;
    }

    h1 ^= data.len() as u32;
    fmix32(h1)
}

/// Maps `key` to a bucket in `0..size`.
///
/// `size` must be nonzero.
#[inline]
pub fn hash_func<K: Ordinal>(key: K, size: usize) -> usize {
    debug_assert!(size > 0);
    let bytes = key.le_bytes();
    murmur3_32(&bytes[..K::BYTES], SEED) as usize % size
}

/// Number of buckets to use for `num_keys` keys.
///
/// Zero keys get zero buckets.
pub fn recommended_size(num_keys: usize) -> usize {
    if num_keys == 0 {
        return 0;
    }
    PRIMES
        .iter()
        .copied()
        .find(|&p| num_keys <= p)
        .unwrap_or(PRIMES[PRIMES.len() - 1])
}
