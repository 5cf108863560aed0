//! Post-construction checks and size estimates for a [`PerfectHasher`].

use crate::{PerfectHasher, mod_hash::build_hash_table};

/// Rebuilds an ordinary hash table with `hasher` over `keys` and returns every
/// slot holding two or more keys. An empty result means the function is
/// perfect on `keys`.
pub fn check_perfect_hasher<'a, K: AsRef<str>>(
    keys: &'a [K],
    hasher: &PerfectHasher,
) -> Vec<Vec<&'a str>> {
    build_hash_table(keys, hasher.m() as usize, |key| hasher.hash(key))
        .into_iter()
        .filter(|bucket| bucket.len() >= 2)
        .collect()
}

/// Estimated size of the seed array under a simple compression scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionEstimate {
    /// Fixed width, in bits, of an inline seed.
    pub bit_width: u32,
    /// Total size of the compressed seed array in bits.
    pub total_bits: u64,
    /// `total_bits / n`.
    pub bits_per_key: f64,
}

/// Size in bits of the seed array when each seed is stored in `bit_width`
/// bits, the all-ones pattern marking an outlier that is stored separately
/// together with its outer bucket index.
pub fn compressed_size_of(hasher: &PerfectHasher, bit_width: u32, max_outlier_size: u32) -> u64 {
    let cutoff = (1u64 << bit_width) - 1;
    let outliers = hasher
        .seeds()
        .iter()
        .filter(|&&seed| seed as u64 >= cutoff)
        .count() as u64;
    let bucket_index_size = bits_needed(hasher.r().saturating_sub(1));
    (hasher.r() - outliers) * bit_width as u64
        + outliers * (max_outlier_size + bucket_index_size) as u64
}

/// Picks the inline seed width that minimizes [`compressed_size_of`].
pub fn best_compression(hasher: &PerfectHasher) -> CompressionEstimate {
    let max_seed = hasher.seeds().iter().copied().max().unwrap_or(0);
    let max_outlier_size = bits_needed(max_seed as u64);
    // At `max_outlier_size + 1` bits no seed is an outlier.
    let (bit_width, total_bits) = (1..=max_outlier_size + 1)
        .map(|width| (width, compressed_size_of(hasher, width, max_outlier_size)))
        .min_by_key(|&(_, bits)| bits)
        .unwrap_or((1, hasher.r()));
    CompressionEstimate {
        bit_width,
        total_bits,
        bits_per_key: total_bits as f64 / hasher.n() as f64,
    }
}

/// Number of bits needed to represent `value` (at least one).
fn bits_needed(value: u64) -> u32 {
    (u64::BITS - value.leading_zeros()).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HasherParams;

    fn sample_keys() -> Vec<String> {
        fastrand::seed(99);
        let mut keys = (0..800)
            .map(|i| {
                let stem = (0..fastrand::usize(4..9))
                    .map(|_| fastrand::lowercase())
                    .collect::<String>();
                format!("{stem}{}", char::from(b'a' + (i % 26) as u8))
            })
            .collect::<Vec<_>>();
        keys.sort();
        keys.dedup();
        keys
    }

    #[test]
    fn test_no_clashes() {
        let keys = sample_keys();
        let hasher = PerfectHasher::build(&keys, &HasherParams::default()).unwrap();
        assert!(check_perfect_hasher(&keys, &hasher).is_empty());
    }

    #[test]
    fn test_clashes_detected_for_untrained_keys() {
        let keys = sample_keys();
        let hasher = PerfectHasher::build(&keys, &HasherParams::default()).unwrap();
        // More keys than slots: pigeonhole guarantees a clash.
        let mut extended = keys.clone();
        extended.extend((0..hasher.m()).map(|i| format!("extra{i}")));
        assert!(!check_perfect_hasher(&extended, &hasher).is_empty());
    }

    #[test]
    fn test_best_compression() {
        let keys = sample_keys();
        let hasher = PerfectHasher::build(&keys, &HasherParams::default()).unwrap();
        let best = best_compression(&hasher);
        let max_seed = *hasher.seeds().iter().max().unwrap();
        let max_outlier_size = bits_needed(max_seed as u64);
        for width in 1..=max_outlier_size + 1 {
            assert!(best.total_bits <= compressed_size_of(&hasher, width, max_outlier_size));
        }
        assert!(best.bits_per_key > 0.0);
        // Never worse than storing every seed at full width.
        assert!(best.total_bits <= hasher.r() * (max_outlier_size as u64 + 1));
    }

    #[test]
    fn test_bits_needed() {
        assert_eq!(bits_needed(0), 1);
        assert_eq!(bits_needed(1), 1);
        assert_eq!(bits_needed(2), 2);
        assert_eq!(bits_needed(255), 8);
        assert_eq!(bits_needed(256), 9);
    }
}
