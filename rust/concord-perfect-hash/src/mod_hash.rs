//! The crude "mod" hash family both hashing stages are drawn from.
//!
//! A key is read as a base-27 integer (digit = byte value − 96, so `a` = 1),
//! scrambled by a fixed odd multiplier and additive constant, and reduced
//! modulo `p`. The integer is never materialized: it is reduced modulo `p`
//! digit by digit, which yields the same residue for keys of any length.
//! Hashes modulo different `p` behave roughly independently, which is what
//! lets the per-bucket seeds below act as distinct hash functions.

const BASE: i128 = 27;
const DIGIT_OFFSET: i128 = 96;
const MULTIPLIER: i128 = 21_436_587;
const ADDEND: i128 = 12_345_678_912_345;

/// Seeds enumerate mini-hash moduli `6j + MINI_HASH_BASE`, which avoids
/// multiples of 2 and 3.
const MINI_HASH_BASE: u64 = 3_000_001;
const MINI_HASH_STEP: u64 = 6;

/// `(int27(key) * MULTIPLIER + ADDEND) mod p`.
///
/// `p` must be non-zero.
pub fn mod_hash(key: &str, p: u64) -> u64 {
    debug_assert!(p > 0);
    let p = p as i128;
    let t = key.as_bytes().iter().fold(0i128, |t, &b| {
        (t * BASE + b as i128 - DIGIT_OFFSET).rem_euclid(p)
    });
    (t * MULTIPLIER + ADDEND).rem_euclid(p) as u64
}

/// The modulus of the `j`-th mini-hash function.
pub fn mini_hash_modulus(seed: u32) -> u64 {
    seed as u64 * MINI_HASH_STEP + MINI_HASH_BASE
}

/// The `j`-th second-stage hash function, reduced to the final table size `m`.
pub fn mini_hash(key: &str, m: u64, seed: u32) -> u64 {
    mod_hash(key, mini_hash_modulus(seed)) % m
}

/// Classic bucket-array hash table: `table[h(key)]` lists the keys hashing there.
pub fn build_hash_table<'a, K, H>(keys: &'a [K], buckets: usize, hash: H) -> Vec<Vec<&'a str>>
where
    K: AsRef<str>,
    H: Fn(&str) -> u64,
{
    let mut table = vec![Vec::new(); buckets];
    for key in keys {
        let key = key.as_ref();
        table[hash(key) as usize].push(key);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference computation with the base-27 integer written out in full.
    fn mod_hash_reference(key: &str, p: u64) -> u64 {
        let mut t: i128 = 0;
        for &b in key.as_bytes() {
            t = t * 27 + b as i128 - 96;
        }
        (t * 21_436_587 + 12_345_678_912_345).rem_euclid(p as i128) as u64
    }

    #[test]
    fn test_mod_hash_matches_full_integer() {
        // Short enough for the full base-27 value to fit in i128.
        for key in ["a", "alice", "wonder", "queen", "zzzzzzzzzz", "hatter"] {
            for p in [2, 7, 97, 1_000_003, 3_000_001] {
                assert_eq!(mod_hash(key, p), mod_hash_reference(key, p), "{key} mod {p}");
            }
        }
    }

    #[test]
    fn test_mod_hash_in_range_for_long_and_non_ascii_keys() {
        let long = "supercalifragilisticexpialidocious".repeat(4);
        for key in [long.as_str(), "café", "straße", "UPPER", ""] {
            for p in [1, 2, 13, 4093] {
                assert!(mod_hash(key, p) < p);
            }
        }
    }

    #[test]
    fn test_mini_hash() {
        assert_eq!(mini_hash_modulus(0), 3_000_001);
        assert_eq!(mini_hash_modulus(2), 3_000_013);
        for seed in 0..50 {
            assert!(mini_hash("rabbit", 17, seed) < 17);
        }
    }

    #[test]
    fn test_build_hash_table() {
        let keys = ["alice", "wonder", "rabbit", "queen"];
        let table = build_hash_table(&keys, 3, |k| mod_hash(k, 3));
        assert_eq!(table.len(), 3);
        assert_eq!(table.iter().map(Vec::len).sum::<usize>(), keys.len());
        for (slot, bucket) in table.iter().enumerate() {
            for key in bucket {
                assert_eq!(mod_hash(key, 3) as usize, slot);
            }
        }
    }
}
