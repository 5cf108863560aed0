use std::{cmp::Reverse, collections::HashSet};

use concord_common::{Result, error::Error, verify_arg};
use serde::{Deserialize, Serialize};

use crate::{
    mod_hash::{build_hash_table, mini_hash, mod_hash},
    primes::prev_prime,
};

/// Tuning parameters of the perfect hash construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherParams {
    /// Target average outer bucket size. Larger values give a smaller seed
    /// array but make the displacement search harder.
    pub lam: f64,
    /// Load of the final table (`n / m`), strictly between 0 and 1. Lower
    /// values give a sparser table and an easier search.
    pub load: f64,
    /// Upper bound on the displacement seeds tried for a single bucket.
    pub max_attempts: u32,
}

impl HasherParams {
    pub const DEFAULT_LAM: f64 = 5.0;
    pub const DEFAULT_LOAD: f64 = 0.8;
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 1_000_000;

    pub fn new(lam: f64, load: f64) -> HasherParams {
        HasherParams {
            lam,
            load,
            ..Default::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> HasherParams {
        self.max_attempts = max_attempts;
        self
    }

    /// Parameters for a retry after a failed construction: smaller buckets
    /// and a sparser final table.
    pub fn relaxed(&self) -> HasherParams {
        HasherParams {
            lam: self.lam * 0.8,
            load: self.load * 0.9,
            max_attempts: self.max_attempts,
        }
    }

    pub fn validate(&self) -> Result<()> {
        verify_arg!(lam, self.lam > 0.0);
        verify_arg!(load, self.load > 0.0 && self.load < 1.0);
        verify_arg!(max_attempts, self.max_attempts >= 1);
        Ok(())
    }
}

impl Default for HasherParams {
    fn default() -> Self {
        HasherParams {
            lam: Self::DEFAULT_LAM,
            load: Self::DEFAULT_LOAD,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// A perfect hash function over a fixed training key set.
///
/// `hash(key) = mini_hash(key, m, seeds[mod_hash(key, r)])`, which is
/// injective into `0..m` over the training keys. Keys outside the training
/// set still hash into `0..m`, possibly onto a trained key's slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerfectHasher {
    n: usize,
    r: u64,
    m: u64,
    seeds: Vec<u32>,
}

impl PerfectHasher {
    /// Constructs a perfect hash function for `keys`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for invalid `params`, an empty key set, or duplicate keys.
    /// - `PerfectHashConstruction` when some bucket exhausts
    ///   `params.max_attempts` seeds; the caller may retry with
    ///   [`HasherParams::relaxed`] parameters.
    pub fn build<K: AsRef<str>>(keys: &[K], params: &HasherParams) -> Result<PerfectHasher> {
        params.validate()?;
        let n = keys.len();
        verify_arg!(keys, n > 0);
        let distinct = keys.iter().map(AsRef::as_ref).collect::<HashSet<&str>>();
        if distinct.len() != n {
            return Err(Error::invalid_arg("keys", "keys must be distinct"));
        }

        let r = prev_prime(((n as f64 / params.lam) as u64).max(2)).unwrap_or(2);
        let m = ((n as f64 / params.load) as u64).max(n as u64);
        let buckets = build_hash_table(keys, r as usize, |key| mod_hash(key, r));
        let seeds = Self::find_seeds(&buckets, m, params)?;

        log::debug!("perfect hash over {n} keys: r = {r}, m = {m}");
        Ok(PerfectHasher { n, r, m, seeds })
    }

    /// Assigns a displacement seed to every outer bucket, largest bucket first.
    fn find_seeds(buckets: &[Vec<&str>], m: u64, params: &HasherParams) -> Result<Vec<u32>> {
        let mut order = (0..buckets.len()).collect::<Vec<_>>();
        order.sort_by_key(|&b| Reverse(buckets[b].len()));

        let mut claimed = vec![false; m as usize];
        let mut seeds = vec![0u32; buckets.len()];
        let mut slots = Vec::new();
        for bucket_idx in order {
            let bucket = &buckets[bucket_idx];
            if bucket.is_empty() {
                // Sorted by size: every remaining bucket is empty too.
                break;
            }
            let seed = (0..params.max_attempts)
                .find(|&seed| Self::try_seed(bucket, m, seed, &claimed, &mut slots))
                .ok_or_else(|| {
                    Error::perfect_hash_construction(
                        bucket_idx,
                        bucket.len(),
                        params.max_attempts as u64,
                        params.lam,
                        params.load,
                    )
                })?;
            for &slot in &slots {
                claimed[slot as usize] = true;
            }
            seeds[bucket_idx] = seed;
        }
        Ok(seeds)
    }

    /// Checks whether `seed` sends the bucket's keys to distinct free slots,
    /// leaving those slots in `slots` on success.
    fn try_seed(
        bucket: &[&str],
        m: u64,
        seed: u32,
        claimed: &[bool],
        slots: &mut Vec<u64>,
    ) -> bool {
        slots.clear();
        for key in bucket {
            let slot = mini_hash(key, m, seed);
            if claimed[slot as usize] || slots.contains(&slot) {
                return false;
            }
            slots.push(slot);
        }
        true
    }

    /// Hashes `key` into `0..m`.
    pub fn hash(&self, key: &str) -> u64 {
        let bucket = mod_hash(key, self.r) as usize;
        mini_hash(key, self.m, self.seeds[bucket])
    }

    /// Number of training keys.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Outer table size (prime).
    pub fn r(&self) -> u64 {
        self.r
    }

    /// Final table size.
    pub fn m(&self) -> u64 {
        self.m
    }

    /// Displacement seed per outer bucket.
    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use concord_common::error::ErrorKind;

    use super::*;

    fn words(count: usize, seed: u64) -> Vec<String> {
        fastrand::seed(seed);
        let mut set = HashSet::new();
        while set.len() < count {
            let len = fastrand::usize(4..12);
            set.insert((0..len).map(|_| fastrand::lowercase()).collect::<String>());
        }
        let mut words = set.into_iter().collect::<Vec<_>>();
        words.sort();
        words
    }

    #[test]
    fn test_injective_on_training_keys() {
        let keys = words(2000, 11);
        let hasher = PerfectHasher::build(&keys, &HasherParams::default()).unwrap();
        assert_eq!(hasher.n(), 2000);
        assert_eq!(hasher.r(), 397);
        assert_eq!(hasher.m(), 2500);
        assert_eq!(hasher.seeds().len(), 397);

        let slots = keys.iter().map(|k| hasher.hash(k)).collect::<HashSet<_>>();
        assert_eq!(slots.len(), keys.len());
        assert!(slots.iter().all(|&s| s < hasher.m()));
    }

    #[test]
    fn test_held_out_keys_stay_in_range() {
        let keys = words(500, 3);
        let hasher = PerfectHasher::build(&keys, &HasherParams::default()).unwrap();
        for key in ["zebra", "QUEEN", "naïve", "", "x".repeat(200).as_str()] {
            assert!(hasher.hash(key) < hasher.m());
        }
    }

    #[test]
    fn test_tiny_key_sets() {
        for count in 1..8 {
            let keys = words(count, count as u64);
            let hasher = PerfectHasher::build(&keys, &HasherParams::default()).unwrap();
            assert_eq!(hasher.r(), 2);
            let slots = keys.iter().map(|k| hasher.hash(k)).collect::<HashSet<_>>();
            assert_eq!(slots.len(), count);
        }
    }

    #[test]
    fn test_invalid_input() {
        let empty: [&str; 0] = [];
        assert!(PerfectHasher::build(&empty, &HasherParams::default()).is_err());
        assert!(PerfectHasher::build(&["same", "same"], &HasherParams::default()).is_err());
        assert!(PerfectHasher::build(&["a"], &HasherParams::new(5.0, 1.0)).is_err());
        assert!(PerfectHasher::build(&["a"], &HasherParams::new(0.0, 0.5)).is_err());
    }

    #[test]
    fn test_bounded_search_reports_failure() {
        // A single seed cannot place large buckets in a nearly full table.
        let keys = words(1000, 5);
        let params = HasherParams::new(50.0, 0.99).with_max_attempts(1);
        let err = PerfectHasher::build(&keys, &params).unwrap_err();
        match err.kind() {
            ErrorKind::PerfectHashConstruction {
                attempts,
                lam,
                load,
                ..
            } => {
                assert_eq!(*attempts, 1);
                assert_eq!(*lam, 50.0);
                assert_eq!(*load, 0.99);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_relaxed_params() {
        let params = HasherParams::default().relaxed();
        assert!(params.lam < HasherParams::DEFAULT_LAM);
        assert!(params.load < HasherParams::DEFAULT_LOAD);
        params.validate().unwrap();
    }
}
