//! Minimal perfect hashing for the Concord key set.
//!
//! The construction follows the bucket-hashing-with-first-fit family: keys are
//! spread over a small prime-sized outer table, and each outer bucket is then
//! assigned the first *displacement seed* whose second-stage hash sends all of
//! the bucket's keys to distinct, still-free slots of the final table.
//!
//! The resulting [`PerfectHasher`] stores the table sizes and one seed per
//! outer bucket, nothing else: no key text survives construction.
//!
//! # Quick Start
//!
//! ```rust
//! use concord_perfect_hash::{HasherParams, PerfectHasher};
//!
//! let keys = ["alice", "wonder", "rabbit", "queen", "hatter", "dormouse"];
//! let hasher = PerfectHasher::build(&keys, &HasherParams::default()).unwrap();
//! let mut slots: Vec<u64> = keys.iter().map(|k| hasher.hash(k)).collect();
//! slots.sort();
//! slots.dedup();
//! assert_eq!(slots.len(), keys.len());
//! ```

mod hasher;
mod locator;
pub mod mod_hash;
pub mod primes;
mod verify;

pub use hasher::{HasherParams, PerfectHasher};
pub use locator::PerfectHashLocator;
pub use verify::{CompressionEstimate, best_compression, check_perfect_hasher, compressed_size_of};
