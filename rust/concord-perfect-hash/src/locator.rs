use concord_common::{Result, error::Error};
use concord_index_core::{KeyLocator, LocatorKind};
use xxhash_rust::xxh3::xxh3_64;

use crate::{HasherParams, PerfectHasher};

/// One slot of the final table: the index line of the key hashed there and a
/// short fingerprint of that key.
#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    /// 1-based index line, `0` for a free slot.
    line: u64,
    fingerprint: u32,
}

/// [`KeyLocator`] backed by a [`PerfectHasher`].
///
/// The slot table has one entry per hash value. A held-out key lands on a
/// free slot, or on a trained key's slot whose fingerprint almost always
/// differs; either way it is reported as absent. The rare fingerprint
/// collision is caught by the caller's key check against the index line.
pub struct PerfectHashLocator {
    hasher: Option<PerfectHasher>,
    slots: Vec<Slot>,
}

impl PerfectHashLocator {
    /// Trains a locator on `(key, index line)` pairs.
    pub fn build<K: AsRef<str>>(entries: &[(K, u64)], params: &HasherParams) -> Result<Self> {
        if entries.is_empty() {
            params.validate()?;
            return Ok(PerfectHashLocator {
                hasher: None,
                slots: Vec::new(),
            });
        }

        let keys = entries.iter().map(|(key, _)| key.as_ref()).collect::<Vec<_>>();
        let hasher = PerfectHasher::build(&keys, params)?;
        let mut slots = vec![Slot::default(); hasher.m() as usize];
        for (key, line) in entries {
            let key = key.as_ref();
            if *line == 0 {
                return Err(Error::invalid_arg("line", "index lines are 1-based"));
            }
            let slot = &mut slots[hasher.hash(key) as usize];
            if slot.line != 0 {
                return Err(Error::invalid_operation(format!(
                    "perfect hash collision on '{key}'"
                )));
            }
            *slot = Slot {
                line: *line,
                fingerprint: fingerprint(key),
            };
        }
        Ok(PerfectHashLocator {
            hasher: Some(hasher),
            slots,
        })
    }

    /// Like [`build`](Self::build), but on a construction failure retries up
    /// to `retries` times with progressively [relaxed](HasherParams::relaxed)
    /// parameters.
    pub fn build_with_retry<K: AsRef<str>>(
        entries: &[(K, u64)],
        params: &HasherParams,
        retries: usize,
    ) -> Result<Self> {
        let mut params = *params;
        let mut attempt = 0;
        loop {
            match Self::build(entries, &params) {
                Err(e)
                    if attempt < retries
                        && matches!(
                            e.kind(),
                            concord_common::error::ErrorKind::PerfectHashConstruction { .. }
                        ) =>
                {
                    let relaxed = params.relaxed();
                    log::warn!(
                        "{e}; retrying with lam={}, load={}",
                        relaxed.lam,
                        relaxed.load
                    );
                    params = relaxed;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    pub fn hasher(&self) -> Option<&PerfectHasher> {
        self.hasher.as_ref()
    }
}

impl KeyLocator for PerfectHashLocator {
    fn kind(&self) -> LocatorKind {
        LocatorKind::PerfectHash
    }

    fn locate(&self, key: &str) -> Option<u64> {
        let hasher = self.hasher.as_ref()?;
        let slot = self.slots[hasher.hash(key) as usize];
        (slot.line != 0 && slot.fingerprint == fingerprint(key)).then_some(slot.line)
    }

    fn key_count(&self) -> usize {
        self.hasher.as_ref().map_or(0, PerfectHasher::n)
    }
}

fn fingerprint(key: &str) -> u32 {
    xxh3_64(key.as_bytes()) as u32
}
