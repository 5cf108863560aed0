//! Read-only handle over a compiled index file.

use std::path::{Path, PathBuf};

use concord_common::{Result, error::Error};
use concord_index_core::{KeyLocator, LocatorKind};
use concord_io::{LineCache, MemoryBudget};
use concord_perfect_hash::{HasherParams, PerfectHashLocator};
use serde::{Deserialize, Serialize};

use crate::{
    read::{item_stream::ItemStream, meta_index::MetaIndex},
    record::{KEY_SEPARATOR, record_key},
};

/// How an index is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
    /// Key location strategy.
    pub locator: LocatorKind,
    /// Construction parameters when `locator` is a perfect hash.
    pub hasher: HasherParams,
    /// Relaxed-parameter retries after a failed perfect hash construction.
    pub hash_retries: usize,
    pub memory_budget_bytes: usize,
    /// Share of the budget used while scanning the index for the meta-index.
    pub scan_fraction: f64,
}

impl Default for IndexOptions {
    fn default() -> Self {
        IndexOptions {
            locator: LocatorKind::MetaIndex,
            hasher: HasherParams::default(),
            hash_retries: 3,
            memory_budget_bytes: MemoryBudget::DEFAULT_BYTES,
            scan_fraction: 0.9,
        }
    }
}

impl IndexOptions {
    pub fn with_locator(mut self, locator: LocatorKind) -> Self {
        self.locator = locator;
        self
    }
}

/// An opened index: the file, the locator that finds keys in it, and a
/// line cache for random access.
///
/// The handle is immutable after opening. Each search builds its own
/// streams and merge state, so concurrent queries may share one handle.
pub struct IndexHandle {
    path: PathBuf,
    locator: Box<dyn KeyLocator>,
    lines: LineCache,
}

impl IndexHandle {
    /// Opens the index at `path`, scanning it once to build the meta-index.
    ///
    /// With [`LocatorKind::PerfectHash`], a perfect hash locator is trained
    /// on the meta-index entries and the meta-index is discarded.
    pub fn open(path: impl AsRef<Path>, options: &IndexOptions) -> Result<IndexHandle> {
        let path = path.as_ref();
        let budget = MemoryBudget::new(options.memory_budget_bytes);
        let meta = MetaIndex::build(path, budget, options.scan_fraction)?;
        let locator: Box<dyn KeyLocator> = match options.locator {
            LocatorKind::MetaIndex => Box::new(meta),
            LocatorKind::PerfectHash => {
                let locator = PerfectHashLocator::build_with_retry(
                    &meta.entries(),
                    &options.hasher,
                    options.hash_retries,
                )?;
                if let Some(hasher) = locator.hasher() {
                    log::debug!(
                        "perfect hash over {} keys: r={}, m={}",
                        hasher.n(),
                        hasher.r(),
                        hasher.m()
                    );
                }
                Box::new(locator)
            }
        };
        log::info!(
            "opened {} ({} keys, {} locator)",
            path.display(),
            locator.key_count(),
            locator.kind()
        );
        Ok(IndexHandle {
            path: path.to_path_buf(),
            locator,
            lines: LineCache::new(),
        })
    }

    /// Wraps the index at `path` with a caller-supplied locator.
    pub fn with_locator(path: impl AsRef<Path>, locator: impl KeyLocator) -> IndexHandle {
        IndexHandle {
            path: path.as_ref().to_path_buf(),
            locator: Box::new(locator),
            lines: LineCache::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn locator(&self) -> &dyn KeyLocator {
        self.locator.as_ref()
    }

    pub fn key_count(&self) -> usize {
        self.locator.key_count()
    }

    /// Returns the posting list of `key`: the compressed body of its record,
    /// without the leading `key:`.
    ///
    /// Fails like [`posting_record`](Self::posting_record).
    pub fn lookup(&self, key: &str) -> Result<Option<String>> {
        Ok(self.posting_record(key)?.map(|record| {
            record
                .split_once(KEY_SEPARATOR)
                .map_or_else(String::new, |(_, body)| body.to_string())
        }))
    }

    /// Returns the full posting record (`key:body`) of `key`.
    ///
    /// Fails with a key mismatch if the locator points at a line holding a
    /// different key, or past the end of the file: the locator and the file
    /// are out of sync, and no answer can be trusted.
    pub fn posting_record(&self, key: &str) -> Result<Option<String>> {
        let Some(line) = self.locator.locate(key) else {
            return Ok(None);
        };
        let Some(record) = self.lines.get_line(&self.path, line)? else {
            return Err(Error::key_mismatch(key, "<end of file>", line));
        };
        let found = record_key(&record);
        if found != key {
            return Err(Error::key_mismatch(key, found, line));
        }
        Ok(Some(record))
    }

    /// Opens a posting stream over `key`, if it is indexed.
    pub fn item_stream(&self, key: &str) -> Result<Option<ItemStream>> {
        self.posting_record(key)?.map(ItemStream::new).transpose()
    }

    /// Opens posting streams for `keys`, in order, skipping absent ones.
    ///
    /// Returns the streams together with the keys that were not found.
    pub fn item_streams<S: AsRef<str>>(
        &self,
        keys: &[S],
    ) -> Result<(Vec<ItemStream>, Vec<String>)> {
        let mut streams = Vec::with_capacity(keys.len());
        let mut missing = Vec::new();
        for key in keys {
            let key = key.as_ref();
            match self.item_stream(key)? {
                Some(stream) => streams.push(stream),
                None => missing.push(key.to_string()),
            }
        }
        Ok((streams, missing))
    }

    /// Forgets cached line offsets of the index file.
    pub fn clear_cache(&self) {
        self.lines.clear_cache();
    }
}
