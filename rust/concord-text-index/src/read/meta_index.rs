use std::{collections::HashMap, path::Path};

use concord_common::{Result, error::Error};
use concord_index_core::{KeyLocator, LocatorKind};
use concord_io::{BufferedInput, MemoryBudget};

use crate::record::{KEY_SEPARATOR, record_key};

/// Key → index line map, built by one sequential scan of the index file.
///
/// The meta-index is never persisted; it is rebuilt whenever an index is
/// opened. If a key occurs on more than one line (possible only in an index
/// compiled from unsorted input) its first line wins.
#[derive(Debug, Clone, Default)]
pub struct MetaIndex {
    lines: HashMap<String, u64>,
}

impl MetaIndex {
    pub fn build(
        index_path: impl AsRef<Path>,
        budget: MemoryBudget,
        fraction: f64,
    ) -> Result<MetaIndex> {
        let index_path = index_path.as_ref();
        let mut input = BufferedInput::open(index_path, budget, fraction)?;
        let mut lines = HashMap::new();
        let mut line_no = 0u64;
        while let Some(record) = input.read_line()? {
            line_no += 1;
            if !record.contains(KEY_SEPARATOR) {
                return Err(Error::invalid_format(
                    "index record",
                    format!("line {line_no} of {} has no key", index_path.display()),
                ));
            }
            let key = record_key(&record);
            if lines.contains_key(key) {
                log::warn!("key '{key}' repeated at index line {line_no}");
                continue;
            }
            lines.insert(key.to_string(), line_no);
        }
        input.close();
        log::debug!("meta-index of {}: {} keys", index_path.display(), lines.len());
        Ok(MetaIndex { lines })
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.lines.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All `(key, line)` pairs in index order.
    pub fn entries(&self) -> Vec<(&str, u64)> {
        let mut entries = self
            .lines
            .iter()
            .map(|(key, &line)| (key.as_str(), line))
            .collect::<Vec<_>>();
        entries.sort_unstable_by_key(|&(_, line)| line);
        entries
    }
}

impl KeyLocator for MetaIndex {
    fn kind(&self) -> LocatorKind {
        LocatorKind::MetaIndex
    }

    fn locate(&self, key: &str) -> Option<u64> {
        self.get(key)
    }

    fn key_count(&self) -> usize {
        self.len()
    }
}
