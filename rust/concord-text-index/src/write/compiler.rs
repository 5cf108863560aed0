//! Index compiler: folds the sorted occurrence stream into one posting-list
//! record per key.
//!
//! Output lines look like `alice:CAW3,17,CBG5`: the document code is written
//! only when it changes within a key, and line numbers lose their padding.

use std::{fmt::Write, path::Path};

use concord_common::Result;
use concord_io::{BufferedInput, BufferedOutput, MemoryBudget};

use crate::{
    corpus::DocCode,
    record::{KEY_SEPARATOR, Occurrence, POSTING_SEPARATOR},
};

/// Counters reported by [`IndexCompiler::compile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    /// Posting-list records written to the index.
    pub key_count: u64,
    /// Occurrence records read from the sorted stream.
    pub record_count: u64,
    /// Records dropped because they repeat the previous `(doc, line)` of the
    /// same key (one word occurring twice on a line).
    pub duplicate_count: u64,
    /// Keys that arrived below their predecessor.
    pub out_of_order_keys: u64,
}

pub struct IndexCompiler {
    budget: MemoryBudget,
    read_fraction: f64,
    write_fraction: f64,
}

/// Posting list under construction.
struct PendingRecord {
    key: String,
    doc: DocCode,
    line: u64,
    text: String,
}

impl PendingRecord {
    fn start(occurrence: &Occurrence) -> PendingRecord {
        let mut text = String::with_capacity(64);
        let _ = write!(
            text,
            "{}{KEY_SEPARATOR}{}{}",
            occurrence.key, occurrence.doc, occurrence.line
        );
        PendingRecord {
            key: occurrence.key.to_string(),
            doc: occurrence.doc,
            line: occurrence.line,
            text,
        }
    }

    /// Appends a posting; returns `false` if it repeats the last one.
    fn push(&mut self, doc: DocCode, line: u64) -> bool {
        if doc == self.doc {
            if line == self.line {
                return false;
            }
            let _ = write!(self.text, "{POSTING_SEPARATOR}{line}");
        } else {
            let _ = write!(self.text, "{POSTING_SEPARATOR}{doc}{line}");
            self.doc = doc;
        }
        self.line = line;
        true
    }
}

impl IndexCompiler {
    pub fn new(budget: MemoryBudget, read_fraction: f64, write_fraction: f64) -> Self {
        IndexCompiler {
            budget,
            read_fraction,
            write_fraction,
        }
    }

    /// Compiles the sorted records in `sorted` into the index file `index`.
    ///
    /// A key that sorts below its predecessor means the input was not sorted.
    /// It is logged and counted, and compilation carries on.
    pub fn compile(&self, sorted: &Path, index: &Path) -> Result<CompileStats> {
        let mut input = BufferedInput::open(sorted, self.budget, self.read_fraction)?;
        let mut output = BufferedOutput::create(index, self.budget, self.write_fraction)?;
        let mut stats = CompileStats::default();
        let mut pending: Option<PendingRecord> = None;

        while let Some(record) = input.read_line()? {
            let occurrence = Occurrence::parse(&record)?;
            stats.record_count += 1;
            if let Some(current) = pending.as_mut().filter(|c| c.key == occurrence.key) {
                if !current.push(occurrence.doc, occurrence.line) {
                    stats.duplicate_count += 1;
                }
                continue;
            }
            if let Some(previous) = pending.take() {
                if occurrence.key < previous.key.as_str() {
                    log::warn!(
                        "index key '{}' arrived after '{}'; the sorted input is out of order",
                        occurrence.key,
                        previous.key
                    );
                    stats.out_of_order_keys += 1;
                }
                output.write_line(&previous.text)?;
                stats.key_count += 1;
            }
            pending = Some(PendingRecord::start(&occurrence));
        }
        if let Some(last) = pending {
            output.write_line(&last.text)?;
            stats.key_count += 1;
        }
        output.close()?;
        input.close();
        Ok(stats)
    }
}
