//! External merge sort over line-oriented record files.
//!
//! # Phases
//!
//! 1. **Chunking**: the input is read in chunks bounded by `chunk_fraction`
//!    of the memory budget. Each chunk is sorted in memory and written to its
//!    own run file.
//! 2. **Merging**: runs are combined by a balanced binary merge tree. The
//!    range of run indices `[lo, hi)` is split at its midpoint, both halves are
//!    merged recursively, and the two results are combined by a two-way merge.
//!    Both inputs are deleted once consumed.
//!
//! Sibling subtrees touch disjoint run files, so with `parallel` set they run
//! on the rayon pool via [`rayon::join`]. The output is byte-identical to the
//! sequential merge.
//!
//! # Memory
//!
//! A subtree is granted a share of the budget for its merges. Its own
//! two-way merge may use the whole share, but only after both children are
//! done. Children running concurrently get half of the share each, so at any
//! moment the merges in flight never hold more than `merge_fraction` in
//! total.

use std::{path::Path, sync::Mutex};

use concord_common::Result;
use concord_io::{BufferedInput, BufferedOutput, MemoryBudget, RunFile, TempRunStore};
use rayon::slice::ParallelSliceMut;

/// Tuning knobs of the external sorter.
#[derive(Debug, Clone, Copy)]
pub struct SortParams {
    /// Share of the budget for one in-memory chunk.
    pub chunk_fraction: f64,
    /// Share of the budget for all two-way merges in flight. A single merge
    /// splits its share between its two readers and its writer.
    pub merge_fraction: f64,
    /// Sort chunks and merge sibling subtrees on the rayon pool.
    pub parallel: bool,
}

impl Default for SortParams {
    fn default() -> Self {
        SortParams {
            chunk_fraction: 0.3,
            merge_fraction: 0.3,
            parallel: true,
        }
    }
}

pub struct ExternalSorter<'s> {
    store: &'s TempRunStore,
    budget: MemoryBudget,
    params: SortParams,
    usage: MergeUsage,
}

/// Budget share held by the merges currently running, and its high-water mark.
#[derive(Default)]
struct MergeUsage {
    state: Mutex<(f64, f64)>,
}

impl MergeUsage {
    fn enter(&self, fraction: f64) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.0 += fraction;
        state.1 = state.1.max(state.0);
    }

    fn exit(&self, fraction: f64) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).0 -= fraction;
    }

    fn peak(&self) -> f64 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).1
    }
}

impl<'s> ExternalSorter<'s> {
    pub fn new(store: &'s TempRunStore, budget: MemoryBudget, params: SortParams) -> Self {
        ExternalSorter {
            store,
            budget,
            params,
            usage: MergeUsage::default(),
        }
    }

    /// Largest budget share held at once by concurrent merges so far.
    pub fn peak_merge_fraction(&self) -> f64 {
        self.usage.peak()
    }

    /// Sorts the records of `input` into a single run file.
    ///
    /// Returns `None` for an empty input. The returned run lives in the
    /// store and is deleted on drop.
    pub fn sort(&self, input: &Path) -> Result<Option<RunFile>> {
        let runs = self.split_into_sorted_runs(input)?;
        if runs.is_empty() {
            return Ok(None);
        }
        log::debug!("merging {} sorted runs", runs.len());
        self.merge_runs(runs).map(Some)
    }

    /// Reads `input` chunk by chunk, writing each sorted chunk to a run file.
    pub fn split_into_sorted_runs(&self, input: &Path) -> Result<Vec<RunFile>> {
        let mut reader = BufferedInput::open(input, self.budget, self.params.chunk_fraction)?;
        let mut runs = Vec::new();
        loop {
            let mut chunk = reader.read_chunk()?;
            if chunk.is_empty() {
                break;
            }
            if self.params.parallel {
                chunk.par_sort_unstable();
            } else {
                chunk.sort_unstable();
            }
            let index = runs.len();
            let run = self.store.allocate(index, index + 1);
            let mut writer =
                BufferedOutput::create(run.path(), self.budget, self.params.chunk_fraction)?;
            for record in &chunk {
                writer.write_line(record)?;
            }
            writer.close()?;
            runs.push(run);
        }
        reader.close();
        Ok(runs)
    }

    /// Merges a non-empty list of sorted runs into one.
    ///
    /// Every run passed in is deleted, whether the merge succeeds or not.
    pub fn merge_runs(&self, runs: Vec<RunFile>) -> Result<RunFile> {
        concord_common::verify_arg!(runs, !runs.is_empty());
        self.merge_range(runs, 0, self.params.merge_fraction)
    }

    /// Merges `runs`, which cover run indices `lo..lo + runs.len()`, holding
    /// at most `fraction` of the budget at any time.
    fn merge_range(&self, mut runs: Vec<RunFile>, lo: usize, fraction: f64) -> Result<RunFile> {
        let len = runs.len();
        if len == 1 {
            return Ok(runs.remove(0));
        }
        let mid = len / 2;
        let right_runs = runs.split_off(mid);
        let (left, right) = if self.params.parallel {
            let half = fraction / 2.0;
            rayon::join(
                || self.merge_range(runs, lo, half),
                || self.merge_range(right_runs, lo + mid, half),
            )
        } else {
            (
                self.merge_range(runs, lo, fraction),
                self.merge_range(right_runs, lo + mid, fraction),
            )
        };
        let (left, right) = (left?, right?);

        let output = self.store.allocate(lo, lo + len);
        self.usage.enter(fraction);
        let merged = merge_two(
            left.path(),
            right.path(),
            output.path(),
            self.budget,
            fraction,
        );
        self.usage.exit(fraction);
        merged?;
        Ok(output)
    }
}

/// Two-way merge of sorted record files into `output`.
///
/// Every record of both inputs is written exactly once, in byte order. When
/// one input runs out the other is copied through without further
/// comparisons. Returns the number of records written.
pub fn merge_two(
    left: &Path,
    right: &Path,
    output: &Path,
    budget: MemoryBudget,
    fraction: f64,
) -> Result<u64> {
    let mut left = BufferedInput::open(left, budget, fraction / 4.0)?;
    let mut right = BufferedInput::open(right, budget, fraction / 4.0)?;
    let mut writer = BufferedOutput::create(output, budget, fraction / 2.0)?;

    let mut count = 0u64;
    let mut a = left.read_line()?;
    let mut b = right.read_line()?;
    loop {
        match (a.take(), b.take()) {
            (Some(x), Some(y)) => {
                if x <= y {
                    writer.write_line(&x)?;
                    a = left.read_line()?;
                    b = Some(y);
                } else {
                    writer.write_line(&y)?;
                    a = Some(x);
                    b = right.read_line()?;
                }
                count += 1;
            }
            (Some(x), None) => {
                writer.write_line(&x)?;
                count += 1 + drain(&mut left, &mut writer)?;
                break;
            }
            (None, Some(y)) => {
                writer.write_line(&y)?;
                count += 1 + drain(&mut right, &mut writer)?;
                break;
            }
            (None, None) => break,
        }
    }
    writer.close()?;
    Ok(count)
}

fn drain(input: &mut BufferedInput, writer: &mut BufferedOutput) -> Result<u64> {
    let mut count = 0;
    while let Some(line) = input.read_line()? {
        writer.write_line(&line)?;
        count += 1;
    }
    Ok(count)
}
