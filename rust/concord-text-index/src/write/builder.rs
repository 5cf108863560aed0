//! End-to-end index construction.
//!
//! The builder runs the whole pipeline under one [`MemoryBudget`]:
//!
//! 1. the [`EntryGenerator`] writes every occurrence of every document to a
//!    raw record file;
//! 2. the [`ExternalSorter`] sorts that file into a single run;
//! 3. the [`IndexCompiler`] folds the run into the index file.
//!
//! Intermediate files live in a private [`TempRunStore`] and are removed
//! whether the build succeeds or not.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use concord_common::{Result, error::Error, verify_arg};
use concord_io::{BufferedOutput, MemoryBudget, TempRunStore};
use serde::{Deserialize, Serialize};

use crate::{
    corpus::Corpus,
    tokenizers::{DEFAULT_MIN_TERM_LENGTH, Tokenizer, alpha_run::AlphaRunTokenizer},
    write::{
        compiler::{CompileStats, IndexCompiler},
        entries::EntryGenerator,
        sorter::{ExternalSorter, SortParams},
    },
};

/// Shares of the memory budget granted to each pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferFractions {
    /// Chunk size when reading a document.
    pub doc_read: f64,
    /// Write-behind buffer of the raw record file.
    pub raw_write: f64,
    /// In-memory chunk of the external sort.
    pub chunk: f64,
    /// One two-way merge of the external sort.
    pub merge: f64,
    /// Reader and writer of the index compiler, each.
    pub compile: f64,
}

impl Default for BufferFractions {
    fn default() -> Self {
        BufferFractions {
            doc_read: 0.2,
            raw_write: 0.7,
            chunk: 0.3,
            merge: 0.3,
            compile: 0.4,
        }
    }
}

/// Configuration of an [`IndexBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexBuilderParams {
    pub memory_budget_bytes: usize,
    pub fractions: BufferFractions,
    /// Shortest alphabetic run that becomes a key.
    pub min_word_length: usize,
    /// Sort chunks and merge independent subtrees in parallel.
    pub parallel_merge: bool,
    /// Parent directory for temporary runs; the system default when unset.
    pub temp_dir: Option<PathBuf>,
}

impl Default for IndexBuilderParams {
    fn default() -> Self {
        IndexBuilderParams {
            memory_budget_bytes: MemoryBudget::DEFAULT_BYTES,
            fractions: BufferFractions::default(),
            min_word_length: DEFAULT_MIN_TERM_LENGTH,
            parallel_merge: true,
            temp_dir: None,
        }
    }
}

impl IndexBuilderParams {
    /// Loads parameters from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<IndexBuilderParams> {
        let path = path.as_ref();
        let file =
            File::open(path).map_err(|e| Error::io(format!("open {}", path.display()), e))?;
        let params: IndexBuilderParams = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::config(format!("parse {}", path.display()), e))?;
        params.validate()?;
        Ok(params)
    }

    pub fn budget(&self) -> MemoryBudget {
        MemoryBudget::new(self.memory_budget_bytes)
    }

    pub fn validate(&self) -> Result<()> {
        verify_arg!(memory_budget_bytes, self.memory_budget_bytes > 0);
        verify_arg!(min_word_length, self.min_word_length > 0);
        let f = &self.fractions;
        for (name, value) in [
            ("doc_read", f.doc_read),
            ("raw_write", f.raw_write),
            ("chunk", f.chunk),
            ("merge", f.merge),
            ("compile", f.compile),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(Error::invalid_arg(
                    name,
                    format!("buffer fraction must be in (0, 1], got {value}"),
                ));
            }
        }
        Ok(())
    }

    fn sort_params(&self) -> SortParams {
        SortParams {
            chunk_fraction: self.fractions.chunk,
            merge_fraction: self.fractions.merge,
            parallel: self.parallel_merge,
        }
    }
}

/// What a build produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Distinct keys, one index line each.
    pub key_count: u64,
    /// Raw occurrences emitted by the entry generator.
    pub occurrence_count: u64,
    /// Same-line repeats folded by the compiler.
    pub duplicate_count: u64,
    /// Key-ordering violations seen by the compiler. Non-zero means a
    /// sorting defect upstream.
    pub out_of_order_keys: u64,
}

/// Builds an index file from a [`Corpus`].
pub struct IndexBuilder<T: Tokenizer = AlphaRunTokenizer> {
    params: IndexBuilderParams,
    tokenizer: T,
}

impl IndexBuilder<AlphaRunTokenizer> {
    pub fn new(params: IndexBuilderParams) -> Self {
        let tokenizer = AlphaRunTokenizer::with_min_length(params.min_word_length);
        IndexBuilder { params, tokenizer }
    }
}

impl<T: Tokenizer> IndexBuilder<T> {
    pub fn with_tokenizer(params: IndexBuilderParams, tokenizer: T) -> Self {
        IndexBuilder { params, tokenizer }
    }

    pub fn params(&self) -> &IndexBuilderParams {
        &self.params
    }

    /// Indexes every document of `corpus` into `index_path`.
    ///
    /// An existing file at `index_path` is replaced. An empty corpus (or one
    /// without a single qualifying word) produces an empty index file.
    pub fn build(&self, corpus: &Corpus, index_path: impl AsRef<Path>) -> Result<BuildSummary> {
        let index_path = index_path.as_ref();
        self.params.validate()?;
        let budget = self.params.budget();
        let fractions = self.params.fractions;
        let store = TempRunStore::new(self.params.temp_dir.as_deref())?;

        let raw = store.allocate_named("raw_entries");
        let mut writer = BufferedOutput::create(raw.path(), budget, fractions.raw_write)?;
        let generator = EntryGenerator::new(&self.tokenizer, budget, fractions.doc_read);
        let occurrence_count = generator.generate_all(corpus, &mut writer)?;
        writer.close()?;
        log::info!(
            "generated {occurrence_count} occurrences from {} documents",
            corpus.len()
        );

        let sorter = ExternalSorter::new(&store, budget, self.params.sort_params());
        let sorted = sorter.sort(raw.path())?;
        drop(raw);
        log::debug!(
            "merges held at most {:.3} of the memory budget",
            sorter.peak_merge_fraction()
        );

        let stats = match sorted {
            Some(sorted) => IndexCompiler::new(budget, fractions.compile, fractions.compile)
                .compile(sorted.path(), index_path)?,
            None => {
                BufferedOutput::create(index_path, budget, fractions.compile)?.close()?;
                CompileStats::default()
            }
        };
        if stats.out_of_order_keys > 0 {
            log::warn!(
                "{} keys were out of order while compiling {}",
                stats.out_of_order_keys,
                index_path.display()
            );
        }
        log::info!(
            "compiled {} keys into {}",
            stats.key_count,
            index_path.display()
        );

        Ok(BuildSummary {
            key_count: stats.key_count,
            occurrence_count,
            duplicate_count: stats.duplicate_count,
            out_of_order_keys: stats.out_of_order_keys,
        })
    }
}
