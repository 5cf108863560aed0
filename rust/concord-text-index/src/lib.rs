//! Disk-backed line-proximity text index.
//!
//! This crate builds a compact, sorted, line-oriented index over a corpus of
//! plaintext documents and answers proximity queries against it: where do two
//! or more query words occur within a few lines of each other?
//!
//! # Building
//!
//! Index construction never holds a whole document, or the whole set of
//! occurrences, in memory. Every phase works through bounded readers and
//! writers sized from a shared [`MemoryBudget`](concord_io::MemoryBudget):
//!
//! 1. **Entry generation**: each document line is tokenized into keys
//!    (case-folded alphabetic runs of at least four characters), and one
//!    `key:DOCline` record is written per occurrence.
//! 2. **External sort**: records are sorted in memory-bounded chunks, then
//!    combined by a balanced binary merge tree.
//! 3. **Compilation**: consecutive records of a key are folded into one
//!    posting-list record, `key:DOCline,line,DOCline,...`.
//!
//! # Querying
//!
//! An [`IndexHandle`] locates a key's record through a
//! [`KeyLocator`](concord_index_core::KeyLocator), either the scanned
//! [`MetaIndex`] or a perfect hash. Each record is streamed lazily by an
//! [`ItemStream`]; the streams of all query terms are merged in
//! `(doc, line)` order and a small state machine reports proximity hits.
//!
//! # Quick Start
//!
//! ```rust
//! use concord_io::MemoryBudget;
//! use concord_text_index::{
//!     Corpus, IndexBuilder, IndexBuilderParams, IndexHandle, IndexOptions, SearchOptions,
//! };
//!
//! let dir = tempfile::tempdir().unwrap();
//! let doc = dir.path().join("alice.txt");
//! std::fs::write(&doc, "Down the rabbit hole\nAlice was\nin Wonderland\n").unwrap();
//!
//! let mut corpus = Corpus::new(MemoryBudget::default());
//! corpus.register("ALI", &doc).unwrap();
//! let index = dir.path().join("index.txt");
//! IndexBuilder::new(IndexBuilderParams::default())
//!     .build(&corpus, &index)
//!     .unwrap();
//!
//! let handle = IndexHandle::open(&index, &IndexOptions::default()).unwrap();
//! let outcome = handle
//!     .search(&["alice", "wonderland"], &SearchOptions::new(2), 5)
//!     .unwrap();
//! assert_eq!(outcome.hits.len(), 1);
//! assert_eq!(outcome.hits[0].line, 2);
//! ```

pub mod corpus;
pub mod read;
pub mod record;
pub mod tokenizers;
pub mod write;

pub use corpus::{Corpus, CorpusManifest, DocCode, Document};
pub use read::{
    HitStream, IndexHandle, IndexOptions, ItemStream, MergeStrategy, MetaIndex, Posting,
    SearchOptions, SearchOutcome, SearchSession,
};
pub use tokenizers::{AlphaRunTokenizer, Tokenizer};
pub use write::{BuildSummary, IndexBuilder, IndexBuilderParams};
