#![allow(dead_code)]

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use concord_io::MemoryBudget;
use concord_text_index::{Corpus, DocCode, IndexBuilder, IndexBuilderParams, Posting};

const VOCABULARY: &[&str] = &[
    "Alice", "rabbit", "Wonder", "wonderland", "hatter", "queen", "QUEEN", "dormouse", "tarts",
    "knave", "turtle", "gryphon", "caterpillar", "mushroom", "Éclair", "naïve", "tea", "a", "the",
    "of", "and", "cat", "it", "was", "very", "much", "curious",
];

const PUNCTUATION: &[&str] = &[" ", " ", " ", ", ", ". ", "; ", " -- ", "'s ", "! ", "3 "];

pub struct TestCorpus {
    pub dir: tempfile::TempDir,
    pub documents: Vec<(String, PathBuf)>,
}

impl TestCorpus {
    /// Writes `docs.len()` documents of random prose; `docs` gives each
    /// document's code and line count.
    pub fn random(seed: u64, docs: &[(&str, usize)]) -> TestCorpus {
        let mut rng = fastrand::Rng::with_seed(seed);
        let dir = tempfile::tempdir().unwrap();
        let mut documents = Vec::new();
        for &(code, lines) in docs {
            let mut text = String::new();
            for _ in 0..lines {
                let words = rng.usize(0..9);
                for _ in 0..words {
                    text.push_str(VOCABULARY[rng.usize(..VOCABULARY.len())]);
                    text.push_str(PUNCTUATION[rng.usize(..PUNCTUATION.len())]);
                }
                text.push('\n');
            }
            let path = dir.path().join(format!("{code}.txt"));
            std::fs::write(&path, text).unwrap();
            documents.push((code.to_string(), path));
        }
        TestCorpus { dir, documents }
    }

    /// Writes the given documents verbatim.
    pub fn from_texts(docs: &[(&str, &str)]) -> TestCorpus {
        let dir = tempfile::tempdir().unwrap();
        let documents = docs
            .iter()
            .map(|&(code, text)| {
                let path = dir.path().join(format!("{code}.txt"));
                std::fs::write(&path, text).unwrap();
                (code.to_string(), path)
            })
            .collect();
        TestCorpus { dir, documents }
    }

    pub fn corpus(&self, budget: MemoryBudget) -> Corpus {
        let mut corpus = Corpus::new(budget);
        for (code, path) in &self.documents {
            corpus.register(code, path).unwrap();
        }
        corpus
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.path().join("index.txt")
    }

    /// Builds the index with a small budget so that every phase spills.
    pub fn build(&self, params: IndexBuilderParams) -> PathBuf {
        let index = self.index_path();
        let corpus = self.corpus(params.budget());
        let summary = IndexBuilder::new(params).build(&corpus, &index).unwrap();
        assert_eq!(summary.out_of_order_keys, 0);
        index
    }

    /// Occurrences derived directly from the documents, independent of the
    /// tokenizer: `(key, doc, line)` for every alphabetic run of 4+ chars.
    pub fn reference_occurrences(&self) -> Vec<(String, String, u64)> {
        let mut occurrences = Vec::new();
        for (code, path) in &self.documents {
            let text = std::fs::read_to_string(path).unwrap();
            for (idx, line) in text.lines().enumerate() {
                for word in line.split(|c: char| !c.is_alphabetic()) {
                    if word.chars().count() >= 4 {
                        let key = caseless::default_case_fold_str(word);
                        occurrences.push((key, code.clone(), idx as u64 + 1));
                    }
                }
            }
        }
        occurrences
    }

    /// Distinct postings per key, as the index should hold them.
    pub fn reference_postings(&self) -> Vec<(String, Vec<Posting>)> {
        let mut keys = std::collections::BTreeMap::<String, BTreeSet<Posting>>::new();
        for (key, doc, line) in self.reference_occurrences() {
            keys.entry(key)
                .or_default()
                .insert(Posting::new(DocCode::new(&doc).unwrap(), line));
        }
        keys.into_iter()
            .map(|(key, postings)| (key, postings.into_iter().collect()))
            .collect()
    }
}

pub fn small_budget_params(bytes: usize, parallel: bool) -> IndexBuilderParams {
    IndexBuilderParams {
        memory_budget_bytes: bytes,
        parallel_merge: parallel,
        ..Default::default()
    }
}

pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
