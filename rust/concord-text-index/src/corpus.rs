//! Corpus registry: the documents an index is built from.
//!
//! Every document is registered under a three-letter code, which is what the
//! index stores in place of a file name. The compiled posting format and the
//! item-stream parser both rely on codes being exactly three ASCII letters.

use std::{
    collections::HashSet,
    fmt,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use concord_common::{Result, error::Error};
use concord_io::{BufferedInput, MemoryBudget};
use serde::{Deserialize, Serialize};

/// Length of every document code.
pub const DOC_CODE_LEN: usize = 3;

/// A short document identifier, three ASCII letters.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocCode([u8; DOC_CODE_LEN]);

impl DocCode {
    pub fn new(code: &str) -> Result<DocCode> {
        Self::from_bytes(code.as_bytes())
    }

    /// Parses a code from exactly [`DOC_CODE_LEN`] ASCII letters.
    pub fn from_bytes(bytes: &[u8]) -> Result<DocCode> {
        match <[u8; DOC_CODE_LEN]>::try_from(bytes) {
            Ok(code) if code.iter().all(u8::is_ascii_alphabetic) => Ok(DocCode(code)),
            _ => Err(Error::invalid_arg(
                "code",
                format!(
                    "document codes are {DOC_CODE_LEN} ASCII letters, got '{}'",
                    String::from_utf8_lossy(bytes)
                ),
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for DocCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for DocCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocCode({})", self.as_str())
    }
}

/// A registered document. Immutable once registered.
#[derive(Debug, Clone)]
pub struct Document {
    code: DocCode,
    path: PathBuf,
    line_count: u64,
}

impl Document {
    pub fn code(&self) -> DocCode {
        self.code
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of lines, determined at registration.
    pub fn line_count(&self) -> u64 {
        self.line_count
    }
}

/// The set of documents to index, in registration order.
pub struct Corpus {
    budget: MemoryBudget,
    documents: Vec<Document>,
}

impl Corpus {
    /// Share of the budget used by the line-count pass.
    pub const LINE_COUNT_FRACTION: f64 = 0.8;

    pub fn new(budget: MemoryBudget) -> Corpus {
        Corpus {
            budget,
            documents: Vec::new(),
        }
    }

    /// Loads every document listed in the JSON manifest at `path`.
    ///
    /// Relative document paths are resolved against the manifest's directory.
    pub fn from_manifest(path: impl AsRef<Path>, budget: MemoryBudget) -> Result<Corpus> {
        let path = path.as_ref();
        let manifest = CorpusManifest::load(path)?;
        let mut corpus = Corpus::new(budget);
        for (code, doc_path) in manifest.resolve(path)? {
            corpus.register(code.as_str(), doc_path)?;
        }
        Ok(corpus)
    }

    /// Registers a document under `code`, counting its lines with one
    /// bounded-memory pass.
    pub fn register(&mut self, code: &str, path: impl AsRef<Path>) -> Result<&Document> {
        let code = DocCode::new(code)?;
        if self.document(code).is_some() {
            return Err(Error::invalid_arg(
                "code",
                format!("document code '{code}' is already registered"),
            ));
        }
        let path = path.as_ref().to_path_buf();
        let line_count = count_lines(&path, self.budget, Self::LINE_COUNT_FRACTION)?;
        log::debug!("registered {code}: {} ({line_count} lines)", path.display());
        self.documents.push(Document {
            code,
            path,
            line_count,
        });
        Ok(&self.documents[self.documents.len() - 1])
    }

    pub fn document(&self, code: DocCode) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.code == code)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn budget(&self) -> MemoryBudget {
        self.budget
    }
}

/// Counts the lines of `path`, holding at most one chunk in memory.
pub fn count_lines(path: &Path, budget: MemoryBudget, fraction: f64) -> Result<u64> {
    let mut reader = BufferedInput::open(path, budget, fraction)?;
    let mut lines = 0u64;
    loop {
        let chunk = reader.read_chunk()?;
        if chunk.is_empty() {
            break;
        }
        lines += chunk.len() as u64;
    }
    reader.close();
    Ok(lines)
}

/// On-disk description of a corpus.
///
/// ```json
/// { "documents": [ { "code": "CAW", "path": "Carroll_Alice_in_Wonderland.txt" } ] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusManifest {
    pub documents: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub code: String,
    pub path: PathBuf,
}

impl CorpusManifest {
    pub fn load(path: &Path) -> Result<CorpusManifest> {
        let file =
            File::open(path).map_err(|e| Error::io(format!("open {}", path.display()), e))?;
        let manifest: CorpusManifest = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::config(format!("parse manifest {}", path.display()), e))?;
        let mut seen = HashSet::new();
        for entry in &manifest.documents {
            if !seen.insert(entry.code.as_str()) {
                return Err(Error::invalid_arg(
                    "documents",
                    format!("duplicate document code '{}'", entry.code),
                ));
            }
        }
        Ok(manifest)
    }

    /// Validated document codes with their paths, relative paths resolved
    /// against the directory of `manifest_path`.
    pub fn resolve(&self, manifest_path: &Path) -> Result<Vec<(DocCode, PathBuf)>> {
        let base = manifest_path.parent().unwrap_or_else(|| Path::new(""));
        self.documents
            .iter()
            .map(|entry| Ok((DocCode::new(&entry.code)?, base.join(&entry.path))))
            .collect()
    }
}
