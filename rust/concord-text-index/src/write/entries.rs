//! Entry generator: turns documents into unsorted occurrence records.

use concord_common::{Result, error::Error};
use concord_io::{BufferedInput, BufferedOutput, MemoryBudget};

use crate::{
    corpus::{Corpus, Document},
    record::{append_occurrence, digit_width},
    tokenizers::Tokenizer,
};

/// Emits one `key:DOCline` record per qualifying word occurrence.
///
/// Documents are read chunk by chunk through a [`BufferedInput`], so at most
/// `read_fraction` of the budget is held in memory at a time. Line numbers are
/// zero padded to the width of the document's registered line count.
pub struct EntryGenerator<'t, T: Tokenizer> {
    tokenizer: &'t T,
    budget: MemoryBudget,
    read_fraction: f64,
}

impl<'t, T: Tokenizer> EntryGenerator<'t, T> {
    pub fn new(tokenizer: &'t T, budget: MemoryBudget, read_fraction: f64) -> Self {
        EntryGenerator {
            tokenizer,
            budget,
            read_fraction,
        }
    }

    /// Writes the records of one document and returns how many were written.
    pub fn generate(&self, doc: &Document, output: &mut BufferedOutput) -> Result<u64> {
        let width = digit_width(doc.line_count());
        let mut input = BufferedInput::open(doc.path(), self.budget, self.read_fraction)?;
        let mut record = String::new();
        let mut line_no = 0u64;
        let mut count = 0u64;
        loop {
            let chunk = input.read_chunk()?;
            if chunk.is_empty() {
                break;
            }
            for line in &chunk {
                line_no += 1;
                if line_no > doc.line_count() {
                    return Err(Error::invalid_operation(format!(
                        "document {} has more than its registered {} lines",
                        doc.code(),
                        doc.line_count()
                    )));
                }
                for word in self.tokenizer.tokenize(line) {
                    record.clear();
                    append_occurrence(&mut record, &word, doc.code(), line_no, width);
                    output.write_line(&record)?;
                    count += 1;
                }
            }
        }
        input.close();
        log::debug!("{}: {count} occurrences over {line_no} lines", doc.code());
        Ok(count)
    }

    /// Writes the records of every document in registration order.
    pub fn generate_all(&self, corpus: &Corpus, output: &mut BufferedOutput) -> Result<u64> {
        let mut total = 0;
        for doc in corpus.documents() {
            total += self.generate(doc, output)?;
        }
        Ok(total)
    }
}
