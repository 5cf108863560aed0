//! Alphabetic-run tokenizer: maximal runs of alphabetic characters, case-folded.

use std::{borrow::Cow, str::CharIndices};

use super::{DEFAULT_MIN_TERM_LENGTH, Tokenizer, fold_case};

/// Extracts maximal runs of alphabetic characters of at least
/// `min_term_length` characters, case-folded with [`fold_case`].
///
/// A run starts at the first alphabetic character following a non-alphabetic
/// one (or the start of the line) and ends at the next non-alphabetic
/// character or at the end of the line. Digits, punctuation and whitespace all
/// separate runs, so `"don't"` yields `"don"` and `"t"`, both of which are
/// then too short to be kept.
pub struct AlphaRunTokenizer {
    min_term_length: usize,
}

impl AlphaRunTokenizer {
    pub fn new() -> Self {
        Self::with_min_length(DEFAULT_MIN_TERM_LENGTH)
    }

    /// Create a tokenizer keeping runs of at least `min_term_length` characters.
    ///
    /// A minimum of zero is treated as one: empty runs do not exist.
    pub fn with_min_length(min_term_length: usize) -> Self {
        Self {
            min_term_length: min_term_length.max(1),
        }
    }
}

impl Default for AlphaRunTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the qualifying runs of one line.
pub struct AlphaRunIterator<'a> {
    input: &'a str,
    char_indices: CharIndices<'a>,
    min_term_length: usize,
}

impl<'a> Iterator for AlphaRunIterator<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut run_start = None;
            let mut run_end = None;
            let mut run_len = 0;

            for (pos, ch) in self.char_indices.by_ref() {
                if ch.is_alphabetic() {
                    if run_start.is_none() {
                        run_start = Some(pos);
                    }
                    run_len += 1;
                } else if run_start.is_some() {
                    run_end = Some(pos);
                    break;
                }
            }

            let start = run_start?;
            // End of line closes a trailing run.
            let end = run_end.unwrap_or(self.input.len());
            if run_len >= self.min_term_length {
                return Some(fold_case(&self.input[start..end]));
            }
        }
    }
}

impl Tokenizer for AlphaRunTokenizer {
    type TokenIter<'a> = AlphaRunIterator<'a>;

    fn tokenize<'a>(&'a self, input: &'a str) -> Self::TokenIter<'a> {
        AlphaRunIterator {
            input,
            char_indices: input.char_indices(),
            min_term_length: self.min_term_length,
        }
    }

    fn min_term_length(&self) -> usize {
        self.min_term_length
    }
}
