//! Tokenizers for extracting index keys from text lines.
//!
//! Tokenizers are used in two key scenarios:
//!
//! 1. **Index Creation**: the entry generator runs every document line through
//!    the tokenizer and records one occurrence per returned term.
//! 2. **Query Processing**: callers may run query text through the same
//!    tokenizer so that query keys are normalized exactly like indexed keys.
//!
//! Terms are returned as `Cow<str>`: borrowed from the input when no case
//! folding was necessary, owned otherwise.

pub mod alpha_run;

use std::borrow::Cow;

use caseless::Caseless;

pub use alpha_run::AlphaRunTokenizer;

/// Default minimum length of a term, in characters. Shorter alphabetic runs
/// (mostly function words) are not indexed.
pub const DEFAULT_MIN_TERM_LENGTH: usize = 4;

/// A tokenizer extracts terms from a single line of text.
pub trait Tokenizer: Send + Sync {
    /// The iterator type returned by tokenize.
    type TokenIter<'a>: Iterator<Item = Cow<'a, str>>
    where
        Self: 'a;

    /// Extract terms from `input`, in left-to-right order.
    fn tokenize<'a>(&'a self, input: &'a str) -> Self::TokenIter<'a>;

    /// Minimum length of a term in characters. Shorter runs are skipped.
    fn min_term_length(&self) -> usize;
}

/// Applies full Unicode case folding to `word`.
///
/// Folding is stronger than lowercasing: titlecase letters fold too, and
/// some letters expand (`ß` becomes `ss`), so `STRASSE` and `Straße` share a
/// key. The input is borrowed back when it is already folded.
pub fn fold_case(word: &str) -> Cow<'_, str> {
    if word.chars().default_case_fold().eq(word.chars()) {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(caseless::default_case_fold_str(word))
    }
}
