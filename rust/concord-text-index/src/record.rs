//! Textual occurrence records exchanged between the entry generator, the
//! external sorter and the index compiler.
//!
//! A record is `<key>:<doc><line>` where `<line>` is zero padded to the width
//! of the document's line count. With a fixed width per document, byte order
//! of whole records equals `(key, doc, line)` order, which is what lets the
//! sorter compare plain strings.

use std::fmt::Write;

use concord_common::{Result, error::Error};

use crate::corpus::{DOC_CODE_LEN, DocCode};

/// Separator between a key and the rest of a record.
pub const KEY_SEPARATOR: char = ':';

/// Separator between postings in a compiled index record.
pub const POSTING_SEPARATOR: char = ',';

/// Number of decimal digits needed to print `n`. Zero still takes one digit.
pub fn digit_width(n: u64) -> usize {
    n.checked_ilog10().map_or(1, |d| d as usize + 1)
}

/// Formats one raw occurrence record.
pub fn format_occurrence(key: &str, doc: DocCode, line: u64, width: usize) -> String {
    let mut record = String::with_capacity(key.len() + 1 + DOC_CODE_LEN + width);
    append_occurrence(&mut record, key, doc, line, width);
    record
}

/// Appends one raw occurrence record to `buf`.
pub fn append_occurrence(buf: &mut String, key: &str, doc: DocCode, line: u64, width: usize) {
    // Writing into a String does not fail.
    let _ = write!(buf, "{key}{KEY_SEPARATOR}{doc}{line:0width$}");
}

/// Returns the key field of a raw or compiled record: everything before the
/// first separator, or the whole line if there is none.
pub fn record_key(record: &str) -> &str {
    record
        .split_once(KEY_SEPARATOR)
        .map_or(record, |(key, _)| key)
}

/// A parsed raw occurrence record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'a> {
    pub key: &'a str,
    pub doc: DocCode,
    pub line: u64,
}

impl<'a> Occurrence<'a> {
    pub fn parse(record: &'a str) -> Result<Occurrence<'a>> {
        let Some((key, rest)) = record.split_once(KEY_SEPARATOR) else {
            return Err(Error::invalid_format(
                "occurrence",
                format!("missing key separator in '{record}'"),
            ));
        };
        if rest.len() <= DOC_CODE_LEN || !rest.is_char_boundary(DOC_CODE_LEN) {
            return Err(Error::invalid_format(
                "occurrence",
                format!("truncated location in '{record}'"),
            ));
        }
        let (doc, digits) = rest.split_at(DOC_CODE_LEN);
        let doc = DocCode::from_bytes(doc.as_bytes())
            .map_err(|_| Error::invalid_format("occurrence", format!("bad doc code in '{record}'")))?;
        let line = parse_line_number(digits)
            .ok_or_else(|| Error::invalid_format("occurrence", format!("bad line in '{record}'")))?;
        Ok(Occurrence { key, doc, line })
    }
}

/// Parses a run of decimal digits, skipping the zero padding.
pub(crate) fn parse_line_number(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Some(0);
    }
    significant.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_width() {
        assert_eq!(digit_width(0), 1);
        assert_eq!(digit_width(9), 1);
        assert_eq!(digit_width(10), 2);
        assert_eq!(digit_width(3599), 4);
        assert_eq!(digit_width(10_000), 5);
        assert_eq!(digit_width(u64::MAX), 20);
    }

    #[test]
    fn test_format_and_parse() {
        let doc = DocCode::new("CAW").unwrap();
        let record = format_occurrence("alice", doc, 42, 4);
        assert_eq!(record, "alice:CAW0042");
        assert_eq!(record_key(&record), "alice");

        let parsed = Occurrence::parse(&record).unwrap();
        assert_eq!(parsed.key, "alice");
        assert_eq!(parsed.doc, doc);
        assert_eq!(parsed.line, 42);
    }

    #[test]
    fn test_padding_preserves_order() {
        let doc = DocCode::new("AAA").unwrap();
        let width = digit_width(1500);
        let mut records = (1..=1500u64)
            .rev()
            .map(|line| format_occurrence("word", doc, line, width))
            .collect::<Vec<_>>();
        records.sort();
        let lines = records
            .iter()
            .map(|r| Occurrence::parse(r).unwrap().line)
            .collect::<Vec<_>>();
        assert_eq!(lines, (1..=1500u64).collect::<Vec<_>>());
    }

    #[test]
    fn test_separator_sorts_before_letters() {
        let doc = DocCode::new("ZZZ").unwrap();
        let short = format_occurrence("wonder", doc, 1, 1);
        let long = format_occurrence("wonderland", doc, 1, 1);
        assert!(short < long);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Occurrence::parse("alice").is_err());
        assert!(Occurrence::parse("alice:CAW").is_err());
        assert!(Occurrence::parse("alice:CA1").is_err());
        assert!(Occurrence::parse("alice:CAW12x").is_err());
        assert!(Occurrence::parse("alice:C1W12").is_err());
        assert!(Occurrence::parse("alice:ÉÉ12").is_err());
    }
}
