//! Lazy cursor over one compiled posting-list record.

use std::fmt;

use concord_common::{Result, error::Error};

use crate::{
    corpus::{DOC_CODE_LEN, DocCode},
    record::{KEY_SEPARATOR, POSTING_SEPARATOR, parse_line_number},
};

/// A `(doc, line)` location. Orders by document code, then line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Posting {
    pub doc: DocCode,
    pub line: u64,
}

impl Posting {
    pub fn new(doc: DocCode, line: u64) -> Posting {
        Posting { doc, line }
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.doc, self.line)
    }
}

/// Streams the postings of one index record without decoding it up front.
///
/// The record body is a comma separated list in which a token either starts
/// with a document code (`CAW12`) or is a bare line number (`17`) that
/// belongs to the last document seen. The stream keeps one parsed posting of
/// lookahead: [`peek`](Self::peek) returns it, [`pop`](Self::pop) hands it out
/// and parses the next one. Once exhausted the stream stays exhausted.
pub struct ItemStream {
    record: String,
    /// Byte offset of the next unparsed token.
    pos: usize,
    /// Document of the most recently parsed token.
    doc: Option<DocCode>,
    head: Option<Posting>,
}

impl ItemStream {
    /// Wraps a full index record (`key:body`).
    pub fn new(record: String) -> Result<ItemStream> {
        let Some(start) = record.find(KEY_SEPARATOR) else {
            return Err(Error::invalid_format(
                "posting record",
                format!("missing key separator in '{record}'"),
            ));
        };
        let mut stream = ItemStream {
            record,
            pos: start + 1,
            doc: None,
            head: None,
        };
        stream.head = stream.advance()?;
        Ok(stream)
    }

    /// The key this record belongs to.
    pub fn key(&self) -> &str {
        let end = self.record.find(KEY_SEPARATOR).unwrap_or(self.record.len());
        &self.record[..end]
    }

    /// The next posting, without consuming it.
    pub fn peek(&self) -> Option<Posting> {
        self.head
    }

    /// Consumes and returns the next posting.
    pub fn pop(&mut self) -> Result<Option<Posting>> {
        let Some(head) = self.head else {
            return Ok(None);
        };
        self.head = self.advance()?;
        Ok(Some(head))
    }

    pub fn is_exhausted(&self) -> bool {
        self.head.is_none()
    }

    /// Parses the token at `pos` and moves past it.
    fn advance(&mut self) -> Result<Option<Posting>> {
        if self.pos >= self.record.len() {
            return Ok(None);
        }
        let rest = &self.record[self.pos..];
        let (token, consumed) = match rest.find(POSTING_SEPARATOR) {
            Some(comma) => (&rest[..comma], comma + 1),
            None => (rest, rest.len()),
        };
        let digits = if token.starts_with(|c: char| c.is_ascii_alphabetic()) {
            if token.len() < DOC_CODE_LEN || !token.is_char_boundary(DOC_CODE_LEN) {
                return Err(self.malformed(token));
            }
            let (doc, digits) = token.split_at(DOC_CODE_LEN);
            let doc = DocCode::from_bytes(doc.as_bytes()).map_err(|_| self.malformed(token))?;
            self.doc = Some(doc);
            digits
        } else {
            token
        };
        let (Some(doc), Some(line)) = (self.doc, parse_line_number(digits)) else {
            return Err(self.malformed(token));
        };
        self.pos += consumed;
        Ok(Some(Posting { doc, line }))
    }

    fn malformed(&self, token: &str) -> Error {
        Error::invalid_format(
            "posting record",
            format!("bad posting '{token}' in record for '{}'", self.key()),
        )
    }
}

impl Iterator for ItemStream {
    type Item = Result<Posting>;

    fn next(&mut self) -> Option<Self::Item> {
        self.pop().transpose()
    }
}
