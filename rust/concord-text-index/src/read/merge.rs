//! k-way merge of item streams.
//!
//! Produces the postings of all query terms in one globally ordered sequence,
//! each tagged with the index of the term it came from. Equal postings from
//! different terms come out lowest term first.

use std::{cmp::Reverse, collections::BinaryHeap};

use concord_common::Result;
use serde::{Deserialize, Serialize};

use crate::read::item_stream::{ItemStream, Posting};

/// A posting together with the query term that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaggedPosting {
    pub posting: Posting,
    pub term: usize,
}

/// How the head of the merge is found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Binary heap over stream heads, `O(log k)` per item.
    #[default]
    Heap,
    /// Scan of all stream heads, `O(k)` per item.
    LinearScan,
}

/// `true` if `a` comes strictly before `b`, where `None` is an exhausted
/// stream and sorts after every posting.
pub fn item_before(a: Option<Posting>, b: Option<Posting>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a < b,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

pub struct MergedPostings {
    streams: Vec<ItemStream>,
    strategy: MergeStrategy,
    heap: BinaryHeap<Reverse<TaggedPosting>>,
}

impl MergedPostings {
    pub fn new(streams: Vec<ItemStream>, strategy: MergeStrategy) -> MergedPostings {
        let heap = match strategy {
            MergeStrategy::Heap => streams
                .iter()
                .enumerate()
                .filter_map(|(term, stream)| {
                    stream
                        .peek()
                        .map(|posting| Reverse(TaggedPosting { posting, term }))
                })
                .collect(),
            MergeStrategy::LinearScan => BinaryHeap::new(),
        };
        MergedPostings {
            streams,
            strategy,
            heap,
        }
    }

    pub fn strategy(&self) -> MergeStrategy {
        self.strategy
    }

    /// Removes and returns the smallest remaining posting.
    pub fn next_item(&mut self) -> Result<Option<TaggedPosting>> {
        match self.strategy {
            MergeStrategy::Heap => self.next_from_heap(),
            MergeStrategy::LinearScan => self.next_from_scan(),
        }
    }

    fn next_from_heap(&mut self) -> Result<Option<TaggedPosting>> {
        let Some(Reverse(item)) = self.heap.pop() else {
            return Ok(None);
        };
        let stream = &mut self.streams[item.term];
        stream.pop()?;
        if let Some(posting) = stream.peek() {
            self.heap.push(Reverse(TaggedPosting {
                posting,
                term: item.term,
            }));
        }
        Ok(Some(item))
    }

    fn next_from_scan(&mut self) -> Result<Option<TaggedPosting>> {
        let mut earliest = 0;
        for term in 1..self.streams.len() {
            if item_before(self.streams[term].peek(), self.streams[earliest].peek()) {
                earliest = term;
            }
        }
        let Some(stream) = self.streams.get_mut(earliest) else {
            return Ok(None);
        };
        Ok(stream.pop()?.map(|posting| TaggedPosting {
            posting,
            term: earliest,
        }))
    }
}

impl Iterator for MergedPostings {
    type Item = Result<TaggedPosting>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_item().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::DocCode;

    fn streams(records: &[&str]) -> Vec<ItemStream> {
        records
            .iter()
            .map(|r| ItemStream::new(r.to_string()).unwrap())
            .collect()
    }

    fn merged(records: &[&str], strategy: MergeStrategy) -> Vec<(String, u64, usize)> {
        MergedPostings::new(streams(records), strategy)
            .map(|item| {
                let item = item.unwrap();
                (item.posting.doc.to_string(), item.posting.line, item.term)
            })
            .collect()
    }

    #[test]
    fn test_item_before() {
        let p = |line| Some(Posting::new(DocCode::new("AAA").unwrap(), line));
        assert!(item_before(p(1), p(2)));
        assert!(!item_before(p(2), p(2)));
        assert!(item_before(p(7), None));
        assert!(!item_before(None, p(7)));
        assert!(!item_before(None, None));
    }

    #[test]
    fn test_merge_order() {
        let records = ["alice:AAA3,9,BBB1", "rabbit:AAA3,4", "hatter:BBB1"];
        let expected = vec![
            ("AAA".to_string(), 3, 0),
            ("AAA".to_string(), 3, 1),
            ("AAA".to_string(), 4, 1),
            ("AAA".to_string(), 9, 0),
            ("BBB".to_string(), 1, 0),
            ("BBB".to_string(), 1, 2),
        ];
        assert_eq!(merged(&records, MergeStrategy::Heap), expected);
        assert_eq!(merged(&records, MergeStrategy::LinearScan), expected);
    }

    #[test]
    fn test_merge_no_streams() {
        assert!(merged(&[], MergeStrategy::Heap).is_empty());
        assert!(merged(&[], MergeStrategy::LinearScan).is_empty());
    }

    #[test]
    fn test_strategy_serde() {
        let json = serde_json::to_string(&MergeStrategy::LinearScan).unwrap();
        assert_eq!(json, "\"linear-scan\"");
        let parsed: MergeStrategy = serde_json::from_str("\"heap\"").unwrap();
        assert_eq!(parsed, MergeStrategy::Heap);
    }
}
