//! Proximity search sessions.
//!
//! A search resolves its keys to posting streams, merges them and pulls hits
//! from the resulting [`HitStream`] a page at a time. The session keeps the
//! cursor, so asking for more hits continues exactly where the previous page
//! stopped and never repeats a location.

use std::collections::HashSet;

use concord_common::Result;
use serde::{Deserialize, Serialize};

use crate::read::{
    hit_stream::HitStream,
    index::IndexHandle,
    item_stream::{ItemStream, Posting},
    merge::{MergeStrategy, MergedPostings},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Two terms form a hit when their lines differ by less than this.
    pub window: u64,
    pub strategy: MergeStrategy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            window: 1,
            strategy: MergeStrategy::Heap,
        }
    }
}

impl SearchOptions {
    pub fn new(window: u64) -> Self {
        SearchOptions {
            window,
            ..Default::default()
        }
    }

    pub fn with_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Cursor of a running search.
pub struct SearchSession {
    hits: HitStream,
    exhausted: bool,
}

impl SearchSession {
    pub fn new(streams: Vec<ItemStream>, options: &SearchOptions) -> SearchSession {
        SearchSession {
            hits: HitStream::new(MergedPostings::new(streams, options.strategy), options.window),
            exhausted: false,
        }
    }

    /// Returns up to `max_hits` further hits. Fewer are returned only when
    /// the search is exhausted.
    pub fn more(&mut self, max_hits: usize) -> Result<Vec<Posting>> {
        let mut page = Vec::new();
        while !self.exhausted && page.len() < max_hits {
            match self.hits.next_hit()? {
                Some(hit) => page.push(hit),
                None => self.exhausted = true,
            }
        }
        Ok(page)
    }

    /// Drains every remaining hit.
    pub fn all_hits(&mut self) -> Result<Vec<Posting>> {
        let mut hits = Vec::new();
        while !self.exhausted {
            match self.hits.next_hit()? {
                Some(hit) => hits.push(hit),
                None => self.exhausted = true,
            }
        }
        Ok(hits)
    }

    pub fn window(&self) -> u64 {
        self.hits.window()
    }

    /// `true` once a call has run out of hits.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// Result of [`IndexHandle::search`].
pub struct SearchOutcome {
    /// First page of hits.
    pub hits: Vec<Posting>,
    /// Query keys found in the index, in query order.
    pub terms: Vec<String>,
    /// Query keys absent from the index.
    pub missing: Vec<String>,
    /// Cursor for further pages; `None` if fewer than two keys were found
    /// and no search was run.
    pub session: Option<SearchSession>,
}

impl IndexHandle {
    /// Searches for places where at least two of `keys` occur within
    /// `options.window` lines of each other, returning up to `max_hits` hits.
    ///
    /// Keys are matched verbatim; repeated keys count once. Fewer than two
    /// indexed keys (an empty `keys` included) make an empty outcome without
    /// a session.
    pub fn search<S: AsRef<str>>(
        &self,
        keys: &[S],
        options: &SearchOptions,
        max_hits: usize,
    ) -> Result<SearchOutcome> {
        let mut seen = HashSet::new();
        let unique = keys
            .iter()
            .map(|key| key.as_ref())
            .filter(|key| seen.insert(*key))
            .collect::<Vec<&str>>();

        let (streams, missing) = self.item_streams(&unique)?;
        if !missing.is_empty() {
            log::info!("words absent from index: {}", missing.join(" "));
        }
        let terms = streams
            .iter()
            .map(|stream| stream.key().to_string())
            .collect::<Vec<_>>();
        if streams.len() < 2 {
            log::debug!("{} usable search terms, nothing to search", streams.len());
            return Ok(SearchOutcome {
                hits: Vec::new(),
                terms,
                missing,
                session: None,
            });
        }

        let mut session = SearchSession::new(streams, options);
        let hits = session.more(max_hits)?;
        Ok(SearchOutcome {
            hits,
            terms,
            missing,
            session: Some(session),
        })
    }
}
