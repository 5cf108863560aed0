//! Proximity-hit detection over merged postings.

use concord_common::{Result, try_or_ret_some_err};

use crate::read::{
    item_stream::Posting,
    merge::{MergedPostings, TaggedPosting},
};

/// Finds locations where two different query terms occur within `window`
/// lines of each other in the same document.
///
/// Consecutive items `prev` and `curr` of the merged sequence form a hit when
/// they come from different terms, share a document, and
/// `curr.line - prev.line < window`. The hit is reported at `prev`. A location
/// that was just reported is not reported again, even if it pairs with the
/// following item too.
///
/// The stream consumes its input as it goes and cannot be restarted.
pub struct HitStream {
    merged: MergedPostings,
    window: u64,
    prev: Option<TaggedPosting>,
    latest_hit: Option<Posting>,
}

impl HitStream {
    pub fn new(merged: MergedPostings, window: u64) -> HitStream {
        HitStream {
            merged,
            window,
            prev: None,
            latest_hit: None,
        }
    }

    pub fn window(&self) -> u64 {
        self.window
    }

    /// Advances to the next hit, or returns `None` once the input is used up.
    pub fn next_hit(&mut self) -> Result<Option<Posting>> {
        while let Some(curr) = self.merged.next_item()? {
            let prev = self.prev.replace(curr);
            if let Some(prev) = prev
                && Some(prev.posting) != self.latest_hit
                && self.is_hit(&curr, &prev)
            {
                self.latest_hit = Some(prev.posting);
                return Ok(Some(prev.posting));
            }
        }
        Ok(None)
    }

    fn is_hit(&self, curr: &TaggedPosting, prev: &TaggedPosting) -> bool {
        curr.term != prev.term
            && curr.posting.doc == prev.posting.doc
            && curr
                .posting
                .line
                .checked_sub(prev.posting.line)
                .is_some_and(|distance| distance < self.window)
    }
}

impl Iterator for HitStream {
    type Item = Result<Posting>;

    fn next(&mut self) -> Option<Self::Item> {
        let hit = try_or_ret_some_err!(self.next_hit());
        hit.map(Ok)
    }
}
