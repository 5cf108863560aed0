//! Query side: key location, posting streams and proximity search.

pub mod hit_stream;
pub mod index;
pub mod item_stream;
pub mod merge;
pub mod meta_index;
pub mod search;

pub use hit_stream::HitStream;
pub use index::{IndexHandle, IndexOptions};
pub use item_stream::{ItemStream, Posting};
pub use merge::{MergeStrategy, MergedPostings, TaggedPosting, item_before};
pub use meta_index::MetaIndex;
pub use search::{SearchOptions, SearchOutcome, SearchSession};
