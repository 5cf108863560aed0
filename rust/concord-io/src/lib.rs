//! I/O primitives used by the index build and query pipelines:
//! - `MemoryBudget`: the single memory bound, handed out as buffer fractions.
//! - `BufferedInput` / `BufferedOutput`: bounded-memory sequential line reader and writer.
//! - `LineCache`: random access to a text file by (1-based) line number.
//! - `TempRunStore`: scratch directory for sorted runs, with delete-on-drop run files.

pub mod budget;
pub mod buffered;
pub mod line_cache;
pub mod temp_run_store;

pub use budget::MemoryBudget;
pub use buffered::{BufferedInput, BufferedOutput};
pub use line_cache::LineCache;
pub use temp_run_store::{RunFile, TempRunStore};
