//! Index construction: raw entry generation, external sorting and compilation
//! of the sorted stream into posting-list records.

pub mod builder;
pub mod compiler;
pub mod entries;
pub mod sorter;

pub use builder::{BufferFractions, BuildSummary, IndexBuilder, IndexBuilderParams};
pub use compiler::{CompileStats, IndexCompiler};
pub use entries::EntryGenerator;
pub use sorter::{ExternalSorter, SortParams};
