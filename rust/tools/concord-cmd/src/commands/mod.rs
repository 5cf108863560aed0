//! Command implementations for concord-cmd

use concord_index_core::LocatorKind;
use concord_text_index::{IndexOptions, MergeStrategy, tokenizers::fold_case};

use crate::{LocatorArg, MergeArg};

pub mod build;
pub mod hash_stats;
pub mod lookup;
pub mod search;

pub fn index_options(locator: LocatorArg) -> IndexOptions {
    let locator = match locator {
        LocatorArg::MetaIndex => LocatorKind::MetaIndex,
        LocatorArg::PerfectHash => LocatorKind::PerfectHash,
    };
    IndexOptions::default().with_locator(locator)
}

pub fn merge_strategy(merge: MergeArg) -> MergeStrategy {
    match merge {
        MergeArg::Heap => MergeStrategy::Heap,
        MergeArg::Linear => MergeStrategy::LinearScan,
    }
}

/// Index keys are case-folded; fold query words the same way.
pub fn normalize_key(word: &str) -> String {
    fold_case(word).into_owned()
}
