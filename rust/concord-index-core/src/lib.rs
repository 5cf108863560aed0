//! Core lookup infrastructure for the Concord index.
//!
//! The compiled index file stores one posting record per line. Finding the
//! record of a key is delegated to a [`KeyLocator`], which maps a key to the
//! 1-based line holding it. Two interchangeable implementations exist:
//!
//! - **Meta-index** (`concord-text-index`): a key → line map built by one
//!   sequential scan of the index file.
//! - **Perfect hash** (`concord-perfect-hash`): a collision-free hash function
//!   trained on the key set, which retains no key text.
//!
//! Query processing only ever sees `&dyn KeyLocator`, so the strategy can be
//! swapped without touching the query engine.

use concord_common::{Result, error::Error};
use serde::{Deserialize, Serialize};

/// Maps an index key to the line of the compiled index file that holds it.
///
/// # Contract
///
/// - For every key present in the index, `locate` returns the line whose key
///   field equals that key.
/// - For an absent key, `locate` returns `None`, or (for locators that keep
///   no key text) possibly the line of some other key. Callers must compare
///   the key found at the returned line with the requested one.
///
/// # Thread Safety
///
/// Locators are immutable once built and must be `Send + Sync`, so that
/// concurrent queries can share them without synchronization.
pub trait KeyLocator: Send + Sync + 'static {
    /// The strategy implemented by this locator.
    fn kind(&self) -> LocatorKind;

    /// Returns the 1-based index line for `key`, if it may be present.
    fn locate(&self, key: &str) -> Option<u64>;

    /// Number of keys the locator was built over.
    fn key_count(&self) -> usize;
}

/// The available key location strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocatorKind {
    /// Sequential-scan key → line map.
    #[default]
    MetaIndex,
    /// Minimal perfect hash over the key set.
    PerfectHash,
}

impl LocatorKind {
    pub const fn name(&self) -> &'static str {
        match self {
            LocatorKind::MetaIndex => "meta-index",
            LocatorKind::PerfectHash => "perfect-hash",
        }
    }
}

impl TryFrom<&str> for LocatorKind {
    type Error = Error;

    fn try_from(name: &str) -> Result<Self> {
        match name {
            "meta-index" => Ok(LocatorKind::MetaIndex),
            "perfect-hash" => Ok(LocatorKind::PerfectHash),
            _ => Err(Error::invalid_arg(
                "name",
                format!("Unrecognized locator: {name}"),
            )),
        }
    }
}

impl std::fmt::Display for LocatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
