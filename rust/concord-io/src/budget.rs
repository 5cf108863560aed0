use concord_common::{Result, verify_arg};

/// The memory bound shared by every bounded reader and writer of a pipeline.
///
/// Consumers never hold the whole budget; each opens its buffer with a
/// `fraction` of it, so several readers and writers can be alive at once
/// while their sum stays within the configured amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBudget {
    bytes: usize,
}

impl MemoryBudget {
    /// Default budget used when nothing else is configured.
    pub const DEFAULT_BYTES: usize = 16 * 1024 * 1024;

    pub fn new(bytes: usize) -> MemoryBudget {
        MemoryBudget { bytes }
    }

    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Number of bytes granted to a consumer asking for `fraction` of the budget.
    ///
    /// The result is never zero, so that a reader always makes progress by at
    /// least one line.
    pub fn fraction(&self, fraction: f64) -> Result<usize> {
        verify_arg!(fraction, fraction > 0.0 && fraction <= 1.0);
        Ok(((self.bytes as f64 * fraction) as usize).max(1))
    }
}

impl Default for MemoryBudget {
    fn default() -> Self {
        MemoryBudget::new(Self::DEFAULT_BYTES)
    }
}
