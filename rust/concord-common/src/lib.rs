//! Core definitions (error model and verification helpers), relied upon by all concord-* crates.

pub mod error;
pub mod macros;
pub mod result;

pub use result::Result;
