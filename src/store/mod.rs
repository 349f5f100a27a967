//! Default stateful collaborators.
//!
//! Provides the in-memory cache used for the cursor sample and the
//! SQLite-backed usage statistics collector.

pub mod cache;
pub mod usage;

pub use cache::*;
pub use usage::*;
