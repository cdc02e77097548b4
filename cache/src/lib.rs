//! SQLite-backed cache for per-token command descriptions.
//!
//! Descriptions are expensive to produce (they may involve an LLM
//! round-trip), so they are cached keyed by the original command string
//! plus a hash of the man-page content they were grounded in. A change
//! to any relevant man page changes the hash and invalidates the entry
//! without any explicit eviction logic.
//!
//! # Quick start
//!
//! ```
//! use cmdscribe_cache::DescriptionCache;
//! use cmdscribe_core::ParsedCommand;
//!
//! let cache = DescriptionCache::open_in_memory().unwrap();
//! let parsed = ParsedCommand::from_line("ls -la");
//!
//! cache.put(&parsed, "sourcehash", &["List files".into(), "All + long".into()]).unwrap();
//! assert!(cache.get(&parsed, "sourcehash").unwrap().is_some());
//! assert!(cache.get(&parsed, "otherhash").unwrap().is_none());
//! ```

mod error;
mod store;

pub use error::{CacheError, Result};
pub use store::DescriptionCache;
