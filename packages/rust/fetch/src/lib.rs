//! Document retrieval for Ballot.
//!
//! This crate provides:
//! - [`DocumentSource`]: the async capability the extractor fetches pages through
//! - [`HttpSource`]: reqwest-backed retrieval
//! - [`FileSource`]: serves pages from a local directory (offline runs)
//! - [`CachedSource`]: wraps any source with a [`ResponseCache`] keyed by URL slug

pub mod cache;
pub mod source;

pub use cache::{CachedSource, DiskCache, MemoryCache, ResponseCache, cache_key};
pub use source::{DocumentSource, FileSource, HttpSource};
