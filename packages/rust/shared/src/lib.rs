//! Shared types, error model, and configuration for Ballot.
//!
//! This crate is the foundation depended on by all other Ballot crates.
//! It provides:
//! - [`BallotError`]: the unified error type
//! - Record types ([`CandidateRecord`], [`Birthplace`], [`Candidates`])
//! - Configuration ([`AppConfig`], [`ExtractConfig`], config loading)
//! - [`slugify`] for candidate identifiers and cache keys

pub mod config;
pub mod error;
pub mod slug;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ExtractConfig, FetchConfig, LabelsConfig, SectionConfig, SourceConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{BallotError, Result};
pub use slug::slugify;
pub use types::{Birthplace, CandidateRecord, Candidates};
