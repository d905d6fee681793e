//! Candidate extraction for Ballot.
//!
//! This crate ties together table extraction, per-field heuristics, and
//! biography retrieval into the end-to-end [`run`] workflow.

pub mod biography;
pub mod dates;
pub mod fields;
pub mod pipeline;
pub mod table;

pub use pipeline::{
    Extraction, ProgressReporter, RecordFailure, SilentProgress, extract_all, extract_page, run,
};
pub use table::{RowMapping, extract_table};
