//! Error types for Ballot.
//!
//! Library crates use [`BallotError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! The first three variants are structural: the source document no longer
//! looks the way extraction expects, and no record can be trusted. The rest
//! are isolated to a single field or a single candidate.

use std::path::PathBuf;

/// Top-level error type for all Ballot operations.
#[derive(Debug, thiserror::Error)]
pub enum BallotError {
    /// No sub-heading with the requested text exists in the content region.
    #[error("section not found: no heading titled {heading:?}")]
    SectionNotFound { heading: String },

    /// The section heading exists but no table follows it.
    #[error("table not found after heading {heading:?}")]
    TableNotFound { heading: String },

    /// The table's header row is missing or a header cell is empty.
    #[error("malformed header in table under {heading:?}: {message}")]
    MalformedHeader { heading: String, message: String },

    /// A single field accessor could not find the cell or anchor it expects.
    #[error("could not extract {field}: {message}")]
    FieldExtraction { field: &'static str, message: String },

    /// Network/HTTP error while retrieving a document.
    #[error("fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Markup or URL parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BallotError>;

impl BallotError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a field-level extraction error.
    pub fn field(field: &'static str, msg: impl Into<String>) -> Self {
        Self::FieldExtraction {
            field,
            message: msg.into(),
        }
    }

    /// Create a fetch error for `url`.
    pub fn fetch(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error invalidates the whole run rather than one record.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::SectionNotFound { .. } | Self::TableNotFound { .. } | Self::MalformedHeader { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = BallotError::SectionNotFound {
            heading: "Democratic Party".into(),
        };
        assert_eq!(
            err.to_string(),
            "section not found: no heading titled \"Democratic Party\""
        );

        let err = BallotError::field("home state", "no anchor in cell");
        assert_eq!(err.to_string(), "could not extract home state: no anchor in cell");

        let err = BallotError::fetch("https://example.com/wiki/X", "HTTP 404");
        assert!(err.to_string().contains("HTTP 404"));
    }

    #[test]
    fn structural_classification() {
        assert!(
            BallotError::TableNotFound {
                heading: "Republican Party".into()
            }
            .is_structural()
        );
        assert!(!BallotError::field("birth date", "no span").is_structural());
        assert!(!BallotError::fetch("u", "timeout").is_structural());
    }
}
