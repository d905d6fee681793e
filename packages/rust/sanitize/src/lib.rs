//! Biography sanitization: tree rewrites followed by a textual cleanup.
//!
//! The tree passes strip what an article lead carries for its own site
//! (table of contents, citation markers, internal links, bold, tooltips) so
//! the remaining markup can be embedded elsewhere.

mod passes;

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use ballot_dom::{Node, to_html};

pub use passes::{CITATION_HREF_PREFIX, delink, remove_citations, remove_toc, strip_titles, unbold};

/// How much each pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeStats {
    pub toc_removed: usize,
    pub citations_removed: usize,
    pub links_unwrapped: usize,
    pub bold_unwrapped: usize,
    pub titles_stripped: usize,
}

/// Run every tree pass over `nodes`, in order.
pub fn sanitize(nodes: &mut Vec<Node>) -> SanitizeStats {
    let stats = SanitizeStats {
        toc_removed: remove_toc(nodes),
        citations_removed: remove_citations(nodes),
        links_unwrapped: delink(nodes),
        bold_unwrapped: unbold(nodes),
        titles_stripped: strip_titles(nodes),
    };
    debug!(?stats, "sanitized biography");
    stats
}

/// Sanitize `nodes`, serialize them, and drop the leading parenthetical aside.
#[instrument(skip_all, fields(blocks = nodes.len()))]
pub fn sanitize_to_html(mut nodes: Vec<Node>) -> String {
    sanitize(&mut nodes);
    strip_leading_aside(&to_html(&nodes))
}

/// Remove the first `" ("` through the next `")"`, once.
///
/// Article leads open with pronunciation and alternate-name asides
/// (`Jane Doe (born January 1, 1970) is ...`); only the first one goes.
pub fn strip_leading_aside(html: &str) -> String {
    static ASIDE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s) \(.*?\)").expect("valid regex"));

    ASIDE_RE.replace(html, "").into_owned()
}
