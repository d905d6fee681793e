//! Lead-section selection on a candidate's own article.

use ballot_dom::{Node, find_by_class, parse_document};
use ballot_sanitize::sanitize_to_html;
use ballot_shared::{BallotError, Result};
use tracing::debug;

use crate::table::is_heading;

/// Blocks of the article lead inside `content`.
///
/// Starts at the first non-empty paragraph at or after the first table (the
/// infobox), or from the top when there is no table, and runs up to the next
/// section heading.
pub fn select_lead(content: &[Node]) -> Result<&[Node]> {
    let from = content
        .iter()
        .position(|node| node.is_tag("table"))
        .unwrap_or(0);

    let start = content[from..]
        .iter()
        .position(is_paragraph_with_text)
        .map(|offset| from + offset)
        .ok_or_else(|| BallotError::field("biography", "no lead paragraph"))?;

    let end = content[start..]
        .iter()
        .position(is_heading)
        .map_or(content.len(), |offset| start + offset);

    Ok(&content[start..end])
}

/// Sanitized lead markup of the article in `markup`.
pub fn biography_from_markup(markup: &str, content_class: &str) -> Result<String> {
    let page = parse_document(markup);
    let content = find_by_class(&page, content_class).ok_or_else(|| {
        BallotError::field("biography", format!("no element with class {content_class:?}"))
    })?;

    let lead = select_lead(content.children())?;
    debug!(blocks = lead.len(), "selected article lead");
    Ok(sanitize_to_html(lead.to_vec()))
}

fn is_paragraph_with_text(node: &Node) -> bool {
    node.is_tag("p") && !node.text_content().trim().is_empty()
}
