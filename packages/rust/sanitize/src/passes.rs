//! Individual sanitization passes.
//!
//! Each pass is one full traversal that targets a single feature, returns how
//! many nodes it touched, and is a no-op on its own output.

use ballot_dom::{Element, Node, Visit, traverse_mut};

/// `id` of the table-of-contents block embedded in article leads.
const TOC_ID: &str = "toc";

/// `href` prefix of citation-marker anchors.
pub const CITATION_HREF_PREFIX: &str = "#cite_note";

/// Tag that unwrapped inline elements become.
const PLAIN_INLINE_TAG: &str = "span";

// ---------------------------------------------------------------------------
// Pass 1: Remove table of contents
// ---------------------------------------------------------------------------

/// Drop the table-of-contents subtree.
pub fn remove_toc(nodes: &mut Vec<Node>) -> usize {
    remove_where(nodes, |el| el.attr("id") == Some(TOC_ID))
}

// ---------------------------------------------------------------------------
// Pass 2: Remove citation anchors
// ---------------------------------------------------------------------------

/// Drop `<a href="#cite_note-...">` markers, text and all.
pub fn remove_citations(nodes: &mut Vec<Node>) -> usize {
    remove_where(nodes, |el| {
        el.tag == "a"
            && el
                .attr("href")
                .is_some_and(|href| href.starts_with(CITATION_HREF_PREFIX))
    })
}

// ---------------------------------------------------------------------------
// Pass 3: Delink
// ---------------------------------------------------------------------------

/// Turn every anchor into a plain `<span>` holding the same children.
pub fn delink(nodes: &mut Vec<Node>) -> usize {
    unwrap_tag(nodes, "a")
}

// ---------------------------------------------------------------------------
// Pass 4: De-emphasize
// ---------------------------------------------------------------------------

/// Turn every `<b>` into a plain `<span>` holding the same children.
pub fn unbold(nodes: &mut Vec<Node>) -> usize {
    unwrap_tag(nodes, "b")
}

// ---------------------------------------------------------------------------
// Pass 5: Strip title attributes
// ---------------------------------------------------------------------------

/// Remove the `title` attribute from every element.
pub fn strip_titles(nodes: &mut Vec<Node>) -> usize {
    let mut count = 0;
    traverse_mut(nodes, |node, _| match node {
        Node::Element(el) if el.attrs.contains_key("title") => {
            let mut stripped = el.clone();
            stripped.attrs.remove("title");
            count += 1;
            Visit::Replace(stripped.into())
        }
        _ => Visit::Continue,
    });
    count
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn remove_where<P>(nodes: &mut Vec<Node>, predicate: P) -> usize
where
    P: Fn(&Element) -> bool,
{
    let mut count = 0;
    traverse_mut(nodes, |node, _| match node {
        Node::Element(el) if predicate(el) => {
            count += 1;
            Visit::Remove
        }
        _ => Visit::Continue,
    });
    count
}

fn unwrap_tag(nodes: &mut Vec<Node>, tag: &str) -> usize {
    let mut count = 0;
    traverse_mut(nodes, |node, _| match node {
        Node::Element(el) if el.tag == tag => {
            count += 1;
            Visit::Replace(
                Element::new(PLAIN_INLINE_TAG)
                    .with_children(el.children.clone())
                    .into(),
            )
        }
        _ => Visit::Continue,
    });
    count
}
