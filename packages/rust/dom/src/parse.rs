//! Markup → [`Node`] conversion on top of `scraper`'s html5ever parser.
//!
//! Comments, doctypes, and processing instructions are dropped; everything
//! else maps one-to-one onto owned nodes.

use scraper::{ElementRef, Html};
use tracing::debug;

use crate::node::{Element, Node};

/// Parse a full HTML document. Returns a single-element fragment holding `<html>`.
pub fn parse_document(markup: &str) -> Vec<Node> {
    let doc = Html::parse_document(markup);
    log_parse_errors(&doc);
    vec![Node::Element(convert_element(doc.root_element()))]
}

/// Parse an HTML fragment. Returns the top-level nodes of the fragment.
pub fn parse_fragment(markup: &str) -> Vec<Node> {
    let doc = Html::parse_fragment(markup);
    log_parse_errors(&doc);
    convert_element(doc.root_element()).children
}

fn log_parse_errors(doc: &Html) {
    if !doc.errors.is_empty() {
        debug!(count = doc.errors.len(), "markup parsed with recoverable errors");
    }
}

fn convert_element(el: ElementRef<'_>) -> Element {
    let value = el.value();
    let attrs = value
        .attrs()
        .map(|(key, val)| (key.to_string(), val.to_string()))
        .collect();

    let children = el
        .children()
        .filter_map(|child| match child.value() {
            scraper::Node::Text(text) => Some(Node::Text(String::from(&**text))),
            scraper::Node::Element(_) => {
                ElementRef::wrap(child).map(|child_el| Node::Element(convert_element(child_el)))
            }
            _ => None,
        })
        .collect();

    Element {
        tag: value.name().to_string(),
        attrs,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::find_first;

    #[test]
    fn document_has_html_root_with_head_and_body() {
        let nodes = parse_document("<!DOCTYPE html><html><body><p>Hi</p></body></html>");
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_tag("html"));
        let body = find_first(&nodes, |n| n.is_tag("body")).expect("body");
        assert_eq!(body.text_content(), "Hi");
    }

    #[test]
    fn fragment_keeps_top_level_nodes() {
        let nodes = parse_fragment(r#"<b title="x">Bold</b> tail<!-- note -->"#);
        assert_eq!(nodes.len(), 2);
        let b = nodes[0].as_element().expect("element");
        assert_eq!(b.tag, "b");
        assert_eq!(b.attr("title"), Some("x"));
        assert_eq!(nodes[1], Node::text(" tail"));
    }

    #[test]
    fn tables_gain_tbody() {
        let nodes = parse_fragment("<table><tr><td>a</td></tr></table>");
        let table = nodes[0].as_element().expect("table");
        assert!(table.children[0].is_tag("tbody"));
    }
}
