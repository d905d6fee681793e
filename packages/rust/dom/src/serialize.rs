//! [`Node`] → markup.

use std::fmt::Write;

use crate::node::{Element, Node};

/// Elements that never carry content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text content is emitted without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Serialize a fragment to HTML.
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node, false);
    }
    out
}

fn write_node(out: &mut String, node: &Node, raw: bool) {
    match node {
        Node::Text(text) if raw => out.push_str(text),
        Node::Text(text) => escape_into(out, text, false),
        Node::Element(el) => write_element(out, el),
    }
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.tag);
    for (key, value) in &el.attrs {
        let _ = write!(out, " {key}=\"");
        escape_into(out, value, true);
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&el.tag.as_str()) {
        return;
    }

    let raw = RAW_TEXT_ELEMENTS.contains(&el.tag.as_str());
    for child in &el.children {
        write_node(out, child, raw);
    }

    let _ = write!(out, "</{}>", el.tag);
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
