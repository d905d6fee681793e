//! Single-node search over a tree. First match in pre-order wins.

use std::ops::ControlFlow;

use crate::node::Node;
use crate::traverse::walk;

/// Return the first node (in pre-order) satisfying `predicate`.
pub fn find_first<'a, P>(nodes: &'a [Node], mut predicate: P) -> Option<&'a Node>
where
    P: FnMut(&Node) -> bool,
{
    walk(nodes, |node, _| {
        if predicate(node) {
            ControlFlow::Break(node)
        } else {
            ControlFlow::Continue(())
        }
    })
}

/// Return the first element whose `key` attribute equals `value` exactly.
pub fn find_by_attribute<'a>(nodes: &'a [Node], key: &str, value: &str) -> Option<&'a Node> {
    find_first(nodes, |node| {
        node.as_element()
            .is_some_and(|el| el.attr(key) == Some(value))
    })
}

/// Return the first element carrying `class` among its class tokens.
pub fn find_by_class<'a>(nodes: &'a [Node], class: &str) -> Option<&'a Node> {
    find_first(nodes, |node| {
        node.as_element().is_some_and(|el| el.has_class(class))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Element;

    fn page() -> Vec<Node> {
        vec![
            Element::new("div")
                .with_attr("id", "header")
                .with_children(vec![Node::text("nav")])
                .into(),
            Element::new("div")
                .with_attr("class", "mw-content-ltr mw-parser-output")
                .with_children(vec![
                    Element::new("p")
                        .with_attr("class", "first")
                        .with_children(vec![Node::text("one")])
                        .into(),
                    Element::new("p")
                        .with_attr("class", "first")
                        .with_children(vec![Node::text("two")])
                        .into(),
                ])
                .into(),
        ]
    }

    #[test]
    fn first_match_wins() {
        let nodes = page();
        let found = find_by_attribute(&nodes, "class", "first").expect("found");
        assert_eq!(found.text_content(), "one");
    }

    #[test]
    fn attribute_match_is_exact() {
        let nodes = page();
        assert!(find_by_attribute(&nodes, "class", "mw-parser-output").is_none());
        let found = find_by_class(&nodes, "mw-parser-output").expect("found");
        assert_eq!(found.children().len(), 2);
    }

    #[test]
    fn predicate_sees_text_nodes() {
        let nodes = page();
        let found = find_first(&nodes, |n| n.as_text() == Some("two"));
        assert_eq!(found, Some(&Node::text("two")));
    }

    #[test]
    fn no_match_is_none() {
        let nodes = page();
        assert!(find_by_attribute(&nodes, "id", "toc").is_none());
        assert!(find_first(&[], |_| true).is_none());
    }
}
