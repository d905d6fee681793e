//! Pre-order, depth-first, left-to-right tree walks.
//!
//! Both walks keep an explicit stack of sibling cursors instead of recursing,
//! so deep documents cannot overflow the call stack. [`traverse_mut`] lets the
//! visitor restructure the tree by returning a [`Visit`] outcome; [`walk`] is
//! the read-only form used for searches over borrowed trees.

use std::ops::ControlFlow;

use crate::node::{Element, Node};

/// Where the visited node sits in the tree.
#[derive(Debug, Clone, Copy)]
pub struct VisitContext<'a> {
    /// Parent element, or `None` for the top-level nodes of the fragment.
    pub parent: Option<&'a Element>,
    /// Index of the node within its parent's children.
    pub index: usize,
    /// 0 for top-level nodes.
    pub depth: usize,
}

/// What the visitor wants done with the node it was just shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
    /// Keep the node and descend into its children.
    Continue,
    /// Halt the whole traversal.
    Stop,
    /// Put this node in place of the current one, then descend into the
    /// replacement's children.
    Replace(Node),
    /// Delete the node without visiting its children; the next sibling
    /// slides into the same index and is visited next.
    Remove,
}

/// How a [`traverse_mut`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    Completed,
    Stopped,
}

/// Visit every node of `nodes` in pre-order, applying the visitor's outcome.
pub fn traverse_mut<F>(nodes: &mut Vec<Node>, mut visit: F) -> Traversal
where
    F: FnMut(&Node, &VisitContext<'_>) -> Visit,
{
    // cursor[d] indexes the next sibling at depth d; cursor[..d] is the path
    // of child indices leading to those siblings' parent.
    let mut cursor: Vec<usize> = vec![0];

    while let Some(&index) = cursor.last() {
        let depth = cursor.len() - 1;

        let visited = {
            let (siblings, parent) = siblings_at(nodes, &cursor[..depth]);
            siblings.get(index).map(|node| {
                let ctx = VisitContext {
                    parent,
                    index,
                    depth,
                };
                (visit(node, &ctx), matches!(node, Node::Element(_)))
            })
        };

        let Some((outcome, is_element)) = visited else {
            // Siblings exhausted: climb back up and move past the parent.
            cursor.pop();
            if let Some(parent_index) = cursor.last_mut() {
                *parent_index += 1;
            }
            continue;
        };

        let descend = match outcome {
            Visit::Stop => return Traversal::Stopped,
            Visit::Continue => is_element,
            Visit::Remove => {
                siblings_mut(nodes, &cursor[..depth]).remove(index);
                continue;
            }
            Visit::Replace(replacement) => {
                let is_element = matches!(replacement, Node::Element(_));
                siblings_mut(nodes, &cursor[..depth])[index] = replacement;
                is_element
            }
        };

        if descend {
            cursor.push(0);
        } else {
            cursor[depth] += 1;
        }
    }

    Traversal::Completed
}

/// Visit every node of `nodes` in pre-order without mutation.
///
/// Returns the first `Break` value produced by the visitor, if any.
pub fn walk<'a, B, F>(nodes: &'a [Node], mut visit: F) -> Option<B>
where
    F: FnMut(&'a Node, &VisitContext<'a>) -> ControlFlow<B>,
{
    let mut stack: Vec<(&'a [Node], Option<&'a Element>, usize)> = vec![(nodes, None, 0)];

    while let Some(frame) = stack.last_mut() {
        let (siblings, parent, index) = *frame;
        let Some(node) = siblings.get(index) else {
            stack.pop();
            continue;
        };
        frame.2 += 1;

        let ctx = VisitContext {
            parent,
            index,
            depth: stack.len() - 1,
        };
        if let ControlFlow::Break(value) = visit(node, &ctx) {
            return Some(value);
        }

        if let Node::Element(el) = node {
            stack.push((&el.children, Some(el), 0));
        }
    }

    None
}

fn siblings_at<'a>(nodes: &'a [Node], path: &[usize]) -> (&'a [Node], Option<&'a Element>) {
    path.iter()
        .fold((nodes, None), |(siblings, _), &i| match &siblings[i] {
            Node::Element(el) => (el.children.as_slice(), Some(el)),
            Node::Text(_) => (&[] as &[Node], None),
        })
}

fn siblings_mut<'a>(nodes: &'a mut Vec<Node>, path: &[usize]) -> &'a mut Vec<Node> {
    path.iter().fold(nodes, |siblings, &i| match &mut siblings[i] {
        Node::Element(el) => &mut el.children,
        Node::Text(_) => unreachable!("cursor path only descends through elements"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(tag: &str, children: Vec<Node>) -> Node {
        Element::new(tag).with_children(children).into()
    }

    fn label(node: &Node) -> String {
        match node {
            Node::Text(t) => format!("#{t}"),
            Node::Element(e) => e.tag.clone(),
        }
    }

    /// div[ p[ "a", b["b"] ], ul[ li["c"] ] ], "d"
    fn sample() -> Vec<Node> {
        vec![
            el(
                "div",
                vec![
                    el("p", vec![Node::text("a"), el("b", vec![Node::text("b")])]),
                    el("ul", vec![el("li", vec![Node::text("c")])]),
                ],
            ),
            Node::text("d"),
        ]
    }

    fn visit_order(nodes: &mut Vec<Node>) -> Vec<String> {
        let mut seen = Vec::new();
        traverse_mut(nodes, |node, _| {
            seen.push(label(node));
            Visit::Continue
        });
        seen
    }

    #[test]
    fn visits_in_pre_order() {
        let mut nodes = sample();
        assert_eq!(
            visit_order(&mut nodes),
            ["div", "p", "#a", "b", "#b", "ul", "li", "#c", "#d"]
        );
    }

    #[test]
    fn walk_matches_traverse_order() {
        let nodes = sample();
        let mut seen = Vec::new();
        let result: Option<()> = walk(&nodes, |node, _| {
            seen.push(label(node));
            ControlFlow::Continue(())
        });
        assert!(result.is_none());
        assert_eq!(seen, ["div", "p", "#a", "b", "#b", "ul", "li", "#c", "#d"]);
    }

    #[test]
    fn context_reports_parent_index_and_depth() {
        let nodes = sample();
        let mut contexts = Vec::new();
        let _: Option<()> = walk(&nodes, |node, ctx| {
            contexts.push((
                label(node),
                ctx.parent.map(|p| p.tag.clone()),
                ctx.index,
                ctx.depth,
            ));
            ControlFlow::Continue(())
        });
        assert_eq!(contexts[0], ("div".into(), None, 0, 0));
        assert_eq!(contexts[4], ("#b".into(), Some("b".into()), 0, 3));
        assert_eq!(contexts[5], ("ul".into(), Some("div".into()), 1, 1));
        assert_eq!(contexts[8], ("#d".into(), None, 1, 0));
    }

    #[test]
    fn remove_skips_children_and_continues_with_next_sibling() {
        let mut nodes = sample();
        let mut seen = Vec::new();
        traverse_mut(&mut nodes, |node, _| {
            seen.push(label(node));
            if node.is_tag("p") {
                Visit::Remove
            } else {
                Visit::Continue
            }
        });
        assert_eq!(seen, ["div", "p", "ul", "li", "#c", "#d"]);
        assert_eq!(visit_order(&mut nodes), ["div", "ul", "li", "#c", "#d"]);
    }

    #[test]
    fn remove_consecutive_siblings() {
        let mut nodes = vec![
            el("i", vec![]),
            el("i", vec![]),
            Node::text("keep"),
            el("i", vec![]),
        ];
        traverse_mut(&mut nodes, |node, _| {
            if node.is_tag("i") {
                Visit::Remove
            } else {
                Visit::Continue
            }
        });
        assert_eq!(nodes, vec![Node::text("keep")]);
    }

    #[test]
    fn replace_descends_into_replacement_children_once() {
        let mut nodes = sample();
        let mut seen = Vec::new();
        traverse_mut(&mut nodes, |node, ctx| {
            seen.push((label(node), ctx.parent.map(|p| p.tag.clone())));
            match node {
                Node::Element(e) if e.tag == "b" => {
                    Visit::Replace(el("span", e.children.clone()))
                }
                _ => Visit::Continue,
            }
        });
        let under_span: Vec<_> = seen
            .iter()
            .filter(|(_, parent)| parent.as_deref() == Some("span"))
            .collect();
        assert_eq!(under_span, [&("#b".to_string(), Some("span".to_string()))]);
        assert_eq!(
            visit_order(&mut nodes),
            ["div", "p", "#a", "span", "#b", "ul", "li", "#c", "#d"]
        );
    }

    #[test]
    fn replace_with_text_does_not_descend() {
        let mut nodes = sample();
        traverse_mut(&mut nodes, |node, _| {
            if node.is_tag("ul") {
                Visit::Replace(Node::text("list"))
            } else {
                Visit::Continue
            }
        });
        assert_eq!(
            visit_order(&mut nodes),
            ["div", "p", "#a", "b", "#b", "#list", "#d"]
        );
    }

    #[test]
    fn replace_with_identical_wrapper_twice_is_stable() {
        let wrap = |nodes: &mut Vec<Node>| {
            traverse_mut(nodes, |node, _| match node {
                Node::Element(e) if e.tag == "b" || e.tag == "span" => {
                    Visit::Replace(el("span", e.children.clone()))
                }
                _ => Visit::Continue,
            });
        };
        let mut once = sample();
        wrap(&mut once);
        let mut twice = once.clone();
        wrap(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn stop_halts_immediately() {
        let mut nodes = sample();
        let mut seen = Vec::new();
        let result = traverse_mut(&mut nodes, |node, _| {
            seen.push(label(node));
            if node.is_tag("b") {
                Visit::Stop
            } else {
                Visit::Continue
            }
        });
        assert_eq!(result, Traversal::Stopped);
        assert_eq!(seen, ["div", "p", "#a", "b"]);
    }

    #[test]
    fn empty_fragment_completes() {
        let mut nodes = Vec::new();
        assert_eq!(
            traverse_mut(&mut nodes, |_, _| Visit::Continue),
            Traversal::Completed
        );
    }
}
