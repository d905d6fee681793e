use std::collections::BTreeMap;
use std::ops::ControlFlow;

use crate::traverse::walk;

/// Attribute map of an element. Sorted so serialization is stable.
pub type Attributes = BTreeMap<String, String>;

/// A node of the document tree: literal text or a tagged element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

/// A tagged element with attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Attributes,
    pub children: Vec<Node>,
}

impl Node {
    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Element(_) => None,
        }
    }

    /// Tag name, or `None` for text.
    pub fn tag(&self) -> Option<&str> {
        self.as_element().map(|el| el.tag.as_str())
    }

    /// Whether this is an element with the given tag.
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag() == Some(tag)
    }

    /// Children of an element; text nodes have none.
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Element(el) => &el.children,
            Self::Text(_) => &[],
        }
    }

    /// All descendant text concatenated in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        let _ = walk(std::slice::from_ref(self), |node, _| {
            if let Node::Text(text) = node {
                out.push_str(text);
            }
            ControlFlow::<()>::Continue(())
        });
        out
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Builder-style children setter.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Whether the whitespace-separated `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    /// Text of the direct text children only, ignoring nested elements.
    pub fn own_text(&self) -> String {
        self.children.iter().filter_map(Node::as_text).collect()
    }
}
