//! Locate a table by the sub-heading that precedes it and turn its rows into
//! label → cell mappings.

use ballot_dom::{Element, Node, Visit, find_first, traverse_mut};
use ballot_shared::{BallotError, Result};
use tracing::debug;

/// Tags that count as a section sub-heading. `h1` is the page title.
const HEADING_TAGS: [&str; 5] = ["h2", "h3", "h4", "h5", "h6"];

/// Wrapper class current article markup puts around each heading.
const HEADING_WRAPPER_CLASS: &str = "mw-heading";

/// Class of the "[edit]" link rendered next to each heading.
const EDIT_SECTION_CLASS: &str = "mw-editsection";

/// Containers whose `tr` children are part of the table body.
const ROW_GROUP_TAGS: [&str; 3] = ["thead", "tbody", "tfoot"];

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// One table row keyed by header label.
///
/// Labels keep header column order. A label whose column the row does not
/// reach maps to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowMapping {
    cells: Vec<(String, Option<Node>)>,
}

impl RowMapping {
    /// Zip `cells` positionally against `labels`.
    ///
    /// Extra cells are dropped. When a label repeats, the later column wins
    /// but keeps the position of the first occurrence.
    pub fn zip(labels: &[String], cells: Vec<Node>) -> Self {
        let mut mapping: Vec<(String, Option<Node>)> = Vec::with_capacity(labels.len());
        let mut cells = cells.into_iter();

        for label in labels {
            let cell = cells.next();
            match mapping.iter_mut().find(|(existing, _)| existing == label) {
                Some(slot) => slot.1 = cell,
                None => mapping.push((label.clone(), cell)),
            }
        }

        Self { cells: mapping }
    }

    /// Cell under `label`, if the header has that label and the row reaches it.
    pub fn get(&self, label: &str) -> Option<&Node> {
        self.cells
            .iter()
            .find(|(l, _)| l == label)
            .and_then(|(_, cell)| cell.as_ref())
    }

    /// Header labels in column order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(label, _)| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Headings
// ---------------------------------------------------------------------------

/// Flattened text of `node` if it is a section sub-heading.
///
/// Accepts a bare `h2`–`h6` or a `div.mw-heading` wrapping one. The "[edit]"
/// link text is not part of the heading.
pub fn heading_text(node: &Node) -> Option<String> {
    let el = node.as_element()?;
    let heading = if is_heading_tag(el) {
        node
    } else if el.has_class(HEADING_WRAPPER_CLASS) {
        find_first(&el.children, |n| n.as_element().is_some_and(is_heading_tag))?
    } else {
        return None;
    };

    let mut nodes = vec![heading.clone()];
    let mut text = String::new();
    traverse_mut(&mut nodes, |node, _| match node {
        Node::Element(el) if el.has_class(EDIT_SECTION_CLASS) => Visit::Remove,
        Node::Text(t) => {
            text.push_str(t);
            Visit::Continue
        }
        Node::Element(_) => Visit::Continue,
    });

    Some(text.trim().to_string())
}

/// Whether `node` starts a new section.
pub fn is_heading(node: &Node) -> bool {
    heading_text(node).is_some()
}

fn is_heading_tag(el: &Element) -> bool {
    HEADING_TAGS.contains(&el.tag.as_str())
}

// ---------------------------------------------------------------------------
// Table extraction
// ---------------------------------------------------------------------------

/// Rows of the first table following the sub-heading titled `heading`.
///
/// `content` is the flat list of block-level children of the content region.
/// The header row supplies the labels; every later row becomes a
/// [`RowMapping`].
pub fn extract_table(content: &[Node], heading: &str) -> Result<Vec<RowMapping>> {
    let start = content
        .iter()
        .position(|node| heading_text(node).as_deref() == Some(heading))
        .ok_or_else(|| BallotError::SectionNotFound {
            heading: heading.to_string(),
        })?;

    let table = find_first(&content[start..], |node| node.is_tag("table"))
        .and_then(Node::as_element)
        .ok_or_else(|| BallotError::TableNotFound {
            heading: heading.to_string(),
        })?;

    let rows = table_rows(table);
    let (header, body) = rows.split_first().ok_or_else(|| BallotError::MalformedHeader {
        heading: heading.to_string(),
        message: "table has no rows".into(),
    })?;

    let labels = header_labels(header).map_err(|message| BallotError::MalformedHeader {
        heading: heading.to_string(),
        message,
    })?;

    let mappings: Vec<RowMapping> = body
        .iter()
        .map(|row| RowMapping::zip(&labels, cells(row).cloned().collect()))
        .collect();

    debug!(heading, ?labels, rows = mappings.len(), "extracted table");
    Ok(mappings)
}

/// `tr` elements of `table` in document order, looking through row groups.
fn table_rows(table: &Element) -> Vec<&Element> {
    let mut rows = Vec::new();
    for child in &table.children {
        let Some(el) = child.as_element() else {
            continue;
        };
        if el.tag == "tr" {
            rows.push(el);
        } else if ROW_GROUP_TAGS.contains(&el.tag.as_str()) {
            rows.extend(
                el.children
                    .iter()
                    .filter_map(Node::as_element)
                    .filter(|row| row.tag == "tr"),
            );
        }
    }
    rows
}

fn cells(row: &Element) -> impl Iterator<Item = &Node> {
    row.children
        .iter()
        .filter(|node| node.is_tag("td") || node.is_tag("th"))
}

/// One label per header cell: the trimmed text of the cell's first child.
fn header_labels(header: &Element) -> std::result::Result<Vec<String>, String> {
    let labels: Vec<String> = cells(header)
        .enumerate()
        .map(|(column, cell)| {
            cell.children()
                .first()
                .map(|first| first.text_content().trim().to_string())
                .ok_or_else(|| format!("header cell {column} is empty"))
        })
        .collect::<std::result::Result<_, _>>()?;

    if labels.is_empty() {
        return Err("header row has no cells".into());
    }
    Ok(labels)
}
