//! Owned document tree, traversal engine, and markup conversion.
//!
//! This crate provides:
//! - [`Node`] / [`Element`]: a plain owned tree that can be cloned per task
//! - [`traverse_mut`] / [`walk`]: pre-order visitors (mutating and read-only)
//! - [`find_first`], [`find_by_attribute`], [`find_by_class`]: single-node search
//! - [`parse_document`], [`parse_fragment`]: markup → tree via `scraper`
//! - [`to_html`]: tree → markup

mod locate;
mod node;
mod parse;
mod serialize;
mod traverse;

pub use locate::{find_by_attribute, find_by_class, find_first};
pub use node::{Attributes, Element, Node};
pub use parse::{parse_document, parse_fragment};
pub use serialize::to_html;
pub use traverse::{Traversal, Visit, VisitContext, traverse_mut, walk};
