//! HTML document tree.
//!
//! [`Document`] owns an arena of typed nodes and exposes navigation,
//! text extraction and validated mutation. [`parser`] builds documents from
//! markup through html5ever.

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

pub mod dom;
pub mod parser;

pub use dom::attributes::{Attribute, Attributes};
pub use dom::tag::{Tag, TagRegistry};
pub use dom::updating::StructuralError;
pub use dom::{DOMNode, Document, ElementData, NodeKind, normalize_whitespace};
pub use indextree::NodeId;
pub use parser::{ParserConfig, parse_html, parse_html_with, parse_reader};
