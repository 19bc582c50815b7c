//! CSS selector engine.
//!
//! A selector string compiles into one [`Evaluator`] tree per comma group.
//! Evaluators are matched against any DOM through the [`ElementAdapter`]
//! seam; [`collect`] walks a subtree and gathers matches in document order
//! without duplicates. [`DocumentAdapter`] plugs in `html::Document`.
//!
//! Supported syntax:
//! - `*`, `tag`, `ns|tag`, `#id`, `.class`
//! - `[attr]`, `[^prefix]`, `[attr=v]`, `[attr!=v]`, `[attr^=v]`,
//!   `[attr$=v]`, `[attr*=v]`, `[attr~=regex]`
//! - combinators: descendant, `>`, `+`, `~`, and groups with `,`
//! - `:first-child`, `:last-child`, `:only-child`, `:first-of-type`,
//!   `:last-of-type`, `:only-of-type`, `:nth-child(an+b)`,
//!   `:nth-last-child`, `:nth-of-type`, `:nth-last-of-type`, `:empty`,
//!   `:root`, `:scope`, `:lt(n)`, `:gt(n)`, `:eq(n)`, `:contains(text)`,
//!   `:containsOwn(text)`, `:matches(regex)`, `:matchesOwn(regex)`,
//!   `:not(compound, ...)`

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

mod collector;
mod html_adapter;
mod matcher;
mod nth;
mod parser;
mod selector;

use core::fmt;
use core::hash::Hash;

use regex::Regex;

pub use collector::{Descendants, collect, collect_first};
pub use html_adapter::{DocumentAdapter, DocumentSelect};
pub use nth::AnPlusB;
pub use parser::{SelectorError, SelectorErrorKind, parse_selector_list};
pub use selector::Selector;

/// An adapter that abstracts DOM access for selector matching.
/// Implement this for your DOM layer.
pub trait ElementAdapter {
    type Handle: Copy + Eq + Hash;

    /// Parent element if any. A parent that is not an element (the
    /// document node) counts as no parent.
    fn parent(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Parent node of any kind, so a document node used as the query
    /// scope is still reachable.
    fn parent_node(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// First child element of any node, including the document node.
    fn first_element_child(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// Previous sibling element (skip non-elements if your DOM has mixed nodes).
    fn previous_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    fn next_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Tag name as stored; callers compare ASCII case-insensitively.
    fn tag_name(&self, element: Self::Handle) -> &str;

    /// Returns Some(id) if the element has an id attribute, else None.
    fn element_id(&self, element: Self::Handle) -> Option<&str>;

    /// True if the element has the given class token (ASCII case-insensitive).
    fn has_class(&self, element: Self::Handle, class: &str) -> bool;

    /// Returns the attribute value if present. Keys are case-insensitive.
    fn attr(&self, element: Self::Handle, name: &str) -> Option<&str>;

    /// True if some attribute key starts with `prefix`.
    fn has_attr_with_prefix(&self, element: Self::Handle, prefix: &str) -> bool;

    /// Normalized text of the element's direct text children.
    fn own_text(&self, element: Self::Handle) -> String;

    /// Normalized text of the whole subtree.
    fn text(&self, element: Self::Handle) -> String;

    /// No element or text children.
    fn is_empty(&self, element: Self::Handle) -> bool;
}

/// Value comparison of an `[attr op value]` selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeOperator {
    /// `=`
    Equals,
    /// `!=`, also true when the attribute is missing
    NotEquals,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`
    Contains,
}

impl AttributeOperator {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::Prefix => "^=",
            Self::Suffix => "$=",
            Self::Contains => "*=",
        }
    }
}

/// Compiled matching predicate.
///
/// Leaf variants test one property of the candidate. `And`, `Or` and `Not`
/// compose; the relation variants (`Parent`, `ImmediateParent`,
/// `PreviousSibling`, `ImmediatePreviousSibling`) hold the left-hand side of
/// a combinator and test it against a related element.
#[derive(Clone, Debug)]
pub enum Evaluator {
    AllElements,
    /// Tag name, lowercase.
    Tag(String),
    /// Case-sensitive id.
    Id(String),
    Class(String),
    /// Attribute present.
    Attribute(String),
    /// Some attribute key starts with the prefix.
    AttributeStarting(String),
    /// `value` is stored trimmed and lowercase.
    AttributeValue {
        key: String,
        op: AttributeOperator,
        value: String,
    },
    AttributeMatching {
        key: String,
        pattern: Regex,
    },
    /// 0-based element sibling index below `n`.
    IndexLessThan(usize),
    IndexGreaterThan(usize),
    IndexEquals(usize),
    /// 1-based position among element siblings (of the same tag when
    /// `of_type`), counted from the end when `from_end`.
    Nth {
        formula: AnPlusB,
        from_end: bool,
        of_type: bool,
    },
    FirstChild,
    LastChild,
    OnlyChild,
    OnlyOfType,
    Empty,
    /// Top element of its tree.
    Root,
    /// The query's scope root itself.
    ScopeRoot,
    /// Lowercase search text.
    ContainsText(String),
    ContainsOwnText(String),
    MatchesText(Regex),
    MatchesOwnText(Regex),
    And(Vec<Evaluator>),
    Or(Vec<Evaluator>),
    Not(Box<Evaluator>),
    /// Some ancestor element, up to and including the scope root, matches.
    Parent(Box<Evaluator>),
    ImmediateParent(Box<Evaluator>),
    /// Some preceding element sibling matches.
    PreviousSibling(Box<Evaluator>),
    ImmediatePreviousSibling(Box<Evaluator>),
}

impl Evaluator {
    const fn is_relation(&self) -> bool {
        matches!(
            self,
            Self::Parent(_)
                | Self::ImmediateParent(_)
                | Self::PreviousSibling(_)
                | Self::ImmediatePreviousSibling(_)
        )
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[Evaluator], separator: &str) -> fmt::Result {
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{part}")?;
    }
    Ok(())
}

/// Identifier with every character outside `[A-Za-z0-9_-]` and non-ASCII escaped.
fn write_ident(f: &mut fmt::Formatter<'_>, ident: &str) -> fmt::Result {
    for ch in ident.chars() {
        if !(ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') || !ch.is_ascii()) {
            f.write_str("\\")?;
        }
        write!(f, "{ch}")?;
    }
    Ok(())
}

/// Double-quoted string with `"` and `\` escaped.
fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in text.chars() {
        if matches!(ch, '"' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{ch}")?;
    }
    f.write_str("\"")
}

impl fmt::Display for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllElements => f.write_str("*"),
            Self::Tag(name) => match name.split_once(':') {
                Some((namespace, local)) => {
                    write_ident(f, namespace)?;
                    f.write_str("|")?;
                    write_ident(f, local)
                }
                None => write_ident(f, name),
            },
            Self::Id(id) => {
                f.write_str("#")?;
                write_ident(f, id)
            }
            Self::Class(class) => {
                f.write_str(".")?;
                write_ident(f, class)
            }
            Self::Attribute(key) => write!(f, "[{key}]"),
            Self::AttributeStarting(prefix) => write!(f, "[^{prefix}]"),
            Self::AttributeValue { key, op, value } => {
                write!(f, "[{key}{}", op.symbol())?;
                write_quoted(f, value)?;
                f.write_str("]")
            }
            Self::AttributeMatching { key, pattern } => write!(f, "[{key}~={pattern}]"),
            Self::IndexLessThan(index) => write!(f, ":lt({index})"),
            Self::IndexGreaterThan(index) => write!(f, ":gt({index})"),
            Self::IndexEquals(index) => write!(f, ":eq({index})"),
            Self::Nth {
                formula,
                from_end,
                of_type,
            } => {
                let last = if *from_end { "last-" } else { "" };
                let kind = if *of_type { "of-type" } else { "child" };
                write!(f, ":nth-{last}{kind}({formula})")
            }
            Self::FirstChild => f.write_str(":first-child"),
            Self::LastChild => f.write_str(":last-child"),
            Self::OnlyChild => f.write_str(":only-child"),
            Self::OnlyOfType => f.write_str(":only-of-type"),
            Self::Empty => f.write_str(":empty"),
            Self::Root => f.write_str(":root"),
            Self::ScopeRoot => f.write_str(":scope"),
            Self::ContainsText(text) => {
                f.write_str(":contains(")?;
                write_quoted(f, text)?;
                f.write_str(")")
            }
            Self::ContainsOwnText(text) => {
                f.write_str(":containsOwn(")?;
                write_quoted(f, text)?;
                f.write_str(")")
            }
            Self::MatchesText(pattern) => write!(f, ":matches({pattern})"),
            Self::MatchesOwnText(pattern) => write!(f, ":matchesOwn({pattern})"),
            Self::And(parts) => {
                // Combinator left-hand sides print first: `div > p.note`
                for part in parts.iter().filter(|part| part.is_relation()) {
                    write!(f, "{part}")?;
                }
                for part in parts.iter().filter(|part| !part.is_relation()) {
                    write!(f, "{part}")?;
                }
                Ok(())
            }
            Self::Or(parts) => write_joined(f, parts, ", "),
            Self::Not(inner) => write!(f, ":not({inner})"),
            Self::Parent(inner) => write!(f, "{inner} "),
            Self::ImmediateParent(inner) => write!(f, "{inner} > "),
            Self::PreviousSibling(inner) => write!(f, "{inner} ~ "),
            Self::ImmediatePreviousSibling(inner) => write!(f, "{inner} + "),
        }
    }
}
