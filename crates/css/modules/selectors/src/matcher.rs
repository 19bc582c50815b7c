//! Evaluator matching.
//!
//! `scope` is the root of the query. Relation evaluators never match the
//! scope root itself; `Parent` climbs no further than it. A relation whose
//! left side is the scope root itself follows raw parent links, so a
//! document node scope works for `> html`.

use crate::{AttributeOperator, ElementAdapter, Evaluator};

impl Evaluator {
    /// Whether `element` satisfies this evaluator within the query rooted at `scope`.
    pub fn matches<A: ElementAdapter>(
        &self,
        adapter: &A,
        element: A::Handle,
        scope: A::Handle,
    ) -> bool {
        match self {
            Self::AllElements => true,
            Self::Tag(name) => adapter.tag_name(element).eq_ignore_ascii_case(name),
            Self::Id(id) => adapter.element_id(element) == Some(id.as_str()),
            Self::Class(class) => adapter.has_class(element, class),
            Self::Attribute(key) => adapter.attr(element, key).is_some(),
            Self::AttributeStarting(prefix) => adapter.has_attr_with_prefix(element, prefix),
            Self::AttributeValue { key, op, value } => {
                matches_attribute_value(adapter.attr(element, key), *op, value)
            }
            Self::AttributeMatching { key, pattern } => adapter
                .attr(element, key)
                .is_some_and(|actual| pattern.is_match(actual)),
            Self::IndexLessThan(index) => element_index(adapter, element) < *index,
            Self::IndexGreaterThan(index) => element_index(adapter, element) > *index,
            Self::IndexEquals(index) => element_index(adapter, element) == *index,
            Self::Nth {
                formula,
                from_end,
                of_type,
            } => adapter.parent(element).is_some()
                && formula.matches(nth_position(adapter, element, *from_end, *of_type)),
            Self::FirstChild => {
                adapter.parent(element).is_some()
                    && adapter.previous_sibling_element(element).is_none()
            }
            Self::LastChild => {
                adapter.parent(element).is_some()
                    && adapter.next_sibling_element(element).is_none()
            }
            Self::OnlyChild => {
                adapter.parent(element).is_some()
                    && adapter.previous_sibling_element(element).is_none()
                    && adapter.next_sibling_element(element).is_none()
            }
            Self::OnlyOfType => {
                adapter.parent(element).is_some()
                    && nth_position(adapter, element, false, true) == 1
                    && nth_position(adapter, element, true, true) == 1
            }
            Self::Empty => adapter.is_empty(element),
            Self::Root => adapter.parent(element).is_none(),
            Self::ScopeRoot => element == scope,
            Self::ContainsText(search) => adapter.text(element).to_lowercase().contains(search),
            Self::ContainsOwnText(search) => {
                adapter.own_text(element).to_lowercase().contains(search)
            }
            Self::MatchesText(pattern) => pattern.is_match(&adapter.text(element)),
            Self::MatchesOwnText(pattern) => pattern.is_match(&adapter.own_text(element)),
            Self::And(parts) => parts
                .iter()
                .all(|part| part.matches(adapter, element, scope)),
            Self::Or(parts) => parts
                .iter()
                .any(|part| part.matches(adapter, element, scope)),
            Self::Not(inner) => !inner.matches(adapter, element, scope),
            Self::Parent(inner) => {
                if element == scope {
                    return false;
                }
                if matches!(**inner, Self::ScopeRoot) {
                    return has_ancestor(adapter, element, scope);
                }
                let mut current = adapter.parent(element);
                while let Some(ancestor) = current {
                    if inner.matches(adapter, ancestor, scope) {
                        return true;
                    }
                    if ancestor == scope {
                        break;
                    }
                    current = adapter.parent(ancestor);
                }
                false
            }
            Self::ImmediateParent(inner) if matches!(**inner, Self::ScopeRoot) => {
                element != scope && adapter.parent_node(element) == Some(scope)
            }
            Self::ImmediateParent(inner) => {
                element != scope
                    && adapter
                        .parent(element)
                        .is_some_and(|parent| inner.matches(adapter, parent, scope))
            }
            Self::PreviousSibling(inner) => {
                if element == scope {
                    return false;
                }
                let mut current = adapter.previous_sibling_element(element);
                while let Some(sibling) = current {
                    if inner.matches(adapter, sibling, scope) {
                        return true;
                    }
                    current = adapter.previous_sibling_element(sibling);
                }
                false
            }
            Self::ImmediatePreviousSibling(inner) => {
                element != scope
                    && adapter
                        .previous_sibling_element(element)
                        .is_some_and(|sibling| inner.matches(adapter, sibling, scope))
            }
        }
    }
}

fn matches_attribute_value(actual: Option<&str>, op: AttributeOperator, value: &str) -> bool {
    let Some(actual) = actual else {
        return op == AttributeOperator::NotEquals;
    };
    let actual = actual.to_lowercase();
    match op {
        AttributeOperator::Equals => actual.trim() == value,
        AttributeOperator::NotEquals => actual.trim() != value,
        AttributeOperator::Prefix => actual.starts_with(value),
        AttributeOperator::Suffix => actual.ends_with(value),
        AttributeOperator::Contains => actual.contains(value),
    }
}

/// Whether `scope` is a proper ancestor of `element`, following
/// non-element parents too.
fn has_ancestor<A: ElementAdapter>(adapter: &A, element: A::Handle, scope: A::Handle) -> bool {
    let mut current = adapter.parent_node(element);
    while let Some(node) = current {
        if node == scope {
            return true;
        }
        current = adapter.parent_node(node);
    }
    false
}

/// 0-based index among element siblings.
fn element_index<A: ElementAdapter>(adapter: &A, element: A::Handle) -> usize {
    let mut index = 0;
    let mut current = adapter.previous_sibling_element(element);
    while let Some(sibling) = current {
        index += 1;
        current = adapter.previous_sibling_element(sibling);
    }
    index
}

/// 1-based position among element siblings, optionally of the same tag.
fn nth_position<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    from_end: bool,
    of_type: bool,
) -> usize {
    let step = |node: A::Handle| {
        if from_end {
            adapter.next_sibling_element(node)
        } else {
            adapter.previous_sibling_element(node)
        }
    };
    let tag = adapter.tag_name(element);
    let mut position = 1;
    let mut current = step(element);
    while let Some(sibling) = current {
        if !of_type || adapter.tag_name(sibling).eq_ignore_ascii_case(tag) {
            position += 1;
        }
        current = step(sibling);
    }
    position
}
