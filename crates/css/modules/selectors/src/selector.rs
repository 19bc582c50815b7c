//! Compiled, reusable selector.

use core::fmt;
use core::str::FromStr;

use crate::collector::{collect, collect_first};
use crate::{ElementAdapter, Evaluator, SelectorError, parse_selector_list};

/// A parsed selector: its source text and one evaluator per comma group.
///
/// Immutable once parsed; clone it or share it across threads freely.
#[derive(Clone, Debug)]
pub struct Selector {
    source: String,
    groups: Vec<Evaluator>,
}

impl Selector {
    /// Compile `source`.
    ///
    /// # Errors
    /// Returns a [`SelectorError`] if `source` is not a valid selector.
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        Ok(Self {
            source: source.to_owned(),
            groups: parse_selector_list(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn groups(&self) -> &[Evaluator] {
        &self.groups
    }

    /// Whether `element` matches any group, with `scope` as the query root.
    pub fn matches<A: ElementAdapter>(
        &self,
        adapter: &A,
        element: A::Handle,
        scope: A::Handle,
    ) -> bool {
        self.groups
            .iter()
            .any(|group| group.matches(adapter, element, scope))
    }

    /// Matching elements below `root` in document order.
    pub fn select<A: ElementAdapter>(&self, adapter: &A, root: A::Handle) -> Vec<A::Handle> {
        collect(adapter, &self.groups, &[root])
    }

    /// Matching elements below any of `roots`, without duplicates.
    pub fn select_all<A: ElementAdapter>(&self, adapter: &A, roots: &[A::Handle]) -> Vec<A::Handle> {
        collect(adapter, &self.groups, roots)
    }

    pub fn select_first<A: ElementAdapter>(
        &self,
        adapter: &A,
        root: A::Handle,
    ) -> Option<A::Handle> {
        collect_first(adapter, &self.groups, root)
    }

    /// The elements of `elements` that match, in their given order.
    pub fn filter<A: ElementAdapter>(
        &self,
        adapter: &A,
        elements: &[A::Handle],
        scope: A::Handle,
    ) -> Vec<A::Handle> {
        elements
            .iter()
            .copied()
            .filter(|element| self.matches(adapter, *element, scope))
            .collect()
    }

    /// The elements of `elements` that do not match.
    pub fn exclude<A: ElementAdapter>(
        &self,
        adapter: &A,
        elements: &[A::Handle],
        scope: A::Handle,
    ) -> Vec<A::Handle> {
        elements
            .iter()
            .copied()
            .filter(|element| !self.matches(adapter, *element, scope))
            .collect()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::parse(source)
    }
}
