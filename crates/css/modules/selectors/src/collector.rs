//! Subtree traversal and match collection.

use std::collections::HashSet;

use crate::{ElementAdapter, Evaluator};

/// Elements below `root` in document pre-order, `root` excluded.
///
/// Walks with first-child / next-sibling / parent links, so deep trees do
/// not recurse.
pub struct Descendants<'adapter, A: ElementAdapter> {
    adapter: &'adapter A,
    root: A::Handle,
    next: Option<A::Handle>,
}

impl<'adapter, A: ElementAdapter> Descendants<'adapter, A> {
    pub fn new(adapter: &'adapter A, root: A::Handle) -> Self {
        Self {
            adapter,
            root,
            next: adapter.first_element_child(root),
        }
    }

    fn advance(&self, node: A::Handle) -> Option<A::Handle> {
        if let Some(child) = self.adapter.first_element_child(node) {
            return Some(child);
        }
        let mut current = node;
        loop {
            if current == self.root {
                return None;
            }
            if let Some(sibling) = self.adapter.next_sibling_element(current) {
                return Some(sibling);
            }
            current = self.adapter.parent(current)?;
        }
    }
}

impl<A: ElementAdapter> Iterator for Descendants<'_, A> {
    type Item = A::Handle;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.advance(current);
        Some(current)
    }
}

/// Elements under each of `roots` matching any of `groups`.
///
/// Results follow root order, then document order; an element reachable
/// from several roots or matching several groups appears once.
pub fn collect<A: ElementAdapter>(
    adapter: &A,
    groups: &[Evaluator],
    roots: &[A::Handle],
) -> Vec<A::Handle> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    let mut visited = 0_usize;
    for &root in roots {
        for element in Descendants::new(adapter, root) {
            visited += 1;
            if groups
                .iter()
                .any(|group| group.matches(adapter, element, root))
                && seen.insert(element)
            {
                found.push(element);
            }
        }
    }
    log::trace!(
        "selector scan: {visited} candidates under {} root(s), {} matches",
        roots.len(),
        found.len()
    );
    found
}

/// First element under `root` in document order matching any of `groups`.
pub fn collect_first<A: ElementAdapter>(
    adapter: &A,
    groups: &[Evaluator],
    root: A::Handle,
) -> Option<A::Handle> {
    Descendants::new(adapter, root).find(|element| {
        groups
            .iter()
            .any(|group| group.matches(adapter, *element, root))
    })
}
