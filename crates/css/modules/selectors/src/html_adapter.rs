//! Selector matching over `html::Document`.

use core::iter;

use html::{Document, NodeId, NodeKind};

use crate::{ElementAdapter, Selector, SelectorError};

/// [`ElementAdapter`] view of a document.
#[derive(Clone, Copy)]
pub struct DocumentAdapter<'doc> {
    doc: &'doc Document,
}

impl<'doc> DocumentAdapter<'doc> {
    pub const fn new(doc: &'doc Document) -> Self {
        Self { doc }
    }
}

impl ElementAdapter for DocumentAdapter<'_> {
    type Handle = NodeId;

    fn parent(&self, element: NodeId) -> Option<NodeId> {
        self.doc.parent_element(element)
    }

    fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.doc.parent(node)
    }

    fn first_element_child(&self, node: NodeId) -> Option<NodeId> {
        self.doc.first_element_child(node)
    }

    fn previous_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        self.doc.previous_element_sibling(element)
    }

    fn next_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        self.doc.next_element_sibling(element)
    }

    fn tag_name(&self, element: NodeId) -> &str {
        self.doc.tag_name(element).unwrap_or_default()
    }

    fn element_id(&self, element: NodeId) -> Option<&str> {
        self.doc.id(element)
    }

    fn has_class(&self, element: NodeId, class: &str) -> bool {
        self.doc.has_class(element, class)
    }

    fn attr(&self, element: NodeId, name: &str) -> Option<&str> {
        self.doc.attr(element, name)
    }

    fn has_attr_with_prefix(&self, element: NodeId, prefix: &str) -> bool {
        self.doc
            .attributes(element)
            .is_some_and(|attrs| attrs.has_key_with_prefix(prefix))
    }

    fn own_text(&self, element: NodeId) -> String {
        self.doc.own_text(element)
    }

    fn text(&self, element: NodeId) -> String {
        self.doc.text(element)
    }

    fn is_empty(&self, element: NodeId) -> bool {
        !self.doc.children(element).any(|child| {
            matches!(
                self.doc.kind(child),
                Some(NodeKind::Element(_) | NodeKind::Text { .. })
            )
        })
    }
}

/// Selector queries directly on a document.
pub trait DocumentSelect {
    /// Elements below `root` matching `query`, in document order.
    ///
    /// # Errors
    /// Returns a [`SelectorError`] if `query` does not parse.
    fn select(&self, root: NodeId, query: &str) -> Result<Vec<NodeId>, SelectorError>;

    /// First element below `root` matching `query`.
    ///
    /// # Errors
    /// Returns a [`SelectorError`] if `query` does not parse.
    fn select_first(&self, root: NodeId, query: &str) -> Result<Option<NodeId>, SelectorError>;

    /// Whether `element` matches `query`, scoped to the top of its tree.
    ///
    /// # Errors
    /// Returns a [`SelectorError`] if `query` does not parse.
    fn is(&self, element: NodeId, query: &str) -> Result<bool, SelectorError>;

    /// Nearest ancestor-or-self element matching `query`.
    ///
    /// # Errors
    /// Returns a [`SelectorError`] if `query` does not parse.
    fn closest(&self, element: NodeId, query: &str) -> Result<Option<NodeId>, SelectorError>;
}

/// Topmost ancestor-or-self: the Document node for attached nodes.
fn tree_root(doc: &Document, node: NodeId) -> NodeId {
    doc.ancestors(node).last().unwrap_or(node)
}

impl DocumentSelect for Document {
    fn select(&self, root: NodeId, query: &str) -> Result<Vec<NodeId>, SelectorError> {
        Ok(Selector::parse(query)?.select(&DocumentAdapter::new(self), root))
    }

    fn select_first(&self, root: NodeId, query: &str) -> Result<Option<NodeId>, SelectorError> {
        Ok(Selector::parse(query)?.select_first(&DocumentAdapter::new(self), root))
    }

    fn is(&self, element: NodeId, query: &str) -> Result<bool, SelectorError> {
        let selector = Selector::parse(query)?;
        Ok(self.is_element(element)
            && selector.matches(&DocumentAdapter::new(self), element, tree_root(self, element)))
    }

    fn closest(&self, element: NodeId, query: &str) -> Result<Option<NodeId>, SelectorError> {
        let selector = Selector::parse(query)?;
        let adapter = DocumentAdapter::new(self);
        let scope = tree_root(self, element);
        Ok(iter::once(element)
            .chain(self.ancestors(element))
            .filter(|node| self.is_element(*node))
            .find(|node| selector.matches(&adapter, *node, scope)))
    }
}
