//! Arena-backed document tree.
//!
//! Nodes live in an [`indextree::Arena`] and are addressed by [`NodeId`].
//! Parent links are non-owning handles; the child sequence of a node is the
//! only ownership edge. Sibling indices are derived from the child sequence,
//! so they are always consistent after insertion or removal.

pub mod attributes;
mod printing;
pub mod tag;
mod text;
pub mod updating;

use indextree::{Arena, NodeId};
use url::Url;

use attributes::Attributes;
use tag::{Tag, TagRegistry};

pub use text::normalize_whitespace;

/// Element payload: the shared tag plus the element's own attributes.
#[derive(Debug, Clone)]
pub struct ElementData {
    pub tag: Tag,
    pub attrs: Attributes,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
    DocumentType {
        name: String,
        public_id: String,
        system_id: String,
    },
}

#[derive(Debug, Clone)]
pub struct DOMNode {
    pub kind: NodeKind,
    /// Base URI set on this node; descendants inherit it.
    pub base_uri: Option<String>,
}

impl DOMNode {
    pub(crate) const fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            base_uri: None,
        }
    }

    pub const fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }

    pub const fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    /// Documents and elements may own children; everything else is a leaf.
    pub const fn can_have_children(&self) -> bool {
        matches!(self.kind, NodeKind::Document | NodeKind::Element(_))
    }
}

/// A parsed or hand-built document.
pub struct Document {
    pub(crate) arena: Arena<DOMNode>,
    pub(crate) root: NodeId,
    pub(crate) tags: TagRegistry,
}

impl Document {
    /// An empty document located at `base_uri`.
    pub fn new(base_uri: impl Into<String>) -> Self {
        let mut arena = Arena::new();
        let mut root = DOMNode::new(NodeKind::Document);
        root.base_uri = Some(base_uri.into());
        Self {
            root: arena.new_node(root),
            arena,
            tags: TagRegistry::new(),
        }
    }

    /// The Document node.
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, including the Document node.
    pub fn node_count(&self) -> usize {
        self.root.descendants(&self.arena).count()
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    /// Node data, or `None` for a handle whose node was removed.
    pub fn node(&self, node: NodeId) -> Option<&DOMNode> {
        self.arena
            .get(node)
            .filter(|entry| !entry.is_removed())
            .map(indextree::Node::get)
    }

    pub(crate) fn node_mut(&mut self, node: NodeId) -> Option<&mut DOMNode> {
        self.arena
            .get_mut(node)
            .filter(|entry| !entry.is_removed())
            .map(indextree::Node::get_mut)
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.node(node).map(|data| &data.kind)
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(DOMNode::is_element)
    }

    pub fn is_removed(&self, node: NodeId) -> bool {
        self.node(node).is_none()
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        match self.kind(node)? {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(node)?.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent()
    }

    /// Parent if it is an element (the Document node is not).
    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node).filter(|parent| self.is_element(*parent))
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.children(&self.arena)
    }

    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node).filter(|child| self.is_element(*child))
    }

    pub fn child_count(&self, node: NodeId) -> usize {
        self.children(node).count()
    }

    /// Position among all of the parent's child nodes (0 without a parent).
    pub fn sibling_index(&self, node: NodeId) -> usize {
        node.preceding_siblings(&self.arena).skip(1).count()
    }

    /// Position among the parent's element children only.
    pub fn element_sibling_index(&self, node: NodeId) -> usize {
        node.preceding_siblings(&self.arena)
            .skip(1)
            .filter(|sibling| self.is_element(*sibling))
            .count()
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.previous_sibling()
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.next_sibling()
    }

    pub fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        node.preceding_siblings(&self.arena)
            .skip(1)
            .find(|sibling| self.is_element(*sibling))
    }

    pub fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        node.following_siblings(&self.arena)
            .skip(1)
            .find(|sibling| self.is_element(*sibling))
    }

    pub fn first_element_child(&self, node: NodeId) -> Option<NodeId> {
        self.element_children(node).next()
    }

    pub fn last_element_child(&self, node: NodeId) -> Option<NodeId> {
        node.children(&self.arena)
            .rev()
            .find(|child| self.is_element(*child))
    }

    /// Proper ancestors, nearest first.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.ancestors(&self.arena).skip(1)
    }

    /// `node` and its descendants in document (pre-)order.
    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.descendants(&self.arena)
    }

    /// Whether `node` is `ancestor` or lies inside its subtree.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node.ancestors(&self.arena).any(|candidate| candidate == ancestor)
    }

    /// The top-level element (`<html>` for parsed documents).
    pub fn document_element(&self) -> Option<NodeId> {
        self.first_element_child(self.root)
    }

    fn child_element_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.element_children(parent)
            .find(|child| self.tag_name(*child).is_some_and(|tag| tag.eq_ignore_ascii_case(name)))
    }

    pub fn head(&self) -> Option<NodeId> {
        self.child_element_named(self.document_element()?, "head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.child_element_named(self.document_element()?, "body")
    }

    /// Normalized text of the first `<title>` element.
    pub fn title(&self) -> Option<String> {
        let title = self.descendants(self.root).find(|node| {
            self.tag_name(*node)
                .is_some_and(|tag| tag.eq_ignore_ascii_case("title"))
        })?;
        Some(normalize_whitespace(&self.whole_text(title)).trim().to_owned())
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .find(|node| self.id(*node) == Some(id))
    }

    pub fn tag(&self, node: NodeId) -> Option<Tag> {
        self.element(node).map(|data| data.tag)
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.tag(node).map(|tag| self.tags.name(tag))
    }

    pub fn attributes(&self, node: NodeId) -> Option<&Attributes> {
        self.element(node).map(|data| &data.attrs)
    }

    pub fn attr(&self, node: NodeId, key: &str) -> Option<&str> {
        self.attributes(node)?.get(key)
    }

    pub fn has_attr(&self, node: NodeId, key: &str) -> bool {
        self.attributes(node).is_some_and(|attrs| attrs.has(key))
    }

    pub fn id(&self, node: NodeId) -> Option<&str> {
        self.attr(node, "id")
    }

    /// Class tokens in attribute order.
    pub fn class_names(&self, node: NodeId) -> Vec<&str> {
        self.attr(node, "class")
            .map(|value| value.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    /// Class membership, ASCII case-insensitive.
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attr(node, "class").is_some_and(|value| {
            value
                .split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case(class))
        })
    }

    /// Effective base URI: the nearest ancestor-or-self that sets one.
    pub fn base_uri(&self, node: NodeId) -> Option<&str> {
        node.ancestors(&self.arena)
            .find_map(|ancestor| self.node(ancestor)?.base_uri.as_deref())
    }

    /// Resolve the URL in attribute `key` against the effective base URI.
    ///
    /// Returns `None` if the attribute is missing or cannot be resolved.
    pub fn abs_url(&self, node: NodeId, key: &str) -> Option<String> {
        let value = self.attr(node, key)?.trim();
        let resolved = match self.base_uri(node).and_then(|base| Url::parse(base).ok()) {
            Some(base) => base.join(value).ok()?,
            None => Url::parse(value).ok()?,
        };
        Some(resolved.to_string())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}
