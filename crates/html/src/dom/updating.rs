//! Tree construction and mutation.
//!
//! Every mutating operation validates its arguments before touching the
//! arena, so an `Err` always leaves the tree exactly as it was.

use core::fmt;
use std::error::Error;

use indextree::{NodeError, NodeId};

use super::attributes::{Attribute, Attributes};
use super::{DOMNode, Document, ElementData, NodeKind};

/// Rejected tree mutation.
#[derive(Debug)]
pub enum StructuralError {
    /// The handle refers to a removed node.
    InvalidNode(NodeId),
    /// The target cannot own children (text, comment, doctype).
    NotAContainer(NodeId),
    /// The operation needs an element.
    NotAnElement(NodeId),
    /// `child` is `parent` or one of its ancestors.
    Cycle { parent: NodeId, child: NodeId },
    /// Document nodes cannot be moved or removed.
    DocumentNode(NodeId),
    /// The operation needs a node that has a parent.
    NoParent(NodeId),
    IndexOutOfBounds { index: usize, len: usize },
    /// The arena refused the operation.
    Arena(NodeError),
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNode(node) => write!(f, "node {node:?} has been removed"),
            Self::NotAContainer(node) => write!(f, "node {node:?} cannot have children"),
            Self::NotAnElement(node) => write!(f, "node {node:?} is not an element"),
            Self::Cycle { parent, child } => write!(
                f,
                "cannot insert {child:?} under {parent:?}: it would become its own descendant"
            ),
            Self::DocumentNode(node) => write!(f, "document node {node:?} cannot be moved"),
            Self::NoParent(node) => write!(f, "node {node:?} has no parent"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "child index {index} out of bounds for {len} children")
            }
            Self::Arena(err) => write!(f, "arena error: {err}"),
        }
    }
}

impl Error for StructuralError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NodeError> for StructuralError {
    fn from(err: NodeError) -> Self {
        Self::Arena(err)
    }
}

impl Document {
    /// A detached element; attach it with one of the insertion methods.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create_element_with(name, Attributes::new())
    }

    pub fn create_element_with(&mut self, name: &str, attrs: Attributes) -> NodeId {
        let tag = self.tags.intern(name);
        self.arena
            .new_node(DOMNode::new(NodeKind::Element(ElementData { tag, attrs })))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.arena
            .new_node(DOMNode::new(NodeKind::Text { text: text.into() }))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.arena
            .new_node(DOMNode::new(NodeKind::Comment { text: text.into() }))
    }

    pub fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        self.arena.new_node(DOMNode::new(NodeKind::DocumentType {
            name: name.to_owned(),
            public_id: public_id.to_owned(),
            system_id: system_id.to_owned(),
        }))
    }

    /// Copy `node` and its subtree into a new detached subtree.
    ///
    /// The copy keeps the effective base URI of the original.
    pub fn deep_clone(&mut self, node: NodeId) -> Result<NodeId, StructuralError> {
        let mut data = self.live(node)?.clone();
        if data.base_uri.is_none() {
            data.base_uri = self.base_uri(node).map(str::to_owned);
        }
        let copy = self.arena.new_node(data);
        let mut pending = vec![(node, copy)];
        while let Some((source, target)) = pending.pop() {
            let children: Vec<NodeId> = self.children(source).collect();
            for child in children {
                let child_data = self.live(child)?.clone();
                let child_copy = self.arena.new_node(child_data);
                target.checked_append(child_copy, &mut self.arena)?;
                pending.push((child, child_copy));
            }
        }
        Ok(copy)
    }

    fn live(&self, node: NodeId) -> Result<&DOMNode, StructuralError> {
        self.node(node).ok_or(StructuralError::InvalidNode(node))
    }

    fn check_container(&self, parent: NodeId) -> Result<(), StructuralError> {
        if self.live(parent)?.can_have_children() {
            Ok(())
        } else {
            Err(StructuralError::NotAContainer(parent))
        }
    }

    fn check_movable(&self, node: NodeId) -> Result<(), StructuralError> {
        if matches!(self.live(node)?.kind, NodeKind::Document) {
            return Err(StructuralError::DocumentNode(node));
        }
        Ok(())
    }

    fn check_element(&self, node: NodeId) -> Result<(), StructuralError> {
        if self.live(node)?.is_element() {
            Ok(())
        } else {
            Err(StructuralError::NotAnElement(node))
        }
    }

    /// `child` may go under `parent` only if it is not `parent` or an ancestor of it.
    fn check_acyclic(&self, parent: NodeId, child: NodeId) -> Result<(), StructuralError> {
        if self.contains(child, parent) {
            return Err(StructuralError::Cycle { parent, child });
        }
        Ok(())
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), StructuralError> {
        self.check_container(parent)?;
        self.check_movable(child)?;
        self.check_acyclic(parent, child)
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), StructuralError> {
        self.check_insertable(parent, child)?;
        parent.checked_append(child, &mut self.arena)?;
        Ok(())
    }

    /// Move `child` to the front of `parent`'s children.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), StructuralError> {
        self.check_insertable(parent, child)?;
        parent.checked_prepend(child, &mut self.arena)?;
        Ok(())
    }

    /// Move `child` so that it ends up at `index` among `parent`'s children.
    ///
    /// `index` counts the children other than `child` itself, so
    /// `index == child_count` appends.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), StructuralError> {
        self.check_insertable(parent, child)?;
        let siblings: Vec<NodeId> = self
            .children(parent)
            .filter(|sibling| *sibling != child)
            .collect();
        if index > siblings.len() {
            return Err(StructuralError::IndexOutOfBounds {
                index,
                len: siblings.len(),
            });
        }
        match siblings.get(index) {
            Some(reference) => reference.checked_insert_before(child, &mut self.arena)?,
            None => parent.checked_append(child, &mut self.arena)?,
        }
        Ok(())
    }

    /// Move `node` directly before `reference`.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) -> Result<(), StructuralError> {
        let parent = self.sibling_parent(reference, node)?;
        if reference != node {
            self.check_acyclic(parent, node)?;
            reference.checked_insert_before(node, &mut self.arena)?;
        }
        Ok(())
    }

    /// Move `node` directly after `reference`.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), StructuralError> {
        let parent = self.sibling_parent(reference, node)?;
        if reference != node {
            self.check_acyclic(parent, node)?;
            reference.checked_insert_after(node, &mut self.arena)?;
        }
        Ok(())
    }

    fn sibling_parent(&self, reference: NodeId, node: NodeId) -> Result<NodeId, StructuralError> {
        self.live(reference)?;
        self.check_movable(node)?;
        self.parent(reference)
            .ok_or(StructuralError::NoParent(reference))
    }

    /// Unlink `node` from its parent. The subtree stays valid and can be
    /// inserted again.
    pub fn detach(&mut self, node: NodeId) -> Result<(), StructuralError> {
        self.check_movable(node)?;
        node.detach(&mut self.arena);
        Ok(())
    }

    /// Release `node` and its subtree. Handles into it become invalid.
    pub fn remove(&mut self, node: NodeId) -> Result<(), StructuralError> {
        self.check_movable(node)?;
        node.remove_subtree(&mut self.arena);
        log::trace!("removed subtree rooted at {node:?}");
        Ok(())
    }

    /// Put `new` where `old` is; `old` ends up detached.
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) -> Result<(), StructuralError> {
        self.check_movable(old)?;
        let parent = self.sibling_parent(old, new)?;
        if old == new {
            return Ok(());
        }
        self.check_acyclic(parent, new)?;
        old.checked_insert_before(new, &mut self.arena)?;
        old.detach(&mut self.arena);
        Ok(())
    }

    /// Put `wrapper` where `node` is and move `node` into the deepest first
    /// element descendant of `wrapper`.
    pub fn wrap(&mut self, node: NodeId, wrapper: NodeId) -> Result<(), StructuralError> {
        let parent = self.sibling_parent(node, wrapper)?;
        self.check_element(wrapper)?;
        self.check_acyclic(parent, wrapper)?;
        if self.contains(node, wrapper) {
            return Err(StructuralError::Cycle {
                parent: wrapper,
                child: node,
            });
        }
        let mut target = wrapper;
        while let Some(child) = self.first_element_child(target) {
            target = child;
        }
        node.checked_insert_before(wrapper, &mut self.arena)?;
        target.checked_append(node, &mut self.arena)?;
        Ok(())
    }

    /// Replace `node` by its children. Returns the first moved child.
    pub fn unwrap(&mut self, node: NodeId) -> Result<Option<NodeId>, StructuralError> {
        self.check_movable(node)?;
        self.parent(node).ok_or(StructuralError::NoParent(node))?;
        let first = self.children(node).next();
        node.remove(&mut self.arena);
        Ok(first)
    }

    /// Remove every child of `node`.
    pub fn empty(&mut self, node: NodeId) -> Result<(), StructuralError> {
        self.check_container(node)?;
        let children: Vec<NodeId> = self.children(node).collect();
        for child in children {
            child.remove_subtree(&mut self.arena);
        }
        Ok(())
    }

    /// Replace the children of `node` with a single text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), StructuralError> {
        self.empty(node)?;
        let text_node = self.create_text(text);
        node.checked_append(text_node, &mut self.arena)?;
        Ok(())
    }

    fn attrs_mut(&mut self, node: NodeId) -> Result<&mut Attributes, StructuralError> {
        self.element_mut(node)
            .map(|data| &mut data.attrs)
            .ok_or(StructuralError::NotAnElement(node))
    }

    pub fn set_attr(&mut self, node: NodeId, key: &str, value: &str) -> Result<(), StructuralError> {
        self.attrs_mut(node)?.set(key, value);
        Ok(())
    }

    pub fn set_boolean_attr(&mut self, node: NodeId, key: &str) -> Result<(), StructuralError> {
        self.attrs_mut(node)?.set_boolean(key);
        Ok(())
    }

    pub fn remove_attr(
        &mut self,
        node: NodeId,
        key: &str,
    ) -> Result<Option<Attribute>, StructuralError> {
        Ok(self.attrs_mut(node)?.remove(key))
    }

    pub fn set_id(&mut self, node: NodeId, id: &str) -> Result<(), StructuralError> {
        self.set_attr(node, "id", id)
    }

    /// Rewrite the `class` attribute from `classes`; no classes drops it.
    fn write_classes(&mut self, node: NodeId, classes: &[String]) -> Result<(), StructuralError> {
        let attrs = self.attrs_mut(node)?;
        if classes.is_empty() {
            attrs.remove("class");
        } else {
            attrs.set("class", classes.join(" "));
        }
        Ok(())
    }

    fn owned_classes(&self, node: NodeId) -> Vec<String> {
        self.class_names(node)
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), StructuralError> {
        self.check_element(node)?;
        if self.has_class(node, class) {
            return Ok(());
        }
        let mut classes = self.owned_classes(node);
        classes.push(class.to_owned());
        self.write_classes(node, &classes)
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), StructuralError> {
        self.check_element(node)?;
        let mut classes = self.owned_classes(node);
        classes.retain(|existing| !existing.eq_ignore_ascii_case(class));
        self.write_classes(node, &classes)
    }

    /// Add `class` if missing, remove it otherwise. Returns whether it is now present.
    pub fn toggle_class(&mut self, node: NodeId, class: &str) -> Result<bool, StructuralError> {
        if self.has_class(node, class) {
            self.remove_class(node, class)?;
            Ok(false)
        } else {
            self.add_class(node, class)?;
            Ok(true)
        }
    }

    pub fn set_base_uri(&mut self, node: NodeId, base_uri: &str) -> Result<(), StructuralError> {
        let data = self
            .node_mut(node)
            .ok_or(StructuralError::InvalidNode(node))?;
        data.base_uri = Some(base_uri.to_owned());
        Ok(())
    }
}
