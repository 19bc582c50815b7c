//! html5ever `TreeSink` that materializes straight into a [`Document`] arena.

use core::cell::RefCell;
use std::borrow::Cow;
use std::rc::Rc;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as HtmlAttribute, ExpandedName, LocalName, Namespace, QualName};
use indextree::NodeId;

use crate::dom::attributes::{Attribute, Attributes};
use crate::dom::{Document, NodeKind};

/// Handle html5ever passes around. Elements keep their qualified name here
/// so `elem_name` can hand out a borrow without touching the document.
#[derive(Clone)]
pub struct SinkHandle {
    id: NodeId,
    name: Rc<QualName>,
}

/// Tree sink building a [`Document`].
pub struct DocumentSink {
    document: RefCell<Document>,
    document_handle: SinkHandle,
    /// Shared name for handles that are not elements.
    unnamed: Rc<QualName>,
}

impl DocumentSink {
    pub fn new(document: Document) -> Self {
        let unnamed = Rc::new(QualName::new(None, Namespace::from(""), LocalName::from("")));
        let document_handle = SinkHandle {
            id: document.root(),
            name: Rc::clone(&unnamed),
        };
        Self {
            document: RefCell::new(document),
            document_handle,
            unnamed,
        }
    }

    fn leaf(&self, id: NodeId) -> SinkHandle {
        SinkHandle {
            id,
            name: Rc::clone(&self.unnamed),
        }
    }
}

fn convert_attr(attr: HtmlAttribute) -> Attribute {
    let key = match &attr.name.prefix {
        Some(prefix) => format!("{prefix}:{}", attr.name.local),
        None => attr.name.local.to_string(),
    };
    if attr.value.is_empty() {
        Attribute::boolean(key)
    } else {
        Attribute::new(key, attr.value.to_string())
    }
}

/// Text node right before the insertion point, if the point follows one.
fn text_before(doc: &mut Document, parent: NodeId, sibling: Option<NodeId>) -> Option<&mut String> {
    let previous = match sibling {
        Some(sibling) => doc.previous_sibling(sibling),
        None => doc.arena.get(parent)?.last_child(),
    }?;
    match &mut doc.node_mut(previous)?.kind {
        NodeKind::Text { text } => Some(text),
        _ => None,
    }
}

/// Insert `child` under `parent`, before `sibling` or at the end.
/// Text merges into an adjacent text node the way the HTML tree builder
/// expects.
fn insert(doc: &mut Document, parent: NodeId, sibling: Option<NodeId>, child: NodeOrText<SinkHandle>) {
    let node = match child {
        NodeOrText::AppendNode(handle) => handle.id,
        NodeOrText::AppendText(chunk) => {
            if let Some(existing) = text_before(doc, parent, sibling) {
                existing.push_str(&chunk);
                return;
            }
            doc.create_text(chunk.to_string())
        }
    };
    let result = match sibling {
        Some(sibling) => doc.insert_before(sibling, node),
        None => doc.append_child(parent, node),
    };
    if let Err(err) = result {
        log::warn!("tree builder insertion rejected: {err}");
    }
}

impl TreeSink for DocumentSink {
    type Handle = SinkHandle;
    type Output = Document;
    type ElemName<'a> = ExpandedName<'a>;

    fn finish(self) -> Self::Output {
        self.document.into_inner()
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        log::trace!("html parse error: {msg}");
    }

    fn get_document(&self) -> Self::Handle {
        self.document_handle.clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> ExpandedName<'a> {
        target.name.expanded()
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<HtmlAttribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let attrs: Attributes = attrs.into_iter().map(convert_attr).collect();
        let id = self
            .document
            .borrow_mut()
            .create_element_with(&name.local, attrs);
        SinkHandle {
            id,
            name: Rc::new(name),
        }
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        let id = self.document.borrow_mut().create_comment(text.to_string());
        self.leaf(id)
    }

    fn create_pi(&self, target: StrTendril, data: StrTendril) -> Self::Handle {
        // Processing instructions only show up in bogus-comment form in HTML
        let id = self
            .document
            .borrow_mut()
            .create_comment(format!("?{target} {data}"));
        self.leaf(id)
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        insert(&mut self.document.borrow_mut(), parent.id, None, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = self.document.borrow().parent(element.id).is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let mut doc = self.document.borrow_mut();
        let doctype = doc.create_doctype(&name, &public_id, &system_id);
        let root = doc.root();
        if let Err(err) = doc.append_child(root, doctype) {
            log::warn!("could not attach doctype: {err}");
        }
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x.id == y.id
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        log::trace!("document quirks mode: {mode:?}");
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let mut doc = self.document.borrow_mut();
        let Some(parent) = doc.parent(sibling.id) else {
            log::warn!("append_before_sibling on a detached node");
            return;
        };
        insert(&mut doc, parent, Some(sibling.id), new_node);
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<HtmlAttribute>) {
        let mut doc = self.document.borrow_mut();
        if let Some(data) = doc.element_mut(target.id) {
            for attr in attrs {
                data.attrs.put_if_absent(convert_attr(attr));
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        if let Err(err) = self.document.borrow_mut().detach(target.id) {
            log::warn!("remove_from_parent rejected: {err}");
        }
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let mut doc = self.document.borrow_mut();
        let children: Vec<NodeId> = doc.children(node.id).collect();
        for child in children {
            if let Err(err) = doc.append_child(new_parent.id, child) {
                log::warn!("reparent_children rejected: {err}");
            }
        }
    }
}
