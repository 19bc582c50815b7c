use core::fmt;

use super::attributes::Attributes;
use super::{Document, NodeKind};
use indextree::NodeId;

use serde_json::{Map, Value, json};

fn flush_text(children: &mut Vec<Value>, text_buf: &mut String) {
    if !text_buf.trim().is_empty() {
        children.push(json!({ "type": "text", "text": text_buf.clone() }));
    }
    text_buf.clear();
}

fn push_non_null(children: &mut Vec<Value>, value: Value) {
    if !value.is_null() {
        children.push(value);
    }
}

fn sorted_attrs(attrs: &Attributes) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = attrs
        .iter()
        .map(|attr| (attr.key().to_ascii_lowercase(), attr.value().to_owned()))
        .collect();
    pairs.sort_by(|left, right| left.0.cmp(&right.0));
    pairs
}

fn coalesce_children(doc: &Document, id: NodeId) -> Vec<Value> {
    let mut children: Vec<Value> = Vec::new();
    let mut text_buf = String::new();
    for child in doc.children(id) {
        if let Some(NodeKind::Text { text }) = doc.kind(child) {
            text_buf.push_str(text);
            continue;
        }
        flush_text(&mut children, &mut text_buf);
        push_non_null(&mut children, node_to_json(doc, child));
    }
    flush_text(&mut children, &mut text_buf);
    children
}

fn node_to_json(doc: &Document, id: NodeId) -> Value {
    match doc.kind(id) {
        None => Value::Null,
        Some(NodeKind::Document) => {
            json!({ "type": "document", "children": coalesce_children(doc, id) })
        }
        Some(NodeKind::Element(data)) => {
            let mut attrs_obj = Map::new();
            for (key, value) in sorted_attrs(&data.attrs) {
                attrs_obj.insert(key, Value::String(value));
            }
            json!({
                "type": "element",
                "tag": doc.tags.name(data.tag).to_ascii_lowercase(),
                "attrs": Value::Object(attrs_obj),
                "children": coalesce_children(doc, id),
            })
        }
        Some(NodeKind::Text { text }) => {
            if text.trim().is_empty() {
                Value::Null
            } else {
                json!({ "type": "text", "text": text })
            }
        }
        Some(NodeKind::Comment { text }) => json!({ "type": "comment", "text": text }),
        Some(NodeKind::DocumentType { name, .. }) => json!({ "type": "doctype", "name": name }),
    }
}

fn write_indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str("  ")?;
    }
    Ok(())
}

fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

fn write_attrs(f: &mut fmt::Formatter<'_>, attrs: &Attributes) -> fmt::Result {
    for attr in attrs {
        if attr.is_boolean() {
            write!(f, " {}", attr.key())?;
        } else {
            write!(f, " {}=\"{}\"", attr.key(), escape_text(attr.value()))?;
        }
    }
    Ok(())
}

fn fmt_node(doc: &Document, id: NodeId, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    let Some(kind) = doc.kind(id) else {
        return Ok(());
    };
    match kind {
        NodeKind::Document => {
            write_indent(f, depth)?;
            writeln!(f, "#document")?;
        }
        NodeKind::Element(data) => {
            let name = doc.tags.name(data.tag);
            write_indent(f, depth)?;
            write!(f, "<{name}")?;
            write_attrs(f, &data.attrs)?;
            writeln!(f, ">")?;
        }
        NodeKind::Text { text } => {
            // Skip pure-whitespace text nodes in the printer for cleaner output
            if text.chars().all(char::is_whitespace) {
                return Ok(());
            }
            write_indent(f, depth)?;
            writeln!(f, "\"{}\"", escape_text(text))?;
        }
        NodeKind::Comment { text } => {
            write_indent(f, depth)?;
            writeln!(f, "<!-- {} -->", escape_text(text))?;
        }
        NodeKind::DocumentType { name, .. } => {
            write_indent(f, depth)?;
            writeln!(f, "<!DOCTYPE {name}>")?;
        }
    }
    for child in doc.children(id) {
        fmt_node(doc, child, f, depth.saturating_add(1))?;
    }
    Ok(())
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Document")?;
        fmt_node(self, self.root, f, 0)
    }
}

impl Document {
    /// Build a deterministic JSON representation of the subtree at `node`.
    /// Schema:
    /// - Document: { "type":"document", "children":[ ... ] }
    /// - Element: { "type":"element", "tag": "div", "attrs": {..}, "children":[ ... ] }
    /// - Text: { "type":"text", "text":"..." }
    /// - Comment: { "type":"comment", "text":"..." }
    /// - Doctype: { "type":"doctype", "name":"html" }
    pub fn to_json_value(&self, node: NodeId) -> Value {
        node_to_json(self, node)
    }

    /// Pretty JSON string of the whole document for snapshots and test comparisons.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_json_value(self.root))
            .unwrap_or_else(|_| String::from("{}"))
    }
}
