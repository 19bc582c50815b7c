//! Text extraction with HTML whitespace normalization.

use indextree::NodeId;

use super::{Document, NodeKind};

const fn is_html_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\u{c}' | '\u{a0}')
}

fn ends_with_whitespace(out: &str) -> bool {
    out.chars().next_back().is_some_and(is_html_whitespace)
}

/// Push `text` onto `out`, collapsing whitespace runs to one space.
fn append_normalized(out: &mut String, text: &str, strip_leading: bool) {
    let mut last_was_white = strip_leading;
    for ch in text.chars() {
        if is_html_whitespace(ch) {
            if !last_was_white {
                out.push(' ');
                last_was_white = true;
            }
        } else {
            out.push(ch);
            last_was_white = false;
        }
    }
}

/// Collapse every whitespace run (including U+00A0) to a single space.
///
/// Leading and trailing whitespace collapse too but are not trimmed.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    append_normalized(&mut out, text, false);
    out
}

impl Document {
    /// `<pre>`-like tags keep their text verbatim, also one level down.
    fn preserves_whitespace(&self, element: Option<NodeId>) -> bool {
        let preserves = |node: NodeId| self.tag(node).is_some_and(|tag| tag.preserves_whitespace());
        element.is_some_and(|node| {
            preserves(node) || self.parent_element(node).is_some_and(preserves)
        })
    }

    fn append_text(&self, out: &mut String, parent: Option<NodeId>, text: &str) {
        if self.preserves_whitespace(parent) {
            out.push_str(text);
        } else {
            let strip = ends_with_whitespace(out);
            append_normalized(out, text, strip);
        }
    }

    fn is_line_break(&self, node: NodeId) -> bool {
        self.tag_name(node)
            .is_some_and(|name| name.eq_ignore_ascii_case("br"))
    }

    /// Text of the direct text children of `node`, normalized and trimmed.
    pub fn own_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            match self.kind(child) {
                Some(NodeKind::Text { text }) => self.append_text(&mut out, Some(node), text),
                Some(NodeKind::Element(_)) if self.is_line_break(child) => {
                    if !ends_with_whitespace(&out) {
                        out.push(' ');
                    }
                }
                _ => {}
            }
        }
        out.trim().to_owned()
    }

    /// Text of all descendants in document order, normalized and trimmed.
    ///
    /// Block elements and `<br>` separate their text from the preceding
    /// text with a space.
    pub fn text(&self, node: NodeId) -> String {
        let mut out = String::new();
        for descendant in self.descendants(node) {
            match self.kind(descendant) {
                Some(NodeKind::Text { text }) => {
                    let parent = self.parent(descendant);
                    self.append_text(&mut out, parent, text);
                }
                Some(NodeKind::Element(data)) => {
                    let boundary = data.tag.is_block() || self.is_line_break(descendant);
                    if boundary && !out.is_empty() && !ends_with_whitespace(&out) {
                        out.push(' ');
                    }
                }
                _ => {}
            }
        }
        out.trim().to_owned()
    }

    /// Raw concatenation of all descendant text, no normalization.
    pub fn whole_text(&self, node: NodeId) -> String {
        self.descendants(node)
            .filter_map(|descendant| match self.kind(descendant) {
                Some(NodeKind::Text { text }) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Whitespace runs collapse to a single space.
    ///
    /// # Panics
    /// Panics if the collapsed output is wrong.
    #[test]
    fn collapse_runs() {
        assert_eq!(normalize_whitespace("  a \n\t b\u{a0}\u{a0}c "), " a b c ");
        assert_eq!(normalize_whitespace(""), "");
    }

    /// Block boundaries and `<br>` insert separators; inline ones do not.
    ///
    /// # Panics
    /// Panics if the extracted text differs.
    #[test]
    fn block_boundaries() {
        let mut doc = Document::default();
        let div = doc.create_element("div");
        let para = doc.create_element("p");
        let span = doc.create_element("span");
        let line_break = doc.create_element("br");
        let hello = doc.create_text("Hello");
        let there = doc.create_text("there  ");
        let world = doc.create_text("world");
        let tail = doc.create_text("tail");
        let root = doc.root();
        doc.append_child(root, div).unwrap();
        doc.append_child(div, hello).unwrap();
        doc.append_child(div, para).unwrap();
        doc.append_child(para, there).unwrap();
        doc.append_child(para, span).unwrap();
        doc.append_child(span, world).unwrap();
        doc.append_child(div, line_break).unwrap();
        doc.append_child(div, tail).unwrap();

        assert_eq!(doc.text(div), "Hello there world tail");
        assert_eq!(doc.own_text(div), "Hello tail");
        assert_eq!(doc.own_text(para), "there");
        assert_eq!(doc.whole_text(div), "Hellothere  worldtail");
    }

    /// Text under `<pre>` keeps its whitespace.
    ///
    /// # Panics
    /// Panics if whitespace inside `<pre>` is collapsed.
    #[test]
    fn preformatted_text() {
        let mut doc = Document::default();
        let pre = doc.create_element("pre");
        let code = doc.create_element("code");
        let body = doc.create_text("fn  main()\n{}");
        let root = doc.root();
        doc.append_child(root, pre).unwrap();
        doc.append_child(pre, code).unwrap();
        doc.append_child(code, body).unwrap();
        assert_eq!(doc.text(pre), "fn  main()\n{}");
    }
}
