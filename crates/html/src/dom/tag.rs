//! Interned element tags.
//!
//! Every element of a document shares one [`Tag`] per distinct name. The tag
//! carries the rendering metadata text extraction needs (block boundaries,
//! void elements, whitespace preservation); the name itself lives in the
//! document's [`TagRegistry`].

use lasso::{Rodeo, Spur};

/// Elements that start a new block when text is extracted.
const BLOCK_TAGS: &[&str] = &[
    "html", "head", "body", "frameset", "script", "noscript", "style", "meta", "link", "title",
    "frame", "noframes", "section", "nav", "aside", "hgroup", "header", "footer", "p", "h1", "h2",
    "h3", "h4", "h5", "h6", "ul", "ol", "pre", "div", "blockquote", "hr", "address", "figure",
    "figcaption", "form", "fieldset", "ins", "del", "dl", "dt", "dd", "li", "table", "caption",
    "thead", "tfoot", "tbody", "colgroup", "col", "tr", "th", "td", "video", "audio", "canvas",
    "details", "menu", "plaintext", "template", "article", "main", "svg", "math", "center",
];

const INLINE_TAGS: &[&str] = &[
    "object", "base", "font", "tt", "i", "b", "u", "big", "small", "em", "strong", "dfn", "code",
    "samp", "kbd", "var", "cite", "abbr", "time", "acronym", "mark", "ruby", "rt", "rp", "a",
    "img", "br", "wbr", "map", "q", "sub", "sup", "bdo", "iframe", "embed", "span", "input",
    "select", "textarea", "label", "button", "optgroup", "option", "legend", "datalist", "keygen",
    "output", "progress", "meter", "area", "param", "source", "track", "summary", "command",
    "device", "basefont", "bgsound", "menuitem", "data", "bdi", "s",
];

/// Void elements: never have children, serialize without an end tag.
const VOID_TAGS: &[&str] = &[
    "meta", "link", "base", "frame", "img", "br", "wbr", "embed", "hr", "input", "keygen", "col",
    "command", "device", "area", "basefont", "bgsound", "menuitem", "param", "source", "track",
];

const PRESERVE_WHITESPACE_TAGS: &[&str] = &["pre", "plaintext", "title", "textarea"];

/// An interned tag name plus its metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    key: Spur,
    block: bool,
    void: bool,
    preserve_whitespace: bool,
    known: bool,
}

impl Tag {
    /// Interner key of the tag name.
    pub const fn key(self) -> Spur {
        self.key
    }

    pub const fn is_block(self) -> bool {
        self.block
    }

    pub const fn is_inline(self) -> bool {
        !self.block
    }

    /// Whether this is a void element such as `<br>` or `<img>`.
    pub const fn is_self_closing(self) -> bool {
        self.void
    }

    /// Whether text below this tag keeps its whitespace verbatim (`<pre>`).
    pub const fn preserves_whitespace(self) -> bool {
        self.preserve_whitespace
    }

    /// Whether the name is one of the HTML tags listed above.
    pub const fn is_known(self) -> bool {
        self.known
    }
}

/// Per-document tag interner.
#[derive(Debug, Default)]
pub struct TagRegistry {
    names: Rodeo,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name` and compute its metadata.
    ///
    /// The name is stored as given; metadata is looked up ASCII
    /// case-insensitively, so `DIV` and `div` both count as block tags.
    pub fn intern(&mut self, name: &str) -> Tag {
        let key = self.names.get_or_intern(name);
        let lower = name.to_ascii_lowercase();
        let block = BLOCK_TAGS.contains(&lower.as_str());
        Tag {
            key,
            block,
            void: VOID_TAGS.contains(&lower.as_str()),
            preserve_whitespace: PRESERVE_WHITESPACE_TAGS.contains(&lower.as_str()),
            known: block || INLINE_TAGS.contains(&lower.as_str()),
        }
    }

    /// Resolve a tag back to its name.
    pub fn name(&self, tag: Tag) -> &str {
        self.names.resolve(&tag.key)
    }

    /// Number of distinct tag names interned so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Interning the same name twice yields the same shared tag.
    ///
    /// # Panics
    /// Panics if the two tags differ or the registry grows twice.
    #[test]
    fn same_name_shares_tag() {
        let mut registry = TagRegistry::new();
        let first = registry.intern("div");
        let second = registry.intern("div");
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.name(first), "div");
    }

    /// Tag metadata comes from the HTML tables regardless of case.
    ///
    /// # Panics
    /// Panics if a flag is computed incorrectly.
    #[test]
    fn metadata_flags() {
        let mut registry = TagRegistry::new();
        let para = registry.intern("P");
        assert!(para.is_block());
        assert!(para.is_known());
        let line_break = registry.intern("br");
        assert!(line_break.is_inline());
        assert!(line_break.is_self_closing());
        assert!(registry.intern("pre").preserves_whitespace());
        let custom = registry.intern("my-widget");
        assert!(!custom.is_known());
        assert!(custom.is_inline());
    }
}
