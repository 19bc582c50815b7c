mod html5ever_engine;

use std::io::Read;

use anyhow::{Context as _, Error};
use html5ever::tendril::TendrilSink as _;
use html5ever::tokenizer::TokenizerOpts;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, parse_document};
use indextree::NodeId;

use crate::dom::Document;
pub use html5ever_engine::{DocumentSink, SinkHandle};

/// Knobs for building a [`Document`] from markup.
#[derive(Clone, Debug)]
pub struct ParserConfig {
    /// Location of the document; relative URLs resolve against it.
    pub base_uri: String,
    /// Parse `<noscript>` content as if scripting were enabled.
    pub scripting_enabled: bool,
    /// Ask html5ever for detailed parse error messages.
    pub exact_errors: bool,
    /// Drop text nodes that contain only whitespace.
    pub drop_whitespace_text: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            base_uri: String::new(),
            scripting_enabled: true,
            exact_errors: false,
            drop_whitespace_text: false,
        }
    }
}

impl ParserConfig {
    /// Config with the given document location and defaults otherwise.
    pub fn with_base_uri(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            ..Self::default()
        }
    }

    fn parse_opts(&self) -> ParseOpts {
        ParseOpts {
            tokenizer: TokenizerOpts {
                exact_errors: self.exact_errors,
                ..TokenizerOpts::default()
            },
            tree_builder: TreeBuilderOpts {
                exact_errors: self.exact_errors,
                scripting_enabled: self.scripting_enabled,
                ..TreeBuilderOpts::default()
            },
        }
    }
}

/// Parse a complete HTML document with the default config.
pub fn parse_html(html: &str) -> Document {
    parse_html_with(html, &ParserConfig::default())
}

pub fn parse_html_with(html: &str, config: &ParserConfig) -> Document {
    let sink = DocumentSink::new(Document::new(config.base_uri.clone()));
    let doc = parse_document(sink, config.parse_opts()).one(html);
    finish(doc, config)
}

/// Parse UTF-8 HTML from `reader` (invalid sequences are replaced).
///
/// # Errors
/// Returns an error if reading from `reader` fails.
pub fn parse_reader<R: Read>(mut reader: R, config: &ParserConfig) -> Result<Document, Error> {
    let sink = DocumentSink::new(Document::new(config.base_uri.clone()));
    let doc = parse_document(sink, config.parse_opts())
        .from_utf8()
        .read_from(&mut reader)
        .context("failed to read HTML input")?;
    Ok(finish(doc, config))
}

fn finish(mut doc: Document, config: &ParserConfig) -> Document {
    if config.drop_whitespace_text {
        drop_whitespace_text(&mut doc);
    }
    apply_base_element(&mut doc);
    log::debug!(
        "parsed document: {} nodes, {} distinct tags",
        doc.node_count(),
        doc.tags().len()
    );
    doc
}

fn drop_whitespace_text(doc: &mut Document) {
    let blank: Vec<NodeId> = doc
        .descendants(doc.root())
        .filter(|node| {
            doc.node(*node)
                .is_some_and(|data| data.is_text() && doc.whole_text(*node).trim().is_empty())
        })
        .collect();
    for node in blank {
        if let Err(err) = doc.remove(node) {
            log::warn!("could not drop whitespace text: {err}");
        }
    }
}

/// The first `<base href>` sets the document base URI.
fn apply_base_element(doc: &mut Document) {
    let base = doc.descendants(doc.root()).find(|node| {
        doc.tag_name(*node)
            .is_some_and(|name| name.eq_ignore_ascii_case("base"))
            && doc.has_attr(*node, "href")
    });
    let Some(resolved) = base.and_then(|node| doc.abs_url(node, "href")) else {
        return;
    };
    let root = doc.root();
    if let Err(err) = doc.set_base_uri(root, &resolved) {
        log::warn!("could not apply <base href>: {err}");
    }
}
