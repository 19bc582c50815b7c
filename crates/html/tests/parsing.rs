use html::{NodeKind, ParserConfig, parse_html, parse_html_with, parse_reader};
use serde_json::json;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const PAGE: &str = "<!DOCTYPE html>\
<html><head><title> My  Page </title><base href=\"/docs/\"></head>\
<body><div id=\"main\" class=\"a b\"><p>One <b>two</b></p><!-- note --><p>three</p>\
<a href=\"guide.html\">x</a></div></body></html>";

#[test]
fn builds_expected_structure() {
    init_logging();
    let doc = parse_html_with(PAGE, &ParserConfig::with_base_uri("https://example.com/root/index.html"));

    let first = doc.children(doc.root()).next().unwrap();
    assert!(matches!(doc.kind(first), Some(NodeKind::DocumentType { name, .. }) if name == "html"));

    let html = doc.document_element().unwrap();
    assert_eq!(doc.tag_name(html), Some("html"));
    assert_eq!(doc.tag_name(doc.head().unwrap()), Some("head"));
    assert_eq!(doc.title().as_deref(), Some("My Page"));

    let main = doc.element_by_id("main").unwrap();
    assert_eq!(doc.parent(main), doc.body());
    assert_eq!(doc.class_names(main), ["a", "b"]);
    assert_eq!(doc.element_children(main).count(), 3);
    let comment = doc
        .children(main)
        .find(|child| matches!(doc.kind(*child), Some(NodeKind::Comment { .. })))
        .unwrap();
    assert!(matches!(doc.kind(comment), Some(NodeKind::Comment { text }) if text == " note "));
}

#[test]
fn extracts_text() {
    let doc = parse_html(PAGE);
    let main = doc.element_by_id("main").unwrap();
    let first_para = doc.first_element_child(main).unwrap();
    assert_eq!(doc.text(first_para), "One two");
    assert_eq!(doc.own_text(first_para), "One");

    let doc = parse_html("<div><p>One <b>two</b></p><p>three</p></div>");
    let div = doc.first_element_child(doc.body().unwrap()).unwrap();
    assert_eq!(doc.text(div), "One two three");

    let doc = parse_html("<pre>  keep\n  this </pre>");
    let pre = doc.first_element_child(doc.body().unwrap()).unwrap();
    assert_eq!(doc.whole_text(pre), "  keep\n  this ");
}

#[test]
fn base_element_sets_document_base() {
    let doc = parse_html_with(PAGE, &ParserConfig::with_base_uri("https://example.com/root/index.html"));
    assert_eq!(doc.base_uri(doc.root()), Some("https://example.com/docs/"));

    let link = doc
        .descendants(doc.root())
        .find(|node| doc.tag_name(*node) == Some("a"))
        .unwrap();
    assert_eq!(
        doc.abs_url(link, "href").as_deref(),
        Some("https://example.com/docs/guide.html")
    );
}

#[test]
fn whitespace_text_can_be_dropped() {
    let markup = "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>";
    let doc = parse_html(markup);
    let list = doc.first_element_child(doc.body().unwrap()).unwrap();
    assert_eq!(doc.child_count(list), 5);

    let config = ParserConfig {
        drop_whitespace_text: true,
        ..ParserConfig::default()
    };
    let doc = parse_html_with(markup, &config);
    let list = doc.first_element_child(doc.body().unwrap()).unwrap();
    assert_eq!(doc.child_count(list), 2);
    assert_eq!(doc.element_sibling_index(doc.last_element_child(list).unwrap()), 1);
}

#[test]
fn reader_input() {
    init_logging();
    let doc = parse_reader("<p class=x>hi</p>".as_bytes(), &ParserConfig::default()).unwrap();
    let para = doc.first_element_child(doc.body().unwrap()).unwrap();
    assert_eq!(doc.text(para), "hi");
    assert_eq!(doc.attr(para, "class"), Some("x"));
}

#[test]
fn json_snapshot() {
    let doc = parse_html("<ul><li>a</li><li class=\"x\" data-k=\"v\">b</li></ul>");
    let body = doc.body().unwrap();
    let expected = json!({
        "type": "element",
        "tag": "body",
        "attrs": {},
        "children": [{
            "type": "element",
            "tag": "ul",
            "attrs": {},
            "children": [
                {
                    "type": "element",
                    "tag": "li",
                    "attrs": {},
                    "children": [{ "type": "text", "text": "a" }]
                },
                {
                    "type": "element",
                    "tag": "li",
                    "attrs": { "class": "x", "data-k": "v" },
                    "children": [{ "type": "text", "text": "b" }]
                }
            ]
        }]
    });
    assert_eq!(doc.to_json_value(body), expected);
}

#[test]
fn debug_output_lists_nodes() {
    let doc = parse_html("<p hidden>hi</p>");
    let printed = format!("{doc:?}");
    assert!(printed.contains("<p hidden>"), "{printed}");
    assert!(printed.contains("\"hi\""), "{printed}");
}
