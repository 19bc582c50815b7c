use html::{Document, NodeId, StructuralError};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `<div>` holding five `<li>` children named by their `id`.
fn list_fixture() -> (Document, NodeId, Vec<NodeId>) {
    let mut doc = Document::new("https://example.com/");
    let root = doc.root();
    let div = doc.create_element("div");
    doc.append_child(root, div).unwrap();
    let items: Vec<NodeId> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|name| {
            let item = doc.create_element("li");
            doc.set_id(item, name).unwrap();
            doc.append_child(div, item).unwrap();
            item
        })
        .collect();
    (doc, div, items)
}

fn ids(doc: &Document, parent: NodeId) -> Vec<String> {
    doc.element_children(parent)
        .map(|child| doc.id(child).unwrap_or_default().to_owned())
        .collect()
}

#[test]
fn sibling_indices_follow_moves() {
    init_logging();
    let (mut doc, div, items) = list_fixture();
    let third = items[2];
    assert_eq!(doc.element_sibling_index(third), 2);

    doc.detach(third).unwrap();
    assert_eq!(doc.parent(third), None);
    assert_eq!(doc.element_sibling_index(third), 0);
    assert_eq!(doc.element_sibling_index(items[3]), 2);
    assert_eq!(ids(&doc, div), ["a", "b", "d", "e"]);

    doc.insert_child(div, 0, third).unwrap();
    assert_eq!(ids(&doc, div), ["c", "a", "b", "d", "e"]);
    assert_eq!(doc.element_sibling_index(items[0]), 1);
    assert_eq!(doc.sibling_index(third), 0);

    doc.insert_child(div, 5, third).unwrap();
    assert_eq!(ids(&doc, div), ["a", "b", "d", "e", "c"]);
}

#[test]
fn element_index_skips_text() {
    let (mut doc, div, items) = list_fixture();
    let text = doc.create_text("  ");
    doc.prepend_child(div, text).unwrap();
    assert_eq!(doc.sibling_index(items[0]), 1);
    assert_eq!(doc.element_sibling_index(items[0]), 0);
    assert_eq!(doc.previous_element_sibling(items[0]), None);
    assert_eq!(doc.previous_sibling(items[0]), Some(text));
    assert_eq!(doc.next_element_sibling(items[0]), Some(items[1]));
    assert_eq!(doc.first_element_child(div), Some(items[0]));
    assert_eq!(doc.last_element_child(div), Some(items[4]));
}

#[test]
fn cycles_are_rejected_without_changes() {
    init_logging();
    let (mut doc, div, items) = list_fixture();
    let before = doc.to_json_string();

    let err = doc.append_child(items[0], div).unwrap_err();
    assert!(matches!(err, StructuralError::Cycle { .. }), "{err}");
    let err = doc.append_child(div, div).unwrap_err();
    assert!(matches!(err, StructuralError::Cycle { .. }), "{err}");
    let err = doc.insert_before(items[1], div).unwrap_err();
    assert!(matches!(err, StructuralError::Cycle { .. }), "{err}");

    assert_eq!(doc.to_json_string(), before);
    assert_eq!(doc.parent(div), Some(doc.root()));
}

#[test]
fn invalid_targets_are_rejected() {
    let (mut doc, div, items) = list_fixture();
    let text = doc.create_text("leaf");
    doc.append_child(div, text).unwrap();

    let err = doc.append_child(text, items[0]).unwrap_err();
    assert!(matches!(err, StructuralError::NotAContainer(_)));

    let root = doc.root();
    let err = doc.detach(root).unwrap_err();
    assert!(matches!(err, StructuralError::DocumentNode(_)));

    let err = doc.insert_child(div, 42, items[0]).unwrap_err();
    assert!(matches!(err, StructuralError::IndexOutOfBounds { index: 42, len: 5 }));

    let orphan = doc.create_element("span");
    let err = doc.insert_after(orphan, items[0]).unwrap_err();
    assert!(matches!(err, StructuralError::NoParent(_)));

    let err = doc.set_attr(text, "id", "x").unwrap_err();
    assert!(matches!(err, StructuralError::NotAnElement(_)));

    doc.remove(items[4]).unwrap();
    assert!(doc.is_removed(items[4]));
    let err = doc.append_child(div, items[4]).unwrap_err();
    assert!(matches!(err, StructuralError::InvalidNode(_)));
    assert_eq!(ids(&doc, div), ["a", "b", "c", "d"]);
}

#[test]
fn insert_before_and_after() {
    let (mut doc, div, items) = list_fixture();
    doc.insert_after(items[0], items[4]).unwrap();
    assert_eq!(ids(&doc, div), ["a", "e", "b", "c", "d"]);
    doc.insert_before(items[0], items[3]).unwrap();
    assert_eq!(ids(&doc, div), ["d", "a", "e", "b", "c"]);
    doc.insert_before(items[0], items[0]).unwrap();
    assert_eq!(ids(&doc, div), ["d", "a", "e", "b", "c"]);
}

#[test]
fn replace_wrap_and_unwrap() {
    let (mut doc, div, items) = list_fixture();

    let fresh = doc.create_element("li");
    doc.set_id(fresh, "z").unwrap();
    doc.replace_with(items[1], fresh).unwrap();
    assert_eq!(ids(&doc, div), ["a", "z", "c", "d", "e"]);
    assert_eq!(doc.parent(items[1]), None);
    assert!(!doc.is_removed(items[1]));

    let outer = doc.create_element("section");
    let inner = doc.create_element("article");
    doc.append_child(outer, inner).unwrap();
    doc.wrap(items[2], outer).unwrap();
    assert_eq!(ids(&doc, div), ["a", "z", "", "d", "e"]);
    assert_eq!(doc.parent(items[2]), Some(inner));
    assert_eq!(doc.tag_name(doc.parent(outer).unwrap()), Some("div"));

    let first = doc.unwrap(outer).unwrap();
    assert_eq!(first, Some(inner));
    assert!(doc.is_removed(outer));
    assert_eq!(doc.parent(inner), Some(div));
    assert_eq!(doc.element_sibling_index(inner), 2);
}

#[test]
fn empty_and_set_text() {
    let (mut doc, div, items) = list_fixture();
    doc.set_text(items[0], "first").unwrap();
    assert_eq!(doc.text(items[0]), "first");
    doc.set_text(items[0], "again").unwrap();
    assert_eq!(doc.child_count(items[0]), 1);
    assert_eq!(doc.own_text(items[0]), "again");

    doc.empty(div).unwrap();
    assert_eq!(doc.child_count(div), 0);
    assert!(doc.is_removed(items[2]));
}

#[test]
fn deep_clone_is_independent() {
    let (mut doc, div, _) = list_fixture();
    let copy = doc.deep_clone(div).unwrap();
    assert_eq!(doc.parent(copy), None);
    assert_eq!(ids(&doc, copy), ids(&doc, div));
    assert_eq!(doc.base_uri(copy), Some("https://example.com/"));

    let first_copy = doc.first_element_child(copy).unwrap();
    doc.set_id(first_copy, "changed").unwrap();
    assert_eq!(ids(&doc, div)[0], "a");
    assert_eq!(doc.tag(first_copy), doc.tag(doc.first_element_child(div).unwrap()));
}

#[test]
fn class_writes_go_through_attributes() {
    let mut doc = Document::default();
    let node = doc.create_element("div");
    doc.add_class(node, "one").unwrap();
    doc.add_class(node, "two").unwrap();
    doc.add_class(node, "ONE").unwrap();
    assert_eq!(doc.attr(node, "class"), Some("one two"));
    assert!(doc.has_class(node, "Two"));

    assert!(!doc.toggle_class(node, "one").unwrap());
    assert_eq!(doc.class_names(node), ["two"]);
    assert!(doc.toggle_class(node, "three").unwrap());
    assert_eq!(doc.attr(node, "class"), Some("two three"));

    doc.remove_class(node, "two").unwrap();
    doc.remove_class(node, "three").unwrap();
    assert!(!doc.has_attr(node, "class"));

    doc.set_id(node, "main").unwrap();
    assert_eq!(doc.attr(node, "ID"), Some("main"));
    doc.set_boolean_attr(node, "hidden").unwrap();
    assert_eq!(doc.attr(node, "hidden"), Some(""));
    let removed = doc.remove_attr(node, "hidden").unwrap();
    assert!(removed.is_some_and(|attr| attr.is_boolean()));
}

#[test]
fn base_uri_is_inherited() {
    let (mut doc, div, items) = list_fixture();
    assert_eq!(doc.base_uri(items[0]), Some("https://example.com/"));
    doc.set_base_uri(div, "https://example.org/sub/").unwrap();
    assert_eq!(doc.base_uri(items[0]), Some("https://example.org/sub/"));

    doc.set_attr(items[0], "href", "../page.html").unwrap();
    assert_eq!(
        doc.abs_url(items[0], "href").as_deref(),
        Some("https://example.org/page.html")
    );
    doc.set_attr(items[1], "href", "mailto:someone@example.com").unwrap();
    assert_eq!(
        doc.abs_url(items[1], "href").as_deref(),
        Some("mailto:someone@example.com")
    );
    assert_eq!(doc.abs_url(items[2], "href"), None);
}
