use css_selectors::{DocumentAdapter, Evaluator, Selector, SelectorErrorKind, parse_selector_list};
use html::parse_html;

#[test]
fn reparsing_selects_the_same_elements() {
    let _ = env_logger::builder().is_test(true).try_init();
    let doc = parse_html(
        "<div class=a><p id=x>1</p><p>2</p></div><ul><li>3</li><li class=a>4</li></ul>",
    );
    let adapter = DocumentAdapter::new(&doc);
    for query in [
        "p",
        ".a > p:nth-child(odd)",
        "li.a, #x, div ~ ul li",
        "*:not(p, li)",
        "ul > li:last-child:contains(4)",
        "> div > p",
        "p:contains('1) x'), li[title='say \\\"hi\\\"']",
        "svg|rect, #x\\.y",
    ] {
        let first = Selector::parse(query).unwrap();
        let second = Selector::parse(query).unwrap();
        assert_eq!(
            first.select(&adapter, doc.root()),
            second.select(&adapter, doc.root()),
            "{query}"
        );
        // The canonical rendering parses back to an equivalent selector.
        let rendered = first
            .groups()
            .iter()
            .map(Evaluator::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let reparsed = Selector::parse(&rendered).unwrap();
        assert_eq!(
            reparsed.select(&adapter, doc.root()),
            first.select(&adapter, doc.root()),
            "{query} -> {rendered}"
        );
    }
}

#[test]
fn groups_split_on_commas_only_outside_arguments() {
    let groups = parse_selector_list("p:not(.a, .b), li[title='x, y']").unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].to_string(), "p:not(.a, .b)");
    assert_eq!(groups[1].to_string(), "li[title=\"x, y\"]");
}

#[test]
fn errors_name_the_fragment() {
    let err = Selector::parse("ul > li:nth-child(x2)").unwrap_err();
    assert_eq!(err.kind, SelectorErrorKind::InvalidNthExpression);
    assert_eq!(err.fragment, "x2");
    assert_eq!(err.position, 18);
    assert_eq!(
        err.to_string(),
        "invalid an+b expression at position 18: `x2`"
    );

    let err = "div >".parse::<Selector>().unwrap_err();
    assert_eq!(err.kind, SelectorErrorKind::DanglingCombinator);
    assert_eq!(err.fragment, ">");

    let err = Selector::parse("[href").unwrap_err();
    assert_eq!(err.kind, SelectorErrorKind::UnterminatedAttribute);
    assert_eq!(err.position, 0);
}

#[test]
fn pseudo_class_names_ignore_case() {
    let doc = parse_html("<p>Hi <b>there</b></p>");
    let adapter = DocumentAdapter::new(&doc);
    let selector = Selector::parse("P:First-Child:CONTAINSOWN(hi)").unwrap();
    assert_eq!(selector.select(&adapter, doc.root()).len(), 1);
}
