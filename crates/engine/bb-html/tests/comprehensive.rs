//! Comprehensive tests for bb-html
//!
//! Parsing real-world markup and writing it back out.

use bb_html::{inner_html, parse, serialize};

#[test]
fn test_parse_empty_input() {
    let doc = parse("", "about:blank").unwrap();
    assert!(doc.tree().len() > 1, "Even empty HTML gets an html/head/body skeleton");
    assert!(doc.body().is_valid());
}

#[test]
fn test_both_attribute_spellings_survive() {
    let html = r#"<a bb-share="twitter" data-bb-share="facebook" bb-url="https://x.test/">Share</a>"#;
    let doc = parse(html, "https://example.com/").unwrap();
    let a = doc.tree().element_children(doc.body()).next().unwrap();

    assert_eq!(doc.tree().get_attribute(a, "bb-share"), Some("twitter"));
    assert_eq!(doc.tree().get_attribute(a, "data-bb-share"), Some("facebook"));
    assert_eq!(doc.url(), "https://example.com/");
}

#[test]
fn test_malformed_markup_recovers() {
    let html = "<div bb-marquee><p>Unclosed<span>nested</div><p>after";
    let doc = parse(html, "about:blank").unwrap();
    assert!(doc.tree().text_content(doc.body()).contains("after"));
}

#[test]
fn test_roundtrip_keeps_structure() {
    let html = "<!DOCTYPE html><html><head><title>T</title></head><body><div id=\"x\" bb-reading-time>Hi &amp; bye</div></body></html>";
    let doc = parse(html, "about:blank").unwrap();
    assert_eq!(serialize(&doc), html);
}

#[test]
fn test_inner_html_of_body() {
    let doc = parse("<p>one</p><br><p>two</p>", "about:blank").unwrap();
    assert_eq!(inner_html(doc.tree(), doc.body()), "<p>one</p><br><p>two</p>");
}

#[test]
fn test_template_content_is_kept() {
    let doc = parse("<template><span bb-share>t</span></template>", "about:blank").unwrap();
    let template = doc.tree().element_children(doc.head()).next().unwrap();
    assert_eq!(doc.tree().tag_name(template), Some("template"));
    assert_eq!(doc.tree().text_content(template), "t");
}
