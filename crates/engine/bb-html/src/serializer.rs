//! HTML output
//!
//! Writes documents and subtrees back to markup. Empty attribute values
//! are written bare (`<span bb-current-year>`), `script`/`style` bodies
//! are copied verbatim and void elements get no end tag.

use bb_dom::{Document, DomTree, ElementData, NodeData, NodeId};

/// Elements without an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// Elements whose text is written unescaped
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Whole document, doctype included
pub fn document_html(document: &Document) -> String {
    let tree = document.tree();
    inner_html(tree, tree.root())
}

/// Markup of the children of `node`
pub fn inner_html(tree: &DomTree, node: NodeId) -> String {
    let mut out = String::new();
    for (child, _) in tree.children(node) {
        write_node(tree, child, &mut out);
    }
    out
}

/// Markup of `node` itself and its subtree
pub fn outer_html(tree: &DomTree, node: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, node, &mut out);
    out
}

fn write_node(tree: &DomTree, node: NodeId, out: &mut String) {
    let Some(n) = tree.get(node) else {
        return;
    };
    match &n.data {
        NodeData::Document => {
            for (child, _) in tree.children(node) {
                write_node(tree, child, out);
            }
        }
        NodeData::Doctype { name, .. } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Text(text) => escape(&text.content, false, out),
        NodeData::Element(elem) => write_element(tree, node, elem, out),
    }
}

fn write_element(tree: &DomTree, node: NodeId, elem: &ElementData, out: &mut String) {
    let tag = elem.tag.as_str();
    out.push('<');
    out.push_str(tag);
    for attr in elem.attrs.iter() {
        out.push(' ');
        out.push_str(&attr.name);
        if !attr.value.is_empty() {
            out.push_str("=\"");
            escape(&attr.value, true, out);
            out.push('"');
        }
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&tag) {
        return;
    }
    if RAW_TEXT_ELEMENTS.contains(&tag) {
        tree.children(node)
            .filter_map(|(_, child)| child.as_text())
            .for_each(|text| out.push_str(text));
    } else {
        for (child, _) in tree.children(node) {
            write_node(tree, child, out);
        }
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Entity-escape `text`; quotes only matter inside attribute values
fn escape(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaping_depends_on_context() {
        let mut text = String::new();
        escape("Tom & \"Jerry\" <3", false, &mut text);
        assert_eq!(text, "Tom &amp; \"Jerry\" &lt;3");

        let mut attr = String::new();
        escape("Tom & \"Jerry\" <3", true, &mut attr);
        assert_eq!(attr, "Tom &amp; &quot;Jerry&quot; &lt;3");
    }

    #[test]
    fn test_outer_and_inner_html() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let img = tree.create_element("img");
        let style = tree.create_element("style");
        let root = tree.root();
        tree.append_child(root, div).unwrap();
        tree.append_child(div, img).unwrap();
        tree.append_child(div, style).unwrap();
        tree.set_attribute(div, "bb-marquee", "").unwrap();
        tree.set_attribute(img, "src", "a.png?x=1&y=2").unwrap();
        tree.set_text_content(style, "a > b { }").unwrap();

        assert_eq!(
            outer_html(&tree, div),
            "<div bb-marquee><img src=\"a.png?x=1&amp;y=2\"><style>a > b { }</style></div>"
        );
        assert_eq!(inner_html(&tree, div), "<img src=\"a.png?x=1&amp;y=2\"><style>a > b { }</style>");
    }
}
