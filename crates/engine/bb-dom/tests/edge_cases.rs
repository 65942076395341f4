//! Edge case tests for bb-dom
//!
//! Tree surgery, observation boundaries and clone semantics.

use bb_dom::{Document, DomError, DomTree, MutationObserverInit, NodeId};

fn element_under(tree: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
    let id = tree.create_element(tag);
    tree.append_child(parent, id).unwrap();
    id
}

#[test]
fn test_cannot_insert_ancestor_into_descendant() {
    let mut tree = DomTree::new();
    let a = element_under(&mut tree, NodeId::ROOT, "div");
    let b = element_under(&mut tree, a, "div");

    assert_eq!(
        tree.append_child(b, a),
        Err(DomError::HierarchyRequest { parent: b, child: a })
    );
    assert!(tree.contains(a, b));
}

#[test]
fn test_text_nodes_cannot_have_children() {
    let mut tree = DomTree::new();
    let text = tree.create_text("hi");
    tree.append_child(NodeId::ROOT, text).unwrap();
    let span = tree.create_element("span");
    assert!(tree.append_child(text, span).is_err());
}

#[test]
fn test_insert_before_reorders() {
    let mut tree = DomTree::new();
    let list = element_under(&mut tree, NodeId::ROOT, "ul");
    let one = element_under(&mut tree, list, "li");
    let two = element_under(&mut tree, list, "li");

    tree.insert_before(list, two, one).unwrap();
    let order: Vec<NodeId> = tree.element_children(list).collect();
    assert_eq!(order, vec![two, one]);

    let stray = tree.create_element("li");
    assert!(matches!(
        tree.insert_before(list, stray, NodeId::ROOT),
        Err(DomError::NotAChild { .. })
    ));
}

#[test]
fn test_observer_sees_only_connected_subtree() {
    let mut doc = Document::new("about:blank");
    let body = doc.body();
    let observer = doc.tree.observe(body, MutationObserverInit::subtree_insertions());

    let detached = doc.tree.create_element("div");
    let child = element_under(&mut doc.tree, detached, "span");
    assert!(doc.tree.take_records(observer).is_empty());

    doc.tree.append_child(body, detached).unwrap();
    let records = doc.tree.take_records(observer);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].added_nodes, vec![detached]);
    assert_eq!(records[0].target, body);

    let head = doc.head();
    element_under(&mut doc.tree, head, "meta");
    assert!(doc.tree.take_records(observer).is_empty());

    element_under(&mut doc.tree, child, "b");
    assert_eq!(doc.tree.take_records(observer).len(), 1);

    doc.tree.disconnect(observer);
    element_under(&mut doc.tree, body, "p");
    assert!(doc.tree.take_records(observer).is_empty());
}

#[test]
fn test_clone_is_deep_detached_and_fresh() {
    let mut tree = DomTree::new();
    let wrap = element_under(&mut tree, NodeId::ROOT, "div");
    let img = element_under(&mut tree, wrap, "img");
    tree.set_attribute(img, "src", "logo.png").unwrap();
    tree.element_mut(wrap).unwrap().claim.claim("marquee");
    tree.element_mut(wrap).unwrap().add_listener("click", "copy");

    let copy = tree.clone_subtree(wrap).unwrap();
    assert!(!tree.is_connected(copy));
    let copy_img = tree.element_children(copy).next().unwrap();
    assert_eq!(tree.get_attribute(copy_img, "src"), Some("logo.png"));

    let copied = tree.element(copy).unwrap();
    assert!(!copied.claim.is_claimed());
    assert!(copied.listeners.is_empty());
}

#[test]
fn test_attribute_names_are_case_insensitive() {
    let mut tree = DomTree::new();
    let el = element_under(&mut tree, NodeId::ROOT, "DIV");
    tree.set_attribute(el, "BB-Share", "x").unwrap();

    assert_eq!(tree.tag_name(el), Some("div"));
    assert_eq!(tree.get_attribute(el, "bb-share"), Some("x"));
    assert_eq!(tree.remove_attribute(el, "bb-share").unwrap(), Some("x".to_string()));
    assert!(!tree.has_attribute(el, "bb-share"));
}

#[test]
fn test_push_style_accumulates() {
    let mut tree = DomTree::new();
    let el = element_under(&mut tree, NodeId::ROOT, "div");
    let data = tree.element_mut(el).unwrap();
    data.set_attr("style", "color: red");
    data.push_style("overflow", "hidden");
    data.push_style("display", "flex");
    assert_eq!(data.get_attr("style"), Some("color: red; overflow: hidden; display: flex;"));
}
