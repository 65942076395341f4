//! Element query and matching
//!
//! querySelector, querySelectorAll, closest and matches over a `DomTree`.

use bb_dom::{DomTree, NodeId};

use crate::selectors::{
    Combinator, ComplexSelector, CompoundSelector, SelectorComponent, parse_selector_list,
};
use crate::{SelectorError, SelectorList};

fn match_component(tree: &DomTree, element: NodeId, component: &SelectorComponent) -> bool {
    let Some(elem) = tree.element(element) else {
        return false;
    };
    match component {
        SelectorComponent::Universal => true,
        SelectorComponent::Type(tag) => elem.tag.eq_ignore_ascii_case(tag),
        SelectorComponent::Id(id) => elem.id() == Some(id.as_str()),
        SelectorComponent::Class(class) => elem.classes().any(|c| c == class),
        SelectorComponent::Attribute(attr) => attr.matches(elem.get_attr(&attr.name)),
    }
}

fn match_compound(tree: &DomTree, element: NodeId, compound: &CompoundSelector) -> bool {
    tree.is_element(element) && compound.components.iter().all(|c| match_component(tree, element, c))
}

fn match_complex(tree: &DomTree, element: NodeId, selector: &ComplexSelector) -> bool {
    match_compound(tree, element, &selector.subject) && match_ancestors(tree, element, &selector.ancestors)
}

/// Match the remaining chain starting from `element`'s ancestors
fn match_ancestors(tree: &DomTree, element: NodeId, chain: &[(Combinator, CompoundSelector)]) -> bool {
    let Some(((combinator, compound), rest)) = chain.split_first() else {
        return true;
    };
    match combinator {
        Combinator::Child => tree
            .get(element)
            .map(|n| n.parent)
            .is_some_and(|parent| match_compound(tree, parent, compound) && match_ancestors(tree, parent, rest)),
        Combinator::Descendant => tree
            .ancestors(element)
            .any(|anc| match_compound(tree, anc, compound) && match_ancestors(tree, anc, rest)),
    }
}

/// Check if element matches any selector in the list
pub fn matches(tree: &DomTree, element: NodeId, list: &SelectorList) -> bool {
    list.selectors.iter().any(|s| match_complex(tree, element, s))
}

/// All matching descendants of `root`, in document order
pub fn query_selector_all(tree: &DomTree, root: NodeId, list: &SelectorList) -> Vec<NodeId> {
    tree.descendants(root).filter(|&id| matches(tree, id, list)).collect()
}

/// First matching descendant of `root`
pub fn query_selector(tree: &DomTree, root: NodeId, list: &SelectorList) -> Option<NodeId> {
    tree.descendants(root).find(|&id| matches(tree, id, list))
}

/// Nearest inclusive ancestor matching the list
pub fn closest(tree: &DomTree, element: NodeId, list: &SelectorList) -> Option<NodeId> {
    std::iter::once(element)
        .chain(tree.ancestors(element))
        .find(|&id| matches(tree, id, list))
}

/// Parse `selector` and run `query_selector_all`
pub fn select(tree: &DomTree, root: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
    let list = parse_selector_list(selector)?;
    Ok(query_selector_all(tree, root, &list))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let article = tree.create_element("article");
        let p = tree.create_element("p");
        let span = tree.create_element("span");
        tree.append_child(tree.root(), article).unwrap();
        tree.append_child(article, p).unwrap();
        tree.append_child(p, span).unwrap();
        tree.set_attribute(p, "class", "lead intro").unwrap();
        tree.set_attribute(span, "data-bb-share", "twitter").unwrap();
        (tree, article, p, span)
    }

    #[test]
    fn test_attribute_duality() {
        let (mut tree, article, _, span) = build();
        let bare = tree.create_element("a");
        tree.set_attribute(bare, "bb-share", "twitter").unwrap();
        tree.append_child(article, bare).unwrap();

        let found = select(&tree, tree.root(), "[bb-share], [data-bb-share]").unwrap();
        assert_eq!(found, vec![span, bare]);
    }

    #[test]
    fn test_combinators() {
        let (tree, article, p, span) = build();
        assert_eq!(select(&tree, tree.root(), "article > p.lead").unwrap(), vec![p]);
        assert_eq!(select(&tree, tree.root(), "article span").unwrap(), vec![span]);
        assert!(select(&tree, tree.root(), "article > span").unwrap().is_empty());
        assert!(select(&tree, article, "article").unwrap().is_empty());
    }

    #[test]
    fn test_closest() {
        let (tree, article, _, span) = build();
        let list: SelectorList = "article".parse().unwrap();
        assert_eq!(closest(&tree, span, &list), Some(article));
        let list: SelectorList = "[data-bb-share]".parse().unwrap();
        assert_eq!(closest(&tree, span, &list), Some(span));
    }
}
