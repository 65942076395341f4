//! Attribute grammar
//!
//! Every behavior attribute exists in two equivalent spellings: bare
//! (`bb-share`) and data (`data-bb-share`). The grammar builds the
//! selector pair for a behavior name and reads attribute values with the
//! bare spelling taking precedence.

use bb_css::{SelectorList, closest, matches, query_selector, query_selector_all};
use bb_dom::{DomTree, NodeId};

/// Namespace used when the configured prefix is empty
pub const DEFAULT_PREFIX: &str = "bb-";

/// Invalid behavior or attribute name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid behavior name `{0}`")]
pub struct GrammarError(pub String);

/// Prefix-aware attribute naming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeGrammar {
    prefix: String,
}

impl Default for AttributeGrammar {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl AttributeGrammar {
    /// Normalize `prefix` to a lowercase namespace ending in `-`
    pub fn new(prefix: &str) -> Self {
        let trimmed = prefix.trim().to_ascii_lowercase();
        let valid = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        let prefix = if trimmed.is_empty() || trimmed == "-" || !valid {
            DEFAULT_PREFIX.to_string()
        } else if trimmed.ends_with('-') {
            trimmed
        } else {
            format!("{trimmed}-")
        };
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `(bare, data)` attribute names for an unprefixed name. A name that
    /// already carries the prefix is not prefixed twice.
    pub fn attribute_names(&self, name: &str) -> Result<(String, String), GrammarError> {
        let name = name.trim().to_ascii_lowercase();
        let name = name.strip_prefix(&self.prefix).unwrap_or(&name);
        if !is_valid_name(name) {
            return Err(GrammarError(name.to_string()));
        }
        let bare = format!("{}{}", self.prefix, name);
        let data = format!("data-{bare}");
        Ok((bare, data))
    }

    /// Selector pair for a behavior
    pub fn behavior(&self, name: &str) -> Result<BehaviorSelector, GrammarError> {
        let (bare, data) = self.attribute_names(name)?;
        let list = SelectorList::any_attribute([bare.as_str(), data.as_str()]);
        Ok(BehaviorSelector { bare, data, list })
    }

    /// Attribute value, bare spelling first. Invalid names read as absent.
    pub fn read<'t>(&self, tree: &'t DomTree, element: NodeId, name: &str) -> Option<&'t str> {
        let (bare, data) = self.attribute_names(name).ok()?;
        tree.get_attribute(element, &bare)
            .or_else(|| tree.get_attribute(element, &data))
    }

    /// Either spelling present
    pub fn has(&self, tree: &DomTree, element: NodeId, name: &str) -> bool {
        self.read(tree, element, name).is_some()
    }
}

/// Selector matching one behavior in either spelling
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorSelector {
    bare: String,
    data: String,
    list: SelectorList,
}

impl BehaviorSelector {
    pub fn bare(&self) -> &str {
        &self.bare
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn selector_list(&self) -> &SelectorList {
        &self.list
    }

    /// CSS text, `[bb-x], [data-bb-x]`
    pub fn css(&self) -> String {
        format!("[{}], [{}]", self.bare, self.data)
    }

    pub fn matches(&self, tree: &DomTree, element: NodeId) -> bool {
        matches(tree, element, &self.list)
    }

    /// Matching descendants of `root`, document order
    pub fn query_all(&self, tree: &DomTree, root: NodeId) -> Vec<NodeId> {
        query_selector_all(tree, root, &self.list)
    }

    /// `root` or any of its descendants matches
    pub fn in_subtree(&self, tree: &DomTree, root: NodeId) -> bool {
        self.matches(tree, root) || self.query_first(tree, root).is_some()
    }

    /// First matching descendant of `root`
    pub fn query_first(&self, tree: &DomTree, root: NodeId) -> Option<NodeId> {
        query_selector(tree, root, &self.list)
    }

    /// Nearest inclusive ancestor carrying the attribute
    pub fn closest(&self, tree: &DomTree, element: NodeId) -> Option<NodeId> {
        closest(tree, element, &self.list)
    }

    /// Behavior value, bare spelling first
    pub fn value<'t>(&self, tree: &'t DomTree, element: NodeId) -> Option<&'t str> {
        tree.get_attribute(element, &self.bare)
            .or_else(|| tree.get_attribute(element, &self.data))
    }

    /// Parameter attribute `<behavior>-<param>` in either spelling
    pub fn param<'t>(&self, tree: &'t DomTree, element: NodeId, param: &str) -> Option<&'t str> {
        let bare = format!("{}-{}", self.bare, param);
        tree.get_attribute(element, &bare)
            .or_else(|| tree.get_attribute(element, &format!("data-{bare}")))
    }
}

/// Lowercase identifier: letters, digits, `-`, `_`, starting with a letter
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(attrs: &[(&str, &str)]) -> (DomTree, NodeId) {
        let mut tree = DomTree::new();
        let el = tree.create_element("div");
        tree.append_child(tree.root(), el).unwrap();
        for (name, value) in attrs {
            tree.set_attribute(el, name, value).unwrap();
        }
        (tree, el)
    }

    #[test]
    fn test_prefix_normalization() {
        assert_eq!(AttributeGrammar::new("bb").prefix(), "bb-");
        assert_eq!(AttributeGrammar::new("ACME-").prefix(), "acme-");
        assert_eq!(AttributeGrammar::new("").prefix(), "bb-");
        assert_eq!(AttributeGrammar::new("x y").prefix(), "bb-");
    }

    #[test]
    fn test_behavior_selector_pair() {
        let grammar = AttributeGrammar::default();
        let sel = grammar.behavior("share").unwrap();
        assert_eq!(sel.css(), "[bb-share], [data-bb-share]");

        let again = grammar.behavior("bb-share").unwrap();
        assert_eq!(again.bare(), "bb-share");

        assert!(grammar.behavior("").is_err());
        assert!(grammar.behavior("9lives").is_err());
        assert!(grammar.behavior("a]b").is_err());
    }

    #[test]
    fn test_both_spellings_match() {
        let grammar = AttributeGrammar::default();
        let sel = grammar.behavior("share").unwrap();

        let (tree, el) = tree_with(&[("data-bb-share", "x")]);
        assert!(sel.matches(&tree, el));
        assert_eq!(sel.value(&tree, el), Some("x"));

        let (tree, el) = tree_with(&[("bb-share", "")]);
        assert!(sel.matches(&tree, el));
        assert_eq!(sel.value(&tree, el), Some(""));
    }

    #[test]
    fn test_bare_spelling_wins() {
        let grammar = AttributeGrammar::default();
        let (tree, el) = tree_with(&[("data-bb-url", "https://data"), ("bb-url", "https://bare")]);
        assert_eq!(grammar.read(&tree, el, "url"), Some("https://bare"));

        let sel = grammar.behavior("current-year").unwrap();
        let (tree, el) = tree_with(&[("data-bb-current-year-format", "{year}")]);
        assert_eq!(sel.param(&tree, el, "format"), Some("{year}"));
    }

    #[test]
    fn test_subtree_match() {
        let grammar = AttributeGrammar::default();
        let share = grammar.behavior("share").unwrap();
        let (tree, el) = tree_with(&[("class", "x"), ("data-bb-share", "")]);
        assert!(share.in_subtree(&tree, el));
        assert!(share.in_subtree(&tree, tree.root()));

        let (tree, el) = tree_with(&[("bb-share-url", "https://a"), ("bb-unknown", "")]);
        assert!(!share.in_subtree(&tree, el));
        assert!(!share.in_subtree(&tree, tree.root()));
    }
}
