//! DOM Node
//!
//! Nodes link to each other through `NodeId`s into the tree arena rather
//! than through pointers.

use crate::{ElementClaim, NamedNodeMap, NodeId};

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a new text node
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_data(NodeData::Text(TextData { content: content.into() }))
    }

    /// Create a comment node
    pub fn comment(content: impl Into<String>) -> Self {
        Self::with_data(NodeData::Comment(content.into()))
    }

    /// Create a doctype node
    pub fn doctype(name: impl Into<String>, public_id: impl Into<String>, system_id: impl Into<String>) -> Self {
        Self::with_data(NodeData::Doctype {
            name: name.into(),
            public_id: public_id.into(),
            system_id: system_id.into(),
        })
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Whether this node may hold children
    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(self.data, NodeData::Element(_) | NodeData::Document)
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// DOCTYPE
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    /// Element
    Element(ElementData),
    /// Text content
    Text(TextData),
    /// Comment
    Comment(String),
}

/// Declarative event listener attached by a behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBinding {
    /// DOM event type, e.g. `click`
    pub event_type: String,
    /// Behavior-defined handler key
    pub handler: String,
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Tag name, lowercase
    pub tag: String,
    pub attrs: NamedNodeMap,
    pub claim: ElementClaim,
    pub listeners: Vec<EventBinding>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: NamedNodeMap::new(),
            claim: ElementClaim::new(),
            listeners: Vec::new(),
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.has(name)
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attrs.set(name, value);
    }

    /// Cached id lookup
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id")
    }

    /// Whitespace-separated class list
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attrs.get("class").unwrap_or("").split_ascii_whitespace()
    }

    /// Add a listener binding unless an identical one exists
    pub fn add_listener(&mut self, event_type: &str, handler: &str) {
        let binding = EventBinding {
            event_type: event_type.to_string(),
            handler: handler.to_string(),
        };
        if !self.listeners.contains(&binding) {
            self.listeners.push(binding);
        }
    }

    /// Append one `prop: value` declaration to the inline style
    pub fn push_style(&mut self, property: &str, value: &str) {
        let existing = self.attrs.get("style").unwrap_or("").trim().trim_end_matches(';').to_string();
        let declaration = format!("{property}: {value}");
        let style = if existing.is_empty() {
            format!("{declaration};")
        } else {
            format!("{existing}; {declaration};")
        };
        self.attrs.set("style", style);
    }

    /// Copy without claim markers or listeners, as a fresh clone starts
    pub fn fresh_clone(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            attrs: self.attrs.clone(),
            claim: ElementClaim::new(),
            listeners: Vec::new(),
        }
    }
}

/// Text node data
#[derive(Debug, Clone)]
pub struct TextData {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_style() {
        let mut el = ElementData::new("DIV");
        assert_eq!(el.tag, "div");
        el.push_style("cursor", "pointer");
        el.push_style("gap", "50px");
        assert_eq!(el.get_attr("style"), Some("cursor: pointer; gap: 50px;"));
    }

    #[test]
    fn test_fresh_clone_drops_claim() {
        let mut el = ElementData::new("span");
        el.set_attr("bb-share", "twitter");
        assert!(el.claim.claim("share"));
        el.add_listener("click", "share");
        el.add_listener("click", "share");
        assert_eq!(el.listeners.len(), 1);

        let clone = el.fresh_clone();
        assert!(!clone.claim.is_claimed());
        assert!(clone.listeners.is_empty());
        assert_eq!(clone.get_attr("bb-share"), Some("twitter"));
    }
}
