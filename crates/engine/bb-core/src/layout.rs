//! Layout measurement
//!
//! There is no layout engine behind the DOM, so modules that depend on
//! rendered size go through `Layout`. Hosts with real geometry supply
//! their own implementation; `IntrinsicLayout` estimates from markup.

use bb_dom::{DOMRect, DomTree, NodeData, NodeId};

/// Rendered size of an element
pub trait Layout {
    fn measure(&self, tree: &DomTree, node: NodeId) -> DOMRect;
}

impl<F> Layout for F
where
    F: Fn(&DomTree, NodeId) -> DOMRect,
{
    fn measure(&self, tree: &DomTree, node: NodeId) -> DOMRect {
        self(tree, node)
    }
}

/// Estimates size from text length and declared media dimensions.
///
/// Text contributes `char_width` per character on one line. Media
/// (`img`, `video`, `iframe`) contributes its `width`/`height` attributes;
/// media without them counts as not yet loaded and adds nothing.
///
/// Inline content of an element runs along a line while block-level
/// children stack below it. An inline `display: flex` style overrides
/// that: a row keeps every child on one line, `flex-direction: column`
/// stacks every child.
#[derive(Debug, Clone, Copy)]
pub struct IntrinsicLayout {
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for IntrinsicLayout {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 20.0,
        }
    }
}

const MEDIA_TAGS: &[&str] = &["img", "video", "iframe", "svg", "picture"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre",
    "section", "table", "ul",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Normal,
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, Default)]
struct Extent {
    width: f64,
    height: f64,
}

impl Extent {
    fn is_empty(self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }

    /// Place `other` after this one on the same line
    fn extend(&mut self, other: Extent) {
        self.width += other.width;
        self.height = self.height.max(other.height);
    }

    /// Place `other` below this one
    fn stack(&mut self, other: Extent) {
        if other.is_empty() {
            return;
        }
        self.width = self.width.max(other.width);
        self.height += other.height;
    }
}

impl IntrinsicLayout {
    fn dimension(tree: &DomTree, node: NodeId, name: &str) -> Option<f64> {
        tree.get_attribute(node, name)
            .and_then(|v| v.trim().trim_end_matches("px").parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
    }

    fn flow(tree: &DomTree, node: NodeId) -> Flow {
        let style: String = tree
            .get_attribute(node, "style")
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        if !style.contains("display:flex") && !style.contains("display:inline-flex") {
            Flow::Normal
        } else if style.contains("flex-direction:column") {
            Flow::Column
        } else {
            Flow::Row
        }
    }

    fn is_block(tree: &DomTree, node: NodeId) -> bool {
        tree.tag_name(node).is_some_and(|tag| BLOCK_TAGS.contains(&tag))
    }

    fn extent(&self, tree: &DomTree, node: NodeId) -> Extent {
        let Some(n) = tree.get(node) else {
            return Extent::default();
        };
        match &n.data {
            NodeData::Text(text) => {
                let chars = text.content.split_whitespace().map(|w| w.chars().count() + 1).sum::<usize>();
                if chars == 0 {
                    return Extent::default();
                }
                Extent {
                    width: chars as f64 * self.char_width,
                    height: self.line_height,
                }
            }
            NodeData::Element(elem) if MEDIA_TAGS.contains(&elem.tag.as_str()) => {
                match (Self::dimension(tree, node, "width"), Self::dimension(tree, node, "height")) {
                    (Some(width), Some(height)) => Extent { width, height },
                    _ => Extent::default(),
                }
            }
            NodeData::Element(elem) if elem.tag == "style" || elem.tag == "script" => Extent::default(),
            NodeData::Element(_) | NodeData::Document => self.lay_out(tree, node),
            _ => Extent::default(),
        }
    }

    fn lay_out(&self, tree: &DomTree, node: NodeId) -> Extent {
        let flow = Self::flow(tree, node);
        let mut stacked = Extent::default();
        let mut line = Extent::default();
        for (child, _) in tree.children(node) {
            let size = self.extent(tree, child);
            let breaks = match flow {
                Flow::Row => false,
                Flow::Column => true,
                Flow::Normal => Self::is_block(tree, child),
            };
            if breaks {
                stacked.stack(line);
                line = Extent::default();
                stacked.stack(size);
            } else {
                line.extend(size);
            }
        }
        stacked.stack(line);
        stacked
    }
}

impl Layout for IntrinsicLayout {
    fn measure(&self, tree: &DomTree, node: NodeId) -> DOMRect {
        let size = self.extent(tree, node);
        DOMRect::sized(size.width, size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_media() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let img = tree.create_element("img");
        let lazy = tree.create_element("img");
        let text = tree.create_text("Hi");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, img).unwrap();
        tree.append_child(div, lazy).unwrap();
        tree.append_child(div, text).unwrap();
        tree.set_attribute(img, "width", "120").unwrap();
        tree.set_attribute(img, "height", "40px").unwrap();

        let rect = IntrinsicLayout::default().measure(&tree, div);
        assert_eq!(rect.width, 120.0 + 3.0 * 8.0);
        assert_eq!(rect.height, 40.0);
    }

    #[test]
    fn test_unloaded_media_is_empty() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let img = tree.create_element("img");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, img).unwrap();

        assert!(IntrinsicLayout::default().measure(&tree, div).is_empty());
    }

    fn paragraphs(tree: &mut DomTree, parent: NodeId, lines: &[&str]) {
        for line in lines {
            let p = tree.create_element("p");
            let text = tree.create_text(line);
            tree.append_child(p, text).unwrap();
            tree.append_child(parent, p).unwrap();
        }
    }

    #[test]
    fn test_block_children_stack() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let root = tree.root();
        tree.append_child(root, div).unwrap();
        paragraphs(&mut tree, div, &["Alpha", "Beta gamma", "Delta", "Epsilon"]);

        let rect = IntrinsicLayout::default().measure(&tree, div);
        assert_eq!(rect.height, 80.0);
        assert_eq!(rect.width, 11.0 * 8.0);
    }

    #[test]
    fn test_flex_style_decides_axis() {
        let mut tree = DomTree::new();
        let row = tree.create_element("div");
        let column = tree.create_element("div");
        let root = tree.root();
        tree.append_child(root, row).unwrap();
        tree.append_child(root, column).unwrap();
        tree.set_attribute(row, "style", "display: flex; gap: 0px;").unwrap();
        tree.set_attribute(column, "style", "display: flex; flex-direction: column;").unwrap();
        paragraphs(&mut tree, row, &["One", "Two"]);
        for word in ["One", "Two"] {
            let span = tree.create_element("span");
            let text = tree.create_text(word);
            tree.append_child(span, text).unwrap();
            tree.append_child(column, span).unwrap();
        }

        let layout = IntrinsicLayout::default();
        let rect = layout.measure(&tree, row);
        assert_eq!((rect.width, rect.height), (64.0, 20.0));
        let rect = layout.measure(&tree, column);
        assert_eq!((rect.width, rect.height), (32.0, 40.0));
    }
}
