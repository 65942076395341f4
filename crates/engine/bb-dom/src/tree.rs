//! DOM Tree (arena-based allocation)
//!
//! Nodes are never freed: a removed node is simply unlinked and stays in
//! the arena, unreachable from the document.

use crate::observer::Registration;
use crate::{
    DomError, ElementData, MutationObserverInit, MutationRecord, MutationType, Node, NodeData,
    NodeId, ObserverId,
};

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    observers: Vec<Registration>,
    next_observer: u32,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            observers: Vec::new(),
            next_observer: 1,
        }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Number of nodes in the arena (detached ones included)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content))
    }

    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content))
    }

    pub fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        self.push(Node::doctype(name, public_id, system_id))
    }

    /// Element data, if `id` is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.get_attr(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_attr(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let elem = self.element_mut(id).ok_or(DomError::NotFound(id))?;
        elem.set_attr(name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let elem = self.element_mut(id).ok_or(DomError::NotFound(id))?;
        Ok(elem.attrs.remove(name).map(|a| a.value))
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_node = self.get(parent).ok_or(DomError::NotFound(parent))?;
        if !parent_node.is_container() {
            return Err(DomError::NotAContainer(parent));
        }
        let child_node = self.get(child).ok_or(DomError::NotFound(child))?;
        if matches!(child_node.data, NodeData::Document) || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, NodeId::NONE)
    }

    /// Insert `child` before `reference`; a `NONE` reference appends
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        if reference.is_valid() && self.get(reference).map(|n| n.parent) != Some(parent) {
            return Err(DomError::NotAChild { parent, child: reference });
        }
        if reference == child {
            return Ok(());
        }
        self.detach(child);

        let prev = if reference.is_valid() {
            self.nodes[reference.0 as usize].prev_sibling
        } else {
            self.nodes[parent.0 as usize].last_child
        };

        {
            let node = &mut self.nodes[child.0 as usize];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = reference;
        }
        if prev.is_valid() {
            self.nodes[prev.0 as usize].next_sibling = child;
        } else {
            self.nodes[parent.0 as usize].first_child = child;
        }
        if reference.is_valid() {
            self.nodes[reference.0 as usize].prev_sibling = child;
        } else {
            self.nodes[parent.0 as usize].last_child = child;
        }

        self.queue_child_list(parent, vec![child], Vec::new(), prev, reference);
        Ok(())
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let node = self.get(child).ok_or(DomError::NotFound(child))?;
        if node.parent != parent {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        Ok(())
    }

    /// Unlink a node from its parent, if it has one
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.0 as usize].next_sibling = next;
        } else {
            self.nodes[parent.0 as usize].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.0 as usize].prev_sibling = prev;
        } else {
            self.nodes[parent.0 as usize].last_child = prev;
        }

        let node = &mut self.nodes[id.0 as usize];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;

        self.queue_child_list(parent, Vec::new(), vec![id], prev, next);
    }

    /// Remove every child of `id`
    pub fn remove_children(&mut self, id: NodeId) {
        while let Some(child) = self.get(id).map(|n| n.first_child).filter(|c| c.is_valid()) {
            self.detach(child);
        }
    }

    /// Iterate over direct children
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let first = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Children { tree: self, next: first }
    }

    /// Direct children that are elements
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(|(_, n)| n.is_element()).map(|(id, _)| id)
    }

    /// Pre-order descendants of `id`, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Descendants { tree: self, root: id, next }
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.parent);
        Ancestors { tree: self, next }
    }

    /// Whether `node` is `ancestor` or one of its descendants
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether the node is reachable from the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root(), id)
    }

    /// Concatenated text of the node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.get(id) else {
            return String::new();
        };
        if let Some(text) = node.as_text() {
            return text.to_string();
        }
        let mut out = String::new();
        for desc in self.descendants(id) {
            if let Some(text) = self.get(desc).and_then(Node::as_text) {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        let node = self.get(id).ok_or(DomError::NotFound(id))?;
        if !node.is_container() {
            if let NodeData::Text(t) = &mut self.nodes[id.0 as usize].data {
                t.content = text.to_string();
                return Ok(());
            }
            return Err(DomError::NotAContainer(id));
        }
        self.remove_children(id);
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node)?;
        }
        Ok(())
    }

    /// Deep-clone a subtree. The clone is detached and its elements start
    /// without claim markers or listeners.
    pub fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId, DomError> {
        let node = self.get(id).ok_or(DomError::NotFound(id))?;
        let data = match &node.data {
            NodeData::Element(e) => NodeData::Element(e.fresh_clone()),
            NodeData::Document => return Err(DomError::HierarchyRequest { parent: NodeId::NONE, child: id }),
            other => other.clone(),
        };
        let copy = self.push(Node { data, ..Node::document() });
        let children: Vec<NodeId> = self.children(id).map(|(c, _)| c).collect();
        for child in children {
            let child_copy = self.clone_subtree(child)?;
            self.append_child(copy, child_copy)?;
        }
        Ok(copy)
    }

    /// Register a mutation observer on `target`
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push(Registration::new(id, target, options));
        tracing::trace!("observer {:?} watching {}", id, target);
        id
    }

    /// Drop a registration and its queued records
    pub fn disconnect(&mut self, observer: ObserverId) {
        self.observers.retain(|r| r.id != observer);
    }

    /// Drain queued records for an observer
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .iter_mut()
            .find(|r| r.id == observer)
            .map(|r| std::mem::take(&mut r.records))
            .unwrap_or_default()
    }

    /// Number of live observer registrations
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn queue_child_list(
        &mut self,
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
        prev: NodeId,
        next: NodeId,
    ) {
        if self.observers.is_empty() {
            return;
        }
        let interested: Vec<usize> = self
            .observers
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                r.options.child_list
                    && (r.target == target || (r.options.subtree && self.contains(r.target, target)))
            })
            .map(|(i, _)| i)
            .collect();
        for i in interested {
            self.observers[i].records.push(MutationRecord {
                mutation_type: MutationType::ChildList,
                target,
                added_nodes: added.clone(),
                removed_nodes: removed.clone(),
                previous_sibling: prev.is_valid().then_some(prev),
                next_sibling: next.is_valid().then_some(next),
            });
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order subtree iterator
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            let mut cursor = current;
            loop {
                if cursor == self.root {
                    break NodeId::NONE;
                }
                let Some(n) = self.tree.get(cursor) else {
                    break NodeId::NONE;
                };
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                cursor = n.parent;
                if !cursor.is_valid() || cursor == self.root {
                    break NodeId::NONE;
                }
            }
        };
        Some(current)
    }
}

/// Parent chain iterator
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;
        self.next = node.parent;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let p1 = tree.create_element("p");
        let p2 = tree.create_element("p");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, p1).unwrap();
        tree.append_child(div, p2).unwrap();
        (tree, div, p1, p2)
    }

    #[test]
    fn test_descendants_preorder() {
        let (mut tree, div, p1, p2) = sample();
        let text = tree.create_text("hi");
        tree.append_child(p1, text).unwrap();

        let order: Vec<NodeId> = tree.descendants(tree.root()).collect();
        assert_eq!(order, vec![div, p1, text, p2]);

        let inner: Vec<NodeId> = tree.descendants(p1).collect();
        assert_eq!(inner, vec![text]);
    }

    #[test]
    fn test_insert_before_and_remove() {
        let (mut tree, div, p1, p2) = sample();
        let span = tree.create_element("span");
        tree.insert_before(div, span, p2).unwrap();

        let kids: Vec<NodeId> = tree.element_children(div).collect();
        assert_eq!(kids, vec![p1, span, p2]);

        tree.remove_child(div, span).unwrap();
        assert!(!tree.is_connected(span));
        assert_eq!(tree.element_children(div).count(), 2);
    }

    #[test]
    fn test_cycle_rejected() {
        let (mut tree, div, p1, _) = sample();
        assert_eq!(
            tree.append_child(p1, div),
            Err(DomError::HierarchyRequest { parent: p1, child: div })
        );
    }

    #[test]
    fn test_text_content_roundtrip() {
        let (mut tree, div, p1, _) = sample();
        tree.set_text_content(p1, "hello world").unwrap();
        assert_eq!(tree.text_content(div), "hello world");
        tree.set_text_content(p1, "").unwrap();
        assert_eq!(tree.children(p1).count(), 0);
    }

    #[test]
    fn test_observer_sees_subtree_insertions_only_when_connected() {
        let (mut tree, div, p1, _) = sample();
        let obs = tree.observe(div, MutationObserverInit::subtree_insertions());

        let detached = tree.create_element("section");
        let inner = tree.create_element("b");
        tree.append_child(detached, inner).unwrap();
        assert!(tree.take_records(obs).is_empty());

        tree.append_child(p1, detached).unwrap();
        let records = tree.take_records(obs);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].target, p1);
        assert_eq!(records[0].added_nodes, vec![detached]);

        tree.disconnect(obs);
        assert_eq!(tree.observer_count(), 0);
    }

    #[test]
    fn test_clone_subtree_is_detached_and_unclaimed() {
        let (mut tree, div, p1, _) = sample();
        tree.element_mut(div).unwrap().claim.claim("marquee");
        tree.set_text_content(p1, "x").unwrap();

        let copy = tree.clone_subtree(div).unwrap();
        assert!(!tree.is_connected(copy));
        assert!(!tree.element(copy).unwrap().claim.is_claimed());
        assert_eq!(tree.text_content(copy), "x");
    }
}
