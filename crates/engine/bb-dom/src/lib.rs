//! bb DOM - Document Object Model
//!
//! Arena-based DOM tree that the enhancement engine scans and mutates.
//! Elements carry their own claim markers, so ownership bookkeeping lives
//! next to the node it describes.

mod attributes;
mod claim;
mod document;
mod geometry;
mod node;
mod observer;
mod tree;

pub use attributes::{Attr, NamedNodeMap};
pub use claim::ElementClaim;
pub use document::Document;
pub use geometry::DOMRect;
pub use node::{ElementData, EventBinding, Node, NodeData, TextData};
pub use observer::{MutationObserverInit, MutationRecord, MutationType, ObserverId};
pub use tree::{Ancestors, Children, Descendants, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Whether this id points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// DOM manipulation errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NotFound(NodeId),

    #[error("Node {0} cannot have children")]
    NotAContainer(NodeId),

    #[error("Inserting {child} under {parent} would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}
