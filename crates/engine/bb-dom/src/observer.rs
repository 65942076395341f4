//! Mutation observation
//!
//! MutationObserver registrations live on the tree. Each tree mutation is
//! matched against active registrations at the moment it happens and
//! queued as a record until the observer takes it.

use crate::NodeId;

/// Handle returned by `DomTree::observe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u32);

/// Mutation observer options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub subtree: bool,
}

impl MutationObserverInit {
    /// `{ childList: true, subtree: true }`
    pub fn subtree_insertions() -> Self {
        Self {
            child_list: true,
            subtree: true,
        }
    }
}

/// Mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub previous_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    ChildList,
}

/// One active `observe()` call
#[derive(Debug)]
pub(crate) struct Registration {
    pub(crate) id: ObserverId,
    pub(crate) target: NodeId,
    pub(crate) options: MutationObserverInit,
    pub(crate) records: Vec<MutationRecord>,
}

impl Registration {
    pub(crate) fn new(id: ObserverId, target: NodeId, options: MutationObserverInit) -> Self {
        Self {
            id,
            target,
            options,
            records: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtree_insertions_options() {
        let options = MutationObserverInit::subtree_insertions();
        assert!(options.child_list);
        assert!(options.subtree);
        assert_ne!(options, MutationObserverInit::default());
    }
}
