//! Element ownership
//!
//! First claimant wins. A claimed element is never handed to a second
//! module, and a module never processes the same element twice. Markers
//! live on the element itself, so removed elements take them along and
//! clones start unclaimed.

use bb_dom::{DomTree, NodeId};

/// Claim bookkeeping over `ElementClaim` markers
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipGuard;

impl OwnershipGuard {
    /// Claim `element` for `module`. False if another module owns it,
    /// `module` already processed it, or it is not an element.
    pub fn try_claim(tree: &mut DomTree, element: NodeId, module: &str) -> bool {
        let Some(elem) = tree.element_mut(element) else {
            return false;
        };
        if elem.claim.claim(module) {
            return true;
        }
        tracing::trace!(
            "{} denied {} (owned by {:?})",
            module,
            element,
            elem.claim.owner()
        );
        false
    }

    pub fn owner(tree: &DomTree, element: NodeId) -> Option<&str> {
        tree.element(element).and_then(|e| e.claim.owner())
    }

    pub fn is_processed(tree: &DomTree, element: NodeId, module: &str) -> bool {
        tree.element(element).is_some_and(|e| e.claim.is_processed_by(module))
    }

    /// Flag or clear unfinished work by `module` on `element`
    pub fn set_pending(tree: &mut DomTree, element: NodeId, module: &str, pending: bool) {
        if let Some(elem) = tree.element_mut(element) {
            elem.claim.set_pending(module, pending);
        }
    }

    pub fn is_pending(tree: &DomTree, element: NodeId, module: &str) -> bool {
        tree.element(element).is_some_and(|e| e.claim.is_pending_for(module))
    }

    /// Elements under `scope` (inclusive) still pending for `module`
    pub fn pending_in(tree: &DomTree, scope: NodeId, module: &str) -> Vec<NodeId> {
        std::iter::once(scope)
            .chain(tree.descendants(scope))
            .filter(|&id| Self::is_pending(tree, id, module))
            .collect()
    }
}
