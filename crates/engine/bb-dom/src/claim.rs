//! Element claim markers
//!
//! Per-element ownership state. The marker is created lazily with the
//! element and dies with it; a cloned element never inherits it.

use std::collections::BTreeSet;

/// Ownership and processing markers attached to one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementClaim {
    owner: Option<String>,
    processed: BTreeSet<String>,
    pending: BTreeSet<String>,
}

impl ElementClaim {
    pub fn new() -> Self {
        Self::default()
    }

    /// Module holding the exclusive claim
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn is_claimed(&self) -> bool {
        self.owner.is_some()
    }

    pub fn is_processed_by(&self, module: &str) -> bool {
        self.processed.contains(module)
    }

    /// Set the owner and processed markers. Returns false if either
    /// marker already denies the claim.
    pub fn claim(&mut self, module: &str) -> bool {
        if self.owner.is_some() || self.processed.contains(module) {
            return false;
        }
        self.owner = Some(module.to_string());
        self.processed.insert(module.to_string());
        true
    }

    /// Module has work left on this element
    pub fn is_pending_for(&self, module: &str) -> bool {
        self.pending.contains(module)
    }

    pub fn set_pending(&mut self, module: &str, pending: bool) {
        if pending {
            self.pending.insert(module.to_string());
        } else {
            self.pending.remove(module);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_is_exclusive() {
        let mut claim = ElementClaim::new();
        assert!(claim.claim("marquee"));
        assert!(!claim.claim("marquee"));
        assert!(!claim.claim("youtube"));
        assert_eq!(claim.owner(), Some("marquee"));
        assert!(!claim.is_processed_by("youtube"));
    }

    #[test]
    fn test_pending_toggle() {
        let mut claim = ElementClaim::new();
        claim.set_pending("marquee", true);
        assert!(claim.is_pending_for("marquee"));
        claim.set_pending("marquee", false);
        assert!(!claim.is_pending_for("marquee"));
    }
}
