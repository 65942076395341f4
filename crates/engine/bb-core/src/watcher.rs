//! Change watcher
//!
//! Observes child-list insertions under `<body>` (or the document when
//! there is no body). Inserted subtrees that carry the attribute of a
//! registered behavior anywhere are queued as batches; everything else,
//! including bare parameters and unknown names in the namespace, is
//! ignored. The coordinator drains the batches and turns them into one
//! debounced pass.

use std::collections::VecDeque;

use bb_dom::{Document, MutationObserverInit, MutationRecord, NodeId, ObserverId};

use crate::selector::BehaviorSelector;

/// Relevant roots delivered by one observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionBatch {
    pub roots: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub struct ChangeWatcher {
    observer: Option<ObserverId>,
    target: Option<NodeId>,
    queue: VecDeque<InsertionBatch>,
    rerun_pending: bool,
}

impl ChangeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)start observation. Records from the previous registration are
    /// harvested first so a reconnect never drops an insertion.
    pub fn arm(&mut self, document: &mut Document, watched: &[BehaviorSelector]) {
        if self.observer.is_some() {
            self.collect(document, watched);
        }
        self.disarm(document);

        let target = document.body_or_root();
        let id = document
            .tree_mut()
            .observe(target, MutationObserverInit::subtree_insertions());
        self.observer = Some(id);
        self.target = Some(target);
        tracing::trace!("Watching {} for insertions", target);
    }

    /// Stop observing. Queued batches are kept.
    pub fn disarm(&mut self, document: &mut Document) {
        if let Some(id) = self.observer.take() {
            document.tree_mut().disconnect(id);
        }
        self.target = None;
    }

    pub fn is_armed(&self) -> bool {
        self.observer.is_some()
    }

    /// Node under observation
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Move delivered records into the batch queue, keeping only relevant
    /// insertions. Returns the number of batches added.
    pub fn collect(&mut self, document: &mut Document, watched: &[BehaviorSelector]) -> usize {
        let Some(id) = self.observer else {
            return 0;
        };
        let records = document.tree_mut().take_records(id);
        if records.is_empty() {
            return 0;
        }
        let roots = relevant_roots(document, watched, &records);
        if roots.is_empty() {
            tracing::trace!("Ignored {} irrelevant mutation records", records.len());
            return 0;
        }
        tracing::debug!("{} relevant insertions observed", roots.len());
        self.queue.push_back(InsertionBatch { roots });
        1
    }

    pub fn next_batch(&mut self) -> Option<InsertionBatch> {
        self.queue.pop_front()
    }

    pub fn has_batches(&self) -> bool {
        !self.queue.is_empty()
    }

    /// A debounced pass is already scheduled
    pub fn is_rerun_pending(&self) -> bool {
        self.rerun_pending
    }

    pub fn set_rerun_pending(&mut self, pending: bool) {
        self.rerun_pending = pending;
    }
}

/// Inserted element subtrees that are still attached and match a watched
/// behavior on the root or any descendant
fn relevant_roots(document: &Document, watched: &[BehaviorSelector], records: &[MutationRecord]) -> Vec<NodeId> {
    let tree = document.tree();
    let mut roots = Vec::new();
    for record in records {
        for &node in &record.added_nodes {
            if roots.contains(&node) || !tree.is_element(node) || !tree.is_connected(node) {
                continue;
            }
            if watched.iter().any(|sel| sel.in_subtree(tree, node)) {
                roots.push(node);
            }
        }
    }
    roots
}
