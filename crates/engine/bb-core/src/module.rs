//! Behavior module contract
//!
//! A module turns elements carrying its attribute into a working feature.
//! Each pass the coordinator asks `detect` (when the module declares
//! `DETECT`) and then calls `apply` on the pass scope. `apply` must be
//! idempotent: it claims each element through the context before
//! touching it, so running it again on an unchanged tree changes nothing.

use bb_dom::{Document, DomTree, NodeId};

use crate::clock::Clock;
use crate::config::{Config, I18n};
use crate::error::ModuleError;
use crate::layout::Layout;
use crate::ownership::OwnershipGuard;
use crate::selector::{AttributeGrammar, BehaviorSelector};

/// Optional hooks a module implements.
///
/// Multiple capabilities can be combined using the `|` operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleCapabilities(u32);

impl ModuleCapabilities {
    /// `detect` filters whether `apply` runs
    pub const DETECT: Self = Self(1 << 0);
    /// `has_unfinished_work` is consulted for retries
    pub const UNFINISHED_WORK: Self = Self(1 << 1);
    /// No capabilities
    pub const NONE: Self = Self(0);

    #[inline]
    pub const fn has(self, cap: Self) -> bool {
        (self.0 & cap.0) != 0
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for ModuleCapabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl Default for ModuleCapabilities {
    fn default() -> Self {
        Self::NONE
    }
}

pub trait BehaviorModule {
    fn capabilities(&self) -> ModuleCapabilities {
        ModuleCapabilities::NONE
    }

    /// Behavior attributes whose insertion should trigger a re-run.
    /// Empty means the name the module is registered under.
    fn attributes(&self) -> &[&'static str] {
        &[]
    }

    /// Whether the scope holds anything for this module
    fn detect(&self, cx: &ModuleContext<'_>, scope: NodeId) -> bool {
        let _ = (cx, scope);
        true
    }

    /// Enhance every eligible element under `scope`
    fn apply(&mut self, cx: &mut ModuleContext<'_>, scope: NodeId) -> Result<(), ModuleError>;

    /// Work left that a later pass could finish
    fn has_unfinished_work(&self, cx: &ModuleContext<'_>, scope: NodeId) -> bool {
        let _ = (cx, scope);
        false
    }
}

/// What a module sees during one call
pub struct ModuleContext<'a> {
    document: &'a mut Document,
    grammar: &'a AttributeGrammar,
    config: &'a Config,
    layout: &'a dyn Layout,
    clock: &'a dyn Clock,
    module: &'a str,
    performance_mode: bool,
}

impl<'a> ModuleContext<'a> {
    pub fn new(
        document: &'a mut Document,
        grammar: &'a AttributeGrammar,
        config: &'a Config,
        layout: &'a dyn Layout,
        clock: &'a dyn Clock,
        module: &'a str,
    ) -> Self {
        Self {
            document,
            grammar,
            config,
            layout,
            clock,
            module,
            performance_mode: false,
        }
    }

    pub fn with_performance_mode(mut self, enabled: bool) -> Self {
        self.performance_mode = enabled;
        self
    }

    pub fn document(&self) -> &Document {
        &*self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut *self.document
    }

    pub fn tree(&self) -> &DomTree {
        &self.document.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.document.tree
    }

    /// Shared collaborators outlive the context borrow, so they can be
    /// held across `tree_mut()`
    pub fn grammar(&self) -> &'a AttributeGrammar {
        self.grammar
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    pub fn i18n(&self) -> &'a I18n {
        &self.config.i18n
    }

    pub fn layout(&self) -> &'a dyn Layout {
        self.layout
    }

    pub fn clock(&self) -> &'a dyn Clock {
        self.clock
    }

    /// Registered name of the module being called
    pub fn module_name(&self) -> &str {
        self.module
    }

    pub fn performance_mode(&self) -> bool {
        self.performance_mode
    }

    pub fn behavior(&self, name: &str) -> Result<BehaviorSelector, ModuleError> {
        Ok(self.grammar.behavior(name)?)
    }

    /// Attribute value in either spelling, bare first
    pub fn read(&self, element: NodeId, name: &str) -> Option<String> {
        self.grammar.read(self.tree(), element, name).map(str::to_string)
    }

    /// Inside a subtree marked with the disable attribute
    pub fn is_disabled(&self, element: NodeId) -> bool {
        let tree = self.tree();
        let name = self.config.disable_attribute.as_str();
        std::iter::once(element)
            .chain(tree.ancestors(element))
            .any(|id| tree.is_element(id) && self.grammar.has(tree, id, name))
    }

    /// Elements under `scope` (scope included) matching `selector`,
    /// minus disabled subtrees, in document order
    pub fn targets(&self, scope: NodeId, selector: &BehaviorSelector) -> Vec<NodeId> {
        let tree = self.tree();
        let mut found = Vec::new();
        if selector.matches(tree, scope) {
            found.push(scope);
        }
        found.extend(selector.query_all(tree, scope));
        found.retain(|&id| !self.is_disabled(id));
        found
    }

    /// `detect` helper: any target present
    pub fn has_targets(&self, scope: NodeId, selector: &BehaviorSelector) -> bool {
        !self.targets(scope, selector).is_empty()
    }

    /// Claim an element for the calling module
    pub fn try_claim(&mut self, element: NodeId) -> bool {
        OwnershipGuard::try_claim(&mut self.document.tree, element, self.module)
    }

    pub fn owner(&self, element: NodeId) -> Option<&str> {
        OwnershipGuard::owner(self.tree(), element)
    }

    pub fn set_pending(&mut self, element: NodeId, pending: bool) {
        OwnershipGuard::set_pending(&mut self.document.tree, element, self.module, pending);
    }

    /// Elements under `scope` the calling module left unfinished
    pub fn pending(&self, scope: NodeId) -> Vec<NodeId> {
        OwnershipGuard::pending_in(self.tree(), scope, self.module)
    }

    /// Replace an element's content with an inline error message
    pub fn render_error(&mut self, element: NodeId, message: &str) -> Result<(), ModuleError> {
        let class = format!("{}error", self.grammar.prefix());
        let tree = self.tree_mut();
        tree.remove_children(element);
        let p = tree.create_element("p");
        tree.set_attribute(p, "class", &class)?;
        tree.set_attribute(p, "role", "alert")?;
        tree.set_text_content(p, message)?;
        tree.append_child(element, p)?;
        Ok(())
    }
}
