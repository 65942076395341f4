//! Coordinator
//!
//! Owns the registry and drives passes over a document. A pass resolves
//! the scope, runs every registered module in order, re-arms the change
//! watcher and asks modules about unfinished work. Relevant insertions
//! become one debounced pass; unfinished work becomes a bounded retry.
//!
//! Time is the coordinator's own virtual clock. Hosts drive it with
//! `advance`, `run_until_idle` or `run_realtime`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use bb_dom::{Document, NodeId};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{ModuleError, RegistryError};
use crate::layout::{IntrinsicLayout, Layout};
use crate::module::{BehaviorModule, ModuleCapabilities, ModuleContext};
use crate::registry::ModuleRegistry;
use crate::retry::RetryScheduler;
use crate::selector::{AttributeGrammar, BehaviorSelector};
use crate::timers::{Task, Timer, TimerId, TimerQueue};
use crate::watcher::ChangeWatcher;

/// Page-global name claimed on install
pub const GLOBAL_NAME: &str = "bbContents";

/// Upper bound on timers fired by one `run_until_idle`
const MAX_IDLE_STEPS: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

/// Outcome of one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub scope: NodeId,
    pub performance_mode: bool,
    /// Modules whose `apply` returned Ok
    pub applied: Vec<String>,
    /// Modules whose `detect` found nothing
    pub skipped: Vec<String>,
    /// Modules that returned an error or panicked, with the message
    pub failed: Vec<(String, String)>,
    /// Modules reporting unfinished work after the pass
    pub unfinished: Vec<String>,
}

impl PassReport {
    fn new(scope: NodeId, performance_mode: bool) -> Self {
        Self {
            scope,
            performance_mode,
            applied: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            unfinished: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Coordinator {
    config: Config,
    grammar: AttributeGrammar,
    registry: ModuleRegistry,
    /// Selectors of every registered behavior, for the insertion filter
    watched: Vec<BehaviorSelector>,
    watcher: ChangeWatcher,
    retry: RetryScheduler,
    timers: TimerQueue,
    layout: Box<dyn Layout>,
    clock: Box<dyn Clock>,
    state: RunState,
    initialized: bool,
    performance_mode: bool,
    rerun_timer: Option<TimerId>,
    retry_timer: Option<TimerId>,
    passes: u64,
    last_report: Option<PassReport>,
}

impl Coordinator {
    pub fn new(config: Config) -> Self {
        let grammar = AttributeGrammar::new(&config.prefix);
        let retry = RetryScheduler::new(config.timing.max_retries);
        Self {
            config,
            grammar,
            registry: ModuleRegistry::new(),
            watched: Vec::new(),
            watcher: ChangeWatcher::new(),
            retry,
            timers: TimerQueue::new(),
            layout: Box::new(IntrinsicLayout::default()),
            clock: Box::new(SystemClock),
            state: RunState::Idle,
            initialized: false,
            performance_mode: false,
            rerun_timer: None,
            retry_timer: None,
            passes: 0,
            last_report: None,
        }
    }

    pub fn with_layout(mut self, layout: impl Layout + 'static) -> Self {
        self.layout = Box::new(layout);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Claim the page global. A second coordinator on the same document
    /// gets `None` and should be dropped without running.
    pub fn install(self, document: &mut Document) -> Option<Self> {
        if !document.define_global(GLOBAL_NAME) {
            tracing::warn!("{} already installed on {}", GLOBAL_NAME, document.url());
            return None;
        }
        Some(self)
    }

    pub fn register(&mut self, name: &str, module: impl BehaviorModule + 'static) -> Result<(), RegistryError> {
        self.register_boxed(name, Box::new(module))
    }

    pub fn register_boxed(&mut self, name: &str, module: Box<dyn BehaviorModule>) -> Result<(), RegistryError> {
        let watched = self.watch_selectors(name, module.as_ref());
        self.registry.register(name, module)?;
        self.watched.extend(watched);
        Ok(())
    }

    fn watch_selectors(&self, name: &str, module: &dyn BehaviorModule) -> Vec<BehaviorSelector> {
        let attributes = module.attributes();
        let names = if attributes.is_empty() { vec![name] } else { attributes.to_vec() };
        names
            .into_iter()
            .filter_map(|attr| match self.grammar.behavior(attr) {
                Ok(selector) => Some(selector),
                Err(err) => {
                    tracing::warn!("{}: not watching insertions: {}", name, err);
                    None
                }
            })
            .collect()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn grammar(&self) -> &AttributeGrammar {
        &self.grammar
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Completed passes
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn retry_attempts(&self) -> u32 {
        self.retry.attempts()
    }

    pub fn is_rerun_pending(&self) -> bool {
        self.watcher.is_rerun_pending()
    }

    pub fn is_retry_pending(&self) -> bool {
        self.retry.is_pending()
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_armed()
    }

    pub fn performance_mode(&self) -> bool {
        self.performance_mode
    }

    /// Virtual time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn last_report(&self) -> Option<&PassReport> {
        self.last_report.as_ref()
    }

    /// First pass. Later calls are no-ops returning `None`.
    pub fn init(&mut self, document: &mut Document) -> Option<PassReport> {
        if self.initialized {
            tracing::debug!("Already initialized");
            return None;
        }
        self.initialized = true;
        tracing::info!("Initializing {} modules on {}", self.registry.len(), document.url());
        Some(self.run(document))
    }

    /// Explicit re-initialization: clears retry and debounce state, then
    /// runs a pass
    pub fn reinit(&mut self, document: &mut Document) -> PassReport {
        // A pass abandoned by an escaped panic would otherwise refuse forever
        self.state = RunState::Idle;
        self.cancel_timers();
        self.retry.reset();
        self.watcher.set_rerun_pending(false);
        self.initialized = true;
        self.run(document)
    }

    /// One full pass, then schedule whatever it observed
    pub fn run(&mut self, document: &mut Document) -> PassReport {
        let report = self.pass(document);
        self.pump(document);
        report
    }

    /// Deliver pending mutation records now instead of at the next tick
    pub fn notify_mutations(&mut self, document: &mut Document) {
        self.pump(document);
    }

    /// Move virtual time forward by `ms`, firing every timer that falls
    /// due on the way. Returns the number fired.
    pub fn advance(&mut self, document: &mut Document, ms: u64) -> usize {
        self.pump(document);
        let target = self.timers.now_ms().saturating_add(ms);
        let mut fired = 0;
        while let Some(timer) = self.timers.pop_due(target) {
            self.fire(document, timer);
            fired += 1;
        }
        self.timers.advance_to(target);
        fired
    }

    /// Fire timers in deadline order until none are left
    pub fn run_until_idle(&mut self, document: &mut Document) -> usize {
        self.pump(document);
        let mut fired = 0;
        while fired < MAX_IDLE_STEPS {
            let Some(deadline) = self.timers.next_deadline() else {
                break;
            };
            let Some(timer) = self.timers.pop_due(deadline) else {
                break;
            };
            self.fire(document, timer);
            fired += 1;
        }
        if fired == MAX_IDLE_STEPS {
            tracing::warn!("Stopped after {} timers without reaching idle", MAX_IDLE_STEPS);
        }
        fired
    }

    /// Like `run_until_idle`, but sleeps real time between timers and
    /// gives up once `budget` would be exceeded
    pub fn run_realtime(&mut self, document: &mut Document, budget: Duration) -> usize {
        let start = Instant::now();
        let mut fired = 0;
        loop {
            self.pump(document);
            let Some(wait) = self.timers.time_until_next() else {
                break;
            };
            if start.elapsed() + wait > budget {
                tracing::debug!("Realtime budget of {:?} reached", budget);
                break;
            }
            std::thread::sleep(wait);
            let ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
            fired += self.advance(document, ms);
        }
        fired
    }

    /// Stop watching and drop scheduled work
    pub fn disconnect(&mut self, document: &mut Document) {
        self.watcher.disarm(document);
        self.cancel_timers();
        self.watcher.set_rerun_pending(false);
        self.retry.settle();
    }

    fn cancel_timers(&mut self) {
        if let Some(id) = self.rerun_timer.take() {
            self.timers.clear(id);
        }
        if let Some(id) = self.retry_timer.take() {
            self.timers.clear(id);
        }
    }

    fn fire(&mut self, document: &mut Document, timer: Timer) {
        tracing::trace!("Timer {:?} fired at {}ms", timer.task, timer.deadline_ms);
        match timer.task {
            Task::Rerun => {
                self.rerun_timer = None;
                self.pass(document);
                self.watcher.set_rerun_pending(false);
            }
            Task::Retry => {
                self.retry_timer = None;
                self.retry.settle();
                self.pass(document);
            }
        }
        self.pump(document);
    }

    /// Turn queued insertion batches into at most one scheduled rerun
    fn pump(&mut self, document: &mut Document) {
        self.watcher.collect(document, &self.watched);
        while let Some(batch) = self.watcher.next_batch() {
            if self.watcher.is_rerun_pending() {
                tracing::trace!("Coalesced {} insertions into pending rerun", batch.roots.len());
                continue;
            }
            self.watcher.set_rerun_pending(true);
            let delay = self.config.timing.debounce(self.performance_mode);
            self.rerun_timer = Some(self.timers.set_timeout(Task::Rerun, delay));
            tracing::debug!("Rerun in {}ms for {} inserted subtrees", delay, batch.roots.len());
        }
    }

    fn resolve_scope(&self, document: &Document) -> NodeId {
        let tree = document.tree();
        self.grammar
            .behavior(&self.config.scope_attribute)
            .ok()
            .and_then(|sel| sel.query_first(tree, tree.root()))
            .unwrap_or_else(|| tree.root())
    }

    fn detect_performance_mode(&self, document: &Document, scope: NodeId) -> bool {
        let tree = document.tree();
        let name = self.config.performance_mode_attribute.as_str();
        [document.document_element(), document.body(), scope]
            .into_iter()
            .filter(|&id| tree.is_element(id))
            .any(|id| self.grammar.has(tree, id, name))
    }

    fn pass(&mut self, document: &mut Document) -> PassReport {
        let scope = self.resolve_scope(document);
        if self.state == RunState::Running {
            tracing::warn!("Pass requested while another is running, ignored");
            return PassReport::new(scope, self.performance_mode);
        }
        self.state = RunState::Running;
        let performance = self.detect_performance_mode(document, scope);
        self.performance_mode = performance;
        let mut report = PassReport::new(scope, performance);

        for (name, module) in self.registry.iter_mut() {
            let mut cx = ModuleContext::new(
                document,
                &self.grammar,
                &self.config,
                &*self.layout,
                &*self.clock,
                name,
            )
            .with_performance_mode(performance);

            if module.capabilities().has(ModuleCapabilities::DETECT) {
                match guarded(|| module.detect(&cx, scope)) {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::trace!("{}: nothing to do", name);
                        report.skipped.push(name.to_string());
                        continue;
                    }
                    Err(err) => {
                        tracing::error!("{} detect failed: {}", name, err);
                        report.failed.push((name.to_string(), err.to_string()));
                        continue;
                    }
                }
            }

            match guarded(|| module.apply(&mut cx, scope)).and_then(|result| result) {
                Ok(()) => report.applied.push(name.to_string()),
                Err(err) => {
                    tracing::error!("{} failed: {}", name, err);
                    report.failed.push((name.to_string(), err.to_string()));
                }
            }
        }

        self.state = RunState::Idle;
        self.passes += 1;

        self.watcher.arm(document, &self.watched);

        report.unfinished = self.unfinished_modules(document, scope, performance);
        let base = self.config.timing.retry_base(performance);
        if let Some(delay) = self.retry.plan(!report.unfinished.is_empty(), base) {
            self.retry_timer = Some(self.timers.set_timeout(Task::Retry, delay));
        }

        if self.config.debug {
            tracing::info!(
                "Pass {} at {}ms: applied {:?}, skipped {:?}, failed {}, unfinished {:?}",
                self.passes,
                self.timers.now_ms(),
                report.applied,
                report.skipped,
                report.failed.len(),
                report.unfinished
            );
        } else {
            tracing::debug!(
                "Pass {}: {} applied, {} failed",
                self.passes,
                report.applied.len(),
                report.failed.len()
            );
        }

        self.last_report = Some(report.clone());
        report
    }

    fn unfinished_modules(&self, document: &mut Document, scope: NodeId, performance: bool) -> Vec<String> {
        let mut names = Vec::new();
        for (name, module) in self.registry.iter() {
            if !module.capabilities().has(ModuleCapabilities::UNFINISHED_WORK) {
                continue;
            }
            let cx = ModuleContext::new(
                document,
                &self.grammar,
                &self.config,
                &*self.layout,
                &*self.clock,
                name,
            )
            .with_performance_mode(performance);
            match guarded(|| module.has_unfinished_work(&cx, scope)) {
                Ok(true) => names.push(name.to_string()),
                Ok(false) => {}
                Err(err) => tracing::error!("{} unfinished-work check failed: {}", name, err),
            }
        }
        names
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("prefix", &self.grammar.prefix())
            .field("modules", &self.registry)
            .field("state", &self.state)
            .field("passes", &self.passes)
            .field("now_ms", &self.timers.now_ms())
            .finish()
    }
}

/// Run module code, turning a panic into a `ModuleError`
fn guarded<R>(f: impl FnOnce() -> R) -> Result<R, ModuleError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| ModuleError::Panicked(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting(u32);

    impl BehaviorModule for Counting {
        fn apply(&mut self, _cx: &mut ModuleContext<'_>, _scope: NodeId) -> Result<(), ModuleError> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn test_run_while_running_is_refused() {
        let mut doc = Document::new("about:blank");
        let mut coordinator = Coordinator::new(Config::default());
        coordinator.register("count", Counting(0)).unwrap();

        coordinator.state = RunState::Running;
        let report = coordinator.run(&mut doc);
        assert!(report.applied.is_empty());
        assert_eq!(coordinator.passes(), 0);
        assert_eq!(coordinator.state(), RunState::Running);

        let report = coordinator.reinit(&mut doc);
        assert_eq!(report.applied, vec!["count"]);
        assert_eq!(coordinator.passes(), 1);
        assert_eq!(coordinator.state(), RunState::Idle);
    }

    #[test]
    fn test_watch_selectors_follow_declared_attributes() {
        struct Feed;

        impl BehaviorModule for Feed {
            fn attributes(&self) -> &[&'static str] {
                &["feed-channel"]
            }

            fn apply(&mut self, _cx: &mut ModuleContext<'_>, _scope: NodeId) -> Result<(), ModuleError> {
                Ok(())
            }
        }

        let mut coordinator = Coordinator::new(Config::default());
        coordinator.register("count", Counting(0)).unwrap();
        coordinator.register("feed", Feed).unwrap();
        let css: Vec<String> = coordinator.watched.iter().map(BehaviorSelector::css).collect();
        assert_eq!(css, vec!["[bb-count], [data-bb-count]", "[bb-feed-channel], [data-bb-feed-channel]"]);

        assert!(coordinator.register("feed", Feed).is_err());
        assert_eq!(coordinator.watched.len(), 2);
    }
}
