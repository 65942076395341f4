//! bb Core
//!
//! Declarative behavior engine: modules registered by name enhance
//! elements that carry `<prefix><behavior>` (or `data-<prefix><behavior>`)
//! attributes. The coordinator runs them in registration order, keeps
//! element ownership exclusive, re-runs after relevant DOM insertions and
//! retries modules with unfinished work.

mod clock;
mod config;
mod coordinator;
mod error;
mod layout;
mod module;
mod ownership;
mod registry;
mod retry;
mod selector;
mod timers;
mod watcher;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, ConfigError, I18n, Timing, VideoFeedConfig};
pub use coordinator::{Coordinator, GLOBAL_NAME, PassReport, RunState};
pub use error::{ModuleError, RegistryError};
pub use layout::{IntrinsicLayout, Layout};
pub use module::{BehaviorModule, ModuleCapabilities, ModuleContext};
pub use ownership::OwnershipGuard;
pub use registry::ModuleRegistry;
pub use retry::RetryScheduler;
pub use selector::{AttributeGrammar, BehaviorSelector, DEFAULT_PREFIX, GrammarError};
pub use timers::{Task, Timer, TimerId, TimerQueue};
pub use watcher::{ChangeWatcher, InsertionBatch};

pub use bb_dom::{Document, NodeId};
