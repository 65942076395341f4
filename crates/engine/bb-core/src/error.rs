//! Engine errors

use crate::selector::GrammarError;

/// Registration error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Module `{0}` is already registered")]
    Duplicate(String),

    #[error("Invalid module name `{0}`")]
    InvalidName(String),
}

/// Failure inside one module's pass. The coordinator logs it and moves on
/// to the next module.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error(transparent)]
    Dom(#[from] bb_dom::DomError),

    #[error(transparent)]
    Selector(#[from] bb_css::SelectorError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("Remote request failed: {0}")]
    Remote(String),

    #[error("Module panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Other(String),
}

impl ModuleError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
