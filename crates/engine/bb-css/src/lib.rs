//! bb CSS - selector engine
//!
//! Enough of Selectors Level 3 for declarative attribute markup: type,
//! id, class and attribute selectors, compounded, with descendant and
//! child combinators, in comma-separated lists.

mod query;
mod selectors;

pub use query::{closest, matches, query_selector, query_selector_all, select};
pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    SelectorComponent, SelectorList, parse_selector_list, parse_simple_selector,
};

/// Selector parse error
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Invalid selector `{selector}`: {reason}")]
    Invalid { selector: String, reason: String },
}
