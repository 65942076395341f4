//! Current year
//!
//! `bb-current-year` sets the element text to the calendar year, through
//! `format` (with `{year}`) or `prefix`/`suffix` when given.

use bb_core::{BehaviorModule, ModuleCapabilities, ModuleContext, ModuleError};
use bb_dom::NodeId;

pub const NAME: &str = "current-year";

#[derive(Debug, Default)]
pub struct CurrentYearModule;

impl CurrentYearModule {
    pub fn new() -> Self {
        Self
    }

    /// Text for `year` given the element's parameters
    pub fn render(year: i32, format: Option<&str>, prefix: Option<&str>, suffix: Option<&str>) -> String {
        let year = year.to_string();
        if let Some(format) = format.filter(|f| f.contains("{year}")) {
            return format.replacen("{year}", &year, 1);
        }
        let (prefix, suffix) = (prefix.unwrap_or_default(), suffix.unwrap_or_default());
        if prefix.is_empty() && suffix.is_empty() {
            year
        } else {
            format!("{prefix}{year}{suffix}")
        }
    }
}

impl BehaviorModule for CurrentYearModule {
    fn capabilities(&self) -> ModuleCapabilities {
        ModuleCapabilities::DETECT
    }

    fn detect(&self, cx: &ModuleContext<'_>, scope: NodeId) -> bool {
        cx.behavior(NAME).is_ok_and(|sel| cx.has_targets(scope, &sel))
    }

    fn apply(&mut self, cx: &mut ModuleContext<'_>, scope: NodeId) -> Result<(), ModuleError> {
        let selector = cx.behavior(NAME)?;
        let year = cx.clock().year();
        let targets = cx.targets(scope, &selector);
        for &element in &targets {
            if !cx.try_claim(element) {
                continue;
            }
            let tree = cx.tree();
            let text = Self::render(
                year,
                selector.param(tree, element, "format"),
                selector.param(tree, element, "prefix"),
                selector.param(tree, element, "suffix"),
            );
            cx.tree_mut().set_text_content(element, &text)?;
        }
        tracing::debug!("current-year: {} elements", targets.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        assert_eq!(CurrentYearModule::render(2025, None, None, None), "2025");
        assert_eq!(CurrentYearModule::render(2025, Some("© {year} Acme"), Some("x"), None), "© 2025 Acme");
        assert_eq!(CurrentYearModule::render(2025, Some("no token"), None, Some(" ·")), "2025 ·");
        assert_eq!(CurrentYearModule::render(2025, None, Some("(c) "), None), "(c) 2025");
    }
}
