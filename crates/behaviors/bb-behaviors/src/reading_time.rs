//! Reading time
//!
//! `bb-reading-time` writes an estimated reading time for its own text,
//! or for the element named by the `target` selector.

use std::sync::LazyLock;

use regex::Regex;

use bb_core::{BehaviorModule, ModuleCapabilities, ModuleContext, ModuleError};
use bb_css::{parse_selector_list, query_selector};
use bb_dom::{DomTree, NodeId};

pub const NAME: &str = "reading-time";

const DEFAULT_WORDS_PER_MINUTE: f64 = 230.0;
const DEFAULT_SECONDS_PER_IMAGE: f64 = 12.0;
const DEFAULT_FORMAT: &str = "{minutes} min";

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").expect("word regex is valid"));

/// Reading speed parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingSpeed {
    pub words_per_minute: f64,
    pub seconds_per_image: f64,
}

impl Default for ReadingSpeed {
    fn default() -> Self {
        Self {
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            seconds_per_image: DEFAULT_SECONDS_PER_IMAGE,
        }
    }
}

impl ReadingSpeed {
    /// Parse attribute values, keeping defaults for anything not positive
    pub fn from_params(speed: Option<&str>, image_speed: Option<&str>) -> Self {
        let positive = |v: Option<&str>| {
            v.and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|n| n.is_finite() && *n > 0.0)
        };
        let defaults = Self::default();
        Self {
            words_per_minute: positive(speed).unwrap_or(defaults.words_per_minute),
            seconds_per_image: positive(image_speed).unwrap_or(defaults.seconds_per_image),
        }
    }

    /// Whole minutes, at least 1 when there is any content, 0 when none
    pub fn minutes(&self, words: usize, images: usize) -> u64 {
        if words == 0 && images == 0 {
            return 0;
        }
        let minutes = words as f64 / self.words_per_minute + images as f64 * self.seconds_per_image / 60.0;
        (minutes.ceil() as u64).max(1)
    }
}

pub fn count_words(text: &str) -> usize {
    WORD.find_iter(text).count()
}

pub fn count_images(tree: &DomTree, root: NodeId) -> usize {
    tree.descendants(root)
        .filter(|&id| tree.tag_name(id) == Some("img"))
        .count()
}

#[derive(Debug, Default)]
pub struct ReadingTimeModule;

impl ReadingTimeModule {
    pub fn new() -> Self {
        Self
    }

    /// Node whose content is measured: the first `target` match in the
    /// document, else the element itself
    fn source(tree: &DomTree, element: NodeId, target: Option<&str>) -> NodeId {
        let Some(target) = target.map(str::trim).filter(|t| !t.is_empty()) else {
            return element;
        };
        match parse_selector_list(target) {
            Ok(list) => query_selector(tree, tree.root(), &list).unwrap_or(element),
            Err(err) => {
                tracing::warn!("reading-time: ignoring target: {}", err);
                element
            }
        }
    }
}

impl BehaviorModule for ReadingTimeModule {
    fn capabilities(&self) -> ModuleCapabilities {
        ModuleCapabilities::DETECT
    }

    fn detect(&self, cx: &ModuleContext<'_>, scope: NodeId) -> bool {
        cx.behavior(NAME).is_ok_and(|sel| cx.has_targets(scope, &sel))
    }

    fn apply(&mut self, cx: &mut ModuleContext<'_>, scope: NodeId) -> Result<(), ModuleError> {
        let selector = cx.behavior(NAME)?;
        for element in cx.targets(scope, &selector) {
            if !cx.try_claim(element) {
                continue;
            }
            let tree = cx.tree();
            let speed = ReadingSpeed::from_params(
                selector.param(tree, element, "speed"),
                selector.param(tree, element, "image-speed"),
            );
            let format = selector
                .param(tree, element, "format")
                .filter(|f| !f.is_empty())
                .unwrap_or(DEFAULT_FORMAT)
                .to_string();
            let source = Self::source(tree, element, selector.param(tree, element, "target"));

            let text = tree.text_content(source);
            let words = count_words(text.trim());
            let images = count_images(tree, source);
            let minutes = speed.minutes(words, images);

            tracing::trace!("reading-time: {} words, {} images -> {} min", words, images, minutes);
            let output = format.replacen("{minutes}", &minutes.to_string(), 1);
            cx.tree_mut().set_text_content(element, &output)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("Hello, world! It's 2025."), 5);
        assert_eq!(count_words("   "), 0);
    }

    #[test]
    fn test_minutes() {
        let speed = ReadingSpeed::default();
        assert_eq!(speed.minutes(0, 0), 0);
        assert_eq!(speed.minutes(10, 0), 1);
        assert_eq!(speed.minutes(460, 0), 2);
        assert_eq!(speed.minutes(461, 0), 3);
        assert_eq!(speed.minutes(230, 5), 2);
    }

    #[test]
    fn test_speed_params() {
        let speed = ReadingSpeed::from_params(Some("100"), Some("-3"));
        assert_eq!(speed.words_per_minute, 100.0);
        assert_eq!(speed.seconds_per_image, DEFAULT_SECONDS_PER_IMAGE);
        assert_eq!(ReadingSpeed::from_params(Some("fast"), None), ReadingSpeed::default());
    }
}
