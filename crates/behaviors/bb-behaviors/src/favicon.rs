//! Dynamic favicon
//!
//! Elements declaring `bb-favicon` (and optionally `bb-favicon-dark`)
//! replace the page icon. The last declaration wins. With both URLs the
//! icon follows `prefers-color-scheme` through media-qualified links.

use bb_core::{BehaviorModule, ModuleCapabilities, ModuleContext, ModuleError};
use bb_dom::{DomTree, NodeId};

pub const NAME: &str = "favicon";
const DARK: &str = "favicon-dark";

const LIGHT_MEDIA: &str = "(prefers-color-scheme: light)";
const DARK_MEDIA: &str = "(prefers-color-scheme: dark)";

#[derive(Debug, Default)]
pub struct FaviconModule {
    /// `href` of the page icon before the first change
    original: Option<String>,
}

impl FaviconModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn original(&self) -> Option<&str> {
        self.original.as_deref()
    }

    /// Append a cache-busting `v` query parameter
    pub fn cache_busted(url: &str, epoch_ms: i64) -> String {
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{url}{separator}v={epoch_ms}")
    }

    fn icon_links(tree: &DomTree, head: NodeId) -> Vec<NodeId> {
        tree.descendants(head)
            .filter(|&id| {
                tree.tag_name(id) == Some("link")
                    && tree
                        .get_attribute(id, "rel")
                        .is_some_and(|rel| rel.split_ascii_whitespace().any(|r| r.eq_ignore_ascii_case("icon")))
            })
            .collect()
    }

    /// Existing `rel="icon"` / `rel="shortcut icon"` link, or a new one
    fn icon_link(tree: &mut DomTree, head: NodeId) -> Result<NodeId, ModuleError> {
        if let Some(existing) = Self::icon_links(tree, head).into_iter().next() {
            return Ok(existing);
        }
        let link = tree.create_element("link");
        tree.set_attribute(link, "rel", "icon")?;
        tree.append_child(head, link)?;
        Ok(link)
    }

    fn set_single(tree: &mut DomTree, head: NodeId, href: &str) -> Result<(), ModuleError> {
        let link = Self::icon_link(tree, head)?;
        tree.set_attribute(link, "href", href)?;
        tree.remove_attribute(link, "media")?;
        Ok(())
    }

    fn set_scheme_pair(tree: &mut DomTree, head: NodeId, light: &str, dark: &str) -> Result<(), ModuleError> {
        let mut links = Self::icon_links(tree, head);
        while links.len() < 2 {
            let link = tree.create_element("link");
            tree.set_attribute(link, "rel", "icon")?;
            tree.append_child(head, link)?;
            links.push(link);
        }
        for (link, (href, media)) in links.iter().zip([(light, LIGHT_MEDIA), (dark, DARK_MEDIA)]) {
            tree.set_attribute(*link, "href", href)?;
            tree.set_attribute(*link, "media", media)?;
        }
        Ok(())
    }
}

impl BehaviorModule for FaviconModule {
    fn capabilities(&self) -> ModuleCapabilities {
        ModuleCapabilities::DETECT
    }

    fn attributes(&self) -> &[&'static str] {
        &[NAME, DARK]
    }

    fn detect(&self, cx: &ModuleContext<'_>, scope: NodeId) -> bool {
        [NAME, DARK]
            .into_iter()
            .filter_map(|name| cx.behavior(name).ok())
            .any(|sel| cx.has_targets(scope, &sel))
    }

    fn apply(&mut self, cx: &mut ModuleContext<'_>, scope: NodeId) -> Result<(), ModuleError> {
        let light_sel = cx.behavior(NAME)?;
        let dark_sel = cx.behavior(DARK)?;

        let mut declaring: Vec<NodeId> = cx.targets(scope, &light_sel);
        for element in cx.targets(scope, &dark_sel) {
            if !declaring.contains(&element) {
                declaring.push(element);
            }
        }
        declaring.sort_unstable();

        let mut light = None;
        let mut dark = None;
        for element in declaring {
            if !cx.try_claim(element) {
                continue;
            }
            let tree = cx.tree();
            if let Some(url) = light_sel.value(tree, element).map(str::trim).filter(|u| !u.is_empty()) {
                light = Some(url.to_string());
            }
            if let Some(url) = dark_sel.value(tree, element).map(str::trim).filter(|u| !u.is_empty()) {
                dark = Some(url.to_string());
            }
        }
        let Some(light) = light else {
            return Ok(());
        };

        let head = cx.document().head_or_root();
        if self.original.is_none() {
            self.original = Self::icon_links(cx.tree(), head)
                .first()
                .and_then(|&link| cx.tree().get_attribute(link, "href"))
                .map(str::to_string);
        }

        let stamp = cx.clock().now().timestamp_millis();
        let light = Self::cache_busted(&light, stamp);
        match dark {
            Some(dark) => {
                let dark = Self::cache_busted(&dark, stamp);
                Self::set_scheme_pair(cx.tree_mut(), head, &light, &dark)?;
                tracing::debug!("favicon: light {} / dark {}", light, dark);
            }
            None => {
                Self::set_single(cx.tree_mut(), head, &light)?;
                tracing::debug!("favicon: {}", light);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_busted() {
        assert_eq!(FaviconModule::cache_busted("/icon.png", 42), "/icon.png?v=42");
        assert_eq!(FaviconModule::cache_busted("/icon.png?size=32", 42), "/icon.png?size=32&v=42");
    }
}
