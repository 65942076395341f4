//! Feed rendering
//!
//! A child carrying `bb-youtube-item` is the per-video template. Inside it,
//! elements marked `bb-youtube-<slot>` receive the video's fields. Without
//! a template each video gets a default card.

use chrono::DateTime;

use bb_core::{AttributeGrammar, ModuleError};
use bb_dom::{DomTree, NodeId};

use super::feed::FeedItem;

const TEMPLATE: &str = "youtube-item";
const SLOTS: [Slot; 6] = [
    Slot::Thumbnail,
    Slot::Title,
    Slot::Description,
    Slot::Date,
    Slot::ChannelTitle,
    Slot::Link,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Thumbnail,
    Title,
    Description,
    Date,
    ChannelTitle,
    Link,
}

impl Slot {
    fn attribute(self) -> &'static str {
        match self {
            Self::Thumbnail => "youtube-thumbnail",
            Self::Title => "youtube-title",
            Self::Description => "youtube-description",
            Self::Date => "youtube-date",
            Self::ChannelTitle => "youtube-channel-title",
            Self::Link => "youtube-link",
        }
    }
}

/// Items to show: shorts dropped unless allowed, capped at `count`
pub fn visible_items(items: &[FeedItem], allow_shorts: bool, count: usize) -> Vec<&FeedItem> {
    items
        .iter()
        .filter(|item| allow_shorts || !item.is_short())
        .take(count)
        .collect()
}

/// Localized publication date. Unparseable input is returned as-is.
pub fn format_date(published_at: &str, language: &str) -> String {
    let Ok(date) = DateTime::parse_from_rfc3339(published_at) else {
        return published_at.to_string();
    };
    let pattern = match language.split(['-', '_']).next().unwrap_or_default() {
        "en" => "%b %-d, %Y",
        "de" => "%d.%m.%Y",
        "ja" | "zh" | "ko" => "%Y/%m/%d",
        _ => "%d/%m/%Y",
    };
    date.format(pattern).to_string()
}

/// Replace `element`'s content with the rendered items
pub fn render(
    tree: &mut DomTree,
    grammar: &AttributeGrammar,
    element: NodeId,
    items: &[&FeedItem],
    language: &str,
) -> Result<(), ModuleError> {
    let template = tree
        .descendants(element)
        .find(|&id| tree.is_element(id) && grammar.has(tree, id, TEMPLATE));
    if let Some(template) = template {
        tree.detach(template);
    }
    tree.remove_children(element);
    let (bare, data) = grammar.attribute_names(TEMPLATE)?;

    for item in items {
        let card = match template {
            Some(template) => {
                let card = tree.clone_subtree(template)?;
                tree.remove_attribute(card, &bare)?;
                tree.remove_attribute(card, &data)?;
                fill_slots(tree, grammar, card, item, language)?;
                card
            }
            None => default_card(tree, grammar.prefix(), item, language)?,
        };
        tree.append_child(element, card)?;
    }
    Ok(())
}

fn fill_slots(
    tree: &mut DomTree,
    grammar: &AttributeGrammar,
    card: NodeId,
    item: &FeedItem,
    language: &str,
) -> Result<(), ModuleError> {
    let nodes: Vec<NodeId> = std::iter::once(card).chain(tree.descendants(card)).collect();
    for node in nodes {
        if !tree.is_element(node) {
            continue;
        }
        for slot in SLOTS {
            if grammar.has(tree, node, slot.attribute()) {
                fill(tree, node, slot, item, language)?;
            }
        }
    }
    Ok(())
}

fn fill(tree: &mut DomTree, node: NodeId, slot: Slot, item: &FeedItem, language: &str) -> Result<(), ModuleError> {
    let snippet = &item.snippet;
    match slot {
        Slot::Thumbnail => {
            let Some(src) = snippet.thumbnails.best() else {
                return Ok(());
            };
            if tree.tag_name(node) == Some("img") {
                tree.set_attribute(node, "src", src)?;
                tree.set_attribute(node, "alt", &snippet.title)?;
            } else if let Some(elem) = tree.element_mut(node) {
                elem.push_style("background-image", &format!("url(\"{src}\")"));
            }
        }
        Slot::Title => tree.set_text_content(node, &snippet.title)?,
        Slot::Description => tree.set_text_content(node, &snippet.description)?,
        Slot::Date => tree.set_text_content(node, &format_date(&snippet.published_at, language))?,
        Slot::ChannelTitle => tree.set_text_content(node, &snippet.channel_title)?,
        Slot::Link => {
            tree.set_attribute(node, "href", &item.watch_url())?;
            tree.set_attribute(node, "target", "_blank")?;
            tree.set_attribute(node, "rel", "noopener noreferrer")?;
        }
    }
    Ok(())
}

/// `<div class="bb-youtube-video"><a><img></a><h3/><p/></div>`
fn default_card(tree: &mut DomTree, prefix: &str, item: &FeedItem, language: &str) -> Result<NodeId, ModuleError> {
    let card = tree.create_element("div");
    tree.set_attribute(card, "class", &format!("{prefix}youtube-video"))?;

    let link = tree.create_element("a");
    fill(tree, link, Slot::Link, item, language)?;
    tree.append_child(card, link)?;
    if item.snippet.thumbnails.best().is_some() {
        let img = tree.create_element("img");
        fill(tree, img, Slot::Thumbnail, item, language)?;
        tree.set_attribute(img, "loading", "lazy")?;
        tree.append_child(link, img)?;
    }

    let title = tree.create_element("h3");
    tree.set_attribute(title, "class", &format!("{prefix}youtube-title"))?;
    fill(tree, title, Slot::Title, item, language)?;
    tree.append_child(card, title)?;

    let date = tree.create_element("p");
    tree.set_attribute(date, "class", &format!("{prefix}youtube-date"))?;
    fill(tree, date, Slot::Date, item, language)?;
    tree.append_child(card, date)?;

    Ok(card)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-03-04T10:00:00Z", "en"), "Mar 4, 2025");
        assert_eq!(format_date("2025-03-04T10:00:00Z", "fr"), "04/03/2025");
        assert_eq!(format_date("2025-03-04T10:00:00Z", "de-AT"), "04.03.2025");
        assert_eq!(format_date("yesterday", "en"), "yesterday");
    }
}
