//! Share buttons
//!
//! `bb-share="<network>"` turns an element into a share control. The page
//! URL and title are the defaults; `bb-url` / `bb-text` (or the
//! `bb-share-url` / `bb-share-text` parameter spelling) override them.

use std::fmt;
use std::str::FromStr;

use bb_core::{AttributeGrammar, BehaviorModule, ModuleCapabilities, ModuleContext, ModuleError};
use bb_dom::{Document, NodeId};

pub const NAME: &str = "share";

const POPUP_WIDTH: u32 = 600;
const POPUP_HEIGHT: u32 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Twitter,
    Facebook,
    Linkedin,
    Whatsapp,
    Telegram,
    Email,
    Copy,
    Native,
}

impl Network {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::Facebook => "facebook",
            Self::Linkedin => "linkedin",
            Self::Whatsapp => "whatsapp",
            Self::Telegram => "telegram",
            Self::Email => "email",
            Self::Copy => "copy",
            Self::Native => "native",
        }
    }

    /// Opens a share window rather than acting in-page
    pub fn is_popup(self) -> bool {
        !matches!(self, Self::Copy | Self::Native)
    }

    /// Share target URL for popup networks
    pub fn share_url(self, data: &ShareData) -> Option<String> {
        let url = encode_uri_component(&data.url);
        let text = encode_uri_component(&data.text);
        let target = match self {
            Self::Twitter => format!("https://twitter.com/intent/tweet?url={url}&text={text}"),
            Self::Facebook => format!("https://facebook.com/sharer/sharer.php?u={url}"),
            Self::Linkedin => format!("https://www.linkedin.com/sharing/share-offsite/?url={url}"),
            Self::Whatsapp => format!(
                "https://wa.me/?text={}",
                encode_uri_component(&format!("{} {}", data.text, data.url))
            ),
            Self::Telegram => format!("https://t.me/share/url?url={url}&text={text}"),
            Self::Email => format!(
                "mailto:?subject={text}&body={}",
                encode_uri_component(&format!("{} {}", data.text, data.url))
            ),
            Self::Copy | Self::Native => return None,
        };
        Some(target)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported share network `{0}`")]
pub struct UnknownNetwork(pub String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "twitter" | "x" => Ok(Self::Twitter),
            "facebook" => Ok(Self::Facebook),
            "linkedin" => Ok(Self::Linkedin),
            "whatsapp" => Ok(Self::Whatsapp),
            "telegram" => Ok(Self::Telegram),
            "email" | "mail" => Ok(Self::Email),
            "copy" => Ok(Self::Copy),
            "native" => Ok(Self::Native),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}

/// What gets shared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareData {
    pub url: String,
    pub text: String,
}

impl ShareData {
    /// Resolve the element's URL and text, falling back to the page URL,
    /// the page title, then `default_text`
    pub fn resolve(document: &Document, grammar: &AttributeGrammar, element: NodeId, default_text: &str) -> Self {
        let tree = document.tree();
        let read = |name: &str| {
            grammar
                .read(tree, element, &format!("{NAME}-{name}"))
                .or_else(|| grammar.read(tree, element, name))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let url = read("url")
            .filter(|u| url::Url::parse(u).is_ok())
            .unwrap_or(document.url())
            .to_string();

        let title = document.title();
        let text = read("text")
            .map(str::to_string)
            .or_else(|| (!title.is_empty()).then_some(title))
            .unwrap_or_else(|| default_text.to_string());

        Self { url, text }
    }
}

/// What the host does when the control is activated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareAction {
    /// Open `url` in a 600x400 window
    Popup { url: String },
    /// Copy text to the clipboard without feedback
    Copy { text: String },
    /// Web Share API, falling back to a copy with feedback
    Native { title: String, url: String },
}

impl ShareAction {
    /// `window.open` features, centered in the given viewport
    pub fn popup_features(viewport_width: f64, viewport_height: f64) -> String {
        let left = (viewport_width - f64::from(POPUP_WIDTH)) / 2.0;
        let top = (viewport_height - f64::from(POPUP_HEIGHT)) / 2.0;
        format!("width={POPUP_WIDTH},height={POPUP_HEIGHT},left={left},top={top},noopener,noreferrer")
    }
}

#[derive(Debug, Default)]
pub struct ShareModule;

impl ShareModule {
    pub fn new() -> Self {
        Self
    }

    /// Host-side action for an activated control
    pub fn action(network: Network, data: &ShareData) -> ShareAction {
        match network {
            Network::Copy => ShareAction::Copy { text: data.url.clone() },
            Network::Native => ShareAction::Native {
                title: data.text.clone(),
                url: data.url.clone(),
            },
            popup => ShareAction::Popup {
                url: popup.share_url(data).unwrap_or_else(|| data.url.clone()),
            },
        }
    }

    fn bind(cx: &mut ModuleContext<'_>, element: NodeId, network: Network, data: &ShareData) -> Result<(), ModuleError> {
        let handler = format!("{}{}:{}", cx.grammar().prefix(), NAME, network);
        let tree = cx.tree_mut();
        let tag = tree.tag_name(element).unwrap_or_default().to_string();

        if tag == "a" {
            if let Some(target) = network.share_url(data) {
                tree.set_attribute(element, "href", &target)?;
                if network != Network::Email {
                    tree.set_attribute(element, "target", "_blank")?;
                    tree.set_attribute(element, "rel", "noopener noreferrer")?;
                }
            }
        }

        let Some(elem) = tree.element_mut(element) else {
            return Ok(());
        };
        if tag != "a" && tag != "button" {
            elem.set_attr("role", "button");
            elem.set_attr("tabindex", "0");
            elem.add_listener("keydown", &handler);
        }
        elem.add_listener("click", &handler);
        elem.push_style("cursor", "pointer");
        Ok(())
    }
}

impl BehaviorModule for ShareModule {
    fn capabilities(&self) -> ModuleCapabilities {
        ModuleCapabilities::DETECT
    }

    fn detect(&self, cx: &ModuleContext<'_>, scope: NodeId) -> bool {
        cx.behavior(NAME).is_ok_and(|sel| cx.has_targets(scope, &sel))
    }

    fn apply(&mut self, cx: &mut ModuleContext<'_>, scope: NodeId) -> Result<(), ModuleError> {
        let selector = cx.behavior(NAME)?;
        let mut bound = 0;
        for element in cx.targets(scope, &selector) {
            if !cx.try_claim(element) {
                continue;
            }
            let raw = selector.value(cx.tree(), element).unwrap_or_default().to_string();
            let network = match raw.parse::<Network>() {
                Ok(network) => network,
                Err(err) => {
                    tracing::error!("{}", err);
                    continue;
                }
            };
            let data = ShareData::resolve(cx.document(), cx.grammar(), element, &cx.i18n().share_default_text);
            Self::bind(cx, element, network, &data)?;
            bound += 1;
        }
        tracing::debug!("share: {} elements bound", bound);
        Ok(())
    }
}

/// Percent-encode like `encodeURIComponent`
pub fn encode_uri_component(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 3);

    for c in s.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')' => {
                result.push(c);
            }
            _ => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).as_bytes() {
                    result.push_str(&format!("%{:02X}", byte));
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> ShareData {
        ShareData {
            url: "https://example.com/a b?x=1&y=2".to_string(),
            text: "Hello, world".to_string(),
        }
    }

    #[test]
    fn test_encode_uri_component() {
        assert_eq!(encode_uri_component("a b&c/d"), "a%20b%26c%2Fd");
        assert_eq!(encode_uri_component("it's (ok)!"), "it's%20(ok)!");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }

    #[test]
    fn test_network_urls() {
        let data = data();
        assert_eq!(
            Network::Twitter.share_url(&data).unwrap(),
            "https://twitter.com/intent/tweet?url=https%3A%2F%2Fexample.com%2Fa%20b%3Fx%3D1%26y%3D2&text=Hello%2C%20world"
        );
        assert_eq!(
            Network::Facebook.share_url(&data).unwrap(),
            "https://facebook.com/sharer/sharer.php?u=https%3A%2F%2Fexample.com%2Fa%20b%3Fx%3D1%26y%3D2"
        );
        assert!(Network::Whatsapp.share_url(&data).unwrap().starts_with("https://wa.me/?text=Hello%2C%20world%20https"));
        assert!(Network::Email.share_url(&data).unwrap().starts_with("mailto:?subject=Hello%2C%20world&body="));
        assert!(Network::Copy.share_url(&data).is_none());
    }

    #[test]
    fn test_parse_network() {
        assert_eq!(" LinkedIn ".parse::<Network>(), Ok(Network::Linkedin));
        assert_eq!("myspace".parse::<Network>(), Err(UnknownNetwork("myspace".into())));
    }

    #[test]
    fn test_actions() {
        let data = data();
        assert_eq!(ShareModule::action(Network::Copy, &data), ShareAction::Copy { text: data.url.clone() });
        assert!(matches!(ShareModule::action(Network::Telegram, &data), ShareAction::Popup { url } if url.starts_with("https://t.me/")));
        assert_eq!(
            ShareAction::popup_features(1200.0, 800.0),
            "width=600,height=400,left=300,top=200,noopener,noreferrer"
        );
    }
}
