//! Infinite marquee
//!
//! `bb-marquee` rebuilds the element as container > scroller > four copies
//! of its content. The animation needs the content size, so an element
//! whose content measures empty is left pending and finished on a retry.

use std::fmt;
use std::str::FromStr;

use bb_core::{BehaviorModule, ModuleCapabilities, ModuleContext, ModuleError};
use bb_dom::{DOMRect, DomTree, NodeId};

pub const NAME: &str = "marquee";

/// Content copies in the scroller, the original included
pub const COPIES: usize = 4;

/// Vertical content shorter than this is treated as not laid out yet
const MIN_VERTICAL_HEIGHT: f64 = 50.0;
const FRAMES_PER_SECOND: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Scroll direction. `Left`/`Right` apply horizontally, `Top`/`Bottom`
/// vertically; anything but `Right`/`Bottom` scrolls the default way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Top,
    Bottom,
}

impl Direction {
    fn is_reversed(self) -> bool {
        matches!(self, Self::Right | Self::Bottom)
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "top" | "up" => Ok(Self::Top),
            "bottom" | "down" => Ok(Self::Bottom),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        })
    }
}

/// Parameters read from `bb-marquee-*`
#[derive(Debug, Clone, PartialEq)]
pub struct MarqueeOptions {
    /// Pixels per second
    pub speed: f64,
    pub direction: Direction,
    pub pause_on_hover: bool,
    /// Pixels between copies
    pub gap: f64,
    pub orientation: Orientation,
    /// Viewport height for vertical marquees, in pixels
    pub height: f64,
}

impl Default for MarqueeOptions {
    fn default() -> Self {
        Self {
            speed: 100.0,
            direction: Direction::Left,
            pause_on_hover: true,
            gap: 50.0,
            orientation: Orientation::Horizontal,
            height: 300.0,
        }
    }
}

impl MarqueeOptions {
    pub fn read(cx: &ModuleContext<'_>, element: NodeId) -> Self {
        let grammar = cx.grammar();
        let tree = cx.tree();
        let param = |name: &str| {
            grammar
                .read(tree, element, &format!("{NAME}-{name}"))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };
        let number = |name: &str| param(name).and_then(|v| v.trim_end_matches("px").parse::<f64>().ok());

        let defaults = Self::default();
        Self {
            speed: number("speed").filter(|s| s.is_finite() && *s > 0.0).unwrap_or(defaults.speed),
            direction: param("direction").and_then(|d| d.parse().ok()).unwrap_or(defaults.direction),
            pause_on_hover: param("pause").is_none_or(|p| !p.eq_ignore_ascii_case("false")),
            gap: number("gap").filter(|g| g.is_finite() && *g >= 0.0).unwrap_or(defaults.gap),
            orientation: match param("orientation") {
                Some(o) if o.eq_ignore_ascii_case("vertical") => Orientation::Vertical,
                _ => Orientation::Horizontal,
            },
            height: number("height").filter(|h| h.is_finite() && *h > 0.0).unwrap_or(defaults.height),
        }
    }

    pub fn is_vertical(&self) -> bool {
        self.orientation == Orientation::Vertical
    }

    /// Measured content size along the scroll axis, if ready to animate
    pub fn content_size(&self, rect: DOMRect) -> Option<f64> {
        if self.is_vertical() {
            (rect.height >= MIN_VERTICAL_HEIGHT).then_some(rect.height)
        } else {
            (rect.width > 0.0).then_some(rect.width)
        }
    }

    /// Scroller length for `content` sized copies
    pub fn total_size(&self, content: f64) -> f64 {
        content * COPIES as f64 + self.gap * (COPIES - 1) as f64
    }

    /// Horizontal animation duration in seconds, two decimals
    pub fn duration(&self, total: f64) -> String {
        format!("{:.2}", total / (self.speed * 1.5))
    }

    /// Vertical pixels per frame
    pub fn step(&self) -> f64 {
        self.speed * 2.0 / FRAMES_PER_SECOND
    }

    fn axis_styles(&self) -> (&'static str, &'static str) {
        if self.is_vertical() {
            ("flex-direction: column; ", "")
        } else {
            ("", "white-space: nowrap; ")
        }
    }

    fn container_style(&self) -> String {
        let (height, min_height) = if self.is_vertical() {
            (format!("{}px", self.height), "100px")
        } else {
            ("auto".to_string(), "50px")
        };
        format!("position: relative; width: 100%; height: {height}; overflow: hidden; min-height: {min_height};")
    }

    fn scroller_style(&self) -> String {
        let (column, nowrap) = self.axis_styles();
        format!(
            "position: absolute; will-change: transform; height: 100%; top: 0px; left: 0px; display: flex; \
             {column}align-items: center; gap: {}px; {nowrap}flex-shrink: 0;",
            self.gap
        )
    }

    fn block_style(&self) -> String {
        let (column, nowrap) = self.axis_styles();
        let min_height = if self.is_vertical() { " min-height: 100px;" } else { "" };
        format!(
            "display: flex; {column}align-items: center; gap: {}px; {nowrap}flex-shrink: 0;{min_height}",
            self.gap
        )
    }
}

/// `@keyframes` rule moving one copy plus a gap
pub fn keyframes(name: &str, distance: f64, direction: Direction) -> String {
    let (from, to) = if direction.is_reversed() {
        (format!("-{distance}px"), "0px".to_string())
    } else {
        ("0px".to_string(), format!("-{distance}px"))
    };
    format!(
        "@keyframes {name} {{ 0% {{ transform: translate3d({from}, 0px, 0px); }} \
         100% {{ transform: translate3d({to}, 0px, 0px); }} }}"
    )
}

#[derive(Debug, Default)]
pub struct MarqueeModule;

impl MarqueeModule {
    pub fn new() -> Self {
        Self
    }

    /// Move the content into the scroller structure. Returns the scroller.
    fn build(tree: &mut DomTree, element: NodeId, options: &MarqueeOptions) -> Result<NodeId, ModuleError> {
        let block = tree.create_element("div");
        tree.set_attribute(block, "style", &options.block_style())?;
        let content: Vec<NodeId> = tree.children(element).map(|(id, _)| id).collect();
        for child in content {
            tree.append_child(block, child)?;
        }

        let scroller = tree.create_element("div");
        tree.set_attribute(scroller, "style", &options.scroller_style())?;
        tree.append_child(scroller, block)?;
        for _ in 1..COPIES {
            let copy = tree.clone_subtree(block)?;
            tree.append_child(scroller, copy)?;
        }

        let container = tree.create_element("div");
        tree.set_attribute(container, "style", &options.container_style())?;
        tree.append_child(container, scroller)?;
        tree.append_child(element, container)?;
        Ok(scroller)
    }

    /// Scroller and first content block of an already built element
    fn parts(tree: &DomTree, element: NodeId) -> Option<(NodeId, NodeId)> {
        let container = tree.element_children(element).next()?;
        let scroller = tree.element_children(container).next()?;
        let block = tree.element_children(scroller).next()?;
        Some((scroller, block))
    }

    /// Start the animation once the content has a size.
    /// Returns false while the content still measures empty.
    fn finish(cx: &mut ModuleContext<'_>, element: NodeId, options: &MarqueeOptions) -> Result<bool, ModuleError> {
        let Some((scroller, block)) = Self::parts(cx.tree(), element) else {
            return Ok(true);
        };
        let rect = cx.layout().measure(cx.tree(), block);
        let Some(content) = options.content_size(rect) else {
            tracing::debug!("marquee: {} not ready ({}x{})", element, rect.width, rect.height);
            return Ok(false);
        };

        let prefix = cx.grammar().prefix();
        let total = options.total_size(content);
        let distance = content + options.gap;

        if options.is_vertical() {
            let tree = cx.tree_mut();
            if let Some(elem) = tree.element_mut(scroller) {
                elem.push_style("height", &format!("{total}px"));
            }
            tree.set_attribute(scroller, &format!("data-{prefix}marquee-step"), &format!("{:.2}", options.step()))?;
            tree.set_attribute(scroller, &format!("data-{prefix}marquee-distance"), &distance.to_string())?;
            tree.set_attribute(scroller, &format!("data-{prefix}marquee-direction"), &options.direction.to_string())?;
            tracing::debug!("marquee: vertical {} content {}px total {}px", element, content, total);
        } else {
            let name = format!("{prefix}scroll-{}", element.index());
            let duration = options.duration(total);
            let head = cx.document().head_or_root();
            let tree = cx.tree_mut();

            let style = tree.create_element("style");
            tree.set_text_content(style, &keyframes(&name, distance, options.direction))?;
            tree.append_child(head, style)?;

            if let Some(elem) = tree.element_mut(scroller) {
                elem.push_style("width", &format!("{total}px"));
                elem.push_style("animation", &format!("{name} {duration}s linear infinite"));
            }
            tracing::debug!("marquee: {} {}s content {}px total {}px", name, duration, content, total);
        }

        if options.pause_on_hover {
            if let Some(elem) = cx.tree_mut().element_mut(element) {
                elem.add_listener("mouseenter", &format!("{prefix}{NAME}:pause"));
                elem.add_listener("mouseleave", &format!("{prefix}{NAME}:resume"));
            }
        }
        Ok(true)
    }
}

impl BehaviorModule for MarqueeModule {
    fn capabilities(&self) -> ModuleCapabilities {
        ModuleCapabilities::DETECT | ModuleCapabilities::UNFINISHED_WORK
    }

    fn detect(&self, cx: &ModuleContext<'_>, scope: NodeId) -> bool {
        cx.behavior(NAME).is_ok_and(|sel| cx.has_targets(scope, &sel)) || !cx.pending(scope).is_empty()
    }

    fn apply(&mut self, cx: &mut ModuleContext<'_>, scope: NodeId) -> Result<(), ModuleError> {
        for element in cx.pending(scope) {
            let options = MarqueeOptions::read(cx, element);
            if Self::finish(cx, element, &options)? {
                cx.set_pending(element, false);
            }
        }

        let selector = cx.behavior(NAME)?;
        for element in cx.targets(scope, &selector) {
            if !cx.try_claim(element) {
                continue;
            }
            let options = MarqueeOptions::read(cx, element);
            Self::build(cx.tree_mut(), element, &options)?;
            if !Self::finish(cx, element, &options)? {
                cx.set_pending(element, true);
            }
        }
        Ok(())
    }

    fn has_unfinished_work(&self, cx: &ModuleContext<'_>, scope: NodeId) -> bool {
        !cx.pending(scope).is_empty()
    }
}
