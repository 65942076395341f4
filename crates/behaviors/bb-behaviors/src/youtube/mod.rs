//! Video feed
//!
//! `bb-youtube-channel="<channel id>"` fills the element with the channel's
//! latest videos, fetched from the configured proxy endpoint.
//! Parameters: `video-count` (6), `allow-shorts` (false), `language` (en).

mod cache;
mod feed;
mod render;

pub use cache::{CacheEntry, CacheResult, FeedCache};
pub use feed::{
    FeedError, FeedErrorBody, FeedItem, FeedRequest, FeedResponse, FeedTransport, HttpTransport, Snippet,
    Thumbnail, Thumbnails, VideoId, decode,
};
pub use render::{format_date, visible_items};

use chrono::{DateTime, Duration, Utc};

use bb_core::{BehaviorModule, ModuleCapabilities, ModuleContext, ModuleError, VideoFeedConfig};
use bb_dom::NodeId;

pub const NAME: &str = "youtube";
const CHANNEL: &str = "youtube-channel";

const DEFAULT_COUNT: u32 = 6;
const MAX_COUNT: u32 = 50;
const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_TTL_HOURS: i64 = 24;

pub struct YoutubeModule {
    transport: Box<dyn FeedTransport>,
    cache: FeedCache,
}

impl YoutubeModule {
    pub fn new(transport: impl FeedTransport + 'static, cache: FeedCache) -> Self {
        Self {
            transport: Box::new(transport),
            cache,
        }
    }

    /// HTTP transport and a cache set up from `config`
    pub fn from_config(config: &VideoFeedConfig) -> Result<Self, FeedError> {
        let ttl = cache_ttl(config.cache_ttl_hours);
        let cache = match &config.cache_file {
            Some(path) => FeedCache::persistent(path, ttl),
            None => FeedCache::new(ttl),
        };
        Ok(Self::new(HttpTransport::new()?, cache))
    }

    pub fn cache(&self) -> &FeedCache {
        &self.cache
    }

    /// Request parameters declared on `element`
    pub fn request(cx: &ModuleContext<'_>, element: NodeId, channel_id: &str) -> FeedRequest {
        let grammar = cx.grammar();
        let tree = cx.tree();
        let param = |name: &str| {
            grammar
                .read(tree, element, &format!("{NAME}-{name}"))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let count = param("video-count")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|&n| n > 0)
            .map_or(DEFAULT_COUNT, |n| n.min(MAX_COUNT));
        let allow_shorts = param("allow-shorts").is_some_and(|v| v.eq_ignore_ascii_case("true"));
        let language = param("language").unwrap_or(DEFAULT_LANGUAGE).to_ascii_lowercase();

        FeedRequest {
            channel_id: channel_id.to_string(),
            count,
            allow_shorts,
            language,
        }
    }

    /// Fresh cache entry, else the network, else a stale cache entry
    pub fn load(&mut self, endpoint: &str, request: &FeedRequest, now: DateTime<Utc>) -> Result<FeedResponse, FeedError> {
        let stale = match self.cache.get(request, now) {
            CacheResult::Fresh(feed) => {
                tracing::debug!("youtube: cache hit for {}", request.channel_id);
                return Ok(feed.clone());
            }
            CacheResult::Stale(feed) => Some(feed.clone()),
            CacheResult::Miss => None,
        };

        let fetched = request.url(endpoint).and_then(|url| self.transport.fetch(&url));
        match (fetched, stale) {
            (Ok(feed), _) => {
                self.cache.put(request, feed.clone(), now);
                Ok(feed)
            }
            (Err(err), Some(feed)) => {
                tracing::warn!("youtube: refresh failed, using stale cache: {}", err);
                Ok(feed)
            }
            (Err(err), None) => Err(err),
        }
    }
}

impl std::fmt::Debug for YoutubeModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoutubeModule").field("cache", &self.cache).finish_non_exhaustive()
    }
}

fn cache_ttl(hours: u64) -> Duration {
    i64::try_from(hours)
        .ok()
        .and_then(Duration::try_hours)
        .unwrap_or_else(|| Duration::hours(DEFAULT_TTL_HOURS))
}

impl BehaviorModule for YoutubeModule {
    fn capabilities(&self) -> ModuleCapabilities {
        ModuleCapabilities::DETECT
    }

    fn attributes(&self) -> &[&'static str] {
        &[CHANNEL]
    }

    fn detect(&self, cx: &ModuleContext<'_>, scope: NodeId) -> bool {
        cx.behavior(CHANNEL).is_ok_and(|sel| cx.has_targets(scope, &sel))
    }

    fn apply(&mut self, cx: &mut ModuleContext<'_>, scope: NodeId) -> Result<(), ModuleError> {
        let selector = cx.behavior(CHANNEL)?;
        let i18n = cx.i18n();
        let endpoint = cx
            .config()
            .video_feed
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());

        for element in cx.targets(scope, &selector) {
            if !cx.try_claim(element) {
                continue;
            }
            let channel = selector.value(cx.tree(), element).map(str::trim).unwrap_or_default().to_string();
            let Some(endpoint) = endpoint.filter(|_| !channel.is_empty()) else {
                tracing::error!("youtube: missing endpoint or channel id on {}", element);
                cx.render_error(element, &i18n.missing_config)?;
                continue;
            };

            let request = Self::request(cx, element, &channel);
            match self.load(endpoint, &request, cx.clock().now()) {
                Ok(feed) => {
                    let items = visible_items(&feed.items, request.allow_shorts, request.count as usize);
                    tracing::debug!("youtube: {} videos for {}", items.len(), request.channel_id);
                    let grammar = cx.grammar();
                    render::render(cx.tree_mut(), grammar, element, &items, &request.language)?;
                }
                Err(err) => {
                    tracing::error!("youtube: {}", err);
                    cx.render_error(element, &i18n.feed_error)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_ttl() {
        assert_eq!(cache_ttl(24), Duration::hours(24));
        assert_eq!(cache_ttl(1), Duration::hours(1));
        assert_eq!(cache_ttl(u64::MAX), Duration::hours(DEFAULT_TTL_HOURS));
    }
}
