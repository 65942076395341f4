//! Feed response cache
//!
//! Successful responses are kept per request for a fixed TTL. Expired
//! entries are not evicted: they remain the fallback when a refresh fails.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::feed::{FeedRequest, FeedResponse};

/// Cached response entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub response: FeedResponse,
    /// Time when cached
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.cached_at > ttl
    }
}

/// Cache lookup outcome
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<'a> {
    Fresh(&'a FeedResponse),
    Stale(&'a FeedResponse),
    Miss,
}

#[derive(Debug)]
pub struct FeedCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    /// JSON file mirroring `entries`
    path: Option<PathBuf>,
}

impl FeedCache {
    /// In-memory cache
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            path: None,
        }
    }

    /// Cache persisted to `path`, loading whatever is already there.
    /// An unreadable file starts an empty cache.
    pub fn persistent(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        let path = path.into();
        let entries = match Self::read(&path) {
            Ok(entries) => entries,
            Err(err) => {
                if path.exists() {
                    tracing::warn!("youtube: ignoring cache file {}: {}", path.display(), err);
                }
                HashMap::new()
            }
        };
        tracing::debug!("youtube: {} cached feeds from {}", entries.len(), path.display());
        Self {
            entries,
            ttl,
            path: Some(path),
        }
    }

    fn read(path: &Path) -> std::io::Result<HashMap<String, CacheEntry>> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(std::io::Error::other)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, request: &FeedRequest, now: DateTime<Utc>) -> CacheResult<'_> {
        match self.entries.get(&request.cache_key()) {
            Some(entry) if entry.is_expired(now, self.ttl) => CacheResult::Stale(&entry.response),
            Some(entry) => CacheResult::Fresh(&entry.response),
            None => CacheResult::Miss,
        }
    }

    pub fn put(&mut self, request: &FeedRequest, response: FeedResponse, now: DateTime<Utc>) {
        self.entries.insert(
            request.cache_key(),
            CacheEntry {
                response,
                cached_at: now,
            },
        );
        self.persist();
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let result = serde_json::to_string(&self.entries)
            .map_err(std::io::Error::other)
            .and_then(|json| fs::write(path, json));
        if let Err(err) = result {
            tracing::warn!("youtube: failed to write cache {}: {}", path.display(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::feed::{FeedItem, Snippet, VideoId};

    fn request(channel: &str) -> FeedRequest {
        FeedRequest {
            channel_id: channel.into(),
            count: 6,
            allow_shorts: false,
            language: "en".into(),
        }
    }

    fn response(id: &str) -> FeedResponse {
        FeedResponse {
            items: vec![FeedItem {
                id: VideoId { video_id: id.into() },
                snippet: Snippet::default(),
            }],
            error: None,
        }
    }

    #[test]
    fn test_fresh_then_stale() {
        let mut cache = FeedCache::new(Duration::hours(24));
        let t0 = Utc::now();
        assert_eq!(cache.get(&request("a"), t0), CacheResult::Miss);

        cache.put(&request("a"), response("v1"), t0);
        assert!(matches!(cache.get(&request("a"), t0 + Duration::hours(23)), CacheResult::Fresh(_)));
        assert!(matches!(cache.get(&request("a"), t0 + Duration::hours(25)), CacheResult::Stale(_)));
        assert_eq!(cache.get(&request("b"), t0), CacheResult::Miss);
    }

    #[test]
    fn test_key_includes_language() {
        let mut cache = FeedCache::new(Duration::hours(24));
        let now = Utc::now();
        cache.put(&request("a"), response("v1"), now);
        let mut french = request("a");
        french.language = "fr".into();
        assert_eq!(cache.get(&french, now), CacheResult::Miss);
    }

    #[test]
    fn test_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feeds.json");
        let now = Utc::now();

        let mut cache = FeedCache::persistent(&path, Duration::hours(24));
        assert!(cache.is_empty());
        cache.put(&request("a"), response("v1"), now);

        let reloaded = FeedCache::persistent(&path, Duration::hours(24));
        assert_eq!(reloaded.len(), 1);
        match reloaded.get(&request("a"), now) {
            CacheResult::Fresh(feed) => assert_eq!(feed.items[0].id.video_id, "v1"),
            other => panic!("expected fresh entry, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feeds.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(FeedCache::persistent(&path, Duration::hours(24)).is_empty());
    }
}
