//! Video feed wire format and transport
//!
//! The proxy answers `GET <endpoint>?channelId=&maxResults=&allowShorts=`
//! with a search-style JSON body.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const USER_AGENT: &str = concat!("bb-contents/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(30);

/// Response body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub items: Vec<FeedItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FeedErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedErrorBody {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: VideoId,
    pub snippet: Snippet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoId {
    pub video_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snippet {
    pub title: String,
    pub description: String,
    pub published_at: String,
    pub channel_title: String,
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thumbnails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Thumbnail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<Thumbnail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Thumbnail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxres: Option<Thumbnail>,
}

impl Thumbnails {
    /// Largest available thumbnail
    pub fn best(&self) -> Option<&str> {
        [&self.maxres, &self.high, &self.medium, &self.default]
            .into_iter()
            .find_map(|t| t.as_ref())
            .map(|t| t.url.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

impl FeedItem {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id.video_id)
    }

    /// Tagged as a short in its title or description
    pub fn is_short(&self) -> bool {
        let tagged = |s: &str| s.to_lowercase().contains("#shorts");
        tagged(&self.snippet.title) || tagged(&self.snippet.description)
    }
}

/// Feed request parameters, also the cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedRequest {
    pub channel_id: String,
    pub count: u32,
    pub allow_shorts: bool,
    pub language: String,
}

impl FeedRequest {
    /// Full request URL against `endpoint`
    pub fn url(&self, endpoint: &str) -> Result<url::Url, FeedError> {
        let mut url = url::Url::parse(endpoint).map_err(|e| FeedError::InvalidEndpoint(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("channelId", &self.channel_id)
            .append_pair("maxResults", &self.count.to_string())
            .append_pair("allowShorts", if self.allow_shorts { "true" } else { "false" });
        Ok(url)
    }

    /// Stable string form used by the persisted cache
    pub fn cache_key(&self) -> String {
        format!("{}|{}|{}|{}", self.channel_id, self.count, self.allow_shorts, self.language)
    }
}

/// Video feed errors
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("HTTP error: {0}")]
    Http(u16),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Feed error: {0}")]
    Remote(String),
}

/// Fetches one feed. Production uses [`HttpTransport`].
pub trait FeedTransport {
    fn fetch(&self, url: &url::Url) -> Result<FeedResponse, FeedError>;
}

impl<F> FeedTransport for F
where
    F: Fn(&url::Url) -> Result<FeedResponse, FeedError>,
{
    fn fetch(&self, url: &url::Url) -> Result<FeedResponse, FeedError> {
        self(url)
    }
}

/// Blocking HTTP transport
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, FeedError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| FeedError::RequestFailed(e.to_string()))?;
        Ok(Self { client })
    }
}

impl FeedTransport for HttpTransport {
    fn fetch(&self, url: &url::Url) -> Result<FeedResponse, FeedError> {
        tracing::debug!("youtube: fetching {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| FeedError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Http(status.as_u16()));
        }

        let body = response.text().map_err(|e| FeedError::RequestFailed(e.to_string()))?;
        decode(&body)
    }
}

/// Decode a body, turning an `error` member into [`FeedError::Remote`]
pub fn decode(body: &str) -> Result<FeedResponse, FeedError> {
    let response: FeedResponse = serde_json::from_str(body)?;
    match response.error {
        Some(err) => Err(FeedError::Remote(err.message)),
        None => Ok(response),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "items": [{
            "id": { "videoId": "abc123" },
            "snippet": {
                "title": "Launch day",
                "description": "We shipped",
                "publishedAt": "2025-03-04T10:00:00Z",
                "channelTitle": "Acme",
                "thumbnails": {
                    "default": { "url": "https://i.ytimg.com/d.jpg" },
                    "high": { "url": "https://i.ytimg.com/h.jpg" }
                }
            }
        }]
    }"#;

    #[test]
    fn test_decode() {
        let feed = decode(BODY).unwrap();
        assert_eq!(feed.items.len(), 1);
        let item = &feed.items[0];
        assert_eq!(item.id.video_id, "abc123");
        assert_eq!(item.snippet.channel_title, "Acme");
        assert_eq!(item.snippet.thumbnails.best(), Some("https://i.ytimg.com/h.jpg"));
        assert_eq!(item.watch_url(), "https://www.youtube.com/watch?v=abc123");
    }

    #[test]
    fn test_decode_error_member() {
        let err = decode(r#"{"error": {"message": "quota exceeded"}}"#).unwrap_err();
        assert!(matches!(err, FeedError::Remote(m) if m == "quota exceeded"));
        assert!(matches!(decode("not json"), Err(FeedError::Decode(_))));
    }

    #[test]
    fn test_request_url() {
        let request = FeedRequest {
            channel_id: "UC 1".into(),
            count: 6,
            allow_shorts: false,
            language: "en".into(),
        };
        let url = request.url("https://proxy.example/feed").unwrap();
        assert_eq!(url.as_str(), "https://proxy.example/feed?channelId=UC+1&maxResults=6&allowShorts=false");
        assert!(matches!(request.url("not a url"), Err(FeedError::InvalidEndpoint(_))));
    }

    #[test]
    fn test_is_short() {
        let mut item = decode(BODY).unwrap().items.remove(0);
        assert!(!item.is_short());
        item.snippet.description = "Quick tip #Shorts".into();
        assert!(item.is_short());
    }
}
