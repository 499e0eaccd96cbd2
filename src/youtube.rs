//! YouTube Data API v3 client: video metadata lookup and comment sampling.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::extract;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Clone)]
pub struct YouTubeClient {
    api_key: String,
    base_url: String,
    http: Client,
}

/// The metadata subset the service works with, flattened from the API's
/// snippet/statistics/contentDetails parts. Serialized camelCase on the wire,
/// matching the upstream API's own casing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
}

impl YouTubeClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: API_BASE.to_string(),
            http: Client::new(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
            http: Client::new(),
        }
    }

    /// Look up a video by id. `Ok(None)` means the API has no such video.
    pub async fn get_video(&self, video_id: &str) -> Result<Option<VideoMetadata>, YouTubeError> {
        let url = format!("{}/videos", self.base_url);

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("part", "snippet,statistics,contentDetails"),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(YouTubeError::Api(text));
        }

        let list: VideoListResponse = resp.json().await?;
        let Some(item) = list.items.into_iter().next() else {
            return Ok(None);
        };

        Ok(Some(VideoMetadata {
            title: item.snippet.title,
            description: item.snippet.description,
            published_at: item.snippet.published_at,
            duration_seconds: extract::parse_duration_seconds(&item.content_details.duration),
            view_count: parse_count(item.statistics.view_count),
            like_count: parse_count(item.statistics.like_count),
            comment_count: parse_count(item.statistics.comment_count),
        }))
    }

    /// Fetch up to `max_results` top-level comment bodies in relevance order.
    /// Callers treat failure here as best-effort and fall back to an empty
    /// sample.
    pub async fn get_comments(
        &self,
        video_id: &str,
        max_results: u32,
    ) -> Result<Vec<String>, YouTubeError> {
        let url = format!("{}/commentThreads", self.base_url);
        let max_results = max_results.to_string();

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("videoId", video_id),
                ("maxResults", max_results.as_str()),
                ("order", "relevance"),
                ("textFormat", "plainText"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(YouTubeError::Api(text));
        }

        let list: CommentThreadListResponse = resp.json().await?;
        Ok(list
            .items
            .into_iter()
            .map(|t| t.snippet.top_level_comment.snippet.text_display)
            .collect())
    }
}

/// Statistics counts arrive as JSON strings and may be absent entirely
/// (comments disabled, hidden like counts). Absent or unparseable is 0.
fn parse_count(raw: Option<String>) -> u64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}

// Upstream payload shapes

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    snippet: VideoSnippet,
    content_details: ContentDetails,
    #[serde(default)]
    statistics: VideoStatistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    description: String,
    published_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThreadListResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    text_display: String,
}

#[derive(Debug)]
pub enum YouTubeError {
    Http(reqwest::Error),
    Api(String),
}

impl From<reqwest::Error> for YouTubeError {
    fn from(e: reqwest::Error) -> Self {
        YouTubeError::Http(e)
    }
}

impl std::fmt::Display for YouTubeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YouTubeError::Http(e) => write!(f, "HTTP error: {}", e),
            YouTubeError::Api(s) => write!(f, "YouTube API error: {}", s),
        }
    }
}

impl std::error::Error for YouTubeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_default_to_zero() {
        assert_eq!(parse_count(None), 0);
        assert_eq!(parse_count(Some("".into())), 0);
        assert_eq!(parse_count(Some("not a number".into())), 0);
        assert_eq!(parse_count(Some("4821".into())), 4821);
    }

    #[test]
    fn video_payload_decodes() {
        let payload = serde_json::json!({
            "items": [{
                "snippet": {
                    "title": "My short",
                    "description": "desc #fun",
                    "publishedAt": "2024-05-01T12:00:00Z"
                },
                "contentDetails": { "duration": "PT1M5S" },
                "statistics": { "viewCount": "100", "likeCount": "10" }
            }]
        });
        let list: VideoListResponse = serde_json::from_value(payload).unwrap();
        let item = &list.items[0];
        assert_eq!(item.snippet.title, "My short");
        assert_eq!(item.content_details.duration, "PT1M5S");
        assert_eq!(item.statistics.comment_count, None);
    }

    #[test]
    fn missing_statistics_part_decodes() {
        // Videos with statistics hidden omit the part entirely.
        let payload = serde_json::json!({
            "items": [{
                "snippet": {
                    "title": "t",
                    "publishedAt": "2024-05-01T12:00:00Z"
                },
                "contentDetails": {}
            }]
        });
        let list: VideoListResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(list.items[0].statistics.view_count, None);
        assert_eq!(list.items[0].snippet.description, "");
    }

    #[test]
    fn empty_items_means_not_found() {
        let list: VideoListResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(list.items.is_empty());
    }

    #[test]
    fn comment_payload_decodes() {
        let payload = serde_json::json!({
            "items": [
                { "snippet": { "topLevelComment": { "snippet": { "textDisplay": "great!" } } } },
                { "snippet": { "topLevelComment": { "snippet": { "textDisplay": "loved it" } } } }
            ]
        });
        let list: CommentThreadListResponse = serde_json::from_value(payload).unwrap();
        let bodies: Vec<String> = list
            .items
            .into_iter()
            .map(|t| t.snippet.top_level_comment.snippet.text_display)
            .collect();
        assert_eq!(bodies, vec!["great!", "loved it"]);
    }
}
