//! Video-hosting platform client (YouTube Data API v3).
//!
//! Consumes the `playlistItems.list` and `videos.list` operations read-only.

use serde_json::Value;
use tracing::debug;

use crate::source::{PAGE_SIZE, PlaylistPage, VideoSource};
use crate::{CollectError, VideoRecord};

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

pub struct YouTubeClient {
    api_key: String,
    client: reqwest::Client,
}

impl YouTubeClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, CollectError> {
        let mut all_params = vec![("key", self.api_key.as_str())];
        all_params.extend_from_slice(params);

        let url = format!("{BASE_URL}{path}");
        debug!(url = %url, "video platform request");

        let resp = self
            .client
            .get(&url)
            .query(&all_params)
            .send()
            .await
            .map_err(|e| CollectError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CollectError::Api(format!(
                "{path} returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| CollectError::Decode(format!("{path} response: {e}")))
    }
}

#[async_trait::async_trait]
impl VideoSource for YouTubeClient {
    fn name(&self) -> &str {
        "youtube"
    }

    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage, CollectError> {
        let max_results = PAGE_SIZE.to_string();
        let mut params = vec![
            ("part", "contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let data = self.get_json("/playlistItems", &params).await?;
        Ok(parse_playlist_page(&data))
    }

    async fn video_details(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<VideoRecord>, CollectError> {
        let ids = video_ids.join(",");
        let params = vec![("part", "snippet"), ("id", ids.as_str())];

        let data = self.get_json("/videos", &params).await?;
        Ok(parse_video_items(&data))
    }
}

fn parse_playlist_page(data: &Value) -> PlaylistPage {
    let items = data["items"].as_array().cloned().unwrap_or_default();
    let video_ids = items
        .iter()
        .filter_map(|item| {
            item["contentDetails"]["videoId"]
                .as_str()
                .map(str::to_string)
        })
        .collect();

    PlaylistPage {
        video_ids,
        next_page_token: data["nextPageToken"].as_str().map(str::to_string),
    }
}

fn parse_video_items(data: &Value) -> Vec<VideoRecord> {
    let items = data["items"].as_array().cloned().unwrap_or_default();
    items
        .iter()
        .filter_map(|item| {
            let video_id = item["id"].as_str()?.to_string();
            let snippet = &item["snippet"];
            Some(VideoRecord {
                video_id,
                title: snippet["title"].as_str().unwrap_or("").to_string(),
                description: snippet["description"].as_str().unwrap_or("").to_string(),
                published_at: snippet["publishedAt"].as_str().unwrap_or("").to_string(),
            })
        })
        .collect()
}
