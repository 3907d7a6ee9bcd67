use crate::config::YouTubeConfig;
use crate::core::ranking::{rank_candidates, RankingWeights};
use crate::domain::model::Video;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: Option<VideoSnippet>,
    statistics: Option<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    description: String,
    published_at: String,
    #[serde(default)]
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    // YouTube 以字串回傳數字
    view_count: Option<String>,
    like_count: Option<String>,
}

/// 為每個章節挑選影片；任何單一候選失敗都只會被排除
#[derive(Clone)]
pub struct VideoCurator {
    client: Client,
    config: Arc<YouTubeConfig>,
    weights: RankingWeights,
}

impl VideoCurator {
    pub fn new(config: YouTubeConfig, weights: RankingWeights) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
            weights,
        })
    }

    pub fn max_videos(&self) -> usize {
        self.config.max_videos_per_chapter
    }

    /// 沒有關鍵字時改用 `fallback_query`；永遠不回傳錯誤
    pub async fn curate(&self, keywords: &[String], fallback_query: &str) -> Vec<Video> {
        self.curate_at(keywords, fallback_query, Utc::now()).await
    }

    pub async fn curate_at(
        &self,
        keywords: &[String],
        fallback_query: &str,
        now: DateTime<Utc>,
    ) -> Vec<Video> {
        let queries: Vec<String> = if keywords.is_empty() {
            vec![fallback_query.trim().to_string()]
        } else {
            keywords
                .iter()
                .take(self.config.keywords_per_chapter)
                .cloned()
                .collect()
        };

        let mut candidates = Vec::new();
        for query in queries.iter().filter(|q| !q.is_empty()) {
            match self.fetch_candidates(query).await {
                Ok(videos) => candidates.extend(videos),
                Err(e) => {
                    tracing::warn!("⚠️ Curation partial failure for query '{}': {}", query, e);
                }
            }
        }

        let found = candidates.len();
        let selected = rank_candidates(candidates, &self.weights, now, self.max_videos());
        tracing::debug!(
            "🎬 Selected {} of {} candidate video(s) for {:?}",
            selected.len(),
            found,
            queries
        );
        selected
    }

    async fn fetch_candidates(&self, query: &str) -> Result<Vec<Video>> {
        let ids = self.search(query).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_statistics(query, &ids).await
    }

    async fn search(&self, query: &str) -> Result<Vec<String>> {
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let max_results = self.config.results_per_keyword.to_string();

        tracing::debug!("📡 Searching videos for '{}'", query);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("key", self.config.api_key.as_str()),
                ("maxResults", max_results.as_str()),
                ("type", "video"),
                ("order", "viewCount"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: SearchResponse = response.json().await?;
        Ok(body
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect())
    }

    async fn fetch_statistics(&self, query: &str, ids: &[String]) -> Result<Vec<Video>> {
        let url = format!("{}/videos", self.config.base_url.trim_end_matches('/'));
        let joined = ids.join(",");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet,statistics"),
                ("id", joined.as_str()),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: VideosResponse = response.json().await?;
        let returned = body.items.len();
        let videos: Vec<Video> = body
            .items
            .into_iter()
            .filter_map(|item| {
                let id = item.id.clone();
                match to_video(item, query) {
                    Ok(video) => Some(video),
                    Err(reason) => {
                        tracing::warn!("⚠️ Skipping video {}: {}", id, reason);
                        None
                    }
                }
            })
            .collect();

        if returned < ids.len() {
            tracing::warn!(
                "⚠️ Statistics missing for {} of {} candidate(s) of '{}'",
                ids.len() - returned,
                ids.len(),
                query
            );
        }
        Ok(videos)
    }
}

fn to_video(item: VideoItem, query: &str) -> std::result::Result<Video, String> {
    let snippet = item.snippet.ok_or("missing snippet")?;
    let statistics = item.statistics.ok_or("missing statistics")?;

    let publish_date = DateTime::parse_from_rfc3339(&snippet.published_at)
        .map_err(|e| format!("bad publishedAt '{}': {}", snippet.published_at, e))?
        .with_timezone(&Utc);

    let view_count = statistics
        .view_count
        .ok_or("missing viewCount")?
        .parse::<u64>()
        .map_err(|e| format!("bad viewCount: {}", e))?;

    // 隱藏按讚數的影片視為 0
    let like_count = match statistics.like_count {
        Some(raw) => raw.parse::<u64>().map_err(|e| format!("bad likeCount: {}", e))?,
        None => 0,
    };

    let thumbnail = snippet
        .thumbnails
        .and_then(|t| t.medium.or(t.default))
        .map(|t| t.url)
        .unwrap_or_default();

    Ok(Video {
        video_link: format!("https://www.youtube.com/watch?v={}", item.id),
        video_id: item.id,
        video_title: snippet.title,
        channel_name: snippet.channel_title,
        description: snippet.description,
        thumbnail,
        publish_date,
        view_count,
        like_count,
        score: 0.0,
        search_query: query.to_string(),
    })
}
