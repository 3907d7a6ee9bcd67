#![allow(dead_code)]

use async_trait::async_trait;
use course_forge::config::YouTubeConfig;
use course_forge::core::generation::RetryPolicy;
use course_forge::core::ranking::RankingWeights;
use course_forge::domain::ports::{ChatMessage, TextGenerator};
use course_forge::utils::error::GenerationError;
use course_forge::{ContentGenerator, CourseEngine, VideoCurator};
use httpmock::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 讀取提示中的 `Chapters: N`，回傳剛好 N 章的骨架
pub struct OutlineGenerator {
    pub calls: AtomicUsize,
    pub delay: Duration,
}

impl OutlineGenerator {
    pub fn new() -> Arc<Self> {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
        })
    }
}

fn requested_chapters(prompt: &str) -> usize {
    prompt
        .lines()
        .find_map(|line| line.trim().trim_start_matches("- ").strip_prefix("Chapters: "))
        .and_then(|n| n.trim().parse().ok())
        .unwrap_or(1)
}

pub fn outline_json(topic: &str, chapters: usize) -> String {
    let chapters: Vec<serde_json::Value> = (1..=chapters)
        .map(|i| {
            serde_json::json!({
                "chapter_number": i,
                "chapter_title": format!("{} part {}", topic, i),
                "learning_objectives": ["Understand the basics"],
                "key_concepts": [{"title": "Concept", "explanation": "Why it matters"}],
                "practical_applications": ["Try it on a real page"],
                "study_notes": "Long form notes",
                "youtube_keywords": [format!("{} lesson {}", topic, i)]
            })
        })
        .collect();

    serde_json::json!({
        "course_title": format!("{} Essentials", topic),
        "description": format!("A course about {}", topic),
        "chapters": chapters,
        "learning_path_summary": {
            "overview": "Overview",
            "time_commitment": "3 weeks",
            "assessment_methods": ["Quiz"],
            "next_steps": ["Build something"]
        }
    })
    .to_string()
}

#[async_trait]
impl TextGenerator for OutlineGenerator {
    async fn complete(
        &self,
        _model_id: &str,
        messages: &[ChatMessage],
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let prompt = messages.first().map(|m| m.text.as_str()).unwrap_or_default();
        let topic = prompt
            .split('"')
            .nth(1)
            .unwrap_or("Topic")
            .to_string();
        Ok(outline_json(&topic, requested_chapters(prompt)))
    }
}

/// 每個查詢回傳 4 支影片，觀看數不同
pub fn mock_youtube(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(200).json_body(serde_json::json!({
            "items": [
                { "id": { "videoId": "vid-a" } },
                { "id": { "videoId": "vid-b" } },
                { "id": { "videoId": "vid-c" } },
                { "id": { "videoId": "vid-d" } }
            ]
        }));
    });

    let items: Vec<serde_json::Value> = [("vid-a", 100), ("vid-b", 90_000), ("vid-c", 5_000), ("vid-d", 250)]
        .iter()
        .map(|(id, views)| {
            serde_json::json!({
                "id": id,
                "snippet": {
                    "title": format!("Lesson {}", id),
                    "channelTitle": "Accessible Dev",
                    "description": "A lesson",
                    "publishedAt": "2025-03-01T10:00:00Z",
                    "thumbnails": { "medium": { "url": format!("https://img.test/{}.jpg", id) } }
                },
                "statistics": { "viewCount": views.to_string(), "likeCount": "12" }
            })
        })
        .collect();

    server.mock(|when, then| {
        when.method(GET).path("/videos");
        then.status(200)
            .json_body(serde_json::json!({ "items": items }));
    });
}

pub fn youtube_config(server: &MockServer, max_videos: usize) -> YouTubeConfig {
    YouTubeConfig {
        api_key: "test-key".to_string(),
        base_url: server.base_url(),
        max_videos_per_chapter: max_videos,
        timeout_seconds: 5,
        ..YouTubeConfig::default()
    }
}

pub fn engine(generator: Arc<dyn TextGenerator>, server: &MockServer, max_videos: usize) -> CourseEngine {
    let generator = ContentGenerator::new(
        generator,
        RetryPolicy {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(1),
            multiplier: 2.0,
            max_backoff: Duration::from_millis(5),
        },
        HashMap::new(),
    );
    let curator = VideoCurator::new(youtube_config(server, max_videos), RankingWeights::default())
        .expect("curator");
    CourseEngine::new(generator, curator)
}
