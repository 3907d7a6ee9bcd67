use crate::core::prompt::{build_correction_prompt, build_course_prompt, model_for_category};
use crate::domain::model::{
    Chapter, CourseCategory, CourseOutline, CourseRequest, KeyConcept, LearningPathSummary,
};
use crate::domain::ports::{ChatMessage, TextGenerator};
use crate::utils::error::GenerationError;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// 重試策略：純資料，由外部注入
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 含第一次呼叫在內的總嘗試次數
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_backoff: Duration::from_secs(1),
            multiplier: 2.0,
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// 第 `attempt` 次（從 1 起算）失敗後要等待的時間
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31) as i32;
        let secs = self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::from_secs_f64(secs.min(self.max_backoff.as_secs_f64()))
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

pub struct ContentGenerator {
    client: Arc<dyn TextGenerator>,
    policy: RetryPolicy,
    models: HashMap<CourseCategory, String>,
}

impl ContentGenerator {
    pub fn new(
        client: Arc<dyn TextGenerator>,
        policy: RetryPolicy,
        models: HashMap<CourseCategory, String>,
    ) -> Self {
        Self {
            client,
            policy,
            models,
        }
    }

    pub fn model_for(&self, category: CourseCategory) -> String {
        model_for_category(category, &self.models)
    }

    /// 產生課程骨架（尚未附影片）
    pub async fn generate(
        &self,
        request: &CourseRequest,
    ) -> Result<CourseOutline, GenerationError> {
        let model_id = self.model_for(request.category);
        tracing::info!(
            "🧠 Generating outline for '{}' with model {}",
            request.topic,
            model_id
        );

        let prompt = build_course_prompt(request);
        let mut messages = vec![ChatMessage::user(prompt.clone())];

        // 解析失敗與空白/截斷回覆同樣只做一次補救
        let problem = match self.complete_with_retry(&model_id, &messages).await {
            Ok(answer) => match parse_outline(&answer, request) {
                Ok(outline) => return Ok(outline),
                Err(problem) => {
                    messages.push(ChatMessage::assistant(answer));
                    problem
                }
            },
            Err(GenerationError::MalformedResponse { message }) => message,
            Err(err) => return Err(err),
        };

        tracing::warn!(
            "⚠️ Malformed generation response, sending corrective prompt: {}",
            problem
        );
        let correction = build_correction_prompt(&problem, request.chapters);
        if messages.len() == 1 {
            // 沒有可回放的回答，補救指示併入同一則 user 訊息
            messages[0] = ChatMessage::user(format!("{}\n\n{}", prompt, correction));
        } else {
            messages.push(ChatMessage::user(correction));
        }

        let second_answer = self.complete_with_retry(&model_id, &messages).await?;
        parse_outline(&second_answer, request)
            .map_err(|message| GenerationError::MalformedResponse { message })
    }

    async fn complete_with_retry(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
    ) -> Result<String, GenerationError> {
        let max_attempts = self.policy.attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::debug!("📡 Generation attempt {}/{}", attempt, max_attempts);

            match self.client.complete(model_id, messages).await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let delay = self.policy.backoff_for(attempt);
                    tracing::warn!(
                        "⏳ Generation attempt {}/{} failed ({}), retrying in {:?}",
                        attempt,
                        max_attempts,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(GenerationError::Throttled { message, .. }) => {
                    return Err(GenerationError::Throttled {
                        attempts: attempt,
                        message,
                    })
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawOutline {
    #[serde(default)]
    course_title: String,
    #[serde(default)]
    description: String,
    chapters: Vec<RawChapter>,
    #[serde(default)]
    learning_path_summary: Option<LearningPathSummary>,
}

#[derive(Debug, Deserialize)]
struct RawChapter {
    #[serde(default, alias = "title")]
    chapter_title: String,
    #[serde(default)]
    learning_objectives: TextOrList,
    #[serde(default)]
    key_concepts: Vec<RawKeyConcept>,
    #[serde(default)]
    practical_applications: TextOrList,
    #[serde(default)]
    study_notes: String,
    #[serde(default, alias = "search_queries")]
    youtube_keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawKeyConcept {
    Text(String),
    Entry {
        #[serde(default, alias = "concept", alias = "name")]
        title: String,
        #[serde(default, alias = "description")]
        explanation: String,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum TextOrList {
    #[default]
    Empty,
    Text(String),
    List(Vec<String>),
}

impl TextOrList {
    fn into_vec(self) -> Vec<String> {
        match self {
            TextOrList::Empty => Vec::new(),
            TextOrList::Text(text) if text.trim().is_empty() => Vec::new(),
            TextOrList::Text(text) => vec![text],
            TextOrList::List(items) => items,
        }
    }
}

/// 取出回應中的 JSON 物件，容忍 markdown 區塊與前後說明文字
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// 解析失敗時回傳給模型看的問題描述
pub fn parse_outline(text: &str, request: &CourseRequest) -> Result<CourseOutline, String> {
    let json = extract_json_object(text).ok_or_else(|| "no JSON object found".to_string())?;
    let raw: RawOutline =
        serde_json::from_str(json).map_err(|e| format!("invalid course JSON: {}", e))?;

    let expected = request.chapters as usize;
    if raw.chapters.len() < expected {
        return Err(format!(
            "expected {} chapters but got {}",
            expected,
            raw.chapters.len()
        ));
    }
    if raw.chapters.len() > expected {
        tracing::debug!(
            "Dropping {} extra chapter(s) from generation response",
            raw.chapters.len() - expected
        );
    }

    let mut chapters = Vec::with_capacity(expected);
    for (index, raw_chapter) in raw.chapters.into_iter().take(expected).enumerate() {
        let chapter_title = raw_chapter.chapter_title.trim().to_string();
        if chapter_title.is_empty() {
            return Err(format!("chapter {} has no chapter_title", index + 1));
        }

        let key_concepts = raw_chapter
            .key_concepts
            .into_iter()
            .map(|concept| match concept {
                RawKeyConcept::Text(title) => KeyConcept {
                    title,
                    explanation: String::new(),
                },
                RawKeyConcept::Entry { title, explanation } => KeyConcept { title, explanation },
            })
            .filter(|concept| !concept.title.trim().is_empty())
            .collect();

        chapters.push(Chapter {
            // 章節編號以位置為準
            chapter_number: index as u32 + 1,
            chapter_title,
            learning_objectives: raw_chapter.learning_objectives.into_vec(),
            key_concepts,
            practical_applications: raw_chapter.practical_applications.into_vec(),
            study_notes: raw_chapter.study_notes,
            youtube_keywords: raw_chapter
                .youtube_keywords
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            videos: Vec::new(),
        });
    }

    let course_title = if raw.course_title.trim().is_empty() {
        format!("Course on {}", request.topic.trim())
    } else {
        raw.course_title.trim().to_string()
    };
    let description = if raw.description.trim().is_empty() {
        request.description.clone()
    } else {
        raw.description
    };

    Ok(CourseOutline {
        course_title,
        description,
        chapters,
        learning_path_summary: raw.learning_path_summary.unwrap_or_default(),
    })
}
