use crate::domain::model::{CourseCategory, CourseRequest};
use std::collections::HashMap;

/// 各分類預設使用的 Bedrock 模型
pub fn default_model_for_category(category: CourseCategory) -> &'static str {
    match category {
        CourseCategory::Technical | CourseCategory::Mathematics | CourseCategory::General => {
            "us.anthropic.claude-3-5-sonnet-20241022-v2:0"
        }
        CourseCategory::Science
        | CourseCategory::History
        | CourseCategory::Literature
        | CourseCategory::Business => "anthropic.claude-3-sonnet-20240229-v1:0",
        CourseCategory::Health => "amazon.titan-text-express-v1",
    }
}

/// 設定檔覆寫優先，其次為內建對照表
pub fn model_for_category(
    category: CourseCategory,
    overrides: &HashMap<CourseCategory, String>,
) -> String {
    overrides
        .get(&category)
        .cloned()
        .unwrap_or_else(|| default_model_for_category(category).to_string())
}

/// 整份課程 study_notes 的總字數預算，須與預設 max_tokens (4096) 相容
const STUDY_NOTES_WORD_BUDGET: u32 = 1200;
const STUDY_NOTES_MIN_WORDS: u32 = 80;
const STUDY_NOTES_MAX_WORDS: u32 = 400;

/// 所有章節都在同一次回覆中產生，章節越多每章筆記越短
pub fn study_notes_words(chapters: u32) -> u32 {
    (STUDY_NOTES_WORD_BUDGET / chapters.max(1)).clamp(STUDY_NOTES_MIN_WORDS, STUDY_NOTES_MAX_WORDS)
}

const OUTLINE_SCHEMA: &str = r#"{
  "course_title": "string",
  "description": "string",
  "chapters": [
    {
      "chapter_number": int,
      "chapter_title": "string",
      "learning_objectives": ["string"],
      "key_concepts": [{"title": "string", "explanation": "string"}],
      "practical_applications": ["string"],
      "study_notes": "string",
      "youtube_keywords": ["string"]
    }
  ],
  "learning_path_summary": {
    "overview": "string",
    "time_commitment": "string",
    "assessment_methods": ["string"],
    "next_steps": ["string"]
  }
}"#;

pub fn build_course_prompt(request: &CourseRequest) -> String {
    format!(
        r#"Please create a JSON-formatted learning path for the topic "{topic}" with the following inputs:
- Description: {description}
- Category: {category}
- Difficulty: {difficulty}
- Chapters: {chapters}
- Tone/Style: {tone}

The "chapters" array must contain exactly {chapters} chapters, numbered from 1.
Each chapter needs 3-5 "youtube_keywords" that would find good tutorial videos for it.
Keep each chapter's "study_notes" to about {notes_words} words so the whole answer fits in one reply.

Output must strictly follow this JSON schema:
{schema}
Return only the JSON. No markdown, no explanation."#,
        topic = request.topic.trim(),
        description = request.description.trim(),
        category = request.category,
        difficulty = request.difficulty,
        chapters = request.chapters,
        tone = request.tone_output_style,
        notes_words = study_notes_words(request.chapters),
        schema = OUTLINE_SCHEMA,
    )
}

/// 模型回傳內容無法解析時的補救提示
pub fn build_correction_prompt(problem: &str, expected_chapters: u32) -> String {
    format!(
        r#"Your previous answer could not be used: {problem}.
Reply again with ONLY a single JSON object that follows this schema, with exactly {expected_chapters} chapters
and at most {notes_words} words of "study_notes" per chapter:
{schema}
No markdown fences, no commentary before or after the JSON."#,
        problem = problem,
        expected_chapters = expected_chapters,
        notes_words = study_notes_words(expected_chapters),
        schema = OUTLINE_SCHEMA,
    )
}
