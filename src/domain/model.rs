use crate::utils::error::{CourseError, Result};
use crate::utils::validation::Validate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_CHAPTERS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseCategory {
    #[serde(rename = "Technical & Programming", alias = "technical")]
    Technical,
    #[serde(rename = "Mathematics and Algorithms", alias = "math")]
    Mathematics,
    #[serde(rename = "Science & Engineering", alias = "science")]
    Science,
    #[serde(rename = "History & Social Studies", alias = "history")]
    History,
    #[serde(rename = "Creative Writing & Literature", alias = "literature")]
    Literature,
    #[serde(rename = "Business & Finance", alias = "business")]
    Business,
    #[serde(rename = "Health & Medicine", alias = "health")]
    Health,
    #[serde(rename = "General", alias = "general")]
    General,
}

impl CourseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseCategory::Technical => "Technical & Programming",
            CourseCategory::Mathematics => "Mathematics and Algorithms",
            CourseCategory::Science => "Science & Engineering",
            CourseCategory::History => "History & Social Studies",
            CourseCategory::Literature => "Creative Writing & Literature",
            CourseCategory::Business => "Business & Finance",
            CourseCategory::Health => "Health & Medicine",
            CourseCategory::General => "General",
        }
    }
}

impl fmt::Display for CourseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyLevel {
    #[serde(rename = "Beginner", alias = "beginner")]
    Beginner,
    #[serde(rename = "Intermediate", alias = "intermediate")]
    Intermediate,
    #[serde(rename = "Advanced", alias = "advanced")]
    Advanced,
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DifficultyLevel::Beginner => "Beginner",
            DifficultyLevel::Intermediate => "Intermediate",
            DifficultyLevel::Advanced => "Advanced",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputStyle {
    #[serde(rename = "Educational", alias = "educational")]
    Educational,
    #[serde(rename = "Conversational", alias = "conversational")]
    Conversational,
    #[serde(rename = "Formal", alias = "formal")]
    Formal,
    #[serde(rename = "Storytelling", alias = "storytelling")]
    Storytelling,
}

impl fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputStyle::Educational => "Educational",
            OutputStyle::Conversational => "Conversational",
            OutputStyle::Formal => "Formal",
            OutputStyle::Storytelling => "Storytelling",
        })
    }
}

/// 使用者送出的課程參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRequest {
    pub topic: String,
    pub description: String,
    pub category: CourseCategory,
    pub difficulty: DifficultyLevel,
    pub chapters: u32,
    pub tone_output_style: OutputStyle,
}

impl Validate for CourseRequest {
    fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(CourseError::ValidationError {
                field: "topic".to_string(),
                message: "topic cannot be empty".to_string(),
            });
        }

        if self.description.trim().is_empty() {
            return Err(CourseError::ValidationError {
                field: "description".to_string(),
                message: "description cannot be empty".to_string(),
            });
        }

        if self.chapters == 0 || self.chapters > MAX_CHAPTERS {
            return Err(CourseError::ValidationError {
                field: "chapters".to_string(),
                message: format!("chapters must be between 1 and {}", MAX_CHAPTERS),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyConcept {
    pub title: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub video_id: String,
    pub video_title: String,
    pub video_link: String,
    pub channel_name: String,
    pub description: String,
    pub thumbnail: String,
    pub publish_date: DateTime<Utc>,
    pub view_count: u64,
    pub like_count: u64,
    #[serde(default)]
    pub score: f64,
    pub search_query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub chapter_number: u32,
    pub chapter_title: String,
    pub learning_objectives: Vec<String>,
    pub key_concepts: Vec<KeyConcept>,
    pub practical_applications: Vec<String>,
    pub study_notes: String,
    #[serde(default)]
    pub youtube_keywords: Vec<String>,
    #[serde(default)]
    pub videos: Vec<Video>,
}

/// 缺少的欄位以預設摘要補上
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningPathSummary {
    pub overview: String,
    pub time_commitment: String,
    pub assessment_methods: Vec<String>,
    pub next_steps: Vec<String>,
}

impl Default for LearningPathSummary {
    fn default() -> Self {
        Self {
            overview: "This course provides a deep dive into the topic with practical chapters and visual resources.".to_string(),
            time_commitment: "Approx. 1-2 weeks".to_string(),
            assessment_methods: vec![
                "Quizzes".to_string(),
                "Mini Projects".to_string(),
                "Discussions".to_string(),
            ],
            next_steps: vec![
                "Explore advanced topics".to_string(),
                "Join communities".to_string(),
                "Apply knowledge".to_string(),
            ],
        }
    }
}

/// 生成模型回傳、尚未附上影片的課程骨架
#[derive(Debug, Clone, PartialEq)]
pub struct CourseOutline {
    pub course_title: String,
    pub description: String,
    pub chapters: Vec<Chapter>,
    pub learning_path_summary: LearningPathSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseMetadata {
    pub model_id: String,
    pub total_chapters: usize,
    pub youtube_resources_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: String,
    pub course_title: String,
    pub description: String,
    pub request: CourseRequest,
    pub chapters: Vec<Chapter>,
    pub learning_path_summary: LearningPathSummary,
    pub created_at: DateTime<Utc>,
    pub metadata: CourseMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub course_id: String,
    pub course_title: String,
    pub topic: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            course_id: course.course_id.clone(),
            course_title: course.course_title.clone(),
            topic: course.request.topic.clone(),
            created_at: course.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCourse {
    pub course_id: String,
    pub storage_uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CourseRequest {
        CourseRequest {
            topic: "Web Accessibility".to_string(),
            description: "Build inclusive websites".to_string(),
            category: CourseCategory::Technical,
            difficulty: DifficultyLevel::Beginner,
            chapters: 3,
            tone_output_style: OutputStyle::Educational,
        }
    }

    #[test]
    fn test_request_validation() {
        assert!(request().validate().is_ok());

        let mut req = request();
        req.chapters = 0;
        assert!(matches!(
            req.validate(),
            Err(CourseError::ValidationError { ref field, .. }) if field == "chapters"
        ));

        let mut req = request();
        req.topic = "   ".to_string();
        assert!(req.validate().is_err());

        let mut req = request();
        req.description = String::new();
        assert!(req.validate().is_err());

        let mut req = request();
        req.chapters = MAX_CHAPTERS + 1;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_request_deserializes_display_names_and_aliases() {
        let json = serde_json::json!({
            "topic": "Calculus",
            "description": "Limits and derivatives",
            "category": "Mathematics and Algorithms",
            "difficulty": "beginner",
            "chapters": 4,
            "tone_output_style": "Storytelling"
        });

        let req: CourseRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.category, CourseCategory::Mathematics);
        assert_eq!(req.difficulty, DifficultyLevel::Beginner);
        assert_eq!(req.tone_output_style, OutputStyle::Storytelling);

        let back = serde_json::to_value(&req).unwrap();
        assert_eq!(back["difficulty"], "Beginner");
        assert_eq!(back["category"], "Mathematics and Algorithms");
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let json = serde_json::json!({
            "topic": "x",
            "description": "y",
            "category": "Cooking",
            "difficulty": "Beginner",
            "chapters": 1,
            "tone_output_style": "Formal"
        });

        assert!(serde_json::from_value::<CourseRequest>(json).is_err());
    }

    #[test]
    fn test_partial_learning_path_summary_uses_defaults() {
        let summary: LearningPathSummary =
            serde_json::from_str(r#"{"overview": "Custom overview"}"#).unwrap();

        assert_eq!(summary.overview, "Custom overview");
        assert_eq!(
            summary.next_steps,
            LearningPathSummary::default().next_steps
        );
    }
}
