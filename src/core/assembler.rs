use crate::domain::model::{Course, CourseMetadata, CourseOutline, CourseRequest, Video};
use chrono::{DateTime, Utc};
use rand::Rng;

const MAX_SLUG_LEN: usize = 48;

/// 主題轉為 URL/鍵安全的 slug，例如 "Web Accessibility!" -> "web-accessibility"
pub fn slugify(topic: &str) -> String {
    let mut slug = String::with_capacity(topic.len());
    let mut pending_dash = false;

    for c in topic.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "course".to_string()
    } else {
        slug
    }
}

/// `{slug}-{YYYYmmddHHMMSS}-{6 hex}`
pub fn generate_course_id(topic: &str, created_at: DateTime<Utc>) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..0x0100_0000);
    format!(
        "{}-{}-{:06x}",
        slugify(topic),
        created_at.format("%Y%m%d%H%M%S"),
        suffix
    )
}

#[derive(Debug, Clone, Default)]
pub struct CourseAssembler;

impl CourseAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn assemble(
        &self,
        request: &CourseRequest,
        outline: CourseOutline,
        videos_by_chapter: Vec<Vec<Video>>,
        model_id: &str,
    ) -> Course {
        self.assemble_at(request, outline, videos_by_chapter, model_id, Utc::now())
    }

    /// `videos_by_chapter[i]` 屬於第 i 章；長度不足的部分視為沒有影片
    pub fn assemble_at(
        &self,
        request: &CourseRequest,
        outline: CourseOutline,
        videos_by_chapter: Vec<Vec<Video>>,
        model_id: &str,
        created_at: DateTime<Utc>,
    ) -> Course {
        let mut videos_by_chapter = videos_by_chapter.into_iter();
        let chapters: Vec<_> = outline
            .chapters
            .into_iter()
            .map(|mut chapter| {
                chapter.videos = videos_by_chapter.next().unwrap_or_default();
                chapter
            })
            .collect();

        let youtube_resources_count = chapters.iter().map(|c| c.videos.len()).sum();

        Course {
            course_id: generate_course_id(&request.topic, created_at),
            course_title: outline.course_title,
            description: outline.description,
            request: request.clone(),
            metadata: CourseMetadata {
                model_id: model_id.to_string(),
                total_chapters: chapters.len(),
                youtube_resources_count,
            },
            chapters,
            learning_path_summary: outline.learning_path_summary,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        Chapter, CourseCategory, DifficultyLevel, LearningPathSummary, OutputStyle,
    };
    use crate::utils::validation::validate_course_id;
    use chrono::TimeZone;

    fn request() -> CourseRequest {
        CourseRequest {
            topic: "Web Accessibility".to_string(),
            description: "Inclusive design".to_string(),
            category: CourseCategory::Technical,
            difficulty: DifficultyLevel::Beginner,
            chapters: 2,
            tone_output_style: OutputStyle::Formal,
        }
    }

    fn chapter(number: u32) -> Chapter {
        Chapter {
            chapter_number: number,
            chapter_title: format!("Chapter {}", number),
            learning_objectives: vec![],
            key_concepts: vec![],
            practical_applications: vec![],
            study_notes: String::new(),
            youtube_keywords: vec![],
            videos: vec![],
        }
    }

    fn video(id: &str) -> Video {
        Video {
            video_id: id.to_string(),
            video_title: id.to_string(),
            video_link: format!("https://www.youtube.com/watch?v={}", id),
            channel_name: String::new(),
            description: String::new(),
            thumbnail: String::new(),
            publish_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            view_count: 1,
            like_count: 0,
            score: 1.0,
            search_query: "q".to_string(),
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Web Accessibility"), "web-accessibility");
        assert_eq!(slugify("  C++ & Rust: 101!! "), "c-rust-101");
        assert_eq!(slugify("日本語"), "course");
        assert!(slugify(&"a".repeat(200)).len() <= MAX_SLUG_LEN);
    }

    #[test]
    fn test_course_id_format() {
        let created_at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 5).unwrap();
        let id = generate_course_id("Web Accessibility", created_at);

        assert!(id.starts_with("web-accessibility-20261018093005-"));
        assert_eq!(id.len(), "web-accessibility-20261018093005-".len() + 6);
        assert!(validate_course_id(&id).is_ok());
    }

    #[test]
    fn test_assemble_merges_videos_by_index() {
        let created_at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 5).unwrap();
        let outline = CourseOutline {
            course_title: "Accessible Web".to_string(),
            description: "Intro".to_string(),
            chapters: vec![chapter(1), chapter(2)],
            learning_path_summary: LearningPathSummary::default(),
        };

        let course = CourseAssembler::new().assemble_at(
            &request(),
            outline,
            vec![vec![video("a"), video("b")]],
            "model-x",
            created_at,
        );

        assert_eq!(course.chapters[0].videos.len(), 2);
        assert!(course.chapters[1].videos.is_empty());
        assert_eq!(course.metadata.total_chapters, 2);
        assert_eq!(course.metadata.youtube_resources_count, 2);
        assert_eq!(course.metadata.model_id, "model-x");
        assert_eq!(course.created_at, created_at);
        assert_eq!(course.request, request());
    }
}
