use crate::core::assembler::CourseAssembler;
use crate::core::curator::VideoCurator;
use crate::core::generation::ContentGenerator;
use crate::domain::model::{Chapter, Course, CourseRequest, Video};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::time::Instant;
use tokio::task::JoinSet;

/// 驗證 → 生成骨架 → 並行挑選影片 → 組裝課程（不寫入儲存）
pub struct CourseEngine {
    generator: ContentGenerator,
    curator: VideoCurator,
    assembler: CourseAssembler,
}

impl CourseEngine {
    pub fn new(generator: ContentGenerator, curator: VideoCurator) -> Self {
        Self {
            generator,
            curator,
            assembler: CourseAssembler::new(),
        }
    }

    pub async fn generate_course(&self, request: &CourseRequest) -> Result<Course> {
        let started = Instant::now();
        request.validate()?;

        tracing::info!(
            "🚀 Generating course: topic='{}', difficulty={}, chapters={}",
            request.topic,
            request.difficulty,
            request.chapters
        );

        let outline = self.generator.generate(request).await?;
        let model_id = self.generator.model_for(request.category);
        tracing::info!("📚 Outline ready with {} chapter(s)", outline.chapters.len());

        let videos = self.curate_chapters(&request.topic, &outline.chapters).await;
        let course = self.assembler.assemble(request, outline, videos, &model_id);

        tracing::info!(
            "✅ Course {} generated in {:?} ({} video(s))",
            course.course_id,
            started.elapsed(),
            course.metadata.youtube_resources_count
        );
        Ok(course)
    }

    /// 每章一個任務，結果依章節索引放回
    async fn curate_chapters(&self, topic: &str, chapters: &[Chapter]) -> Vec<Vec<Video>> {
        let mut tasks = JoinSet::new();
        for (index, chapter) in chapters.iter().enumerate() {
            let curator = self.curator.clone();
            let keywords = chapter.youtube_keywords.clone();
            let fallback_query = format!("{} {}", topic.trim(), chapter.chapter_title);
            tasks.spawn(async move { (index, curator.curate(&keywords, &fallback_query).await) });
        }

        let mut videos = vec![Vec::new(); chapters.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, found)) => videos[index] = found,
                Err(e) => tracing::warn!("⚠️ Curation task failed: {}", e),
            }
        }
        videos
    }
}
