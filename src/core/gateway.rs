use crate::domain::model::{Course, CourseSummary, StoredCourse};
use crate::domain::ports::{ObjectMetadata, Storage};
use crate::utils::error::{CourseError, Result};
use crate::utils::validation::validate_course_id;
use chrono::{DateTime, Utc};

pub const META_TOPIC: &str = "topic";
pub const META_TITLE: &str = "course-title";
pub const META_CREATED_AT: &str = "created-at";

/// 課程的唯一持久化入口：`{folder}/{course_id}.json`
pub struct CourseGateway<S: Storage> {
    storage: S,
    folder: String,
}

impl<S: Storage> CourseGateway<S> {
    pub fn new(storage: S, folder: impl Into<String>) -> Self {
        Self {
            storage,
            folder: folder.into().trim_matches('/').to_string(),
        }
    }

    pub fn key_for(&self, course_id: &str) -> String {
        format!("{}/{}.json", self.folder, course_id)
    }

    fn prefix(&self) -> String {
        format!("{}/", self.folder)
    }

    pub async fn store(&self, course: &Course) -> Result<StoredCourse> {
        validate_course_id(&course.course_id)?;

        let key = self.key_for(&course.course_id);
        let body = serde_json::to_vec_pretty(course)?;

        let mut metadata = ObjectMetadata::new();
        metadata.insert(META_TOPIC.to_string(), course.request.topic.clone());
        metadata.insert(META_TITLE.to_string(), course.course_title.clone());
        metadata.insert(META_CREATED_AT.to_string(), course.created_at.to_rfc3339());
        // S3 metadata 走 HTTP header，只能放可列印的 ASCII；其餘交給 list 讀內容補齊
        metadata.retain(|_, value| value.chars().all(|c| c.is_ascii() && !c.is_ascii_control()));

        tracing::debug!("Writing course ({} bytes) to {}", body.len(), key);
        match self.storage.write_file(&key, &body, &metadata).await {
            Ok(()) => {}
            Err(CourseError::AlreadyExists { .. }) => {
                return Err(CourseError::AlreadyExists {
                    resource: course.course_id.clone(),
                })
            }
            Err(e) => return Err(e),
        }

        let storage_uri = self.storage.location(&key);
        tracing::info!("✅ Course {} stored at {}", course.course_id, storage_uri);

        Ok(StoredCourse {
            course_id: course.course_id.clone(),
            storage_uri,
        })
    }

    pub async fn fetch(&self, course_id: &str) -> Result<Course> {
        validate_course_id(course_id)?;

        let key = self.key_for(course_id);
        let bytes = match self.storage.read_file(&key).await {
            Ok(bytes) => bytes,
            Err(CourseError::NotFound { .. }) => {
                return Err(CourseError::NotFound {
                    resource: course_id.to_string(),
                })
            }
            Err(e) => return Err(e),
        };

        serde_json::from_slice(&bytes).map_err(|e| CourseError::ParseError {
            message: format!("{}: {}", key, e),
        })
    }

    /// 盡量只用 metadata 建立摘要；任一欄位缺漏（舊物件或非 ASCII 值）才讀內容
    pub async fn list(&self) -> Result<Vec<CourseSummary>> {
        let keys = self.storage.list_files(&self.prefix()).await?;

        let prefix = self.prefix();
        let mut summaries = Vec::new();
        for key in &keys {
            let Some(course_id) = course_id_from_key(&prefix, key) else {
                continue;
            };

            match self.summary_for(key, course_id).await {
                Ok(summary) => summaries.push(summary),
                Err(e) => tracing::warn!("⚠️ Skipping unreadable course object {}: {}", key, e),
            }
        }

        summaries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.course_id.cmp(&b.course_id))
        });
        Ok(summaries)
    }

    async fn summary_for(&self, key: &str, course_id: &str) -> Result<CourseSummary> {
        let metadata = self.storage.read_metadata(key).await?;
        if let Some(summary) = summary_from_metadata(course_id, &metadata) {
            return Ok(summary);
        }

        tracing::debug!("No summary metadata on {}, reading body", key);
        let course = self.fetch(course_id).await?;
        Ok(CourseSummary::from(&course))
    }
}

/// 只接受 `{prefix}{id}.json`，子目錄中的物件不屬於本集合
fn course_id_from_key<'a>(prefix: &str, key: &'a str) -> Option<&'a str> {
    let course_id = key.strip_prefix(prefix)?.strip_suffix(".json")?;
    validate_course_id(course_id).ok().map(|_| course_id)
}

fn summary_from_metadata(course_id: &str, metadata: &ObjectMetadata) -> Option<CourseSummary> {
    let topic = metadata.get(META_TOPIC)?;
    let course_title = metadata.get(META_TITLE)?;
    let created_at = DateTime::parse_from_rfc3339(metadata.get(META_CREATED_AT)?)
        .ok()?
        .with_timezone(&Utc);

    Some(CourseSummary {
        course_id: course_id.to_string(),
        course_title: course_title.clone(),
        topic: topic.clone(),
        created_at,
    })
}
