use super::{ServiceConfig, StorageKind};
use crate::utils::error::{CourseError, Result};
use std::str::FromStr;

impl ServiceConfig {
    /// 從環境變數載入配置（未設定者使用預設值）
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServiceConfig::default();

        if let Some(region) = lookup("AWS_REGION") {
            config.aws.region = region;
        }
        if let Some(bucket) = lookup("S3_BUCKET_NAME") {
            config.storage.bucket = bucket;
        }
        if let Some(folder) = lookup("S3_FOLDER") {
            config.storage.folder = folder;
        }
        if let Some(backend) = lookup("STORAGE_BACKEND") {
            config.storage.backend = parse_backend(&backend)?;
        }
        if let Some(path) = lookup("LOCAL_STORAGE_PATH") {
            config.storage.local_path = path;
        }
        if let Some(key) = lookup("YOUTUBE_API_KEY") {
            config.youtube.api_key = key;
        }
        if let Some(base_url) = lookup("YOUTUBE_API_BASE_URL") {
            config.youtube.base_url = base_url;
        }
        if let Some(bind) = lookup("BIND_ADDRESS") {
            config.server.bind_address = bind;
        }
        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            config.server.allowed_origins = origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
        }
        if let Some(attempts) = parse_var(&lookup, "GENERATION_MAX_ATTEMPTS")? {
            config.generation.max_attempts = attempts;
        }
        if let Some(max_videos) = parse_var(&lookup, "MAX_VIDEOS_PER_CHAPTER")? {
            config.youtube.max_videos_per_chapter = max_videos;
        }
        if let Some(path_style) = parse_var(&lookup, "S3_FORCE_PATH_STYLE")? {
            config.aws.s3_force_path_style = path_style;
        }

        Ok(config)
    }
}

fn parse_backend(value: &str) -> Result<StorageKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "s3" => Ok(StorageKind::S3),
        "local" => Ok(StorageKind::Local),
        other => Err(CourseError::InvalidConfigValueError {
            field: "STORAGE_BACKEND".to_string(),
            value: other.to_string(),
            reason: "Expected 's3' or 'local'".to_string(),
        }),
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| CourseError::InvalidConfigValueError {
                field: name.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}
