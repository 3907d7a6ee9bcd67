#[cfg(feature = "server")]
pub mod cli;
pub mod env;
pub mod toml_config;

use crate::core::generation::RetryPolicy;
use crate::core::ranking::RankingWeights;
use crate::domain::model::CourseCategory;
use crate::utils::error::{CourseError, Result};
use crate::utils::validation::{
    validate_aws_region, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, validate_s3_bucket_name, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

/// 服務啟動時建立一次，之後以參數傳入各元件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub aws: AwsSettings,
    pub storage: StorageConfig,
    pub generation: GenerationConfig,
    pub youtube: YouTubeConfig,
    pub ranking: RankingWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub allowed_origins: Vec<String>,
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
            request_timeout_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsSettings {
    pub region: String,
    /// S3 相容服務（MinIO、LocalStack）需要 path-style
    pub s3_force_path_style: bool,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            s3_force_path_style: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    S3,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageKind,
    pub bucket: String,
    pub folder: String,
    pub local_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageKind::S3,
            bucket: String::new(),
            folder: "courses".to_string(),
            local_path: "./course-store".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// 依課程分類覆寫模型
    pub models: HashMap<CourseCategory, String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout_seconds: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            models: HashMap::new(),
            max_tokens: 4096,
            temperature: 0.5,
            top_p: 0.9,
            timeout_seconds: 120,
            max_attempts: 4,
            initial_backoff_ms: 1_000,
            backoff_multiplier: 2.0,
            max_backoff_ms: 30_000,
        }
    }
}

impl GenerationConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            multiplier: self.backoff_multiplier,
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    pub api_key: String,
    pub base_url: String,
    pub results_per_keyword: u32,
    pub keywords_per_chapter: usize,
    pub max_videos_per_chapter: usize,
    pub timeout_seconds: u64,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            results_per_keyword: 5,
            keywords_per_chapter: 5,
            max_videos_per_chapter: 3,
            timeout_seconds: 10,
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }

    pub fn bind_address(&self) -> Result<SocketAddr> {
        self.server
            .bind_address
            .parse()
            .map_err(|e| CourseError::InvalidConfigValueError {
                field: "server.bind_address".to_string(),
                value: self.server.bind_address.clone(),
                reason: format!("Invalid socket address: {}", e),
            })
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        // 伺服器
        self.bind_address()?;
        validate_positive_number(
            "server.request_timeout_seconds",
            self.server.request_timeout_seconds as usize,
            1,
        )?;

        validate_aws_region("aws.region", &self.aws.region)?;

        // 儲存
        validate_non_empty_string("storage.folder", &self.storage.folder)?;
        match self.storage.backend {
            StorageKind::S3 => validate_s3_bucket_name("storage.bucket", &self.storage.bucket)?,
            StorageKind::Local => validate_path("storage.local_path", &self.storage.local_path)?,
        }

        // 生成
        for (category, model_id) in &self.generation.models {
            validate_non_empty_string(&format!("generation.models.{}", category), model_id)?;
        }
        validate_range("generation.max_attempts", self.generation.max_attempts, 1, 10)?;
        validate_range("generation.temperature", self.generation.temperature, 0.0, 1.0)?;
        validate_range("generation.top_p", self.generation.top_p, 0.0, 1.0)?;
        validate_positive_number("generation.max_tokens", self.generation.max_tokens as usize, 1)?;
        validate_positive_number(
            "generation.timeout_seconds",
            self.generation.timeout_seconds as usize,
            1,
        )?;
        if self.generation.backoff_multiplier < 1.0 {
            return Err(CourseError::InvalidConfigValueError {
                field: "generation.backoff_multiplier".to_string(),
                value: self.generation.backoff_multiplier.to_string(),
                reason: "Multiplier must be at least 1.0".to_string(),
            });
        }

        // YouTube
        if self.youtube.api_key.trim().is_empty() {
            return Err(CourseError::MissingConfigError {
                field: "youtube.api_key".to_string(),
            });
        }
        validate_url("youtube.base_url", &self.youtube.base_url)?;
        validate_range("youtube.results_per_keyword", self.youtube.results_per_keyword, 1, 50)?;
        validate_positive_number("youtube.keywords_per_chapter", self.youtube.keywords_per_chapter, 1)?;
        validate_range(
            "youtube.max_videos_per_chapter",
            self.youtube.max_videos_per_chapter,
            1,
            10,
        )?;

        // 排序權重
        for (field, value) in [
            ("ranking.view_weight", self.ranking.view_weight),
            ("ranking.like_weight", self.ranking.like_weight),
            ("ranking.recency_weight", self.ranking.recency_weight),
        ] {
            if value < 0.0 {
                return Err(CourseError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: "Weight cannot be negative".to_string(),
                });
            }
        }
        if self.ranking.recency_half_life_days <= 0.0 {
            return Err(CourseError::InvalidConfigValueError {
                field: "ranking.recency_half_life_days".to_string(),
                value: self.ranking.recency_half_life_days.to_string(),
                reason: "Half-life must be positive".to_string(),
            });
        }

        tracing::info!("✅ Service configuration validation passed");
        Ok(())
    }
}
