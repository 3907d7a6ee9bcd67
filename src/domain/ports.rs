use crate::utils::error::{GenerationError, Result};
use async_trait::async_trait;
use std::collections::HashMap;

/// 物件的使用者自訂 metadata（S3 的 x-amz-meta-*）
pub type ObjectMetadata = HashMap<String, String>;

pub trait Storage: Send + Sync {
    /// 不存在時回傳 `CourseError::NotFound`
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    /// 只寫入新物件；鍵已存在時回傳 `CourseError::AlreadyExists`
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
        metadata: &ObjectMetadata,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// 列出 prefix 底下的所有鍵
    fn list_files(
        &self,
        prefix: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    /// 只讀 metadata，不下載內容
    fn read_metadata(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<ObjectMetadata>> + Send;

    fn location(&self, path: &str) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

/// 託管 LLM 的單次呼叫；重試由呼叫端負責
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
    ) -> std::result::Result<String, GenerationError>;
}
