pub mod local;

#[cfg(feature = "aws")]
pub mod bedrock;
#[cfg(feature = "aws")]
pub mod s3;

use crate::domain::ports::{ObjectMetadata, Storage};
use crate::utils::error::Result;

pub use local::LocalStorage;

#[cfg(feature = "aws")]
pub use bedrock::BedrockGenerator;
#[cfg(feature = "aws")]
pub use s3::S3Storage;

/// 執行期依設定選擇的儲存後端
#[derive(Debug, Clone)]
pub enum StorageBackend {
    #[cfg(feature = "aws")]
    S3(S3Storage),
    Local(LocalStorage),
}

impl Storage for StorageBackend {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        match self {
            #[cfg(feature = "aws")]
            StorageBackend::S3(s) => s.read_file(path).await,
            StorageBackend::Local(s) => s.read_file(path).await,
        }
    }

    async fn write_file(&self, path: &str, data: &[u8], metadata: &ObjectMetadata) -> Result<()> {
        match self {
            #[cfg(feature = "aws")]
            StorageBackend::S3(s) => s.write_file(path, data, metadata).await,
            StorageBackend::Local(s) => s.write_file(path, data, metadata).await,
        }
    }

    async fn list_files(&self, prefix: &str) -> Result<Vec<String>> {
        match self {
            #[cfg(feature = "aws")]
            StorageBackend::S3(s) => s.list_files(prefix).await,
            StorageBackend::Local(s) => s.list_files(prefix).await,
        }
    }

    async fn read_metadata(&self, path: &str) -> Result<ObjectMetadata> {
        match self {
            #[cfg(feature = "aws")]
            StorageBackend::S3(s) => s.read_metadata(path).await,
            StorageBackend::Local(s) => s.read_metadata(path).await,
        }
    }

    fn location(&self, path: &str) -> String {
        match self {
            #[cfg(feature = "aws")]
            StorageBackend::S3(s) => s.location(path),
            StorageBackend::Local(s) => s.location(path),
        }
    }
}
