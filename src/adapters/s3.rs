use crate::domain::ports::{ObjectMetadata, Storage};
use crate::utils::error::{CourseError, Result};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

fn storage_error<E, R>(operation: &str, key: &str, err: &SdkError<E, R>) -> CourseError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    CourseError::StorageError {
        operation: operation.to_string(),
        key: key.to_string(),
        message: DisplayErrorContext(err).to_string(),
    }
}

fn http_status<E>(err: &SdkError<E, aws_sdk_s3::config::http::HttpResponse>) -> Option<u16> {
    err.raw_response().map(|r| r.status().as_u16())
}

impl Storage for S3Storage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let resp = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_no_such_key())
                    .unwrap_or(false)
                    || http_status(&err) == Some(404);
                return Err(if missing {
                    CourseError::NotFound {
                        resource: path.to_string(),
                    }
                } else {
                    storage_error("read", path, &err)
                });
            }
        };

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| CourseError::StorageError {
                operation: "read".to_string(),
                key: path.to_string(),
                message: format!("Failed to collect S3 data: {}", e),
            })?;

        Ok(data.into_bytes().to_vec())
    }

    async fn write_file(&self, path: &str, data: &[u8], metadata: &ObjectMetadata) -> Result<()> {
        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type("application/json")
            .set_metadata(Some(metadata.clone()))
            .if_none_match("*")
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::debug!("💾 Uploaded s3://{}/{}", self.bucket, path);
                Ok(())
            }
            Err(err)
                if err.code() == Some("PreconditionFailed")
                    || http_status(&err) == Some(412) =>
            {
                Err(CourseError::AlreadyExists {
                    resource: path.to_string(),
                })
            }
            Err(err) => Err(storage_error("write", path, &err)),
        }
    }

    async fn list_files(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| storage_error("list", prefix, &e))?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );
        }

        Ok(keys)
    }

    async fn read_metadata(&self, path: &str) -> Result<ObjectMetadata> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(resp) => Ok(resp.metadata().cloned().unwrap_or_default()),
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false)
                    || http_status(&err) == Some(404);
                Err(if missing {
                    CourseError::NotFound {
                        resource: path.to_string(),
                    }
                } else {
                    storage_error("head", path, &err)
                })
            }
        }
    }

    fn location(&self, path: &str) -> String {
        format!("s3://{}/{}", self.bucket, path)
    }
}
