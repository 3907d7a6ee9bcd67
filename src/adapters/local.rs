use crate::domain::ports::{ObjectMetadata, Storage};
use crate::utils::error::{CourseError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// metadata 以 JSON 存在同名的 sidecar 檔
const META_SUFFIX: &str = ".meta";
const STAGING_SUFFIX: &str = ".partial";

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }

    fn meta_path(&self, path: &str) -> PathBuf {
        self.base_path.join(format!("{}{}", path, META_SUFFIX))
    }

    fn not_found_or(err: std::io::Error, path: &str) -> CourseError {
        if err.kind() == ErrorKind::NotFound {
            CourseError::NotFound {
                resource: path.to_string(),
            }
        } else {
            CourseError::IoError(err)
        }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        fs::read(self.full_path(path))
            .await
            .map_err(|e| Self::not_found_or(e, path))
    }

    async fn write_file(&self, path: &str, data: &[u8], metadata: &ObjectMetadata) -> Result<()> {
        let full_path = self.full_path(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // 先寫暫存檔再 hard link 到目標：不完整的內容不會佔用鍵，且目標已存在時 link 失敗
        let staging_path = self.base_path.join(format!(
            "{}.{:08x}{}",
            path,
            rand::random::<u32>(),
            STAGING_SUFFIX
        ));
        let linked = match fs::write(&staging_path, data).await {
            Ok(()) => fs::hard_link(&staging_path, &full_path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = fs::remove_file(&staging_path).await {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(
                    "⚠️ Failed to remove staging file {}: {}",
                    staging_path.display(),
                    e
                );
            }
        }
        match linked {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(CourseError::AlreadyExists {
                    resource: path.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        }

        if !metadata.is_empty() {
            fs::write(self.meta_path(path), serde_json::to_vec(metadata)?).await?;
        }

        tracing::debug!("💾 Wrote {} byte(s) to {}", data.len(), full_path.display());
        Ok(())
    }

    async fn list_files(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![self.base_path.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                    continue;
                }
                if let Some(key) = relative_key(&self.base_path, &path) {
                    if key.starts_with(prefix)
                        && !key.ends_with(META_SUFFIX)
                        && !key.ends_with(STAGING_SUFFIX)
                    {
                        keys.push(key);
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn read_metadata(&self, path: &str) -> Result<ObjectMetadata> {
        if !fs::try_exists(self.full_path(path)).await? {
            return Err(CourseError::NotFound {
                resource: path.to_string(),
            });
        }

        match fs::read(self.meta_path(path)).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ObjectMetadata::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn location(&self, path: &str) -> String {
        format!("file://{}", self.full_path(path).display())
    }
}

/// 以 `/` 分隔的相對鍵，跨平台一致
fn relative_key(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn metadata(pairs: &[(&str, &str)]) -> ObjectMetadata {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage
            .write_file("courses/a.json", b"{}", &ObjectMetadata::new())
            .await
            .unwrap();

        assert_eq!(storage.read_file("courses/a.json").await.unwrap(), b"{}");
        assert!(dir.path().join("courses/a.json").exists());
    }

    #[tokio::test]
    async fn test_write_is_create_only() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage
            .write_file("a.json", b"first", &ObjectMetadata::new())
            .await
            .unwrap();

        let err = storage
            .write_file("a.json", b"second", &ObjectMetadata::new())
            .await
            .unwrap_err();

        assert!(matches!(err, CourseError::AlreadyExists { .. }));
        assert_eq!(storage.read_file("a.json").await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_interrupted_write_does_not_block_the_key() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        std::fs::create_dir_all(dir.path().join("courses")).unwrap();
        // 上次寫入中斷留下的半成品
        std::fs::write(
            dir.path().join("courses/a.json.0badf00d.partial"),
            b"{\"course_id\": \"a\", \"cha",
        )
        .unwrap();

        assert!(storage.list_files("courses/").await.unwrap().is_empty());

        storage
            .write_file("courses/a.json", b"{}", &ObjectMetadata::new())
            .await
            .unwrap();

        assert_eq!(storage.read_file("courses/a.json").await.unwrap(), b"{}");
        assert_eq!(storage.list_files("courses/").await.unwrap(), vec!["courses/a.json"]);
    }

    #[tokio::test]
    async fn test_write_leaves_no_staging_files() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        let meta = metadata(&[("topic", "Rust")]);

        storage.write_file("courses/a.json", b"{}", &meta).await.unwrap();
        storage
            .write_file("courses/a.json", b"second", &meta)
            .await
            .unwrap_err();

        let mut names: Vec<String> = std::fs::read_dir(dir.path().join("courses"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.json", "a.json.meta"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        assert!(matches!(
            storage.read_file("nope.json").await,
            Err(CourseError::NotFound { .. })
        ));
        assert!(matches!(
            storage.read_metadata("nope.json").await,
            Err(CourseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_metadata_sidecar() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        let meta = metadata(&[("topic", "Rust"), ("course-title", "Rust 101")]);

        storage.write_file("c/a.json", b"{}", &meta).await.unwrap();
        storage
            .write_file("c/b.json", b"{}", &ObjectMetadata::new())
            .await
            .unwrap();

        assert_eq!(storage.read_metadata("c/a.json").await.unwrap(), meta);
        assert!(storage.read_metadata("c/b.json").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_files_filters_prefix_and_sidecars() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        let meta = metadata(&[("topic", "Rust")]);

        storage.write_file("courses/a.json", b"{}", &meta).await.unwrap();
        storage.write_file("courses/b.json", b"{}", &meta).await.unwrap();
        storage.write_file("other/c.json", b"{}", &meta).await.unwrap();

        let keys = storage.list_files("courses/").await.unwrap();

        assert_eq!(keys, vec!["courses/a.json", "courses/b.json"]);
    }

    #[tokio::test]
    async fn test_list_files_on_missing_base_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("not-created"));

        assert!(storage.list_files("").await.unwrap().is_empty());
    }

    #[test]
    fn test_location_uses_file_scheme() {
        let storage = LocalStorage::new("/tmp/store");
        assert_eq!(storage.location("courses/a.json"), "file:///tmp/store/courses/a.json");
    }
}
