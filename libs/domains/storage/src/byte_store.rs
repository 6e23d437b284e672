use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use md5::{Digest, Md5};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{StorageError, StorageResult};

/// MD5 and CRC32C of a byte stream, both base64-encoded, computed in a single pass.
#[derive(Debug, Clone)]
pub struct Digests {
    pub md5_base64: String,
    pub crc32c_base64: String,
    pub size: u64,
}

/// Rooted at a configured base directory; every path this returns is guaranteed
/// to live under `base/bucket/`.
#[derive(Debug, Clone)]
pub struct ByteStore {
    base_dir: PathBuf,
}

impl ByteStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Rejects empty names, leading `/`, any `.`/`..` component, NUL bytes, and
    /// anything that would resolve outside `base/bucket/` after joining.
    pub fn sanitize_name(&self, bucket: &str, name: &str) -> StorageResult<PathBuf> {
        if name.is_empty() || name.starts_with('/') || name.contains('\0') {
            return Err(StorageError::PathTraversal(name.to_string()));
        }
        let candidate = Path::new(name);
        for component in candidate.components() {
            match component {
                Component::Normal(_) => {}
                _ => return Err(StorageError::PathTraversal(name.to_string())),
            }
        }

        let bucket_root = self.base_dir.join(bucket);
        let resolved = bucket_root.join(candidate);

        let mut normalized = PathBuf::new();
        for component in resolved.components() {
            match component {
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(StorageError::PathTraversal(name.to_string()));
                    }
                }
                other => normalized.push(other.as_os_str()),
            }
        }

        if !normalized.starts_with(&bucket_root) {
            return Err(StorageError::PathTraversal(name.to_string()));
        }

        Ok(normalized)
    }

    /// Each upload lands on a fresh, content-unique path keyed by `token` rather
    /// than the object name or generation: generation numbers are assigned by the
    /// repository only after bytes are durably on disk, so the path can't depend
    /// on one. Overwriting a non-versioned object leaves its previous blob behind
    /// for [`Self::sweep_orphans`] to reclaim once the metadata row stops
    /// referencing it.
    pub fn blob_path(&self, bucket: &str, name: &str, token: uuid::Uuid) -> StorageResult<PathBuf> {
        let sanitized = self.sanitize_name(bucket, name)?;
        let relative = sanitized
            .strip_prefix(self.base_dir.join(bucket))
            .map_err(|_| StorageError::Internal("blob path escaped bucket root".to_string()))?;
        Ok(self
            .base_dir
            .join(bucket)
            .join(".blobs")
            .join(relative)
            .join(token.to_string()))
    }

    /// Writes `bytes` to `target` atomically: a temp file in the same directory is
    /// written, fsynced, then renamed over `target`. The temp file is removed on
    /// any failure, so a failed write never leaves a partial target behind.
    pub async fn write_atomic(&self, target: &Path, bytes: &[u8]) -> StorageResult<Digests> {
        let parent = target.parent().ok_or_else(|| {
            StorageError::Internal("object path has no parent directory".to_string())
        })?;
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::Internal(format!("failed to create bucket directory: {e}")))?;

        let temp_path = parent.join(format!(".{}.tmp-{}", uuid::Uuid::new_v4(), std::process::id()));

        let digests = match self.write_temp(&temp_path, bytes).await {
            Ok(digests) => digests,
            Err(err) => {
                let _ = fs::remove_file(&temp_path).await;
                return Err(err);
            }
        };

        if let Err(e) = fs::rename(&temp_path, target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::Internal(format!("failed to commit object write: {e}")));
        }

        Ok(digests)
    }

    async fn write_temp(&self, temp_path: &Path, bytes: &[u8]) -> StorageResult<Digests> {
        let mut file = fs::File::create(temp_path)
            .await
            .map_err(|e| StorageError::Internal(format!("failed to create temp file: {e}")))?;
        file.write_all(bytes)
            .await
            .map_err(|e| StorageError::Internal(format!("failed to write object bytes: {e}")))?;
        file.sync_all()
            .await
            .map_err(|e| StorageError::Internal(format!("failed to fsync object bytes: {e}")))?;

        let mut hasher = Md5::new();
        hasher.update(bytes);
        let md5_base64 = BASE64.encode(hasher.finalize());
        let crc32c_base64 = BASE64.encode(crc32c::crc32c(bytes).to_be_bytes());

        Ok(Digests {
            md5_base64,
            crc32c_base64,
            size: bytes.len() as u64,
        })
    }

    pub async fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        fs::read(path)
            .await
            .map_err(|e| StorageError::ObjectNotFound(format!("{}: {e}", path.display())))
    }

    pub async fn delete(&self, path: &Path) -> StorageResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Internal(format!("failed to delete object file: {e}"))),
        }
    }

    /// Removes files under `base_dir` with no corresponding live path in `live_paths`.
    /// Run periodically from `apps/emulator-api` so crash recovery never leaves
    /// orphaned bytes behind indefinitely.
    pub async fn sweep_orphans(&self, live_paths: &[PathBuf]) -> StorageResult<usize> {
        let mut removed = 0;
        let mut stack = vec![self.base_dir.clone()];
        while let Some(dir) = stack.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(_) => continue,
            };
            while let Ok(Some(entry)) = entries.next_entry().await {
                let path = entry.path();
                let file_type = match entry.file_type().await {
                    Ok(ft) => ft,
                    Err(_) => continue,
                };
                if file_type.is_dir() {
                    stack.push(path);
                } else if file_type.is_file()
                    && !live_paths.contains(&path)
                    && !path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(".") && n.contains(".tmp-"))
                {
                    if fs::remove_file(&path).await.is_ok() {
                        removed += 1;
                    }
                }
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sanitize_rejects_parent_dir_escape() {
        let store = ByteStore::new("/tmp/emulator-test-bucket-root");
        let err = store.sanitize_name("bucket", "../escape").unwrap_err();
        assert!(matches!(err, StorageError::PathTraversal(_)));
    }

    #[tokio::test]
    async fn sanitize_rejects_leading_slash_and_empty() {
        let store = ByteStore::new("/tmp/emulator-test-bucket-root");
        assert!(store.sanitize_name("bucket", "/abs").is_err());
        assert!(store.sanitize_name("bucket", "").is_err());
    }

    #[tokio::test]
    async fn sanitize_accepts_nested_names() {
        let store = ByteStore::new("/tmp/emulator-test-bucket-root");
        let path = store.sanitize_name("bucket", "dir/sub/file.txt").unwrap();
        assert!(path.ends_with("bucket/dir/sub/file.txt"));
    }

    #[tokio::test]
    async fn write_read_delete_round_trip() {
        let base = std::env::temp_dir().join(format!("emulator-bytestore-{}", uuid::Uuid::new_v4()));
        let store = ByteStore::new(&base);
        let target = store.sanitize_name("bucket", "hello.txt").unwrap();

        let digests = store.write_atomic(&target, b"hello world").await.unwrap();
        assert_eq!(digests.size, 11);

        let bytes = store.read(&target).await.unwrap();
        assert_eq!(bytes, b"hello world");

        store.delete(&target).await.unwrap();
        assert!(store.read(&target).await.is_err());

        let _ = fs::remove_dir_all(&base).await;
    }
}
