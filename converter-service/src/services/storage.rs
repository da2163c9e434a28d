use crate::error::ConverterError;
use async_trait::async_trait;
use service_core::error::AppError;
use std::path::PathBuf;
use tokio::fs;

/// A directory-like store addressed by keys.
///
/// Keys are relative paths and are used as given.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create or overwrite the object at `key`.
    async fn upload(&self, key: &str, data: &[u8]) -> Result<(), ConverterError>;

    /// Open the object at `key` for streaming.
    async fn open(&self, key: &str) -> Result<fs::File, ConverterError>;

    /// Filesystem location backing `key`, for blocking readers and writers.
    fn path(&self, key: &str) -> PathBuf;
}

pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self { base_path })
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(&self, key: &str, data: &[u8]) -> Result<(), ConverterError> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, data).await?;
        Ok(())
    }

    async fn open(&self, key: &str) -> Result<fs::File, ConverterError> {
        Ok(fs::File::open(self.path(key)).await?)
    }

    fn path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "converter-storage-{}-{}",
            name,
            std::process::id()
        ))
    }

    #[tokio::test]
    async fn new_creates_missing_directory() {
        let dir = scratch_dir("create");
        let _ = fs::remove_dir_all(&dir).await;

        let storage = LocalStorage::new(&dir).await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(storage.path("photo.png"), dir.join("photo.png"));

        let _ = fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn upload_overwrites_existing_object() {
        let dir = scratch_dir("overwrite");
        let storage = LocalStorage::new(&dir).await.unwrap();

        storage.upload("photo.png", b"first version").await.unwrap();
        storage.upload("photo.png", b"second").await.unwrap();

        let mut contents = String::new();
        storage
            .open("photo.png")
            .await
            .unwrap()
            .read_to_string(&mut contents)
            .await
            .unwrap();
        assert_eq!(contents, "second");

        let _ = fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn nested_keys_create_parent_directories() {
        let dir = scratch_dir("nested");
        let storage = LocalStorage::new(&dir).await.unwrap();

        storage.upload("albums/2024/cover.jpg", b"jpeg").await.unwrap();
        assert!(dir.join("albums/2024/cover.jpg").is_file());

        let _ = fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn opening_missing_key_is_a_storage_error() {
        let dir = scratch_dir("missing");
        let storage = LocalStorage::new(&dir).await.unwrap();

        let err = storage.open("nope.pdf").await.unwrap_err();
        assert_eq!(err.kind(), "storage");

        let _ = fs::remove_dir_all(&dir).await;
    }
}
