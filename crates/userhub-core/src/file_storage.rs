//! File storage abstraction layer.
//!
//! Services depend on the [`FileStorage`] trait so the backend can change
//! (local disk today, an object store later) without touching business logic.
//! Keys are relative, slash-separated paths such as `profile_photos/42.png`.
//!
//! ```ignore
//! let storage = LocalFileStorage::new(
//!     PathBuf::from("./public"),
//!     "http://localhost:3000/public".to_string(),
//! );
//!
//! storage.save("profile_photos/42.png", &bytes).await?;
//! let url = storage.get_url("profile_photos/42.png")?;
//! storage.delete("profile_photos/42.png").await?;
//! ```

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tokio::fs;

pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Abstract trait for file storage backends.
pub trait FileStorage: Send + Sync {
    /// Saves `content` under `key`, replacing any existing file. Returns the key.
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String>;

    /// Deletes the file at `key`. A missing file is not an error.
    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;

    /// Moves the file at `from` to `to`, replacing any file already there.
    /// A missing source is not an error.
    fn rename<'a>(&'a self, from: &'a str, to: &'a str) -> StorageFuture<'a, ()>;

    /// Public URL for the file at `key`.
    fn get_url(&self, key: &str) -> Result<String, StorageError>;
}

#[derive(Debug)]
pub enum StorageError {
    /// I/O error from the underlying filesystem.
    IoError(std::io::Error),

    /// Key is empty, absolute, escapes the base directory, or has odd characters.
    InvalidKey(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::InvalidKey(msg) => write!(f, "Invalid storage key: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

/// Stores files under a directory on local disk, served over HTTP from
/// `base_url`.
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String) -> Self {
        Self { base_dir, base_url }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with a separator".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/' | '.'))
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}

impl FileStorage for LocalFileStorage {
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String> {
        Box::pin(async move {
            Self::validate_key(key)?;

            let file_path = self.base_dir.join(key);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&file_path, content).await?;

            tracing::debug!(storage.key = %key, file.size = content.len(), "File saved");
            Ok(key.to_string())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            Self::validate_key(key)?;

            match fs::remove_file(self.base_dir.join(key)).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn rename<'a>(&'a self, from: &'a str, to: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            Self::validate_key(from)?;
            Self::validate_key(to)?;

            let source = self.base_dir.join(from);
            if !fs::try_exists(&source).await? {
                tracing::debug!(storage.key = %from, "Nothing to move");
                return Ok(());
            }

            let target = self.base_dir.join(to);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::rename(&source, &target).await?;

            tracing::debug!(storage.from = %from, storage.to = %to, "File moved");
            Ok(())
        })
    }

    fn get_url(&self, key: &str) -> Result<String, StorageError> {
        Self::validate_key(key)?;
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_in(dir: &tempfile::TempDir) -> LocalFileStorage {
        LocalFileStorage::new(
            dir.path().to_path_buf(),
            "http://localhost:3000/public/".to_string(),
        )
    }

    #[test]
    fn test_validate_key() {
        assert!(LocalFileStorage::validate_key("profile_photos/42.png").is_ok());
        assert!(LocalFileStorage::validate_key("").is_err());
        assert!(LocalFileStorage::validate_key("../etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("/etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("\\windows\\system32").is_err());
        assert!(LocalFileStorage::validate_key("profile photos/42.png").is_err());
    }

    #[test]
    fn test_get_url_trims_trailing_slash() {
        let dir = tempfile::tempdir().unwrap();
        let url = storage_in(&dir).get_url("profile_photos/9.png").unwrap();
        assert_eq!(url, "http://localhost:3000/public/profile_photos/9.png");
    }

    #[tokio::test]
    async fn test_save_creates_parent_dirs_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);

        storage.save("profile_photos/1.png", b"first").await.unwrap();
        storage.save("profile_photos/1.png", b"second").await.unwrap();

        let on_disk = std::fs::read(dir.path().join("profile_photos/1.png")).unwrap();
        assert_eq!(on_disk, b"second");
    }

    #[tokio::test]
    async fn test_delete_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);

        storage.save("profile_photos/2.png", b"x").await.unwrap();
        storage.delete("profile_photos/2.png").await.unwrap();
        assert!(!dir.path().join("profile_photos/2.png").exists());

        storage.delete("profile_photos/2.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_rename_moves_file_into_new_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);

        storage.save("profile_photos/3.png", b"photo").await.unwrap();
        storage
            .rename("profile_photos/3.png", "archived_photos/3.png")
            .await
            .unwrap();

        assert!(!dir.path().join("profile_photos/3.png").exists());
        let moved = std::fs::read(dir.path().join("archived_photos/3.png")).unwrap();
        assert_eq!(moved, b"photo");
    }

    #[tokio::test]
    async fn test_rename_tolerates_missing_source_and_rejects_bad_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);

        storage
            .rename("profile_photos/4.png", "archived_photos/4.png")
            .await
            .unwrap();
        assert!(!dir.path().join("archived_photos/4.png").exists());

        assert!(storage.rename("profile_photos/4.png", "../4.png").await.is_err());
    }
}
