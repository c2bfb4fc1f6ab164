//! Object storage seam for book payloads, with a local-filesystem implementation.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use super::LibraryError;

/// Write-once blob storage addressed by flat keys.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` under `key`. Never overwrites an existing object.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), LibraryError>;

    /// Deletes the object under `key`.
    async fn remove(&self, key: &str) -> Result<(), LibraryError>;

    /// Public URL readers use to fetch the object.
    fn public_url(&self, key: &str) -> String;
}

/// Stores objects as files in a single directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsObjectStore {
    /// Opens the store, creating `root` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Storage`] if the directory cannot be created.
    pub async fn open(
        root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, LibraryError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| LibraryError::storage(root.display().to_string(), source))?;
        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Directory holding the objects.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, LibraryError> {
        if !is_flat_key(key) {
            return Err(LibraryError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    #[instrument(skip(self, bytes), fields(key = %key, bytes = bytes.len()))]
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), LibraryError> {
        let path = self.object_path(key)?;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::AlreadyExists {
                    LibraryError::ObjectExists {
                        key: key.to_string(),
                    }
                } else {
                    LibraryError::storage(key, source)
                }
            })?;

        let written = async {
            file.write_all(bytes).await?;
            file.flush().await
        }
        .await;

        if let Err(source) = written {
            debug!(path = %path.display(), "cleaning up partial object after error");
            let _ = tokio::fs::remove_file(&path).await;
            return Err(LibraryError::storage(key, source));
        }

        info!(content_type, "object stored");
        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn remove(&self, key: &str) -> Result<(), LibraryError> {
        let path = self.object_path(key)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|source| LibraryError::storage(key, source))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, urlencoding::encode(key))
    }
}

/// A key is a single normal path component (no separators, no `.`/`..`).
fn is_flat_key(key: &str) -> bool {
    if key.is_empty() || key.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(key).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, FsObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::open(dir.path().join("epubs"), "http://localhost:3000/files/")
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_put_then_remove_roundtrip() {
        let (_dir, store) = store().await;
        store.put("dune-1.epub", b"PK\x03\x04", "application/epub+zip").await.unwrap();
        assert!(store.root().join("dune-1.epub").exists());

        store.remove("dune-1.epub").await.unwrap();
        assert!(!store.root().join("dune-1.epub").exists());
    }

    #[tokio::test]
    async fn test_put_never_overwrites() {
        let (_dir, store) = store().await;
        store.put("a.epub", b"first", "application/epub+zip").await.unwrap();
        let second = store.put("a.epub", b"second", "application/epub+zip").await;

        assert!(matches!(second, Err(LibraryError::ObjectExists { .. })));
        assert_eq!(std::fs::read(store.root().join("a.epub")).unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_put_rejects_path_traversal_keys() {
        let (_dir, store) = store().await;
        for key in ["../escape.epub", "nested/a.epub", "..", ".", ""] {
            let result = store.put(key, b"x", "application/epub+zip").await;
            assert!(
                matches!(result, Err(LibraryError::InvalidKey { .. })),
                "key {key:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_public_url_joins_base_without_double_slash() {
        let (_dir, store) = store().await;
        assert_eq!(
            store.public_url("dune-1.epub"),
            "http://localhost:3000/files/dune-1.epub"
        );
    }
}
