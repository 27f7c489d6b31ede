//! Evidence storage collaborator
//!
//! The submission core only persists an opaque reference to screenshot
//! evidence; where the bytes actually live is behind this trait.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Stores screenshot evidence blobs and hands back retrievable references
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Store an image blob, returning the opaque reference to persist
    async fn store(&self, blob: &[u8], content_type: &str) -> AppResult<String>;

    /// Retrieve a previously stored blob by its reference
    async fn retrieve(&self, reference: &str) -> AppResult<Vec<u8>>;

    /// Remove a stored blob that will never be referenced again
    async fn remove(&self, reference: &str) -> AppResult<()>;
}

/// MIME type for a stored reference, derived from its extension
pub fn content_type_for(reference: &str) -> &'static str {
    match reference.rsplit('.').next() {
        Some("png") => "image/png",
        Some("jpg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Filesystem-backed evidence store
///
/// References are relative file names under the configured directory, so
/// the directory can be moved or served statically without rewriting rows.
pub struct FsEvidenceStore {
    root: PathBuf,
}

impl FsEvidenceStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn resolve(&self, reference: &str) -> AppResult<PathBuf> {
        // References are generated by store(); anything with a path
        // separator did not come from us.
        if reference.contains('/') || reference.contains('\\') || reference.contains("..") {
            return Err(AppError::Storage(format!(
                "Invalid evidence reference: {reference}"
            )));
        }
        Ok(self.root.join(reference))
    }
}

#[async_trait]
impl EvidenceStore for FsEvidenceStore {
    async fn store(&self, blob: &[u8], content_type: &str) -> AppResult<String> {
        let ext = match content_type {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            other => {
                return Err(AppError::Validation(format!(
                    "Unsupported screenshot content type: {other}"
                )))
            }
        };

        let reference = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.root.join(&reference);

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        tokio::fs::write(&path, blob)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(reference)
    }

    async fn retrieve(&self, reference: &str) -> AppResult<Vec<u8>> {
        let path = self.resolve(reference)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| AppError::Storage(format!("{reference}: {e}")))
    }

    async fn remove(&self, reference: &str) -> AppResult<()> {
        let path = self.resolve(reference)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| AppError::Storage(format!("{reference}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_retrieve_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsEvidenceStore::new(dir.path().to_path_buf());

        let blob = b"\x89PNG fake image bytes";
        let reference = store.store(blob, "image/png").await.unwrap();
        assert!(reference.ends_with(".png"));

        let read_back = store.retrieve(&reference).await.unwrap();
        assert_eq!(read_back, blob);
    }

    #[tokio::test]
    async fn test_rejects_unsupported_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsEvidenceStore::new(dir.path().to_path_buf());

        let err = store.store(b"GIF89a", "image/gif").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_content_type_from_reference() {
        assert_eq!(content_type_for("abc.png"), "image/png");
        assert_eq!(content_type_for("abc.jpg"), "image/jpeg");
        assert_eq!(content_type_for("abc"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_remove_deletes_stored_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsEvidenceStore::new(dir.path().to_path_buf());

        let reference = store.store(b"orphaned bytes", "image/png").await.unwrap();
        store.remove(&reference).await.unwrap();

        assert!(store.retrieve(&reference).await.is_err());
    }

    #[tokio::test]
    async fn test_usable_behind_shared_trait_object() {
        // Handlers hold the store as Arc<dyn EvidenceStore> and services
        // borrow it as &dyn EvidenceStore.
        use std::sync::Arc;

        async fn round_trip(store: &dyn EvidenceStore) -> AppResult<Vec<u8>> {
            let reference = store.store(b"shared", "image/jpeg").await?;
            store.retrieve(&reference).await
        }

        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn EvidenceStore> =
            Arc::new(FsEvidenceStore::new(dir.path().to_path_buf()));

        let read_back = round_trip(store.as_ref()).await.unwrap();
        assert_eq!(read_back, b"shared");
    }

    #[tokio::test]
    async fn test_rejects_traversal_references() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsEvidenceStore::new(dir.path().to_path_buf());

        assert!(store.retrieve("../etc/passwd").await.is_err());
        assert!(store.retrieve("a/b.png").await.is_err());
    }
}
