//! Permanent storage for generated images.

use crate::FileManager;
use pictor_error::{PictorResult, StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};

/// Extension every stored image is written under.
pub const IMAGE_EXTENSION: &str = "webp";

/// Stores image blobs as `{uuid}.webp` under a root directory.
///
/// Each stored image has exactly one writer: the store issues the name, so
/// writes to different identifiers never collide. No locking is performed;
/// a delete racing a read of the same file has no defined winner.
#[derive(Debug, Clone)]
pub struct ImageStore {
    files: FileManager,
}

impl ImageStore {
    /// Open (creating if needed) an image store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> PictorResult<Self> {
        let files = FileManager::new(root)?;
        tracing::info!(path = %files.root().display(), "Created image store");
        Ok(Self { files })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        self.files.root()
    }

    /// Take ownership of the bytes at `source`.
    ///
    /// Copies the file into the store under a fresh identifier, then removes
    /// `source`. If the copy fails the source is left untouched and any
    /// partial destination is removed.
    ///
    /// # Returns
    ///
    /// Full path of the stored image.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `source` does not exist
    /// - `FileWrite` if the copy or the removal of `source` fails
    #[tracing::instrument(skip(self, source), fields(source = %source.as_ref().display()))]
    pub async fn persist_from_local_file(&self, source: impl AsRef<Path>) -> PictorResult<PathBuf> {
        let source = source.as_ref();
        let filename = self.files.generate_filename(IMAGE_EXTENSION);
        let dest = self.files.full_path(&filename)?;

        if let Err(e) = tokio::fs::copy(source, &dest).await {
            if let Err(cleanup) = tokio::fs::remove_file(&dest).await
                && cleanup.kind() != std::io::ErrorKind::NotFound
            {
                tracing::warn!(
                    path = %dest.display(),
                    error = %cleanup,
                    "Failed to remove partial image copy"
                );
            }

            let source_missing = !tokio::fs::try_exists(source).await.unwrap_or(false);
            let kind = if source_missing {
                StorageErrorKind::NotFound(source.display().to_string())
            } else {
                StorageErrorKind::FileWrite(format!(
                    "copy {} to {}: {}",
                    source.display(),
                    dest.display(),
                    e
                ))
            };
            tracing::error!(error = %e, "Failed to copy image into store");
            return Err(StorageError::new(kind).into());
        }

        tokio::fs::remove_file(source).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "remove source {}: {}",
                source.display(),
                e
            )))
        })?;

        tracing::info!(filename = %filename, path = %dest.display(), "Saved image");
        Ok(dest)
    }

    /// Delete a stored image. Deleting an absent image is not an error.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, filename: &str) -> PictorResult<()> {
        if self.files.remove_if_present(filename).await? {
            tracing::info!(filename, "Deleted image");
        } else {
            tracing::warn!(filename, "Image not found");
        }
        Ok(())
    }

    /// Resolve a stored image for serving.
    ///
    /// # Errors
    ///
    /// `NotFound` unless `filename` names a regular file in the store.
    pub async fn locate(&self, filename: &str) -> PictorResult<PathBuf> {
        let path = self.files.full_path(filename)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(StorageError::new(StorageErrorKind::NotFound(filename.to_string())).into()),
            Err(e) => Err(StorageError::from_io(&e, &path, StorageErrorKind::FileRead).into()),
        }
    }

    /// Check whether `filename` is a stored image.
    pub async fn exists(&self, filename: &str) -> PictorResult<bool> {
        match self.locate(filename).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
