//! Shared directory handling for the image and metadata stores.

use pictor_core::unique_filename;
use pictor_error::{PictorResult, StorageError, StorageErrorKind};
use std::path::{Component, Path, PathBuf};

/// A flat directory of files addressed by bare filename.
///
/// Filenames are single path components: anything containing a separator,
/// `.`/`..`, or nothing at all is rejected so callers cannot escape the root.
#[derive(Debug, Clone)]
pub struct FileManager {
    root: PathBuf,
}

impl FileManager {
    /// Create a manager rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(root))]
    pub fn new(root: impl Into<PathBuf>) -> PictorResult<Self> {
        let root = root.into();

        std::fs::create_dir_all(&root).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                root.display(),
                e
            )))
        })?;

        tracing::debug!(path = %root.display(), "Opened storage directory");
        Ok(Self { root })
    }

    /// Directory every filename resolves under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generate a fresh `{uuid}.{extension}` filename.
    pub fn generate_filename(&self, extension: &str) -> String {
        unique_filename(extension)
    }

    /// Resolve `filename` to a full path under the root.
    pub fn full_path(&self, filename: &str) -> PictorResult<PathBuf> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !filename.contains(['/', '\\']) => {
                Ok(self.root.join(filename))
            }
            _ => Err(StorageError::new(StorageErrorKind::InvalidPath(filename.to_string())).into()),
        }
    }

    /// Remove `filename`, treating an absent file as success.
    ///
    /// Returns `true` when a file was actually removed.
    pub(crate) async fn remove_if_present(&self, filename: &str) -> PictorResult<bool> {
        let path = self.full_path(filename)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "delete {}: {}",
                path.display(),
                e
            )))
            .into()),
        }
    }
}
