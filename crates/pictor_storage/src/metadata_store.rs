//! JSON metadata records paired with stored images.

use crate::{FileManager, ImagePage, MetadataRecord};
use chrono::SecondsFormat;
use pictor_core::{Clock, SystemClock, file_stem};
use pictor_error::{JsonError, PictorResult, StorageError, StorageErrorKind};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Key stamped with the UTC save time.
pub const TIMESTAMP_KEY: &str = "timestamp";
/// Key stamped with the paired image filename.
pub const IMAGE_FILENAME_KEY: &str = "image_filename";

const METADATA_EXTENSION: &str = "json";

/// Stores one JSON record per image as `{id}.json`.
///
/// The pairing with the image is by shared basename only. Nothing here
/// checks that the image still exists.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    files: FileManager,
    clock: Arc<dyn Clock>,
}

impl MetadataStore {
    /// Open (creating if needed) a metadata store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> PictorResult<Self> {
        Self::with_clock(root, Arc::new(SystemClock))
    }

    /// Open a metadata store that stamps records with `clock`.
    pub fn with_clock(root: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> PictorResult<Self> {
        let files = FileManager::new(root)?;
        tracing::info!(path = %files.root().display(), "Created metadata store");
        Ok(Self { files, clock })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        self.files.root()
    }

    /// Metadata filename paired with `image_filename` (`abc.webp` → `abc.json`).
    pub fn metadata_filename(image_filename: &str) -> String {
        format!("{}.{}", file_stem(image_filename), METADATA_EXTENSION)
    }

    /// Save `metadata` for `image_filename`.
    ///
    /// `timestamp` and `image_filename` are always overwritten: any value the
    /// caller put under those keys is discarded.
    ///
    /// # Returns
    ///
    /// The metadata filename that was written.
    #[tracing::instrument(skip(self, metadata), fields(fields = metadata.len()))]
    pub async fn save(&self, image_filename: &str, mut metadata: MetadataRecord) -> PictorResult<String> {
        let filename = Self::metadata_filename(image_filename);
        let path = self.files.full_path(&filename)?;

        let timestamp = self.clock.now().to_rfc3339_opts(SecondsFormat::Micros, false);
        metadata.insert(TIMESTAMP_KEY.to_string(), Value::String(timestamp));
        metadata.insert(
            IMAGE_FILENAME_KEY.to_string(),
            Value::String(image_filename.to_string()),
        );

        let bytes = serde_json::to_vec_pretty(&metadata).map_err(JsonError::from)?;
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;

        tracing::info!(filename = %filename, "Saved metadata");
        Ok(filename)
    }

    /// Read a metadata record. An absent file yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// `FileRead` on I/O failure, `Json` if the file is not a JSON object.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, filename: &str) -> PictorResult<Option<MetadataRecord>> {
        let path = self.files.full_path(filename)?;

        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
                .into());
            }
        };

        let record = serde_json::from_slice::<MetadataRecord>(&contents).map_err(|e| {
            JsonError::new(format!("{}: {}", path.display(), e))
        })?;
        Ok(Some(record))
    }

    /// Delete a metadata record. Deleting an absent record is not an error.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, filename: &str) -> PictorResult<()> {
        if self.files.remove_if_present(filename).await? {
            tracing::info!(filename, "Deleted metadata");
        } else {
            tracing::warn!(filename, "Metadata not found");
        }
        Ok(())
    }

    /// List records newest-first by file modification time.
    ///
    /// `page` is 1-based. Pages outside the collection (including page 0)
    /// come back empty with `total_pages` still computed. Files sharing a
    /// modification time keep directory enumeration order.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `per_page` is zero, `FileRead` if the directory
    /// cannot be scanned, `Json` if a record on the page is malformed.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, page: usize, per_page: usize) -> PictorResult<ImagePage> {
        if per_page == 0 {
            return Err(StorageError::new(StorageErrorKind::InvalidArgument(
                "per_page must be at least 1".to_string(),
            ))
            .into());
        }

        let mut entries = self.scan().await?;
        entries.sort_by(|a, b| b.0.cmp(&a.0));

        let total_items = entries.len();
        let total_pages = ImagePage::page_count(total_items, per_page);

        let mut images = Vec::new();
        if let Some(range) = ImagePage::bounds(page, per_page, total_items) {
            for (_, filename) in &entries[range] {
                match self.get(filename).await? {
                    Some(record) => images.push(record),
                    None => tracing::debug!(filename = %filename, "Metadata vanished during listing"),
                }
            }
        }

        tracing::debug!(total_items, total_pages, returned = images.len(), "Listed metadata");
        Ok(ImagePage { images, total_pages })
    }

    /// Every `*.json` regular file with its modification time.
    async fn scan(&self) -> PictorResult<Vec<(SystemTime, String)>> {
        let root = self.files.root();
        let read_error = |e: std::io::Error| {
            StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", root.display(), e)))
        };

        let mut dir = tokio::fs::read_dir(root).await.map_err(read_error)?;
        let mut entries = Vec::new();

        while let Some(entry) = dir.next_entry().await.map_err(read_error)? {
            let Ok(filename) = entry.file_name().into_string() else {
                continue;
            };
            if Path::new(&filename).extension().and_then(|ext| ext.to_str()) != Some(METADATA_EXTENSION) {
                continue;
            }

            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(read_error(e).into()),
            };
            if !meta.is_file() {
                continue;
            }

            let modified = meta.modified().map_err(read_error)?;
            entries.push((modified, filename));
        }

        Ok(entries)
    }
}
