//! Gallery operations keyed by image identifier.

use crate::{GenerationDetails, PictorConfig};
use derive_getters::Getters;
use pictor_cache::{ConvertOptions, DerivativeCache, DerivativeCacheStats, Sweeper, SweeperHandle};
use pictor_core::{ImageEncoding, file_stem};
use pictor_error::{PictorResult, StorageError, StorageErrorKind};
use pictor_storage::{IMAGE_EXTENSION, ImagePage, ImageStore, MetadataRecord, MetadataStore};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A newly stored image and its metadata record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct StoredEntry {
    id: String,
    image_filename: String,
    metadata_filename: String,
    image_path: PathBuf,
}

/// A converted copy of a stored image, ready to hand to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct Export {
    /// Derivative in the scratch directory
    path: PathBuf,
    /// Suggested attachment name, `{id}.{jpg|png}`
    download_name: String,
    #[getter(skip)]
    mime_type: &'static str,
}

impl Export {
    /// MIME type matching the derivative's encoding.
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }
}

/// The content store plus the derivative cache, addressed by identifier.
///
/// An identifier is the shared basename of `{id}.webp` and `{id}.json`.
///
/// # Example
///
/// ```no_run
/// use pictor::{Gallery, PictorConfig};
/// use pictor_cache::ConvertOptions;
/// use pictor_core::ImageEncoding;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let gallery = Gallery::from_config(&PictorConfig::load()?)?;
/// let sweeper = gallery.start_sweeper();
///
/// let metadata = json!({"prompt": "a lighthouse at dusk"}).as_object().cloned().unwrap_or_default();
/// let entry = gallery.record("/tmp/generated.webp", metadata).await?;
///
/// let export = gallery.export(entry.id(), ImageEncoding::Jpeg, ConvertOptions::default()).await?;
/// println!("{} -> {}", export.download_name(), export.path().display());
///
/// sweeper.stop().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Gallery {
    images: ImageStore,
    metadata: MetadataStore,
    derivatives: Arc<DerivativeCache>,
}

impl Gallery {
    /// Assemble a gallery from already-constructed stores.
    pub fn new(images: ImageStore, metadata: MetadataStore, derivatives: Arc<DerivativeCache>) -> Self {
        Self {
            images,
            metadata,
            derivatives,
        }
    }

    /// Build every store from configuration, creating directories as needed.
    pub fn from_config(config: &PictorConfig) -> PictorResult<Self> {
        Ok(Self::new(
            ImageStore::new(&config.storage.image_dir)?,
            MetadataStore::new(&config.storage.metadata_dir)?,
            Arc::new(DerivativeCache::new(config.derivatives.clone())?),
        ))
    }

    /// Image sub-store.
    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Metadata sub-store.
    pub fn metadata_store(&self) -> &MetadataStore {
        &self.metadata
    }

    /// Shared derivative cache.
    pub fn derivative_cache(&self) -> &Arc<DerivativeCache> {
        &self.derivatives
    }

    /// Move `source` into the image store and save `metadata` next to it.
    ///
    /// Not transactional: if the metadata write fails the image stays stored.
    #[tracing::instrument(skip(self, source, metadata), fields(source = %source.as_ref().display()))]
    pub async fn record(
        &self,
        source: impl AsRef<Path>,
        metadata: MetadataRecord,
    ) -> PictorResult<StoredEntry> {
        let image_path = self.images.persist_from_local_file(source).await?;
        let image_filename = image_path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::InvalidPath(
                    image_path.display().to_string(),
                ))
            })?;

        let metadata_filename = self.metadata.save(&image_filename, metadata).await?;
        let id = file_stem(&image_filename).to_string();

        tracing::info!(id = %id, "Recorded image");
        Ok(StoredEntry {
            id,
            image_filename,
            metadata_filename,
            image_path,
        })
    }

    /// [`record`](Self::record) with generation provenance merged into `extra`.
    pub async fn record_generation(
        &self,
        source: impl AsRef<Path>,
        details: GenerationDetails,
        mut extra: MetadataRecord,
    ) -> PictorResult<StoredEntry> {
        details.merge_into(&mut extra);
        self.record(source, extra).await
    }

    /// Metadata for `id`, or `None` if there is no record.
    pub async fn metadata(&self, id: &str) -> PictorResult<Option<MetadataRecord>> {
        self.metadata.get(&metadata_filename(id)).await
    }

    /// One page of metadata records, newest first.
    pub async fn page(&self, page: usize, per_page: usize) -> PictorResult<ImagePage> {
        self.metadata.list(page, per_page).await
    }

    /// Delete the image and the metadata for `id`.
    ///
    /// Each half is removed independently; a missing half is not an error.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> PictorResult<()> {
        self.images.delete(&image_filename(id)).await?;
        self.metadata.delete(&metadata_filename(id)).await?;
        Ok(())
    }

    /// Path of the stored image for `id`.
    pub async fn image_path(&self, id: &str) -> PictorResult<PathBuf> {
        self.images.locate(&image_filename(id)).await
    }

    /// Convert the stored image for `id` into `encoding`.
    ///
    /// The derivative is tracked by the cache and deleted once it expires.
    #[tracing::instrument(skip(self, encoding, options), fields(encoding = %encoding))]
    pub async fn export(
        &self,
        id: &str,
        encoding: ImageEncoding,
        options: ConvertOptions,
    ) -> PictorResult<Export> {
        let source = match self.image_path(id).await {
            Ok(path) => path,
            Err(e) if e.is_not_found() => {
                tracing::warn!(id, "Export requested for missing image");
                return Err(StorageError::new(StorageErrorKind::NotFound(format!(
                    "image not found: {id}"
                )))
                .into());
            }
            Err(e) => return Err(e),
        };

        let path = self
            .derivatives
            .convert_to_format(&source, encoding, options)
            .await?;

        Ok(Export {
            path,
            download_name: format!("{id}.{}", encoding.extension()),
            mime_type: encoding.mime_type(),
        })
    }

    /// Export `id` and copy the result to `dest`.
    ///
    /// The scratch derivative is discarded afterwards, whether or not the
    /// copy succeeded, so nothing is left for a sweep to find.
    #[tracing::instrument(skip(self, encoding, options, dest), fields(encoding = %encoding, dest = %dest.as_ref().display()))]
    pub async fn export_to(
        &self,
        id: &str,
        encoding: ImageEncoding,
        options: ConvertOptions,
        dest: impl AsRef<Path>,
    ) -> PictorResult<Export> {
        let dest = dest.as_ref();
        let export = self.export(id, encoding, options).await?;

        let copied = tokio::fs::copy(&export.path, dest).await;
        let discarded = self.derivatives.discard(&export.path).await;

        copied.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "copy {} to {}: {}",
                export.path.display(),
                dest.display(),
                e
            )))
        })?;
        discarded?;

        tracing::info!(path = %dest.display(), "Exported image");
        Ok(Export {
            path: dest.to_path_buf(),
            ..export
        })
    }

    /// Derivative cache snapshot.
    pub async fn derivatives(&self) -> DerivativeCacheStats {
        self.derivatives.inspect().await
    }

    /// Start evicting expired derivatives in the background.
    pub fn start_sweeper(&self) -> SweeperHandle {
        Sweeper::spawn(self.derivatives.clone())
    }
}

fn image_filename(id: &str) -> String {
    format!("{id}.{IMAGE_EXTENSION}")
}

fn metadata_filename(id: &str) -> String {
    MetadataStore::metadata_filename(&image_filename(id))
}
