//! Filesystem content store for Pictor.
//!
//! Two sibling stores share a [`FileManager`] base (unique filename
//! generation and filename → path resolution) but hold different payloads:
//!
//! - [`ImageStore`] keeps image blobs as `{uuid}.webp`.
//! - [`MetadataStore`] keeps a JSON record per image as `{uuid}.json`, stamped
//!   with `timestamp` and `image_filename` on every save.
//!
//! The image/metadata pairing is a filename convention, not an enforced
//! foreign key: a record whose image is gone is still listed.
//!
//! # Example
//!
//! ```rust
//! use pictor_storage::{ImageStore, MetadataRecord, MetadataStore};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let images = ImageStore::new("/tmp/pictor/images")?;
//! let metadata = MetadataStore::new("/tmp/pictor/metadata")?;
//!
//! let stored = images.persist_from_local_file("/tmp/generated.webp").await?;
//! let image_filename = stored.file_name().unwrap().to_string_lossy().to_string();
//!
//! let mut record = MetadataRecord::new();
//! record.insert("prompt".to_string(), json!("a cat"));
//! let saved = metadata.save(&image_filename, record).await?;
//!
//! let page = metadata.list(1, 12).await?;
//! assert!(!page.images.is_empty());
//! # let _ = saved;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod file_manager;
mod image_store;
mod metadata_store;
mod page;

pub use file_manager::FileManager;
pub use image_store::{IMAGE_EXTENSION, ImageStore};
pub use metadata_store::{IMAGE_FILENAME_KEY, MetadataStore, TIMESTAMP_KEY};
pub use page::ImagePage;
pub use pictor_error::{StorageError, StorageErrorKind};

/// A free-form metadata record as stored on disk.
pub type MetadataRecord = serde_json::Map<String, serde_json::Value>;
