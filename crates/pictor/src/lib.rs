//! Pictor - local image gallery backend.
//!
//! Stores generated images with their JSON metadata, lists them newest
//! first, and exports them as JPEG or PNG derivatives that expire on their
//! own.
//!
//! # Architecture
//!
//! Pictor is organized as a workspace with focused crates:
//!
//! - `pictor_error` - Error types
//! - `pictor_core` - Clock, filename generation, image encodings
//! - `pictor_storage` - Image and metadata stores
//! - `pictor_cache` - Format-converted derivatives with timed eviction
//!
//! This crate composes them into a [`Gallery`], loads [`PictorConfig`], and
//! ships the `pictor` binary.

#![warn(missing_docs)]

mod config;
mod gallery;
mod generation;
mod observability;

pub use config::{GalleryConfig, PictorConfig, StorageConfig};
pub use gallery::{Export, Gallery, StoredEntry};
pub use generation::GenerationDetails;
pub use observability::{LoggingConfig, init_logging};

// Re-export the pieces callers need alongside a Gallery
pub use pictor_cache::{ConvertOptions, DerivativeCacheConfig, DerivativeCacheStats, SweeperHandle};
pub use pictor_core::ImageEncoding;
pub use pictor_error::{PictorError, PictorErrorKind, PictorResult};
pub use pictor_storage::{ImagePage, MetadataRecord};
