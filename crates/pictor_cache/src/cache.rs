//! Derivative registry: conversion, tracking and eviction.

use crate::DerivativeCacheConfig;
use crate::codec;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use pictor_core::{Clock, ImageEncoding, SystemClock, unique_filename};
use pictor_error::{
    ConversionError, ConversionErrorKind, PictorResult, StorageError, StorageErrorKind,
};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A derivative file the cache is responsible for deleting.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct TrackedFile {
    path: PathBuf,
    created_at: DateTime<Utc>,
}

impl TrackedFile {
    /// Whether this file has outlived `max_age` at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        now - self.created_at > max_age
    }
}

/// Per-conversion options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// JPEG quality (1-100). Falls back to the configured default when unset.
    pub quality: Option<u8>,
}

impl ConvertOptions {
    /// Options with an explicit JPEG quality.
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: Some(quality),
        }
    }
}

/// Read-only snapshot of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivativeCacheStats {
    /// Derivatives currently tracked
    pub total_tracked: usize,
    /// Tracked derivatives already past `max_age` but not yet swept
    pub expired_pending: usize,
    /// Directory derivatives are written to
    pub scratch_dir: PathBuf,
    /// Eviction age in seconds
    pub max_age_secs: u64,
    /// Sweep interval in seconds
    pub sweep_interval_secs: u64,
}

/// Converts images into temporary derivatives and reclaims them once expired.
///
/// Every derivative written by [`convert_to_format`](Self::convert_to_format)
/// is recorded in a registry. [`evict_expired`](Self::evict_expired) deletes
/// the ones older than `max_age`. Registration and the eviction scan share a
/// single lock, so neither ever observes the other half-done.
///
/// # Example
///
/// ```no_run
/// use pictor_cache::{ConvertOptions, DerivativeCache, DerivativeCacheConfig};
/// use pictor_core::ImageEncoding;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let cache = DerivativeCache::new(DerivativeCacheConfig::default())?;
/// let jpeg = cache
///     .convert_to_format("/srv/images/abc.webp", ImageEncoding::Jpeg, ConvertOptions::with_quality(85))
///     .await?;
/// println!("derivative at {}", jpeg.display());
///
/// let evicted = cache.evict_expired().await;
/// println!("evicted {evicted}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DerivativeCache {
    config: DerivativeCacheConfig,
    clock: Arc<dyn Clock>,
    registry: Arc<Mutex<HashMap<PathBuf, TrackedFile>>>,
}

impl DerivativeCache {
    /// Create a cache using the system clock.
    ///
    /// Creates the scratch directory if it does not exist.
    pub fn new(config: DerivativeCacheConfig) -> PictorResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache that ages derivatives against `clock`.
    #[tracing::instrument(skip(config, clock), fields(scratch_dir = %config.scratch_dir().display()))]
    pub fn with_clock(config: DerivativeCacheConfig, clock: Arc<dyn Clock>) -> PictorResult<Self> {
        std::fs::create_dir_all(config.scratch_dir()).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                config.scratch_dir().display(),
                e
            )))
        })?;

        tracing::info!(
            max_age_secs = config.max_age_secs(),
            sweep_interval_secs = config.sweep_interval_secs(),
            "Created derivative cache"
        );
        Ok(Self {
            config,
            clock,
            registry: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &DerivativeCacheConfig {
        &self.config
    }

    /// Convert `source` into `encoding` and return the path of the new derivative.
    ///
    /// Transparency is always flattened onto white; the output is 8-bit RGB.
    ///
    /// # Errors
    ///
    /// - `Storage(NotFound)` if `source` does not exist
    /// - `Conversion(InvalidQuality)` if a JPEG quality outside 1-100 is requested
    /// - `Conversion(Decode | Encode)` if the codec fails; no output file is left behind
    #[tracing::instrument(skip(self, source, encoding, options), fields(source = %source.as_ref().display(), encoding = %encoding))]
    pub async fn convert_to_format(
        &self,
        source: impl AsRef<Path>,
        encoding: ImageEncoding,
        options: ConvertOptions,
    ) -> PictorResult<PathBuf> {
        let source = source.as_ref().to_path_buf();

        match tokio::fs::try_exists(&source).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(
                    StorageError::new(StorageErrorKind::NotFound(source.display().to_string()))
                        .into(),
                );
            }
            Err(e) => {
                return Err(StorageError::from_io(&e, &source, StorageErrorKind::FileRead).into());
            }
        }

        let quality = options.quality.unwrap_or(*self.config.default_quality());
        if encoding.is_lossy() && !(1..=100).contains(&quality) {
            return Err(ConversionError::new(ConversionErrorKind::InvalidQuality(quality)).into());
        }

        let dest = self
            .config
            .scratch_dir()
            .join(unique_filename(encoding.extension()));

        let task_source = source.clone();
        let task_dest = dest.clone();
        let registry = Arc::clone(&self.registry);
        let clock = Arc::clone(&self.clock);
        // Registration happens on the blocking thread so a derivative is
        // tracked even when the caller stops waiting for it.
        let outcome = tokio::task::spawn_blocking(move || {
            codec::convert_file(&task_source, &task_dest, encoding, quality)?;
            let tracked = TrackedFile {
                path: task_dest.clone(),
                created_at: clock.now(),
            };
            registry.blocking_lock().insert(task_dest, tracked);
            Ok::<(), ConversionError>(())
        })
        .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Derivative conversion failed");
                return Err(e.into());
            }
            Err(join_error) => {
                codec::remove_partial(&dest);
                tracing::error!(error = %join_error, "Derivative conversion task failed");
                return Err(ConversionError::new(ConversionErrorKind::Task(
                    join_error.to_string(),
                ))
                .into());
            }
        }

        tracing::info!(derivative = %dest.display(), "Converted image");
        Ok(dest)
    }

    /// Stop tracking `path` and delete it now instead of waiting for expiry.
    ///
    /// Used once a derivative has been copied elsewhere. A file that is
    /// already gone is not an error.
    ///
    /// # Returns
    ///
    /// Whether `path` was tracked.
    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    pub async fn discard(&self, path: &Path) -> PictorResult<bool> {
        let was_tracked = self.registry.lock().await.remove(path).is_some();

        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::debug!("Discarded derivative"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                    "remove {}: {}",
                    path.display(),
                    e
                )))
                .into());
            }
        }
        Ok(was_tracked)
    }

    /// Delete every tracked derivative older than `max_age` and stop tracking it.
    ///
    /// A derivative that is already gone from disk is still evicted. Other
    /// removal failures are logged and the entry is dropped regardless.
    ///
    /// # Returns
    ///
    /// Number of registry entries evicted.
    #[tracing::instrument(skip(self))]
    pub async fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let max_age = self.config.max_age();

        let mut registry = self.registry.lock().await;
        let expired: Vec<PathBuf> = registry
            .values()
            .filter(|tracked| tracked.is_expired(now, max_age))
            .map(|tracked| tracked.path.clone())
            .collect();

        for path in &expired {
            match tokio::fs::remove_file(path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "Evicted derivative"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "Derivative already gone")
                }
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to remove expired derivative"
                ),
            }
            registry.remove(path);
        }

        if !expired.is_empty() {
            tracing::info!(
                evicted = expired.len(),
                remaining = registry.len(),
                "Cleaned up expired derivatives"
            );
        }
        expired.len()
    }

    /// Snapshot of the registry. Does not mutate anything.
    pub async fn inspect(&self) -> DerivativeCacheStats {
        let now = self.clock.now();
        let max_age = self.config.max_age();
        let registry = self.registry.lock().await;

        DerivativeCacheStats {
            total_tracked: registry.len(),
            expired_pending: registry
                .values()
                .filter(|tracked| tracked.is_expired(now, max_age))
                .count(),
            scratch_dir: self.config.scratch_dir().clone(),
            max_age_secs: *self.config.max_age_secs(),
            sweep_interval_secs: *self.config.sweep_interval_secs(),
        }
    }

    /// Whether `path` is a live tracked derivative.
    pub async fn is_tracked(&self, path: &Path) -> bool {
        self.registry.lock().await.contains_key(path)
    }
}
