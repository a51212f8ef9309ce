//! Format-converted image derivatives with timed eviction.
//!
//! A [`DerivativeCache`] converts stored images to JPEG or PNG in a scratch
//! directory and remembers when each derivative was written. Expired
//! derivatives are deleted by [`DerivativeCache::evict_expired`], either on
//! demand or from a background [`Sweeper`].
//!
//! # Example
//!
//! ```no_run
//! use pictor_cache::{ConvertOptions, DerivativeCache, DerivativeCacheConfig, Sweeper};
//! use pictor_core::ImageEncoding;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = Arc::new(DerivativeCache::new(DerivativeCacheConfig::default())?);
//! let sweeper = Sweeper::spawn(cache.clone());
//!
//! let png = cache
//!     .convert_to_format("/srv/images/abc.webp", ImageEncoding::Png, ConvertOptions::default())
//!     .await?;
//! println!("{}", png.display());
//!
//! sweeper.stop().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod cache;
mod codec;
mod config;
mod sweeper;

pub use cache::{ConvertOptions, DerivativeCache, DerivativeCacheStats, TrackedFile};
pub use codec::flatten;
pub use config::{DerivativeCacheConfig, DerivativeCacheConfigBuilder};
pub use sweeper::{Sweeper, SweeperHandle};
