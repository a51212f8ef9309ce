//! Error types for Pictor.
//!
//! Every error follows the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - constructors use `#[track_caller]` for automatic location capture
//!
//! The taxonomy the stores and the converter report through:
//!
//! | Condition                         | Variant                                   |
//! |-----------------------------------|-------------------------------------------|
//! | source or stored entity missing   | `Storage(StorageErrorKind::NotFound)`     |
//! | codec decode/encode failure       | `Conversion(_)`                           |
//! | other filesystem failure          | remaining `Storage(_)` kinds              |
//!
//! # Examples
//!
//! ```
//! use pictor_error::{PictorResult, StorageError, StorageErrorKind};
//!
//! fn load() -> PictorResult<Vec<u8>> {
//!     Err(StorageError::new(StorageErrorKind::NotFound("abc.webp".into())))?
//! }
//!
//! assert!(load().unwrap_err().is_not_found());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod conversion;
mod error;
mod json;
mod storage;

pub use config::ConfigError;
pub use conversion::{ConversionError, ConversionErrorKind};
pub use error::{PictorError, PictorErrorKind, PictorResult};
pub use json::JsonError;
pub use storage::{StorageError, StorageErrorKind};
