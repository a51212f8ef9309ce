//! Top-level error wrapper types.

use crate::{ConfigError, ConversionError, JsonError, StorageError};

/// Every failure a Pictor operation can surface.
///
/// # Examples
///
/// ```
/// use pictor_error::{PictorError, StorageError, StorageErrorKind};
///
/// let err: PictorError = StorageError::new(StorageErrorKind::NotFound("a.webp".into())).into();
/// assert!(format!("{}", err).contains("Storage Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum PictorErrorKind {
    /// Filesystem error, including "not found"
    #[from(StorageError)]
    Storage(StorageError),
    /// Image decode/encode error
    #[from(ConversionError)]
    Conversion(ConversionError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
}

/// Pictor error with kind discrimination.
///
/// # Examples
///
/// ```
/// use pictor_error::{PictorResult, ConfigError};
///
/// fn might_fail() -> PictorResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Pictor Error: {}", _0)]
pub struct PictorError(Box<PictorErrorKind>);

impl PictorError {
    /// Create a new error from a kind.
    pub fn new(kind: PictorErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PictorErrorKind {
        &self.0
    }

    /// True when the referenced source file or stored entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), PictorErrorKind::Storage(e) if e.is_not_found())
    }

    /// True for codec failures.
    pub fn is_conversion(&self) -> bool {
        matches!(self.kind(), PictorErrorKind::Conversion(_))
    }
}

impl<T> From<T> for PictorError
where
    T: Into<PictorErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Pictor operations.
pub type PictorResult<T> = std::result::Result<T, PictorError>;
