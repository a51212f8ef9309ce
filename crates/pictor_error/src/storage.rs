//! Storage error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write, copy or remove a file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Failed to read file
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// Referenced file does not exist
    #[display("Not found: {}", _0)]
    NotFound(String),
    /// Filename escapes the storage root or is otherwise unusable
    #[display("Invalid storage path: {}", _0)]
    InvalidPath(String),
    /// Caller supplied an argument the store cannot honor
    #[display("Invalid argument: {}", _0)]
    InvalidArgument(String),
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use pictor_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("/path/to/file".to_string()));
/// assert!(format!("{}", err).contains("Not found"));
/// assert!(err.is_not_found());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Build a storage error from an I/O failure on `path`.
    ///
    /// `NotFound` I/O errors map to [`StorageErrorKind::NotFound`]; everything
    /// else goes through `otherwise`.
    #[track_caller]
    pub fn from_io(
        err: &std::io::Error,
        path: &std::path::Path,
        otherwise: fn(String) -> StorageErrorKind,
    ) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::new(StorageErrorKind::NotFound(path.display().to_string()))
        } else {
            Self::new(otherwise(format!("{}: {}", path.display(), err)))
        }
    }

    /// Whether this error reports a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, StorageErrorKind::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn io_not_found_maps_to_not_found_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = StorageError::from_io(&io, Path::new("/tmp/a.webp"), StorageErrorKind::FileRead);
        assert_eq!(err.kind, StorageErrorKind::NotFound("/tmp/a.webp".to_string()));
    }

    #[test]
    fn other_io_errors_use_fallback_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StorageError::from_io(&io, Path::new("/tmp/a.webp"), StorageErrorKind::FileWrite);
        assert!(matches!(err.kind, StorageErrorKind::FileWrite(ref msg) if msg.contains("denied")));
        assert!(!err.is_not_found());
    }

    #[test]
    fn captures_caller_location() {
        let err = StorageError::new(StorageErrorKind::InvalidPath("..".into()));
        assert!(err.file.ends_with("storage.rs"));
        assert!(err.line > 0);
    }
}
