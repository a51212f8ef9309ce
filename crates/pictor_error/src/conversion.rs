//! Image conversion error types.

/// Kinds of conversion errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConversionErrorKind {
    /// Source bytes could not be decoded as an image
    #[display("Failed to decode {}: {}", path, cause)]
    Decode {
        /// Source image path
        path: String,
        /// Underlying codec error
        cause: String,
    },
    /// Encoding or writing the derivative failed
    #[display("Failed to encode {}: {}", path, cause)]
    Encode {
        /// Derivative output path
        path: String,
        /// Underlying codec or I/O error
        cause: String,
    },
    /// Lossy quality outside 1..=100
    #[display("Quality must be between 1 and 100, got {}", _0)]
    InvalidQuality(u8),
    /// Requested target encoding is not supported
    #[display("Unsupported format: {}", _0)]
    UnsupportedFormat(String),
    /// Background codec task panicked or was cancelled
    #[display("Conversion task failed: {}", _0)]
    Task(String),
}

/// Conversion error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Conversion Error: {} at line {} in {}", kind, line, file)]
pub struct ConversionError {
    /// The kind of error that occurred
    pub kind: ConversionErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ConversionError {
    /// Create a new conversion error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ConversionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
