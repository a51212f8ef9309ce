//! Errors from loading layered configuration.

/// A configuration layer failed to merge or deserialize.
///
/// The message carries the `config` crate's explanation, which names the
/// offending key when it can.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// What went wrong, including the offending key when known
    pub message: String,
    /// Line that raised the error
    pub line: u32,
    /// Source file that raised the error
    pub file: &'static str,
}

impl ConfigError {
    /// Record a configuration failure at the caller's location.
    ///
    /// ```
    /// use pictor_error::ConfigError;
    ///
    /// let err = ConfigError::new("gallery.per_page: invalid type: string \"lots\"");
    /// assert!(err.to_string().starts_with("Configuration Error: gallery.per_page"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let caller = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: caller.line(),
            file: caller.file(),
        }
    }
}
