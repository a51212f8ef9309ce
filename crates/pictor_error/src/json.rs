//! Errors from reading or writing metadata records.

/// A metadata record was not valid JSON, or was not a JSON object.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} at line {} in {}", message, line, file)]
pub struct JsonError {
    /// Parser or serializer message, usually prefixed with the record path
    pub message: String,
    /// Line that raised the error
    pub line: u32,
    /// Source file that raised the error
    pub file: &'static str,
}

impl JsonError {
    /// Record a JSON failure at the caller's location.
    ///
    /// ```
    /// use pictor_error::JsonError;
    ///
    /// let err = JsonError::new("metadata/abc.json: expected value at line 1 column 1");
    /// assert!(err.message.starts_with("metadata/abc.json"));
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

#[cfg(feature = "json")]
impl From<serde_json::Error> for JsonError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;

    #[test]
    fn serde_errors_keep_parser_position() {
        let parse = serde_json::from_str::<serde_json::Value>("{\"prompt\": ").unwrap_err();
        let err = JsonError::from(parse);
        assert!(err.message.contains("line 1"));
        assert!(err.file.ends_with("json.rs"));
    }
}
