//! Identifier and filename helpers shared by the stores and the converter.

use std::path::Path;
use uuid::Uuid;

/// Generate a collision-resistant `{uuid}.{extension}` filename.
pub fn unique_filename(extension: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), extension)
}

/// Filename without its final extension.
///
/// `"abc.webp"` becomes `"abc"`; names without an extension come back unchanged.
pub fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(filename)
}
