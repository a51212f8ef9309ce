//! Target encodings for derivatives.

use pictor_error::{ConversionError, ConversionErrorKind};
use serde::{Deserialize, Serialize};

/// Output encodings the converter can produce.
///
/// Both are 8-bit RGB; transparency is always flattened onto white.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    /// Lossy JPEG with adjustable quality
    #[display("jpg")]
    #[serde(rename = "jpg")]
    Jpeg,
    /// Lossless PNG
    #[display("png")]
    Png,
}

impl ImageEncoding {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageEncoding::Jpeg => "jpg",
            ImageEncoding::Png => "png",
        }
    }

    /// MIME type for serving the encoded bytes.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageEncoding::Jpeg => "image/jpeg",
            ImageEncoding::Png => "image/png",
        }
    }

    /// Whether the encoding accepts a quality setting.
    pub fn is_lossy(&self) -> bool {
        matches!(self, ImageEncoding::Jpeg)
    }
}

/// Parses the exact lowercase tokens `jpg` and `png`.
impl std::str::FromStr for ImageEncoding {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jpg" => Ok(ImageEncoding::Jpeg),
            "png" => Ok(ImageEncoding::Png),
            other => Err(ConversionError::new(ConversionErrorKind::UnsupportedFormat(
                other.to_string(),
            ))),
        }
    }
}
