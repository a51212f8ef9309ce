//! Decoding, alpha flattening and encoding of derivatives.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageReader, Rgb, RgbImage};
use pictor_core::ImageEncoding;
use pictor_error::{ConversionError, ConversionErrorKind};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Decode the image at `source`, detecting the format from its contents.
pub(crate) fn decode(source: &Path) -> Result<DynamicImage, ConversionError> {
    let decode_error = |cause: String| {
        ConversionError::new(ConversionErrorKind::Decode {
            path: source.display().to_string(),
            cause,
        })
    };

    ImageReader::open(source)
        .map_err(|e| decode_error(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| decode_error(e.to_string()))?
        .decode()
        .map_err(|e| decode_error(e.to_string()))
}

/// Reduce any decoded image to opaque 8-bit RGB.
///
/// Images with an alpha channel are composited over white; palette images
/// arrive here already expanded by the decoder. Everything else is converted
/// channel-wise.
pub fn flatten(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.into_rgb8();
    }

    let rgba = image.into_rgba8();
    let mut flattened = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = u16::from(pixel[3]);
        let blend = |channel: u8| -> u8 {
            (((u16::from(channel) * alpha) + (255 * (255 - alpha))) / 255) as u8
        };
        flattened.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }
    flattened
}

/// Encode `image` to `dest` in the requested encoding.
///
/// `quality` only applies to JPEG. PNG output uses the strongest compression
/// with adaptive filtering.
pub(crate) fn encode(
    image: &RgbImage,
    encoding: ImageEncoding,
    quality: u8,
    dest: &Path,
) -> Result<(), ConversionError> {
    let encode_error = |cause: String| {
        ConversionError::new(ConversionErrorKind::Encode {
            path: dest.display().to_string(),
            cause,
        })
    };

    let file = File::create(dest).map_err(|e| encode_error(e.to_string()))?;
    let mut writer = BufWriter::new(file);

    match encoding {
        ImageEncoding::Jpeg => {
            image.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, quality))
        }
        ImageEncoding::Png => image.write_with_encoder(PngEncoder::new_with_quality(
            &mut writer,
            CompressionType::Best,
            FilterType::Adaptive,
        )),
    }
    .map_err(|e| encode_error(e.to_string()))?;

    writer.flush().map_err(|e| encode_error(e.to_string()))
}

/// Decode `source`, flatten it and write the derivative to `dest`.
///
/// A partially written `dest` is removed before an encode error is returned.
pub(crate) fn convert_file(
    source: &Path,
    dest: &Path,
    encoding: ImageEncoding,
    quality: u8,
) -> Result<(), ConversionError> {
    let image = flatten(decode(source)?);

    if let Err(e) = encode(&image, encoding, quality, dest) {
        remove_partial(dest);
        return Err(e);
    }
    Ok(())
}

pub(crate) fn remove_partial(dest: &Path) {
    match std::fs::remove_file(dest) {
        Ok(()) => tracing::debug!(path = %dest.display(), "Removed partial derivative"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %dest.display(),
            error = %e,
            "Failed to remove partial derivative"
        ),
    }
}
