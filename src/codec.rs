//! Image decoding and encoding shared by both tools.

use crate::error::{ImageError, Result};
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::io::Cursor;

/// Decodes an image, guessing the format from its content.
///
/// The EXIF orientation, when present, is applied to the pixels, so a
/// portrait phone photo stored sideways comes back upright.
///
/// # Errors
///
/// Returns [`ImageError::DecodeFailed`] if the format is unknown or the data
/// is corrupt.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::DecodeFailed {
            reason: e.to_string(),
        })?;

    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);

    Ok(image)
}

/// Encodes `image` as `format`.
///
/// # Errors
///
/// Returns an error if the encoder rejects the image.
pub fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format)?;
    Ok(buffer.into_inner())
}

/// Reads width and height from an encoded image's header.
///
/// # Errors
///
/// Returns an error if the header cannot be parsed.
pub fn dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::DecodeFailed {
            reason: e.to_string(),
        })?;
    Ok(reader.into_dimensions()?)
}
