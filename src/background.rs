//! Background removal.
//!
//! [`remove_background`] is the one-shot operation over raw bytes: decode,
//! predict a foreground mask, fold the mask into the alpha channel, and
//! encode the result as PNG. [`remove_background_file`] wraps it with the
//! file handling of the `removebg` tool.

use crate::codec;
use crate::error::{Result, SegmentationError};
use crate::io::{ensure_parent_dir, read_bytes, write_bytes};
use crate::segmentation::Segmenter;
use image::{DynamicImage, GrayImage, ImageFormat, RgbaImage};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Options for background removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalOptions {
    /// Emit the greyscale foreground mask instead of the cutout.
    pub only_mask: bool,
}

/// Summary of a completed file-to-file removal.
#[derive(Debug, Clone, Serialize)]
pub struct RemovalReport {
    /// Input image path.
    pub input: PathBuf,
    /// Output image path.
    pub output: PathBuf,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Name of the segmenter that produced the mask.
    pub segmenter: String,
    /// Size of the written PNG.
    pub bytes_written: usize,
    /// Whether the output is the bare mask.
    pub only_mask: bool,
}

/// Removes the background from an encoded image.
///
/// The input format is guessed from the bytes and any EXIF orientation is
/// applied before segmentation. The output is always PNG.
///
/// # Errors
///
/// Returns an error if the bytes cannot be decoded, segmentation fails, or
/// encoding fails.
///
/// # Examples
///
/// ```
/// use cutscale::background::{RemovalOptions, remove_background};
/// use cutscale::segmentation::BorderKeySegmenter;
/// use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
/// use std::io::Cursor;
///
/// let mut photo = RgbImage::from_pixel(40, 40, Rgb([255, 255, 255]));
/// photo.put_pixel(20, 20, Rgb([0, 0, 0]));
/// let mut encoded = Cursor::new(Vec::new());
/// DynamicImage::ImageRgb8(photo).write_to(&mut encoded, ImageFormat::Png).unwrap();
///
/// let png = remove_background(
///     encoded.get_ref(),
///     &BorderKeySegmenter::default(),
///     RemovalOptions::default(),
/// )
/// .unwrap();
/// assert!(image::load_from_memory(&png).unwrap().color().has_alpha());
/// ```
pub fn remove_background(
    bytes: &[u8],
    segmenter: &dyn Segmenter,
    options: RemovalOptions,
) -> Result<Vec<u8>> {
    let image = codec::decode(bytes)?;
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        segmenter = segmenter.name(),
        "decoded input"
    );

    let result = cutout(&image, segmenter, options)?;
    codec::encode(&result, ImageFormat::Png)
}

/// Runs the segmenter on a decoded image and returns the cutout (or mask).
///
/// # Errors
///
/// Returns an error if segmentation fails or the mask does not match the
/// image dimensions.
pub fn cutout(
    image: &DynamicImage,
    segmenter: &dyn Segmenter,
    options: RemovalOptions,
) -> Result<DynamicImage> {
    let mask = segmenter.predict_mask(&image.to_rgb8())?;
    if mask.dimensions() != (image.width(), image.height()) {
        return Err(SegmentationError::UnexpectedOutput(format!(
            "mask is {}x{} but image is {}x{}",
            mask.width(),
            mask.height(),
            image.width(),
            image.height()
        ))
        .into());
    }

    if options.only_mask {
        return Ok(DynamicImage::ImageLuma8(mask));
    }
    Ok(DynamicImage::ImageRgba8(apply_mask(image, &mask)))
}

/// Folds `mask` into the image's alpha channel.
///
/// Each output alpha is `source_alpha * mask / 255`; colour channels are
/// left untouched.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn apply_mask(image: &DynamicImage, mask: &GrayImage) -> RgbaImage {
    let mut rgba = image.to_rgba8();
    for (pixel, m) in rgba.pixels_mut().zip(mask.pixels()) {
        let alpha = (u16::from(pixel[3]) * u16::from(m[0]) + 127) / 255;
        pixel[3] = alpha as u8;
    }
    rgba
}

/// Removes the background of the image at `input` and writes a PNG to `output`.
///
/// The parent directory of `output` is created first, then the input is read
/// as raw bytes, passed through [`remove_background`], and the result is
/// written verbatim.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, the input cannot be
/// read or decoded, segmentation fails, or the output cannot be written.
pub fn remove_background_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    segmenter: &dyn Segmenter,
    options: RemovalOptions,
) -> Result<RemovalReport> {
    let input = input.as_ref();
    let output = output.as_ref();

    ensure_parent_dir(output)?;
    let bytes = read_bytes(input)?;

    let png = remove_background(&bytes, segmenter, options)?;
    write_bytes(output, &png)?;
    tracing::info!(output = %output.display(), bytes = png.len(), "background removed");

    let (width, height) = codec::dimensions(&png)?;
    Ok(RemovalReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        width,
        height,
        segmenter: segmenter.name().to_string(),
        bytes_written: png.len(),
        only_mask: options.only_mask,
    })
}
