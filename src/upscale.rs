//! Integer-factor upscaling with a Lanczos filter.

use crate::codec;
use crate::error::{Error, ImageError, Result};
use crate::io::{read_bytes, write_bytes};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageFormat};
use serde::Serialize;
use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Resampling filter used for every upscale.
pub const FILTER: FilterType = FilterType::Lanczos3;

/// Name of [`FILTER`] in reports.
pub const FILTER_NAME: &str = "lanczos3";

/// A positive integer multiplier applied to width and height.
///
/// # Examples
///
/// ```
/// use cutscale::upscale::ScaleFactor;
///
/// let factor: ScaleFactor = "3".parse().unwrap();
/// assert_eq!(factor.get(), 3);
/// assert!("abc".parse::<ScaleFactor>().is_err());
/// assert!("0".parse::<ScaleFactor>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ScaleFactor(NonZeroU32);

impl ScaleFactor {
    /// Wraps `value`, returning `None` for zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Returns the factor as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ScaleFactor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| ImageError::InvalidScaleFactor {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| invalid("not an integer"))?;
        if value < 1 {
            return Err(invalid("must be at least 1").into());
        }
        let value = u32::try_from(value).map_err(|_| invalid("too large"))?;

        Self::new(value).ok_or_else(|| invalid("must be at least 1").into())
    }
}

/// Summary of a completed file-to-file upscale.
#[derive(Debug, Clone, Serialize)]
pub struct UpscaleReport {
    /// Input image path.
    pub input: PathBuf,
    /// Output image path.
    pub output: PathBuf,
    /// Source `(width, height)`.
    pub original: (u32, u32),
    /// Result `(width, height)`.
    pub upscaled: (u32, u32),
    /// Factor applied to both axes.
    pub scale_factor: ScaleFactor,
    /// Resampling filter name.
    pub filter: &'static str,
}

/// Computes `(width * factor, height * factor)`.
///
/// # Errors
///
/// Returns [`ImageError::DimensionOverflow`] if either side exceeds `u32`.
pub fn scaled_dimensions(width: u32, height: u32, factor: ScaleFactor) -> Result<(u32, u32)> {
    let f = factor.get();
    width
        .checked_mul(f)
        .zip(height.checked_mul(f))
        .ok_or_else(|| {
            ImageError::DimensionOverflow {
                width,
                height,
                factor: f,
            }
            .into()
        })
}

/// Resamples `image` to `factor` times its size with [`FILTER`].
///
/// # Errors
///
/// Returns an error if the scaled dimensions overflow.
pub fn upscale_image(image: &DynamicImage, factor: ScaleFactor) -> Result<DynamicImage> {
    let (width, height) = scaled_dimensions(image.width(), image.height(), factor)?;
    Ok(image.resize_exact(width, height, FILTER))
}

/// Returns the writable format implied by `path`'s extension.
///
/// # Errors
///
/// Returns [`ImageError::UnsupportedFormat`] for unknown extensions and for
/// formats this build cannot encode.
pub fn output_format<P: AsRef<Path>>(path: P) -> Result<ImageFormat> {
    let path = path.as_ref();
    ImageFormat::from_path(path)
        .ok()
        .filter(ImageFormat::writing_enabled)
        .ok_or_else(|| {
            ImageError::UnsupportedFormat {
                path: path.to_string_lossy().to_string(),
            }
            .into()
        })
}

/// Converts `image` to a colour type `format` can encode.
///
/// PNG and TIFF keep 16-bit depth; float images drop to 16 bits. TIFF has no
/// grey-alpha layout, so those images widen to RGBA.
fn fit_color_type(image: DynamicImage, format: ImageFormat) -> DynamicImage {
    let color = image.color();
    match format {
        ImageFormat::Png | ImageFormat::Tiff => match color {
            ColorType::Rgb32F => DynamicImage::ImageRgb16(image.to_rgb16()),
            ColorType::Rgba32F => DynamicImage::ImageRgba16(image.to_rgba16()),
            ColorType::La8 if format == ImageFormat::Tiff => {
                DynamicImage::ImageRgba8(image.to_rgba8())
            }
            ColorType::La16 if format == ImageFormat::Tiff => {
                DynamicImage::ImageRgba16(image.to_rgba16())
            }
            _ => image,
        },
        ImageFormat::Jpeg => match color {
            ColorType::L8 | ColorType::Rgb8 => image,
            _ => DynamicImage::ImageRgb8(image.to_rgb8()),
        },
        _ => match color {
            ColorType::Rgb8 | ColorType::Rgba8 => image,
            c if c.has_alpha() => DynamicImage::ImageRgba8(image.to_rgba8()),
            _ => DynamicImage::ImageRgb8(image.to_rgb8()),
        },
    }
}

/// Upscales the image at `input` by `factor` and writes it to `output`.
///
/// The output format follows `output`'s extension and is checked before the
/// input is decoded. EXIF orientation is applied while decoding. The parent directory of `output` is created if missing.
///
/// # Errors
///
/// Returns an error if the output format is unsupported, the input cannot be
/// read or decoded, the scaled size overflows, or writing fails.
pub fn upscale_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    factor: ScaleFactor,
) -> Result<UpscaleReport> {
    let input = input.as_ref();
    let output = output.as_ref();

    let format = output_format(output)?;
    let image = codec::decode(&read_bytes(input)?)?;
    let original = (image.width(), image.height());
    tracing::debug!(
        width = original.0,
        height = original.1,
        factor = factor.get(),
        "decoded input"
    );

    let upscaled = fit_color_type(upscale_image(&image, factor)?, format);
    let encoded = codec::encode(&upscaled, format)?;

    write_bytes(output, &encoded)?;
    tracing::info!(output = %output.display(), bytes = encoded.len(), "image upscaled");

    Ok(UpscaleReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        original,
        upscaled: (upscaled.width(), upscaled.height()),
        scale_factor: factor,
        filter: FILTER_NAME,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{
        GrayAlphaImage, ImageBuffer, LumaA, Rgb, Rgb32FImage, RgbImage, Rgba, RgbaImage,
    };
    use tempfile::TempDir;
    use test_case::test_case;

    fn factor(n: u32) -> ScaleFactor {
        ScaleFactor::new(n).unwrap()
    }

    #[test_case("1", 1 ; "one")]
    #[test_case("2", 2 ; "two")]
    #[test_case(" 4 ", 4 ; "surrounding whitespace")]
    #[test_case("+3", 3 ; "explicit plus")]
    fn test_scale_factor_parse_ok(input: &str, expected: u32) {
        assert_eq!(input.parse::<ScaleFactor>().unwrap().get(), expected);
    }

    #[test_case("abc" ; "letters")]
    #[test_case("" ; "empty")]
    #[test_case("1.5" ; "fraction")]
    #[test_case("0" ; "zero")]
    #[test_case("-2" ; "negative")]
    #[test_case("99999999999" ; "overflow")]
    fn test_scale_factor_parse_err(input: &str) {
        let err = input.parse::<ScaleFactor>().unwrap_err();
        assert!(matches!(
            err,
            Error::Image(ImageError::InvalidScaleFactor { .. })
        ));
    }

    #[test]
    fn test_scale_factor_new() {
        assert!(ScaleFactor::new(0).is_none());
        assert_eq!(ScaleFactor::new(7).unwrap().to_string(), "7");
    }

    #[test]
    fn test_scaled_dimensions() {
        assert_eq!(scaled_dimensions(800, 600, factor(2)).unwrap(), (1600, 1200));
        assert_eq!(scaled_dimensions(13, 7, factor(1)).unwrap(), (13, 7));
    }

    #[test]
    fn test_scaled_dimensions_overflow() {
        let result = scaled_dimensions(u32::MAX / 2 + 1, 1, factor(2));
        assert!(matches!(
            result,
            Err(Error::Image(ImageError::DimensionOverflow { .. }))
        ));
    }

    #[test]
    fn test_upscale_image() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 6, Rgb([40, 80, 120])));
        let upscaled = upscale_image(&image, factor(3)).unwrap();
        assert_eq!((upscaled.width(), upscaled.height()), (30, 18));
        assert_eq!(upscaled.to_rgb8().get_pixel(15, 9).0, [40, 80, 120]);
    }

    #[test]
    fn test_upscale_image_factor_one_keeps_size() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(21, 9));
        let upscaled = upscale_image(&image, factor(1)).unwrap();
        assert_eq!((upscaled.width(), upscaled.height()), (21, 9));
    }

    #[test]
    fn test_output_format() {
        assert_eq!(output_format("a/b/out.png").unwrap(), ImageFormat::Png);
        assert_eq!(output_format("out.JPG").unwrap(), ImageFormat::Jpeg);
        assert!(output_format("out.xyz").is_err());
        assert!(output_format("no_extension").is_err());
    }

    #[test]
    fn test_fit_color_type_jpeg_drops_alpha() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4])));
        assert_eq!(
            fit_color_type(image.clone(), ImageFormat::Jpeg).color(),
            ColorType::Rgb8
        );
        assert_eq!(
            fit_color_type(image, ImageFormat::Png).color(),
            ColorType::Rgba8
        );
    }

    #[test_case(ImageFormat::Tiff, DynamicImage::ImageLumaA8(GrayAlphaImage::new(2, 2)), ColorType::Rgba8 ; "tiff grey alpha 8")]
    #[test_case(ImageFormat::Tiff, DynamicImage::ImageLumaA16(ImageBuffer::new(2, 2)), ColorType::Rgba16 ; "tiff grey alpha 16")]
    #[test_case(ImageFormat::Png, DynamicImage::ImageLumaA8(GrayAlphaImage::new(2, 2)), ColorType::La8 ; "png keeps grey alpha")]
    #[test_case(ImageFormat::Png, DynamicImage::ImageRgb32F(Rgb32FImage::new(2, 2)), ColorType::Rgb16 ; "png float rgb")]
    #[test_case(ImageFormat::Png, DynamicImage::ImageRgba32F(ImageBuffer::new(2, 2)), ColorType::Rgba16 ; "png float rgba")]
    #[test_case(ImageFormat::Tiff, DynamicImage::ImageRgba32F(ImageBuffer::new(2, 2)), ColorType::Rgba16 ; "tiff float rgba")]
    #[test_case(ImageFormat::Png, DynamicImage::ImageRgb16(ImageBuffer::new(2, 2)), ColorType::Rgb16 ; "png keeps 16 bit")]
    fn test_fit_color_type_lossless(format: ImageFormat, image: DynamicImage, expected: ColorType) {
        assert_eq!(fit_color_type(image, format).color(), expected);
    }

    #[test_case("out.tiff" ; "tiff")]
    #[test_case("out.png" ; "png")]
    fn test_upscale_file_grey_alpha(name: &str) {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("mask.png");
        GrayAlphaImage::from_pixel(4, 4, LumaA([120, 200]))
            .save(&input)
            .unwrap();
        let output = temp_dir.path().join(name);

        let report = upscale_file(&input, &output, factor(2)).unwrap();
        assert_eq!(report.upscaled, (8, 8));
        assert_eq!(image::open(&output).unwrap().width(), 8);
    }

    #[test]
    fn test_float_image_encodes_as_png() {
        let float = DynamicImage::ImageRgb32F(Rgb32FImage::from_pixel(3, 3, Rgb([0.25, 0.5, 0.75])));
        let upscaled = fit_color_type(upscale_image(&float, factor(2)).unwrap(), ImageFormat::Png);

        let png = codec::encode(&upscaled, ImageFormat::Png).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (6, 6));
        assert_eq!(decoded.color(), ColorType::Rgb16);
    }

    #[test]
    fn test_upscale_file_applies_exif_orientation() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("portrait.jpg");
        std::fs::write(&input, codec::tests::jpeg_with_orientation(40, 20, 6)).unwrap();
        let output = temp_dir.path().join("portrait_x2.png");

        let report = upscale_file(&input, &output, factor(2)).unwrap();
        assert_eq!(report.original, (20, 40));
        assert_eq!(report.upscaled, (40, 80));
    }

    #[test]
    fn test_upscale_file_png() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("photo.png");
        RgbImage::from_pixel(8, 5, Rgb([10, 20, 30]))
            .save(&input)
            .unwrap();
        let output = temp_dir.path().join("nested/dir/big.png");

        let report = upscale_file(&input, &output, factor(4)).unwrap();

        assert_eq!(report.original, (8, 5));
        assert_eq!(report.upscaled, (32, 20));
        assert_eq!(report.filter, "lanczos3");
        assert_eq!(image::open(&output).unwrap().width(), 32);
    }

    #[test]
    fn test_upscale_file_rgba_to_jpeg() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("cutout.png");
        RgbaImage::from_pixel(6, 6, Rgba([200, 10, 10, 90]))
            .save(&input)
            .unwrap();
        let output = temp_dir.path().join("cutout.jpg");

        upscale_file(&input, &output, factor(2)).unwrap();
        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 12));
    }

    #[test]
    fn test_upscale_file_unsupported_output() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out/result.xyz");

        let result = upscale_file(temp_dir.path().join("missing.png"), &output, factor(2));
        assert!(matches!(
            result,
            Err(Error::Image(ImageError::UnsupportedFormat { .. }))
        ));
        assert!(!temp_dir.path().join("out").exists());
    }

    #[test]
    fn test_upscale_file_undecodable_input() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("broken.png");
        std::fs::write(&input, b"garbage").unwrap();

        let result = upscale_file(&input, temp_dir.path().join("out.png"), factor(2));
        assert!(matches!(result, Err(Error::Image(_))));
    }
}
