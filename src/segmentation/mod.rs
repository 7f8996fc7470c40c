//! Foreground segmentation for background removal.
//!
//! A [`Segmenter`] turns an RGB image into an 8-bit alpha mask at the same
//! resolution: 255 for foreground, 0 for background.
//!
//! # Feature Flags
//!
//! - `onnx-segmentation`: Enables [`OnnxSegmenter`], U²-Net through ONNX Runtime
//! - Without the feature: only [`BorderKeySegmenter`] (colour keying against the
//!   image border) is available

mod fallback;

#[cfg(feature = "onnx-segmentation")]
mod download;
#[cfg(feature = "onnx-segmentation")]
mod onnx_impl;

pub use fallback::BorderKeySegmenter;

#[cfg(feature = "onnx-segmentation")]
pub use download::{MODEL_URL, fetch_model};
#[cfg(feature = "onnx-segmentation")]
pub use onnx_impl::{INPUT_SIZE, OnnxSegmenter, mask_from_prediction, prepare_input};

use crate::error::{CommandError, Error, Result};
use image::{GrayImage, RgbImage};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name of the default U²-Net model.
pub const MODEL_FILE_NAME: &str = "u2net.onnx";

/// Environment variable naming an explicit model file.
pub const MODEL_ENV: &str = "CUTSCALE_MODEL";

/// Environment variable naming the directory that holds [`MODEL_FILE_NAME`].
pub const MODEL_HOME_ENV: &str = "U2NET_HOME";

/// Directory under the home directory used when [`MODEL_HOME_ENV`] is unset.
const DEFAULT_MODEL_DIR: &str = ".u2net";

/// Trait for foreground mask predictors.
///
/// Implementations must be thread-safe (`Send + Sync`) so a single instance
/// can be shared behind a reference.
///
/// # Examples
///
/// ```
/// use cutscale::segmentation::{BorderKeySegmenter, Segmenter};
/// use image::RgbImage;
///
/// let segmenter = BorderKeySegmenter::default();
/// let image = RgbImage::from_pixel(8, 8, image::Rgb([255, 255, 255]));
/// let mask = segmenter.predict_mask(&image).unwrap();
/// assert_eq!(mask.dimensions(), (8, 8));
/// ```
pub trait Segmenter: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Predicts the foreground mask for `image`.
    ///
    /// The returned mask has exactly the dimensions of `image`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded or inference fails.
    fn predict_mask(&self, image: &RgbImage) -> Result<GrayImage>;
}

/// Which segmenter to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmenterKind {
    /// U²-Net via ONNX Runtime.
    Onnx,
    /// Border colour keying.
    Border,
}

impl SegmenterKind {
    /// Returns the kind's CLI name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Onnx => "onnx",
            Self::Border => "border",
        }
    }
}

impl Default for SegmenterKind {
    #[cfg(feature = "onnx-segmentation")]
    fn default() -> Self {
        Self::Onnx
    }

    #[cfg(not(feature = "onnx-segmentation"))]
    fn default() -> Self {
        Self::Border
    }
}

impl fmt::Display for SegmenterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmenterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "onnx" | "u2net" => Ok(Self::Onnx),
            "border" => Ok(Self::Border),
            other => Err(CommandError::InvalidArgument(format!(
                "unknown segmenter '{other}' (expected onnx or border)"
            ))
            .into()),
        }
    }
}

/// Resolves the model file location.
///
/// Order: `explicit`, then `$U2NET_HOME/u2net.onnx`, then
/// `~/.u2net/u2net.onnx`.
#[must_use]
pub fn resolve_model_path(explicit: Option<&Path>) -> PathBuf {
    resolve_model_path_from(
        explicit,
        std::env::var_os(MODEL_HOME_ENV).map(PathBuf::from),
        dirs::home_dir(),
    )
}

fn resolve_model_path_from(
    explicit: Option<&Path>,
    model_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(dir) = model_home.filter(|d| !d.as_os_str().is_empty()) {
        return dir.join(MODEL_FILE_NAME);
    }
    home.map_or_else(
        || PathBuf::from(DEFAULT_MODEL_DIR).join(MODEL_FILE_NAME),
        |h| h.join(DEFAULT_MODEL_DIR).join(MODEL_FILE_NAME),
    )
}

/// Creates a segmenter of the requested kind.
///
/// `model` only matters for [`SegmenterKind::Onnx`]. An explicit model must
/// exist. Without one, the default location from [`resolve_model_path`] is
/// used and the model is downloaded from [`MODEL_URL`] on first use.
///
/// # Errors
///
/// Returns an error if an explicit model file is missing.
#[cfg(feature = "onnx-segmentation")]
pub fn create_segmenter(kind: SegmenterKind, model: Option<&Path>) -> Result<Box<dyn Segmenter>> {
    match (kind, model) {
        (SegmenterKind::Onnx, Some(path)) => Ok(Box::new(OnnxSegmenter::new(path)?)),
        (SegmenterKind::Onnx, None) => Ok(Box::new(OnnxSegmenter::with_download(
            resolve_model_path(None),
            MODEL_URL,
        ))),
        (SegmenterKind::Border, _) => Ok(Box::new(BorderKeySegmenter::default())),
    }
}

/// Creates a segmenter of the requested kind.
///
/// # Errors
///
/// Returns [`SegmentationError::Unavailable`](crate::error::SegmentationError::Unavailable)
/// for [`SegmenterKind::Onnx`], which this build does not include.
#[cfg(not(feature = "onnx-segmentation"))]
pub fn create_segmenter(kind: SegmenterKind, _model: Option<&Path>) -> Result<Box<dyn Segmenter>> {
    match kind {
        SegmenterKind::Onnx => Err(crate::error::SegmentationError::Unavailable {
            name: kind.as_str().to_string(),
        }
        .into()),
        SegmenterKind::Border => Ok(Box::new(BorderKeySegmenter::default())),
    }
}
