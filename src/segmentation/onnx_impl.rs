//! U²-Net segmenter backed by ONNX Runtime.
//!
//! Only available when the `onnx-segmentation` feature is enabled.

use crate::Result;
use crate::error::SegmentationError;
use crate::segmentation::Segmenter;
use crate::segmentation::download::fetch_model;
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};
use ndarray::{Array4, ArrayViewD, Axis, Ix2};
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use std::num::NonZeroUsize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

/// Side length of the square U²-Net input.
pub const INPUT_SIZE: u32 = 320;

/// Per-channel normalisation mean (ImageNet).
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Per-channel normalisation standard deviation (ImageNet).
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// U²-Net segmenter.
///
/// The ONNX session is built on the first [`predict_mask`](Segmenter::predict_mask)
/// call. A segmenter made with [`with_download`](Self::with_download) fetches
/// a missing model at that point too.
///
/// # Examples
///
/// ```ignore
/// use cutscale::segmentation::{OnnxSegmenter, Segmenter};
///
/// let segmenter = OnnxSegmenter::new("/models/u2net.onnx")?;
/// let mask = segmenter.predict_mask(&image.to_rgb8())?;
/// ```
pub struct OnnxSegmenter {
    model_path: PathBuf,
    download_url: Option<String>,
    session: OnceLock<Mutex<Session>>,
}

impl OnnxSegmenter {
    /// Creates a segmenter for the model at `model_path`.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentationError::ModelNotFound`] if the file does not exist.
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Result<Self> {
        let model_path = model_path.into();
        if !model_path.is_file() {
            return Err(SegmentationError::ModelNotFound {
                path: model_path.to_string_lossy().to_string(),
            }
            .into());
        }

        Ok(Self {
            model_path,
            download_url: None,
            session: OnceLock::new(),
        })
    }

    /// Creates a segmenter that downloads the model from `url` on first use
    /// if `model_path` does not exist yet.
    #[must_use]
    pub fn with_download<P: Into<PathBuf>>(model_path: P, url: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            download_url: Some(url.into()),
            session: OnceLock::new(),
        }
    }

    /// Returns the model path.
    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Gets or builds the ONNX session.
    fn get_session(&self) -> Result<&Mutex<Session>> {
        if let Some(session) = self.session.get() {
            return Ok(session);
        }

        if !self.model_path.is_file() {
            match &self.download_url {
                Some(url) => fetch_model(url, &self.model_path)?,
                None => {
                    return Err(SegmentationError::ModelNotFound {
                        path: self.model_path.to_string_lossy().to_string(),
                    }
                    .into());
                }
            }
        }

        tracing::debug!(model = %self.model_path.display(), "loading segmentation model");

        let threads = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(threads))
            .and_then(|b| b.commit_from_file(&self.model_path))
            .map_err(|e| SegmentationError::ModelLoad(e.to_string()))?;

        let _ = self.session.set(Mutex::new(session));

        self.session.get().ok_or_else(|| {
            SegmentationError::ModelLoad("session initialization race".to_string()).into()
        })
    }

    fn run(&self, input: &Array4<f32>, width: u32, height: u32) -> Result<GrayImage> {
        let session = self.get_session()?;
        let session = session
            .lock()
            .map_err(|e| SegmentationError::Inference(format!("failed to lock session: {e}")))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| SegmentationError::UnexpectedOutput("model has no inputs".into()))?;
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| SegmentationError::UnexpectedOutput("model has no outputs".into()))?;

        let outputs = session.run(ort::inputs![input_name.as_str() => input.view()]?)?;
        let prediction = outputs[output_name.as_str()].try_extract_tensor::<f32>()?;

        mask_from_prediction(&prediction, width, height)
    }
}

impl Segmenter for OnnxSegmenter {
    fn name(&self) -> &'static str {
        "u2net"
    }

    fn predict_mask(&self, image: &RgbImage) -> Result<GrayImage> {
        let (width, height) = image.dimensions();
        let input = prepare_input(image);

        // ONNX Runtime can panic on malformed models; report it as an error.
        let result = catch_unwind(AssertUnwindSafe(|| self.run(&input, width, height)));

        result.map_err(|panic_info| {
            let panic_msg = panic_info
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic_info.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            SegmentationError::Inference(format!("ONNX runtime panic: {panic_msg}"))
        })?
    }
}

/// Builds the normalised `1x3xNxN` input tensor for U²-Net.
///
/// The image is resized to [`INPUT_SIZE`] square with Lanczos, divided by its
/// brightest channel value and normalised with the ImageNet mean and std.
#[must_use]
pub fn prepare_input(image: &RgbImage) -> Array4<f32> {
    let resized = imageops::resize(image, INPUT_SIZE, INPUT_SIZE, FilterType::Lanczos3);
    let peak = resized.as_raw().iter().copied().max().unwrap_or(0);
    let scale = f32::from(peak).max(1e-6);

    let size = INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for (c, &value) in pixel.0.iter().enumerate() {
            tensor[[0, c, y as usize, x as usize]] = (f32::from(value) / scale - MEAN[c]) / STD[c];
        }
    }
    tensor
}

/// Converts a raw `1x1xHxW` prediction into a mask of `width` x `height`.
///
/// The prediction is min-max normalised, scaled to 0..=255 (truncating) and
/// resized with Lanczos. A flat prediction yields an all-background mask.
///
/// # Errors
///
/// Returns [`SegmentationError::UnexpectedOutput`] if the tensor is not 4-D
/// with at least one batch and one channel.
#[allow(clippy::cast_possible_truncation)]
pub fn mask_from_prediction(
    prediction: &ArrayViewD<'_, f32>,
    width: u32,
    height: u32,
) -> Result<GrayImage> {
    let shape = prediction.shape();
    if shape.len() != 4 || shape[0] == 0 || shape[1] == 0 {
        return Err(SegmentationError::UnexpectedOutput(format!(
            "expected a 1x1xHxW prediction, got shape {shape:?}"
        ))
        .into());
    }

    let plane = prediction
        .index_axis(Axis(0), 0)
        .index_axis_move(Axis(0), 0)
        .into_dimensionality::<Ix2>()
        .map_err(|e| SegmentationError::UnexpectedOutput(e.to_string()))?;

    let (min, max) = plane
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;

    let (rows, cols) = plane.dim();
    let small = GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        if range <= f32::EPSILON {
            return Luma([0]);
        }
        Luma([mask_value(plane[[y as usize, x as usize]], min, range)])
    });

    Ok(imageops::resize(&small, width, height, FilterType::Lanczos3))
}

/// Maps a prediction into 0..=255, truncating toward zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn mask_value(value: f32, min: f32, range: f32) -> u8 {
    (((value - min) / range) * 255.0).floor().clamp(0.0, 255.0) as u8
}
