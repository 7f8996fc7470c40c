//! Error types for cutscale operations.
//!
//! This module provides the error hierarchy, built with `thiserror`, for file
//! I/O, image codecs, background segmentation and CLI commands.

use thiserror::Error;

/// Result type alias for cutscale operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for every cutscale operation.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Image decoding, encoding and resizing errors.
    #[error("image error: {0}")]
    Image(#[from] ImageError),

    /// Background segmentation errors (model loading and inference).
    #[error("segmentation error: {0}")]
    Segmentation(#[from] SegmentationError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to write file.
    #[error("failed to write file: {path}: {reason}")]
    WriteFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Memory mapping error.
    #[error("memory mapping failed: {path}: {reason}")]
    MmapFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Directory creation error.
    #[error("failed to create directory: {path}: {reason}")]
    DirectoryFailed {
        /// Path to the directory.
        path: String,
        /// Reason for failure.
        reason: String,
    },
}

/// Image codec and geometry errors.
#[derive(Error, Debug)]
pub enum ImageError {
    /// The input could not be decoded as an image.
    #[error("failed to decode image: {reason}")]
    DecodeFailed {
        /// Decoder message.
        reason: String,
    },

    /// The result could not be encoded.
    #[error("failed to encode image: {reason}")]
    EncodeFailed {
        /// Encoder message.
        reason: String,
    },

    /// The output extension does not name a writable format.
    #[error("unsupported output format: {path}")]
    UnsupportedFormat {
        /// Output path whose extension was rejected.
        path: String,
    },

    /// Scaled dimensions do not fit in `u32`.
    #[error("scaled size overflows: {width}x{height} by {factor}")]
    DimensionOverflow {
        /// Source width.
        width: u32,
        /// Source height.
        height: u32,
        /// Requested scale factor.
        factor: u32,
    },

    /// The scale factor is not a positive integer.
    #[error("invalid scale factor '{value}': {reason}")]
    InvalidScaleFactor {
        /// Raw value as given.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Any other codec error.
    #[error("{0}")]
    Codec(String),
}

/// Background segmentation errors.
#[derive(Error, Debug)]
pub enum SegmentationError {
    /// Model file is missing.
    #[error("model not found: {path}")]
    ModelNotFound {
        /// Resolved model path.
        path: String,
    },

    /// ONNX Runtime could not build a session from the model.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Inference failed or the runtime panicked.
    #[error("inference failed: {0}")]
    Inference(String),

    /// The default model could not be downloaded.
    #[error("failed to download model from {url}: {reason}")]
    Download {
        /// Source URL.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// The model produced a tensor of an unexpected shape.
    #[error("unexpected model output: {0}")]
    UnexpectedOutput(String),

    /// The requested segmenter was not compiled into this build.
    #[error("segmenter '{name}' is not available in this build")]
    Unavailable {
        /// Segmenter name.
        name: String,
    },
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The report could not be written to stdout.
    #[error("output error: {0}")]
    OutputFormat(String),
}

// Implement From traits for standard library and third-party errors

impl From<image::ImageError> for ImageError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Decoding(e) => Self::DecodeFailed {
                reason: e.to_string(),
            },
            image::ImageError::Encoding(e) => Self::EncodeFailed {
                reason: e.to_string(),
            },
            other => Self::Codec(other.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err.into())
    }
}

#[cfg(feature = "onnx-segmentation")]
impl From<ort::Error> for SegmentationError {
    fn from(err: ort::Error) -> Self {
        Self::Inference(err.to_string())
    }
}

#[cfg(feature = "onnx-segmentation")]
impl From<ort::Error> for Error {
    fn from(err: ort::Error) -> Self {
        Self::Segmentation(err.into())
    }
}
