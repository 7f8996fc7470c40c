//! # cutscale
//!
//! Background removal and Lanczos upscaling for the command line.
//!
//! The crate backs two small binaries:
//!
//! - **`removebg`**: predicts a foreground mask (U²-Net through ONNX Runtime,
//!   or a border colour-key fallback) and writes a PNG with the background
//!   made transparent
//! - **`upscale`**: multiplies an image's width and height by an integer
//!   factor, resampling with Lanczos
//!
//! Both write their result to a path given on the command line, creating the
//! parent directory when it is missing.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
// Note: unsafe is needed for memory-mapped I/O (memmap2)
#![warn(unsafe_code)]

pub mod background;
pub mod cli;
pub mod codec;
pub mod error;
pub mod io;
pub mod logging;
pub mod segmentation;
pub mod upscale;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export operations
pub use background::{RemovalOptions, RemovalReport, remove_background, remove_background_file};
pub use upscale::{ScaleFactor, UpscaleReport, scaled_dimensions, upscale_file, upscale_image};

// Re-export segmentation types
#[cfg(feature = "onnx-segmentation")]
pub use segmentation::OnnxSegmenter;
pub use segmentation::{BorderKeySegmenter, Segmenter, SegmenterKind, create_segmenter};

// Re-export CLI types
pub use cli::{OutputFormat, RemoveBgCli, UpscaleCli};
