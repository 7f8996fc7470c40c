//! Command-line argument parsing.
//!
//! Defines the two tools' argument structures using clap derive macros.

use crate::segmentation::{MODEL_ENV, SegmenterKind};
use crate::upscale::ScaleFactor;
use clap::Parser;
use std::path::PathBuf;

/// Remove the background from an image.
///
/// Writes a PNG whose alpha channel hides everything but the detected
/// foreground subject.
#[derive(Parser, Debug)]
#[command(name = "removebg")]
#[command(version, about, long_about = None)]
pub struct RemoveBgCli {
    /// Image to remove the background from.
    pub input_image_path: PathBuf,

    /// Where to write the PNG result. Missing directories are created.
    pub output_image_path: PathBuf,

    /// Path to the U2-Net ONNX model.
    ///
    /// Defaults to `$U2NET_HOME/u2net.onnx`, then `~/.u2net/u2net.onnx`,
    /// downloaded on first use if missing.
    #[arg(short, long, env = MODEL_ENV)]
    pub model: Option<PathBuf>,

    /// Segmenter to use (onnx, border).
    #[arg(short, long)]
    pub segmenter: Option<SegmenterKind>,

    /// Write the greyscale foreground mask instead of the cutout.
    #[arg(long)]
    pub only_mask: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Upscale an image by an integer factor with a Lanczos filter.
#[derive(Parser, Debug)]
#[command(name = "upscale")]
#[command(version, about, long_about = None)]
pub struct UpscaleCli {
    /// Image to upscale.
    pub image_path: PathBuf,

    /// Where to write the result; the extension selects the format.
    pub output_path: PathBuf,

    /// Positive integer multiplier for width and height.
    pub scale_factor: ScaleFactor,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text")]
    pub format: String,
}
