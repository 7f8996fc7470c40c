//! CLI command implementations.

use crate::background::{RemovalOptions, remove_background_file};
use crate::cli::output::{OutputFormat, format_removal_report, format_upscale_report};
use crate::cli::parser::{RemoveBgCli, UpscaleCli};
use crate::error::Result;
use crate::segmentation::create_segmenter;
use crate::upscale::upscale_file;

/// Executes `removebg`.
///
/// # Returns
///
/// The formatted report on success.
///
/// # Errors
///
/// Returns an error if the segmenter cannot be created or removal fails.
pub fn execute_removebg(cli: &RemoveBgCli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let segmenter = create_segmenter(cli.segmenter.unwrap_or_default(), cli.model.as_deref())?;

    let report = remove_background_file(
        &cli.input_image_path,
        &cli.output_image_path,
        segmenter.as_ref(),
        RemovalOptions {
            only_mask: cli.only_mask,
        },
    )?;

    Ok(format_removal_report(&report, format))
}

/// Executes `upscale`.
///
/// # Returns
///
/// The formatted report on success.
///
/// # Errors
///
/// Returns an error if upscaling fails.
pub fn execute_upscale(cli: &UpscaleCli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let report = upscale_file(&cli.image_path, &cli.output_path, cli.scale_factor)?;
    Ok(format_upscale_report(&report, format))
}
