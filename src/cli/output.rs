//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::background::RemovalReport;
use crate::error::{CommandError, Error};
use crate::upscale::UpscaleReport;
use serde::Serialize;
use std::fmt::Write;
use std::io::{self, Write as IoWrite};
use std::process::ExitCode;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats a background removal report.
#[must_use]
pub fn format_removal_report(report: &RemovalReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let what = if report.only_mask {
                "Mask written"
            } else {
                "Background removed"
            };
            let _ = writeln!(
                output,
                "{what}: {} -> {}",
                report.input.display(),
                report.output.display()
            );
            let _ = writeln!(output, "  Size:       {}x{}", report.width, report.height);
            let _ = writeln!(output, "  Segmenter:  {}", report.segmenter);
            let _ = writeln!(output, "  Written:    {}", format_size(report.bytes_written));
            output
        }
        OutputFormat::Json => format_json(report),
    }
}

/// Formats an upscale report.
#[must_use]
pub fn format_upscale_report(report: &UpscaleReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(
                output,
                "Upscaled: {} -> {}",
                report.input.display(),
                report.output.display()
            );
            let _ = writeln!(
                output,
                "  {}x{} -> {}x{} (x{}, {})",
                report.original.0,
                report.original.1,
                report.upscaled.0,
                report.upscaled.1,
                report.scale_factor,
                report.filter
            );
            output
        }
        OutputFormat::Json => format_json(report),
    }
}

/// Formats an error for display.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorOutput<'a> {
                error: &'a str,
            }
            let message = error.to_string();
            format_json(&ErrorOutput { error: &message })
        }
    }
}

/// Prints a command result and maps it to the process exit code.
///
/// Reports go to stdout. Errors always go to stderr, prefixed with `Error:`
/// in text mode.
#[allow(clippy::print_stderr)]
pub fn finish(result: crate::Result<String>, format: OutputFormat) -> ExitCode {
    match result.and_then(|output| write_report(&mut io::stdout(), &output)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            match format {
                OutputFormat::Json => eprintln!("{}", format_error(&e, format)),
                OutputFormat::Text => eprintln!("Error: {}", format_error(&e, format)),
            }
            ExitCode::FAILURE
        }
    }
}

/// Writes a report, treating a closed pipe (e.g. `| head`) as success.
fn write_report<W: IoWrite>(out: &mut W, report: &str) -> crate::Result<()> {
    match out.write_all(report.as_bytes()).and_then(|()| out.flush()) {
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => {
            Err(CommandError::OutputFormat(format!("failed to write report: {e}")).into())
        }
        _ => Ok(()),
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize>(value: &T) -> String {
    let mut json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    json.push('\n');
    json
}

/// Formats a byte size as human-readable.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
