//! Binary entry point for `upscale`.

use clap::Parser;
use cutscale::cli::{OutputFormat, UpscaleCli, execute_upscale, finish};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = UpscaleCli::parse();
    cutscale::logging::init(cli.verbose);

    finish(execute_upscale(&cli), OutputFormat::parse(&cli.format))
}
