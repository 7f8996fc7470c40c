//! Binary entry point for `removebg`.

use clap::Parser;
use cutscale::cli::{OutputFormat, RemoveBgCli, execute_removebg, finish};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = RemoveBgCli::parse();
    cutscale::logging::init(cli.verbose);

    finish(execute_removebg(&cli), OutputFormat::parse(&cli.format))
}
