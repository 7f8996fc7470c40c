//! CLI layer for cutscale.
//!
//! Argument parsing, command execution and output formatting shared by the
//! `removebg` and `upscale` binaries.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::{execute_removebg, execute_upscale};
pub use output::{OutputFormat, finish};
pub use parser::{RemoveBgCli, UpscaleCli};
