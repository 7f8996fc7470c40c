//! I/O utilities for cutscale.
//!
//! Raw byte reading (memory-mapped in place for large images) and writing with
//! output-directory creation.

pub mod reader;
pub mod writer;

pub use reader::{FileReader, InputBytes, read_bytes};
pub use writer::{ensure_parent_dir, write_bytes};
