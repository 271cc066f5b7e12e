//! `zrep` is a library for recursive, literal find-and-replace across a directory tree.
//!
//! It provides the core logic for the `zrep` command-line tool but can also be used
//! as a standalone library. The main components are:
//!
//! - `walker`: Recursive enumeration of candidate files with name-based exclusions.
//! - `classifier`: Text/binary decision from magic numbers, falling back to a NUL-byte check.
//! - `matcher`: Literal substring detection on raw file bytes.
//! - `replacer`: Single-pass substitution committed through an atomic rename.
//! - `engine`: Runs the pipeline over a whole tree and aggregates a `RunSummary`,
//!   or previews which files a run would modify.
//!
//! Files are processed sequentially. A failure on one file is recorded in the
//! summary and never stops the rest of the run.

pub mod cli;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod errors;
pub mod matcher;
pub mod output_formatter;
pub mod replacer;
pub mod walker;

// Re-export main types for easier access by library users.
pub use config::SearchRequest;
pub use engine::{RunSummary, preview, run};
pub use errors::{Error, Result};
pub use output_formatter::{OutputFormat, OutputFormatter};
pub use replacer::Replacer;
