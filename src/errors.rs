use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all operations in `zrep`.
///
/// Only the validation variants abort a run. Everything that goes wrong with a
/// single file is captured as a [`FileError`] and collected into the run summary.
#[derive(Error, Debug)]
pub enum Error {
    /// The search pattern was empty.
    #[error("Search pattern must not be empty")]
    EmptyPattern,

    /// The root path does not exist.
    #[error("Root path does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    /// The root path exists but is not a directory.
    #[error("Root path is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    /// An error related to file system I/O.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An error related to JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error related to CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A failure isolated to one file.
    #[error(transparent)]
    File(#[from] FileError),
}

/// A convenient type alias for `Result<T, zrep::errors::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` for errors raised before traversal starts.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::EmptyPattern | Error::RootNotFound(_) | Error::RootNotDirectory(_)
        )
    }
}

/// The stage of the rewrite pipeline a per-file failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileErrorKind {
    /// The file could not be opened or read.
    Read,
    /// The temporary file could not be created or written.
    Write,
    /// The temporary file could not be moved over the original.
    Persist,
}

impl fmt::Display for FileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileErrorKind::Read => "read",
            FileErrorKind::Write => "write",
            FileErrorKind::Persist => "persist",
        };
        f.write_str(s)
    }
}

/// An error that occurred while processing a single file.
#[derive(Error, Debug)]
#[error("{kind} failed for {}: {source}", path.display())]
pub struct FileError {
    pub path: PathBuf,
    pub kind: FileErrorKind,
    #[source]
    pub source: std::io::Error,
}

impl FileError {
    pub fn new(path: impl Into<PathBuf>, kind: FileErrorKind, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            kind,
            source,
        }
    }

    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::new(path, FileErrorKind::Read, source)
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::new(path, FileErrorKind::Write, source)
    }
}
