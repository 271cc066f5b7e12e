//! Orchestration of a whole run: walk, classify, match, rewrite, summarise.
//!
//! Files are processed one at a time, each to completion before the next.
//! Because every rewrite is a single rename, an interrupted run leaves each
//! file either fully old or fully new.

use crate::config::SearchRequest;
use crate::errors::{FileError, Result};
use crate::replacer::{ProcessOptions, ReplaceStatus, Replacer};
use crate::walker::{TraversalWarning, Walker};
use std::path::PathBuf;
use tracing::{info, warn};

/// A file that was rewritten, or would be in a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacedFile {
    pub path: PathBuf,
    pub occurrences: usize,
}

/// Aggregate result of a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Whether this summary comes from a dry run.
    pub dry_run: bool,
    /// Candidate files examined (after exclusion filtering).
    pub files_scanned: usize,
    /// Files rewritten, in traversal order.
    pub replaced: Vec<ReplacedFile>,
    /// Candidates skipped as binary.
    pub binary_skipped: usize,
    /// Text candidates that did not contain the pattern.
    pub pattern_absent: usize,
    /// Per-file failures, in traversal order.
    pub errors: Vec<FileError>,
    /// Directories or entries that could not be visited.
    pub warnings: Vec<TraversalWarning>,
}

impl RunSummary {
    pub fn files_replaced(&self) -> usize {
        self.replaced.len()
    }

    pub fn total_occurrences(&self) -> usize {
        self.replaced.iter().map(|r| r.occurrences).sum()
    }

    pub fn replaced_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.replaced.iter().map(|r| &r.path)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Rewrites every eligible file under the request's root.
///
/// Fails only on validation errors, before any file is touched. Per-file
/// failures are collected into the summary and the run carries on.
pub fn run(request: &SearchRequest) -> Result<RunSummary> {
    execute(request, ProcessOptions { dry_run: false })
}

/// Runs the full detection pipeline without writing, reporting what [`run`]
/// would change.
pub fn preview_summary(request: &SearchRequest) -> Result<RunSummary> {
    execute(request, ProcessOptions { dry_run: true })
}

/// The paths a subsequent [`run`] would modify, given an unchanged tree.
pub fn preview(request: &SearchRequest) -> Result<Vec<PathBuf>> {
    let summary = preview_summary(request)?;
    Ok(summary.replaced.into_iter().map(|r| r.path).collect())
}

fn execute(request: &SearchRequest, options: ProcessOptions) -> Result<RunSummary> {
    request.validate()?;

    info!(
        root = %request.root().display(),
        pattern = request.pattern(),
        replacement = request.replacement(),
        dry_run = options.dry_run,
        "starting run"
    );

    let walk = Walker::for_request(request).enumerate(request.root());
    let replacer = Replacer::new(request.pattern(), request.replacement());

    let mut summary = RunSummary {
        dry_run: options.dry_run,
        files_scanned: walk.files.len(),
        warnings: walk.warnings,
        ..RunSummary::default()
    };

    for path in walk.files {
        match replacer.process_file(&path, options) {
            Ok(ReplaceStatus::Replaced { occurrences }) => {
                info!(path = %path.display(), occurrences, "matched");
                summary.replaced.push(ReplacedFile { path, occurrences });
            }
            Ok(ReplaceStatus::PatternAbsent) => summary.pattern_absent += 1,
            Ok(ReplaceStatus::Binary) => summary.binary_skipped += 1,
            Err(e) => {
                warn!("{e}");
                summary.errors.push(e);
            }
        }
    }

    info!(
        scanned = summary.files_scanned,
        replaced = summary.files_replaced(),
        errors = summary.errors.len(),
        "run finished"
    );
    Ok(summary)
}
