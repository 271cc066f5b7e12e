use crate::config::{ExcludeRules, SearchRequest};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// A non-fatal problem encountered while listing the tree.
///
/// The affected subtree is skipped and the walk carries on elsewhere.
#[derive(Debug, Clone)]
pub struct TraversalWarning {
    /// The path that could not be visited, when known.
    pub path: Option<PathBuf>,
    pub message: String,
}

impl TraversalWarning {
    fn from_walk_error(err: &walkdir::Error) -> Self {
        let message = match err.loop_ancestor() {
            Some(ancestor) => format!("symlink loop back to {}", ancestor.display()),
            None => match err.io_error() {
                Some(io) => io.to_string(),
                None => err.to_string(),
            },
        };
        Self {
            path: err.path().map(Path::to_path_buf),
            message,
        }
    }
}

/// The result of one traversal: candidate files plus any warnings collected on the way.
#[derive(Debug, Default)]
pub struct Walk {
    pub files: Vec<PathBuf>,
    pub warnings: Vec<TraversalWarning>,
}

/// Recursively enumerates candidate files under a root.
///
/// Entries are visited depth-first in file-name order, so the output is stable
/// for a given filesystem state. Each call builds a fresh [`Walk`]; nothing is
/// carried over between calls.
pub struct Walker<'a> {
    rules: &'a ExcludeRules,
    max_depth: Option<usize>,
    follow_links: bool,
}

impl<'a> Walker<'a> {
    pub fn new(rules: &'a ExcludeRules) -> Self {
        Self {
            rules,
            max_depth: None,
            follow_links: true,
        }
    }

    /// A walker configured from the request's exclusions and traversal limits.
    pub fn for_request(request: &'a SearchRequest) -> Self {
        Self::new(request.excludes())
            .max_depth(request.depth_limit())
            .follow_links(request.follows_links())
    }

    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// When following links, a symlink that resolves to a directory is walked
    /// like a directory. Links that lead back to an ancestor are reported as a
    /// warning instead of being walked again.
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn enumerate(&self, root: &Path) -> Walk {
        let mut walkdir = WalkDir::new(root)
            .follow_links(self.follow_links)
            .sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walkdir = walkdir.max_depth(depth);
        }

        let mut walk = Walk::default();
        let mut seen = HashSet::new();
        let entries = walkdir
            .into_iter()
            .filter_entry(|entry| !self.is_excluded_dir(entry));

        for entry in entries {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    if self.rules.is_excluded_file(entry.file_name()) {
                        debug!(path = %entry.path().display(), "excluded by file rule");
                        continue;
                    }
                    if self.follow_links && !seen.insert(identity(entry.path())) {
                        debug!(path = %entry.path().display(), "already reached through another link");
                        continue;
                    }
                    walk.files.push(entry.into_path());
                }
                Err(err) => {
                    let warning = TraversalWarning::from_walk_error(&err);
                    warn!(
                        path = ?warning.path,
                        "skipping unreadable entry: {}",
                        warning.message
                    );
                    walk.warnings.push(warning);
                }
            }
        }

        walk
    }

    /// The root itself is never excluded, even when its name is on the list.
    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        let excluded = entry.depth() > 0
            && entry.file_type().is_dir()
            && self.rules.is_excluded_dir(entry.file_name());
        if excluded {
            debug!(path = %entry.path().display(), "excluded directory");
        }
        excluded
    }
}

/// The canonical path, used to visit a file only once when links lead to it
/// from several places.
fn identity(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Lists candidate files under `root`, skipping excluded directories and files.
pub fn enumerate(root: &Path, rules: &ExcludeRules) -> Walk {
    Walker::new(rules).enumerate(root)
}
