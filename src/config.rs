use crate::errors::{Error, Result};
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Directory names that are never descended into unless the caller opts out.
///
/// Covers version-control metadata, dependency caches, build output,
/// virtual environments and bytecode caches.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "bower_components",
    "target",
    "build",
    "dist",
    "venv",
    ".venv",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    ".tox",
];

/// File names and `*.ext` suffix globs skipped by default.
pub const DEFAULT_EXCLUDED_FILES: &[&str] = &[
    ".gitignore",
    ".gitattributes",
    ".hgignore",
    ".dockerignore",
    ".npmignore",
    "*.pyc",
    "*.pyo",
    "*.class",
    "*.o",
    "*.obj",
    "*.a",
    "*.lib",
    "*.so",
    "*.dylib",
    "*.dll",
    "*.exe",
];

/// A single file exclusion rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePattern {
    /// Matches a file whose name is exactly this string.
    Exact(String),
    /// Matches any file whose name ends with this suffix (from a `*suffix` glob).
    Suffix(String),
}

impl FilePattern {
    /// Parses `*.ext` into a suffix rule and anything else into an exact-name rule.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('*') {
            Some(suffix) if !suffix.is_empty() => FilePattern::Suffix(suffix.to_string()),
            _ => FilePattern::Exact(raw.to_string()),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            FilePattern::Exact(exact) => name == exact,
            FilePattern::Suffix(suffix) => name.ends_with(suffix.as_str()),
        }
    }
}

/// Name-based exclusion rules for directories and files.
#[derive(Debug, Clone, Default)]
pub struct ExcludeRules {
    dirs: BTreeSet<String>,
    files: Vec<FilePattern>,
}

impl ExcludeRules {
    /// Rules pre-populated with [`DEFAULT_EXCLUDED_DIRS`] and [`DEFAULT_EXCLUDED_FILES`].
    pub fn with_defaults() -> Self {
        let mut rules = Self::default();
        rules.add_dirs(DEFAULT_EXCLUDED_DIRS.iter().copied());
        rules.add_files(DEFAULT_EXCLUDED_FILES.iter().copied());
        rules
    }

    pub fn add_dirs<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dirs
            .extend(names.into_iter().map(|n| n.as_ref().to_string()));
    }

    pub fn add_files<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in patterns {
            let pattern = FilePattern::parse(raw.as_ref());
            if !self.files.contains(&pattern) {
                self.files.push(pattern);
            }
        }
    }

    /// `true` if a directory with this name must not be descended into.
    ///
    /// Non-UTF-8 names never match.
    pub fn is_excluded_dir(&self, name: &OsStr) -> bool {
        name.to_str().is_some_and(|n| self.dirs.contains(n))
    }

    /// `true` if a file with this name is filtered out of the candidates.
    pub fn is_excluded_file(&self, name: &OsStr) -> bool {
        name.to_str()
            .is_some_and(|n| self.files.iter().any(|p| p.matches(n)))
    }

    pub fn dirs(&self) -> impl Iterator<Item = &str> {
        self.dirs.iter().map(String::as_str)
    }

    pub fn files(&self) -> &[FilePattern] {
        &self.files
    }
}

/// Everything one invocation needs to know. Built once and not mutated during a run.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pattern: String,
    replacement: String,
    root: PathBuf,
    excludes: ExcludeRules,
    max_depth: Option<usize>,
    follow_links: bool,
}

impl SearchRequest {
    /// Creates a request with the default exclusion sets, following symlinks
    /// and no depth limit.
    pub fn new(
        pattern: impl Into<String>,
        replacement: impl Into<String>,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            root: root.into(),
            excludes: ExcludeRules::with_defaults(),
            max_depth: None,
            follow_links: true,
        }
    }

    /// Drops the built-in exclusions. Names added afterwards still apply.
    pub fn without_default_excludes(mut self) -> Self {
        self.excludes = ExcludeRules::default();
        self
    }

    pub fn exclude_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excludes.add_dirs(names);
        self
    }

    pub fn exclude_files<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excludes.add_files(patterns);
        self
    }

    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Checks the request before any file I/O beyond inspecting the root.
    pub fn validate(&self) -> Result<()> {
        if self.pattern.is_empty() {
            return Err(Error::EmptyPattern);
        }
        if !self.root.exists() {
            return Err(Error::RootNotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(Error::RootNotDirectory(self.root.clone()));
        }
        Ok(())
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn excludes(&self) -> &ExcludeRules {
        &self.excludes
    }

    pub fn depth_limit(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn follows_links(&self) -> bool {
        self.follow_links
    }
}
