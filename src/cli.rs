use crate::config::SearchRequest;
use clap::Parser;
use std::path::PathBuf;

/// Recursively replace a literal string in every text file under a directory.
///
/// Binary files are skipped and each file is rewritten atomically, so an
/// interrupted run never leaves a half-written file behind.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Recursive literal find-and-replace",
    long_about = "zrep - Replace a literal string across a directory tree.

Every text file containing PATTERN is rewritten in place with each occurrence
replaced by REPLACEMENT. Binary files, version-control metadata, dependency
caches and build output are left alone.

EXAMPLES:
  zrep old_name new_name                 # Rewrite the current directory
  zrep -n 'api/v1' 'api/v2' -d src/      # Preview which files would change
  zrep --exclude-dir fixtures foo bar    # Skip an extra directory
  zrep --exclude-file '*.lock' foo bar   # Skip lock files
  zrep TODO '' -f json                   # Delete every TODO, JSON report
  zrep -- -v --verbose                   # Use `--` when PATTERN looks like a flag"
)]
pub struct Args {
    /// The literal string to search for. Must not be empty.
    #[arg(allow_hyphen_values = true)]
    pub pattern: String,

    /// The string to replace each occurrence with. May be empty.
    #[arg(allow_hyphen_values = true)]
    pub replacement: String,

    /// The directory to process. Defaults to the current directory.
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// List the files that would change without modifying anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Additional directory name to skip. Can be repeated.
    #[arg(long = "exclude-dir", value_name = "NAME")]
    pub exclude_dirs: Vec<String>,

    /// Additional file name or `*.ext` glob to skip. Can be repeated.
    #[arg(long = "exclude-file", value_name = "PATTERN")]
    pub exclude_files: Vec<String>,

    /// Do not apply the built-in directory and file exclusions.
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Do not descend deeper than this many levels below the root.
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Do not follow symbolic links to directories or files.
    #[arg(long)]
    pub no_follow_links: bool,

    /// The output format for the report (`text`, `json`, `csv`).
    #[arg(short = 'f', long = "format", default_value = "text")]
    pub format: String,

    /// Increase log verbosity (`-v` info, `-vv` debug). `ZREP_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Builds the immutable request for this invocation.
    pub fn to_request(&self) -> SearchRequest {
        let mut request = SearchRequest::new(&self.pattern, &self.replacement, &self.dir);
        if self.no_default_excludes {
            request = request.without_default_excludes();
        }
        request
            .exclude_dirs(&self.exclude_dirs)
            .exclude_files(&self.exclude_files)
            .max_depth(self.max_depth)
            .follow_links(!self.no_follow_links)
    }
}

/// Parses command-line arguments and returns the populated `Args` struct.
pub fn parse_args() -> Args {
    Args::parse()
}
