//! Literal pattern detection.
//!
//! Content is searched as raw bytes against the UTF-8 encoding of the pattern,
//! so files with invalid UTF-8 sequences are still searchable and nothing is
//! decoded or lost along the way.

use bstr::ByteSlice;
use std::fs;
use std::path::Path;
use tracing::debug;

/// `true` if `haystack` contains `pattern` at least once. An empty pattern never matches.
pub fn contains(haystack: &[u8], pattern: &str) -> bool {
    !pattern.is_empty() && haystack.contains_str(pattern)
}

/// Counts the non-overlapping occurrences of `pattern`, scanning left to right.
pub fn count(haystack: &[u8], pattern: &str) -> usize {
    if pattern.is_empty() {
        return 0;
    }
    haystack.find_iter(pattern).count()
}

/// `true` if the file at `path` contains `pattern`.
///
/// Read failures count as "no match" so one unreadable file never stops a walk.
pub fn contains_pattern(path: &Path, pattern: &str) -> bool {
    match fs::read(path) {
        Ok(content) => contains(&content, pattern),
        Err(e) => {
            debug!(path = %path.display(), "read failed while matching: {e}");
            false
        }
    }
}
