use crate::classifier::{self, FileKind};
use crate::errors::{FileError, FileErrorKind};
use crate::matcher;
use bstr::ByteSlice;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Core engine for replacing a literal pattern in files.
///
/// Every file goes through the same pipeline: classify, match, substitute,
/// and commit through a temporary file that is atomically moved over the
/// original. Binary files and files without the pattern are never written.
#[derive(Debug, Clone)]
pub struct Replacer {
    pattern: String,
    replacement: String,
}

/// Options for processing a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// If `true`, changes will be calculated but not written to disk.
    pub dry_run: bool,
}

/// What the pipeline decided for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceStatus {
    /// The file was (or, in a dry run, would be) rewritten.
    Replaced { occurrences: usize },
    /// Text file without the pattern; left untouched.
    PatternAbsent,
    /// Binary file; left untouched.
    Binary,
}

impl ReplaceStatus {
    pub fn is_replaced(&self) -> bool {
        matches!(self, ReplaceStatus::Replaced { .. })
    }
}

/// Classification and match result for one file, computed from a single read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileVerdict {
    pub path: PathBuf,
    pub is_binary: bool,
    pub contains_pattern: bool,
}

enum Loaded {
    Binary,
    Text(Vec<u8>),
}

impl Replacer {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Classifies and matches a file without changing it.
    pub fn inspect(&self, path: &Path) -> Result<FileVerdict, FileError> {
        let verdict = match load(path)? {
            Loaded::Binary => FileVerdict {
                path: path.to_path_buf(),
                is_binary: true,
                contains_pattern: false,
            },
            Loaded::Text(content) => FileVerdict {
                path: path.to_path_buf(),
                is_binary: false,
                contains_pattern: matcher::contains(&content, &self.pattern),
            },
        };
        Ok(verdict)
    }

    /// Processes a single file.
    ///
    /// The process is as follows:
    /// 1. The file is opened once; its first bytes decide text or binary.
    ///    Binary files are skipped without reading further.
    /// 2. The rest of the content is read and searched for the pattern.
    ///    Files without it are skipped, so their timestamps are preserved.
    /// 3. Every non-overlapping occurrence is replaced in a single left-to-right
    ///    pass. The replacement is not rescanned.
    /// 4. Unless `dry_run` is set, the new content is written to a temporary
    ///    file next to the target and moved over it in one rename.
    pub fn process_file(
        &self,
        path: &Path,
        options: ProcessOptions,
    ) -> Result<ReplaceStatus, FileError> {
        let content = match load(path)? {
            Loaded::Binary => {
                debug!(path = %path.display(), "skipping binary file");
                return Ok(ReplaceStatus::Binary);
            }
            Loaded::Text(content) => content,
        };

        let occurrences = matcher::count(&content, &self.pattern);
        if occurrences == 0 {
            debug!(path = %path.display(), "pattern absent");
            return Ok(ReplaceStatus::PatternAbsent);
        }

        if !options.dry_run {
            let new_content = content.replace(&self.pattern, &self.replacement);
            write_atomic(path, &new_content)?;
            debug!(path = %path.display(), occurrences, "replaced");
        }

        Ok(ReplaceStatus::Replaced { occurrences })
    }

    /// Rewrites `path` in place. Returns `true` if the file was modified.
    pub fn replace(&self, path: &Path) -> Result<bool, FileError> {
        self.process_file(path, ProcessOptions::default())
            .map(|status| status.is_replaced())
    }
}

/// Replaces every occurrence of `pattern` in the file at `path`.
///
/// Returns `Ok(false)` for binary files and files without the pattern.
pub fn replace_in_file(path: &Path, pattern: &str, replacement: &str) -> Result<bool, FileError> {
    Replacer::new(pattern, replacement).replace(path)
}

/// Reads a file through one handle, stopping after the prefix if it is binary.
fn load(path: &Path) -> Result<Loaded, FileError> {
    let mut file = File::open(path).map_err(|e| FileError::read(path, e))?;
    let mut content = Vec::new();
    classifier::read_prefix(&mut file, &mut content).map_err(|e| FileError::read(path, e))?;

    if classifier::classify_bytes(&content) == FileKind::Binary {
        return Ok(Loaded::Binary);
    }

    file.read_to_end(&mut content)
        .map_err(|e| FileError::read(path, e))?;
    Ok(Loaded::Text(content))
}

/// Writes `content` to a temporary file in the target's directory and renames it
/// over `path`.
///
/// The temporary file is removed on every failure path, and the original file
/// is only replaced by the final rename.
fn write_atomic(path: &Path, content: &[u8]) -> Result<(), FileError> {
    // Rewrite the link target so the symlink itself survives.
    let is_link = fs::symlink_metadata(path)
        .map_err(|e| FileError::read(path, e))?
        .file_type()
        .is_symlink();
    let resolved;
    let target = if is_link {
        resolved = fs::canonicalize(path).map_err(|e| FileError::read(path, e))?;
        resolved.as_path()
    } else {
        path
    };

    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| FileError::write(path, e))?;
    temp_file
        .write_all(content)
        .and_then(|_| temp_file.as_file().sync_all())
        .map_err(|e| FileError::write(path, e))?;

    // Preserve file permissions
    let perms = fs::metadata(target)
        .map_err(|e| FileError::read(path, e))?
        .permissions();
    fs::set_permissions(temp_file.path(), perms).map_err(|e| FileError::write(path, e))?;

    temp_file
        .persist(target)
        .map_err(|e| FileError::new(path, FileErrorKind::Persist, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn dir_entries(dir: &TempDir) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_replace_in_file() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = create_test_file(&temp_dir, "test.txt", b"hello world\nhello python");

        assert!(replace_in_file(&test_file, "hello", "hi").unwrap());
        assert_eq!(fs::read_to_string(&test_file).unwrap(), "hi world\nhi python");

        assert!(!replace_in_file(&test_file, "goodbye", "bye").unwrap());
    }

    #[test]
    fn test_replace_in_binary_file() {
        let temp_dir = TempDir::new().unwrap();
        let original = b"\x00hello\x01world\x02";
        let binary_file = create_test_file(&temp_dir, "test.bin", original);

        let replacer = Replacer::new("hello", "hi");
        let status = replacer
            .process_file(&binary_file, ProcessOptions::default())
            .unwrap();
        assert_eq!(status, ReplaceStatus::Binary);
        assert_eq!(fs::read(&binary_file).unwrap(), original);
    }

    #[test]
    fn test_occurrence_count_and_single_pass() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_file(&temp_dir, "a.txt", b"foo foo bar");

        // The replacement contains the pattern; it must not be rescanned.
        let replacer = Replacer::new("foo", "foofoo");
        let status = replacer.process_file(&file, ProcessOptions::default()).unwrap();
        assert_eq!(status, ReplaceStatus::Replaced { occurrences: 2 });
        assert_eq!(fs::read_to_string(&file).unwrap(), "foofoo foofoo bar");
    }

    #[test]
    fn test_empty_replacement_deletes() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_file(&temp_dir, "a.txt", b"a-b-c");

        assert!(replace_in_file(&file, "-", "").unwrap());
        assert_eq!(fs::read_to_string(&file).unwrap(), "abc");
    }

    #[test]
    fn test_identity_replacement_counts_as_match() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_file(&temp_dir, "a.txt", b"same same");

        assert!(replace_in_file(&file, "same", "same").unwrap());
        assert_eq!(fs::read_to_string(&file).unwrap(), "same same");
    }

    #[test]
    fn test_other_bytes_are_preserved() {
        let temp_dir = TempDir::new().unwrap();
        // Invalid UTF-8 around the match must survive untouched.
        let file = create_test_file(&temp_dir, "latin1.txt", b"caf\xe9 foo cr\xe8me\r\n");

        assert!(replace_in_file(&file, "foo", "bar").unwrap());
        assert_eq!(fs::read(&file).unwrap(), b"caf\xe9 bar cr\xe8me\r\n");
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_file(&temp_dir, "a.txt", b"foo");

        let replacer = Replacer::new("foo", "bar");
        let status = replacer
            .process_file(&file, ProcessOptions { dry_run: true })
            .unwrap();
        assert_eq!(status, ReplaceStatus::Replaced { occurrences: 1 });
        assert_eq!(fs::read_to_string(&file).unwrap(), "foo");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_file(&temp_dir, "a.txt", b"foo");

        replace_in_file(&file, "foo", "bar").unwrap();
        assert_eq!(dir_entries(&temp_dir), vec!["a.txt"]);
    }

    #[test]
    fn test_inspect() {
        let temp_dir = TempDir::new().unwrap();
        let text = create_test_file(&temp_dir, "a.txt", b"foo");
        let binary = create_test_file(&temp_dir, "b.bin", b"\x00foo");
        let replacer = Replacer::new("foo", "bar");

        let verdict = replacer.inspect(&text).unwrap();
        assert!(!verdict.is_binary);
        assert!(verdict.contains_pattern);

        let verdict = replacer.inspect(&binary).unwrap();
        assert!(verdict.is_binary);
        assert!(!verdict.contains_pattern);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.txt");

        let err = replace_in_file(&missing, "foo", "bar").unwrap_err();
        assert_eq!(err.kind, FileErrorKind::Read);
        assert_eq!(err.path, missing);
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions_preserved() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let script = create_test_file(&temp_dir, "run.sh", b"#!/bin/sh\necho foo\n");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(replace_in_file(&script, "foo", "bar").unwrap());
        let mode = fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        // A non-empty directory cannot be replaced by a file rename.
        let target = temp_dir.path().join("occupied");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), "keep").unwrap();

        let err = write_atomic(&target, b"new content").unwrap_err();

        assert_eq!(err.kind, FileErrorKind::Persist);
        assert_eq!(err.path, target);
        assert_eq!(dir_entries(&temp_dir), vec!["occupied"]);
        assert_eq!(fs::read_to_string(target.join("keep.txt")).unwrap(), "keep");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_keeps_link() {
        let temp_dir = TempDir::new().unwrap();
        let real = create_test_file(&temp_dir, "real.txt", b"foo");
        let link = temp_dir.path().join("link.txt");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        assert!(replace_in_file(&link, "foo", "bar").unwrap());
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "bar");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_failure_leaves_original_untouched() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("locked");
        fs::create_dir(&sub).unwrap();
        let file = sub.join("a.txt");
        fs::write(&file, "foo").unwrap();
        fs::set_permissions(&sub, fs::Permissions::from_mode(0o555)).unwrap();

        // Root ignores directory permissions, so only assert when the lock holds.
        let locked = fs::File::create(sub.join("probe")).is_err();
        let result = replace_in_file(&file, "foo", "bar");
        fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();

        if locked {
            let err = result.unwrap_err();
            assert_eq!(err.kind, FileErrorKind::Write);
            assert_eq!(fs::read_to_string(&file).unwrap(), "foo");
            let names: Vec<_> = fs::read_dir(&sub).unwrap().collect();
            assert_eq!(names.len(), 1);
        }
    }
}
