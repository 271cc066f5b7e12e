//! Text/binary classification of files.
//!
//! The first [`SNIFF_LEN`] bytes are matched against known magic numbers. A
//! recognised type is text only if its media type is `text/*`. Some signatures
//! are only two or three printable bytes (`BM`, `MZ`, `ID3`), so a non-text
//! match only counts when the prefix also holds control bytes that text does
//! not use. When nothing is recognised, the prefix is binary if it holds a NUL
//! byte.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// How many leading bytes are inspected.
pub const SNIFF_LEN: usize = 1024;

/// Whether a file is eligible for rewriting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Binary,
}

impl FileKind {
    pub fn is_binary(self) -> bool {
        self == FileKind::Binary
    }
}

/// Classifies a content prefix.
pub fn classify_bytes(prefix: &[u8]) -> FileKind {
    let prefix = &prefix[..prefix.len().min(SNIFF_LEN)];
    match infer::get(prefix) {
        Some(kind) if kind.mime_type().starts_with("text/") => FileKind::Text,
        Some(kind) if has_binary_control_bytes(prefix) => {
            debug!(mime = kind.mime_type(), "detected non-text media type");
            FileKind::Binary
        }
        Some(kind) => {
            debug!(mime = kind.mime_type(), "signature match on printable prefix, treating as text");
            FileKind::Text
        }
        None => classify_by_nul(prefix),
    }
}

/// `true` if the prefix holds a NUL or a control byte other than tab, newline,
/// form feed, carriage return or escape.
fn has_binary_control_bytes(prefix: &[u8]) -> bool {
    prefix
        .iter()
        .any(|&b| (b < 0x20 && !matches!(b, b'\t' | b'\n' | 0x0c | b'\r' | 0x1b)) || b == 0x7f)
}

/// The fallback heuristic: any NUL byte in the prefix means binary.
pub fn classify_by_nul(prefix: &[u8]) -> FileKind {
    if prefix.contains(&0) {
        FileKind::Binary
    } else {
        FileKind::Text
    }
}

/// Reads up to [`SNIFF_LEN`] bytes from `reader` into `buf`.
///
/// The reader is left positioned after the prefix, so the caller can keep
/// reading the rest of the content from the same handle.
pub fn read_prefix<R: Read>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<usize> {
    reader.take(SNIFF_LEN as u64).read_to_end(buf)
}

/// Classifies the file at `path`, reporting open/read failures to the caller.
pub fn classify(path: &Path) -> io::Result<FileKind> {
    let mut file = File::open(path)?;
    let mut prefix = Vec::with_capacity(SNIFF_LEN);
    read_prefix(&mut file, &mut prefix)?;
    Ok(classify_bytes(&prefix))
}

/// `true` if the file should be left alone.
///
/// A file that cannot be opened or read counts as binary.
pub fn is_binary(path: &Path) -> bool {
    match classify(path) {
        Ok(kind) => kind.is_binary(),
        Err(e) => {
            debug!(path = %path.display(), "unreadable, treating as binary: {e}");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_binary_file() {
        let temp_dir = TempDir::new().unwrap();
        let text_file = temp_dir.path().join("test.txt");
        fs::write(&text_file, "hello world").unwrap();
        assert!(!is_binary(&text_file));

        let binary_file = temp_dir.path().join("test.bin");
        fs::write(&binary_file, b"\x00\x01\x02\x03").unwrap();
        assert!(is_binary(&binary_file));
    }

    #[test]
    fn test_magic_number_detection() {
        let png = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
        assert_eq!(classify_bytes(png), FileKind::Binary);

        let gzip = b"\x1f\x8b\x08\x00\x00\x00\x00\x00";
        assert_eq!(classify_bytes(gzip), FileKind::Binary);
    }

    #[test]
    fn test_text_media_types_are_text() {
        let html = b"<!DOCTYPE html><html><body>hello</body></html>";
        assert_eq!(classify_bytes(html), FileKind::Text);

        let script = b"#!/bin/sh\necho hello\n";
        assert_eq!(classify_bytes(script), FileKind::Text);
    }

    #[test]
    fn test_short_signatures_on_plain_text_are_text() {
        assert_eq!(classify_bytes(b"BM25 ranking uses foo weights\n"), FileKind::Text);
        assert_eq!(classify_bytes(b"MZ prefix notes: foo\n"), FileKind::Text);
        assert_eq!(classify_bytes(b"ID3 tags and foo\n"), FileKind::Text);
        assert_eq!(classify_bytes(b"{\\rtf1 foo}\n"), FileKind::Text);
    }

    #[test]
    fn test_short_signatures_with_binary_bytes_are_binary() {
        assert_eq!(classify_bytes(b"MZ\x90\x00\x03\x00\x00\x00\x04\x00"), FileKind::Binary);
        assert_eq!(classify_bytes(b"BM\x36\x10\x0e\x00\x00\x00"), FileKind::Binary);
    }

    #[test]
    fn test_nul_fallback() {
        assert_eq!(classify_bytes(b"plain text\nwith lines\n"), FileKind::Text);
        assert_eq!(classify_bytes(b"abc\x00def"), FileKind::Binary);
        assert_eq!(classify_bytes(b""), FileKind::Text);
    }

    #[test]
    fn test_non_utf8_text_is_text() {
        // Latin-1 bytes without NULs are still text.
        assert_eq!(classify_bytes(b"caf\xe9 cr\xe8me"), FileKind::Text);
    }

    #[test]
    fn test_nul_after_prefix_is_ignored() {
        let mut content = vec![b'a'; SNIFF_LEN];
        content.push(0);
        assert_eq!(classify_bytes(&content), FileKind::Text);
    }

    #[test]
    fn test_read_prefix_leaves_reader_positioned() {
        let data = vec![b'x'; SNIFF_LEN + 10];
        let mut reader = io::Cursor::new(data);
        let mut buf = Vec::new();
        assert_eq!(read_prefix(&mut reader, &mut buf).unwrap(), SNIFF_LEN);
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(buf.len(), SNIFF_LEN + 10);
    }

    #[test]
    fn test_unreadable_file_is_binary() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.txt");
        assert!(classify(&missing).is_err());
        assert!(is_binary(&missing));
    }
}
