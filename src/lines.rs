//! Whole-file loading and line splitting.
//!
//! Vocabulary files are read into a single buffer once; every other structure
//! holds slices into that buffer rather than owned copies.

use crate::error::{EmulatorError, Result};
use std::fs;
use std::path::Path;

/// Read a whole file into memory.
pub fn load_file(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(EmulatorError::MissingInput(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

/// Split a buffer into line records, without their `\n`.
///
/// A trailing newline does not produce an empty final record. Carriage
/// returns are left in place; every consumer treats bytes `<= b' '` as a
/// terminator anyway.
pub fn split_lines(buf: &[u8]) -> Vec<&[u8]> {
    let mut lines: Vec<&[u8]> = buf.split(|&b| b == b'\n').collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Length of the leading word, i.e. the offset of the first byte `<= b' '`.
#[inline]
pub fn word_len(record: &[u8]) -> usize {
    record.iter().position(|&b| b <= b' ').unwrap_or(record.len())
}

/// Record text for diagnostics, without its line terminator.
pub(crate) fn display_record(record: &[u8]) -> String {
    String::from_utf8_lossy(record).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_drops_trailing_empty_line() {
        let lines = split_lines(b"apple\t1\nbanana\t2\n");
        assert_eq!(lines, vec![&b"apple\t1"[..], &b"banana\t2"[..]]);
    }

    #[test]
    fn split_keeps_last_line_without_newline() {
        let lines = split_lines(b"a\n\nb");
        assert_eq!(lines, vec![&b"a"[..], &b""[..], &b"b"[..]]);
        assert!(split_lines(b"").is_empty());
    }

    #[test]
    fn word_len_stops_at_control_bytes() {
        assert_eq!(word_len(b"zeta\t10"), 4);
        assert_eq!(word_len(b"yak\r"), 3);
        assert_eq!(word_len(b"solo"), 4);
        assert_eq!(word_len(b"\tlead"), 0);
    }

    #[test]
    fn load_missing_file_is_reported() {
        let err = load_file(Path::new("/definitely/not/here_vocab.tsv")).unwrap_err();
        assert!(matches!(err, EmulatorError::MissingInput(_)));
    }
}
