//! Newline-style detection and normalization
//!
//! Strategies that rewrite a file keep the newline convention the project
//! already uses. The convention is taken from the first line of the first
//! buffer that has a line ending (target first, then template), falling back
//! to `\n`.
//!
//! Buffers are plain byte slices, so detection never moves a read position:
//! every consumer reads from offset zero.

/// Newline used when none of the inspected buffers contains a line ending.
pub const DEFAULT_NEWLINE: &str = "\n";

/// Detect the newline style of the first buffer that has a line ending.
///
/// `None` entries (a target file that does not exist yet) are skipped.
pub fn detect_newline(candidates: &[Option<&[u8]>]) -> &'static str {
    detect_newline_or(candidates, DEFAULT_NEWLINE)
}

/// Same as [`detect_newline`] with an explicit fallback.
pub fn detect_newline_or<'a>(candidates: &[Option<&[u8]>], default: &'a str) -> &'a str {
    candidates
        .iter()
        .flatten()
        .find_map(|buffer| first_line_ending(buffer))
        .unwrap_or(default)
}

fn first_line_ending(buffer: &[u8]) -> Option<&'static str> {
    let pos = buffer.iter().position(|&b| b == b'\n' || b == b'\r')?;
    match (buffer[pos], buffer.get(pos + 1)) {
        (b'\r', Some(b'\n')) => Some("\r\n"),
        (b'\r', _) => Some("\r"),
        _ => Some("\n"),
    }
}

/// Split text into lines on `\r\n`, `\r` and `\n`, dropping the line endings.
///
/// A trailing line ending does not produce an extra empty line, so
/// `"a\nb\n"` and `"a\nb"` both split into `["a", "b"]`.
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }

    if start < bytes.len() {
        lines.push(&text[start..]);
    }

    lines
}

/// Rewrite every line ending in `content` to `newline`.
pub fn normalize_newlines(content: &[u8], newline: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len());
    let mut i = 0;

    while i < content.len() {
        match content[i] {
            b'\r' => {
                out.extend_from_slice(newline.as_bytes());
                i += if content.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
            }
            b'\n' => {
                out.extend_from_slice(newline.as_bytes());
                i += 1;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }

    out
}
