//! Input utilities
//!
//! Helpers for assembling the user prompt from arguments and piped stdin, and
//! for turning model-generated titles into something safe to put in a file name.

use std::io::{self, IsTerminal, Read};

pub const UNKNOWN_TOPIC: &str = "unknown-topic";

/// Longest title kept in a log file name, in bytes. Leaves room for the
/// timestamp and extension under the usual 255-byte file name limit.
pub const MAX_TITLE_BYTES: usize = 100;

/// Join the positional prompt words, falling back to `--prompt`.
pub fn prompt_from_args(words: &[String], prompt_flag: Option<&str>) -> String {
    if words.is_empty() {
        prompt_flag.unwrap_or_default().to_string()
    } else {
        words.join(" ")
    }
}

/// Append piped input after two newlines.
pub fn append_piped_input(prompt: &str, piped: Option<&str>) -> String {
    match piped {
        Some(extra) => format!("{prompt}\n\n{extra}"),
        None => prompt.to_string(),
    }
}

/// Read all of stdin when it is not an interactive terminal.
pub fn read_piped_stdin() -> io::Result<Option<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    read_all_lossy(&mut stdin.lock()).map(Some)
}

/// Read a stream to the end. Invalid UTF-8 becomes U+FFFD instead of an error.
pub fn read_all_lossy<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(match String::from_utf8(buffer) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}

fn truncate_to_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Make a model-generated title safe to embed in a file name.
///
/// This function:
/// - Trims surrounding whitespace
/// - Converts path separators and control characters to `-`
/// - Caps the length at [`MAX_TITLE_BYTES`] on a character boundary
/// - Falls back to `unknown-topic` when nothing is left
pub fn sanitize_title(title: &str) -> String {
    let mut sanitized = String::with_capacity(title.len());

    for c in title.trim().chars() {
        match c {
            '/' | '\\' => sanitized.push('-'),
            _ if c.is_control() => sanitized.push('-'),
            _ => sanitized.push(c),
        }
    }

    let is_edge = |c: char| c == '.' || c.is_whitespace();
    let trimmed = sanitized.trim_matches(is_edge);
    let trimmed = truncate_to_char_boundary(trimmed, MAX_TITLE_BYTES).trim_end_matches(is_edge);
    if trimmed.is_empty() {
        UNKNOWN_TOPIC.to_string()
    } else {
        trimmed.to_string()
    }
}
