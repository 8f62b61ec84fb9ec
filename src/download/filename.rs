//! Title sanitization and destination path layout.
//!
//! Every title gets its own directory: `<root>/<title>/<title>.mp4`.

use std::path::{Path, PathBuf};

/// Extension used for every stored media file.
pub const MEDIA_EXTENSION: &str = "mp4";

/// Longest sanitized title, in characters, kept under common `NAME_MAX`.
const MAX_TITLE_CHARS: usize = 150;

/// Makes a display title safe to use as a single path component.
///
/// Path separators, reserved punctuation and control characters become `_`,
/// runs of `_` collapse, and leading/trailing dots, underscores and
/// whitespace are trimmed. Returns `None` when nothing usable remains.
#[must_use]
pub fn sanitize_title(title: &str) -> Option<String> {
    let mut out = String::with_capacity(title.len());
    let mut prev_sep = false;
    for ch in title.chars() {
        let mapped = match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() => ' ',
            c if c.is_control() => '_',
            c => c,
        };
        if mapped == '_' {
            if !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else {
            out.push(mapped);
            prev_sep = false;
        }
    }

    let trimmed: String = out
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '_' || c == '.' || c.is_whitespace())
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect();
    let trimmed = trimmed.trim_end().to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Returns `(directory, file)` for a sanitized title under `root`.
#[must_use]
pub fn destination_for(root: &Path, safe_title: &str) -> (PathBuf, PathBuf) {
    let dir = root.join(safe_title);
    let file = dir.join(format!("{safe_title}.{MEDIA_EXTENSION}"));
    (dir, file)
}
