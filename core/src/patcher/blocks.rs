use crate::error::{AppError, AppResult};
use crate::patcher::anchor::AnchorFinder;
use crate::patcher::common::{read_source, write_source};
use regex::Regex;
use std::path::Path;

/// Drops every line region opened by a `start` match and closed by an `end` match.
///
/// The start check runs before the keep check and the end check after it, so
/// both marker lines are dropped. A start without an end drops through EOF.
/// Every kept line is terminated by `\n`.
pub fn remove_between(source: &str, start: &Regex, end: &Regex) -> String {
    let mut out = String::with_capacity(source.len());
    let mut deleting = false;

    for line in source.lines() {
        if start.is_match(line) {
            deleting = true;
        }
        if !deleting {
            out.push_str(line);
            out.push('\n');
        }
        if end.is_match(line) {
            deleting = false;
        }
    }

    out
}

/// Applies [`remove_between`] to a file on disk. The file is always rewritten.
pub fn remove_between_in_file(path: &Path, start: &Regex, end: &Regex) -> AppResult<()> {
    let source = read_source(path)?;
    write_source(path, &remove_between(&source, start, end))
}

/// Inserts `content` right after the first anchor match.
///
/// A leading newline is added to `content` when missing.
pub fn append_after(
    source: &str,
    content: &str,
    anchor: &dyn AnchorFinder,
) -> AppResult<String> {
    let range = anchor.find(source).ok_or(AppError::PatternNotFound)?;

    let mut patch = String::with_capacity(content.len() + 1);
    if !content.starts_with('\n') {
        patch.push('\n');
    }
    patch.push_str(content);

    let mut new_source = source.to_string();
    new_source.insert_str(range.end, &patch);
    Ok(new_source)
}

/// Applies [`append_after`] to a file on disk. Nothing is written when the
/// anchor is missing.
pub fn append_after_in_file(
    path: &Path,
    content: &str,
    anchor: &dyn AnchorFinder,
) -> AppResult<()> {
    let source = read_source(path)?;
    let updated = append_after(&source, content, anchor)?;
    write_source(path, &updated)
}
