//! Text edits against a source file.

use anyhow::{bail, Result};

/// Replace `start..end` with `text`. An insertion has `start == end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Edit {
    /// Insert `text` at `offset`.
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Edit {
            start: offset,
            end: offset,
            text: text.into(),
        }
    }

    /// Replace the `start..end` range with `text`.
    pub fn replace(start: usize, end: usize, text: impl Into<String>) -> Self {
        Edit {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Apply edits to `source`.
///
/// Edits are applied in offset order; insertions at the same offset keep
/// the order they were given in. Overlapping edits are rejected.
pub fn apply_edits(source: &str, edits: &[Edit]) -> Result<String> {
    let mut ordered: Vec<&Edit> = edits.iter().collect();
    ordered.sort_by_key(|edit| edit.start);

    let mut output = String::with_capacity(source.len() + edits.iter().map(|e| e.text.len()).sum::<usize>());
    let mut cursor = 0;
    for edit in ordered {
        if edit.start < cursor || edit.end < edit.start || edit.end > source.len() {
            bail!("overlapping or out-of-range edit at {}..{}", edit.start, edit.end);
        }
        output.push_str(&source[cursor..edit.start]);
        output.push_str(&edit.text);
        cursor = edit.end;
    }
    output.push_str(&source[cursor..]);
    Ok(output)
}

/// Prefix every line of `text` with `indent`, joining with `newline`.
pub fn indent_lines(text: &str, indent: &str, newline: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join(newline)
}

/// Like [`indent_lines`], but leaves the first line alone.
pub fn indent_continuation_lines(text: &str, indent: &str, newline: &str) -> String {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default().to_string();
    let rest: Vec<String> = lines
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect();

    if rest.is_empty() {
        first
    } else {
        format!("{}{}{}", first, newline, rest.join(newline))
    }
}
