//! Incremental text edits.
//!
//! Lines end at `\n`, with a preceding `\r` counted as part of the line
//! terminator. Characters are counted in Unicode scalar values. Both are
//! zero-based.

use quire_core::error::{ResourceError, Result};
use serde::{Deserialize, Serialize};

/// A position in a text document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A half-open range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// A single edit: replace `range` with `text`, or the whole document when
/// there is no range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentContentChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_length: Option<u32>,
    pub text: String,
}

impl TextDocumentContentChange {
    /// Replace the whole document.
    pub fn full(text: impl Into<String>) -> Self {
        Self {
            range: None,
            range_length: None,
            text: text.into(),
        }
    }

    /// Replace `range` with `text`.
    pub fn replace(range: Range, text: impl Into<String>) -> Self {
        Self {
            range: Some(range),
            range_length: None,
            text: text.into(),
        }
    }

    /// Insert `text` at `position`.
    pub fn insert(position: Position, text: impl Into<String>) -> Self {
        Self::replace(Range::new(position, position), text)
    }

    /// Length of the serialized (JSON) form of this change.
    pub fn serialized_len(&self) -> Result<usize> {
        Ok(serde_json::to_string(self)?.len())
    }
}

/// Apply `changes` in order to `content`.
pub fn apply_changes(content: &str, changes: &[TextDocumentContentChange]) -> Result<String> {
    let mut text = content.to_string();

    for change in changes {
        match change.range {
            None => text = change.text.clone(),
            Some(range) => {
                if range.end < range.start {
                    return Err(ResourceError::invalid_change(format!(
                        "range end {}:{} precedes start {}:{}",
                        range.end.line, range.end.character, range.start.line, range.start.character
                    )));
                }
                let start = offset_at(&text, range.start)?;
                let end = offset_at(&text, range.end)?;
                text.replace_range(start..end, &change.text);
            }
        }
    }

    Ok(text)
}

/// Byte offset of `position` in `text`.
fn offset_at(text: &str, position: Position) -> Result<usize> {
    let mut line_start = 0;
    for _ in 0..position.line {
        match text[line_start..].find('\n') {
            Some(idx) => line_start += idx + 1,
            None => {
                return Err(ResourceError::invalid_change(format!(
                    "line {} is beyond the end of the document",
                    position.line
                )));
            }
        }
    }

    let mut line_end = text[line_start..]
        .find('\n')
        .map_or(text.len(), |idx| line_start + idx);
    // A CRLF terminator is not part of the line
    if text[line_start..line_end].ends_with('\r') {
        line_end -= 1;
    }
    let line = &text[line_start..line_end];

    let character = position.character as usize;
    match line.char_indices().nth(character) {
        Some((idx, _)) => Ok(line_start + idx),
        None if line.chars().count() == character => Ok(line_end),
        None => Err(ResourceError::invalid_change(format!(
            "character {} is beyond the end of line {}",
            position.character, position.line
        ))),
    }
}
