//! Char-offset line helpers shared by the style engine and overlay layer.
//!
//! Offsets are Unicode scalar (char) indices, the unit used by the editor
//! buffer and by egui cursors.

use std::ops::Range;

/// Line-start table for a text snapshot, in char offsets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineIndex {
    starts: Vec<usize>,
    len_chars: usize,
}

impl LineIndex {
    /// Build the line table for `text`. Lines are terminated by `\n`; a text
    /// ending in `\n` has a final empty line starting at its end.
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        let mut len_chars = 0usize;
        for ch in text.chars() {
            len_chars += 1;
            if ch == '\n' {
                starts.push(len_chars);
            }
        }
        Self { starts, len_chars }
    }

    /// Total char length of the indexed text.
    pub fn len_chars(&self) -> usize {
        self.len_chars
    }

    /// Number of lines (always at least one).
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Char offset where `line` (0-based) starts.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.starts.get(line).copied()
    }

    /// 0-based line containing `offset`; offsets past the end clamp to the
    /// last line.
    pub fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.len_chars);
        self.starts
            .partition_point(|start| *start <= offset)
            .saturating_sub(1)
    }

    /// Range of `line` including its terminator.
    pub fn line_range(&self, line: usize) -> Range<usize> {
        let Some(start) = self.line_start(line) else {
            return self.len_chars..self.len_chars;
        };
        let end = self
            .line_start(line + 1)
            .unwrap_or(self.len_chars);
        start..end
    }

    /// Range of the line containing `offset`, including its terminator.
    pub fn line_range_at(&self, offset: usize) -> Range<usize> {
        self.line_range(self.line_of(offset))
    }

    /// Smallest run of whole lines covering `range`.
    pub fn line_range_for(&self, range: &Range<usize>) -> Range<usize> {
        let first = self.line_of(range.start);
        let last = if range.end > range.start {
            self.line_of(range.end - 1)
        } else {
            first
        };
        let start = self.line_range(first).start;
        let end = self.line_range(last).end;
        start..end.max(start)
    }
}

/// Number of chars in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the `char_index`-th char, or `text.len()` at the end.
///
/// # Returns
/// `None` when `char_index` is past the end of `text`.
pub fn char_to_byte(text: &str, char_index: usize) -> Option<usize> {
    if char_index == 0 {
        return Some(0);
    }
    match text.char_indices().nth(char_index) {
        Some((byte, _)) => Some(byte),
        None if char_len(text) == char_index => Some(text.len()),
        None => None,
    }
}

/// Convert a char range into a byte range of `text`.
pub fn char_range_to_bytes(text: &str, range: &Range<usize>) -> Option<Range<usize>> {
    let start = char_to_byte(text, range.start)?;
    let end = char_to_byte(text, range.end)?;
    (start <= end).then_some(start..end)
}

/// Slice `text` by a char range.
pub fn slice_chars<'a>(text: &'a str, range: &Range<usize>) -> Option<&'a str> {
    let bytes = char_range_to_bytes(text, range)?;
    text.get(bytes)
}
