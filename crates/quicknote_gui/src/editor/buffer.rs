//! Rope-backed note buffer with a monotonic revision counter.

use ropey::Rope;
use std::ops::Range;

/// Summary of one buffer mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditDelta {
    /// First line touched, in the pre-edit buffer.
    pub start_line: usize,
    /// Last line touched in the post-edit buffer.
    pub new_end_line: usize,
    /// `inserted_chars - removed_chars`.
    pub char_delta: isize,
}

/// Mutable note text; every edit bumps [`NoteBuffer::revision`].
#[derive(Clone, Debug, Default)]
pub struct NoteBuffer {
    rope: Rope,
    revision: u64,
}

impl NoteBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            revision: 0,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines().max(1)
    }

    /// UTF-8 snapshot of the whole buffer.
    pub fn snapshot(&self) -> String {
        self.rope.to_string()
    }

    /// Replace the contents wholesale (counts as one edit).
    pub fn reset(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.revision = self.revision.wrapping_add(1);
    }

    /// 0-based `(line, column)` of a char offset, clamped to the buffer.
    pub fn char_to_line_col(&self, char_index: usize) -> (usize, usize) {
        let clamped = char_index.min(self.len_chars());
        let line = self.rope.char_to_line(clamped);
        (line, clamped - self.rope.line_to_char(line))
    }

    /// Char range of `line` including its terminator.
    pub fn line_char_range(&self, line: usize) -> Range<usize> {
        if line >= self.rope.len_lines() {
            return self.len_chars()..self.len_chars();
        }
        let start = self.rope.line_to_char(line);
        start..start + self.rope.line(line).len_chars()
    }

    /// Text of `line` without its `\n`.
    pub fn line_text(&self, line: usize) -> String {
        let range = self.line_char_range(line);
        self.slice_chars(range).trim_end_matches('\n').to_string()
    }

    pub fn slice_chars(&self, range: Range<usize>) -> String {
        let len = self.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len);
        if start >= end {
            return String::new();
        }
        self.rope.slice(start..end).to_string()
    }

    /// Replace a char range with `text`.
    ///
    /// # Returns
    /// `None` for an inverted range or a no-op edit.
    pub fn replace_char_range(&mut self, range: Range<usize>, text: &str) -> Option<EditDelta> {
        let len = self.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len);
        if start > end || (start == end && text.is_empty()) {
            return None;
        }
        let start_line = self.rope.char_to_line(start);
        let inserted = text.chars().count();
        if start < end {
            self.rope.remove(start..end);
        }
        if !text.is_empty() {
            self.rope.insert(start, text);
        }
        self.revision = self.revision.wrapping_add(1);
        Some(EditDelta {
            start_line,
            new_end_line: self.rope.char_to_line(start + inserted),
            char_delta: inserted as isize - (end - start) as isize,
        })
    }

    pub fn insert_text(&mut self, char_index: usize, text: &str) -> Option<EditDelta> {
        self.replace_char_range(char_index..char_index, text)
    }

    pub fn delete_char_range(&mut self, range: Range<usize>) -> Option<EditDelta> {
        self.replace_char_range(range, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_bump_revision_and_report_delta() {
        let mut buffer = NoteBuffer::new("one\ntwo\nthree");
        let delta = buffer
            .replace_char_range(4..7, "dos\nzwei")
            .expect("delta");
        assert_eq!(delta.start_line, 1);
        assert_eq!(delta.new_end_line, 2);
        assert_eq!(delta.char_delta, 5);
        assert_eq!(buffer.revision(), 1);
        assert_eq!(buffer.line_text(1), "dos");
        assert_eq!(buffer.line_text(2), "zwei");
    }

    #[test]
    fn no_op_edits_keep_revision() {
        let mut buffer = NoteBuffer::new("abc");
        assert_eq!(buffer.insert_text(1, ""), None);
        assert_eq!(buffer.delete_char_range(2..2), None);
        assert_eq!(buffer.revision(), 0);
    }

    #[test]
    fn line_col_uses_chars() {
        let buffer = NoteBuffer::new("aé\nb");
        assert_eq!(buffer.char_to_line_col(2), (0, 2));
        assert_eq!(buffer.char_to_line_col(3), (1, 0));
        assert_eq!(buffer.line_char_range(0), 0..3);
        assert_eq!(buffer.char_to_line_col(99), (1, 1));
    }
}
