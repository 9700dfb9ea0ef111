//! Bridges parser line/byte-column locations to char offsets.

use super::ast::{SourceLocation, SourceRange};
use crate::error::CoreError;
use std::ops::Range;

/// Precomputed line starts for one text snapshot.
///
/// Each stored line length carries a virtual `+1` for its removed `\n`, so
/// offset arithmetic stays stable on the final line too.
#[derive(Debug, Clone)]
pub struct SourcePositionMapper<'a> {
    lines: Vec<&'a str>,
    line_starts: Vec<usize>,
}

impl<'a> SourcePositionMapper<'a> {
    pub fn new(text: &'a str) -> Self {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut line_starts = Vec::with_capacity(lines.len());
        let mut offset = 0usize;
        for line in &lines {
            line_starts.push(offset);
            offset += line.chars().count() + 1;
        }
        Self { lines, line_starts }
    }

    /// Resolve a 1-based line and 1-based UTF-8 byte column to a char offset.
    ///
    /// A column splitting a multi-byte char falls back to treating the byte
    /// column as a char offset.
    ///
    /// # Returns
    /// `None` when `line` is outside the text.
    pub fn resolve(&self, line: usize, column: usize) -> Option<usize> {
        let index = line.checked_sub(1)?;
        let line_text = self.lines.get(index)?;
        let line_start = *self.line_starts.get(index)?;
        let byte_column = column.saturating_sub(1);
        let prefix = &line_text.as_bytes()[..byte_column.min(line_text.len())];
        match std::str::from_utf8(prefix) {
            Ok(prefix) => Some(line_start + prefix.chars().count()),
            Err(_) => Some(line_start + byte_column),
        }
    }

    pub fn resolve_location(&self, location: SourceLocation) -> Option<usize> {
        self.resolve(location.line, location.column)
    }

    /// Resolve a source range; fails when either end is unresolvable or the
    /// range is inverted.
    pub fn try_resolve_range(&self, range: &SourceRange) -> Result<Range<usize>, CoreError> {
        let start = self.resolve_location(range.start).ok_or(
            CoreError::UnresolvableLocation {
                line: range.start.line,
                column: range.start.column,
            },
        )?;
        let end = self
            .resolve_location(range.end)
            .ok_or(CoreError::UnresolvableLocation {
                line: range.end.line,
                column: range.end.column,
            })?;
        if end < start {
            return Err(CoreError::UnresolvableLocation {
                line: range.end.line,
                column: range.end.column,
            });
        }
        Ok(start..end)
    }

    pub fn resolve_range(&self, range: &SourceRange) -> Option<Range<usize>> {
        self.try_resolve_range(range).ok()
    }
}
