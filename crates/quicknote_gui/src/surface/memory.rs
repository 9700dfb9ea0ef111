//! Headless fixed-grid surface.
//!
//! Every char occupies one `char_width` cell and every line one
//! `line_height` row plus its paragraph spacing. Row tops are cached and only
//! refreshed by [`TextSurface::ensure_layout`], mirroring a toolkit whose
//! layout lags behind attribute edits.

use super::{DisplayAttributes, TextSurface};
use crate::editor::buffer::NoteBuffer;
use eframe::egui::{pos2, vec2, Rect, Vec2};
use quicknote_core::{StyleSheet, StyleTarget};
use std::ops::Range;

pub const DEFAULT_CHAR_WIDTH: f32 = 8.0;
pub const DEFAULT_LINE_HEIGHT: f32 = 16.0;
pub const DEFAULT_WIDTH: f32 = 640.0;
pub const DEFAULT_INSET: Vec2 = vec2(12.0, 8.0);

/// In-memory [`TextSurface`] with monospace grid geometry.
#[derive(Debug, Clone)]
pub struct GridSurface {
    buffer: NoteBuffer,
    cursor: usize,
    sheet: Option<StyleSheet>,
    display: DisplayAttributes,
    char_width: f32,
    line_height: f32,
    width: f32,
    inset: Vec2,
    row_tops: Vec<f32>,
    layout_passes: usize,
}

impl GridSurface {
    pub fn new(text: &str) -> Self {
        let mut surface = Self {
            buffer: NoteBuffer::new(text),
            cursor: 0,
            sheet: None,
            display: DisplayAttributes::default(),
            char_width: DEFAULT_CHAR_WIDTH,
            line_height: DEFAULT_LINE_HEIGHT,
            width: DEFAULT_WIDTH,
            inset: DEFAULT_INSET,
            row_tops: Vec::new(),
            layout_passes: 0,
        };
        surface.relayout();
        surface.layout_passes = 0;
        surface
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn buffer(&self) -> &NoteBuffer {
        &self.buffer
    }

    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset.min(self.buffer.len_chars());
    }

    /// Resize the container; layout is stale until the next `ensure_layout`.
    pub fn set_width(&mut self, width: f32) {
        self.width = width;
    }

    pub fn set_inset(&mut self, inset: Vec2) {
        self.inset = inset;
    }

    /// Most recently applied style sheet.
    pub fn applied_sheet(&self) -> Option<&StyleSheet> {
        self.sheet.as_ref()
    }

    pub fn is_hidden(&self, offset: usize) -> bool {
        self.display.is_hidden(offset)
    }

    /// Paragraph spacing after 0-based `line`.
    pub fn spacing_after_line(&self, line: usize) -> f32 {
        self.display
            .spacing_for_line(&self.buffer.line_char_range(line))
    }

    /// Number of `ensure_layout` calls that recomputed rows.
    pub fn layout_passes(&self) -> usize {
        self.layout_passes
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    fn relayout(&mut self) {
        let mut top = 0.0;
        self.row_tops.clear();
        for line in 0..self.buffer.line_count() {
            self.row_tops.push(top);
            top += self.line_height + self.spacing_after_line(line);
        }
        self.layout_passes += 1;
    }

    fn row_rect(&self, line: usize, columns: Range<usize>) -> Option<Rect> {
        let top = *self.row_tops.get(line)?;
        Some(Rect::from_min_max(
            pos2(columns.start as f32 * self.char_width, top),
            pos2(columns.end as f32 * self.char_width, top + self.line_height),
        ))
    }
}

impl StyleTarget for GridSurface {
    fn text(&self) -> String {
        self.buffer.snapshot()
    }

    fn apply_styles(&mut self, sheet: &StyleSheet) {
        self.display.clear();
        self.sheet = Some(sheet.clone());
    }
}

impl TextSurface for GridSurface {
    fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    fn cursor_offset(&self) -> usize {
        self.cursor
    }

    fn revision(&self) -> u64 {
        self.buffer.revision()
    }

    fn replace_range(&mut self, range: Range<usize>, replacement: &str) -> bool {
        if range.start > range.end || range.end > self.buffer.len_chars() {
            return false;
        }
        let Some(delta) = self.buffer.replace_char_range(range.clone(), replacement) else {
            return false;
        };
        self.display.clear();
        if self.cursor >= range.end {
            self.cursor = (self.cursor as isize + delta.char_delta).max(0) as usize;
        } else if self.cursor > range.start {
            self.cursor = range.start + replacement.chars().count();
        }
        true
    }

    fn set_visibility(&mut self, range: Range<usize>, visible: bool) {
        self.display.set_visibility(range, visible);
    }

    fn set_paragraph_spacing(&mut self, range: Range<usize>, spacing: f32) {
        self.display.set_spacing(range, spacing);
    }

    fn ensure_layout(&mut self) {
        self.relayout();
    }

    fn bounding_box(&self, range: &Range<usize>) -> Option<Rect> {
        if range.end > self.buffer.len_chars() || range.start > range.end {
            return None;
        }
        let (first_line, first_col) = self.buffer.char_to_line_col(range.start);
        let (last_line, last_col) = self.buffer.char_to_line_col(range.end);
        if first_line == last_line {
            return self.row_rect(first_line, first_col..last_col);
        }
        let mut bounds = self.row_rect(
            first_line,
            first_col..self.buffer.line_text(first_line).chars().count(),
        )?;
        for line in first_line + 1..=last_line {
            let columns = if line == last_line {
                0..last_col
            } else {
                0..self.buffer.line_text(line).chars().count()
            };
            bounds = bounds.union(self.row_rect(line, columns)?);
        }
        Some(bounds)
    }

    fn content_inset(&self) -> Vec2 {
        self.inset
    }

    fn container_width(&self) -> f32 {
        self.width
    }
}
