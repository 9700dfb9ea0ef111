//! Text-surface collaborator: the styled buffer the overlay layer measures.
//!
//! A surface applies [`quicknote_core::StyleSheet`]s, carries per-line display
//! attributes (hidden text, paragraph spacing) and answers layout queries in
//! its own coordinate space.

mod egui_surface;
mod memory;

pub use egui_surface::{EguiSurface, SurfaceEvents};
pub use memory::GridSurface;

use eframe::egui::{Rect, Vec2};
use quicknote_core::StyleTarget;
use std::ops::Range;

/// Editor surface the reconciler drives.
pub trait TextSurface: StyleTarget {
    /// Buffer length in chars.
    fn len_chars(&self) -> usize;

    /// Cursor position in chars.
    fn cursor_offset(&self) -> usize;

    /// Monotonic edit counter of the underlying buffer.
    fn revision(&self) -> u64;

    /// Replace `range` with `replacement`; display attributes are dropped
    /// until the next highlight pass.
    ///
    /// # Returns
    /// `false` when `range` does not fit the buffer.
    fn replace_range(&mut self, range: Range<usize>, replacement: &str) -> bool;

    /// Show or hide the glyphs of `range` (hidden glyphs keep their space).
    fn set_visibility(&mut self, range: Range<usize>, visible: bool);

    /// Extra vertical space after the paragraph containing `range`; `0.0`
    /// removes it.
    fn set_paragraph_spacing(&mut self, range: Range<usize>, spacing: f32);

    /// Bring layout up to date with pending display attribute changes.
    fn ensure_layout(&mut self);

    /// Laid-out bounds of `range`, in layout coordinates (before inset).
    fn bounding_box(&self, range: &Range<usize>) -> Option<Rect>;

    /// Offset from layout coordinates to overlay coordinates.
    fn content_inset(&self) -> Vec2;

    /// Width available to laid-out text.
    fn container_width(&self) -> f32;
}

/// Hidden ranges and paragraph spacing shared by surface implementations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayAttributes {
    hidden: Vec<Range<usize>>,
    spacing: Vec<(Range<usize>, f32)>,
}

impl DisplayAttributes {
    pub fn clear(&mut self) {
        self.hidden.clear();
        self.spacing.clear();
    }

    pub fn set_visibility(&mut self, range: Range<usize>, visible: bool) {
        self.hidden
            .retain(|hidden| hidden.end <= range.start || hidden.start >= range.end);
        if !visible && range.start < range.end {
            self.hidden.push(range);
        }
    }

    pub fn set_spacing(&mut self, range: Range<usize>, spacing: f32) {
        self.spacing
            .retain(|(spaced, _)| spaced.end <= range.start || spaced.start >= range.end);
        if spacing > 0.0 {
            self.spacing.push((range, spacing));
        }
    }

    pub fn is_hidden(&self, offset: usize) -> bool {
        self.hidden.iter().any(|hidden| hidden.contains(&offset))
    }

    pub fn hidden_ranges(&self) -> &[Range<usize>] {
        &self.hidden
    }

    /// Spacing applied after the line spanning `line` (char range).
    pub fn spacing_for_line(&self, line: &Range<usize>) -> f32 {
        self.spacing
            .iter()
            .filter(|(spaced, _)| {
                spaced.start < line.end.max(line.start + 1) && spaced.end > line.start
            })
            .map(|(_, spacing)| *spacing)
            .fold(0.0, f32::max)
    }

    pub fn has_spacing(&self) -> bool {
        !self.spacing.is_empty()
    }

    /// Copy adjusted for an edit at `at` that changed the length by `delta`
    /// chars. Ranges after the edit move with it, ranges spanning it are
    /// dropped.
    pub fn shifted(&self, at: usize, delta: isize) -> Self {
        let shift = |range: &Range<usize>| -> Option<Range<usize>> {
            if range.end <= at {
                Some(range.clone())
            } else if range.start >= at {
                Some(range.start.checked_add_signed(delta)?..range.end.checked_add_signed(delta)?)
            } else {
                None
            }
        };
        Self {
            hidden: self.hidden.iter().filter_map(shift).collect(),
            spacing: self
                .spacing
                .iter()
                .filter_map(|(range, spacing)| Some((shift(range)?, *spacing)))
                .collect(),
        }
    }
}
