//! Style instructions produced by a highlight pass.
//!
//! A [`StyleSheet`] is a full replacement for the buffer's styling: an
//! implicit reset to the base style followed by [`StyledRange`]s applied in
//! push order. Patches merge per attribute key; a later patch overrides only
//! the keys it sets.

use crate::error::CoreError;
use crate::theme::{ColorToken, FontRole};
use serde::Serialize;
use std::collections::BTreeSet;
use std::ops::Range;
use tracing::debug;

/// Partial style; `None` keys leave the underlying attribute untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StylePatch {
    pub font: Option<FontRole>,
    pub foreground: Option<ColorToken>,
    pub background: Option<ColorToken>,
    pub underline: Option<bool>,
    pub strikethrough: Option<bool>,
    /// Link destination consumed by the surface's click handling.
    pub link: Option<String>,
    /// Checkbox toggle target (the `[ ]`/`[x]` span).
    pub checkbox: Option<Range<usize>>,
    pub image_source: Option<String>,
}

impl StylePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, font: FontRole) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_foreground(mut self, color: ColorToken) -> Self {
        self.foreground = Some(color);
        self
    }

    pub fn with_background(mut self, color: ColorToken) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_underline(mut self) -> Self {
        self.underline = Some(true);
        self
    }

    pub fn with_strikethrough(mut self) -> Self {
        self.strikethrough = Some(true);
        self
    }

    pub fn with_link(mut self, destination: impl Into<String>) -> Self {
        self.link = Some(destination.into());
        self
    }

    pub fn with_checkbox(mut self, target: Range<usize>) -> Self {
        self.checkbox = Some(target);
        self
    }

    pub fn with_image_source(mut self, source: impl Into<String>) -> Self {
        self.image_source = Some(source.into());
        self
    }

    /// True when the patch only sets a foreground colour.
    pub fn is_foreground_only(&self) -> bool {
        self.foreground.is_some()
            && *self
                == StylePatch {
                    foreground: self.foreground,
                    ..StylePatch::default()
                }
    }
}

/// Fully resolved attributes at a position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedStyle {
    pub font: FontRole,
    pub foreground: ColorToken,
    pub background: Option<ColorToken>,
    pub underline: bool,
    pub strikethrough: bool,
    pub link: Option<String>,
    pub checkbox: Option<Range<usize>>,
    pub image_source: Option<String>,
}

impl ResolvedStyle {
    /// Document base style: base font, foreground colour, nothing else.
    pub fn base() -> Self {
        Self {
            font: FontRole::Base,
            foreground: ColorToken::Foreground,
            background: None,
            underline: false,
            strikethrough: false,
            link: None,
            checkbox: None,
            image_source: None,
        }
    }

    /// Overlay the keys `patch` sets.
    pub fn apply(&mut self, patch: &StylePatch) {
        if let Some(font) = patch.font {
            self.font = font;
        }
        if let Some(color) = patch.foreground {
            self.foreground = color;
        }
        if let Some(color) = patch.background {
            self.background = Some(color);
        }
        if let Some(underline) = patch.underline {
            self.underline = underline;
        }
        if let Some(strikethrough) = patch.strikethrough {
            self.strikethrough = strikethrough;
        }
        if let Some(link) = &patch.link {
            self.link = Some(link.clone());
        }
        if let Some(checkbox) = &patch.checkbox {
            self.checkbox = Some(checkbox.clone());
        }
        if let Some(source) = &patch.image_source {
            self.image_source = Some(source.clone());
        }
    }
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self::base()
    }
}

/// A patch bound to a char range of the buffer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StyledRange {
    pub range: Range<usize>,
    pub patch: StylePatch,
}

impl StyledRange {
    pub fn new(range: Range<usize>, patch: StylePatch) -> Self {
        Self { range, patch }
    }

    /// Valid for a buffer of `len` chars: non-empty and not past the end.
    pub fn fits(&self, len: usize) -> bool {
        self.range.start < self.range.end && self.range.end <= len
    }
}

/// Maximal run of chars sharing one resolved style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRun {
    pub range: Range<usize>,
    pub style: ResolvedStyle,
}

/// Complete styling instructions for one buffer snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StyleSheet {
    len: usize,
    base: ResolvedStyle,
    ranges: Vec<StyledRange>,
}

impl StyleSheet {
    /// Empty sheet for a buffer of `len` chars.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            base: ResolvedStyle::base(),
            ranges: Vec::new(),
        }
    }

    /// Buffer length the sheet was built for.
    pub fn buffer_len(&self) -> usize {
        self.len
    }

    /// True when the sheet carries at least one range.
    pub fn has_ranges(&self) -> bool {
        !self.ranges.is_empty()
    }

    pub fn base(&self) -> &ResolvedStyle {
        &self.base
    }

    pub fn ranges(&self) -> &[StyledRange] {
        &self.ranges
    }

    /// Append a patch.
    ///
    /// # Errors
    /// [`CoreError::RangeOutOfBounds`] for an empty range or one past the
    /// buffer; the sheet is left unchanged.
    pub fn try_push(&mut self, range: Range<usize>, patch: StylePatch) -> Result<(), CoreError> {
        let styled = StyledRange::new(range, patch);
        if !styled.fits(self.len) {
            return Err(CoreError::RangeOutOfBounds {
                start: styled.range.start,
                end: styled.range.end,
                len: self.len,
            });
        }
        self.ranges.push(styled);
        Ok(())
    }

    /// Append a patch; empty or out-of-bounds ranges are dropped whole.
    ///
    /// # Returns
    /// `true` when the range was kept.
    pub fn push(&mut self, range: Range<usize>, patch: StylePatch) -> bool {
        match self.try_push(range, patch) {
            Ok(()) => true,
            Err(err) => {
                debug!("dropping style range: {}", err);
                false
            }
        }
    }

    pub fn extend(&mut self, ranges: impl IntoIterator<Item = StyledRange>) {
        for styled in ranges {
            self.push(styled.range, styled.patch);
        }
    }

    /// Ranges that still fit a buffer of `len` chars, in application order.
    pub fn applicable(&self, len: usize) -> impl Iterator<Item = &StyledRange> {
        self.ranges.iter().filter(move |styled| styled.fits(len))
    }

    /// Resolve the style at one char offset.
    pub fn style_at(&self, offset: usize) -> ResolvedStyle {
        let mut style = self.base.clone();
        for styled in self.applicable(self.len) {
            if styled.range.contains(&offset) {
                style.apply(&styled.patch);
            }
        }
        style
    }

    /// Flatten into non-overlapping runs covering `0..len`, adjacent runs
    /// with equal styles merged.
    ///
    /// One sweep over the sorted boundaries; each window applies only the
    /// ranges open at its start, in application order.
    pub fn runs(&self) -> Vec<StyleRun> {
        if self.len == 0 {
            return Vec::new();
        }
        let ranges: Vec<&StyledRange> = self.applicable(self.len).collect();
        let mut by_start: Vec<usize> = (0..ranges.len()).collect();
        by_start.sort_by_key(|&index| ranges[index].range.start);

        let mut bounds: Vec<usize> = vec![0, self.len];
        for styled in &ranges {
            bounds.push(styled.range.start);
            bounds.push(styled.range.end);
        }
        bounds.sort_unstable();
        bounds.dedup();

        let mut open: BTreeSet<usize> = BTreeSet::new();
        let mut next = 0;
        let mut runs: Vec<StyleRun> = Vec::with_capacity(bounds.len());
        for window in bounds.windows(2) {
            let (start, end) = (window[0], window[1]);
            open.retain(|&index| ranges[index].range.end > start);
            while let Some(&index) = by_start.get(next) {
                if ranges[index].range.start > start {
                    break;
                }
                open.insert(index);
                next += 1;
            }
            let mut style = self.base.clone();
            for &index in &open {
                style.apply(&ranges[index].patch);
            }
            match runs.last_mut() {
                Some(previous) if previous.style == style && previous.range.end == start => {
                    previous.range.end = end;
                }
                _ => runs.push(StyleRun {
                    range: start..end,
                    style,
                }),
            }
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_and_empty_ranges_are_dropped_whole() {
        let mut sheet = StyleSheet::new(5);
        assert!(!sheet.push(3..6, StylePatch::new().with_underline()));
        assert!(!sheet.push(2..2, StylePatch::new().with_underline()));
        assert!(sheet.push(0..5, StylePatch::new().with_underline()));
        assert_eq!(sheet.ranges().len(), 1);
    }

    #[test]
    fn try_push_reports_the_rejected_range() {
        let mut sheet = StyleSheet::new(5);
        assert!(!sheet.has_ranges());
        assert_eq!(
            sheet.try_push(3..6, StylePatch::new().with_underline()),
            Err(CoreError::RangeOutOfBounds {
                start: 3,
                end: 6,
                len: 5
            })
        );
        assert!(!sheet.has_ranges());
        assert_eq!(sheet.try_push(1..2, StylePatch::new().with_underline()), Ok(()));
        assert!(sheet.has_ranges());
        assert_eq!(sheet.buffer_len(), 5);
    }

    #[test]
    fn a_sheet_without_ranges_still_knows_its_buffer() {
        let sheet = StyleSheet::new(500);
        assert_eq!(sheet.buffer_len(), 500);
        assert!(!sheet.has_ranges());
        assert_eq!(sheet.runs().len(), 1);
    }

    #[test]
    fn sweep_matches_per_offset_resolution_on_nested_ranges() {
        let mut sheet = StyleSheet::new(40);
        for i in 0..10 {
            sheet.push(i..40 - i, StylePatch::new().with_foreground(ColorToken::Comment));
            sheet.push(i * 4..i * 4 + 3, StylePatch::new().with_font(FontRole::Bold));
        }
        sheet.push(5..25, StylePatch::new().with_underline());
        let runs = sheet.runs();
        assert_eq!(runs.first().map(|run| run.range.start), Some(0));
        assert_eq!(runs.last().map(|run| run.range.end), Some(40));
        for run in &runs {
            for offset in run.range.clone() {
                assert_eq!(run.style, sheet.style_at(offset), "offset {offset}");
            }
        }
    }

    #[test]
    fn large_task_list_flattens_in_one_sweep() {
        let mut sheet = StyleSheet::new(40_000);
        for line in 0..4_000 {
            let start = line * 10;
            sheet.push(start..start + 10, StylePatch::new().with_foreground(ColorToken::Foreground));
            sheet.push(start..start + 2, StylePatch::new().with_foreground(ColorToken::Number));
            sheet.push(start + 2..start + 5, StylePatch::new().with_font(FontRole::Code));
            sheet.push(start + 6..start + 9, StylePatch::new().with_underline());
        }
        let runs = sheet.runs();
        assert_eq!(runs.len(), 4_000 * 5);
        assert_eq!(runs[1].style.font, FontRole::Code);
    }

    #[test]
    fn later_patch_overrides_only_the_keys_it_sets() {
        let mut sheet = StyleSheet::new(10);
        sheet.push(
            0..10,
            StylePatch::new()
                .with_font(FontRole::Italic)
                .with_foreground(ColorToken::Foreground),
        );
        sheet.push(
            2..6,
            StylePatch::new()
                .with_foreground(ColorToken::Type)
                .with_underline()
                .with_link("https://example.com"),
        );

        let inner = sheet.style_at(3);
        assert_eq!(inner.font, FontRole::Italic);
        assert_eq!(inner.foreground, ColorToken::Type);
        assert!(inner.underline);
        assert_eq!(inner.link.as_deref(), Some("https://example.com"));

        let outer = sheet.style_at(8);
        assert_eq!(outer.font, FontRole::Italic);
        assert_eq!(outer.foreground, ColorToken::Foreground);
        assert!(!outer.underline);
    }

    #[test]
    fn runs_cover_the_buffer_without_gaps() {
        let mut sheet = StyleSheet::new(12);
        sheet.push(2..5, StylePatch::new().with_font(FontRole::Bold));
        sheet.push(4..8, StylePatch::new().with_foreground(ColorToken::Comment));
        let runs = sheet.runs();
        let ranges: Vec<_> = runs.iter().map(|run| run.range.clone()).collect();
        assert_eq!(ranges, vec![0..2, 2..4, 4..5, 5..8, 8..12]);
        assert_eq!(runs[0].style, ResolvedStyle::base());
        assert_eq!(runs[2].style.font, FontRole::Bold);
        assert_eq!(runs[2].style.foreground, ColorToken::Comment);
        assert_eq!(runs[4].style, ResolvedStyle::base());
    }

    #[test]
    fn equal_neighbours_merge_into_one_run() {
        let mut sheet = StyleSheet::new(6);
        sheet.push(0..3, StylePatch::new().with_font(FontRole::Code));
        sheet.push(3..6, StylePatch::new().with_font(FontRole::Code));
        assert_eq!(sheet.runs().len(), 1);
    }

    #[test]
    fn applicable_rechecks_against_a_shorter_buffer() {
        let mut sheet = StyleSheet::new(10);
        sheet.push(0..4, StylePatch::new().with_underline());
        sheet.push(6..10, StylePatch::new().with_underline());
        assert_eq!(sheet.applicable(8).count(), 1);
    }

    #[test]
    fn foreground_only_detection() {
        assert!(StylePatch::new()
            .with_foreground(ColorToken::Keyword)
            .is_foreground_only());
        assert!(!StylePatch::new()
            .with_foreground(ColorToken::Keyword)
            .with_underline()
            .is_foreground_only());
        assert!(!StylePatch::new().is_foreground_only());
    }
}
