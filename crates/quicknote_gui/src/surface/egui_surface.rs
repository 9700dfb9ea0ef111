//! egui `TextEdit` surface.
//!
//! Styles are rendered through a custom layouter that turns the applied
//! style runs plus display attributes into a [`LayoutJob`]. Paragraph
//! spacing is realised by growing the row height of the spaced line with its
//! glyphs aligned to the top.
//!
//! On the frame of an edit `TextEdit` lays out the new text before the
//! session has restyled it; the layouter then asks the caller for a fresh
//! sheet and shifts the display attributes past the edit point.

use super::{DisplayAttributes, TextSurface};
use eframe::egui::{
    self, text::CCursor, text::LayoutJob, text::LayoutSection, Align, Color32, FontFamily,
    FontId, Galley, Pos2, Rect, Stroke, TextFormat, Vec2,
};
use quicknote_core::markdown::{ResolvedStyle, StyleRun};
use quicknote_core::text::{char_range_to_bytes, char_len, LineIndex};
use quicknote_core::{FontScale, Palette, StyleSheet, StyleTarget};
use std::borrow::Cow;
use std::ops::Range;
use std::sync::Arc;

/// What happened to the surface during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceEvents {
    pub text_changed: bool,
    pub cursor_moved: bool,
    /// Galley moved or re-wrapped (scroll, resize, edit).
    pub layout_changed: bool,
    /// Char offset of a primary click, with whether a command modifier was held.
    pub clicked: Option<(usize, bool)>,
}

/// Inputs the layouter needs besides the text.
struct RenderState<'a> {
    runs: &'a [StyleRun],
    display: &'a DisplayAttributes,
    fonts: FontScale,
    palette: Palette,
}

/// Styling of the last applied sheet.
struct AppliedStyles<'a> {
    len: usize,
    runs: &'a [StyleRun],
    display: &'a DisplayAttributes,
}

/// Runs and display attributes for one layouter call.
struct FrameStyles<'a> {
    runs: Cow<'a, [StyleRun]>,
    display: Cow<'a, DisplayAttributes>,
}

/// Styles for `text`: the applied ones when they match its length, else a
/// sheet from `restyle` with display attributes shifted past `edit_at`.
fn frame_styles<'a, F>(
    text: &str,
    applied: &AppliedStyles<'a>,
    edit_at: usize,
    restyle: &mut F,
) -> FrameStyles<'a>
where
    F: FnMut(&str) -> StyleSheet,
{
    let len = char_len(text);
    if applied.len == len {
        return FrameStyles {
            runs: Cow::Borrowed(applied.runs),
            display: Cow::Borrowed(applied.display),
        };
    }
    let sheet = restyle(text);
    let runs = if sheet.buffer_len() == len {
        sheet.runs()
    } else {
        Vec::new()
    };
    let delta = len as isize - applied.len as isize;
    FrameStyles {
        runs: Cow::Owned(runs),
        display: Cow::Owned(applied.display.shifted(edit_at, delta)),
    }
}

fn to_color(rgba: [u8; 4]) -> Color32 {
    Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3])
}

fn font_id_for(style: &ResolvedStyle, fonts: FontScale) -> FontId {
    let spec = fonts.spec(style.font);
    let family = if spec.monospace {
        FontFamily::Monospace
    } else {
        FontFamily::Proportional
    };
    FontId::new(spec.size, family)
}

/// Char-index to byte-offset table for one text snapshot.
fn char_byte_offsets(text: &str) -> Vec<usize> {
    let mut offsets: Vec<usize> = text.char_indices().map(|(byte, _)| byte).collect();
    offsets.push(text.len());
    offsets
}

fn build_layout_job<F>(
    text: &str,
    render: &RenderState<'_>,
    wrap_width: f32,
    mut row_height: F,
) -> LayoutJob
where
    F: FnMut(&FontId) -> f32,
{
    let mut job = LayoutJob {
        text: text.to_owned(),
        ..Default::default()
    };
    job.wrap.max_width = wrap_width;

    let offsets = char_byte_offsets(text);
    let len = offsets.len() - 1;
    let lines = LineIndex::new(text);
    // Runs for another snapshot render as base style.
    let runs: &[StyleRun] = if render.runs.last().is_some_and(|run| run.range.end == len) {
        render.runs
    } else {
        &[]
    };
    let base = ResolvedStyle::base();

    let mut bounds: Vec<usize> = vec![0, len];
    bounds.extend(runs.iter().map(|run| run.range.start));
    bounds.extend(
        render
            .display
            .hidden_ranges()
            .iter()
            .flat_map(|range| [range.start.min(len), range.end.min(len)]),
    );
    if render.display.has_spacing() {
        bounds.extend((0..lines.line_count()).filter_map(|line| lines.line_start(line)));
    }
    bounds.sort_unstable();
    bounds.dedup();

    let mut run_index = 0;
    for window in bounds.windows(2) {
        let (start, end) = (window[0], window[1]);
        if start >= end {
            continue;
        }
        while runs.get(run_index).is_some_and(|run| run.range.end <= start) {
            run_index += 1;
        }
        let style = runs.get(run_index).map_or(&base, |run| &run.style);
        let font_id = font_id_for(style, render.fonts);
        let spec = render.fonts.spec(style.font);
        let mut color = to_color(render.palette.resolve(style.foreground));
        if render.display.is_hidden(start) {
            color = Color32::TRANSPARENT;
        }
        let spacing = render
            .display
            .spacing_for_line(&lines.line_range_at(start));
        let mut format = TextFormat {
            font_id: font_id.clone(),
            color,
            background: style
                .background
                .map_or(Color32::TRANSPARENT, |token| to_color(render.palette.resolve(token))),
            italics: spec.italic,
            underline: if style.underline {
                Stroke::new(1.0, color)
            } else {
                Stroke::NONE
            },
            strikethrough: if style.strikethrough {
                Stroke::new(1.0, color)
            } else {
                Stroke::NONE
            },
            ..Default::default()
        };
        if spacing > 0.0 {
            format.line_height = Some(row_height(&font_id) + spacing);
            format.valign = Align::TOP;
        }
        job.sections.push(LayoutSection {
            leading_space: 0.0,
            byte_range: offsets[start]..offsets[end],
            format,
        });
    }
    job
}

/// [`TextSurface`] backed by an egui multiline `TextEdit`.
pub struct EguiSurface {
    text: String,
    revision: u64,
    cursor: usize,
    sheet: StyleSheet,
    /// Flattened `sheet`, computed once per applied sheet.
    runs: Vec<StyleRun>,
    display: DisplayAttributes,
    fonts: FontScale,
    palette: Palette,
    ctx: Option<egui::Context>,
    galley: Option<Arc<Galley>>,
    galley_pos: Pos2,
    wrap_width: f32,
}

impl EguiSurface {
    pub fn new(text: String, fonts: FontScale) -> Self {
        let sheet = StyleSheet::new(char_len(&text));
        Self {
            text,
            revision: 0,
            cursor: 0,
            runs: sheet.runs(),
            sheet,
            display: DisplayAttributes::default(),
            fonts,
            palette: Palette::monokai(),
            ctx: None,
            galley: None,
            galley_pos: Pos2::ZERO,
            wrap_width: f32::INFINITY,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Resolved style at a char offset of the applied sheet.
    pub fn style_at(&self, offset: usize) -> ResolvedStyle {
        self.sheet.style_at(offset)
    }

    /// Render the editor and report what changed this frame.
    ///
    /// `restyle` is called when the text being laid out no longer matches
    /// the applied sheet (the frame of an edit).
    pub fn show<F>(&mut self, ui: &mut egui::Ui, mut restyle: F) -> SurfaceEvents
    where
        F: FnMut(&str) -> StyleSheet,
    {
        self.ctx = Some(ui.ctx().clone());
        let previous_cursor = self.cursor;
        let previous_pos = self.galley_pos;
        let previous_size = self.galley.as_ref().map(|galley| galley.rect.size());

        let applied = AppliedStyles {
            len: self.sheet.buffer_len(),
            runs: &self.runs,
            display: &self.display,
        };
        let (fonts, palette) = (self.fonts, self.palette);
        let mut layouter = |ui: &egui::Ui, text: &dyn egui::TextBuffer, wrap_width: f32| {
            let text = text.as_str();
            let frame = frame_styles(text, &applied, previous_cursor, &mut restyle);
            let render = RenderState {
                runs: &frame.runs,
                display: &frame.display,
                fonts,
                palette,
            };
            let job = build_layout_job(text, &render, wrap_width, |font_id| {
                ui.fonts_mut(|fonts| {
                    fonts
                        .layout_no_wrap("W".to_owned(), font_id.clone(), Color32::WHITE)
                        .size()
                        .y
                })
            });
            ui.fonts_mut(|fonts| fonts.layout_job(job))
        };
        let output = egui::TextEdit::multiline(&mut self.text)
            .frame(false)
            .desired_width(f32::INFINITY)
            .lock_focus(true)
            .hint_text("Start typing...")
            .layouter(&mut layouter)
            .show(ui);

        let text_changed = output.response.changed();
        if text_changed {
            self.revision = self.revision.wrapping_add(1);
        }
        if let Some(range) = output.cursor_range {
            self.cursor = range.primary.index;
        }
        self.wrap_width = output.galley.job.wrap.max_width;
        self.galley_pos = output.galley_pos;
        let size = output.galley.rect.size();
        self.galley = Some(output.galley);

        let clicked = output.response.clicked().then(|| {
            let command = ui.input(|input| input.modifiers.command);
            (self.cursor, command)
        });

        SurfaceEvents {
            text_changed,
            cursor_moved: previous_cursor != self.cursor,
            layout_changed: previous_pos != self.galley_pos || previous_size != Some(size),
            clicked,
        }
    }

    fn relayout_now(&mut self) {
        let Some(ctx) = self.ctx.clone() else {
            return;
        };
        let render = RenderState {
            runs: &self.runs,
            display: &self.display,
            fonts: self.fonts,
            palette: self.palette,
        };
        let job = build_layout_job(&self.text, &render, self.wrap_width, |font_id| {
            ctx.fonts_mut(|fonts| {
                fonts
                    .layout_no_wrap("W".to_owned(), font_id.clone(), Color32::WHITE)
                    .size()
                    .y
            })
        });
        self.galley = Some(ctx.fonts_mut(|fonts| fonts.layout_job(job)));
    }
}

impl StyleTarget for EguiSurface {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn apply_styles(&mut self, sheet: &StyleSheet) {
        self.display.clear();
        self.runs = sheet.runs();
        self.sheet = sheet.clone();
    }
}

impl TextSurface for EguiSurface {
    fn len_chars(&self) -> usize {
        char_len(&self.text)
    }

    fn cursor_offset(&self) -> usize {
        self.cursor
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn replace_range(&mut self, range: Range<usize>, replacement: &str) -> bool {
        let Some(bytes) = char_range_to_bytes(&self.text, &range) else {
            return false;
        };
        self.text.replace_range(bytes, replacement);
        self.display.clear();
        self.revision = self.revision.wrapping_add(1);
        true
    }

    fn set_visibility(&mut self, range: Range<usize>, visible: bool) {
        self.display.set_visibility(range, visible);
    }

    fn set_paragraph_spacing(&mut self, range: Range<usize>, spacing: f32) {
        self.display.set_spacing(range, spacing);
    }

    fn ensure_layout(&mut self) {
        self.relayout_now();
    }

    fn bounding_box(&self, range: &Range<usize>) -> Option<Rect> {
        let galley = self.galley.as_ref()?;
        if range.end > galley.text().chars().count() || range.start > range.end {
            return None;
        }
        let start = galley.pos_from_cursor(CCursor::new(range.start));
        let end = galley.pos_from_cursor(CCursor::new(range.end));
        let mut rect = if (start.min.y - end.min.y).abs() < f32::EPSILON {
            Rect::from_min_max(start.min, end.max)
        } else {
            Rect::from_min_max(
                Pos2::new(galley.rect.left(), start.min.y),
                Pos2::new(galley.rect.right(), end.max.y),
            )
        };
        let lines = LineIndex::new(galley.text());
        let last = range.end.saturating_sub(1).max(range.start);
        let spacing = self.display.spacing_for_line(&lines.line_range_at(last));
        rect.max.y = (rect.max.y - spacing).max(rect.min.y);
        Some(rect)
    }

    fn content_inset(&self) -> Vec2 {
        self.galley_pos.to_vec2()
    }

    fn container_width(&self) -> f32 {
        if self.wrap_width.is_finite() {
            self.wrap_width
        } else {
            self.galley
                .as_ref()
                .map_or(0.0, |galley| galley.rect.width())
        }
    }
}
