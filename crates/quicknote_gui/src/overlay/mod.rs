//! Overlay reconciliation: keeps image previews and code-block buttons in
//! one-to-one correspondence with the latest highlight result.
//!
//! Images are rebuilt in two phases. Phase 1 edits display attributes on the
//! surface (hide the source line and reserve room below it, or restore it
//! while the cursor is on it). Phase 2 runs after the surface has re-laid
//! out and turns bounding boxes into widget rects. Code-block buttons only
//! need phase 2.

pub mod geometry;
mod images;

#[cfg(test)]
mod tests;

pub use images::{ImageCache, ImageLocation, ImageResolver, ResolvedImage, VaultImageResolver};

use crate::actions::ActionSink;
use crate::surface::TextSurface;
use eframe::egui::{Rect, Vec2};
use quicknote_core::format;
use quicknote_core::text::LineIndex;
use quicknote_core::{CodeBlockInfo, HighlightResult, ImageInfo};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// How long a copy button shows its check mark.
pub const COPY_FEEDBACK: Duration = Duration::from_millis(1500);
pub const COPIED_LABEL: &str = "✓";
pub const OPEN_LABEL: &str = "Open";
pub const COPY_LABEL: &str = "Copy";
pub const FORMAT_LABEL: &str = "Format";

/// Identity of a tracked range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlayKey {
    pub start: usize,
    pub end: usize,
}

impl OverlayKey {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<&Range<usize>> for OverlayKey {
    fn from(range: &Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

/// Rendered preview of an image reference.
#[derive(Clone, Debug)]
pub struct ImageOverlay {
    pub info: ImageInfo,
    pub image: Arc<ResolvedImage>,
    pub display_size: Vec2,
    pub rect: Rect,
    pub open_rect: Rect,
    pub copy_rect: Rect,
    pub visible: bool,
    copied_at: Option<Instant>,
}

impl ImageOverlay {
    pub fn copy_label(&self, now: Instant) -> &'static str {
        if feedback_active(self.copied_at, now) {
            COPIED_LABEL
        } else {
            COPY_LABEL
        }
    }
}

/// Copy (and optionally Format) buttons of a code block.
#[derive(Clone, Debug)]
pub struct CodeOverlay {
    pub block: CodeBlockInfo,
    pub copy_rect: Rect,
    /// Present when the block's language has a formatter.
    pub format_rect: Option<Rect>,
    pub visible: bool,
    copied_at: Option<Instant>,
}

impl CodeOverlay {
    /// Language tag, or "Copy" for untagged blocks.
    pub fn idle_label(&self) -> &str {
        self.block.language.as_deref().unwrap_or(COPY_LABEL)
    }

    pub fn copy_label(&self, now: Instant) -> &str {
        if feedback_active(self.copied_at, now) {
            COPIED_LABEL
        } else {
            self.idle_label()
        }
    }
}

fn feedback_active(copied_at: Option<Instant>, now: Instant) -> bool {
    copied_at.is_some_and(|at| now.saturating_duration_since(at) < COPY_FEEDBACK)
}

/// Phase-1 outcome for one image.
struct PendingImage {
    info: ImageInfo,
    image: Arc<ResolvedImage>,
    display_size: Vec2,
}

/// Owner of all overlay widgets of one editor.
pub struct OverlayReconciler {
    resolver: Box<dyn ImageResolver>,
    cache: ImageCache,
    result: HighlightResult,
    images: BTreeMap<OverlayKey, ImageOverlay>,
    code: BTreeMap<OverlayKey, CodeOverlay>,
    /// 0-based first lines of the images the cursor is on.
    editing: BTreeSet<usize>,
    image_max_height: f32,
}

impl OverlayReconciler {
    pub fn new(resolver: Box<dyn ImageResolver>, image_max_height: f32) -> Self {
        Self {
            resolver,
            cache: ImageCache::default(),
            result: HighlightResult::default(),
            images: BTreeMap::new(),
            code: BTreeMap::new(),
            editing: BTreeSet::new(),
            image_max_height,
        }
    }

    /// Change the base for vault-relative images. Cached images stay.
    pub fn set_vault_root(&mut self, root: Option<PathBuf>) {
        self.resolver.set_vault_root(root);
    }

    pub fn result(&self) -> &HighlightResult {
        &self.result
    }

    pub fn editing_lines(&self) -> &BTreeSet<usize> {
        &self.editing
    }

    pub fn image_overlays(&self) -> impl Iterator<Item = &ImageOverlay> {
        self.images.values()
    }

    pub fn code_overlays(&self) -> impl Iterator<Item = &CodeOverlay> {
        self.code.values()
    }

    pub fn image_overlay(&self, key: &OverlayKey) -> Option<&ImageOverlay> {
        self.images.get(key)
    }

    pub fn code_overlay(&self, key: &OverlayKey) -> Option<&CodeOverlay> {
        self.code.get(key)
    }

    pub fn cached_images(&self) -> usize {
        self.cache.len()
    }

    /// Full rebuild against a fresh highlight result.
    pub fn rebuild(&mut self, surface: &mut dyn TextSurface, result: HighlightResult) {
        self.result = result;
        self.images.clear();
        self.code.clear();
        self.editing = self.compute_editing(surface);

        let pending = self.apply_image_attributes(surface);
        surface.ensure_layout();
        self.place_images(surface, pending);
        self.place_code_buttons(surface);
        debug!(
            "overlays rebuilt: {} images, {} code blocks, {} editing",
            self.images.len(),
            self.code.len(),
            self.editing.len()
        );
    }

    /// Re-evaluate image states after a cursor move.
    ///
    /// # Returns
    /// `true` when the editing set changed and images were rebuilt.
    pub fn cursor_moved(&mut self, surface: &mut dyn TextSurface) -> bool {
        let editing = self.compute_editing(surface);
        if editing == self.editing {
            return false;
        }
        self.editing = editing;
        self.images.clear();
        let pending = self.apply_image_attributes(surface);
        surface.ensure_layout();
        self.place_images(surface, pending);
        true
    }

    /// Move every widget to its range's current layout position. Ranges
    /// past the end of the buffer or without a layout box are hidden.
    pub fn reposition(&mut self, surface: &dyn TextSurface) {
        let len = surface.len_chars();
        let inset = surface.content_inset();
        for (key, overlay) in &mut self.images {
            match bounds_within(surface, key, len) {
                Some(bounds) => {
                    overlay.rect = geometry::image_rect(bounds, inset, overlay.display_size);
                    (overlay.open_rect, overlay.copy_rect) =
                        geometry::image_button_rects(overlay.rect, OPEN_LABEL, COPY_LABEL);
                    overlay.visible = true;
                }
                None => overlay.visible = false,
            }
        }
        for (key, overlay) in &mut self.code {
            match bounds_within(surface, key, len) {
                Some(bounds) => {
                    let label = overlay.idle_label().to_string();
                    overlay.copy_rect = geometry::code_button_rect(bounds, inset, &label);
                    overlay.format_rect = overlay.format_rect.map(|_| {
                        geometry::leading_button_rect(overlay.copy_rect, bounds, inset, FORMAT_LABEL)
                    });
                    overlay.visible = true;
                }
                None => overlay.visible = false,
            }
        }
    }

    /// Drop every widget and restore any hidden image lines.
    pub fn clear(&mut self, surface: &mut dyn TextSurface) {
        let len = surface.len_chars();
        let lines = LineIndex::new(&surface.text());
        for image in &self.result.images {
            if image.range.end <= len {
                let line_range = lines.line_range_for(&image.range);
                surface.set_visibility(line_range.clone(), true);
                surface.set_paragraph_spacing(line_range, 0.0);
            }
        }
        self.images.clear();
        self.code.clear();
        self.editing.clear();
        self.result = HighlightResult::default();
    }

    /// Copy a code block's raw content.
    pub fn copy_code(&mut self, key: &OverlayKey, sink: &mut dyn ActionSink, now: Instant) -> bool {
        let Some(overlay) = self.code.get_mut(key) else {
            return false;
        };
        sink.copy_text(&overlay.block.raw_content);
        overlay.copied_at = Some(now);
        true
    }

    pub fn copy_image(&mut self, key: &OverlayKey, sink: &mut dyn ActionSink, now: Instant) -> bool {
        let Some(overlay) = self.images.get_mut(key) else {
            return false;
        };
        sink.copy_image(&overlay.image);
        overlay.copied_at = Some(now);
        true
    }

    pub fn open_image(&self, key: &OverlayKey, sink: &mut dyn ActionSink) -> bool {
        let Some(overlay) = self.images.get(key) else {
            return false;
        };
        sink.open_location(&overlay.image.location.to_url());
        true
    }

    /// Expire copy feedback.
    ///
    /// # Returns
    /// `true` while any button still shows feedback (a repaint is due).
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut active = false;
        let stamps = self
            .images
            .values_mut()
            .map(|overlay| &mut overlay.copied_at)
            .chain(self.code.values_mut().map(|overlay| &mut overlay.copied_at));
        for stamp in stamps {
            if feedback_active(*stamp, now) {
                active = true;
            } else {
                *stamp = None;
            }
        }
        active
    }

    fn compute_editing(&self, surface: &dyn TextSurface) -> BTreeSet<usize> {
        if self.result.images.is_empty() {
            return BTreeSet::new();
        }
        let lines = LineIndex::new(&surface.text());
        let cursor_line_start = lines.line_range_at(surface.cursor_offset()).start;
        self.result
            .images
            .iter()
            .filter(|image| image.range.end <= lines.len_chars())
            .filter_map(|image| {
                let line_range = lines.line_range_for(&image.range);
                line_range
                    .contains(&cursor_line_start)
                    .then(|| lines.line_of(image.range.start))
            })
            .collect()
    }

    fn apply_image_attributes(&mut self, surface: &mut dyn TextSurface) -> Vec<PendingImage> {
        let len = surface.len_chars();
        let lines = LineIndex::new(&surface.text());
        let container_width = surface.container_width();
        let mut pending = Vec::new();

        for info in &self.result.images {
            if info.range.end > len {
                debug!("skipping stale image range {:?}", info.range);
                continue;
            }
            let line_range = lines.line_range_for(&info.range);
            if self.editing.contains(&lines.line_of(info.range.start)) {
                surface.set_visibility(line_range.clone(), true);
                surface.set_paragraph_spacing(line_range, 0.0);
                continue;
            }
            let Some(image) = self.cache.get_or_resolve(&info.source, &*self.resolver)
            else {
                continue;
            };
            let Some(display_size) =
                geometry::image_display_size(image.size, container_width, self.image_max_height)
            else {
                debug!("image '{}' has no displayable size", info.source);
                continue;
            };
            surface.set_visibility(line_range.clone(), false);
            surface.set_paragraph_spacing(line_range, display_size.y + geometry::IMAGE_BOTTOM_GAP);
            pending.push(PendingImage {
                info: info.clone(),
                image,
                display_size,
            });
        }
        pending
    }

    fn place_images(&mut self, surface: &dyn TextSurface, pending: Vec<PendingImage>) {
        let len = surface.len_chars();
        let inset = surface.content_inset();
        for item in pending {
            let key = OverlayKey::from(&item.info.range);
            let bounds = bounds_within(surface, &key, len);
            let rect = bounds.map_or(Rect::NOTHING, |bounds| {
                geometry::image_rect(bounds, inset, item.display_size)
            });
            let (open_rect, copy_rect) = geometry::image_button_rects(rect, OPEN_LABEL, COPY_LABEL);
            self.images.insert(
                key,
                ImageOverlay {
                    info: item.info,
                    image: item.image,
                    display_size: item.display_size,
                    rect,
                    open_rect,
                    copy_rect,
                    visible: bounds.is_some(),
                    copied_at: None,
                },
            );
        }
    }

    fn place_code_buttons(&mut self, surface: &dyn TextSurface) {
        let len = surface.len_chars();
        let inset = surface.content_inset();
        for block in &self.result.code_blocks {
            let key = OverlayKey::from(&block.range);
            let Some(bounds) = bounds_within(surface, &key, len) else {
                debug!("code block {:?} has no layout box", block.range);
                continue;
            };
            let label = block.language.as_deref().unwrap_or(COPY_LABEL);
            let copy_rect = geometry::code_button_rect(bounds, inset, label);
            let format_rect = format::is_supported(block.language.as_deref()).then(|| {
                geometry::leading_button_rect(copy_rect, bounds, inset, FORMAT_LABEL)
            });
            self.code.insert(
                key,
                CodeOverlay {
                    block: block.clone(),
                    copy_rect,
                    format_rect,
                    visible: true,
                    copied_at: None,
                },
            );
        }
    }
}

fn bounds_within(surface: &dyn TextSurface, key: &OverlayKey, len: usize) -> Option<Rect> {
    if key.end > len {
        return None;
    }
    surface.bounding_box(&key.range())
}
