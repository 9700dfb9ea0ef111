//! Per-editor orchestration: synchronous highlight + overlay rebuild on every
//! edit, debounced change propagation and autosave.

use super::debounce::Debouncer;
use crate::overlay::{ImageResolver, OverlayKey, OverlayReconciler, VaultImageResolver};
use crate::surface::TextSurface;
use quicknote_core::markdown::{toggle_checkbox, CheckboxEdit};
use quicknote_core::text::{char_len, slice_chars};
use quicknote_core::{
    format_code, EditorConfig, HighlightResult, MarkdownStyleEngine, StyleSheet, SyntaxColorizer,
};
use std::ops::Range;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Timers that fired during one [`EditorSession::poll`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionEvents {
    /// The last edit of a burst is ready to reach the document model.
    pub propagate: bool,
    /// The note should be written to its backing file.
    pub autosave: bool,
}

pub struct EditorSession {
    engine: MarkdownStyleEngine,
    colorizer: SyntaxColorizer,
    reconciler: OverlayReconciler,
    change: Debouncer,
    autosave: Debouncer,
    plain: bool,
}

impl EditorSession {
    pub fn new(config: &EditorConfig, resolver: Box<dyn ImageResolver>) -> Self {
        Self {
            engine: MarkdownStyleEngine::new(),
            colorizer: SyntaxColorizer::new(&config.syntax_theme),
            reconciler: OverlayReconciler::new(resolver, config.image_max_height),
            change: Debouncer::new(config.change_debounce()),
            autosave: Debouncer::new(config.autosave_delay()),
            plain: config.plain,
        }
    }

    /// Session resolving images against the configured vault.
    pub fn from_config(config: &EditorConfig) -> Self {
        let resolver = VaultImageResolver::new(config.vault_path.clone());
        Self::new(config, Box::new(resolver))
    }

    pub fn reconciler(&self) -> &OverlayReconciler {
        &self.reconciler
    }

    pub fn reconciler_mut(&mut self) -> &mut OverlayReconciler {
        &mut self.reconciler
    }

    pub fn is_plain(&self) -> bool {
        self.plain
    }

    /// Switch plain mode and restyle the surface accordingly.
    pub fn set_plain<S: TextSurface>(&mut self, surface: &mut S, plain: bool) {
        if self.plain == plain {
            return;
        }
        self.plain = plain;
        self.refresh(surface);
    }

    /// Restyle the surface and rebuild overlays without touching timers.
    pub fn refresh<S: TextSurface>(&mut self, surface: &mut S) -> HighlightResult {
        if self.plain {
            self.reconciler.clear(surface);
            surface.apply_styles(&StyleSheet::new(surface.len_chars()));
            return HighlightResult::default();
        }
        let colorizer = &self.colorizer;
        let result = self.engine.highlight_into_with(surface, |result, sheet| {
            sheet.extend(colorizer.colorize_all(result));
        });
        self.reconciler.rebuild(surface, result.clone());
        result
    }

    /// Styles for `text` alone, leaving the surface, overlays and timers
    /// untouched.
    pub fn sheet_for(&self, text: &str) -> StyleSheet {
        if self.plain {
            return StyleSheet::new(char_len(text));
        }
        let mut pass = self.engine.highlight(text);
        pass.sheet.extend(self.colorizer.colorize_all(&pass.result));
        pass.sheet
    }

    /// Handle a buffer edit: restyle now, (re)arm both timers.
    pub fn text_changed<S: TextSurface>(&mut self, surface: &mut S, now: Instant) {
        let started = Instant::now();
        self.refresh(surface);
        self.change.schedule(now);
        self.autosave.schedule(now);
        debug!(
            "edit at revision {} restyled in {:?}",
            surface.revision(),
            started.elapsed()
        );
    }

    /// # Returns
    /// `true` when image previews changed state.
    pub fn cursor_moved<S: TextSurface>(&mut self, surface: &mut S) -> bool {
        if self.plain {
            return false;
        }
        self.reconciler.cursor_moved(surface)
    }

    pub fn layout_changed<S: TextSurface>(&mut self, surface: &S) {
        self.reconciler.reposition(surface);
    }

    pub fn poll(&mut self, now: Instant) -> SessionEvents {
        SessionEvents {
            propagate: self.change.poll(now).is_some(),
            autosave: self.autosave.poll(now).is_some(),
        }
    }

    /// Time until the earliest pending timer.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        match (self.change.remaining(now), self.autosave.remaining(now)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn has_pending_save(&self) -> bool {
        self.autosave.pending().is_some()
    }

    /// Drop a pending autosave (after an explicit save).
    pub fn cancel_autosave(&mut self) {
        self.autosave.cancel();
    }

    /// Toggle the checkbox at `target` and restyle.
    ///
    /// # Returns
    /// The applied edit, or `None` when the target is stale.
    pub fn toggle_checkbox<S: TextSurface>(
        &mut self,
        surface: &mut S,
        target: &Range<usize>,
        now: Instant,
    ) -> Option<CheckboxEdit> {
        let edit = toggle_checkbox(&surface.text(), target)?;
        if !surface.replace_range(edit.range.clone(), edit.replacement) {
            return None;
        }
        info!("checkbox at {:?} now checked={}", edit.range, edit.checked);
        self.text_changed(surface, now);
        Some(edit)
    }

    /// Replace a code block's content with its formatted form.
    ///
    /// # Returns
    /// `false` when the block is gone, stale, unsupported or already
    /// formatted.
    pub fn apply_format<S: TextSurface>(
        &mut self,
        surface: &mut S,
        key: &OverlayKey,
        now: Instant,
    ) -> bool {
        let Some(overlay) = self.reconciler.code_overlay(key) else {
            return false;
        };
        let block = overlay.block.clone();
        let text = surface.text();
        let content = block.content_start..block.content_start + char_len(&block.raw_content);
        if slice_chars(&text, &content) != Some(block.raw_content.as_str()) {
            debug!("code block {:?} changed since the last pass", block.range);
            return false;
        }
        let Some(formatted) = format_code(&block.raw_content, block.language.as_deref()) else {
            return false;
        };
        if formatted == block.raw_content || !surface.replace_range(content, &formatted) {
            return false;
        }
        self.text_changed(surface, now);
        true
    }
}
