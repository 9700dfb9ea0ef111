//! eframe shell: one note file, live markdown styling, overlays and
//! debounced autosave.

mod style;

use crate::actions::EguiActions;
use crate::editor::EditorSession;
use crate::error::GuiError;
use crate::overlay::{ImageOverlay, OverlayKey, ResolvedImage, FORMAT_LABEL, OPEN_LABEL};
use crate::surface::EguiSurface;
use eframe::egui::{self, Rect, RichText};
use quicknote_core::text::char_len;
use quicknote_core::{EditorConfig, FontScale};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use style::{COLOR_TEXT_MUTED, COLOR_TEXT_PRIMARY};
use tracing::{info, warn};

pub(crate) const DEFAULT_WINDOW_SIZE: [f32; 2] = [900.0, 700.0];
pub(crate) const MIN_WINDOW_SIZE: [f32; 2] = [420.0, 320.0];
const DEFAULT_NOTE_NAME: &str = "QuickNote.md";
const STATUS_TTL: Duration = Duration::from_secs(4);
const FEEDBACK_REPAINT: Duration = Duration::from_millis(100);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SaveStatus {
    Saved,
    Dirty,
}

struct StatusMessage {
    text: String,
    expires_at: Instant,
}

/// Button pressed on an overlay this frame.
enum OverlayAction {
    OpenImage(OverlayKey),
    CopyImage(OverlayKey),
    CopyCode(OverlayKey),
    FormatCode(OverlayKey),
}

pub(crate) struct QuickNoteApp {
    note_path: PathBuf,
    surface: EguiSurface,
    session: EditorSession,
    textures: HashMap<String, egui::TextureHandle>,
    /// Content last propagated from the editor after the change debounce.
    committed: String,
    save_status: SaveStatus,
    status: Option<StatusMessage>,
    needs_initial_pass: bool,
    style_applied: bool,
}

/// Note file named by the config, else the default note inside the vault.
fn resolve_note_path(config: &EditorConfig) -> Result<PathBuf, GuiError> {
    if let Some(path) = config.note_path.clone() {
        return Ok(path);
    }
    config
        .vault_path
        .as_ref()
        .map(|vault| vault.join(DEFAULT_NOTE_NAME))
        .ok_or(GuiError::NoNote)
}

fn load_note(path: &Path) -> Result<String, GuiError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(GuiError::io(path, err)),
    }
}

fn save_note(path: &Path, text: &str) -> Result<(), GuiError> {
    std::fs::write(path, text).map_err(|err| GuiError::io(path, err))
}

impl QuickNoteApp {
    /// Construct the app from the current environment config.
    ///
    /// # Errors
    /// Returns an error when no note path can be derived or the note file
    /// exists but cannot be read.
    pub(crate) fn new() -> Result<Self, GuiError> {
        Self::with_config(EditorConfig::from_env())
    }

    pub(crate) fn with_config(config: EditorConfig) -> Result<Self, GuiError> {
        let note_path = resolve_note_path(&config)?;
        let text = load_note(&note_path)?;
        info!(
            "opened note {} ({} chars)",
            note_path.display(),
            char_len(&text)
        );
        Ok(Self {
            note_path,
            surface: EguiSurface::new(text.clone(), FontScale::new(config.font_size)),
            session: EditorSession::from_config(&config),
            textures: HashMap::new(),
            committed: text,
            save_status: SaveStatus::Saved,
            status: None,
            needs_initial_pass: true,
            style_applied: false,
        })
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            expires_at: Instant::now() + STATUS_TTL,
        });
    }

    fn save_now(&mut self) {
        match save_note(&self.note_path, &self.committed) {
            Ok(()) => {
                self.save_status = SaveStatus::Saved;
                info!("saved {}", self.note_path.display());
            }
            Err(err) => {
                warn!("autosave failed: {}", err);
                self.set_status(format!("Save failed: {}", err));
            }
        }
    }

    fn texture_for(
        &mut self,
        ctx: &egui::Context,
        source: &str,
        image: &ResolvedImage,
    ) -> egui::TextureHandle {
        if let Some(texture) = self.textures.get(source) {
            return texture.clone();
        }
        let [width, height] = image.size;
        let color = egui::ColorImage::from_rgba_unmultiplied(
            [width as usize, height as usize],
            image.rgba.as_slice(),
        );
        let texture = ctx.load_texture(source, color, egui::TextureOptions::LINEAR);
        self.textures.insert(source.to_string(), texture.clone());
        texture
    }

    fn editor_ui(&mut self, ui: &mut egui::Ui) -> Vec<OverlayAction> {
        let now = Instant::now();
        let session = &self.session;
        let events = self.surface.show(ui, |text| session.sheet_for(text));

        if self.needs_initial_pass {
            self.needs_initial_pass = false;
            self.session.refresh(&mut self.surface);
            ui.ctx().request_repaint();
        } else if events.text_changed {
            self.session.text_changed(&mut self.surface, now);
            self.save_status = SaveStatus::Dirty;
            ui.ctx().request_repaint();
        } else if events.cursor_moved && self.session.cursor_moved(&mut self.surface) {
            ui.ctx().request_repaint();
        }
        if events.layout_changed {
            self.session.layout_changed(&self.surface);
        }

        if let Some((offset, command)) = events.clicked {
            let style = self.surface.style_at(offset);
            if let Some(target) = style.checkbox {
                if self
                    .session
                    .toggle_checkbox(&mut self.surface, &target, now)
                    .is_some()
                {
                    self.save_status = SaveStatus::Dirty;
                }
            } else if let (Some(link), true) = (style.link, command) {
                ui.ctx().open_url(egui::OpenUrl::new_tab(link));
            }
        }

        self.overlay_ui(ui, now)
    }

    fn overlay_ui(&mut self, ui: &mut egui::Ui, now: Instant) -> Vec<OverlayAction> {
        let mut actions = Vec::new();
        let images: Vec<ImageOverlay> = self
            .session
            .reconciler()
            .image_overlays()
            .filter(|overlay| overlay.visible)
            .cloned()
            .collect();
        let ctx = ui.ctx().clone();
        for overlay in images {
            let key = OverlayKey::from(&overlay.info.range);
            let texture = self.texture_for(&ctx, &overlay.info.source, &overlay.image);
            ui.put(
                overlay.rect,
                egui::Image::new(&texture).fit_to_exact_size(overlay.rect.size()),
            );
            if ui
                .put(overlay.open_rect, egui::Button::new(OPEN_LABEL).small())
                .clicked()
            {
                actions.push(OverlayAction::OpenImage(key));
            }
            let copy = egui::Button::new(overlay.copy_label(now)).small();
            if ui.put(overlay.copy_rect, copy).clicked() {
                actions.push(OverlayAction::CopyImage(key));
            }
        }

        let code: Vec<(OverlayKey, String, Rect, Option<Rect>)> = self
            .session
            .reconciler()
            .code_overlays()
            .filter(|overlay| overlay.visible)
            .map(|overlay| {
                (
                    OverlayKey::from(&overlay.block.range),
                    overlay.copy_label(now).to_string(),
                    overlay.copy_rect,
                    overlay.format_rect,
                )
            })
            .collect();
        for (key, label, copy_rect, format_rect) in code {
            if ui.put(copy_rect, egui::Button::new(label).small()).clicked() {
                actions.push(OverlayAction::CopyCode(key));
            }
            if let Some(rect) = format_rect {
                if ui.put(rect, egui::Button::new(FORMAT_LABEL).small()).clicked() {
                    actions.push(OverlayAction::FormatCode(key));
                }
            }
        }
        actions
    }

    fn run_actions(&mut self, ctx: &egui::Context, actions: Vec<OverlayAction>) {
        let now = Instant::now();
        let mut sink = EguiActions::new(ctx);
        for action in actions {
            match action {
                OverlayAction::OpenImage(key) => {
                    self.session.reconciler().open_image(&key, &mut sink);
                }
                OverlayAction::CopyImage(key) => {
                    self.session.reconciler_mut().copy_image(&key, &mut sink, now);
                }
                OverlayAction::CopyCode(key) => {
                    self.session.reconciler_mut().copy_code(&key, &mut sink, now);
                }
                OverlayAction::FormatCode(key) => {
                    if self.session.apply_format(&mut self.surface, &key, now) {
                        self.save_status = SaveStatus::Dirty;
                    } else {
                        self.set_status("Code block could not be formatted");
                    }
                }
            }
        }
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let name = self
                    .note_path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                ui.label(RichText::new(name).small().color(COLOR_TEXT_PRIMARY));
                ui.separator();
                let saved = match self.save_status {
                    SaveStatus::Saved => "Saved",
                    SaveStatus::Dirty => "Edited",
                };
                ui.label(RichText::new(saved).small().color(COLOR_TEXT_MUTED));
                ui.separator();
                ui.label(
                    RichText::new(format!("{} chars", char_len(&self.committed)))
                        .small()
                        .color(COLOR_TEXT_MUTED),
                );
                let mut plain = self.session.is_plain();
                if ui.checkbox(&mut plain, "Plain").changed() {
                    self.session.set_plain(&mut self.surface, plain);
                }
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(RichText::new(&status.text).small().color(COLOR_TEXT_MUTED));
                }
            });
        });
    }
}

impl eframe::App for QuickNoteApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_style(ctx);
        let now = Instant::now();
        if self
            .status
            .as_ref()
            .is_some_and(|status| status.expires_at <= now)
        {
            self.status = None;
        }

        self.status_bar(ctx);
        let actions = egui::CentralPanel::default()
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| self.editor_ui(ui))
                    .inner
            })
            .inner;
        self.run_actions(ctx, actions);

        let now = Instant::now();
        let events = self.session.poll(now);
        if events.propagate {
            self.committed = self.surface.as_str().to_owned();
        }
        if events.autosave {
            self.committed = self.surface.as_str().to_owned();
            self.save_now();
        }

        let mut repaint_after = self.session.next_deadline(now);
        if self.session.reconciler_mut().tick(now) {
            repaint_after = Some(repaint_after.map_or(FEEDBACK_REPAINT, |at| at.min(FEEDBACK_REPAINT)));
        }
        if let Some(status) = &self.status {
            let until = status.expires_at.saturating_duration_since(now);
            repaint_after = Some(repaint_after.map_or(until, |at| at.min(until)));
        }
        if let Some(after) = repaint_after {
            ctx.request_repaint_after(after);
        }
    }
}

impl Drop for QuickNoteApp {
    fn drop(&mut self) {
        if self.save_status == SaveStatus::Dirty || self.session.has_pending_save() {
            self.session.cancel_autosave();
            self.committed = self.surface.as_str().to_owned();
            self.save_now();
        }
    }
}
