//! Theme constants and one-time style application for the egui app.

use super::QuickNoteApp;
use eframe::egui::{
    self, style::WidgetVisuals, Color32, CornerRadius, Margin, Stroke, Visuals,
};
use quicknote_core::Palette;

const PALETTE: Palette = Palette::monokai();

pub(super) const COLOR_BG_PRIMARY: Color32 = rgba(PALETTE.background);
pub(super) const COLOR_BG_SECONDARY: Color32 = Color32::from_rgb(0x2d, 0x2e, 0x27);
pub(super) const COLOR_BG_TERTIARY: Color32 = rgba(PALETTE.code_block_background);
pub(super) const COLOR_TEXT_PRIMARY: Color32 = rgba(PALETTE.foreground);
pub(super) const COLOR_TEXT_MUTED: Color32 = rgba(PALETTE.comment);
pub(super) const COLOR_ACCENT: Color32 = rgba(PALETTE.keyword);
pub(super) const COLOR_ACCENT_HOVER: Color32 = rgba(PALETTE.function);
pub(super) const COLOR_BORDER: Color32 = Color32::from_rgb(0x49, 0x48, 0x3e);
pub(super) const COLOR_SELECTION_FILL_RGBA: [u8; 4] = [0x49, 0x48, 0x3e, 0xaa];

const fn rgba(color: [u8; 4]) -> Color32 {
    Color32::from_rgba_premultiplied(color[0], color[1], color[2], color[3])
}

fn widget(bg: Color32, stroke: Color32, fg: Color32, expansion: f32) -> WidgetVisuals {
    WidgetVisuals {
        bg_fill: bg,
        weak_bg_fill: bg,
        bg_stroke: Stroke::new(1.0, stroke),
        corner_radius: CornerRadius::same(4),
        fg_stroke: Stroke::new(1.0, fg),
        expansion,
    }
}

impl QuickNoteApp {
    pub(super) fn ensure_style(&mut self, ctx: &egui::Context) {
        if self.style_applied {
            return;
        }

        let mut style = (*ctx.style()).clone();
        style.visuals = Visuals::dark();
        style.visuals.window_fill = COLOR_BG_PRIMARY;
        style.visuals.panel_fill = COLOR_BG_PRIMARY;
        style.visuals.extreme_bg_color = COLOR_BG_PRIMARY;
        style.visuals.faint_bg_color = COLOR_BG_SECONDARY;
        style.visuals.window_stroke = Stroke::new(1.0, COLOR_BORDER);
        style.visuals.hyperlink_color = COLOR_ACCENT_HOVER;
        style.visuals.selection.bg_fill = Color32::from_rgba_unmultiplied(
            COLOR_SELECTION_FILL_RGBA[0],
            COLOR_SELECTION_FILL_RGBA[1],
            COLOR_SELECTION_FILL_RGBA[2],
            COLOR_SELECTION_FILL_RGBA[3],
        );
        style.visuals.text_cursor.stroke = Stroke::new(2.0, COLOR_TEXT_PRIMARY);

        style.visuals.widgets.noninteractive =
            widget(COLOR_BG_SECONDARY, COLOR_BORDER, COLOR_TEXT_MUTED, 0.0);
        style.visuals.widgets.inactive =
            widget(COLOR_BG_TERTIARY, COLOR_BORDER, COLOR_TEXT_PRIMARY, 0.0);
        style.visuals.widgets.hovered =
            widget(COLOR_ACCENT_HOVER, COLOR_ACCENT_HOVER, Color32::BLACK, 0.5);
        style.visuals.widgets.active = widget(COLOR_ACCENT, COLOR_ACCENT, Color32::WHITE, 0.5);
        style.visuals.widgets.open = widget(COLOR_ACCENT, COLOR_ACCENT, Color32::WHITE, 0.0);

        style.spacing.window_margin = Margin::same(12);
        style.spacing.button_padding = egui::vec2(6.0, 2.0);
        ctx.set_style(style);
        self.style_applied = true;
    }
}
