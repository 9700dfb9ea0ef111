//! Clipboard and open-in-viewer collaborator used by overlay buttons.

use crate::overlay::ResolvedImage;
use eframe::egui;

/// Fire-and-forget side effects triggered by overlay buttons.
pub trait ActionSink {
    fn copy_text(&mut self, text: &str);
    fn copy_image(&mut self, image: &ResolvedImage);
    /// Open `url` in the system viewer.
    fn open_location(&mut self, url: &str);
}

/// [`ActionSink`] backed by the egui context's platform output.
pub struct EguiActions<'a> {
    ctx: &'a egui::Context,
}

impl<'a> EguiActions<'a> {
    pub fn new(ctx: &'a egui::Context) -> Self {
        Self { ctx }
    }
}

impl ActionSink for EguiActions<'_> {
    fn copy_text(&mut self, text: &str) {
        self.ctx.copy_text(text.to_owned());
    }

    fn copy_image(&mut self, image: &ResolvedImage) {
        let [width, height] = image.size;
        let color = egui::ColorImage::from_rgba_unmultiplied(
            [width as usize, height as usize],
            image.rgba.as_slice(),
        );
        self.ctx.copy_image(color);
    }

    fn open_location(&mut self, url: &str) {
        self.ctx.open_url(egui::OpenUrl::new_tab(url));
    }
}

/// Recorded action, for tests and headless runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedAction {
    CopyText(String),
    CopyImage([u32; 2]),
    Open(String),
}

/// [`ActionSink`] that only remembers what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingActions {
    pub actions: Vec<RecordedAction>,
}

impl ActionSink for RecordingActions {
    fn copy_text(&mut self, text: &str) {
        self.actions.push(RecordedAction::CopyText(text.to_owned()));
    }

    fn copy_image(&mut self, image: &ResolvedImage) {
        self.actions.push(RecordedAction::CopyImage(image.size));
    }

    fn open_location(&mut self, url: &str) {
        self.actions.push(RecordedAction::Open(url.to_owned()));
    }
}
