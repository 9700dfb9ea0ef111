//! QuickNote desktop editor: egui text surface, overlay reconciliation and
//! the eframe shell.
//!
//! Exposes a `run` helper so the workspace root can launch the editor
//! without duplicating initialization logic.

/// Clipboard and viewer side effects of overlay buttons.
pub mod actions;
mod app;
/// Note buffer, debounce timers and the editor session.
pub mod editor;
/// Desktop error types.
pub mod error;
/// Image previews and code-block buttons kept in step with the text layout.
pub mod overlay;
/// Text surfaces the session styles and the overlays measure.
pub mod surface;

pub use editor::{EditorSession, SessionEvents};
pub use error::GuiError;
pub use overlay::OverlayReconciler;
pub use surface::{EguiSurface, GridSurface, TextSurface};

use app::QuickNoteApp;
use eframe::egui;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("quicknote_core=warn,quicknote_gui=info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Start the desktop editor with tracing enabled.
///
/// # Returns
/// The result of `eframe::run_native`.
///
/// # Errors
/// Propagates any `eframe` initialization or runtime error (including app
/// creation failures when the note file cannot be opened).
pub fn run() -> eframe::Result<()> {
    init_tracing();

    let app = QuickNoteApp::new().map_err(|err| eframe::Error::AppCreation(Box::new(err)))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(app::DEFAULT_WINDOW_SIZE)
            .with_min_inner_size(app::MIN_WINDOW_SIZE)
            .with_title("QuickNote"),
        ..Default::default()
    };

    eframe::run_native("QuickNote", options, Box::new(|_cc| Ok(Box::new(app))))
}
