//! Headless editor workflows: session + reconciler against a grid surface
//! with real image files in a temporary vault.

use quicknote_core::EditorConfig;
use quicknote_gui::overlay::OverlayKey;
use quicknote_gui::{EditorSession, GridSurface, SessionEvents, TextSurface};
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const NOTE: &str = "# Trip\n\nDay one.\n\n![beach](beach.png)\n\nMore text.";
const IMAGE: OverlayKey = OverlayKey { start: 18, end: 37 };
const IMAGE_LINE: usize = 4;

fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
    image::RgbaImage::new(width, height)
        .save(dir.join(name))
        .expect("write png");
}

fn vault_session(vault: &TempDir) -> EditorSession {
    let config = EditorConfig {
        vault_path: Some(vault.path().to_path_buf()),
        ..EditorConfig::default()
    };
    EditorSession::from_config(&config)
}

#[test]
fn image_line_switches_between_preview_and_source() {
    let vault = TempDir::new().expect("vault");
    write_png(vault.path(), "beach.png", 320, 100);
    let mut session = vault_session(&vault);
    let mut surface = GridSurface::new(NOTE);

    session.refresh(&mut surface);
    let overlay = session
        .reconciler()
        .image_overlay(&IMAGE)
        .expect("preview on first render");
    assert!(overlay.visible);
    assert_eq!(overlay.image.size, [320, 100]);
    assert!(surface.is_hidden(IMAGE.start));
    assert_eq!(surface.spacing_after_line(IMAGE_LINE), 108.0);

    surface.set_cursor(IMAGE.start + 2);
    assert!(session.cursor_moved(&mut surface));
    assert!(session.reconciler().image_overlay(&IMAGE).is_none());
    assert!(!surface.is_hidden(IMAGE.start));
    assert_eq!(surface.spacing_after_line(IMAGE_LINE), 0.0);

    surface.set_cursor(45);
    assert!(session.cursor_moved(&mut surface));
    assert!(session.reconciler().image_overlay(&IMAGE).is_some());
    assert!(surface.is_hidden(IMAGE.start));
}

#[test]
fn missing_images_stay_as_markdown_text() {
    let vault = TempDir::new().expect("vault");
    let mut session = vault_session(&vault);
    let mut surface = GridSurface::new(NOTE);

    session.refresh(&mut surface);
    assert_eq!(session.reconciler().image_overlays().count(), 0);
    assert!(!surface.is_hidden(IMAGE.start));
    assert_eq!(session.reconciler().result().images.len(), 1);
}

#[test]
fn truncation_hides_then_drops_stale_overlays() {
    let vault = TempDir::new().expect("vault");
    write_png(vault.path(), "beach.png", 16, 16);
    let mut session = vault_session(&vault);
    let mut surface = GridSurface::new(&format!("{NOTE}\n\n```json\n{{}}\n```"));
    session.refresh(&mut surface);
    assert_eq!(session.reconciler().image_overlays().count(), 1);
    assert_eq!(session.reconciler().code_overlays().count(), 1);

    let len = surface.len_chars();
    assert!(surface.replace_range(10..len, ""));
    session.layout_changed(&surface);
    assert!(session.reconciler().image_overlays().all(|overlay| !overlay.visible));
    assert!(session.reconciler().code_overlays().all(|overlay| !overlay.visible));

    session.text_changed(&mut surface, Instant::now());
    assert_eq!(session.reconciler().image_overlays().count(), 0);
    assert_eq!(session.reconciler().code_overlays().count(), 0);
    assert!(session.reconciler().result().is_empty());
}

#[test]
fn vault_changes_keep_previously_resolved_images() {
    let vault = TempDir::new().expect("vault");
    write_png(vault.path(), "beach.png", 16, 16);
    let mut session = vault_session(&vault);
    let mut surface = GridSurface::new(NOTE);
    session.refresh(&mut surface);

    let elsewhere = TempDir::new().expect("other vault");
    session
        .reconciler_mut()
        .set_vault_root(Some(elsewhere.path().to_path_buf()));
    session.refresh(&mut surface);
    assert!(session.reconciler().image_overlay(&IMAGE).is_some());
    assert_eq!(session.reconciler().cached_images(), 1);
}

#[test]
fn typing_burst_propagates_and_saves_once() {
    let vault = TempDir::new().expect("vault");
    let mut session = vault_session(&vault);
    let mut surface = GridSurface::new("");
    let start = Instant::now();

    for (i, ch) in "- [ ] x".chars().enumerate() {
        let at = surface.len_chars();
        assert!(surface.replace_range(at..at, &ch.to_string()));
        session.text_changed(&mut surface, start + Duration::from_millis(30 * i as u64));
    }
    let last = start + Duration::from_millis(180);

    let mut propagated = 0;
    let mut saved = 0;
    for step in 0..20 {
        let events = session.poll(last + Duration::from_millis(50 * step));
        propagated += usize::from(events.propagate);
        saved += usize::from(events.autosave);
    }
    assert_eq!((propagated, saved), (1, 1));
    assert_eq!(session.poll(last + Duration::from_secs(5)), SessionEvents::default());

    let sheet = surface.applied_sheet().expect("styled");
    assert_eq!(sheet.style_at(3).checkbox, Some(2..5));
}
