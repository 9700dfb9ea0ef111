use super::*;
use crate::actions::{RecordedAction, RecordingActions};
use crate::surface::{GridSurface, TextSurface};
use eframe::egui::{pos2, vec2};
use quicknote_core::MarkdownStyleEngine;
use std::collections::HashMap;

const DOC: &str = "# Title\n\nintro\n\n![cat](cat.png)\n\n```json\n{\"a\":1}\n```\n";
const IMAGE: OverlayKey = OverlayKey { start: 16, end: 31 };
const IMAGE_LINE: usize = 4;
const CODE: OverlayKey = OverlayKey { start: 33, end: 52 };

#[derive(Default)]
struct StubResolver {
    sizes: HashMap<String, [u32; 2]>,
}

impl StubResolver {
    fn with(source: &str, size: [u32; 2]) -> Self {
        let mut sizes = HashMap::new();
        sizes.insert(source.to_string(), size);
        Self { sizes }
    }
}

impl ImageResolver for StubResolver {
    fn set_vault_root(&mut self, _root: Option<PathBuf>) {}

    fn resolve(&self, source: &str) -> Option<ResolvedImage> {
        let size = *self.sizes.get(source)?;
        Some(ResolvedImage {
            location: ImageLocation::File(PathBuf::from(source)),
            size,
            rgba: Arc::new(vec![0; (size[0] * size[1] * 4) as usize]),
        })
    }
}

fn setup(cursor: usize, resolver: StubResolver) -> (GridSurface, OverlayReconciler) {
    let mut surface = GridSurface::new(DOC);
    surface.set_cursor(cursor);
    let mut reconciler = OverlayReconciler::new(Box::new(resolver), 200.0);
    let result = MarkdownStyleEngine::new().highlight_into(&mut surface);
    reconciler.rebuild(&mut surface, result);
    (surface, reconciler)
}

#[test]
fn preview_hides_source_line_and_places_image_below_it() {
    let (surface, reconciler) = setup(0, StubResolver::with("cat.png", [100, 50]));

    assert!(reconciler.editing_lines().is_empty());
    assert!(surface.is_hidden(IMAGE.start));
    assert!(!surface.is_hidden(0));
    assert_eq!(surface.spacing_after_line(IMAGE_LINE), 58.0);
    assert_eq!(surface.layout_passes(), 1);

    let overlay = reconciler.image_overlay(&IMAGE).expect("image overlay");
    assert!(overlay.visible);
    assert_eq!(overlay.display_size, vec2(100.0, 50.0));
    assert_eq!(overlay.rect.min, pos2(12.0, 92.0));
    assert!(overlay.rect.contains_rect(overlay.copy_rect));
}

#[test]
fn initial_state_follows_the_cursor() {
    let (surface, reconciler) = setup(20, StubResolver::with("cat.png", [100, 50]));

    assert!(reconciler.editing_lines().contains(&IMAGE_LINE));
    assert_eq!(reconciler.image_overlays().count(), 0);
    assert!(!surface.is_hidden(IMAGE.start));
    assert_eq!(surface.spacing_after_line(IMAGE_LINE), 0.0);
}

#[test]
fn cursor_moves_toggle_between_editing_and_preview() {
    let (mut surface, mut reconciler) = setup(0, StubResolver::with("cat.png", [100, 50]));

    surface.set_cursor(IMAGE.start + 3);
    assert!(reconciler.cursor_moved(&mut surface));
    assert!(reconciler.image_overlay(&IMAGE).is_none());
    assert!(!surface.is_hidden(IMAGE.start));
    assert_eq!(surface.spacing_after_line(IMAGE_LINE), 0.0);
    assert!(reconciler.code_overlay(&CODE).is_some());

    surface.set_cursor(IMAGE.end);
    assert!(!reconciler.cursor_moved(&mut surface));

    surface.set_cursor(2);
    assert!(reconciler.cursor_moved(&mut surface));
    assert!(reconciler.image_overlay(&IMAGE).is_some());
    assert!(surface.is_hidden(IMAGE.start));

    surface.set_cursor(3);
    assert!(!reconciler.cursor_moved(&mut surface));
}

#[test]
fn unresolved_images_leave_text_visible() {
    let (surface, reconciler) = setup(0, StubResolver::default());

    assert_eq!(reconciler.image_overlays().count(), 0);
    assert!(!surface.is_hidden(IMAGE.start));
    assert_eq!(surface.spacing_after_line(IMAGE_LINE), 0.0);
}

#[test]
fn zero_sized_images_are_skipped() {
    let (surface, reconciler) = setup(0, StubResolver::with("cat.png", [0, 40]));

    assert_eq!(reconciler.image_overlays().count(), 0);
    assert!(!surface.is_hidden(IMAGE.start));
}

#[test]
fn code_blocks_get_language_labelled_buttons() {
    let (_surface, reconciler) = setup(0, StubResolver::default());

    let overlay = reconciler.code_overlay(&CODE).expect("code overlay");
    assert_eq!(overlay.idle_label(), "json");
    assert_eq!(overlay.block.raw_content, "{\"a\":1}\n");
    assert!(overlay.format_rect.is_some());
    assert!(overlay.visible);
}

#[test]
fn truncation_hides_widgets_until_the_next_rebuild() {
    let (mut surface, mut reconciler) = setup(0, StubResolver::with("cat.png", [100, 50]));

    assert!(surface.replace_range(10..DOC.chars().count(), ""));
    reconciler.reposition(&surface);

    let image = reconciler.image_overlay(&IMAGE).expect("kept while stale");
    assert!(!image.visible);
    let code = reconciler.code_overlay(&CODE).expect("kept while stale");
    assert!(!code.visible);

    let result = MarkdownStyleEngine::new().highlight_into(&mut surface);
    reconciler.rebuild(&mut surface, result);
    assert_eq!(reconciler.image_overlays().count(), 0);
    assert_eq!(reconciler.code_overlays().count(), 0);
}

#[test]
fn reposition_tracks_layout_changes() {
    let (mut surface, mut reconciler) = setup(0, StubResolver::with("cat.png", [100, 50]));
    let before = reconciler.image_overlay(&IMAGE).expect("overlay").rect;

    surface.set_inset(vec2(40.0, 30.0));
    reconciler.reposition(&surface);
    let after = reconciler.image_overlay(&IMAGE).expect("overlay").rect;
    assert_eq!(after.min - before.min, vec2(28.0, 22.0));
}

#[test]
fn copy_feedback_expires() {
    let (_surface, mut reconciler) = setup(0, StubResolver::with("cat.png", [2, 2]));
    let mut sink = RecordingActions::default();
    let now = Instant::now();

    assert!(reconciler.copy_code(&CODE, &mut sink, now));
    assert!(reconciler.copy_image(&IMAGE, &mut sink, now));
    assert!(reconciler.open_image(&IMAGE, &mut sink));
    assert_eq!(
        sink.actions,
        vec![
            RecordedAction::CopyText("{\"a\":1}\n".to_string()),
            RecordedAction::CopyImage([2, 2]),
            RecordedAction::Open("file://cat.png".to_string()),
        ]
    );

    let code = reconciler.code_overlay(&CODE).expect("code");
    assert_eq!(code.copy_label(now), COPIED_LABEL);
    assert!(reconciler.tick(now + Duration::from_millis(500)));

    let later = now + COPY_FEEDBACK + Duration::from_millis(10);
    assert!(!reconciler.tick(later));
    let code = reconciler.code_overlay(&CODE).expect("code");
    assert_eq!(code.copy_label(later), "json");
    let image = reconciler.image_overlay(&IMAGE).expect("image");
    assert_eq!(image.copy_label(later), COPY_LABEL);
}

#[test]
fn clear_restores_hidden_lines() {
    let (mut surface, mut reconciler) = setup(0, StubResolver::with("cat.png", [100, 50]));

    reconciler.clear(&mut surface);
    assert!(!surface.is_hidden(IMAGE.start));
    assert_eq!(surface.spacing_after_line(IMAGE_LINE), 0.0);
    assert_eq!(reconciler.image_overlays().count(), 0);
    assert_eq!(reconciler.code_overlays().count(), 0);
    assert!(reconciler.result().is_empty());
}

#[test]
fn cache_survives_rebuilds() {
    let (mut surface, mut reconciler) = setup(0, StubResolver::with("cat.png", [100, 50]));
    let result = MarkdownStyleEngine::new().highlight_into(&mut surface);
    reconciler.rebuild(&mut surface, result);
    assert_eq!(reconciler.cached_images(), 1);
}
