//! Placement rules for overlay widgets.
//!
//! All rects are in overlay coordinates: a surface bounding box displaced by
//! the surface's content inset.

use eframe::egui::{pos2, vec2, Rect, Vec2};

/// Horizontal room kept free beside a previewed image.
pub const IMAGE_SIDE_PADDING: f32 = 24.0;
/// Gap between an image's source line and the image.
pub const IMAGE_TOP_GAP: f32 = 4.0;
/// Extra paragraph spacing reserved below a previewed image.
pub const IMAGE_BOTTOM_GAP: f32 = 8.0;
pub const BUTTON_HEIGHT: f32 = 18.0;
const BUTTON_CHAR_WIDTH: f32 = 6.5;
const BUTTON_PADDING: f32 = 12.0;
const BUTTON_GAP: f32 = 4.0;
const BUTTON_TRAILING_MARGIN: f32 = 8.0;
const BUTTON_TOP_MARGIN: f32 = 2.0;

/// Natural `size` scaled down (never up) to fit `container_width` minus
/// padding and `max_height`, keeping the aspect ratio.
///
/// # Returns
/// `None` for zero-sized images or when no width is left.
pub fn image_display_size(size: [u32; 2], container_width: f32, max_height: f32) -> Option<Vec2> {
    let [width, height] = size;
    if width == 0 || height == 0 {
        return None;
    }
    let (width, height) = (width as f32, height as f32);
    let available = container_width - IMAGE_SIDE_PADDING;
    if available <= 0.0 || max_height <= 0.0 {
        return None;
    }
    let scale = (available / width).min(max_height / height).min(1.0);
    Some(vec2(width * scale, height * scale))
}

/// Image rect just below the source range's box.
pub fn image_rect(bounds: Rect, inset: Vec2, display: Vec2) -> Rect {
    let min = pos2(
        bounds.min.x + inset.x,
        bounds.max.y + inset.y + IMAGE_TOP_GAP,
    );
    Rect::from_min_size(min, display)
}

/// Size of a text button labelled `label`.
pub fn button_size(label: &str) -> Vec2 {
    vec2(
        label.chars().count() as f32 * BUTTON_CHAR_WIDTH + BUTTON_PADDING,
        BUTTON_HEIGHT,
    )
}

/// "Open" and "Copy" buttons in the top-right corner of an image rect,
/// never starting left of the image.
pub fn image_button_rects(image: Rect, open_label: &str, copy_label: &str) -> (Rect, Rect) {
    let open = button_size(open_label);
    let copy = button_size(copy_label);
    let y = image.min.y + BUTTON_GAP;
    let x = (image.max.x - open.x - copy.x - BUTTON_PADDING).max(image.min.x);
    let open_rect = Rect::from_min_size(pos2(x, y), open);
    let copy_rect = Rect::from_min_size(pos2(x + open.x + BUTTON_GAP, y), copy);
    (open_rect, copy_rect)
}

/// Code-block button anchored to the trailing edge of `bounds`, never
/// starting left of its leading edge.
pub fn code_button_rect(bounds: Rect, inset: Vec2, label: &str) -> Rect {
    let size = button_size(label);
    let x = (bounds.max.x + inset.x - size.x - BUTTON_TRAILING_MARGIN).max(bounds.min.x + inset.x);
    let y = bounds.min.y + inset.y + BUTTON_TOP_MARGIN;
    Rect::from_min_size(pos2(x, y), size)
}

/// Second button placed left of `anchor`, clamped like [`code_button_rect`].
pub fn leading_button_rect(anchor: Rect, bounds: Rect, inset: Vec2, label: &str) -> Rect {
    let size = button_size(label);
    let x = (anchor.min.x - size.x - BUTTON_GAP).max(bounds.min.x + inset.x);
    Rect::from_min_size(pos2(x, anchor.min.y), size)
}
