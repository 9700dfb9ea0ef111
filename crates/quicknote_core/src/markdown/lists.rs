//! List marker and task checkbox helpers.
//!
//! All offsets are char offsets; matching happens on a single line of text.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static UNORDERED_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*[-*+])").expect("valid unordered marker regex"));
static ORDERED_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*\d+\.)").expect("valid ordered marker regex"));

const UNCHECKED: &str = "[ ]";
const CHECKED: &str = "[x]";
const CHECKED_UPPER: &str = "[X]";

fn byte_to_char(line: &str, byte: usize) -> usize {
    line[..byte].chars().count()
}

/// Span of the list marker (leading indent included) within `line`.
pub fn list_marker(line: &str, ordered: bool) -> Option<Range<usize>> {
    let pattern = if ordered {
        &*ORDERED_MARKER_RE
    } else {
        &*UNORDERED_MARKER_RE
    };
    let found = pattern.find(line)?;
    Some(byte_to_char(line, found.start())..byte_to_char(line, found.end()))
}

/// Span of the first `[ ]` (or `[x]`/`[X]` when `checked`) within `line`.
pub fn checkbox_span(line: &str, checked: bool) -> Option<Range<usize>> {
    let byte = if checked {
        [CHECKED, CHECKED_UPPER]
            .iter()
            .filter_map(|needle| line.find(needle))
            .min()?
    } else {
        line.find(UNCHECKED)?
    };
    let start = byte_to_char(line, byte);
    Some(start..start + 3)
}

/// Replacement edit produced by toggling a checkbox.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckboxEdit {
    pub range: Range<usize>,
    pub replacement: &'static str,
    /// State after the toggle.
    pub checked: bool,
}

/// Toggle the checkbox at `target` in `text`.
///
/// # Returns
/// The edit to apply, or `None` when `target` no longer spans a checkbox
/// (stale after an edit).
pub fn toggle_checkbox(text: &str, target: &Range<usize>) -> Option<CheckboxEdit> {
    if target.end != target.start + 3 {
        return None;
    }
    let current: String = text.chars().skip(target.start).take(3).collect();
    let (replacement, checked) = match current.as_str() {
        UNCHECKED => (CHECKED, true),
        CHECKED | CHECKED_UPPER => (UNCHECKED, false),
        _ => return None,
    };
    Some(CheckboxEdit {
        range: target.clone(),
        replacement,
        checked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_include_leading_indent() {
        assert_eq!(list_marker("  - item", false), Some(0..3));
        assert_eq!(list_marker("12. item", true), Some(0..3));
        assert_eq!(list_marker("> - quoted", false), None);
    }

    #[test]
    fn checkbox_span_is_three_chars() {
        assert_eq!(checkbox_span("- [ ] buy milk", false), Some(2..5));
        assert_eq!(checkbox_span("- [x] done", true), Some(2..5));
        assert_eq!(checkbox_span("- [X] done", true), Some(2..5));
        assert_eq!(checkbox_span("- 🔥 [ ] later", false), Some(4..7));
    }

    #[test]
    fn toggle_swaps_state_and_rejects_stale_targets() {
        let text = "- [ ] a\n- [x] b";
        let edit = toggle_checkbox(text, &(2..5)).expect("unchecked toggle");
        assert_eq!(edit.replacement, "[x]");
        assert!(edit.checked);

        let edit = toggle_checkbox(text, &(10..13)).expect("checked toggle");
        assert_eq!(edit.replacement, "[ ]");
        assert!(!edit.checked);

        assert_eq!(toggle_checkbox(text, &(0..3)), None);
        assert_eq!(toggle_checkbox(text, &(40..43)), None);
    }
}
