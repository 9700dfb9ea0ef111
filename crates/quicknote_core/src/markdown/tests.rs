//! Behavior tests for the markdown style engine.

use super::*;
use crate::text::char_len;
use crate::theme::{ColorToken, FontRole};

fn ranges_with<F>(pass: &HighlightPass, predicate: F) -> Vec<std::ops::Range<usize>>
where
    F: Fn(&StylePatch) -> bool,
{
    pass.sheet
        .ranges()
        .iter()
        .filter(|styled| predicate(&styled.patch))
        .map(|styled| styled.range.clone())
        .collect()
}

const RICH_NOTE: &str = "# Plan 🔥\n\
\n\
Some **bold *and italic* text** with `code` and ~~old~~ [site](https://x.io).\n\
\n\
> quoted *line*\n\
\n\
- [ ] buy milk\n\
- [x] done\n\
1. first\n\
\n\
![diagram](img/diagram.png)\n\
\n\
```json\n\
{\"a\":1}\n\
```\n";

#[test]
fn nested_emphasis_inside_strong_is_bold_italic_with_strong_colour() {
    let engine = MarkdownStyleEngine::new();
    let pass = engine.highlight("**bold *and italic* text**");

    let inner = pass.sheet.style_at(10);
    assert_eq!(inner.font, FontRole::BoldItalic);
    assert_eq!(inner.foreground, ColorToken::Function);

    let outer = pass.sheet.style_at(3);
    assert_eq!(outer.font, FontRole::Bold);
    assert_eq!(outer.foreground, ColorToken::Function);
}

#[test]
fn plain_emphasis_is_italic_foreground() {
    let engine = MarkdownStyleEngine::new();
    let pass = engine.highlight("an *aside* here");
    let style = pass.sheet.style_at(5);
    assert_eq!(style.font, FontRole::Italic);
    assert_eq!(style.foreground, ColorToken::Foreground);
    assert_eq!(pass.sheet.style_at(0), ResolvedStyle::base());
}

#[test]
fn highlight_is_idempotent() {
    let engine = MarkdownStyleEngine::new();
    let first = engine.highlight(RICH_NOTE);
    let second = engine.highlight(RICH_NOTE);
    assert_eq!(first, second);
    assert_eq!(first.result.code_blocks.len(), 1);
    assert_eq!(first.result.images.len(), 1);
}

#[test]
fn every_emitted_range_fits_the_buffer() {
    let samples = [
        RICH_NOTE,
        "",
        "```\nunterminated fence\n",
        "trailing spaces   \n\n\n",
        "- [ ] 日本語\n- [x] émoji 😀\n",
        "crlf **line**\r\nnext *one*\r\n",
        "![](  ) and ![ok](a.png)",
        "    indented code\n    more\n",
        "> - [ ] quoted task\n",
    ];
    let engine = MarkdownStyleEngine::new();
    for text in samples {
        let len = char_len(text);
        let pass = engine.highlight(text);
        assert_eq!(pass.sheet.buffer_len(), len);
        for styled in pass.sheet.ranges() {
            assert!(styled.range.end <= len, "{:?} in {:?}", styled.range, text);
            assert!(styled.range.start < styled.range.end);
        }
        for block in &pass.result.code_blocks {
            assert!(block.range.end <= len, "{:?} in {:?}", block.range, text);
            assert!(block.content_start <= block.range.end);
        }
        for image in &pass.result.images {
            assert!(image.range.end <= len, "{:?} in {:?}", image.range, text);
        }
    }
}

#[test]
fn checkbox_targets_span_the_brackets() {
    let text = "- [ ] buy milk\n- [x] done\n";
    let engine = MarkdownStyleEngine::new();
    let pass = engine.highlight(text);

    let targets = ranges_with(&pass, |patch| patch.checkbox.is_some());
    assert_eq!(targets, vec![2..5, 17..20]);
    assert_eq!(pass.sheet.style_at(3).foreground, ColorToken::Comment);
    assert_eq!(pass.sheet.style_at(18).foreground, ColorToken::Keyword);
    assert_eq!(pass.sheet.style_at(18).checkbox, Some(17..20));

    let markers = ranges_with(&pass, |patch| {
        patch.is_foreground_only() && patch.foreground == Some(ColorToken::Keyword)
    });
    assert_eq!(markers, vec![0..1, 15..16]);
}

#[test]
fn toggling_a_checkbox_leaves_other_markers_alone() {
    let text = "- [ ] buy milk\n- [x] done\n";
    let engine = MarkdownStyleEngine::new();
    let edit = toggle_checkbox(text, &(2..5)).expect("checkbox edit");
    let mut toggled: Vec<char> = text.chars().collect();
    toggled.splice(edit.range.clone(), edit.replacement.chars());
    let toggled: String = toggled.into_iter().collect();
    assert_eq!(toggled, "- [x] buy milk\n- [x] done\n");

    let pass = engine.highlight(&toggled);
    let targets = ranges_with(&pass, |patch| patch.checkbox.is_some());
    assert_eq!(targets, vec![2..5, 17..20]);
    assert_eq!(pass.sheet.style_at(3).foreground, ColorToken::Keyword);
    assert_eq!(pass.sheet.style_at(15).foreground, ColorToken::Keyword);
}

#[test]
fn ordered_markers_use_number_colour() {
    let engine = MarkdownStyleEngine::new();
    let pass = engine.highlight("1. one\n2. two\n");
    let markers = ranges_with(&pass, |patch| {
        patch.foreground == Some(ColorToken::Number)
    });
    assert_eq!(markers, vec![0..2, 7..9]);
}

#[test]
fn fenced_block_is_recorded_with_language_and_content_start() {
    let text = "intro\n```json\n{\"a\":1}\n```\nafter";
    let engine = MarkdownStyleEngine::new();
    let pass = engine.highlight(text);
    assert_eq!(
        pass.result.code_blocks,
        vec![CodeBlockInfo {
            language: Some("json".to_string()),
            raw_content: "{\"a\":1}\n".to_string(),
            range: 6..25,
            content_start: 14,
            line_starts: vec![Some(14)],
        }]
    );
    let style = pass.sheet.style_at(16);
    assert_eq!(style.font, FontRole::Code);
    assert_eq!(style.background, Some(ColorToken::CodeBlockBackground));
}

#[test]
fn images_without_source_are_styled_but_not_recorded() {
    let engine = MarkdownStyleEngine::new();
    let pass = engine.highlight("![pic](img.png) and ![]()");
    assert_eq!(
        pass.result.images,
        vec![ImageInfo {
            source: "img.png".to_string(),
            range: 0..15,
        }]
    );
    assert_eq!(
        pass.sheet.style_at(1).image_source.as_deref(),
        Some("img.png")
    );
}

#[test]
fn links_carry_destination_as_side_attribute() {
    let engine = MarkdownStyleEngine::new();
    let pass = engine.highlight("see [site](https://x.io) now");
    let style = pass.sheet.style_at(5);
    assert_eq!(style.link.as_deref(), Some("https://x.io"));
    assert!(style.underline);
    assert_eq!(style.foreground, ColorToken::Type);
    assert_eq!(pass.sheet.style_at(25).link, None);
}

#[test]
fn inline_code_headings_and_strikethrough() {
    let engine = MarkdownStyleEngine::new();
    let pass = engine.highlight("## Sub\n\n`x` ~~gone~~");
    let heading = pass.sheet.style_at(1);
    assert_eq!(heading.font, FontRole::Heading(2));
    assert_eq!(heading.foreground, ColorToken::Keyword);

    let code = pass.sheet.style_at(9);
    assert_eq!(code.font, FontRole::Code);
    assert_eq!(code.foreground, ColorToken::String);
    assert_eq!(code.background, Some(ColorToken::InlineCodeBackground));

    let struck = pass.sheet.style_at(14);
    assert!(struck.strikethrough);
    assert_eq!(struck.foreground, ColorToken::Comment);
}

#[test]
fn multibyte_prefix_keeps_ranges_on_the_right_chars() {
    let engine = MarkdownStyleEngine::new();
    let pass = engine.highlight("🔥é **hot**");
    let strong = ranges_with(&pass, |patch| patch.font == Some(FontRole::Bold));
    assert_eq!(strong, vec![3..10]);
}

struct ReentrantTarget<'a> {
    engine: &'a MarkdownStyleEngine,
    text: String,
    applied: Option<StyleSheet>,
    nested: Option<HighlightPass>,
}

impl StyleTarget for ReentrantTarget<'_> {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn apply_styles(&mut self, sheet: &StyleSheet) {
        self.applied = Some(sheet.clone());
        let nested = self.engine.highlight(&self.text);
        self.nested = Some(nested);
    }
}

#[test]
fn nested_pass_from_apply_is_rejected() {
    let engine = MarkdownStyleEngine::new();
    let mut target = ReentrantTarget {
        engine: &engine,
        text: "**bold** ![i](a.png)".to_string(),
        applied: None,
        nested: None,
    };

    let result = engine.highlight_into(&mut target);
    assert_eq!(result.images.len(), 1);
    assert!(target.applied.is_some_and(|sheet| sheet.has_ranges()));
    assert_eq!(target.nested, Some(HighlightPass::empty()));
    assert!(!engine.is_highlighting());

    let again = engine.highlight("**bold**");
    assert!(again.sheet.has_ranges());
}
