//! AST-driven markdown style engine.

use super::ast::{parse, Node, NodeKind};
use super::lists::{checkbox_span, list_marker};
use super::position::SourcePositionMapper;
use super::style::{StylePatch, StyleSheet};
use crate::text::{char_len, slice_chars, LineIndex};
use crate::theme::{ColorToken, FontRole};
use std::cell::Cell;
use std::ops::Range;
use std::time::Instant;
use tracing::{debug, info};

/// A fenced or indented code block found during a pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeBlockInfo {
    pub language: Option<String>,
    pub raw_content: String,
    /// Whole block, fences included.
    pub range: Range<usize>,
    /// First char of the code body (line after the opening fence).
    pub content_start: usize,
    /// Buffer offset of each `raw_content` line, past any container prefix
    /// (`> `, list indent). `None` when the line could not be matched.
    pub line_starts: Vec<Option<usize>>,
}

/// An image reference with a usable source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub source: String,
    /// The `![alt](source)` occurrence.
    pub range: Range<usize>,
}

/// Side metadata of one highlight pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightResult {
    pub code_blocks: Vec<CodeBlockInfo>,
    pub images: Vec<ImageInfo>,
}

impl HighlightResult {
    pub fn is_empty(&self) -> bool {
        self.code_blocks.is_empty() && self.images.is_empty()
    }
}

/// Style instructions plus metadata produced by [`MarkdownStyleEngine::highlight`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightPass {
    pub sheet: StyleSheet,
    pub result: HighlightResult,
}

impl HighlightPass {
    /// Pass returned when a nested call is rejected.
    pub fn empty() -> Self {
        Self {
            sheet: StyleSheet::new(0),
            result: HighlightResult::default(),
        }
    }
}

/// Text buffer that can be restyled by the engine.
pub trait StyleTarget {
    /// Snapshot of the current buffer text.
    fn text(&self) -> String;

    /// Replace all styling with `sheet` (base reset, then ranges in order).
    fn apply_styles(&mut self, sheet: &StyleSheet);
}

/// Markdown highlighter with a re-entrancy guard.
#[derive(Debug, Default)]
pub struct MarkdownStyleEngine {
    in_pass: Cell<bool>,
}

struct PassGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }
        Some(Self { flag })
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

impl MarkdownStyleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a pass is running.
    pub fn is_highlighting(&self) -> bool {
        self.in_pass.get()
    }

    /// Compute styles and metadata for `text`.
    ///
    /// # Returns
    /// An empty pass when called from inside another pass.
    pub fn highlight(&self, text: &str) -> HighlightPass {
        let Some(_guard) = PassGuard::acquire(&self.in_pass) else {
            debug!("rejecting nested highlight pass");
            return HighlightPass::empty();
        };
        run_pass(text)
    }

    /// Highlight the target's text and apply the styles to it.
    ///
    /// The guard stays held while the target applies styles, so a target
    /// that re-enters the engine from `apply_styles` gets an empty result.
    pub fn highlight_into(&self, target: &mut dyn StyleTarget) -> HighlightResult {
        self.highlight_into_with(target, |_, _| {})
    }

    /// Like [`Self::highlight_into`], letting `decorate` append ranges (for
    /// example code-block colouring) before the sheet is applied.
    pub fn highlight_into_with<F>(&self, target: &mut dyn StyleTarget, decorate: F) -> HighlightResult
    where
        F: FnOnce(&HighlightResult, &mut StyleSheet),
    {
        let Some(_guard) = PassGuard::acquire(&self.in_pass) else {
            debug!("rejecting nested highlight pass");
            return HighlightResult::default();
        };
        let text = target.text();
        let mut pass = run_pass(&text);
        decorate(&pass.result, &mut pass.sheet);
        target.apply_styles(&pass.sheet);
        pass.result
    }
}

fn run_pass(text: &str) -> HighlightPass {
    let started = Instant::now();
    let document = parse(text);
    let mut walker = HighlightWalker::new(text);
    walker.visit(&document, None);
    let pass = walker.finish();
    info!(
        "highlighted {} chars: {} ranges, {} code blocks, {} images in {:?}",
        pass.sheet.buffer_len(),
        pass.sheet.ranges().len(),
        pass.result.code_blocks.len(),
        pass.result.images.len(),
        started.elapsed()
    );
    pass
}

struct HighlightWalker<'a> {
    text: &'a str,
    mapper: SourcePositionMapper<'a>,
    lines: LineIndex,
    sheet: StyleSheet,
    result: HighlightResult,
}

impl<'a> HighlightWalker<'a> {
    fn new(text: &'a str) -> Self {
        let lines = LineIndex::new(text);
        Self {
            text,
            mapper: SourcePositionMapper::new(text),
            sheet: StyleSheet::new(lines.len_chars()),
            lines,
            result: HighlightResult::default(),
        }
    }

    fn finish(self) -> HighlightPass {
        HighlightPass {
            sheet: self.sheet,
            result: self.result,
        }
    }

    fn node_range(&self, node: &Node) -> Option<Range<usize>> {
        let source = node.range?;
        let range = match self.mapper.try_resolve_range(&source) {
            Ok(range) => range,
            Err(err) => {
                debug!("skipping {:?}: {}", node.kind, err);
                return None;
            }
        };
        if range.end > self.lines.len_chars() {
            debug!(
                "skipping {:?}: range {:?} exceeds {} chars",
                node.kind,
                range,
                self.lines.len_chars()
            );
            return None;
        }
        Some(range)
    }

    fn descend(&mut self, node: &Node) {
        for child in &node.children {
            self.visit(child, Some(&node.kind));
        }
    }

    fn visit(&mut self, node: &Node, parent: Option<&NodeKind>) {
        if node.kind.is_leaf() {
            if let Some(range) = self.node_range(node) {
                self.style_leaf(node, range);
            }
            return;
        }
        if let Some(range) = self.node_range(node) {
            self.style_container(&node.kind, parent, range);
        }
        self.descend(node);
    }

    fn style_container(&mut self, kind: &NodeKind, parent: Option<&NodeKind>, range: Range<usize>) {
        match kind {
            NodeKind::Heading { level } => {
                self.sheet.push(
                    range,
                    StylePatch::new()
                        .with_font(FontRole::Heading(*level))
                        .with_foreground(ColorToken::Keyword),
                );
            }
            NodeKind::Strong => {
                self.sheet.push(
                    range,
                    StylePatch::new()
                        .with_font(FontRole::Bold)
                        .with_foreground(ColorToken::Function),
                );
            }
            NodeKind::Emphasis => {
                let patch = if matches!(parent, Some(NodeKind::Strong)) {
                    StylePatch::new()
                        .with_font(FontRole::BoldItalic)
                        .with_foreground(ColorToken::Function)
                } else {
                    StylePatch::new()
                        .with_font(FontRole::Italic)
                        .with_foreground(ColorToken::Foreground)
                };
                self.sheet.push(range, patch);
            }
            NodeKind::Strikethrough => {
                self.sheet.push(
                    range,
                    StylePatch::new()
                        .with_strikethrough()
                        .with_foreground(ColorToken::Comment),
                );
            }
            NodeKind::Link { destination } => {
                let mut patch = StylePatch::new()
                    .with_foreground(ColorToken::Type)
                    .with_underline();
                if let Some(destination) = destination {
                    patch = patch.with_link(destination.clone());
                }
                self.sheet.push(range, patch);
            }
            NodeKind::BlockQuote => {
                self.sheet.push(
                    range,
                    StylePatch::new()
                        .with_font(FontRole::Italic)
                        .with_foreground(ColorToken::Comment),
                );
            }
            NodeKind::ListItem { checkbox, ordered } => {
                self.style_list_item(range, *checkbox, *ordered);
            }
            NodeKind::Document | NodeKind::Paragraph | NodeKind::List { .. } | NodeKind::Other => {}
            NodeKind::InlineCode | NodeKind::CodeBlock { .. } | NodeKind::Image { .. } => {}
        }
    }

    /// Align each body line with its buffer line. The parser strips
    /// container prefixes, so the body line must be a suffix of the buffer
    /// line.
    fn body_line_starts(&self, code: &str, content_start: usize, end: usize) -> Vec<Option<usize>> {
        let first = self.lines.line_of(content_start);
        code.lines()
            .enumerate()
            .map(|(i, body)| {
                let range = self.lines.line_range(first + i);
                if range.start >= end {
                    return None;
                }
                let line = slice_chars(self.text, &range)?.trim_end_matches(['\n', '\r']);
                let body = body.trim_end_matches('\r');
                line.ends_with(body)
                    .then(|| range.start + char_len(line) - char_len(body))
            })
            .collect()
    }

    fn style_leaf(&mut self, node: &Node, range: Range<usize>) {
        match &node.kind {
            NodeKind::InlineCode => {
                self.sheet.push(
                    range,
                    StylePatch::new()
                        .with_font(FontRole::Code)
                        .with_foreground(ColorToken::String)
                        .with_background(ColorToken::InlineCodeBackground),
                );
            }
            NodeKind::CodeBlock {
                language,
                code,
                fenced,
            } => {
                self.sheet.push(
                    range.clone(),
                    StylePatch::new()
                        .with_font(FontRole::Code)
                        .with_background(ColorToken::CodeBlockBackground),
                );
                let content_start = if *fenced {
                    self.lines.line_range_at(range.start).end.min(range.end)
                } else {
                    range.start
                };
                let line_starts = self.body_line_starts(code, content_start, range.end);
                self.result.code_blocks.push(CodeBlockInfo {
                    language: language.clone(),
                    raw_content: code.clone(),
                    range,
                    content_start,
                    line_starts,
                });
            }
            NodeKind::Image { source } => {
                let mut patch = StylePatch::new().with_foreground(ColorToken::Type);
                if let Some(source) = source {
                    patch = patch.with_image_source(source.clone());
                    self.result.images.push(ImageInfo {
                        source: source.clone(),
                        range: range.clone(),
                    });
                }
                self.sheet.push(range, patch);
            }
            _ => {}
        }
    }

    fn style_list_item(&mut self, range: Range<usize>, checkbox: Option<bool>, ordered: bool) {
        let line_range = self.lines.line_range_at(range.start);
        let Some(line) = slice_chars(self.text, &line_range) else {
            return;
        };

        if let Some(checked) = checkbox {
            if let Some(span) = checkbox_span(line, checked) {
                let target = line_range.start + span.start..line_range.start + span.end;
                let color = if checked {
                    ColorToken::Keyword
                } else {
                    ColorToken::Comment
                };
                self.sheet.push(
                    target.clone(),
                    StylePatch::new()
                        .with_foreground(color)
                        .with_checkbox(target),
                );
            }
        }

        if let Some(marker) = list_marker(line, ordered) {
            let color = if ordered {
                ColorToken::Number
            } else {
                ColorToken::Keyword
            };
            self.sheet.push(
                line_range.start + marker.start..line_range.start + marker.end,
                StylePatch::new().with_foreground(color),
            );
        }
    }
}
