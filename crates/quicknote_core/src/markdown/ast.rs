//! Markdown AST adapter over `pulldown-cmark`.
//!
//! The parser reports byte spans; this module folds its event stream into a
//! tree of [`Node`]s whose ranges are expressed as 1-based line and 1-based
//! UTF-8 byte columns, the form [`super::SourcePositionMapper`] consumes.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use std::ops::Range;

/// 1-based line and 1-based UTF-8 byte column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Half-open source span; `end` points just past the last byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceRange {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

/// Node kinds the style engine dispatches on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Heading {
        level: u8,
    },
    Paragraph,
    Strong,
    Emphasis,
    Strikethrough,
    InlineCode,
    CodeBlock {
        language: Option<String>,
        code: String,
        fenced: bool,
    },
    Link {
        destination: Option<String>,
    },
    Image {
        source: Option<String>,
    },
    BlockQuote,
    List {
        ordered: bool,
    },
    ListItem {
        checkbox: Option<bool>,
        ordered: bool,
    },
    Other,
}

impl NodeKind {
    /// Leaves are never descended into.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            NodeKind::InlineCode | NodeKind::CodeBlock { .. } | NodeKind::Image { .. }
        )
    }
}

/// One parsed markdown node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub range: Option<SourceRange>,
    pub children: Vec<Node>,
}

impl Node {
    fn new(kind: NodeKind, range: Option<SourceRange>) -> Self {
        Self {
            kind,
            range,
            children: Vec::new(),
        }
    }

    /// Pre-order iterator over this node and all descendants.
    pub fn walk(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

/// Maps parser byte offsets onto 1-based line/column locations.
struct ByteLocator<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> ByteLocator<'a> {
    fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(index, _)| index + 1),
        );
        Self { text, line_starts }
    }

    fn location(&self, byte: usize) -> SourceLocation {
        let byte = byte.min(self.text.len());
        let line = self
            .line_starts
            .partition_point(|start| *start <= byte)
            .saturating_sub(1);
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        SourceLocation::new(line + 1, byte - line_start + 1)
    }

    fn range(&self, span: Range<usize>) -> Option<SourceRange> {
        if span.start > span.end || span.end > self.text.len() {
            return None;
        }
        let bytes = self.text.as_bytes();
        let mut end = span.end;
        while end > span.start && matches!(bytes[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        Some(SourceRange {
            start: self.location(span.start),
            end: self.location(end),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn kind_for_tag(tag: &Tag<'_>, parent: Option<&NodeKind>) -> NodeKind {
    match tag {
        Tag::Heading { level, .. } => NodeKind::Heading {
            level: *level as u8,
        },
        Tag::Paragraph => NodeKind::Paragraph,
        Tag::Strong => NodeKind::Strong,
        Tag::Emphasis => NodeKind::Emphasis,
        Tag::Strikethrough => NodeKind::Strikethrough,
        Tag::CodeBlock(kind) => {
            let (language, fenced) = match kind {
                CodeBlockKind::Fenced(info) => (
                    info.split_whitespace().next().map(str::to_string),
                    true,
                ),
                CodeBlockKind::Indented => (None, false),
            };
            NodeKind::CodeBlock {
                language,
                code: String::new(),
                fenced,
            }
        }
        Tag::Link { dest_url, .. } => NodeKind::Link {
            destination: non_empty(dest_url),
        },
        Tag::Image { dest_url, .. } => NodeKind::Image {
            source: non_empty(dest_url),
        },
        Tag::BlockQuote(_) => NodeKind::BlockQuote,
        Tag::List(start) => NodeKind::List {
            ordered: start.is_some(),
        },
        Tag::Item => NodeKind::ListItem {
            checkbox: None,
            ordered: matches!(parent, Some(NodeKind::List { ordered: true })),
        },
        _ => NodeKind::Other,
    }
}

fn attach(stack: &mut [Node], mut node: Node) {
    if node.kind.is_leaf() {
        node.children.clear();
    }
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

/// Parse markdown into a [`Node`] tree rooted at a `Document` node.
///
/// Enables strikethrough and GitHub task lists. Node end locations exclude
/// trailing line terminators.
pub fn parse(text: &str) -> Node {
    let locator = ByteLocator::new(text);
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut stack = vec![Node::new(NodeKind::Document, locator.range(0..text.len()))];

    for (event, span) in Parser::new_ext(text, options).into_offset_iter() {
        match event {
            Event::Start(tag) => {
                let kind = kind_for_tag(&tag, stack.last().map(|node| &node.kind));
                stack.push(Node::new(kind, locator.range(span)));
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    if let Some(node) = stack.pop() {
                        attach(&mut stack, node);
                    }
                }
            }
            Event::Code(_) => {
                attach(
                    &mut stack,
                    Node::new(NodeKind::InlineCode, locator.range(span)),
                );
            }
            Event::Text(content) => {
                if let Some(Node {
                    kind: NodeKind::CodeBlock { code, .. },
                    ..
                }) = stack.last_mut()
                {
                    code.push_str(&content);
                }
            }
            Event::TaskListMarker(checked) => {
                let item = stack
                    .iter_mut()
                    .rev()
                    .find(|node| matches!(node.kind, NodeKind::ListItem { .. }));
                if let Some(Node {
                    kind: NodeKind::ListItem { checkbox, .. },
                    ..
                }) = item
                {
                    *checkbox = Some(checked);
                }
            }
            _ => {}
        }
    }

    while stack.len() > 1 {
        if let Some(node) = stack.pop() {
            attach(&mut stack, node);
        }
    }
    stack
        .pop()
        .unwrap_or_else(|| Node::new(NodeKind::Document, None))
}
