//! Markdown parsing, position mapping, and styling.

mod ast;
mod engine;
mod lists;
mod position;
mod style;

#[cfg(test)]
mod tests;

pub use ast::{parse, Node, NodeKind, SourceLocation, SourceRange};
pub use engine::{
    CodeBlockInfo, HighlightPass, HighlightResult, ImageInfo, MarkdownStyleEngine, StyleTarget,
};
pub use lists::{checkbox_span, list_marker, toggle_checkbox, CheckboxEdit};
pub use position::SourcePositionMapper;
pub use style::{ResolvedStyle, StylePatch, StyleRun, StyleSheet, StyledRange};
