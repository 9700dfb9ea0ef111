//! Core library for QuickNote: markdown styling, code formatting, and the
//! toolkit-free pieces shared by the desktop editor.

/// Configuration loading and defaults.
pub mod config;
/// Process-global environment mutation helpers.
pub mod env;
/// Core error types.
pub mod error;
/// Code-block pretty-printers.
pub mod format;
/// Markdown AST, position mapping, and the style engine.
pub mod markdown;
/// Syntax colouring for fenced code blocks.
pub mod syntax;
/// Char-offset line helpers.
pub mod text;
/// Colour tokens, font roles, and the default palette.
pub mod theme;

pub use config::EditorConfig;
pub use error::CoreError;
pub use format::{format_code, FormatLanguage};
pub use markdown::{
    CodeBlockInfo, HighlightPass, HighlightResult, ImageInfo, MarkdownStyleEngine,
    SourcePositionMapper, StylePatch, StyleSheet, StyleTarget, StyledRange,
};
pub use syntax::SyntaxColorizer;
pub use theme::{ColorToken, FontRole, FontScale, Palette};
