//! Root crate facade for the QuickNote core library and desktop editor.

pub use quicknote_core::{
    config, error, format, markdown, syntax, text, theme, CodeBlockInfo, ColorToken, CoreError,
    EditorConfig, FontRole, FontScale, HighlightPass, HighlightResult, ImageInfo,
    MarkdownStyleEngine, Palette, SourcePositionMapper, StylePatch, StyleSheet, StyleTarget,
    StyledRange, SyntaxColorizer,
};

#[cfg(feature = "gui")]
/// Desktop editor crate (feature-gated).
pub use quicknote_gui as gui;
