//! Token colouring for fenced code blocks.
//!
//! Only foreground colours are produced; font and background of a block stay
//! with the markdown style engine.

mod resolve;

pub use resolve::{canonical_language, resolve_syntax};

use crate::config::DEFAULT_SYNTAX_THEME;
use crate::error::CoreError;
use crate::markdown::{CodeBlockInfo, HighlightResult, StylePatch, StyledRange};
use crate::theme::ColorToken;
use syntect::highlighting::{HighlightState, Highlighter, RangedHighlightIterator, ThemeSet};
use syntect::parsing::{ParseState, ScopeStack, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::{debug, warn};

/// Reusable syntect sets.
pub struct SyntectSettings {
    pub ps: SyntaxSet,
    pub ts: ThemeSet,
}

impl Default for SyntectSettings {
    fn default() -> Self {
        Self {
            ps: SyntaxSet::load_defaults_newlines(),
            ts: ThemeSet::load_defaults(),
        }
    }
}

/// Colours code-block tokens with a syntect theme.
pub struct SyntaxColorizer {
    settings: SyntectSettings,
    theme_key: String,
}

impl SyntaxColorizer {
    /// Build a colorizer for `theme_key`.
    ///
    /// # Errors
    /// [`CoreError::UnknownTheme`] when the bundled theme set lacks the key.
    pub fn try_new(theme_key: &str) -> Result<Self, CoreError> {
        let settings = SyntectSettings::default();
        if !settings.ts.themes.contains_key(theme_key) {
            return Err(CoreError::UnknownTheme(theme_key.to_string()));
        }
        Ok(Self {
            settings,
            theme_key: theme_key.to_string(),
        })
    }

    /// Build a colorizer, falling back to the default theme (or any bundled
    /// theme) when `theme_key` is unknown.
    pub fn new(theme_key: &str) -> Self {
        let settings = SyntectSettings::default();
        let theme_key = if settings.ts.themes.contains_key(theme_key) {
            theme_key.to_string()
        } else {
            let fallback = if settings.ts.themes.contains_key(DEFAULT_SYNTAX_THEME) {
                DEFAULT_SYNTAX_THEME.to_string()
            } else {
                settings.ts.themes.keys().next().cloned().unwrap_or_default()
            };
            warn!(
                "unknown syntax theme '{}'; using '{}'",
                theme_key, fallback
            );
            fallback
        };
        Self {
            settings,
            theme_key,
        }
    }

    pub fn theme_key(&self) -> &str {
        &self.theme_key
    }

    /// True when `language` maps to a grammar.
    pub fn supports(&self, language: Option<&str>) -> bool {
        language
            .and_then(|language| resolve_syntax(&self.settings.ps, language))
            .is_some()
    }

    /// Foreground spans for one code block, in absolute buffer offsets.
    ///
    /// Each body line is placed at its recorded buffer offset and spans never
    /// pass the end of the block. Unknown languages yield nothing.
    pub fn colorize(&self, block: &CodeBlockInfo) -> Vec<StyledRange> {
        let Some(language) = block.language.as_deref() else {
            return Vec::new();
        };
        let Some(syntax) = resolve_syntax(&self.settings.ps, language) else {
            debug!("no grammar for code block language '{}'", language);
            return Vec::new();
        };
        let Some(theme) = self.settings.ts.themes.get(&self.theme_key) else {
            return Vec::new();
        };

        let highlighter = Highlighter::new(theme);
        let mut parse_state = ParseState::new(syntax);
        let mut highlight_state = HighlightState::new(&highlighter, ScopeStack::new());
        let limit = block.range.end;
        let mut spans = Vec::new();
        let mut starts = block.line_starts.iter().copied();

        for line in LinesWithEndings::from(block.raw_content.as_str()) {
            let line_start = starts.next().flatten();
            if line_start.is_some_and(|start| start >= limit) {
                break;
            }
            match parse_state.parse_line(line, &self.settings.ps) {
                Ok(ops) => {
                    let iter = RangedHighlightIterator::new(
                        &mut highlight_state,
                        &ops[..],
                        line,
                        &highlighter,
                    );
                    // Unmatched lines are still parsed to keep the state.
                    let Some(line_start) = line_start else {
                        iter.for_each(drop);
                        continue;
                    };
                    for (style, token, range) in iter {
                        if range.is_empty() || token.trim().is_empty() {
                            continue;
                        }
                        let start = line_start + line[..range.start].chars().count();
                        let end = (start + token.chars().count()).min(limit);
                        if start >= end {
                            continue;
                        }
                        let color = ColorToken::Rgb([
                            style.foreground.r,
                            style.foreground.g,
                            style.foreground.b,
                            style.foreground.a,
                        ]);
                        spans.push(StyledRange::new(
                            start..end,
                            StylePatch::new().with_foreground(color),
                        ));
                    }
                }
                Err(err) => {
                    debug!("syntect failed on '{}' block: {}", language, err);
                    return Vec::new();
                }
            }
        }
        spans
    }

    /// Spans for every code block of a pass.
    pub fn colorize_all(&self, result: &HighlightResult) -> Vec<StyledRange> {
        result
            .code_blocks
            .iter()
            .flat_map(|block| self.colorize(block))
            .collect()
    }
}

impl Default for SyntaxColorizer {
    fn default() -> Self {
        Self::new(DEFAULT_SYNTAX_THEME)
    }
}
