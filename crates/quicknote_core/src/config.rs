//! Configuration loading from environment variables.

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default base editor font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;
/// Default maximum rendered height for inline image previews.
pub const DEFAULT_IMAGE_MAX_HEIGHT: f32 = 200.0;
/// Default delay before an edit is propagated to the document model.
pub const DEFAULT_CHANGE_DEBOUNCE_MS: u64 = 100;
/// Default delay before an edit is written back to the note file.
pub const DEFAULT_AUTOSAVE_MS: u64 = 500;
/// Default syntect theme used for code-block colouring.
pub const DEFAULT_SYNTAX_THEME: &str = "base16-mocha.dark";

/// Runtime configuration for the QuickNote editor.
#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    pub vault_path: Option<PathBuf>,
    pub note_path: Option<PathBuf>,
    pub font_size: f32,
    pub image_max_height: f32,
    pub change_debounce_ms: u64,
    pub autosave_ms: u64,
    pub syntax_theme: String,
    pub plain: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            vault_path: None,
            note_path: None,
            font_size: DEFAULT_FONT_SIZE,
            image_max_height: DEFAULT_IMAGE_MAX_HEIGHT,
            change_debounce_ms: DEFAULT_CHANGE_DEBOUNCE_MS,
            autosave_ms: DEFAULT_AUTOSAVE_MS,
            syntax_theme: DEFAULT_SYNTAX_THEME.to_string(),
            plain: false,
        }
    }
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    None
}

fn env_path(name: &str) -> Option<PathBuf> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(expand_tilde)
        .map(PathBuf::from)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.trim().parse().ok())
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
///
/// # Arguments
/// - `name`: Environment variable name.
///
/// # Returns
/// `true` when the value is a recognized truthy value.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

impl EditorConfig {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`EditorConfig`] with defaults applied when env vars are
    /// missing or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            vault_path: env_path("QUICKNOTE_VAULT"),
            note_path: env_path("QUICKNOTE_NOTE"),
            font_size: env_parse::<f32>("QUICKNOTE_FONT_SIZE")
                .filter(|size| *size >= 6.0)
                .unwrap_or(defaults.font_size),
            image_max_height: env_parse::<f32>("QUICKNOTE_IMAGE_MAX_HEIGHT")
                .filter(|height| *height > 0.0)
                .unwrap_or(defaults.image_max_height),
            change_debounce_ms: env_parse("QUICKNOTE_CHANGE_DEBOUNCE_MS")
                .unwrap_or(defaults.change_debounce_ms),
            autosave_ms: env_parse("QUICKNOTE_AUTOSAVE_MS").unwrap_or(defaults.autosave_ms),
            syntax_theme: env::var("QUICKNOTE_SYNTAX_THEME")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(defaults.syntax_theme),
            plain: env_flag_enabled("QUICKNOTE_PLAIN"),
        }
    }

    /// Delay between the last keystroke and propagating the text.
    pub fn change_debounce(&self) -> Duration {
        Duration::from_millis(self.change_debounce_ms)
    }

    /// Delay between the last keystroke and the autosave write.
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_ms)
    }
}
