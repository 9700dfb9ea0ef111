//! On-demand pretty-printers for fenced code blocks.
//!
//! Supported families: JSON (order-preserving re-layout), XML-like markup,
//! and a brace-balance re-indenter for JavaScript/TypeScript.

mod braces;
mod json;
mod markup;

use crate::error::CoreError;
use tracing::debug;

/// Formatter family selected from a code block's language tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatLanguage {
    Json,
    Markup,
    Braces,
}

impl FormatLanguage {
    /// Language tags with a formatter, lowercase.
    pub const SUPPORTED: [&'static str; 8] =
        ["json", "xml", "html", "svg", "javascript", "js", "typescript", "ts"];

    /// Match a language tag case-insensitively.
    pub fn detect(language: &str) -> Option<Self> {
        match language.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "xml" | "html" | "svg" => Some(Self::Markup),
            "javascript" | "js" | "typescript" | "ts" => Some(Self::Braces),
            _ => None,
        }
    }
}

/// True when `language` names a supported formatter.
pub fn is_supported(language: Option<&str>) -> bool {
    language.and_then(FormatLanguage::detect).is_some()
}

/// Format `code` for `language`, surfacing why formatting was skipped.
///
/// # Errors
/// [`CoreError::UnsupportedLanguage`] for a missing or unknown tag, or the
/// formatter's validation error.
pub fn try_format_code(code: &str, language: Option<&str>) -> Result<String, CoreError> {
    let tag = language.unwrap_or_default();
    let family = FormatLanguage::detect(tag)
        .ok_or_else(|| CoreError::UnsupportedLanguage(tag.to_string()))?;
    let mut formatted = match family {
        FormatLanguage::Json => json::format(code)?,
        FormatLanguage::Markup => markup::format(code)?,
        FormatLanguage::Braces => braces::format(code),
    };
    // The body sits right above the closing fence; keep the fence on its own line.
    if code.ends_with('\n') && !formatted.ends_with('\n') {
        formatted.push('\n');
    }
    Ok(formatted)
}

/// Format `code` for `language`.
///
/// # Returns
/// The pretty-printed code, or `None` ("no change") when the language is
/// unsupported or the input fails validation.
pub fn format_code(code: &str, language: Option<&str>) -> Option<String> {
    match try_format_code(code, language) {
        Ok(formatted) => Some(formatted),
        Err(err) => {
            debug!("code block left unformatted: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_reformat_preserves_key_order() {
        assert_eq!(
            format_code(r#"{"b":2,"a":1}"#, Some("json")).as_deref(),
            Some("{\n  \"b\": 2,\n  \"a\": 1\n}")
        );
    }

    #[test]
    fn json_empty_body_stays_on_one_line() {
        assert_eq!(format_code("{}", Some("json")).as_deref(), Some("{}"));
        assert_eq!(format_code(" [ ] ", Some("JSON")).as_deref(), Some("[]"));
    }

    #[test]
    fn invalid_json_is_no_change() {
        assert_eq!(format_code("not json", Some("json")), None);
        assert!(matches!(
            try_format_code("{\"a\":}", Some("json")),
            Err(CoreError::InvalidJson(_))
        ));
    }

    #[test]
    fn unknown_or_missing_language_is_no_change() {
        assert_eq!(format_code("fn main() {}", Some("rust")), None);
        assert_eq!(format_code("{}", None), None);
        assert_eq!(
            try_format_code("x", Some("cobol")),
            Err(CoreError::UnsupportedLanguage("cobol".to_string()))
        );
    }

    #[test]
    fn trailing_newline_is_restored() {
        assert_eq!(
            format_code("{\"a\":1}\n", Some("json")).as_deref(),
            Some("{\n  \"a\": 1\n}\n")
        );
        assert_eq!(
            format_code("<a><b/></a>\n", Some("xml")).as_deref(),
            Some("<a>\n    <b/>\n</a>\n")
        );
    }

    #[test]
    fn detection_is_case_insensitive() {
        assert_eq!(FormatLanguage::detect("TS"), Some(FormatLanguage::Braces));
        assert_eq!(FormatLanguage::detect("Svg"), Some(FormatLanguage::Markup));
        assert!(is_supported(Some("javascript")));
        assert!(!is_supported(Some("python")));
        assert!(!is_supported(None));
    }
}
