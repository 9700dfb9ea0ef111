//! Code-fence language tags to syntect grammars.

use syntect::parsing::{SyntaxReference, SyntaxSet};

/// Normalize a fence tag into the label used for grammar lookup.
///
/// # Returns
/// Canonical lowercase label, or `"text"` when the tag is empty.
pub fn canonical_language(language: &str) -> String {
    let lowered = language.trim().to_ascii_lowercase();
    let canonical = match lowered.as_str() {
        "" | "plaintext" | "plain" | "txt" => "text",
        "csharp" | "c#" => "cs",
        "c++" => "cpp",
        "bash" | "sh" | "zsh" => "shell",
        "pwsh" | "ps1" => "powershell",
        "yml" => "yaml",
        "jsonl" => "json",
        "js" => "javascript",
        "ts" => "typescript",
        "md" => "markdown",
        "py" => "python",
        "rs" => "rust",
        "rb" => "ruby",
        "m" | "mm" | "objc" | "objective-c" => "objectivec",
        "scss" | "sass" => "css",
        "svg" => "xml",
        _ => return lowered,
    };
    canonical.to_string()
}

fn normalized_syntax_key(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

fn try_resolve_syntax_candidate<'a>(
    ps: &'a SyntaxSet,
    candidate: &str,
) -> Option<&'a SyntaxReference> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(syntax) = ps
        .find_syntax_by_name(trimmed)
        .or_else(|| ps.find_syntax_by_extension(trimmed))
    {
        return Some(syntax);
    }

    let normalized = normalized_syntax_key(trimmed);
    ps.syntaxes().iter().find(|syntax| {
        syntax.name.eq_ignore_ascii_case(trimmed)
            || (!normalized.is_empty() && normalized_syntax_key(&syntax.name) == normalized)
            || syntax
                .file_extensions
                .iter()
                .any(|ext| ext.eq_ignore_ascii_case(trimmed))
    })
}

fn syntax_fallback_candidates(canonical: &str) -> &'static [&'static str] {
    match canonical {
        "cs" => &["C#", "cs"],
        "shell" => &["Bourne Again Shell (bash)", "bash", "sh"],
        "cpp" => &["C++", "cpp", "cc"],
        "objectivec" => &["Objective-C", "m"],
        "dockerfile" => &["Dockerfile", "bash", "sh"],
        "makefile" => &["Makefile", "make"],
        "latex" => &["LaTeX", "tex"],
        "typescript" => &["JavaScript", "js", "ts"],
        "toml" => &["Java Properties", "properties", "YAML", "yaml"],
        "swift" => &["Rust", "rs", "Go", "go", "Objective-C"],
        "powershell" => &["ps1", "Bourne Again Shell (bash)", "bash", "sh"],
        _ => &[],
    }
}

/// Resolve a fence tag to a grammar.
///
/// # Arguments
/// - `ps`: Loaded syntect syntax set.
/// - `language`: Raw language tag from the code fence.
///
/// # Returns
/// `None` for plain text or tags with no matching grammar.
pub fn resolve_syntax<'a>(ps: &'a SyntaxSet, language: &str) -> Option<&'a SyntaxReference> {
    let canonical = canonical_language(language);
    if canonical == "text" {
        return None;
    }
    try_resolve_syntax_candidate(ps, &canonical)
        .or_else(|| try_resolve_syntax_candidate(ps, language))
        .or_else(|| {
            syntax_fallback_candidates(&canonical)
                .iter()
                .find_map(|candidate| try_resolve_syntax_candidate(ps, candidate))
        })
        .filter(|syntax| syntax.name != ps.find_syntax_plain_text().name)
}
