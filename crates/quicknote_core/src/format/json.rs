//! Order-preserving JSON re-layout.
//!
//! The input is validated with `serde_json`, then re-emitted by walking the
//! source chars so key order and scalar spelling survive untouched.

use crate::error::CoreError;
use serde::de::IgnoredAny;

const INDENT: &str = "  ";

fn push_newline(out: &mut String, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

pub(super) fn format(code: &str) -> Result<String, CoreError> {
    let trimmed = code.trim();
    serde_json::from_str::<IgnoredAny>(trimmed)?;

    let chars: Vec<char> = trimmed.chars().collect();
    let mut out = String::with_capacity(trimmed.len() * 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, &ch) in chars.iter().enumerate() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        if ch.is_whitespace() {
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '{' | '[' => {
                out.push(ch);
                depth += 1;
                let next = chars[index + 1..]
                    .iter()
                    .find(|next| !next.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    push_newline(&mut out, depth);
                }
            }
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                let last = out.chars().rev().find(|last| !last.is_whitespace());
                if !matches!(last, Some('{') | Some('[')) {
                    push_newline(&mut out, depth);
                }
                out.push(ch);
            }
            ',' => {
                out.push(ch);
                push_newline(&mut out, depth);
            }
            ':' => out.push_str(": "),
            _ => out.push(ch),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::format;

    #[test]
    fn nested_structures_indent_two_spaces_per_level() {
        let formatted = format(r#"{"list":[1,2],"obj":{"k":null}}"#).expect("valid json");
        assert_eq!(
            formatted,
            "{\n  \"list\": [\n    1,\n    2\n  ],\n  \"obj\": {\n    \"k\": null\n  }\n}"
        );
    }

    #[test]
    fn string_contents_are_copied_verbatim() {
        let formatted = format(r#"{"a, b": "x: {y}", "q":"say \"hi\""}"#).expect("valid json");
        assert_eq!(
            formatted,
            "{\n  \"a, b\": \"x: {y}\",\n  \"q\": \"say \\\"hi\\\"\"\n}"
        );
    }

    #[test]
    fn scalar_spelling_survives() {
        let formatted = format("[1.50, -0, 1e3]").expect("valid json");
        assert_eq!(formatted, "[\n  1.50,\n  -0,\n  1e3\n]");
    }

    #[test]
    fn empty_nested_bodies_stay_inline() {
        let formatted = format(r#"{"a":{},"b":[ ]}"#).expect("valid json");
        assert_eq!(formatted, "{\n  \"a\": {},\n  \"b\": []\n}");
    }
}
