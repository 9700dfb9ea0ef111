//! Line-oriented re-indenter for C-like and JS-like code.
//!
//! Heuristic only: indentation follows the net bracket balance of each line,
//! ignoring brackets inside string/template literals and after `//`.

const INDENT: &str = "  ";

fn starts_with_close(line: &str) -> bool {
    matches!(line.chars().next(), Some('}' | ']' | ')'))
}

/// `{[(` minus `}])`, skipping literals and line comments.
fn net_brackets(line: &str) -> i64 {
    let mut net = 0i64;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if escaped {
            escaped = false;
            continue;
        }
        if let Some(open) = quote {
            if ch == '\\' {
                escaped = true;
            } else if ch == open {
                quote = None;
            }
            continue;
        }
        match ch {
            '/' if chars.peek() == Some(&'/') => break,
            '"' | '\'' | '`' => quote = Some(ch),
            '{' | '[' | '(' => net += 1,
            '}' | ']' | ')' => net -= 1,
            _ => {}
        }
    }
    net
}

pub(super) fn format(code: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut level = 0i64;

    for line in code.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            out.push(String::new());
            continue;
        }
        let leading_close = starts_with_close(trimmed);
        if leading_close {
            level = (level - 1).max(0);
        }
        out.push(format!("{}{}", INDENT.repeat(level as usize), trimmed));

        let net = net_brackets(trimmed);
        // The leading close was already applied above and is counted in `net`.
        let compensation = if leading_close { 1 } else { 0 };
        level = (level + net + compensation).max(0);
    }
    out.join("\n")
}
