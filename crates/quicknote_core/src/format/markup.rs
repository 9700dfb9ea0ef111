//! Small XML-style pretty-printer for `xml`, `html` and `svg` blocks.
//!
//! Markup must be well formed: every open tag is closed (or self-closed) in
//! order. Anything else is rejected so the caller leaves the block alone.

use crate::error::CoreError;

const INDENT: &str = "    ";

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Open { name: String, raw: String },
    Close { name: String, raw: String },
    /// Self-closing tags, comments, declarations, doctypes, CDATA.
    Raw(String),
    Text(String),
}

#[derive(Debug)]
enum Node {
    Element {
        open: String,
        close: String,
        children: Vec<Node>,
    },
    Raw(String),
    Text(String),
}

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::InvalidMarkup(message.into())
}

fn tag_name(body: &str) -> Result<String, CoreError> {
    let name: String = body
        .chars()
        .take_while(|ch| !ch.is_whitespace() && *ch != '/' && *ch != '>')
        .collect();
    match name.chars().next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == ':' => Ok(name),
        _ => Err(invalid(format!("bad tag name in <{}", body))),
    }
}

/// Byte index just past the `>` closing a tag starting at `start`, skipping
/// quoted attribute values.
fn tag_end(source: &str, start: usize) -> Result<usize, CoreError> {
    let mut quote: Option<char> = None;
    for (offset, ch) in source[start..].char_indices() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == '>' => return Ok(start + offset + 1),
            None => {}
        }
    }
    Err(invalid("unterminated tag"))
}

fn delimited_end(source: &str, start: usize, terminator: &str) -> Result<usize, CoreError> {
    source[start..]
        .find(terminator)
        .map(|offset| start + offset + terminator.len())
        .ok_or_else(|| invalid(format!("missing {}", terminator)))
}

fn tokenize(source: &str) -> Result<Vec<Token>, CoreError> {
    let mut tokens = Vec::new();
    let mut cursor = 0usize;
    while cursor < source.len() {
        let rest = &source[cursor..];
        if !rest.starts_with('<') {
            let end = rest.find('<').map_or(source.len(), |offset| cursor + offset);
            let text = source[cursor..end].trim();
            if !text.is_empty() {
                tokens.push(Token::Text(text.to_string()));
            }
            cursor = end;
            continue;
        }

        let end = if rest.starts_with("<!--") {
            delimited_end(source, cursor + 4, "-->")?
        } else if rest.starts_with("<![CDATA[") {
            delimited_end(source, cursor + 9, "]]>")?
        } else if rest.starts_with("<?") {
            delimited_end(source, cursor + 2, "?>")?
        } else {
            tag_end(source, cursor)?
        };
        let raw = source[cursor..end].trim().to_string();
        let token = if raw.starts_with("<!") || raw.starts_with("<?") {
            Token::Raw(raw)
        } else if let Some(body) = raw.strip_prefix("</") {
            Token::Close {
                name: tag_name(body)?,
                raw,
            }
        } else if raw.ends_with("/>") {
            tag_name(&raw[1..])?;
            Token::Raw(raw)
        } else {
            Token::Open {
                name: tag_name(&raw[1..])?,
                raw,
            }
        };
        tokens.push(token);
        cursor = end;
    }
    Ok(tokens)
}

fn build(tokens: Vec<Token>) -> Result<Vec<Node>, CoreError> {
    let mut stack: Vec<(String, String, Vec<Node>)> = Vec::new();
    let mut roots: Vec<Node> = Vec::new();

    for token in tokens {
        let node = match token {
            Token::Open { name, raw } => {
                stack.push((name, raw, Vec::new()));
                continue;
            }
            Token::Close { name, raw } => {
                let Some((open_name, open, children)) = stack.pop() else {
                    return Err(invalid(format!("unexpected {}", raw)));
                };
                if open_name != name {
                    return Err(invalid(format!("{} closes <{}>", raw, open_name)));
                }
                Node::Element {
                    open,
                    close: raw,
                    children,
                }
            }
            Token::Raw(raw) => Node::Raw(raw),
            Token::Text(text) => {
                if stack.is_empty() {
                    return Err(invalid("text outside of any element"));
                }
                Node::Text(text)
            }
        };
        match stack.last_mut() {
            Some((_, _, children)) => children.push(node),
            None => roots.push(node),
        }
    }

    if let Some((name, _, _)) = stack.last() {
        return Err(invalid(format!("<{}> is never closed", name)));
    }
    if !roots.iter().any(|node| matches!(node, Node::Element { .. })) {
        return Err(invalid("no root element"));
    }
    Ok(roots)
}

fn render(node: &Node, depth: usize, lines: &mut Vec<String>) {
    let indent = INDENT.repeat(depth);
    match node {
        Node::Raw(raw) | Node::Text(raw) => lines.push(format!("{}{}", indent, raw)),
        Node::Element {
            open,
            close,
            children,
        } => match children.as_slice() {
            [] => lines.push(format!("{}{}{}", indent, open, close)),
            [Node::Text(text)] => lines.push(format!("{}{}{}{}", indent, open, text, close)),
            _ => {
                lines.push(format!("{}{}", indent, open));
                for child in children {
                    render(child, depth + 1, lines);
                }
                lines.push(format!("{}{}", indent, close));
            }
        },
    }
}

pub(super) fn format(code: &str) -> Result<String, CoreError> {
    let roots = build(tokenize(code.trim())?)?;
    let mut lines = Vec::new();
    for root in &roots {
        render(root, 0, &mut lines);
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::format;
    use crate::error::CoreError;

    #[test]
    fn nested_elements_are_indented() {
        let formatted = format(
            r#"<?xml version="1.0"?><svg width="10"><g><rect x="1"/><text>Hi there</text></g></svg>"#,
        )
        .expect("well formed");
        assert_eq!(
            formatted,
            "<?xml version=\"1.0\"?>\n<svg width=\"10\">\n    <g>\n        <rect x=\"1\"/>\n        <text>Hi there</text>\n    </g>\n</svg>"
        );
    }

    #[test]
    fn quoted_angle_brackets_do_not_end_a_tag() {
        let formatted = format(r#"<a title="x > y"><!-- note --></a>"#).expect("well formed");
        assert_eq!(
            formatted,
            "<a title=\"x > y\">\n    <!-- note -->\n</a>"
        );
    }

    #[test]
    fn mismatched_or_unclosed_tags_are_rejected() {
        assert!(matches!(format("<a><b></a>"), Err(CoreError::InvalidMarkup(_))));
        assert!(matches!(format("<a>"), Err(CoreError::InvalidMarkup(_))));
        assert!(matches!(format("</a>"), Err(CoreError::InvalidMarkup(_))));
        assert!(matches!(format("plain text"), Err(CoreError::InvalidMarkup(_))));
        assert!(matches!(format("<a attr=\"open>"), Err(CoreError::InvalidMarkup(_))));
    }

    #[test]
    fn empty_elements_stay_on_one_line() {
        assert_eq!(format("<p>\n</p>").expect("well formed"), "<p></p>");
    }
}
