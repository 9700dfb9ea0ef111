//! Facade-level checks that the re-exported engine pieces work together.

use quicknote::format::format_code;
use quicknote::{MarkdownStyleEngine, SourcePositionMapper, SyntaxColorizer};

#[test]
fn highlight_colorize_and_format_through_the_facade() {
    let text = "Intro 🔥\n\n```json\n{\"b\":2,\"a\":1}\n```\n";
    let engine = MarkdownStyleEngine::new();
    let pass = engine.highlight(text);
    assert_eq!(pass, engine.highlight(text));

    let block = &pass.result.code_blocks[0];
    assert_eq!(block.language.as_deref(), Some("json"));
    let spans = SyntaxColorizer::default().colorize(block);
    assert!(spans.iter().all(|span| span.range.end <= block.range.end));

    assert_eq!(
        format_code(&block.raw_content, block.language.as_deref()).as_deref(),
        Some("{\n  \"b\": 2,\n  \"a\": 1\n}\n")
    );
    assert_eq!(format_code("not json", Some("json")), None);

    let mapper = SourcePositionMapper::new(text);
    let offset = mapper.resolve(3, 1).expect("fence line");
    assert_eq!(text.chars().nth(offset), Some('`'));
}
