//! Integration tests for the block parser and inline formatter.

use mdreport::model::visible_text;
use mdreport::{format_inline, parse, Block, BlockParser, InlineSegment, ParseOptions};
use proptest::prelude::*;

#[test]
fn test_heading_then_paragraph() {
    let blocks = parse("# Title\n\nHello **world**.");
    assert_eq!(
        blocks,
        vec![
            Block::heading(1, "Title"),
            Block::BlankSeparator,
            Block::paragraph("Hello **world**."),
        ]
    );

    assert_eq!(
        format_inline("Hello **world**."),
        vec![
            InlineSegment::plain("Hello "),
            InlineSegment::Bold("world".into()),
            InlineSegment::plain("."),
        ]
    );
}

#[test]
fn test_nested_bullets() {
    let blocks = parse("- item one\n  - nested item");
    assert_eq!(
        blocks,
        vec![Block::bullet(0, "item one"), Block::bullet(1, "nested item")]
    );
}

#[test]
fn test_unterminated_fence_is_discarded() {
    let blocks = parse("before\n```\nline 1\nline 2\nline 3\n");
    assert_eq!(blocks, vec![Block::paragraph("before")]);
    assert!(!blocks.iter().any(|b| matches!(b, Block::CodeBlock { .. })));
}

#[test]
fn test_fence_content_is_verbatim() {
    let blocks = parse("```python\n# not a heading\n- not a bullet\n```");
    assert_eq!(
        blocks,
        vec![Block::code(["# not a heading", "- not a bullet"])]
    );
}

#[test]
fn test_code_blank_lines_option() {
    let md = "```\na\n\nb\n```";
    assert_eq!(parse(md), vec![Block::code(["a", "b"])]);

    let parser = BlockParser::new(ParseOptions::new().preserve_code_blank_lines(true));
    assert_eq!(parser.parse(md), vec![Block::code(["a", "", "b"])]);
}

#[test]
fn test_flat_lists() {
    let parser = BlockParser::new(ParseOptions::new().flat_lists());
    assert_eq!(
        parser.parse("- a\n    - b"),
        vec![Block::bullet(0, "a"), Block::bullet(0, "b")]
    );
}

#[test]
fn test_numbered_and_quote() {
    let blocks = parse("1. first\n  02. second\n> quoted");
    assert_eq!(
        blocks,
        vec![
            Block::numbered(0, "1", "first"),
            Block::numbered(1, "02", "second"),
            Block::quote("quoted"),
        ]
    );
}

#[test]
fn test_markup_lines_dropped() {
    let blocks = parse("<!-- hidden -->\n<div>\ntext\n<https://example.com>");
    assert_eq!(
        blocks,
        vec![
            Block::paragraph("text"),
            Block::paragraph("<https://example.com>"),
        ]
    );
}

#[test]
fn test_bold_contains_italic_markers() {
    let segments = format_inline("**bold *nested* text**");
    assert_eq!(
        segments,
        vec![InlineSegment::Bold("bold *nested* text".into())]
    );
}

#[test]
fn test_code_is_not_reformatted() {
    let segments = format_inline("run `a **b** c` now");
    assert_eq!(
        segments,
        vec![
            InlineSegment::plain("run "),
            InlineSegment::Code("a **b** c".into()),
            InlineSegment::plain(" now"),
        ]
    );
}

#[test]
fn test_link_segment() {
    let segments = format_inline("see [docs](https://example.com/docs) for *more*");
    assert_eq!(
        segments,
        vec![
            InlineSegment::plain("see "),
            InlineSegment::link("docs", "https://example.com/docs"),
            InlineSegment::plain(" for "),
            InlineSegment::Italic("more".into()),
        ]
    );
}

#[test]
fn test_unmatched_markers_stay_plain() {
    assert_eq!(
        format_inline("2 + 3 = 5 and **open"),
        vec![InlineSegment::plain("2 + 3 = 5 and **open")]
    );
}

fn plain_line() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 ,.;:!?()]{0,40}"
}

proptest! {
    #[test]
    fn prop_plain_lines_become_paragraphs(
        lines in prop::collection::vec((plain_line(), any::<bool>()), 1..20)
    ) {
        let mut md = String::new();
        for (line, blank_after) in &lines {
            md.push_str(line);
            md.push('\n');
            if *blank_after {
                md.push('\n');
            }
        }

        let paragraphs: Vec<String> = parse(&md)
            .into_iter()
            .filter_map(|b| match b {
                Block::Paragraph { text } => Some(text),
                Block::BlankSeparator => None,
                other => panic!("unexpected block {:?}", other),
            })
            .collect();
        let expected: Vec<String> = lines.iter().map(|(l, _)| l.trim().to_string()).collect();
        prop_assert_eq!(paragraphs, expected);
    }

    #[test]
    fn prop_bold_segment_is_exact(
        before in "[a-z ]{0,12}",
        bold in "[a-z][a-z ]{0,10}[a-z]",
        after in "[a-z ]{0,12}",
    ) {
        let line = format!("{}**{}**{}", before, bold, after);
        let segments = format_inline(&line);

        let bolds: Vec<&InlineSegment> = segments
            .iter()
            .filter(|s| matches!(s, InlineSegment::Bold(_)))
            .collect();
        let expected_bold = InlineSegment::Bold(bold.clone());
        prop_assert_eq!(bolds, vec![&expected_bold]);
        prop_assert_eq!(visible_text(&segments), format!("{}{}{}", before, bold, after));
    }

    #[test]
    fn prop_visible_text_never_grows(line in "[a-z *`]{0,40}") {
        let segments = format_inline(&line);
        let visible = visible_text(&segments);
        prop_assert!(visible.chars().count() <= line.chars().count());
    }

    #[test]
    fn prop_parse_is_deterministic(md in "[a-z#>*`\\- \n]{0,200}") {
        prop_assert_eq!(parse(&md), parse(&md));
    }
}
