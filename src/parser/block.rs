//! Line-oriented block parser.
//!
//! Each line is classified on its own; the only state carried between
//! lines is whether a code fence is open and the lines collected so far.
//! Rules are tried in a fixed order:
//!
//! 1. HTML comments and bare tag lines are dropped.
//! 2. Blank lines become separators (dropped inside code).
//! 3. Fences open and close code blocks; fenced lines are kept verbatim.
//! 4. Headings, bullets, numbered items and quotes by prefix.
//! 5. Everything else is a paragraph line.

use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;

use super::options::{ListNesting, ParseOptions};
use crate::model::Block;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,4}) (.+)$").expect("valid heading pattern"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[*+\-] (.+)$").expect("valid bullet pattern"));
static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\. (.+)$").expect("valid numbered pattern"));
static BLOCKQUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^> (.+)$").expect("valid blockquote pattern"));
static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```(\w+)?$").expect("valid fence pattern"));

const FENCE_CLOSE: &str = "```";

/// Parse text into blocks with default options.
pub fn parse(text: &str) -> Vec<Block> {
    BlockParser::default().parse(text)
}

/// Markdown block parser.
#[derive(Debug, Clone, Default)]
pub struct BlockParser {
    options: ParseOptions,
}

impl BlockParser {
    /// Create a parser with the given options.
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse text into blocks.
    ///
    /// Deterministic and restartable: every call starts from a fresh state.
    /// A code fence still open at the end of input is discarded.
    pub fn parse(&self, text: &str) -> Vec<Block> {
        let mut state = ParseState::default();
        let mut blocks = Vec::new();

        for (number, line) in text.lines().enumerate() {
            self.parse_line(number + 1, line, &mut state, &mut blocks);
        }

        if let Some(fence) = state.open_fence {
            warn!(
                "code fence opened on line {} is never closed; discarding {} line(s)",
                fence,
                state.code_lines.len()
            );
        }

        blocks
    }

    fn parse_line(
        &self,
        number: usize,
        raw: &str,
        state: &mut ParseState,
        blocks: &mut Vec<Block>,
    ) {
        let line = raw.trim_end();

        if is_markup_line(line) {
            debug!("line {}: dropping markup line", number);
            return;
        }

        if line.is_empty() {
            if state.open_fence.is_none() {
                blocks.push(Block::BlankSeparator);
            } else if self.options.preserve_code_blank_lines {
                state.code_lines.push(String::new());
            }
            return;
        }

        let stripped = line.trim_start();

        if state.open_fence.is_some() {
            if stripped == FENCE_CLOSE {
                state.open_fence = None;
                let lines = std::mem::take(&mut state.code_lines);
                if lines.iter().all(|l| l.trim().is_empty()) {
                    debug!("line {}: dropping empty code block", number);
                } else {
                    blocks.push(Block::CodeBlock { lines });
                }
            } else {
                state.code_lines.push(line.to_string());
            }
            return;
        }

        if FENCE_OPEN.is_match(stripped) {
            state.open_fence = Some(number);
            state.code_lines.clear();
            return;
        }

        blocks.push(self.classify(number, line, stripped));
    }

    fn classify(&self, number: usize, line: &str, stripped: &str) -> Block {
        if let Some(caps) = HEADING.captures(stripped) {
            let level = caps[1].len() as u8;
            return Block::heading(level, caps[2].trim());
        }

        if let Some(caps) = BULLET.captures(stripped) {
            return Block::BulletItem {
                level: self.nesting_level(number, line),
                text: caps[1].to_string(),
            };
        }

        if let Some(caps) = NUMBERED.captures(stripped) {
            return Block::NumberedItem {
                level: self.nesting_level(number, line),
                ordinal: caps[1].to_string(),
                text: caps[2].to_string(),
            };
        }

        if let Some(caps) = BLOCKQUOTE.captures(stripped) {
            return Block::quote(&caps[1]);
        }

        Block::paragraph(stripped)
    }

    /// Nesting level from the leading whitespace of the unstripped line.
    fn nesting_level(&self, number: usize, line: &str) -> u8 {
        if self.options.list_nesting == ListNesting::Flat {
            return 0;
        }

        let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
        if indent.contains('\t') {
            debug!("line {}: tab in list indentation, using level 0", number);
            return 0;
        }

        let level = indent.chars().count() / self.options.indent_unit.max(1);
        level.min(self.options.max_list_level as usize) as u8
    }
}

#[derive(Debug, Default)]
struct ParseState {
    /// Line number of the open fence, if inside code
    open_fence: Option<usize>,
    code_lines: Vec<String>,
}

/// HTML comments and lines that are a single tag, but not autolinks.
fn is_markup_line(line: &str) -> bool {
    line.starts_with("<!--")
        || (line.starts_with('<') && line.ends_with('>') && !line.starts_with("<http"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings() {
        let blocks = parse("# One\n## Two\n### Three\n#### Four\n##### Five");
        assert_eq!(
            blocks,
            vec![
                Block::heading(1, "One"),
                Block::heading(2, "Two"),
                Block::heading(3, "Three"),
                Block::heading(4, "Four"),
                Block::paragraph("##### Five"),
            ]
        );
    }

    #[test]
    fn test_heading_requires_space() {
        assert_eq!(parse("#hashtag"), vec![Block::paragraph("#hashtag")]);
    }

    #[test]
    fn test_bullet_nesting() {
        let blocks = parse("- item one\n  - nested item\n    + deeper\n* star");
        assert_eq!(
            blocks,
            vec![
                Block::bullet(0, "item one"),
                Block::bullet(1, "nested item"),
                Block::bullet(2, "deeper"),
                Block::bullet(0, "star"),
            ]
        );
    }

    #[test]
    fn test_odd_indentation_rounds_down() {
        assert_eq!(parse("   - three spaces"), vec![Block::bullet(1, "three spaces")]);
    }

    #[test]
    fn test_tab_indentation_is_flat() {
        assert_eq!(parse("\t- tabbed"), vec![Block::bullet(0, "tabbed")]);
    }

    #[test]
    fn test_flat_lists_option() {
        let parser = BlockParser::new(ParseOptions::new().flat_lists());
        assert_eq!(parser.parse("    - deep"), vec![Block::bullet(0, "deep")]);
    }

    #[test]
    fn test_level_is_capped() {
        let line = format!("{}- far", " ".repeat(40));
        assert_eq!(parse(&line), vec![Block::bullet(8, "far")]);
    }

    #[test]
    fn test_numbered_items() {
        let blocks = parse("1. first\n  10. nested\n007. padded");
        assert_eq!(
            blocks,
            vec![
                Block::numbered(0, "1", "first"),
                Block::numbered(1, "10", "nested"),
                Block::numbered(0, "007", "padded"),
            ]
        );
    }

    #[test]
    fn test_bold_line_is_not_bullet() {
        assert_eq!(
            parse("**Key:** value"),
            vec![Block::paragraph("**Key:** value")]
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(parse("> quoted"), vec![Block::quote("quoted")]);
        assert_eq!(parse(">no space"), vec![Block::paragraph(">no space")]);
    }

    #[test]
    fn test_markup_lines_dropped() {
        let blocks = parse("<!-- comment -->\n<div>\ntext\n<https://example.com>");
        assert_eq!(
            blocks,
            vec![
                Block::paragraph("text"),
                Block::paragraph("<https://example.com>"),
            ]
        );
    }

    #[test]
    fn test_code_block() {
        let blocks = parse("```rust\nfn main() {\n    run();\n}\n```\nafter");
        assert_eq!(
            blocks,
            vec![
                Block::code(["fn main() {", "    run();", "}"]),
                Block::paragraph("after"),
            ]
        );
    }

    #[test]
    fn test_code_block_content_not_classified() {
        let blocks = parse("```\n# not heading\n- not bullet\n```");
        assert_eq!(blocks, vec![Block::code(["# not heading", "- not bullet"])]);
    }

    #[test]
    fn test_tagged_fence_inside_code_is_content() {
        let blocks = parse("```\n```python\n```");
        assert_eq!(blocks, vec![Block::code(["```python"])]);
    }

    #[test]
    fn test_code_blank_lines_dropped_by_default() {
        let blocks = parse("```\na\n\nb\n```");
        assert_eq!(blocks, vec![Block::code(["a", "b"])]);

        let parser = BlockParser::new(ParseOptions::new().preserve_code_blank_lines(true));
        assert_eq!(
            parser.parse("```\na\n\nb\n```"),
            vec![Block::code(["a", "", "b"])]
        );
    }

    #[test]
    fn test_unterminated_fence_discarded() {
        let blocks = parse("before\n```\none\ntwo\nthree");
        assert_eq!(blocks, vec![Block::paragraph("before")]);
    }

    #[test]
    fn test_blank_lines() {
        let blocks = parse("a\n\n   \nb");
        assert_eq!(
            blocks,
            vec![
                Block::paragraph("a"),
                Block::BlankSeparator,
                Block::BlankSeparator,
                Block::paragraph("b"),
            ]
        );
    }

    #[test]
    fn test_crlf_input() {
        assert_eq!(
            parse("# T\r\n- x\r\n"),
            vec![Block::heading(1, "T"), Block::bullet(0, "x")]
        );
    }

    #[test]
    fn test_parse_is_restartable() {
        let parser = BlockParser::default();
        let first = parser.parse("```\nopen");
        let second = parser.parse("text");
        assert!(first.is_empty());
        assert_eq!(second, vec![Block::paragraph("text")]);
    }

    #[test]
    fn test_empty_fence_is_skipped() {
        assert_eq!(
            parse("before\n```\n```\nafter"),
            vec![Block::paragraph("before"), Block::paragraph("after")]
        );

        let keep_blanks = BlockParser::new(ParseOptions::new().preserve_code_blank_lines(true));
        assert_eq!(keep_blanks.parse("```\n\n   \n```"), vec![]);
        assert_eq!(
            keep_blanks.parse("```\n\nx\n```"),
            vec![Block::code(["", "x"])]
        );
    }
}
