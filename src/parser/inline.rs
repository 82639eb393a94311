//! Inline formatting resolver.
//!
//! Spans are extracted by byte offset in four passes: code, bold, italic,
//! link. Each pass only searches the gaps left by earlier passes, so code
//! contents are never reformatted and the inside of a bold span is never
//! read as italic. The claimed spans are then materialized left to right,
//! with the text between them as plain segments.

use std::sync::LazyLock;

use log::warn;
use regex::Regex;

use crate::error::InlineFault;
use crate::model::InlineSegment;

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`(.+?)`").expect("valid code span pattern"));
static BOLD_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold span pattern"));
static ITALIC_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.+?)\*").expect("valid italic span pattern"));
static LINK_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.+?)\]\((.+?)\)").expect("valid link span pattern"));

/// Kind of an extracted span, in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpanKind {
    Code,
    Bold,
    Italic,
    Link,
}

impl SpanKind {
    const PASSES: [SpanKind; 4] = [
        SpanKind::Code,
        SpanKind::Bold,
        SpanKind::Italic,
        SpanKind::Link,
    ];

    fn pattern(self) -> &'static Regex {
        match self {
            SpanKind::Code => &CODE_SPAN,
            SpanKind::Bold => &BOLD_SPAN,
            SpanKind::Italic => &ITALIC_SPAN,
            SpanKind::Link => &LINK_SPAN,
        }
    }
}

/// A claimed byte range of the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Span {
    pub kind: SpanKind,
    /// Whole match including delimiters
    pub start: usize,
    pub end: usize,
    /// Content between the delimiters
    pub content: (usize, usize),
    /// Link target
    pub url: Option<(usize, usize)>,
}

/// Split one line into formatted segments.
///
/// Never fails: if the spans cannot be resolved, the line comes back as a
/// single plain segment with the markup stripped.
pub fn format_inline(line: &str) -> Vec<InlineSegment> {
    try_format_inline(line).unwrap_or_else(|fault| {
        warn!("inline formatting fell back to plain text: {}", fault);
        fallback_segments(line)
    })
}

/// Split one line into formatted segments, reporting resolution faults.
pub fn try_format_inline(line: &str) -> Result<Vec<InlineSegment>, InlineFault> {
    resolve_spans(line, extract_spans(line))
}

/// Remove inline markup, keeping link URLs in parentheses.
pub fn strip_markup(line: &str) -> String {
    let text = LINK_SPAN.replace_all(line, "$1 ($2)");
    text.replace("**", "").replace(['*', '`'], "")
}

fn fallback_segments(line: &str) -> Vec<InlineSegment> {
    let text = strip_markup(line);
    if text.is_empty() {
        Vec::new()
    } else {
        vec![InlineSegment::Plain(text)]
    }
}

fn extract_spans(line: &str) -> Vec<Span> {
    let mut claimed: Vec<Span> = Vec::new();

    for kind in SpanKind::PASSES {
        let mut found = Vec::new();
        for (gap_start, gap_end) in gaps(line.len(), &claimed) {
            let gap = &line[gap_start..gap_end];
            for caps in kind.pattern().captures_iter(gap) {
                let (Some(whole), Some(content)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                found.push(Span {
                    kind,
                    start: gap_start + whole.start(),
                    end: gap_start + whole.end(),
                    content: (gap_start + content.start(), gap_start + content.end()),
                    url: caps
                        .get(2)
                        .map(|url| (gap_start + url.start(), gap_start + url.end())),
                });
            }
        }
        claimed.extend(found);
        claimed.sort_by_key(|span| span.start);
    }

    claimed
}

/// Unclaimed byte ranges between sorted spans.
fn gaps(len: usize, claimed: &[Span]) -> Vec<(usize, usize)> {
    let mut result = Vec::with_capacity(claimed.len() + 1);
    let mut cursor = 0;
    for span in claimed {
        if span.start > cursor {
            result.push((cursor, span.start));
        }
        cursor = cursor.max(span.end);
    }
    if cursor < len {
        result.push((cursor, len));
    }
    result
}

/// Materialize spans into segments; text between spans becomes plain.
pub(crate) fn resolve_spans(
    line: &str,
    mut spans: Vec<Span>,
) -> Result<Vec<InlineSegment>, InlineFault> {
    spans.sort_by_key(|span| span.start);

    let mut segments = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = 0;

    for span in &spans {
        check_bounds(line, span.start, span.end)?;
        check_bounds(line, span.content.0, span.content.1)?;
        if let Some((url_start, url_end)) = span.url {
            check_bounds(line, url_start, url_end)?;
        }
        if span.start < cursor {
            return Err(InlineFault::Overlap {
                start: span.start,
                end: span.end,
                previous_end: cursor,
            });
        }

        if span.start > cursor {
            segments.push(InlineSegment::Plain(line[cursor..span.start].to_string()));
        }

        let content = line[span.content.0..span.content.1].to_string();
        segments.push(match (span.kind, span.url) {
            (SpanKind::Code, _) => InlineSegment::Code(content),
            (SpanKind::Bold, _) => InlineSegment::Bold(content),
            (SpanKind::Italic, _) => InlineSegment::Italic(content),
            (SpanKind::Link, Some((url_start, url_end))) => InlineSegment::Link {
                text: content,
                url: line[url_start..url_end].to_string(),
            },
            (SpanKind::Link, None) => InlineSegment::Plain(line[span.start..span.end].to_string()),
        });
        cursor = span.end;
    }

    if cursor < line.len() {
        segments.push(InlineSegment::Plain(line[cursor..].to_string()));
    }

    Ok(segments)
}

fn check_bounds(line: &str, start: usize, end: usize) -> Result<(), InlineFault> {
    if start > end
        || end > line.len()
        || !line.is_char_boundary(start)
        || !line.is_char_boundary(end)
    {
        return Err(InlineFault::Boundary {
            start,
            end,
            len: line.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use InlineSegment::{Bold, Code, Italic, Plain};

    fn plain(s: &str) -> InlineSegment {
        Plain(s.to_string())
    }

    #[test]
    fn test_bold() {
        assert_eq!(
            format_inline("Hello **world**."),
            vec![plain("Hello "), Bold("world".into()), plain(".")]
        );
    }

    #[test]
    fn test_italic_and_code() {
        assert_eq!(
            format_inline("an *emphasis* and `code`"),
            vec![
                plain("an "),
                Italic("emphasis".into()),
                plain(" and "),
                Code("code".into()),
            ]
        );
    }

    #[test]
    fn test_nested_italic_stays_in_bold() {
        assert_eq!(
            format_inline("**bold *nested* text**"),
            vec![Bold("bold *nested* text".into())]
        );
    }

    #[test]
    fn test_code_protects_markup() {
        assert_eq!(
            format_inline("run `a **b** c` now"),
            vec![plain("run "), Code("a **b** c".into()), plain(" now")]
        );
    }

    #[test]
    fn test_link() {
        assert_eq!(
            format_inline("see [docs](https://a.io) here"),
            vec![
                plain("see "),
                InlineSegment::link("docs", "https://a.io"),
                plain(" here"),
            ]
        );
    }

    #[test]
    fn test_unterminated_markers_stay_literal() {
        assert_eq!(format_inline("**open and `tick"), vec![plain("**open and `tick")]);
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(
            format_inline("ação **média** é"),
            vec![plain("ação "), Bold("média".into()), plain(" é")]
        );
    }

    #[test]
    fn test_empty_line() {
        assert!(format_inline("").is_empty());
    }

    #[test]
    fn test_overlapping_spans_fault() {
        let line = "abcdef";
        let spans = vec![
            Span {
                kind: SpanKind::Bold,
                start: 0,
                end: 4,
                content: (1, 3),
                url: None,
            },
            Span {
                kind: SpanKind::Italic,
                start: 2,
                end: 6,
                content: (3, 5),
                url: None,
            },
        ];
        assert!(matches!(
            resolve_spans(line, spans),
            Err(InlineFault::Overlap { previous_end: 4, .. })
        ));
    }

    #[test]
    fn test_boundary_fault() {
        let line = "é*x*";
        let spans = vec![Span {
            kind: SpanKind::Italic,
            start: 1,
            end: 4,
            content: (2, 3),
            url: None,
        }];
        assert!(matches!(
            resolve_spans(line, spans),
            Err(InlineFault::Boundary { .. })
        ));
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup("**a** *b* `c` [d](http://e)"),
            "a b c d (http://e)"
        );
    }
}
