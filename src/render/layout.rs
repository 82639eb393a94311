//! Per-block layout.
//!
//! Each block is wrapped by character count at a width chosen for its
//! kind, narrowed to what fits on the page, and drawn as one cell row per
//! wrapped line. A block either draws completely or returns the
//! [`RenderFault`] that stopped it; the caller rewinds what it drew (see
//! [`PageRenderer::atomic`]) and draws [`layout_fallback`] in its place.

use log::warn;

use super::page::{CellOptions, PageRenderer, LEFT_MARGIN, RIGHT_MARGIN};
use super::style::{Color, TextStyle};
use super::wrap::{wrap_segments, wrap_text, Run, RunKind};
use super::writer::PaginatedWriter;
use crate::error::RenderFault;
use crate::model::{visible_text, Block, InlineSegment, Point, Rect};
use crate::parser::format_inline;
use crate::sanitize::{SanitizeOptions, Sanitizer};

const PARAGRAPH_WIDTH: usize = 60;
const FORMATTED_PARAGRAPH_WIDTH: usize = 65;
const BULLET_WIDTH: usize = 60;
const NUMBERED_WIDTH: usize = 58;
const QUOTE_WIDTH: usize = 50;
const CODE_WIDTH: usize = 80;
const MIN_WRAP_WIDTH: usize = 20;

/// Deepest list level that still gets its own indentation.
const MAX_LIST_LEVEL: u8 = 8;
const LIST_INDENT_STEP: f32 = 5.0;
const BULLET_MARKER_WIDTH: f32 = 5.0;
const NUMBER_MARKER_WIDTH: f32 = 8.0;

const QUOTE_LEFT: f32 = 20.0;
const QUOTE_RULE_X: f32 = 18.0;
const QUOTE_RULE_WIDTH: f32 = 0.5;

const CODE_LEFT: f32 = 10.0;
const FALLBACK_CHARS: usize = 80;

/// What a block layout drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Drawn {
    /// Text rows drawn
    pub lines: usize,
}

/// Draw one block at the cursor.
pub fn layout_block<W: PaginatedWriter>(
    page: &mut PageRenderer<W>,
    block: &Block,
) -> Result<Drawn, RenderFault> {
    match block {
        Block::Heading { level, text } => heading(page, *level, text),
        Block::Paragraph { text } => paragraph(page, text),
        Block::BulletItem { level, text } => {
            list_item(page, *level, "-", BULLET_MARKER_WIDTH, BULLET_WIDTH, text)
        }
        Block::NumberedItem {
            level,
            ordinal,
            text,
        } => list_item(
            page,
            *level,
            &format!("{}.", ordinal),
            NUMBER_MARKER_WIDTH,
            NUMBERED_WIDTH,
            text,
        ),
        Block::Blockquote { text } => blockquote(page, text),
        Block::CodeBlock { lines } => code_block(page, lines),
        Block::BlankSeparator => {
            page.ln(5.0);
            Ok(Drawn::default())
        }
    }
}

/// Draw a block as one line of raw text, unstyled and truncated.
///
/// Characters the sanitizer would reject are replaced, so the fallback
/// only fails on device errors.
pub fn layout_fallback<W: PaginatedWriter>(
    page: &mut PageRenderer<W>,
    block: &Block,
) -> Result<(), RenderFault> {
    if page.x() > LEFT_MARGIN {
        page.ln(5.0);
    }

    let text = fallback_text(&block.raw_text());
    if text.is_empty() {
        return Ok(());
    }

    page.set_x(LEFT_MARGIN);
    page.scoped_style(TextStyle::helvetica(9.0), |page| {
        page.cell(0.0, 5.0, &text, CellOptions::new()).map(|_| ())
    })
}

fn heading<W: PaginatedWriter>(
    page: &mut PageRenderer<W>,
    level: u8,
    text: &str,
) -> Result<Drawn, RenderFault> {
    let size = match level {
        1 => 18.0,
        2 => 16.0,
        3 => 14.0,
        _ => 12.0,
    };
    let style = TextStyle::helvetica(size).bold();

    if level > 1 {
        page.ln(5.0);
    }

    let visible = visible_text(&format_inline(text));
    let width = style
        .chars_fitting(page.content_width() - 2.0)
        .max(MIN_WRAP_WIDTH);
    let mut lines = wrap_text(visible.trim(), width);
    if lines.is_empty() {
        lines.push(String::new());
    }

    page.set_x(LEFT_MARGIN);
    page.scoped_style(style, |page| {
        for line in &lines {
            page.cell(0.0, 10.0, line, CellOptions::new())?;
        }
        Ok::<_, RenderFault>(())
    })?;

    if level == 1 {
        page.ln(5.0);
    }

    Ok(Drawn { lines: lines.len() })
}

fn paragraph<W: PaginatedWriter>(
    page: &mut PageRenderer<W>,
    text: &str,
) -> Result<Drawn, RenderFault> {
    let segments = format_inline(text);
    let base = TextStyle::helvetica(9.0);
    let width = if segments.iter().all(InlineSegment::is_plain) {
        PARAGRAPH_WIDTH
    } else {
        FORMATTED_PARAGRAPH_WIDTH
    };
    let width = fitted_width(page, LEFT_MARGIN, base, width);

    let lines = wrap_segments(&segments, width);
    for runs in &lines {
        page.set_x(LEFT_MARGIN);
        draw_runs(page, runs, base, 5.0)?;
    }

    page.ln(3.0);
    Ok(Drawn { lines: lines.len() })
}

fn list_item<W: PaginatedWriter>(
    page: &mut PageRenderer<W>,
    level: u8,
    marker: &str,
    marker_width: f32,
    base_width: usize,
    text: &str,
) -> Result<Drawn, RenderFault> {
    let level = level.min(MAX_LIST_LEVEL);
    let indent = LEFT_MARGIN + LIST_INDENT_STEP * f32::from(level);
    let base = TextStyle::helvetica(10.0);
    let width = base_width
        .saturating_sub(5 * usize::from(level))
        .max(MIN_WRAP_WIDTH);
    let width = fitted_width(page, indent + marker_width, base, width);

    let lines = wrap_segments(&format_inline(text), width);

    page.set_x(indent);
    page.scoped_style(base, |page| {
        page.cell(marker_width, 7.0, marker, CellOptions::new().right())
            .map(|_| ())
    })?;

    if lines.is_empty() {
        page.ln(7.0);
    }
    for (index, runs) in lines.iter().enumerate() {
        if index > 0 {
            page.set_x(indent + marker_width);
        }
        draw_runs(page, runs, base, 7.0)?;
    }

    Ok(Drawn { lines: lines.len() })
}

fn blockquote<W: PaginatedWriter>(
    page: &mut PageRenderer<W>,
    text: &str,
) -> Result<Drawn, RenderFault> {
    let base = TextStyle::helvetica(10.0).italic();
    let width = fitted_width(page, QUOTE_LEFT, base, QUOTE_WIDTH);
    let lines = wrap_segments(&format_inline(text), width);

    for runs in &lines {
        page.set_x(QUOTE_LEFT);
        // One rule segment per row, so a page break splits the rule too.
        if let Some(row) = draw_runs(page, runs, base, 5.0)? {
            page.line(
                Point::new(QUOTE_RULE_X, row.y),
                Point::new(QUOTE_RULE_X, row.bottom()),
                QUOTE_RULE_WIDTH,
                Color::gray(200),
            )?;
        }
    }

    page.ln(3.0);
    Ok(Drawn { lines: lines.len() })
}

fn code_block<W: PaginatedWriter>(
    page: &mut PageRenderer<W>,
    lines: &[String],
) -> Result<Drawn, RenderFault> {
    let style = TextStyle::courier(8.0).with_color(Color::gray(50));
    let width = page.geometry().width - 2.0 * CODE_LEFT;
    let rows = code_rows(lines, CODE_WIDTH.min(style.chars_fitting(width)).max(1));
    let options = CellOptions::new().filled(Color::gray(240));

    page.ln(3.0);
    page.scoped_style(style, |page| {
        for row in &rows {
            page.set_x(CODE_LEFT);
            if let Err(fault) = page.atomic(|page| page.cell(width, 5.0, row, options)) {
                warn!("code line redrawn with replacement characters: {}", fault);
                page.set_x(CODE_LEFT);
                page.cell(width, 5.0, &filter_text(row), options)?;
            }
        }
        Ok::<_, RenderFault>(())
    })?;
    page.ln(3.0);

    Ok(Drawn { lines: rows.len() })
}

/// Split code lines into rows of at most `width` characters: long lines
/// are wrapped, tabs expanded, and anything still too long is cut with an
/// ellipsis.
fn code_rows(lines: &[String], width: usize) -> Vec<String> {
    let mut rows = Vec::with_capacity(lines.len());
    for line in lines {
        if line.chars().count() > width {
            rows.extend(wrap_text(line, width));
        } else {
            rows.push(line.clone());
        }
    }

    rows.into_iter()
        .map(|row| truncate(&row.replace('\t', "    ").replace('\x0c', " "), width))
        .collect()
}

/// Narrow a wrap width so a row starting at `x` ends before the right
/// margin, measured in the widest face a run of `base` can take.
fn fitted_width<W: PaginatedWriter>(
    page: &PageRenderer<W>,
    x: f32,
    base: TextStyle,
    width: usize,
) -> usize {
    let available = page.geometry().width - RIGHT_MARGIN - x;
    width.min(base.bold().chars_fitting(available)).max(1)
}

/// Draw styled runs left to right on one row, then break the line.
///
/// Returns the area of the row, or `None` for an empty row.
fn draw_runs<W: PaginatedWriter>(
    page: &mut PageRenderer<W>,
    runs: &[Run],
    base: TextStyle,
    height: f32,
) -> Result<Option<Rect>, RenderFault> {
    let mut row: Option<Rect> = None;

    for run in runs {
        let style = run_style(base, &run.kind);
        let link = match &run.kind {
            RunKind::Link(url) => Some(url.as_str()),
            _ => None,
        };
        let rect = page.scoped_style(style, |page| {
            page.cell(
                style.text_width(&run.text),
                height,
                &run.text,
                CellOptions::new().right().tight().with_link(link),
            )
        })?;
        row.get_or_insert(rect);
    }

    page.ln(height);
    Ok(row)
}

fn run_style(base: TextStyle, kind: &RunKind) -> TextStyle {
    match kind {
        RunKind::Plain => base,
        RunKind::Bold => base.bold(),
        RunKind::Italic => base.italic(),
        RunKind::Code => TextStyle::courier(base.size - 1.0).with_color(base.color),
        RunKind::Link(_) => base.with_color(Color::BLUE),
    }
}

fn fallback_text(raw: &str) -> String {
    let flat: String = raw
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    truncate(&filter_text(flat.trim()), FALLBACK_CHARS)
}

fn filter_text(text: &str) -> String {
    Sanitizer::new(SanitizeOptions::filter_only()).filter_chars(text)
}

/// Cut to `limit` characters, ending with "..." when shortened.
fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let head: String = text.chars().take(limit.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
