//! Pagination layer between the layout engine and a [`PaginatedWriter`].
//!
//! [`PageRenderer`] owns the [`PageCursor`], starts new pages when a cell
//! would cross the bottom margin, and runs the page header and footer
//! through a [`PageDecorator`] on every page.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::NaiveDate;

use super::options::FooterLabels;
use super::style::{Align, Color, TextStyle};
use super::writer::{DocumentInfo, PaginatedWriter};
use crate::error::{Error, RenderFault, Result};
use crate::model::{PageGeometry, Point, Rect};

/// Left edge of body text.
pub const LEFT_MARGIN: f32 = 10.0;
/// Gap kept free on the right of full-width cells.
pub const RIGHT_MARGIN: f32 = 10.0;

const CELL_PADDING: f32 = 1.0;
const EPSILON: f32 = 0.01;
const FALLBACK_DATE_FORMAT: &str = "%d/%m/%Y";

/// Mutable drawing state for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor {
    pub x: f32,
    pub y: f32,
    /// Style applied to the next cell
    pub style: TextStyle,
    /// Current page, 1-based; 0 before the first page
    pub page: u32,
}

impl PageCursor {
    fn new() -> Self {
        Self {
            x: LEFT_MARGIN,
            y: 0.0,
            style: TextStyle::default(),
            page: 0,
        }
    }
}

/// Where the cursor goes after a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Advance {
    /// Back to the left margin, one cell height down
    #[default]
    NextLine,
    /// Right after the cell, same row
    Right,
}

/// Options for a single cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellOptions<'a> {
    pub align: Align,
    pub fill: Option<Color>,
    pub advance: Advance,
    /// Draw text flush with the cell edge instead of padded
    pub tight: bool,
    /// Link target for the cell area
    pub link: Option<&'a str>,
}

impl<'a> CellOptions<'a> {
    /// Left-aligned cell followed by a line break.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    pub fn filled(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    /// Keep the cursor on the same row after the cell.
    pub fn right(mut self) -> Self {
        self.advance = Advance::Right;
        self
    }

    pub fn tight(mut self) -> Self {
        self.tight = true;
        self
    }

    pub fn with_link(mut self, url: Option<&'a str>) -> Self {
        self.link = url;
        self
    }
}

/// Drawing surface handed to page decorators.
pub trait PageSurface {
    /// Page geometry.
    fn geometry(&self) -> PageGeometry;

    /// Current page number, 1-based.
    fn page_number(&self) -> u32;

    /// Move to a vertical position; negative values count from the bottom.
    fn set_y(&mut self, y: f32);

    /// Draw a full-width text cell and move to the next line.
    fn text_cell(
        &mut self,
        height: f32,
        text: &str,
        style: TextStyle,
        align: Align,
    ) -> std::result::Result<(), RenderFault>;
}

/// Per-page header and footer.
pub trait PageDecorator {
    /// Draw the header at the top of a new page.
    fn header(&self, page: &mut dyn PageSurface) -> std::result::Result<(), RenderFault>;

    /// Draw the footer before a page is closed.
    fn footer(&self, page: &mut dyn PageSurface) -> std::result::Result<(), RenderFault>;
}

/// Centered title header; page number and generation date footer.
#[derive(Debug, Clone)]
pub struct StandardDecorations {
    title: String,
    page_label: String,
    date_line: String,
}

impl StandardDecorations {
    /// Create decorations for a document.
    pub fn new(title: impl Into<String>, generated_on: NaiveDate, labels: &FooterLabels) -> Self {
        Self {
            title: title.into(),
            page_label: labels.page.clone(),
            date_line: format!(
                "{}: {}",
                labels.generated,
                format_date(generated_on, &labels.date_format)
            ),
        }
    }
}

impl PageDecorator for StandardDecorations {
    fn header(&self, page: &mut dyn PageSurface) -> std::result::Result<(), RenderFault> {
        page.text_cell(
            10.0,
            &self.title,
            TextStyle::helvetica(12.0).bold(),
            Align::Center,
        )
    }

    fn footer(&self, page: &mut dyn PageSurface) -> std::result::Result<(), RenderFault> {
        let margin = page.geometry().margin;
        let style = TextStyle::helvetica(8.0).italic();
        let number = format!("{} {}", self.page_label, page.page_number());

        page.set_y(-margin);
        page.text_cell(10.0, &number, style, Align::Center)?;
        page.set_y(-margin + 5.0);
        page.text_cell(5.0, &self.date_line, style, Align::Center)
    }
}

/// Format a date, falling back to day/month/year on a bad format string.
fn format_date(date: NaiveDate, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        log::warn!("invalid date format {:?}, using {}", format, FALLBACK_DATE_FORMAT);
        out.clear();
        let _ = write!(out, "{}", date.format(FALLBACK_DATE_FORMAT));
    }
    out
}

#[derive(Debug, Clone, Copy)]
enum Decoration {
    Header,
    Footer,
}

/// Stateful page renderer, generic over the output device.
pub struct PageRenderer<W: PaginatedWriter> {
    writer: W,
    geometry: PageGeometry,
    cursor: PageCursor,
    decorator: Arc<dyn PageDecorator + Send + Sync>,
    /// Y where body content starts on the current page
    body_top: f32,
    in_decoration: bool,
    fatal: Option<Error>,
}

impl<W: PaginatedWriter> PageRenderer<W> {
    /// Create a renderer. Nothing is drawn until [`start`](Self::start).
    pub fn new(
        writer: W,
        geometry: PageGeometry,
        decorator: Arc<dyn PageDecorator + Send + Sync>,
    ) -> Self {
        Self {
            writer,
            geometry,
            cursor: PageCursor::new(),
            decorator,
            body_top: geometry.margin,
            in_decoration: false,
            fatal: None,
        }
    }

    /// Record document info and open the first page.
    pub fn start(&mut self, info: &DocumentInfo) -> Result<()> {
        self.writer.set_document_info(info);
        if self.add_page().is_err() {
            return Err(self.take_fatal().unwrap_or_else(|| {
                Error::Render("failed to open the first page".to_string())
            }));
        }
        Ok(())
    }

    /// Current cursor state.
    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub fn page_number(&self) -> u32 {
        self.cursor.page
    }

    pub fn x(&self) -> f32 {
        self.cursor.x
    }

    pub fn y(&self) -> f32 {
        self.cursor.y
    }

    pub fn set_x(&mut self, x: f32) {
        self.cursor.x = x;
    }

    /// Move to a vertical position and back to the left margin.
    ///
    /// Negative values are measured from the bottom edge.
    pub fn set_y(&mut self, y: f32) {
        self.cursor.x = LEFT_MARGIN;
        self.cursor.y = if y < 0.0 { self.geometry.height + y } else { y };
    }

    /// Line break: back to the left margin and down by `height`.
    pub fn ln(&mut self, height: f32) {
        self.cursor.x = LEFT_MARGIN;
        self.cursor.y += height;
    }

    /// Current text style.
    pub fn style(&self) -> TextStyle {
        self.cursor.style
    }

    /// Width between the margins.
    pub fn content_width(&self) -> f32 {
        self.geometry.width - LEFT_MARGIN - RIGHT_MARGIN
    }

    /// Run `f` with `style` active; the previous style is restored on
    /// every exit path, including errors.
    pub fn scoped_style<T>(&mut self, style: TextStyle, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.cursor.style, style);
        let result = f(self);
        self.cursor.style = saved;
        result
    }

    /// Run `f` as one unit of drawing.
    ///
    /// If `f` fails, everything it drew is removed from the writer and the
    /// cursor is put back where it was, page number included, so the caller
    /// can draw something else in the same place. Fatal errors are left as
    /// they are.
    pub fn atomic<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> std::result::Result<T, RenderFault>,
    ) -> std::result::Result<T, RenderFault> {
        let mark = self.writer.mark();
        let cursor = self.cursor;
        let body_top = self.body_top;

        let result = f(self);
        if result.is_err() && self.fatal.is_none() {
            self.writer.rewind(mark);
            self.cursor = cursor;
            self.body_top = body_top;
        }
        result
    }

    /// Draw a cell at the cursor with the current style.
    ///
    /// A `width` of zero or less extends the cell to the right margin. If
    /// the cell would cross the bottom margin, a new page is started first
    /// and the horizontal position is kept. Returns the area drawn.
    pub fn cell(
        &mut self,
        width: f32,
        height: f32,
        text: &str,
        options: CellOptions<'_>,
    ) -> std::result::Result<Rect, RenderFault> {
        if !self.in_decoration
            && self.cursor.y + height > self.geometry.break_trigger()
            && self.cursor.y > self.body_top + EPSILON
        {
            let x = self.cursor.x;
            self.add_page()?;
            self.cursor.x = x;
        }

        let available = self.geometry.width - RIGHT_MARGIN - self.cursor.x;
        let width = if width > 0.0 { width } else { available };
        if width <= 0.0 || self.cursor.x + width > self.geometry.width + EPSILON {
            return Err(RenderFault::Overflow { width, available });
        }

        let rect = Rect::new(self.cursor.x, self.cursor.y, width, height);
        if let Some(color) = options.fill {
            self.writer.fill_rect(rect, color)?;
        }

        if !text.is_empty() {
            let style = self.cursor.style;
            let padding = if options.tight { 0.0 } else { CELL_PADDING };
            let text_x = match options.align {
                Align::Left => rect.x + padding,
                Align::Center => rect.x + (width - style.text_width(text)) / 2.0,
            };
            let baseline = rect.y + 0.5 * height + 0.3 * style.size_mm();
            self.writer.draw_text(text_x, baseline, text, &style)?;

            if let Some(url) = options.link {
                self.writer.link(rect, url)?;
            }
        }

        match options.advance {
            Advance::Right => self.cursor.x += width,
            Advance::NextLine => {
                self.cursor.x = LEFT_MARGIN;
                self.cursor.y += height;
            }
        }

        Ok(rect)
    }

    /// Stroke a line on the current page.
    pub fn line(
        &mut self,
        from: Point,
        to: Point,
        width: f32,
        color: Color,
    ) -> std::result::Result<(), RenderFault> {
        self.writer.draw_line(from, to, width, color)
    }

    /// Close the current page and open a new one.
    ///
    /// Failures here are fatal for the document: they are recorded and
    /// surface from [`take_fatal`](Self::take_fatal) and
    /// [`finish`](Self::finish).
    pub fn add_page(&mut self) -> std::result::Result<(), RenderFault> {
        let style = self.cursor.style;

        if self.cursor.page > 0 {
            self.decorate(Decoration::Footer)?;
        }

        if let Err(fault) = self
            .writer
            .begin_page(self.geometry.width, self.geometry.height)
        {
            return Err(self.record_fatal("opening a page", fault));
        }
        self.cursor.page += 1;
        self.cursor.x = LEFT_MARGIN;
        self.cursor.y = self.geometry.margin;

        self.decorate(Decoration::Header)?;
        self.body_top = self.cursor.y;
        self.cursor.style = style;
        Ok(())
    }

    /// Take the fatal error recorded during pagination, if any.
    pub fn take_fatal(&mut self) -> Option<Error> {
        self.fatal.take()
    }

    /// Draw the last footer and produce the artifact and the page count.
    pub fn finish(mut self) -> Result<(Vec<u8>, u32)> {
        if let Some(err) = self.fatal.take() {
            return Err(err);
        }
        if self.cursor.page > 0 && self.decorate(Decoration::Footer).is_err() {
            if let Some(err) = self.fatal.take() {
                return Err(err);
            }
        }

        let pages = self.cursor.page;
        let bytes = self.writer.finish()?;
        Ok((bytes, pages))
    }

    fn decorate(&mut self, which: Decoration) -> std::result::Result<(), RenderFault> {
        let decorator = Arc::clone(&self.decorator);
        self.in_decoration = true;
        let result = match which {
            Decoration::Header => decorator.header(self),
            Decoration::Footer => decorator.footer(self),
        };
        self.in_decoration = false;

        result.map_err(|fault| {
            let context = match which {
                Decoration::Header => "drawing the page header",
                Decoration::Footer => "drawing the page footer",
            };
            self.record_fatal(context, fault)
        })
    }

    fn record_fatal(&mut self, context: &str, fault: RenderFault) -> RenderFault {
        if self.fatal.is_none() {
            self.fatal = Some(Error::Render(format!(
                "page {}: {} failed: {}",
                self.cursor.page, context, fault
            )));
        }
        fault
    }
}

impl<W: PaginatedWriter> PageSurface for PageRenderer<W> {
    fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    fn page_number(&self) -> u32 {
        self.cursor.page
    }

    fn set_y(&mut self, y: f32) {
        PageRenderer::set_y(self, y);
    }

    fn text_cell(
        &mut self,
        height: f32,
        text: &str,
        style: TextStyle,
        align: Align,
    ) -> std::result::Result<(), RenderFault> {
        let options = CellOptions {
            align,
            ..CellOptions::new()
        };
        self.scoped_style(style, |page| page.cell(0.0, height, text, options).map(|_| ()))
    }
}
