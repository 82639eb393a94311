//! Device capability used by the page renderer.

use super::style::{Color, TextStyle};
use crate::error::{RenderFault, Result};
use crate::model::{Point, Rect};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Document-level information recorded by the writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Document title
    pub title: String,
    /// Generation date, used instead of the wall clock
    pub created: NaiveDate,
    /// Producing application
    pub producer: String,
}

impl DocumentInfo {
    /// Create document info with this crate as producer.
    pub fn new(title: impl Into<String>, created: NaiveDate) -> Self {
        Self {
            title: title.into(),
            created,
            producer: format!("mdreport {}", crate::VERSION),
        }
    }
}

/// Position in a writer's output, taken with [`PaginatedWriter::mark`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterMark {
    /// Pages started so far
    pub pages: usize,
    /// Device-specific offset into the output of the last page
    pub offset: usize,
    /// Links on the last page
    pub links: usize,
}

/// A paginated output device.
///
/// Coordinates are millimetres from the top-left corner of the current page.
/// Implementations only draw; pagination, page decorations and style
/// restoration are handled by [`PageRenderer`](super::PageRenderer).
pub trait PaginatedWriter {
    /// Record document-level information.
    fn set_document_info(&mut self, info: &DocumentInfo);

    /// Start a new page; subsequent drawing goes to it.
    fn begin_page(&mut self, width: f32, height: f32) -> std::result::Result<(), RenderFault>;

    /// Draw a single line of text with its baseline at `baseline`.
    fn draw_text(
        &mut self,
        x: f32,
        baseline: f32,
        text: &str,
        style: &TextStyle,
    ) -> std::result::Result<(), RenderFault>;

    /// Fill a rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color) -> std::result::Result<(), RenderFault>;

    /// Stroke a straight line.
    fn draw_line(
        &mut self,
        from: Point,
        to: Point,
        width: f32,
        color: Color,
    ) -> std::result::Result<(), RenderFault>;

    /// Make a region of the current page a hyperlink.
    fn link(&mut self, _rect: Rect, _url: &str) -> std::result::Result<(), RenderFault> {
        Ok(())
    }

    /// Current position in the output.
    fn mark(&self) -> WriterMark;

    /// Discard everything drawn since `mark` was taken, including pages
    /// started after it.
    fn rewind(&mut self, mark: WriterMark);

    /// Produce the finished artifact.
    fn finish(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}
