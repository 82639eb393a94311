//! In-memory writer that records draw operations.

use serde::{Deserialize, Serialize};

use super::style::{Color, TextStyle};
use super::writer::{DocumentInfo, PaginatedWriter, WriterMark};
use crate::error::{RenderFault, Result};
use crate::model::{Point, Rect};

/// One recorded device operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Info {
        info: DocumentInfo,
    },
    BeginPage {
        width: f32,
        height: f32,
    },
    Text {
        x: f32,
        baseline: f32,
        text: String,
        style: TextStyle,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    Line {
        from: Point,
        to: Point,
        width: f32,
        color: Color,
    },
    Link {
        rect: Rect,
        url: String,
    },
}

/// Writer that keeps every operation; `finish` serializes them as JSON.
#[derive(Debug, Clone, Default)]
pub struct DisplayListWriter {
    ops: Vec<DrawOp>,
}

impl DisplayListWriter {
    /// Create an empty display list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations recorded so far.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Take the recorded operations without serializing.
    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }
}

impl PaginatedWriter for DisplayListWriter {
    fn set_document_info(&mut self, info: &DocumentInfo) {
        self.ops.push(DrawOp::Info { info: info.clone() });
    }

    fn begin_page(&mut self, width: f32, height: f32) -> std::result::Result<(), RenderFault> {
        self.ops.push(DrawOp::BeginPage { width, height });
        Ok(())
    }

    fn draw_text(
        &mut self,
        x: f32,
        baseline: f32,
        text: &str,
        style: &TextStyle,
    ) -> std::result::Result<(), RenderFault> {
        self.ops.push(DrawOp::Text {
            x,
            baseline,
            text: text.to_string(),
            style: *style,
        });
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> std::result::Result<(), RenderFault> {
        self.ops.push(DrawOp::FillRect { rect, color });
        Ok(())
    }

    fn draw_line(
        &mut self,
        from: Point,
        to: Point,
        width: f32,
        color: Color,
    ) -> std::result::Result<(), RenderFault> {
        self.ops.push(DrawOp::Line {
            from,
            to,
            width,
            color,
        });
        Ok(())
    }

    fn link(&mut self, rect: Rect, url: &str) -> std::result::Result<(), RenderFault> {
        self.ops.push(DrawOp::Link {
            rect,
            url: url.to_string(),
        });
        Ok(())
    }

    fn mark(&self) -> WriterMark {
        WriterMark {
            offset: self.ops.len(),
            ..WriterMark::default()
        }
    }

    fn rewind(&mut self, mark: WriterMark) {
        self.ops.truncate(mark.offset);
    }

    fn finish(self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.ops)?)
    }
}
