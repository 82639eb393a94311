//! Document renderer: drives the layout engine over a block stream.

use std::sync::Arc;

use log::{info, warn};

use super::layout::{layout_block, layout_fallback};
use super::options::{FooterLabels, RenderOptions};
use super::page::{PageDecorator, PageRenderer, StandardDecorations};
use super::result::{BlockFault, RenderResult, RenderStats};
use super::writer::{DocumentInfo, PaginatedWriter};
use crate::error::{Error, Result};
use crate::model::{BlockKind, Document};

/// Renders parsed documents onto any [`PaginatedWriter`].
///
/// Each call to [`render`](Self::render) owns its own cursor and writer,
/// so one renderer can be shared between threads.
#[derive(Clone)]
pub struct ReportRenderer {
    labels: FooterLabels,
    decorator: Option<Arc<dyn PageDecorator + Send + Sync>>,
}

impl ReportRenderer {
    /// Create a renderer using the footer labels from `options`.
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            labels: options.labels.clone(),
            decorator: None,
        }
    }

    /// Replace the standard header and footer.
    pub fn with_decorator(mut self, decorator: Arc<dyn PageDecorator + Send + Sync>) -> Self {
        self.decorator = Some(decorator);
        self
    }

    /// Lay out every block and return the finished artifact.
    ///
    /// Block faults are recovered with the plain fallback and reported in
    /// [`RenderResult::faults`]; only invalid geometry, page decoration
    /// failures and writer errors abort the render.
    pub fn render<W: PaginatedWriter>(
        &self,
        document: &Document,
        writer: W,
    ) -> Result<RenderResult> {
        document.geometry.validate()?;

        let decorator = self.decorator.clone().unwrap_or_else(|| {
            Arc::new(StandardDecorations::new(
                document.title.as_str(),
                document.generated_on,
                &self.labels,
            ))
        });

        let mut page = PageRenderer::new(writer, document.geometry, decorator);
        page.start(&DocumentInfo::new(
            document.title.as_str(),
            document.generated_on,
        ))?;

        let mut stats = RenderStats::new();
        let mut faults = Vec::new();

        for (index, block) in document.blocks.iter().enumerate() {
            stats.add_block(block);

            // A failed block leaves nothing behind, so the fallback takes
            // its place instead of following its partial rows.
            let fault = match page.atomic(|page| layout_block(page, block)) {
                Ok(drawn) => {
                    if block.kind() == BlockKind::CodeBlock {
                        stats.add_code_lines(drawn.lines);
                    }
                    continue;
                }
                Err(fault) => fault,
            };

            if let Some(err) = page.take_fatal() {
                return Err(err);
            }
            warn!(
                "block {} ({:?}) could not be drawn: {}; using plain fallback",
                index,
                block.kind(),
                fault
            );

            let recovered = match layout_fallback(&mut page, block) {
                Ok(()) => {
                    stats.add_fallback();
                    true
                }
                Err(second) => {
                    if let Some(err) = page.take_fatal() {
                        return Err(err);
                    }
                    warn!("fallback for block {} failed too: {}; skipping", index, second);
                    false
                }
            };

            faults.push(BlockFault {
                index,
                kind: block.kind(),
                message: fault.to_string(),
                recovered,
            });
        }

        let (bytes, pages) = page.finish()?;
        if bytes.is_empty() {
            return Err(Error::EmptyArtifact);
        }
        stats.page_count = pages;

        info!(
            "rendered {} blocks on {} page(s), {} bytes, {} fallback(s)",
            stats.block_count,
            stats.page_count,
            bytes.len(),
            faults.len()
        );

        Ok(RenderResult::new(bytes, stats, faults))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderFault;
    use crate::model::{Block, PageGeometry, Point, Rect};
    use crate::render::display_list::{DisplayListWriter, DrawOp};
    use crate::render::style::{Color, TextStyle};
    use crate::render::writer::WriterMark;
    use chrono::NaiveDate;

    fn document(blocks: Vec<Block>) -> Document {
        let mut doc = Document::new(
            "Title",
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            PageGeometry::a4(),
        );
        for block in blocks {
            doc.add_block(block);
        }
        doc
    }

    /// Display list that rejects one exact text.
    struct Picky {
        inner: DisplayListWriter,
        reject: &'static str,
    }

    impl PaginatedWriter for Picky {
        fn set_document_info(&mut self, info: &DocumentInfo) {
            self.inner.set_document_info(info);
        }

        fn begin_page(&mut self, w: f32, h: f32) -> std::result::Result<(), RenderFault> {
            self.inner.begin_page(w, h)
        }

        fn draw_text(
            &mut self,
            x: f32,
            baseline: f32,
            text: &str,
            style: &TextStyle,
        ) -> std::result::Result<(), RenderFault> {
            if text == self.reject {
                return Err(RenderFault::Device(format!("rejected {:?}", text)));
            }
            self.inner.draw_text(x, baseline, text, style)
        }

        fn fill_rect(&mut self, rect: Rect, color: Color) -> std::result::Result<(), RenderFault> {
            self.inner.fill_rect(rect, color)
        }

        fn draw_line(
            &mut self,
            from: Point,
            to: Point,
            width: f32,
            color: Color,
        ) -> std::result::Result<(), RenderFault> {
            self.inner.draw_line(from, to, width, color)
        }

        fn mark(&self) -> WriterMark {
            self.inner.mark()
        }

        fn rewind(&mut self, mark: WriterMark) {
            self.inner.rewind(mark);
        }

        fn finish(self) -> Result<Vec<u8>> {
            self.inner.finish()
        }
    }

    #[test]
    fn test_render_counts() {
        let doc = document(vec![
            Block::heading(1, "Title"),
            Block::BlankSeparator,
            Block::paragraph("text"),
            Block::code(["a", "b"]),
        ]);
        let renderer = ReportRenderer::new(&RenderOptions::default());
        let result = renderer.render(&doc, DisplayListWriter::new()).unwrap();

        assert_eq!(result.stats.page_count, 1);
        assert_eq!(result.stats.block_count, 4);
        assert_eq!(result.stats.code_line_count, 2);
        assert!(!result.has_faults());
    }

    #[test]
    fn test_faulty_block_falls_back() {
        let doc = document(vec![
            Block::paragraph("before"),
            Block::bullet(0, "**bad** item"),
            Block::paragraph("after"),
        ]);
        let writer = Picky {
            inner: DisplayListWriter::new(),
            reject: "bad",
        };
        let renderer = ReportRenderer::new(&RenderOptions::default());
        let result = renderer.render(&doc, writer).unwrap();

        assert_eq!(result.faults.len(), 1);
        assert_eq!(result.faults[0].index, 1);
        assert_eq!(result.faults[0].kind, BlockKind::BulletItem);
        assert!(result.faults[0].recovered);
        assert_eq!(result.stats.fallback_count, 1);

        let ops: Vec<DrawOp> = serde_json::from_slice(&result.bytes).unwrap();
        let texts: Vec<String> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert!(texts.contains(&"before".to_string()));
        assert!(texts.contains(&"after".to_string()));
        assert!(texts.contains(&"**bad** item".to_string()));
        // The bullet marker was drawn before the fault and is rewound.
        assert!(!texts.contains(&"-".to_string()));
    }

    fn body_texts(result: &RenderResult) -> Vec<String> {
        let ops: Vec<DrawOp> = serde_json::from_slice(&result.bytes).unwrap();
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_fault_on_second_row_draws_block_once() {
        let text = format!("{}tail", "abcdefghi ".repeat(6));
        let doc = document(vec![Block::paragraph(text.as_str())]);
        let writer = Picky {
            inner: DisplayListWriter::new(),
            reject: "tail",
        };
        let result = ReportRenderer::new(&RenderOptions::default())
            .render(&doc, writer)
            .unwrap();
        assert_eq!(result.faults.len(), 1);
        assert!(result.faults[0].recovered);

        let first_row = "abcdefghi ".repeat(6);
        let texts = body_texts(&result);
        assert!(!texts.contains(&first_row.trim_end().to_string()));
        assert_eq!(texts.iter().filter(|t| t.contains("abcdefghi")).count(), 1);
        assert!(texts.contains(&text));
    }

    #[test]
    fn test_fallback_takes_place_of_failed_block() {
        let quote = format!("{}fails", "abcdefghi ".repeat(5));
        let doc = document(vec![Block::quote(quote.as_str()), Block::paragraph("after")]);
        let writer = Picky {
            inner: DisplayListWriter::new(),
            reject: "fails",
        };
        let result = ReportRenderer::new(&RenderOptions::default())
            .render(&doc, writer)
            .unwrap();

        let ops: Vec<DrawOp> = serde_json::from_slice(&result.bytes).unwrap();
        // The first row and its rule are rewound.
        assert!(!ops.iter().any(|op| matches!(op, DrawOp::Line { .. })));
        let baselines: Vec<f32> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, baseline, .. }
                    if text.contains("abcdefghi") || text == "after" =>
                {
                    Some(*baseline)
                }
                _ => None,
            })
            .collect();
        assert_eq!(baselines.len(), 2);
        // Fallback starts at the body top, right under the header.
        assert!(baselines[0] < 30.0);
        assert!(baselines[0] < baselines[1]);
    }

    #[test]
    fn test_fallback_draws_plain_text() {
        let doc = document(vec![Block::paragraph("see `inline` here")]);
        let writer = Picky {
            inner: DisplayListWriter::new(),
            reject: "inline",
        };
        let result = ReportRenderer::new(&RenderOptions::default())
            .render(&doc, writer)
            .unwrap();

        // Only the code run is rejected; the fallback line has the whole text.
        assert_eq!(result.faults.len(), 1);
        assert!(result.faults[0].recovered);
        assert!(result.faults[0].message.contains("rejected"));
    }

    #[test]
    fn test_header_failure_is_fatal() {
        let doc = document(vec![Block::paragraph("x")]);
        let writer = Picky {
            inner: DisplayListWriter::new(),
            reject: "Title",
        };
        let err = ReportRenderer::new(&RenderOptions::default())
            .render(&doc, writer)
            .unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }

    #[test]
    fn test_invalid_geometry() {
        let mut doc = document(vec![]);
        doc.geometry = PageGeometry::new(-1.0, 297.0, 15.0);
        let err = ReportRenderer::new(&RenderOptions::default())
            .render(&doc, DisplayListWriter::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidGeometry(_)));
    }
}
