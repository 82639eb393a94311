//! # mdreport
//!
//! Markdown-to-PDF report renderer for Rust.
//!
//! This library turns a Markdown-flavored report into a paginated
//! document with a title header and a page-number and date footer on
//! every page. It needs no Markdown or layout engine: a line-oriented
//! block parser, an offset-based inline formatter and a character-count
//! layout engine drive any [`PaginatedWriter`](render::PaginatedWriter).
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use mdreport::{render_to_file, RenderOptions};
//!
//! fn main() -> mdreport::Result<()> {
//!     let markdown = std::fs::read_to_string("report.md")?;
//!
//!     let options = RenderOptions::new()
//!         .with_generated_on(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
//!     let stats = render_to_file(&markdown, "report.pdf", &options)?;
//!     println!("{} pages", stats.page_count);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Markdown subset**: headings, nested lists, quotes, fenced code, inline
//!   bold/italic/code/links
//! - **Sanitizer**: maps typographic Unicode to the single-byte output
//!   encoding
//! - **Graceful degradation**: a block that cannot be drawn is redrawn as
//!   plain text instead of aborting the document
//! - **Deterministic output**: identical input gives byte-identical PDFs
//! - **Parallel batches**: independent files render on a Rayon pool

pub mod batch;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod report;
pub mod sanitize;

// Re-export commonly used types
pub use batch::{render_files, BatchOutcome};
pub use error::{Error, InlineFault, RenderFault, Result};
pub use model::{Block, BlockKind, Document, InlineSegment, PageGeometry};
pub use parser::{format_inline, parse, BlockParser, ListNesting, ParseOptions};
pub use render::{
    DisplayListWriter, FooterLabels, JsonFormat, OutputFormat, PaginatedWriter, PdfWriter,
    RenderOptions, RenderResult, RenderStats, ReportRenderer,
};
pub use report::{append_metadata_section, suggested_file_name, Report};
pub use sanitize::{sanitize, SanitizeOptions, Sanitizer};

use std::io::Write;
use std::path::Path;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sanitize and parse Markdown into a document without rendering it.
///
/// # Example
///
/// ```
/// use mdreport::{parse_markdown, RenderOptions};
///
/// let doc = parse_markdown("# Title\n\nHello **world**.", &RenderOptions::default()).unwrap();
/// assert_eq!(doc.title, "Title");
/// assert_eq!(doc.block_count(), 3);
/// ```
pub fn parse_markdown(markdown: &str, options: &RenderOptions) -> Result<Document> {
    Document::from_markdown(markdown, options)
}

/// Render Markdown to a PDF in memory.
///
/// # Example
///
/// ```
/// use mdreport::{render_markdown, RenderOptions};
///
/// let result = render_markdown("# Title\n\nBody text.", &RenderOptions::default()).unwrap();
/// assert!(result.bytes.starts_with(b"%PDF-1.4"));
/// assert_eq!(result.stats.page_count, 1);
/// ```
pub fn render_markdown(markdown: &str, options: &RenderOptions) -> Result<RenderResult> {
    render_markdown_as(markdown, options, OutputFormat::Pdf)
}

/// Render Markdown in the given output format.
pub fn render_markdown_as(
    markdown: &str,
    options: &RenderOptions,
    format: OutputFormat,
) -> Result<RenderResult> {
    match format {
        OutputFormat::Pdf => {
            render_markdown_with_writer(markdown, options, PdfWriter::new(options.compress))
        }
        OutputFormat::DisplayList => {
            render_markdown_with_writer(markdown, options, DisplayListWriter::new())
        }
    }
}

/// Render Markdown onto a caller-supplied writer.
pub fn render_markdown_with_writer<W: PaginatedWriter>(
    markdown: &str,
    options: &RenderOptions,
    writer: W,
) -> Result<RenderResult> {
    let document = Document::from_markdown(markdown, options)?;
    ReportRenderer::new(options).render(&document, writer)
}

/// Render Markdown to a PDF file.
///
/// The file is only created after the render succeeded, so a failed
/// render never leaves an empty or partial file behind.
pub fn render_to_file<P: AsRef<Path>>(
    markdown: &str,
    path: P,
    options: &RenderOptions,
) -> Result<RenderStats> {
    let result = render_markdown(markdown, options)?;
    result.write_to(path)?;
    Ok(result.stats)
}

/// Render Markdown to a PDF and write it to any byte sink.
pub fn render_to_writer<Wr: Write>(
    markdown: &str,
    mut sink: Wr,
    options: &RenderOptions,
) -> Result<RenderStats> {
    let result = render_markdown(markdown, options)?;
    if result.is_empty() {
        return Err(Error::EmptyArtifact);
    }
    sink.write_all(&result.bytes)?;
    sink.flush()?;
    Ok(result.stats)
}
